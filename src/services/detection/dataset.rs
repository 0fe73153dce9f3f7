// Training Dataset Loader
// Reads labeled examples from a CSV with `text` and `generated` columns.

use crate::models::{Label, TrainingExample};
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, info};

use super::error::{DetectorError, Result};

pub const TEXT_COLUMN: &str = "text";
pub const LABEL_COLUMN: &str = "generated";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub total: usize,
    pub human: usize,
    pub ai: usize,
}

pub fn summarize(examples: &[TrainingExample]) -> DatasetSummary {
    let ai = examples.iter().filter(|e| e.label == Label::Ai).count();
    DatasetSummary {
        total: examples.len(),
        human: examples.len() - ai,
        ai,
    }
}

/// Load every row of a training CSV. Any malformed row aborts the load.
pub fn load_training_csv<P: AsRef<Path>>(path: P) -> Result<Vec<TrainingExample>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let examples = read_training_csv(BufReader::new(file))?;
    if examples.is_empty() {
        return Err(DetectorError::EmptyDataset(path.to_path_buf()));
    }

    let summary = summarize(&examples);
    info!(
        "[DATASET] Loaded {} rows from {} (human={}, ai={})",
        summary.total,
        path.display(),
        summary.human,
        summary.ai
    );
    Ok(examples)
}

pub fn read_training_csv<R: Read>(reader: R) -> Result<Vec<TrainingExample>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .flexible(true)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    debug!("[DATASET] CSV headers: {:?}", headers);

    let text_idx = column_index(&headers, TEXT_COLUMN)?;
    let label_idx = column_index(&headers, LABEL_COLUMN)?;

    let mut examples = Vec::new();
    for (row_idx, result) in reader.records().enumerate() {
        let record = result?;
        let row = row_idx + 1;

        let text = record.get(text_idx).unwrap_or_default().to_string();
        let raw_label = record.get(label_idx).unwrap_or_default();
        let label = parse_label(raw_label).ok_or_else(|| DetectorError::InvalidLabel {
            row,
            value: raw_label.to_string(),
        })?;

        examples.push(TrainingExample { text, label });
    }

    Ok(examples)
}

fn column_index(headers: &csv::StringRecord, name: &'static str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or(DetectorError::MissingColumn(name))
}

/// Accepts `0`/`1` written as integers or floats (`1.0`).
fn parse_label(raw: &str) -> Option<Label> {
    let value: f64 = raw.trim().parse().ok()?;
    if value == 0.0 {
        Some(Label::Human)
    } else if value == 1.0 {
        Some(Label::Ai)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_read_quoted_fields() {
        let csv = "text,generated\n\"Hello, world\",0\n\"Line one\nline two\",1\n";
        let examples = read_training_csv(csv.as_bytes()).unwrap();
        assert_eq!(examples.len(), 2);
        assert_eq!(examples[0].text, "Hello, world");
        assert_eq!(examples[0].label, Label::Human);
        assert_eq!(examples[1].text, "Line one\nline two");
        assert_eq!(examples[1].label, Label::Ai);
    }

    #[test]
    fn test_column_order_and_extra_columns() {
        let csv = "id,generated,source,text\n1,1.0,gpt,As an AI model\n2,0,essay,My summer\n";
        let examples = read_training_csv(csv.as_bytes()).unwrap();
        assert_eq!(examples[0], TrainingExample::new("As an AI model", Label::Ai));
        assert_eq!(examples[1], TrainingExample::new("My summer", Label::Human));
    }

    #[test]
    fn test_missing_column() {
        let csv = "text,label\nhello,0\n";
        let err = read_training_csv(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, DetectorError::MissingColumn("generated")));

        let csv = "body,generated\nhello,0\n";
        let err = read_training_csv(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, DetectorError::MissingColumn("text")));
    }

    #[test]
    fn test_invalid_label() {
        let csv = "text,generated\nhello,0\nworld,2\n";
        let err = read_training_csv(csv.as_bytes()).unwrap_err();
        match err {
            DetectorError::InvalidLabel { row, value } => {
                assert_eq!(row, 2);
                assert_eq!(value, "2");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_short_row_gives_empty_text_and_invalid_label() {
        let csv = "generated,text\n1\n";
        let examples = read_training_csv(csv.as_bytes()).unwrap();
        assert_eq!(examples[0].text, "");

        let csv = "text,generated\nonly text\n";
        assert!(matches!(
            read_training_csv(csv.as_bytes()),
            Err(DetectorError::InvalidLabel { row: 1, .. })
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("train.csv");
        let mut f = File::create(&path).unwrap();
        writeln!(f, "text,generated").unwrap();
        writeln!(f, "The cat sat on the mat.,0").unwrap();
        writeln!(f, "As an AI language model I cannot,1").unwrap();
        drop(f);

        let examples = load_training_csv(&path).unwrap();
        assert_eq!(summarize(&examples), DatasetSummary { total: 2, human: 1, ai: 1 });
    }

    #[test]
    fn test_load_empty_and_missing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        std::fs::write(&path, "text,generated\n").unwrap();
        assert!(matches!(
            load_training_csv(&path),
            Err(DetectorError::EmptyDataset(_))
        ));

        let missing = dir.path().join("nope.csv");
        assert!(matches!(load_training_csv(&missing), Err(DetectorError::Io(_))));
    }
}
