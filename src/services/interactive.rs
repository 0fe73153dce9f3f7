// Interactive Operator Menu
// Text menu for training and trying out the detector from a terminal.
// Generic over the reader/writer so it can be driven from tests.

use crate::services::detection::AiTextDetector;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::{info, warn};

const RULE: &str = "==================================================";

#[derive(Debug, Clone)]
pub struct MenuOptions {
    pub data_path: PathBuf,
    pub model_dir: PathBuf,
    pub test_size: f64,
}

enum Line {
    Text(String),
    Eof,
}

fn read_line<R: BufRead>(input: &mut R) -> io::Result<Line> {
    let mut buf = String::new();
    if input.read_line(&mut buf)? == 0 {
        return Ok(Line::Eof);
    }
    Ok(Line::Text(buf.trim().to_string()))
}

fn prompt<R: BufRead, W: Write>(input: &mut R, output: &mut W, text: &str) -> io::Result<Line> {
    write!(output, "{}", text)?;
    output.flush()?;
    read_line(input)
}

fn banner<W: Write>(output: &mut W, title: &str) -> io::Result<()> {
    writeln!(output, "\n{}", RULE)?;
    writeln!(output, "{}", title)?;
    writeln!(output, "{}", RULE)
}

/// Run the menu until the operator exits or input ends
pub fn run_menu<R: BufRead, W: Write>(
    detector: &mut AiTextDetector,
    options: &MenuOptions,
    input: &mut R,
    output: &mut W,
) -> io::Result<()> {
    loop {
        banner(output, "AI TEXT DETECTOR")?;
        let status = if AiTextDetector::model_exists(&options.model_dir) { "✅" } else { "❌" };
        writeln!(output, "Model: {}", status)?;
        writeln!(output, "\n1. Train")?;
        writeln!(output, "2. Predict")?;
        writeln!(output, "3. Exit")?;

        let choice = match prompt(input, output, "\nSelect (1-3): ")? {
            Line::Text(choice) => choice,
            Line::Eof => break,
        };

        match choice.as_str() {
            "1" => train(detector, options, output)?,
            "2" => {
                if !predict_mode(detector, options, input, output)? {
                    break;
                }
            }
            "3" => {
                writeln!(output, "\nBye!")?;
                break;
            }
            _ => writeln!(output, "Invalid choice!")?,
        }
    }
    Ok(())
}

fn train<W: Write>(
    detector: &mut AiTextDetector,
    options: &MenuOptions,
    output: &mut W,
) -> io::Result<()> {
    banner(output, "TRAINING")?;
    if !options.data_path.is_file() {
        writeln!(output, "❌ File not found: {}", options.data_path.display())?;
        return Ok(());
    }

    let result = detector
        .train_with_report(&options.data_path, options.test_size)
        .and_then(|report| {
            detector.save_model(&options.model_dir)?;
            Ok(report)
        });

    match result {
        Ok(report) => {
            writeln!(output, "\n{}", report)?;
            writeln!(output, "\n✅ Done!")?;
        }
        Err(e) => {
            warn!("[MENU] Training failed: {}", e);
            writeln!(output, "❌ Training failed: {}", e)?;
        }
    }
    Ok(())
}

/// Returns false when input ended inside the predict loop
fn predict_mode<R: BufRead, W: Write>(
    detector: &mut AiTextDetector,
    options: &MenuOptions,
    input: &mut R,
    output: &mut W,
) -> io::Result<bool> {
    if !AiTextDetector::model_exists(&options.model_dir) {
        writeln!(output, "\n❌ No model! Train first (option 1)")?;
        return Ok(true);
    }
    if let Err(e) = detector.load_model(&options.model_dir) {
        writeln!(output, "\n❌ Failed to load model: {}", e)?;
        return Ok(true);
    }
    info!("[MENU] Predict mode");

    banner(output, "PREDICT MODE")?;
    loop {
        let text = match prompt(input, output, "\nText (or 'back'): ")? {
            Line::Text(text) => text,
            Line::Eof => return Ok(false),
        };

        let lowered = text.to_lowercase();
        if lowered == "back" || lowered == "exit" {
            return Ok(true);
        }
        if text.is_empty() {
            continue;
        }

        match detector.predict(&text) {
            Ok(p) => writeln!(
                output,
                "\n→ {} | AI: {:.1}% | Human: {:.1}%",
                p.label,
                p.ai_probability * 100.0,
                p.human_probability * 100.0
            )?,
            Err(e) => writeln!(output, "\n❌ {}", e)?,
        }

        match prompt(input, output, "\nAnother? (y/n): ")? {
            Line::Text(again) if again.to_lowercase() == "y" => {}
            Line::Text(_) => return Ok(true),
            Line::Eof => return Ok(false),
        }
    }
}
