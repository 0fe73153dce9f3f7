// Confidence Banding
// Turns a raw prediction into the response payload served over HTTP and
// printed by the CLI.

use crate::models::{ConfidenceBand, PredictionResult};
use crate::services::text_processor::{round_to, text_stats};

use super::detector::AiTextDetector;
use super::error::Result;

const OUTPUT_DECIMALS: i32 = 4;

/// Distance between the two class probabilities
pub fn certainty(ai_probability: f64, human_probability: f64) -> f64 {
    (ai_probability - human_probability).abs()
}

/// Classify `text` (trimmed) and attach certainty, band and length stats.
/// Band and certainty are derived from the unrounded probabilities.
pub fn analyze(detector: &AiTextDetector, text: &str) -> Result<PredictionResult> {
    let text = text.trim();
    let prediction = detector.predict(text)?;

    let certainty = certainty(prediction.ai_probability, prediction.human_probability);
    let stats = text_stats(text);

    Ok(PredictionResult {
        label: prediction.label,
        ai_probability: round_to(prediction.ai_probability, OUTPUT_DECIMALS),
        human_probability: round_to(prediction.human_probability, OUTPUT_DECIMALS),
        confidence: ConfidenceBand::from_certainty(certainty),
        certainty: round_to(certainty, OUTPUT_DECIMALS),
        text_length: stats.text_length,
        word_count: stats.word_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Label, TrainingExample};
    use crate::services::detection::error::DetectorError;

    fn detector() -> AiTextDetector {
        let mut examples = Vec::new();
        for _ in 0..5 {
            examples.push(TrainingExample::new("the cat sat on the mat at home", Label::Human));
            examples.push(TrainingExample::new("my dog ran in the park today", Label::Human));
            examples.push(TrainingExample::new("as an ai language model i cannot", Label::Ai));
            examples.push(TrainingExample::new("in conclusion it is important to note", Label::Ai));
        }
        let mut detector = AiTextDetector::new();
        detector.fit_examples(&examples, 0.2).unwrap();
        detector
    }

    #[test]
    fn test_certainty() {
        assert!((certainty(0.9, 0.1) - 0.8).abs() < 1e-12);
        assert!((certainty(0.3, 0.7) - 0.4).abs() < 1e-12);
        assert_eq!(certainty(0.5, 0.5), 0.0);
    }

    #[test]
    fn test_analyze_untrained() {
        let err = analyze(&AiTextDetector::new(), "hello there").unwrap_err();
        assert!(matches!(err, DetectorError::NotTrained));
    }

    #[test]
    fn test_analyze_payload() {
        let detector = detector();
        let result = analyze(&detector, "  As an AI language model, I cannot.  ").unwrap();

        assert_eq!(result.label, Label::Ai);
        assert_eq!(result.text_length, "As an AI language model, I cannot.".chars().count());
        assert_eq!(result.word_count, 7);
        assert!((result.ai_probability + result.human_probability - 1.0).abs() < 1e-3);
        assert!(result.certainty > 0.8);
        assert_eq!(result.confidence, ConfidenceBand::VeryHigh);
    }

    #[test]
    fn test_analyze_rounds_to_four_decimals() {
        let detector = detector();
        let result = analyze(&detector, "the park is nice today").unwrap();
        for value in [result.ai_probability, result.human_probability, result.certainty] {
            assert!(((value * 1e4).round() - value * 1e4).abs() < 1e-6);
        }
    }

    #[test]
    fn test_analyze_counts_unicode_chars() {
        let detector = detector();
        let result = analyze(&detector, "café résumé").unwrap();
        assert_eq!(result.text_length, 11);
        assert_eq!(result.word_count, 2);
    }
}
