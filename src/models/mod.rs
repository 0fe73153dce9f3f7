// AI Text Detector Data Models
// Domain types shared by the detector, the HTTP API and the CLI

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ============ Labels ============

/// Binary class. The numeric value matches the `generated` column of the
/// training CSV.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Label {
    #[serde(rename = "Human")]
    Human = 0,
    #[serde(rename = "AI")]
    Ai = 1,
}

impl Label {
    pub const ALL: [Label; 2] = [Label::Human, Label::Ai];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(idx: usize) -> Option<Self> {
        match idx {
            0 => Some(Self::Human),
            1 => Some(Self::Ai),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Human => "Human",
            Self::Ai => "AI",
        }
    }

    /// Strict majority rule: exactly 0.5 stays Human
    pub fn from_ai_probability(ai_probability: f64) -> Self {
        if ai_probability > 0.5 {
            Self::Ai
        } else {
            Self::Human
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============ Confidence ============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceBand {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl ConfidenceBand {
    /// Band a certainty value. Comparisons are strict, so a value sitting
    /// exactly on a boundary falls into the lower band.
    pub fn from_certainty(certainty: f64) -> Self {
        if certainty > 0.8 {
            Self::VeryHigh
        } else if certainty > 0.5 {
            Self::High
        } else if certainty > 0.2 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::VeryHigh => "very_high",
        }
    }
}

impl fmt::Display for ConfidenceBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============ Training ============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingExample {
    pub text: String,
    pub label: Label,
}

impl TrainingExample {
    pub fn new(text: impl Into<String>, label: Label) -> Self {
        Self {
            text: text.into(),
            label,
        }
    }
}

/// Hyperparameters persisted next to the fitted model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_max_features")]
    pub max_features: usize,
    #[serde(default = "default_ngram_range")]
    pub ngram_range: (usize, usize),
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    #[serde(default = "default_min_df")]
    pub min_df: usize,
    #[serde(default = "default_max_df")]
    pub max_df: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            max_features: default_max_features(),
            ngram_range: default_ngram_range(),
            alpha: default_alpha(),
            min_df: default_min_df(),
            max_df: default_max_df(),
        }
    }
}

// ============ Prediction ============

/// Raw classifier output for one text
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: Label,
    pub ai_probability: f64,
    pub human_probability: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub label: Label,
    pub ai_probability: f64,
    pub human_probability: f64,
    pub confidence: ConfidenceBand,
    pub certainty: f64,
    pub text_length: usize,
    pub word_count: usize,
}

// ============ HTTP Payloads ============

/// `text` is optional so a missing field surfaces as a validation error
/// instead of a body rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PredictRequest {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model_loaded: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub name: String,
    pub version: String,
    pub status: String,
    pub model_loaded: bool,
    pub endpoints: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ============ Default Value Functions ============

fn default_max_features() -> usize { 15000 }
fn default_ngram_range() -> (usize, usize) { (1, 3) }
fn default_alpha() -> f64 { 0.01 }
fn default_min_df() -> usize { 2 }
fn default_max_df() -> f64 { 0.9 }
