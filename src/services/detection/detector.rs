// Detector Facade
// Owns the fitted vectorizer + classifier pair and the hyperparameters.
// Handles training from CSV, evaluation on a stratified hold-out split and
// persistence of the three model artifacts.

use crate::models::{Label, ModelConfig, Prediction, TrainingExample};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::classifier::MultinomialNb;
use super::dataset::{load_training_csv, summarize, DatasetSummary};
use super::error::{DetectorError, Result};
use super::metrics::{accuracy, ClassificationReport, ConfusionMatrix};
use super::split::{stratified_split, DEFAULT_SEED};
use super::vectorizer::{SparseVector, TfidfVectorizer, VectorizerParams};

pub const DEFAULT_MODEL_DIR: &str = "model";
pub const DEFAULT_TEST_SIZE: f64 = 0.2;

pub const VECTORIZER_FILE: &str = "vectorizer.json";
pub const CLASSIFIER_FILE: &str = "classifier.json";
pub const CONFIG_FILE: &str = "config.json";
pub const ARTIFACT_FILES: [&str; 3] = [VECTORIZER_FILE, CLASSIFIER_FILE, CONFIG_FILE];

/// Outcome of one training run, measured on the held-out split
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub dataset: DatasetSummary,
    pub n_features: usize,
    pub train_size: usize,
    pub test_size: usize,
    pub alpha: f64,
    pub accuracy: f64,
    pub report: ClassificationReport,
    pub confusion: ConfusionMatrix,
}

impl fmt::Display for TrainingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Total: {} | Human: {} | AI: {}",
            self.dataset.total, self.dataset.human, self.dataset.ai
        )?;
        writeln!(f, "Features: {}", self.n_features)?;
        writeln!(
            f,
            "Train: {} | Test: {} | alpha={}",
            self.train_size, self.test_size, self.alpha
        )?;
        writeln!(f)?;
        writeln!(f, "Accuracy: {:.4}", self.accuracy)?;
        writeln!(f)?;
        writeln!(f, "{}", self.report)?;
        write!(f, "{}", self.confusion)
    }
}

/// Vectorizer and classifier are only ever present together.
#[derive(Debug, Clone)]
struct FittedModel {
    vectorizer: TfidfVectorizer,
    classifier: MultinomialNb,
}

/// Text detector. Read-only once trained or loaded, so a single instance
/// can be shared across threads behind an `Arc`.
#[derive(Debug, Clone)]
pub struct AiTextDetector {
    config: ModelConfig,
    seed: u64,
    model: Option<FittedModel>,
}

impl Default for AiTextDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl AiTextDetector {
    pub fn new() -> Self {
        Self::with_config(ModelConfig::default())
    }

    pub fn with_config(config: ModelConfig) -> Self {
        Self {
            config,
            seed: DEFAULT_SEED,
            model: None,
        }
    }

    /// Seed for the train/test split
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn is_trained(&self) -> bool {
        self.model.is_some()
    }

    pub fn vocabulary_size(&self) -> usize {
        self.model
            .as_ref()
            .map_or(0, |m| m.vectorizer.vocabulary_size())
    }

    /// True only when all three artifact files are present
    pub fn model_exists<P: AsRef<Path>>(model_dir: P) -> bool {
        let dir = model_dir.as_ref();
        ARTIFACT_FILES.iter().all(|f| dir.join(f).is_file())
    }

    // ============ Training ============

    /// Train from a CSV file and return the hold-out accuracy
    pub fn train<P: AsRef<Path>>(&mut self, path: P, test_size: f64) -> Result<f64> {
        Ok(self.train_with_report(path, test_size)?.accuracy)
    }

    pub fn train_with_report<P: AsRef<Path>>(
        &mut self,
        path: P,
        test_size: f64,
    ) -> Result<TrainingReport> {
        info!("[TRAIN] Loading: {}", path.as_ref().display());
        let examples = load_training_csv(path)?;
        self.fit_examples(&examples, test_size)
    }

    /// Fit the vectorizer on every text, then fit the classifier on the
    /// training split only and evaluate on the held-out split. The model
    /// kept for serving is the one that was evaluated.
    pub fn fit_examples(
        &mut self,
        examples: &[TrainingExample],
        test_size: f64,
    ) -> Result<TrainingReport> {
        if examples.is_empty() {
            return Err(DetectorError::EmptyCorpus);
        }

        let dataset = summarize(examples);
        info!(
            "[TRAIN] Total: {} | Human: {} | AI: {}",
            dataset.total, dataset.human, dataset.ai
        );

        let texts: Vec<&str> = examples.iter().map(|e| e.text.as_str()).collect();
        let labels: Vec<Label> = examples.iter().map(|e| e.label).collect();

        info!("[TRAIN] Vectorizing...");
        let mut vectorizer = TfidfVectorizer::new(VectorizerParams::from(&self.config));
        let features = vectorizer.fit_transform(&texts)?;
        let n_features = vectorizer.vocabulary_size();
        info!("[TRAIN] Features: {}", n_features);

        let split = stratified_split(&labels, test_size, self.seed)?;
        let (x_train, y_train) = select(&features, &labels, &split.train);
        let (x_test, y_test) = select(&features, &labels, &split.test);
        debug!(
            "[TRAIN] Split: train={} test={} seed={}",
            x_train.len(),
            x_test.len(),
            self.seed
        );

        info!("[TRAIN] Training (alpha={})...", self.config.alpha);
        let mut classifier = MultinomialNb::new(self.config.alpha);
        classifier.fit(&x_train, &y_train)?;

        let y_pred = classifier.predict(&x_test)?;
        let acc = accuracy(&y_test, &y_pred);
        let confusion = ConfusionMatrix::from_predictions(&y_test, &y_pred);
        let report = ClassificationReport::from_confusion(&confusion);
        info!("[TRAIN] Accuracy: {:.4}", acc);

        self.model = Some(FittedModel {
            vectorizer,
            classifier,
        });

        Ok(TrainingReport {
            dataset,
            n_features,
            train_size: x_train.len(),
            test_size: x_test.len(),
            alpha: self.config.alpha,
            accuracy: acc,
            report,
            confusion,
        })
    }

    // ============ Persistence ============

    pub fn save_model<P: AsRef<Path>>(&self, model_dir: P) -> Result<()> {
        let model = self.model.as_ref().ok_or(DetectorError::NotTrained)?;
        let dir = model_dir.as_ref();
        fs::create_dir_all(dir)?;

        write_json(&dir.join(VECTORIZER_FILE), &model.vectorizer)?;
        write_json(&dir.join(CLASSIFIER_FILE), &model.classifier)?;
        write_json(&dir.join(CONFIG_FILE), &self.config)?;

        info!("[MODEL] Saved to {}/", dir.display());
        Ok(())
    }

    /// Load all three artifacts. On any failure the detector is left
    /// exactly as it was.
    pub fn load_model<P: AsRef<Path>>(&mut self, model_dir: P) -> Result<()> {
        let dir = model_dir.as_ref();
        let paths: Vec<PathBuf> = ARTIFACT_FILES.iter().map(|f| dir.join(f)).collect();
        if let Some(missing) = paths.iter().find(|p| !p.is_file()) {
            return Err(DetectorError::MissingArtifact(missing.clone()));
        }

        let vectorizer: TfidfVectorizer = read_json(&paths[0])?;
        let classifier: MultinomialNb = read_json(&paths[1])?;
        let config: ModelConfig = read_json(&paths[2])?;

        if !vectorizer.is_fitted() {
            return Err(corrupt(&paths[0], "vectorizer has no vocabulary"));
        }
        classifier.validate().map_err(|reason| corrupt(&paths[1], reason))?;
        let vocab_size = vectorizer.vocabulary_size();
        if classifier.n_features() != Some(vocab_size) {
            return Err(corrupt(
                &paths[1],
                format!(
                    "classifier expects {:?} features but vocabulary has {}",
                    classifier.n_features(),
                    vocab_size
                ),
            ));
        }

        self.config = config;
        self.model = Some(FittedModel {
            vectorizer,
            classifier,
        });
        info!(
            "[MODEL] Loaded from {}/ ({} features, alpha={})",
            dir.display(),
            vocab_size,
            self.config.alpha
        );
        Ok(())
    }

    /// Convenience constructor for a detector loaded from disk
    pub fn load<P: AsRef<Path>>(model_dir: P) -> Result<Self> {
        let mut detector = Self::new();
        detector.load_model(model_dir)?;
        Ok(detector)
    }

    // ============ Inference ============

    pub fn predict(&self, text: &str) -> Result<Prediction> {
        let model = self.model.as_ref().ok_or(DetectorError::NotTrained)?;

        let x = model.vectorizer.transform_one(text)?;
        let probs = model.classifier.predict_proba_one(&x)?;
        let human_probability = probs[Label::Human.index()];
        let ai_probability = probs[Label::Ai.index()];

        Ok(Prediction {
            label: Label::from_ai_probability(ai_probability),
            ai_probability,
            human_probability,
        })
    }
}

fn select(
    features: &[SparseVector],
    labels: &[Label],
    idx: &[usize],
) -> (Vec<SparseVector>, Vec<Label>) {
    idx.iter().map(|&i| (features[i].clone(), labels[i])).unzip()
}

fn corrupt(path: &Path, reason: impl Into<String>) -> DetectorError {
    DetectorError::CorruptArtifact {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}

/// Write through a temp file so a crash never leaves a half-written artifact
fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, content)?;
    fs::rename(&tmp, path)?;
    debug!("[MODEL] Wrote {}", path.display());
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| corrupt(path, e.to_string()))
}
