// Detection Module
// AI text detection core logic organized into specialized submodules:
// - vectorizer: TF-IDF n-gram feature extraction
// - classifier: Multinomial Naive Bayes over TF-IDF vectors
// - split: Stratified train/test split
// - metrics: Accuracy, confusion matrix, classification report
// - dataset: Training CSV loading
// - detector: Facade that trains, persists, loads and predicts
// - confidence: Certainty and confidence band for API output

pub mod error;
pub mod vectorizer;
pub mod classifier;
pub mod split;
pub mod metrics;
pub mod dataset;
pub mod detector;
pub mod confidence;

// Re-export commonly used items
pub use error::{DetectorError, Result};
pub use vectorizer::{SparseVector, TfidfVectorizer, VectorizerParams, Vocabulary};
pub use classifier::MultinomialNb;
pub use split::{stratified_split, TrainTestSplit, DEFAULT_SEED};
pub use metrics::{accuracy, ClassMetrics, ClassificationReport, ConfusionMatrix};
pub use dataset::{load_training_csv, read_training_csv, summarize, DatasetSummary};
pub use detector::{
    AiTextDetector,
    TrainingReport,
    ARTIFACT_FILES,
    CLASSIFIER_FILE,
    CONFIG_FILE,
    DEFAULT_MODEL_DIR,
    DEFAULT_TEST_SIZE,
    VECTORIZER_FILE,
};
pub use confidence::{analyze, certainty};
