// AI Text Detector Core Services

pub mod text_processor;
pub mod config_store;
pub mod detection;
pub mod interactive;

pub use text_processor::*;
pub use config_store::*;
pub use interactive::{run_menu, MenuOptions};

// Re-export detection entry points
pub use detection::{
    analyze,
    certainty,
    AiTextDetector,
    DetectorError,
    TrainingReport,
    DEFAULT_MODEL_DIR,
    DEFAULT_TEST_SIZE,
};
