// End-to-end: CSV -> train -> save -> load -> predict / serve

use ai_text_detector_lib::api::{create_router, load_detector, AppState};
use ai_text_detector_lib::models::{ConfidenceBand, Label};
use ai_text_detector_lib::services::detection::{ARTIFACT_FILES, CONFIG_FILE};
use ai_text_detector_lib::services::{analyze, AiTextDetector};
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use std::fs;
use std::path::Path;
use tempfile::tempdir;
use tower::ServiceExt;

const HUMAN: &[&str] = &[
    "The cat sat on the mat.",
    "I walked the dog to the park before breakfast.",
    "My sister baked bread and the whole house smelled great.",
    "We got lost on the way to the lake but found a nice diner.",
    "The cat knocked my coffee off the table again this morning.",
    "Our team lost the game but we had fun anyway.",
    "I fixed the bike chain myself and got grease everywhere.",
    "The dog barked at the mailman for ten minutes straight.",
];

const AI: &[&str] = &[
    "As an AI language model, I cannot browse the internet.",
    "As an AI language model, I do not have personal feelings.",
    "In conclusion, it is important to consider all perspectives.",
    "It is important to note that this topic has many aspects.",
    "As an AI language model, I can provide general information.",
    "In conclusion, technology plays an important role in society.",
    "It is important to note that results may vary.",
    "As an AI language model, I am unable to give medical advice.",
];

fn write_csv(path: &Path) {
    let mut writer = String::from("text,generated\n");
    for t in HUMAN {
        writer.push_str(&format!("\"{}\",0\n", t));
    }
    for t in AI {
        writer.push_str(&format!("\"{}\",1\n", t));
    }
    fs::write(path, writer).unwrap();
}

fn train_to(dir: &Path) -> AiTextDetector {
    let csv = dir.join("balanced.csv");
    write_csv(&csv);
    let mut detector = AiTextDetector::new();
    let accuracy = detector.train(&csv, 0.25).unwrap();
    assert!((0.0..=1.0).contains(&accuracy));
    detector.save_model(dir.join("model")).unwrap();
    detector
}

#[test]
fn test_train_save_load_predict() {
    let dir = tempdir().unwrap();
    let trained = train_to(dir.path());
    let model_dir = dir.path().join("model");
    assert!(AiTextDetector::model_exists(&model_dir));

    let mut fresh = AiTextDetector::new();
    assert!(!fresh.is_trained());
    fresh.load_model(&model_dir).unwrap();

    let text = "As an AI language model, I can help you.";
    let prediction = fresh.predict(text).unwrap();
    assert_eq!(prediction.label, Label::Ai);
    assert!(prediction.ai_probability > prediction.human_probability);
    assert_eq!(prediction, trained.predict(text).unwrap());

    let result = analyze(&fresh, text).unwrap();
    assert!(result.certainty > 0.5);
    assert!(matches!(result.confidence, ConfidenceBand::High | ConfidenceBand::VeryHigh));
}

#[test]
fn test_deleting_an_artifact_invalidates_model() {
    let dir = tempdir().unwrap();
    train_to(dir.path());
    let model_dir = dir.path().join("model");
    assert_eq!(ARTIFACT_FILES.len(), 3);

    fs::remove_file(model_dir.join(CONFIG_FILE)).unwrap();
    assert!(!AiTextDetector::model_exists(&model_dir));
    assert!(!load_detector(&model_dir).is_trained());
}

#[tokio::test]
async fn test_served_model_answers_predict() {
    let dir = tempdir().unwrap();
    train_to(dir.path());
    let state = AppState::new(load_detector(&dir.path().join("model")));
    assert!(state.model_loaded());

    let request = Request::builder()
        .method("POST")
        .uri("/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"text": "As an AI language model, I can help you."}"#))
        .unwrap();
    let response = create_router(state.clone()).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["label"], "AI");

    let request = Request::builder()
        .method("POST")
        .uri("/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"text": "   "}"#))
        .unwrap();
    let response = create_router(state).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
