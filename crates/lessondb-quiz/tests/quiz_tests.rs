use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use lessondb_core::catalog::Catalog;
use lessondb_core::config::QuizSettings;
use lessondb_core::traits::TextGenerator;
use lessondb_core::types::{CourseRef, MaterialRef, Topic};
use lessondb_core::{Error, ProviderError, Result};
use lessondb_quiz::{AttemptError, ChainState, ModelChain, QuizEngine, QuizRequest};

enum Reply {
    Text(String),
    Fail(ProviderError),
    Hang,
}

/// Replies per model id and records every call in order.
struct ScriptedGenerator {
    replies: HashMap<String, Reply>,
    calls: Mutex<Vec<(String, String)>>,
    configured: bool,
}

impl ScriptedGenerator {
    fn new(replies: Vec<(&str, Reply)>) -> Self {
        Self {
            replies: replies.into_iter().map(|(m, r)| (m.to_string(), r)).collect(),
            calls: Mutex::new(Vec::new()),
            configured: true,
        }
    }

    fn called_models(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(m, _)| m.clone()).collect()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    fn preflight(&self) -> Result<()> {
        if self.configured { Ok(()) } else { Err(Error::InvalidConfig("no key".into())) }
    }

    async fn generate(&self, model: &str, prompt: &str) -> std::result::Result<String, ProviderError> {
        self.calls.lock().unwrap().push((model.to_string(), prompt.to_string()));
        match self.replies.get(model) {
            Some(Reply::Text(t)) => Ok(t.clone()),
            Some(Reply::Fail(e)) => Err(e.clone()),
            Some(Reply::Hang) => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(String::new())
            }
            None => Err(ProviderError::Status { status: 404, body: "unknown model".into() }),
        }
    }
}

fn questions_json(n: usize) -> String {
    let items: Vec<_> = (0..n)
        .map(|i| json!({
            "question": format!("Question {}?", i + 1),
            "options": ["alpha", "beta", "gamma", "delta"],
            "answerIndex": i % 4,
            "explanation": "because"
        }))
        .collect();
    json!({ "questions": items }).to_string()
}

fn catalog() -> Arc<Catalog> {
    let topic = Topic {
        id: "topic7".into(),
        title: "Projectile motion".into(),
        description: None,
        course: Some(CourseRef { title: "Mechanics".into(), subject: "Physics".into() }),
        material: Some(MaterialRef { id: "m1".into(), title: "Kinematics".into(), content: "x ".repeat(5000) }),
    };
    Arc::new(Catalog::new(vec![], vec![topic]))
}

fn engine(generator: Arc<ScriptedGenerator>, settings: QuizSettings) -> QuizEngine {
    let chain = ModelChain::new(["model-a", "model-b", "model-c"]).unwrap();
    QuizEngine::new(catalog(), generator, chain, settings)
}

#[tokio::test]
async fn incomplete_model_falls_through_to_next() {
    let generator = Arc::new(ScriptedGenerator::new(vec![
        ("model-a", Reply::Text(questions_json(4))),
        ("model-b", Reply::Text(questions_json(5))),
        ("model-c", Reply::Text(questions_json(5))),
    ]));
    let engine = engine(generator.clone(), QuizSettings::default());
    let request = QuizRequest::new("topic7").with_count(5);

    let response = engine.generate(&request).await.unwrap();

    assert_eq!(response.model_used, "model-b");
    assert_eq!(response.topic_id, "topic7");
    assert_eq!(response.questions.len(), 5);
    let ids: Vec<&str> = response.questions.iter().map(|q| q.id.as_str()).collect();
    assert_eq!(ids, vec!["topic7_1", "topic7_2", "topic7_3", "topic7_4", "topic7_5"]);
    assert_eq!(generator.called_models(), vec!["model-a", "model-b"], "model-c is never tried");
}

#[tokio::test]
async fn chain_state_records_the_skipped_failure() {
    let generator = Arc::new(ScriptedGenerator::new(vec![
        ("model-a", Reply::Text(questions_json(4))),
        ("model-b", Reply::Text(questions_json(5))),
    ]));
    let engine = engine(generator, QuizSettings::default());

    let state = engine.run(&QuizRequest::new("topic7").with_count(5)).await.unwrap();

    match state {
        ChainState::Succeeded { model, failures, .. } => {
            assert_eq!(model, "model-b");
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].model, "model-a");
            assert_eq!(failures[0].error, AttemptError::Incomplete { wanted: 5, got: 4 });
        }
        other => panic!("expected success, got {:?}", other),
    }
}

#[tokio::test]
async fn fenced_response_with_prose_is_accepted() {
    let fenced = format!("Sure! ```json {} ``` Good luck!", questions_json(3));
    let generator = Arc::new(ScriptedGenerator::new(vec![("model-a", Reply::Text(fenced))]));
    let engine = engine(generator, QuizSettings::default());

    let response = engine.generate(&QuizRequest::new("topic7").with_count(3)).await.unwrap();

    assert_eq!(response.model_used, "model-a");
    assert_eq!(response.questions.len(), 3);
}

#[tokio::test]
async fn surplus_questions_are_truncated_to_the_request() {
    let generator = Arc::new(ScriptedGenerator::new(vec![("model-a", Reply::Text(questions_json(9)))]));
    let engine = engine(generator, QuizSettings::default());

    let response = engine.generate(&QuizRequest::new("topic7").with_count(4)).await.unwrap();

    assert_eq!(response.questions.len(), 4);
    assert_eq!(response.questions[3].question, "Question 4?");
}

#[tokio::test]
async fn exhaustion_is_one_opaque_error() {
    let generator = Arc::new(ScriptedGenerator::new(vec![
        ("model-a", Reply::Text("   ".into())),
        ("model-b", Reply::Fail(ProviderError::Status { status: 429, body: "quota exceeded for key".into() })),
        ("model-c", Reply::Text("I cannot help with that.".into())),
    ]));
    let engine = engine(generator.clone(), QuizSettings::default());
    let request = QuizRequest::new("topic7").with_count(2);

    let err = engine.generate(&request).await.unwrap_err();

    assert!(matches!(err, Error::GenerationFailed { attempts: 3 }));
    assert!(!err.to_string().contains("quota"), "provider detail is withheld");
    assert_eq!(generator.called_models(), vec!["model-a", "model-b", "model-c"]);

    let state = engine.run(&request).await.unwrap();
    let errors: Vec<AttemptError> = state.failures().iter().map(|f| f.error.clone()).collect();
    assert_eq!(errors[0], AttemptError::EmptyResponse);
    assert!(matches!(errors[1], AttemptError::Provider(ProviderError::Status { status: 429, .. })));
    assert!(matches!(errors[2], AttemptError::Parse(_)));
}

#[tokio::test]
async fn missing_credential_short_circuits() {
    let mut generator = ScriptedGenerator::new(vec![("model-a", Reply::Text(questions_json(10)))]);
    generator.configured = false;
    let generator = Arc::new(generator);
    let engine = engine(generator.clone(), QuizSettings::default());

    let err = engine.generate(&QuizRequest::new("topic7")).await.unwrap_err();

    assert!(matches!(err, Error::InvalidConfig(_)));
    assert!(generator.called_models().is_empty());
}

#[tokio::test]
async fn unknown_topic_is_not_found() {
    let generator = Arc::new(ScriptedGenerator::new(vec![("model-a", Reply::Text(questions_json(10)))]));
    let engine = engine(generator.clone(), QuizSettings::default());

    let err = engine.generate(&QuizRequest::new("nope")).await.unwrap_err();

    assert!(matches!(err, Error::NotFound(_)));
    assert!(generator.called_models().is_empty());
}

#[tokio::test]
async fn default_request_asks_for_ten_and_bounds_excerpt() {
    let generator = Arc::new(ScriptedGenerator::new(vec![("model-a", Reply::Text(questions_json(10)))]));
    let engine = engine(generator.clone(), QuizSettings::default());

    let response = engine.generate(&QuizRequest::new("topic7")).await.unwrap();

    assert_eq!(response.questions.len(), 10);
    let calls = generator.calls.lock().unwrap();
    let prompt = &calls[0].1;
    assert!(prompt.contains("Generate 10 multiple-choice questions at moderate difficulty."));
    let excerpt = prompt.split("Material Context: ").nth(1).expect("excerpt present");
    assert_eq!(excerpt.chars().count(), 4000);
}

#[tokio::test]
async fn slow_model_times_out_and_chain_advances() {
    let generator = Arc::new(ScriptedGenerator::new(vec![
        ("model-a", Reply::Hang),
        ("model-b", Reply::Text(questions_json(2))),
    ]));
    let settings = QuizSettings { attempt_timeout_secs: Some(1), ..QuizSettings::default() };
    let engine = engine(generator, settings);

    let state = engine.run(&QuizRequest::new("topic7").with_count(2)).await.unwrap();

    match state {
        ChainState::Succeeded { model, failures, .. } => {
            assert_eq!(model, "model-b");
            assert_eq!(failures[0].error, AttemptError::Provider(ProviderError::Timeout(1)));
        }
        other => panic!("expected success, got {:?}", other),
    }
}
