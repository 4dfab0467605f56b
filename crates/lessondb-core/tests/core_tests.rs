use std::fs;
use tempfile::TempDir;

use lessondb_core::catalog::Catalog;
use lessondb_core::config::{Config, EmbeddingBackend};
use lessondb_core::traits::MaterialRepository;
use lessondb_core::types::{MaterialField, MaterialFilter};
use lessondb_core::Error;

const PHYSICS: &str = r#"{
  "materials": [
    {"id": "m1", "title": "Kinematics", "subject": "Physics", "topic": "Motion", "isProcessed": true,
     "chunks": [{"chunkIndex": 0, "content": "velocity", "embedding": [1.0, 0.0]}]},
    {"id": "m2", "title": "Draft", "subject": "Physics", "topic": "Optics", "isProcessed": false}
  ],
  "topics": [
    {"id": "t1", "title": "Projectile motion", "course": {"title": "Mechanics", "subject": "Physics"}}
  ]
}"#;

const BIOLOGY: &str = r#"{
  "materials": [
    {"id": "m3", "title": "Cells", "subject": "Biology", "topic": "Cells", "isProcessed": true},
    {"id": "m4", "title": "More kinematics", "subject": "Physics", "topic": "Motion", "isProcessed": true}
  ]
}"#;

fn write_catalog() -> TempDir {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("b_physics.json"), PHYSICS).unwrap();
    fs::create_dir(tmp.path().join("nested")).unwrap();
    fs::write(tmp.path().join("nested").join("c_bio.json"), BIOLOGY).unwrap();
    fs::write(tmp.path().join("notes.txt"), "ignored").unwrap();
    tmp
}

#[tokio::test]
async fn load_dir_keeps_file_then_array_order() {
    let tmp = write_catalog();
    let catalog = Catalog::load_dir(tmp.path()).expect("load");

    let ids: Vec<&str> = catalog.materials().iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["m1", "m2", "m3", "m4"]);

    let motion = catalog
        .find_materials(&MaterialFilter::processed().with_subject("Physics").with_topic("Motion"))
        .await
        .unwrap();
    let ids: Vec<&str> = motion.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["m1", "m4"]);
}

#[tokio::test]
async fn distinct_values_are_sorted_unique_and_processed_only() {
    let tmp = write_catalog();
    let catalog = Catalog::load_dir(tmp.path()).unwrap();

    let subjects = catalog.distinct_values(MaterialField::Subject, &MaterialFilter::processed()).await.unwrap();
    assert_eq!(subjects, vec!["Biology", "Physics"]);

    let topics = catalog
        .distinct_values(MaterialField::Topic, &MaterialFilter::processed().with_subject("Physics"))
        .await
        .unwrap();
    // "Optics" only exists on an unprocessed material
    assert_eq!(topics, vec!["Motion"]);
}

#[tokio::test]
async fn find_topic_resolves_course() {
    let tmp = write_catalog();
    let catalog = Catalog::load_dir(tmp.path()).unwrap();

    let topic = catalog.find_topic("t1").await.unwrap().expect("topic exists");
    assert_eq!(topic.course.unwrap().title, "Mechanics");
    assert!(catalog.find_topic("missing").await.unwrap().is_none());
}

#[test]
fn malformed_file_is_a_repository_error() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("broken.json"), "{ not json").unwrap();
    assert!(matches!(Catalog::load_dir(tmp.path()), Err(Error::Repository(_))));
}

#[test]
fn missing_dir_is_a_repository_error() {
    let tmp = TempDir::new().unwrap();
    let missing = tmp.path().join("nope");
    assert!(matches!(Catalog::load_dir(&missing), Err(Error::Repository(_))));
}

#[cfg(unix)]
#[test]
fn unreadable_subdirectory_is_a_repository_error() {
    use std::os::unix::fs::PermissionsExt;

    let tmp = write_catalog();
    let locked = tmp.path().join("locked");
    fs::create_dir(&locked).unwrap();
    fs::write(locked.join("d_more.json"), BIOLOGY).unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Permission bits do not bind root.
    let readable = fs::read_dir(&locked).is_ok();
    let result = Catalog::load_dir(tmp.path());
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
    if readable {
        return;
    }
    assert!(matches!(result, Err(Error::Repository(msg)) if msg.contains("locked")));
}

#[test]
fn blank_configured_key_falls_back_to_env() {
    figment::Jail::expect_with(|jail| {
        jail.set_env("GEMINI_API_KEY", " env-key ");
        let mut settings = lessondb_core::config::GeminiSettings::default();
        settings.api_key = Some("   ".to_string());
        assert_eq!(settings.resolve_api_key().as_deref(), Some("env-key"));

        settings.api_key = Some(" configured ".to_string());
        assert_eq!(settings.resolve_api_key().as_deref(), Some("configured"));
        Ok(())
    });
}

#[test]
fn config_merges_files_and_env() {
    figment::Jail::expect_with(|jail| {
        jail.set_env("RUST_ENV", "test");
        jail.create_file(
            "config.toml",
            r#"
            [retrieval]
            top_k = 8

            [quiz]
            models = ["model-a", "model-b"]
            "#,
        )?;
        jail.create_file(
            "config.test.toml",
            r#"
            [embedding]
            backend = "gemini"
            "#,
        )?;
        jail.set_env("APP_RETRIEVAL__MIN_SIMILARITY", "0.5");

        let config = Config::load().expect("config loads");
        let settings = config.settings().expect("settings");
        assert_eq!(settings.retrieval.top_k, 8);
        assert!((settings.retrieval.min_similarity - 0.5).abs() < 1e-6);
        assert_eq!(settings.quiz.models, vec!["model-a", "model-b"]);
        assert_eq!(settings.quiz.excerpt_chars, 4000);
        assert_eq!(settings.embedding.backend, EmbeddingBackend::Gemini);

        let top_k: usize = config.get("retrieval.top_k").expect("single key");
        assert_eq!(top_k, 8);
        Ok(())
    });
}

#[test]
fn config_rejects_empty_model_chain() {
    figment::Jail::expect_with(|jail| {
        jail.set_env("RUST_ENV", "test");
        jail.create_file("config.toml", "[quiz]\nmodels = []\n")?;
        assert!(matches!(Config::load(), Err(Error::InvalidConfig(_))));
        Ok(())
    });
}
