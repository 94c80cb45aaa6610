//! Pipeline Definition Integration Tests
//!
//! Loading the bundled pipeline files and building processors from them.

use std::path::PathBuf;
use std::time::Duration;

use rhythm::config::ProcessingSettings;
use rhythm::core::{PipelineDefinition, ProcessorSpec};
use rhythm::domain::Domain;

fn bundled(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("pipelines")
        .join(format!("{}.yaml", name))
}

#[test]
fn test_digest_pipeline_loads() {
    let pipeline = PipelineDefinition::from_file(&bundled("digest")).unwrap();
    pipeline.validate().unwrap();

    assert_eq!(pipeline.name, "digest");
    assert_eq!(pipeline.limits.timeout(), Duration::from_secs(15));
    assert_eq!(pipeline.limits.max_urls, 50);
    assert_eq!(pipeline.limits.retry_policy.max_attempts, 3);
    // denylist keeps its defaults when not given
    assert!(pipeline.limits.is_denylisted("http://localhost:3000/"));

    let processors = pipeline.build_processors(&ProcessingSettings::default(), Domain::Music);
    let names: Vec<&str> = processors.iter().map(|p| p.name()).collect();
    assert_eq!(
        names,
        vec![
            "keyword-tagger",
            "reading-time",
            "sentiment-tagger",
            "category-tagger",
            "summary-generator"
        ]
    );
}

#[test]
fn test_research_pipeline_overrides_domain() {
    let pipeline = PipelineDefinition::from_file(&bundled("research")).unwrap();
    pipeline.validate().unwrap();

    assert_eq!(
        pipeline.processors[1],
        ProcessorSpec::ReadingTime {
            words_per_minute: Some(150)
        }
    );
    assert_eq!(
        pipeline.processors[2],
        ProcessorSpec::CategoryTagger {
            domain: Some(Domain::Research)
        }
    );
}

#[test]
fn test_missing_file_has_context() {
    let err = PipelineDefinition::from_file(&bundled("does-not-exist")).unwrap_err();
    assert!(err.to_string().contains("Failed to read pipeline file"));
}

#[test]
fn test_missing_processors_rejected() {
    let pipeline = PipelineDefinition::from_yaml("name: empty\nprocessors: []\n").unwrap();
    let err = pipeline.validate().unwrap_err();
    assert!(err.to_string().contains("at least one processor"));
}
