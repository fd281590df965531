//! End-to-end pipeline tests against the library API, with mock
//! generators standing in for the remote model.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use answer_harness::answer::LOW_CONFIDENCE_DISCLAIMER;
use answer_harness::config::Config;
use answer_harness::engine::AnswerEngine;
use answer_harness::generate::{GenerateError, Generator};
use answer_harness::models::{FailureKind, SourceDocument};

/// Returns a canned reply and records every prompt it was handed.
struct CapturingGenerator {
    reply: String,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl CapturingGenerator {
    fn new(reply: &str) -> (Self, Arc<Mutex<Vec<String>>>) {
        let prompts = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                reply: reply.to_string(),
                prompts: Arc::clone(&prompts),
            },
            prompts,
        )
    }
}

#[async_trait]
impl Generator for CapturingGenerator {
    fn model_name(&self) -> &str {
        "capturing-mock"
    }

    async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(self.reply.clone())
    }
}

/// Fails every call with a transport error.
struct FailingGenerator;

#[async_trait]
impl Generator for FailingGenerator {
    fn model_name(&self) -> &str {
        "failing-mock"
    }

    async fn generate(&self, _prompt: &str) -> Result<String, GenerateError> {
        Err(GenerateError::Transport("connection refused".to_string()))
    }
}

/// Never completes within any reasonable deadline.
struct SlowGenerator;

#[async_trait]
impl Generator for SlowGenerator {
    fn model_name(&self) -> &str {
        "slow-mock"
    }

    async fn generate(&self, _prompt: &str) -> Result<String, GenerateError> {
        tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
        Ok(String::new())
    }
}

fn doc(id: &str, name: &str, body: &str) -> SourceDocument {
    SourceDocument {
        id: id.to_string(),
        display_name: name.to_string(),
        raw_content: body.to_string(),
    }
}

fn engine_with(generator: Box<dyn Generator>) -> AnswerEngine {
    AnswerEngine::new(Config::default(), generator).unwrap()
}

fn photosynthesis_doc() -> SourceDocument {
    doc(
        "bio-1",
        "Photosynthesis Notes",
        "# Photosynthesis\nPlants convert sunlight into chemical energy using chlorophyll.",
    )
}

// Scenario A: a relevant document grounds the answer.
#[tokio::test]
async fn relevant_document_produces_grounded_answer() {
    let (generator, prompts) = CapturingGenerator::new("Plants use chlorophyll.");
    let mut engine = engine_with(Box::new(generator));
    let docs = vec![photosynthesis_doc()];

    let matches = engine.rank(&docs, "What pigment do plants use?");
    assert!(!matches.is_empty());
    assert!(matches[0].chunk.text.contains("chlorophyll"));

    let result = engine.ask(&docs, "What pigment do plants use?", None).await;
    assert!(result.error.is_none());
    assert!(result.grounded, "confidence was {}", result.confidence);
    assert_eq!(result.answer_text, "Plants use chlorophyll.");
    assert_eq!(result.sources.len(), 1);
    assert_eq!(result.sources[0].source, "Photosynthesis Notes");

    let prompts = prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("[source: Photosynthesis Notes]"));
    assert!(prompts[0].contains("What pigment do plants use?"));
}

// Scenario B: an empty corpus yields no matches, zero confidence, and a
// disclaimed answer.
#[tokio::test]
async fn empty_corpus_yields_disclaimed_low_confidence_answer() {
    let (generator, prompts) = CapturingGenerator::new("General knowledge answer.");
    let mut engine = engine_with(Box::new(generator));

    let matches = engine.rank(&[], "anything at all");
    assert!(matches.is_empty());

    let result = engine.ask(&[], "anything at all", None).await;
    assert!(result.error.is_none());
    assert_eq!(result.confidence, 0.0);
    assert!(!result.grounded);
    assert!(result.sources.is_empty());
    assert!(result.answer_text.starts_with(LOW_CONFIDENCE_DISCLAIMER));

    // The model is still called, with the empty-context instruction.
    let prompts = prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("No relevant passages"));
}

// Scenario C: ranking picks the relevant document and the irrelevant one
// contributes nothing.
#[tokio::test]
async fn irrelevant_document_contributes_no_matches() {
    let (generator, _) = CapturingGenerator::new("ok");
    let mut engine = engine_with(Box::new(generator));
    let docs = vec![
        doc(
            "hist-1",
            "Roman History",
            "The Roman Empire reached its greatest extent under Trajan.",
        ),
        photosynthesis_doc(),
    ];

    let matches = engine.rank(&docs, "What pigment do plants use?");
    assert!(!matches.is_empty());
    assert_eq!(matches[0].chunk.source_name, "Photosynthesis Notes");
    assert!(matches
        .iter()
        .all(|m| m.chunk.source_name == "Photosynthesis Notes"));
}

// Scenario D: a transport failure becomes error data, never a panic or a
// propagated error.
#[tokio::test]
async fn transport_failure_is_returned_as_error_data() {
    let mut engine = engine_with(Box::new(FailingGenerator));
    let docs = vec![photosynthesis_doc()];

    let result = engine.ask(&docs, "What pigment do plants use?", None).await;
    let err = result.error.expect("expected an error");
    assert_eq!(err.kind, FailureKind::Transport);
    assert!(!err.message.is_empty());
    assert!(result.answer_text.is_empty());
}

#[tokio::test]
async fn deadline_expiry_is_a_timeout_not_a_transport_error() {
    let mut config = Config::default();
    config.generation.timeout_secs = 0;
    let mut engine = AnswerEngine::new(config, Box::new(SlowGenerator)).unwrap();

    let result = engine.ask(&[photosynthesis_doc()], "anything", None).await;
    let err = result.error.expect("expected an error");
    assert_eq!(err.kind, FailureKind::Timeout);
    assert!(err.message.contains("slow-mock"));
    assert!(result.answer_text.is_empty());
}

#[tokio::test]
async fn disabled_provider_fails_fast_with_fixed_message() {
    let mut engine = AnswerEngine::from_config(Config::default()).unwrap();
    let result = engine.ask(&[photosynthesis_doc()], "anything", None).await;
    let err = result.error.expect("expected an error");
    assert_eq!(err.kind, FailureKind::Disabled);
    assert_eq!(
        err.message,
        answer_harness::generate::DISABLED_MESSAGE
    );
}

#[tokio::test]
async fn language_directive_reaches_the_prompt() {
    let (generator, prompts) = CapturingGenerator::new("respuesta");
    let mut engine = engine_with(Box::new(generator));

    let result = engine
        .ask(&[photosynthesis_doc()], "What pigment do plants use?", Some("es"))
        .await;
    assert!(result.error.is_none());
    assert!(prompts.lock().unwrap()[0].contains("Respond in Spanish."));
}

#[tokio::test]
async fn repeated_asks_reuse_the_cache() {
    let (generator, _) = CapturingGenerator::new("ok");
    let mut engine = engine_with(Box::new(generator));
    let docs = vec![photosynthesis_doc(), doc("x", "Other", "Some other notes.")];

    let first = engine.rank(&docs, "What pigment do plants use?");
    assert_eq!(engine.cached_documents(), 2);
    let second = engine.rank(&docs, "What pigment do plants use?");
    assert_eq!(engine.cached_documents(), 2);

    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a.chunk, b.chunk);
        assert_eq!(a.relevance_score, b.relevance_score);
    }
}

#[tokio::test]
async fn confidence_stays_bounded_across_queries() {
    let (generator, _) = CapturingGenerator::new("ok");
    let mut engine = engine_with(Box::new(generator));
    let docs = vec![
        photosynthesis_doc(),
        doc("bio-2", "Cells", "Mitochondria produce energy for the cell."),
    ];

    for query in [
        "What pigment do plants use?",
        "energy",
        "nothing relevant here",
        "",
    ] {
        let result = engine.ask(&docs, query, None).await;
        assert!((0.0..=100.0).contains(&result.confidence), "query {:?}", query);
        assert_eq!(result.grounded, result.confidence > 30.0);
    }
}

#[tokio::test]
async fn summarize_uses_the_document_and_reports_it_as_source() {
    let (generator, prompts) = CapturingGenerator::new("A short summary.");
    let mut engine = engine_with(Box::new(generator));
    let d = photosynthesis_doc();

    let result = engine.summarize(&d, None).await;
    assert!(result.error.is_none());
    assert_eq!(result.answer_text, "A short summary.");
    assert!(result.grounded);
    assert_eq!(result.sources.len(), 1);
    assert_eq!(result.sources[0].source, "Photosynthesis Notes");

    let prompts = prompts.lock().unwrap();
    assert!(prompts[0].contains("chlorophyll"));
    assert!(prompts[0].contains("summary"));
}

#[tokio::test]
async fn note_page_flows_through_normalization_into_answers() {
    use answer_harness::blocks::{Block, NotePage};
    use answer_harness::normalize::page_to_text;

    let page = NotePage {
        id: "page-1".to_string(),
        title: "Water Cycle".to_string(),
        blocks: vec![
            Block::Heading {
                level: 1,
                text: "Water Cycle".to_string(),
            },
            Block::Paragraph {
                text: "Evaporation lifts water vapor into the atmosphere.".to_string(),
            },
            Block::Bullet {
                text: "Condensation forms clouds.".to_string(),
            },
        ],
    };
    let d = SourceDocument {
        id: page.id.clone(),
        display_name: page.title.clone(),
        raw_content: page_to_text(&page),
    };

    let (generator, _) = CapturingGenerator::new("ok");
    let mut engine = engine_with(Box::new(generator));
    let matches = engine.rank(&[d], "what forms clouds");
    assert!(!matches.is_empty());
    assert!(matches[0].chunk.text.contains("Condensation"));
}
