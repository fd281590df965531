//! Prompt assembly and response synthesis.
//!
//! Builds one bounded prompt from the top-ranked chunks, the user query,
//! and an optional language directive, then invokes the injected
//! [`Generator`] under an explicit deadline. Every failure mode — disabled
//! client, timeout, transport error, unusable payload — is recovered here
//! and returned as [`AnswerResult`] data; nothing propagates past this
//! boundary as an error.

use std::time::Duration;

use crate::config::{GenerationConfig, GroundingConfig};
use crate::generate::{GenerateError, Generator};
use crate::grounding::{self, Grounding};
use crate::language::{language_name, DEFAULT_LANGUAGE};
use crate::models::{
    AnswerFailure, AnswerResult, FailureKind, RankedMatch, SourceAttribution,
};

/// Prepended to the answer text when the grounding signal is below
/// threshold.
pub const LOW_CONFIDENCE_DISCLAIMER: &str =
    "Note: I couldn't find strong support for this in your documents, so the answer below may be incomplete or off-topic.";

const SYSTEM_INSTRUCTION: &str = "You are a study assistant. Answer the question using only the \
provided context passages. If the context does not contain the answer, say that the material \
does not cover it. Do not invent facts.";

const EMPTY_CONTEXT_INSTRUCTION: &str = "No relevant passages were found in the user's \
documents. Tell the user their material does not appear to cover this question, then answer \
briefly from general knowledge, clearly marked as such.";

/// Assemble the single prompt handed to the model.
///
/// Layout: system instruction, context passages each tagged with their
/// source name (or the empty-context instruction), a language directive
/// when `language` is not the default, then the question.
pub fn build_prompt(query: &str, matches: &[RankedMatch], language: &str) -> String {
    let mut prompt = String::from(SYSTEM_INSTRUCTION);
    prompt.push_str("\n\n");

    if matches.is_empty() {
        prompt.push_str(EMPTY_CONTEXT_INSTRUCTION);
        prompt.push('\n');
    } else {
        prompt.push_str("Context:\n");
        for m in matches {
            prompt.push_str(&format!(
                "\n[source: {}]\n{}\n",
                m.chunk.source_name, m.chunk.text
            ));
        }
    }

    if language != DEFAULT_LANGUAGE {
        prompt.push_str(&format!("\nRespond in {}.\n", language_name(language)));
    }

    prompt.push_str(&format!("\nQuestion: {}", query));
    prompt
}

/// Per-document attributions: best relevance per source, in first-seen
/// (ranked) order.
pub fn attribute_sources(matches: &[RankedMatch]) -> Vec<SourceAttribution> {
    let mut sources: Vec<SourceAttribution> = Vec::new();
    for m in matches {
        match sources.iter_mut().find(|s| s.source == m.chunk.source_name) {
            Some(existing) => {
                if m.relevance_score > existing.relevance {
                    existing.relevance = m.relevance_score;
                }
            }
            None => sources.push(SourceAttribution {
                source: m.chunk.source_name.clone(),
                relevance: m.relevance_score,
            }),
        }
    }
    sources
}

/// Invoke the model over the assembled prompt and package the outcome.
///
/// The call is wrapped in a deadline of `generation.timeout_secs`; expiry
/// is reported as [`FailureKind::Timeout`], distinct from transport
/// failure, so callers can tell "slow" from "broken".
pub async fn synthesize(
    generator: &dyn Generator,
    generation: &GenerationConfig,
    grounding_cfg: &GroundingConfig,
    query: &str,
    matches: &[RankedMatch],
    language: &str,
) -> AnswerResult {
    let signal = grounding::score_with_threshold(matches, grounding_cfg.threshold);
    let prompt = build_prompt(query, matches, language);
    let sources = attribute_sources(matches);

    match generate_with_deadline(generator, generation, &prompt).await {
        Ok(text) => success(text, sources, signal),
        Err(err) => failure(err, signal),
    }
}

/// Run the model call under the configured deadline. Expiry becomes a
/// [`FailureKind::Timeout`] failure, distinct from transport errors.
async fn generate_with_deadline(
    generator: &dyn Generator,
    generation: &GenerationConfig,
    prompt: &str,
) -> Result<String, AnswerFailure> {
    let deadline = Duration::from_secs(generation.timeout_secs);
    match tokio::time::timeout(deadline, generator.generate(prompt)).await {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(err)) => {
            let kind = match &err {
                GenerateError::Disabled => FailureKind::Disabled,
                GenerateError::Transport(_) => FailureKind::Transport,
                GenerateError::Parse(_) => FailureKind::Parse,
            };
            Err(AnswerFailure {
                kind,
                message: err.to_string(),
            })
        }
        Err(_elapsed) => Err(AnswerFailure {
            kind: FailureKind::Timeout,
            message: format!(
                "model '{}' did not answer within the {}s deadline",
                generator.model_name(),
                generation.timeout_secs
            ),
        }),
    }
}

/// Summarize one document from its leading chunks.
///
/// A summary is grounded by construction (the context *is* the document),
/// so the grounding signal is full confidence for a non-empty document and
/// [`Grounding::none`] for an empty one.
pub async fn summarize_document(
    generator: &dyn Generator,
    generation: &GenerationConfig,
    doc: &crate::models::IndexedDocument,
    max_chunks: usize,
    language: &str,
) -> AnswerResult {
    let chunks = &doc.chunks[..doc.chunks.len().min(max_chunks)];

    let mut prompt = String::from(
        "You are a study assistant. Write a concise summary of the following material, \
keeping the key facts and definitions.",
    );
    prompt.push_str("\n\n");
    if chunks.is_empty() {
        prompt.push_str("The document is empty; say so in one sentence.\n");
    } else {
        prompt.push_str(&format!("Material from \"{}\":\n", doc.display_name));
        for c in chunks {
            prompt.push_str(&format!("\n{}\n", c.text));
        }
    }
    if language != DEFAULT_LANGUAGE {
        prompt.push_str(&format!("\nRespond in {}.\n", language_name(language)));
    }

    let signal = if chunks.is_empty() {
        Grounding::none()
    } else {
        Grounding {
            confidence: 100.0,
            grounded: true,
        }
    };
    let sources = if chunks.is_empty() {
        Vec::new()
    } else {
        vec![SourceAttribution {
            source: doc.display_name.clone(),
            relevance: 1.0,
        }]
    };

    match generate_with_deadline(generator, generation, &prompt).await {
        Ok(text) => success(text, sources, signal),
        Err(err) => failure(err, signal),
    }
}

fn success(text: String, sources: Vec<SourceAttribution>, signal: Grounding) -> AnswerResult {
    let answer_text = if signal.grounded {
        text
    } else {
        format!("{}\n\n{}", LOW_CONFIDENCE_DISCLAIMER, text)
    };
    AnswerResult {
        answer_text,
        sources,
        confidence: signal.confidence,
        grounded: signal.grounded,
        error: None,
    }
}

fn failure(err: AnswerFailure, signal: Grounding) -> AnswerResult {
    AnswerResult {
        answer_text: String::new(),
        sources: Vec::new(),
        confidence: signal.confidence,
        grounded: signal.grounded,
        error: Some(err),
    }
}
