//! Core data models used throughout the answering pipeline.
//!
//! These types represent the documents, chunks, ranked matches, and answer
//! results that flow from normalization through retrieval to synthesis.

use serde::Serialize;

/// An opaque unit of user content (a note page or an uploaded file),
/// owned by the caller and immutable for the duration of a call.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub id: String,
    pub display_name: String,
    /// Canonical plain text, as produced by a document adapter
    /// (e.g. [`page_to_text`](crate::normalize::page_to_text)).
    pub raw_content: String,
}

/// The cached, processed form of a [`SourceDocument`].
///
/// Owned exclusively by the [`DocumentCache`](crate::cache::DocumentCache)
/// and handed out behind `Arc`, so an unchanged entry is the identical
/// instance across calls.
#[derive(Debug)]
pub struct IndexedDocument {
    pub id: String,
    pub display_name: String,
    /// SHA-256 of the canonical text, computed once at index time.
    pub content_hash: String,
    pub chunks: Vec<Chunk>,
}

/// A retrievable slice of a document's canonical text. Immutable after
/// creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chunk {
    pub source_id: String,
    /// Stable display name carried for attribution.
    pub source_name: String,
    pub text: String,
    /// Position within the document; contiguous from 0.
    pub sequence_index: usize,
    /// Number of leading chars shared with the previous chunk's tail.
    pub overlap_len: usize,
}

impl Chunk {
    /// The span of this chunk not shared with the previous chunk.
    ///
    /// Concatenating fresh spans in `sequence_index` order reconstructs the
    /// document's canonical text up to whitespace normalization.
    pub fn fresh_text(&self) -> &str {
        match self.text.char_indices().nth(self.overlap_len) {
            Some((byte_idx, _)) => &self.text[byte_idx..],
            None => "",
        }
    }
}

/// A chunk scored against a query. Ephemeral, produced per query.
#[derive(Debug, Clone, Serialize)]
pub struct RankedMatch {
    pub chunk: Chunk,
    pub relevance_score: f64,
}

/// One source document that contributed to an answer.
#[derive(Debug, Clone, Serialize)]
pub struct SourceAttribution {
    /// The document's display name.
    pub source: String,
    /// Best relevance score among its contributing chunks.
    pub relevance: f64,
}

/// What went wrong during synthesis. Returned as data, never thrown past
/// the synthesizer boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The model client is not configured; the feature is disabled.
    Disabled,
    /// The model call did not complete within the deadline.
    Timeout,
    /// The model call failed or returned a non-success status.
    Transport,
    /// The model responded but its payload could not be interpreted.
    Parse,
}

/// A synthesis failure with a human-readable message.
#[derive(Debug, Clone, Serialize)]
pub struct AnswerFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl std::fmt::Display for AnswerFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.kind {
            FailureKind::Disabled => "disabled",
            FailureKind::Timeout => "timeout",
            FailureKind::Transport => "transport",
            FailureKind::Parse => "parse",
        };
        write!(f, "{}: {}", kind, self.message)
    }
}

/// The externally visible response for an `ask` or `summarize` call.
///
/// `confidence` is always in `[0, 100]`; `grounded` is derived from the
/// match score distribution, never set independently. On failure,
/// `answer_text` is empty and `error` carries the failure.
#[derive(Debug, Clone, Serialize)]
pub struct AnswerResult {
    pub answer_text: String,
    pub sources: Vec<SourceAttribution>,
    pub confidence: f64,
    pub grounded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<AnswerFailure>,
}
