//! # Answer Harness
//!
//! A retrieval-grounded answering engine for lesson notes and uploaded
//! documents.
//!
//! Answer Harness grounds natural-language answers in a bounded corpus of
//! user-supplied documents before handing a prompt to an external
//! generative model: documents are normalized to canonical text, split
//! into overlapping chunks, ranked lexically against the query, and the
//! top matches drive both the prompt and a calibrated confidence/grounding
//! signal so callers can warn users when an answer is not actually
//! supported by their material.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   ┌─────────┐   ┌───────────────┐
//! │ Normalizer │──▶│ Chunker │──▶│ DocumentCache │
//! └────────────┘   └─────────┘   └───────┬───────┘
//!                                        │ per query
//!                     ┌──────────────────┤
//!                     ▼                  ▼
//!               ┌──────────┐      ┌───────────┐
//!               │  Ranker  │─────▶│ Grounding │
//!               └────┬─────┘      └─────┬─────┘
//!                    ▼                  ▼
//!               ┌─────────────────────────────┐
//!               │ Prompt Assembler + Generator│
//!               └─────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`blocks`] | Structured note model (tagged block variants) |
//! | [`normalize`] | Blocks → canonical text, content hashing |
//! | [`chunk`] | Overlapping paragraph-boundary chunking |
//! | [`cache`] | Memoized per-document chunk index |
//! | [`rank`] | Lexical TF-IDF-style relevance ranking |
//! | [`grounding`] | Confidence and grounded signal |
//! | [`language`] | Answer-language directive codes |
//! | [`generate`] | Generative model client abstraction |
//! | [`answer`] | Prompt assembly and response synthesis |
//! | [`engine`] | Pipeline orchestration (`ask`, `rank`, `summarize`) |
//! | [`corpus`] | Filesystem corpus loader for the CLI |
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |

pub mod answer;
pub mod blocks;
pub mod cache;
pub mod chunk;
pub mod config;
pub mod corpus;
pub mod engine;
pub mod generate;
pub mod grounding;
pub mod language;
pub mod models;
pub mod normalize;
pub mod rank;
