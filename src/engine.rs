//! Pipeline orchestration: cache → rank → ground → synthesize.
//!
//! [`AnswerEngine`] owns the document cache, the configuration, and the
//! injected generator, and exposes the user-triggered operations: `ask`,
//! `rank`, and `summarize`. Documents are supplied fresh on every call and
//! re-chunked only when the cache's freshness policy says so.

use std::sync::Arc;

use anyhow::Result;

use crate::answer;
use crate::cache::DocumentCache;
use crate::config::{self, Config};
use crate::generate::{create_generator, Generator};
use crate::models::{AnswerResult, IndexedDocument, RankedMatch, SourceDocument};
use crate::rank;

pub struct AnswerEngine {
    config: Config,
    cache: DocumentCache,
    generator: Box<dyn Generator>,
}

impl AnswerEngine {
    /// Build an engine with an injected generator (tests pass mocks here).
    pub fn new(config: Config, generator: Box<dyn Generator>) -> Result<Self> {
        config::validate(&config)?;
        let cache = DocumentCache::new(config.cache.policy()?, config.cache.max_documents);
        Ok(Self {
            config,
            cache,
            generator,
        })
    }

    /// Build an engine with the generator named in the configuration.
    pub fn from_config(config: Config) -> Result<Self> {
        let generator = create_generator(&config.generation)?;
        Self::new(config, generator)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get-or-build the chunk index for every supplied document, in order.
    pub fn index_documents(&mut self, docs: &[SourceDocument]) -> Vec<Arc<IndexedDocument>> {
        docs.iter()
            .map(|doc| self.cache.get_or_build(doc, &self.config.chunking))
            .collect()
    }

    /// Retrieval only: rank all chunks across `docs` against `query`.
    pub fn rank(&mut self, docs: &[SourceDocument], query: &str) -> Vec<RankedMatch> {
        let indexed = self.index_documents(docs);
        rank::rank(query, &indexed, self.config.retrieval.top_k)
    }

    /// Full pipeline: answer `query` from `docs`, in `language` (falls back
    /// to the configured language). Never returns an error; failures arrive
    /// as [`AnswerResult::error`] data.
    pub async fn ask(
        &mut self,
        docs: &[SourceDocument],
        query: &str,
        language: Option<&str>,
    ) -> AnswerResult {
        let matches = self.rank(docs, query);
        let language = language.unwrap_or(&self.config.generation.language);
        answer::synthesize(
            self.generator.as_ref(),
            &self.config.generation,
            &self.config.grounding,
            query,
            &matches,
            language,
        )
        .await
    }

    /// Summarize a single document from its leading chunks.
    pub async fn summarize(
        &mut self,
        doc: &SourceDocument,
        language: Option<&str>,
    ) -> AnswerResult {
        let indexed = self.cache.get_or_build(doc, &self.config.chunking);
        let language = language.unwrap_or(&self.config.generation.language);
        answer::summarize_document(
            self.generator.as_ref(),
            &self.config.generation,
            &indexed,
            self.config.retrieval.top_k,
            language,
        )
        .await
    }

    /// Cached document count, for diagnostics.
    pub fn cached_documents(&self) -> usize {
        self.cache.len()
    }
}
