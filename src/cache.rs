//! Memoized per-document chunk index.
//!
//! The cache is a plain caller-owned value (no process-global state), keyed
//! by document id and handing out `Arc<IndexedDocument>` so callers can
//! verify that an unchanged document was served without re-chunking.
//!
//! Two freshness policies exist:
//!
//! - [`Invalidation::ContentHash`] (default) — rebuild when the SHA-256 of
//!   the canonical text (or the display name) changes.
//! - [`Invalidation::TitleOnly`] — the original coarse heuristic: rebuild
//!   only when the display name changes. Content edits under an unchanged
//!   title serve stale chunks; this is a documented gap of the mode, kept
//!   for callers that want the cheaper check.
//!
//! Growth is bounded by a least-recently-used document budget.

use std::collections::HashMap;
use std::sync::Arc;

use crate::chunk::chunk_document;
use crate::config::ChunkingConfig;
use crate::models::{IndexedDocument, SourceDocument};
use crate::normalize::content_hash;

/// Cache freshness policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Invalidation {
    /// Rebuild when the content hash or display name changes.
    #[default]
    ContentHash,
    /// Rebuild only when the display name changes.
    TitleOnly,
}

struct CacheEntry {
    indexed: Arc<IndexedDocument>,
    last_used: u64,
}

/// Caller-owned document cache with LRU eviction.
pub struct DocumentCache {
    policy: Invalidation,
    max_documents: usize,
    entries: HashMap<String, CacheEntry>,
    tick: u64,
}

impl DocumentCache {
    /// `max_documents` of 0 is treated as 1; the entry being built is
    /// always retained.
    pub fn new(policy: Invalidation, max_documents: usize) -> Self {
        Self {
            policy,
            max_documents: max_documents.max(1),
            entries: HashMap::new(),
            tick: 0,
        }
    }

    /// Return the cached index for `doc`, rebuilding it if the freshness
    /// policy says the entry is stale.
    pub fn get_or_build(
        &mut self,
        doc: &SourceDocument,
        chunking: &ChunkingConfig,
    ) -> Arc<IndexedDocument> {
        self.tick += 1;
        let tick = self.tick;

        let hash = match self.policy {
            Invalidation::ContentHash => Some(content_hash(&doc.raw_content)),
            Invalidation::TitleOnly => None,
        };

        if let Some(entry) = self.entries.get_mut(&doc.id) {
            let fresh = match (&self.policy, &hash) {
                (Invalidation::ContentHash, Some(h)) => {
                    entry.indexed.content_hash == *h
                        && entry.indexed.display_name == doc.display_name
                }
                _ => entry.indexed.display_name == doc.display_name,
            };
            if fresh {
                entry.last_used = tick;
                return Arc::clone(&entry.indexed);
            }
        }

        let hash = hash.unwrap_or_else(|| content_hash(&doc.raw_content));
        let chunks = chunk_document(
            &doc.id,
            &doc.display_name,
            &doc.raw_content,
            chunking.max_chars,
            chunking.overlap_chars,
        );
        let indexed = Arc::new(IndexedDocument {
            id: doc.id.clone(),
            display_name: doc.display_name.clone(),
            content_hash: hash,
            chunks,
        });

        self.entries.insert(
            doc.id.clone(),
            CacheEntry {
                indexed: Arc::clone(&indexed),
                last_used: tick,
            },
        );
        self.evict_over_budget(&doc.id);

        indexed
    }

    /// Drop least-recently-used entries until the budget holds. The entry
    /// named by `keep` survives even with a budget of 1.
    fn evict_over_budget(&mut self, keep: &str) {
        while self.entries.len() > self.max_documents {
            let victim = self
                .entries
                .iter()
                .filter(|(id, _)| id.as_str() != keep)
                .min_by_key(|(id, e)| (e.last_used, id.clone()))
                .map(|(id, _)| id.clone());
            match victim {
                Some(id) => {
                    self.entries.remove(&id);
                }
                None => break,
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
