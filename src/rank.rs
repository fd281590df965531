//! Lexical relevance ranking over pooled document chunks.
//!
//! No embeddings: scoring is term overlap weighted by term rarity across
//! the candidate chunk set, with a bonus for exact phrase containment.
//!
//! # Scoring
//!
//! 1. Tokenize query and chunks (case-fold, strip punctuation).
//! 2. For each query term, `idf = ln(1 + N / df)` where `N` is the pooled
//!    chunk count and `df` the number of chunks containing the term.
//! 3. Chunk score = Σ over matched query terms of `idf × (1 + ln(tf))`.
//! 4. Chunks whose token stream contains the full query phrase get a
//!    1.5× bonus.
//! 5. Sort by score (desc), document insertion order (asc), sequence
//!    index (asc); truncate to `top_k`. Cross-document ties go to the
//!    earlier-inserted document, within a document to the earlier chunk.
//!
//! Zero-scoring chunks are excluded, so an empty result is the "nothing
//! relevant" signal rather than an error.

use std::collections::HashMap;
use std::sync::Arc;

use crate::models::{IndexedDocument, RankedMatch};

/// Multiplier applied when a chunk contains the exact query phrase.
const PHRASE_BONUS: f64 = 1.5;

/// Lowercased alphanumeric tokens, punctuation stripped.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

/// Score every chunk across `documents` against `query` and return the
/// ordered top-K. Operates over chunks pooled from all documents, so a
/// query may be answered by any subset of the corpus.
pub fn rank(
    query: &str,
    documents: &[Arc<IndexedDocument>],
    top_k: usize,
) -> Vec<RankedMatch> {
    let query_tokens = tokenize(query);
    if query_tokens.is_empty() || top_k == 0 {
        return Vec::new();
    }
    let query_phrase = query_tokens.join(" ");

    // Distinct query terms; repeated terms in the query do not double-count.
    let mut query_terms: Vec<&str> = query_tokens.iter().map(|t| t.as_str()).collect();
    query_terms.sort_unstable();
    query_terms.dedup();

    // Pool chunks in document insertion order, tokenizing each once.
    struct PooledChunk<'a> {
        doc_order: usize,
        chunk: &'a crate::models::Chunk,
        term_counts: HashMap<String, usize>,
        phrase: String,
    }

    let mut pool = Vec::new();
    for (doc_order, doc) in documents.iter().enumerate() {
        for chunk in &doc.chunks {
            let tokens = tokenize(&chunk.text);
            let mut term_counts: HashMap<String, usize> = HashMap::new();
            for t in &tokens {
                *term_counts.entry(t.clone()).or_insert(0) += 1;
            }
            pool.push(PooledChunk {
                doc_order,
                chunk,
                phrase: tokens.join(" "),
                term_counts,
            });
        }
    }
    if pool.is_empty() {
        return Vec::new();
    }

    // Document frequency of each query term across the pooled chunk set.
    let n = pool.len() as f64;
    let mut df: HashMap<&str, usize> = HashMap::new();
    for term in &query_terms {
        let count = pool
            .iter()
            .filter(|pc| pc.term_counts.contains_key(*term))
            .count();
        if count > 0 {
            df.insert(term, count);
        }
    }

    let multi_term = query_terms.len() > 1;
    let mut matches: Vec<(f64, usize, RankedMatch)> = Vec::new();
    for pc in &pool {
        let mut score = 0.0;
        // Iterate the sorted term list so float accumulation order is
        // stable across calls.
        for term in &query_terms {
            let Some(count) = df.get(term) else { continue };
            if let Some(tf) = pc.term_counts.get(*term) {
                let idf = (1.0 + n / *count as f64).ln();
                score += idf * (1.0 + (*tf as f64).ln());
            }
        }
        if score <= 0.0 {
            continue;
        }
        if multi_term && contains_phrase(&pc.phrase, &query_phrase) {
            score *= PHRASE_BONUS;
        }
        matches.push((
            score,
            pc.doc_order,
            RankedMatch {
                chunk: pc.chunk.clone(),
                relevance_score: score,
            },
        ));
    }

    matches.sort_by(|a, b| {
        b.0.partial_cmp(&a.0)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.1.cmp(&b.1))
            .then(a.2.chunk.sequence_index.cmp(&b.2.chunk.sequence_index))
    });
    matches.truncate(top_k);
    matches.into_iter().map(|(_, _, m)| m).collect()
}

/// Whole-token phrase containment over normalized token streams.
fn contains_phrase(haystack: &str, needle: &str) -> bool {
    if haystack == needle {
        return true;
    }
    haystack.starts_with(&format!("{} ", needle))
        || haystack.ends_with(&format!(" {}", needle))
        || haystack.contains(&format!(" {} ", needle))
}
