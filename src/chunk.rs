//! Paragraph-boundary text chunker with an overlap window.
//!
//! Splits canonical document text into [`Chunk`]s that respect a
//! `max_chars` limit. Splitting occurs on paragraph boundaries (`\n\n`) to
//! preserve semantic coherence; a hard split at a whitespace boundary is
//! the fallback for a single paragraph that exceeds the limit.
//!
//! Adjacent chunks share an overlap window: each chunk after the first is
//! prefixed with the word-aligned tail of the previous chunk, and records
//! how many chars that prefix occupies ([`Chunk::overlap_len`]). This keeps
//! concepts that straddle a boundary retrievable from either side while
//! preserving the round-trip property: concatenating fresh spans in
//! `sequence_index` order reproduces the input up to whitespace
//! normalization.
//!
//! Chunking is deterministic: the same text and parameters always yield
//! byte-identical chunk sequences.

use crate::models::Chunk;

/// Split canonical text into chunks.
///
/// # Arguments
///
/// * `source_id` / `source_name` — identity and display name stamped on
///   every chunk for attribution.
/// * `max_chars` — maximum chars of fresh text per chunk (overlap prefix
///   not counted).
/// * `overlap_chars` — chars of the previous chunk carried into the next;
///   must be smaller than `max_chars` (enforced by config validation).
///
/// # Guarantees
///
/// - Empty or whitespace-only text yields no chunks.
/// - `sequence_index` is contiguous: `0, 1, 2, …`.
/// - Splits land on `\n\n` boundaries when possible; oversized paragraphs
///   are hard-split at whitespace, snapped to UTF-8 char boundaries.
pub fn chunk_document(
    source_id: &str,
    source_name: &str,
    text: &str,
    max_chars: usize,
    overlap_chars: usize,
) -> Vec<Chunk> {
    let segments = split_segments(text, max_chars);

    let mut chunks = Vec::with_capacity(segments.len());
    for (i, segment) in segments.iter().enumerate() {
        let (text, overlap_len) = if i == 0 || overlap_chars == 0 {
            (segment.clone(), 0)
        } else {
            let tail = overlap_tail(&segments[i - 1], overlap_chars);
            if tail.is_empty() {
                (segment.clone(), 0)
            } else {
                // Prefix chars = tail chars + the joining space.
                let prefix_chars = tail.chars().count() + 1;
                (format!("{} {}", tail, segment), prefix_chars)
            }
        };
        chunks.push(Chunk {
            source_id: source_id.to_string(),
            source_name: source_name.to_string(),
            text,
            sequence_index: i,
            overlap_len,
        });
    }
    chunks
}

/// Accumulate paragraphs into segments of at most `max_chars` chars,
/// hard-splitting paragraphs that are individually oversized.
fn split_segments(text: &str, max_chars: usize) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut current_chars = 0usize;

    for para in text.split("\n\n") {
        let trimmed = para.trim();
        if trimmed.is_empty() {
            continue;
        }
        let para_chars = trimmed.chars().count();

        let would_be = if current.is_empty() {
            para_chars
        } else {
            current_chars + 2 + para_chars
        };

        if would_be > max_chars && !current.is_empty() {
            segments.push(std::mem::take(&mut current));
            current_chars = 0;
        }

        if para_chars > max_chars {
            if !current.is_empty() {
                segments.push(std::mem::take(&mut current));
                current_chars = 0;
            }
            hard_split(trimmed, max_chars, &mut segments);
        } else {
            if !current.is_empty() {
                current.push_str("\n\n");
                current_chars += 2;
            }
            current.push_str(trimmed);
            current_chars += para_chars;
        }
    }

    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

/// Split one oversized paragraph at whitespace boundaries, never mid-char.
fn hard_split(paragraph: &str, max_chars: usize, out: &mut Vec<String>) {
    let mut remaining = paragraph;
    while !remaining.is_empty() {
        let mut split_at = byte_index_at_char(remaining, max_chars);
        if split_at < remaining.len() {
            if let Some(pos) = remaining[..split_at]
                .rfind('\n')
                .or_else(|| remaining[..split_at].rfind(' '))
            {
                split_at = pos + 1;
            }
        }
        // A single token longer than max_chars still has to advance.
        if split_at == 0 {
            split_at = byte_index_at_char(remaining, 1);
        }
        let piece = remaining[..split_at].trim();
        if !piece.is_empty() {
            out.push(piece.to_string());
        }
        remaining = &remaining[split_at..];
    }
}

/// The byte index of the `chars`-th char of `s`, or `s.len()` past the end.
fn byte_index_at_char(s: &str, chars: usize) -> usize {
    s.char_indices().nth(chars).map(|(i, _)| i).unwrap_or(s.len())
}

/// The word-aligned tail of `segment`, at most `overlap_chars` chars.
fn overlap_tail(segment: &str, overlap_chars: usize) -> &str {
    let total = segment.chars().count();
    if total <= overlap_chars {
        return segment;
    }
    let start = segment
        .char_indices()
        .nth(total - overlap_chars)
        .map(|(i, _)| i)
        .unwrap_or(0);
    // Advance to the next word start so the overlap begins cleanly.
    match segment[start..].find(char::is_whitespace) {
        Some(ws) => segment[start + ws..].trim_start(),
        None => &segment[start..],
    }
}
