//! Text normalization: structured pages become one canonical plain-text
//! representation, shared by chunking and ranking.
//!
//! Normalization is total and pure: every block kind maps to some textual
//! fragment (lightweight markdown-style markers for structure, verbatim
//! content for unrecognized kinds), and an empty page yields an empty
//! string. The canonical text is also what gets content-hashed for cache
//! invalidation.

use sha2::{Digest, Sha256};

use crate::blocks::{Block, NotePage};

/// Render a structured page into canonical text.
///
/// Blocks are rendered in order and joined with blank lines, which is also
/// the paragraph boundary the chunker splits on.
pub fn page_to_text(page: &NotePage) -> String {
    let fragments: Vec<String> = page
        .blocks
        .iter()
        .map(block_to_text)
        .filter(|s| !s.is_empty())
        .collect();
    fragments.join("\n\n")
}

fn block_to_text(block: &Block) -> String {
    match block {
        Block::Heading { level, text } => {
            let level = (*level).clamp(1, 3) as usize;
            format!("{} {}", "#".repeat(level), text)
        }
        Block::Paragraph { text } => text.clone(),
        Block::Bullet { text } => format!("- {}", text),
        Block::Numbered { text } => format!("1. {}", text),
        Block::Todo { checked, text } => {
            let mark = if *checked { "[x]" } else { "[ ]" };
            format!("- {} {}", mark, text)
        }
        Block::Code { language, text } => {
            let lang = language.as_deref().unwrap_or("");
            format!("```{}\n{}\n```", lang, text)
        }
        Block::Quote { text } => format!("> {}", text),
        Block::Divider => "---".to_string(),
        Block::Image { url, caption } => match caption {
            Some(c) => format!("[image: {} — {}]", c, url),
            None => format!("[image: {}]", url),
        },
        Block::Raw { content } => content.clone(),
    }
}

/// SHA-256 hex digest of canonical text, computed once at index time and
/// compared on later calls for cache invalidation.
pub fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}
