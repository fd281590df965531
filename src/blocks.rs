//! Structured note model: a page is a title plus an ordered list of blocks.
//!
//! Each block kind is a tagged variant carrying exactly the metadata that
//! kind needs (heading level, checkbox state, code language, image URL), so
//! normalization can match exhaustively. [`Block::Raw`] is the identity
//! fallback for content the editor produced but this crate does not model.

use serde::{Deserialize, Serialize};

/// One block of a note page, in reading order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Block {
    /// A heading. Levels beyond 3 render at level 3.
    Heading { level: u8, text: String },
    Paragraph { text: String },
    Bullet { text: String },
    Numbered { text: String },
    Todo { checked: bool, text: String },
    Code {
        language: Option<String>,
        text: String,
    },
    Quote { text: String },
    Divider,
    Image {
        url: String,
        caption: Option<String>,
    },
    /// Unrecognized block kind; content is emitted verbatim.
    Raw { content: String },
}

/// A structured note page as supplied by the editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotePage {
    pub id: String,
    pub title: String,
    pub blocks: Vec<Block>,
}
