//! Filesystem corpus loader for the CLI.
//!
//! Scans a configured root for plain-text documents (`**/*.md`,
//! `**/*.txt` by default) and turns each file into a [`SourceDocument`].
//! Binary formats (PDF, office documents) are out of scope here; their
//! adapters live with the host application and hand this crate plain text.

use anyhow::{bail, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::Path;
use walkdir::WalkDir;

use crate::config::CorpusConfig;
use crate::models::SourceDocument;

/// Load every matching file under the corpus root, in deterministic
/// (path-sorted) order.
pub fn load_corpus(config: &CorpusConfig) -> Result<Vec<SourceDocument>> {
    let root = &config.root;
    if !root.exists() {
        bail!("Corpus root does not exist: {}", root.display());
    }

    let include_set = build_globset(&config.include_globs)?;

    let mut default_excludes = vec![
        "**/.git/**".to_string(),
        "**/target/**".to_string(),
        "**/node_modules/**".to_string(),
    ];
    default_excludes.extend(config.exclude_globs.clone());
    let exclude_set = build_globset(&default_excludes)?;

    let mut docs = Vec::new();

    let walker = WalkDir::new(root).follow_links(config.follow_symlinks);
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        let rel_str = relative.to_string_lossy().to_string();

        if exclude_set.is_match(&rel_str) {
            continue;
        }
        if !include_set.is_match(&rel_str) {
            continue;
        }

        docs.push(file_to_document(path, &rel_str));
    }

    docs.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(docs)
}

fn file_to_document(path: &Path, relative_path: &str) -> SourceDocument {
    let raw_content = std::fs::read_to_string(path).unwrap_or_default();
    let display_name = path
        .file_stem()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| relative_path.to_string());

    SourceDocument {
        id: relative_path.to_string(),
        display_name,
        raw_content,
    }
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}
