//! Persisted attribute schema: one `<bible-verse>` element per block in the
//! document's serialized tree, with a flat set of string attributes.
//!
//! On read, a non-empty `verses` attribute takes precedence; `text` is kept
//! in parallel as a newline-joined fallback for older consumers or partial
//! data loss. Reading is tolerant throughout: unparsable numbers are
//! dropped, an unknown status falls back to `input` and a corrupted `verses`
//! value falls back to `text`.

use std::collections::HashMap;

use crate::blocks::codec;
use crate::blocks::model::{BlockId, BlockStatus, VerseBlock};

/// Tag of the persisted element
pub const ELEMENT_TAG: &str = "bible-verse";

pub const ATTR_ID: &str = "id";
pub const ATTR_STATUS: &str = "status";
pub const ATTR_BOOK: &str = "book";
pub const ATTR_BOOK_NAME: &str = "book-name";
pub const ATTR_CHAPTER: &str = "chapter";
pub const ATTR_VERSE: &str = "verse";
pub const ATTR_START: &str = "start";
pub const ATTR_END: &str = "end";
pub const ATTR_TEXT: &str = "text";
pub const ATTR_VERSES: &str = "verses";

/// Flatten a block into its persisted attribute set, in a stable order,
/// omitting empty optionals
pub fn to_attrs(block: &VerseBlock) -> Vec<(&'static str, String)> {
    let mut attrs = vec![
        (ATTR_ID, block.id.to_string()),
        (ATTR_STATUS, block.status.as_str().to_string()),
    ];
    if let Some(book) = &block.book {
        attrs.push((ATTR_BOOK, book.clone()));
    }
    if let Some(name) = &block.book_name {
        attrs.push((ATTR_BOOK_NAME, name.clone()));
    }
    for (name, value) in [
        (ATTR_CHAPTER, block.chapter),
        (ATTR_VERSE, block.verse),
        (ATTR_START, block.start),
        (ATTR_END, block.end),
    ] {
        if let Some(value) = value {
            attrs.push((name, value.to_string()));
        }
    }

    // Human-readable fallback alongside the canonical encoding
    let pairs = codec::project_display_pairs(block);
    if !pairs.is_empty() {
        let joined = pairs
            .iter()
            .map(|pair| pair.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        attrs.push((ATTR_TEXT, joined));
    }
    let encoded = codec::encode_verses(&block.canonical_verses);
    if !encoded.is_empty() {
        attrs.push((ATTR_VERSES, encoded));
    }
    attrs
}

/// Rebuild a block from a persisted attribute map
pub fn from_attrs(attrs: &HashMap<String, String>) -> VerseBlock {
    let get = |name: &str| attrs.get(name).filter(|value| !value.is_empty()).cloned();
    let get_num = |name: &str| get(name).and_then(|value| value.parse::<u32>().ok());

    let id = get(ATTR_ID).map(BlockId::from).unwrap_or_else(BlockId::fresh);
    let status = get(ATTR_STATUS)
        .and_then(|value| BlockStatus::parse(&value))
        .unwrap_or(BlockStatus::Input);

    let canonical_verses = get(ATTR_VERSES)
        .map(|raw| codec::decode_verses(&raw))
        .unwrap_or_default();
    let raw_lines = if canonical_verses.is_empty() {
        get(ATTR_TEXT)
            .map(|text| text.lines().map(str::to_string).collect())
            .unwrap_or_default()
    } else {
        Vec::new()
    };

    VerseBlock {
        id,
        status,
        book: get(ATTR_BOOK),
        book_name: get(ATTR_BOOK_NAME),
        chapter: get_num(ATTR_CHAPTER),
        verse: get_num(ATTR_VERSE),
        start: get_num(ATTR_START),
        end: get_num(ATTR_END),
        canonical_verses,
        raw_lines,
    }
}

/// Render the block's element as it appears inside the serialized document
pub fn to_element(block: &VerseBlock) -> String {
    let mut out = String::new();
    out.push('<');
    out.push_str(ELEMENT_TAG);
    for (name, value) in to_attrs(block) {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&html_escape::encode_double_quoted_attribute(&value));
        out.push('"');
    }
    out.push_str("></");
    out.push_str(ELEMENT_TAG);
    out.push('>');
    out
}
