//! Conversion between canonical verse data and the persisted attribute
//! encoding.
//!
//! The multi-verse form is a JSON array of `{verse, text}` objects,
//! percent-encoded so it survives embedding as a quoted attribute value in
//! markup that may itself use percent-style escaping. Decoding is tolerant:
//! every failure path yields an empty sequence and the caller falls back to
//! the legacy `text` attribute.

use serde_json::Value;

use crate::blocks::model::{VerseBlock, VersePair};

/// Static book code → display name table. Only `"01"` has a built-in
/// mapping; unknown codes resolve to the empty string.
const BOOK_NAMES: &[(&str, &str)] = &[("01", "Genesis")];

/// Encode verse pairs as a percent-encoded JSON array
///
/// Empty input encodes to the empty string.
pub fn encode_verses(pairs: &[VersePair]) -> String {
    if pairs.is_empty() {
        return String::new();
    }
    match serde_json::to_string(pairs) {
        Ok(json) => urlencoding::encode(&json).into_owned(),
        Err(_) => String::new(),
    }
}

/// Decode a persisted `verses` attribute back into verse pairs
///
/// Percent-decodes, parses as JSON and keeps only the elements that are a
/// valid `(number, string)` pair, preserving array order. Malformed
/// percent-encoding, invalid JSON or a non-array root all yield an empty
/// sequence; this function never fails loudly.
pub fn decode_verses(raw: &str) -> Vec<VersePair> {
    if raw.is_empty() {
        return Vec::new();
    }
    let decoded = match urlencoding::decode(raw) {
        Ok(decoded) => decoded,
        Err(_) => return Vec::new(),
    };
    let root: Value = match serde_json::from_str(&decoded) {
        Ok(root) => root,
        Err(_) => return Vec::new(),
    };
    let Value::Array(items) = root else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| {
            let verse = u32::try_from(item.get("verse")?.as_u64()?).ok()?;
            let text = item.get("text")?.as_str()?;
            Some(VersePair::new(verse, text))
        })
        .collect()
}

/// Ordered `(verse, text)` pairs to render for a block
///
/// Canonical verses win when present. Otherwise the legacy lines are
/// numbered from the block's `verse` (default 1), incrementing by one per
/// line. The fallback path supports content authored before the multi-verse
/// format existed.
pub fn project_display_pairs(block: &VerseBlock) -> Vec<VersePair> {
    if !block.canonical_verses.is_empty() {
        return block.canonical_verses.clone();
    }
    let base = block.verse.unwrap_or(1);
    block
        .raw_lines
        .iter()
        .enumerate()
        .map(|(offset, line)| VersePair::new(base + offset as u32, line.clone()))
        .collect()
}

/// Resolve the display name for a book code
///
/// An explicit name always wins; otherwise the static code table is
/// consulted. Unknown codes never raise an error, they resolve to the empty
/// string.
pub fn resolve_book_name(book: Option<&str>, explicit: Option<&str>) -> String {
    if let Some(name) = explicit {
        return name.to_string();
    }
    book.and_then(|code| BOOK_NAMES.iter().find(|(known, _)| *known == code))
        .map(|(_, name)| (*name).to_string())
        .unwrap_or_default()
}
