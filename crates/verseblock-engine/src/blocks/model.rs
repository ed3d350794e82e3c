use std::fmt;

use serde::{Deserialize, Serialize};

use crate::lookup::correlator::generate_id;

/// Lifecycle state of a citation block
///
/// Only ever progresses `input → loading → {resolved | error}`; the two
/// terminal states absorb all further events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockStatus {
    Input,
    Loading,
    Resolved,
    Error,
}

impl BlockStatus {
    /// String form used in the persisted `status` attribute
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockStatus::Input => "input",
            BlockStatus::Loading => "loading",
            BlockStatus::Resolved => "resolved",
            BlockStatus::Error => "error",
        }
    }

    /// Parse the persisted string form; unknown values yield `None`
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "input" => Some(BlockStatus::Input),
            "loading" => Some(BlockStatus::Loading),
            "resolved" => Some(BlockStatus::Resolved),
            "error" => Some(BlockStatus::Error),
            _ => None,
        }
    }

    /// Terminal states never transition again
    pub fn is_terminal(&self) -> bool {
        matches!(self, BlockStatus::Resolved | BlockStatus::Error)
    }
}

impl fmt::Display for BlockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque block identifier, assigned at creation and never reassigned
///
/// Uniqueness scope is one open document/session; the same token doubles as
/// the correlation id on the lookup channel.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct BlockId(pub String);

impl BlockId {
    /// Mint a fresh random id
    pub fn fresh() -> Self {
        BlockId(generate_id())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for BlockId {
    fn from(value: String) -> Self {
        BlockId(value)
    }
}

impl From<&str> for BlockId {
    fn from(value: &str) -> Self {
        BlockId(value.to_string())
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One `(verse number, text)` pair — the canonical verse representation
///
/// Shared by the in-memory model, the JSON `verses` wire field and the
/// percent-encoded `verses` attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersePair {
    pub verse: u32,
    pub text: String,
}

impl VersePair {
    pub fn new(verse: u32, text: impl Into<String>) -> Self {
        Self {
            verse,
            text: text.into(),
        }
    }
}

/// One scriptural-citation block instance
///
/// `canonical_verses` is the single source of truth for rendering once
/// non-empty; `raw_lines` holds the legacy single-string fallback, already
/// normalized into lines at the model boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct VerseBlock {
    pub id: BlockId,
    pub status: BlockStatus,
    pub book: Option<String>,
    pub book_name: Option<String>,
    pub chapter: Option<u32>,
    /// Single verse number, or the first verse of a range (mirrors `start`)
    pub verse: Option<u32>,
    pub start: Option<u32>,
    pub end: Option<u32>,
    pub canonical_verses: Vec<VersePair>,
    pub raw_lines: Vec<String>,
}

impl VerseBlock {
    /// Create a block in the `input` state with a fresh id
    pub fn new_input() -> Self {
        Self::with_id(BlockId::fresh())
    }

    /// Create a block in the `input` state with a caller-supplied id
    pub fn with_id(id: BlockId) -> Self {
        Self {
            id,
            status: BlockStatus::Input,
            book: None,
            book_name: None,
            chapter: None,
            verse: None,
            start: None,
            end: None,
            canonical_verses: Vec::new(),
            raw_lines: Vec::new(),
        }
    }

    /// Human-readable book name for display (explicit name, else the static
    /// code table, else empty)
    pub fn display_book_name(&self) -> String {
        super::codec::resolve_book_name(self.book.as_deref(), self.book_name.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_status_string_forms_round_trip() {
        for status in [
            BlockStatus::Input,
            BlockStatus::Loading,
            BlockStatus::Resolved,
            BlockStatus::Error,
        ] {
            assert_eq!(BlockStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn test_unknown_status_string_is_rejected() {
        assert_eq!(BlockStatus::parse("pending"), None);
        assert_eq!(BlockStatus::parse(""), None);
    }

    #[test]
    fn test_only_resolved_and_error_are_terminal() {
        assert!(!BlockStatus::Input.is_terminal());
        assert!(!BlockStatus::Loading.is_terminal());
        assert!(BlockStatus::Resolved.is_terminal());
        assert!(BlockStatus::Error.is_terminal());
    }

    #[test]
    fn test_new_input_block_starts_empty() {
        let block = VerseBlock::new_input();
        assert_eq!(block.status, BlockStatus::Input);
        assert!(block.canonical_verses.is_empty());
        assert!(block.raw_lines.is_empty());
        assert!(!block.id.as_str().is_empty());
    }

    #[test]
    fn test_fresh_ids_differ_between_blocks() {
        let a = VerseBlock::new_input();
        let b = VerseBlock::new_input();
        assert_ne!(a.id, b.id);
    }
}
