use thiserror::Error;

use crate::blocks::model::{BlockId, BlockStatus, VerseBlock};
use crate::lookup::wire::LookupPayload;

/// Outcome of applying a lookup result to a block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Resolved,
    Errored,
    /// The block was not in `loading`; terminal states absorb all events
    Ignored,
}

#[derive(Debug, Error)]
pub enum ContinuationError {
    #[error("invalid document position after block {0}")]
    InvalidPosition(BlockId),
    #[error("block {0} is no longer in the document")]
    BlockGone(BlockId),
}

/// Post-resolution continuation: advance the caret past the block, inserting
/// a following empty paragraph if none exists yet
///
/// Best-effort UI affordance. Failures are logged and swallowed by the
/// session; they never affect persisted block state.
pub trait CursorContinuation {
    fn continue_after(&mut self, block: &BlockId) -> Result<(), ContinuationError>;
}

/// Four-state lifecycle around one [`VerseBlock`]
///
/// `input` (initial) → `loading` (on submit) → `resolved` | `error` (on
/// result, terminal). No transition leaves a terminal state; retrying means
/// creating a new block with a fresh id.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockStateMachine {
    block: VerseBlock,
}

impl BlockStateMachine {
    /// New machine around a fresh `input` block
    pub fn new() -> Self {
        Self {
            block: VerseBlock::new_input(),
        }
    }

    /// Adopt an existing block, e.g. one deserialized from a document
    pub fn from_block(block: VerseBlock) -> Self {
        Self { block }
    }

    pub fn id(&self) -> &BlockId {
        &self.block.id
    }

    pub fn block(&self) -> &VerseBlock {
        &self.block
    }

    pub fn into_block(self) -> VerseBlock {
        self.block
    }

    /// Read-only state, used by the host purely for rendering selection
    pub fn current_state(&self) -> BlockStatus {
        self.block.status
    }

    /// `input → loading`; returns false (and changes nothing) from any other
    /// state
    pub(crate) fn begin_loading(&mut self) -> bool {
        if self.block.status != BlockStatus::Input {
            return false;
        }
        self.block.status = BlockStatus::Loading;
        true
    }

    /// Apply a matching lookup result
    ///
    /// The complete resolved field set is built before the block is touched,
    /// so a transition is committed atomically or not at all.
    pub(crate) fn apply_result(&mut self, payload: Option<&LookupPayload>) -> Transition {
        if self.block.status != BlockStatus::Loading {
            return Transition::Ignored;
        }
        let Some(payload) = payload else {
            self.block.status = BlockStatus::Error;
            return Transition::Errored;
        };

        if let Some(verses) = payload.canonical_verses() {
            self.block = VerseBlock {
                id: self.block.id.clone(),
                status: BlockStatus::Resolved,
                book: payload.book.clone(),
                book_name: payload.book_name.clone(),
                chapter: payload.chapter,
                // the first verse of the range mirrors `start`
                verse: payload.start,
                start: payload.start,
                end: payload.end,
                canonical_verses: verses.to_vec(),
                raw_lines: Vec::new(),
            };
            Transition::Resolved
        } else if let Some(text) = payload.text.clone() {
            self.block = VerseBlock {
                id: self.block.id.clone(),
                status: BlockStatus::Resolved,
                book: payload.book.clone(),
                book_name: payload.book_name.clone(),
                chapter: payload.chapter,
                verse: payload.verse,
                start: None,
                end: None,
                canonical_verses: Vec::new(),
                raw_lines: text.into_lines(),
            };
            Transition::Resolved
        } else {
            self.block.status = BlockStatus::Error;
            Transition::Errored
        }
    }
}

impl Default for BlockStateMachine {
    fn default() -> Self {
        Self::new()
    }
}
