pub mod blocks;
pub mod lookup;

// Re-export key types for easier usage
pub use blocks::machine::{BlockStateMachine, ContinuationError, CursorContinuation, Transition};
pub use blocks::model::{BlockId, BlockStatus, VerseBlock, VersePair};
pub use blocks::{attrs, codec, trigger};
pub use lookup::correlator::{DispatchOutcome, LookupSession, SubmitOutcome, generate_id};
pub use lookup::wire::{
    ChannelError, LookupPayload, LookupRequest, LookupResult, OutboundSink, RawText,
};
