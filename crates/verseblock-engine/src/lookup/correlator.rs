//! Request-id generation and broadcast-result correlation.
//!
//! The host addresses lookups only by id and has no callback binding to a
//! specific block, so a single dispatcher keeps an explicit table of pending
//! request ids. Every broadcast result pops its table entry (or is reported
//! as [`DispatchOutcome::NoPending`]) instead of every live block filtering
//! the whole event stream for its own id.

use std::collections::{HashMap, HashSet};

use rand::Rng;
use rand::distributions::Alphanumeric;

use crate::blocks::machine::{BlockStateMachine, CursorContinuation, Transition};
use crate::blocks::model::{BlockId, VerseBlock};
use crate::lookup::wire::{LookupRequest, LookupResult, OutboundSink};

/// Length of generated request ids
pub const ID_LENGTH: usize = 9;

/// Generate a short random alphanumeric token for a new block
///
/// Non-cryptographic by design: the contract is "practically unique within
/// one editing session", nothing stronger.
pub fn generate_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(ID_LENGTH)
        .map(char::from)
        .collect()
}

/// Outcome of a submission attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Block moved to `loading` and exactly one request was emitted
    Submitted,
    /// Block is already `loading`; no duplicate outbound message
    AlreadyPending,
    /// Block is in a terminal state; retrying requires a new block
    NotSubmittable,
    /// No live block with this id
    UnknownBlock,
}

/// Outcome of dispatching one broadcast result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Resolved(BlockId),
    Errored(BlockId),
    /// No pending request matches this id: a stale, duplicate or foreign
    /// result. Discarded silently; this is not an error.
    NoPending,
}

/// Session-wide dispatcher owning the live block machines and the pending
/// request table
///
/// All transitions happen synchronously inside [`submit`](Self::submit) and
/// [`on_result`](Self::on_result); there is no timeout and no cancellation,
/// so a block whose result never arrives stays `loading` indefinitely.
pub struct LookupSession<S: OutboundSink> {
    sink: S,
    machines: HashMap<BlockId, BlockStateMachine>,
    pending: HashSet<BlockId>,
    continuation: Option<Box<dyn CursorContinuation>>,
}

impl<S: OutboundSink> LookupSession<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            machines: HashMap::new(),
            pending: HashSet::new(),
            continuation: None,
        }
    }

    /// Install the post-resolution caret continuation
    pub fn set_continuation(&mut self, continuation: Box<dyn CursorContinuation>) {
        self.continuation = Some(continuation);
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Register a live block; returns its id for later addressing
    pub fn insert(&mut self, machine: BlockStateMachine) -> BlockId {
        let id = machine.id().clone();
        self.machines.insert(id.clone(), machine);
        id
    }

    /// Remove a block from the session, releasing any pending entry so a
    /// late result cannot act on a stale id
    pub fn remove(&mut self, id: &BlockId) -> Option<BlockStateMachine> {
        self.pending.remove(id);
        self.machines.remove(id)
    }

    pub fn block(&self, id: &BlockId) -> Option<&VerseBlock> {
        self.machines.get(id).map(BlockStateMachine::block)
    }

    pub fn len(&self) -> usize {
        self.machines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.machines.is_empty()
    }

    /// Submit a lookup for a block in `input`
    ///
    /// Marks the id pending, emits exactly one request and returns without
    /// blocking. A failed send is logged and the block stays `loading`;
    /// transport reliability is the host's problem.
    pub fn submit(&mut self, id: &BlockId, query: &str) -> SubmitOutcome {
        let Some(machine) = self.machines.get_mut(id) else {
            return SubmitOutcome::UnknownBlock;
        };
        if machine.current_state().is_terminal() {
            return SubmitOutcome::NotSubmittable;
        }
        if !machine.begin_loading() {
            return SubmitOutcome::AlreadyPending;
        }
        self.pending.insert(id.clone());

        let request = LookupRequest::new(id.as_str(), query);
        if let Err(err) = self.sink.send(&request) {
            log::warn!("lookup request for block {id} was not delivered: {err}");
        }
        SubmitOutcome::Submitted
    }

    /// Dispatch one broadcast result to the block that requested it
    ///
    /// The pending entry is removed first, so a duplicate delivery of the
    /// same result reports [`DispatchOutcome::NoPending`] and mutates
    /// nothing.
    pub fn on_result(&mut self, event: &LookupResult) -> DispatchOutcome {
        let id = BlockId::from(event.id.clone());
        if !self.pending.remove(&id) {
            log::debug!("discarding result for id {id}: no pending request");
            return DispatchOutcome::NoPending;
        }
        let Some(machine) = self.machines.get_mut(&id) else {
            // Pending entry without a machine cannot normally happen, since
            // remove() releases both together
            log::debug!("discarding result for id {id}: block no longer live");
            return DispatchOutcome::NoPending;
        };

        match machine.apply_result(event.result.as_ref()) {
            Transition::Resolved => {
                self.run_continuation(&id);
                DispatchOutcome::Resolved(id)
            }
            Transition::Errored => DispatchOutcome::Errored(id),
            Transition::Ignored => DispatchOutcome::NoPending,
        }
    }

    /// Best-effort caret advance; failure never affects persisted state
    fn run_continuation(&mut self, id: &BlockId) {
        if let Some(continuation) = self.continuation.as_mut()
            && let Err(err) = continuation.continue_after(id)
        {
            log::warn!("post-resolution continuation failed for block {id}: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::machine::ContinuationError;
    use crate::blocks::model::{BlockStatus, VersePair};
    use crate::lookup::wire::{ChannelError, LookupPayload};
    use pretty_assertions::assert_eq;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Sink that records every outbound request
    #[derive(Default)]
    struct RecordingSink {
        sent: Vec<LookupRequest>,
        closed: bool,
    }

    impl OutboundSink for RecordingSink {
        fn send(&mut self, request: &LookupRequest) -> Result<(), ChannelError> {
            if self.closed {
                return Err(ChannelError::Closed);
            }
            self.sent.push(request.clone());
            Ok(())
        }
    }

    struct CountingContinuation(Rc<Cell<usize>>);

    impl CursorContinuation for CountingContinuation {
        fn continue_after(&mut self, _block: &BlockId) -> Result<(), ContinuationError> {
            self.0.set(self.0.get() + 1);
            Ok(())
        }
    }

    struct FailingContinuation;

    impl CursorContinuation for FailingContinuation {
        fn continue_after(&mut self, block: &BlockId) -> Result<(), ContinuationError> {
            Err(ContinuationError::InvalidPosition(block.clone()))
        }
    }

    fn session() -> LookupSession<RecordingSink> {
        LookupSession::new(RecordingSink::default())
    }

    fn verses_result(id: &BlockId) -> LookupResult {
        LookupResult {
            id: id.to_string(),
            result: Some(LookupPayload {
                start: Some(1),
                verses: Some(vec![VersePair::new(1, "A")]),
                ..Default::default()
            }),
        }
    }

    #[test]
    fn test_generated_ids_are_fixed_length_alphanumeric() {
        for _ in 0..32 {
            let id = generate_id();
            assert_eq!(id.len(), ID_LENGTH);
            assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }

    #[test]
    fn test_submit_emits_exactly_one_request() {
        let mut session = session();
        let id = session.insert(BlockStateMachine::new());

        assert_eq!(session.submit(&id, "genesis 1:1"), SubmitOutcome::Submitted);
        assert_eq!(session.block(&id).unwrap().status, BlockStatus::Loading);

        // Repeated submission while loading is a no-op
        assert_eq!(
            session.submit(&id, "genesis 1:1"),
            SubmitOutcome::AlreadyPending
        );

        let sent = &session.sink().sent;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0], LookupRequest::new(id.as_str(), "genesis 1:1"));
    }

    #[test]
    fn test_submit_unknown_block() {
        let mut session = session();
        assert_eq!(
            session.submit(&BlockId::from("nope"), "q"),
            SubmitOutcome::UnknownBlock
        );
        assert!(session.sink().sent.is_empty());
    }

    #[test]
    fn test_submit_after_terminal_state_is_rejected() {
        let mut session = session();
        let id = session.insert(BlockStateMachine::new());
        session.submit(&id, "q");
        session.on_result(&LookupResult::failure(id.as_str()));
        assert_eq!(session.block(&id).unwrap().status, BlockStatus::Error);

        assert_eq!(session.submit(&id, "q"), SubmitOutcome::NotSubmittable);
        assert_eq!(session.sink().sent.len(), 1);
    }

    #[test]
    fn test_foreign_id_result_mutates_nothing() {
        let mut session = session();
        let id = session.insert(BlockStateMachine::new());
        session.submit(&id, "q");

        let foreign = verses_result(&BlockId::from("someoneelse"));
        assert_eq!(session.on_result(&foreign), DispatchOutcome::NoPending);
        assert_eq!(session.block(&id).unwrap().status, BlockStatus::Loading);
    }

    #[test]
    fn test_duplicate_result_is_dispatched_once() {
        let mut session = session();
        let id = session.insert(BlockStateMachine::new());
        session.submit(&id, "q");

        let result = verses_result(&id);
        assert_eq!(
            session.on_result(&result),
            DispatchOutcome::Resolved(id.clone())
        );
        // Second delivery of the same broadcast: pending entry already gone
        assert_eq!(session.on_result(&result), DispatchOutcome::NoPending);
        assert_eq!(session.block(&id).unwrap().status, BlockStatus::Resolved);
    }

    #[test]
    fn test_error_result_is_terminal_and_later_events_ignored() {
        let mut session = session();
        let id = session.insert(BlockStateMachine::new());
        let other = session.insert(BlockStateMachine::new());
        session.submit(&id, "q");
        session.submit(&other, "q2");

        assert_eq!(
            session.on_result(&LookupResult::failure(id.as_str())),
            DispatchOutcome::Errored(id.clone())
        );
        assert_eq!(session.block(&id).unwrap().status, BlockStatus::Error);

        // An unrelated result for a different id leaves the errored block alone
        assert_eq!(
            session.on_result(&verses_result(&other)),
            DispatchOutcome::Resolved(other)
        );
        assert_eq!(session.block(&id).unwrap().status, BlockStatus::Error);
    }

    #[test]
    fn test_removal_releases_pending_entry() {
        let mut session = session();
        let id = session.insert(BlockStateMachine::new());
        session.submit(&id, "q");

        assert!(session.remove(&id).is_some());
        assert!(session.is_empty());

        // Late result for the removed block finds no pending request
        assert_eq!(
            session.on_result(&verses_result(&id)),
            DispatchOutcome::NoPending
        );
    }

    #[test]
    fn test_concurrent_pending_blocks_do_not_interfere() {
        let mut session = session();
        let a = session.insert(BlockStateMachine::new());
        let b = session.insert(BlockStateMachine::new());
        session.submit(&a, "first");
        session.submit(&b, "second");

        assert_eq!(
            session.on_result(&verses_result(&b)),
            DispatchOutcome::Resolved(b.clone())
        );
        assert_eq!(session.block(&a).unwrap().status, BlockStatus::Loading);
        assert_eq!(session.block(&b).unwrap().status, BlockStatus::Resolved);
    }

    #[test]
    fn test_continuation_runs_after_resolution_only() {
        let count = Rc::new(Cell::new(0));
        let mut session = session();
        session.set_continuation(Box::new(CountingContinuation(count.clone())));

        let ok = session.insert(BlockStateMachine::new());
        let bad = session.insert(BlockStateMachine::new());
        session.submit(&ok, "q");
        session.submit(&bad, "q");

        session.on_result(&LookupResult::failure(bad.as_str()));
        assert_eq!(count.get(), 0);

        session.on_result(&verses_result(&ok));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_continuation_failure_does_not_affect_block_state() {
        let mut session = session();
        session.set_continuation(Box::new(FailingContinuation));

        let id = session.insert(BlockStateMachine::new());
        session.submit(&id, "q");
        assert_eq!(
            session.on_result(&verses_result(&id)),
            DispatchOutcome::Resolved(id.clone())
        );
        assert_eq!(session.block(&id).unwrap().status, BlockStatus::Resolved);
    }

    #[test]
    fn test_failed_send_leaves_block_loading() {
        let mut session = LookupSession::new(RecordingSink {
            sent: Vec::new(),
            closed: true,
        });
        let id = session.insert(BlockStateMachine::new());

        assert_eq!(session.submit(&id, "q"), SubmitOutcome::Submitted);
        assert_eq!(session.block(&id).unwrap().status, BlockStatus::Loading);
        assert!(session.sink().sent.is_empty());
    }
}
