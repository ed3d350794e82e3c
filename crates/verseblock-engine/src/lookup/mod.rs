/*!
 * # Lookup Channel
 *
 * The verse-lookup host lives in an external process and is reachable only
 * via message passing: one outbound request per submission, and results
 * delivered as an undifferentiated broadcast that carries nothing but the
 * originating request id. This module owns both sides of that seam:
 *
 * - [`wire`]: the serde message types (`bible:lookup` request, broadcast
 *   result with its optional payload) and the [`wire::OutboundSink`] trait
 *   the host transport implements
 * - [`correlator`]: request-id generation and the [`correlator::LookupSession`]
 *   dispatcher that keeps an explicit pending-request table, routing each
 *   broadcast result to the one block that asked for it and discarding
 *   stale, duplicate and foreign-id results as an explicit, non-error
 *   outcome
 */

pub mod correlator;
pub mod wire;

pub use correlator::{DispatchOutcome, LookupSession, SubmitOutcome, generate_id};
pub use wire::{ChannelError, LookupPayload, LookupRequest, LookupResult, OutboundSink, RawText};
