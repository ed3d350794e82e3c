/*!
 * # Citation Block Core
 *
 * A scriptural-citation block starts as free text, resolves asynchronously
 * through an external lookup host, and persists as a self-contained element
 * in the document's serialized tree. This module owns the block side of that
 * story:
 *
 * ## 1. Four-State Lifecycle
 * - Every block moves `input → loading → resolved | error` and never leaves
 *   a terminal state; retrying means minting a new block with a fresh id
 * - Transitions happen synchronously in response to exactly two events: a
 *   user submission and the arrival of a matching lookup result
 *
 * ## 2. Canonical Verse Data
 * - Once resolved, the ordered `(verse, text)` pairs in
 *   [`model::VerseBlock::canonical_verses`] are the single source of truth
 * - The legacy single-string form is normalized into lines exactly once at
 *   the model boundary; nothing downstream branches on its shape
 *
 * ## 3. Persistence Codec
 * - [`codec`] converts canonical verses to/from the percent-encoded JSON
 *   `verses` attribute and projects display pairs for rendering, falling
 *   back to the legacy `text` attribute when needed
 * - [`attrs`] maps a block to/from the flat attribute set carried by its
 *   `<bible-verse>` element; decoding is tolerant and never fails loudly
 *
 * Correlation of lookup requests and broadcast results lives in
 * [`crate::lookup`]; rendering and the host editor framework are out of
 * scope entirely.
 */

pub mod attrs;
pub mod codec;
pub mod machine;
pub mod model;
pub mod trigger;

// Public API re-exports
pub use machine::{BlockStateMachine, Transition};
pub use model::{BlockId, BlockStatus, VerseBlock, VersePair};
