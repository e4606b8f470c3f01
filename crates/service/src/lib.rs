//! Service layer for the unlock relay.
//! - `storage`: generic JSON document persistence with serialized writes.
//! - `unlock`: the unlock/subscription store and its manual request queue.
//! - `errors`: error taxonomy surfaced to the HTTP layer.

pub mod errors;
pub mod runtime;
pub mod storage;
pub mod unlock;
