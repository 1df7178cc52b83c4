//! Conversation session management.
//!
//! A `Session` owns the ordered message log and the in-flight flag of one
//! chat surface. It appends the user's message optimistically, asks the
//! agent for a reply, appends that reply, and optionally speaks it.

mod chat;
mod manager;
mod speech;
mod types;


pub use manager::Session;
pub use types::{SendOutcome, SessionSnapshot, QUICK_ACTIONS};
