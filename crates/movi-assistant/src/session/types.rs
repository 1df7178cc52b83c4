//! Session types and concurrency guards.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::Message;

/// Starter prompts offered while the conversation holds only seed messages.
pub const QUICK_ACTIONS: &[&str] = &[
    "Show unassigned vehicles",
    "Create a new route",
    "What trips need attention?",
];

/// Result of one `send_message` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Empty input without an image; nothing changed.
    Rejected,
    /// Another send is in flight; nothing changed.
    Busy,
    /// The reply (or the apology) that was appended.
    Replied(Message),
}

/// Owned copy of the session state for observers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub messages: Vec<Message>,
    pub is_loading: bool,
}

#[derive(Debug, Default)]
pub(crate) struct SessionState {
    pub(crate) messages: Vec<Message>,
    pub(crate) is_loading: bool,
    /// Number of leading seed messages (e.g. the greeting).
    pub(crate) seed_len: usize,
}

impl SessionState {
    pub(crate) fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            messages: self.messages.clone(),
            is_loading: self.is_loading,
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct SpeechState {
    pub(crate) tts_enabled: bool,
    /// Index of the last message handed to the speaker (or deliberately skipped).
    pub(crate) last_spoken_index: Option<usize>,
}

/// Guard that clears the `busy` flag on drop, ensuring it is always released
/// even if the future is cancelled or an early return occurs.
pub(crate) struct BusyGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> BusyGuard<'a> {
    /// Attempt to acquire the busy flag. Returns `None` if a send is in flight.
    pub(crate) fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
