//! Session struct, construction and read access.

use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};

use movi_common::{Event, EventBus, SessionId};
use tokio::sync::watch;
use tracing::info;

use crate::speech::Speaker;
use crate::{AgentClient, Message};

use super::types::{SessionSnapshot, SessionState, SpeechState, QUICK_ACTIONS};

/// One conversation with the Movi agent.
pub struct Session {
    pub(super) id: SessionId,
    pub(super) client: AgentClient,
    /// Message log and loading flag. Never held across an `.await`.
    pub(super) state: Mutex<SessionState>,
    /// Set while a send is in flight.
    pub(super) busy: AtomicBool,
    pub(super) snapshot_tx: watch::Sender<SessionSnapshot>,
    /// Locked before `state` when both are needed.
    pub(super) speech: Mutex<SpeechState>,
    pub(super) speaker: Option<Arc<Speaker>>,
    pub(super) events: Option<Arc<EventBus>>,
}

impl Session {
    pub fn new(client: AgentClient) -> Self {
        let (snapshot_tx, _) = watch::channel(SessionSnapshot::default());
        let id = SessionId::new();
        info!(session = %id.short(), "session created");
        Self {
            id,
            client,
            state: Mutex::new(SessionState::default()),
            busy: AtomicBool::new(false),
            snapshot_tx,
            speech: Mutex::new(SpeechState::default()),
            speaker: None,
            events: None,
        }
    }

    /// Start the log with `seed` (typically the greeting). Seed messages are
    /// never spoken.
    pub fn with_seed(mut self, seed: Vec<Message>) -> Self {
        let state = self.state.get_mut().unwrap_or_else(|e| e.into_inner());
        state.seed_len = seed.len();
        state.messages = seed;
        self.snapshot_tx.send_replace(state.snapshot());

        let speech = self.speech.get_mut().unwrap_or_else(|e| e.into_inner());
        speech.last_spoken_index = state.seed_len.checked_sub(1);
        self
    }

    pub fn with_speaker(mut self, speaker: Arc<Speaker>) -> Self {
        self.speaker = Some(speaker);
        self
    }

    pub fn with_event_bus(mut self, events: Arc<EventBus>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn with_tts(mut self, enabled: bool) -> Self {
        self.speech
            .get_mut()
            .unwrap_or_else(|e| e.into_inner())
            .tts_enabled = enabled;
        self
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Copy of the full conversation log.
    pub fn messages(&self) -> Vec<Message> {
        self.lock_state().messages.clone()
    }

    pub fn message_count(&self) -> usize {
        self.lock_state().messages.len()
    }

    pub fn is_loading(&self) -> bool {
        self.lock_state().is_loading
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.lock_state().snapshot()
    }

    /// Receiver that sees a new snapshot after every state change.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Starter prompts, offered only until the first user message.
    pub fn quick_actions(&self) -> &'static [&'static str] {
        let state = self.lock_state();
        if state.messages.len() <= state.seed_len {
            QUICK_ACTIONS
        } else {
            &[]
        }
    }

    pub(super) fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub(super) fn lock_speech(&self) -> MutexGuard<'_, SpeechState> {
        self.speech.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub(super) fn publish(&self, state: &SessionState) {
        self.snapshot_tx.send_replace(state.snapshot());
    }

    pub(super) fn emit(&self, event: Event) {
        if let Some(events) = &self.events {
            events.publish(event);
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        let tts_enabled = self
            .speech
            .get_mut()
            .map(|s| s.tts_enabled)
            .unwrap_or(false);
        if let (true, Some(speaker)) = (tts_enabled, &self.speaker) {
            speaker.cancel_current();
        }
    }
}
