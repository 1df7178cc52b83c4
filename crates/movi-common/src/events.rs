use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Events emitted by the assistant core for whatever surface is rendering it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Event {
    /// A message landed in the session log at `index`.
    MessageAppended { index: usize, role: String },
    /// The in-flight flag flipped.
    LoadingChanged(bool),
    /// The recognizer produced a new cumulative transcript.
    TranscriptUpdated(String),
    /// Listening ended, either by request or because recognition failed.
    ListeningEnded { error: Option<String> },
}

pub struct EventBus {
    sender: broadcast::Sender<Event>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: Event) -> usize {
        self.sender.send(event).unwrap_or(0)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}
