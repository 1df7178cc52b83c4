//! Continuous speech-to-text.
//!
//! `Listener::listen` starts a recognition session and returns a `watch`
//! receiver of [`ListenSnapshot`]. The backend pushes cumulative transcripts
//! through a [`TranscriptSink`]; the session ends exactly once, either by
//! `stop()`, by the backend running out of input, or by a recognition error.

use std::sync::{Arc, Mutex};

use movi_common::{Event, EventBus, Notification, PlatformError};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::{Capability, OnceNotice, SpeechError};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ListenState {
    #[default]
    Idle,
    Listening,
    Stopped,
    Failed(String),
}

impl ListenState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ListenState::Stopped | ListenState::Failed(_))
    }
}

/// Latest transcript and where the session is in its lifecycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListenSnapshot {
    pub transcript: String,
    pub state: ListenState,
}

type EndCallback = Arc<dyn Fn(&ListenSnapshot) + Send + Sync>;

struct SinkInner {
    tx: watch::Sender<ListenSnapshot>,
    on_end: Option<EndCallback>,
    events: Option<Arc<EventBus>>,
}

/// Write side of one recognition session, handed to the backend.
#[derive(Clone)]
pub struct TranscriptSink {
    inner: Arc<SinkInner>,
}

impl TranscriptSink {
    pub(crate) fn new(
        on_end: Option<EndCallback>,
        events: Option<Arc<EventBus>>,
    ) -> (Self, watch::Receiver<ListenSnapshot>) {
        let (tx, rx) = watch::channel(ListenSnapshot {
            transcript: String::new(),
            state: ListenState::Listening,
        });
        let sink = Self {
            inner: Arc::new(SinkInner { tx, on_end, events }),
        };
        (sink, rx)
    }

    /// Replace the transcript. Ignored once the session has ended.
    pub fn partial(&self, transcript: impl Into<String>) -> bool {
        let transcript = transcript.into();
        let updated = self.inner.tx.send_if_modified(|snap| {
            if snap.state != ListenState::Listening || snap.transcript == transcript {
                return false;
            }
            snap.transcript.clone_from(&transcript);
            true
        });
        if updated {
            if let Some(events) = &self.inner.events {
                events.publish(Event::TranscriptUpdated(transcript));
            }
        }
        updated
    }

    /// End the session with a recognition error.
    pub fn fail(&self, error: impl Into<String>) -> bool {
        self.finish(ListenState::Failed(error.into()))
    }

    /// End the session normally.
    pub fn end(&self) -> bool {
        self.finish(ListenState::Stopped)
    }

    pub fn is_closed(&self) -> bool {
        self.inner.tx.borrow().state.is_terminal()
    }

    pub fn snapshot(&self) -> ListenSnapshot {
        self.inner.tx.borrow().clone()
    }

    fn finish(&self, state: ListenState) -> bool {
        let mut ended = None;
        self.inner.tx.send_if_modified(|snap| {
            if snap.state.is_terminal() {
                return false;
            }
            snap.state = state;
            ended = Some(snap.clone());
            true
        });
        let Some(snapshot) = ended else {
            return false;
        };

        let error = match &snapshot.state {
            ListenState::Failed(e) => {
                warn!(error = %e, "speech recognition failed");
                Some(e.clone())
            }
            _ => {
                debug!(chars = snapshot.transcript.len(), "listening ended");
                None
            }
        };
        if let Some(on_end) = &self.inner.on_end {
            on_end(&snapshot);
        }
        if let Some(events) = &self.inner.events {
            events.publish(Event::ListeningEnded { error });
        }
        true
    }
}

/// Running recognition session on the backend side.
pub trait RecognitionHandle: Send {
    fn stop(&mut self);
}

/// A speech-to-text engine.
pub trait SpeechRecognizer: Send + Sync {
    fn name(&self) -> &str;

    /// Begin recognising, reporting into `sink` until stopped.
    fn start(&self, sink: TranscriptSink) -> Result<Box<dyn RecognitionHandle>, PlatformError>;
}

struct ActiveListen {
    sink: TranscriptSink,
    handle: Box<dyn RecognitionHandle>,
}

/// Speech input with at most one recognition session at a time.
pub struct Listener {
    backend: Capability<Box<dyn SpeechRecognizer>>,
    active: Mutex<Option<ActiveListen>>,
    on_end: Option<EndCallback>,
    events: Option<Arc<EventBus>>,
    notice: OnceNotice,
}

impl Listener {
    pub fn new(backend: Box<dyn SpeechRecognizer>) -> Self {
        Self::from_capability(Capability::Available(backend))
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::from_capability(Capability::unavailable(reason))
    }

    fn from_capability(backend: Capability<Box<dyn SpeechRecognizer>>) -> Self {
        Self {
            backend,
            active: Mutex::new(None),
            on_end: None,
            events: None,
            notice: OnceNotice::new("Speech input"),
        }
    }

    /// Callback fired once when a session reaches a terminal state.
    ///
    /// Runs on whichever thread ended the session; it must not call back
    /// into this listener.
    pub fn with_on_end(mut self, f: impl Fn(&ListenSnapshot) + Send + Sync + 'static) -> Self {
        self.on_end = Some(Arc::new(f));
        self
    }

    pub fn with_event_bus(mut self, events: Arc<EventBus>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn is_available(&self) -> bool {
        self.backend.is_available()
    }

    /// Start a recognition session.
    ///
    /// A backend that fails to start yields a receiver already in the
    /// `Failed` state rather than an error.
    pub fn listen(&self) -> Result<watch::Receiver<ListenSnapshot>, SpeechError> {
        let Some(backend) = self.backend.as_ref() else {
            return Err(SpeechError::Unsupported("speech recognition"));
        };

        let mut active = self.active.lock().unwrap_or_else(|e| e.into_inner());
        if active.as_ref().is_some_and(|a| !a.sink.is_closed()) {
            return Err(SpeechError::AlreadyListening);
        }

        let (sink, rx) = TranscriptSink::new(self.on_end.clone(), self.events.clone());
        match backend.start(sink.clone()) {
            Ok(handle) => {
                info!(recognizer = backend.name(), "listening");
                *active = Some(ActiveListen { sink, handle });
            }
            Err(e) => {
                *active = None;
                drop(active);
                sink.fail(e.to_string());
            }
        }
        Ok(rx)
    }

    /// Stop the current session and return its final snapshot.
    pub fn stop(&self) -> Option<ListenSnapshot> {
        let mut current = self
            .active
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()?;
        current.handle.stop();
        current.sink.end();
        Some(current.sink.snapshot())
    }

    pub fn is_listening(&self) -> bool {
        self.active
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .is_some_and(|a| !a.sink.is_closed())
    }

    /// One-time notice when no recognizer exists.
    pub fn take_unavailable_notice(&self) -> Option<Notification> {
        self.notice.take(&self.backend)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// Recognizer that keeps the sink so the test can drive it.
    #[derive(Clone, Default)]
    struct ScriptedRecognizer {
        sink: Arc<Mutex<Option<TranscriptSink>>>,
        stops: Arc<AtomicUsize>,
        refuse: bool,
    }

    struct ScriptedHandle {
        stops: Arc<AtomicUsize>,
    }

    impl RecognitionHandle for ScriptedHandle {
        fn stop(&mut self) {
            self.stops.fetch_add(1, Ordering::SeqCst);
        }
    }

    impl SpeechRecognizer for ScriptedRecognizer {
        fn name(&self) -> &str {
            "scripted"
        }

        fn start(
            &self,
            sink: TranscriptSink,
        ) -> Result<Box<dyn RecognitionHandle>, PlatformError> {
            if self.refuse {
                return Err(PlatformError::AudioError("microphone busy".into()));
            }
            *self.sink.lock().unwrap() = Some(sink);
            Ok(Box::new(ScriptedHandle {
                stops: self.stops.clone(),
            }))
        }
    }

    impl ScriptedRecognizer {
        fn sink(&self) -> TranscriptSink {
            self.sink.lock().unwrap().clone().unwrap()
        }
    }

    #[test]
    fn partials_replace_transcript() {
        let backend = ScriptedRecognizer::default();
        let listener = Listener::new(Box::new(backend.clone()));
        let rx = listener.listen().unwrap();

        let sink = backend.sink();
        assert!(sink.partial("show"));
        assert!(sink.partial("show unassigned vehicles"));
        assert_eq!(rx.borrow().transcript, "show unassigned vehicles");
        assert_eq!(rx.borrow().state, ListenState::Listening);
        assert!(listener.is_listening());
    }

    #[test]
    fn stop_ends_session_and_fires_callback_once() {
        let ended = Arc::new(AtomicUsize::new(0));
        let counter = ended.clone();
        let backend = ScriptedRecognizer::default();
        let listener = Listener::new(Box::new(backend.clone())).with_on_end(move |snap| {
            assert_eq!(snap.state, ListenState::Stopped);
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let rx = listener.listen().unwrap();
        backend.sink().partial("create a route");
        let last = listener.stop().unwrap();

        assert_eq!(last.transcript, "create a route");
        assert_eq!(last.state, ListenState::Stopped);
        assert_eq!(rx.borrow().state, ListenState::Stopped);
        assert_eq!(backend.stops.load(Ordering::SeqCst), 1);
        assert_eq!(ended.load(Ordering::SeqCst), 1);

        // late partials and a second stop change nothing
        assert!(!backend.sink().partial("ignored"));
        assert!(listener.stop().is_none());
        assert_eq!(ended.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn recognition_error_is_terminal_state() {
        let backend = ScriptedRecognizer::default();
        let listener = Listener::new(Box::new(backend.clone()));
        let rx = listener.listen().unwrap();

        backend.sink().partial("partial words");
        backend.sink().fail("network");

        let snap = rx.borrow().clone();
        assert_eq!(snap.state, ListenState::Failed("network".into()));
        assert_eq!(snap.transcript, "partial words");
        assert!(!listener.is_listening());

        // a new session may start after a failure
        assert!(listener.listen().is_ok());
    }

    #[test]
    fn second_listen_is_rejected() {
        let listener = Listener::new(Box::new(ScriptedRecognizer::default()));
        let _rx = listener.listen().unwrap();
        assert!(matches!(
            listener.listen(),
            Err(SpeechError::AlreadyListening)
        ));
    }

    #[test]
    fn start_failure_yields_failed_receiver() {
        let backend = ScriptedRecognizer {
            refuse: true,
            ..Default::default()
        };
        let listener = Listener::new(Box::new(backend));
        let rx = listener.listen().unwrap();
        assert!(matches!(rx.borrow().state, ListenState::Failed(ref e) if e.contains("microphone busy")));
        assert!(!listener.is_listening());
    }

    #[test]
    fn unavailable_listener_reports_once() {
        let listener = Listener::unavailable("no recognizer configured");
        assert!(matches!(
            listener.listen(),
            Err(SpeechError::Unsupported(_))
        ));
        assert!(listener.take_unavailable_notice().is_some());
        assert!(listener.take_unavailable_notice().is_none());
        assert!(listener.stop().is_none());
    }

    #[tokio::test]
    async fn events_are_published() {
        let bus = Arc::new(EventBus::default());
        let mut events = bus.subscribe();
        let backend = ScriptedRecognizer::default();
        let listener = Listener::new(Box::new(backend.clone())).with_event_bus(bus);

        let _rx = listener.listen().unwrap();
        backend.sink().partial("hello");
        listener.stop();

        assert!(matches!(
            events.recv().await.unwrap(),
            Event::TranscriptUpdated(ref t) if t == "hello"
        ));
        assert!(matches!(
            events.recv().await.unwrap(),
            Event::ListeningEnded { error: None }
        ));
    }
}
