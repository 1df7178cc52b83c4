//! Text-to-speech output.

use std::sync::{Arc, Mutex, OnceLock};

use movi_common::{Notification, PlatformError};
use tracing::{debug, info};

use super::command::{CommandSynthesizer, SynthesizerOptions};
use super::{Capability, OnceNotice};

/// One utterance in progress.
pub trait Utterance: Send {
    /// Stop speaking. Idempotent.
    fn cancel(&mut self);

    /// Whether audio is still playing.
    fn is_active(&mut self) -> bool;
}

/// A speech engine that can start utterances.
pub trait SpeechSynthesizer: Send + Sync {
    fn name(&self) -> &str;

    fn start(&self, text: &str) -> Result<Box<dyn Utterance>, PlatformError>;
}

/// Process-wide speech output. Plays at most one utterance at a time.
pub struct Speaker {
    backend: Capability<Box<dyn SpeechSynthesizer>>,
    current: Mutex<Option<Box<dyn Utterance>>>,
    notice: OnceNotice,
}

static SHARED: OnceLock<Arc<Speaker>> = OnceLock::new();

impl Speaker {
    pub fn new(backend: Box<dyn SpeechSynthesizer>) -> Self {
        Self::from_capability(Capability::Available(backend))
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::from_capability(Capability::unavailable(reason))
    }

    fn from_capability(backend: Capability<Box<dyn SpeechSynthesizer>>) -> Self {
        Self {
            backend,
            current: Mutex::new(None),
            notice: OnceNotice::new("Speech output"),
        }
    }

    /// Probe the machine for a command-line synthesizer.
    pub fn detect(options: &SynthesizerOptions) -> Self {
        match CommandSynthesizer::detect(options) {
            Capability::Available(synth) => {
                info!(synthesizer = synth.name(), "speech output available");
                Self::new(Box::new(synth))
            }
            Capability::Unavailable { reason } => {
                info!(%reason, "speech output unavailable");
                Self::unavailable(reason)
            }
        }
    }

    /// The process-wide speaker. Detection runs on first call only; later
    /// calls return the same instance and ignore `options`.
    pub fn shared(options: &SynthesizerOptions) -> Arc<Speaker> {
        SHARED
            .get_or_init(|| Arc::new(Self::detect(options)))
            .clone()
    }

    pub fn is_available(&self) -> bool {
        self.backend.is_available()
    }

    /// Cancel whatever is playing, then speak `text`.
    ///
    /// Blank text only cancels. A missing backend is a no-op.
    pub fn speak(&self, text: &str) -> Result<(), PlatformError> {
        let Some(backend) = self.backend.as_ref() else {
            return Ok(());
        };

        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(mut previous) = current.take() {
            previous.cancel();
        }
        let text = text.trim();
        if text.is_empty() {
            return Ok(());
        }
        let utterance = backend.start(text)?;
        debug!(synthesizer = backend.name(), chars = text.len(), "speaking");
        *current = Some(utterance);
        Ok(())
    }

    pub fn cancel_current(&self) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(mut utterance) = current.take() {
            utterance.cancel();
            debug!("utterance cancelled");
        }
    }

    pub fn is_speaking(&self) -> bool {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        current.as_mut().is_some_and(|u| u.is_active())
    }

    /// One-time notice when no synthesizer exists.
    pub fn take_unavailable_notice(&self) -> Option<Notification> {
        self.notice.take(&self.backend)
    }
}

impl Drop for Speaker {
    fn drop(&mut self) {
        self.cancel_current();
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    use super::*;

    /// Synthesizer that records every utterance it is asked to start.
    #[derive(Clone, Default)]
    pub(crate) struct RecordingSynth {
        pub(crate) spoken: Arc<Mutex<Vec<String>>>,
        pub(crate) cancelled: Arc<Mutex<usize>>,
        pub(crate) fail: Arc<AtomicBool>,
    }

    impl RecordingSynth {
        pub(crate) fn spoken(&self) -> Vec<String> {
            self.spoken.lock().unwrap().clone()
        }

        pub(crate) fn cancelled(&self) -> usize {
            *self.cancelled.lock().unwrap()
        }
    }

    struct RecordingUtterance {
        active: bool,
        cancelled: Arc<Mutex<usize>>,
    }

    impl Utterance for RecordingUtterance {
        fn cancel(&mut self) {
            if self.active {
                self.active = false;
                *self.cancelled.lock().unwrap() += 1;
            }
        }

        fn is_active(&mut self) -> bool {
            self.active
        }
    }

    impl SpeechSynthesizer for RecordingSynth {
        fn name(&self) -> &str {
            "recording"
        }

        fn start(&self, text: &str) -> Result<Box<dyn Utterance>, PlatformError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(PlatformError::SynthesisError("engine crashed".into()));
            }
            self.spoken.lock().unwrap().push(text.to_string());
            Ok(Box::new(RecordingUtterance {
                active: true,
                cancelled: self.cancelled.clone(),
            }))
        }
    }
}
