//! Speech bridge: text-to-speech output and speech-to-text input.
//!
//! Both directions sit behind [`Capability`]. A capability that is missing on
//! this machine is detected once, reported once as a [`Notification`], and
//! then every call on it is a quiet no-op (synthesis) or an `Unsupported`
//! error (recognition).

mod command;
mod recognition;
mod synthesis;
mod whisper;

use std::sync::atomic::{AtomicBool, Ordering};

use movi_common::{Notification, PlatformError};

pub use command::{CommandSynthesizer, SynthesizerKind, SynthesizerOptions};
pub use recognition::{
    ListenSnapshot, ListenState, Listener, RecognitionHandle, SpeechRecognizer, TranscriptSink,
};
pub use synthesis::{Speaker, SpeechSynthesizer, Utterance};
#[cfg(test)]
pub(crate) use synthesis::testing;
pub use whisper::{
    AudioClip, AudioSource, FileAudioSource, WhisperClient, WhisperConfig, WhisperRecognizer,
};

/// Whether a speech backend exists on this machine.
pub enum Capability<T> {
    Available(T),
    Unavailable { reason: String },
}

impl<T> Capability<T> {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Capability::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Capability::Available(_))
    }

    pub fn as_ref(&self) -> Option<&T> {
        match self {
            Capability::Available(backend) => Some(backend),
            Capability::Unavailable { .. } => None,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Capability::Available(_) => None,
            Capability::Unavailable { reason } => Some(reason),
        }
    }
}

impl<T> std::fmt::Debug for Capability<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Capability::Available(_) => f.write_str("Available"),
            Capability::Unavailable { reason } => {
                f.debug_struct("Unavailable").field("reason", reason).finish()
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SpeechError {
    #[error("{0} is not supported on this system")]
    Unsupported(&'static str),
    #[error("already listening")]
    AlreadyListening,
    #[error(transparent)]
    Platform(#[from] PlatformError),
}

/// Hands out the "not supported" notice for one capability at most once.
pub(crate) struct OnceNotice {
    feature: &'static str,
    fired: AtomicBool,
}

impl OnceNotice {
    pub(crate) const fn new(feature: &'static str) -> Self {
        Self {
            feature,
            fired: AtomicBool::new(false),
        }
    }

    pub(crate) fn take<T>(&self, capability: &Capability<T>) -> Option<Notification> {
        let reason = capability.reason()?;
        if self.fired.swap(true, Ordering::AcqRel) {
            return None;
        }
        Some(Notification::warning(
            format!("{} unavailable", self.feature),
            format!("{} is not supported here: {reason}", self.feature),
        ))
    }
}
