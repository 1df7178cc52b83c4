//! Builds the assistant's collaborators from configuration.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use movi_assistant::speech::{
    AudioClip, AudioSource, FileAudioSource, SynthesizerOptions, WhisperClient, WhisperConfig,
    WhisperRecognizer,
};
use movi_assistant::{AgentEndpoint, Listener, Speaker};
use movi_common::PlatformError;
use movi_config::schema::{AgentConfig, SpeechConfig};
use tokio::sync::mpsc;

pub fn agent_endpoint(config: &AgentConfig) -> AgentEndpoint {
    AgentEndpoint::new(&config.base_url)
        .with_urls(config.invoke_url(), config.health_url())
        .with_timeouts(
            Duration::from_secs(config.connect_timeout_secs.into()),
            Duration::from_secs(config.request_timeout_secs.into()),
        )
}

/// The process-wide speaker.
pub fn speaker(config: &SpeechConfig) -> Arc<Speaker> {
    Speaker::shared(&SynthesizerOptions {
        program: config.synthesizer.clone(),
        voice: config.voice.clone(),
        rate: config.rate,
    })
}

/// Whisper client keyed by `OPENAI_API_KEY`.
pub fn whisper_client(config: &SpeechConfig) -> Result<WhisperClient, PlatformError> {
    let mut whisper = WhisperConfig::from_env()
        .ok_or_else(|| PlatformError::NotSupported("OPENAI_API_KEY is not set".to_string()))?
        .with_model(config.whisper_model.clone())
        .with_api_url(config.whisper_url.clone());
    if let Some(lang) = config.whisper_language() {
        whisper = whisper.with_language(lang);
    }
    WhisperClient::new(whisper)
}

/// Speech input over `source`, or an unavailable listener without a key.
pub fn listener(config: &SpeechConfig, source: Arc<dyn AudioSource>) -> Listener {
    match whisper_client(config) {
        Ok(client) => Listener::new(Box::new(WhisperRecognizer::new(client, source))),
        Err(e) => Listener::unavailable(e.to_string()),
    }
}

/// Audio files queued by the REPL for the next listen.
#[derive(Default)]
pub struct QueuedAudio {
    files: Mutex<Vec<PathBuf>>,
}

impl QueuedAudio {
    pub fn queue(&self, files: Vec<PathBuf>) {
        *self.files.lock().unwrap_or_else(|e| e.into_inner()) = files;
    }
}

impl AudioSource for QueuedAudio {
    fn open(&self) -> Result<mpsc::Receiver<Result<AudioClip, PlatformError>>, PlatformError> {
        let files = std::mem::take(&mut *self.files.lock().unwrap_or_else(|e| e.into_inner()));
        FileAudioSource::new(files).open()
    }
}
