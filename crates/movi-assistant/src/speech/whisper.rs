//! OpenAI Whisper API speech-to-text.
//!
//! `WhisperRecognizer` transcribes recorded clips from an [`AudioSource`]
//! one by one; each transcribed clip extends the cumulative transcript.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use movi_common::PlatformError;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::recognition::{RecognitionHandle, SpeechRecognizer, TranscriptSink};

pub const WHISPER_API_URL: &str = "https://api.openai.com/v1/audio/transcriptions";

/// Whisper API client configuration.
#[derive(Clone)]
pub struct WhisperConfig {
    pub api_key: String,
    pub model: String,
    pub language: Option<String>,
    pub api_url: String,
}

impl std::fmt::Debug for WhisperConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhisperConfig")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("language", &self.language)
            .field("api_url", &self.api_url)
            .finish()
    }
}

impl WhisperConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: "whisper-1".to_string(),
            language: None,
            api_url: WHISPER_API_URL.to_string(),
        }
    }

    /// Config keyed by `OPENAI_API_KEY`, or `None` when it is unset.
    pub fn from_env() -> Option<Self> {
        std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .map(Self::new)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_language(mut self, lang: impl Into<String>) -> Self {
        self.language = Some(lang.into());
        self
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }
}

/// Whisper speech-to-text client.
pub struct WhisperClient {
    config: WhisperConfig,
    http: reqwest::Client,
}

impl WhisperClient {
    pub fn new(config: WhisperConfig) -> Result<Self, PlatformError> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(|e| PlatformError::RecognitionError(format!("HTTP client: {e}")))?;
        Ok(Self { config, http })
    }

    /// Transcribe audio bytes to text.
    ///
    /// `filename` names the multipart file part and picks its MIME type
    /// (mp3, m4a, webm, ogg; anything else is sent as wav).
    pub async fn transcribe(
        &self,
        audio_data: Vec<u8>,
        filename: &str,
    ) -> Result<String, PlatformError> {
        debug!(
            model = %self.config.model,
            size = audio_data.len(),
            "Whisper transcription request"
        );

        let mime = match filename.rsplit('.').next() {
            Some("mp3") => "audio/mpeg",
            Some("m4a") => "audio/mp4",
            Some("webm") => "audio/webm",
            Some("ogg") => "audio/ogg",
            _ => "audio/wav",
        };

        let file_part = reqwest::multipart::Part::bytes(audio_data)
            .file_name(filename.to_string())
            .mime_str(mime)
            .map_err(|e| PlatformError::RecognitionError(e.to_string()))?;

        let mut form = reqwest::multipart::Form::new()
            .part("file", file_part)
            .text("model", self.config.model.clone());

        if let Some(ref lang) = self.config.language {
            form = form.text("language", lang.clone());
        }

        let response = self
            .http
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| PlatformError::RecognitionError(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(PlatformError::RecognitionError("rate limited".to_string()));
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(PlatformError::RecognitionError(format!(
                "HTTP {status}: {text}"
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| PlatformError::RecognitionError(e.to_string()))?;

        json["text"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| {
                PlatformError::RecognitionError("no 'text' field in response".to_string())
            })
    }
}

/// One recorded chunk of audio.
#[derive(Debug, Clone)]
pub struct AudioClip {
    pub data: Vec<u8>,
    pub filename: String,
}

/// Supplies recorded clips for one recognition session.
///
/// The channel closing marks the end of input.
pub trait AudioSource: Send + Sync {
    fn open(&self) -> Result<mpsc::Receiver<Result<AudioClip, PlatformError>>, PlatformError>;
}

/// Audio clips read from files, in order, on a background task.
#[derive(Debug, Clone)]
pub struct FileAudioSource {
    paths: Vec<PathBuf>,
}

impl FileAudioSource {
    pub fn new(paths: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }
}

impl AudioSource for FileAudioSource {
    fn open(&self) -> Result<mpsc::Receiver<Result<AudioClip, PlatformError>>, PlatformError> {
        if self.paths.is_empty() {
            return Err(PlatformError::AudioError("no audio files given".to_string()));
        }
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| {
            PlatformError::AudioError("reading audio files needs a tokio runtime".to_string())
        })?;
        let paths = self.paths.clone();
        let (tx, rx) = mpsc::channel(1);

        runtime.spawn(async move {
            for path in paths {
                let clip = tokio::fs::read(&path)
                    .await
                    .map(|data| AudioClip {
                        data,
                        filename: path
                            .file_name()
                            .map(|n| n.to_string_lossy().into_owned())
                            .unwrap_or_else(|| "audio.wav".to_string()),
                    })
                    .map_err(|e| {
                        PlatformError::AudioError(format!("{}: {e}", path.display()))
                    });
                if tx.send(clip).await.is_err() {
                    debug!("audio consumer went away");
                    break;
                }
            }
        });
        Ok(rx)
    }
}

/// Recognizer backed by the Whisper API.
pub struct WhisperRecognizer {
    client: Arc<WhisperClient>,
    source: Arc<dyn AudioSource>,
}

impl WhisperRecognizer {
    pub fn new(client: WhisperClient, source: Arc<dyn AudioSource>) -> Self {
        Self {
            client: Arc::new(client),
            source,
        }
    }
}

impl SpeechRecognizer for WhisperRecognizer {
    fn name(&self) -> &str {
        "whisper"
    }

    fn start(&self, sink: TranscriptSink) -> Result<Box<dyn RecognitionHandle>, PlatformError> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| {
            PlatformError::NotSupported("Whisper recognition needs a tokio runtime".to_string())
        })?;
        let mut clips = self.source.open()?;
        let token = CancellationToken::new();
        let cancelled = token.clone();
        let client = self.client.clone();

        runtime.spawn(async move {
            let mut transcript = String::new();
            loop {
                let clip = tokio::select! {
                    _ = cancelled.cancelled() => break,
                    clip = clips.recv() => clip,
                };
                let clip = match clip {
                    Some(Ok(clip)) => clip,
                    Some(Err(e)) => {
                        sink.fail(e.to_string());
                        break;
                    }
                    None => {
                        sink.end();
                        break;
                    }
                };

                let result = tokio::select! {
                    _ = cancelled.cancelled() => break,
                    result = client.transcribe(clip.data, &clip.filename) => result,
                };
                match result {
                    Ok(text) => {
                        let text = text.trim();
                        if text.is_empty() {
                            continue;
                        }
                        if !transcript.is_empty() {
                            transcript.push(' ');
                        }
                        transcript.push_str(text);
                        sink.partial(transcript.clone());
                    }
                    Err(e) => {
                        warn!(file = %clip.filename, error = %e, "clip transcription failed");
                        sink.fail(e.to_string());
                        break;
                    }
                }
            }
        });

        Ok(Box::new(WhisperHandle { token }))
    }
}

struct WhisperHandle {
    token: CancellationToken,
}

impl RecognitionHandle for WhisperHandle {
    fn stop(&mut self) {
        self.token.cancel();
    }
}

impl Drop for WhisperHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
