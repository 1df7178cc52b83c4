//! Speech input and output configuration types.

use serde::{Deserialize, Serialize};

/// Speech synthesis and recognition configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Speak assistant replies aloud when the chat opens.
    pub tts_enabled: bool,
    /// Synthesizer program. Empty means auto-detect
    /// (`say`, `espeak-ng`, `espeak`, `spd-say`).
    pub synthesizer: String,
    /// Voice name passed to the synthesizer. Empty uses its default.
    pub voice: String,
    /// Words per minute (valid range: 80-450).
    pub rate: u32,
    /// BCP-47 language hint for recognition, e.g. `en-US`.
    pub recognition_language: String,
    pub whisper_model: String,
    pub whisper_url: String,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            tts_enabled: false,
            synthesizer: String::new(),
            voice: String::new(),
            rate: 175,
            recognition_language: "en-US".into(),
            whisper_model: "whisper-1".into(),
            whisper_url: "https://api.openai.com/v1/audio/transcriptions".into(),
        }
    }
}

impl SpeechConfig {
    /// The two-letter language code Whisper expects (`en-US` -> `en`).
    pub fn whisper_language(&self) -> Option<String> {
        self.recognition_language
            .split(['-', '_'])
            .next()
            .filter(|code| !code.is_empty())
            .map(|code| code.to_ascii_lowercase())
    }
}
