//! Speaking assistant replies.

use tracing::{debug, warn};

use super::manager::Session;

impl Session {
    pub fn tts_enabled(&self) -> bool {
        self.lock_speech().tts_enabled
    }

    /// Turn reply speech on or off.
    ///
    /// Turning it on marks the existing log as already spoken; turning it
    /// off cancels the utterance in progress.
    pub fn set_tts_enabled(&self, enabled: bool) {
        let mut speech = self.lock_speech();
        if speech.tts_enabled == enabled {
            return;
        }
        speech.tts_enabled = enabled;
        if enabled {
            speech.last_spoken_index = self.lock_state().messages.len().checked_sub(1);
        } else if let Some(speaker) = &self.speaker {
            speaker.cancel_current();
        }
        debug!(session = %self.id.short(), enabled, "reply speech toggled");
    }

    /// Speak every assistant message appended since the last sync.
    ///
    /// Returns how many were handed to the speaker. Running it again with an
    /// unchanged log speaks nothing.
    pub fn sync_speech(&self) -> usize {
        let Some(speaker) = &self.speaker else {
            return 0;
        };
        let mut speech = self.lock_speech();
        if !speech.tts_enabled {
            return 0;
        }

        let start = speech.last_spoken_index.map_or(0, |i| i + 1);
        let pending: Vec<(usize, Option<String>)> = {
            let state = self.lock_state();
            state
                .messages
                .iter()
                .enumerate()
                .skip(start)
                .map(|(i, m)| (i, m.is_assistant().then(|| m.content.clone())))
                .collect()
        };

        let mut spoken = 0;
        for (index, text) in pending {
            if let Some(text) = text {
                if let Err(e) = speaker.speak(&text) {
                    warn!(session = %self.id.short(), index, error = %e, "failed to speak reply");
                    break;
                }
                spoken += 1;
            }
            speech.last_spoken_index = Some(index);
        }
        spoken
    }
}
