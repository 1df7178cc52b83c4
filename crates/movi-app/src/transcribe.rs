use std::path::PathBuf;
use std::sync::Arc;

use movi_assistant::speech::{FileAudioSource, ListenState, WhisperRecognizer};
use movi_assistant::Listener;
use movi_common::PlatformError;
use movi_config::schema::SpeechConfig;
use tracing::info;

use crate::setup;

/// Run the files through recognition and print the cumulative transcript.
pub async fn run(config: &SpeechConfig, files: Vec<PathBuf>) -> movi_common::Result<()> {
    let client = setup::whisper_client(config)?;
    let count = files.len();
    let source = Arc::new(FileAudioSource::new(files));
    let listener = Listener::new(Box::new(WhisperRecognizer::new(client, source)));

    let mut rx = listener
        .listen()
        .map_err(|e| PlatformError::RecognitionError(e.to_string()))?;
    let done = rx
        .wait_for(|snap| snap.state.is_terminal())
        .await
        .map(|snap| snap.clone());
    let finished = match done {
        Ok(snap) => snap,
        Err(_) => rx.borrow().clone(),
    };
    listener.stop();

    match finished.state {
        ListenState::Failed(e) => Err(PlatformError::RecognitionError(e).into()),
        _ => {
            info!(clips = count, chars = finished.transcript.len(), "transcription finished");
            println!("{}", finished.transcript);
            Ok(())
        }
    }
}
