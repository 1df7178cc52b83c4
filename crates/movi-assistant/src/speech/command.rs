//! Command-line synthesizers (`say`, `espeak-ng`, `espeak`, `spd-say`).
//!
//! Each utterance is a child process; cancelling kills it.

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

use movi_common::PlatformError;
use tracing::debug;

use super::synthesis::{SpeechSynthesizer, Utterance};
use super::Capability;

/// Programs probed on `PATH`, in order of preference.
const CANDIDATES: &[&str] = &["say", "espeak-ng", "espeak", "spd-say"];

/// Words per minute at which `spd-say` rate 0 is pinned.
const SPD_NEUTRAL_WPM: i64 = 175;

/// Settings for the synthesizer, taken from the `[speech]` config section.
#[derive(Debug, Clone)]
pub struct SynthesizerOptions {
    /// Explicit program name or path. Empty means auto-detect.
    pub program: String,
    /// Voice name. Empty means the engine default.
    pub voice: String,
    /// Speaking rate in words per minute.
    pub rate: u32,
}

impl Default for SynthesizerOptions {
    fn default() -> Self {
        Self {
            program: String::new(),
            voice: String::new(),
            rate: 175,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynthesizerKind {
    Say,
    Espeak,
    SpdSay,
    /// Unknown program: called with the text as its only argument.
    Custom,
}

impl SynthesizerKind {
    fn from_program(path: &Path) -> Self {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        match name {
            "say" => Self::Say,
            "espeak" | "espeak-ng" => Self::Espeak,
            "spd-say" => Self::SpdSay,
            _ => Self::Custom,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CommandSynthesizer {
    program: PathBuf,
    kind: SynthesizerKind,
    voice: Option<String>,
    rate: u32,
}

impl CommandSynthesizer {
    pub fn new(program: impl Into<PathBuf>, options: &SynthesizerOptions) -> Self {
        let program = program.into();
        let voice = options.voice.trim();
        Self {
            kind: SynthesizerKind::from_program(&program),
            program,
            voice: (!voice.is_empty()).then(|| voice.to_string()),
            rate: options.rate,
        }
    }

    /// Find a usable synthesizer: the configured program if set, otherwise
    /// the first known one on `PATH`.
    pub fn detect(options: &SynthesizerOptions) -> Capability<Self> {
        let configured = options.program.trim();
        if !configured.is_empty() {
            return match resolve_program(configured) {
                Some(path) => Capability::Available(Self::new(path, options)),
                None => Capability::unavailable(format!(
                    "configured synthesizer '{configured}' was not found"
                )),
            };
        }

        for candidate in CANDIDATES {
            if let Some(path) = find_on_path(candidate) {
                return Capability::Available(Self::new(path, options));
            }
        }
        Capability::unavailable(format!(
            "no speech synthesizer found (tried {})",
            CANDIDATES.join(", ")
        ))
    }

    pub fn kind(&self) -> SynthesizerKind {
        self.kind
    }

    /// Arguments passed to the program for `text`.
    pub(crate) fn args(&self, text: &str) -> Vec<String> {
        let mut args = Vec::new();
        match self.kind {
            SynthesizerKind::Say => {
                args.extend(["-r".to_string(), self.rate.to_string()]);
                if let Some(voice) = &self.voice {
                    args.extend(["-v".to_string(), voice.clone()]);
                }
                args.push("--".to_string());
            }
            SynthesizerKind::Espeak => {
                args.extend(["-s".to_string(), self.rate.to_string()]);
                if let Some(voice) = &self.voice {
                    args.extend(["-v".to_string(), voice.clone()]);
                }
                args.push("--".to_string());
            }
            SynthesizerKind::SpdSay => {
                // -w blocks until speech ends so killing the child cancels it.
                args.extend([
                    "-w".to_string(),
                    "-r".to_string(),
                    spd_rate(self.rate).to_string(),
                ]);
                if let Some(voice) = &self.voice {
                    args.extend(["-y".to_string(), voice.clone()]);
                }
                args.push("--".to_string());
            }
            SynthesizerKind::Custom => {}
        }
        args.push(text.to_string());
        args
    }
}

impl SpeechSynthesizer for CommandSynthesizer {
    fn name(&self) -> &str {
        self.program
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("synthesizer")
    }

    fn start(&self, text: &str) -> Result<Box<dyn Utterance>, PlatformError> {
        let child = Command::new(&self.program)
            .args(self.args(text))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                PlatformError::SynthesisError(format!(
                    "failed to start {}: {e}",
                    self.program.display()
                ))
            })?;
        debug!(pid = child.id(), program = %self.program.display(), "synthesizer started");
        Ok(Box::new(ProcessUtterance { child }))
    }
}

/// `spd-say` takes a rate in -100..=100 relative to its default.
fn spd_rate(wpm: u32) -> i64 {
    ((i64::from(wpm) - SPD_NEUTRAL_WPM) * 100 / SPD_NEUTRAL_WPM).clamp(-100, 100)
}

fn resolve_program(program: &str) -> Option<PathBuf> {
    let path = Path::new(program);
    if path.components().count() > 1 {
        return path.is_file().then(|| path.to_path_buf());
    }
    find_on_path(program)
}

fn find_on_path(name: &str) -> Option<PathBuf> {
    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
}

struct ProcessUtterance {
    child: Child,
}

impl Utterance for ProcessUtterance {
    fn cancel(&mut self) {
        if self.is_active() {
            let _ = self.child.kill();
        }
        // reap
        let _ = self.child.wait();
    }

    fn is_active(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }
}

impl Drop for ProcessUtterance {
    fn drop(&mut self) {
        self.cancel();
    }
}
