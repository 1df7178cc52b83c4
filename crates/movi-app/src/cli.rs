use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Movi, the fleet dashboard assistant in your terminal.
#[derive(Parser, Debug)]
#[command(name = "movi", version, about)]
pub struct Args {
    /// Config file path override.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level override (trace, debug, info, warn, error) or a full filter.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Chat with Movi.
    Chat {
        /// Dashboard page the conversation is about, e.g. busDashboard.
        #[arg(long)]
        page: Option<String>,

        /// Speak replies aloud.
        #[arg(long)]
        tts: bool,
    },

    /// Check that the agent backend is reachable.
    Health,

    /// Print the road path through stops given as lon,lat pairs.
    Route {
        #[arg(required = true, num_args = 1.., allow_hyphen_values = true)]
        coords: Vec<String>,
    },

    /// Transcribe recorded audio files with Whisper.
    Transcribe {
        #[arg(required = true, num_args = 1..)]
        files: Vec<PathBuf>,
    },
}

pub fn parse() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_with_page_and_tts() {
        let args = Args::try_parse_from(["movi", "chat", "--page", "manageRoute", "--tts"]).unwrap();
        assert_eq!(
            args.command,
            Command::Chat {
                page: Some("manageRoute".into()),
                tts: true,
            }
        );
        assert!(args.config.is_none());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let args =
            Args::try_parse_from(["movi", "health", "--log-level", "debug", "--config", "/tmp/m.toml"])
                .unwrap();
        assert_eq!(args.command, Command::Health);
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert_eq!(args.config, Some(PathBuf::from("/tmp/m.toml")));
    }

    #[test]
    fn route_accepts_negative_longitudes() {
        let args = Args::try_parse_from(["movi", "route", "-73.98,40.75", "-73.97,40.76"]).unwrap();
        match args.command {
            Command::Route { coords } => assert_eq!(coords.len(), 2),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn transcribe_requires_files() {
        assert!(Args::try_parse_from(["movi", "transcribe"]).is_err());
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Args::try_parse_from(["movi"]).is_err());
    }
}
