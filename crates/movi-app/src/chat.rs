//! Terminal chat surface bound to a `Session`.

use std::io::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

use movi_assistant::attachment::load_image;
use movi_assistant::speech::{ListenSnapshot, ListenState};
use movi_assistant::{page_label, AgentClient, Message, Role, SendOutcome, Session, SpeechError};
use movi_common::{Event, EventBus, MoviError, Notification, NotificationLevel, NotificationQueue};
use movi_config::MoviConfig;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

use crate::setup::{self, QueuedAudio};

/// One line typed at the prompt.
#[derive(Debug, PartialEq, Eq)]
pub enum Input {
    Empty,
    Quit,
    Image(PathBuf),
    Tts(bool),
    Listen(Vec<PathBuf>),
    /// Index into the visible quick actions.
    QuickAction(usize),
    Text(String),
    Invalid(String),
}

pub fn parse_input(line: &str, quick_actions: usize) -> Input {
    let line = line.trim();
    if line.is_empty() {
        return Input::Empty;
    }
    if let Ok(n) = line.parse::<usize>() {
        if (1..=quick_actions).contains(&n) {
            return Input::QuickAction(n - 1);
        }
    }
    let Some(command) = line.strip_prefix('/') else {
        return Input::Text(line.to_string());
    };

    let (name, rest) = command
        .split_once(char::is_whitespace)
        .map(|(n, r)| (n, r.trim()))
        .unwrap_or((command, ""));
    match (name, rest) {
        ("quit" | "exit" | "q", _) => Input::Quit,
        ("image", "") => Input::Invalid("usage: /image <path>".into()),
        ("image", path) => Input::Image(PathBuf::from(path)),
        ("tts", "on") => Input::Tts(true),
        ("tts", "off") => Input::Tts(false),
        ("tts", _) => Input::Invalid("usage: /tts on|off".into()),
        ("listen", "") => Input::Invalid("usage: /listen <audio files>".into()),
        ("listen", files) => Input::Listen(files.split_whitespace().map(PathBuf::from).collect()),
        _ => Input::Invalid(format!("unknown command /{name}")),
    }
}

/// What is staged for the next send: a recognized draft and an image.
#[derive(Debug, Default)]
struct Composer {
    draft: Option<String>,
    image: Option<String>,
}

impl Composer {
    /// An empty line sends the draft, or the image on its own.
    fn submit_staged(&mut self) -> Option<(String, Option<String>)> {
        match self.draft.take() {
            Some(draft) => Some((draft, self.image.take())),
            None => self.image.take().map(|image| (String::new(), Some(image))),
        }
    }

    /// Typed text replaces the draft and carries the image.
    fn submit_text(&mut self, text: String) -> (String, Option<String>) {
        self.draft = None;
        (text, self.image.take())
    }
}

/// The draft a finished listening session leaves behind, or the error to show.
fn finish_listening(snapshot: ListenSnapshot) -> Result<Option<String>, Notification> {
    match snapshot.state {
        ListenState::Failed(e) => Err(Notification::error("Speech recognition failed", e)),
        _ if snapshot.transcript.trim().is_empty() => Ok(None),
        _ => Ok(Some(snapshot.transcript)),
    }
}

struct Repl {
    session: Session,
    page: String,
    listener: movi_assistant::Listener,
    audio: Arc<QueuedAudio>,
    speaker: Arc<movi_assistant::Speaker>,
    notices: NotificationQueue,
    max_image_bytes: u64,
    composer: Composer,
}

pub async fn run(config: &MoviConfig, page: Option<String>, tts: bool) -> movi_common::Result<()> {
    let client = AgentClient::http(setup::agent_endpoint(&config.agent))
        .map_err(|e| MoviError::Agent(e.to_string()))?;
    let speaker = setup::speaker(&config.speech);
    let audio = Arc::new(QueuedAudio::default());
    let events = Arc::new(EventBus::default());
    let listener = setup::listener(&config.speech, audio.clone()).with_event_bus(events.clone());

    let seed: Vec<Message> = config
        .session
        .greeting()
        .map(Message::assistant)
        .into_iter()
        .collect();
    let session = Session::new(client)
        .with_seed(seed)
        .with_speaker(speaker.clone())
        .with_event_bus(events.clone())
        .with_tts(tts || config.speech.tts_enabled);

    tokio::spawn(log_events(events.subscribe()));

    let mut repl = Repl {
        page: page.unwrap_or_else(|| config.session.default_page.clone()),
        session,
        listener,
        audio,
        speaker,
        notices: NotificationQueue::default(),
        max_image_bytes: config.session.max_image_bytes,
        composer: Composer::default(),
    };
    info!(session = %repl.session.id().short(), page = %repl.page, "chat started");
    repl.run().await
}

async fn log_events(mut rx: tokio::sync::broadcast::Receiver<Event>) {
    while let Ok(event) = rx.recv().await {
        debug!(?event, "assistant event");
    }
}

impl Repl {
    async fn run(&mut self) -> movi_common::Result<()> {
        println!("Movi · {}", page_label(&self.page));
        for message in self.session.messages() {
            print_message(&message);
        }
        if self.session.tts_enabled() {
            self.note_speaker();
        }
        println!("Commands: /image <path>, /tts on|off, /listen <audio files>, /quit");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            self.show_quick_actions();
            self.flush_notices();
            prompt(&self.composer)?;

            let Some(line) = lines.next_line().await? else {
                break;
            };
            match parse_input(&line, self.session.quick_actions().len()) {
                Input::Quit => break,
                Input::Empty => {
                    if let Some((text, image)) = self.composer.submit_staged() {
                        self.send(&text, image).await;
                    }
                }
                Input::QuickAction(i) => {
                    if let Some(action) = self.session.quick_actions().get(i) {
                        println!("You: {action}");
                        let (text, image) = self.composer.submit_text(action.to_string());
                        self.send(&text, image).await;
                    }
                }
                Input::Text(text) => {
                    let (text, image) = self.composer.submit_text(text);
                    self.send(&text, image).await;
                }
                Input::Image(path) => match load_image(&path, self.max_image_bytes) {
                    Ok(uri) => {
                        self.composer.image = Some(uri);
                        self.notices.push(Notification::info(
                            "Image attached",
                            path.display().to_string(),
                        ));
                    }
                    Err(e) => self
                        .notices
                        .push(Notification::error("Attachment rejected", e.to_string())),
                },
                Input::Tts(on) => {
                    self.session.set_tts_enabled(on);
                    self.notices.push(Notification::info(
                        "Reply speech",
                        if on { "on" } else { "off" },
                    ));
                    if on {
                        self.note_speaker();
                    }
                }
                Input::Listen(files) => self.listen(files).await,
                Input::Invalid(msg) => println!("{msg}"),
            }
        }
        self.listener.stop();
        println!("Bye.");
        Ok(())
    }

    async fn send(&mut self, text: &str, image: Option<String>) {
        println!("Movi is thinking…");
        match self.session.send_message(text, &self.page, image).await {
            SendOutcome::Replied(reply) => print_message(&reply),
            SendOutcome::Busy => println!("Still waiting on the previous reply."),
            SendOutcome::Rejected => println!("Type a message or attach an image."),
        }
    }

    async fn listen(&mut self, files: Vec<PathBuf>) {
        self.audio.queue(files);
        let mut rx = match self.listener.listen() {
            Ok(rx) => rx,
            Err(SpeechError::Unsupported(_)) => {
                if let Some(notice) = self.listener.take_unavailable_notice() {
                    self.notices.push(notice);
                }
                return;
            }
            Err(e) => {
                self.notices
                    .push(Notification::error("Speech input", e.to_string()));
                return;
            }
        };

        println!("Listening…");
        let mut last_len = 0;
        let finished = loop {
            let snapshot = rx.borrow_and_update().clone();
            if snapshot.transcript.len() != last_len {
                last_len = snapshot.transcript.len();
                println!("  … {}", snapshot.transcript);
            }
            if snapshot.state.is_terminal() {
                break snapshot;
            }
            if rx.changed().await.is_err() {
                break rx.borrow().clone();
            }
        };
        self.listener.stop();

        match finish_listening(finished) {
            Err(notice) => self.notices.push(notice),
            Ok(None) => println!("Heard nothing."),
            Ok(Some(draft)) => {
                println!("Heard: {draft}");
                println!("Press Enter to send, or type to replace.");
                self.composer.draft = Some(draft);
            }
        }
    }

    fn note_speaker(&mut self) {
        if let Some(notice) = self.speaker.take_unavailable_notice() {
            self.notices.push(notice);
        }
    }

    fn show_quick_actions(&self) {
        let actions = self.session.quick_actions();
        if actions.is_empty() {
            return;
        }
        println!("Try:");
        for (i, action) in actions.iter().enumerate() {
            println!("  {}. {action}", i + 1);
        }
    }

    fn flush_notices(&mut self) {
        for notice in self.notices.drain() {
            let tag = match notice.level {
                NotificationLevel::Info => "info",
                NotificationLevel::Warning => "warning",
                NotificationLevel::Error => "error",
            };
            println!("[{tag}] {}: {}", notice.title, notice.body);
        }
    }
}

fn print_message(message: &Message) {
    let who = match message.role {
        Role::User => "You",
        Role::Assistant => "Movi",
    };
    let image = if message.image.is_some() { " [image]" } else { "" };
    println!("{who}:{image} {}", message.content);
}

fn prompt(composer: &Composer) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    match (&composer.draft, &composer.image) {
        (Some(_), _) => write!(stdout, "[draft] > ")?,
        (None, Some(_)) => write!(stdout, "[image] > ")?,
        (None, None) => write!(stdout, "> ")?,
    }
    stdout.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_and_blank_lines() {
        assert_eq!(parse_input("  ", 3), Input::Empty);
        assert_eq!(
            parse_input("how many buses are idle?", 0),
            Input::Text("how many buses are idle?".into())
        );
    }

    #[test]
    fn numbers_pick_quick_actions_only_while_shown() {
        assert_eq!(parse_input("2", 3), Input::QuickAction(1));
        assert_eq!(parse_input("4", 3), Input::Text("4".into()));
        assert_eq!(parse_input("1", 0), Input::Text("1".into()));
    }

    #[test]
    fn slash_commands() {
        assert_eq!(parse_input("/quit", 0), Input::Quit);
        assert_eq!(
            parse_input("/image ./photos/bus 12.png", 0),
            Input::Image(PathBuf::from("./photos/bus 12.png"))
        );
        assert_eq!(parse_input("/tts on", 0), Input::Tts(true));
        assert_eq!(parse_input("/tts  off ", 0), Input::Tts(false));
        assert_eq!(
            parse_input("/listen a.wav b.wav", 0),
            Input::Listen(vec![PathBuf::from("a.wav"), PathBuf::from("b.wav")])
        );
    }

    fn heard(transcript: &str, state: ListenState) -> ListenSnapshot {
        ListenSnapshot {
            transcript: transcript.to_string(),
            state,
        }
    }

    #[test]
    fn finished_transcript_becomes_the_draft() {
        let draft = finish_listening(heard("show trips for route 5", ListenState::Stopped));
        assert_eq!(draft.unwrap(), Some("show trips for route 5".to_string()));

        assert_eq!(finish_listening(heard("  ", ListenState::Stopped)).unwrap(), None);
    }

    #[test]
    fn failed_listening_leaves_no_draft() {
        let notice = finish_listening(heard(
            "show trips",
            ListenState::Failed("rate limited".into()),
        ))
        .unwrap_err();
        assert_eq!(notice.level, NotificationLevel::Error);
        assert_eq!(notice.body, "rate limited");
    }

    #[test]
    fn enter_sends_the_draft_with_the_image() {
        let mut composer = Composer {
            draft: Some("how many buses are idle?".into()),
            image: Some("data:image/png;base64,iVBORw0KGgo=".into()),
        };
        let (text, image) = composer.submit_staged().unwrap();
        assert_eq!(text, "how many buses are idle?");
        assert!(image.is_some());

        // nothing left to send
        assert!(composer.submit_staged().is_none());
    }

    #[test]
    fn enter_with_only_an_image_sends_it_alone() {
        let mut composer = Composer {
            draft: None,
            image: Some("data:image/png;base64,iVBORw0KGgo=".into()),
        };
        let (text, image) = composer.submit_staged().unwrap();
        assert!(text.is_empty());
        assert!(image.is_some());
    }

    #[test]
    fn typed_text_replaces_the_draft() {
        let mut composer = Composer {
            draft: Some("stale transcript".into()),
            image: None,
        };
        let (text, image) = composer.submit_text("list vehicles".into());
        assert_eq!(text, "list vehicles");
        assert!(image.is_none());
        assert!(composer.submit_staged().is_none());
    }

    #[test]
    fn bad_commands_are_invalid() {
        assert!(matches!(parse_input("/tts maybe", 0), Input::Invalid(_)));
        assert!(matches!(parse_input("/image", 0), Input::Invalid(_)));
        assert!(matches!(parse_input("/listen", 0), Input::Invalid(_)));
        assert_eq!(
            parse_input("/dance", 0),
            Input::Invalid("unknown command /dance".into())
        );
    }
}
