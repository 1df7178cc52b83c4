//! The send path: optimistic append, agent round trip, reply append.

use movi_common::Event;
use tracing::{debug, info, warn};

use crate::{Message, Role};

use super::manager::Session;
use super::types::{BusyGuard, SendOutcome};

/// Clears `is_loading` if the send future is dropped before the reply lands.
struct InFlight<'a> {
    session: &'a Session,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        {
            let mut state = self.session.lock_state();
            if !state.is_loading {
                return;
            }
            state.is_loading = false;
            self.session.publish(&state);
        }
        warn!(session = %self.session.id.short(), "send abandoned before the reply arrived");
        self.session.emit(Event::LoadingChanged(false));
    }
}

impl Session {
    /// Append the user's message, ask the agent, append its reply.
    ///
    /// Empty input without an image is ignored, and so is a send made while
    /// another is in flight. Agent failures never surface here: they arrive
    /// as an assistant apology in the log.
    pub async fn send_message(
        &self,
        user_input: &str,
        page_context: &str,
        image: Option<String>,
    ) -> SendOutcome {
        if user_input.trim().is_empty() && image.is_none() {
            debug!(session = %self.id.short(), "empty message ignored");
            return SendOutcome::Rejected;
        }
        let Some(_busy) = BusyGuard::acquire(&self.busy) else {
            debug!(session = %self.id.short(), "send ignored, a reply is pending");
            return SendOutcome::Busy;
        };

        let (log, user_index) = {
            let mut state = self.lock_state();
            state
                .messages
                .push(Message::user(user_input, image.clone()));
            state.is_loading = true;
            self.publish(&state);
            (state.messages.clone(), state.messages.len() - 1)
        };
        let _in_flight = InFlight { session: self };
        self.emit(Event::MessageAppended {
            index: user_index,
            role: Role::User.as_str().to_string(),
        });
        self.emit(Event::LoadingChanged(true));

        let reply = self
            .client
            .invoke(&log, page_context, image.as_deref())
            .await;

        let reply_index = {
            let mut state = self.lock_state();
            state.messages.push(reply.clone());
            state.is_loading = false;
            self.publish(&state);
            state.messages.len() - 1
        };
        self.emit(Event::MessageAppended {
            index: reply_index,
            role: reply.role.as_str().to_string(),
        });
        self.emit(Event::LoadingChanged(false));
        info!(
            session = %self.id.short(),
            page = page_context,
            messages = reply_index + 1,
            "reply appended"
        );

        self.sync_speech();
        SendOutcome::Replied(reply)
    }
}
