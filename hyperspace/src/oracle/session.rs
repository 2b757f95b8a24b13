use tracing::{info, warn};

use crate::error::{HyperError, Result};
use crate::types::{Content, Role};

use super::{
    Oracle, ASSISTANT_GREETING, ASSISTANT_SYSTEM_INSTRUCTION, SESSION_FAILURE,
    SESSION_PLACEHOLDER,
};

/// Multi-turn conversation with the assistant.
///
/// `transcript` is what the user sees (it opens with the greeting);
/// `history` is what gets sent to the model. A failed call drops `history`
/// so the next message starts a fresh conversation.
#[derive(Debug, Clone)]
pub struct AssistantSession {
    history: Vec<Content>,
    transcript: Vec<Content>,
}

impl Default for AssistantSession {
    fn default() -> Self {
        Self {
            history: Vec::new(),
            transcript: vec![Content::text(Role::Model, ASSISTANT_GREETING)],
        }
    }
}

impl AssistantSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> &[Content] {
        &self.history
    }

    pub fn transcript(&self) -> &[Content] {
        &self.transcript
    }

    /// Send `text` and return the reply shown to the user.
    ///
    /// Only blank input is an error; provider failures become
    /// [`SESSION_FAILURE`].
    pub async fn send(&mut self, oracle: &dyn Oracle, text: &str) -> Result<String> {
        let text = text.trim();
        if text.is_empty() {
            return Err(HyperError::MissingField("message"));
        }
        self.transcript.push(Content::text(Role::User, text));
        self.history.push(Content::text(Role::User, text));

        let reply = match oracle
            .converse(ASSISTANT_SYSTEM_INSTRUCTION, &self.history)
            .await
        {
            Ok(answer) => {
                let answer = answer.unwrap_or_else(|| SESSION_PLACEHOLDER.to_string());
                self.history.push(Content::text(Role::Model, answer.clone()));
                answer
            }
            Err(e) => {
                warn!(error = %e, turns = self.history.len(), "assistant call failed, resetting session");
                self.history.clear();
                SESSION_FAILURE.to_string()
            }
        };
        self.transcript.push(Content::text(Role::Model, reply.clone()));
        Ok(reply)
    }

    pub fn reset(&mut self) {
        info!("assistant session reset");
        *self = Self::default();
    }
}
