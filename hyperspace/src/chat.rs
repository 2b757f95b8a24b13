//! Chat threads and AI-mode replies.

use chrono::{DateTime, Utc};
use tracing::{error, warn};

use crate::error::{HyperError, Result};
use crate::oracle::{Oracle, CHAT_SYSTEM_INSTRUCTION};
use crate::types::{Message, MessageKind, MessageStatus, Thread, ThreadKind};
use crate::utils::new_id;

/// Sender id used for messages written by the Oracle.
pub const ORACLE_SENDER_ID: &str = "HY_ORACLE";
pub const ORACLE_SENDER_NAME: &str = "HY Oracle";

impl Thread {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: ThreadKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            messages: Vec::new(),
            unread_count: 0,
        }
    }

    /// Queue a text message from the local user. Starts as `Sending`.
    pub fn send_text(&mut self, sender: &str, text: &str, now: DateTime<Utc>) -> Result<&Message> {
        self.push_self(sender, MessageKind::Text, text, now)
    }

    fn push(&mut self, message: Message) -> &Message {
        let idx = self.messages.len();
        self.messages.push(message);
        &self.messages[idx]
    }

    fn push_self(
        &mut self,
        sender: &str,
        kind: MessageKind,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<&Message> {
        let text = text.trim();
        if text.is_empty() {
            return Err(HyperError::MissingField("message"));
        }
        Ok(self.push(Message {
            id: new_id("m"),
            sender_id: sender.to_string(),
            sender_name: sender.to_string(),
            kind,
            content: text.to_string(),
            media_url: None,
            timestamp: now,
            status: MessageStatus::Sending,
            is_self: true,
        }))
    }

    /// Record a message received from the other side of the thread.
    pub fn receive(&mut self, sender: &str, text: &str, now: DateTime<Utc>) -> &Message {
        self.unread_count += 1;
        self.push(Message {
            id: new_id("m"),
            sender_id: sender.to_string(),
            sender_name: sender.to_string(),
            kind: MessageKind::Text,
            content: text.to_string(),
            media_url: None,
            timestamp: now,
            status: MessageStatus::Delivered,
            is_self: false,
        })
    }

    fn advance(&mut self, id: &str, status: MessageStatus) -> Result<()> {
        let msg = self
            .messages
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| HyperError::MessageNotFound(id.to_string()))?;
        if status > msg.status {
            msg.status = status;
        }
        Ok(())
    }

    pub fn mark_delivered(&mut self, id: &str) -> Result<()> {
        self.advance(id, MessageStatus::Delivered)
    }

    pub fn mark_read(&mut self, id: &str) -> Result<()> {
        self.advance(id, MessageStatus::Read)
    }

    /// Mark every incoming message read and clear the unread counter.
    pub fn open(&mut self) {
        for m in self.messages.iter_mut().filter(|m| !m.is_self) {
            m.status = MessageStatus::Read;
        }
        self.unread_count = 0;
    }

    pub fn delete(&mut self, id: &str) -> Result<()> {
        let before = self.messages.len();
        self.messages.retain(|m| m.id != id);
        if self.messages.len() == before {
            return Err(HyperError::MessageNotFound(id.to_string()));
        }
        Ok(())
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Append the Oracle's answer as an AI message.
    pub fn reply_from_oracle(&mut self, text: &str, now: DateTime<Utc>) -> &Message {
        self.push(Message {
            id: new_id("ai"),
            sender_id: ORACLE_SENDER_ID.to_string(),
            sender_name: ORACLE_SENDER_NAME.to_string(),
            kind: MessageKind::Ai,
            content: text.to_string(),
            media_url: None,
            timestamp: now,
            status: MessageStatus::Read,
            is_self: false,
        })
    }

    /// Send `query` in AI mode: post it, then ask the Oracle and append its
    /// answer.
    ///
    /// If the Oracle call fails the query stays in the thread with no reply
    /// and the error is logged; the returned `Option` is `None` in that case.
    pub async fn ask_oracle(
        &mut self,
        oracle: &dyn Oracle,
        sender: &str,
        query: &str,
    ) -> Result<Option<Message>> {
        let id = self.push_self(sender, MessageKind::Ai, query, Utc::now())?.id.clone();
        let query = query.trim().to_string();

        match oracle.generate(CHAT_SYSTEM_INSTRUCTION, &query).await {
            Ok(text) => {
                self.mark_delivered(&id)?;
                Ok(Some(self.reply_from_oracle(&text, Utc::now()).clone()))
            }
            Err(e) => {
                error!(thread = %self.id, error = %e, "oracle reply failed");
                warn!(thread = %self.id, "leaving AI query without a reply");
                Ok(None)
            }
        }
    }
}
