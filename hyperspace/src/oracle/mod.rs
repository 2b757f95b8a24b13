//! The Oracle: generative-text features.
//!
//! [`OracleClient`] talks to the provider (or to `oracle-proxy`, which speaks
//! the same wire format). [`AssistantSession`] keeps a multi-turn
//! conversation for the assistant widget; one-shot prompts (chat AI mode,
//! translate, summarize) go through [`Oracle::generate`].

pub mod client;
pub mod session;

use std::future::Future;
use std::pin::Pin;

use crate::error::Result;
use crate::types::Content;

pub use client::OracleClient;
pub use session::AssistantSession;

pub const ASSISTANT_SYSTEM_INSTRUCTION: &str = "You are the HY Oracle, the official AI guide for HYPER SPACE. HYPER SPACE is a next-generation social protocol merging decentralized streaming with high-yield crypto infrastructure. Help users understand staking (24.5% APY), $HY tokenomics, and decentralized ownership. Responses should be helpful, concise, and futuristic.";

pub const CHAT_SYSTEM_INSTRUCTION: &str = "You are the HY Chat Assistant. Help users with platform features, crypto stats, and general multiverse info. Be concise and use a futuristic tone.";

pub const CONTENT_TOOLS_SYSTEM_INSTRUCTION: &str = "You are the HY Oracle content engine. Return only the requested output, with no preamble.";

pub const ASSISTANT_GREETING: &str = "Greetings, Traveler. I am the HY Oracle. How can I assist your journey into the Creator Multiverse today?";

/// Shown when a one-shot prompt returns no text.
pub const ONE_SHOT_PLACEHOLDER: &str = "The Oracle is calibrating. Please wait.";
/// Shown when the assistant session returns no text.
pub const SESSION_PLACEHOLDER: &str =
    "The Oracle is currently contemplating the block. Please try again soon.";
/// Shown when the assistant session call fails.
pub const SESSION_FAILURE: &str =
    "The cosmic link to the Oracle has been severed. Check your network connection.";

/// Raw model output; `None` when the provider answered without text.
pub type OracleFuture<'a> = Pin<Box<dyn Future<Output = Result<Option<String>>> + Send + 'a>>;
/// Model output with the placeholder already applied.
pub type TextFuture<'a> = Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>>;

/// A generative-text backend.
pub trait Oracle: Send + Sync {
    /// Single-shot completion of `prompt` under `system_instruction`.
    fn complete<'a>(&'a self, system_instruction: &'a str, prompt: &'a str) -> OracleFuture<'a>;

    /// Next model turn for a conversation `history` (oldest first, ending
    /// with the user's message).
    fn converse<'a>(
        &'a self,
        system_instruction: &'a str,
        history: &'a [Content],
    ) -> OracleFuture<'a>;

    /// One-shot prompt; empty answers become [`ONE_SHOT_PLACEHOLDER`].
    fn generate<'a>(&'a self, system_instruction: &'a str, prompt: &'a str) -> TextFuture<'a> {
        Box::pin(async move {
            Ok(self
                .complete(system_instruction, prompt)
                .await?
                .unwrap_or_else(|| ONE_SHOT_PLACEHOLDER.to_string()))
        })
    }

    fn translate<'a>(&'a self, text: &'a str, language: &'a str) -> TextFuture<'a> {
        Box::pin(async move {
            let prompt = translate_prompt(text, language);
            self.generate(CONTENT_TOOLS_SYSTEM_INSTRUCTION, &prompt).await
        })
    }

    fn summarize<'a>(&'a self, text: &'a str) -> TextFuture<'a> {
        Box::pin(async move {
            let prompt = summarize_prompt(text);
            self.generate(CONTENT_TOOLS_SYSTEM_INSTRUCTION, &prompt).await
        })
    }
}

pub fn translate_prompt(text: &str, language: &str) -> String {
    format!("Translate the following post into {language}:\n\n{text}")
}

pub fn summarize_prompt(text: &str) -> String {
    format!("Summarize the following post in one or two sentences:\n\n{text}")
}
