//! Confirmation capability
//!
//! Mutating commands ask a [`Confirm`] implementation before touching the rig.
//! The dashboard answers through a modal, the one-shot CLI through stdin, and
//! `--yes` or tests through a fixed answer.

use std::io::{self, BufRead, Write};
use tokio::sync::{mpsc, oneshot};

#[cfg(test)]
use mockall::automock;

#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait Confirm: Send + Sync {
    /// Returns true only on an explicit "yes" for `prompt`.
    async fn confirm(&self, prompt: &str) -> bool;
}

/// Answers every prompt the same way.
#[derive(Debug, Clone, Copy)]
pub struct AutoConfirm(pub bool);

#[async_trait::async_trait]
impl Confirm for AutoConfirm {
    async fn confirm(&self, _prompt: &str) -> bool {
        self.0
    }
}

/// Asks on the terminal: `<prompt> [y/N]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinConfirm;

#[async_trait::async_trait]
impl Confirm for StdinConfirm {
    async fn confirm(&self, prompt: &str) -> bool {
        let prompt = prompt.to_string();
        tokio::task::spawn_blocking(move || {
            print!("{} [y/N] ", prompt);
            if io::stdout().flush().is_err() {
                return false;
            }
            let mut answer = String::new();
            match io::stdin().lock().read_line(&mut answer) {
                Ok(_) => is_yes(&answer),
                Err(_) => false,
            }
        })
        .await
        .unwrap_or(false)
    }
}

pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// A pending question waiting for the UI to answer.
#[derive(Debug)]
pub struct ConfirmRequest {
    pub prompt: String,
    reply: oneshot::Sender<bool>,
}

impl ConfirmRequest {
    pub fn answer(self, yes: bool) {
        let _ = self.reply.send(yes);
    }
}

/// Forwards prompts to whoever holds the matching receiver (the dashboard).
#[derive(Debug, Clone)]
pub struct ChannelConfirm {
    sender: mpsc::Sender<ConfirmRequest>,
}

impl ChannelConfirm {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<ConfirmRequest>) {
        let (sender, receiver) = mpsc::channel(capacity);
        (Self { sender }, receiver)
    }
}

#[async_trait::async_trait]
impl Confirm for ChannelConfirm {
    async fn confirm(&self, prompt: &str) -> bool {
        let (reply, answer) = oneshot::channel();
        let request = ConfirmRequest {
            prompt: prompt.to_string(),
            reply,
        };
        if self.sender.send(request).await.is_err() {
            return false;
        }
        // A dropped request (UI closed) counts as "no".
        answer.await.unwrap_or(false)
    }
}
