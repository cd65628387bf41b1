//! The UI collaborators: a yes/no confirmation and a place to post notices.

use serde::Serialize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{error, info, warn};

/// The text of a yes/no confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Prompt {
    pub title: String,
    pub text: String,
    pub confirm_label: String,
}

impl Prompt {
    /// The warning shown before a transaction is deleted.
    pub fn delete_transaction() -> Self {
        Self {
            title: "Are you sure?".to_string(),
            text: "You won't be able to revert this!".to_string(),
            confirm_label: "Yes, delete it!".to_string(),
        }
    }
}

/// Asks the user a yes/no question and waits for the answer. There is no timeout.
#[async_trait::async_trait]
pub trait ConfirmationPrompt: Send + Sync {
    async fn confirm(&self, prompt: &Prompt) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A transient message for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub text: String,
}

impl Notice {
    pub fn success(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            title: title.into(),
            text: text.into(),
        }
    }

    pub fn error(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            title: title.into(),
            text: text.into(),
        }
    }
}

/// Displays notices.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Answers yes without asking. Backs the `--yes` flag.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeYes;

#[async_trait::async_trait]
impl ConfirmationPrompt for AssumeYes {
    async fn confirm(&self, _prompt: &Prompt) -> bool {
        true
    }
}

/// Asks on the terminal. Anything other than `y` or `yes` is a no.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPrompt;

#[async_trait::async_trait]
impl ConfirmationPrompt for TerminalPrompt {
    async fn confirm(&self, prompt: &Prompt) -> bool {
        let question = format!(
            "{}\n{}\n{} [y/N] ",
            prompt.title, prompt.text, prompt.confirm_label
        );
        let mut stderr = tokio::io::stderr();
        if let Err(e) = stderr.write_all(question.as_bytes()).await {
            warn!("Unable to write the confirmation prompt: {e}");
            return false;
        }
        let _ = stderr.flush().await;

        let mut answer = String::new();
        let mut stdin = BufReader::new(tokio::io::stdin());
        match stdin.read_line(&mut answer).await {
            Ok(_) => is_yes(&answer),
            Err(e) => {
                warn!("Unable to read the confirmation answer: {e}");
                false
            }
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Sends notices to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl NotificationSink for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success => info!("{}: {}", notice.title, notice.text),
            NoticeLevel::Error => error!("{}: {}", notice.title, notice.text),
        }
    }
}
