//! Per-invocation state shared by every command.

use std::io::Write;

use saasprobe_client::{AuthContext, ClientConfig, FileTokenStore, SaasApi};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};

use crate::feedback::{CliError, CliResult};

pub struct App {
    pub api: SaasApi,
    pub config: ClientConfig,
    pub input: Input,
}

impl App {
    /// Load the stored session and build the backend client.
    pub fn from_config(config: ClientConfig) -> CliResult<Self> {
        let auth = AuthContext::load(FileTokenStore::new(config.token_path.clone()))?;
        let api = SaasApi::new(&config, auth)?;
        Ok(Self {
            api,
            config,
            input: Input::stdin(),
        })
    }

    /// Fail early when a command needs a session and none is held.
    pub fn require_session(&self) -> CliResult<()> {
        if self.api.auth().token().is_none() {
            return Err(CliError::NotLoggedIn);
        }
        Ok(())
    }
}

/// Line-oriented reader shared by prompts and the watch screen.
pub struct Input {
    lines: Lines<Box<dyn AsyncBufRead + Send + Unpin>>,
}

impl Input {
    pub fn stdin() -> Self {
        Self::from_reader(BufReader::new(tokio::io::stdin()))
    }

    /// Read answers from `reader` instead of the terminal.
    pub fn from_reader(reader: impl AsyncBufRead + Send + Unpin + 'static) -> Self {
        let reader: Box<dyn AsyncBufRead + Send + Unpin> = Box::new(reader);
        Self {
            lines: reader.lines(),
        }
    }

    /// Next line without its terminator, `None` at end of input.
    pub async fn next_line(&mut self) -> CliResult<Option<String>> {
        Ok(self.lines.next_line().await?)
    }

    /// Print `label` and read one trimmed answer. End of input reads as empty.
    pub async fn prompt(&mut self, label: &str) -> CliResult<String> {
        print!("{label}: ");
        std::io::stdout().flush()?;
        Ok(self
            .next_line()
            .await?
            .map(|line| line.trim().to_string())
            .unwrap_or_default())
    }

    /// Use `given` when present, otherwise prompt for a value.
    pub async fn value_or_prompt(&mut self, given: Option<String>, label: &str) -> CliResult<String> {
        match given {
            Some(value) => Ok(value),
            None => self.prompt(label).await,
        }
    }

    /// Yes/no question; anything but `y`/`yes` is a no.
    pub async fn confirm(&mut self, question: &str) -> CliResult<bool> {
        let answer = self.prompt(&format!("{question} [y/N]")).await?;
        Ok(matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes"))
    }
}
