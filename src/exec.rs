//! External command execution.
//!
//! Every external tool the pipeline touches (codesign, productsign, zip,
//! xcrun) goes through the [`CommandRunner`] capability so tests can inject a
//! fake and run the whole pipeline without any signing tools installed.

use async_trait::async_trait;

use crate::error::{Result, SignError};

/// Outcome of one external command: its exit status and captured output.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub success: bool,
    /// Combined stdout followed by stderr, lossily decoded.
    pub combined: String,
}

impl CommandOutput {
    pub fn ok() -> Self {
        Self {
            success: true,
            combined: String::new(),
        }
    }

    pub fn failed(combined: impl Into<String>) -> Self {
        Self {
            success: false,
            combined: combined.into(),
        }
    }
}

/// Capability for running an external command to completion.
///
/// The contract is deliberately narrow: argument list in, exit status plus
/// combined output text out. Failure to spawn at all is an error; a non-zero
/// exit is a normal `CommandOutput` the caller interprets.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput>;
}

/// Real implementation over `tokio::process::Command`.
pub struct ProcessRunner;

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput> {
        let output = tokio::process::Command::new(program)
            .args(args)
            .output()
            .await
            .map_err(|e| SignError::CommandExecution(format!("{program} failed to start: {e}")))?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        Ok(CommandOutput {
            success: output.status.success(),
            combined,
        })
    }
}
