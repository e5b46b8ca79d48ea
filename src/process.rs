//! External command execution
//!
//! Thin wrapper over `tokio::process` used to query the compositor and the
//! audio server, and to open the config file in an editor.

use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} exited with {status}: {output}")]
    Failed {
        program: String,
        status: std::process::ExitStatus,
        output: String,
    },
    #[error("{program} did not finish within {timeout:?}")]
    Timeout { program: String, timeout: Duration },
}

/// Runs external programs on behalf of the resolver and the CLI
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `program` to completion and return its combined stdout and stderr.
    async fn output(&self, program: &str, args: &[&str]) -> Result<String, CommandError>;

    /// Start `program` without waiting for it to exit.
    async fn spawn_detached(&self, program: &str, args: &[&str]) -> Result<(), CommandError>;
}

/// [`CommandRunner`] backed by real processes, with a bounded wait
#[derive(Debug, Clone)]
pub struct SystemCommandRunner {
    timeout: Duration,
}

impl SystemCommandRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Run `program` on the current terminal and wait for it, without a timeout.
    pub async fn run_attached(&self, program: &str, args: &[&str]) -> Result<(), CommandError> {
        debug!("Running attached {} {:?}", program, args);

        let status = Command::new(program)
            .args(args)
            .status()
            .await
            .map_err(|source| CommandError::Spawn {
                program: program.to_string(),
                source,
            })?;

        if !status.success() {
            return Err(CommandError::Failed {
                program: program.to_string(),
                status,
                output: String::new(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl CommandRunner for SystemCommandRunner {
    async fn output(&self, program: &str, args: &[&str]) -> Result<String, CommandError> {
        debug!("Running {} {:?}", program, args);

        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| CommandError::Spawn {
                program: program.to_string(),
                source,
            })?;

        // Dropping the future on expiry drops the child, which kills it
        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| CommandError::Timeout {
                program: program.to_string(),
                timeout: self.timeout,
            })?
            .map_err(|source| CommandError::Spawn {
                program: program.to_string(),
                source,
            })?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        if !output.status.success() {
            return Err(CommandError::Failed {
                program: program.to_string(),
                status: output.status,
                output: combined.trim().to_string(),
            });
        }

        Ok(combined)
    }

    async fn spawn_detached(&self, program: &str, args: &[&str]) -> Result<(), CommandError> {
        debug!("Spawning detached {} {:?}", program, args);

        Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map(|_| ())
            .map_err(|source| {
                warn!("Failed to spawn detached process {}: {}", program, source);
                CommandError::Spawn {
                    program: program.to_string(),
                    source,
                }
            })
    }
}
