//! External command execution

use std::io;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tracing::debug;

/// Binary invoked when none is configured
pub const DEFAULT_COMPOSE_BIN: &str = "docker-compose";

/// Captured result of a finished process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    /// Whether the process exited with status 0
    pub success: bool,
    /// Exit code, `None` when terminated by a signal
    pub code: Option<i32>,
}

impl CommandOutput {
    /// stdout followed by stderr
    pub fn combined(&self) -> String {
        let mut combined = String::with_capacity(self.stdout.len() + self.stderr.len());
        combined.push_str(&self.stdout);
        combined.push_str(&self.stderr);
        combined
    }

    /// Human readable exit status
    pub fn status_text(&self) -> String {
        match self.code {
            Some(code) => format!("exit status {}", code),
            None => "terminated by signal".to_string(),
        }
    }
}

impl From<std::process::Output> for CommandOutput {
    fn from(output: std::process::Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            success: output.status.success(),
            code: output.status.code(),
        }
    }
}

/// Runs one external command to completion
///
/// Blocks the calling thread until the process exits.
pub trait CommandRunner: Send + Sync {
    /// Program name, used in error messages
    fn program(&self) -> &str;

    /// Run the program with `args`, capturing its output
    fn run(&self, args: &[String]) -> io::Result<CommandOutput>;
}

/// Runner that shells out to the docker-compose CLI
#[derive(Debug, Clone)]
pub struct ComposeCli {
    program: String,
    workdir: PathBuf,
}

impl ComposeCli {
    pub fn new(program: impl Into<String>, workdir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            workdir: workdir.into(),
        }
    }
}

impl Default for ComposeCli {
    fn default() -> Self {
        Self::new(DEFAULT_COMPOSE_BIN, "./")
    }
}

impl CommandRunner for ComposeCli {
    fn program(&self) -> &str {
        &self.program
    }

    fn run(&self, args: &[String]) -> io::Result<CommandOutput> {
        debug!("Executing: {} {:?}", self.program, args);

        Command::new(&self.program)
            .args(args)
            .current_dir(&self.workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map(CommandOutput::from)
    }
}
