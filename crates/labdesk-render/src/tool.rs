use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("{0} is not installed or not on PATH")]
    NotInstalled(String),

    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("{program} timed out after {}s", .after.as_secs())]
    TimedOut { program: String, after: Duration },

    #[error("{program} exited with {}: {stderr}", exit_label(.code))]
    Failed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("status {c}"),
        None => "a signal".to_string(),
    }
}

/// One invocation of an external converter. Arguments are passed directly,
/// never through a shell.
#[derive(Debug, Clone)]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<OsString>,
    pub working_dir: Option<PathBuf>,
    pub timeout: Duration,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
            timeout,
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }
}

#[derive(Debug)]
pub struct ToolOutput {
    pub stdout: Vec<u8>,
    pub stderr: String,
    pub elapsed: Duration,
}

/// Run a tool to completion. A non-zero exit is an error; when the timeout
/// fires the child is killed.
pub async fn run(cmd: &ToolCommand) -> Result<ToolOutput, ToolError> {
    let mut command = Command::new(&cmd.program);
    command
        .args(&cmd.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(dir) = &cmd.working_dir {
        command.current_dir(dir);
    }

    let started = Instant::now();
    let child = command.spawn().map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ToolError::NotInstalled(cmd.program.clone())
        } else {
            ToolError::Spawn {
                program: cmd.program.clone(),
                source: e,
            }
        }
    })?;

    // Dropping the future on timeout drops the child, which kills it.
    let output = match timeout(cmd.timeout, child.wait_with_output()).await {
        Ok(result) => result.map_err(|e| ToolError::Spawn {
            program: cmd.program.clone(),
            source: e,
        })?,
        Err(_) => {
            return Err(ToolError::TimedOut {
                program: cmd.program.clone(),
                after: cmd.timeout,
            })
        }
    };
    let elapsed = started.elapsed();
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

    if !output.status.success() {
        return Err(ToolError::Failed {
            program: cmd.program.clone(),
            code: output.status.code(),
            stderr,
        });
    }

    debug!(program = %cmd.program, elapsed_ms = elapsed.as_millis() as u64, "tool finished");
    Ok(ToolOutput {
        stdout: output.stdout,
        stderr,
        elapsed,
    })
}
