//! Running external executables (the Stainless verifier, the bytecode compiler)
//! under a deadline.

use crate::metrics;
use async_trait::async_trait;
use mockall::automock;
use std::{
    fmt,
    path::{Path, PathBuf},
    process::{ExitStatus, Stdio},
    time::Duration,
};
use thiserror::Error;
use tokio::process::Command;
use tracing::instrument;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{program}` did not finish within {}s and was killed", .timeout.as_secs())]
    Timeout { program: String, timeout: Duration },
    #[error("`{program}` exited with {status}")]
    ExecutionFailed {
        program: String,
        status: ExitStatus,
        output: ToolOutput,
    },
}

impl Error {
    /// Output captured before the tool failed, if it ran to completion.
    pub fn captured_output(&self) -> Option<&ToolOutput> {
        match self {
            Error::ExecutionFailed { output, .. } => Some(output),
            Error::Spawn { .. } | Error::Timeout { .. } => None,
        }
    }
}

/// A single run of an external executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
}

impl Invocation {
    pub fn new(program: impl Into<PathBuf>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: vec![],
            working_dir: working_dir.into(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// File name of the program, used to label logs and metrics.
    pub fn tool_name(&self) -> String {
        self.program
            .file_name()
            .unwrap_or(self.program.as_os_str())
            .to_string_lossy()
            .to_string()
    }
}

#[derive(Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
}

impl fmt::Debug for ToolOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolOutput")
            .field("stdout_len", &self.stdout.len())
            .field("stderr_len", &self.stderr.len())
            .finish()
    }
}

impl ToolOutput {
    fn from_raw(output: &std::process::Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }
}

#[automock]
#[async_trait]
pub trait ToolRunner: Send + Sync {
    /// Runs the invocation to completion. A single attempt, no retries.
    async fn run(&self, invocation: &Invocation) -> Result<ToolOutput, Error>;
}

/// Spawns invocations as child processes of the service.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    timeout: Duration,
}

impl ProcessRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl ToolRunner for ProcessRunner {
    #[instrument(
        name = "run_tool",
        skip_all,
        fields(tool = %invocation.tool_name(), args = invocation.args.len()),
        level = "debug"
    )]
    async fn run(&self, invocation: &Invocation) -> Result<ToolOutput, Error> {
        let program = invocation.program.to_string_lossy().to_string();
        tracing::debug!(
            working_dir = %invocation.working_dir.display(),
            "starting external tool"
        );

        // The child is killed as soon as its handle is dropped,
        // which is what happens when the deadline elapses.
        let child = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| Error::Spawn {
                program: program.clone(),
                source,
            })?;

        let output = {
            let _timer = metrics::TOOL_EXECUTION_TIME
                .with_label_values(&[&invocation.tool_name()])
                .start_timer();
            tokio::time::timeout(self.timeout, child.wait_with_output()).await
        };
        let output = match output {
            Ok(output) => output.map_err(|source| Error::Spawn {
                program: program.clone(),
                source,
            })?,
            Err(_elapsed) => {
                tracing::warn!(program, timeout = ?self.timeout, "external tool timed out");
                return Err(Error::Timeout {
                    program,
                    timeout: self.timeout,
                });
            }
        };

        let captured = ToolOutput::from_raw(&output);
        if !output.status.success() {
            return Err(Error::ExecutionFailed {
                program,
                status: output.status,
                output: captured,
            });
        }

        Ok(captured)
    }
}

/// Absolute form of `path` relative to `base`; absolute paths are returned as is.
pub fn absolute_path(base: &Path, path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
