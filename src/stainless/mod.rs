mod bytecode;
mod verification;

pub use bytecode::{BytecodeResult, CompiledArtifact};
pub use verification::VerificationResult;

use crate::{
    artifacts, metrics,
    settings::{CompilerSettings, ToolsSettings, VerifierSettings},
    staging,
    tool::{self, Invocation, ProcessRunner, ToolOutput, ToolRunner},
};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, Semaphore};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Staging(#[from] staging::Error),
    #[error(transparent)]
    Tool(#[from] tool::Error),
    #[error("verifier produced no report: {error}\nConsole:\n{console}{}", with_stderr(.stderr))]
    NoReport {
        error: String,
        console: String,
        stderr: String,
    },
    #[error("Error in Stainless execution -- Console:\n{console}")]
    EmptyReport { console: String },
    #[error("compilation failed: {error}\n{stdout}{}", with_stderr(.stderr))]
    CompilationFailed {
        error: String,
        stdout: String,
        stderr: String,
    },
    #[error(transparent)]
    Artifact(#[from] artifacts::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to acquire tool slot: {0}")]
    Acquire(#[from] tokio::sync::AcquireError),
}

fn with_stderr(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!("\nStderr:\n{stderr}")
    }
}

/// Runs the Stainless verifier and the bytecode compiler
/// with the configuration they were created with.
pub struct StainlessClient {
    verifier: VerifierSettings,
    compiler: CompilerSettings,
    runner: Arc<dyn ToolRunner>,
    threads_semaphore: Semaphore,
    cache_lock: Option<Mutex<()>>,
}

impl StainlessClient {
    pub fn new(
        verifier: VerifierSettings,
        compiler: CompilerSettings,
        tools: &ToolsSettings,
    ) -> Self {
        let runner = Arc::new(ProcessRunner::new(tools.timeout));
        Self::with_runner(verifier, compiler, tools, runner)
    }

    pub fn with_runner(
        verifier: VerifierSettings,
        compiler: CompilerSettings,
        tools: &ToolsSettings,
        runner: Arc<dyn ToolRunner>,
    ) -> Self {
        let cache_lock = verifier.serialize_cache_access.then(|| Mutex::new(()));
        Self {
            verifier,
            compiler,
            runner,
            threads_semaphore: Semaphore::new(tools.max_threads.get()),
            cache_lock,
        }
    }

    /// Runs one invocation once a tool slot is free.
    async fn run_tool(&self, invocation: &Invocation) -> Result<ToolOutput, Error> {
        let _permit = {
            let _queued = metrics::GaugeGuard::inc(&metrics::TOOLS_IN_QUEUE);
            self.threads_semaphore.acquire().await?
        };
        Ok(self.runner.run(invocation).await?)
    }
}
