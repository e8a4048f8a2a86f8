use super::{Error, StainlessClient};
use crate::{
    consts::{VERIFIER_CACHE_DIR_FLAG, VERIFIER_JSON_FLAG},
    staging::{SourceFileSet, StagingArea},
    tool::{self, Invocation},
};
use tracing::instrument;

/// Verdict of the verifier: its console output and the report it wrote.
/// The report is passed through as written by the tool.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerificationResult {
    pub console: String,
    pub report: Option<String>,
}

const EMPTY_REPORT: &str = "{}";

impl StainlessClient {
    #[instrument(skip_all, fields(files = sources.len()))]
    pub async fn verify(&self, sources: &SourceFileSet) -> Result<VerificationResult, Error> {
        if sources.is_empty() {
            tracing::debug!("no sources given, verifier is not started");
            return Ok(VerificationResult::default());
        }

        let cache_dir = &self.verifier.cache_dir;
        tokio::fs::create_dir_all(cache_dir).await?;

        let staging = StagingArea::new()?;
        let file_names = staging.stage(sources).await?;

        let invocation = Invocation::new(&self.verifier.executable, staging.path())
            .arg(VERIFIER_JSON_FLAG)
            .arg(format!("{VERIFIER_CACHE_DIR_FLAG}={}", cache_dir.display()))
            .args(file_names);

        let run_result = {
            let _cache_guard = match &self.cache_lock {
                Some(lock) => Some(lock.lock().await),
                None => None,
            };
            self.run_tool(&invocation).await
        };
        // A failed run still may have produced a report, only a missing one is fatal.
        let (output, exec_error) = match run_result {
            Ok(output) => (output, None),
            Err(Error::Tool(err @ tool::Error::ExecutionFailed { .. })) => {
                let output = err.captured_output().cloned().unwrap_or_default();
                (output, Some(err))
            }
            Err(err) => return Err(err),
        };
        let console = output.stdout;

        let report_path = staging.path().join(&self.verifier.report_name);
        if !tokio::fs::try_exists(&report_path).await? {
            let error = match exec_error {
                Some(err) => err.to_string(),
                None => "verifier exited successfully without writing a report".to_string(),
            };
            return Err(Error::NoReport {
                error,
                console,
                stderr: output.stderr,
            });
        }

        let report = tokio::fs::read_to_string(&report_path).await?;
        if report.trim() == EMPTY_REPORT {
            return Err(Error::EmptyReport { console });
        }
        if let Some(err) = exec_error {
            tracing::debug!(err = %err, "verifier exited with an error but produced a report");
        }

        Ok(VerificationResult {
            console,
            report: Some(report),
        })
    }
}
