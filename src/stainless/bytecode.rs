use super::{Error, StainlessClient};
use crate::{
    artifacts::{ArtifactKind, ArtifactLocator, ArtifactPattern},
    consts::{
        COMPILER_BINARY_FLAG, COMPILER_INTERFACE_FLAG, COMPILER_OUTPUT_DIR_FLAG,
        VERIFIER_TRANSPILE_FLAG,
    },
    staging::{SourceFileSet, StagingArea},
    tool::{self, absolute_path, Invocation},
};
use std::{
    collections::{BTreeMap, BTreeSet},
    path::Path,
};
use tracing::instrument;

/// Interface descriptor and hex-encoded bytecode of one transpiled unit.
/// The bytecode embeds compiler metadata and is not stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompiledArtifact {
    pub abi: String,
    pub bin: String,
}

/// Artifacts keyed by the name of the transpiled file they were compiled from.
pub type BytecodeResult = BTreeMap<String, CompiledArtifact>;

impl StainlessClient {
    #[instrument(skip_all, fields(files = sources.len()))]
    pub async fn generate_bytecode(
        &self,
        sources: &SourceFileSet,
    ) -> Result<BytecodeResult, Error> {
        let staging = StagingArea::new()?;
        let file_names = staging.stage(sources).await?;

        let transpiled = self.transpile(staging.path(), file_names).await?;
        tracing::debug!(transpiled = transpiled.len(), "transpilation finished");

        let output_dir = staging.path().join(&self.compiler.output_dir);
        self.compile(staging.path(), &transpiled, &output_dir).await?;

        let locator = ArtifactLocator::new(&output_dir, ArtifactPattern::from(&self.compiler));
        let mut result = BytecodeResult::new();
        for file_name in transpiled {
            let stem = file_stem(&file_name, &self.verifier.transpiled_extension);
            let abi = locator.read(stem, ArtifactKind::Interface).await?;
            let bin = locator.read(stem, ArtifactKind::Binary).await?;
            result.insert(file_name, CompiledArtifact { abi, bin });
        }

        Ok(result)
    }

    /// Converts the sources into the compiler's language and returns
    /// the names of the files produced in `dir`.
    async fn transpile(
        &self,
        dir: &Path,
        file_names: BTreeSet<String>,
    ) -> Result<BTreeSet<String>, Error> {
        let invocation = Invocation::new(&self.verifier.executable, dir)
            .arg(VERIFIER_TRANSPILE_FLAG)
            .args(file_names);

        match self.run_tool(&invocation).await {
            Ok(_) => {}
            // The verifier may fail on some sources and still emit the rest.
            Err(Error::Tool(err @ tool::Error::ExecutionFailed { .. })) => {
                let stdout = err
                    .captured_output()
                    .map(|output| output.stdout.as_str())
                    .unwrap_or_default();
                tracing::warn!(
                    err = %err,
                    stdout,
                    "transpilation exited with an error, continuing"
                );
            }
            Err(err) => return Err(err),
        }

        let extension = format!(".{}", self.verifier.transpiled_extension);
        let mut transpiled = BTreeSet::new();
        let mut entries = tokio::fs::read_dir(dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let file_name = entry.file_name().to_string_lossy().to_string();
            if file_name.ends_with(&extension) {
                transpiled.insert(file_name);
            }
        }

        Ok(transpiled)
    }

    async fn compile(
        &self,
        dir: &Path,
        file_names: &BTreeSet<String>,
        output_dir: &Path,
    ) -> Result<(), Error> {
        let invocation = Invocation::new(&self.compiler.executable, dir)
            .arg(COMPILER_BINARY_FLAG)
            .arg(COMPILER_INTERFACE_FLAG)
            .arg(COMPILER_OUTPUT_DIR_FLAG)
            .arg(output_dir.to_string_lossy())
            // the compiler resolves relative inputs unreliably
            .args(
                file_names
                    .iter()
                    .map(|name| absolute_path(dir, name).to_string_lossy().to_string()),
            );

        match self.run_tool(&invocation).await {
            Ok(_) => Ok(()),
            Err(Error::Tool(tool::Error::ExecutionFailed {
                program,
                status,
                output,
            })) => Err(Error::CompilationFailed {
                error: format!("`{program}` exited with {status}"),
                stdout: output.stdout,
                stderr: output.stderr,
            }),
            Err(err) => Err(err),
        }
    }
}

fn file_stem<'a>(file_name: &'a str, extension: &str) -> &'a str {
    file_name
        .strip_suffix(extension)
        .and_then(|stem| stem.strip_suffix('.'))
        .unwrap_or(file_name)
}
