use crate::consts::{
    DEFAULT_ARTIFACT_INFIX, DEFAULT_BINARY_SUFFIX, DEFAULT_CACHE_DIR_NAME,
    DEFAULT_COMPILER_EXECUTABLE, DEFAULT_COMPILER_OUTPUT_DIR, DEFAULT_INTERFACE_SUFFIX,
    DEFAULT_REPORT_NAME, DEFAULT_TOOL_TIMEOUT_SECS, DEFAULT_TRANSPILED_EXTENSION,
    DEFAULT_VERIFIER_EXECUTABLE,
};
use anyhow::anyhow;
use config::{Config, File};
use serde::{de::IgnoredAny, Deserialize};
use serde_with::{serde_as, DurationSeconds};
use std::{
    net::SocketAddr,
    num::NonZeroUsize,
    path::{Component, Path, PathBuf},
    str::FromStr,
    time::Duration,
};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub server: ServerSettings,
    pub metrics: MetricsSettings,
    pub tracing: TracingSettings,
    pub verifier: VerifierSettings,
    pub compiler: CompilerSettings,
    pub tools: ToolsSettings,

    // Is required as we deny unknown fields, but allow users provide
    // path to config through PREFIX__CONFIG env variable. If removed,
    // the setup would fail with `unknown field `config`, expected one of...`
    #[serde(rename = "config")]
    pub config_path: IgnoredAny,
}

impl PartialEq for Settings {
    fn eq(&self, other: &Self) -> bool {
        self.server == other.server
            && self.metrics == other.metrics
            && self.tracing == other.tracing
            && self.verifier == other.verifier
            && self.compiler == other.compiler
            && self.tools == other.tools
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSettings {
    pub addr: SocketAddr,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from_str("0.0.0.0:8050").expect("should be valid url"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MetricsSettings {
    pub enabled: bool,
    pub addr: SocketAddr,
    pub route: String,
}

impl Default for MetricsSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            addr: SocketAddr::from_str("0.0.0.0:6060").expect("should be valid url"),
            route: "/metrics".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TracingFormat {
    #[default]
    Default,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TracingSettings {
    pub enabled: bool,
    pub format: TracingFormat,
}

impl Default for TracingSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            format: Default::default(),
        }
    }
}

/// Settings of the Stainless verifier executable.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VerifierSettings {
    pub executable: PathBuf,
    /// Cache directory shared by all verifier runs.
    /// Created on demand, never cleaned up by the service.
    pub cache_dir: PathBuf,
    pub report_name: String,
    /// Extension of the files produced by the transpilation mode.
    pub transpiled_extension: String,
    /// Whether verifier runs using the shared cache directory
    /// should wait for each other.
    pub serialize_cache_access: bool,
}

impl Default for VerifierSettings {
    fn default() -> Self {
        let mut cache_dir = std::env::temp_dir();
        cache_dir.push(DEFAULT_CACHE_DIR_NAME);
        Self {
            executable: PathBuf::from(DEFAULT_VERIFIER_EXECUTABLE),
            cache_dir,
            report_name: DEFAULT_REPORT_NAME.to_string(),
            transpiled_extension: DEFAULT_TRANSPILED_EXTENSION.to_string(),
            serialize_cache_access: true,
        }
    }
}

/// Settings of the bytecode compiler executable and
/// the naming convention of the files it generates.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompilerSettings {
    pub executable: PathBuf,
    /// Sub-directory of the staging area receiving compiler output.
    pub output_dir: String,
    pub artifact_infix: String,
    pub binary_suffix: String,
    pub interface_suffix: String,
}

impl Default for CompilerSettings {
    fn default() -> Self {
        Self {
            executable: PathBuf::from(DEFAULT_COMPILER_EXECUTABLE),
            output_dir: DEFAULT_COMPILER_OUTPUT_DIR.to_string(),
            artifact_infix: DEFAULT_ARTIFACT_INFIX.to_string(),
            binary_suffix: DEFAULT_BINARY_SUFFIX.to_string(),
            interface_suffix: DEFAULT_INTERFACE_SUFFIX.to_string(),
        }
    }
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolsSettings {
    /// Deadline of a single external tool run, in seconds.
    #[serde_as(as = "DurationSeconds<u64>")]
    pub timeout: Duration,
    pub max_threads: NonZeroUsize,
}

impl Default for ToolsSettings {
    fn default() -> Self {
        let max_threads = std::thread::available_parallelism().unwrap_or_else(|e| {
            tracing::warn!("cannot get number of CPU cores: {}", e);
            NonZeroUsize::new(8).expect("Is not zero")
        });
        Self {
            timeout: Duration::from_secs(DEFAULT_TOOL_TIMEOUT_SECS),
            max_threads,
        }
    }
}

impl Settings {
    pub fn new() -> anyhow::Result<Self> {
        let config_path = std::env::var("STAINLESS_SERVICE__CONFIG");

        let mut builder = Config::builder();
        if let Ok(config_path) = config_path {
            builder = builder.add_source(File::with_name(&config_path));
        };
        // Use `__` so that it would be possible to address keys with underscores in names (e.g. `cache_dir`)
        builder = builder
            .add_source(config::Environment::with_prefix("STAINLESS_SERVICE").separator("__"));

        let settings: Settings = builder.build()?.try_deserialize()?;

        settings.validate()?;

        Ok(settings)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.verifier.executable.as_os_str().is_empty() {
            return Err(anyhow!("`verifier.executable` should not be empty"));
        }
        if self.compiler.executable.as_os_str().is_empty() {
            return Err(anyhow!("`compiler.executable` should not be empty"));
        }
        if self.verifier.report_name.is_empty() {
            return Err(anyhow!("`verifier.report_name` should not be empty"));
        }
        if self.verifier.transpiled_extension.is_empty()
            || self.compiler.binary_suffix.is_empty()
            || self.compiler.interface_suffix.is_empty()
        {
            return Err(anyhow!(
                "file extensions and artifact suffixes should not be empty"
            ));
        }
        // the output directory is created inside each staging area
        let output_dir = Path::new(&self.compiler.output_dir);
        if self.compiler.output_dir.is_empty()
            || !output_dir
                .components()
                .all(|component| matches!(component, Component::Normal(_)))
        {
            return Err(anyhow!(
                "`compiler.output_dir` should be a non-empty relative path without `..`"
            ));
        }
        if self.tools.timeout.is_zero() {
            return Err(anyhow!("`tools.timeout` should be positive"));
        }

        Ok(())
    }
}
