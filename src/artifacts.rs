//! Locating the files the bytecode compiler generates for a source unit.
//!
//! The compiler names its outputs `<prefix><stem><infix>.<suffix>`, where the
//! prefix depends on the path it was given. Only the `<stem><infix>` part and
//! the suffix are stable, so the match requires exactly one file ending with
//! the latter whose `_`-separated components start with the former.

use crate::settings::CompilerSettings;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(
        "expected exactly one file matching `{pattern}`, found {}: {}",
        .matches.len(),
        display_matches(.matches)
    )]
    ArtifactMatchError {
        pattern: String,
        matches: Vec<String>,
    },
    #[error("failed to read compiler output: {0}")]
    Io(#[from] std::io::Error),
}

fn display_matches(matches: &[String]) -> String {
    if matches.is_empty() {
        "none".to_string()
    } else {
        matches.join(", ")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Binary,
    Interface,
}

/// Naming convention of the compiler output, taken from settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPattern {
    infix: String,
    binary_suffix: String,
    interface_suffix: String,
}

impl ArtifactPattern {
    pub fn new(
        infix: impl Into<String>,
        binary_suffix: impl Into<String>,
        interface_suffix: impl Into<String>,
    ) -> Self {
        Self {
            infix: infix.into(),
            binary_suffix: binary_suffix.into(),
            interface_suffix: interface_suffix.into(),
        }
    }

    fn suffix(&self, kind: ArtifactKind) -> &str {
        match kind {
            ArtifactKind::Binary => &self.binary_suffix,
            ArtifactKind::Interface => &self.interface_suffix,
        }
    }

    /// Human-readable form of the pattern, e.g. `*Candy_sol*.bin`.
    pub fn describe(&self, stem: &str, kind: ArtifactKind) -> String {
        format!("*{stem}{}*.{}", self.infix, self.suffix(kind))
    }

    /// The compiler flattens the input path with `_`, so the stem starts
    /// either the name or a `_`-separated component.
    pub fn matches(&self, file_name: &str, stem: &str, kind: ArtifactKind) -> bool {
        let extension = format!(".{}", self.suffix(kind));
        let unit = format!("{stem}{}", self.infix);
        match file_name.strip_suffix(&extension) {
            Some(base) => {
                base == unit
                    || base.starts_with(&format!("{unit}_"))
                    || base.contains(&format!("_{unit}_"))
            }
            None => false,
        }
    }
}

impl From<&CompilerSettings> for ArtifactPattern {
    fn from(settings: &CompilerSettings) -> Self {
        Self::new(
            settings.artifact_infix.clone(),
            settings.binary_suffix.clone(),
            settings.interface_suffix.clone(),
        )
    }
}

/// Resolves artifacts inside a single compiler output directory.
#[derive(Debug, Clone)]
pub struct ArtifactLocator {
    dir: PathBuf,
    pattern: ArtifactPattern,
}

impl ArtifactLocator {
    pub fn new(dir: impl Into<PathBuf>, pattern: ArtifactPattern) -> Self {
        Self {
            dir: dir.into(),
            pattern,
        }
    }

    /// Path of the only file generated for `stem` of the given kind.
    pub async fn locate(&self, stem: &str, kind: ArtifactKind) -> Result<PathBuf, Error> {
        let mut matches = vec![];
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let file_name = entry.file_name().to_string_lossy().to_string();
            if self.pattern.matches(&file_name, stem, kind) {
                matches.push(file_name);
            }
        }
        matches.sort();

        match matches.as_slice() {
            [single] => Ok(self.dir.join(single)),
            _ => Err(Error::ArtifactMatchError {
                pattern: self.pattern.describe(stem, kind),
                matches,
            }),
        }
    }

    /// Contents of the only file generated for `stem` of the given kind.
    pub async fn read(&self, stem: &str, kind: ArtifactKind) -> Result<String, Error> {
        let path = self.locate(stem, kind).await?;
        Ok(tokio::fs::read_to_string(path).await?)
    }

}
