use crate::consts::STAGING_DIR_PREFIX;
use std::{
    collections::{BTreeMap, BTreeSet},
    path::{Component, Path, PathBuf},
};
use tempfile::TempDir;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid file name {0:?}: only relative paths inside the source set are allowed")]
    InvalidFileName(String),
    #[error("failed to stage sources: {0}")]
    IOFailure(#[from] std::io::Error),
}

/// Source file name mapped to its contents.
pub type SourceFileSet = BTreeMap<String, String>;

/// Temporary directory holding one pipeline invocation's files.
/// Removed together with everything inside when dropped.
#[derive(Debug)]
pub struct StagingArea {
    dir: TempDir,
}

impl StagingArea {
    pub fn new() -> Result<Self, Error> {
        let dir = tempfile::Builder::new()
            .prefix(STAGING_DIR_PREFIX)
            .tempdir()?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Writes every source as a file named by its key and
    /// returns the names written.
    pub async fn stage(&self, sources: &SourceFileSet) -> Result<BTreeSet<String>, Error> {
        // Validate everything first so that a bad name fails before any write.
        let targets = sources
            .iter()
            .map(|(name, content)| Ok((name, self.target_path(name)?, content)))
            .collect::<Result<Vec<_>, Error>>()?;

        let mut written = BTreeSet::new();
        for (name, path, content) in targets {
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&path, content).await?;
            written.insert(name.clone());
        }
        tracing::debug!(files = written.len(), dir = %self.path().display(), "sources staged");

        Ok(written)
    }

    fn target_path(&self, name: &str) -> Result<PathBuf, Error> {
        let relative = Path::new(name);
        let is_plain = relative
            .components()
            .all(|component| matches!(component, Component::Normal(_) | Component::CurDir));
        let names_a_file = relative
            .components()
            .any(|component| matches!(component, Component::Normal(_)));
        if name.is_empty() || !is_plain || !names_a_file {
            return Err(Error::InvalidFileName(name.to_string()));
        }
        Ok(self.path().join(relative))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sources(items: &[(&str, &str)]) -> SourceFileSet {
        items
            .iter()
            .map(|(name, content)| (name.to_string(), content.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn writes_one_file_per_source() {
        let staging = StagingArea::new().unwrap();
        let input = sources(&[
            ("Candy.scala", "object Candy"),
            ("lib/Util.scala", "object Util"),
        ]);

        let written = staging.stage(&input).await.expect("staging failed");

        assert_eq!(
            written,
            BTreeSet::from(["Candy.scala".to_string(), "lib/Util.scala".to_string()])
        );
        for (name, content) in &input {
            let actual = std::fs::read_to_string(staging.path().join(name)).unwrap();
            assert_eq!(&actual, content);
        }
    }

    #[tokio::test]
    async fn directory_is_removed_on_drop() {
        let staging = StagingArea::new().unwrap();
        staging.stage(&sources(&[("A.scala", "")])).await.unwrap();
        let path = staging.path().to_path_buf();
        assert!(path.exists());

        drop(staging);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn escaping_names_are_rejected_before_writing() {
        for bad in ["../evil.scala", "/etc/passwd", "", "a/../../b.scala", "."] {
            let staging = StagingArea::new().unwrap();
            let input = sources(&[("Good.scala", "ok"), (bad, "bad")]);

            let err = staging.stage(&input).await.expect_err(bad);
            assert!(
                matches!(err, Error::InvalidFileName(ref name) if name == bad),
                "unexpected error for {bad:?}: {err}"
            );
            assert!(!staging.path().join("Good.scala").exists());
        }
    }

    #[test]
    fn staging_dirs_are_isolated() {
        let first = StagingArea::new().unwrap();
        let second = StagingArea::new().unwrap();
        assert_ne!(first.path(), second.path());
        let name = first.path().file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with(STAGING_DIR_PREFIX), "{name}");
    }
}
