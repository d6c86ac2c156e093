//! Output path planning and collision-safe writes.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::io::AsyncWriteExt;

/// Filesystem failures on the output side.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Output file already exists: {}", path.display())]
    FileExists { path: PathBuf },

    #[error("Permission denied writing {}: {source}", path.display())]
    Access {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// The ordered output paths for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPlan {
    paths: Vec<PathBuf>,
}

impl OutputPlan {
    /// Compute the paths without touching the filesystem.
    ///
    /// `count == 1` yields the base path itself; larger counts number each
    /// file `stem-1.ext`, `stem-2.ext`, ... next to the base path.
    pub fn compute(base: &Path, count: usize) -> Self {
        if count <= 1 {
            return Self {
                paths: vec![base.to_path_buf()],
            };
        }

        let stem = base.file_stem().map(OsString::from).unwrap_or_default();
        let paths = (1..=count)
            .map(|n| {
                let mut name = stem.clone();
                name.push(format!("-{n}"));
                if let Some(ext) = base.extension() {
                    name.push(".");
                    name.push(ext);
                }
                base.with_file_name(name)
            })
            .collect();

        Self { paths }
    }

    /// Compute the paths and fail on the first one that already exists.
    pub async fn plan(base: &Path, count: usize) -> Result<Self, OutputError> {
        let plan = Self::compute(base, count);
        for path in &plan.paths {
            ensure_absent(path).await?;
        }
        Ok(plan)
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Fail with `FileExists` if something is already at `path`.
///
/// An existence check that itself errors is treated as "absent"; the
/// exclusive create in [`write_exclusive`] still guards the write.
pub async fn ensure_absent(path: &Path) -> Result<(), OutputError> {
    match tokio::fs::try_exists(path).await {
        Ok(true) => Err(OutputError::FileExists {
            path: path.to_path_buf(),
        }),
        _ => Ok(()),
    }
}

/// Create parent directories, then write `bytes` to a file that must not
/// exist yet.
pub async fn write_exclusive(path: &Path, bytes: &[u8]) -> Result<(), OutputError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| map_write_error(parent, e))?;
    }

    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await
        .map_err(|e| map_write_error(path, e))?;

    file.write_all(bytes)
        .await
        .map_err(|e| map_write_error(path, e))?;
    file.flush().await.map_err(|e| map_write_error(path, e))?;

    tracing::debug!(path = %path.display(), size = bytes.len(), "Wrote output file");
    Ok(())
}

fn map_write_error(path: &Path, source: io::Error) -> OutputError {
    let path = path.to_path_buf();
    match source.kind() {
        io::ErrorKind::AlreadyExists => OutputError::FileExists { path },
        io::ErrorKind::PermissionDenied => OutputError::Access { path, source },
        _ => OutputError::Write { path, source },
    }
}
