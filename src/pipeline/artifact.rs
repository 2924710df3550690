//! The intermediate HTML file handed to the browser.
//!
//! Chrome loads documents by URL, so the templated HTML has to exist on disk
//! for the duration of the print step. [`TemporaryArtifact`] owns that file
//! through a [`tempfile::NamedTempFile`]: it gets a unique name (parallel
//! invocations never collide) and is deleted when the artifact is dropped,
//! whether the render succeeded, failed, timed out or panicked.

use crate::error::Md2PdfError;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};
use url::Url;

pub struct TemporaryArtifact {
    file: NamedTempFile,
}

impl TemporaryArtifact {
    /// Create `markdown-XXXXXX.html` in `dir` (or the OS temp dir) holding `html`.
    pub fn create(dir: Option<&Path>, html: &str) -> Result<Self, Md2PdfError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("markdown-").suffix(".html");

        let mut file = match dir {
            Some(d) => builder.tempfile_in(d),
            None => builder.tempfile(),
        }
        .map_err(Md2PdfError::TempFile)?;

        file.write_all(html.as_bytes())
            .and_then(|_| file.flush())
            .map_err(Md2PdfError::TempFile)?;

        debug!("Wrote {} bytes of HTML to {}", html.len(), file.path().display());
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// `file://` URL of the artifact, suitable for browser navigation.
    pub fn file_url(&self) -> Result<String, Md2PdfError> {
        let path = absolute(self.path())?;
        Url::from_file_path(&path)
            .map(String::from)
            .map_err(|_| {
                Md2PdfError::Internal(format!(
                    "cannot express '{}' as a file URL",
                    path.display()
                ))
            })
    }

    /// Delete the file now, logging rather than failing if that goes wrong.
    ///
    /// Dropping the artifact has the same effect; this only surfaces the
    /// error in the logs.
    pub fn release(self) {
        let path = self.path().to_path_buf();
        if let Err(e) = self.file.close() {
            warn!("Failed to remove temp file {}: {}", path.display(), e);
        }
    }
}

fn absolute(path: &Path) -> Result<PathBuf, Md2PdfError> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .map_err(|e| Md2PdfError::Internal(format!("cannot resolve working directory: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn created_in_requested_dir_and_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = TemporaryArtifact::create(Some(dir.path()), "<p>x</p>").unwrap();
        let path = artifact.path().to_path_buf();

        assert!(path.starts_with(dir.path()));
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("markdown-") && name.ends_with(".html"), "{name}");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<p>x</p>");

        drop(artifact);
        assert!(!path.exists());
    }

    #[test]
    fn release_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = TemporaryArtifact::create(Some(dir.path()), "").unwrap();
        let path = artifact.path().to_path_buf();
        artifact.release();
        assert!(!path.exists());
    }

    #[test]
    fn names_are_unique() {
        let dir = tempfile::tempdir().unwrap();
        let a = TemporaryArtifact::create(Some(dir.path()), "a").unwrap();
        let b = TemporaryArtifact::create(Some(dir.path()), "b").unwrap();
        assert_ne!(a.path(), b.path());
    }

    #[test]
    fn file_url_is_absolute() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = TemporaryArtifact::create(Some(dir.path()), "").unwrap();
        let url = artifact.file_url().unwrap();
        assert!(url.starts_with("file:///"), "{url}");
        assert!(url.ends_with(".html"), "{url}");
    }

    #[test]
    fn missing_dir_is_temp_file_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = TemporaryArtifact::create(Some(&missing), "").err().unwrap();
        assert!(matches!(err, Md2PdfError::TempFile(_)));
    }
}
