//! Downloader commands: thin wrappers around external tools.
//!
//! All the real work happens inside `spotdl` and `yt-dlp`. This module only
//! prepares the output directory, checks that the tool is installed, builds
//! its argument list and forwards its exit status. The child inherits our
//! stdin/stdout/stderr so the tool's own progress output reaches the user.

pub mod spotify;
pub mod youtube;

use crate::error::DownloadError;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};
use url::Url;

/// An external executable plus the hint shown when it is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tool {
    pub program: &'static str,
    pub install_hint: &'static str,
}

/// `~/<relative>`, falling back to the working directory when there is no home.
pub(crate) fn home_subdir(relative: &[&str]) -> PathBuf {
    let mut dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    dir.extend(relative);
    dir
}

/// Accept only absolute http(s) URLs.
pub fn validate_url(input: &str) -> Result<Url, DownloadError> {
    match Url::parse(input.trim()) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => Ok(url),
        _ => Err(DownloadError::InvalidUrl(input.to_string())),
    }
}

/// Whether `tool --version` runs and exits successfully.
pub async fn is_tool_available(tool: &Tool) -> Result<bool, DownloadError> {
    let status = Command::new(tool.program)
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await;

    match status {
        Ok(status) => Ok(status.success()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(DownloadError::Spawn {
            tool: tool.program.to_string(),
            source: e,
        }),
    }
}

pub(crate) async fn ensure_output_dir(dir: &Path) -> Result<(), DownloadError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| DownloadError::CreateDir {
            path: dir.to_path_buf(),
            source: e,
        })
}

/// Prepare `output_dir`, verify `tool` is installed, then run it to completion.
pub(crate) async fn run_tool(
    tool: &Tool,
    output_dir: &Path,
    args: &[String],
) -> Result<(), DownloadError> {
    ensure_output_dir(output_dir).await?;

    if !is_tool_available(tool).await? {
        return Err(not_found(tool));
    }

    info!("Running {} {}", tool.program, args.join(" "));
    let status = Command::new(tool.program)
        .args(args)
        .kill_on_drop(true)
        .status()
        .await
        .map_err(|e| match e.kind() {
            ErrorKind::NotFound => not_found(tool),
            _ => DownloadError::Spawn {
                tool: tool.program.to_string(),
                source: e,
            },
        })?;

    debug!("{} exited with {}", tool.program, status);
    if !status.success() {
        return Err(DownloadError::ToolFailed {
            tool: tool.program.to_string(),
            code: status.code(),
        });
    }
    Ok(())
}

fn not_found(tool: &Tool) -> DownloadError {
    DownloadError::ToolNotFound {
        tool: tool.program.to_string(),
        hint: tool.install_hint.to_string(),
    }
}

/// Join a directory and a tool-specific file-name template.
pub(crate) fn output_template(dir: &Path, template: &str) -> String {
    dir.join(template).to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_http_urls() {
        assert!(validate_url("https://open.spotify.com/track/abc").is_ok());
        assert!(validate_url("http://youtube.com/watch?v=x").is_ok());
        assert!(validate_url("  https://youtu.be/x  ").is_ok());
    }

    #[test]
    fn rejects_other_inputs() {
        for bad in ["", "not a url", "ftp://example.com/a", "file:///etc/passwd", "spotify:track:abc"] {
            assert!(
                matches!(validate_url(bad), Err(DownloadError::InvalidUrl(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn missing_tool_is_unavailable() {
        let tool = Tool {
            program: "swiss-knife-definitely-not-installed",
            install_hint: "n/a",
        };
        assert!(!is_tool_available(&tool).await.unwrap());
    }

    #[tokio::test]
    async fn run_missing_tool_reports_hint() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let tool = Tool {
            program: "swiss-knife-definitely-not-installed",
            install_hint: "pip install nothing",
        };
        let err = run_tool(&tool, &out, &[]).await.unwrap_err();
        assert!(
            matches!(err, DownloadError::ToolNotFound { ref hint, .. } if hint == "pip install nothing"),
            "{err:?}"
        );
        // The directory is prepared before the tool is probed.
        assert!(out.is_dir());
    }

    #[tokio::test]
    async fn output_dir_under_a_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("file");
        std::fs::write(&file, b"").unwrap();
        let err = ensure_output_dir(&file.join("sub")).await.unwrap_err();
        assert!(matches!(err, DownloadError::CreateDir { .. }));
    }

    #[test]
    fn home_subdir_appends_components() {
        let dir = home_subdir(&["Music", "Spotify"]);
        assert!(dir.ends_with("Music/Spotify"));
    }
}
