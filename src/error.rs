//! Error types for the swiss-knife library.
//!
//! Two error types, one per command family:
//!
//! * [`Md2PdfError`]: the Markdown-to-PDF pipeline. Every variant maps to
//!   exactly one pipeline step, so a caller can tell from the variant alone
//!   how far a conversion got before it stopped.
//!
//! * [`DownloadError`]: the `spotdl` / `yt-dlp` wrappers. These only ever
//!   fail while preparing the output directory or while running the external
//!   tool.
//!
//! Both are fatal: nothing is retried internally.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the Markdown-to-PDF pipeline.
#[derive(Debug, Error)]
pub enum Md2PdfError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The Markdown file is missing or unreadable.
    #[error("failed to read input file '{path}': {source}")]
    InputRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The custom stylesheet is missing or unreadable.
    #[error("failed to read CSS file '{path}': {source}")]
    CssRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The Markdown could not be turned into HTML.
    #[error("failed to convert markdown '{path}': {detail}")]
    MarkdownParse { path: PathBuf, detail: String },

    // ── Render errors ─────────────────────────────────────────────────────
    /// The intermediate HTML file could not be created or written.
    #[error("failed to create temp file: {0}")]
    TempFile(#[source] std::io::Error),

    /// The browser did not produce a PDF before the deadline.
    #[error("PDF rendering timed out after {secs}s\nIncrease --timeout for large documents.")]
    RenderTimeout { secs: u64 },

    /// The browser failed to launch, load the page or print it.
    #[error("failed to generate PDF: {0}")]
    Render(String),

    // ── Output errors ─────────────────────────────────────────────────────
    /// Could not create or write the output PDF.
    #[error("failed to write PDF file '{path}': {source}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder or request validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Unexpected internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Errors returned by the downloader commands.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("invalid URL '{0}'")]
    InvalidUrl(String),

    #[error("failed to create output directory '{path}': {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The external tool is not installed or not on `PATH`.
    #[error("{tool} not found. Please install it using: {hint}")]
    ToolNotFound { tool: String, hint: String },

    #[error("failed to start {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    /// The tool ran but exited unsuccessfully. `code` is `None` when it was
    /// killed by a signal.
    #[error("{tool} failed to download (exit status: {})", .code.map_or_else(|| "signal".to_string(), |c| c.to_string()))]
    ToolFailed { tool: String, code: Option<i32> },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_timeout_display() {
        let e = Md2PdfError::RenderTimeout { secs: 30 };
        assert!(e.to_string().contains("30s"), "got: {e}");
    }

    #[test]
    fn input_read_display_names_path() {
        let e = Md2PdfError::InputRead {
            path: PathBuf::from("notes.md"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        let msg = e.to_string();
        assert!(msg.contains("notes.md"), "got: {msg}");
        assert!(msg.starts_with("failed to read input file"));
    }

    #[test]
    fn tool_not_found_display_has_hint() {
        let e = DownloadError::ToolNotFound {
            tool: "spotdl".into(),
            hint: "pip install spotdl".into(),
        };
        assert_eq!(
            e.to_string(),
            "spotdl not found. Please install it using: pip install spotdl"
        );
    }

    #[test]
    fn tool_failed_display() {
        let e = DownloadError::ToolFailed {
            tool: "yt-dlp".into(),
            code: Some(2),
        };
        assert!(e.to_string().contains("exit status: 2"));

        let killed = DownloadError::ToolFailed {
            tool: "yt-dlp".into(),
            code: None,
        };
        assert!(killed.to_string().contains("signal"));
    }
}
