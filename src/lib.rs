//! # swiss-knife
//!
//! A small bundle of command-line conveniences, usable as a library:
//!
//! * **mdtopdf**: Markdown to PDF through HTML and headless Chrome.
//! * **spotifydown**: Spotify tracks and playlists through `spotdl`.
//! * **ytdown**: YouTube videos through `yt-dlp`.
//!
//! ## Markdown-to-PDF pipeline
//!
//! ```text
//! input.md
//!  │
//!  ├─ 1. Read      the whole file
//!  ├─ 2. Parse     GFM (tables, strikethrough, task lists, heading ids, hard wraps)
//!  ├─ 3. Style     optional user CSS
//!  ├─ 4. Template  built-in stylesheet + user CSS + fragment
//!  ├─ 5. Park      self-deleting markdown-*.html temp file
//!  ├─ 6. Print     headless Chrome, 30 s deadline
//!  └─ 7. Write     atomic rename into output.pdf
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use swiss_knife::{convert, ConversionConfig, ConversionRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let request = ConversionRequest::new("notes.md").custom_css_path("print.css");
//!     let stats = convert(&request, &ConversionConfig::default()).await?;
//!     eprintln!("{} bytes → {}", stats.pdf_bytes, stats.output_path.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `swiss-knife` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod download;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    default_output_path, ConversionConfig, ConversionConfigBuilder, ConversionRequest, PageSize,
    PrintSettings,
};
pub use convert::{convert, convert_sync, convert_with_renderer, render_html};
pub use download::spotify::{AudioFormat, SpotifyRequest};
pub use download::youtube::{VideoFormat, YoutubeRequest};
pub use error::{DownloadError, Md2PdfError};
pub use output::ConversionStats;
pub use pipeline::render::{ChromeRenderer, PdfRenderer};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback, Stage};
