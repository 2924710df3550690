//! The Markdown-to-PDF orchestrator.
//!
//! [`convert`] runs the whole pipeline with headless Chrome;
//! [`convert_with_renderer`] does the same with any [`PdfRenderer`].
//! Every step must finish before the next one starts, and the first error
//! aborts the conversion. Nothing is retried.
//!
//! The only output side effect is the final rename into `output_path`, so a
//! failed conversion never leaves a partial PDF behind. The intermediate HTML
//! file is owned by a [`TemporaryArtifact`] and is gone by the time any of
//! these functions return.

use crate::config::{ConversionConfig, ConversionRequest, PageSize, DEFAULT_MARGINS};
use crate::error::Md2PdfError;
use crate::output::ConversionStats;
use crate::pipeline::artifact::TemporaryArtifact;
use crate::pipeline::markdown;
use crate::pipeline::render::{render_with_deadline, ChromeRenderer, PdfRenderer};
use crate::pipeline::template::RenderedDocument;
use crate::progress::{ProgressCallback, Stage};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Convert a Markdown file to PDF using headless Chrome.
///
/// # Example
/// ```rust,no_run
/// use swiss_knife::{convert, ConversionConfig, ConversionRequest};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let request = ConversionRequest::new("README.md");
/// let stats = convert(&request, &ConversionConfig::default()).await?;
/// println!("wrote {} bytes to {}", stats.pdf_bytes, stats.output_path.display());
/// # Ok(())
/// # }
/// ```
pub async fn convert(
    request: &ConversionRequest,
    config: &ConversionConfig,
) -> Result<ConversionStats, Md2PdfError> {
    let renderer = ChromeRenderer::from_config(config);
    convert_with_renderer(request, config, &renderer).await
}

/// Convert a Markdown file to PDF with a caller-supplied renderer.
pub async fn convert_with_renderer(
    request: &ConversionRequest,
    config: &ConversionConfig,
    renderer: &dyn PdfRenderer,
) -> Result<ConversionStats, Md2PdfError> {
    let total_start = Instant::now();
    info!(
        "Converting {} → {}",
        request.input_path.display(),
        request.output_path.display()
    );
    warn_on_unapplied_page_options(request);

    let tracker = StageTracker::new(config.progress_callback.as_ref());
    if let Some(cb) = tracker.cb {
        cb.on_conversion_start(&request.input_path);
    }

    // ── Steps 1–4: Markdown → HTML document ──────────────────────────────
    let (markdown_bytes, html) = build_document(request, &tracker).await?;

    // ── Step 5: Park the document on disk ────────────────────────────────
    let started = tracker.start(Stage::WriteTemp);
    let artifact = TemporaryArtifact::create(config.temp_dir.as_deref(), &html)?;
    let url = artifact.file_url()?;
    tracker.finish(Stage::WriteTemp, started);

    // ── Step 6: Print ────────────────────────────────────────────────────
    let started = tracker.start(Stage::Render);
    let pdf = render_with_deadline(renderer, &url, &config.print, config.render_timeout()).await?;
    let render_duration_ms = tracker.finish(Stage::Render, started);
    info!("Rendered {} bytes of PDF in {}ms", pdf.len(), render_duration_ms);

    // ── Step 7: Write the PDF ────────────────────────────────────────────
    let started = tracker.start(Stage::WriteOutput);
    write_atomically(&request.output_path, &pdf).await?;
    tracker.finish(Stage::WriteOutput, started);

    // ── Step 8: Drop the intermediate HTML ───────────────────────────────
    artifact.release();

    let stats = ConversionStats {
        input_path: request.input_path.clone(),
        output_path: request.output_path.clone(),
        markdown_bytes,
        html_bytes: html.len(),
        pdf_bytes: pdf.len(),
        render_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };
    info!(
        "Conversion complete: {} bytes in {}ms",
        stats.pdf_bytes, stats.total_duration_ms
    );
    if let Some(cb) = tracker.cb {
        cb.on_conversion_complete(&stats);
    }
    Ok(stats)
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(
    request: &ConversionRequest,
    config: &ConversionConfig,
) -> Result<ConversionStats, Md2PdfError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Md2PdfError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert(request, config))
}

/// Produce the complete HTML document for `request` without printing it.
///
/// This is exactly what the browser would load, which makes it handy for
/// debugging stylesheets.
pub async fn render_html(request: &ConversionRequest) -> Result<String, Md2PdfError> {
    let (_, html) = build_document(request, &StageTracker::new(None)).await?;
    Ok(html)
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Steps 1–4: read the input, parse it, read the CSS, template.
///
/// Returns the Markdown size alongside the finished document.
async fn build_document(
    request: &ConversionRequest,
    tracker: &StageTracker<'_>,
) -> Result<(usize, String), Md2PdfError> {
    let started = tracker.start(Stage::ReadInput);
    let source = tokio::fs::read(&request.input_path)
        .await
        .map_err(|e| Md2PdfError::InputRead {
            path: request.input_path.clone(),
            source: e,
        })?;
    tracker.finish(Stage::ReadInput, started);

    let started = tracker.start(Stage::ParseMarkdown);
    let fragment = markdown::parse(&source).map_err(|e| Md2PdfError::MarkdownParse {
        path: request.input_path.clone(),
        detail: format!("input is not valid UTF-8: {e}"),
    })?;
    tracker.finish(Stage::ParseMarkdown, started);

    let custom_css = match request.css_path() {
        Some(path) => {
            let started = tracker.start(Stage::ReadCss);
            let css = tokio::fs::read_to_string(path)
                .await
                .map_err(|e| Md2PdfError::CssRead {
                    path: path.to_path_buf(),
                    source: e,
                })?;
            tracker.finish(Stage::ReadCss, started);
            Some(css)
        }
        None => None,
    };

    let started = tracker.start(Stage::Template);
    let html = RenderedDocument::new(fragment, custom_css).to_html();
    tracker.finish(Stage::Template, started);

    Ok((source.len(), html))
}

/// Write to `<path>.tmp`, then rename over `path`.
async fn write_atomically(path: &Path, bytes: &[u8]) -> Result<(), Md2PdfError> {
    let write_err = |e: std::io::Error| Md2PdfError::OutputWrite {
        path: path.to_path_buf(),
        source: e,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    if let Err(e) = tokio::fs::write(&tmp_path, bytes).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(write_err(e));
    }
    if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(write_err(e));
    }
    debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

/// Page size and margins are accepted but the print step always uses the
/// configured [`crate::config::PrintSettings`].
fn warn_on_unapplied_page_options(request: &ConversionRequest) {
    if request.page_size != PageSize::A4 {
        warn!(
            "Page size {} is not applied; printing with the configured paper size",
            request.page_size
        );
    }
    if !request.margins_recognised() {
        warn!(
            "Margins {:?} are not a recognised length and are not applied",
            request.margins
        );
    } else if request.margins.trim() != DEFAULT_MARGINS {
        warn!(
            "Margins {} are not applied; printing with the configured margins",
            request.margins
        );
    }
}

/// Fires progress callbacks and times each stage.
struct StageTracker<'a> {
    cb: Option<&'a ProgressCallback>,
}

impl<'a> StageTracker<'a> {
    fn new(cb: Option<&'a ProgressCallback>) -> Self {
        Self { cb }
    }

    fn start(&self, stage: Stage) -> Instant {
        debug!("{}…", stage);
        if let Some(cb) = self.cb {
            cb.on_stage_start(stage);
        }
        Instant::now()
    }

    /// Returns the stage's wall-clock time in milliseconds.
    fn finish(&self, stage: Stage, started: Instant) -> u64 {
        let elapsed_ms = started.elapsed().as_millis() as u64;
        if let Some(cb) = self.cb {
            cb.on_stage_complete(stage, elapsed_ms);
        }
        elapsed_ms
    }
}
