//! HTML → PDF: the print step.
//!
//! [`PdfRenderer`] is the seam between the pipeline and whatever actually
//! lays out pages. The production implementation, [`ChromeRenderer`], drives
//! a headless Chrome over the DevTools protocol with `chromiumoxide`; tests
//! substitute their own implementations.
//!
//! The deadline lives outside the renderer in [`render_with_deadline`], so
//! every implementation gets the same timeout semantics. When the deadline
//! fires the render future is dropped, and `ChromeRenderer` tears down its
//! browser process and event-loop task on drop.

use crate::config::{ConversionConfig, PrintSettings};
use crate::error::Md2PdfError;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::PrintToPdfParams;
use futures::StreamExt;
use std::path::PathBuf;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Anything that can turn a loaded HTML document into PDF bytes.
#[async_trait]
pub trait PdfRenderer: Send + Sync {
    /// Load `document_url` and print it with `settings`.
    async fn render_pdf(
        &self,
        document_url: &str,
        settings: &PrintSettings,
    ) -> Result<Vec<u8>, Md2PdfError>;
}

/// Run `renderer` with a hard deadline.
///
/// Expiry maps to [`Md2PdfError::RenderTimeout`]; every other failure is
/// passed through. An empty result counts as a render failure.
pub async fn render_with_deadline(
    renderer: &dyn PdfRenderer,
    document_url: &str,
    settings: &PrintSettings,
    deadline: Duration,
) -> Result<Vec<u8>, Md2PdfError> {
    let pdf = tokio::time::timeout(deadline, renderer.render_pdf(document_url, settings))
        .await
        .map_err(|_| Md2PdfError::RenderTimeout {
            secs: deadline.as_secs(),
        })??;

    if pdf.is_empty() {
        return Err(Md2PdfError::Render("renderer returned an empty PDF".into()));
    }
    Ok(pdf)
}

/// Headless Chrome/Chromium renderer.
#[derive(Debug, Clone, Default)]
pub struct ChromeRenderer {
    executable: Option<PathBuf>,
    no_sandbox: bool,
}

impl ChromeRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &ConversionConfig) -> Self {
        Self {
            executable: config.chrome_executable.clone(),
            no_sandbox: config.no_sandbox,
        }
    }

    fn browser_config(&self) -> Result<BrowserConfig, Md2PdfError> {
        let mut builder = BrowserConfig::builder();
        if let Some(ref exe) = self.executable {
            builder = builder.chrome_executable(exe);
        }
        if self.no_sandbox {
            builder = builder.no_sandbox();
        }
        builder
            .build()
            .map_err(|e| Md2PdfError::Render(format!("invalid browser configuration: {e}")))
    }
}

#[async_trait]
impl PdfRenderer for ChromeRenderer {
    async fn render_pdf(
        &self,
        document_url: &str,
        settings: &PrintSettings,
    ) -> Result<Vec<u8>, Md2PdfError> {
        let (mut browser, mut handler) = Browser::launch(self.browser_config()?)
            .await
            .map_err(|e| Md2PdfError::Render(format!("failed to launch Chrome: {e}")))?;

        // The DevTools connection only makes progress while its handler is polled.
        let _events = AbortOnDrop(tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Chrome event loop: {}", e);
                }
            }
        }));

        info!("Loading {}", document_url);
        let page = browser
            .new_page(document_url)
            .await
            .map_err(|e| Md2PdfError::Render(format!("failed to open page: {e}")))?;
        page.wait_for_navigation()
            .await
            .map_err(|e| Md2PdfError::Render(format!("page did not finish loading: {e}")))?;
        page.find_element("body")
            .await
            .map_err(|e| Md2PdfError::Render(format!("document has no body: {e}")))?;

        let pdf = page
            .pdf(print_params(settings))
            .await
            .map_err(|e| Md2PdfError::Render(format!("print to PDF failed: {e}")))?;
        debug!("Chrome produced {} bytes of PDF", pdf.len());

        if let Err(e) = browser.close().await {
            warn!("Failed to close Chrome cleanly: {}", e);
        }
        if let Err(e) = browser.wait().await {
            warn!("Failed to reap Chrome process: {}", e);
        }

        Ok(pdf)
    }
}

/// Map [`PrintSettings`] onto the DevTools `Page.printToPDF` parameters.
fn print_params(settings: &PrintSettings) -> PrintToPdfParams {
    PrintToPdfParams {
        print_background: Some(settings.print_background),
        paper_width: Some(settings.paper_width_in),
        paper_height: Some(settings.paper_height_in),
        margin_top: Some(settings.margin_in),
        margin_bottom: Some(settings.margin_in),
        margin_left: Some(settings.margin_in),
        margin_right: Some(settings.margin_in),
        ..Default::default()
    }
}

/// Aborts the wrapped task when dropped.
struct AbortOnDrop(JoinHandle<()>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}
