//! Configuration types for Markdown-to-PDF conversion.
//!
//! Two structs split "what to convert" from "how to convert it":
//!
//! * [`ConversionRequest`]: one per invocation: input, output, and the
//!   page options the user asked for.
//! * [`ConversionConfig`]: engine knobs (render deadline, temp directory,
//!   browser executable, progress callback), built via
//!   [`ConversionConfigBuilder`] and reusable across requests.

use crate::error::Md2PdfError;
use crate::progress::ProgressCallback;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Render deadline used when none is configured.
pub const DEFAULT_RENDER_TIMEOUT_SECS: u64 = 30;

/// Margin string used when none is given on the command line.
pub const DEFAULT_MARGINS: &str = "1in";

static RE_MARGIN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\d+(?:\.\d+)?\s*(?:in|cm|mm|px|pt)\s*$").unwrap());

// ── Request ──────────────────────────────────────────────────────────────

/// A single Markdown-to-PDF conversion.
///
/// # Example
/// ```rust
/// use swiss_knife::{ConversionRequest, PageSize};
///
/// let request = ConversionRequest::new("notes/todo.md");
/// assert_eq!(request.output_path.to_str(), Some("notes/todo.pdf"));
/// assert_eq!(request.page_size, PageSize::A4);
/// assert_eq!(request.margins, "1in");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionRequest {
    /// Markdown file to convert.
    pub input_path: PathBuf,

    /// Where the PDF is written. Default: input path with a `.pdf` extension.
    pub output_path: PathBuf,

    /// Requested paper size. Default: A4.
    pub page_size: PageSize,

    /// Requested page margins, e.g. `1in` or `2cm`. Default: `1in`.
    pub margins: String,

    /// Optional stylesheet appended after the built-in styles.
    pub custom_css_path: Option<PathBuf>,
}

impl ConversionRequest {
    /// Create a request with every option at its default.
    pub fn new(input_path: impl Into<PathBuf>) -> Self {
        let input_path = input_path.into();
        let output_path = default_output_path(&input_path);
        Self {
            input_path,
            output_path,
            page_size: PageSize::default(),
            margins: DEFAULT_MARGINS.to_string(),
            custom_css_path: None,
        }
    }

    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }

    pub fn page_size(mut self, size: PageSize) -> Self {
        self.page_size = size;
        self
    }

    pub fn margins(mut self, margins: impl Into<String>) -> Self {
        self.margins = margins.into();
        self
    }

    pub fn custom_css_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.custom_css_path = Some(path.into());
        self
    }

    /// Whether the margin string is a number followed by a CSS unit.
    ///
    /// Margins are advisory, so an unrecognised value is logged rather than
    /// rejected.
    pub fn margins_recognised(&self) -> bool {
        RE_MARGIN.is_match(&self.margins)
    }

    /// The CSS path, ignoring an empty string.
    pub(crate) fn css_path(&self) -> Option<&Path> {
        self.custom_css_path
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty())
    }
}

/// Replace the extension of `input` with `.pdf`.
///
/// A file without an extension simply gains one.
pub fn default_output_path(input: &Path) -> PathBuf {
    input.with_extension("pdf")
}

// ── Engine configuration ─────────────────────────────────────────────────

/// Engine configuration for the conversion pipeline.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use swiss_knife::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .render_timeout_secs(60)
///     .no_sandbox(true)
///     .build()
///     .unwrap();
/// assert_eq!(config.render_timeout_secs, 60);
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Hard deadline for the browser print step, in seconds. Default: 30.
    ///
    /// Covers launching Chrome, loading the page and printing. On expiry the
    /// browser is torn down and the conversion fails with
    /// [`Md2PdfError::RenderTimeout`].
    pub render_timeout_secs: u64,

    /// Directory for the intermediate HTML file. Default: the OS temp dir.
    pub temp_dir: Option<PathBuf>,

    /// Explicit Chrome/Chromium binary. Default: auto-detected.
    pub chrome_executable: Option<PathBuf>,

    /// Launch Chrome with `--no-sandbox`. Needed when running as root
    /// inside most containers. Default: false.
    pub no_sandbox: bool,

    /// Paper and margin settings handed to the print step.
    pub print: PrintSettings,

    /// Optional per-stage progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            render_timeout_secs: DEFAULT_RENDER_TIMEOUT_SECS,
            temp_dir: None,
            chrome_executable: None,
            no_sandbox: false,
            print: PrintSettings::default(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("render_timeout_secs", &self.render_timeout_secs)
            .field("temp_dir", &self.temp_dir)
            .field("chrome_executable", &self.chrome_executable)
            .field("no_sandbox", &self.no_sandbox)
            .field("print", &self.print)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    pub fn render_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.render_timeout_secs)
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn render_timeout_secs(mut self, secs: u64) -> Self {
        self.config.render_timeout_secs = secs;
        self
    }

    pub fn temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.temp_dir = Some(dir.into());
        self
    }

    pub fn chrome_executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.chrome_executable = Some(path.into());
        self
    }

    pub fn no_sandbox(mut self, v: bool) -> Self {
        self.config.no_sandbox = v;
        self
    }

    pub fn print(mut self, settings: PrintSettings) -> Self {
        self.config.print = settings;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Md2PdfError> {
        let c = &self.config;
        if c.render_timeout_secs == 0 {
            return Err(Md2PdfError::InvalidConfig(
                "render timeout must be ≥ 1 second".into(),
            ));
        }
        if c.print.paper_width_in <= 0.0 || c.print.paper_height_in <= 0.0 {
            return Err(Md2PdfError::InvalidConfig(format!(
                "paper must have a positive size, got {}x{}in",
                c.print.paper_width_in, c.print.paper_height_in
            )));
        }
        if c.print.margin_in < 0.0
            || c.print.margin_in * 2.0 >= c.print.paper_width_in.min(c.print.paper_height_in)
        {
            return Err(Md2PdfError::InvalidConfig(format!(
                "margin of {}in leaves no printable area",
                c.print.margin_in
            )));
        }
        Ok(self.config)
    }
}

// ── Print settings ───────────────────────────────────────────────────────

/// Paper geometry handed to the browser's print-to-PDF call.
///
/// All lengths are in inches, the unit the DevTools protocol expects.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrintSettings {
    pub paper_width_in: f64,
    pub paper_height_in: f64,
    /// Applied to all four sides.
    pub margin_in: f64,
    pub print_background: bool,
}

impl Default for PrintSettings {
    /// A4 expressed in inches with one-inch margins.
    fn default() -> Self {
        Self {
            paper_width_in: 8.27,
            paper_height_in: 11.7,
            margin_in: 1.0,
            print_background: true,
        }
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Paper sizes accepted by `mdtopdf --page-size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PageSize {
    #[default]
    A4,
    Letter,
    Legal,
}

impl PageSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            PageSize::A4 => "A4",
            PageSize::Letter => "Letter",
            PageSize::Legal => "Legal",
        }
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PageSize {
    type Err = Md2PdfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a4" => Ok(PageSize::A4),
            "letter" => Ok(PageSize::Letter),
            "legal" => Ok(PageSize::Legal),
            other => Err(Md2PdfError::InvalidConfig(format!(
                "unknown page size '{other}' (expected A4, Letter or Legal)"
            ))),
        }
    }
}
