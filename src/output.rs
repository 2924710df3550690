//! Result types returned by a successful conversion.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Sizes and timings for one Markdown-to-PDF conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionStats {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    /// Size of the Markdown source.
    pub markdown_bytes: usize,
    /// Size of the complete HTML document handed to the browser.
    pub html_bytes: usize,
    /// Size of the PDF written to `output_path`.
    pub pdf_bytes: usize,
    pub render_duration_ms: u64,
    pub total_duration_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_serialise_to_json() {
        let stats = ConversionStats {
            input_path: "a.md".into(),
            output_path: "a.pdf".into(),
            markdown_bytes: 10,
            html_bytes: 900,
            pdf_bytes: 4096,
            render_duration_ms: 800,
            total_duration_ms: 850,
        };
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["pdf_bytes"], 4096);
        assert_eq!(json["output_path"], "a.pdf");
    }
}
