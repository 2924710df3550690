//! Progress-callback trait for per-stage conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to be told
//! when each pipeline stage starts and finishes. The CLI uses this to drive
//! its spinner; library callers can forward the events anywhere they like.
//!
//! # Example
//!
//! ```rust
//! use swiss_knife::{ConversionConfig, ConversionProgressCallback, Stage};
//! use std::sync::Arc;
//!
//! struct Printer;
//!
//! impl ConversionProgressCallback for Printer {
//!     fn on_stage_complete(&self, stage: Stage, elapsed_ms: u64) {
//!         eprintln!("{stage} took {elapsed_ms}ms");
//!     }
//! }
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(Arc::new(Printer) as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::output::ConversionStats;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// One step of the Markdown-to-PDF pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    ReadInput,
    ParseMarkdown,
    ReadCss,
    Template,
    WriteTemp,
    Render,
    WriteOutput,
}

impl Stage {
    /// Short present-tense label for spinners and logs.
    pub fn label(&self) -> &'static str {
        match self {
            Stage::ReadInput => "Reading markdown",
            Stage::ParseMarkdown => "Parsing markdown",
            Stage::ReadCss => "Reading stylesheet",
            Stage::Template => "Building HTML",
            Stage::WriteTemp => "Writing temp HTML",
            Stage::Render => "Rendering PDF",
            Stage::WriteOutput => "Writing PDF",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Called by the conversion pipeline as it moves through each stage.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. `ReadCss` is skipped entirely when no stylesheet
/// was requested.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once before the input is read.
    fn on_conversion_start(&self, input: &Path) {
        let _ = input;
    }

    fn on_stage_start(&self, stage: Stage) {
        let _ = stage;
    }

    /// Called when a stage finishes without error.
    fn on_stage_complete(&self, stage: Stage, elapsed_ms: u64) {
        let _ = (stage, elapsed_ms);
    }

    /// Called once after the PDF has been written.
    fn on_conversion_complete(&self, stats: &ConversionStats) {
        let _ = stats;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        started: Mutex<Vec<Stage>>,
        completed: Mutex<Vec<Stage>>,
    }

    impl ConversionProgressCallback for Recorder {
        fn on_stage_start(&self, stage: Stage) {
            self.started.lock().unwrap().push(stage);
        }

        fn on_stage_complete(&self, stage: Stage, _elapsed_ms: u64) {
            self.completed.lock().unwrap().push(stage);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_conversion_start(Path::new("a.md"));
        cb.on_stage_start(Stage::Render);
        cb.on_stage_complete(Stage::Render, 12);
        cb.on_conversion_complete(&ConversionStats::default());
    }

    #[test]
    fn recorder_receives_events() {
        let rec = Recorder::default();
        rec.on_stage_start(Stage::ReadInput);
        rec.on_stage_complete(Stage::ReadInput, 1);
        rec.on_stage_start(Stage::Render);

        assert_eq!(
            *rec.started.lock().unwrap(),
            vec![Stage::ReadInput, Stage::Render]
        );
        assert_eq!(*rec.completed.lock().unwrap(), vec![Stage::ReadInput]);
    }

    #[test]
    fn stage_labels() {
        assert_eq!(Stage::Render.to_string(), "Rendering PDF");
        assert_eq!(Stage::WriteOutput.label(), "Writing PDF");
    }
}
