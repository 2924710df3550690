//! Pipeline stages for Markdown-to-PDF conversion.
//!
//! Each submodule implements exactly one transformation step, so each can be
//! tested on its own and the heavy collaborators (Markdown parser, browser)
//! stay behind narrow interfaces.
//!
//! ## Data Flow
//!
//! ```text
//! markdown ──▶ template ──▶ artifact ──▶ render
//! (fragment)   (document)   (temp file)   (PDF bytes)
//! ```
//!
//! 1. [`markdown`]: GFM Markdown to an HTML fragment with heading ids
//! 2. [`template`]: wrap the fragment and custom CSS in a full document
//! 3. [`artifact`]: park the document in a self-deleting temp file
//! 4. [`render`]: print the file to PDF through headless Chrome under a deadline

pub mod artifact;
pub mod markdown;
pub mod render;
pub mod template;
