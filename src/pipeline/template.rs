//! Wrap an HTML fragment in a complete, print-ready document.
//!
//! The fragment and any custom CSS are embedded verbatim. Both come from the
//! user's own files, so nothing is escaped or sanitised here.

/// Built-in stylesheet applied to every document.
pub const BASE_STYLESHEET: &str = r#"body {
    font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, Helvetica, Arial, sans-serif;
    line-height: 1.6;
    padding: 2em;
    max-width: 100%;
    margin: 0 auto;
}
pre {
    background-color: #f6f8fa;
    padding: 16px;
    border-radius: 6px;
    overflow-x: auto;
}
code {
    font-family: "SFMono-Regular", Consolas, "Liberation Mono", Menlo, Courier, monospace;
}
img {
    max-width: 100%;
    height: auto;
}"#;

/// The templater's input: a Markdown-derived fragment and optional CSS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    pub html_body: String,
    pub custom_css: Option<String>,
}

impl RenderedDocument {
    pub fn new(html_body: impl Into<String>, custom_css: Option<String>) -> Self {
        Self {
            html_body: html_body.into(),
            custom_css,
        }
    }

    /// Render the complete HTML document.
    pub fn to_html(&self) -> String {
        render_document(&self.html_body, self.custom_css.as_deref())
    }
}

/// Build a full HTML document around `fragment`.
///
/// `custom_css` is appended after [`BASE_STYLESHEET`] when it is non-empty,
/// so user rules win on equal specificity.
pub fn render_document(fragment: &str, custom_css: Option<&str>) -> String {
    let css = custom_css.filter(|c| !c.trim().is_empty());

    let mut doc = String::with_capacity(
        fragment.len() + BASE_STYLESHEET.len() + css.map_or(0, str::len) + 160,
    );
    doc.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"UTF-8\">\n<style>\n");
    doc.push_str(BASE_STYLESHEET);
    doc.push('\n');
    if let Some(css) = css {
        doc.push_str(css);
        if !css.ends_with('\n') {
            doc.push('\n');
        }
    }
    doc.push_str("</style>\n</head>\n<body>\n");
    doc.push_str(fragment);
    if !fragment.ends_with('\n') {
        doc.push('\n');
    }
    doc.push_str("</body>\n</html>\n");
    doc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_fragment_in_body() {
        let doc = render_document("<p>Hi</p>\n", None);
        assert!(doc.starts_with("<!DOCTYPE html>"));
        assert!(doc.contains("<meta charset=\"UTF-8\">"));
        assert!(doc.contains("<body>\n<p>Hi</p>\n</body>"));
        assert!(doc.trim_end().ends_with("</html>"));
    }

    #[test]
    fn base_styles_always_present() {
        let doc = render_document("", None);
        assert!(doc.contains("font-family: -apple-system"));
        assert!(doc.contains("background-color: #f6f8fa"));
        assert!(doc.contains("overflow-x: auto"));
        assert!(doc.contains("max-width: 100%"));
    }

    #[test]
    fn custom_css_follows_base_styles_verbatim() {
        let css = "h1 > span { color: red; }";
        let doc = render_document("<h1>x</h1>", Some(css));
        let base_at = doc.find("img {").unwrap();
        let custom_at = doc.find(css).unwrap();
        assert!(custom_at > base_at);
        assert!(custom_at < doc.find("</style>").unwrap());
    }

    #[test]
    fn blank_custom_css_is_omitted() {
        assert_eq!(
            render_document("<p>a</p>", Some("  \n")),
            render_document("<p>a</p>", None)
        );
    }

    #[test]
    fn fragment_is_not_escaped() {
        let doc = render_document("<em>a & b</em>", None);
        assert!(doc.contains("<em>a & b</em>"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let d = RenderedDocument::new("<p>same</p>", Some("p { margin: 0 }".into()));
        assert_eq!(d.to_html(), d.to_html());
    }
}
