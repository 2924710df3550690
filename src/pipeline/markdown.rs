//! Markdown → HTML fragment via `pulldown-cmark`.
//!
//! The capability set is fixed: GFM tables, strikethrough and task lists,
//! bare-URL and e-mail autolinks, automatic heading ids, and hard wraps
//! (every soft line break becomes `<br />`). pulldown-cmark already writes
//! void elements in XHTML form (`<br />`, `<hr />`, `<img ... />`).
//!
//! The fragment is loaded by a browser from a `file://` URL, so it is made
//! safe before rendering: raw HTML is replaced by a `<!-- raw HTML omitted -->`
//! marker and `javascript:`, `vbscript:`, `file:` and non-image `data:` link
//! destinations are emptied.
//!
//! pulldown-cmark only emits heading ids that are written explicitly, so the
//! ids are generated here by buffering the event stream and patching each
//! heading's start tag once its text is known.

use linkify::{LinkFinder, LinkKind};
use pulldown_cmark::{
    html, CowStr, Event, LinkType, Options, Parser, Tag, TagEnd, TextMergeStream,
};
use std::collections::HashSet;
use tracing::debug;

/// Stands in for every block or inline of raw HTML.
pub const RAW_HTML_OMITTED: &str = "<!-- raw HTML omitted -->";
const RAW_HTML_BLOCK_OMITTED: &str = "<!-- raw HTML omitted -->\n";

/// Parser extensions enabled for every conversion.
pub fn options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS
}

/// Parse raw Markdown bytes, rejecting input that is not UTF-8.
pub fn parse(source: &[u8]) -> Result<String, std::str::Utf8Error> {
    let text = std::str::from_utf8(source)?;
    Ok(to_html(text))
}

/// Render Markdown text to an HTML fragment.
pub fn to_html(markdown: &str) -> String {
    let events: Vec<Event<'_>> = TextMergeStream::new(Parser::new_ext(markdown, options()))
        .map(|event| match event {
            Event::SoftBreak => Event::HardBreak,
            other => other,
        })
        .collect();
    let events = autolink(events);
    let events = strip_unsafe(events);
    let events = assign_heading_ids(events);

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, events.into_iter());
    debug!("Rendered {} bytes of markdown → {} bytes of HTML", markdown.len(), out.len());
    out
}

/// Whether a link or image destination must not reach the browser.
///
/// Matching is case-insensitive. `data:image/{png,gif,jpeg,webp}` is allowed.
pub fn is_dangerous_url(url: &str) -> bool {
    let head: String = url.chars().take(16).collect::<String>().to_ascii_lowercase();
    if let Some(rest) = head.strip_prefix("data:image/") {
        return !["png", "gif", "jpeg", "webp"]
            .iter()
            .any(|ext| rest.starts_with(ext));
    }
    ["javascript:", "vbscript:", "file:", "data:"]
        .iter()
        .any(|scheme| head.starts_with(scheme))
}

fn safe_destination(url: CowStr<'_>) -> CowStr<'_> {
    if is_dangerous_url(&url) {
        CowStr::Borrowed("")
    } else {
        url
    }
}

/// Drop raw HTML and empty dangerous link and image destinations.
fn strip_unsafe(events: Vec<Event<'_>>) -> Vec<Event<'_>> {
    let mut out = Vec::with_capacity(events.len());
    let mut in_html_block = false;

    for event in events {
        match event {
            Event::Start(Tag::HtmlBlock) => {
                in_html_block = true;
                out.push(Event::Html(CowStr::Borrowed(RAW_HTML_BLOCK_OMITTED)));
            }
            Event::End(TagEnd::HtmlBlock) => in_html_block = false,
            Event::Html(_) if in_html_block => {}
            Event::Html(_) => out.push(Event::Html(CowStr::Borrowed(RAW_HTML_BLOCK_OMITTED))),
            Event::InlineHtml(_) => out.push(Event::InlineHtml(CowStr::Borrowed(RAW_HTML_OMITTED))),
            Event::Start(Tag::Link {
                link_type,
                dest_url,
                title,
                id,
            }) => out.push(Event::Start(Tag::Link {
                link_type,
                dest_url: safe_destination(dest_url),
                title,
                id,
            })),
            Event::Start(Tag::Image {
                link_type,
                dest_url,
                title,
                id,
            }) => out.push(Event::Start(Tag::Image {
                link_type,
                dest_url: safe_destination(dest_url),
                title,
                id,
            })),
            other => out.push(other),
        }
    }
    out
}

/// Turn bare URLs and e-mail addresses in running text into links.
///
/// Text inside links, images and code blocks is left alone.
fn autolink(events: Vec<Event<'_>>) -> Vec<Event<'_>> {
    let mut finder = LinkFinder::new();
    finder.kinds(&[LinkKind::Url, LinkKind::Email]);

    let mut out = Vec::with_capacity(events.len());
    let mut opaque = 0usize;

    for event in events {
        match event {
            Event::Start(Tag::Link { .. } | Tag::Image { .. } | Tag::CodeBlock(_)) => {
                opaque += 1;
                out.push(event);
            }
            Event::End(TagEnd::Link | TagEnd::Image | TagEnd::CodeBlock) => {
                opaque = opaque.saturating_sub(1);
                out.push(event);
            }
            Event::Text(text) if opaque == 0 => push_linkified(&finder, text, &mut out),
            other => out.push(other),
        }
    }
    out
}

fn push_linkified<'a>(finder: &LinkFinder, text: CowStr<'a>, out: &mut Vec<Event<'a>>) {
    let spans: Vec<(usize, usize, bool)> = finder
        .links(&text)
        .map(|link| (link.start(), link.end(), *link.kind() == LinkKind::Email))
        .filter(|&(start, end, email)| email || !is_dangerous_url(&text[start..end]))
        .collect();
    if spans.is_empty() {
        out.push(Event::Text(text));
        return;
    }

    let mut cursor = 0;
    for (start, end, email) in spans {
        if start > cursor {
            out.push(Event::Text(text[cursor..start].to_string().into()));
        }
        let label = &text[start..end];
        // The HTML writer adds `mailto:` for e-mail links.
        let link_type = if email { LinkType::Email } else { LinkType::Autolink };
        out.push(Event::Start(Tag::Link {
            link_type,
            dest_url: label.to_string().into(),
            title: CowStr::Borrowed(""),
            id: CowStr::Borrowed(""),
        }));
        out.push(Event::Text(label.to_string().into()));
        out.push(Event::End(TagEnd::Link));
        cursor = end;
    }
    if cursor < text.len() {
        out.push(Event::Text(text[cursor..].to_string().into()));
    }
}

/// Give every heading without an explicit id one derived from its text.
fn assign_heading_ids(mut events: Vec<Event<'_>>) -> Vec<Event<'_>> {
    let mut ids = HeadingIds::default();
    let mut open: Option<(usize, String)> = None;

    for i in 0..events.len() {
        let closes_heading = match &events[i] {
            Event::Start(Tag::Heading { .. }) => {
                open = Some((i, String::new()));
                false
            }
            Event::Text(t) | Event::Code(t) => {
                if let Some((_, text)) = open.as_mut() {
                    text.push_str(t);
                }
                false
            }
            Event::End(TagEnd::Heading(_)) => true,
            _ => false,
        };

        if !closes_heading {
            continue;
        }
        if let Some((start, text)) = open.take() {
            if let Event::Start(Tag::Heading { id, .. }) = &mut events[start] {
                if id.is_none() {
                    *id = Some(CowStr::from(ids.generate(&text)));
                }
            }
        }
    }
    events
}

/// GitHub-style heading slugs, unique within one document.
///
/// ASCII letters and digits are kept (lower-cased), whitespace, `-` and `_`
/// become `-`, everything else is dropped. An empty slug becomes `heading`.
/// Repeats get `-1`, `-2`, … appended.
#[derive(Debug, Default)]
pub struct HeadingIds {
    seen: HashSet<String>,
}

impl HeadingIds {
    pub fn generate(&mut self, text: &str) -> String {
        let mut slug: String = text
            .trim()
            .chars()
            .filter_map(|c| {
                if c.is_ascii_alphanumeric() {
                    Some(c.to_ascii_lowercase())
                } else if c.is_ascii_whitespace() || c == '-' || c == '_' {
                    Some('-')
                } else {
                    None
                }
            })
            .collect();
        if slug.is_empty() {
            slug.push_str("heading");
        }

        if self.seen.insert(slug.clone()) {
            return slug;
        }
        (1..)
            .map(|n| format!("{slug}-{n}"))
            .find(|candidate| self.seen.insert(candidate.clone()))
            .unwrap_or(slug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_and_paragraph() {
        let html = to_html("# Hello\n\nWorld");
        assert!(html.contains(r#"<h1 id="hello">Hello</h1>"#), "got: {html}");
        assert!(html.contains("<p>World</p>"), "got: {html}");
    }

    #[test]
    fn heading_ids_are_slugged_and_unique() {
        let html = to_html("## Getting Started!\n\n## Getting Started\n\n### `cargo` & co_op");
        assert!(html.contains(r#"<h2 id="getting-started">"#), "got: {html}");
        assert!(html.contains(r#"<h2 id="getting-started-1">"#), "got: {html}");
        assert!(html.contains(r#"<h3 id="cargo--co-op">"#), "got: {html}");
    }

    #[test]
    fn empty_or_symbol_heading_falls_back() {
        let mut ids = HeadingIds::default();
        assert_eq!(ids.generate("¿¡!"), "heading");
        assert_eq!(ids.generate(""), "heading-1");
        assert_eq!(ids.generate("Café au lait"), "caf-au-lait");
    }

    #[test]
    fn gfm_table() {
        let html = to_html("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(html.contains("<table>"), "got: {html}");
        assert!(html.contains("<th>a</th>"), "got: {html}");
        assert!(html.contains("<td>2</td>"), "got: {html}");
    }

    #[test]
    fn gfm_task_list() {
        let html = to_html("- [x] done\n- [ ] todo\n");
        assert_eq!(html.matches(r#"type="checkbox""#).count(), 2, "got: {html}");
        assert!(html.contains("checked"), "got: {html}");
    }

    #[test]
    fn strikethrough() {
        let html = to_html("~~gone~~");
        assert!(html.contains("<del>gone</del>"), "got: {html}");
    }

    #[test]
    fn soft_breaks_become_xhtml_breaks() {
        let html = to_html("line one\nline two");
        assert!(html.contains("line one<br />"), "got: {html}");
    }

    #[test]
    fn rules_are_self_closing() {
        assert!(to_html("a\n\n---\n\nb").contains("<hr />"));
    }

    #[test]
    fn raw_html_is_omitted() {
        let html = to_html(
            "<script>alert(1)</script>\n\n<iframe src=\"file:///etc/passwd\"></iframe>\n\ninline <b>bold</b> text",
        );
        assert!(!html.contains("<script"), "got: {html}");
        assert!(!html.contains("<iframe"), "got: {html}");
        assert!(!html.contains("<b>"), "got: {html}");
        assert!(html.contains("<!-- raw HTML omitted -->\n"), "got: {html}");
        assert!(
            html.contains("inline <!-- raw HTML omitted -->bold<!-- raw HTML omitted --> text"),
            "got: {html}"
        );
    }

    #[test]
    fn multi_line_html_block_becomes_one_marker() {
        let html = to_html("<div>\n<p>one</p>\n<p>two</p>\n</div>\n");
        assert_eq!(html.matches(RAW_HTML_OMITTED).count(), 1, "got: {html}");
        assert!(!html.contains("one"), "got: {html}");
    }

    #[test]
    fn dangerous_destinations_are_emptied() {
        let html = to_html(
            "[x](javascript:alert(1)) [y](FILE:///etc/passwd) ![z](vbscript:msgbox) <file:///etc/hosts>",
        );
        assert!(html.contains(r#"<a href="">x</a>"#), "got: {html}");
        assert!(html.contains(r#"<a href="">y</a>"#), "got: {html}");
        assert!(html.contains(r#"<img src="""#), "got: {html}");
        assert!(html.contains(r#"<a href="">file:///etc/hosts</a>"#), "got: {html}");
        assert!(!html.contains("javascript:"), "got: {html}");
        assert!(!html.contains(r#"="file:"#), "got: {html}");
        assert!(!html.contains("vbscript:"), "got: {html}");
    }

    #[test]
    fn dangerous_url_rules() {
        assert!(is_dangerous_url("javascript:alert(1)"));
        assert!(is_dangerous_url("JavaScript:alert(1)"));
        assert!(is_dangerous_url("file:///etc/passwd"));
        assert!(is_dangerous_url("data:text/html;base64,PHNjcmlwdD4="));
        assert!(is_dangerous_url("data:image/svg+xml;base64,AAAA"));
        assert!(!is_dangerous_url("data:image/png;base64,iVBORw0KGgo="));
        assert!(!is_dangerous_url("https://example.com"));
        assert!(!is_dangerous_url("docs/intro.md"));
    }

    #[test]
    fn safe_links_are_kept() {
        let html = to_html("[site](https://example.com) ![dot](data:image/png;base64,AAAA)");
        assert!(html.contains(r#"<a href="https://example.com">site</a>"#), "got: {html}");
        assert!(html.contains(r#"src="data:image/png;base64,AAAA""#), "got: {html}");
    }

    #[test]
    fn bare_urls_and_emails_become_links() {
        let html = to_html("see https://example.com/a_b now, or mail me@example.com");
        assert!(
            html.contains(r#"see <a href="https://example.com/a_b">https://example.com/a_b</a> now"#),
            "got: {html}"
        );
        assert!(
            html.contains(r#"<a href="mailto:me@example.com">me@example.com</a>"#),
            "got: {html}"
        );
    }

    #[test]
    fn urls_in_code_and_links_are_not_linkified() {
        let html = to_html(
            "[https://example.com](https://example.com) `https://a.example`\n\n```\nhttps://b.example\n```\n",
        );
        assert_eq!(html.matches("<a ").count(), 1, "got: {html}");
        assert!(html.contains("<code>https://a.example</code>"), "got: {html}");
        assert!(html.contains("https://b.example\n</code></pre>"), "got: {html}");
    }

    #[test]
    fn linkified_heading_keeps_its_id() {
        let html = to_html("# See https://example.com");
        assert!(html.contains(r#"<h1 id="see-httpsexamplecom">"#), "got: {html}");
        assert!(html.contains(r#"<a href="https://example.com">"#), "got: {html}");
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        assert!(parse(&[b'#', b' ', 0xff, 0xfe]).is_err());
        assert!(parse("# ok".as_bytes()).is_ok());
    }
}
