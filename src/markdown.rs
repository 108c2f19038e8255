//! Minimal markdown-to-HTML rendering for remote text.
//!
//! The service returns summaries, chat answers, and precedent listings as a
//! small markdown subset (bold, level-3 headings, links, line breaks). All
//! HTML-significant characters are escaped before any tag is introduced, so
//! the only tags ever present in the output are the ones produced here.

use std::sync::LazyLock;

use regex::Regex;

pub(crate) static BOLD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("bold pattern is valid"));

pub(crate) static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*###\s*(.+)$").expect("heading pattern is valid"));

// Only http and https link targets become anchors; any other scheme stays
// literal text.
pub(crate) static LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[([^\]]+)\]\((https?://[^\s)]+)\)").expect("link pattern is valid")
});

/// Escape HTML-significant characters.
pub fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Render a markdown subset to HTML safe for direct insertion.
///
/// Escaping runs first, so markup arriving in the input can never survive as
/// live HTML; the replacements below only ever see escaped text.
pub fn render(raw: &str) -> String {
    let s = escape(raw);
    let s = BOLD_RE.replace_all(&s, "<strong>${1}</strong>");
    let s = HEADING_RE.replace_all(&s, r#"<div class="md-heading">${1}</div>"#);
    let s = LINK_RE.replace_all(
        &s,
        r#"<a href="${2}" target="_blank" rel="noopener noreferrer">${1}</a>"#,
    );
    s.replace("\r\n", "<br>")
        .replace('\r', "<br>")
        .replace('\n', "<br>")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escapes_raw_html() {
        let html = render("<script>alert('x')</script>");
        assert_eq!(html, "&lt;script&gt;alert('x')&lt;/script&gt;");
        assert!(!html.contains('<') || !html.contains("<script"));
    }

    #[test]
    fn test_escapes_event_handler_injection() {
        let html = render(r#"<img src=x onerror="alert(1)">"#);
        assert!(!html.contains("<img"));
        assert!(html.starts_with("&lt;img"));
    }

    #[test]
    fn test_ampersand_escaped_first() {
        // A pre-escaped entity must not survive as one
        assert_eq!(render("&lt;b&gt;"), "&amp;lt;b&amp;gt;");
    }

    #[test]
    fn test_bold() {
        assert_eq!(render("**Yes.**"), "<strong>Yes.</strong>");
        assert_eq!(render("a **b** c **d**"), "a <strong>b</strong> c <strong>d</strong>");
    }

    #[test]
    fn test_bold_does_not_cross_lines() {
        let html = render("**a\nb**");
        assert!(!html.contains("<strong>"));
        assert_eq!(html, "**a<br>b**");
    }

    #[test]
    fn test_heading() {
        assert_eq!(
            render("### Holding"),
            r#"<div class="md-heading">Holding</div>"#
        );
        assert_eq!(
            render("   ### Indented"),
            r#"<div class="md-heading">Indented</div>"#
        );
    }

    #[test]
    fn test_heading_content_is_escaped() {
        let html = render("### a < b");
        assert_eq!(html, r#"<div class="md-heading">a &lt; b</div>"#);
    }

    #[test]
    fn test_link() {
        let html = render("[View Case](https://example.com/case/1)");
        assert_eq!(
            html,
            r#"<a href="https://example.com/case/1" target="_blank" rel="noopener noreferrer">View Case</a>"#
        );
    }

    #[test]
    fn test_link_rejects_other_schemes() {
        let html = render("[x](javascript:alert(1))");
        assert!(!html.contains("<a "));
        assert_eq!(html, "[x](javascript:alert(1))");

        let html = render("[x](data:text/html,<b>)");
        assert!(!html.contains("<a "));
    }

    #[test]
    fn test_link_href_cannot_break_out() {
        // A quote inside the URL is escaped in step one, so the href
        // attribute cannot be terminated early.
        let html = render(r#"[x](https://a.example/"onmouseover=alert(1))"#);
        assert!(html.contains(r#"href="https://a.example/&quot;onmouseover=alert(1""#));
    }

    #[test]
    fn test_line_break_variants() {
        assert_eq!(render("a\r\nb\rc\nd"), "a<br>b<br>c<br>d");
    }

    #[test]
    fn test_mixed_document() {
        let html = render("### Summary\n**Held**: see [ref](https://e.com/x)\n& more");
        assert!(html.contains(r#"<div class="md-heading">Summary</div>"#));
        assert!(html.contains("<strong>Held</strong>"));
        assert!(html.contains(r#"<a href="https://e.com/x""#));
        assert!(html.contains("&amp; more"));
    }
}
