//! HTML fragments for the session viewer and export.

use crate::api::models::{Precedent, PrecedentsPayload};
use crate::markdown;
use crate::session::{ChatMessage, ChatRole, FactCheckRecord, Session};
use serde_json::Value;

/// One transcript bubble.
pub fn chat_message(msg: &ChatMessage) -> String {
    let role = match msg.role {
        ChatRole::User => "user",
        ChatRole::Assistant => "assistant",
    };
    let mut content = format!(
        r#"<div class="markdown-content">{}</div>"#,
        markdown::render(&msg.content)
    );
    if let Some(source) = &msg.source {
        content.push_str(&format!(
            r#"<div class="message-source">Source: {}</div>"#,
            markdown::escape(source)
        ));
    }
    format!(
        r#"<div class="chat-message {role}"><div class="message-content">{content}</div></div>"#
    )
}

/// The whole transcript, replayed in stored order.
pub fn transcript(messages: &[ChatMessage]) -> String {
    messages
        .iter()
        .map(chat_message)
        .collect::<Vec<_>>()
        .join("\n")
}

/// The summary panel; an absent or empty summary hides it.
pub fn summary_panel(summary: Option<&str>) -> String {
    match summary {
        Some(text) if !text.trim().is_empty() => format!(
            r#"<div class="panel"><h2>Document Summary</h2><div class="markdown-content">{}</div></div>"#,
            markdown::render(text)
        ),
        _ => String::new(),
    }
}

/// The upload status line.
pub fn upload_status(pdf_name: Option<&str>) -> String {
    match pdf_name {
        Some(name) => format!(
            r#"<div class="status-message success">Index ready for: {}</div>"#,
            markdown::escape(name)
        ),
        None => r#"<div class="status-message info">No PDF uploaded.</div>"#.to_string(),
    }
}

/// Saved precedents as cards; placeholder text when there are none.
pub fn precedent_cards(precedents: &[Precedent]) -> String {
    if precedents.is_empty() {
        return "<i>No saved precedents yet.</i>".to_string();
    }
    precedents
        .iter()
        .map(|p| {
            format!(
                r#"<div class="precedent-card"><b>{}</b><br>{} ({})<br>{}<small>Source: {} &bull; {}</small></div>"#,
                markdown::escape(p.name.as_deref().unwrap_or("Unnamed")),
                markdown::escape(p.court.as_deref().unwrap_or("Unknown")),
                markdown::escape(p.year.as_deref().unwrap_or("N/A")),
                case_link(p.url.as_deref()),
                markdown::escape(p.source.as_deref().unwrap_or("N/A")),
                markdown::escape(p.created_at.as_deref().unwrap_or("")),
            )
        })
        .collect::<Vec<_>>()
        .join("<hr>")
}

// Anchors only for http(s) targets; anything else stays out of the card.
fn case_link(url: Option<&str>) -> String {
    match url {
        Some(url) if url.starts_with("http://") || url.starts_with("https://") => format!(
            r#"<a href="{}" target="_blank" rel="noopener noreferrer">View Case</a><br>"#,
            markdown::escape(url)
        ),
        _ => String::new(),
    }
}

/// Project a find-precedents payload to markdown, whatever shape came back:
/// numbered entries for a structured list, pretty JSON for an object, the
/// text itself otherwise.
pub fn format_found_precedents(payload: &PrecedentsPayload) -> String {
    const NONE_FOUND: &str = "No precedents found.";
    match payload {
        PrecedentsPayload::Listed(list) if !list.is_empty() => list
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let mut block = format!(
                    "**{}. {}**\n{} {}",
                    i + 1,
                    p.name.as_deref().unwrap_or("Unnamed"),
                    p.court.as_deref().unwrap_or(""),
                    p.year.as_deref().unwrap_or(""),
                );
                if let Some(url) = p.url.as_deref() {
                    block.push_str(&format!("\n[View Case]({})", url));
                }
                block
            })
            .collect::<Vec<_>>()
            .join("\n\n"),
        PrecedentsPayload::Listed(_) => NONE_FOUND.to_string(),
        PrecedentsPayload::Text(text) if !text.trim().is_empty() => text.clone(),
        PrecedentsPayload::Text(_) => NONE_FOUND.to_string(),
        PrecedentsPayload::Other(Value::Null) => NONE_FOUND.to_string(),
        PrecedentsPayload::Other(value) => {
            serde_json::to_string_pretty(value).unwrap_or_else(|_| NONE_FOUND.to_string())
        }
    }
}

/// The accumulated fact-check log.
pub fn fact_history_panel(records: &[FactCheckRecord]) -> String {
    if records.is_empty() {
        return "<i>No fact checks yet.</i>".to_string();
    }
    records
        .iter()
        .map(|r| {
            format!(
                r#"<div class="fact-item"><strong>{}</strong><br>Supported: {} &bull; Confidence: {:.1}%<br>Evidence: {}<br><small>{}</small></div>"#,
                markdown::escape(&r.statement),
                if r.supported { "yes" } else { "no" },
                r.confidence * 100.0,
                markdown::escape(r.evidence.as_deref().unwrap_or("N/A")),
                r.timestamp.format("%Y-%m-%d %H:%M UTC"),
            )
        })
        .collect::<Vec<_>>()
        .join("<hr>")
}

/// A complete, standalone session page: status, summary, transcript, and
/// the fact-check log.
pub fn session_page(session: &Session, facts: &[FactCheckRecord]) -> String {
    let welcome = markdown::escape(session.username.as_deref().unwrap_or("User"));
    let body = format!(
        r#"<header><span class="logo">Casebook</span><span class="welcome">Welcome, {welcome}!</span></header>
{status}
{summary}
<div class="panel"><h2>Conversation</h2>
{transcript}
</div>
<div class="panel"><h2>Fact Checks</h2>
{facts}
</div>"#,
        status = upload_status(session.pdf_name.as_deref()),
        summary = summary_panel(session.summary.as_deref()),
        transcript = transcript(&session.chat_history),
        facts = fact_history_panel(facts),
    );
    page("Session", &body)
}

/// A standalone page for the fact-check log alone.
pub fn fact_page(facts: &[FactCheckRecord]) -> String {
    let body = format!(
        r#"<header><span class="logo">Casebook</span></header>
<div class="panel"><h2>Fact Checks</h2>
{}
</div>"#,
        fact_history_panel(facts)
    );
    page("Fact Checks", &body)
}

fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{} - Casebook</title>
    <style>{}</style>
</head>
<body>
<main>
{}
</main>
</body>
</html>"#,
        markdown::escape(title),
        CSS,
        body
    )
}

/// Styles for the session page - minimal text-based design.
pub const CSS: &str = r#"
:root {
    --bg: #fff;
    --fg: #1a1a1a;
    --muted: #767676;
    --accent: #1a5276;
    --border: #ddd;
}
body { font-family: Georgia, serif; background: var(--bg); color: var(--fg); margin: 0; }
main { max-width: 52rem; margin: 0 auto; padding: 1rem; }
header { display: flex; justify-content: space-between; border-bottom: 1px solid var(--border); padding: .5rem 0; }
.logo { font-weight: bold; color: var(--accent); }
.panel { border: 1px solid var(--border); padding: .75rem 1rem; margin: 1rem 0; }
.panel h2 { font-size: 1rem; margin: 0 0 .5rem; color: var(--accent); }
.status-message { margin: .75rem 0; font-size: .9rem; }
.status-message.info { color: var(--muted); }
.chat-message { margin: .5rem 0; }
.chat-message.user .message-content { background: #f2f4f7; }
.chat-message.assistant .message-content { background: #fbf9f4; }
.message-content { padding: .5rem .75rem; border-radius: .25rem; }
.message-source { color: var(--muted); font-size: .8rem; margin-top: .25rem; }
.md-heading { font-weight: bold; margin: .5rem 0 .25rem; }
.precedent-card, .fact-item { margin: .5rem 0; }
small { color: var(--muted); }
a { color: var(--accent); }
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_assistant_message_renders_markdown_and_source() {
        let msg = ChatMessage::assistant("**Yes.**", Some("Doc A".to_string()));
        let html = chat_message(&msg);
        assert!(html.contains("<strong>Yes.</strong>"));
        assert!(html.contains("Source: Doc A"));
        assert!(html.contains(r#"chat-message assistant"#));
    }

    #[test]
    fn test_user_message_has_no_source_line() {
        let html = chat_message(&ChatMessage::user("what happened?"));
        assert!(!html.contains("Source:"));
        assert!(html.contains(r#"chat-message user"#));
    }

    #[test]
    fn test_transcript_preserves_order() {
        let html = transcript(&[
            ChatMessage::user("first"),
            ChatMessage::assistant("second", None),
        ]);
        let first = html.find("first").unwrap();
        let second = html.find("second").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_summary_panel_hidden_when_absent() {
        assert_eq!(summary_panel(None), "");
        assert_eq!(summary_panel(Some("  ")), "");
        assert!(summary_panel(Some("### Key points")).contains("md-heading"));
    }

    #[test]
    fn test_upload_status() {
        assert!(upload_status(Some("brief.pdf")).contains("Index ready for: brief.pdf"));
        assert!(upload_status(None).contains("No PDF uploaded."));
    }

    #[test]
    fn test_precedent_cards_placeholder() {
        assert_eq!(precedent_cards(&[]), "<i>No saved precedents yet.</i>");
    }

    #[test]
    fn test_precedent_card_escapes_and_links() {
        let precedents: Vec<Precedent> = serde_json::from_str(
            r#"[{"name":"A <b>v.</b> B","court":"High Court","year":"1999",
                 "url":"https://cases.example/1","source":"kanoon","created_at":"2026-01-02"}]"#,
        )
        .unwrap();
        let html = precedent_cards(&precedents);
        assert!(html.contains("A &lt;b&gt;v.&lt;/b&gt; B"));
        assert!(html.contains(r#"href="https://cases.example/1""#));
        assert!(html.contains("High Court (1999)"));
    }

    #[test]
    fn test_precedent_card_drops_non_http_link() {
        let precedents: Vec<Precedent> =
            serde_json::from_str(r#"[{"name":"A","url":"javascript:alert(1)"}]"#).unwrap();
        let html = precedent_cards(&precedents);
        assert!(!html.contains("<a "));
        assert!(!html.contains("javascript:"));
    }

    #[test]
    fn test_found_precedents_listed() {
        let payload: PrecedentsPayload = serde_json::from_str(
            r#"[{"name":"A v. B","court":"SC","year":2001,"url":"https://e.com/1"},
                {"title":"C v. D"}]"#,
        )
        .unwrap();
        let md = format_found_precedents(&payload);
        assert!(md.starts_with("**1. A v. B**"));
        assert!(md.contains("[View Case](https://e.com/1)"));
        assert!(md.contains("**2. C v. D**"));
    }

    #[test]
    fn test_found_precedents_text_and_object() {
        let md = format_found_precedents(&PrecedentsPayload::Text("### Cases".to_string()));
        assert_eq!(md, "### Cases");

        let md = format_found_precedents(&PrecedentsPayload::Other(
            serde_json::json!({"note": "odd"}),
        ));
        assert!(md.contains("\"note\""));

        assert_eq!(
            format_found_precedents(&PrecedentsPayload::Text("  ".to_string())),
            "No precedents found."
        );
    }

    #[test]
    fn test_fact_history_panel() {
        assert_eq!(fact_history_panel(&[]), "<i>No fact checks yet.</i>");

        let html = fact_history_panel(&[FactCheckRecord {
            statement: "The court held X".to_string(),
            supported: true,
            confidence: 0.825,
            evidence: Some("para 12".to_string()),
            timestamp: Utc::now(),
        }]);
        assert!(html.contains("<strong>The court held X</strong>"));
        assert!(html.contains("Supported: yes"));
        assert!(html.contains("82.5%"));
    }

    #[test]
    fn test_session_page_composes() {
        let session = Session {
            token: Some("t".to_string()),
            username: Some("user@example.com".to_string()),
            summary: Some("**Summary**".to_string()),
            pdf_name: Some("brief.pdf".to_string()),
            chat_history: vec![ChatMessage::user("q"), ChatMessage::assistant("a", None)],
            ..Default::default()
        };
        let html = session_page(&session, &[]);
        assert!(html.contains("Welcome, user@example.com!"));
        assert!(html.contains("Index ready for: brief.pdf"));
        assert!(html.contains("<strong>Summary</strong>"));
        assert!(html.contains("No fact checks yet."));
        assert!(html.starts_with("<!DOCTYPE html>"));
    }
}
