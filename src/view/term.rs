//! Terminal rendering of session state and responses.

use console::style;
use regex::Captures;

use crate::api::models::{DocumentEntry, FactHistoryEntry, Precedent};
use crate::markdown::{BOLD_RE, HEADING_RE, LINK_RE};
use crate::session::{ChatMessage, ChatRole, Session};

/// Give the markdown subset a terminal treatment: ANSI bold, underlined
/// headings, and `label (url)` links. Everything else passes through.
pub fn render_ansi(raw: &str) -> String {
    let s = BOLD_RE.replace_all(raw, |c: &Captures| style(&c[1]).bold().to_string());
    let s = HEADING_RE.replace_all(&s, |c: &Captures| style(&c[1]).underlined().to_string());
    LINK_RE
        .replace_all(&s, |c: &Captures| format!("{} ({})", &c[1], style(&c[2]).blue()))
        .into_owned()
}

/// Maps renderable state to the terminal.
#[derive(Default)]
pub struct TermView;

impl TermView {
    pub fn new() -> Self {
        Self
    }

    pub fn message(&self, msg: &ChatMessage) {
        let label = match msg.role {
            ChatRole::User => style("you").cyan().bold(),
            ChatRole::Assistant => style("counsel").green().bold(),
        };
        println!("{}  {}", label, render_ansi(&msg.content));
        if let Some(source) = &msg.source {
            println!("     {}", style(format!("Source: {}", source)).dim());
        }
        println!();
    }

    /// Replay the stored transcript in order.
    pub fn replay(&self, messages: &[ChatMessage]) {
        for msg in messages {
            self.message(msg);
        }
    }

    pub fn summary(&self, text: &str) {
        println!("{}", style("Document Summary").bold().underlined());
        println!("{}\n", render_ansi(text));
    }

    /// A markdown blob (precedent listings and the like).
    pub fn markdown_block(&self, raw: &str) {
        println!("{}\n", render_ansi(raw));
    }

    pub fn status(&self, session: &Session) {
        match &session.username {
            Some(name) => println!("Welcome, {}!", style(name).bold()),
            None => println!("Not logged in."),
        }
        match &session.pdf_name {
            Some(pdf) => println!("Index ready for: {}", style(pdf).bold()),
            None => println!("No PDF uploaded."),
        }
        if let Some(id) = &session.current_document_id {
            println!("Current document: {}", id);
        }
    }

    pub fn documents(&self, docs: &[DocumentEntry], current: Option<&str>) {
        if docs.is_empty() {
            println!("No documents uploaded yet.");
            return;
        }
        for doc in docs {
            let marker = if current == Some(doc.id.as_str()) {
                "*"
            } else {
                " "
            };
            println!(
                "{} {}  {} ({})",
                marker,
                style(&doc.id).bold(),
                doc.pdf_name.as_deref().unwrap_or("unnamed"),
                doc.created_at.as_deref().unwrap_or("unknown date"),
            );
        }
    }

    pub fn saved_precedents(&self, precedents: &[Precedent]) {
        if precedents.is_empty() {
            println!("No saved precedents yet.");
            return;
        }
        for p in precedents {
            println!("{}", style(p.name.as_deref().unwrap_or("Unnamed")).bold());
            println!(
                "  {} ({})",
                p.court.as_deref().unwrap_or("Unknown"),
                p.year.as_deref().unwrap_or("N/A"),
            );
            if let Some(url) = &p.url {
                println!("  {}", style(url).blue());
            }
            println!(
                "  {}",
                style(format!(
                    "Source: {} | {}",
                    p.source.as_deref().unwrap_or("N/A"),
                    p.created_at.as_deref().unwrap_or(""),
                ))
                .dim()
            );
            println!();
        }
    }

    pub fn facts(&self, entries: &[FactHistoryEntry]) {
        if entries.is_empty() {
            println!("No fact checks yet.");
            return;
        }
        for entry in entries {
            let verdict = if entry.supported {
                style("supported").green()
            } else {
                style("unsupported").red()
            };
            println!("{}", style(&entry.statement).bold());
            println!("  {} ({:.1}%)", verdict, entry.confidence * 100.0);
            if let Some(evidence) = &entry.evidence {
                println!("  Evidence: {}", evidence);
            }
            if let Some(ts) = &entry.timestamp {
                println!("  {}", style(ts).dim());
            }
            println!();
        }
    }

    pub fn success(&self, msg: &str) {
        println!("{}", style(msg).green());
    }

    pub fn notice(&self, msg: &str) {
        eprintln!("{}", style(msg).yellow());
    }

    pub fn error(&self, msg: &str) {
        eprintln!("{}", style(format!("Error: {}", msg)).red());
    }
}
