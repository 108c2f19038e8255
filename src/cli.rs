//! Command-line interface.
//!
//! Each subcommand is one user gesture: it runs exactly one action through
//! the controller and renders the follow-up. The in-flight spinner doubles
//! as the disabled-control state; the command cannot be re-triggered until
//! its call resolves.

use std::future::Future;
use std::io::BufRead;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use console::Term;
use indicatif::ProgressBar;

use crate::config::{Config, Settings};
use crate::controller::{App, AppError};
use crate::server;
use crate::session::ChatMessage;
use crate::view::panels;
use crate::view::term::TermView;

#[derive(Parser)]
#[command(
    name = "casebook",
    version,
    about = "Legal research companion: document summaries, precedent search, and grounded chat"
)]
pub struct Cli {
    /// Origin of the analysis service
    #[arg(long, env = "CASEBOOK_ENDPOINT", global = true)]
    pub endpoint: Option<String>,

    /// Directory for session state
    #[arg(long, env = "CASEBOOK_DATA_DIR", global = true)]
    pub data_dir: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in and persist the session
    Login { username: String },
    /// Create an account
    Signup { username: String },
    /// Upload a PDF for summarization and indexing
    Upload { file: PathBuf },
    /// Ask about the current document; interactive without a query
    Chat { query: Option<String> },
    /// Search precedents for the current document
    Precedents {
        /// Show previously saved precedents instead of searching
        #[arg(long)]
        saved: bool,
    },
    /// List uploaded documents
    Documents,
    /// Target a document for chat and precedent search
    Select { document_id: String },
    /// Show the fact-check history
    Facts,
    /// Show session status
    Status,
    /// Serve a read-only local view of the session
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        #[arg(long, default_value_t = 8321)]
        port: u16,
    },
    /// Write the session as a standalone HTML page
    Export { path: PathBuf },
    /// Clear the session
    Logout,
}

/// Resolve settings, run the requested command, and render failures.
pub async fn run(cli: Cli) -> Result<()> {
    let overrides = Config {
        endpoint: cli.endpoint.clone(),
        target: cli.data_dir.clone(),
        request_timeout: None,
    };
    let settings = overrides.apply(Config::load().await.apply(Settings::default()));
    settings.ensure_directories()?;

    let view = TermView::new();
    let mut app = App::new(&settings);
    app.hydrate();

    if let Err(err) = dispatch(cli.command, &mut app, &view, &settings).await {
        match err.downcast_ref::<AppError>() {
            Some(app_err) if app_err.is_session_expired() => {
                view.notice("Session expired. Please log in again.");
            }
            Some(app_err) => view.error(&app_err.to_string()),
            None => view.error(&err.to_string()),
        }
        std::process::exit(1);
    }
    Ok(())
}

async fn dispatch(
    command: Commands,
    app: &mut App,
    view: &TermView,
    settings: &Settings,
) -> Result<()> {
    match command {
        Commands::Login { username } => {
            let password = prompt_password("Password: ")?;
            with_spinner("Logging in...", app.login(&username, &password)).await?;

            let session = app.session();
            view.success(&format!(
                "Logged in as {}.",
                session.username.as_deref().unwrap_or(&username)
            ));
            view.status(session);
            if !session.chat_history.is_empty() {
                println!();
                view.replay(&session.chat_history);
            }
        }
        Commands::Signup { username } => {
            let password = prompt_password("Password: ")?;
            let message = with_spinner("Creating account...", app.signup(&username, &password)).await?;
            view.success(&message);
            println!("Log in with: casebook login {}", username);
        }
        Commands::Upload { file } => {
            with_spinner("Uploading and indexing...", app.upload(&file)).await?;

            let session = app.session();
            view.success(&format!(
                "Index ready for: {}",
                session.pdf_name.as_deref().unwrap_or("document")
            ));
            if let Some(summary) = &session.summary {
                println!();
                view.summary(summary);
            }
        }
        Commands::Chat { query: Some(query) } => {
            view.message(&ChatMessage::user(query.as_str()));
            let answer = with_spinner("Thinking...", app.chat(&query)).await?;
            view.message(&answer);
        }
        Commands::Chat { query: None } => chat_loop(app, view).await?,
        Commands::Precedents { saved: true } => {
            let list = with_spinner("Loading saved precedents...", app.saved_precedents()).await?;
            view.saved_precedents(&list);
        }
        Commands::Precedents { saved: false } => {
            let listing = with_spinner("Searching precedents...", app.find_precedents()).await?;
            view.markdown_block(&listing);
        }
        Commands::Documents => {
            let docs = with_spinner("Loading documents...", app.documents()).await?;
            view.documents(&docs, app.session().current_document_id.as_deref());
        }
        Commands::Select { document_id } => {
            app.select_document(&document_id)?;
            view.success(&format!("Now targeting document {}.", document_id));
        }
        Commands::Facts => {
            let history = with_spinner("Loading fact-check history...", app.fact_history()).await?;
            view.facts(&history);
        }
        Commands::Status => {
            view.status(app.session());
        }
        Commands::Serve { host, port } => {
            server::serve(settings, &host, port).await?;
        }
        Commands::Export { path } => {
            let html = panels::session_page(app.session(), app.fact_log());
            std::fs::write(&path, html)?;
            view.success(&format!("Session exported to {}", path.display()));
        }
        Commands::Logout => {
            app.logout();
            view.success("Logged out.");
        }
    }
    Ok(())
}

/// The interactive chat loop: replays the stored transcript, then maps each
/// line to one chat action. The spinner stands in for the assistant bubble
/// until the real answer replaces it.
async fn chat_loop(app: &mut App, view: &TermView) -> Result<()> {
    if !app.session().is_authenticated() {
        return Err(AppError::Api(crate::api::ApiError::MissingToken).into());
    }

    view.status(app.session());
    println!("Type a question, or :quit to leave.\n");
    view.replay(&app.session().chat_history);

    let term = Term::stdout();
    let stdin = std::io::stdin();
    let mut line = String::new();
    loop {
        term.write_str("you> ")?;
        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        if query == ":quit" || query == ":q" {
            break;
        }

        match with_spinner("Thinking...", app.chat(query)).await {
            Ok(answer) => view.message(&answer),
            Err(err) if err.is_session_expired() => {
                view.notice("Session expired. Please log in again.");
                break;
            }
            // terminal for this turn only; the next line is a new gesture
            Err(err) => view.error(&err.to_string()),
        }
    }
    Ok(())
}

fn prompt_password(prompt: &str) -> Result<String> {
    let term = Term::stderr();
    term.write_str(prompt)?;
    Ok(term.read_secure_line()?)
}

async fn with_spinner<T>(msg: &'static str, fut: impl Future<Output = T>) -> T {
    let spinner = ProgressBar::new_spinner();
    spinner.set_message(msg);
    spinner.enable_steady_tick(Duration::from_millis(120));
    let outcome = fut.await;
    spinner.finish_and_clear();
    outcome
}
