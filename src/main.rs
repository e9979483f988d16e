use std::fs::{self, File};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use mzu_chat::session::STALE_SESSION_AGE;
use mzu_chat::{AnswerClient, ChatWidget, Config, FileSession};

mod app;
mod handler;
mod tui;
mod ui;

use app::App;
use tui::EventHandler;

#[derive(Parser)]
#[command(name = "mzu-chat")]
#[command(about = "Chat with the MZU assistant from your terminal", version)]
struct Cli {
    /// Answering endpoint (POST {"query": ...})
    #[arg(long, env = "MZU_CHAT_API_URL")]
    api_url: Option<String>,

    /// Seconds to wait for an answer before giving up
    #[arg(long)]
    timeout: Option<u64>,

    /// Session id for the one-time greeting (defaults to this terminal tab)
    #[arg(long)]
    session: Option<String>,

    /// Where to write logs
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Save the effective settings to the config file and exit
    #[arg(long)]
    write_config: bool,
}

impl Cli {
    /// Flags win over environment, which wins over the config file.
    fn apply(&self, config: Config) -> Config {
        let mut config = config.with_env();
        if let Some(url) = &self.api_url {
            config.api_url = Some(url.clone());
        }
        if let Some(secs) = self.timeout {
            config.timeout_secs = Some(secs);
        }
        if let Some(session) = &self.session {
            config.session = Some(session.clone());
        }
        config
    }
}

fn init_logging(path: Option<PathBuf>) -> Result<PathBuf> {
    let path = match path {
        Some(p) => p,
        None => dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("mzu-chat")
            .join("mzu-chat.log"),
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = File::options()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    let filter = EnvFilter::try_from_env("MZU_CHAT_LOG").unwrap_or_else(|_| EnvFilter::new("info"));

    // The terminal belongs to the UI, so logs go to a file
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(path)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Ignoring unreadable config: {e}");
        Config::new()
    });
    let config = cli.apply(config);

    if cli.write_config {
        let path = config.save()?;
        println!("Saved config to {}", path.display());
        return Ok(());
    }

    let log_path = init_logging(cli.log_file.clone())?;
    tracing::info!(log = %log_path.display(), api_url = config.api_url(), "starting");

    let client = AnswerClient::new(config.api_url())?;
    let store = FileSession::for_current(config.session.as_deref());
    let pruned = store.prune_stale(STALE_SESSION_AGE);
    tracing::debug!(session = %store.path().display(), pruned, "session store");

    tui::install_panic_hook();
    let mut terminal = tui::init()?;

    let result = run(&mut terminal, client, store, &config).await;

    tui::restore()?;
    if let Err(e) = &result {
        tracing::error!(error = %e, "exited with error");
    }
    result
}

async fn run(
    terminal: &mut tui::Tui,
    client: AnswerClient,
    store: FileSession,
    config: &Config,
) -> Result<()> {
    let mut events = EventHandler::new();

    let widget = ChatWidget::new(Arc::new(client), Box::new(store), config, events.completions());
    if widget.greeter().is_pending() {
        events.schedule_greeting(widget.greeter().delay());
    }

    let mut app = App::new(widget, config.api_url().to_string());

    while !app.should_quit {
        terminal.draw(|frame| ui::render(&mut app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(&mut app, event)?,
            None => break,
        }
    }

    tracing::info!("bye");
    Ok(())
}
