//! Wikipedia image search in the terminal.
//!
//! Type a page-title prefix; once typing pauses the matching pages that have
//! a thumbnail are listed. Enter zooms into the selected image.

use std::io::Stdout;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::event;
use ratatui::{backend::CrosstermBackend, Terminal};
use ratatui_image::picker::Picker;
use tracing::{error, info, warn};

use wiki_images::logging::{default_log_file, init_logging, level_for_verbosity};
use wiki_images::tui::{
    handle_event, process_state, render, restore_terminal, setup_terminal, viewport_width_px,
    AppState, ImageProtocol, Thumbnails,
};
use wiki_images::{Config, FetchService, ThumbnailLoader, WikiClient};

#[derive(Debug, Parser)]
#[command(name = "wiki-images")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Wikipedia language edition to search, e.g. "de".
    #[arg(short, long)]
    lang: Option<String>,

    /// Full API endpoint; overrides --lang.
    #[arg(long)]
    api_url: Option<String>,

    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Where to write log output.
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Show titles only, even if the terminal can draw images.
    #[arg(long)]
    no_thumbnails: bool,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn load_config(cli: &Cli) -> wiki_images::error::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(lang) = &cli.lang {
        config.language = lang.clone();
        config.api_url = None;
    }
    if let Some(api_url) = &cli.api_url {
        config.api_url = Some(api_url.clone());
    }
    if cli.no_thumbnails {
        config.thumbnails = false;
    }
    Ok(config)
}

/// Query the terminal for its image protocol. Must run after the terminal
/// is set up and before events are read.
fn thumbnails_for(config: &Config, client: Arc<WikiClient>) -> Thumbnails {
    if !config.thumbnails || !ImageProtocol::detect().is_supported() {
        info!("thumbnails off, showing text rows");
        return Thumbnails::disabled();
    }

    match Picker::from_query_stdio() {
        Ok(picker) => Thumbnails::new(picker, ThumbnailLoader::spawn(client)),
        Err(e) => {
            warn!(error = ?e, "could not query terminal image support");
            Thumbnails::disabled()
        }
    }
}

fn run(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    state: &mut AppState,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        let now = Instant::now();
        terminal.draw(|f| render(f, state, now))?;

        process_state(state, Instant::now());

        if state.should_quit {
            return Ok(());
        }

        if event::poll(Duration::from_millis(16))? {
            let event = event::read()?;
            handle_event(event, state, Instant::now());
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let log_file = cli.log_file.clone().unwrap_or_else(default_log_file);
    init_logging(&level_for_verbosity(cli.verbose, &config.log_level), &log_file)?;

    let api_url = config.api_url();
    info!(%api_url, limit = config.result_limit, "starting");

    let client = Arc::new(WikiClient::with_timeout(&api_url, config.request_timeout())?);
    let service = FetchService::with_limit(client.clone(), config.result_limit);

    // Setup terminal
    let mut terminal = setup_terminal()?;
    let mut state =
        AppState::new(service, &config).with_thumbnails(thumbnails_for(&config, client));
    match viewport_width_px() {
        Ok(width) => state.set_viewport_width(width),
        Err(e) => warn!(error = %e, "could not measure the terminal"),
    }

    let result = run(&mut terminal, &mut state);

    // Restore terminal
    restore_terminal(&mut terminal)?;

    if let Err(e) = &result {
        error!(error = %e, "terminal loop failed");
    }
    result
}
