//! bizscope - terminal business-search explorer
//!
//! Shows search results as a scrollable list next to a map. Hovering either
//! view highlights the same business in the other, and selecting a result
//! opens its details on the map.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use bizscope::application::{App, AppMode};
use bizscope::domain::AppResult;
use bizscope::infrastructure::{init_logger, BusinessRepository, Config};
use bizscope::presentation::{render_ui, InputHandler};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(name = "bizscope", version, about = "Browse business search results as a list and a map")]
struct Cli {
    /// Result set to show (.json or .csv)
    #[arg(required_unless_present = "url", conflicts_with = "url")]
    input: Option<PathBuf>,

    /// Fetch the result set as JSON from this URL instead
    #[arg(long)]
    url: Option<String>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Append logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

/// Entry point: loads configuration and results, then runs the terminal UI
/// until the user quits.
///
/// # Errors
///
/// Returns an error if the configuration or the results cannot be loaded, or
/// if terminal setup fails.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    init_logger(cli.verbose, cli.log_file.as_deref())?;

    let (businesses, source_label) = load_businesses(&cli)?;
    let mut app = App::new(businesses, &config, source_label);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let tick_rate = Duration::from_millis(config.ui.tick_rate_ms.max(1));
    let res = run_app(&mut terminal, &mut app, tick_rate);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        error!(%err, "terminal error");
        println!("{err:?}");
    }

    Ok(())
}

fn load_businesses(cli: &Cli) -> AppResult<(Vec<bizscope::domain::Business>, String)> {
    match (&cli.url, &cli.input) {
        (Some(url), _) => Ok((BusinessRepository::fetch_url(url)?, url.clone())),
        (None, Some(path)) => Ok((BusinessRepository::load_file(path)?, path.display().to_string())),
        (None, None) => Ok((Vec::new(), "nowhere".to_string())),
    }
}

/// Main event loop.
///
/// Waits at most `tick_rate` for input so the list's scroll animation keeps
/// moving while the user is idle.
fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App, tick_rate: Duration) -> io::Result<()> {
    info!(results = app.businesses.len(), "session started");
    loop {
        app.tick();
        terminal.draw(|f| render_ui(f, app))?;

        if !event::poll(tick_rate)? {
            continue;
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                KeyCode::Char('q') if app.mode == AppMode::Normal => {
                    info!("session ended");
                    return Ok(());
                }
                _ => InputHandler::handle_key_event(app, key.code, key.modifiers),
            },
            Event::Mouse(mouse) => InputHandler::handle_mouse_event(app, mouse),
            _ => {}
        }
    }
}
