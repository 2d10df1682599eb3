mod app;
mod config;
mod form;
mod mood;
mod screens;
mod store;
mod theme;
mod ui;
mod validation;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use app::App;
use config::AppConfig;
use screens::Screen;
use store::persist::{FileStorage, Persistor};

const LOG_FILE: &str = "moodscribe.log";

#[derive(Parser, Debug)]
#[command(name = "moodscribe")]
#[command(version)]
#[command(about = "A terminal mood journal: sign in, pick a mood, write about your day")]
struct Args {
    /// Print the saved journal as JSON, newest first
    #[arg(short, long)]
    export: bool,

    /// Delete the saved journal and session
    #[arg(long)]
    purge: bool,

    /// Directory holding the saved journal (overrides the config file)
    #[arg(short, long, value_name = "PATH")]
    data_dir: Option<PathBuf>,

    /// Screen to open on
    #[arg(short, long, value_enum, default_value_t = Screen::Signin)]
    screen: Screen,

    /// Keep changes in memory only for this run
    #[arg(long)]
    ephemeral: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = AppConfig::load()?;
    let data_dir = match &args.data_dir {
        Some(dir) => dir.clone(),
        None => config.resolve_data_dir()?,
    };

    let cli_only = args.export || args.purge;
    init_logging(if cli_only { None } else { Some(data_dir.join(LOG_FILE)) })?;

    let storage = FileStorage::new(&data_dir);
    tracing::info!("Journal stored in {}", storage.dir().display());
    let persistor = Arc::new(Persistor::new(Arc::new(storage)));

    // Handle CLI-only commands
    if args.purge {
        persistor.purge()?;
        eprintln!("Removed saved journal from {}", data_dir.display());
        return Ok(());
    }

    if args.export {
        return export(&persistor);
    }

    if args.ephemeral {
        persistor.pause();
    }

    // Run TUI
    run_tui(config, persistor, args.screen)
}

/// Logs go to a file while the TUI owns the terminal, stderr otherwise
fn init_logging(log_file: Option<PathBuf>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("moodscribe=info"));

    match log_file {
        Some(path) => {
            let file = open_log(&path)?;
            tracing_subscriber::registry()
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .with(filter)
                .init();
        }
        None => {
            tracing_subscriber::registry()
                .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
                .with(filter)
                .init();
        }
    }
    Ok(())
}

fn open_log(path: &Path) -> Result<std::fs::File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))
}

fn export(persistor: &Persistor) -> Result<()> {
    let state = persistor.load()?.unwrap_or_default();
    let entries = state.journal.export();
    println!("{}", serde_json::to_string_pretty(&entries)?);
    Ok(())
}

fn run_tui(config: AppConfig, persistor: Arc<Persistor>, screen: Screen) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app state; persisted state arrives on a later tick
    let mut app = App::new(config, persistor, screen);

    // Main loop
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    // Handle key and catch any errors to prevent crashes
                    if let Err(e) = app.handle_key(key) {
                        tracing::warn!("Key handling failed: {:#}", e);
                        app.set_status(format!("Error: {}", e));
                    }
                }
            }
        }

        if app.should_quit {
            tracing::info!("Exiting");
            return Ok(());
        }

        // Periodic refresh
        app.tick();
    }
}
