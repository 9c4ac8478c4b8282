mod app;
mod domain;
mod input;
mod logging;
mod persistence;
mod session;
mod store;
mod ui;

use anyhow::{Context, Result};
use app::AppState;
use clap::{Parser, Subcommand};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use persistence::{ensure_data_dir, init_local_dir, log_file, FileStore};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::PathBuf;
use store::TaskStore;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "todo")]
#[command(about = "A terminal to-do list with search, filtering and sorting", long_about = None)]
struct Cli {
    /// Data directory (defaults to a local .todolist or ~/.todolist)
    #[arg(long, env = "TODOLIST_DIR", global = true)]
    dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a local .todolist directory in the current directory
    Init,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Init) => {
            let cwd = std::env::current_dir().context("Could not determine current directory")?;
            let data_dir = init_local_dir(&cwd)?;
            println!("Initialized todolist directory: {}", data_dir.display());
            println!();
            println!("todo will now use this local directory for task storage.");
            Ok(())
        }
        None => run_tui(cli.dir),
    }
}

fn run_tui(dir: Option<PathBuf>) -> Result<()> {
    let data_dir = ensure_data_dir(dir.as_deref())?;
    logging::init_logging(&log_file(&data_dir))?;
    info!(dir = %data_dir.display(), "starting");

    let store = TaskStore::open(FileStore::new(data_dir));
    let mut app = AppState::new(store);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run app
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Queued writes must land before exit
    app.shutdown();

    if let Err(err) = &result {
        error!(error = %err, "exited with error");
        eprintln!("Error: {}", err);
    }
    info!("stopped");

    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut AppState) -> Result<()> {
    loop {
        terminal.draw(|f| ui::render(f, app))?;

        // Nothing changes without input, so block on the next event
        if let Event::Key(key) = event::read()? {
            // Only process key press events (ignore key release)
            if key.kind == KeyEventKind::Press && input::handle_key(app, key) {
                return Ok(());
            }
        }
    }
}
