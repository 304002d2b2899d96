//! Stagehand - staging panel for git
//!
//! Shows the staged changes of a repository as a tree, unstages files and
//! directories, and commits or pushes from a one-line message editor.

use clap::Parser;
use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use crossterm::{
    event::{self, DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use stagehand_core::{Config, InputEvent, Message, UiQueue, WorkingTree};
use stagehand_git::GitRepo;
use stagehand_ui::App;
use std::fs::{self, File};
use std::io::stdout;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const TICK: Duration = Duration::from_millis(100);

/// Review, unstage and commit staged changes
#[derive(Parser, Debug)]
#[command(name = "stagehand")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Repository to open
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Config file to use instead of the default location
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Commit message helper binary
    #[arg(long)]
    helper: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Log file (defaults to the user cache directory)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    init_logging(&cli)?;

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .wrap_err("failed to load config")?;
    if let Some(helper) = cli.helper.clone() {
        config.helper.binary = helper;
    }

    let repo = GitRepo::open(&cli.path)
        .map_err(|e| eyre!("{}: {e}", cli.path.display()))?;
    let root = repo.root().to_path_buf();
    tracing::info!(root = %root.display(), "opened repository");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let mut queue = UiQueue::new();
    let repo: Arc<dyn WorkingTree> = Arc::new(repo);
    let mut app = App::new(config, repo, root, runtime.handle().clone(), queue.sender())?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    app.request_refresh();
    let result = run_app(&mut terminal, &mut app, &mut queue);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    runtime.shutdown_timeout(Duration::from_secs(1));
    result
}

/// Logs go to a file; the terminal belongs to the UI.
fn init_logging(cli: &Cli) -> Result<()> {
    let path = match &cli.log_file {
        Some(path) => path.clone(),
        None => dirs::cache_dir()
            .ok_or_else(|| eyre!("failed to find cache directory"))?
            .join("stagehand")
            .join("stagehand.log"),
    };
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let file = File::create(&path).wrap_err_with(|| format!("cannot open {}", path.display()))?;

    let level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("stagehand={level}").parse()?)
        .add_directive(format!("stagehand_core={level}").parse()?)
        .add_directive(format!("stagehand_ui={level}").parse()?)
        .add_directive(format!("stagehand_git={level}").parse()?);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .init();
    Ok(())
}

fn run_app<B>(terminal: &mut Terminal<B>, app: &mut App, queue: &mut UiQueue<App>) -> Result<()>
where
    B: Backend,
    <B as Backend>::Error: std::error::Error + Send + Sync + 'static,
{
    loop {
        // Results of background work first, so the frame shows them
        queue.drain(app);

        terminal.draw(|frame| app.render(frame))?;

        if event::poll(TICK)? {
            let input = InputEvent::from(event::read()?);
            app.dispatch(Message::from(input));
        }

        if app.should_quit() {
            break;
        }
    }

    Ok(())
}
