use clap::{error::ErrorKind, CommandFactory, Parser, Subcommand};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use mindplay::{
    app::{App, Control, Launch},
    app_dirs::AppDirs,
    categories::Theme,
    config::{Config, ConfigStore, FileConfigStore},
    difficulty::{MAX_TIME_LIMIT_SECS, MIN_TIME_LIMIT_SECS},
    history::HistoryDb,
    logging,
    memory::{adaptive_max_attempts, level_config, MAX_LEVEL},
    runtime::{CrosstermEventSource, FixedTicker, GameEvent, Runner},
    session_state::{FileLocalStorage, SessionStore},
    ui,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    time::Duration,
};
use tracing::{info, warn};

/// terminal edutainment games that adapt to how you play
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Word chains and memory matching in the terminal. Difficulty follows your last few rounds: quick, long, accurate answers make it harder, struggling makes it gentler."
)]
pub struct Cli {
    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// chain words where each starts with the last letter of the previous one
    WordChain {
        /// category the words must come from
        #[clap(short = 't', long, value_enum)]
        theme: Option<Theme>,

        /// starting seconds per word
        #[clap(short = 's', long)]
        time_limit: Option<u32>,
    },
    /// flip cards and find the pairs
    Memory {
        /// level to play (must be unlocked)
        #[clap(short = 'l', long)]
        level: Option<u32>,
    },
    /// browse past word chain games
    History {
        /// write all games to a CSV file instead of opening the browser
        #[clap(long, value_name = "PATH")]
        export: Option<PathBuf>,
    },
    /// show memory levels and their attempt budgets
    Levels,
    /// forget memory progress and word chain history
    Reset,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if let Err(e) = logging::init_file_logging(&AppDirs::log_path()) {
        eprintln!("logging disabled: {e}");
    }

    let config_store = FileConfigStore::new();
    let mut config = config_store.load();

    let launch = match cli.command.clone() {
        None => Launch::WordChain(config.default_theme),
        Some(Command::WordChain { theme, time_limit }) => {
            if let Some(secs) = time_limit {
                if !(MIN_TIME_LIMIT_SECS..=MAX_TIME_LIMIT_SECS).contains(&secs) {
                    let mut cmd = Cli::command();
                    cmd.error(
                        ErrorKind::ValueValidation,
                        format!(
                            "--time-limit must be between {MIN_TIME_LIMIT_SECS} and {MAX_TIME_LIMIT_SECS}"
                        ),
                    )
                    .exit();
                }
            }
            apply_overrides(&config_store, &mut config, theme, time_limit, None);
            Launch::WordChain(theme.unwrap_or(config.default_theme))
        }
        Some(Command::Memory { level }) => {
            if let Some(level) = level {
                if !(1..=MAX_LEVEL).contains(&level) {
                    let mut cmd = Cli::command();
                    cmd.error(
                        ErrorKind::ValueValidation,
                        format!("--level must be between 1 and {MAX_LEVEL}"),
                    )
                    .exit();
                }
            }
            apply_overrides(&config_store, &mut config, None, None, level);
            let level = level.unwrap_or_else(|| {
                let unlocked = SessionStore::new(FileLocalStorage::open())
                    .load()
                    .unlocked_levels;
                config.memory_start_level(unlocked)
            });
            Launch::Memory(level)
        }
        Some(Command::History { export: Some(path) }) => {
            let db = HistoryDb::open()?;
            let rows = db.export_csv(&path)?;
            println!("exported {rows} games to {}", path.display());
            return Ok(());
        }
        Some(Command::History { export: None }) => Launch::History,
        Some(Command::Levels) => {
            print_levels();
            return Ok(());
        }
        Some(Command::Reset) => {
            let mut store = SessionStore::new(FileLocalStorage::open());
            store.reset()?;
            if let Ok(db) = HistoryDb::open() {
                db.clear_all()?;
            }
            info!("progress reset");
            println!("progress reset");
            return Ok(());
        }
    };

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let history_db = match HistoryDb::open() {
        Ok(db) => Some(db),
        Err(e) => {
            warn!(error = %e, "history unavailable");
            None
        }
    };
    let mut app = match App::new(
        config.clone(),
        history_db,
        Box::new(FileLocalStorage::open()),
        launch,
    ) {
        Ok(app) => app,
        Err(e) => {
            let mut cmd = Cli::command();
            cmd.error(ErrorKind::InvalidValue, e.to_string()).exit();
        }
    };

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let tick = Duration::from_millis(config.tick_rate_ms.max(10));
    let outcome = start_tui(&mut terminal, &mut app, tick);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    outcome
}

/// CLI flags win over the config file and become the new defaults
fn apply_overrides(
    store: &FileConfigStore,
    config: &mut Config,
    theme: Option<Theme>,
    time_limit: Option<u32>,
    level: Option<u32>,
) {
    let before = config.clone();
    if let Some(theme) = theme {
        config.default_theme = theme;
    }
    if let Some(secs) = time_limit {
        config.starting_time_limit_secs = secs;
    }
    if let Some(level) = level {
        config.memory_level = level;
    }
    if *config != before {
        if let Err(e) = store.save(config) {
            warn!(error = %e, "could not save config");
        }
    }
}

fn print_levels() {
    let session = SessionStore::new(FileLocalStorage::open()).load();
    println!("{:<6} {:<8} {:<6} {:<8} {:<8}", "level", "status", "pairs", "budget", "played");
    for level in 1..=MAX_LEVEL {
        let config = level_config(level);
        let history = session.history(level);
        let status = if session.is_unlocked(level) {
            "open"
        } else {
            "locked"
        };
        println!(
            "{:<6} {:<8} {:<6} {:<8} {:<8}",
            level,
            status,
            config.pairs,
            adaptive_max_attempts(config, history),
            history.len()
        );
    }
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    tick: Duration,
) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(CrosstermEventSource::new(), FixedTicker::new(tick));
    let dt = runner.tick_secs();

    let size = terminal.size()?;
    app.set_viewport(size.width, size.height);
    terminal.draw(|f| ui::draw(app, f))?;

    loop {
        match runner.step() {
            GameEvent::Tick => {
                let animating = app.is_animating();
                app.on_tick(dt);
                if animating || app.is_animating() {
                    terminal.draw(|f| ui::draw(app, f))?;
                }
            }
            GameEvent::Resize => {
                let size = terminal.size()?;
                app.set_viewport(size.width, size.height);
                terminal.draw(|f| ui::draw(app, f))?;
            }
            GameEvent::Key(key) => {
                if app.handle_key(key) == Control::Quit {
                    break;
                }
                terminal.draw(|f| ui::draw(app, f))?;
            }
        }
    }

    Ok(())
}
