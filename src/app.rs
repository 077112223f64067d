use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{info, warn};

use crate::categories::Theme;
use crate::celebration::Celebration;
use crate::config::Config;
use crate::error::Result;
use crate::history::{HistoryDb, HistoryEntry, ThemeSummary};
use crate::memory::{adaptive_max_attempts, level_config, FlipOutcome, MemoryGame, MAX_LEVEL};
use crate::rewards::{coins_earned, newly_unlocked, Achievement, Achievements};
use crate::session_state::{LocalStorage, SessionState, SessionStore};
use crate::word_chain::{SubmitOutcome, WordChainGame, WordChainResult};

/// How long a mismatched pair stays face up
pub const MISMATCH_REVEAL_SECS: f64 = 1.0;

const HISTORY_ROWS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// Which game the app opens with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Launch {
    WordChain(Theme),
    Memory(u32),
    History,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub kind: MessageKind,
    pub text: String,
}

impl Message {
    fn from_outcome(outcome: &SubmitOutcome) -> Self {
        Self {
            kind: if outcome.is_accepted() {
                MessageKind::Success
            } else {
                MessageKind::Error
            },
            text: outcome.message(),
        }
    }
}

#[derive(Debug)]
pub struct WordChainScreen {
    pub game: WordChainGame,
    pub input: String,
    pub message: Option<Message>,
    pub best_score: Option<u32>,
    /// Set once the game is over
    pub coins_earned: Option<u32>,
    pub new_achievements: Vec<Achievement>,
    recorded: bool,
}

impl WordChainScreen {
    fn new(game: WordChainGame, best_score: Option<u32>) -> Self {
        Self {
            game,
            input: String::new(),
            message: None,
            best_score,
            coins_earned: None,
            new_achievements: Vec::new(),
            recorded: false,
        }
    }
}

#[derive(Debug)]
pub struct MemoryScreen {
    pub game: MemoryGame,
    pub cursor: usize,
    pub celebration: Celebration,
    reveal_left: Option<f64>,
    recorded: bool,
}

impl MemoryScreen {
    fn new(game: MemoryGame) -> Self {
        Self {
            game,
            cursor: 0,
            celebration: Celebration::new(),
            reveal_left: None,
            recorded: false,
        }
    }

    fn move_cursor(&mut self, code: KeyCode) {
        let cols = self.game.config().cols.max(1) as usize;
        let count = self.game.cards().len();
        if count == 0 {
            return;
        }
        let next = match code {
            KeyCode::Left => self.cursor.checked_sub(1),
            KeyCode::Right => Some(self.cursor + 1),
            KeyCode::Up => self.cursor.checked_sub(cols),
            KeyCode::Down => Some(self.cursor + cols),
            _ => None,
        };
        if let Some(next) = next.filter(|n| *n < count) {
            self.cursor = next;
        }
    }
}

#[derive(Debug, Default)]
pub struct HistoryScreen {
    pub entries: Vec<HistoryEntry>,
    pub summary: Vec<ThemeSummary>,
    pub total_coins: u64,
    pub achievements: Achievements,
    pub scroll_offset: usize,
}

impl HistoryScreen {
    fn load(db: Option<&HistoryDb>) -> Self {
        let Some(db) = db else {
            return Self::default();
        };
        let entries = db.recent_games(HISTORY_ROWS).unwrap_or_else(|e| {
            warn!(error = %e, "could not read history");
            Vec::new()
        });
        let summary = db.theme_summary().unwrap_or_else(|e| {
            warn!(error = %e, "could not summarize history");
            Vec::new()
        });
        let total_coins = db.total_coins().unwrap_or_else(|e| {
            warn!(error = %e, "could not total coins");
            0
        });
        let achievements = db.achievements().unwrap_or_else(|e| {
            warn!(error = %e, "could not read achievements");
            Achievements::new()
        });
        Self {
            entries,
            summary,
            total_coins,
            achievements,
            scroll_offset: 0,
        }
    }
}

#[derive(Debug)]
pub enum AppState {
    WordChain(WordChainScreen),
    Memory(MemoryScreen),
    History(HistoryScreen),
}

pub struct App {
    pub state: AppState,
    pub config: Config,
    pub session: SessionState,
    history_db: Option<HistoryDb>,
    store: SessionStore<Box<dyn LocalStorage>>,
    viewport: (u16, u16),
}

impl App {
    pub fn new(
        config: Config,
        history_db: Option<HistoryDb>,
        storage: Box<dyn LocalStorage>,
        launch: Launch,
    ) -> Result<Self> {
        let store = SessionStore::new(storage);
        let session = match launch {
            Launch::Memory(level) => store.load_for_level(level)?,
            _ => store.load(),
        };

        let mut app = Self {
            state: AppState::History(HistoryScreen::default()),
            config,
            session,
            history_db,
            store,
            viewport: (80, 24),
        };
        match launch {
            Launch::WordChain(theme) => app.start_word_chain(theme),
            Launch::Memory(level) => app.start_memory(level),
            Launch::History => app.show_history(),
        }
        Ok(app)
    }

    pub fn set_viewport(&mut self, width: u16, height: u16) {
        self.viewport = (width, height);
    }

    pub fn history_db(&self) -> Option<&HistoryDb> {
        self.history_db.as_ref()
    }

    pub fn start_word_chain(&mut self, theme: Theme) {
        let best = self
            .history_db
            .as_ref()
            .and_then(|db| db.best_score(theme).ok().flatten());
        let game = WordChainGame::new(theme, self.config.starting_time_limit_secs);
        self.state = AppState::WordChain(WordChainScreen::new(game, best));
    }

    /// Start a memory level with a budget tuned to past results
    pub fn start_memory(&mut self, level: u32) {
        let level = level.clamp(1, MAX_LEVEL);
        let budget = adaptive_max_attempts(level_config(level), self.session.history(level));
        self.state = AppState::Memory(MemoryScreen::new(MemoryGame::new(level, budget)));
    }

    pub fn show_history(&mut self) {
        self.state = AppState::History(HistoryScreen::load(self.history_db.as_ref()));
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Control {
        if key.code == KeyCode::Esc
            || (key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c'))
        {
            return Control::Quit;
        }

        match &mut self.state {
            AppState::WordChain(screen) => {
                if screen.game.is_over() {
                    let theme = screen.game.theme();
                    match key.code {
                        KeyCode::Enter | KeyCode::Char('r') => self.start_word_chain(theme),
                        KeyCode::Char('h') => self.show_history(),
                        _ => {}
                    }
                    return Control::Continue;
                }
                match key.code {
                    KeyCode::Char(c) => screen.input.push(c),
                    KeyCode::Backspace => {
                        screen.input.pop();
                    }
                    KeyCode::Enter => {
                        let outcome = screen.game.submit(&screen.input);
                        if outcome.is_accepted() {
                            screen.input.clear();
                        }
                        screen.message = Some(Message::from_outcome(&outcome));
                    }
                    _ => {}
                }
            }
            AppState::Memory(screen) => {
                if screen.game.is_finished() {
                    let level = screen.game.level();
                    let won = screen.game.result().map(|r| r.won).unwrap_or(false);
                    match key.code {
                        KeyCode::Char('n') if won && level < MAX_LEVEL => {
                            self.start_memory(level + 1)
                        }
                        KeyCode::Char('r') | KeyCode::Enter => self.start_memory(level),
                        _ => {}
                    }
                    return Control::Continue;
                }
                match key.code {
                    KeyCode::Left | KeyCode::Right | KeyCode::Up | KeyCode::Down => {
                        screen.move_cursor(key.code)
                    }
                    KeyCode::Char(' ') | KeyCode::Enter => {
                        if let FlipOutcome::Mismatch { lost: false } = screen.game.flip(screen.cursor)
                        {
                            screen.reveal_left = Some(MISMATCH_REVEAL_SECS);
                        }
                        self.finish_memory_if_done();
                    }
                    _ => {}
                }
            }
            AppState::History(screen) => match key.code {
                KeyCode::Up => screen.scroll_offset = screen.scroll_offset.saturating_sub(1),
                KeyCode::Down => {
                    if screen.scroll_offset + 1 < screen.entries.len() {
                        screen.scroll_offset += 1;
                    }
                }
                KeyCode::Home => screen.scroll_offset = 0,
                KeyCode::Char('n') => {
                    let theme = self.config.default_theme;
                    self.start_word_chain(theme);
                }
                _ => {}
            },
        }
        Control::Continue
    }

    pub fn on_tick(&mut self, dt_secs: f64) {
        match &mut self.state {
            AppState::WordChain(screen) => {
                screen.game.on_tick(dt_secs);
                if screen.game.is_over() && !screen.recorded {
                    screen.recorded = true;
                    let result = screen.game.result();
                    let coins = coins_earned(result.score, result.final_tier);
                    screen.coins_earned = Some(coins);
                    screen.message = Some(Message {
                        kind: MessageKind::Error,
                        text: format!("{} +{coins} coins", SubmitOutcome::GameOver.message()),
                    });
                    if self.config.record_history {
                        if let Some(db) = &self.history_db {
                            screen.new_achievements = record_with_achievements(db, &result);
                        }
                    }
                }
            }
            AppState::Memory(screen) => {
                if let Some(left) = screen.reveal_left.as_mut() {
                    *left -= dt_secs;
                    if *left <= 0.0 {
                        screen.reveal_left = None;
                        screen.game.settle();
                    }
                }
                screen.celebration.update(dt_secs);
            }
            AppState::History(_) => {}
        }
    }

    /// Whether the screen changes between ticks and needs a redraw
    pub fn is_animating(&self) -> bool {
        match &self.state {
            AppState::WordChain(screen) => !screen.game.is_over(),
            AppState::Memory(screen) => {
                screen.celebration.is_active || screen.game.has_pending_mismatch()
            }
            AppState::History(_) => false,
        }
    }

    fn finish_memory_if_done(&mut self) {
        let AppState::Memory(screen) = &mut self.state else {
            return;
        };
        if screen.recorded {
            return;
        }
        let Some(result) = screen.game.result() else {
            return;
        };
        screen.recorded = true;
        if result.won {
            screen.celebration.start(self.viewport.0, self.viewport.1);
        }
        info!(level = result.level, won = result.won, "memory result recorded");
        self.session.record_level_result(result);
        if let Err(e) = self.store.save(&self.session) {
            warn!(error = %e, "could not save memory progress");
        }
    }
}

/// Store a finished game and report the achievements it unlocked
fn record_with_achievements(db: &HistoryDb, result: &WordChainResult) -> Vec<Achievement> {
    let before = db.achievements().unwrap_or_else(|e| {
        warn!(error = %e, "could not read achievements");
        Achievements::new()
    });
    if let Err(e) = db.record_game(result) {
        warn!(error = %e, "could not record word chain game");
        return Vec::new();
    }
    match db.achievements() {
        Ok(after) => {
            let unlocked = newly_unlocked(&before, &after);
            if !unlocked.is_empty() {
                info!(count = unlocked.len(), "achievements unlocked");
            }
            unlocked
        }
        Err(e) => {
            warn!(error = %e, "could not read achievements");
            Vec::new()
        }
    }
}
