use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use mindplay::app::{App, AppState, Control, Launch, MessageKind};
use mindplay::categories::{Category, Theme};
use mindplay::config::Config;
use mindplay::difficulty::Tier;
use mindplay::history::HistoryDb;
use mindplay::memory::MemoryGame;
use mindplay::runtime::{FixedTicker, GameEvent, Runner, TestEventSource};
use mindplay::session_state::{FileLocalStorage, MemoryLocalStorage, SessionStore};
use mindplay::word_chain::WordChainGame;

fn key(code: KeyCode) -> GameEvent {
    GameEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

fn type_word(tx: &mpsc::Sender<GameEvent>, word: &str) {
    for c in word.chars() {
        tx.send(key(KeyCode::Char(c))).unwrap();
    }
    tx.send(key(KeyCode::Enter)).unwrap();
}

/// Feed every queued event into the app, stopping at the first idle tick
fn drain(runner: &Runner<TestEventSource, FixedTicker>, app: &mut App) -> Control {
    for _ in 0..1000u32 {
        match runner.step() {
            GameEvent::Tick => return Control::Continue,
            GameEvent::Resize => {}
            GameEvent::Key(k) => {
                if app.handle_key(k) == Control::Quit {
                    return Control::Quit;
                }
            }
        }
    }
    Control::Continue
}

fn runner() -> (mpsc::Sender<GameEvent>, Runner<TestEventSource, FixedTicker>) {
    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(5)),
    );
    (tx, runner)
}

#[test]
fn quick_long_words_make_the_chain_harder() {
    let mut app = App::new(
        Config::default(),
        Some(HistoryDb::open_in_memory().unwrap()),
        Box::new(MemoryLocalStorage::default()),
        Launch::WordChain(Theme::Animals),
    )
    .unwrap();
    let words = ["tiger", "rabbit", "tapir", "rhino", "owl"]
        .iter()
        .map(|w| w.to_string())
        .collect();
    if let AppState::WordChain(screen) = &mut app.state {
        screen.game = WordChainGame::with_start_word(
            Category::from_words(Theme::Animals, words),
            "tiger".to_string(),
            15,
        );
    }

    let (tx, runner) = runner();
    for word in ["rabbit", "tapir", "rhino"] {
        type_word(&tx, word);
    }
    assert_eq!(drain(&runner, &mut app), Control::Continue);

    let AppState::WordChain(screen) = &app.state else {
        panic!("expected word chain screen");
    };
    assert_eq!(screen.game.score(), 16);
    assert_eq!(screen.game.streak(), 3);
    let difficulty = screen.game.difficulty();
    assert_eq!(difficulty.tier, Tier::Hard);
    assert_eq!(difficulty.base_time_limit_secs, 12);
    let message = screen.message.as_ref().unwrap();
    assert_eq!(message.kind, MessageKind::Success);
    assert!(message.text.contains("Difficulty: hard"), "{}", message.text);
    assert!(message.text.contains("12s"), "{}", message.text);
    assert!(screen.input.is_empty());
}

#[test]
fn broken_chain_keeps_the_input_and_reports_the_letter() {
    let mut app = App::new(
        Config::default(),
        None,
        Box::new(MemoryLocalStorage::default()),
        Launch::WordChain(Theme::Animals),
    )
    .unwrap();
    let words = ["tiger", "owl", "rabbit"].iter().map(|w| w.to_string()).collect();
    if let AppState::WordChain(screen) = &mut app.state {
        screen.game = WordChainGame::with_start_word(
            Category::from_words(Theme::Animals, words),
            "tiger".to_string(),
            15,
        );
    }

    let (tx, runner) = runner();
    type_word(&tx, "owl");
    drain(&runner, &mut app);

    let AppState::WordChain(screen) = &app.state else {
        panic!("expected word chain screen");
    };
    assert_eq!(screen.input, "owl");
    assert_eq!(screen.game.score(), 0);
    let message = screen.message.as_ref().unwrap();
    assert_eq!(message.kind, MessageKind::Error);
    assert!(message.text.contains("'r'"), "{}", message.text);
}

#[test]
fn finished_games_land_in_history_and_export() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("history.db");
    let mut app = App::new(
        Config {
            starting_time_limit_secs: 8,
            ..Config::default()
        },
        Some(HistoryDb::open_at(&db_path).unwrap()),
        Box::new(MemoryLocalStorage::default()),
        Launch::WordChain(Theme::Countries),
    )
    .unwrap();

    for _ in 0..9 {
        app.on_tick(1.0);
    }
    assert!(!app.is_animating());

    let db = HistoryDb::open_at(&db_path).unwrap();
    let games = db.recent_games(10).unwrap();
    assert_eq!(games.len(), 1);
    assert_eq!(games[0].result.theme, Theme::Countries);
    assert_eq!(games[0].result.score, 0);

    let csv_path = dir.path().join("games.csv");
    assert_eq!(db.export_csv(&csv_path).unwrap(), 1);
    let exported = std::fs::read_to_string(&csv_path).unwrap();
    assert!(exported.lines().count() >= 2);
    assert!(exported.contains("countries"));
}

#[test]
fn winning_memory_level_persists_unlock() {
    let dir = tempfile::tempdir().unwrap();
    let storage_path = dir.path().join("local_storage.json");
    let mut app = App::new(
        Config::default(),
        None,
        Box::new(FileLocalStorage::with_path(&storage_path)),
        Launch::Memory(1),
    )
    .unwrap();
    if let AppState::Memory(screen) = &mut app.state {
        screen.game = MemoryGame::with_values(1, (1..=6).flat_map(|v| [v, v]).collect(), 12);
    }

    let (tx, runner) = runner();
    for _ in 0..12 {
        tx.send(key(KeyCode::Char(' '))).unwrap();
        tx.send(key(KeyCode::Right)).unwrap();
    }
    drain(&runner, &mut app);

    let AppState::Memory(screen) = &app.state else {
        panic!("expected memory screen");
    };
    assert!(screen.game.is_finished());
    assert!(screen.celebration.is_active);

    let reloaded = SessionStore::new(FileLocalStorage::with_path(&storage_path)).load();
    assert_eq!(reloaded.unlocked_levels, 2);
    let results = reloaded.history(1);
    assert_eq!(results.len(), 1);
    assert!(results[0].won);
    assert_eq!(results[0].attempts_used, 6);

    // level 2 is now playable from a fresh start
    assert!(App::new(
        Config::default(),
        None,
        Box::new(FileLocalStorage::with_path(&storage_path)),
        Launch::Memory(2),
    )
    .is_ok());
}

#[test]
fn escape_ends_the_loop() {
    let mut app = App::new(
        Config::default(),
        None,
        Box::new(MemoryLocalStorage::default()),
        Launch::History,
    )
    .unwrap();
    let (tx, runner) = runner();
    tx.send(key(KeyCode::Down)).unwrap();
    tx.send(key(KeyCode::Esc)).unwrap();
    assert_eq!(drain(&runner, &mut app), Control::Quit);
}
