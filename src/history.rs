use chrono::{DateTime, Local};
use rusqlite::{params, Connection, Row};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info};

use crate::app_dirs::AppDirs;
use crate::categories::Theme;
use crate::difficulty::Tier;
use crate::error::Result;
use crate::rewards::{
    coins_earned, Achievement, Achievements, LONG_STREAK, PERFECT_GAME_SCORE, PERFECT_GAME_STREAK,
    VETERAN_GAMES,
};
use crate::word_chain::WordChainResult;

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS word_chain_games (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        theme TEXT NOT NULL,
        score INTEGER NOT NULL,
        best_streak INTEGER NOT NULL,
        words_played INTEGER NOT NULL,
        final_tier TEXT NOT NULL,
        final_time_limit_secs INTEGER NOT NULL,
        finished_at TEXT NOT NULL,
        words_used TEXT NOT NULL DEFAULT '[]',
        total_time_played_secs REAL NOT NULL DEFAULT 0,
        coins INTEGER NOT NULL DEFAULT 0
    );
    CREATE INDEX IF NOT EXISTS idx_word_chain_games_theme ON word_chain_games(theme);
    CREATE INDEX IF NOT EXISTS idx_word_chain_games_finished ON word_chain_games(finished_at);
"#;

/// Columns added after the first release, with their definitions
const ADDED_COLUMNS: [(&str, &str); 3] = [
    ("words_used", "TEXT NOT NULL DEFAULT '[]'"),
    ("total_time_played_secs", "REAL NOT NULL DEFAULT 0"),
    ("coins", "INTEGER NOT NULL DEFAULT 0"),
];

/// A stored word-chain game
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub id: i64,
    pub result: WordChainResult,
    pub coins: u32,
    pub finished_at: DateTime<Local>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThemeSummary {
    pub theme: Theme,
    pub games: i64,
    pub avg_score: f64,
    pub best_score: u32,
}

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    finished_at: String,
    theme: &'a Theme,
    score: u32,
    best_streak: u32,
    words_played: u32,
    final_tier: &'a Tier,
    final_time_limit_secs: u32,
    words_used: String,
    total_time_played_secs: f64,
    coins: u32,
}

/// Word-chain game history backed by SQLite
#[derive(Debug)]
pub struct HistoryDb {
    conn: Connection,
}

impl HistoryDb {
    /// Open the database in the user's state directory
    pub fn open() -> Result<Self> {
        Self::open_at(AppDirs::db_path())
    }

    pub fn open_at<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path.as_ref())?;
        debug!(path = %path.as_ref().display(), "history database opened");
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        migrate(&conn)?;
        Ok(Self { conn })
    }

    pub fn record_game(&self, result: &WordChainResult) -> Result<i64> {
        self.record_game_at(result, Local::now())
    }

    pub fn record_game_at(
        &self,
        result: &WordChainResult,
        finished_at: DateTime<Local>,
    ) -> Result<i64> {
        self.conn.execute(
            r#"
            INSERT INTO word_chain_games
            (theme, score, best_streak, words_played, final_tier, final_time_limit_secs, finished_at,
             words_used, total_time_played_secs, coins)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                result.theme.to_string(),
                result.score,
                result.best_streak,
                result.words_played,
                result.final_tier.to_string(),
                result.final_time_limit_secs,
                finished_at.to_rfc3339(),
                serde_json::to_string(&result.words_used)?,
                result.total_time_played_secs,
                coins_earned(result.score, result.final_tier),
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        info!(id, score = result.score, theme = %result.theme, "game recorded");
        Ok(id)
    }

    /// Most recent games first
    pub fn recent_games(&self, limit: usize) -> Result<Vec<HistoryEntry>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, theme, score, best_streak, words_played, final_tier, final_time_limit_secs, finished_at,
                   words_used, total_time_played_secs, coins
            FROM word_chain_games
            ORDER BY finished_at DESC, id DESC
            LIMIT ?1
            "#,
        )?;
        let entries = stmt
            .query_map([limit as i64], entry_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(entries)
    }

    pub fn best_score(&self, theme: Theme) -> Result<Option<u32>> {
        let best: Option<u32> = self.conn.query_row(
            "SELECT MAX(score) FROM word_chain_games WHERE theme = ?1",
            [theme.to_string()],
            |row| row.get(0),
        )?;
        Ok(best)
    }

    /// Per-theme totals, only for themes that have been played
    pub fn theme_summary(&self) -> Result<Vec<ThemeSummary>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT theme, COUNT(*), AVG(score), MAX(score)
            FROM word_chain_games
            GROUP BY theme
            ORDER BY theme
            "#,
        )?;
        let summary = stmt
            .query_map([], |row| {
                Ok(ThemeSummary {
                    theme: theme_column(row, 0)?,
                    games: row.get(1)?,
                    avg_score: row.get(2)?,
                    best_score: row.get(3)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(summary)
    }

    /// Coins earned across every stored game
    pub fn total_coins(&self) -> Result<u64> {
        let total: i64 = self.conn.query_row(
            "SELECT COALESCE(SUM(coins), 0) FROM word_chain_games",
            [],
            |row| row.get(0),
        )?;
        Ok(total.max(0) as u64)
    }

    /// Achievements earned by the games on record
    pub fn achievements(&self) -> Result<Achievements> {
        let (games, perfect, long_streak, themes, expert): (i64, bool, bool, i64, bool) =
            self.conn.query_row(
                r#"
                SELECT COUNT(*),
                       COALESCE(MAX(score >= ?1 AND best_streak > ?2), 0),
                       COALESCE(MAX(best_streak >= ?3), 0),
                       COUNT(DISTINCT theme),
                       COALESCE(MAX(final_tier = 'hard'), 0)
                FROM word_chain_games
                "#,
                params![PERFECT_GAME_SCORE, PERFECT_GAME_STREAK, LONG_STREAK],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?)),
            )?;

        let earned = [
            (games >= 1, Achievement::PlayedOneTime),
            (perfect, Achievement::PerfectGame),
            (long_streak, Achievement::TenStreak),
            (games >= VETERAN_GAMES, Achievement::HundredGames),
            (themes >= Theme::ALL.len() as i64, Achievement::AllThemesPlayed),
            (expert, Achievement::ExpertLevel),
        ];
        Ok(earned
            .into_iter()
            .filter_map(|(earned, achievement)| earned.then_some(achievement))
            .collect())
    }

    pub fn clear_all(&self) -> Result<()> {
        self.conn.execute("DELETE FROM word_chain_games", [])?;
        Ok(())
    }

    /// Write every stored game to a CSV file, oldest first. Returns the row count.
    pub fn export_csv<P: AsRef<Path>>(&self, path: P) -> Result<usize> {
        let mut entries = self.recent_games(usize::MAX >> 1)?;
        entries.reverse();

        let mut writer = csv::Writer::from_path(path.as_ref())?;
        for entry in &entries {
            writer.serialize(CsvRow {
                finished_at: entry.finished_at.to_rfc3339(),
                theme: &entry.result.theme,
                score: entry.result.score,
                best_streak: entry.result.best_streak,
                words_played: entry.result.words_played,
                final_tier: &entry.result.final_tier,
                final_time_limit_secs: entry.result.final_time_limit_secs,
                words_used: entry.result.words_used.join(" "),
                total_time_played_secs: entry.result.total_time_played_secs,
                coins: entry.coins,
            })?;
        }
        writer.flush()?;
        info!(rows = entries.len(), path = %path.as_ref().display(), "history exported");
        Ok(entries.len())
    }
}

/// Add columns missing from databases created by older versions
fn migrate(conn: &Connection) -> Result<()> {
    let mut stmt = conn.prepare("PRAGMA table_info(word_chain_games)")?;
    let existing = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    for (name, definition) in ADDED_COLUMNS {
        if !existing.iter().any(|c| c == name) {
            conn.execute_batch(&format!(
                "ALTER TABLE word_chain_games ADD COLUMN {name} {definition}"
            ))?;
            info!(column = name, "history schema upgraded");
        }
    }
    Ok(())
}

fn theme_column(row: &Row, idx: usize) -> rusqlite::Result<Theme> {
    let raw: String = row.get(idx)?;
    raw.parse::<Theme>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn tier_column(row: &Row, idx: usize) -> rusqlite::Result<Tier> {
    let raw: String = row.get(idx)?;
    match raw.as_str() {
        "easy" => Ok(Tier::Easy),
        "medium" => Ok(Tier::Medium),
        "hard" => Ok(Tier::Hard),
        _ => Err(rusqlite::Error::InvalidColumnType(
            idx,
            "final_tier".to_string(),
            rusqlite::types::Type::Text,
        )),
    }
}

fn words_column(row: &Row, idx: usize) -> rusqlite::Result<Vec<String>> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn entry_from_row(row: &Row) -> rusqlite::Result<HistoryEntry> {
    let finished_at: String = row.get(7)?;
    let finished_at = DateTime::parse_from_rfc3339(&finished_at)
        .map_err(|_| {
            rusqlite::Error::InvalidColumnType(
                7,
                "finished_at".to_string(),
                rusqlite::types::Type::Text,
            )
        })?
        .with_timezone(&Local);

    Ok(HistoryEntry {
        id: row.get(0)?,
        result: WordChainResult {
            theme: theme_column(row, 1)?,
            score: row.get(2)?,
            best_streak: row.get(3)?,
            words_played: row.get(4)?,
            final_tier: tier_column(row, 5)?,
            final_time_limit_secs: row.get(6)?,
            words_used: words_column(row, 8)?,
            total_time_played_secs: row.get(9)?,
        },
        coins: row.get(10)?,
        finished_at,
    })
}
