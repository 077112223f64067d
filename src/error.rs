/// Errors surfaced by the persistence and asset layers.
///
/// Game rule rejections (a word that doesn't chain, a card that can't be
/// flipped) are not errors; they come back as outcome enums from the engines.
#[derive(Debug, thiserror::Error)]
pub enum MindplayError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("unknown theme: {0}")]
    UnknownTheme(String),

    #[error("level {0} is locked")]
    LevelLocked(u32),
}

pub type Result<T> = std::result::Result<T, MindplayError>;
