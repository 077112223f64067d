// Library surface for the binary and for headless integration tests.
pub mod app;
pub mod app_dirs;
pub mod categories;
pub mod celebration;
pub mod config;
pub mod difficulty;
pub mod error;
pub mod history;
pub mod logging;
pub mod memory;
pub mod rewards;
pub mod runtime;
pub mod sampler;
pub mod session_state;
pub mod ui;
pub mod util;
pub mod word_chain;

pub use error::{MindplayError, Result};
