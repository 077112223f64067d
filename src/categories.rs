use include_dir::{include_dir, Dir};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::from_str;
use std::collections::HashSet;
use std::str::FromStr;

use crate::error::MindplayError;

static CATEGORY_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/categories");

/// Word-chain themes, each backed by a bundled word list
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Theme {
    #[default]
    Animals,
    Countries,
    Fruits,
}

impl Theme {
    pub const ALL: [Theme; 3] = [Theme::Animals, Theme::Countries, Theme::Fruits];

    /// Singular noun for messages ("Please enter a valid fruit")
    pub fn singular(&self) -> &'static str {
        match self {
            Theme::Animals => "animal",
            Theme::Countries => "country",
            Theme::Fruits => "fruit",
        }
    }
}

impl FromStr for Theme {
    type Err = MindplayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Theme::ALL
            .into_iter()
            .find(|t| t.to_string() == s.trim().to_lowercase())
            .ok_or_else(|| MindplayError::UnknownTheme(s.to_string()))
    }
}

#[derive(Deserialize, Debug)]
struct CategoryFile {
    name: String,
    words: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct Category {
    pub theme: Theme,
    pub words: Vec<String>,
    lookup: HashSet<String>,
}

impl Category {
    /// Load the bundled word list for a theme.
    ///
    /// The lists are compiled into the binary; a missing or malformed file is
    /// a packaging bug, hence the panic.
    pub fn load(theme: Theme) -> Self {
        let file_name = format!("{theme}.json");
        let file = CATEGORY_DIR
            .get_file(&file_name)
            .expect("Category file not found");
        let contents = file
            .contents_utf8()
            .expect("Unable to interpret category file as a string");
        let parsed: CategoryFile = from_str(contents).expect("Unable to deserialize category json");
        debug_assert_eq!(parsed.name, theme.to_string());

        Self::from_words(theme, parsed.words)
    }

    pub fn from_words(theme: Theme, words: Vec<String>) -> Self {
        let words: Vec<String> = words.into_iter().map(|w| w.to_lowercase()).collect();
        let lookup = words.iter().cloned().collect();
        Self {
            theme,
            words,
            lookup,
        }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.lookup.contains(&word.trim().to_lowercase())
    }

    pub fn random_word<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&str> {
        self.words.choose(rng).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
