//! Settings of an import run.
//!
//! Settings come from a JSON file where every field is optional, then a few
//! of them can be overridden from the environment:
//!
//! | Variable                       | Field              |
//! |--------------------------------|--------------------|
//! | `BOOK_IMPORT_INPUT`            | `input_path`       |
//! | `BOOK_IMPORT_MONGODB_URI`      | `mongodb.uri`      |
//! | `BOOK_IMPORT_MONGODB_DATABASE` | `mongodb.database` |
//!
//! ```
//! use book_import_batch::config::{GenreOnMissing, ImportConfig};
//!
//! let config = ImportConfig::from_json(r#"{ "chunk_size": 10, "genre_on_missing": "save" }"#).unwrap();
//!
//! assert_eq!(config.chunk_size, 10);
//! assert_eq!(config.delimiter, ';');
//! assert_eq!(config.genre_on_missing, GenreOnMissing::Save);
//! ```

use std::{fs::File, io::BufReader, path::Path};

use chrono::format::{Item, StrftimeItems};
use serde::Deserialize;

use crate::{
    BatchError,
    domain::parser::{DEFAULT_DATE_FORMAT, RecordParser},
};

pub const INPUT_ENV: &str = "BOOK_IMPORT_INPUT";
pub const MONGODB_URI_ENV: &str = "BOOK_IMPORT_MONGODB_URI";
pub const MONGODB_DATABASE_ENV: &str = "BOOK_IMPORT_MONGODB_DATABASE";

/// What the books stage does with a genre the store does not know.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenreOnMissing {
    /// Fail the book with a missing reference error.
    #[default]
    Fail,
    /// Insert the genre and carry on.
    Save,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            uri: "mongodb://127.0.0.1:27017/".to_string(),
            database: "library".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    pub input_path: String,
    pub delimiter: char,
    pub has_headers: bool,
    /// chrono `strftime` pattern of the published date column
    pub date_format: String,
    pub chunk_size: u16,
    pub skip_limit: u16,
    pub genre_on_missing: GenreOnMissing,
    /// Empty every collection before importing
    pub clean_on_start: bool,
    pub mongodb: MongoConfig,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            input_path: "data.csv".to_string(),
            delimiter: ';',
            has_headers: false,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            chunk_size: 3,
            skip_limit: 0,
            genre_on_missing: GenreOnMissing::Fail,
            clean_on_start: false,
            mongodb: MongoConfig::default(),
        }
    }
}

impl ImportConfig {
    /// Reads the JSON file at `path`.
    ///
    /// # Errors
    /// `BatchError::Io` if the file cannot be opened,
    /// `BatchError::Configuration` if it is not a valid settings document.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, BatchError> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    pub fn from_json(json: &str) -> Result<Self, BatchError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Applies the overrides found in the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Applies the overrides returned by `lookup`, which is asked once per
    /// variable name.
    pub fn apply_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(input_path) = lookup(INPUT_ENV) {
            self.input_path = input_path;
        }
        if let Some(uri) = lookup(MONGODB_URI_ENV) {
            self.mongodb.uri = uri;
        }
        if let Some(database) = lookup(MONGODB_DATABASE_ENV) {
            self.mongodb.database = database;
        }
        self
    }

    pub fn validate(&self) -> Result<(), BatchError> {
        if self.chunk_size == 0 {
            return Err(BatchError::Configuration(
                "chunk_size must be at least 1".to_string(),
            ));
        }

        if !self.delimiter.is_ascii() {
            return Err(BatchError::Configuration(format!(
                "delimiter {:?} is not a single byte",
                self.delimiter
            )));
        }

        if self.date_format.trim().is_empty()
            || StrftimeItems::new(&self.date_format).any(|item| matches!(item, Item::Error))
        {
            return Err(BatchError::Configuration(format!(
                "invalid date format {:?}",
                self.date_format
            )));
        }

        Ok(())
    }

    pub fn parser(&self) -> RecordParser {
        RecordParser::new(self.delimiter, &self.date_format)
    }

    pub fn delimiter_byte(&self) -> u8 {
        // validate() guarantees an ASCII delimiter
        self.delimiter as u8
    }
}
