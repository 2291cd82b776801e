#![allow(dead_code)]

mod mocks;

pub use mocks::MockLibraryRepository;

use std::io::Write;

use book_import_batch::config::ImportConfig;
use chrono::NaiveDate;
use tempfile::NamedTempFile;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Writes `content` to a temporary catalogue file.
pub fn csv_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("cannot create temporary file");
    file.write_all(content.as_bytes())
        .expect("cannot write temporary file");
    file
}

pub fn config_for(file: &NamedTempFile) -> ImportConfig {
    ImportConfig {
        input_path: file.path().to_string_lossy().into_owned(),
        ..ImportConfig::default()
    }
}

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
}
