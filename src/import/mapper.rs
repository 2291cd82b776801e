//! Field-set mappers giving each stage its view of a catalogue line.

use crate::{
    BatchError,
    domain::{
        model::{Author, Genre},
        normalizer::{normalize_authors, normalize_genre},
        parser::{BookRecord, RawRecord, RecordParser},
    },
    item::csv::csv_reader::FieldSetMapper,
};

/// Authors stage: only the authors column is looked at.
#[derive(Debug, Clone)]
pub struct AuthorsMapper {
    parser: RecordParser,
}

impl AuthorsMapper {
    pub fn new(parser: RecordParser) -> Self {
        Self { parser }
    }
}

impl FieldSetMapper<Vec<Author>> for AuthorsMapper {
    fn map(&self, record: &RawRecord) -> Result<Vec<Author>, BatchError> {
        Ok(normalize_authors(&self.parser.authors(record)?))
    }
}

/// Genres stage: only the genre column is looked at.
#[derive(Debug, Clone)]
pub struct GenreMapper {
    parser: RecordParser,
}

impl GenreMapper {
    pub fn new(parser: RecordParser) -> Self {
        Self { parser }
    }
}

impl FieldSetMapper<Genre> for GenreMapper {
    fn map(&self, record: &RawRecord) -> Result<Genre, BatchError> {
        Ok(normalize_genre(&self.parser.genre(record)?))
    }
}

/// Books stage: the whole line must be valid.
#[derive(Debug, Clone)]
pub struct BookRecordMapper {
    parser: RecordParser,
}

impl BookRecordMapper {
    pub fn new(parser: RecordParser) -> Self {
        Self { parser }
    }
}

impl FieldSetMapper<BookRecord> for BookRecordMapper {
    fn map(&self, record: &RawRecord) -> Result<BookRecord, BatchError> {
        self.parser.parse(record)
    }
}
