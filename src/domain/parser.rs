//! Turns delimited catalogue lines into typed records.
//!
//! Lines have a fixed field order `name;publishedDate;authors;genre`. The
//! authors field is a comma separated list of `Name Surname` pairs.

use chrono::NaiveDate;

use crate::BatchError;

/// Column names, in file order.
pub const FIELD_NAMES: [&str; 4] = ["name", "publishedDate", "authors", "genre"];

pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

const TITLE: usize = 0;
const PUBLISHED_DATE: usize = 1;
const AUTHORS: usize = 2;
const GENRE: usize = 3;

/// One line of the input file, already split into fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    /// 1-based line number in the source, used in error messages
    pub line: u64,
    pub fields: Vec<String>,
}

impl RawRecord {
    pub fn new(line: u64, fields: Vec<String>) -> Self {
        Self { line, fields }
    }
}

/// An author as written in the file, split into its two words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorName {
    pub name: String,
    pub surname: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookRecord {
    pub title: String,
    pub published_date: NaiveDate,
    pub authors: Vec<AuthorName>,
    pub genre: String,
}

#[derive(Debug, Clone)]
pub struct RecordParser {
    delimiter: char,
    date_format: String,
}

impl Default for RecordParser {
    fn default() -> Self {
        Self::new(';', DEFAULT_DATE_FORMAT)
    }
}

impl RecordParser {
    pub fn new(delimiter: char, date_format: &str) -> Self {
        Self {
            delimiter,
            date_format: date_format.to_string(),
        }
    }

    /// Splits `text` on the delimiter and parses the full record.
    pub fn parse_line(&self, line: u64, text: &str) -> Result<BookRecord, BatchError> {
        let fields = text
            .split(self.delimiter)
            .map(|field| field.trim().to_string())
            .collect();
        self.parse(&RawRecord::new(line, fields))
    }

    pub fn parse(&self, record: &RawRecord) -> Result<BookRecord, BatchError> {
        Ok(BookRecord {
            title: self.title(record)?,
            published_date: self.published_date(record)?,
            authors: self.authors(record)?,
            genre: self.genre(record)?,
        })
    }

    pub fn title(&self, record: &RawRecord) -> Result<String, BatchError> {
        self.field(record, TITLE).map(str::to_string)
    }

    pub fn published_date(&self, record: &RawRecord) -> Result<NaiveDate, BatchError> {
        let value = self.field(record, PUBLISHED_DATE)?;

        NaiveDate::parse_from_str(value, &self.date_format).map_err(|error| BatchError::Parse {
            line: record.line,
            reason: format!(
                "date {:?} does not match format {:?}: {}",
                value, self.date_format, error
            ),
        })
    }

    pub fn authors(&self, record: &RawRecord) -> Result<Vec<AuthorName>, BatchError> {
        parse_author_list(self.field(record, AUTHORS)?)
    }

    pub fn genre(&self, record: &RawRecord) -> Result<String, BatchError> {
        self.field(record, GENRE).map(str::to_string)
    }

    fn field<'r>(&self, record: &'r RawRecord, index: usize) -> Result<&'r str, BatchError> {
        if record.fields.len() > FIELD_NAMES.len() {
            return Err(BatchError::Parse {
                line: record.line,
                reason: format!(
                    "expected {} fields, found {}",
                    FIELD_NAMES.len(),
                    record.fields.len()
                ),
            });
        }

        match record.fields.get(index).map(|field| field.trim()) {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(BatchError::Parse {
                line: record.line,
                reason: format!("missing field {}", FIELD_NAMES[index]),
            }),
        }
    }
}

/// Parses `"John Smith, Jane Doe"` into author names.
///
/// Each comma separated token must hold exactly two words; the split happens
/// on the first whitespace run.
pub fn parse_author_list(field: &str) -> Result<Vec<AuthorName>, BatchError> {
    field.split(',').map(parse_author).collect()
}

fn parse_author(token: &str) -> Result<AuthorName, BatchError> {
    let words: Vec<&str> = token.split_whitespace().collect();

    match words.as_slice() {
        [name, surname] => Ok(AuthorName {
            name: name.to_string(),
            surname: surname.to_string(),
        }),
        _ => Err(BatchError::MalformedAuthor(token.trim().to_string())),
    }
}
