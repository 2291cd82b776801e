use csv::{ReaderBuilder, StringRecord, StringRecordsIntoIter, Terminator, Trim};
use std::{cell::RefCell, fs::File, io::Read, path::Path};

use crate::{
    core::item::{ItemReader, ItemReaderResult},
    domain::parser::RawRecord,
    error::BatchError,
};

/// Maps the fields of one line to an item, like Spring's `FieldSetMapper`.
pub trait FieldSetMapper<T> {
    /// Builds an item from one split line.
    ///
    /// Errors should carry `record.line` so the bad line can be found in the
    /// source.
    fn map(&self, record: &RawRecord) -> Result<T, BatchError>;
}

/// Hands out the split line unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct RawRecordMapper;

impl FieldSetMapper<RawRecord> for RawRecordMapper {
    fn map(&self, record: &RawRecord) -> Result<RawRecord, BatchError> {
        Ok(record.clone())
    }
}

/// A delimited-file item reader.
///
/// Lines are read lazily, one per `read` call. Lines are allowed to have any
/// number of fields: checking the shape of a line is the mapper's job, so a
/// short line surfaces as a parse error naming the missing field rather than
/// a CSV error.
pub struct CsvItemReader<R, M> {
    /// Uses `RefCell` so we can iterate through records while keeping the
    /// `read` method signature compatible with the `ItemReader` trait.
    records: RefCell<StringRecordsIntoIter<R>>,
    mapper: M,
}

impl<R: Read, M> CsvItemReader<R, M> {
    fn next_record(&self) -> Option<Result<StringRecord, csv::Error>> {
        self.records.borrow_mut().next()
    }
}

impl<R, T, M> ItemReader<T> for CsvItemReader<R, M>
where
    R: Read,
    M: FieldSetMapper<T>,
{
    /// Reads the next line and maps it.
    ///
    /// A line that fails to map consumes that line: the next call moves on
    /// to the following one.
    ///
    /// # Returns
    /// - `Ok(Some(item))` if a line was read and mapped
    /// - `Ok(None)` if there are no more lines
    /// - `Err(BatchError::ItemReader(_))` if the line could not be read
    /// - any error returned by the mapper
    fn read(&self) -> ItemReaderResult<T> {
        match self.next_record() {
            Some(Ok(string_record)) => {
                let line = string_record
                    .position()
                    .map(|position| position.line())
                    .unwrap_or_default();
                let fields = string_record.iter().map(str::to_string).collect();

                self.mapper.map(&RawRecord::new(line, fields)).map(Some)
            }
            Some(Err(error)) => Err(BatchError::ItemReader(error.to_string())),
            None => Ok(None),
        }
    }
}

/// A builder for configuring delimited-file reading.
///
/// # Default Configuration
///
/// - Delimiter: semicolon (;)
/// - Terminator: CRLF (also accepts bare LF)
/// - Headers: disabled
/// - Trimming: All fields trimmed
pub struct CsvItemReaderBuilder {
    delimiter: u8,
    terminator: Terminator,
    has_headers: bool,
}

impl Default for CsvItemReaderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvItemReaderBuilder {
    /// Creates a builder with the default configuration listed above.
    pub fn new() -> Self {
        Self {
            delimiter: b';',
            terminator: Terminator::CRLF,
            has_headers: false,
        }
    }

    /// Sets the field separator byte. Defaults to `b';'`.
    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Sets the line terminator.
    ///
    /// The default `Terminator::CRLF` also ends a line on a bare `\n`, so it
    /// only needs changing for sources using another byte, such as
    /// `Terminator::Any(b'\r')`.
    pub fn terminator(mut self, terminator: Terminator) -> Self {
        self.terminator = terminator;
        self
    }

    /// When enabled, the first line is skipped.
    pub fn has_headers(mut self, yes: bool) -> Self {
        self.has_headers = yes;
        self
    }

    fn reader_builder(&self) -> ReaderBuilder {
        let mut builder = ReaderBuilder::new();
        builder
            .trim(Trim::All)
            .delimiter(self.delimiter)
            .terminator(self.terminator)
            .has_headers(self.has_headers)
            .flexible(true);
        builder
    }

    /// Creates a `CsvItemReader` from any source implementing `Read`.
    ///
    /// The source is read lazily, nothing is consumed before the first
    /// `read` call.
    ///
    /// # Examples
    ///
    /// ```
    /// use book_import_batch::core::item::ItemReader;
    /// use book_import_batch::domain::parser::RawRecord;
    /// use book_import_batch::error::BatchError;
    /// use book_import_batch::item::csv::csv_reader::{CsvItemReaderBuilder, FieldSetMapper};
    ///
    /// struct GenreName;
    ///
    /// impl FieldSetMapper<String> for GenreName {
    ///     fn map(&self, record: &RawRecord) -> Result<String, BatchError> {
    ///         record.fields.get(3).cloned().ok_or_else(|| BatchError::Parse {
    ///             line: record.line,
    ///             reason: "missing genre".to_string(),
    ///         })
    ///     }
    /// }
    ///
    /// let data = "title|date|authors|genre\nDune|1965-08-01|Frank Herbert|Science Fiction\n";
    /// let reader = CsvItemReaderBuilder::new()
    ///     .delimiter(b'|')
    ///     .has_headers(true)
    ///     .from_reader(data.as_bytes(), GenreName);
    ///
    /// let genre: Option<String> = reader.read().unwrap();
    /// assert_eq!(genre.as_deref(), Some("Science Fiction"));
    ///
    /// let end: Option<String> = reader.read().unwrap();
    /// assert!(end.is_none());
    /// ```
    pub fn from_reader<R: Read, M>(self, rdr: R, mapper: M) -> CsvItemReader<R, M> {
        let records = self.reader_builder().from_reader(rdr).into_records();

        CsvItemReader {
            records: RefCell::new(records),
            mapper,
        }
    }

    /// Creates a `CsvItemReader` reading the file at `path`.
    ///
    /// # Errors
    /// Returns `BatchError::ItemReader` if the file cannot be opened.
    pub fn from_path<P: AsRef<Path>, M>(
        self,
        path: P,
        mapper: M,
    ) -> Result<CsvItemReader<File, M>, BatchError> {
        let path = path.as_ref();
        let rdr = self.reader_builder().from_path(path).map_err(|error| {
            BatchError::ItemReader(format!("cannot open {}: {}", path.display(), error))
        })?;

        Ok(CsvItemReader {
            records: RefCell::new(rdr.into_records()),
            mapper,
        })
    }
}
