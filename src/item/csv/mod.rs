/// Delimited catalogue reading.
///
/// `CsvItemReader` splits each line of a delimited source into a
/// [`RawRecord`](crate::domain::parser::RawRecord) and hands it to a
/// [`FieldSetMapper`](csv_reader::FieldSetMapper), which turns it into the
/// item type of the step. Several steps can read the same file, each with its
/// own mapper, by building one reader per step.
///
/// ```
/// use book_import_batch::core::item::ItemReader;
/// use book_import_batch::domain::parser::RawRecord;
/// use book_import_batch::item::csv::csv_reader::{CsvItemReaderBuilder, RawRecordMapper};
///
/// let data = "Dune;1965-08-01;Frank Herbert;Science Fiction
/// Emma;1815-12-23;Jane Austen;Romance";
///
/// let reader = CsvItemReaderBuilder::new()
///     .delimiter(b';')
///     .from_reader(data.as_bytes(), RawRecordMapper);
///
/// let first: RawRecord = reader.read().unwrap().unwrap();
/// assert_eq!(first.line, 1);
/// assert_eq!(first.fields[0], "Dune");
///
/// let second: RawRecord = reader.read().unwrap().unwrap();
/// assert_eq!(second.fields[3], "Romance");
///
/// assert!(reader.read().unwrap().is_none());
/// ```
pub mod csv_reader;
