use std::cell::RefCell;

use chrono::{Local, NaiveDate};
use log::info;

use crate::{
    BatchError,
    config::ImportConfig,
    core::{
        job::{Job, JobBuilder, JobExecution, JobStatus},
        step::StepBuilder,
    },
    domain::{
        model::{Author, Book, Genre},
        parser::BookRecord,
    },
    import::{
        listener::{JobLogger, StageLogger},
        mapper::{AuthorsMapper, BookRecordMapper, GenreMapper},
        processor::{AuthorFilterProcessor, BookProcessor, GenreFilterProcessor},
        writer::{AuthorWriter, BookWriter, GenreWriter},
    },
    item::{
        csv::csv_reader::{CsvItemReader, CsvItemReaderBuilder},
        repository::{LibraryRepository, RepositoryCleaner},
    },
    tasklet::cleaner::CleanRepositoryTasklet,
};

pub const CLEAN_STEP: &str = "clean";
pub const AUTHORS_STEP: &str = "authors";
pub const GENRES_STEP: &str = "genres";
pub const BOOKS_STEP: &str = "books";

/// The catalogue import: authors, then genres, then books.
///
/// Each run opens the input file once per stage. Stages share nothing but
/// the store, so the books stage sees exactly what the first two stages
/// persisted.
pub struct BookImportJob<'a> {
    name: String,
    config: &'a ImportConfig,
    repository: &'a dyn LibraryRepository,
    cleaner: Option<&'a dyn RepositoryCleaner>,
    today: NaiveDate,
    status: RefCell<JobStatus>,
}

impl BookImportJob<'_> {
    pub fn get_name(&self) -> &str {
        &self.name
    }

    /// Status reached by the last run, `NotStarted` before the first one.
    pub fn get_status(&self) -> JobStatus {
        self.status.borrow().clone()
    }

    fn reader<M>(&self, mapper: M) -> Result<CsvItemReader<std::fs::File, M>, BatchError> {
        CsvItemReaderBuilder::new()
            .delimiter(self.config.delimiter_byte())
            .has_headers(self.config.has_headers)
            .from_path(&self.config.input_path, mapper)
    }
}

impl Job for BookImportJob<'_> {
    fn run(&self) -> Result<JobExecution, BatchError> {
        self.config.validate()?;

        let clean_tasklet = match (self.config.clean_on_start, self.cleaner) {
            (true, Some(cleaner)) => Some(CleanRepositoryTasklet::new(cleaner)),
            (true, None) => {
                return Err(BatchError::Configuration(
                    "clean_on_start is set but no cleaner was given".to_string(),
                ));
            }
            (false, _) => None,
        };

        info!(
            "Importing {} into {}",
            self.config.input_path, self.config.mongodb.database
        );

        let parser = self.config.parser();
        let chunk_size = self.config.chunk_size;
        let skip_limit = self.config.skip_limit;

        // Authors
        let authors_reader = self.reader(AuthorsMapper::new(parser.clone()))?;
        let authors_processor = AuthorFilterProcessor::new(self.repository);
        let authors_writer = AuthorWriter::new(self.repository);
        let authors_logger = StageLogger::new("authors");

        let authors_step = StepBuilder::new(AUTHORS_STEP)
            .chunk::<Vec<Author>, Vec<Author>>(chunk_size)
            .reader(&authors_reader)
            .processor(&authors_processor)
            .writer(&authors_writer)
            .skip_limit(skip_limit)
            .step_listener(&authors_processor)
            .step_listener(&authors_logger)
            .chunk_listener(&authors_logger)
            .read_listener(&authors_logger)
            .process_listener(&authors_logger)
            .write_listener(&authors_processor)
            .write_listener(&authors_logger)
            .build();

        // Genres
        let genres_reader = self.reader(GenreMapper::new(parser.clone()))?;
        let genres_processor = GenreFilterProcessor::new(self.repository);
        let genres_writer = GenreWriter::new(self.repository);
        let genres_logger = StageLogger::new("genres");

        let genres_step = StepBuilder::new(GENRES_STEP)
            .chunk::<Genre, Genre>(chunk_size)
            .reader(&genres_reader)
            .processor(&genres_processor)
            .writer(&genres_writer)
            .skip_limit(skip_limit)
            .step_listener(&genres_processor)
            .step_listener(&genres_logger)
            .chunk_listener(&genres_logger)
            .read_listener(&genres_logger)
            .process_listener(&genres_logger)
            .write_listener(&genres_processor)
            .write_listener(&genres_logger)
            .build();

        // Books
        let books_reader = self.reader(BookRecordMapper::new(parser))?;
        let books_processor =
            BookProcessor::new(self.repository, self.config.genre_on_missing, self.today);
        let books_writer = BookWriter::new(self.repository);
        let books_logger = StageLogger::new("books");

        let books_step = StepBuilder::new(BOOKS_STEP)
            .chunk::<BookRecord, Book>(chunk_size)
            .reader(&books_reader)
            .processor(&books_processor)
            .writer(&books_writer)
            .skip_limit(skip_limit)
            .step_listener(&books_logger)
            .chunk_listener(&books_logger)
            .read_listener(&books_logger)
            .process_listener(&books_logger)
            .write_listener(&books_logger)
            .build();

        let clean_step = clean_tasklet
            .as_ref()
            .map(|tasklet| StepBuilder::new(CLEAN_STEP).tasklet(tasklet).build());

        let job_logger = JobLogger;
        let mut builder = JobBuilder::new()
            .name(self.name.clone())
            .listener(&job_logger);

        if let Some(step) = &clean_step {
            builder = builder.start(step);
        }

        let job = builder
            .next(&authors_step)
            .next(&genres_step)
            .next(&books_step)
            .build();

        let result = job.run();
        *self.status.borrow_mut() = job.get_status();
        result
    }
}

/// Builder for the import job.
///
/// ```
/// use book_import_batch::config::ImportConfig;
/// use book_import_batch::core::job::{Job, JobStatus};
/// use book_import_batch::import::job::BookImportJobBuilder;
/// use book_import_batch::item::memory::InMemoryLibraryRepository;
///
/// let config = ImportConfig {
///     input_path: "/nonexistent/books.csv".to_string(),
///     ..ImportConfig::default()
/// };
/// let repository = InMemoryLibraryRepository::new();
///
/// let job = BookImportJobBuilder::new(&config)
///     .repository(&repository)
///     .build();
///
/// assert_eq!(job.get_status(), JobStatus::NotStarted);
/// assert!(job.run().is_err());
/// ```
pub struct BookImportJobBuilder<'a> {
    name: Option<String>,
    config: &'a ImportConfig,
    repository: Option<&'a dyn LibraryRepository>,
    cleaner: Option<&'a dyn RepositoryCleaner>,
    today: Option<NaiveDate>,
}

impl<'a> BookImportJobBuilder<'a> {
    pub fn new(config: &'a ImportConfig) -> Self {
        Self {
            name: None,
            config,
            repository: None,
            cleaner: None,
            today: None,
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn repository(mut self, repository: &'a dyn LibraryRepository) -> Self {
        self.repository = Some(repository);
        self
    }

    /// Needed only when `clean_on_start` is set.
    pub fn cleaner(mut self, cleaner: &'a dyn RepositoryCleaner) -> Self {
        self.cleaner = Some(cleaner);
        self
    }

    /// Reference date for book ages. Defaults to the local current date.
    pub fn today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn build(self) -> BookImportJob<'a> {
        BookImportJob {
            name: self.name.unwrap_or_else(|| "book-import".to_string()),
            config: self.config,
            repository: self
                .repository
                .expect("Repository is required for building the import job"),
            cleaner: self.cleaner,
            today: self.today.unwrap_or_else(|| Local::now().date_naive()),
            status: RefCell::new(JobStatus::NotStarted),
        }
    }
}
