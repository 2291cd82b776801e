use chrono::NaiveDate;
use log::{debug, info};

use crate::{
    BatchError,
    config::GenreOnMissing,
    core::{
        item::{ItemProcessor, ItemProcessorResult},
        listener::{ItemWriteListener, ListenerResult, StepListener},
        step::StepExecution,
    },
    domain::{
        model::{Author, AuthorKey, Book, Genre},
        normalizer::{normalize_authors, normalize_genre},
        parser::BookRecord,
    },
    import::dedup::DedupFilter,
    item::repository::LibraryRepository,
};

/// Keeps the authors of a line that are neither stored nor already admitted
/// in this run. A line left with no author is filtered out.
pub struct AuthorFilterProcessor<'a> {
    repository: &'a dyn LibraryRepository,
    filter: DedupFilter<AuthorKey>,
}

impl<'a> AuthorFilterProcessor<'a> {
    pub fn new(repository: &'a dyn LibraryRepository) -> Self {
        Self {
            repository,
            filter: DedupFilter::new("author"),
        }
    }

    pub fn filter(&self) -> &DedupFilter<AuthorKey> {
        &self.filter
    }

    fn release(&self, authors: &[Author]) {
        for author in authors {
            self.filter.release(&author.key());
        }
    }
}

impl ItemProcessor<Vec<Author>, Vec<Author>> for AuthorFilterProcessor<'_> {
    fn process(&self, authors: &Vec<Author>) -> ItemProcessorResult<Vec<Author>> {
        let mut admitted = Vec::with_capacity(authors.len());

        for author in authors {
            let is_new = self.filter.admit(author.key(), |key| {
                Ok(self
                    .repository
                    .find_author(&key.name, &key.surname)?
                    .is_some())
            });

            match is_new {
                Ok(true) => admitted.push(author.clone()),
                Ok(false) => {}
                Err(error) => {
                    // the line is dropped as a whole, its authors must stay admissible
                    self.release(&admitted);
                    return Err(error);
                }
            }
        }

        if admitted.is_empty() {
            Ok(None)
        } else {
            Ok(Some(admitted))
        }
    }
}

impl StepListener for AuthorFilterProcessor<'_> {
    fn before_step(&self, step_execution: &StepExecution) -> ListenerResult {
        self.filter.before_step(step_execution)
    }

    fn after_step(&self, step_execution: &StepExecution) -> ListenerResult {
        self.filter.after_step(step_execution)
    }
}

/// Authors of a chunk that failed to be written are not stored, so they are
/// taken back out of the seen set.
impl ItemWriteListener<Vec<Author>> for AuthorFilterProcessor<'_> {
    fn on_write_error(&self, _error: &BatchError, items: &[Vec<Author>]) -> ListenerResult {
        items.iter().for_each(|authors| self.release(authors));
        Ok(())
    }
}

/// Emits a genre only the first time it is met in a run, and only when the
/// store does not know it. Rejected genres are filtered, not errors.
pub struct GenreFilterProcessor<'a> {
    repository: &'a dyn LibraryRepository,
    filter: DedupFilter<String>,
}

impl<'a> GenreFilterProcessor<'a> {
    pub fn new(repository: &'a dyn LibraryRepository) -> Self {
        Self {
            repository,
            filter: DedupFilter::new("genre"),
        }
    }

    pub fn filter(&self) -> &DedupFilter<String> {
        &self.filter
    }
}

impl ItemProcessor<Genre, Genre> for GenreFilterProcessor<'_> {
    fn process(&self, genre: &Genre) -> ItemProcessorResult<Genre> {
        let is_new = self.filter.admit(genre.key(), |name| {
            Ok(self.repository.find_genre(name)?.is_some())
        })?;

        Ok(is_new.then(|| genre.clone()))
    }
}

impl StepListener for GenreFilterProcessor<'_> {
    fn before_step(&self, step_execution: &StepExecution) -> ListenerResult {
        self.filter.before_step(step_execution)
    }

    fn after_step(&self, step_execution: &StepExecution) -> ListenerResult {
        self.filter.after_step(step_execution)
    }
}

impl ItemWriteListener<Genre> for GenreFilterProcessor<'_> {
    fn on_write_error(&self, _error: &BatchError, items: &[Genre]) -> ListenerResult {
        for genre in items {
            self.filter.release(&genre.key());
        }
        Ok(())
    }
}

/// Builds the stored book: resolves its genre and authors against the
/// store and computes its age.
pub struct BookProcessor<'a> {
    repository: &'a dyn LibraryRepository,
    genre_on_missing: GenreOnMissing,
    today: NaiveDate,
}

impl<'a> BookProcessor<'a> {
    pub fn new(
        repository: &'a dyn LibraryRepository,
        genre_on_missing: GenreOnMissing,
        today: NaiveDate,
    ) -> Self {
        Self {
            repository,
            genre_on_missing,
            today,
        }
    }

    fn resolve_genre(&self, name: &str) -> Result<Genre, BatchError> {
        if let Some(genre) = self.repository.find_genre(name)? {
            return Ok(genre);
        }

        if self.genre_on_missing == GenreOnMissing::Save {
            info!("Genre {} missing from store, saving it", name);
            self.repository.save_genres(&[normalize_genre(name)])?;
            if let Some(genre) = self.repository.find_genre(name)? {
                return Ok(genre);
            }
        }

        Err(BatchError::MissingReference {
            kind: "genre",
            key: name.to_string(),
        })
    }

    fn resolve_author(&self, author: &Author) -> Result<Author, BatchError> {
        self.repository
            .find_author(&author.name, &author.surname)?
            .ok_or_else(|| BatchError::MissingReference {
                kind: "author",
                key: author.key().to_string(),
            })
    }
}

impl ItemProcessor<BookRecord, Book> for BookProcessor<'_> {
    fn process(&self, record: &BookRecord) -> ItemProcessorResult<Book> {
        let authors = normalize_authors(&record.authors)
            .iter()
            .map(|author| self.resolve_author(author))
            .collect::<Result<Vec<_>, _>>()?;

        // authors first: a genre saved on the fly must belong to a stored book
        let genre = self.resolve_genre(&record.genre)?;

        let mut book = Book::new(&record.title, record.published_date, authors, genre);
        book.calculate_age(self.today);

        debug!("Book {} resolved, age {}", book.title, book.age);
        Ok(Some(book))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{model::Country, parser::RecordParser},
        item::{memory::InMemoryLibraryRepository, repository::RepositoryResult},
    };

    fn author(name: &str, surname: &str) -> Author {
        Author::new(name, surname, Country::None)
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    #[test]
    fn author_filter_drops_stored_and_repeated_authors() {
        let repository = InMemoryLibraryRepository::new();
        repository.save_authors(&[author("Frank", "Herbert")]).unwrap();
        let processor = AuthorFilterProcessor::new(&repository);

        let first = processor
            .process(&vec![author("Frank", "Herbert"), author("Jane", "Austen")])
            .unwrap();
        let second = processor.process(&vec![author("Jane", "Austen")]).unwrap();

        assert_eq!(first, Some(vec![author("Jane", "Austen")]));
        assert_eq!(second, None);
        assert_eq!(processor.filter().seen_count(), 1);
    }

    #[test]
    fn stored_genre_is_rejected_without_growing_the_seen_set() {
        let repository = InMemoryLibraryRepository::new();
        repository.save_genres(&[Genre::new("Fantasy")]).unwrap();
        let processor = GenreFilterProcessor::new(&repository);

        assert_eq!(processor.process(&Genre::new("Fantasy")).unwrap(), None);
        assert_eq!(processor.filter().seen_count(), 0);

        assert_eq!(
            processor.process(&Genre::new("Romance")).unwrap(),
            Some(Genre::new("Romance"))
        );
        assert_eq!(processor.process(&Genre::new("Romance")).unwrap(), None);
        assert_eq!(processor.filter().seen_count(), 1);
    }

    #[test]
    fn book_is_built_from_stored_references() {
        let repository = InMemoryLibraryRepository::new();
        repository.save_authors(&[author("Frank", "Herbert")]).unwrap();
        repository.save_genres(&[Genre::new("Science Fiction")]).unwrap();
        let processor = BookProcessor::new(&repository, GenreOnMissing::Fail, today());
        let record = RecordParser::default()
            .parse_line(1, "Dune;1965-08-01;Frank Herbert;Science Fiction")
            .unwrap();

        let book = processor.process(&record).unwrap().unwrap();

        assert_eq!(book.title, "Dune");
        assert_eq!(book.age, 60);
        assert!(book.genre.id.is_some());
        assert_eq!(book.authors.len(), 1);
        assert!(book.authors[0].id.is_some());
    }

    #[test]
    fn missing_genre_fails_by_default() {
        let repository = InMemoryLibraryRepository::new();
        repository.save_authors(&[author("Frank", "Herbert")]).unwrap();
        let processor = BookProcessor::new(&repository, GenreOnMissing::Fail, today());
        let record = RecordParser::default()
            .parse_line(1, "Dune;1965-08-01;Frank Herbert;Science Fiction")
            .unwrap();

        let result = processor.process(&record);

        assert!(matches!(
            result,
            Err(BatchError::MissingReference { kind: "genre", .. })
        ));
    }

    #[test]
    fn missing_genre_is_saved_when_configured() {
        let repository = InMemoryLibraryRepository::new();
        repository.save_authors(&[author("Frank", "Herbert")]).unwrap();
        let processor = BookProcessor::new(&repository, GenreOnMissing::Save, today());
        let record = RecordParser::default()
            .parse_line(1, "Dune;1965-08-01;Frank Herbert;Science Fiction")
            .unwrap();

        let book = processor.process(&record).unwrap().unwrap();

        assert_eq!(book.genre.name, "Science Fiction");
        assert_eq!(repository.genres().len(), 1);
    }

    #[test]
    fn missing_author_fails() {
        let repository = InMemoryLibraryRepository::new();
        repository.save_genres(&[Genre::new("Science Fiction")]).unwrap();
        let processor = BookProcessor::new(&repository, GenreOnMissing::Save, today());
        let record = RecordParser::default()
            .parse_line(1, "Dune;1965-08-01;Frank Herbert;Science Fiction")
            .unwrap();

        match processor.process(&record) {
            Err(BatchError::MissingReference { kind, key }) => {
                assert_eq!(kind, "author");
                assert_eq!(key, "Frank Herbert");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn missing_author_saves_no_genre() {
        let repository = InMemoryLibraryRepository::new();
        let processor = BookProcessor::new(&repository, GenreOnMissing::Save, today());
        let record = RecordParser::default()
            .parse_line(1, "Dune;1965-08-01;Frank Herbert;Science Fiction")
            .unwrap();

        assert!(processor.process(&record).is_err());
        assert!(repository.genres().is_empty());
    }

    /// Store whose author lookups fail for one surname.
    struct FailingLookup {
        inner: InMemoryLibraryRepository,
        surname: &'static str,
    }

    impl LibraryRepository for FailingLookup {
        fn find_author(
            &self,
            name: &str,
            surname: &str,
        ) -> RepositoryResult<Option<Author>> {
            if surname == self.surname {
                return Err(BatchError::Store("lookup timed out".to_string()));
            }
            self.inner.find_author(name, surname)
        }

        fn find_genre(&self, name: &str) -> RepositoryResult<Option<Genre>> {
            self.inner.find_genre(name)
        }

        fn save_authors(&self, authors: &[Author]) -> RepositoryResult<()> {
            self.inner.save_authors(authors)
        }

        fn save_genres(&self, genres: &[Genre]) -> RepositoryResult<()> {
            self.inner.save_genres(genres)
        }

        fn save_books(&self, books: &[Book]) -> RepositoryResult<()> {
            self.inner.save_books(books)
        }
    }

    #[test]
    fn failed_lookup_releases_authors_admitted_on_the_same_line() {
        let repository = FailingLookup {
            inner: InMemoryLibraryRepository::new(),
            surname: "Gaiman",
        };
        let processor = AuthorFilterProcessor::new(&repository);

        let result =
            processor.process(&vec![author("Terry", "Pratchett"), author("Neil", "Gaiman")]);

        assert!(matches!(result, Err(BatchError::Store(_))));
        assert_eq!(processor.filter().seen_count(), 0);
        assert_eq!(
            processor.process(&vec![author("Terry", "Pratchett")]).unwrap(),
            Some(vec![author("Terry", "Pratchett")])
        );
    }

    #[test]
    fn write_error_releases_the_chunk() {
        let repository = InMemoryLibraryRepository::new();
        let authors = AuthorFilterProcessor::new(&repository);
        let genres = GenreFilterProcessor::new(&repository);
        let error = BatchError::Store("write concern".to_string());

        let line = authors.process(&vec![author("Frank", "Herbert")]).unwrap().unwrap();
        let genre = genres.process(&Genre::new("Fantasy")).unwrap().unwrap();
        authors.on_write_error(&error, &[line]).unwrap();
        genres.on_write_error(&error, &[genre]).unwrap();

        assert_eq!(authors.filter().seen_count(), 0);
        assert_eq!(genres.filter().seen_count(), 0);
        assert!(authors.process(&vec![author("Frank", "Herbert")]).unwrap().is_some());
        assert!(genres.process(&Genre::new("Fantasy")).unwrap().is_some());
    }
}
