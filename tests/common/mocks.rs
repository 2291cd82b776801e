//! Mock version of the library store.
use mockall::mock;

use book_import_batch::{
    domain::model::{Author, Book, Genre},
    item::repository::{LibraryRepository, RepositoryResult},
};

mock! {
    pub LibraryRepository {}
    impl LibraryRepository for LibraryRepository {
        fn find_author(&self, name: &str, surname: &str) -> RepositoryResult<Option<Author>>;
        fn find_genre(&self, name: &str) -> RepositoryResult<Option<Genre>>;
        fn save_authors(&self, authors: &[Author]) -> RepositoryResult<()>;
        fn save_genres(&self, genres: &[Genre]) -> RepositoryResult<()>;
        fn save_books(&self, books: &[Book]) -> RepositoryResult<()>;
    }
}
