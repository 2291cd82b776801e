//! Data-access contracts of the import.
//!
//! `LibraryRepository` declares exactly what the job needs: lookups by
//! identity and bulk inserts. Lookup misses are `Ok(None)`; every store
//! failure is a `BatchError::Store`. There are no update operations.

use mongodb::bson::oid::ObjectId;

use crate::{
    BatchError,
    domain::model::{Author, Book, Comment, Genre},
};

pub type RepositoryResult<T> = Result<T, BatchError>;

pub trait LibraryRepository {
    fn find_author(&self, name: &str, surname: &str) -> RepositoryResult<Option<Author>>;

    fn find_genre(&self, name: &str) -> RepositoryResult<Option<Genre>>;

    fn save_authors(&self, authors: &[Author]) -> RepositoryResult<()>;

    fn save_genres(&self, genres: &[Genre]) -> RepositoryResult<()>;

    fn save_books(&self, books: &[Book]) -> RepositoryResult<()>;
}

/// Comments are never written by the import; they are read and pruned by
/// the rest of the application.
pub trait CommentRepository {
    fn find_comments_by_username(&self, username: &str) -> RepositoryResult<Vec<Comment>>;

    fn find_comments_by_book(&self, book_id: &ObjectId) -> RepositoryResult<Vec<Comment>>;

    fn delete_comments_by_username(&self, username: &str) -> RepositoryResult<u64>;

    fn save_comments(&self, comments: &[Comment]) -> RepositoryResult<()>;
}

/// Wipes every collection the application owns.
pub trait RepositoryCleaner {
    /// Deletes comments, books, authors and genres, in that order.
    fn clear_all(&self) -> RepositoryResult<()>;
}
