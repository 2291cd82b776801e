use std::sync::{Mutex, MutexGuard, PoisonError};

use mongodb::bson::oid::ObjectId;

use crate::{
    domain::model::{Author, Book, Comment, Genre},
    item::repository::{CommentRepository, LibraryRepository, RepositoryCleaner, RepositoryResult},
};

/// Library store kept in process memory.
///
/// Behaves like the MongoDB store: saves are inserts that assign a fresh
/// `ObjectId` to documents without one, lookups are exact matches.
#[derive(Debug, Default)]
pub struct InMemoryLibraryRepository {
    authors: Mutex<Vec<Author>>,
    genres: Mutex<Vec<Genre>>,
    books: Mutex<Vec<Book>>,
    comments: Mutex<Vec<Comment>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn with_id(id: Option<ObjectId>) -> Option<ObjectId> {
    id.or_else(|| Some(ObjectId::new()))
}

impl InMemoryLibraryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn authors(&self) -> Vec<Author> {
        lock(&self.authors).clone()
    }

    pub fn genres(&self) -> Vec<Genre> {
        lock(&self.genres).clone()
    }

    pub fn books(&self) -> Vec<Book> {
        lock(&self.books).clone()
    }

    pub fn comments(&self) -> Vec<Comment> {
        lock(&self.comments).clone()
    }
}

impl LibraryRepository for InMemoryLibraryRepository {
    fn find_author(&self, name: &str, surname: &str) -> RepositoryResult<Option<Author>> {
        Ok(lock(&self.authors)
            .iter()
            .find(|author| author.name == name && author.surname == surname)
            .cloned())
    }

    fn find_genre(&self, name: &str) -> RepositoryResult<Option<Genre>> {
        Ok(lock(&self.genres)
            .iter()
            .find(|genre| genre.name == name)
            .cloned())
    }

    fn save_authors(&self, authors: &[Author]) -> RepositoryResult<()> {
        lock(&self.authors).extend(authors.iter().cloned().map(|mut author| {
            author.id = with_id(author.id);
            author
        }));
        Ok(())
    }

    fn save_genres(&self, genres: &[Genre]) -> RepositoryResult<()> {
        lock(&self.genres).extend(genres.iter().cloned().map(|mut genre| {
            genre.id = with_id(genre.id);
            genre
        }));
        Ok(())
    }

    fn save_books(&self, books: &[Book]) -> RepositoryResult<()> {
        lock(&self.books).extend(books.iter().cloned().map(|mut book| {
            book.id = with_id(book.id);
            book
        }));
        Ok(())
    }
}

impl CommentRepository for InMemoryLibraryRepository {
    fn find_comments_by_username(&self, username: &str) -> RepositoryResult<Vec<Comment>> {
        Ok(lock(&self.comments)
            .iter()
            .filter(|comment| comment.username == username)
            .cloned()
            .collect())
    }

    fn find_comments_by_book(&self, book_id: &ObjectId) -> RepositoryResult<Vec<Comment>> {
        Ok(lock(&self.comments)
            .iter()
            .filter(|comment| &comment.book_id == book_id)
            .cloned()
            .collect())
    }

    fn delete_comments_by_username(&self, username: &str) -> RepositoryResult<u64> {
        let mut comments = lock(&self.comments);
        let before = comments.len();
        comments.retain(|comment| comment.username != username);
        Ok((before - comments.len()) as u64)
    }

    fn save_comments(&self, comments: &[Comment]) -> RepositoryResult<()> {
        lock(&self.comments).extend(comments.iter().cloned().map(|mut comment| {
            comment.id = with_id(comment.id);
            comment
        }));
        Ok(())
    }
}

impl RepositoryCleaner for InMemoryLibraryRepository {
    fn clear_all(&self) -> RepositoryResult<()> {
        lock(&self.comments).clear();
        lock(&self.books).clear();
        lock(&self.authors).clear();
        lock(&self.genres).clear();
        Ok(())
    }
}
