use log::debug;
use mongodb::{
    bson::{doc, oid::ObjectId},
    sync::{Client, Collection, Database},
};

use crate::{
    BatchError,
    domain::model::{Author, Book, Comment, Genre},
    item::repository::{CommentRepository, LibraryRepository, RepositoryCleaner, RepositoryResult},
};

pub const AUTHOR_COLLECTION: &str = "author";
pub const GENRE_COLLECTION: &str = "genre";
pub const BOOK_COLLECTION: &str = "book";
pub const COMMENT_COLLECTION: &str = "comment";

/// Library store backed by the synchronous MongoDB driver.
///
/// Each entity lives in its own collection. Bulk saves use unordered
/// `insert_many`, identifiers are generated by the server.
///
/// ```no_run
/// use book_import_batch::item::mongodb::mongodb_repository::MongoLibraryRepository;
/// use book_import_batch::item::repository::LibraryRepository;
///
/// # fn main() -> Result<(), book_import_batch::BatchError> {
/// let repository = MongoLibraryRepository::connect("mongodb://127.0.0.1:27017/", "library")?;
/// let genre = repository.find_genre("Science Fiction")?;
/// # Ok(())
/// # }
/// ```
pub struct MongoLibraryRepository {
    authors: Collection<Author>,
    genres: Collection<Genre>,
    books: Collection<Book>,
    comments: Collection<Comment>,
}

impl MongoLibraryRepository {
    pub fn new(database: &Database) -> Self {
        Self {
            authors: database.collection(AUTHOR_COLLECTION),
            genres: database.collection(GENRE_COLLECTION),
            books: database.collection(BOOK_COLLECTION),
            comments: database.collection(COMMENT_COLLECTION),
        }
    }

    pub fn connect(uri: &str, database: &str) -> Result<Self, BatchError> {
        let client = Client::with_uri_str(uri)?;
        debug!("Connected to MongoDB, database: {}", database);
        Ok(Self::new(&client.database(database)))
    }
}

impl LibraryRepository for MongoLibraryRepository {
    fn find_author(&self, name: &str, surname: &str) -> RepositoryResult<Option<Author>> {
        let author = self
            .authors
            .find_one(doc! { "name": name, "surname": surname })
            .run()?;
        Ok(author)
    }

    fn find_genre(&self, name: &str) -> RepositoryResult<Option<Genre>> {
        let genre = self.genres.find_one(doc! { "name": name }).run()?;
        Ok(genre)
    }

    fn save_authors(&self, authors: &[Author]) -> RepositoryResult<()> {
        insert_all(&self.authors, authors)
    }

    fn save_genres(&self, genres: &[Genre]) -> RepositoryResult<()> {
        insert_all(&self.genres, genres)
    }

    fn save_books(&self, books: &[Book]) -> RepositoryResult<()> {
        insert_all(&self.books, books)
    }
}

impl CommentRepository for MongoLibraryRepository {
    fn find_comments_by_username(&self, username: &str) -> RepositoryResult<Vec<Comment>> {
        let cursor = self.comments.find(doc! { "username": username }).run()?;
        Ok(cursor.collect::<Result<Vec<_>, _>>()?)
    }

    fn find_comments_by_book(&self, book_id: &ObjectId) -> RepositoryResult<Vec<Comment>> {
        let cursor = self.comments.find(doc! { "book_id": *book_id }).run()?;
        Ok(cursor.collect::<Result<Vec<_>, _>>()?)
    }

    fn delete_comments_by_username(&self, username: &str) -> RepositoryResult<u64> {
        let result = self
            .comments
            .delete_many(doc! { "username": username })
            .run()?;
        Ok(result.deleted_count)
    }

    fn save_comments(&self, comments: &[Comment]) -> RepositoryResult<()> {
        insert_all(&self.comments, comments)
    }
}

impl RepositoryCleaner for MongoLibraryRepository {
    fn clear_all(&self) -> RepositoryResult<()> {
        let comments = self.comments.delete_many(doc! {}).run()?;
        let books = self.books.delete_many(doc! {}).run()?;
        let authors = self.authors.delete_many(doc! {}).run()?;
        let genres = self.genres.delete_many(doc! {}).run()?;

        debug!(
            "Deleted {} comments, {} books, {} authors, {} genres",
            comments.deleted_count, books.deleted_count, authors.deleted_count, genres.deleted_count
        );
        Ok(())
    }
}

fn insert_all<T>(collection: &Collection<T>, items: &[T]) -> RepositoryResult<()>
where
    T: serde::Serialize + Send + Sync,
{
    if items.is_empty() {
        return Ok(());
    }

    collection.insert_many(items).ordered(false).run()?;
    debug!("Inserted {} documents into {}", items.len(), collection.name());
    Ok(())
}
