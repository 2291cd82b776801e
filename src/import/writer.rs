use std::collections::HashSet;

use crate::{
    core::item::{ItemWriter, ItemWriterResult},
    domain::model::{Author, Book, Genre},
    item::repository::LibraryRepository,
};

/// Saves the authors of a whole chunk in one bulk insert.
pub struct AuthorWriter<'a> {
    repository: &'a dyn LibraryRepository,
}

impl<'a> AuthorWriter<'a> {
    pub fn new(repository: &'a dyn LibraryRepository) -> Self {
        Self { repository }
    }
}

impl ItemWriter<Vec<Author>> for AuthorWriter<'_> {
    fn write(&self, items: &[Vec<Author>]) -> ItemWriterResult {
        let mut keys = HashSet::new();
        let authors: Vec<Author> = items
            .iter()
            .flatten()
            .filter(|author| keys.insert(author.key()))
            .cloned()
            .collect();

        self.repository.save_authors(&authors)
    }
}

pub struct GenreWriter<'a> {
    repository: &'a dyn LibraryRepository,
}

impl<'a> GenreWriter<'a> {
    pub fn new(repository: &'a dyn LibraryRepository) -> Self {
        Self { repository }
    }
}

impl ItemWriter<Genre> for GenreWriter<'_> {
    fn write(&self, items: &[Genre]) -> ItemWriterResult {
        self.repository.save_genres(items)
    }
}

pub struct BookWriter<'a> {
    repository: &'a dyn LibraryRepository,
}

impl<'a> BookWriter<'a> {
    pub fn new(repository: &'a dyn LibraryRepository) -> Self {
        Self { repository }
    }
}

impl ItemWriter<Book> for BookWriter<'_> {
    fn write(&self, items: &[Book]) -> ItemWriterResult {
        self.repository.save_books(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{domain::model::Country, item::memory::InMemoryLibraryRepository};

    #[test]
    fn author_writer_flattens_the_chunk() {
        let repository = InMemoryLibraryRepository::new();
        let writer = AuthorWriter::new(&repository);
        let pratchett = Author::new("Terry", "Pratchett", Country::None);
        let gaiman = Author::new("Neil", "Gaiman", Country::None);

        writer
            .write(&[vec![pratchett.clone(), gaiman], vec![pratchett]])
            .unwrap();

        let names: Vec<String> = repository
            .authors()
            .iter()
            .map(|author| author.key().to_string())
            .collect();
        assert_eq!(names, vec!["Terry Pratchett", "Neil Gaiman"]);
    }
}
