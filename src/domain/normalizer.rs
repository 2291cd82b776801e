use std::collections::HashSet;

use super::{
    model::{Author, Country, Genre},
    parser::AuthorName,
};

/// The catalogue has no country column.
pub fn normalize_author(author: &AuthorName) -> Author {
    Author::new(&author.name, &author.surname, Country::None)
}

/// Normalizes a line's authors, keeping the first occurrence of each identity.
pub fn normalize_authors(authors: &[AuthorName]) -> Vec<Author> {
    let mut seen = HashSet::with_capacity(authors.len());

    authors
        .iter()
        .map(normalize_author)
        .filter(|author| seen.insert(author.key()))
        .collect()
}

pub fn normalize_genre(genre: &str) -> Genre {
    Genre::new(genre.trim())
}
