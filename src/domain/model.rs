use std::fmt;

use chrono::{Datelike, NaiveDate};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Country {
    /// The catalogue carries no country, every imported author gets this one.
    #[default]
    None,
    Russia,
    Usa,
    England,
    France,
    Germany,
}

/// Identity of an author: exact, case-sensitive (name, surname).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AuthorKey {
    pub name: String,
    pub surname: String,
}

impl fmt::Display for AuthorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.surname)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub surname: String,
    #[serde(default)]
    pub country: Country,
}

impl Author {
    pub fn new(name: &str, surname: &str, country: Country) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            surname: surname.to_string(),
            country,
        }
    }

    pub fn key(&self) -> AuthorKey {
        AuthorKey {
            name: self.name.clone(),
            surname: self.surname.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
}

impl Genre {
    pub fn new(name: &str) -> Self {
        Self {
            id: None,
            name: name.to_string(),
        }
    }

    /// Genres are identified by their exact name.
    pub fn key(&self) -> String {
        self.name.clone()
    }
}

/// A book as stored: authors and genre are embedded with their store ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: String,
    pub published_date: NaiveDate,
    pub age: i32,
    pub authors: Vec<Author>,
    pub genre: Genre,
}

impl Book {
    pub fn new(title: &str, published_date: NaiveDate, authors: Vec<Author>, genre: Genre) -> Self {
        Self {
            id: None,
            title: title.to_string(),
            published_date,
            age: 0,
            authors,
            genre,
        }
    }

    /// Sets `age` to the number of calendar years between publication and `today`.
    pub fn calculate_age(&mut self, today: NaiveDate) {
        self.age = today.year() - self.published_date.year();
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub username: String,
    pub text: String,
    pub book_id: ObjectId,
}

impl Comment {
    pub fn new(username: &str, text: &str, book_id: ObjectId) -> Self {
        Self {
            id: None,
            username: username.to_string(),
            text: text.to_string(),
            book_id,
        }
    }
}
