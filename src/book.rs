//! The [`Book`] record, its validation rules and the [`Statistics`] projection over a
//! collection of books.
use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::{BookError, Result};

/// max length (in characters) of a book title
pub const MAX_TITLE_LEN: usize = 200;
/// max length (in characters) of an author name
pub const MAX_AUTHOR_LEN: usize = 100;
/// max length (in characters) of an isbn
pub const MAX_ISBN_LEN: usize = 20;
/// the oldest publication year accepted
pub const MIN_YEAR: i32 = 1000;
/// the newest publication year accepted
pub const MAX_YEAR: i32 = 2024;
/// an isbn must contain (case-insensitive) one of these markers
pub const ISBN_MARKERS: [&str; 3] = ["isbn", "978", "979"];

/// A book that has been stored and assigned an `id` by a [`BookEngine`].
///
/// Field order matches the column order of the backing CSV file.
///
/// [`BookEngine`]: ./engine/trait.BookEngine.html
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// store assigned, unique id
    pub id: u64,
    /// the book's title
    pub title: String,
    /// the book's author
    pub author: String,
    /// year of publication
    pub year: i32,
    /// isbn, loosely checked
    pub isbn: String,
}

impl Book {
    /// builds a stored book out of a candidate and its assigned `id`
    pub fn from_new(id: u64, book: NewBook) -> Self {
        Book {
            id,
            title: book.title,
            author: book.author,
            year: book.year,
            isbn: book.isbn,
        }
    }

    /// replaces every field except `id` with the fields of `book`
    pub fn replace_with(&mut self, book: NewBook) {
        self.title = book.title;
        self.author = book.author;
        self.year = book.year;
        self.isbn = book.isbn;
    }
}

/// A candidate book, as supplied by a caller on create or update. It never carries an id,
/// any `id` field in incoming JSON is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBook {
    /// the book's title
    pub title: String,
    /// the book's author
    pub author: String,
    /// year of publication
    pub year: i32,
    /// isbn, must contain one of the [`ISBN_MARKERS`]
    pub isbn: String,
}

impl NewBook {
    /// convenience constructor
    pub fn new(title: impl Into<String>, author: impl Into<String>, year: i32, isbn: impl Into<String>) -> Self {
        NewBook {
            title: title.into(),
            author: author.into(),
            year,
            isbn: isbn.into(),
        }
    }

    /// checks this candidate against the field rules, in the order title, author, year, isbn.
    ///
    /// # Errors
    /// returns [`BookError::InvalidRecord`] naming the first field that failed
    pub fn validate(&self) -> Result<()> {
        check_text("title", &self.title, MAX_TITLE_LEN)?;
        check_text("author", &self.author, MAX_AUTHOR_LEN)?;

        if !(MIN_YEAR..=MAX_YEAR).contains(&self.year) {
            return Err(BookError::invalid(
                "year",
                format!("must be between {} and {}, got {}", MIN_YEAR, MAX_YEAR, self.year),
            ));
        }

        check_text("isbn", &self.isbn, MAX_ISBN_LEN)?;
        let isbn = self.isbn.to_lowercase();
        if !ISBN_MARKERS.iter().any(|marker| isbn.contains(marker)) {
            return Err(BookError::invalid(
                "isbn",
                format!("must contain one of {:?}", ISBN_MARKERS),
            ));
        }
        Ok(())
    }
}

impl From<Book> for NewBook {
    fn from(book: Book) -> Self {
        NewBook {
            title: book.title,
            author: book.author,
            year: book.year,
            isbn: book.isbn,
        }
    }
}

fn check_text(field: &'static str, value: &str, max_len: usize) -> Result<()> {
    if value.trim().is_empty() {
        return Err(BookError::invalid(field, "must not be empty"));
    }
    let len = value.chars().count();
    if len > max_len {
        return Err(BookError::invalid(
            field,
            format!("must be at most {} characters, got {}", max_len, len),
        ));
    }
    Ok(())
}

/// rounds `value` to one decimal place. Rounding is done on the exact decimal expansion of
/// `value` with ties going to the even digit, so 1957.25 gives 1957.2 while 1957.35 (stored as
/// 1957.3499..) gives 1957.3.
fn round_to_tenth(value: f64) -> f64 {
    format!("{:.1}", value).parse().unwrap_or(value)
}

/// A read-only summary of the book collection.
///
/// An empty collection is reported with the [`Statistics::Empty`] sentinel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Statistics {
    /// there are no books in the collection
    Empty {
        /// always zero
        total_books: usize,
        /// a human readable note
        message: String,
    },
    /// summary of a non-empty collection
    Summary(Summary),
}

/// statistics of a non-empty book collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// number of books
    pub total_books: usize,
    /// number of distinct authors
    pub authors_count: usize,
    /// publication year range and mean
    pub publication_years: PublicationYears,
    /// number of books written by each author
    pub books_per_author: BTreeMap<String, usize>,
}

/// oldest, newest and mean publication year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicationYears {
    /// the smallest year
    pub oldest: i32,
    /// the largest year
    pub newest: i32,
    /// the mean year, rounded to one decimal place
    pub average: f64,
}

impl Statistics {
    /// computes the statistics for the given `books`
    pub fn from_books(books: &[Book]) -> Self {
        if books.is_empty() {
            return Statistics::Empty {
                total_books: 0,
                message: String::from("No books in collection"),
            };
        }

        let mut books_per_author: BTreeMap<String, usize> = BTreeMap::new();
        for book in books {
            *books_per_author.entry(book.author.clone()).or_default() += 1;
        }
        let authors: BTreeSet<&str> = books.iter().map(|b| b.author.as_str()).collect();

        let oldest = books.iter().map(|b| b.year).min().unwrap_or_default();
        let newest = books.iter().map(|b| b.year).max().unwrap_or_default();
        let sum: i64 = books.iter().map(|b| i64::from(b.year)).sum();
        let mean = sum as f64 / books.len() as f64;

        Statistics::Summary(Summary {
            total_books: books.len(),
            authors_count: authors.len(),
            publication_years: PublicationYears {
                oldest,
                newest,
                average: round_to_tenth(mean),
            },
            books_per_author,
        })
    }

    /// total number of books covered by these statistics
    pub fn total_books(&self) -> usize {
        match self {
            Statistics::Empty { total_books, .. } => *total_books,
            Statistics::Summary(summary) => summary.total_books,
        }
    }
}
