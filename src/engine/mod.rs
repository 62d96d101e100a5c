//! This module provides the book storage engine trait and its implementation.
//! The only engine implemented is [`CsvBookStore`], which keeps the whole collection in a
//! single CSV file.
use crate::book::{Book, NewBook, Statistics};
use crate::error::{BookError, Result};

/// A trait for the basic functionality of a book storage engine.
///
/// The required methods follow the store semantics: a missing record is reported as
/// `None` / `false`. The provided methods (`create`, `fetch`, `replace` and `delete`) are the
/// contract a boundary layer consumes, where a missing record is a [`BookError::NotFound`].
pub trait BookEngine: Clone + Send + 'static {
    /// returns every stored book, in storage order
    fn list_all(&self) -> Result<Vec<Book>>;

    /// Gets the book with the given `id`
    ///
    /// Returns `None` if no book has that `id`.
    fn get(&self, id: u64) -> Result<Option<Book>>;

    /// validates and stores `book` under the next free id, returning the stored book
    ///
    /// # Errors
    ///
    /// Returns `BookError::InvalidRecord` if `book` fails validation, nothing is stored.
    fn add(&self, book: NewBook) -> Result<Book>;

    /// replaces every field, except the `id`, of the book with the given `id`
    ///
    /// Returns `None` if no book has that `id`, in which case nothing is changed.
    fn update(&self, id: u64, book: NewBook) -> Result<Option<Book>>;

    /// removes the book with the given `id`
    ///
    /// Returns `false` if there was no such book.
    fn remove(&self, id: u64) -> Result<bool>;

    /// computes [`Statistics`] over the stored books
    fn statistics(&self) -> Result<Statistics> {
        Ok(Statistics::from_books(&self.list_all()?))
    }

    /// stores a new book, see [`BookEngine::add`]
    fn create(&self, book: NewBook) -> Result<Book> {
        self.add(book)
    }

    /// gets the book with the given `id`
    ///
    /// # Errors
    ///
    /// Returns `BookError::NotFound` if the given `id` is not found.
    fn fetch(&self, id: u64) -> Result<Book> {
        self.get(id)?.ok_or(BookError::NotFound { op: "get", id })
    }

    /// replaces the book with the given `id`
    ///
    /// # Errors
    ///
    /// Returns `BookError::NotFound` if the given `id` is not found.
    fn replace(&self, id: u64, book: NewBook) -> Result<Book> {
        self.update(id, book)?.ok_or(BookError::NotFound { op: "update", id })
    }

    /// deletes the book with the given `id`
    ///
    /// # Errors
    ///
    /// Returns `BookError::NotFound` if the given `id` is not found.
    fn delete(&self, id: u64) -> Result<()> {
        if self.remove(id)? {
            Ok(())
        } else {
            Err(BookError::NotFound { op: "delete", id })
        }
    }
}

mod csv_store;

pub use self::csv_store::{CsvBookStore, HEADER};
