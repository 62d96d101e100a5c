use serde::{Deserialize, Serialize};

use crate::book::{Book, NewBook, Statistics};
use crate::error::Status;

/// These are the request "commands" that can be made to a [`BookServer`]
///
/// [`BookServer`]: ./struct.BookServer.html
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Request {
    /// list every stored book
    List,
    /// get a single book
    Get {
        /// the id to search for
        id: u64,
    },
    /// store a new book
    Create {
        /// the book to store, it will be assigned a new id
        book: NewBook,
    },
    /// replace every field of an existing book, except its id
    Replace {
        /// the id of the book to replace
        id: u64,
        /// the new field values
        book: NewBook,
    },
    /// delete a book
    Delete {
        /// the id of the book to delete
        id: u64,
    },
    /// get statistics about the whole collection
    Statistics,
}

/// The response types that can be returned for any [`Request`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Response {
    /// a single book, returned for `Get`, `Create` and `Replace`
    Book(Book),
    /// returned for `List`
    Books(Vec<Book>),
    /// confirms that the book with `id` was deleted
    Deleted {
        /// the id of the deleted book
        id: u64,
    },
    /// returned for `Statistics`
    Statistics(Statistics),
    /// this variant is returned if an Error occurs while processing the request
    Err {
        /// classification of the error
        status: Status,
        /// a description of the error
        message: String,
    },
}
