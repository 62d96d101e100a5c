#![deny(missing_docs)]
//! A persistent catalog of books, stored as rows of a single CSV file.
//!
//! This crate provides the [`CsvBookStore`] engine itself, as well as a [`books-server`] and
//! [`books-client`] executable that expose the catalog over the network, and a [`books`]
//! executable that works on a CSV file directly.
//! Requests are sent between the client and server using synchronous networking over a
//! small JSON protocol.
//!
//! ## Supported Operations
//! The engine supports the following operations:
//!
//! - `LIST` every book, in the order it is stored
//! - `GET` a single book by its id
//! - `ADD` a new book, which is assigned the next id
//! - `UPDATE` every field of a book, except its id
//! - `REMOVE` a book by its id
//! - `STATISTICS` over the collection: counts, publication years, books per author
//!
//! See the [`BookEngine`] trait and the [`Request`] and [`Response`] types for more information
//! on the structure of these operations.
//!
//! ## Validation
//! Before a book is added or updated it is checked by [`NewBook::validate`]. The title and author
//! must be non-empty and not too long, the year must be plausible, and the isbn must contain
//! one of `isbn`, `978` or `979`. A rejected book never reaches the file.
//!
//! ## CSV File
//! The backing file has a header row `id,title,author,year,isbn` followed by one row per book.
//! The file is the only source of truth: every operation reads it in full before acting, and
//! every change rewrites it in full (through a temporary file that is renamed into place).
//! A missing or unreadable file is treated as an empty catalog.
//!
//! ## Ids
//! New books get an id one greater than the largest id currently in the file, or `1` when the
//! file is empty. Updates never change an id.
//!
//! ## Client / Server
//! [`BookServer`] reads JSON encoded [`Request`]s from each connection and answers each one
//! with a [`Response`]. Failures are returned as `Response::Err` carrying a [`Status`]
//! (`NotFound`, `InvalidRecord`, `BadRequest` or `Storage`). [`BookClient`] turns those back
//! into [`BookError::Remote`].
//!
//! [`books-server`]: ./books-server.rs
//! [`books-client`]: ./books-client.rs
//! [`books`]: ./books.rs

pub use book::{Book, NewBook, PublicationYears, Statistics, Summary};
pub use client::BookClient;
pub use command::{Request, Response};
pub use engine::{BookEngine, CsvBookStore, HEADER};
pub use error::{BookError, Result, Status};
pub use server::{handle, BookServer};
pub use thread_pool::{RayonThreadPool, SharedQueueThreadPool, ThreadPool};

pub mod book;
mod client;
mod command;
mod engine;
mod error;
mod server;
pub mod thread_pool;
