use std::io::{BufReader, BufWriter, Write};
use std::net::{TcpStream, ToSocketAddrs};

use serde::Deserialize;
use serde_json::de::IoRead;
use serde_json::Deserializer;

use crate::book::{Book, NewBook, Statistics};
use crate::command::{Request, Response};
use crate::error::Status;
use crate::{BookError, Result};

/// `BookClient` contains the functionality for communication with a [`BookServer`]
///
/// Error responses from the server are returned as [`BookError::Remote`], carrying the
/// server's [`Status`].
///
/// [`BookServer`]: ./struct.BookServer.html
pub struct BookClient {
    reader: Deserializer<IoRead<BufReader<TcpStream>>>,
    writer: BufWriter<TcpStream>,
}

impl BookClient {
    /// creates a client and establishes a socket connection to the server at the given `addr`
    pub fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        let tcp_reader = TcpStream::connect(addr)?;
        let tcp_writer = tcp_reader.try_clone()?;

        Ok(BookClient {
            reader: Deserializer::from_reader(BufReader::new(tcp_reader)),
            writer: BufWriter::new(tcp_writer),
        })
    }

    /// lists every book stored on the server
    pub fn list(&mut self) -> Result<Vec<Book>> {
        match self.send(&Request::List)? {
            Response::Books(books) => Ok(books),
            other => Err(unexpected(other)),
        }
    }

    /// gets the book with the given `id`
    /// # Errors
    /// `Err<BookError::Remote>` with status `NotFound` if there is no such book
    pub fn get(&mut self, id: u64) -> Result<Book> {
        self.send_for_book(&Request::Get { id })
    }

    /// stores a new book on the server, returning it with its assigned id
    /// # Errors
    /// `Err<BookError::Remote>` with status `InvalidRecord` if the book was rejected
    pub fn create(&mut self, book: NewBook) -> Result<Book> {
        self.send_for_book(&Request::Create { book })
    }

    /// replaces the fields of the book with the given `id`
    pub fn replace(&mut self, id: u64, book: NewBook) -> Result<Book> {
        self.send_for_book(&Request::Replace { id, book })
    }

    /// deletes the book with the given `id`
    /// # Errors
    /// `Err<BookError::Remote>` with status `NotFound` if there is no such book
    pub fn delete(&mut self, id: u64) -> Result<()> {
        match self.send(&Request::Delete { id })? {
            Response::Deleted { .. } => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    /// gets statistics about the books stored on the server
    pub fn statistics(&mut self) -> Result<Statistics> {
        match self.send(&Request::Statistics)? {
            Response::Statistics(stats) => Ok(stats),
            other => Err(unexpected(other)),
        }
    }

    fn send_for_book(&mut self, req: &Request) -> Result<Book> {
        match self.send(req)? {
            Response::Book(book) => Ok(book),
            other => Err(unexpected(other)),
        }
    }

    /// writes `req` to the server and waits for its response.
    /// An error response is re-thrown as a [`BookError::Remote`]
    pub fn send(&mut self, req: &Request) -> Result<Response> {
        serde_json::to_writer(&mut self.writer, req)?;
        self.writer.flush()?;

        match Response::deserialize(&mut self.reader)? {
            Response::Err { status, message } => Err(BookError::Remote { status, message }),
            resp => Ok(resp),
        }
    }
}

fn unexpected(resp: Response) -> BookError {
    BookError::Remote {
        status: Status::BadRequest,
        message: format!("unexpected response from server: {:?}", resp),
    }
}
