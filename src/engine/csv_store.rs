use std::fs::{self, File};
use std::io::{self, BufReader, ErrorKind};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tempfile::NamedTempFile;
use tracing::{debug, info, instrument, warn};

use super::BookEngine;
use crate::book::{Book, NewBook};
use crate::error::{BookError, Result};

/// the header row of the backing file. Column order is fixed.
pub const HEADER: [&str; 5] = ["id", "title", "author", "year", "isbn"];

/// A [`BookEngine`] that keeps the whole collection in a single CSV file.
///
/// The file on disk is the only source of truth. Every operation re-reads the entire file
/// before acting, and every mutation rewrites the entire file. Rewrites go to a temporary
/// file in the same directory which is then renamed over the backing file, so a reader
/// never observes a half written table.
///
/// Clones share one lock, which is held for the whole read-modify-write cycle of an
/// operation, so concurrent writers going through the same store can not lose updates.
#[derive(Debug, Clone)]
pub struct CsvBookStore {
    // the backing CSV file
    path: PathBuf,

    // guards each reload / mutate / persist cycle
    lock: Arc<Mutex<()>>,
}

impl CsvBookStore {
    /// creates a [`CsvBookStore`] backed by the CSV file at `path`.
    /// If the file does not exist it is created, containing only the header row.
    /// Missing parent directories are created as well.
    #[instrument]
    pub fn open(path: &Path) -> Result<CsvBookStore> {
        info!("opening book store version {}", env!("CARGO_PKG_VERSION"));
        let dir = parent_dir(path);
        fs::create_dir_all(dir).map_err(|source| BookError::Storage {
            op: "create",
            path: dir.to_path_buf(),
            source,
        })?;

        if path.exists() {
            debug!("using existing book file");
        } else {
            persist(path, &[])?;
            info!("created empty book file");
        }

        Ok(CsvBookStore {
            path: path.to_path_buf(),
            lock: Arc::new(Mutex::new(())),
        })
    }

    /// the path of the backing CSV file
    pub fn path(&self) -> &Path {
        &self.path
    }

    // the guarded data lives on disk, so a panic in another holder can not leave it
    // half modified
    fn lock(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl BookEngine for CsvBookStore {
    #[instrument(skip(self))]
    fn list_all(&self) -> Result<Vec<Book>> {
        let _guard = self.lock();
        Ok(load(&self.path)?.books)
    }

    #[instrument(skip(self))]
    fn get(&self, id: u64) -> Result<Option<Book>> {
        let _guard = self.lock();
        let table = load(&self.path)?;
        Ok(table.position(id).map(|idx| table.books[idx].clone()))
    }

    #[instrument(skip(self))]
    fn add(&self, book: NewBook) -> Result<Book> {
        book.validate()?;

        let _guard = self.lock();
        let mut table = load(&self.path)?;
        let book = Book::from_new(table.next_id()?, book);
        table.books.push(book.clone());
        persist(&self.path, &table.books)?;

        info!(id = book.id, "added book");
        Ok(book)
    }

    #[instrument(skip(self))]
    fn update(&self, id: u64, book: NewBook) -> Result<Option<Book>> {
        book.validate()?;

        let _guard = self.lock();
        let mut table = load(&self.path)?;
        let idx = match table.position(id) {
            Some(idx) => idx,
            None => {
                debug!("no book to update");
                return Ok(None);
            }
        };
        table.books[idx].replace_with(book);
        persist(&self.path, &table.books)?;

        info!(id, "updated book");
        Ok(Some(table.books[idx].clone()))
    }

    #[instrument(skip(self))]
    fn remove(&self, id: u64) -> Result<bool> {
        let _guard = self.lock();
        let mut table = load(&self.path)?;
        match table.position(id) {
            Some(idx) => {
                table.books.remove(idx);
                persist(&self.path, &table.books)?;
                info!(id, "removed book");
                Ok(true)
            }
            None => {
                debug!("no book to remove");
                Ok(false)
            }
        }
    }
}

/// the rows of the backing file, in file order
#[derive(Debug, Default)]
struct Table {
    books: Vec<Book>,
}

impl Table {
    /// one more than the largest id in the table, or 1 if the table is empty
    ///
    /// # Errors
    /// returns [`BookError::IdsExhausted`] if the largest id is `u64::MAX`
    fn next_id(&self) -> Result<u64> {
        match self.books.iter().map(|b| b.id).max() {
            Some(max) => max.checked_add(1).ok_or(BookError::IdsExhausted { max }),
            None => Ok(1),
        }
    }

    fn position(&self, id: u64) -> Option<usize> {
        self.books.iter().position(|b| b.id == id)
    }
}

/// reads every row of the CSV file at `path` into a [`Table`].
///
/// A missing file, or one with rows that can not be parsed into a [`Book`], is read as an
/// empty table.
///
/// # Errors
/// returns [`BookError::Storage`] if the file exists but could not be read
fn load(path: &Path) -> Result<Table> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!(?path, "book file is missing, treating it as empty");
            return Ok(Table::default());
        }
        Err(source) => {
            return Err(BookError::Storage {
                op: "read",
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(BufReader::new(file));

    let mut books = vec![];
    for row in reader.deserialize::<Book>() {
        match row {
            Ok(book) => books.push(book),
            Err(e) if e.is_io_error() => {
                return Err(BookError::Storage {
                    op: "read",
                    path: path.to_path_buf(),
                    source: io::Error::from(e),
                })
            }
            Err(e) => {
                warn!(?path, error = %e, "book file is malformed, treating it as empty");
                return Ok(Table::default());
            }
        }
    }
    debug!(rows = books.len(), "loaded book file");

    Ok(Table { books })
}

/// rewrites the CSV file at `path` so that it holds the header followed by `books`
///
/// # Errors
/// returns [`BookError::Storage`] if the file could not be written, in which case the
/// previous contents of the file are left in place
fn persist(path: &Path, books: &[Book]) -> Result<()> {
    write_table(path, books).map_err(|source| BookError::Storage {
        op: "write",
        path: path.to_path_buf(),
        source,
    })
}

fn write_table(path: &Path, books: &[Book]) -> io::Result<()> {
    let mut tmp = NamedTempFile::new_in(parent_dir(path))?;
    {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(tmp.as_file_mut());
        writer.write_record(&HEADER)?;
        for book in books {
            writer.serialize(book)?;
        }
        writer.flush()?;
    }
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// the directory holding `path`, "." for a bare file name
fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}
