use crate::command::{Request, Response};
use crate::thread_pool::ThreadPool;
use crate::{BookEngine, Result};
use serde_json::Deserializer;
use std::io::{BufReader, BufWriter, Write};
use std::net::{TcpListener, TcpStream, ToSocketAddrs};
use tracing::{debug, error, info, warn};

/// A TCP socket server that exposes a [`BookEngine`] to remote clients.
/// It listens for incoming [`Request`]s, deserializes them, and processes each connection on
/// a thread from its [`ThreadPool`].
///
/// Each thread receives a clone of the engine. Engines serialize their own writes, so two
/// clients updating the collection at the same time will not lose either update.
///
/// Store results are translated here into client visible [`Response`]s: a missing book becomes
/// a `NotFound` error response, a rejected candidate an `InvalidRecord` one.
///
/// # Example
/// ```rust
/// use std::path::Path;
/// use books::{CsvBookStore, BookServer};
/// use books::thread_pool::{SharedQueueThreadPool, ThreadPool};
/// # fn main() -> books::Result<()> {
/// let pool = SharedQueueThreadPool::new(4)?;
/// let engine = CsvBookStore::open(Path::new("books.csv"))?;
/// let server = BookServer::new(engine, pool);
/// //server.run("127.0.0.1:4000")?;
/// # Ok(())
/// # }
/// ```
pub struct BookServer<E: BookEngine, P: ThreadPool> {
    /// the book engine to use
    engine: E,
    /// a pool of threads that will service connections using a handle to the engine
    pool: P,
}

impl<E: BookEngine, P: ThreadPool> BookServer<E, P> {
    /// Create a new `BookServer` using the given [`BookEngine`] and [`ThreadPool`] implementation.
    pub fn new(engine: E, pool: P) -> Self {
        BookServer { engine, pool }
    }

    /// binds to the given address and serves connections until the listener fails.
    ///
    /// # Errors
    /// returns [`BookError::Io`] if the address could not be bound
    ///
    /// [`BookError::Io`]: ./enum.BookError.html
    pub fn run<A: ToSocketAddrs>(self, addr: A) -> Result<()> {
        let listener = TcpListener::bind(addr)?;
        self.serve(listener)
    }

    /// serves connections arriving on an already bound `listener`.
    /// Each connection gets serviced on its own thread from the ThreadPool
    pub fn serve(self, listener: TcpListener) -> Result<()> {
        info!("listening on {}", listener.local_addr()?);
        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    let engine = self.engine.clone();
                    self.pool.spawn(move || {
                        if let Err(e) = serve_client(engine, stream) {
                            error!("Error on serving client: {}", e);
                        }
                    });
                }
                Err(e) => error!("Connection failed: {}", e),
            }
        }
        Ok(())
    }
}

/// Listens for and processes [`Request`]s coming over the given `tcp` stream until the client
/// hangs up. Every request is answered with exactly one [`Response`].
fn serve_client<E: BookEngine>(engine: E, tcp: TcpStream) -> Result<()> {
    let peer_addr = tcp.peer_addr()?;
    let stream_reader = BufReader::new(&tcp);
    let mut stream_writer = BufWriter::new(&tcp);
    let req_reader = Deserializer::from_reader(stream_reader).into_iter::<Request>();

    let mut send_resp = move |resp: Response| -> Result<()> {
        serde_json::to_writer(&mut stream_writer, &resp)?;
        stream_writer.flush()?;
        debug!("Response sent to {}: {:?}", peer_addr, resp);
        Ok(())
    };

    for req in req_reader {
        let req = match req {
            Ok(req) => req,
            Err(e) => {
                // the stream can not be resynchronized after a bad request, answer and hang up
                warn!("Malformed request from {}: {}", peer_addr, e);
                send_resp(error_response(e.into()))?;
                break;
            }
        };
        debug!("Receive request from {}: {:?}", peer_addr, req);
        send_resp(handle(&engine, req))?;
    }
    Ok(())
}

/// executes a single request against the `engine`
pub fn handle<E: BookEngine>(engine: &E, req: Request) -> Response {
    let result = match req {
        Request::List => engine.list_all().map(Response::Books),
        Request::Get { id } => engine.fetch(id).map(Response::Book),
        Request::Create { book } => engine.create(book).map(Response::Book),
        Request::Replace { id, book } => engine.replace(id, book).map(Response::Book),
        Request::Delete { id } => engine.delete(id).map(|_| Response::Deleted { id }),
        Request::Statistics => engine.statistics().map(Response::Statistics),
    };
    result.unwrap_or_else(error_response)
}

fn error_response(e: crate::BookError) -> Response {
    Response::Err {
        status: e.status(),
        message: e.to_string(),
    }
}
