//! this binary starts the books server
//! to see the list of commands, type: `books-server --help`

mod common;

use books::{BookError, BookServer, CsvBookStore, RayonThreadPool, Result, SharedQueueThreadPool, ThreadPool};
use clap::{arg_enum, crate_version, value_t, App, Arg, ArgMatches};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::exit;
use std::thread;
use tracing::{info, Level};

arg_enum! {
    #[allow(non_camel_case_types)]
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    enum Pool {
        shared,
        rayon
    }
}

const DEFAULT_ADDRESS: &str = "127.0.0.1:4000";
const DEFAULT_FILE: &str = "books.csv";
const DEFAULT_POOL: Pool = Pool::shared;
const FALLBACK_THREADS: u32 = 4;

/// ['Opt'] holds parsed and validated options from the command line
#[derive(Debug)]
struct Opt {
    addr: SocketAddr,
    file: PathBuf,
    pool: Pool,
    threads: u32,
    level: Level,
}

impl Opt {
    /// validates the command line parameters
    /// returns `Ok<Opt>` if everything is valid
    /// # Errors
    /// returns [`BookError::Parsing`] if one of the parameters is invalid
    fn build(matches: &ArgMatches) -> Result<Opt> {
        let addr = common::required(matches, "addr")?;
        let addr: SocketAddr = addr.parse().map_err(|_| {
            BookError::Parsing(format!("could not parse {} into an IP address and port", addr))
        })?;

        let pool = value_t!(matches, "pool", Pool).unwrap_or(DEFAULT_POOL);

        let threads = match matches.value_of("threads") {
            Some(threads) => threads
                .parse::<u32>()
                .ok()
                .filter(|&n| n > 0)
                .ok_or_else(|| BookError::Parsing(format!("{} is not a valid thread count", threads)))?,
            None => thread::available_parallelism()
                .map(|n| n.get() as u32)
                .unwrap_or(FALLBACK_THREADS),
        };

        let level = common::parse_level(matches)?;

        Ok(Opt {
            addr,
            file: PathBuf::from(common::required(matches, "file")?),
            pool,
            threads,
            level,
        })
    }
}

fn main() {
    // parse command line args
    let matches = App::new("books-server")
        .version(crate_version!())
        .author("strohs <strohs1@gmail.com>")
        .about("serves a CSV book catalog over TCP")
        .arg(Arg::with_name("addr")
            .long("addr")
            .value_name("IP_ADDR:PORT")
            .help("sets the IP_ADDR:PORT that the server listens on")
            .default_value(DEFAULT_ADDRESS))
        .arg(Arg::with_name("file")
            .long("file")
            .value_name("FILE")
            .help("the CSV file holding the books, created if missing")
            .default_value(DEFAULT_FILE))
        .arg(Arg::with_name("pool")
            .long("pool")
            .value_name("POOL")
            .help("the thread pool serving connections, either 'shared' or 'rayon'")
            .possible_values(&Pool::variants())
            .default_value("shared"))
        .arg(Arg::with_name("threads")
            .long("threads")
            .value_name("N")
            .help("number of threads in the pool, defaults to the number of CPUs"))
        .arg(common::log_level_arg("info"))
        .get_matches();

    // validate command line options, store them in Opt
    let opt = match Opt::build(&matches) {
        Ok(opt) => opt,
        Err(err) => {
            eprintln!("{}", err);
            exit(1);
        }
    };

    // set up a tracing subscriber to log to STDERR
    common::subscriber_config(opt.level);

    // start the server
    if let Err(e) = run(opt) {
        eprintln!("{}", e);
        exit(1);
    }
}

fn run(opt: Opt) -> Result<()> {
    info!("books-server {}", env!("CARGO_PKG_VERSION"));
    info!("Book file: {:?}", opt.file);
    info!("Thread pool: {} with {} threads", opt.pool, opt.threads);

    let engine = CsvBookStore::open(&opt.file)?;
    match opt.pool {
        Pool::shared => BookServer::new(engine, SharedQueueThreadPool::new(opt.threads)?).run(opt.addr),
        Pool::rayon => BookServer::new(engine, RayonThreadPool::new(opt.threads)?).run(opt.addr),
    }
}
