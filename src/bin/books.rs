//! The books executable works directly on a CSV book file, without a server.
//!
//! `books [--file FILE] list`
//! `books [--file FILE] get <ID>`
//! `books [--file FILE] add <TITLE> <AUTHOR> <YEAR> <ISBN>`
//! `books [--file FILE] update <ID> <TITLE> <AUTHOR> <YEAR> <ISBN>`
//! `books [--file FILE] rm <ID>`
//! `books [--file FILE] stats`
//!
//!     --file defaults to books.csv in the current directory, it is created if missing.
//!     Books are printed to stdout as JSON. A missing book, an invalid book, or a storage
//!     failure is printed to stderr and gives a non-zero exit code.

mod common;

use books::{handle, CsvBookStore, Result};
use clap::{crate_version, App, Arg};
use std::path::Path;
use std::process::exit;

const DEFAULT_FILE: &str = "books.csv";

fn main() {
    let matches = App::new("books")
        .version(crate_version!())
        .author("strohs <strohs1@gmail.com>")
        .about("manage a CSV book catalog")
        .arg(Arg::with_name("file")
            .long("file")
            .value_name("FILE")
            .help("the CSV file holding the books")
            .default_value(DEFAULT_FILE))
        .arg(common::log_level_arg("warn"))
        .subcommands(common::subcommands())
        .get_matches();

    if let Err(e) = run(&matches) {
        eprintln!("{}", e);
        exit(1);
    }
}

fn run(matches: &clap::ArgMatches) -> Result<()> {
    common::subscriber_config(common::parse_level(matches)?);
    let req = common::parse_request(matches)?;
    let store = CsvBookStore::open(Path::new(common::required(matches, "file")?))?;
    common::print_response(handle(&store, req))
}
