//! The books-client executable supports the following command line arguments:
//!
//! `books-client [--addr IP-PORT] list`
//! `books-client [--addr IP-PORT] get <ID>`
//! `books-client [--addr IP-PORT] add <TITLE> <AUTHOR> <YEAR> <ISBN>`
//! `books-client [--addr IP-PORT] update <ID> <TITLE> <AUTHOR> <YEAR> <ISBN>`
//! `books-client [--addr IP-PORT] rm <ID>`
//! `books-client [--addr IP-PORT] stats`
//!
//!     --addr accepts an IP address, either v4 or v6, and a port number, with the format IP:PORT.
//!     If --addr is not specified then connect on 127.0.0.1:4000.
//!     Print an error and return a non-zero exit code on server error, or if IP-PORT does not
//!     parse as an address. A missing book is also treated as an error.
//!
//! `books-client -V`
//!
//!     Print the version.

mod common;

use books::{BookClient, BookError, Request, Result};
use clap::{crate_version, App, Arg, ArgMatches};
use std::net::SocketAddr;
use std::process::exit;

const DEFAULT_ADDRESS: &str = "127.0.0.1:4000";

/// ['Opt'] holds parsed and validated options from the command line
#[derive(Debug)]
struct Opt {
    /// the server's ip:port
    addr: SocketAddr,
    req: Request,
}

impl Opt {
    /// validates the `addr` parameter is a valid IP address and PORT
    /// # Errors
    /// returns [`BookError::Parsing`] if one of the parameters is invalid
    fn build(matches: &ArgMatches) -> Result<Opt> {
        let addr = common::required(matches, "addr")?;
        let addr: SocketAddr = addr.parse().map_err(|_| {
            BookError::Parsing(format!("could not parse {} into an IP address and port", addr))
        })?;
        let req = common::parse_request(matches)?;
        Ok(Opt { addr, req })
    }
}

fn main() {
    let matches = App::new("books-client")
        .version(crate_version!())
        .author("strohs <strohs1@gmail.com>")
        .about("a client for the books-server")
        .subcommands(common::subcommands())
        .arg(Arg::with_name("addr")
            .long("addr")
            .value_name("IP_ADDR:PORT")
            .help("sets the IP_ADDR:PORT of the server to connect to")
            .default_value(DEFAULT_ADDRESS))
        .arg(common::log_level_arg("warn"))
        .get_matches();

    if let Err(e) = run(&matches) {
        eprintln!("{}", e);
        exit(1);
    }
}

/// sends the request from the command line to the server and prints the response
fn run(matches: &ArgMatches) -> Result<()> {
    common::subscriber_config(common::parse_level(matches)?);
    let opt = Opt::build(matches)?;
    let mut client = BookClient::connect(opt.addr)?;
    common::print_response(client.send(&opt.req)?)
}
