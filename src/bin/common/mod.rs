//! command line plumbing shared by the books executables, not every executable uses every item
#![allow(dead_code)]

use books::{BookError, NewBook, Request, Response, Result};
use clap::{App, Arg, ArgMatches, SubCommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// the subcommands understood by both executables
pub fn subcommands<'a, 'b>() -> Vec<App<'a, 'b>> {
    vec![
        SubCommand::with_name("list").about("List every stored book"),
        SubCommand::with_name("get")
            .about("Get the book with the given id")
            .arg(Arg::with_name("ID").required(true).index(1)),
        book_args(SubCommand::with_name("add").about("Add a new book, it will be assigned an id"), 1),
        book_args(
            SubCommand::with_name("update")
                .about("Replace the title, author, year and isbn of a book")
                .arg(Arg::with_name("ID").required(true).index(1)),
            2,
        ),
        SubCommand::with_name("rm")
            .about("Remove the book with the given id")
            .arg(Arg::with_name("ID").required(true).index(1)),
        SubCommand::with_name("stats").about("Show statistics about the stored books"),
    ]
}

/// the `--log-level` argument, `default` is used when it is not given
pub fn log_level_arg<'a, 'b>(default: &'a str) -> Arg<'a, 'b> {
    Arg::with_name("log-level")
        .long("log-level")
        .value_name("LEVEL")
        .help("sets the max level of log messages written to stderr")
        .default_value(default)
}

fn book_args<'a, 'b>(cmd: App<'a, 'b>, first: u64) -> App<'a, 'b> {
    cmd.arg(Arg::with_name("TITLE").required(true).index(first))
        .arg(Arg::with_name("AUTHOR").required(true).index(first + 1))
        .arg(Arg::with_name("YEAR").required(true).index(first + 2))
        .arg(Arg::with_name("ISBN").required(true).index(first + 3))
}

/// turns the subcommand in `matches` into a [`Request`]
pub fn parse_request(matches: &ArgMatches) -> Result<Request> {
    match matches.subcommand() {
        ("list", Some(_)) => Ok(Request::List),
        ("get", Some(args)) => Ok(Request::Get { id: parse_id(args)? }),
        ("add", Some(args)) => Ok(Request::Create { book: parse_book(args)? }),
        ("update", Some(args)) => Ok(Request::Replace {
            id: parse_id(args)?,
            book: parse_book(args)?,
        }),
        ("rm", Some(args)) => Ok(Request::Delete { id: parse_id(args)? }),
        ("stats", Some(_)) => Ok(Request::Statistics),
        _ => Err(BookError::Parsing(String::from(
            "a subcommand is required, see --help",
        ))),
    }
}

/// parses the `log-level` argument
pub fn parse_level(matches: &ArgMatches) -> Result<Level> {
    let level = required(matches, "log-level")?;
    level
        .parse()
        .map_err(|_| BookError::Parsing(format!("{} is not a valid log level", level)))
}

fn parse_id(args: &ArgMatches) -> Result<u64> {
    let id = required(args, "ID")?;
    id.parse()
        .map_err(|_| BookError::Parsing(format!("could not parse {} into a book id", id)))
}

fn parse_book(args: &ArgMatches) -> Result<NewBook> {
    let year = required(args, "YEAR")?;
    let year = year
        .parse()
        .map_err(|_| BookError::Parsing(format!("could not parse {} into a year", year)))?;
    Ok(NewBook::new(
        required(args, "TITLE")?,
        required(args, "AUTHOR")?,
        year,
        required(args, "ISBN")?,
    ))
}

/// gets the value of a required (or defaulted) argument
pub fn required<'a>(args: &'a ArgMatches, name: &str) -> Result<&'a str> {
    args.value_of(name)
        .ok_or_else(|| BookError::Parsing(format!("missing argument {}", name)))
}

/// prints a successful response to STDOUT, an error response is returned as an error
pub fn print_response(resp: Response) -> Result<()> {
    match resp {
        Response::Book(book) => println!("{}", serde_json::to_string_pretty(&book)?),
        Response::Books(books) => println!("{}", serde_json::to_string_pretty(&books)?),
        Response::Deleted { id } => println!("book with id {} deleted", id),
        Response::Statistics(stats) => println!("{}", serde_json::to_string_pretty(&stats)?),
        Response::Err { status, message } => return Err(BookError::Remote { status, message }),
    }
    Ok(())
}

/// configures a tracing subscriber that will log to STDERR
pub fn subscriber_config(level: Level) {
    let subscriber = FmtSubscriber::builder()
        // spans/events more verbose than `level` are discarded
        .with_max_level(level)
        // log to stderr, stdout is reserved for command output
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("could not set the tracing subscriber: {}", e);
    }
}
