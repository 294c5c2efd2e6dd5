//! bookweave - Bind paginated web books into EPUB

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser};
use log::{Level, LevelFilter, Log, Record};

use bookweave::config::PatternConfig;
use bookweave::{BookConfig, EpubBuilder, HttpFetcher, get_ebook};

#[derive(Parser)]
#[command(name = "bookweave")]
#[command(version, about = "Bind books published as web pages into EPUB", long_about = None)]
#[command(after_help = "EXAMPLES:
    bookweave https://example.org/prozess/ kap1.html -o prozess.epub --root-class book --next Weiter
    bookweave https://example.org/prozess/ kap1.html -o prozess.epub --config prozess.json")]
struct Cli {
    /// Base URL the first page is relative to
    #[arg(value_name = "BASE")]
    base: String,

    /// Path of the first page
    #[arg(value_name = "PATH")]
    path: String,

    /// Output EPUB file
    #[arg(short, long, value_name = "OUTPUT")]
    output: PathBuf,

    /// JSON configuration file; command line options take precedence
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Tag of the element holding the book content
    #[arg(long, value_name = "TAG")]
    root_tag: Option<String>,

    /// Class of the element holding the book content
    #[arg(long, value_name = "CLASS")]
    root_class: Option<String>,

    /// Id of the element holding the book content
    #[arg(long, value_name = "ID")]
    root_id: Option<String>,

    /// Regex for the text of the link to the next page
    #[arg(short, long, value_name = "REGEX")]
    next: Option<String>,

    #[arg(long)]
    title: Option<String>,

    /// Author name (repeatable)
    #[arg(short, long = "author", value_name = "NAME")]
    authors: Vec<String>,

    /// Language code, e.g. en or de-AT
    #[arg(long, value_name = "LANG")]
    lang: Option<String>,

    /// Publication date, YYYY[-MM[-DD]]
    #[arg(long)]
    date: Option<String>,

    #[arg(long)]
    publisher: Option<String>,

    #[arg(long)]
    rights: Option<String>,

    /// Add a title page
    #[arg(long)]
    titlepage: bool,

    /// Only print errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Print progress (-v) or debugging output (-vv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(match (cli.quiet, cli.verbose) {
        (true, _) => LevelFilter::Error,
        (false, 0) => LevelFilter::Warn,
        (false, 1) => LevelFilter::Info,
        (false, 2) => LevelFilter::Debug,
        (false, _) => LevelFilter::Trace,
    });

    match run(&cli) {
        Ok(pages) => {
            if !cli.quiet {
                println!("{}: {pages} pages", cli.output.display());
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> bookweave::Result<usize> {
    let config = load_config(cli)?;
    let metadata = config.build_metadata()?;

    let mut builder = EpubBuilder::create(&cli.output, metadata)?;
    if config.titlepage {
        builder.titlepage(None, None)?;
    }

    let mut extractor = config.build_extractor(&mut builder)?;
    let mut fetcher = HttpFetcher::new()?;
    let pages = get_ebook(&mut extractor, &mut fetcher, &cli.base, &cli.path)?;
    drop(extractor);

    builder.finish()?;
    Ok(pages)
}

/// The configuration file, if any, with command line overrides applied.
fn load_config(cli: &Cli) -> bookweave::Result<BookConfig> {
    let mut config = match cli.config {
        Some(ref path) => BookConfig::load(path)?,
        None => BookConfig::default(),
    };

    if cli.root_tag.is_some() || cli.root_class.is_some() || cli.root_id.is_some() {
        config.root = Some(PatternConfig {
            tags: cli.root_tag.iter().cloned().collect(),
            classes: cli.root_class.iter().cloned().collect(),
            ids: cli.root_id.iter().cloned().collect(),
            ..Default::default()
        });
    }
    if cli.next.is_some() {
        config.next_link = cli.next.clone();
    }

    let meta = &mut config.metadata;
    if cli.title.is_some() {
        meta.title = cli.title.clone();
    }
    if !cli.authors.is_empty() {
        meta.authors = cli.authors.clone();
    }
    if cli.lang.is_some() {
        meta.language = cli.lang.clone();
    }
    if cli.date.is_some() {
        meta.date = cli.date.clone();
    }
    if cli.publisher.is_some() {
        meta.publisher = cli.publisher.clone();
    }
    if cli.rights.is_some() {
        meta.rights = cli.rights.clone();
    }
    config.titlepage |= cli.titlepage;

    Ok(config)
}

const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const RESET: &str = "\x1b[0m";

/// Logs to stderr. Below warning level only this crate's records are shown.
struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
            && (metadata.level() <= Level::Warn || metadata.target().starts_with("bookweave"))
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        match record.level() {
            Level::Error => eprintln!("{RED}error:{RESET} {}", record.args()),
            Level::Warn => eprintln!("{YELLOW}warning: {}{RESET}", record.args()),
            _ => eprintln!("{}", record.args()),
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

fn init_logging(level: LevelFilter) {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}
