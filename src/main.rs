use clap::{Parser as ClapParser, Subcommand};
use clove_filter::cli::{self, CheckOptions, CheckResult, CliError};
use log::{LevelFilter, debug};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};
use std::io::{self, Read};

#[derive(ClapParser)]
#[command(name = "clove-filter")]
#[command(about = "Test SQL-style filter expressions against JSON records")]
#[command(version)]
struct Cli {
    /// Log more (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a filter expression and test it against JSON input
    Check {
        /// The filter expression, e.g. "age < 18 AND name LIKE 'L%'"
        expression: String,

        /// JSON object or array of objects (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<String>,

        /// JSON value bound to the next `?` placeholder
        #[arg(short = 'p', long = "param")]
        params: Vec<String>,

        /// Pretty-print the output
        #[arg(long)]
        pretty: bool,

        /// Only validate syntax, don't evaluate
        #[arg(long)]
        syntax_only: bool,

        /// Print the number of matching records
        #[arg(short, long)]
        count: bool,
    },

    /// List documentation categories
    Docs,

    /// Show documentation for a specific category
    Doc {
        /// Category name (use 'clove-filter docs' to list categories)
        category: String,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    // Only fails when a logger is already installed
    let _ = TermLogger::init(level, Config::default(), TerminalMode::Stderr, ColorChoice::Auto);
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Check {
            expression,
            input,
            params,
            pretty,
            syntax_only,
            count,
        } => run_check(CheckOptions {
            expression,
            input,
            params,
            pretty,
            syntax_only,
            count,
        }),
        Commands::Docs => {
            print!("{}", cli::get_docs_overview());
            Ok(())
        }
        Commands::Doc { category } => cli::get_doc_category(&category).map(|content| {
            print!("{}", content);
        }),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run_check(mut options: CheckOptions) -> Result<(), CliError> {
    if options.input.is_none() && !options.syntax_only && !atty::is(atty::Stream::Stdin) {
        debug!("reading input from stdin");
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        options.input = Some(buffer);
    }

    match cli::execute_check(&options)? {
        CheckResult::SyntaxValid(canonical) => println!("{}", canonical),
        CheckResult::Fit(fit) => println!("{}", fit),
        CheckResult::Count(count) => println!("{}", count),
        CheckResult::Matches(records) => {
            let json = if options.pretty {
                serde_json::to_string_pretty(&records)
            } else {
                serde_json::to_string(&records)
            }?;
            println!("{}", json);
        }
    }
    Ok(())
}
