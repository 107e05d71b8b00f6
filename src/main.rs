use clap::{Parser as ClapParser, Subcommand};
use soql_model::cli::{self, CheckOptions, CheckResult, CliError, ConvertOptions};
use soql_model::serializer::FormatOptions;
use std::io::{self, Read};
use tracing_subscriber::EnvFilter;

#[derive(ClapParser)]
#[command(name = "soql")]
#[command(about = "SOQL query builder model - convert queries to and from the builder's JSON")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the flat builder model of a query as JSON
    Convert {
        /// Query text (reads from stdin if not provided)
        query: Option<String>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Print the structural model of a query as JSON
    Model {
        /// Query text (reads from stdin if not provided)
        query: Option<String>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Generate query text from a flat model JSON document
    Format {
        /// Model JSON (reads from stdin if not provided)
        json: Option<String>,

        /// Spaces before each clause after the first
        #[arg(long, default_value_t = 2)]
        indent: usize,
    },

    /// Report syntax errors; exits with status 1 if there are any
    Check {
        /// Query text (reads from stdin if not provided)
        query: Option<String>,
    },

    /// Regenerate query text through the builder model
    Normalize {
        /// Query text (reads from stdin if not provided)
        query: Option<String>,

        /// Spaces before each clause after the first
        #[arg(long, default_value_t = 2)]
        indent: usize,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Convert { query, pretty } => read_arg(query).and_then(|query| {
            cli::execute_convert(&ConvertOptions { query, pretty }).map(|json| println!("{}", json))
        }),
        Commands::Model { query, pretty } => read_arg(query).and_then(|query| {
            cli::execute_model(&ConvertOptions { query, pretty }).map(|json| println!("{}", json))
        }),
        Commands::Format { json, indent } => read_arg(json).and_then(|json| {
            cli::execute_format(&json, &FormatOptions { indent }).map(|text| print!("{}", text))
        }),
        Commands::Check { query } => run_check(query),
        Commands::Normalize { query, indent } => read_arg(query).map(|query| {
            print!(
                "{}",
                cli::execute_normalize(&query, &FormatOptions { indent })
            )
        }),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

/// The argument if given, otherwise piped stdin.
fn read_arg(arg: Option<String>) -> Result<String, CliError> {
    match arg {
        Some(s) => Ok(s),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
        None => Err(CliError::NoInput),
    }
}

fn run_check(query: Option<String>) -> Result<(), CliError> {
    let query = read_arg(query)?;
    match cli::execute_check(&CheckOptions { query }) {
        CheckResult::Valid => println!("Syntax is valid"),
        CheckResult::Invalid(errors) => {
            for e in &errors {
                eprintln!("{}", e);
            }
            std::process::exit(1);
        }
    }
    Ok(())
}
