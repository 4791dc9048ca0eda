//! Command-line interface for xmlrecords.
//!
//! Usage:
//!   xmlrecords `<path>` [--schema articles|molecules] [--validate] [--verbose]
use clap::{Parser, ValueEnum};
use std::{io::Write, path::PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use xmlrecords::{ArticleSchema, MoleculeSchema, ParseOptions, Schema, XmlResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SchemaKind {
    /// `<articles><article>...` collections
    Articles,

    /// `<molecules><molecule>...` collections
    Molecules,
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the XML document
    path: PathBuf,

    /// The kind of records the document holds
    #[arg(short, long, value_enum, default_value_t = SchemaKind::Articles)]
    schema: SchemaKind,

    /// Check the document against its DOCTYPE
    #[arg(long)]
    validate: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn run<S: Schema>(cli: &Cli) -> XmlResult<()> {
    let options = ParseOptions::new().with_validation(cli.validate);
    let report = xmlrecords::Parser::<S>::new(options).report_file(&cli.path)?;

    debug!("Writing report");
    let mut stdout = std::io::stdout().lock();
    write!(stdout, "{report}")?;
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.schema {
        SchemaKind::Articles => run::<ArticleSchema>(&cli),
        SchemaKind::Molecules => run::<MoleculeSchema>(&cli),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
