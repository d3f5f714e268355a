#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]

mod logging;
mod run;

use clap::Parser;
use miette::Result;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "codemask")]
#[command(author, version, about = "Rename identifiers and mask literals in JavaScript, Python and SQL", long_about = None)]
struct Cli {
    /// Source language: js, javascript, jsx, py, python, sql, or auto (from FILE's extension)
    language: String,

    /// Input file; omit or pass `-` to read stdin
    file: Option<PathBuf>,

    /// Reject input longer than N characters (0 disables the guard) [default: 3000]
    #[arg(long, value_name = "N")]
    max_chars: Option<usize>,

    /// Settings file (JSON) with per-language overrides
    #[arg(long, value_name = "PATH", env = "CODEMASK_CONFIG")]
    config: Option<PathBuf>,

    /// Extra names to leave untouched in this run
    #[arg(long, value_name = "NAME,...", value_delimiter = ',')]
    reserved: Vec<String>,

    /// Write the result to a file instead of stdout
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Emit a JSON report (stable, machine-readable)
    #[arg(long)]
    json: bool,

    /// Increase logging verbosity (-v for DEBUG, -vv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(cli.verbose, cli.json);

    let options = run::Options {
        language: cli.language,
        file: cli.file,
        max_chars: cli.max_chars,
        config: cli.config,
        reserved: cli.reserved,
        output: cli.output,
        json: cli.json,
    };
    run::run(&options)
}
