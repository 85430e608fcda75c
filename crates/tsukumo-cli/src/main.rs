mod cli;
mod config;
mod error;
mod output;

use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use tsukumo_parse::{KeywordDictionary, Options, ParseResult};

use cli::{Cli, Format};
use config::AppConfig;
use error::CliError;
use output::Report;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Aborted");
            eprintln!("tsukumo: {e}");
            ExitCode::from(2)
        }
    }
}

/// `TSUKUMO_LOG` wins over `-v`. Logs go to stderr so stdout stays clean JSON.
fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("TSUKUMO_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "tsukumo=debug" } else { "tsukumo=warn" })
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<ExitCode, CliError> {
    let mut config = AppConfig::load(cli.config.as_deref())?;
    cli.apply_overrides(&mut config.parser);
    let options = config.parser;
    let dictionary = KeywordDictionary::standard();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut failures = 0usize;

    let mut emit = |filename: &str, result: ParseResult| -> Result<(), CliError> {
        if !result.is_success() {
            tracing::warn!(filename, "No title found");
            failures += 1;
        }
        let report = Report::new(filename, &result, cli.tokens);
        match cli.format {
            Format::Json => output::write_json(&mut out, &report),
            Format::Table => output::write_table(&mut out, &report),
        }
    };

    if cli.files.is_empty() {
        for line in io::stdin().lock().split(b'\n') {
            let mut line = line?;
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            if line.is_empty() {
                continue;
            }
            let result = tsukumo_parse::parse_bytes(&line, &options, dictionary);
            emit(&*String::from_utf8_lossy(&line), result)?;
        }
    } else {
        for file in &cli.files {
            let filename = file.to_string_lossy();
            let result = parse_file_name(&filename, &options, dictionary);
            emit(&*filename, result)?;
        }
    }
    out.flush()?;

    Ok(if failures == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

/// Only the last path component is a filename.
fn parse_file_name(path: &str, options: &Options, dictionary: &KeywordDictionary) -> ParseResult {
    let name = path.rsplit(['/', '\\']).next().unwrap_or(path);
    tsukumo_parse::parse_with(name, options, dictionary)
}
