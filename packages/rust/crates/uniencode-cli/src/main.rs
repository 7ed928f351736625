//! uniencode CLI: re-encode one file, or every matching file under a tree.
//!
//! Logging: set `RUST_LOG=uniencode_engine=debug` (or `warn`, `info`) to
//! control per-file messages on stderr. `--verbose` switches the default to
//! debug.

mod cli;

use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use uniencode_engine::{ConversionOutcome, Engine, TargetEncoding, walk_and_convert};
use uniencode_io::{BinarySniffer, ContentSniffer, FileCommandSniffer, check_regular_file};

use crate::cli::{Cli, SnifferKind};

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize tracing: RUST_LOG overrides; --verbose => debug; else info
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if cli.verbose {
            "uniencode=debug,uniencode_engine=debug,uniencode_io=debug"
        } else {
            "uniencode=info,uniencode_engine=info,uniencode_io=info"
        })
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();

    let Some(file) = cli.file.as_deref() else {
        println!("No input file or directory");
        return Ok(ExitCode::SUCCESS);
    };

    let target = match TargetEncoding::from_label(&cli.encoding) {
        Ok(target) => target,
        Err(e) => {
            println!("{e}");
            return Ok(ExitCode::from(2));
        }
    };
    let engine = Engine::new(cli.engine_config());

    if cli.recursive {
        run_recursive(&cli, file, &target, &engine)
    } else {
        Ok(run_single(file, &target, &engine))
    }
}

fn run_single(file: &Path, target: &TargetEncoding, engine: &Engine) -> ExitCode {
    if check_regular_file(file).is_err() {
        println!("Not valid file: {}", file.display());
        return ExitCode::FAILURE;
    }

    match engine.decide_and_convert(file, target) {
        ConversionOutcome::Failed(_) => ExitCode::FAILURE,
        _ => ExitCode::SUCCESS,
    }
}

fn run_recursive(
    cli: &Cli,
    root: &Path,
    target: &TargetEncoding,
    engine: &Engine,
) -> anyhow::Result<ExitCode> {
    let sniffer: Box<dyn BinarySniffer> = match cli.sniffer {
        SnifferKind::Content => Box::new(ContentSniffer),
        SnifferKind::File => Box::new(FileCommandSniffer::new()),
    };

    let report = walk_and_convert(root, &cli.walk_config(), target, engine, sniffer.as_ref())
        .with_context(|| format!("cannot convert files under {}", root.display()))?;

    if cli.json {
        let json = serde_json::to_string_pretty(&report).context("failed to serialize report")?;
        println!("{json}");
    } else {
        println!("Changed {} files in total", report.files_changed);
    }

    Ok(ExitCode::SUCCESS)
}
