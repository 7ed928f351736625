use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use uniencode_engine::{DEFAULT_MAX_FILE_SIZE, EngineConfig, WalkConfig};

const LONG_ABOUT: &str = "\
Re-encodes files to UTF-8 or a custom encoding. Works on single files and \
recursively on directories, skipping binary files and links. Files change only \
when the detected encoding is trusted: low-confidence guesses are left alone, \
medium-confidence files are converted line by line. Prints nothing when no \
action is needed because the file is ASCII or already in the target encoding.";

/// How binary files are recognised in recursive mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum SnifferKind {
    /// Inspect the first 8KB in-process (NULL bytes, control characters).
    /// UTF-16 is only recognised as text when it opens with a byte order mark.
    Content,
    /// Ask the `file(1)` utility; never reports binary on Windows.
    File,
}

#[derive(Parser, Debug)]
#[command(name = "uniencode")]
#[command(version, about = "Re-encode text files to a target character encoding.")]
#[command(long_about = LONG_ABOUT)]
#[command(after_help = "Example:\n  uniencode -r FOLDER -p \"*.srt\"")]
pub(crate) struct Cli {
    /// File to convert, or the directory root with --recursive.
    #[arg(value_name = "FILE")]
    pub(crate) file: Option<PathBuf>,

    /// Operate recursively on directory FILE.
    #[arg(short, long)]
    pub(crate) recursive: bool,

    /// Target encoding (any WHATWG label, e.g. utf-8, iso-8859-7, windows-1253).
    #[arg(short, long, value_name = "ENC", default_value = "utf-8")]
    pub(crate) encoding: String,

    /// Only convert files whose name matches this glob (recursive mode).
    #[arg(short, long, value_name = "GLOB", default_value = "*")]
    pub(crate) pattern: String,

    /// Worker threads for recursive mode (0 = one per CPU).
    #[arg(short, long, value_name = "N", default_value_t = 1)]
    pub(crate) jobs: usize,

    /// Refuse files larger than this many bytes.
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_MAX_FILE_SIZE)]
    pub(crate) max_size: u64,

    /// Binary file detection strategy.
    #[arg(long, value_enum, default_value_t = SnifferKind::Content)]
    pub(crate) sniffer: SnifferKind,

    /// Print the recursive-mode report as JSON.
    #[arg(long)]
    pub(crate) json: bool,

    /// Debug-level logging (RUST_LOG takes precedence).
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl Cli {
    pub(crate) fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            max_file_size: self.max_size,
            ..Default::default()
        }
    }

    pub(crate) fn walk_config(&self) -> WalkConfig {
        WalkConfig {
            file_pattern: self.pattern.clone(),
            workers: self.jobs,
        }
    }
}
