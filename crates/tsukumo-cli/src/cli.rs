use std::ffi::OsString;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tsukumo_parse::Options;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Json,
    Table,
}

#[derive(Debug, Parser)]
#[command(name = "tsukumo")]
#[command(author, version, about = "Extract metadata from anime filenames")]
pub struct Cli {
    /// Filenames to parse. Read from stdin, one per line, when none are given
    pub files: Vec<OsString>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    pub format: Format,

    /// Include the annotated tokens in the output
    #[arg(long)]
    pub tokens: bool,

    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Don't look for episode numbers
    #[arg(long)]
    pub no_episode_number: bool,

    /// Don't look for an episode title
    #[arg(long)]
    pub no_episode_title: bool,

    /// Keep the file extension as part of the name
    #[arg(long)]
    pub no_file_extension: bool,

    /// Don't look for a release group
    #[arg(long)]
    pub no_release_group: bool,

    /// Characters that separate words
    #[arg(long)]
    pub delimiters: Option<String>,

    /// Remove this string before parsing (repeatable)
    #[arg(long = "ignore", value_name = "STRING")]
    pub ignored: Vec<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Layer the command-line flags over the options from the config file.
    pub fn apply_overrides(&self, options: &mut Options) {
        if self.no_episode_number {
            options.parse_episode_number = false;
        }
        if self.no_episode_title {
            options.parse_episode_title = false;
        }
        if self.no_file_extension {
            options.parse_file_extension = false;
        }
        if self.no_release_group {
            options.parse_release_group = false;
        }
        if let Some(delimiters) = &self.delimiters {
            options.allowed_delimiters.clone_from(delimiters);
        }
        options.ignored_strings.extend(self.ignored.iter().cloned());
    }
}
