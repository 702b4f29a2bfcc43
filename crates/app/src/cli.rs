use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use progress_core::model::{PageBound, PageNumber};
use services::DEFAULT_STORAGE_KEY;

/// Track which pages of a vocabulary exercise are already easy.
#[derive(Debug, Parser)]
#[command(name = "easy-pages")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// SQLite database holding the progress records (`sqlite::memory:` for a throwaway run)
    #[arg(
        long,
        global = true,
        env = "EASY_PAGES_DB_URL",
        default_value = "sqlite://easy-pages.sqlite3"
    )]
    pub db: String,

    /// Storage key of the exercise being tracked
    #[arg(long, global = true, env = "EASY_PAGES_KEY", default_value = DEFAULT_STORAGE_KEY)]
    pub key: String,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    #[command(flatten)]
    Progress(ProgressCommand),
    /// Send a WAV recording to the practice server
    Upload {
        #[arg(value_name = "WAV_FILE")]
        path: PathBuf,
        /// Base URL of the server accepting `/upload-audio` (default: `EASY_PAGES_UPLOAD_URL`)
        #[arg(long)]
        server: Option<String>,
    },
}

/// Commands that read or change the stored session.
#[derive(Debug, Subcommand)]
pub enum ProgressCommand {
    /// Print the stored session
    Show,
    /// Mark a page as easy
    Mark { page: PageNumber },
    /// Remove a page from the easy list
    Unmark { page: PageNumber },
    /// Check whether a page is easy
    IsEasy { page: PageNumber },
    /// Print the next page that still needs practice
    Next {
        current: PageNumber,
        #[command(flatten)]
        bound: BoundArgs,
    },
    /// Print progress statistics as JSON
    Stats {
        #[command(flatten)]
        bound: BoundArgs,
    },
    /// Forget all progress
    Reset,
    /// Print the session as JSON
    Export,
    /// Replace the session with a previously exported one (`-` reads stdin)
    Import {
        #[arg(value_name = "FILE")]
        path: PathBuf,
    },
}

#[derive(Debug, Clone, Args)]
pub struct BoundArgs {
    /// Number of pages in the exercise
    #[arg(long, env = "EASY_PAGES_MAX_PAGES", default_value = "100")]
    pub max_pages: PageBound,
}
