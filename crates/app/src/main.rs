mod cli;
mod config;
mod logging;

use std::path::Path;

use clap::Parser;
use log::debug;
use progress_core::model::ProgressStats;
use services::{AudioUploadClient, AudioUploadConfig, Clock, ProgressStore};
use storage::repository::Storage;
use tokio::io::AsyncReadExt;

use crate::cli::{Cli, Command, ProgressCommand};

/// How the process reports a command's answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExitCode {
    /// The command succeeded with a positive answer.
    Success = 0,
    /// The command ran but the answer was negative (already marked, nothing left, import rejected).
    Negative = 1,
    /// Configuration, storage or transport failure.
    Failure = 2,
}

impl ExitCode {
    fn from_answer(answer: bool) -> Self {
        if answer { Self::Success } else { Self::Negative }
    }

    fn as_i32(self) -> i32 {
        self as i32
    }
}

fn completion_note(stats: &ProgressStats) -> Option<String> {
    stats
        .is_complete()
        .then(|| format!("easy pages have reached the {} page total", stats.total))
}

async fn read_input(path: &Path) -> std::io::Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        tokio::io::stdin().read_to_string(&mut text).await?;
        return Ok(text);
    }
    tokio::fs::read_to_string(path).await
}

async fn upload(
    path: &Path,
    server: Option<String>,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let wav = tokio::fs::read(path).await?;
    let client = AudioUploadClient::new(AudioUploadConfig::resolve(server));
    client.upload(wav).await?;
    println!("uploaded {}", path.display());
    Ok(ExitCode::Success)
}

async fn open_store(db: &str, key: String) -> Result<ProgressStore, Box<dyn std::error::Error>> {
    let db_url = config::normalize_sqlite_url(db)?;
    config::prepare_sqlite_file(&db_url)?;
    debug!("opening {db_url} (key {key:?})");
    let storage = Storage::sqlite(&db_url).await?;
    Ok(ProgressStore::new(key, storage.local, Clock::system()))
}

async fn run_progress(
    store: &ProgressStore,
    command: ProgressCommand,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let code = match command {
        ProgressCommand::Show => {
            let session = store.get_or_create().await?;
            let pages: Vec<String> = session.easy_pages().iter().map(ToString::to_string).collect();
            println!("easy pages:   [{}]", pages.join(", "));
            println!("created at:   {}", session.created_at());
            println!("last updated: {}", session.last_updated());
            ExitCode::Success
        }
        ProgressCommand::Mark { page } => {
            let added = store.mark_easy(page).await?;
            if !added {
                println!("page {page} is already marked as easy");
            }
            ExitCode::from_answer(added)
        }
        ProgressCommand::Unmark { page } => {
            let removed = store.unmark_easy(page).await?;
            if !removed {
                println!("page {page} is not in the easy list");
            }
            ExitCode::from_answer(removed)
        }
        ProgressCommand::IsEasy { page } => {
            let easy = store.is_easy(page).await?;
            println!("{easy}");
            ExitCode::from_answer(easy)
        }
        ProgressCommand::Next { current, bound } => {
            match store.next_page(current, bound.max_pages).await? {
                Some(next) => {
                    println!("{next}");
                    ExitCode::Success
                }
                None => {
                    println!("all pages are marked as easy");
                    ExitCode::Negative
                }
            }
        }
        ProgressCommand::Stats { bound } => {
            let stats = store.statistics(bound.max_pages).await?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
            if let Some(note) = completion_note(&stats) {
                eprintln!("{note}");
            }
            ExitCode::Success
        }
        ProgressCommand::Reset => {
            store.reset().await?;
            println!("session reset");
            ExitCode::Success
        }
        ProgressCommand::Export => {
            println!("{}", store.export().await?);
            ExitCode::Success
        }
        ProgressCommand::Import { path } => {
            let text = read_input(&path).await?;
            let imported = store.import(&text).await?;
            if !imported {
                eprintln!("{} is not a valid session export", path.display());
            }
            ExitCode::from_answer(imported)
        }
    };

    Ok(code)
}

async fn run(cli: Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    match cli.command {
        Command::Upload { path, server } => upload(&path, server).await,
        Command::Progress(command) => {
            let store = open_store(&cli.db, cli.key).await?;
            run_progress(&store, command).await
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose, cli.quiet);

    match run(cli).await {
        Ok(code) => std::process::exit(code.as_i32()),
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(ExitCode::Failure.as_i32());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use progress_core::model::{PageBound, PageNumber, Session};
    use progress_core::time::fixed_now;

    fn stats_for(marked: u32, max_pages: u32) -> ProgressStats {
        let mut session = Session::new(fixed_now());
        for page in 1..=marked {
            session.mark(PageNumber::new(page));
        }
        session.statistics(PageBound::new(max_pages).unwrap())
    }

    #[test]
    fn completion_note_only_when_total_reached() {
        assert_eq!(completion_note(&stats_for(4, 5)), None);
        assert_eq!(
            completion_note(&stats_for(5, 5)).as_deref(),
            Some("easy pages have reached the 5 page total")
        );
    }

    #[test]
    fn answers_map_to_exit_codes() {
        assert_eq!(ExitCode::from_answer(true).as_i32(), 0);
        assert_eq!(ExitCode::from_answer(false).as_i32(), 1);
        assert_eq!(ExitCode::Failure.as_i32(), 2);
    }
}
