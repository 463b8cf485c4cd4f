//! Board Analyst - ask business questions over deal and work-order boards.

use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};

use board_analyst::app::{Analyst, NOT_SYNCED};
use board_analyst::cli::Cli;
use board_analyst::commands::{Command, CommandRouter, HELP_TEXT};
use board_analyst::config::Config;
use board_analyst::error::{AnalystError, Result};
use board_analyst::logging::{self, LogTarget};
use board_analyst::query::Answer;
use board_analyst::session::SyncReport;

#[tokio::main]
async fn main() {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse_args();

    logging::init(&LogTarget::from_flag(cli.log_file));

    if let Err(e) = run(cli).await {
        error!("{}: {}", e.category(), e);
        eprintln!("{e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let settings = Config::load_from_file(&config_path)?
        .resolve(cli.resolve_options(), |name| std::env::var(name).ok())?;

    let mut analyst = Analyst::from_settings(&settings, cli.fixtures.as_deref())?;

    print_sync_report(&analyst.sync().await);

    match cli.question.as_deref() {
        Some(question) => {
            let answer = analyst.ask(question).await;
            print_answer(&answer, cli.show_snippet);
            Ok(())
        }
        None => repl(&mut analyst, cli.show_snippet).await,
    }
}

/// Reads commands and questions from stdin until EOF or `/quit`.
async fn repl(analyst: &mut Analyst, show_snippet: bool) -> Result<()> {
    println!("Ask a question about deals or work orders. Type /help for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout()
            .flush()
            .map_err(|e| AnalystError::internal(format!("Failed to write prompt: {e}")))?;

        let Some(line) = lines
            .next_line()
            .await
            .map_err(|e| AnalystError::internal(format!("Failed to read input: {e}")))?
        else {
            break;
        };

        match CommandRouter::parse(&line) {
            Command::Empty => {}
            Command::Quit => break,
            Command::Help => println!("{HELP_TEXT}"),
            Command::Sync => print_sync_report(&analyst.sync().await),
            Command::Data { source, rows } => match analyst.preview(source, rows) {
                Some(preview) => println!("{preview}"),
                None => println!("{NOT_SYNCED}"),
            },
            Command::Question(question) => {
                let answer = analyst.ask(&question).await;
                print_answer(&answer, show_snippet);
            }
            Command::Unknown(input) => {
                println!("Unknown command: {input}. Type /help for commands.");
            }
        }
    }

    Ok(())
}

fn print_sync_report(report: &SyncReport) {
    for source in &report.sources {
        println!(
            "Synced {}: {} rows, {} columns",
            source.kind, source.rows, source.columns
        );
    }
    for (kind, warning) in report.warnings() {
        eprintln!("{kind}: {warning}");
    }
}

fn print_answer(answer: &Answer, show_snippet: bool) {
    if show_snippet {
        if let Some(snippet) = &answer.snippet {
            println!("--- plan ---\n{snippet}\n------------");
        }
    }
    println!("{}", answer.text);
}
