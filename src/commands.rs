//! Parsing of interactive input.
//!
//! Lines starting with `/` are commands; anything else is a question.

use crate::session::SourceKind;

/// Rows shown by `/data` when no count is given.
pub const DEFAULT_PREVIEW_ROWS: usize = 10;

/// Help text for the interactive loop.
pub const HELP_TEXT: &str = "\
Commands:
  /sync                     Re-fetch both boards (bypasses the cache)
  /data [work_orders] [N]   Show the first N rows of a table (default: deals, 10)
  /help                     Show this help
  /quit                     Exit
Anything else is asked as a question.";

/// One line of interactive input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// A question for the engine.
    Question(String),
    /// Force a re-sync of both boards.
    Sync,
    /// Preview the first rows of a table.
    Data { source: SourceKind, rows: usize },
    Help,
    Quit,
    /// Blank line.
    Empty,
    /// Unrecognized command or arguments, with the offending input.
    Unknown(String),
}

/// Parses user input into commands.
pub struct CommandRouter;

impl CommandRouter {
    /// Parse user input into a Command.
    pub fn parse(input: &str) -> Command {
        let input = input.trim();

        if input.is_empty() {
            return Command::Empty;
        }

        if !input.starts_with('/') {
            return Command::Question(input.to_string());
        }

        let parts: Vec<&str> = input.splitn(2, ' ').collect();
        let command = parts[0].to_lowercase();
        let args = parts.get(1).map(|s| s.trim()).unwrap_or("");

        match command.as_str() {
            "/sync" => Command::Sync,
            "/data" => Self::parse_data_command(args),
            "/help" | "/?" => Command::Help,
            "/quit" | "/exit" => Command::Quit,
            _ => Command::Unknown(command),
        }
    }

    /// Parse `/data [deals|work_orders] [N]`.
    fn parse_data_command(args: &str) -> Command {
        let mut source = SourceKind::Deals;
        let mut rows = DEFAULT_PREVIEW_ROWS;

        for token in args.split_whitespace() {
            match token.to_lowercase().as_str() {
                "deals" => source = SourceKind::Deals,
                "work_orders" | "work-orders" | "wo" => source = SourceKind::WorkOrders,
                other => match other.parse::<usize>() {
                    Ok(n) => rows = n,
                    Err(_) => return Command::Unknown(format!("/data {args}")),
                },
            }
        }

        Command::Data { source, rows }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question() {
        assert_eq!(
            CommandRouter::parse("  What is total deal value?  "),
            Command::Question("What is total deal value?".to_string())
        );
    }

    #[test]
    fn test_simple_commands() {
        assert_eq!(CommandRouter::parse("/sync"), Command::Sync);
        assert_eq!(CommandRouter::parse("/SYNC"), Command::Sync);
        assert_eq!(CommandRouter::parse("/quit"), Command::Quit);
        assert_eq!(CommandRouter::parse("/exit"), Command::Quit);
        assert_eq!(CommandRouter::parse("/help"), Command::Help);
        assert_eq!(CommandRouter::parse("   "), Command::Empty);
    }

    #[test]
    fn test_data_defaults_to_deals() {
        assert_eq!(
            CommandRouter::parse("/data"),
            Command::Data {
                source: SourceKind::Deals,
                rows: DEFAULT_PREVIEW_ROWS,
            }
        );
    }

    #[test]
    fn test_data_with_source_and_count() {
        assert_eq!(
            CommandRouter::parse("/data wo 5"),
            Command::Data {
                source: SourceKind::WorkOrders,
                rows: 5,
            }
        );
        assert_eq!(
            CommandRouter::parse("/data 3 work_orders"),
            Command::Data {
                source: SourceKind::WorkOrders,
                rows: 3,
            }
        );
    }

    #[test]
    fn test_data_with_bad_argument() {
        assert_eq!(
            CommandRouter::parse("/data invoices"),
            Command::Unknown("/data invoices".to_string())
        );
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(
            CommandRouter::parse("/sql select 1"),
            Command::Unknown("/sql".to_string())
        );
    }
}
