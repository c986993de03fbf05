//! Command-line argument parsing for the musdeck binary.
//!
//! Flags override the config file; a bare positional argument is taken as
//! the music root directory.

use std::env;

/// Parsed command-line arguments.
#[derive(Debug, Default)]
pub struct CliArgs {
    /// Music root directory override.
    pub root: Option<String>,
    /// Listing rows per page override.
    pub rows: Option<usize>,
    /// Log file path override.
    pub log_file: Option<String>,
    /// Whether help was requested.
    pub show_help: bool,
}

impl CliArgs {
    /// Parse arguments from the command line.
    pub fn parse() -> Self {
        Self::parse_from(env::args().skip(1))
    }

    fn parse_from(args: impl Iterator<Item = String>) -> Self {
        let mut parsed = Self::default();
        let mut iter = args;

        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--help" | "-h" => {
                    parsed.show_help = true;
                }
                "--rows" => {
                    match iter.next().and_then(|v| v.parse::<usize>().ok()) {
                        Some(rows) if rows > 0 => parsed.rows = Some(rows),
                        _ => {
                            eprintln!("--rows requires a positive number");
                            parsed.show_help = true;
                        }
                    }
                }
                "--log" => {
                    if let Some(value) = iter.next() {
                        parsed.log_file = Some(value);
                    } else {
                        eprintln!("--log requires a file path");
                        parsed.show_help = true;
                    }
                }
                _ if arg.starts_with('-') => {
                    eprintln!("Unknown flag: {}", arg);
                    parsed.show_help = true;
                }
                _ => {
                    parsed.root = Some(arg);
                }
            }
        }

        parsed
    }

    /// Print help text to stderr.
    pub fn print_help() {
        eprintln!(
            "Usage:\n  musdeck [--rows <n>] [--log <file>] [directory]\n\n\
             Flags:\n\
             \x20 --rows <n>     Listing rows per page (default from config)\n\
             \x20 --log <file>   Log file path\n\
             \x20 -h, --help     Show this help\n\n\
             Keys:\n\
             \x20 Up/Down        Move the cursor, hold to repeat\n\
             \x20 Left/Right     Jump a page back/forward\n\
             \x20 Enter or a     Play file / enter directory\n\
             \x20 Backspace or b Go to the parent directory\n\
             \x20 [ x3 / ] x3    Previous / next track (triple-press)\n\
             \x20 [ + ]          Pause / resume\n\
             \x20 [ + Left       Show the controls help\n\
             \x20 q or Esc       Quit\n"
        );
    }
}
