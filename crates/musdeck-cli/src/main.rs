//! musdeck, a console music player.
//!
//! Browses a directory tree, plays files through rodio, and drives everything
//! from console-pad style button input:
//! - triple-press previous/next with a debounce window and global cooldown
//! - two-button pause/help combos
//! - bounded navigation history across directory descent/ascent

mod app;
mod args;
mod config;
mod keyboard;
mod media;
mod ui;

use std::io::{self, stdout};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use crossterm::{
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use musdeck_core::{ErrorWatchdog, PlaybackSession, SharedErrorChannel, ThreadSupervisor};
use ratatui::{backend::CrosstermBackend, Terminal};

use app::{App, MessageLog};
use args::CliArgs;
use config::Config;
use keyboard::KeyboardSampler;
use media::{ExtensionClassifier, FsDirectorySource, RodioFactory};

fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    if args.show_help {
        CliArgs::print_help();
        return Ok(());
    }

    let mut config = Config::load().unwrap_or_default();
    if let Some(root) = args.root {
        config.music_root = PathBuf::from(root);
    }
    if let Some(rows) = args.rows {
        config.page_rows = rows;
    }
    if let Some(log_file) = args.log_file {
        config.log_file = PathBuf::from(log_file);
    }

    init_logging(&config.log_file)?;
    tracing::info!(root = %config.music_root.display(), "musdeck starting");

    let session = Arc::new(PlaybackSession::new());
    let channel = Arc::new(SharedErrorChannel::new());
    let messages = Arc::new(MessageLog::new());

    // The watchdog forwards asynchronous playback failures into the message
    // pane; the raw-mode terminal cannot take eprintln.
    let watchdog_messages = Arc::clone(&messages);
    let watchdog = ErrorWatchdog::spawn(Arc::clone(&channel), move |code: i32, message: &str| {
        tracing::warn!(code, detail = message, "playback error");
        watchdog_messages.push(message);
    });

    let browser = musdeck_core::DirectoryBrowser::new(
        Box::new(FsDirectorySource),
        config.music_root.clone(),
        config.page_rows,
    )
    .with_context(|| format!("cannot open music root {}", config.music_root.display()))?;

    let supervisor = ThreadSupervisor::new(
        Arc::clone(&session),
        Arc::clone(&channel),
        Box::new(ExtensionClassifier),
        Box::new(RodioFactory),
    );

    // Terminal setup; release reporting when the terminal supports it.
    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen)?;
    let release_events = supports_keyboard_enhancement().unwrap_or(false);
    if release_events {
        execute!(
            stdout(),
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )?;
    }

    // Restore the terminal even on panic.
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        restore_terminal(release_events);
        original_hook(panic_info);
    }));

    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(
        browser,
        supervisor,
        KeyboardSampler::new(release_events),
        Arc::clone(&channel),
        session,
        messages,
    );
    let result = app.run(&mut terminal);

    // Cleanup runs on every exit path: stop playback, stop the watchdog,
    // hand the terminal back.
    app.shutdown();
    watchdog.shutdown();
    let _ = std::panic::take_hook();
    restore_terminal(release_events);

    tracing::info!("musdeck stopped");
    result
}

/// Safe to call multiple times; errors during restore are ignored.
fn restore_terminal(release_events: bool) {
    if release_events {
        let _ = execute!(io::stdout(), PopKeyboardEnhancementFlags);
    }
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen);
}

/// File-writer tracing setup; `RUST_LOG` overrides the default level.
fn init_logging(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open log file {}", path.display()))?;

    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(filter.as_str())
        .with_ansi(false)
        .init();
    Ok(())
}
