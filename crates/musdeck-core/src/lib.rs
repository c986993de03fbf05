//! Control plane for the musdeck console music player.
//!
//! This crate owns the coordination logic that sits between a terminal
//! frontend and the audio/filesystem collaborators:
//!
//! - [`InputDebouncer`]: turns raw per-frame button samples into discrete
//!   transport commands (combo pause, triple-press skip)
//! - [`DirectoryBrowser`]: listing, pagination window and bounded
//!   navigation history over a file hierarchy
//! - [`ThreadSupervisor`]: at-most-one active playback thread
//! - [`ErrorWatchdog`]: observer thread forwarding asynchronous playback
//!   failures to the presentation layer
//! - [`SharedErrorChannel`] / [`PlaybackSession`]: the only state shared
//!   across threads
//!
//! Audio decoding, file-type sniffing and directory enumeration are consumed
//! through the traits in [`decoder`] and [`browser`]; this crate performs no
//! I/O of its own beyond those seams.

pub mod browser;
pub mod channel;
pub mod decoder;
pub mod error;
pub mod input;
pub mod session;
pub mod supervisor;
pub mod watchdog;

pub use browser::{
    DirEntryInfo, DirectoryBrowser, DirectoryListing, DirectorySource, Entry, NavigationFrame,
    NavigationStack,
};
pub use channel::SharedErrorChannel;
pub use decoder::{Decoder, DecoderFactory, FileClassifier, PlaybackContext};
pub use error::{describe_code, PlayerError, Result, CODE_END_OF_STREAM};
pub use input::{Buttons, Command, FrameInput, InputDebouncer};
pub use session::PlaybackSession;
pub use supervisor::ThreadSupervisor;
pub use watchdog::{ErrorWatchdog, MessageSink};

/// Presses of one trigger button required for a skip.
pub const MAX_PRESSES: usize = 3;

/// All presses of a triple must fall within this window (milliseconds).
pub const DEBOUNCE_WINDOW_MS: u64 = 500;

/// Minimum spacing between two accepted skips, shared across all four
/// trigger buttons (milliseconds).
pub const SKIP_COOLDOWN_MS: u64 = 1000;

/// Navigation history depth; ascending past this many saved levels lands on
/// a default frame.
pub const MAX_DIRECTORIES: usize = 10;

/// Upper bound for a path copied into the playback session.
pub const MAX_PATH_LEN: usize = 1024;
