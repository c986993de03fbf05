//! Error handling for the musdeck control plane.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Convenient result alias for control-plane operations.
pub type Result<T> = std::result::Result<T, PlayerError>;

/// Errors surfaced synchronously by the control plane.
///
/// Decode-time failures never appear here; the playback thread reports them
/// through the [`SharedErrorChannel`](crate::SharedErrorChannel) as integer
/// codes (see the `CODE_*` constants) and the watchdog renders them with
/// [`describe_code`].
#[derive(Debug, Error)]
pub enum PlayerError {
    /// The selected path is not a playable item.
    #[error("not a playable file: {}", path.display())]
    NotPlayable {
        /// Path that failed classification.
        path: PathBuf,
    },
    /// A selected path exceeds the session's fixed buffer length.
    /// Truncation is a hard failure, never silent.
    #[error("file path too long ({len} bytes, limit {max})")]
    PathTooLong {
        /// Length of the offending path in bytes.
        len: usize,
        /// Configured limit.
        max: usize,
    },
    /// The working directory could not be enumerated. Fatal to the current
    /// screen: the control loop halts into its terminal error state.
    #[error("unable to read directory {}: {source}", path.display())]
    DirectoryRead {
        /// Directory that failed to enumerate.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// A decoder could not be opened for a validated path.
    #[error("decoder error: {msg}")]
    Decoder {
        /// Human-readable explanation from the decoder collaborator.
        msg: String,
    },
    /// The OS refused to start the playback thread.
    #[error("failed to start playback thread: {source}")]
    ThreadSpawn {
        /// Underlying I/O error.
        source: io::Error,
    },
}

impl From<String> for PlayerError {
    fn from(msg: String) -> Self {
        PlayerError::Decoder { msg }
    }
}

impl From<&str> for PlayerError {
    fn from(msg: &str) -> Self {
        PlayerError::Decoder {
            msg: msg.to_string(),
        }
    }
}

/// Sentinel posted by the playback thread when a track ends normally.
/// Not a fault; it drives auto-advance.
pub const CODE_END_OF_STREAM: i32 = -1;

/// Selected path failed playability validation.
pub const CODE_NOT_PLAYABLE: i32 = 1;

/// Decoder could not open the stream.
pub const CODE_OPEN_FAILED: i32 = 2;

/// Decoder failed mid-stream.
pub const CODE_DECODE_FAILED: i32 = 3;

/// Audio output device was lost or could not be acquired.
pub const CODE_OUTPUT_FAILED: i32 = 4;

/// Map a channel error code to a human-readable message.
///
/// Unknown codes map to a generic message; the watchdog must never fail on
/// a malformed code.
pub fn describe_code(code: i32) -> &'static str {
    match code {
        CODE_NOT_PLAYABLE => "file is not playable",
        CODE_OPEN_FAILED => "unable to open file for playback",
        CODE_DECODE_FAILED => "playback failed while decoding",
        CODE_OUTPUT_FAILED => "audio output unavailable",
        _ => "unknown playback error",
    }
}
