//! Collaborator traits for audio decoding and file classification.
//!
//! Decoding and resampling live entirely behind [`Decoder`]; this crate only
//! coordinates the thread that runs it.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::Result;
use crate::session::PlaybackSession;

/// Everything a playback thread shares with the control plane.
///
/// Cloned handles of one context are held by the supervisor (to stop and
/// pause) and moved into the playback thread (to observe both and report
/// progress).
#[derive(Clone)]
pub struct PlaybackContext {
    /// Progress counters and identity of the current item.
    pub session: Arc<PlaybackSession>,
    stop: Arc<AtomicBool>,
    paused: Arc<AtomicBool>,
}

impl PlaybackContext {
    pub fn new(session: Arc<PlaybackSession>) -> Self {
        Self {
            session,
            stop: Arc::new(AtomicBool::new(false)),
            paused: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Ask the playback thread to stop. Cooperative: the decoder contract
    /// requires the flag to be observed within a bounded time.
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    pub fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    /// Flip the pause flag, returning `true` if playback is now paused.
    pub fn toggle_pause(&self) -> bool {
        !self.paused.fetch_xor(true, Ordering::Relaxed)
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Relaxed)
    }
}

/// A running decode operation, executed on the playback thread.
///
/// # Contract
///
/// - report `samples_per_second` on the context's session once known, set
///   `samples_total` when the duration is known (leave 0 when streaming),
///   and increment `samples_played` as decoding progresses;
/// - poll [`PlaybackContext::stop_requested`] and return within a bounded
///   time of it becoming true; the supervisor joins the playback thread
///   without a timeout, so a decoder that ignores the flag hangs the next
///   file change;
/// - honor [`PlaybackContext::is_paused`] by suspending output (position
///   keeps);
/// - return `Ok(())` for a natural end of stream *and* for a requested stop,
///   `Err(code)` with a positive error kind otherwise. The supervisor owns
///   posting the result to the shared channel, exactly once.
pub trait Decoder: Send {
    fn run(&mut self, ctx: &PlaybackContext) -> std::result::Result<(), i32>;
}

/// Opens a [`Decoder`] for a validated path.
pub trait DecoderFactory: Send + Sync {
    fn open(&self, path: &Path) -> Result<Box<dyn Decoder>>;
}

/// Classifies a path as playable or not (low-level sniffing lives behind
/// this seam).
pub trait FileClassifier: Send + Sync {
    /// `Ok(())` when `path` resolves to a playable item.
    fn is_playable(&self, path: &Path) -> Result<()>;
}
