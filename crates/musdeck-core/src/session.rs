//! Identity and progress of the item currently selected for playback.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::error::{PlayerError, Result};
use crate::MAX_PATH_LEN;

/// Identity and progress counters for the current playback operation.
///
/// The identity field is set by the supervisor only while no playback thread
/// is active. The progress counters are written by the active playback thread
/// and read by the control thread without locking: each field has exactly one
/// producer, and consistency across the three fields is not required
/// frame-to-frame (a torn read showing a stale total with a fresh played
/// count is tolerable for a progress display).
pub struct PlaybackSession {
    path: Mutex<String>,
    samples_total: AtomicU64,
    samples_played: AtomicU64,
    samples_per_second: AtomicU64,
}

impl PlaybackSession {
    pub fn new() -> Self {
        Self {
            path: Mutex::new(String::new()),
            samples_total: AtomicU64::new(0),
            samples_played: AtomicU64::new(0),
            samples_per_second: AtomicU64::new(0),
        }
    }

    /// Copy `path` into the session's bounded buffer.
    ///
    /// Overflow is a hard failure, not silent truncation.
    pub fn set_path(&self, path: &str) -> Result<()> {
        if path.len() > MAX_PATH_LEN {
            return Err(PlayerError::PathTooLong {
                len: path.len(),
                max: MAX_PATH_LEN,
            });
        }
        *self.path.lock() = path.to_string();
        Ok(())
    }

    pub fn path(&self) -> String {
        self.path.lock().clone()
    }

    /// Zero all three progress counters. Called on every file change before
    /// the new playback thread starts.
    pub fn reset_progress(&self) {
        self.samples_total.store(0, Ordering::Relaxed);
        self.samples_played.store(0, Ordering::Relaxed);
        self.samples_per_second.store(0, Ordering::Relaxed);
    }

    /// Report the stream's sample rate once known (0 = still unknown).
    pub fn set_samples_per_second(&self, rate: u64) {
        self.samples_per_second.store(rate, Ordering::Relaxed);
    }

    /// Report total stream length in samples (0 = unknown/streaming).
    pub fn set_samples_total(&self, total: u64) {
        self.samples_total.store(total, Ordering::Relaxed);
    }

    /// Advance the played-samples counter.
    pub fn add_samples_played(&self, count: u64) {
        self.samples_played.fetch_add(count, Ordering::Relaxed);
    }

    pub fn samples_per_second(&self) -> u64 {
        self.samples_per_second.load(Ordering::Relaxed)
    }

    pub fn samples_played(&self) -> u64 {
        self.samples_played.load(Ordering::Relaxed)
    }

    pub fn samples_total(&self) -> u64 {
        self.samples_total.load(Ordering::Relaxed)
    }

    /// Format elapsed (and, when the total is known, total) playback time as
    /// `HH:MM:SS[ / HH:MM:SS]`. Returns `None` while the sample rate is
    /// still unreported, avoiding a divide by zero.
    pub fn format_progress(&self) -> Option<String> {
        let rate = self.samples_per_second();
        if rate == 0 {
            return None;
        }

        let played = format_clock(self.samples_played() / rate);
        let total = self.samples_total();
        if total == 0 {
            Some(played)
        } else {
            Some(format!("{} / {}", played, format_clock(total / rate)))
        }
    }
}

impl Default for PlaybackSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Format whole seconds as HH:MM:SS.
fn format_clock(seconds: u64) -> String {
    let hr = seconds / 3600;
    let min = (seconds % 3600) / 60;
    let sec = seconds % 60;
    format!("{:02}:{:02}:{:02}", hr, min, sec)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_hidden_until_rate_known() {
        let session = PlaybackSession::new();
        session.add_samples_played(44100);
        assert_eq!(session.format_progress(), None);
    }

    #[test]
    fn progress_without_total_shows_elapsed_only() {
        let session = PlaybackSession::new();
        session.set_samples_per_second(44100);
        session.add_samples_played(44100 * 61);
        assert_eq!(session.format_progress().as_deref(), Some("00:01:01"));
    }

    #[test]
    fn progress_with_total_shows_both_clocks() {
        let session = PlaybackSession::new();
        session.set_samples_per_second(48000);
        session.add_samples_played(48000 * 3661);
        session.set_samples_total(48000 * 7200);
        assert_eq!(
            session.format_progress().as_deref(),
            Some("01:01:01 / 02:00:00")
        );
    }

    #[test]
    fn overlong_path_is_rejected_not_truncated() {
        let session = PlaybackSession::new();
        let long = "x".repeat(MAX_PATH_LEN + 1);
        assert!(matches!(
            session.set_path(&long),
            Err(PlayerError::PathTooLong { .. })
        ));
        assert_eq!(session.path(), "");
    }

    #[test]
    fn reset_zeroes_all_counters() {
        let session = PlaybackSession::new();
        session.set_samples_per_second(44100);
        session.set_samples_total(1000);
        session.add_samples_played(500);
        session.reset_progress();
        assert_eq!(session.samples_per_second(), 0);
        assert_eq!(session.samples_total(), 0);
        assert_eq!(session.samples_played(), 0);
    }
}
