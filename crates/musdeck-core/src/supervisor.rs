//! Single-playback-thread supervision.

use std::path::Path;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::channel::SharedErrorChannel;
use crate::decoder::{Decoder, DecoderFactory, FileClassifier, PlaybackContext};
use crate::error::{PlayerError, Result, CODE_DECODE_FAILED, CODE_END_OF_STREAM, CODE_NOT_PLAYABLE};
use crate::session::PlaybackSession;

/// The currently running playback operation.
struct ActivePlayback {
    handle: JoinHandle<()>,
    ctx: PlaybackContext,
}

/// Enforces "at most one active playback thread".
///
/// All file changes route through [`change_file`](Self::change_file); after
/// any call returns, exactly zero or one playback threads exist.
pub struct ThreadSupervisor {
    session: Arc<PlaybackSession>,
    channel: Arc<SharedErrorChannel>,
    classifier: Box<dyn FileClassifier>,
    factory: Box<dyn DecoderFactory>,
    active: Option<ActivePlayback>,
}

impl ThreadSupervisor {
    pub fn new(
        session: Arc<PlaybackSession>,
        channel: Arc<SharedErrorChannel>,
        classifier: Box<dyn FileClassifier>,
        factory: Box<dyn DecoderFactory>,
    ) -> Self {
        Self {
            session,
            channel,
            classifier,
            factory,
            active: None,
        }
    }

    /// Stop the currently playing file (if there is one) and play another.
    ///
    /// Any prior playback thread is asked to stop and joined *without a
    /// timeout* before anything else happens; a decoder that never observes
    /// its stop request hangs this call (see the [`Decoder`] contract).
    ///
    /// `None` stops playback and returns; used for shutdown or an explicit
    /// "stop only".
    pub fn change_file(&mut self, path: Option<&Path>) -> Result<()> {
        self.stop_current();

        let Some(path) = path else {
            return Ok(());
        };

        // Validation failures are posted to the channel so the watchdog
        // surfaces them; no thread is started.
        if let Err(err) = self.classifier.is_playable(path) {
            self.channel.post(CODE_NOT_PLAYABLE);
            return Err(err);
        }

        // An overlong path is reported synchronously to the caller only.
        self.session.set_path(&path.to_string_lossy())?;
        self.session.reset_progress();

        let mut decoder = self.factory.open(path)?;
        let ctx = PlaybackContext::new(Arc::clone(&self.session));

        let thread_ctx = ctx.clone();
        let thread_channel = Arc::clone(&self.channel);
        let handle = thread::Builder::new()
            .name("playback".to_string())
            .spawn(move || {
                run_playback(decoder.as_mut(), &thread_ctx, &thread_channel);
            })
            .map_err(|source| PlayerError::ThreadSpawn { source })?;

        self.active = Some(ActivePlayback { handle, ctx });
        Ok(())
    }

    /// Stop and join the active playback thread, if any.
    fn stop_current(&mut self) {
        if let Some(active) = self.active.take() {
            active.ctx.request_stop();
            active
                .handle
                .join()
                .expect("playback thread panicked during stop");
        }
    }

    /// Flip pause on the active playback, returning the new paused state.
    /// `None` when nothing is playing.
    pub fn toggle_pause(&mut self) -> Option<bool> {
        if !self.is_playing() {
            return None;
        }
        self.active.as_ref().map(|active| active.ctx.toggle_pause())
    }

    /// True while a playback thread exists and has not yet terminated.
    pub fn is_playing(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| !active.handle.is_finished())
    }
}

impl Drop for ThreadSupervisor {
    fn drop(&mut self) {
        self.stop_current();
    }
}

/// Playback thread body: run the decoder and post its outcome exactly once.
///
/// A requested stop and a natural end of stream both post the
/// end-of-stream sentinel; the control loop distinguishes them by whether it
/// initiated the stop itself.
fn run_playback(decoder: &mut dyn Decoder, ctx: &PlaybackContext, channel: &SharedErrorChannel) {
    let code = match decoder.run(ctx) {
        Ok(()) => CODE_END_OF_STREAM,
        Err(code) if code > 0 => code,
        Err(_) => CODE_DECODE_FAILED,
    };
    channel.post(code);
}
