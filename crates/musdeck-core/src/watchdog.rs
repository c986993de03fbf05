//! Dedicated observer thread for asynchronous playback failures.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::channel::SharedErrorChannel;
use crate::error::describe_code;

/// Presentation-layer seam for forwarded playback errors.
pub trait MessageSink: Send {
    fn playback_error(&self, code: i32, message: &str);
}

impl<F> MessageSink for F
where
    F: Fn(i32, &str) + Send,
{
    fn playback_error(&self, code: i32, message: &str) {
        self(code, message)
    }
}

/// Blocks on the failure signal for the process lifetime and forwards error
/// codes to the presentation layer without ever blocking the control loop.
///
/// The end-of-stream sentinel is left in the channel for the control loop's
/// end-of-track check; the watchdog only consumes positive error kinds.
pub struct ErrorWatchdog {
    handle: JoinHandle<()>,
    channel: Arc<SharedErrorChannel>,
    running: Arc<AtomicBool>,
}

impl ErrorWatchdog {
    /// Spawn the watchdog thread. It terminates once `shutdown` is called.
    pub fn spawn(channel: Arc<SharedErrorChannel>, sink: impl MessageSink + 'static) -> Self {
        let running = Arc::new(AtomicBool::new(true));

        let thread_channel = Arc::clone(&channel);
        let thread_running = Arc::clone(&running);
        let handle = thread::Builder::new()
            .name("watchdog".to_string())
            .spawn(move || {
                watch_loop(&thread_channel, &thread_running, sink);
            })
            .expect("failed to spawn watchdog thread");

        Self {
            handle,
            channel,
            running,
        }
    }

    /// Clear the keep-running flag, raise the signal once so the blocked
    /// wait unblocks, and join the thread.
    pub fn shutdown(self) {
        self.running.store(false, Ordering::Relaxed);
        self.channel.raise();
        self.handle
            .join()
            .expect("watchdog thread panicked during shutdown");
    }
}

fn watch_loop(channel: &SharedErrorChannel, running: &AtomicBool, sink: impl MessageSink) {
    while running.load(Ordering::Relaxed) {
        channel.wait_and_clear();

        // Positive codes are real failures; the -1 sentinel belongs to the
        // control loop's auto-advance check and is deliberately not drained
        // here. A malformed kind still maps to a message: this thread must
        // never fail.
        if channel.peek() > 0 {
            let code = channel.take();
            sink.playback_error(code, describe_code(code));
        }
    }
}
