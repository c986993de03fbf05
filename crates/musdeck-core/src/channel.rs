//! Shared failure channel between the playback thread and its observers.

use parking_lot::{Condvar, Mutex};

/// Error code plus a one-shot failure event.
///
/// The playback thread is the only writer; the watchdog thread and the
/// control loop's end-of-track check both read. Writing the code and raising
/// the event go through the same mutex, so a reader woken by [`wait_and_clear`]
/// always observes the code that accompanied the raise.
///
/// Both readers clear what they read independently; there is no exclusive-
/// consumption guarantee across the two. Each only wants the most recent
/// code, so a race between the watchdog's drain and the control loop's check
/// is acceptable.
///
/// [`wait_and_clear`]: SharedErrorChannel::wait_and_clear
pub struct SharedErrorChannel {
    state: Mutex<ChannelState>,
    cond: Condvar,
}

struct ChannelState {
    /// 0 = none, -1 = ended normally, >0 = an error kind.
    code: i32,
    /// One-shot event flag, cleared by the woken waiter.
    raised: bool,
}

impl SharedErrorChannel {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ChannelState {
                code: 0,
                raised: false,
            }),
            cond: Condvar::new(),
        }
    }

    /// Write `code` and raise the event in one step.
    ///
    /// The playback thread calls this exactly once per playback operation,
    /// on termination or validation failure.
    pub fn post(&self, code: i32) {
        let mut state = self.state.lock();
        state.code = code;
        state.raised = true;
        drop(state);
        self.cond.notify_all();
    }

    /// Raise the event without touching the code. Used at shutdown to
    /// unblock the watchdog after the keep-running flag is cleared.
    pub fn raise(&self) {
        let mut state = self.state.lock();
        state.raised = true;
        drop(state);
        self.cond.notify_all();
    }

    /// Block until the event is raised, then clear it. The code is left in
    /// place for [`take`](Self::take).
    pub fn wait_and_clear(&self) {
        let mut state = self.state.lock();
        while !state.raised {
            self.cond.wait(&mut state);
        }
        state.raised = false;
    }

    /// Read the current code and reset it to 0.
    pub fn take(&self) -> i32 {
        let mut state = self.state.lock();
        std::mem::take(&mut state.code)
    }

    /// Read the current code without clearing it.
    pub fn peek(&self) -> i32 {
        self.state.lock().code
    }
}

impl Default for SharedErrorChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn take_clears_the_code() {
        let channel = SharedErrorChannel::new();
        channel.post(3);
        assert_eq!(channel.take(), 3);
        assert_eq!(channel.take(), 0);
    }

    #[test]
    fn wait_observes_code_posted_before_the_raise() {
        let channel = Arc::new(SharedErrorChannel::new());
        let writer = Arc::clone(&channel);

        let handle = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            writer.post(2);
        });

        channel.wait_and_clear();
        assert_eq!(channel.take(), 2);
        handle.join().unwrap();
    }

    #[test]
    fn raise_without_post_leaves_code_untouched() {
        let channel = SharedErrorChannel::new();
        channel.raise();
        channel.wait_and_clear();
        assert_eq!(channel.take(), 0);
    }

    #[test]
    fn event_is_one_shot() {
        let channel = Arc::new(SharedErrorChannel::new());
        channel.post(1);
        channel.wait_and_clear();

        // A second wait must block until the next raise.
        let waiter = Arc::clone(&channel);
        let handle = std::thread::spawn(move || {
            waiter.wait_and_clear();
            waiter.take()
        });
        std::thread::sleep(Duration::from_millis(20));
        channel.post(4);
        assert_eq!(handle.join().unwrap(), 4);
    }
}
