//! Frame-driven control loop tying input, browsing and playback together.

use std::collections::VecDeque;
use std::io::Stdout;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event};
use musdeck_core::error::CODE_END_OF_STREAM;
use musdeck_core::{
    Buttons, Command, DirectoryBrowser, FrameInput, InputDebouncer, PlaybackSession, PlayerError,
    SharedErrorChannel, ThreadSupervisor,
};
use parking_lot::Mutex;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use crate::keyboard::KeyboardSampler;
use crate::ui;

/// Holding a browse key repeats its movement at this interval.
const HOLD_REPEAT_MS: u64 = 500;

/// ~30 FPS.
const FRAME_DURATION: Duration = Duration::from_millis(33);

/// Lines kept in the message pane.
const MAX_MESSAGES: usize = 50;

/// Shared append-only message pane, fed by the control loop and the watchdog
/// thread.
pub struct MessageLog {
    lines: Mutex<VecDeque<String>>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self {
            lines: Mutex::new(VecDeque::new()),
        }
    }

    pub fn push(&self, line: impl Into<String>) {
        let mut lines = self.lines.lock();
        if lines.len() == MAX_MESSAGES {
            lines.pop_front();
        }
        lines.push_back(line.into());
    }

    /// Most recent `count` lines, oldest first.
    pub fn tail(&self, count: usize) -> Vec<String> {
        let lines = self.lines.lock();
        lines
            .iter()
            .skip(lines.len().saturating_sub(count))
            .cloned()
            .collect()
    }
}

impl Default for MessageLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Control-loop state. Once fatal, only the exit key works; shutting down
/// ends the loop at the top of the next frame.
pub enum AppState {
    Browsing,
    FatalError(String),
    ShuttingDown,
}

/// Movement key currently being held, with the time of its last repeat.
struct HoldRepeat {
    button: Buttons,
    last_move_ms: u64,
}

pub struct App {
    pub(crate) browser: DirectoryBrowser,
    supervisor: ThreadSupervisor,
    debouncer: InputDebouncer,
    keyboard: KeyboardSampler,
    channel: Arc<SharedErrorChannel>,
    pub(crate) session: Arc<PlaybackSession>,
    pub(crate) messages: Arc<MessageLog>,
    pub(crate) state: AppState,
    pub(crate) paused: bool,
    started: Instant,
    hold: Option<HoldRepeat>,
}

impl App {
    pub fn new(
        browser: DirectoryBrowser,
        supervisor: ThreadSupervisor,
        keyboard: KeyboardSampler,
        channel: Arc<SharedErrorChannel>,
        session: Arc<PlaybackSession>,
        messages: Arc<MessageLog>,
    ) -> Self {
        Self {
            browser,
            supervisor,
            debouncer: InputDebouncer::new(),
            keyboard,
            channel,
            session,
            messages,
            state: AppState::Browsing,
            paused: false,
            started: Instant::now(),
            hold: None,
        }
    }

    pub(crate) fn is_playing(&self) -> bool {
        self.supervisor.is_playing()
    }

    /// Run until the user exits. The caller owns terminal setup/teardown.
    pub fn run(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> anyhow::Result<()> {
        loop {
            let frame_start = Instant::now();

            if event::poll(Duration::from_millis(10))? {
                if let Event::Key(key) = event::read()? {
                    let now_ms = self.started.elapsed().as_millis() as u64;
                    self.keyboard.handle_key(&key, now_ms);
                }
            }

            let now_ms = self.started.elapsed().as_millis() as u64;
            let frame = self.keyboard.sample(now_ms);

            match &self.state {
                AppState::Browsing => self.step_browsing(&frame),
                AppState::FatalError(_) => {
                    if frame.down.contains(Buttons::START) {
                        self.state = AppState::ShuttingDown;
                    }
                }
                AppState::ShuttingDown => {}
            }

            if matches!(self.state, AppState::ShuttingDown) {
                break;
            }

            terminal.draw(|f| ui::draw(f, self))?;

            let frame_time = frame_start.elapsed();
            if frame_time < FRAME_DURATION {
                std::thread::sleep(FRAME_DURATION - frame_time);
            }
        }
        Ok(())
    }

    /// Stop playback on the way out. Safe to call once the loop has ended.
    pub fn shutdown(&mut self) {
        let _ = self.supervisor.change_file(None);
    }

    fn step_browsing(&mut self, frame: &FrameInput) {
        if frame.down.contains(Buttons::START) {
            self.state = AppState::ShuttingDown;
            return;
        }

        // Combos and skips consume the whole frame.
        if let Some(command) = self.debouncer.step(frame) {
            match command {
                Command::TogglePause => self.toggle_pause(),
                Command::ShowControls => self.show_controls(),
                Command::SkipPrev => self.skip(false),
                Command::SkipNext => self.skip(true),
            }
            return;
        }

        self.browse_movement(frame);

        if frame.down.contains(Buttons::A) {
            if self.browser.cursor_on_parent_link() {
                self.ascend();
            } else if self.browser.cursor_on_dir() {
                self.descend();
            } else if self.browser.cursor_on_file() {
                self.play_selected();
            }
        } else if frame.down.contains(Buttons::B) {
            self.ascend();
        }

        // A track ended on its own; move to the next one if the cursor still
        // sits on a file.
        if self.channel.peek() == CODE_END_OF_STREAM {
            self.channel.take();
            if let Some(target) = self.browser.auto_advance_target() {
                self.browser.set_cursor(target);
                self.play_selected();
            } else {
                self.paused = false;
                self.messages.push("End of playlist");
            }
        }
    }

    /// Cursor movement: act on the down edge, then repeat every
    /// `HOLD_REPEAT_MS` while the key stays held.
    fn browse_movement(&mut self, frame: &FrameInput) {
        const MOVES: [Buttons; 4] = [Buttons::UP, Buttons::DOWN, Buttons::LEFT, Buttons::RIGHT];

        if let Some(hold) = &self.hold {
            if !frame.held.contains(hold.button) {
                self.hold = None;
            }
        }

        for button in MOVES {
            let fresh = frame.down.contains(button);
            let repeat = !fresh
                && frame.held.contains(button)
                && self.hold.as_ref().is_some_and(|hold| {
                    hold.button == button
                        && frame.now_ms.saturating_sub(hold.last_move_ms) >= HOLD_REPEAT_MS
                });
            if !(fresh || repeat) {
                continue;
            }

            if button == Buttons::UP {
                self.browser.move_up();
            } else if button == Buttons::DOWN {
                self.browser.move_down();
            } else if button == Buttons::LEFT {
                self.browser.page_back();
            } else {
                self.browser.page_forward();
            }
            self.hold = Some(HoldRepeat {
                button,
                last_move_ms: frame.now_ms,
            });
            return;
        }
    }

    fn toggle_pause(&mut self) {
        match self.supervisor.toggle_pause() {
            Some(true) => {
                self.paused = true;
                self.messages.push("Paused");
            }
            Some(false) => {
                self.paused = false;
                self.messages.push("Playing");
            }
            None => {}
        }
    }

    fn show_controls(&mut self) {
        for line in [
            "Controls:",
            "  Up/Down       move the cursor, hold to repeat",
            "  Left/Right    jump a page back/forward",
            "  Enter or a    play file / enter directory",
            "  Backspace/b   parent directory",
            "  [ x3 / ] x3   previous / next track",
            "  [ + ]         pause / resume",
            "  q or Esc      quit",
        ] {
            self.messages.push(line);
        }
    }

    fn skip(&mut self, forward: bool) {
        if let Some(target) = self.browser.skip_target(forward) {
            self.browser.set_cursor(target);
            self.play_selected();
        }
    }

    fn play_selected(&mut self) {
        let Some(path) = self.browser.entry_path(self.browser.cursor()) else {
            return;
        };
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());

        match self.supervisor.change_file(Some(&path)) {
            Ok(()) => {
                self.paused = false;
                tracing::info!(path = %path.display(), "playing");
                self.messages.push(format!("Playing: {name}"));
            }
            // Validation failures reach the pane through the watchdog;
            // everything else is reported here.
            Err(PlayerError::NotPlayable { .. }) => {
                tracing::debug!(path = %path.display(), "not playable");
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "change_file failed");
                self.messages.push(err.to_string());
            }
        }

        // Stopping the previous track posted the end-of-stream sentinel;
        // consume it so this frame's end-of-track check does not mistake the
        // stop for a natural end and advance again.
        if self.channel.peek() == CODE_END_OF_STREAM {
            self.channel.take();
        }
    }

    fn descend(&mut self) {
        if let Err(err) = self.browser.descend() {
            self.fatal(err);
        }
    }

    fn ascend(&mut self) {
        if let Err(err) = self.browser.ascend() {
            self.fatal(err);
        }
    }

    fn fatal(&mut self, err: PlayerError) {
        tracing::error!(error = %err, "directory enumeration failed");
        self.state = AppState::FatalError(err.to_string());
    }
}
