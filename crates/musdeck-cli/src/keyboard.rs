//! Maps crossterm key events onto per-frame button samples.
//!
//! The control plane wants console-pad style down/held/up sets every frame.
//! Terminals that support the keyboard enhancement protocol report real key
//! releases; everywhere else a held key is expired after a quiet window once
//! its autorepeat stream stops.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use musdeck_core::{Buttons, FrameInput};

/// Without release reporting, a key still counts as held this long after its
/// last press/repeat event. Longer than any common autorepeat initial delay.
const HELD_EXPIRY_MS: u64 = 600;

/// Translate a key code to its button, if it is bound.
fn map_key(code: KeyCode) -> Option<Buttons> {
    match code {
        KeyCode::Up => Some(Buttons::UP),
        KeyCode::Down => Some(Buttons::DOWN),
        KeyCode::Left => Some(Buttons::LEFT),
        KeyCode::Right => Some(Buttons::RIGHT),
        KeyCode::Enter | KeyCode::Char('a') => Some(Buttons::A),
        KeyCode::Backspace | KeyCode::Char('b') => Some(Buttons::B),
        KeyCode::Esc | KeyCode::Char('q') => Some(Buttons::START),
        KeyCode::Char('[') => Some(Buttons::L),
        KeyCode::Char(']') => Some(Buttons::R),
        KeyCode::Char(',') => Some(Buttons::ZL),
        KeyCode::Char('.') => Some(Buttons::ZR),
        _ => None,
    }
}

/// Accumulates key events between frames and emits one [`FrameInput`] per
/// frame.
pub struct KeyboardSampler {
    /// Buttons currently held, with the time of their last key event.
    held: Vec<(Buttons, u64)>,
    pending_down: Buttons,
    pending_up: Buttons,
    /// Whether the terminal reports key releases.
    release_events: bool,
}

impl KeyboardSampler {
    pub fn new(release_events: bool) -> Self {
        Self {
            held: Vec::new(),
            pending_down: Buttons::empty(),
            pending_up: Buttons::empty(),
            release_events,
        }
    }

    /// Feed one key event, timestamped with the frame clock.
    pub fn handle_key(&mut self, key: &KeyEvent, now_ms: u64) {
        let Some(button) = map_key(key.code) else {
            return;
        };

        match key.kind {
            KeyEventKind::Press => {
                if let Some(entry) = self.held.iter_mut().find(|(b, _)| *b == button) {
                    entry.1 = now_ms;
                } else {
                    self.held.push((button, now_ms));
                    self.pending_down |= button;
                }
            }
            KeyEventKind::Repeat => {
                if let Some(entry) = self.held.iter_mut().find(|(b, _)| *b == button) {
                    entry.1 = now_ms;
                }
            }
            KeyEventKind::Release => {
                self.held.retain(|(b, _)| *b != button);
                self.pending_up |= button;
            }
        }
    }

    /// Produce the frame's button sets and reset the edge accumulators.
    pub fn sample(&mut self, now_ms: u64) -> FrameInput {
        if !self.release_events {
            // Synthesize releases for keys whose autorepeat stream stopped.
            let mut expired = Buttons::empty();
            self.held.retain(|(button, last_seen)| {
                if now_ms.saturating_sub(*last_seen) > HELD_EXPIRY_MS {
                    expired |= *button;
                    false
                } else {
                    true
                }
            });
            self.pending_up |= expired;
        }

        let mut held = Buttons::empty();
        for (button, _) in &self.held {
            held |= *button;
        }

        let frame = FrameInput {
            down: self.pending_down,
            held,
            up: self.pending_up,
            now_ms,
        };
        self.pending_down = Buttons::empty();
        self.pending_up = Buttons::empty();
        frame
    }
}
