//! Button-state interpretation: combos and triple-press skip debouncing.
//!
//! Raw per-frame button samples come in; discrete transport commands come
//! out. Pure state machine, no I/O and no hidden statics: the control loop
//! constructs one [`InputDebouncer`] and feeds it every frame.

use bitflags::bitflags;

use crate::{DEBOUNCE_WINDOW_MS, MAX_PRESSES, SKIP_COOLDOWN_MS};

bitflags! {
    /// Physical button vocabulary, one bit per button.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Buttons: u32 {
        const L     = 1 << 0;
        const R     = 1 << 1;
        const ZL    = 1 << 2;
        const ZR    = 1 << 3;
        const UP    = 1 << 4;
        const DOWN  = 1 << 5;
        const LEFT  = 1 << 6;
        const RIGHT = 1 << 7;
        const A     = 1 << 8;
        const B     = 1 << 9;
        const START = 1 << 10;
    }
}

/// One frame's worth of input: buttons that went down this frame, buttons
/// currently held, buttons released this frame, and a monotonic timestamp.
/// The three sets use disjoint semantics, not disjoint bits: a button that
/// went down this frame appears in both `down` and `held`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameInput {
    pub down: Buttons,
    pub held: Buttons,
    pub up: Buttons,
    pub now_ms: u64,
}

/// Discrete transport command produced by the debouncer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Pause or resume the current playback (L+R, ZL+ZR, L+Up or ZL+Up).
    TogglePause,
    /// Show the key-mapping help (L+Left or ZL+Left).
    ShowControls,
    /// Previous track (L or ZL hit three times within the window).
    SkipPrev,
    /// Next track (R or ZR hit three times within the window).
    SkipNext,
}

/// The four buttons that participate in combos and triple-press skips.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    L,
    R,
    Zl,
    Zr,
}

const TRIGGERS: [Trigger; 4] = [Trigger::L, Trigger::R, Trigger::Zl, Trigger::Zr];

impl Trigger {
    fn button(self) -> Buttons {
        match self {
            Trigger::L => Buttons::L,
            Trigger::R => Buttons::R,
            Trigger::Zl => Buttons::ZL,
            Trigger::Zr => Buttons::ZR,
        }
    }

    fn index(self) -> usize {
        match self {
            Trigger::L => 0,
            Trigger::R => 1,
            Trigger::Zl => 2,
            Trigger::Zr => 3,
        }
    }

    fn skip_command(self) -> Command {
        match self {
            Trigger::L | Trigger::Zl => Command::SkipPrev,
            Trigger::R | Trigger::Zr => Command::SkipNext,
        }
    }
}

/// Ring buffer of the last [`MAX_PRESSES`] press timestamps for one button.
///
/// Unfilled slots are `None`, so they can never satisfy the debounce-window
/// comparison no matter how small the timestamps are.
#[derive(Debug, Clone, Copy, Default)]
struct PressHistory {
    slots: [Option<u64>; MAX_PRESSES],
    cursor: usize,
    /// Timestamp of the most recent press; cleared on release.
    last_press: Option<u64>,
}

impl PressHistory {
    fn record(&mut self, now_ms: u64) {
        self.last_press = Some(now_ms);
        self.slots[self.cursor] = Some(now_ms);
        self.cursor = (self.cursor + 1) % MAX_PRESSES;
    }

    /// Forget accumulated presses (combo consumed them, or a skip fired).
    fn reset(&mut self) {
        self.slots = [None; MAX_PRESSES];
        self.cursor = 0;
    }

    fn release(&mut self) {
        self.last_press = None;
    }

    /// Count presses within the debounce window of the most recent press.
    fn presses_in_window(&self) -> usize {
        let Some(last) = self.last_press else {
            return 0;
        };
        self.slots
            .iter()
            .flatten()
            .filter(|&&t| last.saturating_sub(t) <= DEBOUNCE_WINDOW_MS)
            .count()
    }
}

/// Multi-button combo / triple-press debouncer.
///
/// Evaluation order per frame: press bookkeeping, then combos, then skips.
/// Combos and skips are mutually exclusive within one frame; when a combo
/// fires it consumes any in-flight triple-press progress on both buttons of
/// its pair.
pub struct InputDebouncer {
    histories: [PressHistory; 4],
    /// Per-trigger combo-suppression latch: set when a combo involving the
    /// button fires, cleared only on that button's release. While set, the
    /// button's skip scan is suppressed so the tail of a combo hold is never
    /// misread as an independent event.
    combo_latched: [bool; 4],
    /// Time of the last accepted skip, shared across all four triggers.
    last_skip_ms: Option<u64>,
}

impl InputDebouncer {
    pub fn new() -> Self {
        Self {
            histories: [PressHistory::default(); 4],
            combo_latched: [false; 4],
            last_skip_ms: None,
        }
    }

    /// Consume one frame of input and produce at most one command.
    pub fn step(&mut self, frame: &FrameInput) -> Option<Command> {
        self.track_presses(frame);

        if let Some(command) = self.detect_combo(frame) {
            return Some(command);
        }
        self.detect_skip(frame)
    }

    /// Record press times on down transitions; clear press tracking and the
    /// combo latch on release.
    fn track_presses(&mut self, frame: &FrameInput) {
        for trigger in TRIGGERS {
            let button = trigger.button();
            if frame.down.contains(button) {
                self.histories[trigger.index()].record(frame.now_ms);
            }
            if frame.up.contains(button) {
                self.histories[trigger.index()].release();
                self.combo_latched[trigger.index()] = false;
            }
        }
    }

    fn detect_combo(&mut self, frame: &FrameInput) -> Option<Command> {
        // Pause: L held with R or Up going down, or R held with L going
        // down; symmetrically for the ZL/ZR pair.
        if frame.held.contains(Buttons::L) && frame.down.intersects(Buttons::R | Buttons::UP) {
            let with_r = frame.down.contains(Buttons::R);
            return Some(self.fire_pause(Trigger::L, Trigger::R, with_r));
        }
        if frame.held.contains(Buttons::R) && frame.down.contains(Buttons::L) {
            return Some(self.fire_pause(Trigger::L, Trigger::R, true));
        }
        if frame.held.contains(Buttons::ZL) && frame.down.intersects(Buttons::ZR | Buttons::UP) {
            let with_zr = frame.down.contains(Buttons::ZR);
            return Some(self.fire_pause(Trigger::Zl, Trigger::Zr, with_zr));
        }
        if frame.held.contains(Buttons::ZR) && frame.down.contains(Buttons::ZL) {
            return Some(self.fire_pause(Trigger::Zl, Trigger::Zr, true));
        }

        // Controls help: L or ZL held with Left going down.
        if frame.held.contains(Buttons::L) && frame.down.contains(Buttons::LEFT) {
            self.combo_latched[Trigger::L.index()] = true;
            return Some(Command::ShowControls);
        }
        if frame.held.contains(Buttons::ZL) && frame.down.contains(Buttons::LEFT) {
            self.combo_latched[Trigger::Zl.index()] = true;
            return Some(Command::ShowControls);
        }

        None
    }

    /// Latch the combo pair and discard both buttons' in-flight presses.
    ///
    /// `second_down` distinguishes L+R from L+Up: only a button that
    /// actually participated gets latched, so a plain Up release later is
    /// not misattributed.
    fn fire_pause(&mut self, first: Trigger, second: Trigger, second_down: bool) -> Command {
        self.combo_latched[first.index()] = true;
        if second_down {
            self.combo_latched[second.index()] = true;
        }
        self.histories[first.index()].reset();
        self.histories[second.index()].reset();
        Command::TogglePause
    }

    fn detect_skip(&mut self, frame: &FrameInput) -> Option<Command> {
        for trigger in TRIGGERS {
            if !frame.held.contains(trigger.button()) {
                continue;
            }
            if self.combo_latched[trigger.index()] {
                continue;
            }

            let history = &mut self.histories[trigger.index()];
            if history.last_press.is_none() {
                continue;
            }
            if history.presses_in_window() < MAX_PRESSES {
                continue;
            }

            // Global cooldown across all four triggers. When it has not yet
            // elapsed the history is left intact, so the skip fires once the
            // cooldown passes while the button is still held.
            if let Some(last_skip) = self.last_skip_ms {
                if frame.now_ms.saturating_sub(last_skip) <= SKIP_COOLDOWN_MS {
                    continue;
                }
            }

            history.reset();
            self.last_skip_ms = Some(frame.now_ms);
            return Some(trigger.skip_command());
        }
        None
    }
}

impl Default for InputDebouncer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Frame where `pressed` buttons go down (and are held), `held` buttons
    /// were already held.
    fn press(pressed: Buttons, held: Buttons, now_ms: u64) -> FrameInput {
        FrameInput {
            down: pressed,
            held: pressed | held,
            up: Buttons::empty(),
            now_ms,
        }
    }

    fn release(released: Buttons, now_ms: u64) -> FrameInput {
        FrameInput {
            down: Buttons::empty(),
            held: Buttons::empty(),
            up: released,
            now_ms,
        }
    }

    /// Three press/release taps of `button` ending at `start + 2*gap`,
    /// returning the command from the final (held) frame.
    fn triple_tap(
        debouncer: &mut InputDebouncer,
        button: Buttons,
        start: u64,
        gap: u64,
    ) -> Option<Command> {
        let mut last = None;
        for i in 0..3u64 {
            let t = start + i * gap;
            last = debouncer.step(&press(button, Buttons::empty(), t));
            if i < 2 {
                assert_eq!(debouncer.step(&release(button, t + gap / 2)), None);
            }
        }
        last
    }

    #[test]
    fn three_rapid_presses_yield_exactly_one_skip() {
        let mut debouncer = InputDebouncer::new();
        assert_eq!(
            triple_tap(&mut debouncer, Buttons::R, 1000, 100),
            Some(Command::SkipNext)
        );
    }

    #[test]
    fn presses_outside_the_window_do_not_count() {
        let mut debouncer = InputDebouncer::new();
        // 600 ms gaps: each press is outside the 500 ms window of the next.
        assert_eq!(triple_tap(&mut debouncer, Buttons::R, 1000, 600), None);
    }

    #[test]
    fn fourth_rapid_press_is_swallowed_by_the_cooldown() {
        let mut debouncer = InputDebouncer::new();
        assert_eq!(
            triple_tap(&mut debouncer, Buttons::ZR, 1000, 100),
            Some(Command::SkipNext)
        );
        debouncer.step(&release(Buttons::ZR, 1250));

        // A fresh rapid triple inside the 1 s cooldown yields nothing.
        assert_eq!(triple_tap(&mut debouncer, Buttons::ZR, 1300, 100), None);

        // After the cooldown elapses the same pattern works again.
        assert_eq!(debouncer.step(&release(Buttons::ZR, 1550)), None);
        assert_eq!(
            triple_tap(&mut debouncer, Buttons::ZR, 2600, 100),
            Some(Command::SkipNext)
        );
    }

    #[test]
    fn cooldown_is_shared_across_buttons() {
        let mut debouncer = InputDebouncer::new();
        assert_eq!(
            triple_tap(&mut debouncer, Buttons::R, 1000, 100),
            Some(Command::SkipNext)
        );
        debouncer.step(&release(Buttons::R, 1250));

        // L qualifies on its own but the global cooldown suppresses it.
        assert_eq!(triple_tap(&mut debouncer, Buttons::L, 1300, 100), None);
    }

    #[test]
    fn skip_fires_when_cooldown_elapses_during_the_hold() {
        let mut debouncer = InputDebouncer::new();
        assert_eq!(
            triple_tap(&mut debouncer, Buttons::R, 1000, 100),
            Some(Command::SkipNext)
        );
        debouncer.step(&release(Buttons::R, 1250));

        // Triple within the window but inside the cooldown: suppressed,
        // history kept.
        assert_eq!(triple_tap(&mut debouncer, Buttons::L, 1400, 100), None);

        // Still holding L past the cooldown: the pending triple now fires.
        let held = FrameInput {
            down: Buttons::empty(),
            held: Buttons::L,
            up: Buttons::empty(),
            now_ms: 2700,
        };
        assert_eq!(debouncer.step(&held), Some(Command::SkipPrev));
    }

    #[test]
    fn l_and_zl_skip_backwards() {
        let mut debouncer = InputDebouncer::new();
        assert_eq!(
            triple_tap(&mut debouncer, Buttons::ZL, 1000, 100),
            Some(Command::SkipPrev)
        );
    }

    #[test]
    fn combo_pause_from_either_press_order() {
        let mut debouncer = InputDebouncer::new();
        assert_eq!(
            debouncer.step(&press(Buttons::R, Buttons::L, 1000)),
            Some(Command::TogglePause)
        );

        let mut debouncer = InputDebouncer::new();
        assert_eq!(
            debouncer.step(&press(Buttons::L, Buttons::R, 1000)),
            Some(Command::TogglePause)
        );

        let mut debouncer = InputDebouncer::new();
        assert_eq!(
            debouncer.step(&press(Buttons::UP, Buttons::ZL, 1000)),
            Some(Command::TogglePause)
        );
    }

    #[test]
    fn show_controls_on_trigger_plus_left() {
        let mut debouncer = InputDebouncer::new();
        assert_eq!(
            debouncer.step(&press(Buttons::LEFT, Buttons::L, 1000)),
            Some(Command::ShowControls)
        );
    }

    #[test]
    fn combo_discards_pending_triple_press_progress() {
        let mut debouncer = InputDebouncer::new();

        // Two rapid L presses, then an L+R combo in the next frame.
        debouncer.step(&press(Buttons::L, Buttons::empty(), 1000));
        debouncer.step(&release(Buttons::L, 1050));
        debouncer.step(&press(Buttons::L, Buttons::empty(), 1100));
        assert_eq!(
            debouncer.step(&press(Buttons::R, Buttons::L, 1150)),
            Some(Command::TogglePause)
        );
        debouncer.step(&release(Buttons::L | Buttons::R, 1200));

        // One more rapid press is not enough: the combo emptied the history,
        // so a full fresh triple is required.
        assert_eq!(
            debouncer.step(&press(Buttons::L, Buttons::empty(), 1250)),
            None
        );
        assert_eq!(debouncer.step(&release(Buttons::L, 1300)), None);

        // A fresh triple still works.
        assert_eq!(
            triple_tap(&mut debouncer, Buttons::L, 1400, 100),
            Some(Command::SkipPrev)
        );
    }

    #[test]
    fn latched_button_cannot_skip_until_released() {
        let mut debouncer = InputDebouncer::new();

        // L+R combo latches both buttons.
        assert_eq!(
            debouncer.step(&press(Buttons::R, Buttons::L, 1000)),
            Some(Command::TogglePause)
        );

        // Rapid R presses while the latch is set are ignored even though
        // they would otherwise qualify.
        for i in 0..3u64 {
            let t = 1100 + i * 100;
            assert_eq!(
                debouncer.step(&press(Buttons::R, Buttons::L, t)),
                Some(Command::TogglePause),
                "L still held, so every R press re-reads as the combo"
            );
        }

        // Release everything; a fresh triple on R works again.
        debouncer.step(&release(Buttons::L | Buttons::R, 1500));
        assert_eq!(
            triple_tap(&mut debouncer, Buttons::R, 1600, 100),
            Some(Command::SkipNext)
        );
    }

    #[test]
    fn stale_empty_slots_never_satisfy_the_window() {
        let mut debouncer = InputDebouncer::new();
        // A single press at t=100: the two unfilled slots must not count as
        // "presses at time 0 within 500ms".
        assert_eq!(
            debouncer.step(&press(Buttons::R, Buttons::empty(), 100)),
            None
        );
        let held = FrameInput {
            down: Buttons::empty(),
            held: Buttons::R,
            up: Buttons::empty(),
            now_ms: 150,
        };
        assert_eq!(debouncer.step(&held), None);
    }

    #[test]
    fn release_clears_press_tracking() {
        let mut debouncer = InputDebouncer::new();
        triple_tap(&mut debouncer, Buttons::R, 1000, 100);
        debouncer.step(&release(Buttons::R, 1250));

        // Held frames after release carry no last-press; nothing can fire.
        let held = FrameInput {
            down: Buttons::empty(),
            held: Buttons::R,
            up: Buttons::empty(),
            now_ms: 3000,
        };
        assert_eq!(debouncer.step(&held), None);
    }
}
