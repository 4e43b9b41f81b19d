//! Recording pipeline (C7) — turns a raw capture-provider event stream plus
//! a [`CoordinateStrategy`] sample into a finished [`MacroSequence`].
//!
//! Grounded in the "use-case struct holding collaborators behind trait
//! objects, one `handle_event` entry point matching on the raw-event enum"
//! shape used by the daemon's own per-connection state machine.

use std::collections::HashSet;

use crossmacro_core::domain::macro_event::{MacroButton, MacroEvent, MacroEventKind, MacroSequence};
use crossmacro_core::domain::raw_event::{RawEventKind, RawInputEvent};
use crossmacro_core::keymap::evdev::codes;

use crate::coordinate::{CoordinateStrategy, SENTINEL};

/// Recording options, per §4.5.
#[derive(Debug, Clone)]
pub struct RecordingConfig {
    pub record_mouse: bool,
    pub record_keyboard: bool,
    pub ignored_keys: HashSet<i32>,
    pub absolute_coordinates: bool,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self { record_mouse: true, record_keyboard: true, ignored_keys: HashSet::new(), absolute_coordinates: false }
    }
}

/// Drives one recording session: every raw event is fed through
/// [`RecordingPipeline::handle_event`], and [`RecordingPipeline::finish`]
/// yields the validated, delay-computed [`MacroSequence`].
pub struct RecordingPipeline<S: CoordinateStrategy> {
    config: RecordingConfig,
    strategy: S,
    events: Vec<MacroEvent>,
    last_mouse_pos: Option<(i32, i32)>,
    last_x: i32,
    last_y: i32,
}

fn button_for_code(code: i32) -> Option<MacroButton> {
    match code {
        c if c == codes::BTN_LEFT => Some(MacroButton::Left),
        c if c == codes::BTN_RIGHT => Some(MacroButton::Right),
        c if c == codes::BTN_MIDDLE => Some(MacroButton::Middle),
        c if c == codes::BTN_SIDE => Some(MacroButton::Side1),
        c if c == codes::BTN_EXTRA => Some(MacroButton::Side2),
        _ => None,
    }
}

impl<S: CoordinateStrategy> RecordingPipeline<S> {
    pub fn new(config: RecordingConfig, strategy: S) -> Self {
        Self { config, strategy, events: Vec::new(), last_mouse_pos: None, last_x: 0, last_y: 0 }
    }

    fn push(&mut self, kind: MacroEventKind, button: MacroButton, key_code: i32, timestamp: i64) {
        self.events.push(MacroEvent { kind, x: self.last_x, y: self.last_y, button, key_code, timestamp, delay_ms: 0 });
    }

    fn observe_move(&mut self, sample: (i32, i32), timestamp: i64) {
        if sample == SENTINEL {
            return;
        }
        if !self.config.record_mouse {
            return;
        }
        if self.config.absolute_coordinates && self.last_mouse_pos == Some(sample) {
            return;
        }
        self.last_x = sample.0;
        self.last_y = sample.1;
        self.last_mouse_pos = Some(sample);
        self.push(MacroEventKind::MouseMove, MacroButton::None, 0, timestamp);
    }

    /// Feeds one raw event into the pipeline. `timestamp` is milliseconds
    /// from the start of recording (the domain's `MacroEvent::timestamp`
    /// unit, distinct from [`RawInputEvent::timestamp`]'s 100 ns ticks).
    pub fn handle_event(&mut self, event: &RawInputEvent, timestamp: i64) {
        // The strategy observes every event unconditionally so relative
        // accumulation and absolute polling both stay correct regardless of
        // which events this pipeline ends up emitting.
        let sample = self.strategy.observe(event);

        match event.kind {
            RawEventKind::MouseMove => {
                self.observe_move(sample, timestamp);
            }
            RawEventKind::MouseScroll => {
                if !self.config.record_mouse {
                    return;
                }
                let button = if event.code == codes::REL_WHEEL {
                    if event.value > 0 { MacroButton::ScrollUp } else { MacroButton::ScrollDown }
                } else {
                    if event.value > 0 { MacroButton::ScrollRight } else { MacroButton::ScrollLeft }
                };
                self.push(MacroEventKind::Click, button, 0, timestamp);
            }
            RawEventKind::MouseButton => {
                if !self.config.record_mouse {
                    return;
                }
                let Some(button) = button_for_code(event.code) else { return };
                let kind = match event.value {
                    1 => MacroEventKind::ButtonPress,
                    0 => MacroEventKind::ButtonRelease,
                    _ => return,
                };
                self.push(kind, button, 0, timestamp);
            }
            RawEventKind::Key => {
                if !self.config.record_keyboard {
                    return;
                }
                if self.config.ignored_keys.contains(&event.code) {
                    return;
                }
                let kind = match event.value {
                    1 => MacroEventKind::KeyPress,
                    0 => MacroEventKind::KeyRelease,
                    _ => return, // repeat (2) is dropped
                };
                self.push(kind, MacroButton::None, event.code, timestamp);
            }
            RawEventKind::Sync => {
                if !self.config.absolute_coordinates && sample != SENTINEL {
                    self.observe_move(sample, timestamp);
                }
            }
        }
    }

    /// Finalizes the session: computes `delayMs[i] = ts[i+1] - ts[i]` (last
    /// entry zero) and validates the monotonic-timestamp invariant.
    pub fn finish(self, name: impl Into<String>) -> MacroSequence {
        let mut seq = MacroSequence { name: name.into(), events: self.events };
        seq.recompute_delays();
        seq
    }
}
