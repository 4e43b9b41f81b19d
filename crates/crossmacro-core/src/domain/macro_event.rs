//! `MacroEvent` / `MacroSequence` — the recorded-and-replayed event model.
//!
//! Produced by the recording pipeline (`crossmacro-engine::recording`),
//! consumed by the playback engine (`crossmacro-engine::playback`). Unlike
//! [`super::raw_event::RawInputEvent`], a `MacroEvent` is already a coherent,
//! deduplicated, per-synchronization-boundary sample — it is what gets
//! written to a `.json` macro file (see §6 of the specification).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The kind of a [`MacroEvent`]. Serialized as an integer to match the macro
/// file format's "EventType ... as integers" requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum MacroEventKind {
    ButtonPress = 0,
    ButtonRelease = 1,
    MouseMove = 2,
    Click = 3,
    KeyPress = 4,
    KeyRelease = 5,
    Scroll = 6,
}

/// Which mouse button (or synthetic scroll direction) a [`MacroEvent`]
/// concerns. Serialized as an integer, per the macro file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[repr(u8)]
pub enum MacroButton {
    #[default]
    None = 0,
    Left = 1,
    Right = 2,
    Middle = 3,
    Side1 = 4,
    Side2 = 5,
    ScrollUp = 6,
    ScrollDown = 7,
    ScrollLeft = 8,
    ScrollRight = 9,
}

/// One recorded or replayable input event.
///
/// `x`/`y` are always populated (the last known cursor position, even for
/// non-move events); `key_code` is the evdev code, used as the canonical
/// code on every platform via `crossmacro_core::keymap`; `timestamp` is
/// milliseconds from the start of recording; `delay_ms` is the wait *before*
/// this event relative to the previous one and is computed by the recording
/// pipeline on finalize, never read off the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MacroEvent {
    pub kind: MacroEventKind,
    pub x: i32,
    pub y: i32,
    pub button: MacroButton,
    pub key_code: i32,
    pub timestamp: i64,
    pub delay_ms: i64,
}

/// Errors raised while validating a [`MacroSequence`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MacroSequenceError {
    #[error("timestamps are not non-decreasing at index {index}")]
    TimestampNotMonotonic { index: usize },
}

/// A named, ordered, finite sequence of [`MacroEvent`]s.
///
/// Value-typed: cloning gives an independent snapshot and the playback
/// engine takes a read-only snapshot rather than mutating the original.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MacroSequence {
    pub name: String,
    pub events: Vec<MacroEvent>,
}

impl MacroSequence {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), events: Vec::new() }
    }

    /// Validates the monotonic-timestamp invariant from §3 / §8.
    pub fn validate(&self) -> Result<(), MacroSequenceError> {
        for window in self.events.windows(2) {
            if window[1].timestamp < window[0].timestamp {
                return Err(MacroSequenceError::TimestampNotMonotonic {
                    index: 1,
                });
            }
        }
        Ok(())
    }

    /// Recomputes `delay_ms` for every event from its `timestamp`, per
    /// §4.5's "Delay computation (on finalize)": `delayMs[i] = ts[i+1] -
    /// ts[i]`, with the last entry forced to zero.
    pub fn recompute_delays(&mut self) {
        let len = self.events.len();
        for i in 0..len {
            let delay = if i + 1 < len {
                self.events[i + 1].timestamp - self.events[i].timestamp
            } else {
                0
            };
            self.events[i].delay_ms = delay;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ev(kind: MacroEventKind, ts: i64) -> MacroEvent {
        MacroEvent {
            kind,
            x: 0,
            y: 0,
            button: MacroButton::None,
            key_code: 0,
            timestamp: ts,
            delay_ms: 0,
        }
    }

    #[test]
    fn validate_accepts_non_decreasing_timestamps() {
        let seq = MacroSequence {
            name: "a".into(),
            events: vec![ev(MacroEventKind::KeyPress, 0), ev(MacroEventKind::KeyRelease, 0), ev(MacroEventKind::KeyPress, 5)],
        };
        assert!(seq.validate().is_ok());
    }

    #[test]
    fn validate_rejects_decreasing_timestamp() {
        let seq = MacroSequence {
            name: "a".into(),
            events: vec![ev(MacroEventKind::KeyPress, 5), ev(MacroEventKind::KeyRelease, 1)],
        };
        assert!(seq.validate().is_err());
    }

    #[test]
    fn recompute_delays_sets_gap_to_next_timestamp() {
        let mut seq = MacroSequence {
            name: "a".into(),
            events: vec![ev(MacroEventKind::KeyPress, 0), ev(MacroEventKind::KeyRelease, 120), ev(MacroEventKind::KeyPress, 200)],
        };
        seq.recompute_delays();
        assert_eq!(seq.events[0].delay_ms, 120);
        assert_eq!(seq.events[1].delay_ms, 80);
        assert_eq!(seq.events[2].delay_ms, 0);
    }

    #[test]
    fn macro_sequence_json_round_trip_uses_camel_case() {
        let seq = MacroSequence {
            name: "demo".into(),
            events: vec![ev(MacroEventKind::ButtonPress, 0)],
        };
        let json = serde_json::to_string(&seq).unwrap();
        assert!(json.contains("\"keyCode\""));
        assert!(json.contains("\"delayMs\""));
        let back: MacroSequence = serde_json::from_str(&json).unwrap();
        assert_eq!(back, seq);
    }
}
