//! Raw kernel-level input events — the wire-level vocabulary shared by the
//! daemon and the capture/simulation providers.
//!
//! # Why evdev codes? (for beginners)
//!
//! Linux represents every input device as a stream of `(type, code, value)`
//! tuples (see the `evdev` glossary entry). `type` names the axis namespace
//! (`EV_KEY`, `EV_REL`, `EV_SYN`, ...), `code` names the specific key or axis
//! within that namespace, and `value` is the payload (1/0 for press/release,
//! a signed delta for relative motion). Every platform capture/simulation
//! provider in this workspace translates its native representation into this
//! vocabulary so the rest of the pipeline (recording, coordinate strategies,
//! playback, text expansion) never has to know which OS produced an event.

use serde::{Deserialize, Serialize};

/// The tag of a [`RawInputEvent`], matching the wire `kind` byte in the
/// `InputEvent` frame (opcode `0x10`, see `protocol::messages`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum RawEventKind {
    Key = 0,
    MouseButton = 1,
    MouseMove = 2,
    MouseScroll = 3,
    Sync = 4,
}

impl TryFrom<u8> for RawEventKind {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Key),
            1 => Ok(Self::MouseButton),
            2 => Ok(Self::MouseMove),
            3 => Ok(Self::MouseScroll),
            4 => Ok(Self::Sync),
            other => Err(other),
        }
    }
}

/// A single raw kernel-like input sample.
///
/// `code` is the evdev code within the namespace implied by `kind` (a
/// `KEY_*` code for `Key`, a `BTN_*` code for `MouseButton`, `REL_X`/`REL_Y`
/// for `MouseMove`, `REL_WHEEL`/`REL_HWHEEL` for `MouseScroll`, and
/// `SYN_REPORT` — always zero — for `Sync`). `timestamp` is a monotonic
/// clock reading in ticks of 100 ns, matching §3 of the specification this
/// crate implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawInputEvent {
    pub kind: RawEventKind,
    pub code: i32,
    pub value: i32,
    pub timestamp: u64,
}

impl RawInputEvent {
    pub fn key(code: i32, value: i32, timestamp: u64) -> Self {
        Self { kind: RawEventKind::Key, code, value, timestamp }
    }

    pub fn mouse_button(code: i32, value: i32, timestamp: u64) -> Self {
        Self { kind: RawEventKind::MouseButton, code, value, timestamp }
    }

    pub fn mouse_move(code: i32, value: i32, timestamp: u64) -> Self {
        Self { kind: RawEventKind::MouseMove, code, value, timestamp }
    }

    pub fn mouse_scroll(code: i32, value: i32, timestamp: u64) -> Self {
        Self { kind: RawEventKind::MouseScroll, code, value, timestamp }
    }

    pub fn sync(timestamp: u64) -> Self {
        Self {
            kind: RawEventKind::Sync,
            code: crate::keymap::evdev::codes::SYN_REPORT,
            value: 0,
            timestamp,
        }
    }

    pub fn is_sync(&self) -> bool {
        matches!(self.kind, RawEventKind::Sync)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sync_event_carries_zero_code_and_value() {
        let ev = RawInputEvent::sync(100);
        assert!(ev.is_sync());
        assert_eq!(ev.code, 0);
        assert_eq!(ev.value, 0);
    }

    #[test]
    fn raw_event_kind_round_trips_through_u8() {
        for kind in [
            RawEventKind::Key,
            RawEventKind::MouseButton,
            RawEventKind::MouseMove,
            RawEventKind::MouseScroll,
            RawEventKind::Sync,
        ] {
            let byte = kind as u8;
            assert_eq!(RawEventKind::try_from(byte).unwrap(), kind);
        }
    }

    #[test]
    fn raw_event_kind_rejects_unknown_byte() {
        assert_eq!(RawEventKind::try_from(200u8), Err(200u8));
    }

    #[test]
    fn constructors_set_expected_kind() {
        assert_eq!(RawInputEvent::key(30, 1, 0).kind, RawEventKind::Key);
        assert_eq!(RawInputEvent::mouse_button(0x110, 1, 0).kind, RawEventKind::MouseButton);
        assert_eq!(RawInputEvent::mouse_move(0, 5, 0).kind, RawEventKind::MouseMove);
        assert_eq!(RawInputEvent::mouse_scroll(8, -1, 0).kind, RawEventKind::MouseScroll);
    }
}
