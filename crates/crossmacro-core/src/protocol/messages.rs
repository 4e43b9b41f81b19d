//! IPC message types exchanged between `crossmacro-engine` (client) and
//! `crossmacro-daemon` over the privileged-capture AF_UNIX socket.
//!
//! Messages follow the wire format in the codec module doc comment. The
//! canonical key representation on this wire is the Linux evdev `KEY_*`
//! code space (see [`crate::keymap::evdev`]); there is no HID layer in this
//! protocol since both ends of the socket run on the same Linux host.

use serde::{Deserialize, Serialize};

/// Current protocol version. Bumped on any wire-incompatible change; a
/// mismatch at [`IpcMessage::Handshake`] is a hard error (§4.1, §4.3).
pub const PROTOCOL_VERSION: i32 = 1;

/// evdev event-type namespace used in [`SimulateEventMessage::event_type`]
/// and [`InputEventMessage::kind`].
pub mod event_type {
    pub const EV_SYN: u16 = 0;
    pub const EV_KEY: u16 = 1;
    pub const EV_REL: u16 = 2;
    pub const EV_ABS: u16 = 3;
}

/// Wire opcode identifying the payload that follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum Opcode {
    Handshake = 0x01,
    StartCapture = 0x02,
    StopCapture = 0x03,
    SimulateEvent = 0x04,
    ConfigureResolution = 0x05,
    InputEvent = 0x10,
    Error = 0xFE,
}

impl TryFrom<u8> for Opcode {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x01 => Ok(Opcode::Handshake),
            0x02 => Ok(Opcode::StartCapture),
            0x03 => Ok(Opcode::StopCapture),
            0x04 => Ok(Opcode::SimulateEvent),
            0x05 => Ok(Opcode::ConfigureResolution),
            0x10 => Ok(Opcode::InputEvent),
            0xFE => Ok(Opcode::Error),
            _ => Err(()),
        }
    }
}

/// HANDSHAKE (0x01): bidirectional, exchanged first on every connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandshakeMessage {
    pub protocol_version: i32,
}

/// START_CAPTURE (0x02): client → daemon, requests forwarding of device
/// events. Reference-counted by the client per §4.3; re-sent on every
/// `start_capture` call (not only the 0→1 transition) so flag changes take
/// effect while already capturing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartCaptureMessage {
    pub mouse: bool,
    pub keyboard: bool,
}

/// STOP_CAPTURE (0x03): client → daemon, empty payload. Sent only on the
/// capture refcount's 1→0 transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopCaptureMessage;

/// SIMULATE_EVENT (0x04): client → daemon, one `struct input_event` to be
/// written to the uinput device. The client is responsible for the
/// trailing `EV_SYN/SYN_REPORT`; the daemon does not batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulateEventMessage {
    /// evdev event type (`EV_KEY`, `EV_REL`, `EV_ABS`, `EV_SYN`).
    pub event_type: u16,
    /// evdev code within `event_type`'s namespace.
    pub code: u16,
    /// Value: 0/1/2 for key up/down/repeat, signed delta for REL, absolute
    /// position for ABS.
    pub value: i32,
}

/// CONFIGURE_RESOLUTION (0x05): client → daemon, sizes the uinput virtual
/// device's absolute axes. `width > 0 && height > 0` selects an
/// `INPUT_PROP_DIRECT` absolute-capable device; otherwise the daemon falls
/// back to relative-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigureResolutionMessage {
    pub width: i32,
    pub height: i32,
}

/// INPUT_EVENT (0x10): daemon → client, one captured kernel input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputEventMessage {
    /// Tag of the raw-event union (see [`crate::domain::raw_event::RawEventKind`]).
    pub kind: u8,
    pub code: i32,
    pub value: i32,
    /// Microseconds since an arbitrary epoch, monotonic within a session.
    pub timestamp: i64,
}

/// ERROR (0xFE): bidirectional, closes the connection after being sent or
/// received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub description: String,
}

// ── Top-level message enum ────────────────────────────────────────────────────

/// All valid IPC messages, discriminated by [`Opcode`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IpcMessage {
    Handshake(HandshakeMessage),
    StartCapture(StartCaptureMessage),
    StopCapture,
    SimulateEvent(SimulateEventMessage),
    ConfigureResolution(ConfigureResolutionMessage),
    InputEvent(InputEventMessage),
    Error(ErrorMessage),
}

impl IpcMessage {
    /// Returns the [`Opcode`] discriminant for this message.
    pub fn opcode(&self) -> Opcode {
        match self {
            IpcMessage::Handshake(_) => Opcode::Handshake,
            IpcMessage::StartCapture(_) => Opcode::StartCapture,
            IpcMessage::StopCapture => Opcode::StopCapture,
            IpcMessage::SimulateEvent(_) => Opcode::SimulateEvent,
            IpcMessage::ConfigureResolution(_) => Opcode::ConfigureResolution,
            IpcMessage::InputEvent(_) => Opcode::InputEvent,
            IpcMessage::Error(_) => Opcode::Error,
        }
    }
}
