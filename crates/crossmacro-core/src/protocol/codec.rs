//! Binary codec for the crossmacro-daemon IPC protocol.
//!
//! Wire format:
//! ```text
//! [opcode:1][payload:N]
//! ```
//! `N` is fixed per opcode except [`Opcode::Error`], whose payload is an
//! `i32` length prefix followed by that many UTF-8 bytes. All multi-byte
//! integers are **native byte order** — both ends of this socket always run
//! on the same host, so there is no cross-endian concern, unlike a
//! network-facing protocol.

use crate::protocol::messages::{
    ConfigureResolutionMessage, ErrorMessage, HandshakeMessage, InputEventMessage, IpcMessage,
    Opcode, SimulateEventMessage, StartCaptureMessage,
};
use thiserror::Error;

/// Errors that can occur during message encoding or decoding.
#[derive(Debug, Error, PartialEq)]
pub enum ProtocolError {
    /// The byte slice is shorter than the minimum required length.
    #[error("insufficient data: need at least {needed} bytes, got {available}")]
    InsufficientData { needed: usize, available: usize },

    /// The opcode byte is not a recognized value.
    #[error("unknown opcode: 0x{0:02X}")]
    UnknownOpcode(u8),

    /// The payload could not be parsed (field value out of range, UTF-8 error, etc.).
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Encodes an [`IpcMessage`] into a byte vector including the 1-byte opcode.
///
/// # Examples
///
/// ```rust
/// use crossmacro_core::protocol::{encode_message, decode_message};
/// use crossmacro_core::protocol::messages::{HandshakeMessage, IpcMessage};
///
/// let msg = IpcMessage::Handshake(HandshakeMessage { protocol_version: 1 });
/// let bytes = encode_message(&msg);
/// let (decoded, consumed) = decode_message(&bytes).unwrap();
/// assert_eq!(decoded, msg);
/// assert_eq!(consumed, bytes.len());
/// ```
pub fn encode_message(msg: &IpcMessage) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.push(msg.opcode() as u8);
    match msg {
        IpcMessage::Handshake(m) => buf.extend_from_slice(&m.protocol_version.to_ne_bytes()),
        IpcMessage::StartCapture(m) => {
            buf.push(m.mouse as u8);
            buf.push(m.keyboard as u8);
        }
        IpcMessage::StopCapture => {}
        IpcMessage::SimulateEvent(m) => {
            buf.extend_from_slice(&m.event_type.to_ne_bytes());
            buf.extend_from_slice(&m.code.to_ne_bytes());
            buf.extend_from_slice(&m.value.to_ne_bytes());
        }
        IpcMessage::ConfigureResolution(m) => {
            buf.extend_from_slice(&m.width.to_ne_bytes());
            buf.extend_from_slice(&m.height.to_ne_bytes());
        }
        IpcMessage::InputEvent(m) => {
            buf.push(m.kind);
            buf.extend_from_slice(&m.code.to_ne_bytes());
            buf.extend_from_slice(&m.value.to_ne_bytes());
            buf.extend_from_slice(&m.timestamp.to_ne_bytes());
        }
        IpcMessage::Error(m) => {
            let bytes = m.description.as_bytes();
            buf.extend_from_slice(&(bytes.len() as i32).to_ne_bytes());
            buf.extend_from_slice(bytes);
        }
    }
    buf
}

/// Decodes one [`IpcMessage`] from the beginning of `bytes`.
///
/// Returns the decoded message and the total number of bytes consumed, so
/// the caller can advance their read cursor.
///
/// # Errors
///
/// Returns [`ProtocolError`] if the bytes are malformed or the opcode is
/// unrecognized — per §4.1, an unknown opcode must produce an `Error` frame
/// and close the connection; this function only detects the condition, the
/// caller sends the frame.
pub fn decode_message(bytes: &[u8]) -> Result<(IpcMessage, usize), ProtocolError> {
    if bytes.is_empty() {
        return Err(ProtocolError::InsufficientData { needed: 1, available: 0 });
    }
    let opcode_byte = bytes[0];
    let opcode = Opcode::try_from(opcode_byte).map_err(|_| ProtocolError::UnknownOpcode(opcode_byte))?;
    let body = &bytes[1..];

    match opcode {
        Opcode::Handshake => {
            require_len(body, 4, "Handshake")?;
            let protocol_version = read_i32(body, 0)?;
            Ok((IpcMessage::Handshake(HandshakeMessage { protocol_version }), 1 + 4))
        }
        Opcode::StartCapture => {
            require_len(body, 2, "StartCapture")?;
            Ok((
                IpcMessage::StartCapture(StartCaptureMessage { mouse: body[0] != 0, keyboard: body[1] != 0 }),
                1 + 2,
            ))
        }
        Opcode::StopCapture => Ok((IpcMessage::StopCapture, 1)),
        Opcode::SimulateEvent => {
            require_len(body, 8, "SimulateEvent")?;
            let event_type = read_u16(body, 0)?;
            let code = read_u16(body, 2)?;
            let value = read_i32(body, 4)?;
            Ok((IpcMessage::SimulateEvent(SimulateEventMessage { event_type, code, value }), 1 + 8))
        }
        Opcode::ConfigureResolution => {
            require_len(body, 8, "ConfigureResolution")?;
            let width = read_i32(body, 0)?;
            let height = read_i32(body, 4)?;
            Ok((IpcMessage::ConfigureResolution(ConfigureResolutionMessage { width, height }), 1 + 8))
        }
        Opcode::InputEvent => {
            require_len(body, 17, "InputEvent")?;
            let kind = body[0];
            let code = read_i32(body, 1)?;
            let value = read_i32(body, 5)?;
            let timestamp = read_i64(body, 9)?;
            Ok((IpcMessage::InputEvent(InputEventMessage { kind, code, value, timestamp }), 1 + 17))
        }
        Opcode::Error => {
            require_len(body, 4, "Error.length")?;
            let len = read_i32(body, 0)?;
            if len < 0 {
                return Err(ProtocolError::MalformedPayload(format!("negative Error string length: {len}")));
            }
            let len = len as usize;
            require_len(body, 4 + len, "Error.string")?;
            let description = std::str::from_utf8(&body[4..4 + len])
                .map_err(|e| ProtocolError::MalformedPayload(format!("invalid UTF-8: {e}")))?
                .to_string();
            Ok((IpcMessage::Error(ErrorMessage { description }), 1 + 4 + len))
        }
    }
}

// ── Utility helpers ───────────────────────────────────────────────────────────

fn require_len(buf: &[u8], needed: usize, context: &str) -> Result<(), ProtocolError> {
    if buf.len() < needed {
        Err(ProtocolError::MalformedPayload(format!("{context}: need {needed} bytes, got {}", buf.len())))
    } else {
        Ok(())
    }
}

fn read_u16(buf: &[u8], offset: usize) -> Result<u16, ProtocolError> {
    require_len(buf, offset + 2, "u16 field")?;
    Ok(u16::from_ne_bytes([buf[offset], buf[offset + 1]]))
}

fn read_i32(buf: &[u8], offset: usize) -> Result<i32, ProtocolError> {
    require_len(buf, offset + 4, "i32 field")?;
    Ok(i32::from_ne_bytes([buf[offset], buf[offset + 1], buf[offset + 2], buf[offset + 3]]))
}

fn read_i64(buf: &[u8], offset: usize) -> Result<i64, ProtocolError> {
    require_len(buf, offset + 8, "i64 field")?;
    Ok(i64::from_ne_bytes([
        buf[offset],
        buf[offset + 1],
        buf[offset + 2],
        buf[offset + 3],
        buf[offset + 4],
        buf[offset + 5],
        buf[offset + 6],
        buf[offset + 7],
    ]))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::messages::event_type;

    fn round_trip(msg: &IpcMessage) -> IpcMessage {
        let encoded = encode_message(msg);
        let (decoded, consumed) = decode_message(&encoded).expect("decode failed");
        assert_eq!(consumed, encoded.len(), "consumed bytes should equal total encoded size");
        decoded
    }

    #[test]
    fn test_handshake_round_trip() {
        let msg = IpcMessage::Handshake(HandshakeMessage { protocol_version: 1 });
        assert_eq!(round_trip(&msg), msg);
    }

    #[test]
    fn test_start_capture_round_trip_both_flags() {
        let msg = IpcMessage::StartCapture(StartCaptureMessage { mouse: true, keyboard: true });
        assert_eq!(round_trip(&msg), msg);
    }

    #[test]
    fn test_start_capture_round_trip_mouse_only() {
        let msg = IpcMessage::StartCapture(StartCaptureMessage { mouse: true, keyboard: false });
        assert_eq!(round_trip(&msg), msg);
    }

    #[test]
    fn test_stop_capture_round_trip() {
        let msg = IpcMessage::StopCapture;
        assert_eq!(round_trip(&msg), msg);
    }

    #[test]
    fn test_simulate_event_round_trip() {
        let msg = IpcMessage::SimulateEvent(SimulateEventMessage {
            event_type: event_type::EV_KEY,
            code: 30,
            value: 1,
        });
        assert_eq!(round_trip(&msg), msg);
    }

    #[test]
    fn test_configure_resolution_round_trip() {
        let msg = IpcMessage::ConfigureResolution(ConfigureResolutionMessage { width: 1920, height: 1080 });
        assert_eq!(round_trip(&msg), msg);
    }

    #[test]
    fn test_configure_resolution_zero_is_relative_only_request() {
        let msg = IpcMessage::ConfigureResolution(ConfigureResolutionMessage { width: 0, height: 0 });
        assert_eq!(round_trip(&msg), msg);
    }

    #[test]
    fn test_input_event_round_trip() {
        let msg = IpcMessage::InputEvent(InputEventMessage { kind: 1, code: 30, value: 1, timestamp: 123_456_789 });
        assert_eq!(round_trip(&msg), msg);
    }

    #[test]
    fn test_input_event_negative_timestamp_delta_round_trip() {
        let msg = IpcMessage::InputEvent(InputEventMessage { kind: 2, code: 0, value: -5, timestamp: 0 });
        assert_eq!(round_trip(&msg), msg);
    }

    #[test]
    fn test_error_round_trip() {
        let msg = IpcMessage::Error(ErrorMessage { description: "protocol version mismatch".to_string() });
        assert_eq!(round_trip(&msg), msg);
    }

    #[test]
    fn test_error_empty_string_round_trip() {
        let msg = IpcMessage::Error(ErrorMessage { description: String::new() });
        assert_eq!(round_trip(&msg), msg);
    }

    #[test]
    fn test_decode_empty_bytes_returns_insufficient_data() {
        let result = decode_message(&[]);
        assert!(matches!(result, Err(ProtocolError::InsufficientData { .. })));
    }

    #[test]
    fn test_decode_unknown_opcode_returns_error() {
        let result = decode_message(&[0x99]);
        assert!(matches!(result, Err(ProtocolError::UnknownOpcode(0x99))));
    }

    #[test]
    fn test_decode_truncated_handshake_returns_malformed() {
        let result = decode_message(&[0x01, 0x00, 0x00]);
        assert!(matches!(result, Err(ProtocolError::MalformedPayload(_))));
    }

    #[test]
    fn test_stop_capture_is_single_byte_on_wire() {
        let bytes = encode_message(&IpcMessage::StopCapture);
        assert_eq!(bytes, vec![Opcode::StopCapture as u8]);
    }

    #[test]
    fn test_opcode_byte_matches_spec_values() {
        assert_eq!(Opcode::Handshake as u8, 0x01);
        assert_eq!(Opcode::StartCapture as u8, 0x02);
        assert_eq!(Opcode::StopCapture as u8, 0x03);
        assert_eq!(Opcode::SimulateEvent as u8, 0x04);
        assert_eq!(Opcode::ConfigureResolution as u8, 0x05);
        assert_eq!(Opcode::InputEvent as u8, 0x10);
        assert_eq!(Opcode::Error as u8, 0xFE);
    }
}
