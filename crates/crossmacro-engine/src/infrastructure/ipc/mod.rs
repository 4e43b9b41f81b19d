//! IPC client (C3) — the engine's side of the AF_UNIX connection to
//! `crossmacro-daemon`.
//!
//! Grounded in the daemon's own connection handling (one reader loop, one
//! `Mutex`-guarded writer, framed message I/O built the same way on both
//! ends of the socket) and, for the reference-counted capture API, directly
//! in §4.3's "balanced start/stop, re-send on every start" contract.

#![cfg(target_os = "linux")]

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::UnixStream;
use tokio::sync::{mpsc, Mutex};

use crossmacro_core::domain::raw_event::{RawEventKind, RawInputEvent};
use crossmacro_core::protocol::messages::{
    ConfigureResolutionMessage, HandshakeMessage, SimulateEventMessage, StartCaptureMessage, PROTOCOL_VERSION,
};
use crossmacro_core::protocol::{decode_message, encode_message, IpcMessage, ProtocolError};

const PRIMARY_SOCKET_PATH: &str = "/run/crossmacro/crossmacro.sock";
const FALLBACK_SOCKET_PATH: &str = "/tmp/crossmacro.sock";

/// Events fanned out from the reader task, per §4.3's two event streams.
#[derive(Debug, Clone)]
pub enum IpcEvent {
    InputReceived(RawInputEvent),
    Error(String),
}

#[derive(Debug, Error)]
pub enum IpcClientError {
    #[error("could not reach the daemon on {primary} or {fallback}: {source}")]
    SocketUnavailable { primary: String, fallback: String, #[source] source: std::io::Error },
    #[error("protocol version mismatch: daemon reports {0}, engine expects {PROTOCOL_VERSION}")]
    ProtocolMismatch(i32),
    #[error("daemon closed the connection: {0}")]
    Rejected(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

/// Connects to the daemon socket, trying `socket_path_override` (from
/// `infrastructure::config::CaptureConfig`) in place of the baked-in
/// primary path when given, then falling back to [`FALLBACK_SOCKET_PATH`]
/// either way.
async fn connect_socket(socket_path_override: Option<&str>) -> Result<UnixStream, IpcClientError> {
    let primary = socket_path_override.unwrap_or(PRIMARY_SOCKET_PATH);
    match UnixStream::connect(primary).await {
        Ok(stream) => Ok(stream),
        Err(primary_err) => match UnixStream::connect(FALLBACK_SOCKET_PATH).await {
            Ok(stream) => Ok(stream),
            Err(_) => Err(IpcClientError::SocketUnavailable {
                primary: primary.to_string(),
                fallback: FALLBACK_SOCKET_PATH.to_string(),
                source: primary_err,
            }),
        },
    }
}

async fn write_frame(stream: &mut OwnedWriteHalf, msg: &IpcMessage) -> Result<(), IpcClientError> {
    let bytes = encode_message(msg);
    stream.write_all(&bytes).await?;
    stream.flush().await?;
    Ok(())
}

async fn read_frame(stream: &mut OwnedReadHalf, buf: &mut Vec<u8>) -> Result<IpcMessage, IpcClientError> {
    loop {
        if !buf.is_empty() {
            match decode_message(buf) {
                Ok((msg, consumed)) => {
                    buf.drain(..consumed);
                    return Ok(msg);
                }
                Err(ProtocolError::InsufficientData { .. }) => {}
                Err(other) => return Err(other.into()),
            }
        }
        let mut chunk = [0u8; 512];
        let n = tokio::io::AsyncReadExt::read(stream, &mut chunk).await?;
        if n == 0 {
            return Err(IpcClientError::Rejected("connection closed".to_string()));
        }
        buf.extend_from_slice(&chunk[..n]);
    }
}

/// Live handle to a connected daemon session. Cheap to clone; every clone
/// shares the same write lock and capture refcount.
#[derive(Clone)]
pub struct IpcClient {
    write_half: Arc<Mutex<OwnedWriteHalf>>,
    capture_refcount: Arc<AtomicU32>,
    closed: Arc<AtomicBool>,
}

impl IpcClient {
    /// Connects, performs the version handshake, and spawns the reader
    /// task. Returns the client plus the channel its events arrive on.
    ///
    /// `socket_path_override` overrides the primary socket path (normally
    /// [`PRIMARY_SOCKET_PATH`]) with the one configured in
    /// `infrastructure::config::CaptureConfig::socket_path_override`, if any.
    pub async fn connect(socket_path_override: Option<&str>) -> Result<(Self, mpsc::UnboundedReceiver<IpcEvent>), IpcClientError> {
        Self::handshake(connect_socket(socket_path_override).await?).await
    }

    /// Handshakes over an already-connected stream. Split out from
    /// [`Self::connect`] so integration tests can drive a
    /// [`tokio::net::UnixStream`] pair directly.
    pub async fn handshake(stream: UnixStream) -> Result<(Self, mpsc::UnboundedReceiver<IpcEvent>), IpcClientError> {
        let (mut read_half, mut write_half) = stream.into_split();

        write_frame(&mut write_half, &IpcMessage::Handshake(HandshakeMessage { protocol_version: PROTOCOL_VERSION }))
            .await?;

        let mut read_buf = Vec::new();
        match read_frame(&mut read_half, &mut read_buf).await? {
            IpcMessage::Handshake(ack) if ack.protocol_version == PROTOCOL_VERSION => {}
            IpcMessage::Handshake(ack) => return Err(IpcClientError::ProtocolMismatch(ack.protocol_version)),
            IpcMessage::Error(e) => return Err(IpcClientError::Rejected(e.description)),
            other => return Err(IpcClientError::Rejected(format!("unexpected first frame: {other:?}"))),
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let closed = Arc::new(AtomicBool::new(false));
        let reader_closed = Arc::clone(&closed);

        tokio::spawn(async move {
            loop {
                match read_frame(&mut read_half, &mut read_buf).await {
                    Ok(IpcMessage::InputEvent(frame)) => {
                        let Ok(kind) = RawEventKind::try_from(frame.kind) else { continue };
                        let event = RawInputEvent { kind, code: frame.code, value: frame.value, timestamp: frame.timestamp as u64 };
                        if tx.send(IpcEvent::InputReceived(event)).is_err() {
                            return;
                        }
                    }
                    Ok(IpcMessage::Error(e)) => {
                        reader_closed.store(true, Ordering::Release);
                        let _ = tx.send(IpcEvent::Error(e.description));
                        return;
                    }
                    Ok(_) => {} // client -> daemon-only frames, ignore if ever echoed
                    Err(e) => {
                        reader_closed.store(true, Ordering::Release);
                        let _ = tx.send(IpcEvent::Error(e.to_string()));
                        return;
                    }
                }
            }
        });

        Ok((Self { write_half: Arc::new(Mutex::new(write_half)), capture_refcount: Arc::new(AtomicU32::new(0)), closed }, rx))
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Increments the capture refcount and always re-sends `StartCapture`
    /// (not only on the 0→1 transition) so flag changes take effect while
    /// already capturing.
    pub async fn start_capture(&self, mouse: bool, keyboard: bool) -> Result<(), IpcClientError> {
        if self.is_closed() {
            return Ok(());
        }
        self.capture_refcount.fetch_add(1, Ordering::AcqRel);
        let mut guard = self.write_half.lock().await;
        write_frame(&mut guard, &IpcMessage::StartCapture(StartCaptureMessage { mouse, keyboard })).await
    }

    /// Decrements the capture refcount; sends `StopCapture` only on the
    /// 1→0 transition.
    pub async fn stop_capture(&self) -> Result<(), IpcClientError> {
        if self.is_closed() {
            return Ok(());
        }
        let prev = self.capture_refcount.fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| Some(n.saturating_sub(1))).unwrap_or(0);
        if prev == 1 {
            let mut guard = self.write_half.lock().await;
            write_frame(&mut guard, &IpcMessage::StopCapture).await?;
        }
        Ok(())
    }

    pub async fn simulate_event(&self, event_type: u16, code: u16, value: i32) -> Result<(), IpcClientError> {
        if self.is_closed() {
            return Ok(());
        }
        let mut guard = self.write_half.lock().await;
        write_frame(&mut guard, &IpcMessage::SimulateEvent(SimulateEventMessage { event_type, code, value })).await
    }

    /// Writes every frame in `events` under a single held write lock,
    /// flushing once at the end.
    pub async fn simulate_batch(&self, events: &[SimulateEventMessage]) -> Result<(), IpcClientError> {
        if self.is_closed() || events.is_empty() {
            return Ok(());
        }
        let mut guard = self.write_half.lock().await;
        for event in events {
            let bytes = encode_message(&IpcMessage::SimulateEvent(*event));
            guard.write_all(&bytes).await?;
        }
        guard.flush().await?;
        Ok(())
    }

    pub async fn configure_resolution(&self, width: i32, height: i32) -> Result<(), IpcClientError> {
        if self.is_closed() {
            return Ok(());
        }
        let mut guard = self.write_half.lock().await;
        write_frame(&mut guard, &IpcMessage::ConfigureResolution(ConfigureResolutionMessage { width, height })).await
    }
}
