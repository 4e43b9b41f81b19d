//! AF_UNIX socket transport: binding with the primary/fallback path pair
//! from §6, and framed message I/O over an accepted connection.
//!
//! # Why a fallback path? (for beginners)
//!
//! `/run/crossmacro/` is created by the systemd unit's `RuntimeDirectory=`
//! directive. If the daemon is started outside of systemd (a dev shell, a
//! container without the unit file installed) that directory may not exist,
//! so binding falls back to a path under `/tmp` that any process can create.

use std::os::fd::{AsRawFd, BorrowedFd};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tokio::net::{UnixListener, UnixStream};

use crossmacro_core::protocol::{decode_message, encode_message, IpcMessage, ProtocolError};

use crate::application::session::ClientChannel;

/// Primary socket path, created under the `RuntimeDirectory=` managed by
/// the systemd unit.
pub const PRIMARY_SOCKET_PATH: &str = "/run/crossmacro/crossmacro.sock";

/// Fallback path used when the primary directory doesn't exist (e.g. the
/// daemon was started outside of systemd).
pub const FALLBACK_SOCKET_PATH: &str = "/tmp/crossmacro.sock";

/// Unix group allowed to connect to the socket.
pub const SOCKET_GROUP: &str = "crossmacro";

#[derive(Debug, Error)]
pub enum IpcError {
    #[error("bind failed on both {primary} and {fallback}: {source}")]
    BindFailed {
        primary: PathBuf,
        fallback: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to set socket permissions: {0}")]
    Permissions(#[source] std::io::Error),
    #[error("the `{0}` group does not exist on this system")]
    UnknownGroup(String),
    #[error("connection closed before a complete frame arrived")]
    ConnectionClosed,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

/// Binds the daemon's listening socket, trying [`PRIMARY_SOCKET_PATH`] first
/// and falling back to [`FALLBACK_SOCKET_PATH`]. Removes a stale socket file
/// left behind by a crashed previous instance before binding.
///
/// On success, chmods the socket to `0660` and chowns its group to
/// [`SOCKET_GROUP`] so only members of that group may connect.
pub fn bind_socket() -> Result<UnixListener, IpcError> {
    match bind_at(Path::new(PRIMARY_SOCKET_PATH)) {
        Ok(listener) => Ok(listener),
        Err(primary_err) => match bind_at(Path::new(FALLBACK_SOCKET_PATH)) {
            Ok(listener) => Ok(listener),
            Err(_) => Err(IpcError::BindFailed {
                primary: PathBuf::from(PRIMARY_SOCKET_PATH),
                fallback: PathBuf::from(FALLBACK_SOCKET_PATH),
                source: primary_err,
            }),
        },
    }
}

fn bind_at(path: &Path) -> std::io::Result<UnixListener> {
    if path.exists() {
        std::fs::remove_file(path)?;
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let listener = UnixListener::bind(path)?;
    restrict_permissions(path)?;
    Ok(listener)
}

fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o660))?;

    match nix::unistd::Group::from_name(SOCKET_GROUP) {
        Ok(Some(group)) => {
            nix::unistd::chown(path, None, Some(group.gid)).map_err(std::io::Error::from)?;
        }
        Ok(None) => return Err(std::io::Error::other(IpcError::UnknownGroup(SOCKET_GROUP.to_string()))),
        Err(e) => return Err(std::io::Error::from(e)),
    }
    Ok(())
}

/// Resolves the effective uid of the peer on an accepted connection via
/// `SO_PEERCRED`.
pub fn peer_uid(stream: &UnixStream) -> std::io::Result<u32> {
    // SAFETY: `fd` is only borrowed for the duration of the getsockopt call
    // and stream outlives it, so the descriptor stays valid and owned by `stream`.
    let fd = unsafe { BorrowedFd::borrow_raw(stream.as_raw_fd()) };
    let creds = nix::sys::socket::getsockopt(&fd, nix::sys::socket::sockopt::PeerCredentials)
        .map_err(std::io::Error::from)?;
    Ok(creds.uid())
}

/// Reads and decodes one [`IpcMessage`] from `stream`, growing an internal
/// scratch buffer until a complete frame is available.
///
/// The wire codec (see `crossmacro_core::protocol::codec`) reports
/// [`ProtocolError::InsufficientData`] when the buffer doesn't yet hold a
/// full frame; this function treats that as "read more" rather than an
/// error, and only surfaces malformed/unknown-opcode frames to the caller.
pub async fn read_message(stream: &mut UnixStream, buf: &mut Vec<u8>) -> Result<IpcMessage, IpcError> {
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
            return Err(IpcError::ConnectionClosed);
        }
        buf.extend_from_slice(&chunk[..n]);
    }
}

/// Encodes and writes one [`IpcMessage`] to `stream`.
pub async fn write_message(stream: &mut UnixStream, msg: &IpcMessage) -> Result<(), IpcError> {
    let bytes = encode_message(msg);
    tokio::io::AsyncWriteExt::write_all(stream, &bytes).await?;
    Ok(())
}

/// Adapts an accepted [`UnixStream`] to the session state machine's
/// [`ClientChannel`] port.
pub struct FramedClient {
    stream: UnixStream,
    buf: Vec<u8>,
}

impl FramedClient {
    pub fn new(stream: UnixStream) -> Self {
        Self { stream, buf: Vec::new() }
    }

    pub fn peer_uid(&self) -> std::io::Result<u32> {
        peer_uid(&self.stream)
    }
}

#[async_trait]
impl ClientChannel for FramedClient {
    async fn send(&mut self, msg: &IpcMessage) -> Result<(), String> {
        write_message(&mut self.stream, msg).await.map_err(|e| e.to_string())
    }

    async fn recv(&mut self) -> Result<IpcMessage, String> {
        read_message(&mut self.stream, &mut self.buf).await.map_err(|e| e.to_string())
    }
}
