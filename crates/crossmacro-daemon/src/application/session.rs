//! DaemonSession: the per-connection state machine driving one authorized
//! client from handshake through capture/simulation to close.
//!
//! # Architecture
//!
//! This use case depends only on traits (`ClientChannel`, `Authorizer`,
//! `CaptureBackend`) and domain types, exactly like `RouteInputUseCase` in
//! the sibling engine crate's ancestor: infrastructure (the real AF_UNIX
//! socket, PolicyKit, evdev/uinput) is injected at construction time, so
//! the full state machine is unit-testable without a kernel socket.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crossmacro_core::domain::raw_event::RawInputEvent;
use crossmacro_core::protocol::messages::{
    ConfigureResolutionMessage, ErrorMessage, HandshakeMessage, InputEventMessage, SimulateEventMessage,
    StartCaptureMessage, PROTOCOL_VERSION,
};
use crossmacro_core::protocol::IpcMessage;

/// Authorizes an incoming connection's peer uid against the
/// `org.crossmacro.capture` policy action. Defined here so the state
/// machine depends only on the abstraction; `infrastructure::policy`
/// supplies the PolicyKit-backed implementation.
#[async_trait]
pub trait Authorizer: Send + Sync {
    async fn authorize(&self, uid: u32) -> bool;
}

/// Authorization timeout (§4.2: "denial or timeout (≥30s)").
const AUTHORIZATION_TIMEOUT: Duration = Duration::from_secs(30);
/// Handshake timeout (§4.2: "expect `Handshake{protocolVersion}` within 5s").
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);

/// The states named in §4.2's state machine. `AcceptingClient` is implicit
/// in the accept loop that constructs a session and is not represented
/// here; every other state corresponds to one phase of [`DaemonSession::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Authorizing,
    Handshaking,
    Ready,
    Capturing,
    Idle,
    ClosingClient,
}

#[derive(Debug, Error, PartialEq)]
pub enum DaemonError {
    /// A second client tried to connect while one was already active. The
    /// daemon is single-client, single-session (see DESIGN.md's Open
    /// Question decision); the connection is told why, not silently dropped.
    #[error("a client session is already active")]
    SessionBusy,
    #[error("peer was denied authorization for org.crossmacro.capture")]
    Unauthorized,
    #[error("no Handshake received within {0:?}")]
    HandshakeTimeout(Duration),
    #[error("protocol version mismatch: daemon speaks {daemon}, client sent {client}")]
    VersionMismatch { daemon: i32, client: i32 },
    #[error("unexpected message in state {state:?}: {message:?}")]
    UnexpectedMessage { state: SessionState, message: IpcMessage },
    #[error("channel error: {0}")]
    Channel(String),
    #[error("device backend error: {0}")]
    Backend(String),
}

/// Abstracts the per-connection byte transport so the state machine never
/// touches a raw socket directly.
#[async_trait]
pub trait ClientChannel: Send {
    async fn send(&mut self, msg: &IpcMessage) -> Result<(), String>;
    async fn recv(&mut self) -> Result<IpcMessage, String>;
}

/// Abstracts evdev capture + uinput simulation. One instance is shared by
/// every session (there is only ever one active session at a time).
#[async_trait]
pub trait CaptureBackend: Send + Sync {
    async fn start_capture(&self, mouse: bool, keyboard: bool);
    async fn stop_capture(&self);
    /// Waits for and returns the next captured event. Resolves only while
    /// capturing is active; callers race it against channel reads.
    async fn next_event(&self) -> Option<RawInputEvent>;
    async fn configure_resolution(&self, width: i32, height: i32) -> Result<(), String>;
    async fn simulate(&self, event_type: u16, code: u16, value: i32) -> Result<(), String>;
    /// Destroys the uinput device and clears capture flags. Called on
    /// `ClosingClient` so the next session starts from a clean `Listening`
    /// state, per §4.2.
    async fn teardown(&self);
}

/// Drives one client connection through `Authorizing → Handshaking → Ready
/// → (Capturing | Idle) → ClosingClient`.
pub struct DaemonSession<'a> {
    channel: &'a mut dyn ClientChannel,
    authorizer: Arc<dyn Authorizer>,
    backend: Arc<dyn CaptureBackend>,
    peer_uid: u32,
}

impl<'a> DaemonSession<'a> {
    pub fn new(
        channel: &'a mut dyn ClientChannel,
        authorizer: Arc<dyn Authorizer>,
        backend: Arc<dyn CaptureBackend>,
        peer_uid: u32,
    ) -> Self {
        Self { channel, authorizer, backend, peer_uid }
    }

    /// Runs the full session lifecycle. Always returns `Ok(())` once the
    /// connection is gracefully closed; failure paths send an `Error` frame
    /// to the client (best-effort) and return the [`DaemonError`] that
    /// caused the close, for logging at the call site.
    pub async fn run(mut self) -> Result<(), DaemonError> {
        if let Err(e) = self.authorize().await {
            let _ = self.send_error(&e).await;
            return Err(e);
        }
        if let Err(e) = self.handshake().await {
            let _ = self.send_error(&e).await;
            return Err(e);
        }

        let result = self.serve().await;
        self.backend.teardown().await;
        if let Err(e) = &result {
            let _ = self.send_error(e).await;
        }
        result
    }

    async fn authorize(&mut self) -> Result<(), DaemonError> {
        let authorized = tokio::time::timeout(AUTHORIZATION_TIMEOUT, self.authorizer.authorize(self.peer_uid))
            .await
            .unwrap_or(false);
        if authorized {
            Ok(())
        } else {
            Err(DaemonError::Unauthorized)
        }
    }

    async fn handshake(&mut self) -> Result<(), DaemonError> {
        let msg = tokio::time::timeout(HANDSHAKE_TIMEOUT, self.channel.recv())
            .await
            .map_err(|_| DaemonError::HandshakeTimeout(HANDSHAKE_TIMEOUT))?
            .map_err(DaemonError::Channel)?;

        let client_version = match msg {
            IpcMessage::Handshake(HandshakeMessage { protocol_version }) => protocol_version,
            other => {
                return Err(DaemonError::UnexpectedMessage { state: SessionState::Handshaking, message: other })
            }
        };

        if client_version != PROTOCOL_VERSION {
            return Err(DaemonError::VersionMismatch { daemon: PROTOCOL_VERSION, client: client_version });
        }

        self.channel
            .send(&IpcMessage::Handshake(HandshakeMessage { protocol_version: PROTOCOL_VERSION }))
            .await
            .map_err(DaemonError::Channel)?;
        Ok(())
    }

    /// `Ready`, alternating between `Idle` and `Capturing` as `StartCapture`
    /// / `StopCapture` arrive, until the client closes the connection.
    async fn serve(&mut self) -> Result<(), DaemonError> {
        let mut capturing = false;

        loop {
            tokio::select! {
                biased;

                incoming = self.channel.recv() => {
                    let msg = match incoming {
                        Ok(msg) => msg,
                        Err(_closed) => return Ok(()), // client disconnected
                    };
                    match msg {
                        IpcMessage::StartCapture(StartCaptureMessage { mouse, keyboard }) => {
                            self.backend.start_capture(mouse, keyboard).await;
                            capturing = true;
                        }
                        IpcMessage::StopCapture => {
                            self.backend.stop_capture().await;
                            capturing = false;
                        }
                        IpcMessage::ConfigureResolution(ConfigureResolutionMessage { width, height }) => {
                            if let Err(e) = self.backend.configure_resolution(width, height).await {
                                self.report_backend_error(e).await;
                            }
                        }
                        IpcMessage::SimulateEvent(SimulateEventMessage { event_type, code, value }) => {
                            if let Err(e) = self.backend.simulate(event_type, code, value).await {
                                self.report_backend_error(e).await;
                            }
                        }
                        IpcMessage::Error(_) => return Ok(()),
                        other => {
                            return Err(DaemonError::UnexpectedMessage { state: SessionState::Ready, message: other })
                        }
                    }
                }

                event = self.backend.next_event(), if capturing => {
                    if let Some(event) = event {
                        let frame = IpcMessage::InputEvent(InputEventMessage {
                            kind: event.kind as u8,
                            code: event.code,
                            value: event.value,
                            timestamp: event.timestamp as i64,
                        });
                        if self.channel.send(&frame).await.is_err() {
                            return Ok(());
                        }
                    }
                }
            }
        }
    }

    /// Kernel write errors are reported but must not end the session
    /// (§4.2 "Failure handling").
    async fn report_backend_error(&mut self, message: String) {
        let _ = self.channel.send(&IpcMessage::Error(ErrorMessage { description: message })).await;
    }

    async fn send_error(&mut self, err: &DaemonError) -> Result<(), String> {
        self.channel.send(&IpcMessage::Error(ErrorMessage { description: err.to_string() })).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::policy::tests_support::FixedAuthorizer;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct ScriptedChannel {
        inbox: VecDeque<IpcMessage>,
        outbox: Vec<IpcMessage>,
    }

    #[async_trait]
    impl ClientChannel for ScriptedChannel {
        async fn send(&mut self, msg: &IpcMessage) -> Result<(), String> {
            self.outbox.push(msg.clone());
            Ok(())
        }

        async fn recv(&mut self) -> Result<IpcMessage, String> {
            self.inbox.pop_front().ok_or_else(|| "closed".to_string())
        }
    }

    #[derive(Default)]
    struct NullBackend {
        started: Mutex<Option<(bool, bool)>>,
        resolution: Mutex<Option<(i32, i32)>>,
        simulated: Mutex<Vec<(u16, u16, i32)>>,
        torn_down: Mutex<bool>,
    }

    #[async_trait]
    impl CaptureBackend for NullBackend {
        async fn start_capture(&self, mouse: bool, keyboard: bool) {
            *self.started.lock().unwrap() = Some((mouse, keyboard));
        }

        async fn stop_capture(&self) {
            *self.started.lock().unwrap() = None;
        }

        async fn next_event(&self) -> Option<RawInputEvent> {
            std::future::pending().await
        }

        async fn configure_resolution(&self, width: i32, height: i32) -> Result<(), String> {
            *self.resolution.lock().unwrap() = Some((width, height));
            Ok(())
        }

        async fn simulate(&self, event_type: u16, code: u16, value: i32) -> Result<(), String> {
            self.simulated.lock().unwrap().push((event_type, code, value));
            Ok(())
        }

        async fn teardown(&self) {
            *self.torn_down.lock().unwrap() = true;
        }
    }

    fn handshake_msg() -> IpcMessage {
        IpcMessage::Handshake(HandshakeMessage { protocol_version: PROTOCOL_VERSION })
    }

    #[tokio::test]
    async fn denied_authorization_sends_error_and_stops() {
        let mut channel = ScriptedChannel { inbox: VecDeque::new(), outbox: Vec::new() };
        let backend = Arc::new(NullBackend::default());
        let session = DaemonSession::new(&mut channel, Arc::new(FixedAuthorizer::deny()), backend, 1000);

        let result = session.run().await;
        assert_eq!(result, Err(DaemonError::Unauthorized));
    }

    #[tokio::test]
    async fn version_mismatch_is_rejected() {
        let mut channel = ScriptedChannel {
            inbox: VecDeque::from([IpcMessage::Handshake(HandshakeMessage { protocol_version: 99 })]),
            outbox: Vec::new(),
        };
        let backend = Arc::new(NullBackend::default());
        let session = DaemonSession::new(&mut channel, Arc::new(FixedAuthorizer::allow()), backend, 1000);

        let result = session.run().await;
        assert!(matches!(result, Err(DaemonError::VersionMismatch { .. })));
    }

    #[tokio::test]
    async fn successful_handshake_then_disconnect_closes_cleanly() {
        let mut channel = ScriptedChannel { inbox: VecDeque::from([handshake_msg()]), outbox: Vec::new() };
        let backend = Arc::new(NullBackend::default());
        let session = DaemonSession::new(&mut channel, Arc::new(FixedAuthorizer::allow()), backend.clone(), 1000);

        let result = session.run().await;
        assert_eq!(result, Ok(()));
        assert!(*backend.torn_down.lock().unwrap());
    }

    #[tokio::test]
    async fn start_capture_then_stop_capture_then_disconnect() {
        let mut channel = ScriptedChannel {
            inbox: VecDeque::from([
                handshake_msg(),
                IpcMessage::StartCapture(StartCaptureMessage { mouse: true, keyboard: true }),
                IpcMessage::StopCapture,
            ]),
            outbox: Vec::new(),
        };
        let backend = Arc::new(NullBackend::default());
        let session = DaemonSession::new(&mut channel, Arc::new(FixedAuthorizer::allow()), backend.clone(), 1000);

        let result = session.run().await;
        assert_eq!(result, Ok(()));
        assert!(backend.started.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn configure_resolution_is_forwarded_to_backend() {
        let mut channel = ScriptedChannel {
            inbox: VecDeque::from([
                handshake_msg(),
                IpcMessage::ConfigureResolution(ConfigureResolutionMessage { width: 1920, height: 1080 }),
            ]),
            outbox: Vec::new(),
        };
        let backend = Arc::new(NullBackend::default());
        let session = DaemonSession::new(&mut channel, Arc::new(FixedAuthorizer::allow()), backend.clone(), 1000);

        session.run().await.unwrap();
        assert_eq!(*backend.resolution.lock().unwrap(), Some((1920, 1080)));
    }

    #[tokio::test]
    async fn simulate_event_is_forwarded_to_backend() {
        let mut channel = ScriptedChannel {
            inbox: VecDeque::from([
                handshake_msg(),
                IpcMessage::SimulateEvent(SimulateEventMessage { event_type: 1, code: 30, value: 1 }),
            ]),
            outbox: Vec::new(),
        };
        let backend = Arc::new(NullBackend::default());
        let session = DaemonSession::new(&mut channel, Arc::new(FixedAuthorizer::allow()), backend.clone(), 1000);

        session.run().await.unwrap();
        assert_eq!(*backend.simulated.lock().unwrap(), vec![(1, 30, 1)]);
    }
}
