//! crossmacro-daemon entry point.
//!
//! Binds the privileged capture/simulation socket, accepts exactly one
//! authorized client at a time, and drives each connection through
//! [`crossmacro_daemon::application::session::DaemonSession`].
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ bind_socket()                 -- AF_UNIX listener, §6 paths
//!  └─ sd_notify READY=1             -- tell the service manager we're up
//!  └─ accept loop
//!       ├─ a session is already active -> Error(SessionBusy), close
//!       └─ otherwise -> DaemonSession::run() against a shared EvdevBackend
//!  └─ SIGTERM/SIGINT -> sd_notify STOPPING=1, exit
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crossmacro_core::protocol::messages::ErrorMessage;
use crossmacro_core::protocol::IpcMessage;

use crossmacro_daemon::application::session::{ClientChannel, DaemonSession};
use crossmacro_daemon::infrastructure::device::{discover_devices, EvdevBackend};
use crossmacro_daemon::infrastructure::ipc::{bind_socket, FramedClient};
use crossmacro_daemon::infrastructure::policy::PolicyKitAuthorizer;

/// crossmacro-daemon: privileged input capture/simulation service.
#[derive(Debug, Parser)]
#[command(name = "crossmacro-daemon", about = "Privileged Linux input daemon for CrossMacro", version)]
struct Cli {
    /// Logging verbosity, overridable per-module via `RUST_LOG`.
    #[arg(long, default_value = "info", env = "CROSSMACRO_LOG")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level.clone())))
        .init();

    info!("crossmacro-daemon starting");

    let devices = discover_devices()?;
    info!(count = devices.len(), "discovered capture devices");
    let backend = Arc::new(EvdevBackend::new(devices));

    let authorizer: Arc<PolicyKitAuthorizer> = Arc::new(
        PolicyKitAuthorizer::connect()
            .await
            .map_err(|e| anyhow::anyhow!("failed to connect to the system D-Bus for PolicyKit: {e}"))?,
    );

    let listener = bind_socket()?;
    info!("listening for clients");

    let _ = sd_notify::notify(false, &[sd_notify::NotifyState::Ready]);

    let session_active = Arc::new(AtomicBool::new(false));
    let running = Arc::new(AtomicBool::new(true));

    let running_for_signal = Arc::clone(&running);
    tokio::spawn(async move {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
        info!("shutdown signal received");
        running_for_signal.store(false, Ordering::Relaxed);
    });

    while running.load(Ordering::Relaxed) {
        let accept_result = tokio::time::timeout(std::time::Duration::from_millis(200), listener.accept()).await;
        let stream = match accept_result {
            Ok(Ok((stream, _addr))) => stream,
            Ok(Err(e)) => {
                warn!("accept failed: {e}");
                continue;
            }
            Err(_timeout) => continue,
        };

        let mut client = FramedClient::new(stream);

        if session_active.swap(true, Ordering::AcqRel) {
            // A session is already active; tell this connection why rather
            // than dropping it silently (DESIGN.md's SessionBusy decision).
            let _ = client
                .send(&IpcMessage::Error(ErrorMessage { description: "a client session is already active".to_string() }))
                .await;
            session_active.store(false, Ordering::Release);
            continue;
        }

        let uid = match client.peer_uid() {
            Ok(uid) => uid,
            Err(e) => {
                warn!("failed to resolve peer credentials: {e}");
                session_active.store(false, Ordering::Release);
                continue;
            }
        };

        let backend = Arc::clone(&backend) as Arc<dyn crossmacro_daemon::application::session::CaptureBackend>;
        let authorizer = Arc::clone(&authorizer) as Arc<dyn crossmacro_daemon::application::session::Authorizer>;
        let session_active = Arc::clone(&session_active);

        tokio::spawn(async move {
            let mut client = client;
            let session = DaemonSession::new(&mut client, authorizer, backend, uid);
            if let Err(e) = session.run().await {
                warn!("session ended: {e}");
            }
            session_active.store(false, Ordering::Release);
        });
    }

    info!("crossmacro-daemon stopped");
    let _ = sd_notify::notify(false, &[sd_notify::NotifyState::Stopping]);
    Ok(())
}
