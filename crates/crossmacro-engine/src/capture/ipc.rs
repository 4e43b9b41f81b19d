//! Thin capture shim over [`IpcClient`] — the default on Linux, since the
//! daemon is already doing the device multiplexing. Forwards
//! `IpcEvent::InputReceived` verbatim and turns `IpcEvent::Error` into the
//! error stream.

#![cfg(target_os = "linux")]

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crossmacro_core::domain::raw_event::RawInputEvent;

use crate::infrastructure::ipc::{IpcClient, IpcEvent};

use super::CaptureProvider;

pub struct IpcCaptureProvider {
    client: IpcClient,
    events: Option<mpsc::UnboundedReceiver<IpcEvent>>,
    capture_mouse: bool,
    capture_keyboard: bool,
    handle: tokio::runtime::Handle,
}

impl IpcCaptureProvider {
    pub fn new(client: IpcClient, events: mpsc::UnboundedReceiver<IpcEvent>, handle: tokio::runtime::Handle) -> Self {
        Self { client, events: Some(events), capture_mouse: true, capture_keyboard: true, handle }
    }

    fn send_start(&self) {
        let client = self.client.clone();
        let (mouse, keyboard) = (self.capture_mouse, self.capture_keyboard);
        self.handle.spawn(async move {
            let _ = client.start_capture(mouse, keyboard).await;
        });
    }
}

impl CaptureProvider for IpcCaptureProvider {
    fn configure(&mut self, capture_mouse: bool, capture_keyboard: bool) {
        self.capture_mouse = capture_mouse;
        self.capture_keyboard = capture_keyboard;
        // §4.3: any start_capture call re-sends the frame so flag changes
        // take effect while already capturing.
        self.send_start();
    }

    fn start(&mut self, cancel: CancellationToken) -> Result<(mpsc::UnboundedReceiver<RawInputEvent>, mpsc::UnboundedReceiver<String>), String> {
        let mut upstream = self.events.take().ok_or("capture already started")?;
        self.send_start();

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (error_tx, error_rx) = mpsc::unbounded_channel();

        self.handle.spawn(async move {
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => return,
                    msg = upstream.recv() => match msg {
                        Some(IpcEvent::InputReceived(event)) => {
                            if event_tx.send(event).is_err() {
                                return;
                            }
                        }
                        Some(IpcEvent::Error(message)) => {
                            let _ = error_tx.send(message);
                        }
                        None => return,
                    },
                }
            }
        });

        Ok((event_rx, error_rx))
    }

    fn stop(&mut self) {
        let client = self.client.clone();
        self.handle.spawn(async move {
            let _ = client.stop_capture().await;
        });
    }
}
