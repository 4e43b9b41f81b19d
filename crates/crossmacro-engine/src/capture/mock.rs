//! In-memory [`CaptureProvider`] for unit tests, grounded in
//! `crossmacro-daemon::infrastructure::input_capture::mock`.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crossmacro_core::domain::raw_event::RawInputEvent;

use super::CaptureProvider;

/// Replays a fixed script of events when started, ignoring `configure`
/// flags (tests decide what to feed it directly).
#[derive(Default)]
pub struct MockCaptureProvider {
    pub script: Vec<RawInputEvent>,
    pub started: bool,
    pub stopped: bool,
    pub capture_mouse: bool,
    pub capture_keyboard: bool,
}

impl MockCaptureProvider {
    pub fn new(script: Vec<RawInputEvent>) -> Self {
        Self { script, ..Default::default() }
    }
}

impl CaptureProvider for MockCaptureProvider {
    fn configure(&mut self, capture_mouse: bool, capture_keyboard: bool) {
        self.capture_mouse = capture_mouse;
        self.capture_keyboard = capture_keyboard;
    }

    fn start(&mut self, _cancel: CancellationToken) -> Result<(mpsc::UnboundedReceiver<RawInputEvent>, mpsc::UnboundedReceiver<String>), String> {
        self.started = true;
        let (tx, rx) = mpsc::unbounded_channel();
        for event in self.script.drain(..) {
            let _ = tx.send(event);
        }
        let (_err_tx, err_rx) = mpsc::unbounded_channel();
        Ok((rx, err_rx))
    }

    fn stop(&mut self) {
        self.stopped = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replays_script_in_order_then_closes() {
        let events = vec![RawInputEvent::key(30, 1, 0), RawInputEvent::key(30, 0, 1), RawInputEvent::sync(2)];
        let mut provider = MockCaptureProvider::new(events.clone());
        let (mut rx, _err_rx) = provider.start(CancellationToken::new()).unwrap();
        for expected in events {
            let got = rx.recv().await.unwrap();
            assert_eq!(got.code, expected.code);
            assert_eq!(got.value, expected.value);
        }
        assert!(rx.recv().await.is_none());
    }
}
