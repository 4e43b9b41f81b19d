//! Capture providers (C4) — get raw kernel-like input events to the common
//! coordinate-strategy + recording pipeline.
//!
//! Grounded in `crossmacro-daemon`'s own `input_capture::InputSource` trait
//! (same shape: `start`, `stop`, event channel), generalized to the uniform
//! cross-platform surface and to [`RawInputEvent`] instead of a
//! Windows-specific event enum, since on this side of the wire every
//! provider must agree on one vocabulary.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crossmacro_core::domain::raw_event::RawInputEvent;

pub mod mock;

#[cfg(target_os = "linux")]
pub mod evdev_legacy;
#[cfg(target_os = "linux")]
pub mod ipc;
#[cfg(target_os = "linux")]
pub mod x11;

#[cfg(target_os = "windows")]
pub mod windows;

#[cfg(target_os = "macos")]
pub mod macos;

/// Uniform surface every capture backend implements (§4.8). Events are
/// delivered in arrival order; every logical sample group ends with a
/// `Sync` event, synthesized by providers that don't emit one natively.
pub trait CaptureProvider: Send {
    /// Sets which device classes to report events from. Safe to call before
    /// or after [`Self::start`]; backends that can't retarget a running
    /// capture mid-flight apply the new flags as a filter on emitted events.
    fn configure(&mut self, capture_mouse: bool, capture_keyboard: bool);

    /// Starts capturing. `cancel` lets the caller stop the provider's
    /// background work cooperatively; the returned receivers stay open
    /// until [`Self::stop`] or cancellation.
    fn start(&mut self, cancel: CancellationToken) -> Result<(mpsc::UnboundedReceiver<RawInputEvent>, mpsc::UnboundedReceiver<String>), String>;

    /// Idempotent: calling `stop` on an already-stopped provider is a no-op.
    fn stop(&mut self);

    /// Implies `stop`.
    fn dispose(&mut self) {
        self.stop();
    }
}
