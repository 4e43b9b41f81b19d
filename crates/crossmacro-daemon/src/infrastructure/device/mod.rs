//! evdev device discovery/classification and uinput virtual device
//! management — the concrete [`CaptureBackend`] adapter backing
//! [`crate::application::session::DaemonSession`].
//!
//! # What is evdev/uinput? (for beginners)
//!
//! Every physical keyboard and mouse on Linux shows up as a character
//! device under `/dev/input/event*`, emitting a stream of `(type, code,
//! value)` tuples (a key press, a relative mouse delta, ...). That's
//! *evdev*. `uinput` is the mirror image: writing the same kind of tuples
//! to `/dev/uinput` creates a **virtual** keyboard/mouse the kernel treats
//! as real, which is how the daemon injects synthetic input on behalf of a
//! client.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use evdev::uinput::{VirtualDevice, VirtualDeviceBuilder};
use evdev::{AttributeSet, Device, EventType, InputEvent, Key as EvdevKey, RelativeAxisType};
use thiserror::Error;
use tokio::sync::Mutex;

use crossmacro_core::domain::raw_event::{RawEventKind, RawInputEvent};
use crossmacro_core::keymap::Key;

use crate::application::session::CaptureBackend;

const INPUT_DIR: &str = "/dev/input";

#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("failed to scan {dir}: {source}")]
    Scan {
        dir: &'static str,
        #[source]
        source: io::Error,
    },
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("no keyboard or mouse devices found under {INPUT_DIR}")]
    NoDevicesFound,
    #[error("uinput device creation failed: {0}")]
    UinputCreate(#[source] io::Error),
    #[error("write to uinput device failed: {0}")]
    UinputWrite(#[source] io::Error),
}

/// A device's classification, per the capability-bitmask rule in §4.2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    Keyboard,
    Mouse,
}

/// Classifies a device by the capability bitmasks it reports. A device may
/// satisfy both checks (rare, e.g. some all-in-one receivers); it is then
/// captured under both roles.
fn classify(device: &Device) -> Vec<DeviceKind> {
    let mut kinds = Vec::new();

    let has_letter_key = device
        .supported_keys()
        .map(|keys| (Key::A as u16..=Key::Z as u16).any(|code| keys.contains(EvdevKey::new(code))))
        .unwrap_or(false);
    if has_letter_key {
        kinds.push(DeviceKind::Keyboard);
    }

    let rel_axes = device.supported_relative_axes();
    let has_rel_motion = rel_axes
        .map(|axes| axes.contains(RelativeAxisType::REL_X) && axes.contains(RelativeAxisType::REL_Y))
        .unwrap_or(false);
    let has_left_button = device
        .supported_keys()
        .map(|keys| keys.contains(EvdevKey::BTN_LEFT))
        .unwrap_or(false);
    if has_rel_motion || has_left_button {
        kinds.push(DeviceKind::Mouse);
    }

    kinds
}

/// Scans `/dev/input` and opens every device classified as a keyboard or
/// mouse, non-blockingly.
pub fn discover_devices() -> Result<Vec<(Device, Vec<DeviceKind>)>, DeviceError> {
    let entries = std::fs::read_dir(INPUT_DIR).map_err(|source| DeviceError::Scan { dir: INPUT_DIR, source })?;

    let mut found = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.file_name().and_then(|n| n.to_str()).is_some_and(|n| n.starts_with("event")) {
            continue;
        }
        let mut device = match Device::open(&path) {
            Ok(d) => d,
            Err(_) => continue, // permission denied or races with device removal are not fatal
        };
        let kinds = classify(&device);
        if kinds.is_empty() {
            continue;
        }
        let _ = device.set_nonblocking(true);
        found.push((device, kinds));
    }

    if found.is_empty() {
        return Err(DeviceError::NoDevicesFound);
    }
    Ok(found)
}

fn raw_kind_for(event: &InputEvent) -> Option<(RawEventKind, i32)> {
    match event.event_type() {
        EventType::KEY => {
            let code = event.code() as i32;
            if code == evdev::Key::BTN_LEFT.code()
                || code == evdev::Key::BTN_RIGHT.code()
                || code == evdev::Key::BTN_MIDDLE.code()
            {
                Some((RawEventKind::MouseButton, code))
            } else {
                Some((RawEventKind::Key, code))
            }
        }
        EventType::RELATIVE => {
            let code = event.code() as i32;
            if code == crossmacro_core::keymap::evdev::codes::REL_WHEEL
                || code == crossmacro_core::keymap::evdev::codes::REL_HWHEEL
            {
                Some((RawEventKind::MouseScroll, code))
            } else {
                Some((RawEventKind::MouseMove, code))
            }
        }
        EventType::SYNCHRONIZATION => Some((RawEventKind::Sync, 0)),
        _ => None,
    }
}

/// The live capture/simulation backend: owns the open evdev capture
/// devices and, once configured, the uinput virtual device.
pub struct EvdevBackend {
    devices: Mutex<Vec<(Device, Vec<DeviceKind>)>>,
    capturing: Mutex<Option<CaptureFilter>>,
    uinput: Mutex<Option<VirtualDevice>>,
}

#[derive(Debug, Clone, Copy)]
struct CaptureFilter {
    mouse: bool,
    keyboard: bool,
}

impl EvdevBackend {
    pub fn new(devices: Vec<(Device, Vec<DeviceKind>)>) -> Self {
        Self {
            devices: Mutex::new(devices),
            capturing: Mutex::new(None),
            uinput: Mutex::new(None),
        }
    }
}

#[async_trait]
impl CaptureBackend for EvdevBackend {
    async fn start_capture(&self, mouse: bool, keyboard: bool) {
        *self.capturing.lock().await = Some(CaptureFilter { mouse, keyboard });
    }

    async fn stop_capture(&self) {
        *self.capturing.lock().await = None;
    }

    async fn next_event(&self) -> Option<RawInputEvent> {
        loop {
            let filter = (*self.capturing.lock().await)?;
            let mut devices = self.devices.lock().await;
            for (device, kinds) in devices.iter_mut() {
                let wants_device = kinds.iter().any(|k| match k {
                    DeviceKind::Keyboard => filter.keyboard,
                    DeviceKind::Mouse => filter.mouse,
                });
                if !wants_device {
                    continue;
                }
                if let Ok(events) = device.fetch_events() {
                    for event in events {
                        if let Some((kind, code)) = raw_kind_for(&event) {
                            return Some(RawInputEvent { kind, code, value: event.value(), timestamp: event.timestamp_ticks() });
                        }
                    }
                }
            }
            drop(devices);
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        }
    }

    async fn configure_resolution(&self, width: i32, height: i32) -> Result<(), String> {
        let device = if width > 0 && height > 0 {
            build_absolute_device(width, height)
        } else {
            build_relative_device()
        }
        .map_err(|e| e.to_string())?;

        *self.uinput.lock().await = Some(device);
        // Let the kernel finish registering the new input device before the
        // first synthetic event is written.
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        Ok(())
    }

    async fn simulate(&self, event_type: u16, code: u16, value: i32) -> Result<(), String> {
        let mut guard = self.uinput.lock().await;
        let device = guard.as_mut().ok_or_else(|| "no virtual device configured".to_string())?;
        let event = InputEvent::new(EventType(event_type), code, value);
        device.emit(&[event]).map_err(|e| e.to_string())
    }

    async fn teardown(&self) {
        *self.uinput.lock().await = None;
        *self.capturing.lock().await = None;
    }
}

fn all_key_codes() -> AttributeSet<EvdevKey> {
    let mut keys = AttributeSet::new();
    for code in 1u16..255 {
        keys.insert(EvdevKey::new(code));
    }
    keys
}

/// Vendor/product/version/bus identity §6 mandates for the virtual device,
/// so userspace tools (and the kernel's own device matching) see a stable
/// identity across relative and absolute variants.
fn virtual_device_id() -> evdev::InputId {
    evdev::InputId::new(evdev::BusType::BUS_USB, 0x1234, 0x5678, 1)
}

const VIRTUAL_DEVICE_NAME: &str = "CrossMacro Virtual Input Device";

fn build_relative_device() -> Result<VirtualDevice, DeviceError> {
    let keys = all_key_codes();
    let mut rel_axes = AttributeSet::new();
    rel_axes.insert(RelativeAxisType::REL_X);
    rel_axes.insert(RelativeAxisType::REL_Y);
    rel_axes.insert(RelativeAxisType::REL_WHEEL);

    VirtualDeviceBuilder::new()
        .map_err(DeviceError::UinputCreate)?
        .name(VIRTUAL_DEVICE_NAME)
        .input_id(virtual_device_id())
        .with_keys(&keys)
        .map_err(DeviceError::UinputCreate)?
        .with_relative_axes(&rel_axes)
        .map_err(DeviceError::UinputCreate)?
        .build()
        .map_err(DeviceError::UinputCreate)
}

fn build_absolute_device(width: i32, height: i32) -> Result<VirtualDevice, DeviceError> {
    use evdev::{AbsInfo, AbsoluteAxisType, PropType, UinputAbsSetup};

    let keys = all_key_codes();
    let mut rel_axes = AttributeSet::new();
    rel_axes.insert(RelativeAxisType::REL_X);
    rel_axes.insert(RelativeAxisType::REL_Y);
    rel_axes.insert(RelativeAxisType::REL_WHEEL);

    let mut props = AttributeSet::new();
    props.insert(PropType::DIRECT);

    let abs_x = UinputAbsSetup::new(AbsoluteAxisType::ABS_X, AbsInfo::new(0, 0, width - 1, 0, 0, 1));
    let abs_y = UinputAbsSetup::new(AbsoluteAxisType::ABS_Y, AbsInfo::new(0, 0, height - 1, 0, 0, 1));

    VirtualDeviceBuilder::new()
        .map_err(DeviceError::UinputCreate)?
        .name(VIRTUAL_DEVICE_NAME)
        .input_id(virtual_device_id())
        .with_keys(&keys)
        .map_err(DeviceError::UinputCreate)?
        .with_relative_axes(&rel_axes)
        .map_err(DeviceError::UinputCreate)?
        .with_absolute_axis(&abs_x)
        .map_err(DeviceError::UinputCreate)?
        .with_absolute_axis(&abs_y)
        .map_err(DeviceError::UinputCreate)?
        .with_properties(&props)
        .map_err(DeviceError::UinputCreate)?
        .build()
        .map_err(DeviceError::UinputCreate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_kind_for_left_button_classifies_as_mouse_button() {
        let event = InputEvent::new(EventType::KEY, evdev::Key::BTN_LEFT.code(), 1);
        let (kind, code) = raw_kind_for(&event).unwrap();
        assert_eq!(kind, RawEventKind::MouseButton);
        assert_eq!(code, evdev::Key::BTN_LEFT.code() as i32);
    }

    #[test]
    fn raw_kind_for_letter_key_classifies_as_key() {
        let event = InputEvent::new(EventType::KEY, Key::A as u16, 1);
        let (kind, _code) = raw_kind_for(&event).unwrap();
        assert_eq!(kind, RawEventKind::Key);
    }

    #[test]
    fn raw_kind_for_wheel_classifies_as_scroll() {
        let event = InputEvent::new(
            EventType::RELATIVE,
            crossmacro_core::keymap::evdev::codes::REL_WHEEL as u16,
            1,
        );
        let (kind, _code) = raw_kind_for(&event).unwrap();
        assert_eq!(kind, RawEventKind::MouseScroll);
    }
}
