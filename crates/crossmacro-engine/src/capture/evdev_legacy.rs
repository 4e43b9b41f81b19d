//! Direct evdev capture, bypassing the daemon entirely — the legacy path
//! for engines that run with enough privilege to open `/dev/input/event*`
//! themselves (root, or membership of an `input`-group-equivalent).
//!
//! Grounded in `crossmacro-daemon::infrastructure::device`'s classification
//! and event-translation logic, which this module mirrors rather than
//! imports: the daemon's copy runs inside the privileged process and is not
//! a dependency of the engine crate.

#![cfg(target_os = "linux")]

use std::path::PathBuf;

use evdev::{Device, EventType, InputEvent, Key as EvdevKey, RelativeAxisType};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crossmacro_core::domain::raw_event::{RawEventKind, RawInputEvent};
use crossmacro_core::keymap::evdev::codes;
use crossmacro_core::keymap::Key;

use super::CaptureProvider;

const INPUT_DIR: &str = "/dev/input";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeviceKind {
    Keyboard,
    Mouse,
}

fn classify(device: &Device) -> Vec<DeviceKind> {
    let mut kinds = Vec::new();
    let has_letter_key = device
        .supported_keys()
        .map(|keys| (Key::A as u16..=Key::Z as u16).any(|code| keys.contains(EvdevKey::new(code))))
        .unwrap_or(false);
    if has_letter_key {
        kinds.push(DeviceKind::Keyboard);
    }
    let has_rel_motion = device
        .supported_relative_axes()
        .map(|axes| axes.contains(RelativeAxisType::REL_X) && axes.contains(RelativeAxisType::REL_Y))
        .unwrap_or(false);
    let has_left_button = device.supported_keys().map(|keys| keys.contains(EvdevKey::BTN_LEFT)).unwrap_or(false);
    if has_rel_motion || has_left_button {
        kinds.push(DeviceKind::Mouse);
    }
    kinds
}

fn discover_devices() -> std::io::Result<Vec<(Device, Vec<DeviceKind>)>> {
    let entries = std::fs::read_dir(INPUT_DIR)?;
    let mut found = Vec::new();
    for entry in entries.flatten() {
        let path: PathBuf = entry.path();
        if !path.file_name().and_then(|n| n.to_str()).is_some_and(|n| n.starts_with("event")) {
            continue;
        }
        let mut device = match Device::open(&path) {
            Ok(d) => d,
            Err(_) => continue,
        };
        let kinds = classify(&device);
        if kinds.is_empty() {
            continue;
        }
        let _ = device.set_nonblocking(true);
        found.push((device, kinds));
    }
    Ok(found)
}

fn raw_kind_for(event: &InputEvent) -> Option<(RawEventKind, i32)> {
    match event.event_type() {
        EventType::KEY => {
            let code = event.code() as i32;
            if code == evdev::Key::BTN_LEFT.code() || code == evdev::Key::BTN_RIGHT.code() || code == evdev::Key::BTN_MIDDLE.code() {
                Some((RawEventKind::MouseButton, code))
            } else {
                Some((RawEventKind::Key, code))
            }
        }
        EventType::RELATIVE => {
            let code = event.code() as i32;
            if code == codes::REL_WHEEL || code == codes::REL_HWHEEL {
                Some((RawEventKind::MouseScroll, code))
            } else {
                Some((RawEventKind::MouseMove, code))
            }
        }
        EventType::SYNCHRONIZATION => Some((RawEventKind::Sync, 0)),
        _ => None,
    }
}

pub struct EvdevLegacyProvider {
    devices: Vec<(Device, Vec<DeviceKind>)>,
    capture_mouse: bool,
    capture_keyboard: bool,
}

impl EvdevLegacyProvider {
    pub fn discover() -> Result<Self, String> {
        let devices = discover_devices().map_err(|e| e.to_string())?;
        if devices.is_empty() {
            return Err(format!("no keyboard or mouse devices found under {INPUT_DIR}"));
        }
        Ok(Self { devices, capture_mouse: true, capture_keyboard: true })
    }
}

impl CaptureProvider for EvdevLegacyProvider {
    fn configure(&mut self, capture_mouse: bool, capture_keyboard: bool) {
        self.capture_mouse = capture_mouse;
        self.capture_keyboard = capture_keyboard;
    }

    fn start(&mut self, cancel: CancellationToken) -> Result<(mpsc::UnboundedReceiver<RawInputEvent>, mpsc::UnboundedReceiver<String>), String> {
        let devices = std::mem::take(&mut self.devices);
        let (mouse, keyboard) = (self.capture_mouse, self.capture_keyboard);
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (error_tx, error_rx) = mpsc::unbounded_channel();

        std::thread::spawn(move || {
            let mut devices = devices;
            loop {
                if cancel.is_cancelled() {
                    return;
                }
                for (device, kinds) in devices.iter_mut() {
                    let wants = kinds.iter().any(|k| match k {
                        DeviceKind::Keyboard => keyboard,
                        DeviceKind::Mouse => mouse,
                    });
                    if !wants {
                        continue;
                    }
                    match device.fetch_events() {
                        Ok(events) => {
                            for event in events {
                                if let Some((kind, code)) = raw_kind_for(&event) {
                                    let raw = RawInputEvent { kind, code, value: event.value(), timestamp: event.timestamp_ticks() };
                                    if event_tx.send(raw).is_err() {
                                        return;
                                    }
                                }
                            }
                        }
                        Err(e) if e.kind() != std::io::ErrorKind::WouldBlock => {
                            let _ = error_tx.send(e.to_string());
                        }
                        Err(_) => {}
                    }
                }
                std::thread::sleep(std::time::Duration::from_millis(2));
            }
        });

        Ok((event_rx, error_rx))
    }

    fn stop(&mut self) {
        // The background thread checks `cancel` cooperatively; callers are
        // expected to cancel the token passed to `start`, since evdev's
        // blocking fd reads can't be interrupted from outside.
    }
}
