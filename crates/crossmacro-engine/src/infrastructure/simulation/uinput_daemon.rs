//! uinput-via-daemon simulation provider (§4.7) — the default on Linux.
//!
//! Every logical action ends with an explicit `EV_SYN/SYN_REPORT` frame, as
//! the protocol requires the client (not the daemon) to terminate each
//! sample group. This is the only provider in this module that's fully
//! live: there's no FFI involved, just frames over the already-working
//! [`crate::infrastructure::ipc::IpcClient`].

#![cfg(target_os = "linux")]

use std::collections::HashSet;

use crossmacro_core::domain::macro_event::MacroButton;
use crossmacro_core::keymap::evdev::codes;
use crossmacro_core::protocol::messages::{event_type, SimulateEventMessage};

use crate::infrastructure::ipc::IpcClient;
use crate::playback::SimulationProvider;

fn button_code(button: MacroButton) -> Option<u16> {
    let code = match button {
        MacroButton::Left => codes::BTN_LEFT,
        MacroButton::Right => codes::BTN_RIGHT,
        MacroButton::Middle => codes::BTN_MIDDLE,
        MacroButton::Side1 => codes::BTN_SIDE,
        MacroButton::Side2 => codes::BTN_EXTRA,
        _ => return None,
    };
    Some(code as u16)
}

fn sync_frame() -> SimulateEventMessage {
    SimulateEventMessage { event_type: event_type::EV_SYN, code: 0, value: 0 }
}

/// Drives the daemon's uinput device via IPC frames. [`SimulationProvider`]
/// is a synchronous trait (matching §4.7's uniform surface across all
/// platforms), so each call bridges into the client's async API via
/// [`tokio::task::block_in_place`] — safe here because the playback engine
/// always runs on a multi-thread Tokio runtime, never `current_thread`.
pub struct UinputDaemonProvider {
    client: IpcClient,
    handle: tokio::runtime::Handle,
    pressed: HashSet<i32>,
}

impl UinputDaemonProvider {
    pub fn new(client: IpcClient, handle: tokio::runtime::Handle) -> Self {
        Self { client, handle, pressed: HashSet::new() }
    }

    fn send(&self, frame: SimulateEventMessage) -> Result<(), String> {
        let client = self.client.clone();
        let handle = self.handle.clone();
        tokio::task::block_in_place(|| handle.block_on(async move { client.simulate_event(frame.event_type, frame.code, frame.value).await }))
            .map_err(|e| e.to_string())
    }

    fn send_batch(&self, frames: &[SimulateEventMessage]) -> Result<(), String> {
        let client = self.client.clone();
        let handle = self.handle.clone();
        let frames = frames.to_vec();
        tokio::task::block_in_place(|| handle.block_on(async move { client.simulate_batch(&frames).await })).map_err(|e| e.to_string())
    }
}

impl SimulationProvider for UinputDaemonProvider {
    fn initialize(&mut self, width: i32, height: i32) -> Result<(), String> {
        let client = self.client.clone();
        let handle = self.handle.clone();
        tokio::task::block_in_place(|| handle.block_on(async move { client.configure_resolution(width, height).await })).map_err(|e| e.to_string())
    }

    fn move_absolute(&mut self, x: i32, y: i32) -> Result<(), String> {
        self.send_batch(&[
            SimulateEventMessage { event_type: event_type::EV_ABS, code: codes::ABS_X as u16, value: x },
            SimulateEventMessage { event_type: event_type::EV_ABS, code: codes::ABS_Y as u16, value: y },
            sync_frame(),
        ])
    }

    fn move_relative(&mut self, dx: i32, dy: i32) -> Result<(), String> {
        self.send_batch(&[
            SimulateEventMessage { event_type: event_type::EV_REL, code: codes::REL_X as u16, value: dx },
            SimulateEventMessage { event_type: event_type::EV_REL, code: codes::REL_Y as u16, value: dy },
            sync_frame(),
        ])
    }

    fn emit_button(&mut self, button: MacroButton, pressed: bool) -> Result<(), String> {
        let Some(code) = button_code(button) else { return Ok(()) };
        if pressed {
            self.pressed.insert(code as i32);
        } else {
            self.pressed.remove(&(code as i32));
        }
        self.send_batch(&[
            SimulateEventMessage { event_type: event_type::EV_KEY, code, value: pressed as i32 },
            sync_frame(),
        ])
    }

    fn emit_scroll(&mut self, value: i32) -> Result<(), String> {
        self.send_batch(&[
            SimulateEventMessage { event_type: event_type::EV_REL, code: codes::REL_WHEEL as u16, value: value.signum() },
            sync_frame(),
        ])
    }

    fn emit_key(&mut self, code: i32, pressed: bool) -> Result<(), String> {
        if pressed {
            self.pressed.insert(code);
        } else {
            self.pressed.remove(&code);
        }
        self.send_batch(&[
            SimulateEventMessage { event_type: event_type::EV_KEY, code: code as u16, value: pressed as i32 },
            sync_frame(),
        ])
    }

    fn release_all(&mut self) -> Result<(), String> {
        let codes: Vec<i32> = self.pressed.drain().collect();
        for code in codes {
            self.send(SimulateEventMessage { event_type: event_type::EV_KEY, code: code as u16, value: 0 })?;
        }
        self.send(sync_frame())
    }

    fn dispose(&mut self) {
        let _ = self.release_all();
    }
}
