//! In-memory [`SimulationProvider`] for unit tests, replacing the prior
//! `MockInputEmulator`'s HID-code recording with the evdev-code surface
//! this workspace's simulation providers share.

use std::collections::HashSet;

use crossmacro_core::domain::macro_event::MacroButton;

use crate::playback::SimulationProvider;

#[derive(Debug, Default)]
pub struct MockSimulationProvider {
    pub moves: Vec<(i32, i32, bool)>, // (x, y, is_absolute)
    pub buttons: Vec<(MacroButton, bool)>,
    pub scrolls: Vec<i32>,
    pub keys: Vec<(i32, bool)>,
    pub pressed: HashSet<i32>,
    pub disposed: bool,
    pub should_fail: bool,
}

impl MockSimulationProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn check(&self) -> Result<(), String> {
        if self.should_fail { Err("mock simulation failure".to_string()) } else { Ok(()) }
    }
}

impl SimulationProvider for MockSimulationProvider {
    fn initialize(&mut self, _width: i32, _height: i32) -> Result<(), String> {
        self.check()
    }

    fn move_absolute(&mut self, x: i32, y: i32) -> Result<(), String> {
        self.check()?;
        self.moves.push((x, y, true));
        Ok(())
    }

    fn move_relative(&mut self, dx: i32, dy: i32) -> Result<(), String> {
        self.check()?;
        self.moves.push((dx, dy, false));
        Ok(())
    }

    fn emit_button(&mut self, button: MacroButton, pressed: bool) -> Result<(), String> {
        self.check()?;
        self.buttons.push((button, pressed));
        Ok(())
    }

    fn emit_scroll(&mut self, value: i32) -> Result<(), String> {
        self.check()?;
        self.scrolls.push(value);
        Ok(())
    }

    fn emit_key(&mut self, code: i32, pressed: bool) -> Result<(), String> {
        self.check()?;
        self.keys.push((code, pressed));
        if pressed {
            self.pressed.insert(code);
        } else {
            self.pressed.remove(&code);
        }
        Ok(())
    }

    fn release_all(&mut self) -> Result<(), String> {
        self.pressed.clear();
        Ok(())
    }

    fn dispose(&mut self) {
        self.disposed = true;
    }
}
