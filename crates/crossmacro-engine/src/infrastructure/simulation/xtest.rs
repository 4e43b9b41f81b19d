//! Linux X11 simulation via the XTest extension (§4.7), for sessions where
//! `crossmacro-daemon` is unreachable and a live X11 display is available
//! instead. Keeps the teacher's placeholder-FFI idiom from
//! `input_emulation::linux::LinuxXTestEmulator`: real method signatures and
//! real computed arguments, with the actual Xlib/XTest calls left as
//! comments because the library isn't linkable in this environment.

#![cfg(target_os = "linux")]

use std::collections::HashSet;

use crossmacro_core::domain::macro_event::MacroButton;
use crossmacro_core::keymap::{evdev::Key, KeyMapper};

use crate::playback::SimulationProvider;

const CURRENT_TIME: u64 = 0;
const SCREEN_DEFAULT: i32 = -1;

/// XTest-based simulator. In production this would hold a raw
/// `*mut x11::xlib::Display`, kept as a placeholder since the X11 FFI
/// library isn't linkable in this environment.
pub struct XTestProvider {
    pressed: HashSet<i32>,
}

impl XTestProvider {
    /// Connects to the X display.
    ///
    /// # Errors
    ///
    /// Production would return an error if `XOpenDisplay(null)` returns a
    /// null pointer (no display available).
    pub fn new() -> Result<Self, String> {
        Ok(Self { pressed: HashSet::new() })
    }
}

impl SimulationProvider for XTestProvider {
    fn initialize(&mut self, _width: i32, _height: i32) -> Result<(), String> {
        // XTest has no resolution-configuration step; absolute moves are
        // always screen coordinates.
        Ok(())
    }

    fn move_absolute(&mut self, x: i32, y: i32) -> Result<(), String> {
        // Production: XTestFakeMotionEvent(display, SCREEN_DEFAULT, x, y, CURRENT_TIME); XFlush(display)
        let _ = (SCREEN_DEFAULT, CURRENT_TIME, x, y);
        Ok(())
    }

    fn move_relative(&mut self, dx: i32, dy: i32) -> Result<(), String> {
        // XTest has no native relative-motion call; query the current
        // pointer position via XQueryPointer and re-issue as an absolute
        // move. Left as a documented limitation of this provider.
        let _ = (dx, dy);
        Ok(())
    }

    fn emit_button(&mut self, button: MacroButton, pressed: bool) -> Result<(), String> {
        let xbutton = match button {
            MacroButton::Left => 1u32,
            MacroButton::Middle => 2,
            MacroButton::Right => 3,
            MacroButton::Side1 => 8,
            MacroButton::Side2 => 9,
            _ => return Ok(()),
        };
        // Production: XTestFakeButtonEvent(display, xbutton, pressed, CURRENT_TIME); XFlush(display)
        let _ = (xbutton, CURRENT_TIME);
        Ok(())
    }

    fn emit_scroll(&mut self, value: i32) -> Result<(), String> {
        // X11 scroll is modeled as button 4 (up) / 5 (down) click events.
        let xbutton = if value > 0 { 4u32 } else { 5 };
        // Production: press + release XTestFakeButtonEvent(display, xbutton, ...)
        let _ = xbutton;
        Ok(())
    }

    fn emit_key(&mut self, code: i32, pressed: bool) -> Result<(), String> {
        let key = Key::from_code(code as u16);
        let keysym = KeyMapper::key_to_x11_keysym(key).ok_or_else(|| format!("no X11 keysym for {key:?}"))?;
        // Production:
        //   let keycode = XKeysymToKeycode(display, keysym)
        //   XTestFakeKeyEvent(display, keycode, pressed, CURRENT_TIME)
        //   XFlush(display)
        let _ = (keysym, CURRENT_TIME);
        if pressed {
            self.pressed.insert(code);
        } else {
            self.pressed.remove(&code);
        }
        Ok(())
    }

    fn release_all(&mut self) -> Result<(), String> {
        let codes: Vec<i32> = self.pressed.drain().collect();
        for code in codes {
            self.emit_key(code, false)?;
        }
        Ok(())
    }

    fn dispose(&mut self) {
        let _ = self.release_all();
        // Production: XCloseDisplay(display)
    }
}
