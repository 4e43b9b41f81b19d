//! macOS simulation via CoreGraphics events (§4.7).
//!
//! Grounded in `input_emulation::macos::MacosInputEmulator`'s placeholder-FFI
//! idiom: the real CoreGraphics calls are commented out since the framework
//! isn't linkable in this environment, but keycode translation and the
//! required Y-axis flip are computed for real.

#![cfg(target_os = "macos")]

use std::collections::HashSet;

use crossmacro_core::domain::macro_event::MacroButton;
use crossmacro_core::keymap::{evdev::Key, KeyMapper};

use crate::playback::SimulationProvider;

/// CoreGraphics event-tap simulator. Requires Accessibility permission,
/// checked at construction time.
pub struct MacosSimulationProvider {
    pressed: HashSet<i32>,
    screen_height: i32,
}

impl MacosSimulationProvider {
    /// # Errors
    ///
    /// Production would return an error if `AXIsProcessTrustedWithOptions`
    /// reports the process isn't trusted for Accessibility.
    pub fn new() -> Result<Self, String> {
        // Production: AXIsProcessTrustedWithOptions({kAXTrustedCheckOptionPrompt: true})
        Ok(Self { pressed: HashSet::new(), screen_height: 0 })
    }

    /// CoreGraphics' origin is the bottom-left of the primary display;
    /// macro coordinates are top-left origin like every other platform.
    fn flip_y(&self, y: i32) -> i32 {
        self.screen_height - y
    }
}

impl SimulationProvider for MacosSimulationProvider {
    fn initialize(&mut self, _width: i32, height: i32) -> Result<(), String> {
        self.screen_height = height;
        Ok(())
    }

    fn move_absolute(&mut self, x: i32, y: i32) -> Result<(), String> {
        let flipped = self.flip_y(y);
        // Production:
        //   let src = CGEventSourceCreate(kCGEventSourceStateHIDSystemState)
        //   let event = CGEventCreateMouseEvent(src, kCGEventMouseMoved, CGPointMake(x, flipped), 0)
        //   CGEventPost(kCGHIDEventTap, event)
        let _ = (x, flipped);
        Ok(())
    }

    fn move_relative(&mut self, dx: i32, dy: i32) -> Result<(), String> {
        // CoreGraphics has no relative-motion primitive; production would
        // query CGEventGetLocation of the last posted event and re-issue an
        // absolute move from there.
        let _ = (dx, dy);
        Ok(())
    }

    fn emit_button(&mut self, button: MacroButton, pressed: bool) -> Result<(), String> {
        // Production: map to kCGEventLeftMouseDown/Up, kCGEventRightMouseDown/Up,
        // kCGEventOtherMouseDown/Up (button number 2 for middle, 3/4 for side).
        let _ = (button, pressed);
        Ok(())
    }

    fn emit_scroll(&mut self, value: i32) -> Result<(), String> {
        // Production: CGEventCreateScrollWheelEvent(src, kCGScrollEventUnitPixel, 1, value)
        let _ = value;
        Ok(())
    }

    fn emit_key(&mut self, code: i32, pressed: bool) -> Result<(), String> {
        let key = Key::from_code(code as u16);
        let cgkeycode = KeyMapper::key_to_macos_cgkeycode(key).ok_or_else(|| format!("no macOS keycode for {key:?}"))?;
        // Production:
        //   let event = CGEventCreateKeyboardEvent(src, cgkeycode, pressed)
        //   CGEventPost(kCGHIDEventTap, event)
        let _ = cgkeycode;
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
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flip_y_mirrors_around_screen_height() {
        let mut provider = MacosSimulationProvider::new().unwrap();
        provider.initialize(1920, 1080).unwrap();
        assert_eq!(provider.flip_y(0), 1080);
        assert_eq!(provider.flip_y(1080), 0);
    }
}
