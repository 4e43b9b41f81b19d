//! Windows simulation via `SendInput` (§4.7).
//!
//! Grounded directly in `input_emulation::windows::WindowsInputEmulator`: the
//! `windows` crate's Win32 bindings are real and linkable, so unlike the
//! X11/macOS providers this one issues live `SendInput` calls rather than
//! placeholder comments. Mouse coordinates are normalized to the virtual
//! screen's `[0, 65535]` absolute-coordinate space, same as the teacher.

#![cfg(target_os = "windows")]

use std::collections::HashSet;

use windows::Win32::UI::Input::KeyboardAndMouse::{
    SendInput, INPUT, INPUT_0, INPUT_KEYBOARD, INPUT_MOUSE, KEYBDINPUT, KEYEVENTF_EXTENDEDKEY,
    KEYEVENTF_KEYUP, KEYEVENTF_SCANCODE, MOUSEEVENTF_ABSOLUTE, MOUSEEVENTF_HWHEEL,
    MOUSEEVENTF_LEFTDOWN, MOUSEEVENTF_LEFTUP, MOUSEEVENTF_MIDDLEDOWN, MOUSEEVENTF_MIDDLEUP,
    MOUSEEVENTF_MOVE, MOUSEEVENTF_RIGHTDOWN, MOUSEEVENTF_RIGHTUP, MOUSEEVENTF_WHEEL,
    MOUSEEVENTF_XDOWN, MOUSEEVENTF_XUP, MOUSEINPUT, VIRTUAL_KEY,
};
use windows::Win32::UI::WindowsAndMessaging::{GetSystemMetrics, SM_CXVIRTUALSCREEN, SM_CYVIRTUALSCREEN, XBUTTON1, XBUTTON2};

use crossmacro_core::domain::macro_event::MacroButton;
use crossmacro_core::keymap::{evdev::Key, KeyMapper};

use crate::playback::SimulationProvider;

const EXTENDED_VKS: &[u8] = &[
    0x21, 0x22, 0x23, 0x24, 0x25, 0x26, 0x27, 0x28, // nav cluster
    0x2D, 0x2E, // Insert, Delete
    0x5B, 0x5C, // Win keys
    0xA3, 0xA5, // Right Ctrl, Right Alt
];

fn normalize_coords(x: i32, y: i32) -> (i32, i32) {
    // SAFETY: GetSystemMetrics is always safe to call.
    let screen_w = unsafe { GetSystemMetrics(SM_CXVIRTUALSCREEN) };
    let screen_h = unsafe { GetSystemMetrics(SM_CYVIRTUALSCREEN) };
    let norm_x = if screen_w > 0 { (x * 65535 / screen_w).clamp(0, 65535) } else { 0 };
    let norm_y = if screen_h > 0 { (y * 65535 / screen_h).clamp(0, 65535) } else { 0 };
    (norm_x, norm_y)
}

fn send_key(vk: u8, key_up: bool) {
    let mut flags = KEYEVENTF_SCANCODE;
    if key_up {
        flags |= KEYEVENTF_KEYUP;
    }
    if EXTENDED_VKS.contains(&vk) {
        flags |= KEYEVENTF_EXTENDEDKEY;
    }
    let input = INPUT {
        r#type: INPUT_KEYBOARD,
        Anonymous: INPUT_0 { ki: KEYBDINPUT { wVk: VIRTUAL_KEY(vk as u16), wScan: 0, dwFlags: flags, time: 0, dwExtraInfo: 0 } },
    };
    // SAFETY: input is a valid KEYBDINPUT structure on the stack.
    unsafe {
        SendInput(&[input], std::mem::size_of::<INPUT>() as i32);
    }
}

fn send_mouse(mi: MOUSEINPUT) {
    let input = INPUT { r#type: INPUT_MOUSE, Anonymous: INPUT_0 { mi } };
    // SAFETY: input is a valid MOUSEINPUT structure on the stack.
    unsafe {
        SendInput(&[input], std::mem::size_of::<INPUT>() as i32);
    }
}

/// `SendInput`-based simulator.
#[derive(Default)]
pub struct WindowsInputProvider {
    pressed: HashSet<i32>,
}

impl WindowsInputProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SimulationProvider for WindowsInputProvider {
    fn initialize(&mut self, _width: i32, _height: i32) -> Result<(), String> {
        // SendInput always targets the live virtual screen, queried fresh on
        // every move; no resolution-configuration step needed.
        Ok(())
    }

    fn move_absolute(&mut self, x: i32, y: i32) -> Result<(), String> {
        let (norm_x, norm_y) = normalize_coords(x, y);
        send_mouse(MOUSEINPUT { dx: norm_x, dy: norm_y, mouseData: 0, dwFlags: MOUSEEVENTF_ABSOLUTE | MOUSEEVENTF_MOVE, time: 0, dwExtraInfo: 0 });
        Ok(())
    }

    fn move_relative(&mut self, dx: i32, dy: i32) -> Result<(), String> {
        send_mouse(MOUSEINPUT { dx, dy, mouseData: 0, dwFlags: MOUSEEVENTF_MOVE, time: 0, dwExtraInfo: 0 });
        Ok(())
    }

    fn emit_button(&mut self, button: MacroButton, pressed: bool) -> Result<(), String> {
        let (flags, mouse_data) = match (button, pressed) {
            (MacroButton::Left, true) => (MOUSEEVENTF_LEFTDOWN, 0),
            (MacroButton::Left, false) => (MOUSEEVENTF_LEFTUP, 0),
            (MacroButton::Right, true) => (MOUSEEVENTF_RIGHTDOWN, 0),
            (MacroButton::Right, false) => (MOUSEEVENTF_RIGHTUP, 0),
            (MacroButton::Middle, true) => (MOUSEEVENTF_MIDDLEDOWN, 0),
            (MacroButton::Middle, false) => (MOUSEEVENTF_MIDDLEUP, 0),
            (MacroButton::Side1, true) => (MOUSEEVENTF_XDOWN, XBUTTON1 as u32),
            (MacroButton::Side1, false) => (MOUSEEVENTF_XUP, XBUTTON1 as u32),
            (MacroButton::Side2, true) => (MOUSEEVENTF_XDOWN, XBUTTON2 as u32),
            (MacroButton::Side2, false) => (MOUSEEVENTF_XUP, XBUTTON2 as u32),
            _ => return Ok(()),
        };
        send_mouse(MOUSEINPUT { dx: 0, dy: 0, mouseData: mouse_data, dwFlags: flags, time: 0, dwExtraInfo: 0 });
        Ok(())
    }

    fn emit_scroll(&mut self, value: i32) -> Result<(), String> {
        send_mouse(MOUSEINPUT { dx: 0, dy: 0, mouseData: value as u32, dwFlags: MOUSEEVENTF_WHEEL, time: 0, dwExtraInfo: 0 });
        Ok(())
    }

    fn emit_key(&mut self, code: i32, pressed: bool) -> Result<(), String> {
        let key = Key::from_code(code as u16);
        let vk = KeyMapper::key_to_windows_vk(key).ok_or_else(|| format!("no Windows VK for {key:?}"))?;
        send_key(vk, !pressed);
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
    #[test]
    fn normalize_coords_clamps_to_valid_range() {
        let result_x = (500i32 * 65535 / 1920).clamp(0, 65535);
        let result_y = (300i32 * 65535 / 1080).clamp(0, 65535);
        assert!((0..=65535).contains(&result_x));
        assert!((0..=65535).contains(&result_y));
    }

    #[test]
    fn normalize_coords_full_width_gives_max() {
        let result_x = (1920i32 * 65535 / 1920).clamp(0, 65535);
        assert_eq!(result_x, 65535);
    }
}
