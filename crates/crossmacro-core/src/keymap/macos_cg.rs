//! evdev `Key` to macOS `CGKeyCode` translation table.
//!
//! CGKeyCode values are defined in Carbon's `Events.h` (HIToolbox
//! framework). Used by the macOS simulation provider (C5) to synthesize key
//! events via `CGEventCreateKeyboardEvent`, and by the macOS capture
//! provider (C4) in reverse to translate a captured event tap code back
//! into the canonical evdev `Key`.

use super::evdev::Key;

/// Translates an evdev [`Key`] to a macOS `CGKeyCode` value.
///
/// Returns `None` if the key has no macOS equivalent.
pub fn key_to_cgkeycode(key: Key) -> Option<u16> {
    match key {
        Key::A => Some(0x00),
        Key::B => Some(0x0B),
        Key::C => Some(0x08),
        Key::D => Some(0x02),
        Key::E => Some(0x0E),
        Key::F => Some(0x03),
        Key::G => Some(0x05),
        Key::H => Some(0x04),
        Key::I => Some(0x22),
        Key::J => Some(0x26),
        Key::K => Some(0x28),
        Key::L => Some(0x25),
        Key::M => Some(0x2E),
        Key::N => Some(0x2D),
        Key::O => Some(0x1F),
        Key::P => Some(0x23),
        Key::Q => Some(0x0C),
        Key::R => Some(0x0F),
        Key::S => Some(0x01),
        Key::T => Some(0x11),
        Key::U => Some(0x20),
        Key::V => Some(0x09),
        Key::W => Some(0x0D),
        Key::X => Some(0x07),
        Key::Y => Some(0x10),
        Key::Z => Some(0x06),

        Key::Digit0 => Some(0x1D),
        Key::Digit1 => Some(0x12),
        Key::Digit2 => Some(0x13),
        Key::Digit3 => Some(0x14),
        Key::Digit4 => Some(0x15),
        Key::Digit5 => Some(0x17),
        Key::Digit6 => Some(0x16),
        Key::Digit7 => Some(0x1A),
        Key::Digit8 => Some(0x1C),
        Key::Digit9 => Some(0x19),

        Key::Enter => Some(0x24),
        Key::Escape => Some(0x35),
        Key::Backspace => Some(0x33),
        Key::Tab => Some(0x30),
        Key::Space => Some(0x31),
        Key::CapsLock => Some(0x39),
        Key::ScrollLock => Some(0x6B),
        Key::Insert => Some(0x72),
        Key::Home => Some(0x73),
        Key::PageUp => Some(0x74),
        Key::Delete => Some(0x75),
        Key::End => Some(0x77),
        Key::PageDown => Some(0x79),
        Key::SysRq => Some(0x69),
        Key::Compose => Some(0x6E),

        Key::Left => Some(0x7B),
        Key::Right => Some(0x7C),
        Key::Down => Some(0x7D),
        Key::Up => Some(0x7E),

        Key::F1 => Some(0x7A),
        Key::F2 => Some(0x78),
        Key::F3 => Some(0x63),
        Key::F4 => Some(0x76),
        Key::F5 => Some(0x60),
        Key::F6 => Some(0x61),
        Key::F7 => Some(0x62),
        Key::F8 => Some(0x64),
        Key::F9 => Some(0x65),
        Key::F10 => Some(0x6D),
        Key::F11 => Some(0x67),
        Key::F12 => Some(0x6F),

        Key::NumLock => Some(0x47),
        Key::KpSlash => Some(0x4B),
        Key::KpAsterisk => Some(0x43),
        Key::KpMinus => Some(0x4E),
        Key::KpPlus => Some(0x45),
        Key::KpEnter => Some(0x4C),
        Key::Kp0 => Some(0x52),
        Key::Kp1 => Some(0x53),
        Key::Kp2 => Some(0x54),
        Key::Kp3 => Some(0x55),
        Key::Kp4 => Some(0x56),
        Key::Kp5 => Some(0x57),
        Key::Kp6 => Some(0x58),
        Key::Kp7 => Some(0x59),
        Key::Kp8 => Some(0x5B),
        Key::Kp9 => Some(0x5C),
        Key::KpDot => Some(0x41),

        Key::Minus => Some(0x1B),
        Key::Equal => Some(0x18),
        Key::LeftBrace => Some(0x21),
        Key::RightBrace => Some(0x1E),
        Key::Backslash => Some(0x2A),
        Key::Semicolon => Some(0x29),
        Key::Apostrophe => Some(0x27),
        Key::Grave => Some(0x32),
        Key::Comma => Some(0x2B),
        Key::Dot => Some(0x2F),
        Key::Slash => Some(0x2C),

        Key::LeftCtrl => Some(0x3B),
        Key::RightCtrl => Some(0x3E),
        Key::LeftShift => Some(0x38),
        Key::RightShift => Some(0x3C),
        Key::LeftAlt => Some(0x3A),
        Key::RightAlt => Some(0x3D),
        Key::LeftMeta => Some(0x37),
        Key::RightMeta => Some(0x36),

        Key::Unknown => None,
    }
}

/// Translates a macOS `CGKeyCode` back to an evdev [`Key`], for the macOS
/// capture provider. Linear scan; infrequent relative to the hot capture
/// path, which only needs the forward direction.
pub fn cgkeycode_to_key(code: u16) -> Key {
    const ALL_KEYS: &[Key] = &[
        Key::A, Key::B, Key::C, Key::D, Key::E, Key::F, Key::G, Key::H, Key::I, Key::J, Key::K,
        Key::L, Key::M, Key::N, Key::O, Key::P, Key::Q, Key::R, Key::S, Key::T, Key::U, Key::V,
        Key::W, Key::X, Key::Y, Key::Z, Key::Digit0, Key::Digit1, Key::Digit2, Key::Digit3,
        Key::Digit4, Key::Digit5, Key::Digit6, Key::Digit7, Key::Digit8, Key::Digit9, Key::Enter,
        Key::Escape, Key::Backspace, Key::Tab, Key::Space, Key::CapsLock, Key::Left, Key::Right,
        Key::Down, Key::Up, Key::F1, Key::F2, Key::F3, Key::F4, Key::F5, Key::F6, Key::F7,
        Key::F8, Key::F9, Key::F10, Key::F11, Key::F12, Key::LeftCtrl, Key::RightCtrl,
        Key::LeftShift, Key::RightShift, Key::LeftAlt, Key::RightAlt, Key::LeftMeta,
        Key::RightMeta,
    ];
    ALL_KEYS
        .iter()
        .copied()
        .find(|&k| key_to_cgkeycode(k) == Some(code))
        .unwrap_or(Key::Unknown)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_letter_keys_have_macos_mappings() {
        for letter in [Key::A, Key::M, Key::Z] {
            assert!(key_to_cgkeycode(letter).is_some());
        }
    }

    #[test]
    fn unknown_key_returns_none() {
        assert_eq!(key_to_cgkeycode(Key::Unknown), None);
    }

    #[test]
    fn key_a_maps_to_zero() {
        assert_eq!(key_to_cgkeycode(Key::A), Some(0x00));
    }

    #[test]
    fn enter_maps_to_kvk_return() {
        assert_eq!(key_to_cgkeycode(Key::Enter), Some(0x24));
    }

    #[test]
    fn reverse_translation_round_trips() {
        for key in [Key::A, Key::Enter, Key::F5, Key::LeftShift] {
            let code = key_to_cgkeycode(key).unwrap();
            assert_eq!(cgkeycode_to_key(code), key);
        }
    }
}
