//! evdev `Key` to X11 KeySym translation table.
//!
//! X11 KeySym values are defined in X11/keysymdef.h.
//! Reference: https://gitlab.freedesktop.org/xorg/proto/xorgproto/-/blob/master/include/X11/keysymdef.h
//!
//! # What is an X11 KeySym? (for beginners)
//!
//! X11 is the windowing system used on Linux (and other Unix-like systems).
//! It uses a system called **KeySym** (Key Symbol) to identify keys.
//!
//! Unlike evdev codes (which identify physical key positions), X11 KeySyms
//! can represent *characters* as well as physical keys. For example:
//!
//! | KeySym name | Value  | Meaning        |
//! |-------------|--------|----------------|
//! | `XK_a`      | 0x0061 | lowercase 'a'  |
//! | `XK_A`      | 0x0041 | uppercase 'A'  |
//! | `XK_Return` | 0xFF0D | Enter key      |
//! | `XK_Escape` | 0xFF1B | Escape key     |
//!
//! Notice that letters use their **ASCII values** (0x61 = 'a' in ASCII).
//! The XTest extension (`XTestFakeKeyEvent`) accepts a KeySym and synthesises
//! the appropriate key event on the X11 display; the X11 RECORD extension
//! delivers captured events keyed the same way, so this table is used in
//! both directions by the Linux-X11 capture (C4) and simulation (C5)
//! providers.
//!
//! # Why lowercase letter KeySyms?
//!
//! This table maps letter keys to their *lowercase* KeySym (e.g., 0x0061 for
//! 'a' rather than 0x0041 for 'A'). The XTest extension translates
//! automatically when a Shift modifier is present, so we always pass the
//! base (lowercase) form and let X11 apply the appropriate modifier state.

use super::evdev::Key;

/// Translates an evdev [`Key`] to an X11 KeySym value.
///
/// Returns `None` if the key has no X11 KeySym equivalent.
pub fn key_to_keysym(key: Key) -> Option<u32> {
    match key {
        // Letters (X11 lowercase keysyms 0x61-0x7A)
        Key::A => Some(0x0061), // XK_a
        Key::B => Some(0x0062), // XK_b
        Key::C => Some(0x0063), // XK_c
        Key::D => Some(0x0064), // XK_d
        Key::E => Some(0x0065), // XK_e
        Key::F => Some(0x0066), // XK_f
        Key::G => Some(0x0067), // XK_g
        Key::H => Some(0x0068), // XK_h
        Key::I => Some(0x0069), // XK_i
        Key::J => Some(0x006A), // XK_j
        Key::K => Some(0x006B), // XK_k
        Key::L => Some(0x006C), // XK_l
        Key::M => Some(0x006D), // XK_m
        Key::N => Some(0x006E), // XK_n
        Key::O => Some(0x006F), // XK_o
        Key::P => Some(0x0070), // XK_p
        Key::Q => Some(0x0071), // XK_q
        Key::R => Some(0x0072), // XK_r
        Key::S => Some(0x0073), // XK_s
        Key::T => Some(0x0074), // XK_t
        Key::U => Some(0x0075), // XK_u
        Key::V => Some(0x0076), // XK_v
        Key::W => Some(0x0077), // XK_w
        Key::X => Some(0x0078), // XK_x
        Key::Y => Some(0x0079), // XK_y
        Key::Z => Some(0x007A), // XK_z

        // Digits (X11 0x30-0x39)
        Key::Digit0 => Some(0x0030), // XK_0
        Key::Digit1 => Some(0x0031), // XK_1
        Key::Digit2 => Some(0x0032), // XK_2
        Key::Digit3 => Some(0x0033), // XK_3
        Key::Digit4 => Some(0x0034), // XK_4
        Key::Digit5 => Some(0x0035), // XK_5
        Key::Digit6 => Some(0x0036), // XK_6
        Key::Digit7 => Some(0x0037), // XK_7
        Key::Digit8 => Some(0x0038), // XK_8
        Key::Digit9 => Some(0x0039), // XK_9

        // Control keys
        Key::Enter => Some(0xFF0D),     // XK_Return
        Key::Escape => Some(0xFF1B),    // XK_Escape
        Key::Backspace => Some(0xFF08), // XK_BackSpace
        Key::Tab => Some(0xFF09),       // XK_Tab
        Key::Space => Some(0x0020),     // XK_space
        Key::CapsLock => Some(0xFFE5),  // XK_Caps_Lock
        Key::ScrollLock => Some(0xFF14), // XK_Scroll_Lock
        Key::Insert => Some(0xFF63),    // XK_Insert
        Key::Home => Some(0xFF50),      // XK_Home
        Key::PageUp => Some(0xFF55),    // XK_Page_Up
        Key::Delete => Some(0xFFFF),    // XK_Delete
        Key::End => Some(0xFF57),       // XK_End
        Key::PageDown => Some(0xFF56),  // XK_Page_Down
        Key::SysRq => Some(0xFF61),     // XK_Print
        Key::Compose => Some(0xFF67),   // XK_Menu

        // Arrow keys
        Key::Left => Some(0xFF51),  // XK_Left
        Key::Up => Some(0xFF52),    // XK_Up
        Key::Right => Some(0xFF53), // XK_Right
        Key::Down => Some(0xFF54),  // XK_Down

        // Function keys
        Key::F1 => Some(0xFFBE),  // XK_F1
        Key::F2 => Some(0xFFBF),  // XK_F2
        Key::F3 => Some(0xFFC0),  // XK_F3
        Key::F4 => Some(0xFFC1),  // XK_F4
        Key::F5 => Some(0xFFC2),  // XK_F5
        Key::F6 => Some(0xFFC3),  // XK_F6
        Key::F7 => Some(0xFFC4),  // XK_F7
        Key::F8 => Some(0xFFC5),  // XK_F8
        Key::F9 => Some(0xFFC6),  // XK_F9
        Key::F10 => Some(0xFFC7), // XK_F10
        Key::F11 => Some(0xFFC8), // XK_F11
        Key::F12 => Some(0xFFC9), // XK_F12

        // Numpad
        Key::NumLock => Some(0xFF7F),    // XK_Num_Lock
        Key::KpSlash => Some(0xFFAF),    // XK_KP_Divide
        Key::KpAsterisk => Some(0xFFAA), // XK_KP_Multiply
        Key::KpMinus => Some(0xFFAD),    // XK_KP_Subtract
        Key::KpPlus => Some(0xFFAB),     // XK_KP_Add
        Key::KpEnter => Some(0xFF8D),    // XK_KP_Enter
        Key::Kp0 => Some(0xFFB0),        // XK_KP_0
        Key::Kp1 => Some(0xFFB1),        // XK_KP_1
        Key::Kp2 => Some(0xFFB2),        // XK_KP_2
        Key::Kp3 => Some(0xFFB3),        // XK_KP_3
        Key::Kp4 => Some(0xFFB4),        // XK_KP_4
        Key::Kp5 => Some(0xFFB5),        // XK_KP_5
        Key::Kp6 => Some(0xFFB6),        // XK_KP_6
        Key::Kp7 => Some(0xFFB7),        // XK_KP_7
        Key::Kp8 => Some(0xFFB8),        // XK_KP_8
        Key::Kp9 => Some(0xFFB9),        // XK_KP_9
        Key::KpDot => Some(0xFFAE),      // XK_KP_Decimal

        // Punctuation / symbols
        Key::Minus => Some(0x002D),      // XK_minus
        Key::Equal => Some(0x003D),      // XK_equal
        Key::LeftBrace => Some(0x005B),  // XK_bracketleft
        Key::RightBrace => Some(0x005D), // XK_bracketright
        Key::Backslash => Some(0x005C),  // XK_backslash
        Key::Semicolon => Some(0x003B),  // XK_semicolon
        Key::Apostrophe => Some(0x0027), // XK_apostrophe
        Key::Grave => Some(0x0060),      // XK_grave
        Key::Comma => Some(0x002C),      // XK_comma
        Key::Dot => Some(0x002E),        // XK_period
        Key::Slash => Some(0x002F),      // XK_slash

        // Modifier keys
        Key::LeftCtrl => Some(0xFFE3),   // XK_Control_L
        Key::RightCtrl => Some(0xFFE4),  // XK_Control_R
        Key::LeftShift => Some(0xFFE1),  // XK_Shift_L
        Key::RightShift => Some(0xFFE2), // XK_Shift_R
        Key::LeftAlt => Some(0xFFE9),    // XK_Alt_L
        Key::RightAlt => Some(0xFFEA),   // XK_Alt_R
        Key::LeftMeta => Some(0xFFEB),   // XK_Super_L
        Key::RightMeta => Some(0xFFEC),  // XK_Super_R

        Key::Unknown => None,
    }
}

/// Translates an X11 KeySym back to the canonical evdev [`Key`], for the
/// Linux-X11 capture provider (RECORD extension deliveries are keysyms, not
/// evdev codes, when the X server is remapped away from its default layout).
/// Linear scan; infrequent relative to the hot capture path.
pub fn keysym_to_key(keysym: u32) -> Key {
    const ALL_KEYS: &[Key] = &[
        Key::A, Key::B, Key::C, Key::D, Key::E, Key::F, Key::G, Key::H, Key::I, Key::J, Key::K,
        Key::L, Key::M, Key::N, Key::O, Key::P, Key::Q, Key::R, Key::S, Key::T, Key::U, Key::V,
        Key::W, Key::X, Key::Y, Key::Z, Key::Digit0, Key::Digit1, Key::Digit2, Key::Digit3,
        Key::Digit4, Key::Digit5, Key::Digit6, Key::Digit7, Key::Digit8, Key::Digit9, Key::Enter,
        Key::Escape, Key::Backspace, Key::Tab, Key::Space, Key::CapsLock, Key::ScrollLock,
        Key::Insert, Key::Home, Key::PageUp, Key::Delete, Key::End, Key::PageDown, Key::SysRq,
        Key::Compose, Key::Left, Key::Up, Key::Right, Key::Down, Key::F1, Key::F2, Key::F3,
        Key::F4, Key::F5, Key::F6, Key::F7, Key::F8, Key::F9, Key::F10, Key::F11, Key::F12,
        Key::NumLock, Key::KpSlash, Key::KpAsterisk, Key::KpMinus, Key::KpPlus, Key::KpEnter,
        Key::Kp0, Key::Kp1, Key::Kp2, Key::Kp3, Key::Kp4, Key::Kp5, Key::Kp6, Key::Kp7, Key::Kp8,
        Key::Kp9, Key::KpDot, Key::Minus, Key::Equal, Key::LeftBrace, Key::RightBrace,
        Key::Backslash, Key::Semicolon, Key::Apostrophe, Key::Grave, Key::Comma, Key::Dot,
        Key::Slash, Key::LeftCtrl, Key::RightCtrl, Key::LeftShift, Key::RightShift, Key::LeftAlt,
        Key::RightAlt, Key::LeftMeta, Key::RightMeta,
    ];
    ALL_KEYS
        .iter()
        .copied()
        .find(|&k| key_to_keysym(k) == Some(keysym))
        .unwrap_or(Key::Unknown)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_letter_keys_have_x11_mappings() {
        let letters = [
            Key::A, Key::B, Key::C, Key::D, Key::E, Key::F, Key::G, Key::H, Key::I, Key::J,
            Key::K, Key::L, Key::M, Key::N, Key::O, Key::P, Key::Q, Key::R, Key::S, Key::T,
            Key::U, Key::V, Key::W, Key::X, Key::Y, Key::Z,
        ];
        for letter in letters {
            let result = key_to_keysym(letter);
            assert!(result.is_some(), "{letter:?} should have an X11 keysym");
        }
    }

    #[test]
    fn test_all_digit_keys_have_x11_mappings() {
        for digit in [
            Key::Digit0, Key::Digit1, Key::Digit2, Key::Digit3, Key::Digit4, Key::Digit5,
            Key::Digit6, Key::Digit7, Key::Digit8, Key::Digit9,
        ] {
            assert!(key_to_keysym(digit).is_some(), "{digit:?} should have an X11 keysym");
        }
    }

    #[test]
    fn test_all_function_keys_have_x11_mappings() {
        for fkey in [
            Key::F1, Key::F2, Key::F3, Key::F4, Key::F5, Key::F6, Key::F7, Key::F8, Key::F9,
            Key::F10, Key::F11, Key::F12,
        ] {
            assert!(key_to_keysym(fkey).is_some(), "{fkey:?} should have an X11 keysym");
        }
    }

    #[test]
    fn test_all_modifier_keys_have_x11_mappings() {
        for modifier in [
            Key::LeftCtrl, Key::RightCtrl, Key::LeftShift, Key::RightShift, Key::LeftAlt,
            Key::RightAlt, Key::LeftMeta, Key::RightMeta,
        ] {
            assert!(key_to_keysym(modifier).is_some(), "{modifier:?} should have an X11 keysym");
        }
    }

    #[test]
    fn test_unknown_key_returns_none() {
        assert_eq!(key_to_keysym(Key::Unknown), None);
    }

    #[test]
    fn test_enter_maps_to_xk_return() {
        assert_eq!(key_to_keysym(Key::Enter), Some(0xFF0D));
    }

    #[test]
    fn test_escape_maps_to_xk_escape() {
        assert_eq!(key_to_keysym(Key::Escape), Some(0xFF1B));
    }

    #[test]
    fn test_arrow_keys_have_correct_x11_keysyms() {
        assert_eq!(key_to_keysym(Key::Left), Some(0xFF51));
        assert_eq!(key_to_keysym(Key::Up), Some(0xFF52));
        assert_eq!(key_to_keysym(Key::Right), Some(0xFF53));
        assert_eq!(key_to_keysym(Key::Down), Some(0xFF54));
    }

    #[test]
    fn test_letter_keysyms_are_lowercase_ascii() {
        // X11 keysyms for letters use lowercase ASCII values (0x61-0x7A)
        let pairs = [(Key::A, 0x0061u32), (Key::Z, 0x007A)];
        for (key, expected) in pairs {
            assert_eq!(key_to_keysym(key), Some(expected));
        }
    }

    #[test]
    fn test_special_keys_have_x11_mappings() {
        for key in [
            Key::SysRq, Key::ScrollLock, Key::Insert, Key::Home, Key::End, Key::PageUp,
            Key::PageDown, Key::Delete, Key::CapsLock, Key::NumLock, Key::Compose,
        ] {
            assert!(key_to_keysym(key).is_some(), "{key:?} should have an X11 keysym");
        }
    }

    #[test]
    fn test_reverse_translation_round_trips() {
        for key in [Key::A, Key::Enter, Key::F5, Key::LeftShift, Key::Kp3] {
            let keysym = key_to_keysym(key).unwrap();
            assert_eq!(keysym_to_key(keysym), key);
        }
    }

    #[test]
    fn test_unknown_keysym_returns_unknown_key() {
        assert_eq!(keysym_to_key(0xDEAD_BEEF), Key::Unknown);
    }
}
