//! Linux evdev key codes — the canonical keyboard vocabulary for this
//! workspace.
//!
//! # What is evdev? (for beginners)
//!
//! Every Linux input device (keyboard, mouse, touchpad) is exposed through
//! the kernel's **evdev** protocol as a stream of `(type, code, value)`
//! tuples. `type` says which namespace `code` belongs to
//! (`EV_KEY` for buttons/keys, `EV_REL` for relative axes, `EV_SYN` for
//! report boundaries); `code` names the specific key or axis within that
//! namespace (`KEY_A = 30`, `REL_X = 0`, ...). These constants are defined
//! in the kernel header `linux/input-event-codes.h` and are stable ABI —
//! the same numbers appear on every Linux distribution.
//!
//! Unlike the USB HID Usage ID table a Windows/macOS-only application would
//! use, evdev codes are the *native* vocabulary of the Linux input stack, so
//! this workspace treats them as canonical: every platform capture provider
//! (X11, Windows hook, macOS event tap) translates into a [`Key`] value, and
//! every simulation provider translates back out.

use serde::{Deserialize, Serialize};

/// Non-keyboard evdev constants referenced throughout the workspace (axis
/// and button codes, plus the `EV_*` type namespace and the `SYN_REPORT`
/// sentinel). These don't vary per key, so they're left as plain constants
/// rather than enum variants.
pub mod codes {
    pub const EV_SYN: u16 = 0x00;
    pub const EV_KEY: u16 = 0x01;
    pub const EV_REL: u16 = 0x02;
    pub const EV_ABS: u16 = 0x03;

    pub const SYN_REPORT: i32 = 0;

    pub const REL_X: i32 = 0x00;
    pub const REL_Y: i32 = 0x01;
    pub const REL_HWHEEL: i32 = 0x06;
    pub const REL_WHEEL: i32 = 0x08;

    pub const ABS_X: i32 = 0x00;
    pub const ABS_Y: i32 = 0x01;

    pub const BTN_LEFT: i32 = 0x110;
    pub const BTN_RIGHT: i32 = 0x111;
    pub const BTN_MIDDLE: i32 = 0x112;
    pub const BTN_SIDE: i32 = 0x113;
    pub const BTN_EXTRA: i32 = 0x114;
}

/// A keyboard key, identified by its evdev `KEY_*` code.
///
/// `#[repr(u16)]` because evdev codes fit in 16 bits; the wire protocol
/// widens to `i32` to share a field type with axis deltas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum Key {
    Escape = 1,
    Digit1 = 2,
    Digit2 = 3,
    Digit3 = 4,
    Digit4 = 5,
    Digit5 = 6,
    Digit6 = 7,
    Digit7 = 8,
    Digit8 = 9,
    Digit9 = 10,
    Digit0 = 11,
    Minus = 12,
    Equal = 13,
    Backspace = 14,
    Tab = 15,
    Q = 16,
    W = 17,
    E = 18,
    R = 19,
    T = 20,
    Y = 21,
    U = 22,
    I = 23,
    O = 24,
    P = 25,
    LeftBrace = 26,
    RightBrace = 27,
    Enter = 28,
    LeftCtrl = 29,
    A = 30,
    S = 31,
    D = 32,
    F = 33,
    G = 34,
    H = 35,
    J = 36,
    K = 37,
    L = 38,
    Semicolon = 39,
    Apostrophe = 40,
    Grave = 41,
    LeftShift = 42,
    Backslash = 43,
    Z = 44,
    X = 45,
    C = 46,
    V = 47,
    B = 48,
    N = 49,
    M = 50,
    Comma = 51,
    Dot = 52,
    Slash = 53,
    RightShift = 54,
    KpAsterisk = 55,
    LeftAlt = 56,
    Space = 57,
    CapsLock = 58,
    F1 = 59,
    F2 = 60,
    F3 = 61,
    F4 = 62,
    F5 = 63,
    F6 = 64,
    F7 = 65,
    F8 = 66,
    F9 = 67,
    F10 = 68,
    NumLock = 69,
    ScrollLock = 70,
    Kp7 = 71,
    Kp8 = 72,
    Kp9 = 73,
    KpMinus = 74,
    Kp4 = 75,
    Kp5 = 76,
    Kp6 = 77,
    KpPlus = 78,
    Kp1 = 79,
    Kp2 = 80,
    Kp3 = 81,
    Kp0 = 82,
    KpDot = 83,
    F11 = 87,
    F12 = 88,
    KpEnter = 96,
    RightCtrl = 97,
    KpSlash = 98,
    SysRq = 99,
    RightAlt = 100,
    Home = 102,
    Up = 103,
    PageUp = 104,
    Left = 105,
    Right = 106,
    End = 107,
    Down = 108,
    PageDown = 109,
    Insert = 110,
    Delete = 111,
    LeftMeta = 125,
    RightMeta = 126,
    Compose = 127,
    /// Sentinel for a code with no evdev equivalent.
    Unknown = 0,
}

impl Key {
    /// Translates a raw evdev code to a [`Key`]. Unknown codes map to
    /// [`Key::Unknown`] rather than returning `Option`, mirroring every
    /// downstream call site that needs a total function.
    pub fn from_code(code: u16) -> Self {
        match code {
            1 => Self::Escape,
            2 => Self::Digit1,
            3 => Self::Digit2,
            4 => Self::Digit3,
            5 => Self::Digit4,
            6 => Self::Digit5,
            7 => Self::Digit6,
            8 => Self::Digit7,
            9 => Self::Digit8,
            10 => Self::Digit9,
            11 => Self::Digit0,
            12 => Self::Minus,
            13 => Self::Equal,
            14 => Self::Backspace,
            15 => Self::Tab,
            16 => Self::Q,
            17 => Self::W,
            18 => Self::E,
            19 => Self::R,
            20 => Self::T,
            21 => Self::Y,
            22 => Self::U,
            23 => Self::I,
            24 => Self::O,
            25 => Self::P,
            26 => Self::LeftBrace,
            27 => Self::RightBrace,
            28 => Self::Enter,
            29 => Self::LeftCtrl,
            30 => Self::A,
            31 => Self::S,
            32 => Self::D,
            33 => Self::F,
            34 => Self::G,
            35 => Self::H,
            36 => Self::J,
            37 => Self::K,
            38 => Self::L,
            39 => Self::Semicolon,
            40 => Self::Apostrophe,
            41 => Self::Grave,
            42 => Self::LeftShift,
            43 => Self::Backslash,
            44 => Self::Z,
            45 => Self::X,
            46 => Self::C,
            47 => Self::V,
            48 => Self::B,
            49 => Self::N,
            50 => Self::M,
            51 => Self::Comma,
            52 => Self::Dot,
            53 => Self::Slash,
            54 => Self::RightShift,
            55 => Self::KpAsterisk,
            56 => Self::LeftAlt,
            57 => Self::Space,
            58 => Self::CapsLock,
            59 => Self::F1,
            60 => Self::F2,
            61 => Self::F3,
            62 => Self::F4,
            63 => Self::F5,
            64 => Self::F6,
            65 => Self::F7,
            66 => Self::F8,
            67 => Self::F9,
            68 => Self::F10,
            69 => Self::NumLock,
            70 => Self::ScrollLock,
            71 => Self::Kp7,
            72 => Self::Kp8,
            73 => Self::Kp9,
            74 => Self::KpMinus,
            75 => Self::Kp4,
            76 => Self::Kp5,
            77 => Self::Kp6,
            78 => Self::KpPlus,
            79 => Self::Kp1,
            80 => Self::Kp2,
            81 => Self::Kp3,
            82 => Self::Kp0,
            83 => Self::KpDot,
            87 => Self::F11,
            88 => Self::F12,
            96 => Self::KpEnter,
            97 => Self::RightCtrl,
            98 => Self::KpSlash,
            99 => Self::SysRq,
            100 => Self::RightAlt,
            102 => Self::Home,
            103 => Self::Up,
            104 => Self::PageUp,
            105 => Self::Left,
            106 => Self::Right,
            107 => Self::End,
            108 => Self::Down,
            109 => Self::PageDown,
            110 => Self::Insert,
            111 => Self::Delete,
            125 => Self::LeftMeta,
            126 => Self::RightMeta,
            127 => Self::Compose,
            _ => Self::Unknown,
        }
    }

    /// Translates a [`Key`] back to its raw evdev code.
    pub fn as_code(self) -> u16 {
        self as u16
    }

    /// Whether this key is a modifier tracked by the text-expansion core's
    /// modifier-state machine (§4.10.10a).
    pub fn is_modifier(self) -> bool {
        matches!(
            self,
            Self::LeftCtrl
                | Self::RightCtrl
                | Self::LeftShift
                | Self::RightShift
                | Self::LeftAlt
                | Self::RightAlt
                | Self::LeftMeta
                | Self::RightMeta
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STANDARD_KEYS: &[Key] = &[
        Key::A, Key::Z, Key::Digit0, Key::Digit9, Key::Enter, Key::Backspace, Key::Space,
        Key::LeftShift, Key::RightAlt, Key::F1, Key::F12, Key::Up, Key::Delete,
    ];

    #[test]
    fn from_code_round_trips_through_as_code() {
        for &key in STANDARD_KEYS {
            let code = key.as_code();
            assert_eq!(Key::from_code(code), key);
        }
    }

    #[test]
    fn unknown_code_maps_to_unknown() {
        assert_eq!(Key::from_code(0xFFFF), Key::Unknown);
    }

    #[test]
    fn key_a_matches_kernel_constant() {
        // KEY_A is 30 in linux/input-event-codes.h
        assert_eq!(Key::A.as_code(), 30);
    }

    #[test]
    fn modifiers_are_identified() {
        assert!(Key::LeftShift.is_modifier());
        assert!(Key::RightAlt.is_modifier());
        assert!(Key::LeftMeta.is_modifier());
    }

    #[test]
    fn letters_are_not_modifiers() {
        assert!(!Key::A.is_modifier());
        assert!(!Key::Enter.is_modifier());
    }

    #[test]
    fn all_26_letters_round_trip() {
        let letters = [
            Key::A, Key::B, Key::C, Key::D, Key::E, Key::F, Key::G, Key::H, Key::I, Key::J,
            Key::K, Key::L, Key::M, Key::N, Key::O, Key::P, Key::Q, Key::R, Key::S, Key::T,
            Key::U, Key::V, Key::W, Key::X, Key::Y, Key::Z,
        ];
        assert_eq!(letters.len(), 26);
        for key in letters {
            assert_eq!(Key::from_code(key.as_code()), key);
        }
    }
}
