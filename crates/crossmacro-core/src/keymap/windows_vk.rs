//! Windows Virtual Key (VK) code to evdev `Key` translation table.
//!
//! Reference: Windows Virtual-Key Codes (`winuser.h`). Windows VK codes
//! range from 0x00 to 0xFF.
//!
//! # What is a Windows Virtual Key (VK) code? (for beginners)
//!
//! Windows assigns each keyboard key a number called a "Virtual Key code".
//! These are defined in `<winuser.h>` and named `VK_*` (e.g., `VK_RETURN =
//! 0x0D`, `VK_SPACE = 0x20`). They are "virtual" because they represent
//! *logical* keys rather than physical scan codes: pressing the letter A on
//! any keyboard layout always produces `VK_A = 0x41`, regardless of whether
//! the physical key is labelled "A" (QWERTY) or "Q" (AZERTY).
//!
//! # How this table works
//!
//! `VK_TO_KEY_TABLE` is a compile-time constant array of 256 [`Key`] values,
//! indexed by VK code. Position 0x41 holds `Key::A` because Windows VK_A is
//! 0x41. Any VK code with no evdev equivalent stores `Key::Unknown`.
//! Indexing into this array is an O(1) lookup — important because every
//! captured key event on Windows goes through this table.

use super::evdev::Key;

/// Translates a Windows Virtual Key code to the canonical evdev [`Key`].
///
/// Returns [`Key::Unknown`] for VK codes with no keyboard equivalent (e.g.,
/// mouse button VKs).
pub fn vk_to_key(vk: u8) -> Key {
    VK_TO_KEY_TABLE[vk as usize]
}

/// Translates an evdev [`Key`] back to a Windows Virtual Key code.
///
/// Returns `None` for keys with no VK equivalent.
pub fn key_to_vk(key: Key) -> Option<u8> {
    for (vk, &mapped) in VK_TO_KEY_TABLE.iter().enumerate() {
        if mapped == key && key != Key::Unknown {
            return Some(vk as u8);
        }
    }
    None
}

/// Complete VK → `Key` mapping table indexed by VK code (0x00–0xFF).
///
/// Reference: <https://learn.microsoft.com/windows/win32/inputdev/virtual-key-codes>
const VK_TO_KEY_TABLE: [Key; 256] = {
    use Key::*;
    let mut t = [Unknown; 256];

    // ── Alphabet keys (VK_A=0x41 … VK_Z=0x5A) ────────────────────────────────
    t[0x41] = A;
    t[0x42] = B;
    t[0x43] = C;
    t[0x44] = D;
    t[0x45] = E;
    t[0x46] = F;
    t[0x47] = G;
    t[0x48] = H;
    t[0x49] = I;
    t[0x4A] = J;
    t[0x4B] = K;
    t[0x4C] = L;
    t[0x4D] = M;
    t[0x4E] = N;
    t[0x4F] = O;
    t[0x50] = P;
    t[0x51] = Q;
    t[0x52] = R;
    t[0x53] = S;
    t[0x54] = T;
    t[0x55] = U;
    t[0x56] = V;
    t[0x57] = W;
    t[0x58] = X;
    t[0x59] = Y;
    t[0x5A] = Z;

    // ── Digit row (VK_0=0x30 … VK_9=0x39) ───────────────────────────────────
    t[0x30] = Digit0;
    t[0x31] = Digit1;
    t[0x32] = Digit2;
    t[0x33] = Digit3;
    t[0x34] = Digit4;
    t[0x35] = Digit5;
    t[0x36] = Digit6;
    t[0x37] = Digit7;
    t[0x38] = Digit8;
    t[0x39] = Digit9;

    // ── Control keys ─────────────────────────────────────────────────────────
    t[0x0D] = Enter; // VK_RETURN
    t[0x1B] = Escape; // VK_ESCAPE
    t[0x08] = Backspace; // VK_BACK
    t[0x09] = Tab; // VK_TAB
    t[0x20] = Space; // VK_SPACE
    t[0x14] = CapsLock; // VK_CAPITAL
    t[0x91] = ScrollLock; // VK_SCROLL
    t[0x2D] = Insert; // VK_INSERT
    t[0x24] = Home; // VK_HOME
    t[0x21] = PageUp; // VK_PRIOR
    t[0x2E] = Delete; // VK_DELETE
    t[0x23] = End; // VK_END
    t[0x22] = PageDown; // VK_NEXT
    t[0x2C] = SysRq; // VK_SNAPSHOT
    t[0x5D] = Compose; // VK_APPS

    // ── Arrow keys ────────────────────────────────────────────────────────────
    t[0x25] = Left;
    t[0x26] = Up;
    t[0x27] = Right;
    t[0x28] = Down;

    // ── Function keys (VK_F1=0x70 … VK_F12=0x7B) ─────────────────────────────
    t[0x70] = F1;
    t[0x71] = F2;
    t[0x72] = F3;
    t[0x73] = F4;
    t[0x74] = F5;
    t[0x75] = F6;
    t[0x76] = F7;
    t[0x77] = F8;
    t[0x78] = F9;
    t[0x79] = F10;
    t[0x7A] = F11;
    t[0x7B] = F12;

    // ── Numpad (VK_NUMPAD0=0x60 … VK_NUMPAD9=0x69) ───────────────────────────
    t[0x60] = Kp0;
    t[0x61] = Kp1;
    t[0x62] = Kp2;
    t[0x63] = Kp3;
    t[0x64] = Kp4;
    t[0x65] = Kp5;
    t[0x66] = Kp6;
    t[0x67] = Kp7;
    t[0x68] = Kp8;
    t[0x69] = Kp9;
    t[0x6A] = KpAsterisk; // VK_MULTIPLY
    t[0x6B] = KpPlus; // VK_ADD
    t[0x6D] = KpMinus; // VK_SUBTRACT
    t[0x6E] = KpDot; // VK_DECIMAL
    t[0x6F] = KpSlash; // VK_DIVIDE
    t[0x90] = NumLock; // VK_NUMLOCK

    // ── Punctuation / symbols ─────────────────────────────────────────────────
    t[0xBD] = Minus; // VK_OEM_MINUS  (- _)
    t[0xBB] = Equal; // VK_OEM_PLUS   (= +)
    t[0xDB] = LeftBrace; // VK_OEM_4      ([ {)
    t[0xDD] = RightBrace; // VK_OEM_6      (] })
    t[0xDC] = Backslash; // VK_OEM_5      (\ |)
    t[0xBA] = Semicolon; // VK_OEM_1      (; :)
    t[0xDE] = Apostrophe; // VK_OEM_7      (' ")
    t[0xC0] = Grave; // VK_OEM_3      (` ~)
    t[0xBC] = Comma; // VK_OEM_COMMA  (, <)
    t[0xBE] = Dot; // VK_OEM_PERIOD (. >)
    t[0xBF] = Slash; // VK_OEM_2      (/ ?)

    // ── Modifier keys ─────────────────────────────────────────────────────────
    t[0xA2] = LeftCtrl; // VK_LCONTROL
    t[0xA3] = RightCtrl; // VK_RCONTROL
    t[0xA0] = LeftShift; // VK_LSHIFT
    t[0xA1] = RightShift; // VK_RSHIFT
    t[0xA4] = LeftAlt; // VK_LMENU
    t[0xA5] = RightAlt; // VK_RMENU
    t[0x5B] = LeftMeta; // VK_LWIN
    t[0x5C] = RightMeta; // VK_RWIN

    // Note: WH_KEYBOARD_LL delivers VK_RETURN with an extended-key flag for
    // numpad Enter; the capture infrastructure must detect that flag itself
    // and substitute KpEnter — this table only holds the non-extended path.

    t
};

#[cfg(test)]
mod tests {
    use super::*;
    use Key::*;

    const STANDARD_MAPPINGS: &[(u8, Key)] = &[
        (0x41, A), (0x42, B), (0x43, C), (0x44, D), (0x45, E),
        (0x46, F), (0x47, G), (0x48, H), (0x49, I), (0x4A, J),
        (0x4B, K), (0x4C, L), (0x4D, M), (0x4E, N), (0x4F, O),
        (0x50, P), (0x51, Q), (0x52, R), (0x53, S), (0x54, T),
        (0x55, U), (0x56, V), (0x57, W), (0x58, X), (0x59, Y),
        (0x5A, Z),
        (0x30, Digit0), (0x31, Digit1), (0x32, Digit2), (0x33, Digit3), (0x34, Digit4),
        (0x35, Digit5), (0x36, Digit6), (0x37, Digit7), (0x38, Digit8), (0x39, Digit9),
        (0x70, F1), (0x71, F2), (0x72, F3), (0x73, F4), (0x74, F5), (0x75, F6),
        (0x76, F7), (0x77, F8), (0x78, F9), (0x79, F10), (0x7A, F11), (0x7B, F12),
        (0x25, Left), (0x26, Up), (0x27, Right), (0x28, Down),
        (0x24, Home), (0x23, End), (0x21, PageUp), (0x22, PageDown),
        (0x2D, Insert), (0x2E, Delete),
        (0x0D, Enter), (0x1B, Escape), (0x08, Backspace), (0x09, Tab), (0x20, Space),
        (0x14, CapsLock), (0x91, ScrollLock), (0x2C, SysRq),
        (0x60, Kp0), (0x61, Kp1), (0x62, Kp2), (0x63, Kp3),
        (0x64, Kp4), (0x65, Kp5), (0x66, Kp6), (0x67, Kp7),
        (0x68, Kp8), (0x69, Kp9),
        (0x6A, KpAsterisk), (0x6B, KpPlus), (0x6D, KpMinus),
        (0x6E, KpDot), (0x6F, KpSlash), (0x90, NumLock),
        (0xA2, LeftCtrl), (0xA3, RightCtrl),
        (0xA0, LeftShift), (0xA1, RightShift),
        (0xA4, LeftAlt), (0xA5, RightAlt),
        (0x5B, LeftMeta), (0x5C, RightMeta),
        (0xBD, Minus), (0xBB, Equal), (0xDB, LeftBrace), (0xDD, RightBrace),
        (0xDC, Backslash), (0xBA, Semicolon), (0xDE, Apostrophe), (0xC0, Grave),
        (0xBC, Comma), (0xBE, Dot), (0xBF, Slash),
        (0x5D, Compose),
    ];

    #[test]
    fn all_standard_vk_codes_map_to_correct_key() {
        for &(vk, expected) in STANDARD_MAPPINGS {
            assert_eq!(vk_to_key(vk), expected, "vk_to_key(0x{vk:02X})");
        }
    }

    #[test]
    fn all_keys_map_back_to_vk_bidirectionally() {
        for &(expected_vk, key) in STANDARD_MAPPINGS {
            assert_eq!(key_to_vk(key), Some(expected_vk), "key_to_vk({key:?})");
        }
    }

    #[test]
    fn unknown_vk_codes_return_unknown_key() {
        for vk in [0x00u8, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x0A] {
            assert_eq!(vk_to_key(vk), Key::Unknown);
        }
    }

    #[test]
    fn key_to_vk_unknown_returns_none() {
        assert_eq!(key_to_vk(Key::Unknown), None);
    }

    #[test]
    fn vk_to_key_never_panics_for_any_u8() {
        for vk in 0u8..=255 {
            let _ = vk_to_key(vk);
        }
    }

    #[test]
    fn round_trip_for_all_standard_keys() {
        for &(vk, _) in STANDARD_MAPPINGS {
            let key = vk_to_key(vk);
            assert_eq!(key_to_vk(key), Some(vk));
        }
    }
}
