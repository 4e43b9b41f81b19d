//! Key code translation tables for cross-platform keyboard event mapping.
//!
//! The canonical representation is the Linux evdev `KEY_*` vocabulary (see
//! [`evdev::Key`]). Platform-specific codes are translated to/from it at the
//! capture/simulation boundary on each non-Linux platform, and X11 KeySyms
//! fill the same role on Linux.

pub mod evdev;
pub mod linux_x11;
pub mod macos_cg;
pub mod windows_vk;

pub use evdev::Key;

/// Unified key mapper providing all translation directions.
pub struct KeyMapper;

impl KeyMapper {
    /// Translates a Windows Virtual Key code to the canonical [`Key`].
    pub fn windows_vk_to_key(vk: u8) -> Key {
        windows_vk::vk_to_key(vk)
    }

    /// Translates a [`Key`] to a Windows Virtual Key code.
    ///
    /// Returns `None` if the key has no Windows VK equivalent.
    pub fn key_to_windows_vk(key: Key) -> Option<u8> {
        windows_vk::key_to_vk(key)
    }

    /// Translates a [`Key`] to an X11 KeySym value.
    ///
    /// Returns `None` if the key has no X11 equivalent.
    pub fn key_to_x11_keysym(key: Key) -> Option<u32> {
        linux_x11::key_to_keysym(key)
    }

    /// Translates an X11 KeySym back to the canonical [`Key`].
    pub fn x11_keysym_to_key(keysym: u32) -> Key {
        linux_x11::keysym_to_key(keysym)
    }

    /// Translates a [`Key`] to a macOS `CGKeyCode` value.
    ///
    /// Returns `None` if the key has no macOS equivalent.
    pub fn key_to_macos_cgkeycode(key: Key) -> Option<u16> {
        macos_cg::key_to_cgkeycode(key)
    }

    /// Translates a macOS `CGKeyCode` back to the canonical [`Key`].
    pub fn macos_cgkeycode_to_key(code: u16) -> Key {
        macos_cg::cgkeycode_to_key(code)
    }
}
