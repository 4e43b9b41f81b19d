//! Modifier-tracking keystroke interpreter (10a).
//!
//! Observes every captured key event and turns the raw press/release stream
//! into the two signals the rest of the expansion core cares about:
//! special keys (backspace, enter) and printable characters. Modifier state
//! itself (`leftShift`, `rightAlt`, ...) is tracked so callers can consult
//! [`ModifierState::any_pressed`] before running the expansion executor, and
//! so `rightAlt` can be exposed as AltGr.

use std::time::{Duration, Instant};

use crossmacro_core::keymap::Key;

/// Raw evdev key codes this module treats specially. Values match the
/// evdev `Key` enum's discriminants (`Key::X as i32`).
const CODE_LEFT_CTRL: i32 = Key::LeftCtrl as i32;
const CODE_RIGHT_CTRL: i32 = Key::RightCtrl as i32;
const CODE_LEFT_SHIFT: i32 = Key::LeftShift as i32;
const CODE_RIGHT_SHIFT: i32 = Key::RightShift as i32;
const CODE_LEFT_ALT: i32 = Key::LeftAlt as i32;
const CODE_RIGHT_ALT: i32 = Key::RightAlt as i32;
const CODE_CAPS_LOCK: i32 = Key::CapsLock as i32;
const CODE_BACKSPACE: i32 = Key::Backspace as i32;
const CODE_ENTER: i32 = Key::Enter as i32;

/// Presses of the same code within this window are dropped as hardware
/// rebounce rather than re-triggering a signal.
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(20);

/// A value the kernel reports for a key event: 0 = release, 1 = press,
/// 2 = autorepeat (held key re-firing). Only the press transition (1)
/// triggers output; autorepeat is treated the same as a fresh press for
/// signal purposes but is still subject to the debounce window.
fn is_press(value: i32) -> bool {
    value == 1 || value == 2
}

/// Translates an evdev key code + current modifier state into the
/// character it produces, or `None` if the layout has no printable mapping
/// (arrows, function keys, etc).
///
/// This is a minimal US-QWERTY layout sufficient for the expansion core's
/// own matching; platform capture providers may supply a richer
/// implementation of the same contract via [`LayoutService`].
pub trait LayoutService: Send + Sync {
    /// Returns the character a key press produces given current shift/altgr
    /// state, or `None` if the key has no textual representation.
    fn char_for(&self, code: i32, shift: bool, alt_gr: bool) -> Option<char>;
}

/// Signals emitted by the modifier state machine for each accepted key
/// press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySignal {
    /// BACKSPACE or ENTER was pressed.
    SpecialKey(SpecialKey),
    /// Any other key press that the layout service could resolve to a
    /// character.
    Character(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialKey {
    Backspace,
    Enter,
}

/// Tracks pressed/released state of the six modifier keys plus caps lock,
/// and converts the raw event stream into [`KeySignal`]s.
#[derive(Debug, Default)]
pub struct ModifierState {
    left_shift: bool,
    right_shift: bool,
    left_alt: bool,
    right_alt: bool,
    left_ctrl: bool,
    right_ctrl: bool,
    caps_lock: bool,
    last_press: Option<(i32, Instant)>,
}

impl ModifierState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if `rightAlt` is held, i.e. AltGr.
    pub fn alt_gr(&self) -> bool {
        self.right_alt
    }

    /// Returns true if shift is held on either side.
    pub fn shift(&self) -> bool {
        self.left_shift || self.right_shift
    }

    /// True if any modifier is currently held. The expansion executor waits
    /// for this to go false before synthesizing backspaces.
    pub fn any_pressed(&self) -> bool {
        self.left_shift || self.right_shift || self.left_alt || self.right_alt || self.left_ctrl || self.right_ctrl
    }

    /// Feeds one raw `(code, value)` key event through the state machine.
    ///
    /// `now` is the caller's clock reading, passed in rather than read here
    /// so the debounce window is independently testable.
    ///
    /// Returns `Some(signal)` if this event should be visible to the buffer
    /// layer, or `None` if it was a modifier update, a release, or a
    /// debounced rebounce.
    pub fn handle_event(
        &mut self,
        code: i32,
        value: i32,
        now: Instant,
        layout: &dyn LayoutService,
    ) -> Option<KeySignal> {
        let pressed = is_press(value);

        match code {
            CODE_LEFT_SHIFT => self.left_shift = pressed,
            CODE_RIGHT_SHIFT => self.right_shift = pressed,
            CODE_LEFT_ALT => self.left_alt = pressed,
            CODE_RIGHT_ALT => self.right_alt = pressed,
            CODE_LEFT_CTRL => self.left_ctrl = pressed,
            CODE_RIGHT_CTRL => self.right_ctrl = pressed,
            CODE_CAPS_LOCK => {
                if pressed {
                    self.caps_lock = !self.caps_lock;
                }
            }
            _ => {}
        }

        if !pressed {
            return None;
        }

        if let Some((last_code, last_time)) = self.last_press {
            if last_code == code && now.duration_since(last_time) < DEBOUNCE_WINDOW {
                return None;
            }
        }
        self.last_press = Some((code, now));

        match code {
            CODE_BACKSPACE => Some(KeySignal::SpecialKey(SpecialKey::Backspace)),
            CODE_ENTER => Some(KeySignal::SpecialKey(SpecialKey::Enter)),
            CODE_LEFT_SHIFT | CODE_RIGHT_SHIFT | CODE_LEFT_ALT | CODE_RIGHT_ALT | CODE_LEFT_CTRL
            | CODE_RIGHT_CTRL | CODE_CAPS_LOCK => None,
            other => {
                let shift = self.shift() ^ self.caps_lock;
                layout.char_for(other, shift, self.alt_gr()).map(KeySignal::Character)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AsciiLayout;

    impl LayoutService for AsciiLayout {
        fn char_for(&self, code: i32, shift: bool, _alt_gr: bool) -> Option<char> {
            // KEY_H = 35, KEY_I = 23 on a real US layout; use small fake
            // codes here so the test doesn't depend on the full table.
            match code {
                100 => Some(if shift { 'H' } else { 'h' }),
                101 => Some(if shift { 'I' } else { 'i' }),
                _ => None,
            }
        }
    }

    #[test]
    fn backspace_press_emits_special_key() {
        let mut state = ModifierState::new();
        let layout = AsciiLayout;
        let signal = state.handle_event(CODE_BACKSPACE, 1, Instant::now(), &layout);
        assert_eq!(signal, Some(KeySignal::SpecialKey(SpecialKey::Backspace)));
    }

    #[test]
    fn enter_press_emits_special_key() {
        let mut state = ModifierState::new();
        let layout = AsciiLayout;
        let signal = state.handle_event(CODE_ENTER, 1, Instant::now(), &layout);
        assert_eq!(signal, Some(KeySignal::SpecialKey(SpecialKey::Enter)));
    }

    #[test]
    fn release_emits_no_signal() {
        let mut state = ModifierState::new();
        let layout = AsciiLayout;
        let signal = state.handle_event(100, 0, Instant::now(), &layout);
        assert_eq!(signal, None);
    }

    #[test]
    fn plain_character_key_emits_character_signal() {
        let mut state = ModifierState::new();
        let layout = AsciiLayout;
        let signal = state.handle_event(100, 1, Instant::now(), &layout);
        assert_eq!(signal, Some(KeySignal::Character('h')));
    }

    #[test]
    fn shift_held_uppercases_character() {
        let mut state = ModifierState::new();
        let layout = AsciiLayout;
        let t0 = Instant::now();
        state.handle_event(CODE_LEFT_SHIFT, 1, t0, &layout);
        let signal = state.handle_event(100, 1, t0, &layout);
        assert_eq!(signal, Some(KeySignal::Character('H')));
    }

    #[test]
    fn caps_lock_toggles_on_press_and_inverts_case() {
        let mut state = ModifierState::new();
        let layout = AsciiLayout;
        let t0 = Instant::now();
        state.handle_event(CODE_CAPS_LOCK, 1, t0, &layout);
        let signal = state.handle_event(100, 1, t0, &layout);
        assert_eq!(signal, Some(KeySignal::Character('H')));
    }

    #[test]
    fn right_alt_is_exposed_as_alt_gr() {
        let mut state = ModifierState::new();
        let layout = AsciiLayout;
        state.handle_event(CODE_RIGHT_ALT, 1, Instant::now(), &layout);
        assert!(state.alt_gr());
    }

    #[test]
    fn debounce_drops_rapid_repeat_of_same_code() {
        let mut state = ModifierState::new();
        let layout = AsciiLayout;
        let t0 = Instant::now();
        let first = state.handle_event(100, 1, t0, &layout);
        let bounced = state.handle_event(100, 1, t0 + Duration::from_millis(5), &layout);
        assert_eq!(first, Some(KeySignal::Character('h')));
        assert_eq!(bounced, None);
    }

    #[test]
    fn press_after_debounce_window_is_accepted() {
        let mut state = ModifierState::new();
        let layout = AsciiLayout;
        let t0 = Instant::now();
        state.handle_event(100, 1, t0, &layout);
        let later = state.handle_event(100, 1, t0 + Duration::from_millis(25), &layout);
        assert_eq!(later, Some(KeySignal::Character('h')));
    }

    #[test]
    fn any_pressed_reflects_held_modifiers() {
        let mut state = ModifierState::new();
        let layout = AsciiLayout;
        assert!(!state.any_pressed());
        state.handle_event(CODE_LEFT_CTRL, 1, Instant::now(), &layout);
        assert!(state.any_pressed());
        state.handle_event(CODE_LEFT_CTRL, 0, Instant::now(), &layout);
        assert!(!state.any_pressed());
    }
}
