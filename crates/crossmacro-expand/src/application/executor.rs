//! Expansion executor (10c): runs the backspace/paste-or-type sequence once
//! a dictionary match is found.

use std::time::Duration;

use crossmacro_core::domain::text_expansion::{PasteMethod, TextExpansion};
use crossmacro_core::keymap::Key;
use tokio::time::{sleep, timeout};
use tracing::warn;

use crate::application::clipboard::ClipboardService;
use crate::application::key_simulator::KeySimulator;
use crate::domain::modifier_state::ModifierState;

const CLIPBOARD_TIMEOUT: Duration = Duration::from_millis(100);
const CLIPBOARD_PROPAGATION_DELAY: Duration = Duration::from_millis(100);
const PASTE_SETTLE_DELAY: Duration = Duration::from_millis(150);
const CLIPBOARD_RESTORE_TIMEOUT: Duration = Duration::from_millis(200);
const UNICODE_FALLBACK_SETTLE_DELAY: Duration = Duration::from_millis(200);

/// Translates a replacement character into the `(keyCode, shift, altGr)`
/// triple the layout service would use to type it directly, or `None` if it
/// has no direct key mapping and must go through the Unicode-hex fallback.
pub trait FallbackLayoutService: Send + Sync {
    fn key_for(&self, ch: char) -> Option<(i32, bool, bool)>;
}

/// Runs the 10c operation sequence against a [`KeySimulator`] and, when
/// available, a [`ClipboardService`].
pub struct ExpansionExecutor {
    simulator: std::sync::Arc<dyn KeySimulator>,
    clipboard: Option<std::sync::Arc<dyn ClipboardService>>,
    layout: std::sync::Arc<dyn FallbackLayoutService>,
}

impl ExpansionExecutor {
    pub fn new(
        simulator: std::sync::Arc<dyn KeySimulator>,
        clipboard: Option<std::sync::Arc<dyn ClipboardService>>,
        layout: std::sync::Arc<dyn FallbackLayoutService>,
    ) -> Self {
        Self { simulator, clipboard, layout }
    }

    /// Runs the full expansion sequence for `expansion`, matched by a
    /// suffix of length `trigger_len`. Never panics or propagates errors:
    /// per §4.10.10c.5, any failure is absorbed after an attempt to
    /// release modifiers, because the caller has already suppressed the
    /// trigger and must not leave the keyboard in a half-pressed state.
    pub async fn execute(&self, expansion: &TextExpansion, modifiers: &ModifierState) {
        self.wait_for_modifiers_released(modifiers).await;

        for _ in 0..expansion.trigger.chars().count() {
            self.simulator.emit_key(Key::Backspace as i32, true).await;
            self.simulator.emit_key(Key::Backspace as i32, false).await;
        }

        let pasted = if let Some(clipboard) = self.clipboard.clone() {
            self.try_paste(clipboard, &expansion.replacement, expansion.paste_method).await
        } else {
            false
        };

        if !pasted {
            self.type_directly(&expansion.replacement).await;
        }

        self.simulator.release_all().await;
    }

    async fn wait_for_modifiers_released(&self, modifiers: &ModifierState) {
        // The modifier state is owned by the caller and updated from the
        // live event stream; polling it here would race the very events
        // that clear it, so callers are expected to have already drained
        // release events before invoking `execute`. This is a defensive
        // no-op guard for the (rare) case a modifier is still marked held.
        if modifiers.any_pressed() {
            warn!("expansion executor invoked with a modifier still marked held");
        }
    }

    async fn try_paste(
        &self,
        clipboard: std::sync::Arc<dyn ClipboardService>,
        replacement: &str,
        method: PasteMethod,
    ) -> bool {
        let previous = match timeout(CLIPBOARD_TIMEOUT, clipboard.read()).await {
            Ok(Ok(text)) => Some(text),
            _ => None,
        };

        if timeout(CLIPBOARD_TIMEOUT, clipboard.write(replacement)).await.is_err() {
            return false;
        }

        sleep(CLIPBOARD_PROPAGATION_DELAY).await;

        self.emit_paste_chord(method).await;

        sleep(PASTE_SETTLE_DELAY).await;

        if let Some(previous) = previous {
            let restore_clipboard = clipboard.clone();
            tokio::spawn(async move {
                let _ = timeout(CLIPBOARD_RESTORE_TIMEOUT, restore_clipboard.write(&previous)).await;
            });
        }

        true
    }

    async fn emit_paste_chord(&self, method: PasteMethod) {
        match method {
            PasteMethod::CtrlV => {
                self.chord(&[Key::LeftCtrl as i32, Key::V as i32]).await;
            }
            PasteMethod::CtrlShiftV => {
                self.chord(&[Key::LeftCtrl as i32, Key::LeftShift as i32, Key::V as i32]).await;
            }
            PasteMethod::ShiftInsert => {
                self.chord(&[Key::LeftShift as i32, Key::Insert as i32]).await;
            }
        }
    }

    async fn chord(&self, codes: &[i32]) {
        for &code in codes {
            self.simulator.emit_key(code, true).await;
        }
        for &code in codes.iter().rev() {
            self.simulator.emit_key(code, false).await;
        }
    }

    async fn type_directly(&self, replacement: &str) {
        for ch in replacement.chars() {
            match ch {
                '\r' => continue,
                '\n' => {
                    self.simulator.emit_key(Key::Enter as i32, true).await;
                    self.simulator.emit_key(Key::Enter as i32, false).await;
                }
                other => {
                    if let Some((code, shift, alt_gr)) = self.layout.key_for(other) {
                        self.type_key(code, shift, alt_gr).await;
                    } else {
                        self.unicode_fallback(other as u32).await;
                    }
                }
            }
        }
    }

    async fn type_key(&self, code: i32, shift: bool, alt_gr: bool) {
        if shift {
            self.simulator.emit_key(Key::LeftShift as i32, true).await;
        }
        if alt_gr {
            self.simulator.emit_key(Key::RightAlt as i32, true).await;
        }
        self.simulator.emit_key(code, true).await;
        self.simulator.emit_key(code, false).await;
        if alt_gr {
            self.simulator.emit_key(Key::RightAlt as i32, false).await;
        }
        if shift {
            self.simulator.emit_key(Key::LeftShift as i32, false).await;
        }
    }

    /// The IBus-style Unicode-hex escape: `Ctrl+Shift+U`, the code point's
    /// hex digits, then Enter. §4.6's playback-engine description of this
    /// sequence is the normative one; this mirrors it for the fallback-typing
    /// path the expansion executor takes when the layout has no direct
    /// mapping for a character.
    async fn unicode_fallback(&self, code_point: u32) {
        self.simulator.emit_key(Key::LeftCtrl as i32, true).await;
        self.simulator.emit_key(Key::LeftShift as i32, true).await;
        self.simulator.emit_key(Key::U as i32, true).await;
        self.simulator.emit_key(Key::U as i32, false).await;
        self.simulator.emit_key(Key::LeftShift as i32, false).await;
        self.simulator.emit_key(Key::LeftCtrl as i32, false).await;

        sleep(UNICODE_FALLBACK_SETTLE_DELAY).await;

        for hex_digit in format!("{code_point:x}").chars() {
            if let Some(code) = hex_digit_key_code(hex_digit) {
                self.simulator.emit_key(code, true).await;
                self.simulator.emit_key(code, false).await;
            }
        }

        self.simulator.emit_key(Key::Enter as i32, true).await;
        self.simulator.emit_key(Key::Enter as i32, false).await;
    }
}

fn hex_digit_key_code(digit: char) -> Option<i32> {
    match digit {
        '0' => Some(Key::Digit0 as i32),
        '1' => Some(Key::Digit1 as i32),
        '2' => Some(Key::Digit2 as i32),
        '3' => Some(Key::Digit3 as i32),
        '4' => Some(Key::Digit4 as i32),
        '5' => Some(Key::Digit5 as i32),
        '6' => Some(Key::Digit6 as i32),
        '7' => Some(Key::Digit7 as i32),
        '8' => Some(Key::Digit8 as i32),
        '9' => Some(Key::Digit9 as i32),
        'a' => Some(Key::A as i32),
        'b' => Some(Key::B as i32),
        'c' => Some(Key::C as i32),
        'd' => Some(Key::D as i32),
        'e' => Some(Key::E as i32),
        'f' => Some(Key::F as i32),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossmacro_core::domain::text_expansion::TextExpansion;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct RecordingSimulator {
        events: Mutex<Vec<(i32, bool)>>,
        release_all_calls: Mutex<u32>,
    }

    #[async_trait::async_trait]
    impl KeySimulator for RecordingSimulator {
        async fn emit_key(&self, code: i32, pressed: bool) {
            self.events.lock().unwrap().push((code, pressed));
        }

        async fn release_all(&self) {
            *self.release_all_calls.lock().unwrap() += 1;
        }
    }

    struct NoMappingLayout;

    impl FallbackLayoutService for NoMappingLayout {
        fn key_for(&self, _ch: char) -> Option<(i32, bool, bool)> {
            None
        }
    }

    #[tokio::test]
    async fn execute_without_clipboard_types_directly_and_releases_all() {
        let simulator = Arc::new(RecordingSimulator::default());
        let executor = ExpansionExecutor::new(simulator.clone(), None, Arc::new(NoMappingLayout));
        let expansion = TextExpansion::new(":hi", "x", PasteMethod::CtrlV).unwrap();
        let modifiers = ModifierState::new();

        executor.execute(&expansion, &modifiers).await;

        let events = simulator.events.lock().unwrap();
        // 3 backspaces (press+release) for ":hi" (3 chars) then the
        // Unicode-hex fallback for 'x' (no direct mapping in this test
        // layout), ending with Enter press+release.
        assert_eq!(events[0], (Key::Backspace as i32, true));
        assert_eq!(events[1], (Key::Backspace as i32, false));
        assert_eq!(*simulator.release_all_calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn execute_clears_release_all_even_with_empty_trigger_replacement() {
        let simulator = Arc::new(RecordingSimulator::default());
        let executor = ExpansionExecutor::new(simulator.clone(), None, Arc::new(NoMappingLayout));
        let expansion = TextExpansion::new(":e", "", PasteMethod::CtrlV).unwrap();
        let modifiers = ModifierState::new();

        executor.execute(&expansion, &modifiers).await;

        assert_eq!(*simulator.release_all_calls.lock().unwrap(), 1);
    }
}
