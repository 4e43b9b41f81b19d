//! # crossmacro-expand
//!
//! Real-time text-expansion core: a modifier-tracking keystroke interpreter
//! feeds a bounded suffix buffer, which is matched against a user
//! dictionary. On a match the trigger is erased and the replacement is
//! emitted via clipboard paste, falling back to direct key synthesis
//! (including a Unicode-hex escape for characters with no direct mapping).
//!
//! This crate is platform-independent: it consumes raw evdev-shaped key
//! events and drives a [`application::KeySimulator`] port, leaving the
//! concrete capture/simulation adapters to `crossmacro-engine`.

pub mod application;
pub mod domain;
pub mod infrastructure;

use std::sync::Arc;
use std::time::Instant;

use crossmacro_core::domain::text_expansion::TextExpansion;

use application::{ClipboardService, ExpansionExecutor, FallbackLayoutService, KeySimulator};
use domain::{KeySignal, LayoutService, ModifierState, SpecialKey, SuffixBuffer};

/// Whether the engine consumed the event as part of an expansion sequence.
/// When `Suppressed`, the caller must not forward the original keystroke
/// to the application that would otherwise have received it, since the
/// trigger text is being erased and replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpansionOutcome {
    Passthrough,
    Suppressed,
}

/// Wires together the modifier state machine (10a), suffix buffer (10b),
/// and expansion executor (10c) into a single per-session engine.
pub struct TextExpansionEngine {
    modifiers: ModifierState,
    buffer: SuffixBuffer,
    dictionary: Vec<TextExpansion>,
    executor: ExpansionExecutor,
    layout: Arc<dyn LayoutService>,
}

impl TextExpansionEngine {
    pub fn new(
        dictionary: Vec<TextExpansion>,
        simulator: Arc<dyn KeySimulator>,
        clipboard: Option<Arc<dyn ClipboardService>>,
        layout: Arc<dyn LayoutService>,
        fallback_layout: Arc<dyn FallbackLayoutService>,
    ) -> Self {
        Self {
            modifiers: ModifierState::new(),
            buffer: SuffixBuffer::new(),
            dictionary,
            executor: ExpansionExecutor::new(simulator, clipboard, fallback_layout),
            layout,
        }
    }

    /// Replaces the active dictionary, e.g. after the user edits it.
    pub fn set_dictionary(&mut self, dictionary: Vec<TextExpansion>) {
        self.dictionary = dictionary;
    }

    /// Feeds one raw `(code, value)` key event through the engine.
    ///
    /// Returns [`ExpansionOutcome::Suppressed`] if an expansion fired and
    /// the caller must withhold the original keystroke from the rest of
    /// the pipeline.
    pub async fn process_key_event(&mut self, code: i32, value: i32) -> ExpansionOutcome {
        let now = Instant::now();
        let signal = self.modifiers.handle_event(code, value, now, self.layout.as_ref());

        match signal {
            Some(KeySignal::SpecialKey(SpecialKey::Backspace)) => {
                self.buffer.backspace();
                ExpansionOutcome::Passthrough
            }
            Some(KeySignal::SpecialKey(SpecialKey::Enter)) => {
                self.buffer.clear();
                ExpansionOutcome::Passthrough
            }
            Some(KeySignal::Character(ch)) => {
                self.buffer.append(ch);
                if let Some(expansion) = self.buffer.try_match(&self.dictionary).cloned() {
                    self.executor.execute(&expansion, &self.modifiers).await;
                    self.buffer.clear();
                    ExpansionOutcome::Suppressed
                } else {
                    ExpansionOutcome::Passthrough
                }
            }
            None => ExpansionOutcome::Passthrough,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossmacro_core::domain::text_expansion::PasteMethod;
    use std::sync::Mutex;

    struct AsciiLayout;

    impl LayoutService for AsciiLayout {
        fn char_for(&self, code: i32, shift: bool, _alt_gr: bool) -> Option<char> {
            match code {
                200 => Some(if shift { ':' } else { ';' }),
                201 => Some(if shift { 'H' } else { 'h' }),
                202 => Some(if shift { 'I' } else { 'i' }),
                _ => None,
            }
        }
    }

    struct DirectFallbackLayout;

    impl FallbackLayoutService for DirectFallbackLayout {
        fn key_for(&self, ch: char) -> Option<(i32, bool, bool)> {
            match ch {
                'H' => Some((201, true, false)),
                'i' => Some((202, false, false)),
                _ => None,
            }
        }
    }

    #[derive(Default)]
    struct RecordingSimulator {
        presses: Mutex<Vec<i32>>,
    }

    #[async_trait::async_trait]
    impl KeySimulator for RecordingSimulator {
        async fn emit_key(&self, code: i32, pressed: bool) {
            if pressed {
                self.presses.lock().unwrap().push(code);
            }
        }

        async fn release_all(&self) {}
    }

    fn expansion(trigger: &str, replacement: &str) -> TextExpansion {
        TextExpansion::new(trigger, replacement, PasteMethod::CtrlV).unwrap()
    }

    #[tokio::test]
    async fn matching_trigger_suppresses_and_clears_buffer() {
        let simulator = Arc::new(RecordingSimulator::default());
        let mut engine = TextExpansionEngine::new(
            vec![expansion(";hi", "Hi!")],
            simulator.clone(),
            None,
            Arc::new(AsciiLayout),
            Arc::new(DirectFallbackLayout),
        );

        // type ';', 'h', 'i'
        let outcome_semi = engine.process_key_event(200, 1).await;
        let outcome_h = engine.process_key_event(201, 1).await;
        let outcome_i = engine.process_key_event(202, 1).await;

        assert_eq!(outcome_semi, ExpansionOutcome::Passthrough);
        assert_eq!(outcome_h, ExpansionOutcome::Passthrough);
        assert_eq!(outcome_i, ExpansionOutcome::Suppressed);
        assert_eq!(engine.buffer.as_string(), "");
    }

    #[tokio::test]
    async fn non_matching_characters_pass_through() {
        let simulator = Arc::new(RecordingSimulator::default());
        let mut engine = TextExpansionEngine::new(
            vec![expansion(";hi", "Hi!")],
            simulator,
            None,
            Arc::new(AsciiLayout),
            Arc::new(DirectFallbackLayout),
        );

        let outcome = engine.process_key_event(201, 1).await;
        assert_eq!(outcome, ExpansionOutcome::Passthrough);
        assert_eq!(engine.buffer.as_string(), "h");
    }

    #[tokio::test]
    async fn enter_clears_buffer() {
        let simulator = Arc::new(RecordingSimulator::default());
        let mut engine = TextExpansionEngine::new(
            vec![expansion(";hi", "Hi!")],
            simulator,
            None,
            Arc::new(AsciiLayout),
            Arc::new(DirectFallbackLayout),
        );

        engine.process_key_event(201, 1).await;
        let outcome = engine.process_key_event(crossmacro_core::keymap::Key::Enter as i32, 1).await;

        assert_eq!(outcome, ExpansionOutcome::Passthrough);
        assert_eq!(engine.buffer.as_string(), "");
    }

    #[tokio::test]
    async fn backspace_removes_last_buffered_character() {
        let simulator = Arc::new(RecordingSimulator::default());
        let mut engine = TextExpansionEngine::new(
            vec![expansion(";hi", "Hi!")],
            simulator,
            None,
            Arc::new(AsciiLayout),
            Arc::new(DirectFallbackLayout),
        );

        engine.process_key_event(201, 1).await;
        engine.process_key_event(202, 1).await;
        engine.process_key_event(crossmacro_core::keymap::Key::Backspace as i32, 1).await;

        assert_eq!(engine.buffer.as_string(), "h");
    }
}
