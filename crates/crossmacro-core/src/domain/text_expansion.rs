//! `TextExpansion` — a single trigger/replacement dictionary entry.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TextExpansionError {
    #[error("trigger string must not be empty")]
    EmptyTrigger,
}

/// The key chord synthesized to ask the active application to paste.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PasteMethod {
    CtrlV,
    CtrlShiftV,
    ShiftInsert,
}

/// One entry in the text-expansion dictionary matched by the buffer scan in
/// `crossmacro-expand`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextExpansion {
    pub trigger: String,
    pub replacement: String,
    pub enabled: bool,
    pub paste_method: PasteMethod,
}

impl TextExpansion {
    pub fn new(
        trigger: impl Into<String>,
        replacement: impl Into<String>,
        paste_method: PasteMethod,
    ) -> Result<Self, TextExpansionError> {
        let trigger = trigger.into();
        if trigger.is_empty() {
            return Err(TextExpansionError::EmptyTrigger);
        }
        Ok(Self { trigger, replacement: replacement.into(), enabled: true, paste_method })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_empty_trigger() {
        let result = TextExpansion::new("", "hello", PasteMethod::CtrlV);
        assert_eq!(result.unwrap_err(), TextExpansionError::EmptyTrigger);
    }

    #[test]
    fn new_defaults_to_enabled() {
        let exp = TextExpansion::new(":hi", "Hello, world!", PasteMethod::CtrlV).unwrap();
        assert!(exp.enabled);
    }
}
