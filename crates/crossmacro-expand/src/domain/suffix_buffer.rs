//! Bounded suffix buffer (10b).
//!
//! Holds the last [`SuffixBuffer::CAPACITY`] characters typed, and matches
//! them against a dictionary of enabled expansions to find the one whose
//! trigger the buffer currently ends with.

use std::collections::VecDeque;

use crossmacro_core::domain::text_expansion::TextExpansion;

/// Bounded append-only window of recently typed characters.
#[derive(Debug, Default)]
pub struct SuffixBuffer {
    chars: VecDeque<char>,
}

impl SuffixBuffer {
    /// Maximum number of characters retained. Matches the fixed window
    /// the dictionary matcher scans.
    pub const CAPACITY: usize = 50;

    pub fn new() -> Self {
        Self { chars: VecDeque::with_capacity(Self::CAPACITY) }
    }

    /// Appends one character, dropping the oldest if the buffer is full.
    pub fn append(&mut self, c: char) {
        if self.chars.len() == Self::CAPACITY {
            self.chars.pop_front();
        }
        self.chars.push_back(c);
    }

    /// Pops the most recently appended character, mirroring a backspace.
    pub fn backspace(&mut self) {
        self.chars.pop_back();
    }

    /// Empties the buffer.
    pub fn clear(&mut self) {
        self.chars.clear();
    }

    /// Returns the current buffer contents as a string, oldest first.
    pub fn as_string(&self) -> String {
        self.chars.iter().collect()
    }

    /// Scans `expansions` and returns the first enabled entry whose trigger
    /// is a suffix of the buffer.
    pub fn try_match<'a>(&self, expansions: &'a [TextExpansion]) -> Option<&'a TextExpansion> {
        let buffer = self.as_string();
        expansions.iter().find(|e| e.enabled && !e.trigger.is_empty() && buffer.ends_with(e.trigger.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossmacro_core::domain::text_expansion::PasteMethod;

    fn expansion(trigger: &str, enabled: bool) -> TextExpansion {
        let mut e = TextExpansion::new(trigger, "replacement", PasteMethod::CtrlV).unwrap();
        e.enabled = enabled;
        e
    }

    #[test]
    fn append_and_as_string_round_trips() {
        let mut buf = SuffixBuffer::new();
        for c in "hello".chars() {
            buf.append(c);
        }
        assert_eq!(buf.as_string(), "hello");
    }

    #[test]
    fn overflow_drops_oldest_character() {
        let mut buf = SuffixBuffer::new();
        for _ in 0..(SuffixBuffer::CAPACITY + 5) {
            buf.append('a');
        }
        buf.append('z');
        assert_eq!(buf.as_string().len(), SuffixBuffer::CAPACITY);
        assert!(buf.as_string().ends_with('z'));
    }

    #[test]
    fn backspace_pops_last_character() {
        let mut buf = SuffixBuffer::new();
        buf.append('h');
        buf.append('i');
        buf.backspace();
        assert_eq!(buf.as_string(), "h");
    }

    #[test]
    fn backspace_on_empty_buffer_is_a_no_op() {
        let mut buf = SuffixBuffer::new();
        buf.backspace();
        assert_eq!(buf.as_string(), "");
    }

    #[test]
    fn clear_empties_buffer() {
        let mut buf = SuffixBuffer::new();
        buf.append('x');
        buf.clear();
        assert_eq!(buf.as_string(), "");
    }

    #[test]
    fn try_match_finds_suffix_trigger() {
        let mut buf = SuffixBuffer::new();
        for c in "say :hi".chars() {
            buf.append(c);
        }
        let expansions = vec![expansion(":hi", true)];
        let matched = buf.try_match(&expansions).unwrap();
        assert_eq!(matched.trigger, ":hi");
    }

    #[test]
    fn try_match_ignores_disabled_expansions() {
        let mut buf = SuffixBuffer::new();
        for c in ":hi".chars() {
            buf.append(c);
        }
        let expansions = vec![expansion(":hi", false)];
        assert!(buf.try_match(&expansions).is_none());
    }

    #[test]
    fn try_match_returns_none_without_suffix_match() {
        let mut buf = SuffixBuffer::new();
        for c in "hello".chars() {
            buf.append(c);
        }
        let expansions = vec![expansion(":hi", true)];
        assert!(buf.try_match(&expansions).is_none());
    }

    #[test]
    fn try_match_prefers_first_matching_entry_in_list_order() {
        let mut buf = SuffixBuffer::new();
        for c in ":hi".chars() {
            buf.append(c);
        }
        let expansions = vec![expansion("i", true), expansion(":hi", true)];
        let matched = buf.try_match(&expansions).unwrap();
        assert_eq!(matched.trigger, "i");
    }
}
