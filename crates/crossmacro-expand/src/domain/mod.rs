//! Domain layer: the modifier state machine (10a) and suffix buffer (10b).

pub mod modifier_state;
pub mod suffix_buffer;

pub use modifier_state::{KeySignal, LayoutService, ModifierState, SpecialKey, DEBOUNCE_WINDOW};
pub use suffix_buffer::SuffixBuffer;
