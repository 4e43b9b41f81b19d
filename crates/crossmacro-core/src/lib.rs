//! # crossmacro-core
//!
//! Shared library for CrossMacro containing the daemon IPC codec, domain
//! entities (raw events, macro sequences, schedules, text expansions), and
//! key code translation tables between the canonical evdev vocabulary and
//! each platform's native keyboard representation.
//!
//! This crate is used by `crossmacro-daemon`, `crossmacro-engine`, and
//! `crossmacro-expand`. It has zero dependencies on OS APIs, UI frameworks,
//! or network sockets.

pub mod domain;
pub mod keymap;
pub mod protocol;

/// Re-export commonly used types at the crate root for convenience.
pub use domain::macro_event::{MacroButton, MacroEvent, MacroEventKind, MacroSequence, MacroSequenceError};
pub use domain::raw_event::{RawEventKind, RawInputEvent};
pub use domain::schedule::{PlaybackSpeed, RepeatMode, ScheduledTask, ShortcutTask};
pub use domain::text_expansion::{PasteMethod, TextExpansion};
pub use keymap::evdev::Key;
pub use protocol::codec::{decode_message, encode_message, ProtocolError};
pub use protocol::messages::IpcMessage;
