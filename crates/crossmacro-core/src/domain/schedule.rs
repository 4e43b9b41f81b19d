//! `ShortcutTask` / `ScheduledTask` — references to a macro plus how/when to
//! replay it.
//!
//! Both tasks share the same repeat semantics: `LoopEnabled`, `RunWhileHeld`,
//! or neither, and these are mutually exclusive (§3). Rather than exposing
//! two independent booleans that callers could set inconsistently, the
//! exclusivity is enforced by the setter methods below — turning one on
//! always turns the other off, matching "turning one on turns the other
//! off" verbatim.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SpeedError {
    #[error("playback speed {0} is out of range [0.1, 10.0]")]
    OutOfRange(f32),
}

/// Validated playback-speed multiplier, always within `[0.1, 10.0]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f32", into = "f32")]
pub struct PlaybackSpeed(f32);

impl PlaybackSpeed {
    pub const MIN: f32 = 0.1;
    pub const MAX: f32 = 10.0;

    pub fn new(value: f32) -> Result<Self, SpeedError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(SpeedError::OutOfRange(value))
        }
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

impl TryFrom<f32> for PlaybackSpeed {
    type Error = SpeedError;
    fn try_from(value: f32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PlaybackSpeed> for f32 {
    fn from(speed: PlaybackSpeed) -> Self {
        speed.0
    }
}

impl Default for PlaybackSpeed {
    fn default() -> Self {
        Self(1.0)
    }
}

/// The mutually-exclusive repeat behavior for a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RepeatMode {
    #[default]
    None,
    LoopEnabled,
    RunWhileHeld,
}

/// A hotkey-triggered macro invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortcutTask {
    pub macro_path: PathBuf,
    pub hotkey: String,
    pub speed: PlaybackSpeed,
    pub repeat: RepeatMode,
}

impl ShortcutTask {
    pub fn new(macro_path: PathBuf, hotkey: impl Into<String>) -> Self {
        Self {
            macro_path,
            hotkey: hotkey.into(),
            speed: PlaybackSpeed::default(),
            repeat: RepeatMode::None,
        }
    }

    pub fn set_loop_enabled(&mut self, enabled: bool) {
        self.repeat = if enabled { RepeatMode::LoopEnabled } else { RepeatMode::None };
    }

    pub fn set_run_while_held(&mut self, enabled: bool) {
        self.repeat = if enabled { RepeatMode::RunWhileHeld } else { RepeatMode::None };
    }
}

/// A calendar/timer-triggered macro invocation, driven by the scheduler
/// (C11).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledTask {
    pub macro_path: PathBuf,
    pub schedule: String,
    pub speed: PlaybackSpeed,
    pub repeat: RepeatMode,
}

impl ScheduledTask {
    pub fn new(macro_path: PathBuf, schedule: impl Into<String>) -> Self {
        Self {
            macro_path,
            schedule: schedule.into(),
            speed: PlaybackSpeed::default(),
            repeat: RepeatMode::None,
        }
    }

    pub fn set_loop_enabled(&mut self, enabled: bool) {
        self.repeat = if enabled { RepeatMode::LoopEnabled } else { RepeatMode::None };
    }

    pub fn set_run_while_held(&mut self, enabled: bool) {
        self.repeat = if enabled { RepeatMode::RunWhileHeld } else { RepeatMode::None };
    }
}
