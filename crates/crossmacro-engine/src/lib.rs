//! crossmacro-engine library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does the engine do? (for beginners)
//!
//! The engine is the unprivileged process a user actually launches. It
//! talks to `crossmacro-daemon` (or a platform-native fallback) to observe
//! and inject input, and hosts the four user-facing capabilities built on
//! top of that: recording a macro, playing one back, running scheduled
//! shortcuts, and expanding text snippets as you type.
//!
//! 1. Connects to the daemon over its Unix socket (or a platform capture
//!    backend where no daemon exists) and completes the version handshake.
//! 2. Feeds every observed raw input event through a [`coordinate`]
//!    strategy and a [`recording`] pipeline to build a [`MacroSequence`].
//! 3. Replays a stored sequence through the [`playback`] engine, which
//!    drives a [`SimulationProvider`] adapter.
//! 4. Runs scheduled shortcuts and the text-expansion core alongside.
//!
//! [`MacroSequence`]: crossmacro_core::domain::macro_event::MacroSequence
//! [`SimulationProvider`]: playback::SimulationProvider

/// Infrastructure layer: OS adapters implementing the `capture`,
/// `playback`, and `position` ports.
pub mod infrastructure;

/// Capture providers (C4): uniform surface over platform input-observation backends.
pub mod capture;

/// Coordinate strategies (C6): Relative vs Absolute pointer-position bookkeeping.
pub mod coordinate;

/// Playback engine (C8): drives a `SimulationProvider` from a `MacroSequence`.
pub mod playback;

/// Position providers (C9): compositor cursor-position queries for `Absolute` coordinates.
pub mod position;

/// Recording pipeline (C7): raw events in, a `MacroSequence` out.
pub mod recording;

/// Scheduler (C11): timer/calendar-triggered shortcut runner.
pub mod scheduler;
