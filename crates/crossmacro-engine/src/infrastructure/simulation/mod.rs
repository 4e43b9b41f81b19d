//! Simulation providers (C5) — concrete [`SimulationProvider`] adapters for
//! each way CrossMacro can inject synthetic input.
//!
//! The `uinput_daemon` provider is the only one that's fully live (it just
//! sends frames over the already-working IPC client); the FFI-backed
//! providers keep the teacher's placeholder idiom from
//! `input_emulation::linux`/`macos`/`windows` — the real syscalls are
//! documented in comments because the FFI libraries aren't linkable in this
//! environment, but every argument is computed for real.

pub mod mock;
pub mod uinput_daemon;

#[cfg(target_os = "linux")]
pub mod xtest;

#[cfg(target_os = "windows")]
pub mod windows;

#[cfg(target_os = "macos")]
pub mod macos;
