//! Infrastructure layer: OS adapters implementing the ports `capture`,
//! `playback`, and `position` define.
//!
//! **Dependency rule**: this layer may depend on those port crates/modules,
//! but MUST NOT be depended on by them.

/// Read-only TOML runtime configuration (XDG-aware directory resolution).
pub mod config;
/// IPC client (C3): the engine's side of the daemon socket.
pub mod ipc;
/// Simulation providers (C5): concrete `SimulationProvider` adapters.
pub mod simulation;
