//! Application layer: ports the executor depends on, and the executor use
//! case itself.

pub mod clipboard;
pub mod executor;
pub mod key_simulator;

pub use clipboard::{ClipboardError, ClipboardService};
pub use executor::{ExpansionExecutor, FallbackLayoutService};
pub use key_simulator::KeySimulator;
