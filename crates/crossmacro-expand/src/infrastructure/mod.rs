//! Infrastructure layer: OS/ecosystem adapters for the application ports.

pub mod clipboard;

pub use clipboard::SystemClipboard;
