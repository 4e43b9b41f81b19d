//! Port the expansion executor synthesizes key presses through.
//!
//! The uniform simulation surface (§4.7 in the coordinating specification)
//! lives on the `crossmacro-engine` side of this workspace; this trait is
//! the narrow slice of it the text-expansion core actually calls, so this
//! crate never has to depend on `crossmacro-engine`. The binary composition
//! root wires a concrete simulation provider into an adapter that implements
//! this trait.

use async_trait::async_trait;

/// Synthesizes individual key presses and releases.
#[async_trait]
pub trait KeySimulator: Send + Sync {
    /// Presses or releases `code` (a raw evdev `KEY_*` code).
    async fn emit_key(&self, code: i32, pressed: bool);

    /// Releases every key this simulator has pressed and not yet released.
    /// Mandatory on every exit path out of the expansion executor.
    async fn release_all(&self);
}
