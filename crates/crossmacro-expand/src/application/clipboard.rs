//! Clipboard access port used by the expansion executor's paste path.
//!
//! Every call is expected to be wrapped by the caller in a `tokio::time::timeout`
//! per the 100/100/.../200 ms budgets in §4.10.10c; this trait itself carries
//! no timeout logic so it stays a thin adapter boundary over `arboard`.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait ClipboardService: Send + Sync {
    /// Reads the current clipboard text contents.
    async fn read(&self) -> Result<String, ClipboardError>;

    /// Overwrites the clipboard with `text`.
    async fn write(&self, text: &str) -> Result<(), ClipboardError>;
}
