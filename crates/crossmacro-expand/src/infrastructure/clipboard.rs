//! `arboard`-backed [`ClipboardService`] implementation.
//!
//! `arboard`'s clipboard handle is not `Send`, so each call opens and drops
//! a fresh handle inside `spawn_blocking` rather than holding one across
//! `.await` points.

use async_trait::async_trait;

use crate::application::clipboard::{ClipboardError, ClipboardService};

#[derive(Debug, Default)]
pub struct SystemClipboard;

impl SystemClipboard {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ClipboardService for SystemClipboard {
    async fn read(&self) -> Result<String, ClipboardError> {
        tokio::task::spawn_blocking(|| {
            let mut clipboard = arboard::Clipboard::new().map_err(|e| ClipboardError::Unavailable(e.to_string()))?;
            clipboard.get_text().map_err(|e| ClipboardError::Unavailable(e.to_string()))
        })
        .await
        .map_err(|e| ClipboardError::Unavailable(e.to_string()))?
    }

    async fn write(&self, text: &str) -> Result<(), ClipboardError> {
        let text = text.to_string();
        tokio::task::spawn_blocking(move || {
            let mut clipboard = arboard::Clipboard::new().map_err(|e| ClipboardError::Unavailable(e.to_string()))?;
            clipboard.set_text(text).map_err(|e| ClipboardError::Unavailable(e.to_string()))
        })
        .await
        .map_err(|e| ClipboardError::Unavailable(e.to_string()))?
    }
}
