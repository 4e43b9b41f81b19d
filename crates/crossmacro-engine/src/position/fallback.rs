//! The always-available, priority-0 position provider (§4.9). Never knows
//! the real cursor position; exists so the registry always has something
//! to fall back to rather than leaving `Absolute` strategies with no
//! resolution at all.

use std::time::Duration;

use super::{PositionProvider, FALLBACK_RESOLUTION, FALLBACK_TIMEOUT};

pub struct FallbackPositionProvider {
    timeout: Duration,
    waited: bool,
}

impl FallbackPositionProvider {
    pub fn new() -> Self {
        Self { timeout: FALLBACK_TIMEOUT, waited: false }
    }

    /// Used by tests that don't want to actually block for the production
    /// 2s detection timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout, waited: false }
    }
}

impl Default for FallbackPositionProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl PositionProvider for FallbackPositionProvider {
    fn priority(&self) -> u8 {
        0
    }

    fn name(&self) -> &'static str {
        "fallback"
    }

    fn get_absolute_position(&mut self) -> Option<(i32, i32)> {
        None
    }

    /// Waits out the detection timeout on first call (simulating "no
    /// compositor answered"), then always returns the hard-coded
    /// resolution.
    fn get_screen_resolution(&mut self) -> Option<(i32, i32)> {
        if !self.waited {
            std::thread::sleep(self.timeout);
            self.waited = true;
        }
        Some(FALLBACK_RESOLUTION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_position_always_none() {
        let mut provider = FallbackPositionProvider::new();
        assert_eq!(provider.get_absolute_position(), None);
    }

    #[test]
    fn resolution_is_hardcoded() {
        let mut provider = FallbackPositionProvider::with_timeout(Duration::from_millis(1));
        assert_eq!(provider.get_screen_resolution(), Some((5120, 1440)));
    }
}
