//! Position providers (C9) — compositor cursor-position queries feeding the
//! `Absolute` [`crate::coordinate::CoordinateStrategy`].
//!
//! Selected by a priority table keyed on detected compositor (§4.9), mirrors
//! the daemon's `Authorizer`/`CaptureBackend` "consumer defines the port,
//! infrastructure implements it" pattern from
//! `crossmacro-daemon::application::session`.

use std::time::Duration;

pub mod fallback;

#[cfg(target_os = "linux")]
pub mod session_bus;

#[cfg(target_os = "linux")]
pub mod x11;

pub use fallback::FallbackPositionProvider;

/// Uniform surface every position backend implements.
pub trait PositionProvider: Send {
    /// Higher wins. `Force-Relative`-strength precedence doesn't apply
    /// here (that's the coordinate strategy's own table); this just orders
    /// providers by how authoritative their source is.
    fn priority(&self) -> u8;

    fn name(&self) -> &'static str;

    /// `None` if the provider currently can't answer (compositor extension
    /// not loaded, session bus unreachable, etc).
    fn get_absolute_position(&mut self) -> Option<(i32, i32)>;

    fn get_screen_resolution(&mut self) -> Option<(i32, i32)>;
}

/// Tries providers in descending priority order, returning the first
/// successful answer. Holds no state across calls beyond the provider list
/// itself — a provider that starts failing is retried every call, matching
/// §4.9's "selected by priority" rather than "selected once and cached".
pub struct PositionRegistry {
    providers: Vec<Box<dyn PositionProvider>>,
}

impl PositionRegistry {
    pub fn new(mut providers: Vec<Box<dyn PositionProvider>>) -> Self {
        providers.sort_by_key(|p| std::cmp::Reverse(p.priority()));
        Self { providers }
    }

    /// Builds the registry for the current platform: compositor-specific
    /// providers ahead of the always-available [`FallbackPositionProvider`].
    pub fn detect() -> Self {
        let mut providers: Vec<Box<dyn PositionProvider>> = Vec::new();
        #[cfg(target_os = "linux")]
        {
            if let Ok(provider) = x11::X11PositionProvider::connect() {
                providers.push(Box::new(provider));
            }
            if session_bus::is_gnome_session() {
                providers.push(Box::new(session_bus::GnomePositionProvider::new()));
            }
            if session_bus::is_kde_session() {
                providers.push(Box::new(session_bus::KdePositionProvider::new()));
            }
        }
        providers.push(Box::new(FallbackPositionProvider::new()));
        Self::new(providers)
    }

    pub fn active_provider_name(&mut self) -> &'static str {
        for provider in &mut self.providers {
            if provider.get_absolute_position().is_some() {
                return provider.name();
            }
        }
        "none"
    }
}

impl PositionProvider for PositionRegistry {
    fn priority(&self) -> u8 {
        self.providers.first().map(|p| p.priority()).unwrap_or(0)
    }

    fn name(&self) -> &'static str {
        "registry"
    }

    fn get_absolute_position(&mut self) -> Option<(i32, i32)> {
        self.providers.iter_mut().find_map(|p| p.get_absolute_position())
    }

    fn get_screen_resolution(&mut self) -> Option<(i32, i32)> {
        self.providers.iter_mut().find_map(|p| p.get_screen_resolution())
    }
}

/// Adapts a [`PositionProvider`] (synchronous, polled on demand) to
/// [`crate::coordinate::PositionQuery`], the interface `AbsoluteStrategy`'s
/// background task actually polls.
pub struct PositionQueryAdapter<P: PositionProvider + 'static> {
    provider: P,
}

impl<P: PositionProvider + 'static> PositionQueryAdapter<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }
}

impl<P: PositionProvider + 'static> crate::coordinate::PositionQuery for PositionQueryAdapter<P> {
    fn query(&mut self) -> Option<(i32, i32)> {
        self.provider.get_absolute_position()
    }
}

pub(crate) const FALLBACK_TIMEOUT: Duration = Duration::from_secs(2);
pub(crate) const FALLBACK_RESOLUTION: (i32, i32) = (5120, 1440);
