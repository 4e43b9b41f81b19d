//! Coordinate strategies — turn a stream of raw mouse-axis samples into the
//! coherent `(x, y)` samples the recording pipeline emits.
//!
//! # Why a strategy at all? (for beginners)
//!
//! A relative mouse (most USB mice) reports deltas: "moved 3 right, 1 down"
//! since the last sample. An absolute pointer (a tablet, or a Wayland
//! compositor's cursor-position query) reports a position: "the cursor is
//! now at (812, 340)". The recording pipeline doesn't want to care which
//! kind of device produced an event — it wants one `(x, y)` sample per
//! logical movement, in whichever coordinate space the caller asked for.
//! `CoordinateStrategy` is the seam that hides the difference.

use std::sync::atomic::{AtomicI32, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossmacro_core::domain::raw_event::RawInputEvent;
use crossmacro_core::keymap::evdev::codes;

/// Selection inputs for the priority table in the specification's §4.4.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrategySelector {
    pub is_wayland: bool,
    pub use_absolute: bool,
    pub force_relative: bool,
}

/// Which concrete strategy a [`StrategySelector`] resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    Relative,
    Absolute,
}

impl StrategySelector {
    /// Resolves the priority table: Force-Relative (100) beats
    /// Wayland/X11-Absolute (10) beats plain Relative (10).
    pub fn resolve(self) -> StrategyKind {
        if self.force_relative {
            StrategyKind::Relative
        } else if self.use_absolute {
            StrategyKind::Absolute
        } else {
            StrategyKind::Relative
        }
    }
}

/// A sample produced by a [`CoordinateStrategy`] in response to one raw
/// event. `(0, 0)` is the sentinel "no coherent sample yet" value; callers
/// must not treat it as a real position.
pub type Sample = (i32, i32);

pub const SENTINEL: Sample = (0, 0);

/// Common interface both strategies present to the recording pipeline.
pub trait CoordinateStrategy: Send {
    /// Observes one raw event (every event, not only mouse-move ones) and
    /// returns the sample to act on, or [`SENTINEL`] if none is ready yet.
    fn observe(&mut self, event: &RawInputEvent) -> Sample;
}

/// Accumulates relative deltas until a flush point (`Sync`, or any
/// button/scroll/key event with pending motion), per §4.4.
#[derive(Debug, Default)]
pub struct RelativeStrategy {
    pending_x: i32,
    pending_y: i32,
    last_x: i32,
    last_y: i32,
}

impl RelativeStrategy {
    pub fn new() -> Self {
        Self::default()
    }

    fn flush(&mut self) -> Sample {
        let sample = (self.pending_x, self.pending_y);
        self.last_x += self.pending_x;
        self.last_y += self.pending_y;
        self.pending_x = 0;
        self.pending_y = 0;
        sample
    }

    fn has_pending(&self) -> bool {
        self.pending_x != 0 || self.pending_y != 0
    }
}

impl CoordinateStrategy for RelativeStrategy {
    fn observe(&mut self, event: &RawInputEvent) -> Sample {
        use crossmacro_core::domain::raw_event::RawEventKind;

        match event.kind {
            RawEventKind::MouseMove if event.code == codes::REL_X => {
                self.pending_x += event.value;
                SENTINEL
            }
            RawEventKind::MouseMove if event.code == codes::REL_Y => {
                self.pending_y += event.value;
                SENTINEL
            }
            RawEventKind::Sync => {
                if self.has_pending() {
                    self.flush()
                } else {
                    SENTINEL
                }
            }
            RawEventKind::MouseButton | RawEventKind::MouseScroll | RawEventKind::Key => {
                if self.has_pending() {
                    self.flush()
                } else {
                    SENTINEL
                }
            }
            _ => SENTINEL,
        }
    }
}

/// Queries a compositor for the live cursor position on a background
/// polling task (1 ms cadence per §4.4), backing off on repeated errors.
///
/// The poll itself is injected as a `PositionQuery` closure so this struct
/// stays testable without a real compositor connection.
pub struct AbsoluteStrategy {
    x: Arc<AtomicI32>,
    y: Arc<AtomicI32>,
    poll_failures: Arc<AtomicU32>,
}

/// A single compositor position query, as used by [`crate::position`].
pub trait PositionQuery: Send + 'static {
    fn query(&mut self) -> Option<(i32, i32)>;
}

const BACKOFF_AFTER_FAILURES: u32 = 10;
const FAST_POLL: Duration = Duration::from_millis(1);
const SLOW_POLL: Duration = Duration::from_millis(100);

impl AbsoluteStrategy {
    /// Spawns the polling task on the given runtime handle and returns a
    /// handle whose `observe` reads the last sampled position.
    pub fn spawn(mut query: impl PositionQuery) -> Self {
        let (initial_x, initial_y) = query.query().unwrap_or((0, 0));
        let x = Arc::new(AtomicI32::new(initial_x));
        let y = Arc::new(AtomicI32::new(initial_y));
        let poll_failures = Arc::new(AtomicU32::new(0));

        let task_x = Arc::clone(&x);
        let task_y = Arc::clone(&y);
        let task_failures = Arc::clone(&poll_failures);

        tokio::spawn(async move {
            let mut interval = FAST_POLL;
            loop {
                tokio::time::sleep(interval).await;
                match query.query() {
                    Some((sx, sy)) => {
                        task_x.store(sx, Ordering::Relaxed);
                        task_y.store(sy, Ordering::Relaxed);
                        task_failures.store(0, Ordering::Relaxed);
                        interval = FAST_POLL;
                    }
                    None => {
                        let failures = task_failures.fetch_add(1, Ordering::Relaxed) + 1;
                        interval = SLOW_POLL;
                        if failures >= BACKOFF_AFTER_FAILURES {
                            // Keep the last known position and stop polling.
                            return;
                        }
                    }
                }
            }
        });

        Self { x, y, poll_failures }
    }

    /// Builds an instance over already-shared atomics, for unit tests that
    /// want to drive the position without a real background task.
    #[cfg(test)]
    fn from_atomics(x: Arc<AtomicI32>, y: Arc<AtomicI32>) -> Self {
        Self { x, y, poll_failures: Arc::new(AtomicU32::new(0)) }
    }
}

impl CoordinateStrategy for AbsoluteStrategy {
    fn observe(&mut self, event: &RawInputEvent) -> Sample {
        use crossmacro_core::domain::raw_event::RawEventKind;

        if matches!(event.kind, RawEventKind::Sync) {
            return SENTINEL;
        }
        (self.x.load(Ordering::Relaxed), self.y.load(Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossmacro_core::domain::raw_event::RawInputEvent;

    #[test]
    fn selector_force_relative_wins_over_absolute() {
        let sel = StrategySelector { is_wayland: true, use_absolute: true, force_relative: true };
        assert_eq!(sel.resolve(), StrategyKind::Relative);
    }

    #[test]
    fn selector_absolute_when_requested_and_not_forced() {
        let sel = StrategySelector { is_wayland: true, use_absolute: true, force_relative: false };
        assert_eq!(sel.resolve(), StrategyKind::Absolute);
    }

    #[test]
    fn relative_strategy_accumulates_until_sync() {
        let mut strat = RelativeStrategy::new();
        assert_eq!(strat.observe(&RawInputEvent::mouse_move(codes::REL_X, 5, 0)), SENTINEL);
        assert_eq!(strat.observe(&RawInputEvent::mouse_move(codes::REL_Y, -3, 0)), SENTINEL);
        assert_eq!(strat.observe(&RawInputEvent::sync(0)), (5, -3));
    }

    #[test]
    fn relative_strategy_flushes_on_button_without_explicit_sync() {
        let mut strat = RelativeStrategy::new();
        strat.observe(&RawInputEvent::mouse_move(codes::REL_X, 3, 0));
        let sample = strat.observe(&RawInputEvent::mouse_button(codes::BTN_LEFT, 1, 0));
        assert_eq!(sample, (3, 0));
    }

    #[test]
    fn relative_strategy_ignores_sync_with_no_pending_motion() {
        let mut strat = RelativeStrategy::new();
        assert_eq!(strat.observe(&RawInputEvent::sync(0)), SENTINEL);
    }

    #[test]
    fn absolute_strategy_returns_sentinel_on_sync() {
        let x = Arc::new(AtomicI32::new(10));
        let y = Arc::new(AtomicI32::new(20));
        let mut strat = AbsoluteStrategy::from_atomics(x, y);
        assert_eq!(strat.observe(&RawInputEvent::sync(0)), SENTINEL);
    }

    #[test]
    fn absolute_strategy_returns_live_position_on_other_events() {
        let x = Arc::new(AtomicI32::new(10));
        let y = Arc::new(AtomicI32::new(20));
        let mut strat = AbsoluteStrategy::from_atomics(x, y);
        assert_eq!(strat.observe(&RawInputEvent::key(30, 1, 0)), (10, 20));
    }
}
