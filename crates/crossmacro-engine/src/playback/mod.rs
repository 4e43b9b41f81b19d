//! Playback engine (C8) — replays a [`MacroSequence`] through a
//! [`SimulationProvider`], one event at a time, on a monotonic schedule.
//!
//! # Why absolute-deadline scheduling? (for beginners)
//!
//! Sleeping `delay_ms` between every event sounds simple, but each
//! `sleep()` call itself takes a little longer than requested (thread
//! wake-up jitter). Accumulate that error over a thousand events and
//! playback visibly drifts behind the recorded timing. Scheduling against
//! an absolute deadline computed once at the start — "event N should fire
//! at `t0 + cumulative_delay`" — means any one sleep's overrun doesn't
//! compound into the next.

use thiserror::Error;
use tokio::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

use crossmacro_core::domain::macro_event::{MacroButton, MacroEvent, MacroEventKind, MacroSequence};
use crossmacro_core::domain::schedule::{PlaybackSpeed, RepeatMode};
use crossmacro_core::keymap::evdev::Key;

/// Maps one hex digit to the evdev code used to type it, for the Unicode
/// compose fallback in [`SimulationProvider::emit_unicode_code_point`].
fn hex_digit_key(digit: char) -> Option<i32> {
    let key = match digit {
        '0' => Key::Digit0,
        '1' => Key::Digit1,
        '2' => Key::Digit2,
        '3' => Key::Digit3,
        '4' => Key::Digit4,
        '5' => Key::Digit5,
        '6' => Key::Digit6,
        '7' => Key::Digit7,
        '8' => Key::Digit8,
        '9' => Key::Digit9,
        'a' => Key::A,
        'b' => Key::B,
        'c' => Key::C,
        'd' => Key::D,
        'e' => Key::E,
        'f' => Key::F,
        _ => return None,
    };
    Some(key as i32)
}

/// The uniform simulation surface (§4.7), injected so the playback engine
/// never knows which platform it's running on.
pub trait SimulationProvider: Send {
    fn initialize(&mut self, width: i32, height: i32) -> Result<(), String>;
    fn move_absolute(&mut self, x: i32, y: i32) -> Result<(), String>;
    fn move_relative(&mut self, dx: i32, dy: i32) -> Result<(), String>;
    fn emit_button(&mut self, button: MacroButton, pressed: bool) -> Result<(), String>;
    fn emit_scroll(&mut self, value: i32) -> Result<(), String>;
    fn emit_key(&mut self, code: i32, pressed: bool) -> Result<(), String>;
    fn release_all(&mut self) -> Result<(), String>;
    fn dispose(&mut self);

    /// Unicode fallback for characters with no direct key mapping (used by
    /// text expansion and by macros that recorded non-ASCII input). Default
    /// implementation is the Ctrl+Shift+U hex-compose sequence from §4.6;
    /// Windows/macOS providers override this with a direct Unicode payload
    /// on the synthesized key event instead (§9's "Unicode typing is a
    /// heuristic" design note).
    fn emit_unicode_code_point(&mut self, code_point: u32) -> Result<(), String> {
        self.emit_key(Key::LeftCtrl as i32, true)?;
        self.emit_key(Key::LeftShift as i32, true)?;
        self.emit_key(Key::U as i32, true)?;
        self.emit_key(Key::U as i32, false)?;
        self.emit_key(Key::LeftCtrl as i32, false)?;
        self.emit_key(Key::LeftShift as i32, false)?;
        for digit in format!("{code_point:x}").chars() {
            let code = hex_digit_key(digit).ok_or_else(|| format!("no key mapping for hex digit {digit}"))?;
            self.emit_key(code, true)?;
            self.emit_key(code, false)?;
        }
        self.emit_key(Key::Enter as i32, true)?;
        self.emit_key(Key::Enter as i32, false)?;
        Ok(())
    }
}

/// Repeat/trigger mode for one playback invocation (§4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackMode {
    Once,
    /// `0` means "loop indefinitely until cancelled".
    LoopN(u32),
    WhileHeld,
}

impl From<RepeatMode> for PlaybackMode {
    fn from(mode: RepeatMode) -> Self {
        match mode {
            RepeatMode::None => PlaybackMode::Once,
            RepeatMode::LoopEnabled => PlaybackMode::LoopN(0),
            RepeatMode::RunWhileHeld => PlaybackMode::WhileHeld,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlaybackError {
    #[error("simulation failed: {0}")]
    Simulation(String),
    #[error("playback cancelled")]
    Cancelled,
}

/// Drives one [`MacroSequence`] through a [`SimulationProvider`].
pub struct PlaybackEngine<'a, P: SimulationProvider> {
    provider: &'a mut P,
    width: i32,
    height: i32,
    absolute: bool,
    repeat_delay: Duration,
}

impl<'a, P: SimulationProvider> PlaybackEngine<'a, P> {
    pub fn new(provider: &'a mut P, width: i32, height: i32, absolute: bool, repeat_delay: Duration) -> Self {
        Self { provider, width, height, absolute, repeat_delay }
    }

    /// Runs `sequence` under `mode` at `speed`, cooperating with `cancel`.
    /// Every exit path — success, cancellation, or error — runs the
    /// mandatory release-all phase before returning.
    pub async fn run(
        &mut self,
        sequence: &MacroSequence,
        speed: PlaybackSpeed,
        mode: PlaybackMode,
        cancel: &CancellationToken,
    ) -> Result<(), PlaybackError> {
        self.provider.initialize(self.width, self.height).map_err(PlaybackError::Simulation)?;

        let result = self.run_iterations(sequence, speed, mode, cancel).await;

        // Mandatory on every exit path, success or failure alike.
        let _ = self.provider.emit_button(MacroButton::Left, false);
        let _ = self.provider.emit_button(MacroButton::Right, false);
        let _ = self.provider.emit_button(MacroButton::Middle, false);
        let _ = self.provider.release_all();

        result
    }

    async fn run_iterations(
        &mut self,
        sequence: &MacroSequence,
        speed: PlaybackSpeed,
        mode: PlaybackMode,
        cancel: &CancellationToken,
    ) -> Result<(), PlaybackError> {
        let mut iteration = 0u32;
        loop {
            self.run_once(sequence, speed, cancel).await?;
            iteration += 1;
            match mode {
                PlaybackMode::Once => return Ok(()),
                PlaybackMode::WhileHeld => return Ok(()), // caller re-invokes on each press transition
                PlaybackMode::LoopN(n) => {
                    if n != 0 && iteration >= n {
                        return Ok(());
                    }
                    tokio::select! {
                        _ = cancel.cancelled() => return Err(PlaybackError::Cancelled),
                        _ = tokio::time::sleep(self.repeat_delay) => {}
                    }
                }
            }
        }
    }

    async fn run_once(
        &mut self,
        sequence: &MacroSequence,
        speed: PlaybackSpeed,
        cancel: &CancellationToken,
    ) -> Result<(), PlaybackError> {
        let start = Instant::now();
        let mut elapsed = Duration::ZERO;

        for event in &sequence.events {
            if cancel.is_cancelled() {
                return Err(PlaybackError::Cancelled);
            }

            elapsed += Duration::from_secs_f64(event.delay_ms as f64 / 1000.0 / speed.get() as f64);
            let deadline = start + elapsed;
            tokio::select! {
                _ = cancel.cancelled() => return Err(PlaybackError::Cancelled),
                _ = tokio::time::sleep_until(deadline) => {}
            }

            self.emit(event).map_err(PlaybackError::Simulation)?;
        }
        Ok(())
    }

    fn emit(&mut self, event: &MacroEvent) -> Result<(), String> {
        match event.kind {
            MacroEventKind::MouseMove => {
                if self.absolute {
                    let x = event.x.clamp(0, self.width - 1);
                    let y = event.y.clamp(0, self.height - 1);
                    self.provider.move_absolute(x, y)
                } else {
                    self.provider.move_relative(event.x, event.y)
                }
            }
            MacroEventKind::ButtonPress => self.provider.emit_button(event.button, true),
            MacroEventKind::ButtonRelease => self.provider.emit_button(event.button, false),
            MacroEventKind::Click => {
                let value = match event.button {
                    MacroButton::ScrollUp => 1,
                    MacroButton::ScrollDown => -1,
                    MacroButton::ScrollRight => 1,
                    MacroButton::ScrollLeft => -1,
                    _ => 0,
                };
                self.provider.emit_scroll(value)
            }
            MacroEventKind::KeyPress => self.provider.emit_key(event.key_code, true),
            MacroEventKind::KeyRelease => self.provider.emit_key(event.key_code, false),
            MacroEventKind::Scroll => self.provider.emit_scroll(event.key_code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingProvider {
        log: Vec<String>,
        released: bool,
    }

    impl SimulationProvider for RecordingProvider {
        fn initialize(&mut self, w: i32, h: i32) -> Result<(), String> {
            self.log.push(format!("init({w},{h})"));
            Ok(())
        }
        fn move_absolute(&mut self, x: i32, y: i32) -> Result<(), String> {
            self.log.push(format!("abs({x},{y})"));
            Ok(())
        }
        fn move_relative(&mut self, dx: i32, dy: i32) -> Result<(), String> {
            self.log.push(format!("rel({dx},{dy})"));
            Ok(())
        }
        fn emit_button(&mut self, button: MacroButton, pressed: bool) -> Result<(), String> {
            self.log.push(format!("button({button:?},{pressed})"));
            Ok(())
        }
        fn emit_scroll(&mut self, value: i32) -> Result<(), String> {
            self.log.push(format!("scroll({value})"));
            Ok(())
        }
        fn emit_key(&mut self, code: i32, pressed: bool) -> Result<(), String> {
            self.log.push(format!("key({code},{pressed})"));
            Ok(())
        }
        fn release_all(&mut self) -> Result<(), String> {
            self.released = true;
            Ok(())
        }
        fn dispose(&mut self) {}
    }

    fn ev(kind: MacroEventKind, x: i32, y: i32, button: MacroButton, key_code: i32, delay: i64) -> MacroEvent {
        MacroEvent { kind, x, y, button, key_code, timestamp: 0, delay_ms: delay }
    }

    #[tokio::test]
    async fn absolute_playback_clamps_to_resolution() {
        let mut provider = RecordingProvider::default();
        let mut engine = PlaybackEngine::new(&mut provider, 1920, 1080, true, Duration::from_millis(0));
        let seq = MacroSequence {
            name: "s".into(),
            events: vec![ev(MacroEventKind::MouseMove, 5000, -10, MacroButton::None, 0, 0)],
        };
        let cancel = CancellationToken::new();
        engine.run(&seq, PlaybackSpeed::default(), PlaybackMode::Once, &cancel).await.unwrap();
        assert!(provider.log.iter().any(|l| l == "abs(1919,0)"));
    }

    #[tokio::test]
    async fn cancellation_still_runs_release_all() {
        let mut provider = RecordingProvider::default();
        let mut engine = PlaybackEngine::new(&mut provider, 1920, 1080, false, Duration::from_millis(0));
        let seq = MacroSequence {
            name: "s".into(),
            events: vec![ev(MacroEventKind::ButtonPress, 0, 0, MacroButton::Left, 0, 10_000)],
        };
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = engine.run(&seq, PlaybackSpeed::default(), PlaybackMode::Once, &cancel).await;
        assert_eq!(result, Err(PlaybackError::Cancelled));
        assert!(provider.released);
    }

    #[tokio::test]
    async fn loop_n_runs_exactly_n_times() {
        let mut provider = RecordingProvider::default();
        let mut engine = PlaybackEngine::new(&mut provider, 1920, 1080, false, Duration::from_millis(0));
        let seq = MacroSequence {
            name: "s".into(),
            events: vec![ev(MacroEventKind::KeyPress, 0, 0, MacroButton::None, 30, 0), ev(MacroEventKind::KeyRelease, 0, 0, MacroButton::None, 30, 0)],
        };
        let cancel = CancellationToken::new();
        engine.run(&seq, PlaybackSpeed::default(), PlaybackMode::LoopN(3), &cancel).await.unwrap();
        let presses = provider.log.iter().filter(|l| l.starts_with("key(30,true)")).count();
        assert_eq!(presses, 3);
    }
}
