//! Scheduler & Shortcut Runner (C11) — small dispatchers that invoke the
//! playback engine (C8) on timer/calendar events or global hotkeys.
//!
//! Specified only at its interface with the core (§4.11): this module
//! doesn't know how to play a macro, only when to ask someone else to.
//! Grounded in the teacher's `main.rs` tick-loop pattern (a `tokio::select!`
//! over a periodic `tokio::time::interval` alongside other event sources),
//! generalized to a registrable trigger table instead of one fixed timer.

use std::time::Duration;

use chrono::{DateTime, Datelike, Local, Timelike};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crossmacro_core::domain::schedule::ScheduledTask;

/// What causes a [`ScheduledTask`] to fire.
#[derive(Debug, Clone)]
pub enum ScheduleTrigger {
    /// Fires every `Duration`, starting one interval after registration.
    Timer(Duration),
    /// A five-field cron-like expression (`minute hour day-of-month month
    /// day-of-week`), each field either `*` or a comma-separated list of
    /// exact values. Evaluated against local time once per tick.
    Calendar(String),
}

impl ScheduleTrigger {
    fn matches_calendar(expr: &str, now: DateTime<Local>) -> bool {
        let fields: Vec<&str> = expr.split_whitespace().collect();
        if fields.len() != 5 {
            return false;
        }
        let matches_field = |field: &str, value: u32| field == "*" || field.split(',').any(|v| v.trim().parse::<u32>().ok() == Some(value));
        matches_field(fields[0], now.minute())
            && matches_field(fields[1], now.hour())
            && matches_field(fields[2], now.day())
            && matches_field(fields[3], now.month())
            && matches_field(fields[4], now.weekday().num_days_from_sunday())
    }
}

/// A registered hotkey that should trigger a [`ScheduledTask`]-equivalent
/// shortcut. Actual key-combo detection lives in the capture pipeline; this
/// is the registration surface the scheduler exposes to it.
pub struct HotkeyTrigger {
    pub hotkey: String,
}

struct TimerEntry {
    task: ScheduledTask,
    interval: Duration,
    next_fire: std::time::Instant,
}

struct CalendarEntry {
    task: ScheduledTask,
    expression: String,
    last_fired_minute: Option<DateTime<Local>>,
}

/// Dispatches due [`ScheduledTask`]s onto an mpsc channel for whatever owns
/// the playback engine to consume. Doesn't hold a `PlaybackEngine` itself —
/// that would mean this module depending on infrastructure; it only knows
/// *when*, never *how*.
pub struct Scheduler {
    timers: Vec<TimerEntry>,
    calendars: Vec<CalendarEntry>,
    tick: Duration,
}

impl Scheduler {
    pub fn new(tick: Duration) -> Self {
        Self { timers: Vec::new(), calendars: Vec::new(), tick }
    }

    pub fn register(&mut self, task: ScheduledTask, trigger: ScheduleTrigger) {
        match trigger {
            ScheduleTrigger::Timer(interval) => {
                self.timers.push(TimerEntry { task, interval, next_fire: std::time::Instant::now() + interval });
            }
            ScheduleTrigger::Calendar(expression) => {
                self.calendars.push(CalendarEntry { task, expression, last_fired_minute: None });
            }
        }
    }

    /// Runs until `cancel` fires, sending each due task on `fire_tx`.
    pub async fn run(mut self, fire_tx: mpsc::UnboundedSender<ScheduledTask>, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(self.tick);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => return,
                _ = interval.tick() => {
                    let now = std::time::Instant::now();
                    for entry in &mut self.timers {
                        if now >= entry.next_fire {
                            entry.next_fire = now + entry.interval;
                            if fire_tx.send(entry.task.clone()).is_err() {
                                return;
                            }
                        }
                    }

                    let local_now = Local::now();
                    for entry in &mut self.calendars {
                        let already_fired_this_minute = entry.last_fired_minute.is_some_and(|t| t.minute() == local_now.minute() && t.hour() == local_now.hour() && t.day() == local_now.day());
                        if already_fired_this_minute {
                            continue;
                        }
                        if ScheduleTrigger::matches_calendar(&entry.expression, local_now) {
                            entry.last_fired_minute = Some(local_now);
                            if fire_tx.send(entry.task.clone()).is_err() {
                                return;
                            }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn task() -> ScheduledTask {
        ScheduledTask::new(PathBuf::from("/tmp/test.macro"), "* * * * *")
    }

    #[test]
    fn calendar_wildcard_matches_any_time() {
        assert!(ScheduleTrigger::matches_calendar("* * * * *", Local::now()));
    }

    #[test]
    fn calendar_exact_field_rejects_non_matching_minute() {
        let now = Local::now();
        let wrong_minute = (now.minute() + 1) % 60;
        let expr = format!("{wrong_minute} * * * *");
        assert!(!ScheduleTrigger::matches_calendar(&expr, now));
    }

    #[tokio::test]
    async fn timer_fires_after_interval_elapses() {
        let mut scheduler = Scheduler::new(Duration::from_millis(5));
        scheduler.register(task(), ScheduleTrigger::Timer(Duration::from_millis(10)));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let cancel_clone = cancel.clone();
        let handle = tokio::spawn(scheduler.run(tx, cancel_clone));
        let fired = tokio::time::timeout(Duration::from_millis(200), rx.recv()).await;
        cancel.cancel();
        let _ = handle.await;
        assert!(fired.is_ok() && fired.unwrap().is_some());
    }
}
