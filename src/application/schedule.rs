use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Weekday};
use chrono_tz::Tz;
use std::time::Duration;

/// When the supervisor should start a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Once a day at a reference-timezone wall time, optionally weekdays only.
    Daily { at: NaiveTime, weekdays_only: bool },
    /// Fixed interval since the previous trigger.
    Every(Duration),
}

impl Trigger {
    /// 09:30 on weekdays: US market open.
    pub fn market_open() -> Self {
        Trigger::Daily {
            at: NaiveTime::from_hms_opt(9, 30, 0).unwrap_or_default(),
            weekdays_only: true,
        }
    }
}

/// Tracks which triggers have fired. Evaluated on every supervisor tick, so
/// a daily trigger fires on the first tick at or after its wall time. A daily
/// time already past at the first poll waits for the next day.
#[derive(Debug, Clone)]
pub struct Schedule {
    trigger: Trigger,
    last_day: Option<NaiveDate>,
    last_fired: Option<DateTime<Tz>>,
    pending_immediate: bool,
    primed: bool,
}

impl Schedule {
    pub fn new(trigger: Trigger, run_on_start: bool) -> Self {
        Self {
            trigger,
            last_day: None,
            last_fired: None,
            pending_immediate: run_on_start,
            primed: false,
        }
    }

    pub fn trigger(&self) -> Trigger {
        self.trigger
    }

    /// True if a run should start now. Marks the trigger as fired.
    pub fn poll(&mut self, now: DateTime<Tz>) -> bool {
        if !std::mem::replace(&mut self.primed, true) {
            if let Trigger::Daily { at, .. } = self.trigger {
                if now.time() > at {
                    self.last_day = Some(now.date_naive());
                }
            }
        }

        if std::mem::take(&mut self.pending_immediate) {
            // The startup run does not count as the day's scheduled run.
            self.last_fired = Some(now);
            return true;
        }

        let due = match self.trigger {
            Trigger::Daily { at, weekdays_only } => {
                let today = now.date_naive();
                let weekday_ok = !weekdays_only || !matches!(now.weekday(), Weekday::Sat | Weekday::Sun);
                weekday_ok && now.time() >= at && self.last_day != Some(today)
            }
            Trigger::Every(period) => match self.last_fired {
                None => true,
                Some(last) => (now - last)
                    .to_std()
                    .map(|elapsed| elapsed >= period)
                    .unwrap_or(false),
            },
        };

        if due {
            self.mark(now);
        }
        due
    }

    fn mark(&mut self, now: DateTime<Tz>) {
        self.last_day = Some(now.date_naive());
        self.last_fired = Some(now);
    }
}

/// Emits a liveness log line at most once per `period`.
#[derive(Debug, Clone)]
pub struct Heartbeat {
    period: Duration,
    last: Option<tokio::time::Instant>,
}

impl Heartbeat {
    pub fn new(period: Duration) -> Self {
        Self { period, last: None }
    }

    pub fn due(&mut self, now: tokio::time::Instant) -> bool {
        match self.last {
            Some(last) if now.duration_since(last) < self.period => false,
            Some(_) => {
                self.last = Some(now);
                true
            }
            None => {
                // Start the clock; the first beat comes one period after startup.
                self.last = Some(now);
                false
            }
        }
    }
}
