//! "Now" resolution: the wall clock, or a manually fixed minute.

use chrono::{Local, Timelike};

use crate::time::{format_time, Minute};

/// Local wall-clock time as minutes since midnight.
pub fn wall_clock_minute() -> Minute {
    let now = Local::now();
    now.hour() * 60 + now.minute()
}

/// What a ticker firing should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickAction {
    /// Real time moved on; re-run the whole pipeline.
    Rerender,
    /// Time is fixed; only the clock readout needs refreshing.
    RefreshClock,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Clock {
    manual: Option<Minute>,
}

impl Clock {
    pub fn fixed(minute: Minute) -> Self {
        Self {
            manual: Some(minute),
        }
    }

    pub fn set_manual(&mut self, minute: Minute) {
        self.manual = Some(minute);
    }

    pub fn clear_manual(&mut self) {
        self.manual = None;
    }

    pub fn is_fixed(&self) -> bool {
        self.manual.is_some()
    }

    pub fn now(&self) -> Minute {
        self.resolve(wall_clock_minute())
    }

    /// Resolve "now" against a supplied wall-clock reading.
    pub fn resolve(&self, wall: Minute) -> Minute {
        self.manual.unwrap_or(wall)
    }

    pub fn tick_action(&self) -> TickAction {
        if self.is_fixed() {
            TickAction::RefreshClock
        } else {
            TickAction::Rerender
        }
    }

    pub fn badge(&self) -> &'static str {
        if self.is_fixed() {
            "FIXED"
        } else {
            "NOW"
        }
    }

    pub fn mode_label(&self) -> &'static str {
        if self.is_fixed() {
            "fixed"
        } else {
            "real-time"
        }
    }

    /// One-line readout, e.g. `11:05 [FIXED] fixed`.
    pub fn readout(&self, now: Minute) -> String {
        format!("{} [{}] {}", format_time(now), self.badge(), self.mode_label())
    }
}
