//! Minute-of-day arithmetic and `HH:MM` parsing.

use anyhow::{bail, Result};

/// Minutes since midnight.
pub type Minute = u32;

pub const MINUTES_PER_DAY: Minute = 24 * 60;

/// Parse `H:MM` / `HH:MM` into minutes since midnight.
///
/// Returns `None` for anything outside `00:00..=23:59` or not matching the
/// pattern. Surrounding whitespace is not accepted.
pub fn parse_time(text: &str) -> Option<Minute> {
    let (hh, mm) = text.split_once(':')?;
    if hh.is_empty() || hh.len() > 2 || mm.len() != 2 {
        return None;
    }
    if !hh.bytes().all(|b| b.is_ascii_digit()) || !mm.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hh: Minute = hh.parse().ok()?;
    let mm: Minute = mm.parse().ok()?;
    if hh > 23 || mm > 59 {
        return None;
    }
    Some(hh * 60 + mm)
}

/// Format minutes since midnight as zero-padded `HH:MM`.
///
/// Values past 23:59 wrap around the day.
pub fn format_time(minute: Minute) -> String {
    let m = minute % MINUTES_PER_DAY;
    format!("{:02}:{:02}", m / 60, m % 60)
}

/// Fixed time-of-day range spanned by the timeline axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionWindow {
    start: Minute,
    end: Minute,
}

impl SessionWindow {
    pub fn new(start: Minute, end: Minute) -> Result<Self> {
        if end <= start {
            bail!(
                "session window end {} must be after start {}",
                format_time(end),
                format_time(start)
            );
        }
        Ok(Self { start, end })
    }

    pub fn parse(start: &str, end: &str) -> Result<Self> {
        let Some(s) = parse_time(start) else {
            bail!("invalid session start {:?} (expected HH:MM)", start);
        };
        let Some(e) = parse_time(end) else {
            bail!("invalid session end {:?} (expected HH:MM)", end);
        };
        Self::new(s, e)
    }

    pub fn start(&self) -> Minute {
        self.start
    }

    pub fn end(&self) -> Minute {
        self.end
    }

    pub fn span(&self) -> Minute {
        self.end - self.start
    }

    /// Inclusive on both ends, matching the now-marker placement.
    pub fn contains(&self, minute: Minute) -> bool {
        minute >= self.start && minute <= self.end
    }

    /// Fractional offset of `minute` along the window; may fall outside `0.0..=1.0`.
    pub fn fraction(&self, minute: Minute) -> f64 {
        (minute as f64 - self.start as f64) / self.span() as f64
    }

    pub fn label(&self) -> String {
        format!("{}–{}", format_time(self.start), format_time(self.end))
    }
}

impl Default for SessionWindow {
    fn default() -> Self {
        Self {
            start: 10 * 60 + 30,
            end: 12 * 60 + 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_times() {
        assert_eq!(parse_time("00:00"), Some(0));
        assert_eq!(parse_time("9:05"), Some(545));
        assert_eq!(parse_time("23:59"), Some(1439));
    }

    #[test]
    fn rejects_malformed_times() {
        for bad in ["", "24:00", "12:60", "1:5", "123:00", " 10:00", "10:00 ", "ab:cd", "10-00", "-1:00"] {
            assert_eq!(parse_time(bad), None, "{:?} should not parse", bad);
        }
    }

    #[test]
    fn round_trips_every_minute_of_the_day() {
        for m in 0..MINUTES_PER_DAY {
            let s = format_time(m);
            assert_eq!(parse_time(&s), Some(m));
            assert_eq!(format_time(parse_time(&s).unwrap()), s);
        }
    }

    #[test]
    fn format_wraps_past_midnight() {
        assert_eq!(format_time(MINUTES_PER_DAY + 61), "01:01");
    }

    #[test]
    fn session_window_rejects_inverted_range() {
        assert!(SessionWindow::parse("12:00", "11:00").is_err());
        assert!(SessionWindow::parse("12:00", "12:00").is_err());
        assert!(SessionWindow::parse("nope", "12:00").is_err());
        let w = SessionWindow::parse("10:30", "12:30").unwrap();
        assert_eq!(w.span(), 120);
        assert!(w.contains(630) && w.contains(750) && !w.contains(751));
        assert!((w.fraction(690) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn session_bounds_are_read_through_accessors() {
        let w = SessionWindow::new(630, 750).unwrap();
        assert_eq!((w.start(), w.end()), (630, 750));
        assert_eq!(SessionWindow::default(), w);
        assert!(SessionWindow::new(750, 630).is_err());
    }
}
