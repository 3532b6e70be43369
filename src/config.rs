use anyhow::Result;

use crate::time::SessionWindow;

#[derive(Debug, Clone)]
pub struct Config {
    /// Preferred data source: file path or http(s) URL.
    pub csv_location: String,
    /// Fallback JSON array source.
    pub json_location: String,
    pub session_start: String,
    pub session_end: String,
    pub tick_secs: u64,
    /// Columns spanned by the timeline axis.
    pub timeline_width: usize,
    pub color: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            csv_location: std::env::var("POSTER_CSV").unwrap_or_else(|_| "data.csv".to_string()),
            json_location: std::env::var("POSTER_JSON").unwrap_or_else(|_| "data.json".to_string()),
            session_start: std::env::var("SESSION_START").unwrap_or_else(|_| "10:30".to_string()),
            session_end: std::env::var("SESSION_END").unwrap_or_else(|_| "12:30".to_string()),
            tick_secs: std::env::var("TICK_SECS").ok().and_then(|v| v.parse().ok()).filter(|&s| s > 0).unwrap_or(30),
            timeline_width: std::env::var("TIMELINE_WIDTH").ok().and_then(|v| v.parse().ok()).filter(|&w| w >= 10).unwrap_or(48),
            color: std::env::var_os("NO_COLOR").is_none()
                && std::env::var("POSTER_COLOR").map(|v| !matches!(v.to_lowercase().as_str(), "0" | "false" | "no")).unwrap_or(true),
        }
    }

    pub fn session_window(&self) -> Result<SessionWindow> {
        SessionWindow::parse(&self.session_start, &self.session_end)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            csv_location: "data.csv".to_string(),
            json_location: "data.json".to_string(),
            session_start: "10:30".to_string(),
            session_end: "12:30".to_string(),
            tick_secs: 30,
            timeline_width: 48,
            color: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_session_window_is_valid() {
        let w = Config::default().session_window().unwrap();
        assert_eq!(w, SessionWindow::default());
    }

    #[test]
    fn bad_session_window_is_an_error() {
        let cfg = Config {
            session_start: "13:00".into(),
            session_end: "12:00".into(),
            ..Config::default()
        };
        assert!(cfg.session_window().is_err());
    }
}
