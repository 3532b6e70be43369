//! Application state: the poster list plus every piece of session state,
//! and the operations the viewer can trigger.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use rand::Rng;
use serde_json::{json, Value};

use crate::clock::{Clock, TickAction};
use crate::command::{Command, HELP};
use crate::config::Config;
use crate::filter::{extract_categories, filter_posters, FilterState, FilteredView};
use crate::ingest::raw_posters_from_json;
use crate::logging::{log, log_filter_pass, log_rejected, obj, v_str, Domain, Level, ProfileScope};
use crate::poster::{normalize, Poster, RawPoster, Slot};
use crate::render::{render_clock_line, render_frame, Frame, RenderOptions};
use crate::time::{format_time, parse_time, Minute, SessionWindow};

/// What the command loop should do after a command ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Redraw,
    Print(String),
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Written(PathBuf),
    /// Writing failed; the text is handed back for manual copying.
    Manual { text: String, reason: String },
}

pub struct App {
    posters: Vec<Poster>,
    pub filter: FilterState,
    pub clock: Clock,
    session: SessionWindow,
    opts: RenderOptions,
}

fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Empty text clears a bound; anything else must be `HH:MM`.
fn parse_bound(text: Option<&str>) -> Result<Option<Minute>> {
    match text.map(str::trim).filter(|t| !t.is_empty()) {
        None => Ok(None),
        Some(t) => match parse_time(t) {
            Some(m) => Ok(Some(m)),
            None => bail!("invalid time {:?} (expected HH:MM)", t),
        },
    }
}

impl App {
    pub fn new(posters: Vec<Poster>, session: SessionWindow, opts: RenderOptions) -> Self {
        let mut app = Self {
            posters,
            filter: FilterState::default(),
            clock: Clock::default(),
            session,
            opts,
        };
        app.sync_categories();
        app
    }

    pub fn from_config(cfg: &Config, posters: Vec<Poster>) -> Result<Self> {
        let session = cfg.session_window().context("SESSION_START / SESSION_END")?;
        Ok(Self::new(
            posters,
            session,
            RenderOptions {
                timeline_width: cfg.timeline_width,
                color: cfg.color,
            },
        ))
    }

    pub fn posters(&self) -> &[Poster] {
        &self.posters
    }

    pub fn session(&self) -> SessionWindow {
        self.session
    }

    pub fn categories(&self) -> Vec<String> {
        extract_categories(&self.posters)
    }

    fn sync_categories(&mut self) {
        let cats = self.categories();
        self.filter.sync_categories(&cats);
    }

    pub fn view_at(&self, now: Minute) -> FilteredView<'_> {
        filter_posters(&self.posters, &self.filter, now)
    }

    /// Run the full pipeline and project it into text.
    pub fn render_at(&self, now: Minute) -> String {
        let _scope = ProfileScope::with_context("render", &[("posters", json!(self.posters.len()))]);
        let view = self.view_at(now);
        log_filter_pass(view.kept(), view.total, &format_time(now));
        let categories = self.categories();
        let frame = Frame {
            now,
            clock: &self.clock,
            session: self.session,
            filter: &self.filter,
            categories: &categories,
            view: &view,
        };
        let out = render_frame(&frame, &self.opts);
        log(
            Level::Trace,
            Domain::Render,
            "frame",
            obj(&[("lines", json!(out.lines().count()))]),
        );
        out
    }

    pub fn render(&self) -> String {
        self.render_at(self.clock.now())
    }

    pub fn clock_line(&self) -> String {
        render_clock_line(&self.clock, self.clock.now())
    }

    /// Output for one ticker firing.
    pub fn on_tick(&self) -> String {
        match self.clock.tick_action() {
            TickAction::Rerender => self.render(),
            TickAction::RefreshClock => self.clock_line(),
        }
    }

    // -------------------------------------------------------------------------
    // Filters
    // -------------------------------------------------------------------------

    pub fn set_query(&mut self, query: &str) {
        self.filter.query = query.to_string();
    }

    pub fn clear_query(&mut self) {
        self.filter.query.clear();
    }

    /// Toggle a known category chip; returns the new selection state.
    pub fn toggle_category(&mut self, category: &str) -> Result<bool> {
        let category = category.trim();
        if !self.categories().iter().any(|c| c == category) {
            bail!("unknown category {:?}", category);
        }
        Ok(self.filter.toggle_category(category))
    }

    pub fn set_from(&mut self, text: Option<&str>) -> Result<()> {
        self.filter.from_minute = parse_bound(text)?;
        Ok(())
    }

    pub fn set_to(&mut self, text: Option<&str>) -> Result<()> {
        self.filter.to_minute = parse_bound(text)?;
        Ok(())
    }

    pub fn set_only_active(&mut self, on: bool) {
        self.filter.only_active_now = on;
    }

    pub fn set_timeline(&mut self, on: bool) {
        self.filter.timeline_visible = on;
    }

    pub fn reset(&mut self) {
        let cats = self.categories();
        self.filter.reset(&cats);
        log(Level::Info, Domain::Filter, "reset", obj(&[]));
    }

    // -------------------------------------------------------------------------
    // Clock
    // -------------------------------------------------------------------------

    pub fn set_manual_clock(&mut self, text: &str) -> Result<Minute> {
        let Some(minute) = parse_time(text.trim()) else {
            log_rejected(Domain::Clock, "manual_rejected", text);
            bail!("enter a manual time as HH:MM");
        };
        self.clock.set_manual(minute);
        log(
            Level::Info,
            Domain::Clock,
            "manual_set",
            obj(&[("now", v_str(&format_time(minute)))]),
        );
        Ok(minute)
    }

    pub fn clear_manual_clock(&mut self) {
        self.clock.clear_manual();
        log(Level::Info, Domain::Clock, "manual_cleared", obj(&[]));
    }

    // -------------------------------------------------------------------------
    // Data editing
    // -------------------------------------------------------------------------

    /// Replace the poster set from edited JSON.
    ///
    /// Rejects anything that is not an array, or any element without a
    /// non-empty `title`, `category` and `board`. On error the current data
    /// is untouched.
    pub fn apply_json(&mut self, text: &str) -> Result<usize> {
        let raws = match Self::validate_edit(text) {
            Ok(raws) => raws,
            Err(err) => {
                log_rejected(Domain::Edit, "apply_rejected", &format!("{:#}", err));
                return Err(err.context("could not apply edit"));
            }
        };
        self.posters = raws.iter().map(normalize).collect();
        self.sync_categories();
        log(
            Level::Info,
            Domain::Edit,
            "applied",
            obj(&[("posters", json!(self.posters.len()))]),
        );
        Ok(self.posters.len())
    }

    fn validate_edit(text: &str) -> Result<Vec<RawPoster>> {
        let raws = raw_posters_from_json(text)?;
        for (i, raw) in raws.iter().enumerate() {
            if !(is_truthy(raw.title.as_ref())
                && is_truthy(raw.category.as_ref())
                && is_truthy(raw.board.as_ref()))
            {
                bail!("element {} needs title, category and board", i);
            }
        }
        Ok(raws)
    }

    /// Pretty JSON of the current, normalized poster set.
    pub fn json_text(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.posters).context("serializing posters")
    }

    pub fn export(&self, path: &Path) -> Result<ExportOutcome> {
        let text = self.json_text()?;
        match std::fs::write(path, &text) {
            Ok(()) => {
                log(
                    Level::Info,
                    Domain::Edit,
                    "exported",
                    obj(&[("path", v_str(&path.display().to_string()))]),
                );
                Ok(ExportOutcome::Written(path.to_path_buf()))
            }
            Err(err) => {
                let reason = format!("writing {}: {}", path.display(), err);
                log_rejected(Domain::Edit, "export_failed", &reason);
                Ok(ExportOutcome::Manual { text, reason })
            }
        }
    }

    /// Fill every poster with random slots inside the session window.
    /// Every third poster (by position) gets two slots.
    pub fn demo_fill<R: Rng>(&mut self, rng: &mut R) {
        let (lo, hi) = (self.session.start(), self.session.end());
        let modulus = self.session.span().saturating_sub(20).max(1) as usize;
        let latest_start = hi.saturating_sub(5);

        let mut make_slot = |base: Minute| {
            let start = base + rng.gen_range(0..=55);
            let dur = rng.gen_range(8..=16);
            let s = lo.max(start.min(latest_start));
            let e = hi.min(s + dur);
            Slot::new(s, e)
        };

        for (idx, poster) in self.posters.iter_mut().enumerate() {
            let mut slots = Vec::new();
            slots.extend(make_slot(lo + ((idx * 3) % modulus) as Minute));
            if idx % 3 == 0 {
                slots.extend(make_slot(lo + ((idx * 7) % modulus) as Minute));
            }
            slots.sort_by_key(|s| s.start());
            poster.slots = slots;
        }
        self.sync_categories();
        log(
            Level::Info,
            Domain::Edit,
            "demo_fill",
            obj(&[("posters", json!(self.posters.len()))]),
        );
    }

    // -------------------------------------------------------------------------
    // Command dispatch
    // -------------------------------------------------------------------------

    pub fn handle<R: Rng>(&mut self, command: Command, rng: &mut R) -> Result<Reply> {
        match command {
            Command::Refresh => {}
            Command::Search(q) => self.set_query(&q),
            Command::ClearSearch => self.clear_query(),
            Command::ToggleCategory(c) => {
                self.toggle_category(&c)?;
            }
            Command::From(t) => self.set_from(t.as_deref())?,
            Command::To(t) => self.set_to(t.as_deref())?,
            Command::ActiveOnly(on) => {
                let on = on.unwrap_or(!self.filter.only_active_now);
                self.set_only_active(on);
            }
            Command::Timeline(on) => {
                let on = on.unwrap_or(!self.filter.timeline_visible);
                self.set_timeline(on);
            }
            Command::SetClock(t) => {
                self.set_manual_clock(&t)?;
            }
            Command::ClearClock => self.clear_manual_clock(),
            Command::Apply(path) => {
                let text = std::fs::read_to_string(&path)
                    .with_context(|| format!("reading {}", path.display()))?;
                self.apply_json(&text)?;
            }
            Command::Json => return Ok(Reply::Print(self.json_text()?)),
            Command::Export(path) => {
                return Ok(Reply::Print(match self.export(&path)? {
                    ExportOutcome::Written(p) => format!("exported JSON to {}", p.display()),
                    ExportOutcome::Manual { text, reason } => {
                        format!("export failed ({}); copy the JSON below manually:\n{}", reason, text)
                    }
                }))
            }
            Command::Demo => self.demo_fill(rng),
            Command::Reset => self.reset(),
            Command::Help => return Ok(Reply::Print(HELP.to_string())),
            Command::Quit => return Ok(Reply::Quit),
        }
        Ok(Reply::Redraw)
    }
}
