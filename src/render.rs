//! Text projection of the dashboard.
//!
//! Every function here is pure: it takes already-filtered data and returns
//! strings. The caller decides where they go.

use crate::clock::Clock;
use crate::filter::{FilterState, FilteredView};
use crate::lanes::compute_lanes;
use crate::palette::{category_color, slot_color, Rgb, ANSI_RESET};
use crate::poster::{Poster, Slot};
use crate::status::{derive_status, PosterStatus};
use crate::time::{format_time, Minute, SessionWindow};

pub const BAR: char = '=';
pub const ACTIVE_BAR: char = '#';
pub const NOW_MARK: char = '|';
pub const EMPTY: char = '.';

#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub timeline_width: usize,
    pub color: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            timeline_width: 48,
            color: false,
        }
    }
}

impl RenderOptions {
    fn paint(&self, rgb: Option<Rgb>, text: &str) -> String {
        match rgb {
            Some(rgb) if self.color => format!("{}{}{}", rgb.fg(), text, ANSI_RESET),
            _ => text.to_string(),
        }
    }

    fn category_dot(&self, category: &str) -> String {
        self.paint(Some(category_color(category).rgb()), "●")
    }
}

/// Everything one frame needs.
pub struct Frame<'a> {
    pub now: Minute,
    pub clock: &'a Clock,
    pub session: SessionWindow,
    pub filter: &'a FilterState,
    pub categories: &'a [String],
    pub view: &'a FilteredView<'a>,
}

pub fn render_frame(frame: &Frame<'_>, opts: &RenderOptions) -> String {
    let mut out = String::new();
    out.push_str(&render_header(frame));
    out.push('\n');
    out.push_str(&render_chips(frame.categories, frame.filter, opts));
    out.push('\n');
    out.push_str(&render_filter_summary(frame.filter));
    out.push_str("\n\n");
    out.push_str(&render_list(
        &frame.view.items,
        frame.now,
        frame.session,
        frame.filter.timeline_visible,
        opts,
    ));
    out
}

pub fn render_header(frame: &Frame<'_>) -> String {
    format!(
        "Posters {}   clock {}   {} shown",
        frame.session.label(),
        frame.clock.readout(frame.now),
        frame.view.count_label()
    )
}

pub fn render_clock_line(clock: &Clock, now: Minute) -> String {
    format!("clock {}", clock.readout(now))
}

pub fn render_chips(categories: &[String], filter: &FilterState, opts: &RenderOptions) -> String {
    let chips: Vec<String> = categories
        .iter()
        .map(|c| {
            let mark = if filter.is_selected(c) { "x" } else { " " };
            format!("[{}] {} {}", mark, opts.category_dot(c), c)
        })
        .collect();
    format!("categories: {}", chips.join("  "))
}

pub fn render_filter_summary(filter: &FilterState) -> String {
    let mut parts = Vec::new();
    let query = filter.query.trim();
    if !query.is_empty() {
        parts.push(format!("search {:?}", query));
    }
    match (filter.from_minute, filter.to_minute) {
        (None, None) => {}
        (from, to) => parts.push(format!(
            "range {}–{}",
            from.map(format_time).unwrap_or_else(|| "…".into()),
            to.map(format_time).unwrap_or_else(|| "…".into())
        )),
    }
    if filter.only_active_now {
        parts.push("active now only".into());
    }
    parts.push(format!(
        "timeline {}",
        if filter.timeline_visible { "on" } else { "off" }
    ));
    format!("filters: {}", parts.join(" · "))
}

pub fn render_time_tags(slots: &[Slot], opts: &RenderOptions) -> String {
    if slots.is_empty() {
        return "time not entered".to_string();
    }
    slots
        .iter()
        .enumerate()
        .map(|(i, s)| opts.paint(Rgb::from_hex(slot_color(i)), &format!("[{}]", s.label())))
        .collect::<Vec<_>>()
        .join(" ")
}

/// One row per lane across the session window, plus a title row.
///
/// Bars are clipped to the window and always at least one column wide. The
/// now-marker fills empty cells of its column when `now` is inside the window.
pub fn render_timeline(
    poster: &Poster,
    now: Minute,
    session: SessionWindow,
    opts: &RenderOptions,
) -> Vec<String> {
    let width = opts.timeline_width.max(1);
    let layout = compute_lanes(&poster.slots);
    let rows = layout.lane_count.max(1);

    // (glyph, slot index)
    let mut grid: Vec<Vec<(char, Option<usize>)>> = vec![vec![(EMPTY, None); width]; rows];

    let column = |m: Minute| session.fraction(m) * width as f64;
    for placed in &layout.placed {
        let from = column(placed.start).floor() as i64;
        let to = (column(placed.end).round() as i64).max(from + 1);
        let (lo, hi) = (from.max(0), to.min(width as i64));
        if lo >= hi {
            continue;
        }
        let glyph = if placed.start <= now && now < placed.end {
            ACTIVE_BAR
        } else {
            BAR
        };
        for cell in &mut grid[placed.lane][lo as usize..hi as usize] {
            *cell = (glyph, Some(placed.index));
        }
    }

    if session.contains(now) {
        let col = (column(now).floor() as usize).min(width - 1);
        for row in grid.iter_mut() {
            if row[col].1.is_none() {
                row[col] = (NOW_MARK, None);
            }
        }
    }

    let mut lines = vec![format!("timeline {}", session.label())];
    for row in grid {
        let mut line = String::from("[");
        for (glyph, idx) in row {
            let g = glyph.to_string();
            match idx {
                Some(i) => line.push_str(&opts.paint(Rgb::from_hex(slot_color(i)), &g)),
                None => line.push_str(&g),
            }
        }
        line.push(']');
        lines.push(line);
    }
    lines
}

pub fn render_status(status: &PosterStatus) -> String {
    match status.class() {
        "" => status.to_string(),
        class => format!("{} ({})", status, class),
    }
}

pub fn render_card(
    poster: &Poster,
    now: Minute,
    session: SessionWindow,
    timeline: bool,
    opts: &RenderOptions,
) -> String {
    let status = derive_status(poster, now);
    let marker = if poster.is_active(now) { ">" } else { " " };
    let mut lines = vec![
        format!(
            "{} {}  {}  {} {}",
            marker,
            poster.board,
            poster.presenter,
            opts.category_dot(&poster.category),
            poster.category
        ),
        format!("    {}", poster.title),
        format!("    -> {}", render_status(&status)),
        format!("    time: {}", render_time_tags(&poster.slots, opts)),
    ];
    if timeline {
        lines.extend(
            render_timeline(poster, now, session, opts)
                .into_iter()
                .map(|l| format!("    {}", l)),
        );
    }
    lines.join("\n")
}

pub fn render_list(
    items: &[&Poster],
    now: Minute,
    session: SessionWindow,
    timeline: bool,
    opts: &RenderOptions,
) -> String {
    if items.is_empty() {
        return "  No presentations match the current filters.\n    Adjust categories or search terms.\n"
            .to_string();
    }
    let mut out = String::new();
    for p in items {
        out.push_str(&render_card(p, now, session, timeline, opts));
        out.push_str("\n\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::filter_posters;
    use crate::poster::{normalize, RawPoster};
    use crate::time::parse_time;

    fn poster(board: &str, slots: &[(&str, &str)]) -> Poster {
        let slots = slots
            .iter()
            .map(|(s, e)| (s.to_string(), e.to_string()))
            .collect();
        normalize(&RawPoster::from_cells("1", "A study", "Ann", "Bio", board, slots))
    }

    fn at(t: &str) -> Minute {
        parse_time(t).unwrap()
    }

    fn opts(width: usize) -> RenderOptions {
        RenderOptions {
            timeline_width: width,
            color: false,
        }
    }

    #[test]
    fn timeline_places_bars_proportionally() {
        // 10:30-12:30 over 12 columns: 10 minutes per column
        let p = poster("A-1", &[("10:30", "11:00"), ("12:00", "12:30")]);
        let lines = render_timeline(&p, at("09:00"), SessionWindow::default(), &opts(12));
        assert_eq!(lines[0], "timeline 10:30–12:30");
        assert_eq!(lines[1], "[===......===]");
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn timeline_stacks_overlaps_and_marks_now() {
        let p = poster("A-1", &[("10:30", "11:00"), ("10:40", "11:10"), ("10:50", "11:20")]);
        let lines = render_timeline(&p, at("11:05"), SessionWindow::default(), &opts(12));
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[1], "[===|........]");
        assert_eq!(lines[2], "[.###........]");
        assert_eq!(lines[3], "[..###.......]");
    }

    #[test]
    fn timeline_clips_out_of_window_slots() {
        let p = poster("A-1", &[("09:00", "09:30"), ("12:25", "13:00")]);
        let lines = render_timeline(&p, at("08:00"), SessionWindow::default(), &opts(12));
        assert_eq!(lines[1], "[...........=]");
    }

    #[test]
    fn short_slot_is_at_least_one_column() {
        let p = poster("A-1", &[("11:31", "11:32")]);
        let lines = render_timeline(&p, at("08:00"), SessionWindow::default(), &opts(12));
        assert_eq!(lines[1].matches(BAR).count(), 1);
    }

    #[test]
    fn card_shows_status_and_tags() {
        let p = poster("B-7", &[("09:00", "10:00")]);
        let card = render_card(&p, at("09:30"), SessionWindow::default(), false, &opts(12));
        assert!(card.starts_with("> B-7  Ann"));
        assert!(card.contains("presenting, 30 min left (active)"));
        assert!(card.contains("[09:00–10:00]"));
        assert!(!card.contains("timeline"));
    }

    #[test]
    fn empty_list_message() {
        let out = render_list(&[], 0, SessionWindow::default(), true, &opts(12));
        assert!(out.contains("No presentations match"));
    }

    #[test]
    fn frame_contains_count_and_chips() {
        let posters = vec![poster("A-1", &[]), poster("A-2", &[])];
        let mut filter = FilterState::default();
        filter.query = "a-2".into();
        let view = filter_posters(&posters, &filter, 600);
        let clock = Clock::fixed(600);
        let cats = vec!["Bio".to_string()];
        let frame = Frame {
            now: 600,
            clock: &clock,
            session: SessionWindow::default(),
            filter: &filter,
            categories: &cats,
            view: &view,
        };
        let out = render_frame(&frame, &opts(12));
        assert!(out.contains("1 / 2 shown"));
        assert!(out.contains("[x] ● Bio"));
        assert!(out.contains("search \"a-2\""));
        assert!(out.contains("10:00 [FIXED] fixed"));
    }
}
