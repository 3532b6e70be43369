//! Filter state and the filter/sort pipeline.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::poster::Poster;
use crate::time::Minute;

/// Sort key for posters with no slots at all.
pub const NO_SLOT_SENTINEL: Minute = 99_999;

/// Viewer-controlled filters. Lives for the session, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub only_active_now: bool,
    pub timeline_visible: bool,
    /// Empty means every category.
    pub selected_categories: BTreeSet<String>,
    pub query: String,
    pub from_minute: Option<Minute>,
    pub to_minute: Option<Minute>,
}

impl FilterState {
    /// Flip one category; returns whether it is now selected.
    pub fn toggle_category(&mut self, category: &str) -> bool {
        if self.selected_categories.remove(category) {
            false
        } else {
            self.selected_categories.insert(category.to_string());
            true
        }
    }

    pub fn is_selected(&self, category: &str) -> bool {
        self.selected_categories.is_empty() || self.selected_categories.contains(category)
    }

    /// Reconcile the selection with the categories present in the data.
    ///
    /// An empty selection becomes "all". Vanished categories are dropped, and
    /// if nothing is left the selection falls back to "all" again.
    pub fn sync_categories(&mut self, categories: &[String]) {
        if !self.selected_categories.is_empty() {
            self.selected_categories
                .retain(|c| categories.iter().any(|known| known == c));
        }
        if self.selected_categories.is_empty() {
            self.selected_categories = categories.iter().cloned().collect();
        }
    }

    /// Clear query, range and active-only, and re-select every category.
    /// Timeline visibility is a view preference and survives a reset.
    pub fn reset(&mut self, categories: &[String]) {
        self.query.clear();
        self.from_minute = None;
        self.to_minute = None;
        self.only_active_now = false;
        self.selected_categories.clear();
        self.sync_categories(categories);
    }
}

/// Case-folded comparison with a raw tiebreak, standing in for a
/// locale-aware collation.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Distinct, non-empty, trimmed categories in display order.
pub fn extract_categories(posters: &[Poster]) -> Vec<String> {
    let mut cats: Vec<String> = posters
        .iter()
        .map(|p| p.category.trim())
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    cats.sort_by(|a, b| locale_cmp(a, b));
    cats
}

/// Result of one pipeline pass.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    pub items: Vec<&'a Poster>,
    pub total: usize,
}

impl FilteredView<'_> {
    pub fn kept(&self) -> usize {
        self.items.len()
    }

    pub fn count_label(&self) -> String {
        format!("{} / {}", self.kept(), self.total)
    }
}

fn matches_query(poster: &Poster, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let hay = format!("{} {} {}", poster.title, poster.presenter, poster.board).to_lowercase();
    hay.contains(query)
}

/// Secondary sort key: next upcoming start, else first start, else sentinel.
pub fn upcoming_key(poster: &Poster, now: Minute) -> Minute {
    poster
        .next_slot(now)
        .or_else(|| poster.slots.first())
        .map(|s| s.start())
        .unwrap_or(NO_SLOT_SENTINEL)
}

/// Active first, then soonest upcoming, then board label.
pub fn compare_posters(a: &Poster, b: &Poster, now: Minute) -> Ordering {
    let rank = |p: &Poster| if p.is_active(now) { 0u8 } else { 1u8 };
    rank(a)
        .cmp(&rank(b))
        .then_with(|| upcoming_key(a, now).cmp(&upcoming_key(b, now)))
        .then_with(|| locale_cmp(&a.board, &b.board))
}

/// Filter and order posters. Never mutates the input; remaining ties keep
/// input order.
pub fn filter_posters<'a>(posters: &'a [Poster], state: &FilterState, now: Minute) -> FilteredView<'a> {
    let query = state.query.trim().to_lowercase();

    let mut items: Vec<&Poster> = posters
        .iter()
        .filter(|p| {
            state.selected_categories.is_empty()
                || state.selected_categories.contains(p.category.trim())
        })
        .filter(|p| matches_query(p, &query))
        .filter(|p| p.intersects_range(state.from_minute, state.to_minute))
        .filter(|p| !state.only_active_now || p.is_active(now))
        .collect();

    items.sort_by(|a, b| compare_posters(a, b, now));

    FilteredView {
        items,
        total: posters.len(),
    }
}
