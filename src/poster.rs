//! Poster records and their canonical, normalized form.
//!
//! Input arrives as loosely-typed [`RawPoster`] values (CSV rows or JSON
//! objects). [`normalize`] turns them into [`Poster`]s whose slots are always
//! valid (`end > start`) and sorted by start time.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::time::{format_time, parse_time, Minute};

// =============================================================================
// Slot
// =============================================================================

/// One scheduled `[start, end)` interval. Cannot be constructed with `end <= start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Slot {
    start: Minute,
    end: Minute,
}

impl Slot {
    pub fn new(start: Minute, end: Minute) -> Option<Self> {
        if end > start {
            Some(Self { start, end })
        } else {
            None
        }
    }

    /// Parse both ends as `HH:MM`; `None` if either fails or the slot is degenerate.
    pub fn parse(start: &str, end: &str) -> Option<Self> {
        Self::new(parse_time(start)?, parse_time(end)?)
    }

    pub fn start(&self) -> Minute {
        self.start
    }

    pub fn end(&self) -> Minute {
        self.end
    }

    /// Half-open containment: `start <= now < end`.
    pub fn is_active(&self, now: Minute) -> bool {
        self.start <= now && now < self.end
    }

    /// Half-open overlap against `[from, to)`; a `None` bound is unbounded.
    pub fn intersects(&self, from: Option<Minute>, to: Option<Minute>) -> bool {
        let below = from.map(|a| self.end <= a).unwrap_or(false);
        let above = to.map(|b| b <= self.start).unwrap_or(false);
        !(below || above)
    }

    pub fn label(&self) -> String {
        format!("{}–{}", format_time(self.start), format_time(self.end))
    }
}

impl Serialize for Slot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut st = serializer.serialize_struct("Slot", 2)?;
        st.serialize_field("start", &format_time(self.start))?;
        st.serialize_field("end", &format_time(self.end))?;
        st.end()
    }
}

// =============================================================================
// Raw input
// =============================================================================

/// A poster as it appears on input, before validation.
///
/// Every field is optional and loosely typed. Unknown fields are kept in
/// `extra` and survive normalization and export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPoster {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presenter: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub board: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slots: Option<Value>,
    /// Legacy single-slot shape.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RawPoster {
    /// Build a raw record from already-split text cells.
    pub fn from_cells(
        id: &str,
        title: &str,
        presenter: &str,
        category: &str,
        board: &str,
        slots: Vec<(String, String)>,
    ) -> Self {
        let slots = slots
            .into_iter()
            .map(|(start, end)| serde_json::json!({ "start": start, "end": end }))
            .collect();
        Self {
            id: Some(Value::String(id.to_string())),
            title: Some(Value::String(title.to_string())),
            presenter: Some(Value::String(presenter.to_string())),
            category: Some(Value::String(category.to_string())),
            board: Some(Value::String(board.to_string())),
            slots: Some(Value::Array(slots)),
            start: None,
            end: None,
            extra: Map::new(),
        }
    }
}

impl From<&Poster> for RawPoster {
    fn from(p: &Poster) -> Self {
        let slots = p
            .slots
            .iter()
            .map(|s| serde_json::json!({ "start": format_time(s.start), "end": format_time(s.end) }))
            .collect();
        Self {
            id: Some(Value::String(p.id.clone())),
            title: Some(Value::String(p.title.clone())),
            presenter: Some(Value::String(p.presenter.clone())),
            category: Some(Value::String(p.category.clone())),
            board: Some(Value::String(p.board.clone())),
            slots: Some(Value::Array(slots)),
            start: None,
            end: None,
            extra: p.extra.clone(),
        }
    }
}

// =============================================================================
// Normalized poster
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Poster {
    pub id: String,
    pub title: String,
    pub presenter: String,
    pub category: String,
    pub board: String,
    pub slots: Vec<Slot>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Poster {
    pub fn is_active(&self, now: Minute) -> bool {
        self.slots.iter().any(|s| s.is_active(now))
    }

    pub fn active_slot(&self, now: Minute) -> Option<&Slot> {
        self.slots.iter().find(|s| s.is_active(now))
    }

    /// Earliest slot starting strictly after `now`.
    pub fn next_slot(&self, now: Minute) -> Option<&Slot> {
        self.slots.iter().find(|s| s.start > now)
    }

    /// A poster without slots only passes an unbounded range.
    pub fn intersects_range(&self, from: Option<Minute>, to: Option<Minute>) -> bool {
        if from.is_none() && to.is_none() {
            return true;
        }
        self.slots.iter().any(|s| s.intersects(from, to))
    }
}

/// Scalar JSON values rendered as display text; `null` becomes empty.
pub fn text_of(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => other.to_string(),
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    match value {
        Some(Value::String(s)) if !s.is_empty() => Some(s.as_str()),
        _ => None,
    }
}

fn slots_of(raw: &RawPoster) -> Vec<(String, String)> {
    let listed: Vec<(String, String)> = match &raw.slots {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                let field = |k: &str| {
                    item.get(k)
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string()
                };
                (field("start"), field("end"))
            })
            .collect(),
        _ => Vec::new(),
    };
    if !listed.is_empty() {
        return listed;
    }
    match (non_empty_str(raw.start.as_ref()), non_empty_str(raw.end.as_ref())) {
        (Some(s), Some(e)) => vec![(s.to_string(), e.to_string())],
        _ => Vec::new(),
    }
}

/// Coerce a raw record into a [`Poster`].
///
/// Legacy `start`/`end` fields become a one-element slot list when no slots
/// are given. Invalid slots are dropped; the rest are sorted by start.
pub fn normalize(raw: &RawPoster) -> Poster {
    let mut slots: Vec<Slot> = slots_of(raw)
        .iter()
        .filter_map(|(s, e)| Slot::parse(s, e))
        .collect();
    slots.sort_by_key(|s| s.start);

    Poster {
        id: text_of(raw.id.as_ref()),
        title: text_of(raw.title.as_ref()),
        presenter: text_of(raw.presenter.as_ref()),
        category: text_of(raw.category.as_ref()),
        board: text_of(raw.board.as_ref()),
        slots,
        extra: raw.extra.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(v: Value) -> RawPoster {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn drops_invalid_and_sorts_slots() {
        let p = normalize(&raw(json!({
            "title": "T",
            "slots": [
                {"start": "11:00", "end": "11:30"},
                {"start": "10:00", "end": "10:00"},
                {"start": "25:00", "end": "26:00"},
                {"start": "10:15", "end": "10:45"},
                {"start": 1015, "end": "10:45"},
                "garbage"
            ]
        })));
        let starts: Vec<_> = p.slots.iter().map(|s| s.start()).collect();
        assert_eq!(starts, vec![615, 660]);
        assert!(p.slots.iter().all(|s| s.end() > s.start()));
    }

    #[test]
    fn converts_legacy_single_slot() {
        let p = normalize(&raw(json!({"title": "L", "start": "9:00", "end": "9:30"})));
        assert_eq!(p.slots, vec![Slot::new(540, 570).unwrap()]);

        let out = serde_json::to_value(&p).unwrap();
        assert!(out.get("start").is_none());
        assert_eq!(out["slots"][0]["start"], "09:00");
    }

    #[test]
    fn legacy_ignored_when_slots_present() {
        let p = normalize(&raw(json!({
            "start": "9:00", "end": "9:30",
            "slots": [{"start": "10:00", "end": "10:30"}]
        })));
        assert_eq!(p.slots.len(), 1);
        assert_eq!(p.slots[0].start(), 600);
    }

    #[test]
    fn normalize_is_idempotent() {
        let first = normalize(&raw(json!({
            "id": 7,
            "title": "Idem",
            "presenter": "P",
            "category": "Bio",
            "board": "B-1",
            "room": "Hall 2",
            "slots": [{"start": "11:00", "end": "11:20"}, {"start": "10:40", "end": "10:50"}]
        })));
        let second = normalize(&RawPoster::from(&first));
        assert_eq!(first, second);
        assert_eq!(first.id, "7");
        assert_eq!(first.extra.get("room"), Some(&json!("Hall 2")));
    }

    #[test]
    fn slot_intersection_is_half_open() {
        let s = Slot::parse("10:00", "10:30").unwrap();
        assert!(s.intersects(Some(540), Some(615)));
        assert!(!s.intersects(Some(630), Some(660)));
        assert!(s.intersects(None, None));
        assert!(!s.intersects(None, Some(600)));
        assert!(s.intersects(Some(629), None));
    }

    #[test]
    fn poster_without_slots_only_matches_unbounded_range() {
        let p = normalize(&RawPoster::default());
        assert!(p.intersects_range(None, None));
        assert!(!p.intersects_range(Some(600), None));
        assert!(!p.intersects_range(None, Some(600)));
    }

    #[test]
    fn next_slot_is_strictly_after_now() {
        let p = normalize(&raw(json!({"slots": [
            {"start": "10:00", "end": "10:30"},
            {"start": "11:00", "end": "11:30"}
        ]})));
        assert_eq!(p.next_slot(600).map(|s| s.start()), Some(660));
        assert_eq!(p.next_slot(599).map(|s| s.start()), Some(600));
        assert!(p.next_slot(700).is_none());
    }
}
