//! Human-facing presentation state of a poster at a given minute.

use std::fmt;

use crate::poster::Poster;
use crate::time::Minute;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PosterStatus {
    /// Presenting now; minutes until the active slot ends.
    Active { remaining: Minute },
    /// Next slot starts in this many minutes.
    Upcoming { starts_in: Minute },
    /// No slots entered yet.
    NotEntered,
    /// Every slot is in the past.
    Ended,
}

impl PosterStatus {
    /// Style tag used by the renderer.
    pub fn class(&self) -> &'static str {
        match self {
            PosterStatus::Active { .. } => "active",
            PosterStatus::Upcoming { .. } => "soon",
            PosterStatus::NotEntered | PosterStatus::Ended => "",
        }
    }
}

impl fmt::Display for PosterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PosterStatus::Active { remaining } => write!(f, "presenting, {} min left", remaining),
            PosterStatus::Upcoming { starts_in } => write!(f, "starts in {} min", starts_in),
            PosterStatus::NotEntered => f.write_str("time not entered"),
            PosterStatus::Ended => f.write_str("all presentations ended"),
        }
    }
}

pub fn derive_status(poster: &Poster, now: Minute) -> PosterStatus {
    if let Some(active) = poster.active_slot(now) {
        return PosterStatus::Active {
            remaining: active.end().saturating_sub(now),
        };
    }
    if let Some(next) = poster.next_slot(now) {
        return PosterStatus::Upcoming {
            starts_in: next.start().saturating_sub(now),
        };
    }
    if poster.slots.is_empty() {
        PosterStatus::NotEntered
    } else {
        PosterStatus::Ended
    }
}
