//! Search result-state classification.
//!
//! Every status tuple reported by the engine collapses deterministically to
//! exactly one observable state, checked in precedence order:
//!
//! ```text
//!   stalled? ──yes──> Stalled
//!      │no
//!   error? ───yes──> Error      (takes precedence over any partial count)
//!      │no
//!   count == 0 ────> Empty      (renders nothing, not an error placeholder)
//!   count  > 0 ────> Populated
//! ```
//!
//! `Stalled` is re-entered on every new in-flight request, not only the first
//! load, so skeleton placeholders render consistently across refinement
//! changes. Classification performs no mutation of shared state; the only
//! observable effect is which renderer the caller selects.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::FetchError;
use crate::view::{DUAL_VIEW_DISPLAY_COUNT, HitRenderer, Section};

/// Raw status tuple for one query slot, as reported by the engine adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStatus {
    /// A request is in flight. While set, `hit_count` and `error` are not
    /// yet meaningful and must be ignored.
    pub is_stalled: bool,
    /// Total hits for the query (not just the current page).
    pub hit_count: usize,
    /// Terminal fetch failure, if the request failed.
    pub error: Option<FetchError>,
}

impl SearchStatus {
    /// Status for an in-flight request.
    #[must_use]
    pub const fn stalled() -> Self {
        Self {
            is_stalled: true,
            hit_count: 0,
            error: None,
        }
    }

    /// Status for a resolved request with the given total hit count.
    #[must_use]
    pub const fn resolved(hit_count: usize) -> Self {
        Self {
            is_stalled: false,
            hit_count,
            error: None,
        }
    }

    /// Status for a failed request. A failed request is by definition no
    /// longer stalled.
    #[must_use]
    pub const fn failed(error: FetchError) -> Self {
        Self {
            is_stalled: false,
            hit_count: 0,
            error: Some(error),
        }
    }
}

/// The finite set of observable search states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchState {
    /// A request is in flight; the only valid initial state for a fresh query.
    Stalled,
    /// The query resolved with at least one hit.
    Populated,
    /// The query resolved with zero hits.
    Empty,
    /// The query failed terminally.
    Error,
}

impl SearchState {
    /// Collapse a status tuple to its state. Total and deterministic.
    #[must_use]
    pub fn classify(status: &SearchStatus) -> Self {
        if status.is_stalled {
            return Self::Stalled;
        }
        if status.error.is_some() {
            return Self::Error;
        }
        if status.hit_count == 0 {
            Self::Empty
        } else {
            Self::Populated
        }
    }
}

impl fmt::Display for SearchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stalled => f.write_str("stalled"),
            Self::Populated => f.write_str("populated"),
            Self::Empty => f.write_str("empty"),
            Self::Error => f.write_str("error"),
        }
    }
}

/// What a section should render for a given status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderDecision {
    /// Title and card placeholders while the request is in flight.
    Skeleton {
        /// Number of placeholder cards.
        placeholder_cards: usize,
    },
    /// The section's hit list.
    Hits {
        /// Hit component to render with.
        renderer: HitRenderer,
        /// Hits actually shown (capped at the section's page size).
        display_count: usize,
    },
    /// Nothing at all. Zero hits is an answer, not a failure.
    Nothing,
    /// The error notice.
    ErrorNotice,
}

/// Select the render decision for a section's current status.
#[must_use]
pub fn render_decision(status: &SearchStatus, section: &Section) -> RenderDecision {
    match SearchState::classify(status) {
        SearchState::Stalled => RenderDecision::Skeleton {
            placeholder_cards: section.page_size.min(DUAL_VIEW_DISPLAY_COUNT),
        },
        SearchState::Error => RenderDecision::ErrorNotice,
        SearchState::Empty => RenderDecision::Nothing,
        SearchState::Populated => RenderDecision::Hits {
            renderer: section.renderer,
            display_count: status.hit_count.min(section.page_size),
        },
    }
}
