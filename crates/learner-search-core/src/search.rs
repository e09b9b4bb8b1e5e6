//! Search surface orchestration.
//!
//! A [`SearchSurface`] is built once per page visit from the enterprise
//! context, the resolved entitlement state, and the facet widget's current
//! refinements. It derives the filter predicate, plans the view, and owns one
//! query slot per result section. The engine itself stays behind the
//! [`SearchIndex`] seam; slot generations keep late responses from
//! superseded requests out of the observable state.

use serde::{Deserialize, Serialize};

use crate::cache::QueryCache;
use crate::content_type::selection_from_refinements;
use crate::entitlement::{EnterpriseContext, EntitlementState};
use crate::error::{FetchError, SearchResult};
use crate::filter::{FilterPredicate, build_filter_with_fallback};
use crate::observe;
use crate::slot::{Delivery, QuerySlot, RequestTicket, SlotState};
use crate::state::{RenderDecision, SearchState, SearchStatus, render_decision};
use crate::view::{Section, ViewPlan, select_view};

/// One search request, consumed verbatim by the engine adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Filter predicate restricting visible results.
    pub filter: FilterPredicate,
    /// Hits requested per page.
    pub page_size: usize,
    /// Whether the engine should record click analytics for this query.
    /// Set only on the single-content-type paginated query.
    pub click_analytics: bool,
}

impl SearchRequest {
    /// Stable cache key for this request.
    ///
    /// Filter construction is deterministic, so equal requests produce
    /// byte-identical keys.
    #[must_use]
    pub fn cache_key(&self) -> String {
        format!("search:{}:{}", self.filter, self.page_size)
    }
}

/// One hit as returned by the engine. Card rendering is an external concern;
/// only the identity fields travel through this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hit {
    /// Engine-assigned object identifier.
    pub id: String,
    /// Display title.
    pub title: String,
}

/// A resolved search response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// The current page of hits.
    pub hits: Vec<Hit>,
    /// Total hits across all pages.
    pub nb_hits: usize,
}

/// The black-box search engine seam.
///
/// Implementations wrap the real search client; tests substitute fakes.
pub trait SearchIndex {
    /// Execute a request.
    ///
    /// # Errors
    ///
    /// A [`FetchError`] classified for the retry policy.
    fn execute(&self, request: &SearchRequest) -> Result<SearchResponse, FetchError>;
}

/// A section paired with its request and query slot.
#[derive(Debug)]
pub struct SectionQuery {
    section: Section,
    request: SearchRequest,
    slot: QuerySlot<SearchResponse>,
}

impl SectionQuery {
    fn new(section: Section, base_filter: &FilterPredicate) -> Self {
        let filter = match section.filter_content_type {
            Some(content_type) => base_filter.with_content_type(content_type),
            None => base_filter.clone(),
        };
        let request = SearchRequest {
            filter,
            page_size: section.page_size,
            click_analytics: section.filter_content_type.is_some(),
        };
        Self {
            section,
            request,
            slot: QuerySlot::new(),
        }
    }

    /// The section's static view metadata.
    #[must_use]
    pub const fn section(&self) -> &Section {
        &self.section
    }

    /// The request this section issues.
    #[must_use]
    pub const fn request(&self) -> &SearchRequest {
        &self.request
    }

    /// Status tuple derived from the slot. A slot with no resolved request
    /// (fresh or in flight) reads as stalled: the only valid initial state.
    #[must_use]
    pub fn status(&self) -> SearchStatus {
        match self.slot.state() {
            SlotState::Idle | SlotState::Pending => SearchStatus::stalled(),
            SlotState::Ready(response) => SearchStatus::resolved(response.nb_hits),
            SlotState::Failed(error) => SearchStatus::failed(error.clone()),
        }
    }

    /// Classified state for this section.
    #[must_use]
    pub fn state(&self) -> SearchState {
        SearchState::classify(&self.status())
    }

    /// What this section should render right now.
    #[must_use]
    pub fn render(&self) -> RenderDecision {
        render_decision(&self.status(), &self.section)
    }

    /// The resolved response, if the newest request succeeded.
    #[must_use]
    pub fn response(&self) -> Option<&SearchResponse> {
        match self.slot.state() {
            SlotState::Ready(response) => Some(response),
            _ => None,
        }
    }
}

/// Per-visit search orchestrator.
#[derive(Debug)]
pub struct SearchSurface {
    enterprise: EnterpriseContext,
    filter: FilterPredicate,
    sections: Vec<SectionQuery>,
}

impl SearchSurface {
    /// Assemble the surface for one page visit.
    ///
    /// The filter derives once from the entitlement state; malformed
    /// entitlement data falls back to the enterprise-wide filter (logged)
    /// rather than blanking the page.
    ///
    /// # Errors
    ///
    /// `SearchError::UnsupportedContentType` when the facet widget reports a
    /// refinement this core does not recognize. That is an integration
    /// defect: rendering of this subtree halts instead of guessing a view.
    pub fn new(
        enterprise: EnterpriseContext,
        entitlements: &EntitlementState,
        refinements: &[String],
    ) -> SearchResult<Self> {
        let selection = selection_from_refinements(refinements)?;
        let filter = build_filter_with_fallback(&enterprise, entitlements);
        let plan = select_view(selection);
        tracing::debug!(
            target: observe::TARGET_PREFIX,
            enterprise = %enterprise.uuid,
            filter = %filter,
            content_type = selection.map(|ct| ct.index_token()),
            "search surface assembled"
        );

        let sections = match plan {
            ViewPlan::Dual { programs, courses } => vec![
                SectionQuery::new(programs, &filter),
                SectionQuery::new(courses, &filter),
            ],
            ViewPlan::Single(section) => vec![SectionQuery::new(section, &filter)],
        };

        Ok(Self {
            enterprise,
            filter,
            sections,
        })
    }

    /// Browser page title for this surface.
    #[must_use]
    pub fn page_title(&self) -> String {
        format!("Search Courses and Programs - {}", self.enterprise.name)
    }

    /// The shared filter base (before any content-type term).
    #[must_use]
    pub const fn filter(&self) -> &FilterPredicate {
        &self.filter
    }

    /// Sections in render order.
    pub fn sections(&self) -> impl Iterator<Item = &SectionQuery> {
        self.sections.iter()
    }

    /// Number of result sections (two in the dual view, one otherwise).
    #[must_use]
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Access one section.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range; valid indices are
    /// `0..section_count()`.
    #[must_use]
    pub fn section(&self, index: usize) -> &SectionQuery {
        &self.sections[index]
    }

    /// Begin a new request for one section, superseding any outstanding one.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn begin_section(&mut self, index: usize) -> RequestTicket {
        self.sections[index].slot.begin()
    }

    /// Deliver a result for a previously issued ticket.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn complete_section(
        &mut self,
        index: usize,
        ticket: RequestTicket,
        result: Result<SearchResponse, FetchError>,
    ) -> Delivery {
        let delivery = self.sections[index].slot.complete(ticket, result);
        if delivery == Delivery::Superseded {
            tracing::debug!(
                target: observe::TARGET_PREFIX,
                generation = ticket.generation(),
                "discarded response for superseded request"
            );
        }
        delivery
    }

    /// Drive every section once through the cache and engine.
    ///
    /// Each section's fetch reads through the shared cache, so the staleness
    /// window and retry policy apply; terminal failures land in the
    /// section's error state (and the cache has already notified the sink).
    pub fn refresh(&mut self, index: &dyn SearchIndex, cache: &QueryCache) {
        for entry in &mut self.sections {
            let ticket = entry.slot.begin();
            let request = entry.request.clone();
            let result = cache.get_or_fetch(&request.cache_key(), || index.execute(&request));
            let _ = entry.slot.complete(ticket, result);
        }
    }
}
