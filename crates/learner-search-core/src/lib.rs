//! Subsidy-aware catalog search orchestration for enterprise learner portals.
//!
//! This crate is the decision core behind an enterprise catalog search page:
//! it derives a single search-engine filter predicate from whichever
//! entitlement sources happen to be present (subscription license, plan,
//! learner credit offers), routes the content-type facet to the dual browse
//! view or a single paginated view, classifies every engine status tuple
//! into one observable state (stalled, populated, empty, error), and applies
//! one process-wide staleness/retry/notification policy to every data fetch.
//!
//! The search engine, hit cards, router, and toast channel are external
//! collaborators behind small seams ([`SearchIndex`], [`NotificationSink`],
//! [`RouteAction`]); everything here is deterministic and synchronous, with
//! suspension modeled as explicit stalled state plus per-slot generation
//! counters rather than an ambient cancellation token.
//!
//! # Quick start
//!
//! ```
//! use learner_search_core::{
//!     EnterpriseContext, EntitlementState, Offer, QueryCache, SearchSurface,
//! };
//!
//! let enterprise = EnterpriseContext::new("ent-1", "acme", "Acme Corp");
//! let entitlements = EntitlementState::none().with_offer(Offer::new("cat-1"));
//!
//! // No facet selection: the dual browse view (programs, then courses).
//! let surface = SearchSurface::new(enterprise, &entitlements, &[]).unwrap();
//! assert_eq!(surface.filter().as_str(), "catalog:cat-1");
//! assert_eq!(surface.section_count(), 2);
//! ```

pub mod cache;
pub mod config;
pub mod content_type;
pub mod entitlement;
pub mod error;
pub mod filter;
pub mod observe;
pub mod route;
pub mod search;
pub mod slot;
pub mod state;
pub mod view;

pub use cache::{LogSink, NotificationSink, QueryCache};
pub use config::{CachePolicyConfig, RetryConfig, apply_jitter};
pub use content_type::{ContentType, selection_from_refinements};
pub use entitlement::{
    EnterpriseContext, EntitlementState, LicenseStatus, Offer, SubscriptionLicense,
    SubscriptionPlan,
};
pub use error::{FetchError, SearchError, SearchResult};
pub use filter::{FilterPredicate, build_filter, build_filter_with_fallback};
pub use route::{RouteAction, normalize_path};
pub use search::{Hit, SearchIndex, SearchRequest, SearchResponse, SearchSurface, SectionQuery};
pub use slot::{Delivery, QuerySlot, RequestTicket, SlotState};
pub use state::{RenderDecision, SearchState, SearchStatus, render_decision};
pub use view::{
    DUAL_VIEW_DISPLAY_COUNT, HitRenderer, SINGLE_VIEW_PAGE_SIZE, Section, ViewPlan, select_view,
    select_view_from_refinements,
};
