//! Entitlement-driven filter predicate construction.
//!
//! The search engine accepts an opaque boolean filter string: colon-delimited
//! `key:value` terms joined with ` OR ` / ` AND `. That syntax is a fixed
//! external contract; this module is the only place that writes it.
//!
//! The builder is a pure transform from [`EntitlementState`] to
//! [`FilterPredicate`]: no network calls, no side effects, and deterministic
//! byte-for-byte output for equal inputs so predicates double as stable cache
//! keys.

use serde::{Deserialize, Serialize};

use crate::content_type::ContentType;
use crate::entitlement::{EnterpriseContext, EntitlementState};
use crate::error::{SearchError, SearchResult};
use crate::observe;

/// Index field holding a record's catalog memberships.
pub const CATALOG_FIELD: &str = "catalog";
/// Index field holding a record's content type.
pub const CONTENT_TYPE_FIELD: &str = "content_type";
/// Index field holding the enterprise customers a record is visible to.
pub const ENTERPRISE_CUSTOMER_FIELD: &str = "enterprise_customer";

/// A filter expression in the engine's syntax.
///
/// Consumed verbatim by the search client as a request parameter. Construct
/// through [`build_filter`] or [`FilterPredicate::unrestricted`]; the inner
/// string is intentionally not publicly constructible from arbitrary input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterPredicate(String);

impl FilterPredicate {
    /// The distinguished "no restriction" predicate: everything the
    /// enterprise is entitled to see, scoped to the customer rather than a
    /// literal match-all so one tenant can never leak into another.
    #[must_use]
    pub fn unrestricted(enterprise: &EnterpriseContext) -> Self {
        Self(format!("{ENTERPRISE_CUSTOMER_FIELD}:{}", enterprise.uuid))
    }

    /// The predicate as the engine-facing string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Combine this predicate with a content-type term.
    ///
    /// The content-type term comes first so the engine can short-circuit on
    /// the cheap discriminant (a performance convention, not a correctness
    /// requirement). An OR-joined catalog group is parenthesized to keep the
    /// AND from binding to only its first term.
    #[must_use]
    pub fn with_content_type(&self, content_type: ContentType) -> Self {
        let base = if self.0.contains(" OR ") {
            format!("({})", self.0)
        } else {
            self.0.clone()
        };
        Self(format!(
            "{CONTENT_TYPE_FIELD}:{} AND {base}",
            content_type.index_token()
        ))
    }
}

impl std::fmt::Display for FilterPredicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Build the catalog filter for the given entitlement state.
///
/// Each eligible catalog becomes a `catalog:<id>` term; the terms are joined
/// with ` OR ` in derivation order. Zero eligible catalogs yields the
/// unrestricted predicate: an enterprise with no recognized subsidy still
/// sees its full catalog, never zero results.
///
/// # Errors
///
/// `SearchError::InvalidEntitlement` when the state is malformed (an offer
/// without a catalog identifier). See [`build_filter_with_fallback`] for the
/// recovery used at the page level.
pub fn build_filter(
    enterprise: &EnterpriseContext,
    entitlements: &EntitlementState,
) -> SearchResult<FilterPredicate> {
    let catalogs = entitlements.eligible_catalogs()?;
    if catalogs.is_empty() {
        return Ok(FilterPredicate::unrestricted(enterprise));
    }
    let joined = catalogs
        .iter()
        .map(|catalog| format!("{CATALOG_FIELD}:{catalog}"))
        .collect::<Vec<_>>()
        .join(" OR ");
    Ok(FilterPredicate(joined))
}

/// Build the catalog filter, recovering from malformed entitlement data.
///
/// `InvalidEntitlement` is logged and replaced by the unrestricted predicate
/// so the page keeps rendering; other errors cannot occur here.
#[must_use]
pub fn build_filter_with_fallback(
    enterprise: &EnterpriseContext,
    entitlements: &EntitlementState,
) -> FilterPredicate {
    match build_filter(enterprise, entitlements) {
        Ok(filter) => filter,
        Err(SearchError::InvalidEntitlement { reason }) => {
            tracing::warn!(
                target: observe::TARGET_PREFIX,
                enterprise = %enterprise.uuid,
                reason = %reason,
                "malformed entitlement state, using enterprise-wide filter"
            );
            FilterPredicate::unrestricted(enterprise)
        }
        Err(other) => {
            // build_filter only fails on entitlement validation.
            tracing::error!(
                target: observe::TARGET_PREFIX,
                error = %other,
                "unexpected filter build failure, using enterprise-wide filter"
            );
            FilterPredicate::unrestricted(enterprise)
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::entitlement::{LicenseStatus, Offer, SubscriptionLicense, SubscriptionPlan};

    fn enterprise() -> EnterpriseContext {
        EnterpriseContext::new("ent-uuid-1", "acme", "Acme Corp")
    }

    // ── Unrestricted fallback ───────────────────────────────────────────

    #[test]
    fn no_subsidies_yields_unrestricted_predicate() {
        let filter = build_filter(&enterprise(), &EntitlementState::none()).unwrap();
        assert_eq!(filter.as_str(), "enterprise_customer:ent-uuid-1");
    }

    #[test]
    fn inactive_license_alone_yields_unrestricted_predicate() {
        let state = EntitlementState::none().with_license(SubscriptionLicense {
            uuid: "lic-1".into(),
            status: LicenseStatus::Revoked,
            catalog: "cat-license".into(),
        });
        let filter = build_filter(&enterprise(), &state).unwrap();
        assert_eq!(filter, FilterPredicate::unrestricted(&enterprise()));
    }

    // ── Catalog composition ─────────────────────────────────────────────

    #[test]
    fn single_catalog_has_no_operator() {
        let state = EntitlementState::none().with_offer(Offer::new("cat-1"));
        let filter = build_filter(&enterprise(), &state).unwrap();
        assert_eq!(filter.as_str(), "catalog:cat-1");
    }

    #[test]
    fn multiple_catalogs_join_with_or() {
        let state = EntitlementState::none()
            .with_offer(Offer::new("cat-1"))
            .with_offer(Offer::new("cat-2"));
        let filter = build_filter(&enterprise(), &state).unwrap();
        assert_eq!(filter.as_str(), "catalog:cat-1 OR catalog:cat-2");
    }

    #[test]
    fn duplicate_catalogs_appear_once() {
        let state = EntitlementState::none()
            .with_plan(SubscriptionPlan {
                uuid: "plan-1".into(),
                catalog: "cat-a".into(),
            })
            .with_offer(Offer::new("cat-b"))
            .with_offer(Offer::new("cat-a"));
        let filter = build_filter(&enterprise(), &state).unwrap();
        assert_eq!(filter.as_str(), "catalog:cat-a OR catalog:cat-b");
        assert_eq!(filter.as_str().matches("cat-a").count(), 1);
    }

    // ── Content-type composition ────────────────────────────────────────

    #[test]
    fn content_type_term_comes_first() {
        let state = EntitlementState::none().with_offer(Offer::new("cat-1"));
        let filter = build_filter(&enterprise(), &state)
            .unwrap()
            .with_content_type(ContentType::Course);
        assert_eq!(filter.as_str(), "content_type:course AND catalog:cat-1");
    }

    #[test]
    fn or_group_is_parenthesized_under_and() {
        let state = EntitlementState::none()
            .with_offer(Offer::new("cat-1"))
            .with_offer(Offer::new("cat-2"));
        let filter = build_filter(&enterprise(), &state)
            .unwrap()
            .with_content_type(ContentType::Program);
        assert_eq!(
            filter.as_str(),
            "content_type:program AND (catalog:cat-1 OR catalog:cat-2)"
        );
    }

    #[test]
    fn unrestricted_predicate_composes_with_content_type() {
        let filter =
            FilterPredicate::unrestricted(&enterprise()).with_content_type(ContentType::Course);
        assert_eq!(
            filter.as_str(),
            "content_type:course AND enterprise_customer:ent-uuid-1"
        );
    }

    // ── Error handling and fallback ─────────────────────────────────────

    #[test]
    fn malformed_offer_is_rejected_not_dropped() {
        let state = EntitlementState::none()
            .with_offer(Offer::new("cat-1"))
            .with_offer(Offer::new(""));
        assert!(build_filter(&enterprise(), &state).is_err());
    }

    #[test]
    fn fallback_recovers_to_unrestricted() {
        let state = EntitlementState::none().with_offer(Offer::new(""));
        let filter = build_filter_with_fallback(&enterprise(), &state);
        assert_eq!(filter, FilterPredicate::unrestricted(&enterprise()));
    }

    #[test]
    fn fallback_passes_through_valid_state() {
        let state = EntitlementState::none().with_offer(Offer::new("cat-1"));
        let filter = build_filter_with_fallback(&enterprise(), &state);
        assert_eq!(filter.as_str(), "catalog:cat-1");
    }

    // ── Serialization ───────────────────────────────────────────────────

    #[test]
    fn predicate_serializes_as_bare_string() {
        let filter = FilterPredicate::unrestricted(&enterprise());
        let json = serde_json::to_string(&filter).unwrap();
        assert_eq!(json, "\"enterprise_customer:ent-uuid-1\"");
    }

    // ── Properties ──────────────────────────────────────────────────────

    proptest! {
        #[test]
        fn build_filter_is_deterministic(catalogs in proptest::collection::vec("[a-z0-9-]{1,12}", 0..6)) {
            let mut state = EntitlementState::none();
            for catalog in &catalogs {
                state = state.with_offer(Offer::new(catalog.clone()));
            }
            let first = build_filter(&enterprise(), &state).unwrap();
            let second = build_filter(&enterprise(), &state).unwrap();
            prop_assert_eq!(first.as_str(), second.as_str());
        }

        #[test]
        fn each_distinct_catalog_appears_exactly_once(catalogs in proptest::collection::vec("[a-z]{4,8}", 1..8)) {
            let mut state = EntitlementState::none();
            for catalog in &catalogs {
                state = state.with_offer(Offer::new(catalog.clone()));
            }
            let filter = build_filter(&enterprise(), &state).unwrap();
            for catalog in &catalogs {
                let term = format!("{CATALOG_FIELD}:{catalog}");
                let count = filter
                    .as_str()
                    .split(" OR ")
                    .filter(|part| *part == term)
                    .count();
                prop_assert_eq!(count, 1, "catalog {} must appear once", catalog);
            }
        }
    }
}
