//! Enterprise context and subsidy (entitlement) state.
//!
//! An entitlement grants catalog access: a subscription license, a
//! subscription plan, or a learner credit offer. The state is resolved by an
//! upstream subsidy collaborator, owned by the page for one visit, and never
//! mutated within a render cycle. [`EntitlementState::eligible_catalogs`]
//! derives the ordered set of catalog identifiers the filter builder joins
//! into a single predicate.

use serde::{Deserialize, Serialize};

use crate::error::{SearchError, SearchResult};

/// Identity of the enterprise the learner belongs to.
///
/// Sourced from the authentication/config collaborator; read-only here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnterpriseContext {
    /// Stable enterprise customer identifier, used in the unrestricted filter.
    pub uuid: String,
    /// URL slug for the enterprise portal.
    pub slug: String,
    /// Display name, used in page titles.
    pub name: String,
}

impl EnterpriseContext {
    /// Creates a context from the collaborator-provided fields.
    #[must_use]
    pub fn new(uuid: impl Into<String>, slug: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            slug: slug.into(),
            name: name.into(),
        }
    }
}

/// Activation status of a subscription license.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LicenseStatus {
    /// The learner activated the license; its catalog is eligible.
    Activated,
    /// Assigned but not yet activated; grants no catalog access.
    Assigned,
    /// Revoked; grants no catalog access.
    Revoked,
}

/// A subscription license held by the learner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionLicense {
    /// License identifier.
    pub uuid: String,
    /// Activation status.
    pub status: LicenseStatus,
    /// Catalog governed by the license's subscription.
    pub catalog: String,
}

impl SubscriptionLicense {
    /// Whether this license currently grants catalog access.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self.status, LicenseStatus::Activated)
    }
}

/// A subscription plan attached to the enterprise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionPlan {
    /// Plan identifier.
    pub uuid: String,
    /// Catalog the plan grants access to.
    pub catalog: String,
}

/// A learner credit offer. Each offer scopes access to one catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offer {
    /// Catalog the offer grants access to.
    pub catalog: String,
}

impl Offer {
    /// Creates an offer for the given catalog.
    #[must_use]
    pub fn new(catalog: impl Into<String>) -> Self {
        Self {
            catalog: catalog.into(),
        }
    }
}

/// The full subsidy state for one page visit.
///
/// Absence of all three sources means the learner searches the unrestricted
/// (enterprise-wide) catalog, never an empty one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitlementState {
    /// Subscription plan, if the enterprise has one.
    pub plan: Option<SubscriptionPlan>,
    /// The learner's subscription license, if any.
    pub license: Option<SubscriptionLicense>,
    /// Learner credit offers, in the order the subsidy resolver reported them.
    #[serde(default)]
    pub offers: Vec<Offer>,
}

impl EntitlementState {
    /// State with no subsidies at all.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Sets the subscription plan.
    #[must_use]
    pub fn with_plan(mut self, plan: SubscriptionPlan) -> Self {
        self.plan = Some(plan);
        self
    }

    /// Sets the subscription license.
    #[must_use]
    pub fn with_license(mut self, license: SubscriptionLicense) -> Self {
        self.license = Some(license);
        self
    }

    /// Appends an offer.
    #[must_use]
    pub fn with_offer(mut self, offer: Offer) -> Self {
        self.offers.push(offer);
        self
    }

    /// Derive the ordered, de-duplicated eligible catalog set.
    ///
    /// Priority order: active license catalog, then plan catalog, then offer
    /// catalogs in reported order. A catalog reachable through several
    /// subsidies appears once, at its first occurrence.
    ///
    /// # Errors
    ///
    /// `SearchError::InvalidEntitlement` if any offer lacks a catalog
    /// identifier. Malformed upstream data is rejected, never dropped:
    /// dropping a term would silently broaden the visible results.
    pub fn eligible_catalogs(&self) -> SearchResult<Vec<String>> {
        if let Some(bad) = self.offers.iter().position(|o| o.catalog.trim().is_empty()) {
            return Err(SearchError::InvalidEntitlement {
                reason: format!("offer at position {bad} has no catalog identifier"),
            });
        }

        let mut catalogs: Vec<String> = Vec::new();
        let mut push = |catalog: &str| {
            if !catalogs.iter().any(|c| c == catalog) {
                catalogs.push(catalog.to_owned());
            }
        };

        if let Some(license) = &self.license
            && license.is_active()
        {
            push(&license.catalog);
        }
        if let Some(plan) = &self.plan {
            push(&plan.catalog);
        }
        for offer in &self.offers {
            push(&offer.catalog);
        }

        Ok(catalogs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn license(status: LicenseStatus, catalog: &str) -> SubscriptionLicense {
        SubscriptionLicense {
            uuid: "lic-1".into(),
            status,
            catalog: catalog.into(),
        }
    }

    fn plan(catalog: &str) -> SubscriptionPlan {
        SubscriptionPlan {
            uuid: "plan-1".into(),
            catalog: catalog.into(),
        }
    }

    // ── Catalog derivation ──────────────────────────────────────────────

    #[test]
    fn no_subsidies_derives_no_catalogs() {
        let catalogs = EntitlementState::none().eligible_catalogs().unwrap();
        assert!(catalogs.is_empty());
    }

    #[test]
    fn active_license_comes_first() {
        let state = EntitlementState::none()
            .with_offer(Offer::new("cat-offer"))
            .with_plan(plan("cat-plan"))
            .with_license(license(LicenseStatus::Activated, "cat-license"));
        assert_eq!(
            state.eligible_catalogs().unwrap(),
            vec!["cat-license", "cat-plan", "cat-offer"]
        );
    }

    #[test]
    fn inactive_license_grants_nothing() {
        for status in [LicenseStatus::Assigned, LicenseStatus::Revoked] {
            let state = EntitlementState::none().with_license(license(status, "cat-license"));
            assert!(state.eligible_catalogs().unwrap().is_empty());
        }
    }

    #[test]
    fn duplicate_catalogs_collapse_to_first_occurrence() {
        let state = EntitlementState::none()
            .with_plan(plan("cat-a"))
            .with_offer(Offer::new("cat-b"))
            .with_offer(Offer::new("cat-a"));
        assert_eq!(state.eligible_catalogs().unwrap(), vec!["cat-a", "cat-b"]);
    }

    #[test]
    fn offers_preserve_reported_order() {
        let state = EntitlementState::none()
            .with_offer(Offer::new("cat-2"))
            .with_offer(Offer::new("cat-1"))
            .with_offer(Offer::new("cat-3"));
        assert_eq!(
            state.eligible_catalogs().unwrap(),
            vec!["cat-2", "cat-1", "cat-3"]
        );
    }

    #[test]
    fn license_and_offer_sharing_a_catalog_count_once() {
        let state = EntitlementState::none()
            .with_license(license(LicenseStatus::Activated, "cat-shared"))
            .with_offer(Offer::new("cat-shared"));
        assert_eq!(state.eligible_catalogs().unwrap(), vec!["cat-shared"]);
    }

    // ── Malformed offers ────────────────────────────────────────────────

    #[test]
    fn offer_without_catalog_is_rejected() {
        let state = EntitlementState::none()
            .with_offer(Offer::new("cat-1"))
            .with_offer(Offer::new(""));
        let err = state.eligible_catalogs().unwrap_err();
        assert!(matches!(err, SearchError::InvalidEntitlement { .. }));
        assert!(err.to_string().contains("position 1"));
    }

    #[test]
    fn whitespace_only_catalog_is_rejected() {
        let state = EntitlementState::none().with_offer(Offer::new("   "));
        assert!(state.eligible_catalogs().is_err());
    }

    #[test]
    fn malformed_offer_rejects_even_with_valid_license() {
        // The whole state is rejected; the valid license must not mask the
        // malformed offer.
        let state = EntitlementState::none()
            .with_license(license(LicenseStatus::Activated, "cat-license"))
            .with_offer(Offer::new(""));
        assert!(state.eligible_catalogs().is_err());
    }

    // ── Serialization ───────────────────────────────────────────────────

    #[test]
    fn state_serialization_roundtrip() {
        let state = EntitlementState::none()
            .with_license(license(LicenseStatus::Activated, "cat-license"))
            .with_offer(Offer::new("cat-1"));
        let json = serde_json::to_string(&state).unwrap();
        let decoded: EntitlementState = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, state);
    }

    #[test]
    fn license_status_uses_snake_case() {
        let json = serde_json::to_string(&LicenseStatus::Activated).unwrap();
        assert_eq!(json, "\"activated\"");
    }

    #[test]
    fn offers_default_to_empty_when_absent() {
        let decoded: EntitlementState =
            serde_json::from_str(r#"{"plan": null, "license": null}"#).unwrap();
        assert!(decoded.offers.is_empty());
    }
}
