//! Navigation path normalization.
//!
//! Runs on every navigation event before page content mounts. Paths that end
//! with a trailing separator redirect (replacing, so the unnormalized path
//! never enters history) to the stripped form; the root path and
//! already-normalized paths pass through untouched, so there is no redirect
//! loop.

use serde::{Deserialize, Serialize};

/// Outcome of normalizing a navigation path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RouteAction {
    /// The path is already canonical; mount the page.
    Proceed,
    /// Issue a replacing redirect to the canonical path.
    Redirect(String),
}

/// Canonicalize a navigation path.
///
/// Repeated trailing separators are collapsed in a single redirect, so one
/// navigation suffices however malformed the incoming path is.
#[must_use]
pub fn normalize_path(path: &str) -> RouteAction {
    if path.len() <= 1 {
        // "" and "/" are both canonical.
        return RouteAction::Proceed;
    }
    let trimmed = path.trim_end_matches('/');
    if trimmed.len() == path.len() {
        RouteAction::Proceed
    } else if trimmed.is_empty() {
        RouteAction::Redirect("/".to_owned())
    } else {
        RouteAction::Redirect(trimmed.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn trailing_separator_redirects_to_stripped_path() {
        assert_eq!(
            normalize_path("/foo/bar/"),
            RouteAction::Redirect("/foo/bar".to_owned())
        );
    }

    #[test]
    fn root_path_is_left_alone() {
        assert_eq!(normalize_path("/"), RouteAction::Proceed);
    }

    #[test]
    fn empty_path_is_left_alone() {
        assert_eq!(normalize_path(""), RouteAction::Proceed);
    }

    #[test]
    fn normalized_path_is_a_no_op() {
        assert_eq!(normalize_path("/foo/bar"), RouteAction::Proceed);
    }

    #[test]
    fn repeated_trailing_separators_collapse_in_one_redirect() {
        assert_eq!(
            normalize_path("/foo///"),
            RouteAction::Redirect("/foo".to_owned())
        );
    }

    #[test]
    fn all_separator_path_redirects_to_root() {
        assert_eq!(normalize_path("///"), RouteAction::Redirect("/".to_owned()));
    }

    #[test]
    fn interior_separators_are_untouched() {
        assert_eq!(normalize_path("/a//b/c"), RouteAction::Proceed);
    }

    proptest! {
        #[test]
        fn normalization_is_idempotent(path in "(/[a-z0-9._~-]{0,8}){0,4}/{0,3}") {
            match normalize_path(&path) {
                RouteAction::Proceed => {}
                RouteAction::Redirect(canonical) => {
                    prop_assert_eq!(
                        normalize_path(&canonical),
                        RouteAction::Proceed,
                        "a redirect target must itself be canonical"
                    );
                }
            }
        }

        #[test]
        fn redirect_never_targets_the_same_path(path in "/[a-z]{1,8}/{1,3}") {
            if let RouteAction::Redirect(canonical) = normalize_path(&path) {
                prop_assert_ne!(canonical, path);
            }
        }
    }
}
