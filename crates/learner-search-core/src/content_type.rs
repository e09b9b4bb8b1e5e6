//! Content-type facet handling.
//!
//! The search header exposes content type as a single-select facet. The facet
//! source technically reports a sequence of refinement strings; only the first
//! entry is significant. An absent or empty sequence means "no selection"
//! (the browse view shows both sections); any unrecognized value is an
//! integration defect and fails fast instead of defaulting.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{SearchError, SearchResult};

/// The two content types the catalog exposes to search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    /// A single course.
    Course,
    /// A program (bundle of courses).
    Program,
}

impl ContentType {
    /// The token the search index uses for this content type.
    #[must_use]
    pub const fn index_token(self) -> &'static str {
        match self {
            Self::Course => "course",
            Self::Program => "program",
        }
    }

    /// Section heading shown above results of this type.
    #[must_use]
    pub const fn section_title(self) -> &'static str {
        match self {
            Self::Course => "Courses",
            Self::Program => "Programs",
        }
    }

    /// Parse an index token.
    ///
    /// # Errors
    ///
    /// `SearchError::UnsupportedContentType` for anything other than the two
    /// known tokens. The facet widget producing such a value is broken;
    /// surfacing the breakage early beats silently rendering the wrong view.
    pub fn parse(token: &str) -> SearchResult<Self> {
        match token {
            "course" => Ok(Self::Course),
            "program" => Ok(Self::Program),
            other => Err(SearchError::UnsupportedContentType {
                value: other.to_owned(),
            }),
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.index_token())
    }
}

/// Reduce the facet widget's refinement sequence to the significant selection.
///
/// `None` (no selection) for an empty sequence; otherwise the parsed first
/// entry. An absent refinement list and a present-but-empty one are the same
/// value by construction.
///
/// # Errors
///
/// Propagates `UnsupportedContentType` from [`ContentType::parse`].
pub fn selection_from_refinements(refinements: &[String]) -> SearchResult<Option<ContentType>> {
    match refinements.first() {
        None => Ok(None),
        Some(first) => ContentType::parse(first).map(Some),
    }
}
