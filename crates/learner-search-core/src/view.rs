//! View planning for the search surface.
//!
//! One filter base, two result shapes. With no content-type selection the
//! page shows the dual browse view (a programs section above a courses
//! section, each with its own count query); with a selection it shows a
//! single paginated result list bound to that type's hit renderer. The plan
//! is a tagged variant matched exhaustively by the renderer, so there is no
//! implicit fallthrough branch.

use serde::{Deserialize, Serialize};

use crate::content_type::{ContentType, selection_from_refinements};
use crate::error::SearchResult;

/// Page size for the single-content-type paginated view.
pub const SINGLE_VIEW_PAGE_SIZE: usize = 24;

/// Hits shown per section in the dual browse view (the popular-results
/// threshold; also the number of skeleton placeholders while stalled).
pub const DUAL_VIEW_DISPLAY_COUNT: usize = 4;

/// Which presentational hit component renders a section's results.
///
/// The components themselves are external collaborators; the router only
/// binds the correct one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HitRenderer {
    /// Course result card.
    CourseCard,
    /// Program result card.
    ProgramCard,
}

impl HitRenderer {
    /// The renderer responsible for the given content type.
    #[must_use]
    pub const fn for_content_type(content_type: ContentType) -> Self {
        match content_type {
            ContentType::Course => Self::CourseCard,
            ContentType::Program => Self::ProgramCard,
        }
    }
}

/// One result panel: renderer, heading, page size, and whether its search
/// request carries a content-type term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Hit component bound to this section.
    pub renderer: HitRenderer,
    /// Section heading.
    pub title: String,
    /// Hits requested per page.
    pub page_size: usize,
    /// Content-type term appended to the section's filter. `None` in the
    /// dual view: both sections share the bare entitlement filter and the
    /// engine's per-index typing does the splitting.
    pub filter_content_type: Option<ContentType>,
}

impl Section {
    /// Dual-view section for the given content type.
    #[must_use]
    pub fn dual(content_type: ContentType) -> Self {
        Self {
            renderer: HitRenderer::for_content_type(content_type),
            title: format!("Popular {}", content_type.section_title()),
            page_size: DUAL_VIEW_DISPLAY_COUNT,
            filter_content_type: None,
        }
    }

    /// Single-view section for the given content type.
    #[must_use]
    pub fn single(content_type: ContentType) -> Self {
        Self {
            renderer: HitRenderer::for_content_type(content_type),
            title: content_type.section_title().to_owned(),
            page_size: SINGLE_VIEW_PAGE_SIZE,
            filter_content_type: Some(content_type),
        }
    }
}

/// The view to render for a content-type selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewPlan {
    /// Browse view: programs first, then courses, independent count queries.
    Dual {
        /// Programs section (rendered first).
        programs: Section,
        /// Courses section.
        courses: Section,
    },
    /// Paginated results for exactly one content type.
    Single(Section),
}

impl ViewPlan {
    /// Sections in render order.
    #[must_use]
    pub fn sections(&self) -> Vec<&Section> {
        match self {
            Self::Dual { programs, courses } => vec![programs, courses],
            Self::Single(section) => vec![section],
        }
    }
}

/// Route a content-type selection to its view plan.
#[must_use]
pub fn select_view(selection: Option<ContentType>) -> ViewPlan {
    match selection {
        None => ViewPlan::Dual {
            programs: Section::dual(ContentType::Program),
            courses: Section::dual(ContentType::Course),
        },
        Some(content_type) => ViewPlan::Single(Section::single(content_type)),
    }
}

/// Route raw facet refinements to a view plan, failing fast on values the
/// facet widget should never produce.
///
/// # Errors
///
/// `SearchError::UnsupportedContentType` for an unrecognized first entry.
pub fn select_view_from_refinements(refinements: &[String]) -> SearchResult<ViewPlan> {
    Ok(select_view(selection_from_refinements(refinements)?))
}
