//! Post records and the closed vocabularies they draw from.
//!
//! DESIGN
//! ======
//! Categories and statuses are enums rather than strings so an out-of-range
//! value cannot exist past the parse boundary. The persisted file and the
//! JSON API both use the variant names verbatim (`"Facilities"`, `"New"`).

use serde::{Deserialize, Serialize};

/// Stable post identifier. Assigned once, never renumbered.
pub type PostId = u64;

// =============================================================================
// CATEGORY
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Facilities,
    Academic,
    Management,
    Suggestion,
}

impl Category {
    pub const ALL: [Self; 4] = [Self::Facilities, Self::Academic, Self::Management, Self::Suggestion];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Facilities => "Facilities",
            Self::Academic => "Academic",
            Self::Management => "Management",
            Self::Suggestion => "Suggestion",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == raw.trim())
    }
}

// =============================================================================
// STATUS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Status {
    #[default]
    New,
    Reviewed,
    Solved,
}

impl Status {
    pub const ALL: [Self; 3] = [Self::New, Self::Reviewed, Self::Solved];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "New",
            Self::Reviewed => "Reviewed",
            Self::Solved => "Solved",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == raw.trim())
    }
}

// =============================================================================
// POST
// =============================================================================

/// A submitted item. Mirrors one data row of the persisted file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    /// Local time, `YYYY-MM-DD HH:MM`.
    pub timestamp: String,
    pub category: Category,
    pub problem: String,
    pub status: Status,
    pub upvotes: u32,
}

/// One row of an admin save. Has no field for the
/// immutable columns; unknown fields are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdminEdit {
    pub id: PostId,
    #[serde(default)]
    pub status: Option<Status>,
    #[serde(default)]
    pub delete: bool,
}

#[cfg(test)]
impl AdminEdit {
    #[must_use]
    pub fn set_status(id: PostId, status: Status) -> Self {
        Self { id, status: Some(status), delete: false }
    }

    #[must_use]
    pub fn delete(id: PostId) -> Self {
        Self { id, status: None, delete: true }
    }
}

/// Reverse creation order: newest first.
#[must_use]
pub fn display_order(mut posts: Vec<Post>) -> Vec<Post> {
    posts.reverse();
    posts
}

#[cfg(test)]
#[path = "model_test.rs"]
mod tests;
