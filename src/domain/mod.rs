//! Domain types for the video catalog with strong typing.
//!
//! This module provides type-safe wrappers and domain primitives shared by the
//! catalog service and the gallery. It follows the Newtype pattern so a video
//! id is never confused with an arbitrary string.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique identifier for a video record.
///
/// The value is opaque to callers. New ids are time-ordered UUIDs rendered as
/// text, but any string received from a client is accepted and simply fails to
/// match when it was never issued.
///
/// # Examples
///
/// ```rust
/// use showreel::domain::VideoId;
///
/// let id = VideoId::from("abc");
/// assert_eq!(id.as_str(), "abc");
/// assert_eq!(id.to_string(), "abc");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    /// Generates a fresh id. Ids generated by one process sort in creation order.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::now_v7().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for VideoId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for VideoId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Category of a catalog entry.
///
/// Parsing is case-insensitive so records written with the legacy lower-case
/// names (`editing`, `animation`, `other`) still load; output is always the
/// capitalized form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Category {
    #[default]
    Cinematic,
    Editing,
    Animation,
    Other,
}

impl Category {
    pub const ALL: [Self; 4] = [Self::Cinematic, Self::Editing, Self::Animation, Self::Other];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cinematic => "Cinematic",
            Self::Editing => "Editing",
            Self::Animation => "Animation",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCategory(pub String);

impl fmt::Display for UnknownCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let allowed: Vec<&str> = Category::ALL.iter().map(Category::as_str).collect();
        write!(
            f,
            "`{}` is not a valid category ({})",
            self.0,
            allowed.join(", ")
        )
    }
}

impl std::error::Error for UnknownCategory {}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}
