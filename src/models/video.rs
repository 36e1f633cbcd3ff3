use serde::{Deserialize, Serialize};

use crate::domain::{Category, VideoId};

pub const TITLE_MAX_CHARS: usize = 100;
pub const DESCRIPTION_MAX_CHARS: usize = 500;

/// A stored catalog entry as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRecord {
    pub id: VideoId,
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub category: Category,
    pub created_at: String,
    pub updated_at: String,
}

/// Candidate fields as received on create or update.
///
/// Every field is optional at this level; which ones are required is decided by
/// [`VideoDraft::validate`] (create) or [`VideoDraft::merge_onto`] (update).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Fields that passed validation and are ready to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidVideo {
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub category: Category,
}

/// One message per violated field, in field order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldErrors(Vec<FieldError>);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldErrors {
    fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn fields(&self) -> Vec<&'static str> {
        self.0.iter().map(|e| e.field).collect()
    }

    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.0.iter().map(|e| e.message.clone()).collect()
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.messages().join("; "))
    }
}

impl VideoDraft {
    /// Validates the draft as a complete record.
    pub fn validate(self) -> Result<ValidVideo, FieldErrors> {
        let mut errors = FieldErrors::default();

        let title = self.title.as_deref().map(str::trim).unwrap_or_default();
        if title.is_empty() {
            errors.push("title", "Please add a title");
        } else if title.chars().count() > TITLE_MAX_CHARS {
            errors.push(
                "title",
                format!("Title cannot be more than {TITLE_MAX_CHARS} characters"),
            );
        }

        let description = self.description.as_deref().unwrap_or_default();
        if description.is_empty() {
            errors.push("description", "Please add a description");
        } else if description.chars().count() > DESCRIPTION_MAX_CHARS {
            errors.push(
                "description",
                format!("Description cannot be more than {DESCRIPTION_MAX_CHARS} characters"),
            );
        }

        let video_url = self.video_url.as_deref().map(str::trim).unwrap_or_default();
        if video_url.is_empty() {
            errors.push("videoUrl", "Please add a video URL");
        } else if !is_absolute_url(video_url) {
            errors.push("videoUrl", "Video URL must be an absolute URL");
        }

        let category = match self.category.as_deref() {
            None => Some(Category::default()),
            Some(raw) => match raw.parse::<Category>() {
                Ok(category) => Some(category),
                Err(e) => {
                    errors.push("category", e.to_string());
                    None
                }
            },
        };

        match category {
            Some(category) if errors.is_empty() => Ok(ValidVideo {
                title: title.to_string(),
                description: description.to_string(),
                video_url: video_url.to_string(),
                category,
            }),
            _ => Err(errors),
        }
    }

    /// Fills every field missing from this draft with the stored value.
    #[must_use]
    pub fn merge_onto(self, existing: &VideoRecord) -> Self {
        Self {
            title: self.title.or_else(|| Some(existing.title.clone())),
            description: self
                .description
                .or_else(|| Some(existing.description.clone())),
            video_url: self.video_url.or_else(|| Some(existing.video_url.clone())),
            category: self
                .category
                .or_else(|| Some(existing.category.as_str().to_string())),
        }
    }
}

fn is_absolute_url(raw: &str) -> bool {
    url::Url::parse(raw).is_ok_and(|u| u.has_host())
}
