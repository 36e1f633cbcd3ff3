//! Domain service for the video catalog.
//!
//! Handlers talk to [`VideoService`] and never to the store directly, so the
//! validation rules live in exactly one place.

use crate::domain::VideoId;
use crate::models::{FieldErrors, VideoDraft, VideoRecord};
use thiserror::Error;

/// Domain errors for catalog operations.
#[derive(Debug, Error)]
pub enum VideoError {
    #[error("Video not found: {0}")]
    NotFound(VideoId),

    #[error("Invalid video: {0}")]
    Validation(FieldErrors),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sea_orm::DbErr> for VideoError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<FieldErrors> for VideoError {
    fn from(errors: FieldErrors) -> Self {
        Self::Validation(errors)
    }
}

/// Catalog operations over a single flat collection of video records.
#[async_trait::async_trait]
pub trait VideoService: Send + Sync {
    /// Lists every record, most recently created first.
    ///
    /// # Errors
    ///
    /// Returns [`VideoError::Database`] on connection failures.
    async fn list_videos(&self) -> Result<Vec<VideoRecord>, VideoError>;

    /// # Errors
    ///
    /// - Returns [`VideoError::NotFound`] if no record has this id
    /// - Returns [`VideoError::Database`] on connection failures
    async fn get_video(&self, id: &VideoId) -> Result<VideoRecord, VideoError>;

    /// Validates and persists a new record.
    ///
    /// # Errors
    ///
    /// - Returns [`VideoError::Validation`] with one message per violated field
    /// - Returns [`VideoError::Database`] on connection failures
    async fn create_video(&self, draft: VideoDraft) -> Result<VideoRecord, VideoError>;

    /// Applies a partial update. Fields absent from `patch` keep their stored
    /// value and the merged record is validated like a create.
    ///
    /// # Errors
    ///
    /// - Returns [`VideoError::NotFound`] if no record has this id
    /// - Returns [`VideoError::Validation`] if the merged record is invalid
    /// - Returns [`VideoError::Database`] on connection failures
    async fn update_video(&self, id: &VideoId, patch: VideoDraft)
    -> Result<VideoRecord, VideoError>;

    /// # Errors
    ///
    /// - Returns [`VideoError::NotFound`] if no record has this id
    /// - Returns [`VideoError::Database`] on connection failures
    async fn delete_video(&self, id: &VideoId) -> Result<(), VideoError>;
}
