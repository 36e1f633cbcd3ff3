//! `SeaORM` implementation of the [`VideoService`] trait.

use crate::db::Store;
use crate::domain::VideoId;
use crate::models::{VideoDraft, VideoRecord};
use crate::services::video_service::{VideoError, VideoService};
use tracing::{debug, info};

pub struct SeaOrmVideoService {
    store: Store,
}

impl SeaOrmVideoService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

fn db_err(err: anyhow::Error) -> VideoError {
    VideoError::Database(format!("{err:#}"))
}

#[async_trait::async_trait]
impl VideoService for SeaOrmVideoService {
    async fn list_videos(&self) -> Result<Vec<VideoRecord>, VideoError> {
        let videos = self.store.list_videos().await.map_err(db_err)?;
        debug!(count = videos.len(), "Listed videos");
        Ok(videos)
    }

    async fn get_video(&self, id: &VideoId) -> Result<VideoRecord, VideoError> {
        self.store
            .get_video(id)
            .await
            .map_err(db_err)?
            .ok_or_else(|| VideoError::NotFound(id.clone()))
    }

    async fn create_video(&self, draft: VideoDraft) -> Result<VideoRecord, VideoError> {
        let valid = draft.validate()?;
        let video = self.store.insert_video(valid).await.map_err(db_err)?;
        info!(id = %video.id, title = %video.title, "Video created");
        Ok(video)
    }

    async fn update_video(
        &self,
        id: &VideoId,
        patch: VideoDraft,
    ) -> Result<VideoRecord, VideoError> {
        let existing = self.get_video(id).await?;
        let valid = patch.merge_onto(&existing).validate()?;

        let video = self
            .store
            .update_video(id, valid)
            .await
            .map_err(db_err)?
            // Deleted between the read and the write
            .ok_or_else(|| VideoError::NotFound(id.clone()))?;

        info!(id = %video.id, "Video updated");
        Ok(video)
    }

    async fn delete_video(&self, id: &VideoId) -> Result<(), VideoError> {
        if !self.store.delete_video(id).await.map_err(db_err)? {
            return Err(VideoError::NotFound(id.clone()));
        }
        info!(id = %id, "Video deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Category;

    async fn service() -> SeaOrmVideoService {
        let store = Store::with_pool_options("sqlite::memory:", 1, 1)
            .await
            .expect("in-memory store");
        SeaOrmVideoService::new(store)
    }

    fn draft(title: &str) -> VideoDraft {
        VideoDraft {
            title: Some(title.to_string()),
            description: Some("desc".to_string()),
            video_url: Some("https://x/y.mp4".to_string()),
            category: None,
        }
    }

    #[tokio::test]
    async fn create_returns_input_plus_generated_fields() {
        let service = service().await;
        let video = service.create_video(draft("Demo")).await.unwrap();

        assert_eq!(video.title, "Demo");
        assert_eq!(video.description, "desc");
        assert_eq!(video.video_url, "https://x/y.mp4");
        assert_eq!(video.category, Category::Cinematic);
        assert!(!video.id.as_str().is_empty());
        assert!(!video.created_at.is_empty());
    }

    #[tokio::test]
    async fn invalid_create_persists_nothing() {
        let service = service().await;
        let err = service.create_video(draft("")).await.unwrap_err();

        match err {
            VideoError::Validation(errors) => assert_eq!(errors.fields(), vec!["title"]),
            other => panic!("unexpected error: {other}"),
        }
        assert!(service.list_videos().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn partial_update_keeps_other_fields() {
        let service = service().await;
        let created = service.create_video(draft("Demo")).await.unwrap();

        let patch = VideoDraft {
            category: Some("animation".to_string()),
            ..VideoDraft::default()
        };
        let updated = service.update_video(&created.id, patch).await.unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.title, "Demo");
        assert_eq!(updated.category, Category::Animation);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn invalid_update_leaves_record_unchanged() {
        let service = service().await;
        let created = service.create_video(draft("Demo")).await.unwrap();

        let patch = VideoDraft {
            title: Some("t".repeat(101)),
            ..VideoDraft::default()
        };
        assert!(matches!(
            service.update_video(&created.id, patch).await,
            Err(VideoError::Validation(_))
        ));
        assert_eq!(service.get_video(&created.id).await.unwrap(), created);
    }

    #[tokio::test]
    async fn delete_twice_reports_not_found() {
        let service = service().await;
        let created = service.create_video(draft("Demo")).await.unwrap();

        service.delete_video(&created.id).await.unwrap();
        assert!(matches!(
            service.delete_video(&created.id).await,
            Err(VideoError::NotFound(_))
        ));
        assert!(matches!(
            service.get_video(&created.id).await,
            Err(VideoError::NotFound(_))
        ));
    }
}
