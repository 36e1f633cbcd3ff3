use crate::domain::{Category, VideoId};
use crate::entities::{prelude::*, videos};
use crate::models::{ValidVideo, VideoRecord};
use anyhow::Result;
use chrono::{SecondsFormat, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryOrder, Set};
use tracing::warn;

pub struct VideoRepository {
    conn: DatabaseConnection,
}

impl VideoRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&self) -> Result<Vec<VideoRecord>> {
        let rows = Videos::find()
            .order_by_desc(videos::Column::CreatedAt)
            .order_by_desc(videos::Column::Id)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(to_record).collect())
    }

    pub async fn get(&self, id: &VideoId) -> Result<Option<VideoRecord>> {
        let row = Videos::find_by_id(id.as_str()).one(&self.conn).await?;
        Ok(row.map(to_record))
    }

    pub async fn count(&self) -> Result<u64> {
        Ok(Videos::find().count(&self.conn).await?)
    }

    pub async fn insert(&self, video: ValidVideo) -> Result<VideoRecord> {
        let now = timestamp();
        let model = videos::ActiveModel {
            id: Set(VideoId::generate().into_inner()),
            title: Set(video.title),
            description: Set(video.description),
            video_url: Set(video.video_url),
            category: Set(video.category.as_str().to_string()),
            created_at: Set(now.clone()),
            updated_at: Set(now),
        };

        let row = model.insert(&self.conn).await?;
        Ok(to_record(row))
    }

    /// Overwrites every mutable field. Returns `None` when the id is unknown.
    pub async fn update(&self, id: &VideoId, video: ValidVideo) -> Result<Option<VideoRecord>> {
        let Some(existing) = Videos::find_by_id(id.as_str()).one(&self.conn).await? else {
            return Ok(None);
        };

        let mut model: videos::ActiveModel = existing.into();
        model.title = Set(video.title);
        model.description = Set(video.description);
        model.video_url = Set(video.video_url);
        model.category = Set(video.category.as_str().to_string());
        model.updated_at = Set(timestamp());

        let row = model.update(&self.conn).await?;
        Ok(Some(to_record(row)))
    }

    /// Returns whether a row was removed.
    pub async fn delete(&self, id: &VideoId) -> Result<bool> {
        let result = Videos::delete_by_id(id.as_str()).exec(&self.conn).await?;
        Ok(result.rows_affected > 0)
    }
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn to_record(row: videos::Model) -> VideoRecord {
    let category = row.category.parse().unwrap_or_else(|e| {
        warn!(id = %row.id, "Stored video has {e}; reporting it as Other");
        Category::Other
    });

    VideoRecord {
        id: VideoId::from(row.id),
        title: row.title,
        description: row.description,
        video_url: row.video_url,
        category,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}
