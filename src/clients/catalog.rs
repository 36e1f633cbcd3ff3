use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::models::{VideoDraft, VideoRecord};

#[derive(Debug, Error)]
pub enum CatalogClientError {
    #[error("Video not found")]
    NotFound,

    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Catalog returned {status}: {message}")]
    Server { status: StatusCode, message: String },

    #[error("Unexpected response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, CatalogClientError>;

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Option<T>,
    error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorBody {
    One(String),
    Many(Vec<String>),
}

impl ErrorBody {
    fn into_messages(self) -> Vec<String> {
        match self {
            Self::One(message) => vec![message],
            Self::Many(messages) => messages,
        }
    }
}

/// HTTP client for a running catalog service.
pub struct CatalogClient {
    client: Client,
    base_url: String,
}

impl CatalogClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, Duration::from_secs(10))
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("Showreel/1.0")
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn videos_url(&self) -> String {
        format!("{}/api/videos", self.base_url)
    }

    fn video_url(&self, id: &str) -> String {
        format!("{}/api/videos/{}", self.base_url, urlencoding::encode(id))
    }

    /// Round-trips the health endpoint. Used as a connection-quality probe.
    pub async fn ping(&self) -> Result<()> {
        let response = self
            .client
            .get(format!("{}/api/health", self.base_url))
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        decode::<serde_json::Value>(status, &body).map(|_| ())
    }

    pub async fn list(&self) -> Result<Vec<VideoRecord>> {
        let response = self.client.get(self.videos_url()).send().await?;
        let status = response.status();
        let body = response.text().await?;

        let videos: Vec<VideoRecord> = decode(status, &body)?.unwrap_or_default();
        debug!(count = videos.len(), "Fetched catalog");
        Ok(videos)
    }

    /// Returns `None` when the id is unknown.
    pub async fn get(&self, id: &str) -> Result<Option<VideoRecord>> {
        let response = self.client.get(self.video_url(id)).send().await?;
        let status = response.status();
        let body = response.text().await?;

        match decode(status, &body) {
            Ok(video) => Ok(video),
            Err(CatalogClientError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn create(&self, draft: &VideoDraft) -> Result<VideoRecord> {
        let response = self
            .client
            .post(self.videos_url())
            .json(draft)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        require(decode(status, &body)?, status)
    }

    pub async fn update(&self, id: &str, patch: &VideoDraft) -> Result<VideoRecord> {
        let response = self
            .client
            .put(self.video_url(id))
            .json(patch)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        require(decode(status, &body)?, status)
    }

    /// Returns `false` when there was nothing to delete.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let response = self.client.delete(self.video_url(id)).send().await?;
        let status = response.status();
        let body = response.text().await?;

        match decode::<serde_json::Value>(status, &body) {
            Ok(_) => Ok(true),
            Err(CatalogClientError::NotFound) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

fn require<T>(data: Option<T>, status: StatusCode) -> Result<T> {
    data.ok_or_else(|| CatalogClientError::Server {
        status,
        message: "response carried no data".to_string(),
    })
}

/// Unwraps the `{success, data, error}` envelope.
fn decode<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<Option<T>> {
    if status.is_success() {
        let envelope: Envelope<T> = serde_json::from_str(body)?;
        return Ok(envelope.data);
    }

    let messages = serde_json::from_str::<Envelope<serde_json::Value>>(body)
        .ok()
        .and_then(|e| e.error)
        .map(ErrorBody::into_messages)
        .unwrap_or_default();

    Err(match status {
        StatusCode::NOT_FOUND => CatalogClientError::NotFound,
        StatusCode::BAD_REQUEST => CatalogClientError::Validation(messages),
        _ => CatalogClientError::Server {
            status,
            message: if messages.is_empty() {
                body.chars().take(200).collect()
            } else {
                messages.join("; ")
            },
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Category;

    const RECORD: &str = r#"{
        "id": "0190b7a4-0000-7000-8000-000000000001",
        "title": "Demo",
        "description": "desc",
        "videoUrl": "https://x/y.mp4",
        "category": "Cinematic",
        "createdAt": "2026-03-01T10:00:00.000000Z",
        "updatedAt": "2026-03-01T10:00:00.000000Z"
    }"#;

    #[test]
    fn decodes_single_record() {
        let body = format!(r#"{{"success":true,"data":{RECORD}}}"#);
        let video: VideoRecord = decode(StatusCode::OK, &body).unwrap().unwrap();
        assert_eq!(video.title, "Demo");
        assert_eq!(video.category, Category::Cinematic);
    }

    #[test]
    fn decodes_list_with_count() {
        let body = format!(r#"{{"success":true,"count":1,"data":[{RECORD}]}}"#);
        let videos: Vec<VideoRecord> = decode(StatusCode::OK, &body).unwrap().unwrap();
        assert_eq!(videos.len(), 1);
    }

    #[test]
    fn envelope_without_data_decodes_to_none() {
        let body = r#"{"success":true}"#;
        let video: Option<VideoRecord> = decode(StatusCode::OK, body).unwrap();
        assert!(video.is_none());
    }

    #[test]
    fn bad_request_surfaces_messages() {
        let body = r#"{"success":false,"error":["Please add a title"]}"#;
        let err = decode::<VideoRecord>(StatusCode::BAD_REQUEST, body).unwrap_err();
        match err {
            CatalogClientError::Validation(messages) => {
                assert_eq!(messages, vec!["Please add a title"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn not_found_maps_to_variant() {
        let body = r#"{"success":false,"error":"Video not found"}"#;
        assert!(matches!(
            decode::<VideoRecord>(StatusCode::NOT_FOUND, body),
            Err(CatalogClientError::NotFound)
        ));
    }

    #[test]
    fn server_error_keeps_message() {
        let body = r#"{"success":false,"error":"Server Error"}"#;
        match decode::<VideoRecord>(StatusCode::INTERNAL_SERVER_ERROR, body).unwrap_err() {
            CatalogClientError::Server { status, message } => {
                assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
                assert_eq!(message, "Server Error");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn ids_are_escaped_in_paths() {
        let client = CatalogClient::new("http://localhost:3000/").unwrap();
        assert_eq!(
            client.video_url("a/b"),
            "http://localhost:3000/api/videos/a%2Fb"
        );
    }
}
