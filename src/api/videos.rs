use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, Empty};
use crate::domain::VideoId;
use crate::models::{VideoDraft, VideoRecord};

pub async fn list_videos(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<VideoRecord>>>, ApiError> {
    let videos = state.video_service.list_videos().await?;
    Ok(Json(ApiResponse::list(videos)))
}

pub async fn get_video(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<VideoRecord>>, ApiError> {
    let video = state.video_service.get_video(&VideoId::from(id)).await?;
    Ok(Json(ApiResponse::success(video)))
}

pub async fn create_video(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<VideoDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<VideoRecord>>), ApiError> {
    let Json(draft) = payload?;
    let video = state.video_service.create_video(draft).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(video))))
}

pub async fn update_video(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<VideoDraft>, JsonRejection>,
) -> Result<Json<ApiResponse<VideoRecord>>, ApiError> {
    let Json(patch) = payload?;
    let video = state
        .video_service
        .update_video(&VideoId::from(id), patch)
        .await?;
    Ok(Json(ApiResponse::success(video)))
}

pub async fn delete_video(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    state.video_service.delete_video(&VideoId::from(id)).await?;
    Ok(Json(ApiResponse::success(Empty {})))
}
