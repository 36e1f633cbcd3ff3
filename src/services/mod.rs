pub mod video_service;
pub use video_service::{VideoError, VideoService};

pub mod video_service_impl;
pub use video_service_impl::SeaOrmVideoService;
