pub mod video;

pub use video::{FieldError, FieldErrors, ValidVideo, VideoDraft, VideoRecord};
