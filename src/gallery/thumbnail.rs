//! Thumbnail and preview URL derivation for Cloudinary-hosted videos.
//!
//! Cloudinary applies transformations encoded as a path segment placed right
//! after `upload`, e.g.
//! `https://res.cloudinary.com/demo/video/upload/w_400,h_300,c_fill/v1/reel`.
//! Any other URL shape yields no derived thumbnail.

use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;
use url::Url;

use super::connection::ConnectionQuality;

/// What a gallery item shows before its video plays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "url", rename_all = "lowercase")]
pub enum Thumbnail {
    /// Supplied alongside the record.
    Explicit(String),
    /// Generated from the video URL.
    Derived(String),
    /// Nothing derivable, or the image failed to load.
    Placeholder,
}

impl Thumbnail {
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Explicit(url) | Self::Derived(url) => Some(url),
            Self::Placeholder => None,
        }
    }
}

/// One Cloudinary transformation segment.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub crop: Option<&'static str>,
    pub quality: Option<&'static str>,
    pub format: Option<&'static str>,
    pub bitrate: Option<&'static str>,
    /// Seconds into the video the frame is taken from
    pub start_offset: Option<f32>,
}

impl Transform {
    /// Still frame one second in, small and fast to decode.
    pub const THUMBNAIL: Self = Self {
        width: Some(400),
        height: Some(300),
        crop: Some("fill"),
        quality: Some("auto:fast"),
        format: Some("webp"),
        bitrate: None,
        start_offset: Some(1.0),
    };

    /// Hover preview clip sized for the given link.
    #[must_use]
    pub const fn preview(quality: ConnectionQuality) -> Self {
        let (width, height, q, bitrate) = match quality {
            ConnectionQuality::Low => (320, 180, "auto:low", "150k"),
            ConnectionQuality::Medium => (480, 320, "auto:good", "300k"),
            ConnectionQuality::High => (640, 360, "auto:best", "600k"),
        };

        Self {
            width: Some(width),
            height: Some(height),
            crop: Some("fill"),
            quality: Some(q),
            format: Some("mp4"),
            bitrate: Some(bitrate),
            start_offset: None,
        }
    }

    /// Renders the comma-separated segment, e.g. `w_400,h_300,c_fill`.
    #[must_use]
    pub fn segment(&self) -> String {
        let mut parts = Vec::with_capacity(7);

        if let Some(w) = self.width {
            parts.push(format!("w_{w}"));
        }
        if let Some(h) = self.height {
            parts.push(format!("h_{h}"));
        }
        if let Some(c) = self.crop {
            parts.push(format!("c_{c}"));
        }
        if let Some(q) = self.quality {
            parts.push(format!("q_{q}"));
        }
        if let Some(f) = self.format {
            parts.push(format!("f_{f}"));
        }
        if let Some(br) = self.bitrate {
            parts.push(format!("br_{br}"));
        }
        if let Some(so) = self.start_offset.filter(|so| so.is_finite() && *so > 0.0) {
            parts.push(format!("so_{so}"));
        }

        parts.join(",")
    }
}

fn extension_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\.[^/.]+$").expect("Invalid regex"))
}

/// Inserts `transform` after the `upload` segment of a Cloudinary URL.
///
/// Returns `None` when the URL is not a recognizable Cloudinary delivery URL.
/// Folder and version segments are kept; the extension of the final segment is
/// dropped so the `f_` parameter decides the output format.
#[must_use]
pub fn apply_transform(video_url: &str, transform: &Transform) -> Option<String> {
    let mut url = Url::parse(video_url.trim()).ok()?;

    let host = url.host_str()?;
    if !(host == "cloudinary.com" || host.ends_with(".cloudinary.com")) {
        return None;
    }

    let segments: Vec<String> = url.path_segments()?.map(String::from).collect();
    let upload = segments.iter().position(|s| s == "upload")?;

    let (public_id, folders) = segments[upload + 1..].split_last()?;
    let public_id = extension_regex().replace(public_id, "");
    if public_id.is_empty() {
        return None;
    }

    let segment = transform.segment();
    let mut path: Vec<&str> = segments[..=upload].iter().map(String::as_str).collect();
    if !segment.is_empty() {
        path.push(&segment);
    }
    path.extend(folders.iter().map(String::as_str));
    path.push(&public_id);

    url.set_path(&format!("/{}", path.join("/")));
    url.set_query(None);
    url.set_fragment(None);
    Some(url.into())
}

/// Picks the thumbnail for an item: the explicit one if any, else a derived
/// frame, else the placeholder.
#[must_use]
pub fn thumbnail_for(video_url: &str, explicit: Option<&str>) -> Thumbnail {
    if let Some(explicit) = explicit.map(str::trim).filter(|t| !t.is_empty()) {
        return Thumbnail::Explicit(explicit.to_string());
    }

    apply_transform(video_url, &Transform::THUMBNAIL).map_or(Thumbnail::Placeholder, Thumbnail::Derived)
}

/// Source to play on hover. Non-Cloudinary URLs are played as they are.
#[must_use]
pub fn preview_source(video_url: &str, quality: ConnectionQuality) -> String {
    apply_transform(video_url, &Transform::preview(quality)).unwrap_or_else(|| video_url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const REEL: &str = "https://res.cloudinary.com/demo/video/upload/v1712/portfolio/reel.mp4";

    #[test]
    fn thumbnail_segment_matches_expected_parameters() {
        assert_eq!(
            Transform::THUMBNAIL.segment(),
            "w_400,h_300,c_fill,q_auto:fast,f_webp,so_1"
        );
    }

    #[test]
    fn derives_thumbnail_after_upload_segment() {
        assert_eq!(
            thumbnail_for(REEL, None),
            Thumbnail::Derived(
                "https://res.cloudinary.com/demo/video/upload/w_400,h_300,c_fill,q_auto:fast,f_webp,so_1/v1712/portfolio/reel"
                    .to_string()
            )
        );
    }

    #[test]
    fn explicit_thumbnail_wins() {
        assert_eq!(
            thumbnail_for(REEL, Some("https://img.example/t.jpg")),
            Thumbnail::Explicit("https://img.example/t.jpg".to_string())
        );
    }

    #[test]
    fn unrecognized_urls_get_placeholder() {
        assert_eq!(thumbnail_for("https://x/y.mp4", None), Thumbnail::Placeholder);
        assert_eq!(
            thumbnail_for("https://res.cloudinary.com/demo/video/reel.mp4", None),
            Thumbnail::Placeholder
        );
        assert_eq!(
            thumbnail_for("https://res.cloudinary.com/demo/video/upload/", None),
            Thumbnail::Placeholder
        );
        assert_eq!(thumbnail_for("not a url", None), Thumbnail::Placeholder);
        assert_eq!(
            thumbnail_for("https://evilcloudinary.com/x/upload/a.mp4", None),
            Thumbnail::Placeholder
        );
    }

    #[test]
    fn preview_bitrate_follows_connection_quality() {
        let low = preview_source(REEL, ConnectionQuality::Low);
        let high = preview_source(REEL, ConnectionQuality::High);
        assert!(low.contains("w_320,h_180,c_fill,q_auto:low,f_mp4,br_150k"));
        assert!(high.contains("br_600k"));
    }

    #[test]
    fn preview_of_foreign_url_is_unchanged() {
        assert_eq!(
            preview_source("https://x/y.mp4", ConnectionQuality::High),
            "https://x/y.mp4"
        );
    }
}
