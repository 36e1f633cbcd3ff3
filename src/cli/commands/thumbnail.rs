use crate::gallery::{ConnectionQuality, Thumbnail, preview_source, thumbnail_for};

pub fn cmd_thumbnail(url: &str, quality: ConnectionQuality) {
    match thumbnail_for(url, None) {
        Thumbnail::Placeholder => println!("Thumbnail: (placeholder, not a Cloudinary upload URL)"),
        thumb => println!("Thumbnail: {}", thumb.url().unwrap_or_default()),
    }
    println!("Preview ({quality}): {}", preview_source(url, quality));
}
