use crate::config::Config;
use crate::db::Store;
use crate::models::VideoDraft;
use crate::services::{SeaOrmVideoService, VideoError, VideoService};

pub async fn cmd_add_video(
    config: &Config,
    title: &str,
    url: &str,
    description: Option<&str>,
    category: Option<&str>,
) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let service = SeaOrmVideoService::new(store);

    let draft = VideoDraft {
        title: Some(title.to_string()),
        // The CLI lets the description default to the title
        description: Some(description.unwrap_or(title).to_string()),
        video_url: Some(url.to_string()),
        category: category.map(String::from),
    };

    match service.create_video(draft).await {
        Ok(video) => {
            println!("✓ Added: {} [{}]", video.title, video.category);
            println!("  ID: {}", video.id);
            Ok(())
        }
        Err(VideoError::Validation(errors)) => {
            println!("Could not add video:");
            for message in errors.messages() {
                println!("  - {message}");
            }
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
