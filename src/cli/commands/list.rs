//! List videos command handler

use crate::config::Config;
use crate::db::Store;

pub async fn cmd_list_videos(config: &Config) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let videos = store.list_videos().await?;

    if videos.is_empty() {
        println!("The catalog is empty.");
        println!();
        println!("Add a video with: showreel add \"Title\" https://example.com/reel.mp4");
        return Ok(());
    }

    println!("Videos ({} total)", videos.len());
    println!("{:-<70}", "");

    for video in videos {
        println!("• {} [{}]", video.title, video.category);
        println!("  ID: {} | Added: {}", video.id, video.created_at);
        println!("  {}", video.video_url);
    }

    Ok(())
}
