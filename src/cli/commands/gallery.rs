use crate::clients::CatalogClient;
use crate::config::Config;
use crate::gallery::{ConnectionQuality, Gallery, Thumbnail};

pub async fn cmd_gallery(config: &Config, server: &str) -> anyhow::Result<()> {
    let client = CatalogClient::new(server)?;

    let quality = ConnectionQuality::estimate(client.ping()).await;
    let videos = client.list().await?;

    if videos.is_empty() {
        println!("No videos at {server}.");
        return Ok(());
    }

    let gallery = Gallery::from_records(&videos, config.gallery.clone(), quality);

    println!(
        "Gallery ({} videos, {} connection, {})",
        gallery.len(),
        quality,
        if gallery.is_muted() { "muted" } else { "sound on" }
    );
    println!("{:-<70}", "");

    for item in gallery.render() {
        println!("• {} [{}]", item.title, item.category);
        match &item.thumbnail {
            Thumbnail::Placeholder => println!("  Thumbnail: placeholder"),
            thumb => println!("  Thumbnail: {}", thumb.url().unwrap_or_default()),
        }
        println!("  Preview:   {}", item.source);
    }

    Ok(())
}
