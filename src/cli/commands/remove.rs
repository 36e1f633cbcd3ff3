use crate::config::Config;
use crate::db::Store;
use crate::domain::VideoId;

pub async fn cmd_remove_video(config: &Config, id_str: &str, yes: bool) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let id = VideoId::from(id_str.trim());

    let Some(video) = store.get_video(&id).await? else {
        println!("Video with ID {id} not found.");
        println!("Use 'showreel list' to see video IDs.");
        return Ok(());
    };

    if !yes {
        println!("Remove '{}' (ID: {})?", video.title, video.id);
        println!("Enter 'y' to confirm, anything else to cancel:");

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Cancelled.");
            return Ok(());
        }
    }

    if store.delete_video(&id).await? {
        println!("✓ Removed: {}", video.title);
    } else {
        println!("Video was already removed.");
    }

    Ok(())
}
