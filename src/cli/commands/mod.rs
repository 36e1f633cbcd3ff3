mod add;
mod gallery;
mod list;
mod remove;
mod thumbnail;

pub use add::cmd_add_video;
pub use gallery::cmd_gallery;
pub use list::cmd_list_videos;
pub use remove::cmd_remove_video;
pub use thumbnail::cmd_thumbnail;
