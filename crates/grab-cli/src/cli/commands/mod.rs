//! CLI command handlers, one file per subcommand.

mod add;
mod checksum;
mod delete;
mod download;
mod list;

pub use add::run_add;
pub use checksum::run_checksum;
pub use delete::run_delete;
pub use download::{run_download, DownloadArgs};
pub use list::run_list;
