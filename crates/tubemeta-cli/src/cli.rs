use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tubemeta_core::{ItemInfo, ItemKind, PROVIDER_ID_KEY};

#[derive(Parser, Debug)]
#[command(
    name = "tubemeta",
    about = "Resolve YouTube metadata for media files named like `Title [videoId].mp4`",
    long_about = None,
    version,
    arg_required_else_help = true,
)]
pub struct Cli {
    /// Path to the JSON config file [default: <config dir>/tubemeta/config.json]
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// YouTube Data API key (overrides the config file)
    #[arg(long, env = "TUBEMETA_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Directory holding the `youtubemetadata` record cache (overrides the config file)
    #[arg(long, value_name = "DIR", global = true)]
    pub cache_root: Option<PathBuf>,

    /// Skip the pause before each remote call
    #[arg(long, global = true)]
    pub no_delay: bool,

    /// Show debug output on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Do not write a log file
    #[arg(long, global = true)]
    pub no_log_file: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the identifier embedded in a name and the state of its cache entry
    Id {
        /// File or folder name, e.g. "Never Gonna Give You Up [dQw4w9WgXcQ].mp4"
        name: String,
    },
    /// Resolve metadata for a library item and print it as JSON
    Metadata(ItemArgs),
    /// Resolve images for a library item and print them as JSON
    Images(ItemArgs),
}

#[derive(Args, Debug)]
pub struct ItemArgs {
    /// Kind of library item: video, music-video, season, series or person
    #[arg(short, long, default_value = "video")]
    pub kind: ItemKind,

    /// Display name of the item
    pub name: String,

    /// Path of the item's file or folder
    #[arg(short, long)]
    pub path: Option<PathBuf>,

    /// Channel id stored on a person item
    #[arg(long, value_name = "CHANNEL_ID")]
    pub channel_id: Option<String>,
}

impl ItemArgs {
    pub fn to_item(&self) -> ItemInfo {
        let mut item = ItemInfo::new(self.kind, self.name.clone());
        if let Some(path) = &self.path {
            item = item.with_path(path.clone());
        }
        if let Some(channel_id) = &self.channel_id {
            item = item.with_provider_id(PROVIDER_ID_KEY, channel_id.clone());
        }
        item
    }
}
