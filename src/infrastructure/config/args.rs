//! Command line interface.

use super::app_config::LogLevel;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Global options and the command to run.
#[derive(Debug, Parser)]
#[command(
    name = "booru-view",
    version,
    about = "Browse image-board posts, tags and comments from the terminal",
    long_about = None
)]
pub struct CliArgs {
    /// Configuration file path.
    #[arg(short, long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[arg(long, value_name = "PATH", global = true)]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[arg(long, value_enum, global = true)]
    pub log_level: Option<LogLevel>,

    /// Content host base URL.
    #[arg(long, value_name = "URL", global = true)]
    pub base_url: Option<String>,

    /// Keep retrying while the host is unreachable.
    #[arg(long, global = true)]
    pub wait_for_connectivity: Option<bool>,

    /// Posts per page.
    #[arg(long, global = true)]
    pub page_size: Option<u32>,

    /// Command to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List posts, newest first, optionally filtered by tags.
    Posts {
        /// Tag query, e.g. "cat_ears rating:g".
        #[arg(short, long)]
        tags: Option<String>,
        /// Page number, starting at 1.
        #[arg(short, long, default_value_t = 1)]
        page: u32,
        /// Posts per page; overrides the configured page size.
        #[arg(short, long)]
        limit: Option<u32>,
    },
    /// Show a single post.
    Post {
        /// Post id.
        id: i64,
    },
    /// Complete a tag prefix.
    Tags {
        /// Tag name prefix.
        prefix: String,
        /// Maximum results.
        #[arg(short, long, default_value_t = 10)]
        limit: u32,
    },
    /// List comments on a post.
    Comments {
        /// Post id.
        post_id: i64,
        /// Maximum results.
        #[arg(short, long, default_value_t = 20)]
        limit: u32,
    },
    /// Post a comment.
    Comment {
        /// Post id.
        post_id: i64,
        /// Comment text.
        body: String,
    },
    /// Verify and store credentials.
    Login {
        /// Account name.
        #[arg(short, long, env = "BOORU_USERNAME")]
        username: String,
        /// API key from the account settings page.
        #[arg(short = 'k', long, env = "BOORU_API_KEY", hide_env_values = true)]
        api_key: String,
    },
    /// Forget stored credentials.
    Logout,
    /// Show the authenticated account.
    Whoami,
    /// Add a post to favorites.
    Favorite {
        /// Post id.
        id: i64,
    },
    /// Remove a post from favorites.
    Unfavorite {
        /// Post id.
        id: i64,
    },
    /// Vote on a post.
    Vote {
        /// Post id.
        id: i64,
        /// Score, 1 or -1.
        #[arg(allow_negative_numbers = true)]
        score: i32,
    },
    /// Resolve a post's best image and write it as PNG.
    FetchImage {
        /// Post id.
        post_id: i64,
        /// Output path; defaults to `<post_id>.png`.
        #[arg(short, long, value_name = "PATH")]
        out: Option<PathBuf>,
    },
    /// Inspect or manage the image disk cache.
    Cache {
        /// Cache operation.
        #[command(subcommand)]
        action: CacheAction,
    },
    /// Show recent and saved searches.
    History {
        /// Suggest entries fuzzily matching this text.
        #[arg(short, long)]
        suggest: Option<String>,
    },
}

/// Disk cache operations.
#[derive(Debug, Clone, Copy, Subcommand)]
pub enum CacheAction {
    /// Print disk usage and limit.
    Usage,
    /// Remove every cached image.
    Clear,
    /// Change the disk cache limit.
    Limit {
        /// New limit in megabytes.
        megabytes: u64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_posts_command() {
        let args = CliArgs::parse_from(["booru-view", "posts", "--tags", "blue_sky", "-p", "2"]);
        match args.command {
            Command::Posts { tags, page, limit } => {
                assert_eq!(tags.as_deref(), Some("blue_sky"));
                assert_eq!(page, 2);
                assert_eq!(limit, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_negative_vote() {
        let args = CliArgs::parse_from(["booru-view", "vote", "42", "-1"]);
        assert!(matches!(args.command, Command::Vote { id: 42, score: -1 }));
    }

    #[test]
    fn test_parse_cache_limit() {
        let args = CliArgs::parse_from(["booru-view", "cache", "limit", "150"]);
        assert!(matches!(
            args.command,
            Command::Cache {
                action: CacheAction::Limit { megabytes: 150 }
            }
        ));
    }
}
