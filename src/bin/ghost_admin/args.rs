//! Command-line surface for `ghost-admin`.

#![deny(clippy::all, clippy::pedantic)]

use std::path::PathBuf;

use clap::{Parser, Subcommand, builder::BoolishValueParser};
use ghost_admin::config::Overrides;

/// Post copied when no subcommand is given.
pub const PLACEHOLDER_POST_ID: &str = "xxxxxxxxxxxxxxxxxxxxxxxx";

/// Environment variable holding the admin API key `<id>:<secret>`. There is no
/// flag or positional for it so the key never lands in shell history.
pub const ADMIN_KEY_ENV: &str = "ADMIN_KEY";

#[derive(Parser, Debug)]
#[command(
    name = "ghost-admin",
    version,
    about = "Ghost admin API client",
    long_about = None,
    after_help = "The admin API key is read from the ADMIN_KEY environment variable or --key-file."
)]
pub struct Cli {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "GHOST_ADMIN_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    /// Site URL, e.g. <https://blog.example.com>
    #[arg(long, env = "ADMIN_URL")]
    pub url: Option<String>,

    /// Path to file containing the admin API key (takes precedence over env)
    #[arg(long, env = "ADMIN_KEY_FILE")]
    pub key_file: Option<PathBuf>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        let preserved_email = match &self.command {
            Some(Commands::Members(MembersArgs {
                action: MembersCmd::Cleanup { preserve },
            })) => preserve.clone(),
            _ => None,
        };

        Overrides {
            config_file: self.config_file.clone(),
            url: self.url.clone(),
            api_key: api_key_from_env(),
            key_file: self.key_file.clone(),
            preserved_email,
            log_level: self.log_level.clone(),
            log_json: self.log_json,
        }
    }

    /// The command to run; copying the placeholder post when none was given.
    pub fn command_or_default(&self) -> Commands {
        self.command.clone().unwrap_or_else(|| {
            Commands::Posts(PostsArgs {
                action: PostsCmd::Copy {
                    id: PLACEHOLDER_POST_ID.to_string(),
                },
            })
        })
    }
}

fn api_key_from_env() -> Option<String> {
    std::env::var(ADMIN_KEY_ENV)
        .ok()
        .filter(|key| !key.trim().is_empty())
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Member management (list/delete/cleanup)
    Members(MembersArgs),
    /// Post management (list/get/copy/update)
    Posts(PostsArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct MembersArgs {
    #[command(subcommand)]
    pub action: MembersCmd,
}

#[derive(Subcommand, Debug, Clone)]
pub enum MembersCmd {
    /// List the first page of members (up to 100)
    List,
    /// Delete a single member
    Delete {
        id: String,
        /// Email used in progress output
        #[arg(long)]
        email: String,
    },
    /// Delete every member except the preserved address
    Cleanup {
        /// Address to keep (case-insensitive); defaults to the configured one
        #[arg(long)]
        preserve: Option<String>,
    },
}

#[derive(Parser, Debug, Clone)]
pub struct PostsArgs {
    #[command(subcommand)]
    pub action: PostsCmd,
}

#[derive(Subcommand, Debug, Clone)]
pub enum PostsCmd {
    /// List the first page of posts (up to 100)
    List,
    /// Get a post by id
    Get { id: String },
    /// Duplicate a post server-side
    Copy {
        #[arg(default_value = PLACEHOLDER_POST_ID)]
        id: String,
    },
    /// Update fields of a post from a JSON object
    Update {
        id: String,
        /// Inline JSON object with the fields to update
        #[arg(long, conflicts_with = "data_file")]
        data: Option<String>,
        /// File containing the JSON object
        #[arg(long)]
        data_file: Option<PathBuf>,
    },
}
