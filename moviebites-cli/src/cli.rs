use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serde_json::Value;

#[derive(Debug, Parser)]
#[command(
    name = "moviebites",
    version,
    about = "Talk to the MovieBites streaming API from the terminal"
)]
pub struct Cli {
    /// Explicit TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Load variables from this .env file instead of ./.env
    #[arg(long, global = true)]
    pub env_file: Option<PathBuf>,

    /// Do not read any .env file
    #[arg(long, global = true)]
    pub no_env_file: bool,

    /// Override the API base URL
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Print responses on a single line
    #[arg(long, global = true)]
    pub compact: bool,

    /// Raise log output to debug
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Browse and manage webseries
    Webseries {
        #[command(subcommand)]
        action: WebseriesAction,
    },
    /// Browse and manage categories
    Categories {
        #[command(subcommand)]
        action: CategoriesAction,
    },
    /// Favorite or unfavorite a webseries
    Favorites {
        #[command(subcommand)]
        action: ReactionAction,
    },
    /// Like or unlike a webseries
    Likes {
        #[command(subcommand)]
        action: ReactionAction,
    },
    /// Per-user listings
    Users {
        #[command(subcommand)]
        action: UsersAction,
    },
    /// Create or update the mobile user and sign in as it
    Upsert(UpsertArgs),
    /// Sign in with existing credentials
    Login(LoginArgs),
    /// Forget the signed-in user; the device id is kept
    Logout,
    /// Show the identity the next request will carry
    Whoami,
}

#[derive(Debug, Args)]
pub struct PageArgs {
    #[arg(long)]
    pub page: Option<u32>,
    #[arg(long)]
    pub limit: Option<u32>,
    /// Extra query filter, repeatable
    #[arg(long = "filter", value_name = "KEY=VALUE", value_parser = parse_key_val)]
    pub filters: Vec<(String, String)>,
}

#[derive(Debug, Subcommand)]
pub enum WebseriesAction {
    /// List webseries page by page
    List(PageArgs),
    /// Fetch one webseries by id
    Get { id: String },
    /// Fetch one webseries by slug
    Slug { slug: String },
    /// Full-text search
    Search {
        query: String,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Create a webseries from a JSON object
    Create {
        #[arg(value_parser = parse_json)]
        data: Value,
    },
    /// Update a webseries from a JSON object
    Update {
        id: String,
        #[arg(value_parser = parse_json)]
        data: Value,
    },
    /// Delete a webseries
    Delete { id: String },
}

#[derive(Debug, Subcommand)]
pub enum CategoriesAction {
    /// List categories
    List(PageArgs),
    /// Search categories by name
    Search {
        query: String,
        #[command(flatten)]
        page: PageArgs,
    },
    /// Fetch one category
    Get { id: String },
    /// Create a category from a JSON object
    Create {
        #[arg(value_parser = parse_json)]
        data: Value,
    },
    /// Update a category from a JSON object
    Update {
        id: String,
        #[arg(value_parser = parse_json)]
        data: Value,
    },
    /// Delete a category
    Delete { id: String },
}

#[derive(Debug, Subcommand)]
pub enum ReactionAction {
    /// Whether the signed-in user reacted
    Check {
        webseries_id: String,
        #[arg(long)]
        episode: Option<u32>,
    },
    /// Add the reaction
    Add {
        webseries_id: String,
        #[arg(long)]
        episode: Option<u32>,
    },
    /// Remove the reaction
    Remove {
        webseries_id: String,
        #[arg(long)]
        episode: Option<u32>,
    },
    /// Total reactions on a webseries
    Count { webseries_id: String },
}

#[derive(Debug, Subcommand)]
pub enum UsersAction {
    /// Webseries liked under the current identity
    Likes {
        #[arg(long)]
        include_episodes: bool,
        #[arg(long)]
        episode_id: Option<String>,
        #[arg(long)]
        episode_number: Option<u32>,
    },
}

#[derive(Debug, Args)]
pub struct UpsertArgs {
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub password: Option<String>,
    /// Identifier issued by a social sign-in provider
    #[arg(long)]
    pub social_id: Option<String>,
}

#[derive(Debug, Args)]
pub struct LoginArgs {
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub password: Option<String>,
    #[arg(long)]
    pub social_id: Option<String>,
}

fn parse_json(raw: &str) -> Result<Value, String> {
    serde_json::from_str(raw).map_err(|err| format!("invalid JSON: {err}"))
}

fn parse_key_val(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => {
            Ok((key.to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got `{raw}`")),
    }
}
