use std::process::ExitCode;

use clap::Parser;
use env_logger::{Builder, Target};
use log::LevelFilter;
use moviebites_client::ApiError;
use serde_json::Value;

mod cli;
mod commands;

use cli::Cli;
use commands::CommandContext;

const WORKSPACE_MODULES: [&str; 4] = [
    "moviebites",
    "moviebites_client",
    "moviebites_config",
    "moviebites_model",
];

/// Workspace crates log at info (debug with `-v`), everything else at warn.
/// `RUST_LOG` directives are applied last and override both.
fn logger_builder(verbose: bool, rust_log: Option<&str>) -> Builder {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let mut builder = Builder::new();
    builder.target(Target::Stderr).filter_level(LevelFilter::Warn);
    for module in WORKSPACE_MODULES {
        builder.filter_module(module, level);
    }
    if let Some(filters) = rust_log {
        builder.parse_filters(filters);
    }
    builder
}

fn init_logger(verbose: bool) {
    let rust_log = std::env::var("RUST_LOG").ok();
    logger_builder(verbose, rust_log.as_deref()).init();
}

fn render(value: &Value, compact: bool) -> String {
    let rendered = if compact {
        serde_json::to_string(value)
    } else {
        serde_json::to_string_pretty(value)
    };
    rendered.unwrap_or_else(|_| value.to_string())
}

async fn execute(cli: Cli) -> anyhow::Result<Value> {
    let ctx = CommandContext::from_cli(&cli).await?;
    commands::run(&ctx, cli.command).await
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    let compact = cli.compact;
    match execute(cli).await {
        Ok(payload) => {
            println!("{}", render(&payload, compact));
            ExitCode::SUCCESS
        }
        Err(err) => {
            match err.downcast_ref::<ApiError>() {
                Some(api_error) => {
                    eprintln!("Error: {}", api_error.message());
                    eprintln!("{}", render(&api_error.to_value(), compact));
                }
                None => eprintln!("Error: {err:#}"),
            }
            ExitCode::FAILURE
        }
    }
}
