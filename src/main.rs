mod cli;
mod display;

use std::collections::HashMap;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command};
use supaenv::config::{self, ANON_KEY_VAR, ConfigError, URL_VAR};
use supaenv::{SupabaseClient, SupabaseConfig, global};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = resolve_config(&cli)?;
    if logs_config_warnings(&cli.command) {
        for warning in config.warnings() {
            warn!("{}", warning);
        }
    }
    let client = global::init_with(config).context("failed to initialize Supabase client")?;

    match cli.command {
        Command::Check => cmd_check(client),
        Command::Endpoints => cmd_endpoints(client),
        Command::Health => cmd_health(client).await?,
        Command::Select {
            table,
            columns,
            limit,
        } => cmd_select(client, &table, &columns, limit).await?,
    }

    Ok(())
}

/// `check` prints warnings in its report.
fn logs_config_warnings(command: &Command) -> bool {
    !matches!(command, Command::Check)
}

/// Precedence: `--url`/`--anon-key`, then `--env-file`, then the process
/// environment (hydrated from `./.env` when no env file is given).
fn resolve_config(cli: &Cli) -> Result<SupabaseConfig> {
    let file_vars = match &cli.env_file {
        Some(path) => {
            debug!(path = %path.display(), "reading settings from env file");
            config::read_env_file(path)
                .with_context(|| format!("failed to read {}", path.display()))?
        }
        None => {
            if let Err(e) = config::hydrate_env_file() {
                warn!("ignoring .env: {}", e);
            }
            HashMap::new()
        }
    };

    let config = SupabaseConfig::from_lookup(|name| {
        let flag = match name {
            URL_VAR => cli.url.clone(),
            ANON_KEY_VAR => cli.anon_key.clone(),
            _ => None,
        };
        flag.filter(|v| !v.trim().is_empty())
            .or_else(|| file_vars.get(name).cloned())
            .or_else(|| std::env::var(name).ok())
    })
    .map_err(|e| match e {
        ConfigError::MissingVar { key } => anyhow::anyhow!(
            "missing {} (set it in the environment, ./.env, --env-file, or pass --{})",
            key,
            if key == URL_VAR { "url" } else { "anon-key" }
        ),
        other => other.into(),
    })?;

    Ok(config)
}

fn cmd_check(client: &SupabaseClient) {
    let warnings = client.config().warnings();
    for line in display::check_report(client, &warnings) {
        println!("{}", line);
    }
}

fn cmd_endpoints(client: &SupabaseClient) {
    for line in display::endpoint_lines(client) {
        println!("{}", line);
    }
}

async fn cmd_health(client: &SupabaseClient) -> Result<()> {
    let status = client.health().await?;
    println!(
        "{} {} - {}",
        status.name.as_deref().unwrap_or("auth"),
        status.version.as_deref().unwrap_or("(unknown version)"),
        status.description.as_deref().unwrap_or("healthy"),
    );
    Ok(())
}

async fn cmd_select(
    client: &SupabaseClient,
    table: &str,
    columns: &str,
    limit: Option<u32>,
) -> Result<()> {
    let rows = client.select(table, columns, limit).await?;
    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}
