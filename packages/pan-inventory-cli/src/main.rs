//! PAN Inventory CLI - hardware and software inventory for Palo Alto Networks
//!
//! This binary can:
//! - Exchange a username and password for an API key and store it
//! - Run one inventory pass over Panorama and its connected firewalls
//! - Print the stored inventory as tables
//! - Show the HA status of the configured management peers

use anyhow::{Context, Result, bail};
use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};
use pan_inventory_core::api::{PanClient, PanClientFactory};
use pan_inventory_core::{
    FailurePolicy, JsonDocumentStore, Poller, auth, build_report, config, enumerator, poller,
};
use std::io::BufRead;

/// Environment variable holding the password for `connect`
const ENV_PASSWORD: &str = "PAN_INVENTORY_PASSWORD";

#[derive(Parser)]
#[command(name = "pan-inventory")]
#[command(version)]
#[command(about = "Hardware and software inventory for Palo Alto Networks firewalls")]
#[command(long_about = "
pan-inventory polls Panorama for its connected firewalls, reads the chassis
components of PA-7000 series firewalls, and keeps a JSON document store of
serial numbers, models and software versions up to date.

Quick start:
  1. Store an API key:  pan-inventory connect --host 10.0.0.10 --username admin
  2. Run a pass:        pan-inventory poll
  3. Show inventory:    pan-inventory report
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for scripting
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate an API key and store it securely
    #[command(alias = "login")]
    Connect {
        /// Management peer to request the key from
        #[arg(long)]
        host: String,

        /// Administrator username (password is read from PAN_INVENTORY_PASSWORD or stdin)
        #[arg(short, long)]
        username: String,
    },

    /// Run one inventory pass
    Poll {
        /// Skip devices that cannot be queried instead of aborting the pass
        #[arg(long)]
        skip_failed: bool,
    },

    /// Show the stored inventory
    Report,

    /// Show the HA status of each management peer
    HaStatus,

    /// Delete the stored API key
    #[command(alias = "logout")]
    Disconnect,

    /// Show configuration paths and settings
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("pan_inventory={},pan_inventory_core={}", log_level, log_level).into()
            }),
        )
        .with_target(false)
        .init();

    match &cli.command {
        Commands::Connect { host, username } => cmd_connect(&cli, host, username).await,
        Commands::Poll { skip_failed } => cmd_poll(&cli, *skip_failed).await,
        Commands::Report => cmd_report(&cli),
        Commands::HaStatus => cmd_ha_status(&cli).await,
        Commands::Disconnect => cmd_disconnect(&cli).await,
        Commands::Config => cmd_config(&cli).await,
    }
}

fn read_password() -> Result<String> {
    if let Ok(password) = std::env::var(ENV_PASSWORD) {
        if !password.is_empty() {
            return Ok(password);
        }
    }

    eprintln!("Password (read from stdin):");
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read password from stdin")?;

    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        bail!("No password given; set {} or pipe it on stdin", ENV_PASSWORD);
    }
    Ok(password)
}

async fn cmd_connect(cli: &Cli, host: &str, username: &str) -> Result<()> {
    let config = config::load_config();
    let password = read_password()?;

    match cli.format {
        OutputFormat::Text => println!("Requesting API key from {}...", host),
        OutputFormat::Json => {}
    }

    let api_key = PanClient::generate_api_key(host, username, &password, &config)
        .await
        .with_context(|| format!("Failed to generate API key on {}", host))?;

    let creds = auth::ApiCredentials::new(host, api_key);
    auth::save_credentials(&creds).await?;

    match cli.format {
        OutputFormat::Text => {
            println!("API key stored ({})", auth::get_credential_storage_info());
            if config.hosts.is_empty() {
                println!();
                println!("No management peers configured yet. Add them to {}", config::get_config_file_path_string());
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::json!({
                "status": "connected",
                "host": creds.host,
                "created_at": creds.created_at,
                "storage_info": auth::get_credential_storage_info(),
            }));
        }
    }

    Ok(())
}

async fn cmd_poll(cli: &Cli, skip_failed: bool) -> Result<()> {
    let config = config::load_config();
    if config.hosts.is_empty() {
        bail!(
            "No management peers configured. Set PAN_INVENTORY_HOSTS or add [panorama] hosts to {}",
            config::get_config_file_path_string()
        );
    }

    let api_key = auth::resolve_api_key(&config).await?;
    let factory = PanClientFactory::new(&config, api_key);
    let store = JsonDocumentStore::open(&config.store_path)
        .with_context(|| format!("Failed to open inventory store {}", config.store_path.display()))?;

    let policy = if skip_failed { FailurePolicy::Skip } else { config.on_device_error };
    tracing::debug!("Device failure policy: {}", policy);

    let mut pass = Poller::from_config(&config, factory, store).with_failure_policy(policy);

    let progress_callback: Option<poller::ProgressCallback> = match cli.format {
        OutputFormat::Text => Some(Box::new(|progress: poller::PollProgress| {
            println!("  [{:>3}] {}", progress.devices_processed, progress.message);
        })),
        OutputFormat::Json => None,
    };

    let summary = pass.run(progress_callback).await?;

    match cli.format {
        OutputFormat::Text => {
            println!();
            println!("Active peer:  {}", summary.active_peer);
            println!("Devices seen: {}", summary.devices_seen);
            println!("Inserted:     {}", summary.inserted);
            println!("Updated:      {}", summary.updated);
            println!("Unchanged:    {}", summary.unchanged);
            println!(
                "Finished:     {}",
                summary.finished_at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
            );
            if !summary.skipped_devices.is_empty() {
                println!();
                println!("Skipped {} devices:", summary.skipped_devices.len());
                for skipped in &summary.skipped_devices {
                    println!("  {:15} {}", skipped.ip_address, skipped.reason);
                }
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}

fn cmd_report(cli: &Cli) -> Result<()> {
    let config = config::load_config();
    let store = JsonDocumentStore::open(&config.store_path)
        .with_context(|| format!("Failed to open inventory store {}", config.store_path.display()))?;
    let report = build_report(&store)?;

    match cli.format {
        OutputFormat::Text => {
            if report.devices.is_empty() {
                println!("Inventory is empty. Run 'pan-inventory poll' first.");
                return Ok(());
            }
            println!("{}", report.device_table());
            if !report.parts.is_empty() {
                println!();
                println!("{}", report.parts_table());
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

async fn cmd_ha_status(cli: &Cli) -> Result<()> {
    let config = config::load_config();
    let api_key = auth::resolve_api_key(&config).await?;
    let factory = PanClientFactory::new(&config, api_key);

    let statuses = enumerator::peer_statuses(&factory, &config.hosts).await;

    match cli.format {
        OutputFormat::Text => {
            if statuses.is_empty() {
                println!("No management peers configured.");
            }
            for (host, status) in &statuses {
                match status {
                    Ok(status) => println!("  {:20} {}", host, status),
                    Err(e) => println!("  {:20} error: {}", host, e),
                }
            }
        }
        OutputFormat::Json => {
            let peers: Vec<_> = statuses
                .iter()
                .map(|(host, status)| match status {
                    Ok(status) => serde_json::json!({ "host": host, "status": status }),
                    Err(e) => serde_json::json!({ "host": host, "error": e.to_string() }),
                })
                .collect();
            println!("{}", serde_json::json!({ "peers": peers }));
        }
    }

    Ok(())
}

async fn cmd_disconnect(cli: &Cli) -> Result<()> {
    let status = auth::credential_status().await?;

    if !status.connected {
        match cli.format {
            OutputFormat::Text => println!("No API key stored."),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({
                    "status": "not_connected",
                }));
            }
        }
        return Ok(());
    }

    auth::delete_credentials().await?;

    match cli.format {
        OutputFormat::Text => {
            println!("Deleted API key for '{}'", status.host.unwrap_or_default());
        }
        OutputFormat::Json => {
            println!("{}", serde_json::json!({
                "status": "disconnected",
                "host": status.host,
            }));
        }
    }

    Ok(())
}

async fn cmd_config(cli: &Cli) -> Result<()> {
    let inventory_config = config::load_config();
    let config_path = config::get_config_file_path_string();
    let credentials = auth::credential_status().await.ok();
    let key_source = match (&inventory_config.api_key, &credentials) {
        (Some(_), _) => "configuration".to_string(),
        (None, Some(status)) if status.connected => {
            format!("stored credentials ({})", status.host.as_deref().unwrap_or("-"))
        }
        _ => "none".to_string(),
    };

    match cli.format {
        OutputFormat::Text => {
            println!("Configuration");
            println!("=============");
            println!();
            println!("Config file:      {}", config_path);
            println!("Peers:            {:?} (from {})", inventory_config.hosts, inventory_config.source);
            println!("API key:          {}", key_source);
            println!("Verify TLS:       {}", inventory_config.verify_tls);
            println!("Timeout:          {}s", inventory_config.timeout.as_secs());
            println!("Store:            {}", inventory_config.store_path.display());
            println!("On device error:  {}", inventory_config.on_device_error);
            println!("Credential store: {}", auth::get_credential_storage_info());
            println!();
            println!("Environment variables:");
            println!("  PAN_INVENTORY_HOSTS    - Comma-separated management peers");
            println!("  PAN_INVENTORY_API_KEY  - API key override");
            println!("  PAN_INVENTORY_STORE    - Inventory store path");
            println!("  PAN_INVENTORY_CONFIG   - Alternative config file");
            println!();
            println!("Example config.toml:");
            println!();
            println!("{}", config::generate_example_config());
        }
        OutputFormat::Json => {
            println!("{}", serde_json::json!({
                "config_file": config_path,
                "hosts": inventory_config.hosts,
                "hosts_source": format!("{}", inventory_config.source),
                "api_key_source": key_source,
                "verify_tls": inventory_config.verify_tls,
                "timeout_secs": inventory_config.timeout.as_secs(),
                "store_path": inventory_config.store_path.display().to_string(),
                "on_device_error": inventory_config.on_device_error.to_string(),
                "credential_storage": auth::get_credential_storage_info(),
            }));
        }
    }

    Ok(())
}
