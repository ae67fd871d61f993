//! FreightDesk CLI - Main entry point

mod commands;
mod init;

use clap::{Parser, Subcommand};
use freight_access::{store_from_config, SyncOptions};
use freight_foundation::{FreightConfig, PermissionCatalog, PermissionKind, Role};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// FreightDesk - role permission templates and menu sync
#[derive(Parser, Debug)]
#[command(name = "freight")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Backend base URL (overrides env and config)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Local role templates file (uses the file store instead of the backend)
    #[arg(long, global = true)]
    templates: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the built-in permission catalog
    Catalog {
        /// Only menus or only functions
        #[arg(long, value_parser = parse_kind)]
        kind: Option<PermissionKind>,
    },
    /// Check whether a role can access a permission key (every catalog key without --key)
    Check {
        #[arg(long)]
        role: Role,
        #[arg(long)]
        key: Option<String>,
        /// Evaluate inside a project-scoped session
        #[arg(long)]
        project: Option<String>,
    },
    /// Add catalog keys missing from stored role templates
    Sync {
        /// Show what would change without writing
        #[arg(long)]
        dry_run: bool,
    },
    /// List stored role templates
    Roles,
    /// Create .freightdesk/ with a local templates file seeded from the catalog
    Init {
        /// Overwrite an existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

fn parse_kind(s: &str) -> Result<PermissionKind, String> {
    match s.trim().to_lowercase().as_str() {
        "menu" | "menus" => Ok(PermissionKind::Menu),
        "function" | "functions" | "fn" => Ok(PermissionKind::Function),
        other => Err(format!("unknown kind '{}', expected menu or function", other)),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.debug { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(io::stderr))
        .init();

    let catalog = PermissionCatalog::builtin();
    let mut out = io::stdout().lock();

    match args.command {
        Command::Init { force } => init::init_project(&catalog, force, &mut out).await?,
        Command::Catalog { kind } => commands::catalog(&catalog, kind, &mut out)?,
        Command::Check { role, key, project } => {
            let config = load_config(args.base_url, args.templates);
            let store = store_from_config(&config)?;
            match key {
                Some(key) => {
                    commands::check(store.as_ref(), &catalog, role, &key, project, &mut out).await?
                }
                None => commands::check_all(store.as_ref(), &catalog, role, project, &mut out).await?,
            }
        }
        Command::Sync { dry_run } => {
            let config = load_config(args.base_url, args.templates);
            let store = store_from_config(&config)?;
            let options = SyncOptions::from(&config.sync);
            commands::sync(store, catalog, options, dry_run, &mut out).await?;
        }
        Command::Roles => {
            let config = load_config(args.base_url, args.templates);
            let store = store_from_config(&config)?;
            commands::roles(store.as_ref(), &mut out).await?;
        }
    }

    Ok(())
}

/// 설정 로드 + 명령행 덮어쓰기
fn load_config(base_url: Option<String>, templates: Option<PathBuf>) -> FreightConfig {
    let mut config = FreightConfig::load().unwrap_or_else(|e| {
        eprintln!("Warning: Failed to load config: {}", e);
        FreightConfig::new()
    });
    if let Some(url) = base_url {
        config.backend.base_url = Some(url);
    }
    if let Some(path) = templates {
        config.templates_file = Some(path);
    }
    config
}
