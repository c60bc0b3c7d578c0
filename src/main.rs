//! browser-compat - browser compatibility evaluator
//!
//! Entry point for the CLI binary. Evaluates a browser profile with the
//! compatibility engine and prints the resulting report.

use std::path::Path;

use anyhow::{Context, Result};
use browser_compat::{
    capabilities::{run_diagnostics, CompatibilityManager},
    config::{default_config_path, Config, LoggingConfig},
    host::{EnvironmentProfile, MemoryPage, Page, StaticEnvironment},
};
use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for browser-compat
#[derive(Parser, Debug)]
#[command(name = "browser-compat")]
#[command(version, about = "Browser capability detection and progressive enhancement", long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, env = "BROWSER_COMPAT_CONFIG")]
    pub config: Option<String>,

    /// Browser profile (TOML) to evaluate; defaults to a fully modern browser
    #[arg(short, long)]
    pub profile: Option<String>,

    /// Override the profile's user-agent string
    #[arg(short, long)]
    pub user_agent: Option<String>,

    /// Output format (text|json)
    #[arg(long, default_value = "text")]
    pub format: String,

    /// Print the full diagnostic report
    #[arg(long)]
    pub diagnose: bool,

    /// Verbose logging (can be specified multiple times)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Log format (json|pretty|compact)
    #[arg(long)]
    pub log_format: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| default_config_path().display().to_string());

    // Silently fall back to defaults if the default config doesn't exist yet
    let config = if Path::new(&config_path).exists() || args.config.is_some() {
        Config::load(&config_path)?
    } else {
        Config::default_config()
    };
    let config = config.with_overrides(args.verbose, args.log_format.clone());
    config.validate()?;

    init_logging(&config.logging)?;

    info!("browser-compat v{}", env!("CARGO_PKG_VERSION"));
    debug!(
        "Built: {} (commit {})",
        option_env!("BUILD_DATE").unwrap_or("unknown"),
        option_env!("GIT_HASH").unwrap_or("unknown")
    );
    debug!("Config: {:?}", config);

    let profile = match &args.profile {
        Some(path) => EnvironmentProfile::load(path)?,
        None => EnvironmentProfile::default(),
    };
    let mut env = StaticEnvironment::from_profile(profile);
    if let Some(ua) = &args.user_agent {
        env = env.with_user_agent(ua.clone());
    }

    let mut page = MemoryPage::new();
    let mut manager = CompatibilityManager::new(config.cache.clone());
    let report = manager.init(&env, &mut page).await;

    match args.format.as_str() {
        "json" => {
            let json = manager.to_json().context("Failed to serialize report")?;
            println!("{json}");
        }
        other => {
            if other != "text" {
                warn!("Unknown output format {other:?}, using text");
            }
            println!("{}", manager.diagnostic_summary());
            output_page_text(&page);
        }
    }

    if args.diagnose {
        let diagnostics = run_diagnostics(&report, manager.registry());
        if args.format == "json" {
            println!(
                "{}",
                serde_json::to_string_pretty(&diagnostics)
                    .context("Failed to serialize diagnostics")?
            );
        } else {
            println!("{}", diagnostics.format_text());
        }
    }

    Ok(())
}

fn output_page_text(page: &MemoryPage) {
    println!();
    if page.body_classes().is_empty() {
        println!("Body classes: (none)");
    } else {
        println!("Body classes: {}", page.class_attribute());
    }

    if page.head_styles().is_empty() {
        println!("Injected styles: (none)");
    } else {
        println!("Injected styles:");
        for style in page.head_styles() {
            println!("  #{} ({} bytes)", style.id, style.css.len());
        }
    }

    println!(
        "Cache shim: {}",
        if page.cache_shim().is_some() {
            "installed"
        } else {
            "not needed"
        }
    );
}

fn init_logging(logging_config: &LoggingConfig) -> Result<()> {
    let log_level = match logging_config.level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => logging_config.level.as_str(),
        _ => "info", // Invalid value, fallback to info
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("browser_compat={log_level},warn"))
    });

    // Logs go to stderr so JSON reports on stdout stay parseable
    match logging_config.format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .try_init()?;
        }
        "compact" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .compact()
                        .with_writer(std::io::stderr),
                )
                .try_init()?;
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .pretty()
                        .with_writer(std::io::stderr),
                )
                .try_init()?;
        }
    }

    Ok(())
}
