//! Host selector CLI.
//!
//! ```text
//! host-selector check   --config selector.toml
//! host-selector lookup  --config selector.toml 10.0.0.7
//! host-selector resolve --config selector.toml --ip 10.0.0.7 --allowed a,b,c --cookie b
//! host-selector watch   --config selector.toml
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use host_selector::caller::{CallerEntry, CallerRegistry, SharedRegistry};
use host_selector::config::watcher::ConfigWatcher;
use host_selector::config::{load_registry, LoadedConfig};
use host_selector::observability::{logging, metrics};
use host_selector::selection::{HostSelector, PreferenceContext, PreferenceSource};

#[derive(Parser)]
#[command(name = "host-selector")]
#[command(about = "Pick a backend host per caller rules and request preferences", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "selector.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the configuration and print caller rules in match order
    Check,
    /// Show which caller rule applies to an address
    Lookup {
        ip: String,
    },
    /// Choose a host for a simulated request
    Resolve {
        /// Client address.
        #[arg(long)]
        ip: String,
        /// Hosts allowed for the route.
        #[arg(long, value_delimiter = ',', required = true)]
        allowed: Vec<String>,
        /// Hosts requested via request parameter.
        #[arg(long, value_delimiter = ',')]
        param: Vec<String>,
        /// Hosts requested via cookie.
        #[arg(long, value_delimiter = ',')]
        cookie: Vec<String>,
        /// Hosts requested via header.
        #[arg(long, value_delimiter = ',')]
        header: Vec<String>,
    },
    /// Keep a live registry, reloading on config changes, until Ctrl+C
    Watch,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let (loaded, registry) = match load_registry(&cli.config) {
        Ok(loaded) => loaded,
        Err(e) => {
            logging::init("info");
            tracing::error!(path = ?cli.config, error = %e, "Failed to load configuration");
            return ExitCode::FAILURE;
        }
    };
    logging::init(&loaded.config.observability.log_level);

    match run(cli.command, &cli.config, loaded, registry).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(
    command: Commands,
    path: &Path,
    loaded: LoadedConfig,
    registry: CallerRegistry,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    match command {
        Commands::Check => {
            println!("{} caller rules, in match order:", registry.len());
            for entry in registry.entries() {
                print_entry(entry);
            }
        }
        Commands::Lookup { ip } => {
            print_entry(registry.find_by_ip(&ip));
        }
        Commands::Resolve {
            ip,
            allowed,
            param,
            cookie,
            header,
        } => {
            let ctx = PreferenceContext::new(ip)
                .with(PreferenceSource::Param, param)
                .with(PreferenceSource::Cookie, cookie)
                .with(PreferenceSource::Header, header);
            let selector = HostSelector::from_registry(registry, loaded.config.selection.clone());
            match selector.select(&allowed, &ctx) {
                Some(selection) => println!("{} ({})", selection.host, selection.reason),
                None => {
                    eprintln!("no host available");
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Commands::Watch => watch(path, registry, &loaded).await?,
    }

    Ok(ExitCode::SUCCESS)
}

async fn watch(
    path: &Path,
    registry: CallerRegistry,
    loaded: &LoadedConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let observability = &loaded.config.observability;
    if observability.metrics_enabled {
        metrics::init_metrics(observability.metrics_address.parse()?);
    }

    let shared = SharedRegistry::new(registry);

    let (watcher, mut updates) = ConfigWatcher::new(path);
    let _watcher = watcher.run()?;

    tracing::info!(rules = shared.load().len(), "Watching caller rules");

    loop {
        tokio::select! {
            Some(next) = updates.recv() => {
                metrics::record_reload(true);
                shared.store(next);
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutdown signal received");
                break;
            }
        }
    }
    Ok(())
}

fn print_entry(entry: &CallerEntry) {
    println!(
        "{:<18} enabled={:<5} pref=[{}] ignore=[{}] note={:?}",
        entry.ip(),
        entry.enabled,
        entry.preferred.join(","),
        entry.ignored.join(","),
        entry.note
    );
}
