use std::time::Instant;

use anyhow::{bail, Context};
use clap::Parser;
use mcjs_bridge::{ConfigLoadError, McjsConfig};
use mcjs_runner::{init_logging, DemoModules, LocalEventBus, RunnerSettings};
use tracing::{info, warn};

#[derive(Parser)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enables debug mode; repeat to also lower the log filter to debug
    #[arg(short, long, action = clap::ArgAction::Count)]
    debug: u8,

    /// Handler deadline in milliseconds (0 disables the deadline)
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Simulate a host without the dynamic registration entry point
    #[arg(long)]
    legacy_host: bool,

    /// Write a default config file and exit
    #[arg(long)]
    init_config: bool,
}

fn create_default_config() -> anyhow::Result<()> {
    let config_path = McjsConfig::config_path().context("Failed to determine config directory")?;

    // Never overwrite an existing config file
    if config_path.exists() {
        bail!(
            "Config file already exists at {}. Edit it manually or delete it to create a new one.",
            config_path.display()
        );
    }

    RunnerSettings::default().save_to(&config_path)?;
    eprintln!("Config file created at: {}", config_path.display());
    Ok(())
}

fn load_config() -> anyhow::Result<RunnerSettings> {
    match RunnerSettings::load() {
        Ok(config) => Ok(config),
        Err(ConfigLoadError::NotFound) => Ok(RunnerSettings::default()),
        Err(e) => Err(e).context("Failed to load config"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.init_config {
        return create_default_config();
    }

    let mut config = load_config()?;
    if cli.debug > 0 {
        config.mcjs.bridge.debug_mode = true;
    }
    if cli.debug > 1 && config.mcjs.logging.level.is_none() {
        config.mcjs.logging.level = Some("debug".to_string());
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config.mcjs.bridge.max_execution_time_ms = timeout_ms;
    }

    let _log_guard = init_logging("mcjs", &config.mcjs.logging).context("Failed to initialize logging")?;
    info!(target: "runner", "Starting mcjs local host...");

    let bus = LocalEventBus::standard(!cli.legacy_host);
    let demo = DemoModules::new(bus, config.mcjs.bridge.clone())?;
    demo.load()?;

    let report = demo.run_scenario()?;
    for (block, suppressed) in &report.block_breaks {
        info!(target: "runner", "Break {}: {}", block, if *suppressed { "suppressed" } else { "allowed" });
    }
    info!(target: "runner", "Scenario done: {} line(s), {} listener(s) installed",
        report.transcript.len(), demo.bus().install_count());

    // Keep ticking until deferred session releases have run
    let mut ticker = tokio::time::interval(config.runner.tick_interval());
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let released = demo.bridge().tick(Instant::now());
                if released > 0 {
                    info!(target: "runner", "Released {} window session(s)", released);
                }
                if demo.bridge().sessions().pending_releases() == 0 {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                warn!(target: "runner", "Interrupted, shutting down");
                break;
            }
        }
    }

    demo.bridge().shutdown();
    info!(target: "runner", "Shutdown complete");
    Ok(())
}
