//! Command-line driver for the Greenloop greenhouse control loop.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use greenloop_agent::CycleScheduler;
use greenloop_core::config::{env_vars, normalize_ollama_endpoint};
use greenloop_core::oracle::{DynDecisionOracle, OracleError};
use greenloop_core::{diff_state, Error, GreenhouseConfig, OracleSettings, StateSnapshot};
use greenloop_devices::{SimulatedActuatorBank, SimulatedSensorBank};
use greenloop_llm::{OllamaConfig, OllamaOracle};
use tokio::sync::watch;

const RULE_WIDTH: usize = 70;

/// Greenloop - autonomous greenhouse control loop.
#[derive(Parser, Debug)]
#[command(name = "greenloop")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Action to perform.
    #[command(subcommand)]
    command: Command,

    /// Verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Run the simulated greenhouse for a number of cycles.
    Run(RunArgs),
    /// Check that the configured Ollama server is reachable.
    CheckOracle(OracleArgs),
}

/// Oracle overrides shared by every command.
#[derive(ClapArgs, Debug, Default)]
struct OracleArgs {
    /// Config file (TOML).
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Ollama endpoint.
    #[arg(long)]
    ollama_endpoint: Option<String>,
    /// Model served by Ollama.
    #[arg(short, long)]
    model: Option<String>,
    /// Oracle request timeout in seconds.
    #[arg(long)]
    timeout_secs: Option<u64>,
}

#[derive(ClapArgs, Debug, Default)]
struct RunArgs {
    #[command(flatten)]
    oracle: OracleArgs,
    /// Number of cycles.
    #[arg(long)]
    cycles: Option<u32>,
    /// Seconds to wait between cycles.
    #[arg(long)]
    interval_secs: Option<u64>,
    /// Use the deterministic policies only.
    #[arg(long)]
    no_oracle: bool,
    /// Seed for the simulated sensors.
    #[arg(long)]
    seed: Option<u64>,
    /// Stop re-monitoring a critical alert after this many passes per cycle.
    #[arg(long)]
    max_passes: Option<u32>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    match args.command {
        Command::Run(run) => run_cycles(run).await,
        Command::CheckOracle(oracle) => check_oracle(oracle).await,
    }
}

fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "greenloop=debug" } else { "greenloop=info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directive));

    if env_vars::log_json() {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .compact()
            .with_level(false)
            .init();
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<GreenhouseConfig> {
    match path {
        Some(path) => GreenhouseConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(GreenhouseConfig::default()),
    }
}

/// Oracle settings from the file, the environment and flags (flags win).
///
/// Returns `None` when nothing asks for an oracle.
fn resolve_oracle(file: Option<OracleSettings>, args: &OracleArgs) -> Option<OracleSettings> {
    let env_endpoint = std::env::var(env_vars::OLLAMA_ENDPOINT).ok();
    let requested = file.is_some()
        || env_endpoint.is_some()
        || args.ollama_endpoint.is_some()
        || args.model.is_some();
    if !requested {
        return None;
    }

    let mut settings = file.unwrap_or_else(|| {
        let mut settings = OracleSettings {
            timeout_secs: env_vars::llm_timeout_secs(),
            ..OracleSettings::default()
        };
        if let Some(endpoint) = env_endpoint {
            settings.endpoint = endpoint;
        }
        if let Ok(model) = std::env::var(env_vars::LLM_MODEL) {
            settings.model = model;
        }
        settings
    });

    if let Some(endpoint) = &args.ollama_endpoint {
        settings.endpoint = endpoint.clone();
    }
    if let Some(model) = &args.model {
        settings.model = model.clone();
    }
    if let Some(timeout) = args.timeout_secs {
        settings.timeout_secs = timeout;
    }
    settings.endpoint = normalize_ollama_endpoint(settings.endpoint);
    Some(settings)
}

/// Merge the config file with command-line overrides.
fn resolve_config(args: &RunArgs) -> Result<GreenhouseConfig> {
    let mut config = load_config(args.oracle.config.as_ref())?;

    if let Some(cycles) = args.cycles {
        config.cycles = cycles;
    }
    if let Some(interval) = args.interval_secs {
        config.interval_secs = interval;
    }
    if args.seed.is_some() {
        config.sensor_seed = args.seed;
    }
    if args.max_passes.is_some() {
        config.max_passes_per_cycle = args.max_passes;
    }
    config.oracle = if args.no_oracle {
        None
    } else {
        resolve_oracle(config.oracle.take(), &args.oracle)
    };

    config.validate()?;
    Ok(config)
}

fn build_oracle(settings: &OracleSettings) -> Result<DynDecisionOracle> {
    let oracle = OllamaOracle::new(OllamaConfig::from(settings))
        .context("Failed to create Ollama oracle")?;
    Ok(Arc::new(oracle))
}

fn print_rule() {
    println!("{}", "=".repeat(RULE_WIDTH));
}

fn print_state(cycle: u32, state: &StateSnapshot) {
    println!("\n[System State After Cycle {}]", cycle);
    println!("  Temperature: {}°C", state.temperature);
    println!("  Humidity: {}%", state.humidity);
    println!("  Soil Moisture: {}%", state.soil_moisture);
    println!("  Light Level: {} lux", state.light_level);
    println!("  Alert Level: {}", state.alert_level.as_str().to_uppercase());
    println!(
        "  Actuators: Heater={}, Fan={}, Pump={}, Lights={}",
        state.heater_on, state.fan_on, state.water_pump_on, state.grow_lights_on
    );
}

/// Latest control explanation, from either decision path.
fn latest_control_why(state: &StateSnapshot) -> Option<&str> {
    state
        .control_log
        .iter()
        .rev()
        .find(|entry| entry.contains("Reasons (fallback):") || entry.contains("Oracle reason:"))
        .map(String::as_str)
}

/// Listen for Ctrl-C once for the whole run; the receiver flips to `true`.
fn spawn_interrupt_listener() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping the run");
            let _ = tx.send(true);
            tx.closed().await;
        }
    });
    rx
}

/// Resolves once a stop has been requested. Never resolves if the sender is gone.
async fn stop_requested(stop: &mut watch::Receiver<bool>) {
    if stop.wait_for(|stopped| *stopped).await.is_err() {
        std::future::pending::<()>().await;
    }
}

/// Run up to `cycles` cycles, returning the state of the last completed one.
///
/// A stop request aborts an in-flight cycle or pause; the snapshot of the
/// aborted cycle is discarded.
async fn drive_cycles(
    scheduler: &CycleScheduler,
    mut state: StateSnapshot,
    cycles: u32,
    interval_secs: u64,
    stop: &mut watch::Receiver<bool>,
) -> StateSnapshot {
    for cycle in 1..=cycles {
        if *stop.borrow() {
            println!("\nInterrupted before cycle {}.", cycle);
            break;
        }

        println!();
        print_rule();
        println!("CYCLE {}", cycle);
        print_rule();

        let previous = state.clone();
        let outcome = tokio::select! {
            biased;
            _ = stop_requested(stop) => {
                println!("\nInterrupted during cycle {}, keeping the previous state.", cycle);
                return previous;
            }
            outcome = scheduler.run(state) => outcome,
        };
        state = outcome.snapshot;

        if outcome.passes > 1 {
            println!("\n[Passes] {} (critical alert re-monitored)", outcome.passes);
        }
        if outcome.capped {
            println!("[Pass Limit] critical alert still active after {} passes", outcome.passes);
        }

        println!("\n[Delta This Cycle] {}", diff_state(&previous, &state));
        if let Some(why) = latest_control_why(&state) {
            println!("[Control Why] {}", why);
        }
        print_state(cycle, &state);

        if cycle < cycles && interval_secs > 0 {
            println!("\nWaiting {} seconds before next cycle...", interval_secs);
            tokio::select! {
                biased;
                _ = stop_requested(stop) => {
                    println!("\nInterrupted, stopping after cycle {}.", cycle);
                    break;
                }
                _ = tokio::time::sleep(Duration::from_secs(interval_secs)) => {}
            }
        }
    }
    state
}

async fn run_cycles(args: RunArgs) -> Result<()> {
    let config = resolve_config(&args)?;
    let mut stop = spawn_interrupt_listener();

    let sensors = match config.sensor_seed {
        Some(seed) => SimulatedSensorBank::with_seed(seed),
        None => SimulatedSensorBank::new(),
    };
    let oracle = config.oracle.as_ref().map(build_oracle).transpose()?;
    match &config.oracle {
        Some(settings) => tracing::info!(
            endpoint = %settings.endpoint,
            model = %settings.model,
            "Using Ollama decision oracle"
        ),
        None => tracing::info!("No decision oracle configured, using deterministic policies"),
    }

    let scheduler = CycleScheduler::from_gateways(
        Arc::new(sensors),
        Arc::new(SimulatedActuatorBank::new()),
        oracle,
    )
    .with_max_passes(config.max_passes_per_cycle);

    print_rule();
    println!("GREENLOOP AUTOMATED GREENHOUSE");
    print_rule();

    let state = config.initial_snapshot();
    println!("\nInitial State:");
    println!("  Target Temperature: {}°C", state.target_temperature);
    println!("  Target Humidity: {}%", state.target_humidity);
    println!("  Target Soil Moisture: {}%", state.target_soil_moisture);
    println!("  Target Light Hours: {}", state.target_light_hours);

    let state = drive_cycles(
        &scheduler,
        state,
        config.cycles,
        config.interval_secs,
        &mut stop,
    )
    .await;

    println!();
    print_rule();
    println!("SYSTEM SUMMARY");
    print_rule();
    println!("\nTotal Monitoring Entries: {}", state.monitoring_log.len());
    println!("Total Control Actions: {}", state.control_log.len());
    println!("Total Optimizations: {}", state.optimization_log.len());

    Ok(())
}

async fn check_oracle(args: OracleArgs) -> Result<()> {
    let file = load_config(args.config.as_ref())?;
    let settings = resolve_oracle(file.oracle, &args).unwrap_or_default();
    let oracle = OllamaOracle::new(OllamaConfig::from(&settings)).map_err(Error::from)?;

    println!("Checking Ollama at {} (model {})...", settings.endpoint, settings.model);
    if oracle.is_available().await {
        println!("Ollama is reachable.");
        Ok(())
    } else {
        let unreachable = OracleError::Unavailable(format!("ollama at {}", settings.endpoint));
        Err(Error::from(unreachable).into())
    }
}
