//! ReKey command-line entry point.
//!
//! Parses the command line, loads the TOML config, initialises tracing and
//! dispatches to the application use cases.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ load_app_config()           -- --config or the platform config file
//!  └─ init_tracing()              -- RUST_LOG > --log-level > config > info
//!  └─ command
//!       ├─ list/apply/remove/clear  ManageMappingsUseCase<RegistryStore>
//!       ├─ keys                     KEY_OPTIONS
//!       ├─ diagnose                 DiagnosticSession<WindowsHookBackend>
//!       └─ config                   config file path / defaults
//! ```
//!
//! Logs go to stderr; stdout carries only command output.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use rekey::application::diagnose::{status_line, DiagnosticSession};
use rekey::application::manage_mappings::{describe_mapping, ApplyOutcome, ManageMappingsUseCase};
use rekey::infrastructure::input_capture::HookBackend;
use rekey::infrastructure::storage::config::{
    config_file_path, load_config_from, save_config_to, AppConfig, ConfigError, RegistryConfig,
};
use rekey::infrastructure::storage::registry::ScancodeMapStore;
use rekey_core::keys::KEY_OPTIONS;
use rekey_core::{parse_key, KeyInfo, Mapping, ScancodeMapState};

const REBOOT_NOTICE: &str = "Reboot for the change to take effect.";

/// Command-line arguments for `rekey`.
#[derive(Debug, Parser)]
#[command(
    name = "rekey",
    about = "Remap keyboard keys through the Windows Scancode Map and inspect raw scan codes",
    version
)]
struct Cli {
    /// Path to the TOML config file. Defaults to the platform config directory.
    #[arg(long, global = true, env = "REKEY_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (`error`, `warn`, `info`, `debug`, `trace`).
    ///
    /// `RUST_LOG` takes precedence when set.
    #[arg(long, global = true, env = "REKEY_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show the current mappings.
    List,
    /// Map FROM to TO, replacing any mapping for FROM.
    Apply {
        /// Key to remap: a catalog name (`"Caps Lock"`) or a hex scan code (`0x003A`).
        #[arg(value_parser = parse_key)]
        from: KeyInfo,
        /// Key it should produce; `disabled` turns FROM off.
        #[arg(value_parser = parse_key)]
        to: KeyInfo,
    },
    /// Remove the mapping for FROM.
    Remove {
        #[arg(value_parser = parse_key)]
        from: KeyInfo,
    },
    /// Delete the Scancode Map value, removing every mapping.
    Clear,
    /// Print the key catalog.
    Keys,
    /// Show the scan code of every key press until Ctrl-C.
    Diagnose,
    /// Print the config file path.
    Config {
        /// Write a config file with the default values if none exists.
        #[arg(long)]
        init: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (config, config_error) = match load_app_config(&cli) {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };
    init_tracing(cli.log_level.as_deref().unwrap_or(&config.general.log_level));
    if let Some(e) = config_error {
        return Err(e).context("failed to load configuration");
    }

    match cli.command {
        Command::List => list(&open_store(&config.registry)?),
        Command::Apply { from, to } => apply(&open_store(&config.registry)?, &from, &to),
        Command::Remove { from } => remove(&open_store(&config.registry)?, &from),
        Command::Clear => clear(&open_store(&config.registry)?),
        Command::Keys => {
            print_keys();
            Ok(())
        }
        Command::Diagnose => diagnose(hook_backend()?, config.diagnostic.show_flags).await,
        Command::Config { init } => config_command(cli.config, init),
    }
}

/// Loads the config named by `--config`, else the platform default.
///
/// A platform without a config directory runs on defaults.
fn load_app_config(cli: &Cli) -> Result<AppConfig, ConfigError> {
    let path = match &cli.config {
        Some(path) => path.clone(),
        None => match config_file_path() {
            Ok(path) => path,
            Err(ConfigError::NoPlatformConfigDir) => return Ok(AppConfig::default()),
            Err(e) => return Err(e),
        },
    };
    load_config_from(&path)
}

fn init_tracing(fallback_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// ── Platform wiring ───────────────────────────────────────────────────────────

#[cfg(target_os = "windows")]
fn open_store(
    registry: &RegistryConfig,
) -> anyhow::Result<ManageMappingsUseCase<rekey::infrastructure::storage::registry::RegistryStore>> {
    use rekey::infrastructure::storage::registry::RegistryStore;

    Ok(ManageMappingsUseCase::new(RegistryStore::new(
        registry.key_path.clone(),
        registry.value_name.clone(),
    )))
}

#[cfg(not(target_os = "windows"))]
fn open_store(
    _registry: &RegistryConfig,
) -> anyhow::Result<ManageMappingsUseCase<rekey::infrastructure::storage::memory::MemoryStore>> {
    Err(rekey::infrastructure::storage::registry::StoreError::Unsupported.into())
}

#[cfg(target_os = "windows")]
fn hook_backend() -> anyhow::Result<rekey::infrastructure::input_capture::windows::WindowsHookBackend> {
    Ok(rekey::infrastructure::input_capture::windows::WindowsHookBackend::new())
}

#[cfg(not(target_os = "windows"))]
fn hook_backend() -> anyhow::Result<rekey::infrastructure::input_capture::mock::MockHookBackend> {
    Err(rekey::infrastructure::input_capture::CaptureError::UnsupportedPlatform(
        std::env::consts::OS.to_string(),
    )
    .into())
}

// ── Commands ──────────────────────────────────────────────────────────────────

fn list<S: ScancodeMapStore>(use_case: &ManageMappingsUseCase<S>) -> anyhow::Result<()> {
    let state = use_case.load().context("failed to read the Scancode Map")?;
    match state {
        ScancodeMapState::Absent | ScancodeMapState::Empty => println!("None"),
        ScancodeMapState::NonEmpty(mappings) => {
            for mapping in &mappings {
                println!("{}", describe_mapping(mapping));
            }
        }
    }
    Ok(())
}

fn apply<S: ScancodeMapStore>(
    use_case: &ManageMappingsUseCase<S>,
    from: &KeyInfo,
    to: &KeyInfo,
) -> anyhow::Result<()> {
    let mapping = Mapping::new(from.scan_code, to.scan_code);
    let outcome = use_case
        .apply(mapping)
        .with_context(|| format!("failed to apply {}", describe_mapping(&mapping)))?;

    match outcome {
        ApplyOutcome::Added => println!("Added {}", describe_mapping(&mapping)),
        ApplyOutcome::Replaced { previous } => println!(
            "Replaced {} with {}",
            describe_mapping(&previous),
            describe_mapping(&mapping)
        ),
        ApplyOutcome::Unchanged => {
            println!("{} is already applied", describe_mapping(&mapping));
            return Ok(());
        }
    }
    println!("{REBOOT_NOTICE}");
    Ok(())
}

fn remove<S: ScancodeMapStore>(
    use_case: &ManageMappingsUseCase<S>,
    from: &KeyInfo,
) -> anyhow::Result<()> {
    match use_case
        .remove(from.scan_code)
        .with_context(|| format!("failed to remove the mapping for {}", from.name))?
    {
        Some(removed) => {
            println!("Removed {}", describe_mapping(&removed));
            println!("{REBOOT_NOTICE}");
        }
        None => println!("No mapping for {}", from.name),
    }
    Ok(())
}

fn clear<S: ScancodeMapStore>(use_case: &ManageMappingsUseCase<S>) -> anyhow::Result<()> {
    if use_case.clear().context("failed to clear the Scancode Map")? {
        println!("All mappings removed.");
        println!("{REBOOT_NOTICE}");
    } else {
        println!("No mappings to remove.");
    }
    Ok(())
}

fn print_keys() {
    for option in KEY_OPTIONS {
        println!("{}", KeyInfo::from(option));
    }
}

async fn diagnose<B: HookBackend>(backend: B, show_flags: bool) -> anyhow::Result<()> {
    let mut session = DiagnosticSession::new(backend);
    let status = session
        .toggle()
        .context("failed to start the keyboard monitor")?;
    println!("{status}");

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("failed to listen for Ctrl-C: {e}");
        }
    };
    session
        .run_until(shutdown, |event| println!("{}", status_line(&event, show_flags)))
        .await;

    let status = session.toggle().context("failed to stop the keyboard monitor")?;
    println!("{status}");
    info!("diagnostic stopped");
    Ok(())
}

fn config_command(explicit: Option<PathBuf>, init: bool) -> anyhow::Result<()> {
    let path = match explicit {
        Some(path) => path,
        None => config_file_path().context("failed to locate the config directory")?,
    };

    if init {
        if path.exists() {
            println!("{} already exists", path.display());
        } else {
            save_config_to(&AppConfig::default(), &path)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Wrote {}", path.display());
        }
    } else {
        println!("{}", path.display());
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
