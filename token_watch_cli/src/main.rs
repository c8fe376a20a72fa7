mod commands;
mod render;

use clap::{CommandFactory, Parser};
use clap_complete::generate;
use colored::Colorize;
use commands::{Cli, Commands, ConfigCommands, OutputFormat};
use log::{info, warn};
use std::cell::Cell;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;
use token_watch_core::native::{FileStorage, NativeHttpClient, NativeRpcClient};
use token_watch_core::dashboard::PRICE_UNAVAILABLE;
use token_watch_core::formatter::format_usd;
use token_watch_core::{CoreError, CoreResult, Dashboard, Settings, Tick};
use tokio::task::LocalSet;
use tokio::time::MissedTickBehavior;

type NativeDashboard = Dashboard<NativeRpcClient, NativeHttpClient, Rc<FileStorage>>;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    // Dashboard futures are !Send; everything runs on this thread
    let local = LocalSet::new();
    if let Err(error) = local.run_until(handle_command(cli)).await {
        eprintln!("{} {}", "ERROR:".red(), error);
        let code = exit_code(&error);
        if code != 0 {
            std::process::exit(code);
        }
    }
}

/// Non-zero only for bad input or bad configuration
fn exit_code(error: &CoreError) -> i32 {
    if error.is_user_input() || matches!(error, CoreError::Config(_)) {
        1
    } else {
        0
    }
}

async fn handle_command(cli: Cli) -> CoreResult<()> {
    match &cli.command {
        Commands::Completion { shell, output } => handle_completion_generation(*shell, output.clone()),
        Commands::Config { command } => handle_config_command(command, &cli),
        command => {
            let settings = load_config(&cli.config)?;
            let dashboard = build_dashboard(&settings)?;
            match command {
                Commands::Watch { once } => handle_watch(dashboard, *once).await,
                Commands::List { format } => handle_list(&dashboard, *format),
                Commands::Add { address, name, cost } => handle_add(&dashboard, address, name, *cost).await,
                Commands::Remove { address } => handle_remove(&dashboard, address),
                Commands::Clear { yes } => handle_clear(&dashboard, *yes),
                Commands::Price => handle_price(&dashboard).await,
                Commands::Token => handle_token(&dashboard, &settings).await,
                Commands::Theme { toggle } => handle_theme(&dashboard, *toggle),
                Commands::Completion { .. } | Commands::Config { .. } => Ok(()),
            }
        }
    }
}

fn load_config(path: &Path) -> CoreResult<Settings> {
    if !path.exists() {
        info!("No config file at {}, using defaults and environment", path.display());
    }
    let settings = Settings::from_file(&path.to_string_lossy())?;
    settings.validate()?;
    Ok(settings)
}

fn build_dashboard(settings: &Settings) -> CoreResult<NativeDashboard> {
    let timeout = Duration::from_secs(settings.request_timeout_secs);
    let rpc = NativeRpcClient::new(settings.rpc_url.clone(), timeout)?;
    let http = NativeHttpClient::new(timeout)?;
    let storage = Rc::new(FileStorage::new(PathBuf::from(&settings.storage_dir)));
    Dashboard::new(settings, rpc, http, storage)
}

fn clear_screen() {
    print!("\x1B[2J\x1B[H");
}

async fn handle_watch(dashboard: NativeDashboard, once: bool) -> CoreResult<()> {
    if once {
        dashboard.refresh().await;
        print!("{}", render::dashboard(&dashboard.snapshot()));
        return Ok(());
    }

    let dashboard = Rc::new(dashboard);
    let dirty = Rc::new(Cell::new(true));
    let flag = dirty.clone();
    dashboard.set_listener(Rc::new(move || flag.set(true)));

    dashboard.start();
    spawn_cycle(&dashboard);

    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                info!("Ctrl+C signal received");
                break;
            }
            _ = ticker.tick() => {
                if dashboard.tick() == Tick::Due {
                    spawn_cycle(&dashboard);
                }
                if dirty.replace(false) {
                    clear_screen();
                    print!("{}", render::dashboard(&dashboard.snapshot()));
                    let _ = std::io::stdout().flush();
                }
            }
        }
    }

    dashboard.stop();
    Ok(())
}

/// Cycles run detached so the countdown keeps ticking while calls are in flight
fn spawn_cycle(dashboard: &Rc<NativeDashboard>) {
    let dashboard = dashboard.clone();
    tokio::task::spawn_local(async move {
        dashboard.refresh().await;
    });
}

fn handle_list(dashboard: &NativeDashboard, format: Option<OutputFormat>) -> CoreResult<()> {
    let wallets = dashboard.wallets();
    match format {
        Some(OutputFormat::Json) => println!("{}", serde_json::to_string_pretty(&wallets)?),
        _ => print!("{}", render::wallet_list(&wallets)),
    }
    Ok(())
}

async fn handle_add(dashboard: &NativeDashboard, address: &str, name: &str, cost: f64) -> CoreResult<()> {
    let wallet = dashboard.add_wallet(name, address, cost).await?;
    println!("{}", render::added(&wallet));
    print!("{}", render::dashboard(&dashboard.snapshot()));
    Ok(())
}

fn handle_remove(dashboard: &NativeDashboard, address: &str) -> CoreResult<()> {
    if dashboard.remove_wallet(address)? {
        println!("{} {}", "Removed".green(), address);
    } else {
        println!("{} is not tracked, nothing removed", address);
    }
    Ok(())
}

fn handle_clear(dashboard: &NativeDashboard, yes: bool) -> CoreResult<()> {
    let count = dashboard.wallets().len();
    if count == 0 {
        println!("No wallets to clear");
        return Ok(());
    }
    if !yes && !confirm(&format!("Remove all {} wallets?", count))? {
        println!("Aborted");
        return Ok(());
    }
    dashboard.clear_wallets()?;
    println!("{} {} wallets", "Cleared".green(), count);
    Ok(())
}

fn confirm(question: &str) -> CoreResult<bool> {
    print!("{} [y/N] ", question);
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

async fn handle_price(dashboard: &NativeDashboard) -> CoreResult<()> {
    match dashboard.resolver().resolve(dashboard.reader()).await {
        Ok(quote) => println!("{} (via {})", format_usd(quote.price).bold(), quote.source),
        Err(CoreError::QuoteUnavailable) => println!("{}", PRICE_UNAVAILABLE.yellow()),
        Err(e) => return Err(e),
    }
    Ok(())
}

async fn handle_token(dashboard: &NativeDashboard, settings: &Settings) -> CoreResult<()> {
    let reader = dashboard.reader();
    println!("Contract:            {}", reader.token_address());
    println!("Configured decimals: {}", reader.decimals());

    match reader.get_symbol().await {
        Ok(symbol) => println!("Symbol:              {}", symbol),
        Err(e) => println!("Symbol:              {} ({})", "Error".red(), e),
    }
    match reader.get_decimals().await {
        Ok(decimals) if decimals == settings.token_decimals => {
            println!("On-chain decimals:   {}", decimals)
        }
        Ok(decimals) => {
            warn!("token_decimals is {} but the contract reports {}", settings.token_decimals, decimals);
            println!("On-chain decimals:   {} {}", decimals, "(does not match configuration)".yellow());
        }
        Err(e) => println!("On-chain decimals:   {} ({})", "Error".red(), e),
    }
    Ok(())
}

fn handle_theme(dashboard: &NativeDashboard, toggle: bool) -> CoreResult<()> {
    let theme = if toggle { dashboard.toggle_theme()? } else { dashboard.theme() };
    println!("{}", theme.as_str());
    Ok(())
}

fn handle_config_command(command: &ConfigCommands, cli: &Cli) -> CoreResult<()> {
    match command {
        ConfigCommands::Show { format } => {
            let settings = Settings::from_file(&cli.config.to_string_lossy())?;
            match format {
                Some(OutputFormat::Json) => println!("{}", serde_json::to_string_pretty(&settings)?),
                _ => print_config_table(&settings),
            }
            Ok(())
        }
        ConfigCommands::Validate { file } => {
            let config_path = file.as_ref().unwrap_or(&cli.config);
            if !config_path.exists() {
                return Err(CoreError::Validation(format!(
                    "Configuration file not found: {}",
                    config_path.display()
                )));
            }
            load_config(config_path)?;
            println!("Configuration validation passed");
            Ok(())
        }
        ConfigCommands::Init { output, force } => {
            if output.exists() && !force {
                return Err(CoreError::Validation(format!(
                    "{} already exists (use --force to overwrite)",
                    output.display()
                )));
            }
            let settings = Settings::from_file(&cli.config.to_string_lossy())?;
            settings.save_to_file(&output.to_string_lossy())?;
            println!("Configuration written to: {}", output.display());
            Ok(())
        }
    }
}

fn print_config_table(settings: &Settings) {
    println!("Token Watch Configuration");
    println!("{:<22} {}", "Setting", "Value");
    println!("{}", "-".repeat(60));

    let configs = [
        ("rpc_url", settings.rpc_url.clone()),
        ("token_address", settings.token_address.clone()),
        ("token_decimals", settings.token_decimals.to_string()),
        ("refresh_interval_ms", settings.refresh_interval_ms.to_string()),
        ("request_timeout_secs", settings.request_timeout_secs.to_string()),
        ("aggregator_api_url", settings.aggregator_api_url.clone()),
        ("price_api_url", settings.price_api_url.clone()),
        ("preferred_dex_ids", settings.preferred_dex_ids.join(", ")),
        ("stablecoin_symbol", settings.stablecoin_symbol.clone()),
        ("stablecoin_address", settings.stablecoin_address.clone()),
        ("default_wallets", settings.default_wallets.len().to_string()),
        ("storage_dir", settings.storage_dir.clone()),
    ];
    for (key, value) in configs {
        println!("{:<22} {}", key, value);
    }
}

fn handle_completion_generation(shell: clap_complete::Shell, output: Option<PathBuf>) -> CoreResult<()> {
    let mut cmd = Cli::command();

    let mut buf = Vec::new();
    generate(shell, &mut cmd, "token-watch", &mut buf);

    match output {
        Some(output_path) => {
            std::fs::write(&output_path, buf)?;
            println!("Completions written to: {}", output_path.display());
        }
        None => {
            print!("{}", String::from_utf8_lossy(&buf));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn exit_code_only_for_input_and_config_errors() {
        assert_eq!(exit_code(&CoreError::InvalidAddress("0x12".to_string())), 1);
        assert_eq!(exit_code(&CoreError::DuplicateAddress("0xab".to_string())), 1);
        assert_eq!(exit_code(&CoreError::Validation("bad cost".to_string())), 1);
        assert_eq!(exit_code(&CoreError::Config("missing field".to_string())), 1);
        assert_eq!(exit_code(&CoreError::ReadFailure("timeout".to_string())), 0);
        assert_eq!(exit_code(&CoreError::QuoteUnavailable), 0);
        assert_eq!(exit_code(&CoreError::Http("502".to_string())), 0);
    }

    #[test]
    fn parse_add_with_options() {
        let cli = Cli::try_parse_from([
            "token-watch",
            "add",
            "0x06a9f861862e120d2fd03E9650f033C49aFDD486",
            "--name",
            "G",
            "--cost",
            "0.5",
        ])
        .unwrap();
        match cli.command {
            Commands::Add { address, name, cost } => {
                assert_eq!(address, "0x06a9f861862e120d2fd03E9650f033C49aFDD486");
                assert_eq!(name, "G");
                assert_eq!(cost, 0.5);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn parse_defaults() {
        let cli = Cli::try_parse_from(["token-watch", "-v", "watch"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Watch { once: false }));

        let cli = Cli::try_parse_from(["token-watch", "add", "0xabc"]).unwrap();
        assert!(matches!(cli.command, Commands::Add { ref name, cost, .. } if name.is_empty() && cost == 0.0));
    }

    #[test]
    fn parse_rejects_missing_address() {
        assert!(Cli::try_parse_from(["token-watch", "remove"]).is_err());
        assert!(Cli::try_parse_from(["token-watch", "completion", "nushell-ish"]).is_err());
    }

    #[test]
    fn config_validate_accepts_example() {
        let path = PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/../config.example.toml"));
        assert!(load_config(&path).is_ok());
    }
}
