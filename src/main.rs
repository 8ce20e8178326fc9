//! Command-line front end for the direction manager.
//!
//! Usage:
//!   direction-manager                # Print current language/direction status
//!   direction-manager set ar         # Switch language (relaunches on direction change)
//!   direction-manager toggle         # Switch to the next available language
//!
//! Optional environment variables:
//! - DIRECTION_STATE_DIR (defaults to .direction-state)
//! - DEFAULT_LANGUAGE (defaults to en)
//! - DEVICE_LOCALE (e.g. ar-EG, used when no language is stored)
//! - RESTART_GRACE_MS (defaults to 100)

use anyhow::{bail, Context, Result};
use direction_manager::i18n::LanguageStrings;
use direction_manager::{
    Config, DirectionError, DirectionManager, ExecRestart, FallbackRestart, FileHost, FileStore,
    LanguageChange, Restart, SpawnRestart,
};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Status,
    Set(String),
    Toggle,
}

impl Command {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self> {
        let command = match args.next().as_deref() {
            None | Some("status") => Command::Status,
            Some("toggle") => Command::Toggle,
            Some("set") => match args.next() {
                Some(code) => Command::Set(code),
                None => bail!("Usage: direction-manager set <language-code>"),
            },
            Some(other) => bail!("Unknown command: {}", other),
        };

        if let Some(extra) = args.next() {
            bail!("Unexpected argument: {}", extra);
        }
        Ok(command)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("direction_manager=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let command = Command::parse(std::env::args().skip(1))?;
    let config = Config::from_env()?;

    info!("Using state directory {}", config.state_dir.display());

    let host = FileHost::open(config.host_path()).context("Failed to read host direction")?;
    // The relaunched process only reports status, so a relaunch never
    // repeats the command that caused it
    let relaunch_args = vec!["status".to_string()];
    let restarter = FallbackRestart::new(vec![
        Arc::new(
            ExecRestart::current_exe(relaunch_args.clone())
                .context("Failed to locate current executable")?,
        ) as Arc<dyn Restart>,
        Arc::new(SpawnRestart::current_exe(relaunch_args)?),
    ]);

    let manager = DirectionManager::new(
        config.direction_config(),
        Arc::new(FileStore::new(config.preferences_path())),
        Arc::new(host),
        Arc::new(restarter),
    );

    let outcome = manager.initialize().await;
    if outcome.fix_unverified {
        print_relaunch_notice(&manager);
    }

    let result = match command {
        Command::Status => None,
        Command::Set(code) => Some(manager.request_language_code(&code).await),
        Command::Toggle => Some(manager.toggle_language().await),
    };

    match result {
        Some(Ok(LanguageChange { restart_scheduled })) => {
            info!(
                "Language is now {} (restart scheduled: {})",
                manager.language(),
                restart_scheduled
            );
        }
        Some(Err(e)) if e.requires_manual_relaunch() => print_relaunch_notice(&manager),
        Some(Err(e @ DirectionError::StoreWrite(_))) => {
            let strings = LanguageStrings::for_language(manager.language());
            eprintln!("{}", strings.change_language_failed);
            return Err(e).context("Language change was not applied");
        }
        Some(Err(e)) => return Err(e.into()),
        None => {}
    }

    println!("{}", serde_json::to_string_pretty(&manager.status())?);
    Ok(())
}

fn print_relaunch_notice(manager: &DirectionManager) {
    let strings = LanguageStrings::for_language(manager.language());
    eprintln!(
        "{}\n\n{}",
        strings.restart_required_title, strings.restart_required_body
    );
}
