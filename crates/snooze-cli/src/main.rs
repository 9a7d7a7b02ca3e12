use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use rustyline::Editor;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;

use snooze_application::ViewController;
use snooze_core::config::{ClientConfig, ConfigOverrides};
use snooze_infrastructure::{ConfigService, FileKeyValueStore, HttpRemoteService, SnoozePaths};

mod command;
mod logging;
mod render;
mod repl;

use command::{Command, HELP};
use render::TerminalRenderer;
use repl::ReplHelper;

#[derive(Parser)]
#[command(name = "snooze")]
#[command(about = "Terminal client for Hack or Snooze story sharing", long_about = None)]
struct Cli {
    /// API base URL (overrides config and SNOOZE_BASE_URL)
    #[arg(long)]
    base_url: Option<String>,

    /// Credential storage namespace (overrides config and SNOOZE_NAMESPACE)
    #[arg(long)]
    namespace: Option<String>,

    /// Default log filter when RUST_LOG is unset
    #[arg(long)]
    log_level: Option<String>,

    /// Use this directory instead of the platform config directory
    #[arg(long)]
    config_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let paths = match cli.config_dir {
        Some(dir) => SnoozePaths::with_root(dir),
        None => SnoozePaths::from_platform()?,
    };
    let mut config = ConfigService::new(&paths).load()?;
    config.apply(ConfigOverrides {
        base_url: cli.base_url,
        storage_namespace: cli.namespace,
        log_level: cli.log_level,
    });
    config.validate()?;

    let _log_guard = logging::init(&paths.logs_dir(), &config.log_level)?;
    tracing::info!(
        "Starting snooze against {} (namespace '{}')",
        config.base_url,
        config.storage_namespace
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run(paths, config))
}

async fn run(paths: SnoozePaths, config: ClientConfig) -> Result<()> {
    let remote = Arc::new(HttpRemoteService::from_config(&config));
    let kv = Arc::new(FileKeyValueStore::new(&paths, &config.storage_namespace));
    let controller = ViewController::from_services(remote, kv, Arc::new(TerminalRenderer));

    println!("{}", "=== Hack or Snooze ===".bright_magenta().bold());
    println!("{}", "Type 'help' for commands, 'quit' to exit.".bright_black());
    controller.startup().await;

    let mut rl: Editor<ReplHelper, DefaultHistory> = Editor::new()?;
    rl.set_helper(Some(ReplHelper));

    loop {
        match rl.readline(">> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(trimmed);

                match command::parse(trimmed) {
                    Ok(Command::Quit) => {
                        println!("{}", "Goodbye!".bright_green());
                        break;
                    }
                    Ok(Command::Help) => println!("{}", HELP.bright_black()),
                    Ok(Command::Event(event)) => {
                        // Failures are already shown as the view notice.
                        if let Err(e) = controller.handle(event).await {
                            tracing::debug!("Handler failed: {}", e);
                        }
                    }
                    Err(usage) => println!("{}", usage.yellow()),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        }
    }

    Ok(())
}
