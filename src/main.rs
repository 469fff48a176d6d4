//! pomodoro-sync - A shared pomodoro timer
//!
//! One process serves the authoritative timer over HTTP; any number of
//! terminals follow it:
//! - `serve` runs the authority and task list
//! - `watch` mirrors the countdown locally, ticking once per second
//! - `start`, `reset`, `status` and `task` are one-shot requests

use std::path::Path;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};

use pomodoro_sync::cli::{ApiClient, Cli, Commands, Display, ServeArgs, TaskCommands, WatchArgs};
use pomodoro_sync::config::ClientConfig;
use pomodoro_sync::daemon::server::{self, AppState};
use pomodoro_sync::notification::ConsoleNotifier;
use pomodoro_sync::sync::{StartOutcome, SyncOptions, TerminalView, TimerAuthority, TimerSyncClient};
use pomodoro_sync::types::PomodoroConfig;

/// Main entry point
#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    if let Err(e) = execute(cli).await {
        Display::show_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber for logging.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}

/// Executes the CLI command.
async fn execute(cli: Cli) -> Result<()> {
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Serve(args) => run_server(args).await?,
        Commands::Watch(args) => {
            let config = load_client_config(cli.config.as_deref(), cli.server)?;
            run_watch(&config, args).await?;
        }
        Commands::Start => {
            let client = api_client(cli.config.as_deref(), cli.server)?;
            let message = client.start().await?;
            Display::show_message(&message);
        }
        Commands::Reset => {
            let client = api_client(cli.config.as_deref(), cli.server)?;
            let message = client.reset().await?;
            Display::show_message(&message);
        }
        Commands::Status => {
            let client = api_client(cli.config.as_deref(), cli.server)?;
            let state = client.read().await?;
            Display::show_status(&state);
        }
        Commands::Task(task) => {
            let client = api_client(cli.config.as_deref(), cli.server)?;
            run_task(&client, task).await?;
        }
        Commands::Completions { shell } => generate_completions(shell),
    }

    Ok(())
}

/// Loads the client config and applies the `--server` override.
fn load_client_config(path: Option<&Path>, server: Option<String>) -> Result<ClientConfig> {
    let mut config = ClientConfig::load(path)?;
    if let Some(server) = server {
        config.server_url = server;
    }
    tracing::info!("using server {}", config.server_url);
    Ok(config)
}

fn api_client(path: Option<&Path>, server: Option<String>) -> Result<ApiClient> {
    let config = load_client_config(path, server)?;
    Ok(ApiClient::new(&config)?)
}

/// Runs the authority server until Ctrl-C.
async fn run_server(args: ServeArgs) -> Result<()> {
    let config = PomodoroConfig::default()
        .with_work_minutes(args.work)
        .with_break_minutes(args.break_time);
    config.validate().map_err(anyhow::Error::msg)?;

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("{} にバインドできません", addr))?;

    let (state, events) = AppState::with_event_log(config);
    Display::show_serving(&addr);

    server::serve(listener, state, shutdown_signal()).await?;
    events.abort();
    Ok(())
}

/// Follows the shared timer in the terminal until Ctrl-C.
async fn run_watch(config: &ClientConfig, args: WatchArgs) -> Result<()> {
    let authority = ApiClient::new(config)?;
    let client = TimerSyncClient::new(
        authority,
        TerminalView,
        ConsoleNotifier,
        SyncOptions::from(config),
    );

    // Failures are already reported through the notifier.
    if client.load().await.is_none() {
        std::process::exit(1);
    }
    if args.start {
        if let StartOutcome::Failed(_) = client.start().await {
            std::process::exit(1);
        }
    }

    shutdown_signal().await;
    client.cancel_loop();
    println!();
    Ok(())
}

async fn run_task(client: &ApiClient, command: TaskCommands) -> Result<()> {
    match command {
        TaskCommands::List => {
            let tasks = client.list_tasks().await?;
            Display::show_tasks(&tasks);
        }
        TaskCommands::Add { description } => {
            Display::show_message(&client.add_task(&description).await?);
        }
        TaskCommands::Done { id } => {
            Display::show_message(&client.complete_task(id).await?);
        }
        TaskCommands::Delete { id } => {
            Display::show_message(&client.delete_task(id).await?);
        }
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for Ctrl-C: {}", e);
    }
}

/// Generates shell completion scripts.
fn generate_completions(shell: clap_complete::Shell) {
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}

// ============================================================================
// Tests
// ============================================================================
