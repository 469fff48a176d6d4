//! Command definitions for the pomodoro-sync CLI.
//!
//! Uses clap derive macro for argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

// ============================================================================
// CLI Structure
// ============================================================================

/// pomodoro-sync - A shared pomodoro timer with a server-side authority
#[derive(Parser, Debug)]
#[command(
    name = "pomodoro-sync",
    version,
    about = "サーバー同期型ポモドーロタイマー",
    long_about = "サーバーが保持するタイマー状態を1秒ごとに同期するポモドーロタイマー。\n\
                  `serve` でサーバーを起動し、`watch` でカウントダウンを表示します。",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Server URL (overrides the config file)
    #[arg(short, long, global = true, value_parser = validate_server_url)]
    pub server: Option<String>,

    /// Path to a JSON config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the timer authority server
    Serve(ServeArgs),

    /// Follow the shared timer in the terminal until Ctrl-C
    Watch(WatchArgs),

    /// Start the timer
    Start,

    /// Reset the timer
    Reset,

    /// Show current timer status
    Status,

    /// Manage tasks
    #[command(subcommand)]
    Task(TaskCommands),

    /// Generate shell completion scripts
    Completions {
        /// Shell type for completion script
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ============================================================================
// Serve Command Arguments
// ============================================================================

/// Arguments for the serve command
#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "8000")]
    pub port: u16,

    /// Work duration in minutes (1-120)
    #[arg(
        short,
        long,
        default_value = "25",
        value_parser = clap::value_parser!(u32).range(1..=120)
    )]
    pub work: u32,

    /// Break duration in minutes (1-60)
    #[arg(
        short,
        long,
        default_value = "5",
        value_parser = clap::value_parser!(u32).range(1..=60)
    )]
    pub break_time: u32,
}

impl Default for ServeArgs {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            work: 25,
            break_time: 5,
        }
    }
}

// ============================================================================
// Watch Command Arguments
// ============================================================================

/// Arguments for the watch command
#[derive(Args, Debug, Clone, Default)]
pub struct WatchArgs {
    /// Start the timer before following it
    #[arg(long)]
    pub start: bool,
}

// ============================================================================
// Task Subcommands
// ============================================================================

/// Task list operations
#[derive(Subcommand, Debug, Clone)]
pub enum TaskCommands {
    /// List all tasks
    List,

    /// Add a task
    Add {
        /// Task description
        #[arg(value_parser = validate_description)]
        description: String,
    },

    /// Mark a task as completed
    Done {
        /// Task id
        id: u64,
    },

    /// Delete a task
    Delete {
        /// Task id
        id: u64,
    },
}

// ============================================================================
// Validation Functions
// ============================================================================

/// Validates the task description.
///
/// - Must not be blank
/// - Must not exceed 200 characters
fn validate_description(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        return Err("タスクの説明は空にできません".to_string());
    }
    if s.chars().count() > 200 {
        return Err("タスクの説明は200文字以内にしてください".to_string());
    }
    Ok(s.to_string())
}

/// Validates the server URL.
///
/// - Must start with http:// or https:// (TLS via rustls)
fn validate_server_url(s: &str) -> Result<String, String> {
    if !(s.starts_with("http://") || s.starts_with("https://")) {
        return Err("サーバーURLは http:// または https:// で始めてください".to_string());
    }
    Ok(s.trim_end_matches('/').to_string())
}

// ============================================================================
// Tests
// ============================================================================
