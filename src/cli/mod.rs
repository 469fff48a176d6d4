//! CLI module for pomodoro-sync.
//!
//! This module provides the command-line interface:
//! - `commands`: Command definitions using clap derive
//! - `client`: HTTP client for the timer server
//! - `display`: Output formatting and display logic

pub mod client;
pub mod commands;
pub mod display;

pub use client::ApiClient;
pub use commands::{Cli, Commands, ServeArgs, TaskCommands, WatchArgs};
pub use display::Display;
