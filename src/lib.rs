//! pomodoro-sync library
//!
//! A pomodoro timer whose state lives on a server (the authority) and is
//! mirrored by any number of clients. It includes:
//! - Timer engine and task board behind an axum HTTP server
//! - Timer sync client that keeps a local countdown consistent with the
//!   authority, with at most one tick loop at a time
//! - reqwest-based authority client with retries and timeouts
//! - Terminal view and console notifications, plus mocks for tests
//! - Client configuration loaded from JSON
//! - CLI command parsing and display utilities

pub mod cli;
pub mod config;
pub mod daemon;
pub mod notification;
pub mod sync;
pub mod types;

// Re-export commonly used types for convenience
pub use types::{
    format_time, ApiResponse, ApiStatus, PomodoroConfig, Task, TickReport, TimerMode, TimerState,
};

pub use config::{ClientConfig, ConfigError, TickFailurePolicy};

pub use daemon::{AppState, LocalAuthority, TaskBoard, TimerEngine};

pub use notification::{ConsoleNotifier, MockNotifier, Notification, NotificationSink};

pub use sync::{
    AuthorityError, MockTimerView, RenderError, StartOutcome, SyncOptions, TerminalView,
    TickOutcome, TimerAuthority, TimerSyncClient, TimerView,
};
