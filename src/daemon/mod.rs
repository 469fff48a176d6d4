//! Timer authority and task server.
//!
//! This module contains the server side of the app:
//! - `timer`: authoritative countdown engine
//! - `tasks`: in-memory task list
//! - `server`: HTTP routes exposing both

pub mod server;
pub mod tasks;
pub mod timer;

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::sync::{AuthorityError, TimerAuthority};
use crate::types::{PomodoroConfig, TickReport, TimerState};

pub use server::{create_router, AppState};
pub use tasks::{TaskBoard, TaskError};
pub use timer::{TimerEngine, TimerError, TimerEvent};

/// Message returned when the timer starts.
pub const STARTED_MESSAGE: &str = "ポモドーロを開始しました";

/// Message returned when the timer is reset.
pub const RESET_MESSAGE: &str = "ポモドーロをリセットしました";

// ============================================================================
// LocalAuthority
// ============================================================================

/// In-process authority over a shared [`TimerEngine`].
///
/// Lets the sync client run against the same engine the HTTP server uses,
/// without a network hop.
#[derive(Clone)]
pub struct LocalAuthority {
    engine: Arc<Mutex<TimerEngine>>,
}

impl LocalAuthority {
    /// Wraps an existing shared engine.
    pub fn new(engine: Arc<Mutex<TimerEngine>>) -> Self {
        Self { engine }
    }

    /// Creates an authority over a fresh engine.
    pub fn with_config(config: PomodoroConfig) -> Self {
        Self::new(Arc::new(Mutex::new(TimerEngine::new(config))))
    }

    /// Returns the shared engine.
    pub fn engine(&self) -> Arc<Mutex<TimerEngine>> {
        Arc::clone(&self.engine)
    }
}

impl TimerAuthority for LocalAuthority {
    async fn read(&self) -> Result<TimerState, AuthorityError> {
        Ok(self.engine.lock().await.get_state())
    }

    async fn start(&self) -> Result<String, AuthorityError> {
        self.engine.lock().await.start();
        Ok(STARTED_MESSAGE.to_string())
    }

    async fn tick(&self) -> Result<TickReport, AuthorityError> {
        self.engine
            .lock()
            .await
            .tick()
            .map_err(|e| AuthorityError::Rejected(e.to_string()))
    }

    async fn reset(&self) -> Result<String, AuthorityError> {
        self.engine.lock().await.reset();
        Ok(RESET_MESSAGE.to_string())
    }
}
