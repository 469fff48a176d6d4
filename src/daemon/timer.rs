//! Timer engine backing the authority.
//!
//! This module provides the canonical countdown:
//! - Start/reset transitions
//! - One-second decrements driven by tick requests
//! - Work ⇄ break flip when a session runs out
//! - Event firing for logging and external integrations
//!
//! The engine never advances on its own; time only moves when a client
//! ticks it.

use tokio::sync::mpsc;

use crate::types::{PomodoroConfig, TickReport, TimerMode, TimerState};

// ============================================================================
// TimerEvent
// ============================================================================

/// Timer events for logging and external integrations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerEvent {
    /// Timer switched to running
    Started {
        /// Mode that started counting
        mode: TimerMode,
    },
    /// One second was consumed
    Tick {
        /// Remaining seconds
        time_left: u32,
    },
    /// Work session ran out; the engine is now in break mode
    WorkCompleted,
    /// Break ran out; the engine is now in work mode
    BreakCompleted,
    /// Timer was stopped and rewound to the full duration of its mode
    Reset {
        /// Mode that was rewound
        mode: TimerMode,
    },
}

// ============================================================================
// TimerError
// ============================================================================

/// Errors returned by engine transitions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimerError {
    /// A tick arrived while the timer is stopped
    #[error("タイマーは実行されていません")]
    NotRunning,
}

// ============================================================================
// TimerEngine
// ============================================================================

/// Authoritative Pomodoro countdown.
pub struct TimerEngine {
    /// Current timer state
    state: TimerState,
    /// Session durations
    config: PomodoroConfig,
    /// Optional event channel
    event_tx: Option<mpsc::UnboundedSender<TimerEvent>>,
}

impl TimerEngine {
    /// Creates a stopped engine at the start of a work session.
    pub fn new(config: PomodoroConfig) -> Self {
        Self {
            state: TimerState::initial(&config),
            config,
            event_tx: None,
        }
    }

    /// Creates an engine that reports its transitions on `event_tx`.
    pub fn with_events(config: PomodoroConfig, event_tx: mpsc::UnboundedSender<TimerEvent>) -> Self {
        Self {
            event_tx: Some(event_tx),
            ..Self::new(config)
        }
    }

    /// Switches the timer to running.
    ///
    /// Starting an already running timer succeeds without side effects.
    pub fn start(&mut self) {
        if self.state.is_running {
            tracing::debug!("start requested while already running");
            return;
        }

        self.state.is_running = true;
        self.emit(TimerEvent::Started {
            mode: self.state.mode(),
        });
    }

    /// Consumes one second.
    ///
    /// When the session runs out, the report carries `time_left = 0` and the
    /// mode that just finished, while the engine itself flips to the other
    /// mode with its full duration and stops.
    ///
    /// # Errors
    ///
    /// Returns [`TimerError::NotRunning`] if the timer is stopped.
    pub fn tick(&mut self) -> Result<TickReport, TimerError> {
        if !self.state.is_running {
            return Err(TimerError::NotRunning);
        }

        let time_left = self.state.time_left.saturating_sub(1);
        self.emit(TimerEvent::Tick { time_left });

        if time_left > 0 {
            self.state.time_left = time_left;
            return Ok(TickReport {
                time_left,
                is_break: self.state.is_break,
                is_running: Some(true),
            });
        }

        let finished = self.state.mode();
        let next = finished.flipped();
        self.state = TimerState {
            time_left: self.config.duration_secs(next),
            is_break: next == TimerMode::Break,
            is_running: false,
        };

        self.emit(match finished {
            TimerMode::Work => TimerEvent::WorkCompleted,
            TimerMode::Break => TimerEvent::BreakCompleted,
        });

        Ok(TickReport {
            time_left: 0,
            is_break: finished == TimerMode::Break,
            is_running: Some(false),
        })
    }

    /// Stops the timer and restores the full duration of the current mode.
    pub fn reset(&mut self) -> TimerState {
        let mode = self.state.mode();
        self.state.is_running = false;
        self.state.time_left = self.config.duration_secs(mode);
        self.emit(TimerEvent::Reset { mode });
        self.state
    }

    /// Returns the current timer state.
    pub fn get_state(&self) -> TimerState {
        self.state
    }

    /// Returns the configured durations.
    pub fn config(&self) -> &PomodoroConfig {
        &self.config
    }

    /// Returns a mutable reference to the timer state (for testing).
    #[cfg(test)]
    pub fn get_state_mut(&mut self) -> &mut TimerState {
        &mut self.state
    }

    fn emit(&self, event: TimerEvent) {
        if let Some(tx) = &self.event_tx {
            if tx.send(event).is_err() {
                tracing::debug!("timer event receiver dropped");
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
