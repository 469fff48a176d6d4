//! Timer sync client.
//!
//! Keeps a locally ticking countdown consistent with the authority:
//! - `authority`: the remote source of truth
//! - `view`: render targets for the local projection
//!
//! The client owns exactly one loop-state machine. A tick loop is a spawned
//! task that fires on a fixed cadence; at most one exists at a time. Each
//! loop incarnation has a generation number, and every cancellation bumps it
//! before any network I/O, so a tick response that was already in flight
//! when the loop was cancelled is discarded instead of rendered.

pub mod authority;
pub mod view;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::config::{ClientConfig, TickFailurePolicy};
use crate::notification::{Notification, NotificationSink};
use crate::types::TimerState;

pub use authority::{AuthorityError, TimerAuthority};
pub use view::{MockTimerView, RenderError, TerminalView, TimerView};

// ============================================================================
// Options & Outcomes
// ============================================================================

/// Tick loop settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    /// Tick cadence
    pub tick_interval: Duration,
    /// Behaviour on failed ticks
    pub failure_policy: TickFailurePolicy,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(1),
            failure_policy: TickFailurePolicy::default(),
        }
    }
}

impl From<&ClientConfig> for SyncOptions {
    fn from(config: &ClientConfig) -> Self {
        Self {
            tick_interval: config.tick_interval(),
            failure_policy: config.tick_failure_policy,
        }
    }
}

/// Result of [`TimerSyncClient::start`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    /// The authority accepted and a new tick loop is running
    Started,
    /// A tick loop was already active; nothing was requested or spawned
    AlreadyActive,
    /// A reset happened while the request was in flight; no loop was spawned
    Superseded,
    /// The request failed; the failure was reported
    Failed(AuthorityError),
}

/// Result of a single tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Time advanced and the new state was rendered
    Advanced(TimerState),
    /// The session finished; the loop stopped and a completion was notified
    Completed(TimerState),
    /// The tick failed and the loop keeps running
    Failed(AuthorityError),
    /// The tick failed and the failure policy stopped the loop
    Halted(AuthorityError),
    /// The loop was cancelled while the request was in flight; response dropped
    Stale,
    /// No tick loop is active; nothing was requested
    Idle,
}

impl TickOutcome {
    /// Returns true if the loop that produced this outcome must exit.
    pub fn ends_loop(&self) -> bool {
        !matches!(self, TickOutcome::Advanced(_) | TickOutcome::Failed(_))
    }
}

// ============================================================================
// Loop State
// ============================================================================

/// State of the single tick loop.
#[derive(Debug)]
enum LoopState {
    Idle,
    Running {
        generation: u64,
        handle: JoinHandle<()>,
    },
}

#[derive(Debug)]
struct LoopControl {
    state: LoopState,
    /// Bumped on every loop start or stop
    generation: u64,
    /// Bumped on every reset; guards load/start responses
    epoch: u64,
    consecutive_failures: u32,
    /// Last applied authoritative state
    projection: Option<TimerState>,
}

impl LoopControl {
    fn new() -> Self {
        Self {
            state: LoopState::Idle,
            generation: 0,
            epoch: 0,
            consecutive_failures: 0,
            projection: None,
        }
    }

    fn running_generation(&self) -> Option<u64> {
        match self.state {
            LoopState::Running { generation, .. } => Some(generation),
            LoopState::Idle => None,
        }
    }

    fn is_current(&self, generation: u64) -> bool {
        self.running_generation() == Some(generation)
    }

    /// Stops the loop from the inside; the task notices and exits.
    fn halt(&mut self) {
        self.generation += 1;
        self.state = LoopState::Idle;
    }

    /// Stops the loop from the outside and aborts its task.
    fn cancel(&mut self) {
        self.generation += 1;
        self.epoch += 1;
        if let LoopState::Running { handle, .. } =
            std::mem::replace(&mut self.state, LoopState::Idle)
        {
            handle.abort();
        }
    }
}

// ============================================================================
// TimerSyncClient
// ============================================================================

struct Inner<A, V, N> {
    authority: A,
    view: V,
    notifier: N,
    options: SyncOptions,
    control: Mutex<LoopControl>,
}

/// Controller that mirrors the authority's timer and drives the tick loop.
///
/// Cloning yields another handle to the same controller.
pub struct TimerSyncClient<A, V, N> {
    inner: Arc<Inner<A, V, N>>,
}

impl<A, V, N> Clone for TimerSyncClient<A, V, N> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A, V, N> TimerSyncClient<A, V, N>
where
    A: TimerAuthority,
    V: TimerView,
    N: NotificationSink,
{
    /// Creates a controller with no tick loop.
    pub fn new(authority: A, view: V, notifier: N, options: SyncOptions) -> Self {
        Self {
            inner: Arc::new(Inner {
                authority,
                view,
                notifier,
                options,
                control: Mutex::new(LoopControl::new()),
            }),
        }
    }

    /// Fetches the authoritative state and renders it.
    ///
    /// Starts a tick loop when the authority is running and none is active.
    /// Returns `None` if the request failed (the failure is reported) or a
    /// reset superseded it.
    pub async fn load(&self) -> Option<TimerState> {
        let epoch = self.control().epoch;

        let state = match self.inner.authority.read().await {
            Ok(state) => state,
            Err(e) => {
                self.report("load", &e);
                return None;
            }
        };

        let mut control = self.control();
        if control.epoch != epoch {
            tracing::debug!("discarding load response superseded by reset");
            return None;
        }
        control.projection = Some(state);
        self.render(&state);
        if state.is_running {
            self.ensure_loop(&mut control);
        }
        Some(state)
    }

    /// Asks the authority to run and starts the tick loop.
    ///
    /// Suppressed entirely while a loop is already active.
    pub async fn start(&self) -> StartOutcome {
        let epoch = {
            let control = self.control();
            if control.running_generation().is_some() {
                tracing::debug!("start suppressed: tick loop already active");
                return StartOutcome::AlreadyActive;
            }
            control.epoch
        };

        match self.inner.authority.start().await {
            Ok(message) => {
                self.inner.notifier.notify(Notification::success(message));
                let mut control = self.control();
                if control.epoch != epoch {
                    tracing::debug!("start response superseded by reset");
                    StartOutcome::Superseded
                } else if self.ensure_loop(&mut control) {
                    StartOutcome::Started
                } else {
                    StartOutcome::AlreadyActive
                }
            }
            Err(e) => {
                self.report("start", &e);
                StartOutcome::Failed(e)
            }
        }
    }

    /// Advances the authority by one second and applies the response.
    ///
    /// Normally driven by the tick loop; does nothing while no loop is active.
    pub async fn tick(&self) -> TickOutcome {
        let generation = self.control().running_generation();
        match generation {
            Some(generation) => self.tick_for(generation).await,
            None => TickOutcome::Idle,
        }
    }

    /// Cancels the tick loop, resets the authority, then reloads.
    ///
    /// The loop is cancelled before the reset request is sent, and any tick
    /// response still in flight is discarded.
    pub async fn reset(&self) -> Option<TimerState> {
        self.cancel_loop();

        match self.inner.authority.reset().await {
            Ok(message) => self.inner.notifier.notify(Notification::success(message)),
            Err(e) => self.report("reset", &e),
        }

        self.load().await
    }

    /// Cancels the tick loop without contacting the authority.
    pub fn cancel_loop(&self) {
        let mut control = self.control();
        if control.running_generation().is_some() {
            tracing::debug!("cancelling tick loop");
        }
        control.cancel();
    }

    /// Returns true if a tick loop is active.
    pub fn is_loop_active(&self) -> bool {
        self.control().running_generation().is_some()
    }

    /// Returns the last applied authoritative state.
    pub fn projection(&self) -> Option<TimerState> {
        self.control().projection
    }

    async fn tick_for(&self, generation: u64) -> TickOutcome {
        let result = self.inner.authority.tick().await;

        match result {
            Ok(report) => {
                let state = report.as_state();
                {
                    let mut control = self.control();
                    if !control.is_current(generation) {
                        tracing::debug!("discarding stale tick response (loop {})", generation);
                        return TickOutcome::Stale;
                    }
                    control.consecutive_failures = 0;
                    control.projection = Some(state);
                    self.render(&state);
                    if report.is_complete() {
                        control.halt();
                    }
                }

                if report.is_complete() {
                    tracing::info!("{} session complete", state.mode().as_str());
                    self.inner
                        .notifier
                        .notify(Notification::session_complete(state.mode()));
                    TickOutcome::Completed(state)
                } else {
                    TickOutcome::Advanced(state)
                }
            }
            Err(e) => {
                let halted = {
                    let mut control = self.control();
                    if !control.is_current(generation) {
                        tracing::debug!("discarding stale tick failure (loop {})", generation);
                        return TickOutcome::Stale;
                    }
                    control.consecutive_failures += 1;
                    let halted = self
                        .inner
                        .options
                        .failure_policy
                        .should_stop(control.consecutive_failures);
                    if halted {
                        tracing::warn!(
                            "stopping tick loop after {} consecutive failures",
                            control.consecutive_failures
                        );
                        control.halt();
                    }
                    halted
                };

                self.report("tick", &e);
                if halted {
                    TickOutcome::Halted(e)
                } else {
                    TickOutcome::Failed(e)
                }
            }
        }
    }

    /// Spawns the tick loop unless one is running. Returns true if spawned.
    fn ensure_loop(&self, control: &mut LoopControl) -> bool {
        if control.running_generation().is_some() {
            return false;
        }

        control.generation += 1;
        control.consecutive_failures = 0;
        let generation = control.generation;
        let handle = self.spawn_loop(generation);
        control.state = LoopState::Running {
            generation,
            handle,
        };
        tracing::debug!("tick loop {} started", generation);
        true
    }

    fn spawn_loop(&self, generation: u64) -> JoinHandle<()> {
        let client = self.clone();
        let period = self.inner.options.tick_interval;

        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;

                if !client.control().is_current(generation) {
                    break;
                }

                if client.tick_for(generation).await.ends_loop() {
                    break;
                }
            }

            tracing::debug!("tick loop {} exited", generation);
        })
    }

    fn render(&self, state: &TimerState) {
        if let Err(e) = self.inner.view.render(state) {
            tracing::warn!("render skipped: {}", e);
        }
    }

    fn report(&self, operation: &str, error: &AuthorityError) {
        tracing::warn!("{} failed: {}", operation, error);
        self.inner
            .notifier
            .notify(Notification::error(error.to_string()));
    }

    fn control(&self) -> MutexGuard<'_, LoopControl> {
        self.inner
            .control
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

// ============================================================================
// Tests
// ============================================================================
