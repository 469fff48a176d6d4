//! Render targets for the timer projection.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::types::{format_time, TimerState};

/// Rendering failures. None of them are fatal to the sync client.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    /// The output the view draws into is gone
    #[error("表示先が見つかりません: {0}")]
    MissingTarget(String),
}

/// Something that can display the timer.
pub trait TimerView: Send + Sync + 'static {
    fn render(&self, state: &TimerState) -> Result<(), RenderError>;
}

impl<V: TimerView> TimerView for std::sync::Arc<V> {
    fn render(&self, state: &TimerState) -> Result<(), RenderError> {
        (**self).render(state)
    }
}

/// Formats the one-line status shown by terminal views.
pub fn status_line(state: &TimerState) -> String {
    let running = if state.is_running { "実行中" } else { "停止中" };
    format!(
        "{}  モード: {}  ({})",
        format_time(state.time_left),
        state.mode().label(),
        running
    )
}

// ============================================================================
// TerminalView
// ============================================================================

/// Redraws a single terminal line on every render.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalView;

impl TimerView for TerminalView {
    fn render(&self, state: &TimerState) -> Result<(), RenderError> {
        let mut stdout = std::io::stdout().lock();
        write!(stdout, "\r\x1b[2K{}", status_line(state))
            .and_then(|_| stdout.flush())
            .map_err(|e| RenderError::MissingTarget(e.to_string()))
    }
}

// ============================================================================
// MockTimerView
// ============================================================================

/// Records rendered states for assertions.
#[derive(Debug, Default)]
pub struct MockTimerView {
    rendered: Mutex<Vec<TimerState>>,
    detached: AtomicBool,
}

impl MockTimerView {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulates the render target disappearing.
    pub fn set_detached(&self, detached: bool) {
        self.detached.store(detached, Ordering::SeqCst);
    }

    #[must_use]
    pub fn rendered(&self) -> Vec<TimerState> {
        self.rendered.lock().unwrap().clone()
    }

    #[must_use]
    pub fn render_count(&self) -> usize {
        self.rendered.lock().unwrap().len()
    }

    #[must_use]
    pub fn last_rendered(&self) -> Option<TimerState> {
        self.rendered.lock().unwrap().last().copied()
    }
}

impl TimerView for MockTimerView {
    fn render(&self, state: &TimerState) -> Result<(), RenderError> {
        if self.detached.load(Ordering::SeqCst) {
            return Err(RenderError::MissingTarget("mock view detached".to_string()));
        }
        self.rendered.lock().unwrap().push(*state);
        Ok(())
    }
}
