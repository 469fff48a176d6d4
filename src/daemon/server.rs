//! HTTP server for the timer authority and task list.
//!
//! Routes:
//! - `GET  /api/pomodoro`        current timer state
//! - `POST /api/pomodoro/start`  switch to running
//! - `POST /api/pomodoro/tick`   consume one second
//! - `POST /api/pomodoro/reset`  stop and rewind the current mode
//! - `GET  /api/tasks`           list tasks
//! - `POST /api/add`             add a task (form field `description`)
//! - `POST /api/complete/:id`    complete a task
//! - `POST /api/delete/:id`      delete a task

use std::future::Future;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Form, Router,
};
use tokio::net::TcpListener;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::types::{
    ApiResponse, MessageResponse, NewTask, PomodoroConfig, TaskList, TickReport, TimerState,
};

use super::tasks::{TaskBoard, TaskError};
use super::timer::{TimerEngine, TimerEvent};
use super::{RESET_MESSAGE, STARTED_MESSAGE};

// ============================================================================
// AppState
// ============================================================================

/// Shared state behind every route.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Mutex<TimerEngine>>,
    pub tasks: Arc<Mutex<TaskBoard>>,
}

impl AppState {
    /// Creates state around a fresh engine and an empty task list.
    pub fn new(config: PomodoroConfig) -> Self {
        Self::from_engine(TimerEngine::new(config))
    }

    /// Creates state around an existing engine.
    pub fn from_engine(engine: TimerEngine) -> Self {
        Self {
            engine: Arc::new(Mutex::new(engine)),
            tasks: Arc::new(Mutex::new(TaskBoard::new())),
        }
    }

    /// Creates state whose engine events are logged.
    ///
    /// Must be called inside a tokio runtime.
    pub fn with_event_log(config: PomodoroConfig) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let state = Self::from_engine(TimerEngine::with_events(config, tx));
        (state, spawn_event_logger(rx))
    }
}

/// Logs timer events until the engine is dropped.
pub fn spawn_event_logger(mut rx: mpsc::UnboundedReceiver<TimerEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                TimerEvent::Tick { time_left } => tracing::trace!("tick: {}s left", time_left),
                TimerEvent::Started { mode } => info!("timer started ({})", mode.as_str()),
                TimerEvent::WorkCompleted => info!("work session completed"),
                TimerEvent::BreakCompleted => info!("break completed"),
                TimerEvent::Reset { mode } => info!("timer reset ({})", mode.as_str()),
            }
        }
    })
}

// ============================================================================
// Router
// ============================================================================

/// Creates the HTTP router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/pomodoro", get(get_pomodoro))
        .route("/api/pomodoro/start", post(start_pomodoro))
        .route("/api/pomodoro/tick", post(tick_pomodoro))
        .route("/api/pomodoro/reset", post(reset_pomodoro))
        .route("/api/tasks", get(list_tasks))
        .route("/api/add", post(add_task))
        .route("/api/complete/:id", post(complete_task))
        .route("/api/delete/:id", post(delete_task))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves the router on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr().context("Failed to read local address")?;
    info!("Server running on http://{}", addr);

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

// ============================================================================
// Timer Handlers
// ============================================================================

/// Handle GET /api/pomodoro
async fn get_pomodoro(State(state): State<AppState>) -> Json<ApiResponse<TimerState>> {
    let snapshot = state.engine.lock().await.get_state();
    Json(ApiResponse::success(snapshot))
}

/// Handle POST /api/pomodoro/start
async fn start_pomodoro(State(state): State<AppState>) -> Json<MessageResponse> {
    state.engine.lock().await.start();
    Json(MessageResponse::success_message(STARTED_MESSAGE))
}

/// Handle POST /api/pomodoro/tick
async fn tick_pomodoro(
    State(state): State<AppState>,
) -> (StatusCode, Json<ApiResponse<TickReport>>) {
    match state.engine.lock().await.tick() {
        Ok(report) => (StatusCode::OK, Json(ApiResponse::success(report))),
        Err(e) => {
            warn!("tick rejected: {}", e);
            (StatusCode::CONFLICT, Json(ApiResponse::error(e.to_string())))
        }
    }
}

/// Handle POST /api/pomodoro/reset
async fn reset_pomodoro(State(state): State<AppState>) -> Json<MessageResponse> {
    state.engine.lock().await.reset();
    Json(MessageResponse::success_message(RESET_MESSAGE))
}

// ============================================================================
// Task Handlers
// ============================================================================

fn task_error_status(error: &TaskError) -> StatusCode {
    match error {
        TaskError::EmptyDescription | TaskError::DescriptionTooLong => StatusCode::BAD_REQUEST,
        TaskError::NotFound(_) => StatusCode::NOT_FOUND,
    }
}

fn task_result(result: Result<(), TaskError>, message: &str) -> (StatusCode, Json<MessageResponse>) {
    match result {
        Ok(()) => (
            StatusCode::OK,
            Json(MessageResponse::success_message(message)),
        ),
        Err(e) => (
            task_error_status(&e),
            Json(MessageResponse::error(e.to_string())),
        ),
    }
}

/// Handle GET /api/tasks
async fn list_tasks(State(state): State<AppState>) -> Json<ApiResponse<TaskList>> {
    let tasks = state.tasks.lock().await.list();
    Json(ApiResponse::success(TaskList { tasks }))
}

/// Handle POST /api/add
async fn add_task(
    State(state): State<AppState>,
    Form(form): Form<NewTask>,
) -> (StatusCode, Json<MessageResponse>) {
    let description = form.description.unwrap_or_default();
    let result = state.tasks.lock().await.add(&description).map(|task| {
        info!("task #{} added", task.id);
    });
    task_result(result, "タスクを追加しました")
}

/// Handle POST /api/complete/:id
async fn complete_task(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> (StatusCode, Json<MessageResponse>) {
    let result = state.tasks.lock().await.complete(id);
    task_result(result, "タスクを完了しました")
}

/// Handle POST /api/delete/:id
async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> (StatusCode, Json<MessageResponse>) {
    let result = state.tasks.lock().await.delete(id);
    task_result(result, "タスクを削除しました")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_error_status() {
        assert_eq!(
            task_error_status(&TaskError::EmptyDescription),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            task_error_status(&TaskError::NotFound(3)),
            StatusCode::NOT_FOUND
        );
    }

    #[tokio::test]
    async fn test_tick_handler_rejects_when_stopped() {
        let state = AppState::new(PomodoroConfig::default());

        let (status, Json(body)) = tick_pomodoro(State(state)).await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert!(!body.is_success());
    }

    #[tokio::test]
    async fn test_start_then_tick_handlers() {
        let state = AppState::new(PomodoroConfig::default());

        let Json(started) = start_pomodoro(State(state.clone())).await;
        assert_eq!(started.message.as_deref(), Some(STARTED_MESSAGE));

        let (status, Json(body)) = tick_pomodoro(State(state.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.data.unwrap().time_left, 1499);

        let Json(read) = get_pomodoro(State(state)).await;
        assert!(read.data.unwrap().is_running);
    }

    #[tokio::test]
    async fn test_add_task_handler_rejects_missing_description() {
        let state = AppState::new(PomodoroConfig::default());

        let (status, Json(body)) =
            add_task(State(state.clone()), Form(NewTask { description: None })).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!body.is_success());
        let Json(list) = list_tasks(State(state)).await;
        assert!(list.data.unwrap().tasks.is_empty());
    }

    #[tokio::test]
    async fn test_event_logger_exits_when_engine_dropped() {
        let (state, handle) = AppState::with_event_log(PomodoroConfig::default());
        state.engine.lock().await.start();
        drop(state);

        tokio::time::timeout(std::time::Duration::from_secs(1), handle)
            .await
            .expect("logger should exit")
            .unwrap();
    }
}
