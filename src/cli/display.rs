//! Display utilities for the pomodoro-sync CLI.
//!
//! This module provides formatted output for:
//! - Success messages
//! - Error messages
//! - Timer status
//! - Task lists

use crate::types::{format_time, Task, TimerState};

// ============================================================================
// Display
// ============================================================================

/// Display utilities for CLI output.
pub struct Display;

impl Display {
    /// Shows a success message returned by the server.
    pub fn show_message(message: &str) {
        println!("* {}", message);
    }

    /// Shows the current timer status.
    pub fn show_status(state: &TimerState) {
        println!("{}", Self::status_text(state));
    }

    /// Shows the task list.
    pub fn show_tasks(tasks: &[Task]) {
        println!("{}", Self::task_list_text(tasks));
    }

    /// Shows the address the server listens on.
    pub fn show_serving(addr: &str) {
        println!("* サーバーを起動しました: http://{}", addr);
        println!("  Ctrl-C で停止します");
    }

    /// Shows an error message.
    pub fn show_error(message: &str) {
        eprintln!("エラー: {}", message);
    }

    fn status_text(state: &TimerState) -> String {
        let mode = state.mode().label();
        let running = if state.is_running { "実行中" } else { "停止中" };
        format!(
            "ポモドーロタイマー ステータス\n\
             ─────────────────────────────\n\
             モード: {}\n\
             状態: {}\n\
             残り時間: {}",
            mode,
            running,
            format_time(state.time_left)
        )
    }

    fn task_list_text(tasks: &[Task]) -> String {
        if tasks.is_empty() {
            return "タスクはありません".to_string();
        }
        tasks
            .iter()
            .map(|task| {
                let mark = if task.completed { "x" } else { " " };
                format!("[{}] #{} {}", mark, task.id, task.description)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

// ============================================================================
// Tests
// ============================================================================
