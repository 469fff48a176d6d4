//! Core data types for the Pomodoro sync client and its authority.
//!
//! This module defines the data structures used for:
//! - Timer state and its work/break mode
//! - Authority configuration with validation
//! - JSON request/response bodies shared by client and server
//! - Task list entries

use serde::{Deserialize, Serialize};

// ============================================================================
// TimerMode
// ============================================================================

/// Phase of the Pomodoro cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TimerMode {
    /// Focused work session
    #[default]
    Work,
    /// Break between work sessions
    Break,
}

impl TimerMode {
    /// Maps the wire-level `is_break` flag to a mode.
    pub fn from_is_break(is_break: bool) -> Self {
        if is_break {
            TimerMode::Break
        } else {
            TimerMode::Work
        }
    }

    /// Returns the string representation of the mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerMode::Work => "work",
            TimerMode::Break => "break",
        }
    }

    /// Returns the label shown to the user.
    pub fn label(&self) -> &'static str {
        match self {
            TimerMode::Work => "作業",
            TimerMode::Break => "休憩",
        }
    }

    /// Returns the other mode.
    pub fn flipped(&self) -> Self {
        match self {
            TimerMode::Work => TimerMode::Break,
            TimerMode::Break => TimerMode::Work,
        }
    }
}

// ============================================================================
// PomodoroConfig
// ============================================================================

/// Durations used by the timer authority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PomodoroConfig {
    /// Work duration in minutes (1-120)
    pub work_minutes: u32,
    /// Break duration in minutes (1-60)
    pub break_minutes: u32,
}

impl Default for PomodoroConfig {
    fn default() -> Self {
        Self {
            work_minutes: 25,
            break_minutes: 5,
        }
    }
}

impl PomodoroConfig {
    /// Creates a new configuration with the specified work duration.
    pub fn with_work_minutes(mut self, minutes: u32) -> Self {
        self.work_minutes = minutes;
        self
    }

    /// Creates a new configuration with the specified break duration.
    pub fn with_break_minutes(mut self, minutes: u32) -> Self {
        self.break_minutes = minutes;
        self
    }

    /// Full length of a session in the given mode, in seconds.
    pub fn duration_secs(&self, mode: TimerMode) -> u32 {
        match mode {
            TimerMode::Work => self.work_minutes * 60,
            TimerMode::Break => self.break_minutes * 60,
        }
    }

    /// Validates the configuration.
    ///
    /// Returns an error message if validation fails.
    pub fn validate(&self) -> Result<(), String> {
        if self.work_minutes < 1 || self.work_minutes > 120 {
            return Err("作業時間は1-120分の範囲で指定してください".to_string());
        }
        if self.break_minutes < 1 || self.break_minutes > 60 {
            return Err("休憩時間は1-60分の範囲で指定してください".to_string());
        }
        Ok(())
    }
}

// ============================================================================
// TimerState
// ============================================================================

/// Authoritative timer state as read from the authority.
///
/// The client only ever holds a projection of this value; the authority's
/// copy is the source of truth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    /// Remaining seconds in the current mode
    pub time_left: u32,
    /// Whether the current mode is a break
    pub is_break: bool,
    /// Whether the authority is counting down
    pub is_running: bool,
}

impl TimerState {
    /// Creates the stopped state at the start of a work session.
    pub fn initial(config: &PomodoroConfig) -> Self {
        Self {
            time_left: config.duration_secs(TimerMode::Work),
            is_break: false,
            is_running: false,
        }
    }

    /// Returns the current mode.
    pub fn mode(&self) -> TimerMode {
        TimerMode::from_is_break(self.is_break)
    }
}

/// Body of a successful tick response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickReport {
    /// Remaining seconds after the tick; 0 when the session just finished
    pub time_left: u32,
    /// Mode the tick was applied to
    pub is_break: bool,
    /// Running flag after the tick; some authorities omit it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_running: Option<bool>,
}

impl TickReport {
    /// Returns true if this tick finished the session.
    pub fn is_complete(&self) -> bool {
        self.time_left == 0
    }

    /// Running flag after the tick.
    ///
    /// Without an explicit flag, a successful tick leaves the timer running
    /// unless it just ran out.
    pub fn running(&self) -> bool {
        self.is_running.unwrap_or(self.time_left > 0)
    }

    /// Converts the report into the projection it implies.
    pub fn as_state(&self) -> TimerState {
        TimerState {
            time_left: self.time_left,
            is_break: self.is_break,
            is_running: self.running(),
        }
    }
}

/// Formats seconds as zero-padded `MM:SS`.
pub fn format_time(total_seconds: u32) -> String {
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}

// ============================================================================
// Tasks
// ============================================================================

/// One entry of the task list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub description: String,
    pub completed: bool,
}

/// Body of the task list response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskList {
    pub tasks: Vec<Task>,
}

/// Form body for adding a task.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewTask {
    #[serde(default)]
    pub description: Option<String>,
}

// ============================================================================
// API Envelope
// ============================================================================

/// Status discriminator carried by every API response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiStatus {
    Success,
    Error,
}

/// Placeholder payload for responses that only carry a message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoData {}

/// JSON response envelope shared by the authority and its clients.
///
/// The payload is flattened next to `status` and `message`, so a timer read
/// looks like `{"status":"success","time_left":1500,...}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// "success" or "error"
    pub status: ApiStatus,
    /// Human-readable message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Operation-specific payload
    #[serde(flatten)]
    pub data: Option<T>,
}

/// Response that carries only a message.
pub type MessageResponse = ApiResponse<NoData>;

impl<T> ApiResponse<T> {
    /// Creates a success response with a payload.
    pub fn success(data: T) -> Self {
        Self {
            status: ApiStatus::Success,
            message: None,
            data: Some(data),
        }
    }

    /// Creates a success response with only a message.
    pub fn success_message(message: impl Into<String>) -> Self {
        Self {
            status: ApiStatus::Success,
            message: Some(message.into()),
            data: None,
        }
    }

    /// Creates an error response.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ApiStatus::Error,
            message: Some(message.into()),
            data: None,
        }
    }

    /// Returns true if the status is "success".
    pub fn is_success(&self) -> bool {
        self.status == ApiStatus::Success
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // ------------------------------------------------------------------------
    // TimerMode Tests
    // ------------------------------------------------------------------------

    mod timer_mode_tests {
        use super::*;

        #[test]
        fn test_default_is_work() {
            assert_eq!(TimerMode::default(), TimerMode::Work);
        }

        #[test]
        fn test_from_is_break() {
            assert_eq!(TimerMode::from_is_break(false), TimerMode::Work);
            assert_eq!(TimerMode::from_is_break(true), TimerMode::Break);
        }

        #[test]
        fn test_flipped() {
            assert_eq!(TimerMode::Work.flipped(), TimerMode::Break);
            assert_eq!(TimerMode::Break.flipped(), TimerMode::Work);
        }

        #[test]
        fn test_serialize() {
            let json = serde_json::to_string(&TimerMode::Break).unwrap();
            assert_eq!(json, "\"break\"");
            assert_eq!(TimerMode::Break.as_str(), "break");
        }
    }

    // ------------------------------------------------------------------------
    // PomodoroConfig Tests
    // ------------------------------------------------------------------------

    mod pomodoro_config_tests {
        use super::*;

        #[test]
        fn test_default_values() {
            let config = PomodoroConfig::default();
            assert_eq!(config.work_minutes, 25);
            assert_eq!(config.break_minutes, 5);
            assert_eq!(config.duration_secs(TimerMode::Work), 1500);
            assert_eq!(config.duration_secs(TimerMode::Break), 300);
        }

        #[test]
        fn test_builder_pattern() {
            let config = PomodoroConfig::default()
                .with_work_minutes(50)
                .with_break_minutes(10);
            assert_eq!(config.duration_secs(TimerMode::Work), 3000);
            assert_eq!(config.duration_secs(TimerMode::Break), 600);
        }

        #[test]
        fn test_validate_boundary_values() {
            assert!(PomodoroConfig::default()
                .with_work_minutes(1)
                .with_break_minutes(1)
                .validate()
                .is_ok());
            assert!(PomodoroConfig::default()
                .with_work_minutes(120)
                .with_break_minutes(60)
                .validate()
                .is_ok());
        }

        #[test]
        fn test_validate_out_of_range() {
            assert!(PomodoroConfig::default().with_work_minutes(0).validate().is_err());
            assert!(PomodoroConfig::default().with_work_minutes(121).validate().is_err());
            assert!(PomodoroConfig::default().with_break_minutes(0).validate().is_err());
            assert!(PomodoroConfig::default().with_break_minutes(61).validate().is_err());
        }
    }

    // ------------------------------------------------------------------------
    // TimerState / TickReport Tests
    // ------------------------------------------------------------------------

    mod timer_state_tests {
        use super::*;

        #[test]
        fn test_initial_state() {
            let state = TimerState::initial(&PomodoroConfig::default());
            assert_eq!(state.time_left, 1500);
            assert!(!state.is_break);
            assert!(!state.is_running);
            assert_eq!(state.mode(), TimerMode::Work);
        }

        #[test]
        fn test_tick_report_completion() {
            let report = TickReport {
                time_left: 0,
                is_break: false,
                is_running: Some(false),
            };
            assert!(report.is_complete());

            let report = TickReport {
                time_left: 1,
                is_break: false,
                is_running: Some(true),
            };
            assert!(!report.is_complete());
            assert_eq!(report.as_state().time_left, 1);
        }

        #[test]
        fn test_tick_report_without_running_flag() {
            let report: TickReport =
                serde_json::from_str(r#"{"time_left":42,"is_break":true}"#).unwrap();
            assert_eq!(report.time_left, 42);
            assert!(report.is_break);
            assert_eq!(report.is_running, None);
            assert!(report.running());
            assert!(report.as_state().is_running);
        }

        #[test]
        fn test_tick_report_final_tick_without_running_flag() {
            let report: TickReport =
                serde_json::from_str(r#"{"time_left":0,"is_break":false}"#).unwrap();
            assert!(report.is_complete());
            assert!(!report.as_state().is_running);
        }

        #[test]
        fn test_tick_report_explicit_flag_wins() {
            let report = TickReport {
                time_left: 10,
                is_break: false,
                is_running: Some(false),
            };
            assert!(!report.as_state().is_running);
        }
    }

    // ------------------------------------------------------------------------
    // format_time Tests
    // ------------------------------------------------------------------------

    mod format_time_tests {
        use super::*;

        #[test]
        fn test_format_time_zero() {
            assert_eq!(format_time(0), "00:00");
        }

        #[test]
        fn test_format_time_mixed() {
            assert_eq!(format_time(65), "01:05");
            assert_eq!(format_time(9), "00:09");
            assert_eq!(format_time(1500), "25:00");
        }

        #[test]
        fn test_format_time_upper_bound() {
            assert_eq!(format_time(5999), "99:59");
        }

        #[test]
        fn test_format_time_always_five_chars_in_range() {
            for seconds in (0..=5999).step_by(37) {
                let text = format_time(seconds);
                assert_eq!(text.len(), 5, "unexpected width for {}: {}", seconds, text);
                assert_eq!(&text[2..3], ":");
            }
        }
    }

    // ------------------------------------------------------------------------
    // ApiResponse Tests
    // ------------------------------------------------------------------------

    mod api_response_tests {
        use super::*;

        #[test]
        fn test_success_payload_is_flattened() {
            let response = ApiResponse::success(TimerState {
                time_left: 1500,
                is_break: false,
                is_running: true,
            });
            let json = serde_json::to_value(&response).unwrap();
            assert_eq!(json["status"], "success");
            assert_eq!(json["time_left"], 1500);
            assert_eq!(json["is_running"], true);
            assert!(json.get("message").is_none());
        }

        #[test]
        fn test_error_response_has_no_payload() {
            let response: ApiResponse<TimerState> =
                serde_json::from_str(r#"{"status":"error","message":"タイマーは実行されていません"}"#)
                    .unwrap();
            assert!(!response.is_success());
            assert!(response.data.is_none());
            assert_eq!(
                response.message.as_deref(),
                Some("タイマーは実行されていません")
            );
        }

        #[test]
        fn test_read_response_parses_state() {
            let response: ApiResponse<TimerState> = serde_json::from_str(
                r#"{"status":"success","time_left":300,"is_break":true,"is_running":false}"#,
            )
            .unwrap();
            assert!(response.is_success());
            let state = response.data.unwrap();
            assert_eq!(state.time_left, 300);
            assert!(state.is_break);
        }

        #[test]
        fn test_message_response() {
            let response = MessageResponse::success_message("ポモドーロを開始しました");
            let json = serde_json::to_string(&response).unwrap();
            assert!(json.contains("\"status\":\"success\""));
            assert!(json.contains("ポモドーロを開始しました"));
        }

        #[test]
        fn test_unknown_status_is_rejected() {
            let result: Result<MessageResponse, _> =
                serde_json::from_str(r#"{"status":"maybe","message":"?"}"#);
            assert!(result.is_err());
        }
    }
}
