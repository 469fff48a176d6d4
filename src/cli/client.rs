//! HTTP client for the timer authority and task API.
//!
//! This module provides:
//! - [`ApiClient`], the [`TimerAuthority`] used against a remote server
//! - Envelope parsing for `{"status": ..., "message": ...}` responses
//! - Retry with linear backoff for idempotent requests
//! - Per-request timeouts
//!
//! Ticks are never retried: a retried tick could consume two seconds.

use std::time::Duration;

use reqwest::{Client, Method};
use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::sync::{AuthorityError, TimerAuthority};
use crate::types::{ApiResponse, NoData, Task, TaskList, TickReport, TimerState};

// ============================================================================
// ApiClient
// ============================================================================

/// Client for the pomodoro-sync HTTP API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    max_retries: u32,
    retry_delay: Duration,
}

impl ApiClient {
    /// Creates a client from the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, AuthorityError> {
        let http = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(transport_error)?;

        Ok(Self {
            http,
            base_url: config.server_url.trim_end_matches('/').to_string(),
            max_retries: config.max_retries.max(1),
            retry_delay: config.retry_delay(),
        })
    }

    /// Returns the base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Lists all tasks.
    pub async fn list_tasks(&self) -> Result<Vec<Task>, AuthorityError> {
        let response: ApiResponse<TaskList> = self.call(Method::GET, "/api/tasks", None, true).await?;
        Ok(require_data(response)?.tasks)
    }

    /// Adds a task. Returns the server's message.
    pub async fn add_task(&self, description: &str) -> Result<String, AuthorityError> {
        let form = [("description", description)];
        let response: ApiResponse<NoData> =
            self.call(Method::POST, "/api/add", Some(&form), false).await?;
        Ok(message_of(response))
    }

    /// Marks a task as completed. Returns the server's message.
    pub async fn complete_task(&self, id: u64) -> Result<String, AuthorityError> {
        let path = format!("/api/complete/{}", id);
        let response: ApiResponse<NoData> = self.call(Method::POST, &path, None, true).await?;
        Ok(message_of(response))
    }

    /// Deletes a task. Returns the server's message.
    pub async fn delete_task(&self, id: u64) -> Result<String, AuthorityError> {
        let path = format!("/api/delete/{}", id);
        let response: ApiResponse<NoData> = self.call(Method::POST, &path, None, false).await?;
        Ok(message_of(response))
    }

    /// Sends a request, retrying transport failures when `idempotent` is set.
    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        form: Option<&[(&str, &str)]>,
        idempotent: bool,
    ) -> Result<ApiResponse<T>, AuthorityError> {
        let attempts = if idempotent { self.max_retries } else { 1 };
        let mut attempt = 1;

        loop {
            match self.send_once(method.clone(), path, form).await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_transient() && attempt < attempts => {
                    tracing::warn!("リクエスト失敗 (試行 {}/{}): {}", attempt, attempts, e);
                    tokio::time::sleep(self.retry_delay * attempt).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Sends a single request and unwraps the status envelope.
    async fn send_once<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        form: Option<&[(&str, &str)]>,
    ) -> Result<ApiResponse<T>, AuthorityError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("{} {}", method, url);

        let mut request = self.http.request(method, &url);
        if let Some(form) = form {
            request = request.form(form);
        }

        let response = request
            .send()
            .await
            .map_err(transport_error)?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(transport_error)?;

        let envelope: ApiResponse<T> = match serde_json::from_slice(&body) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                return Err(AuthorityError::Transport(format!("HTTP {}", status)));
            }
            Err(e) => return Err(AuthorityError::Protocol(e.to_string())),
        };

        if !envelope.is_success() {
            let message = envelope
                .message
                .unwrap_or_else(|| "不明なエラー".to_string());
            return Err(AuthorityError::Rejected(message));
        }

        Ok(envelope)
    }
}

/// Maps a reqwest failure, keeping its cause chain in the message.
fn transport_error(error: reqwest::Error) -> AuthorityError {
    let mut message = error.to_string();
    let mut source = std::error::Error::source(&error);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    AuthorityError::Transport(message)
}

fn require_data<T>(response: ApiResponse<T>) -> Result<T, AuthorityError> {
    response
        .data
        .ok_or_else(|| AuthorityError::Protocol("レスポンスにデータがありません".to_string()))
}

fn message_of<T>(response: ApiResponse<T>) -> String {
    response.message.unwrap_or_default()
}

impl TimerAuthority for ApiClient {
    async fn read(&self) -> Result<TimerState, AuthorityError> {
        let response = self.call(Method::GET, "/api/pomodoro", None, true).await?;
        require_data(response)
    }

    async fn start(&self) -> Result<String, AuthorityError> {
        let response: ApiResponse<NoData> =
            self.call(Method::POST, "/api/pomodoro/start", None, true).await?;
        Ok(message_of(response))
    }

    async fn tick(&self) -> Result<TickReport, AuthorityError> {
        let response = self.call(Method::POST, "/api/pomodoro/tick", None, false).await?;
        require_data(response)
    }

    async fn reset(&self) -> Result<String, AuthorityError> {
        let response: ApiResponse<NoData> =
            self.call(Method::POST, "/api/pomodoro/reset", None, true).await?;
        Ok(message_of(response))
    }
}

// ============================================================================
// Tests
// ============================================================================
