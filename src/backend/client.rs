//! Timesheet REST API Client
//!
//! HTTP client for the timesheet backend. Every request carries the bearer
//! token; without one the client refuses before touching the network.

use super::dto::{CurrentUser, Shift, TaskCategory, Timesheet, TimesheetEntry, UserSummary};
use super::error::{BackendError, BackendResult};
use super::TimesheetBackend;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

/// Configuration for the backend client
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL of the backend (e.g., "http://localhost:8080")
    pub base_url: String,
    /// Request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Timesheet backend REST client
pub struct BackendClient {
    client: Client,
    config: BackendConfig,
    token: Option<String>,
}

impl BackendClient {
    /// Create a client; `token` is the bearer token, if the user has one
    pub fn new(config: BackendConfig, token: Option<String>) -> BackendResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            config,
            token: token.filter(|t| !t.trim().is_empty()),
        })
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Authorize, send, and turn non-2xx responses into errors
    async fn send(&self, request: RequestBuilder) -> BackendResult<Response> {
        let token = self.token.as_deref().ok_or(BackendError::MissingToken)?;

        let response = request
            .bearer_auth(token)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(BackendError::from_transport)?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        tracing::warn!(status = status.as_u16(), body = %text, "Backend rejected request");

        if status == StatusCode::FORBIDDEN {
            Err(BackendError::Forbidden)
        } else {
            Err(BackendError::Rejected {
                status: status.as_u16(),
                message: text,
            })
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> BackendResult<T> {
        let url = self.url(path);
        tracing::debug!(%url, "GET");
        let response = self.send(self.client.get(&url)).await?;
        response
            .json()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))
    }

    /// Decode a timesheet echo, mirroring `entry` when the body is empty
    async fn read_echo(
        response: Response,
        entry: &TimesheetEntry,
        id: Option<i64>,
    ) -> BackendResult<Timesheet> {
        let text = response.text().await.map_err(BackendError::from_transport)?;
        if text.trim().is_empty() {
            return Ok(Timesheet::from_entry(entry, id));
        }
        serde_json::from_str(&text).map_err(|e| BackendError::Decode(e.to_string()))
    }
}

#[async_trait]
impl TimesheetBackend for BackendClient {
    async fn current_user(&self) -> BackendResult<CurrentUser> {
        self.get_json("/api/users/me").await
    }

    async fn task_categories(&self) -> BackendResult<Vec<TaskCategory>> {
        self.get_json("/api/task-categories").await
    }

    async fn shifts(&self) -> BackendResult<Vec<Shift>> {
        self.get_json("/api/shifts").await
    }

    async fn users(&self) -> BackendResult<Vec<UserSummary>> {
        self.get_json("/api/users/all").await
    }

    async fn timesheets(&self) -> BackendResult<Vec<Timesheet>> {
        self.get_json("/api/timesheets").await
    }

    async fn post_timesheet(&self, entry: &TimesheetEntry) -> BackendResult<Timesheet> {
        let url = self.url("/api/timesheets/posttimesheet");
        tracing::debug!(%url, hours_worked = %entry.hours_worked, "POST timesheet");
        let response = self.send(self.client.post(&url).json(entry)).await?;
        Self::read_echo(response, entry, None).await
    }

    async fn update_timesheet(&self, id: i64, entry: &TimesheetEntry) -> BackendResult<Timesheet> {
        let url = self.url(&format!("/api/timesheets/{}", id));
        tracing::debug!(%url, "PUT timesheet");
        let response = self.send(self.client.put(&url).json(entry)).await?;
        Self::read_echo(response, entry, Some(id)).await
    }

    async fn delete_timesheet(&self, id: i64) -> BackendResult<()> {
        let url = self.url(&format!("/api/timesheets/{}", id));
        tracing::debug!(%url, "DELETE timesheet");
        self.send(self.client.delete(&url)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::Path,
        http::{HeaderMap, StatusCode},
        routing::{delete, get, post},
        Json, Router,
    };
    use chrono::NaiveDate;

    async fn spawn_backend(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn client(base_url: String, token: Option<&str>) -> BackendClient {
        let config = BackendConfig {
            base_url,
            request_timeout_secs: 5,
        };
        BackendClient::new(config, token.map(str::to_string)).unwrap()
    }

    fn entry() -> TimesheetEntry {
        TimesheetEntry {
            work_date: NaiveDate::from_ymd_opt(2025, 4, 2).unwrap(),
            hours_worked: "03:02:05".to_string(),
            details: "Inventory".to_string(),
            category_id: 2,
            shift_id: 1,
            user_id: 7,
        }
    }

    fn bearer(headers: &HeaderMap) -> String {
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    }

    #[test]
    fn test_default_config() {
        let config = BackendConfig::default();
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn test_blank_token_is_no_token() {
        let client = client("http://localhost:8080".to_string(), Some("  "));
        assert!(!client.has_token());
    }

    #[tokio::test]
    async fn test_current_user_sends_bearer_token() {
        let router = Router::new().route(
            "/api/users/me",
            get(|headers: HeaderMap| async move {
                if bearer(&headers) != "Bearer secret" {
                    return (StatusCode::UNAUTHORIZED, Json(serde_json::json!({})));
                }
                (
                    StatusCode::OK,
                    Json(serde_json::json!({
                        "id": 1,
                        "profile": {"userid": 42, "roleName": "user"}
                    })),
                )
            }),
        );
        let base = spawn_backend(router).await;

        let user = client(base, Some("secret")).current_user().await.unwrap();
        assert_eq!(user.id, 1);
        assert_eq!(user.profile.unwrap().user_id, Some(42));
    }

    #[tokio::test]
    async fn test_missing_token_sends_nothing() {
        // Nothing listens here; a request would surface as Unavailable instead
        let client = client("http://127.0.0.1:9".to_string(), None);
        let result = client.timesheets().await;
        assert!(matches!(result, Err(BackendError::MissingToken)));
    }

    #[tokio::test]
    async fn test_post_timesheet_returns_echo() {
        let router = Router::new().route(
            "/api/timesheets/posttimesheet",
            post(|Json(mut body): Json<serde_json::Value>| async move {
                body["timesheetId"] = serde_json::json!(99);
                (StatusCode::CREATED, Json(body))
            }),
        );
        let base = spawn_backend(router).await;

        let echo = client(base, Some("t")).post_timesheet(&entry()).await.unwrap();
        assert_eq!(echo.timesheet_id, Some(99));
        assert_eq!(echo.hours_worked.as_deref(), Some("03:02:05"));
        assert_eq!(echo.work_date.as_deref(), Some("2025-04-02"));
        assert_eq!(echo.user_id, Some(7));
    }

    #[tokio::test]
    async fn test_server_error_carries_body() {
        let router = Router::new().route(
            "/api/timesheets/posttimesheet",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "database down") }),
        );
        let base = spawn_backend(router).await;

        let result = client(base, Some("t")).post_timesheet(&entry()).await;
        match result {
            Err(BackendError::Rejected { status, message }) => {
                assert_eq!(status, 500);
                assert_eq!(message, "database down");
            }
            other => panic!("expected Rejected, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_forbidden_users_listing() {
        let router = Router::new().route(
            "/api/users/all",
            get(|| async { (StatusCode::FORBIDDEN, "nope") }),
        );
        let base = spawn_backend(router).await;

        let result = client(base, Some("t")).users().await;
        assert!(matches!(result, Err(BackendError::Forbidden)));
    }

    #[tokio::test]
    async fn test_delete_and_empty_update_body() {
        let router = Router::new().route(
            "/api/timesheets/:id",
            delete(|Path(id): Path<i64>| async move {
                if id == 5 {
                    StatusCode::NO_CONTENT
                } else {
                    StatusCode::NOT_FOUND
                }
            })
            .put(|| async { StatusCode::OK }),
        );
        let base = spawn_backend(router).await;
        let client = client(base, Some("t"));

        client.delete_timesheet(5).await.unwrap();
        assert!(matches!(
            client.delete_timesheet(6).await,
            Err(BackendError::Rejected { status: 404, .. })
        ));

        let echo = client.update_timesheet(5, &entry()).await.unwrap();
        assert_eq!(echo.timesheet_id, Some(5));
        assert_eq!(echo.details.as_deref(), Some("Inventory"));
    }

    #[tokio::test]
    async fn test_undecodable_listing() {
        let router = Router::new().route("/api/shifts", get(|| async { "not json" }));
        let base = spawn_backend(router).await;

        let result = client(base, Some("t")).shifts().await;
        assert!(matches!(result, Err(BackendError::Decode(_))));
    }

    #[tokio::test]
    async fn test_connection_refused_is_unavailable() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = client(format!("http://{}", addr), Some("t"))
            .task_categories()
            .await;
        assert!(matches!(result, Err(BackendError::Unavailable)));
    }
}
