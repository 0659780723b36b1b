// portal/src/api.rs
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde_json::Value;
use thiserror::Error;
use url::Url;

use common::models::session::{ChangePasswordRequest, Credentials, LoginResponse};
use common::models::student::Student;

// Generic fallbacks when the backend returns no usable error payload
const GENERIC_LOGIN_ERROR: &str = "Unable to sign in. Please check the credentials and try again.";
const GENERIC_PASSWORD_ERROR: &str = "Unable to change password. Please try again.";
const GENERIC_ROSTER_ERROR: &str = "Failed to fetch students.";
const GENERIC_STUDENT_ERROR: &str = "Failed to fetch student.";

/// Errors surfaced by the authentication and roster endpoints
#[derive(Debug, Error)]
pub enum AuthError {
    /// The server rejected the request. Carries the user-displayable
    /// message already resolved from the error payload.
    #[error("{0}")]
    Rejected(String),
    /// The endpoint could not be reached
    #[error("{0}")]
    Transport(String),
    /// Persisting the session failed after a successful authentication
    #[error("Unable to persist the session: {0}")]
    Storage(#[from] std::io::Error),
}

impl AuthError {
    /// Message suitable for inline display next to the form
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

/// Backend collaborator seam.
///
/// The production implementation speaks HTTP via `reqwest`; tests substitute
/// an in-memory fake. The bearer slot lives behind this trait so the session
/// manager can keep it in sync without knowing the transport.
#[async_trait]
pub trait PortalApi: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, AuthError>;

    async fn change_password(&self, request: &ChangePasswordRequest) -> Result<(), AuthError>;

    async fn fetch_students(&self) -> Result<Vec<Student>, AuthError>;

    async fn fetch_student(&self, id: i64) -> Result<Student, AuthError>;

    /// Keep the default authorization header in sync with the current
    /// token. Written exclusively by the session manager.
    fn set_bearer(&self, token: Option<&str>);
}

/// HTTP client for the portal backend
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    bearer: Arc<Mutex<Option<String>>>,
}

impl ApiClient {
    /// Validate the base URL once at construction so endpoint formatting
    /// can never fail later.
    pub fn new(base_url: &str) -> Result<Self, url::ParseError> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))?;
        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            bearer: Arc::new(Mutex::new(None)),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    // Attach the current bearer token, mirroring a shared default header:
    // callers never set authorization themselves.
    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let bearer = self.bearer.lock().unwrap().clone();
        match bearer {
            Some(token) => builder.header(AUTHORIZATION, format!("Bearer {}", token)),
            None => builder,
        }
    }

    // Resolve a user-displayable message: server payload first, then the
    // caller's generic fallback.
    async fn rejection(response: reqwest::Response, generic: &str) -> AuthError {
        let message = response
            .json::<Value>()
            .await
            .ok()
            .and_then(|body| payload_message(&body))
            .unwrap_or_else(|| generic.to_string());
        AuthError::Rejected(message)
    }

    fn transport(error: reqwest::Error) -> AuthError {
        AuthError::Transport(error.to_string())
    }
}

fn payload_message(body: &Value) -> Option<String> {
    ["message", "error"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}

#[async_trait]
impl PortalApi for ApiClient {
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, AuthError> {
        let response = self
            .authorized(self.http.post(self.endpoint("/auth/login")))
            .json(credentials)
            .send()
            .await
            .map_err(Self::transport)?;

        if !response.status().is_success() {
            return Err(Self::rejection(response, GENERIC_LOGIN_ERROR).await);
        }

        response
            .json::<LoginResponse>()
            .await
            .map_err(Self::transport)
    }

    async fn change_password(&self, request: &ChangePasswordRequest) -> Result<(), AuthError> {
        let response = self
            .authorized(self.http.post(self.endpoint("/auth/change-password")))
            .json(request)
            .send()
            .await
            .map_err(Self::transport)?;

        if !response.status().is_success() {
            return Err(Self::rejection(response, GENERIC_PASSWORD_ERROR).await);
        }

        Ok(())
    }

    async fn fetch_students(&self) -> Result<Vec<Student>, AuthError> {
        let response = self
            .authorized(self.http.get(self.endpoint("/students")))
            .send()
            .await
            .map_err(Self::transport)?;

        if !response.status().is_success() {
            return Err(Self::rejection(response, GENERIC_ROSTER_ERROR).await);
        }

        // A non-array body is treated as an empty roster
        let body = response.json::<Value>().await.map_err(Self::transport)?;
        match body {
            Value::Array(_) => {
                serde_json::from_value(body).map_err(|e| AuthError::Transport(e.to_string()))
            }
            _ => Ok(Vec::new()),
        }
    }

    async fn fetch_student(&self, id: i64) -> Result<Student, AuthError> {
        let response = self
            .authorized(self.http.get(self.endpoint(&format!("/students/{}", id))))
            .send()
            .await
            .map_err(Self::transport)?;

        if !response.status().is_success() {
            return Err(Self::rejection(response, GENERIC_STUDENT_ERROR).await);
        }

        response.json::<Student>().await.map_err(Self::transport)
    }

    fn set_bearer(&self, token: Option<&str>) {
        let mut bearer = self.bearer.lock().unwrap();
        *bearer = token.map(str::to_string);
    }
}
