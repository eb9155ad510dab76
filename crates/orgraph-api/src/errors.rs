use serde::{Deserialize, Serialize};

/// Error body returned by the backend, also used for client-side failures
/// that never reached the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new("invalid_argument", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("not_found", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("internal", message)
    }

    /// FastAPI-style bodies carry `{"detail": "..."}` instead of
    /// `{code, message}`; accept both.
    pub fn from_body(status: u16, body: &str) -> Self {
        if let Ok(err) = serde_json::from_str::<ApiError>(body) {
            return err;
        }
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(body)
            && let Some(detail) = value.get("detail")
        {
            let message = detail
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| detail.to_string());
            return Self::new(format!("http_{status}"), message);
        }
        let snippet: String = body.chars().take(200).collect();
        Self::new(format!("http_{status}"), snippet)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}
