use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Failed to fetch users: {0} (resource not found)")]
    NotFound(String),

    #[error("Failed to fetch users: rate limited, please wait before refreshing")]
    RateLimited,

    #[error("Failed to fetch users: server error {status}")]
    ServerError { status: u16, body: String },

    #[error("Failed to fetch users: network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Failed to fetch users: unexpected status {status}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("Failed to parse users response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            404 => ApiError::NotFound(status.to_string()),
            429 => ApiError::RateLimited,
            code @ 500..=599 => ApiError::ServerError {
                status: code,
                body: truncated,
            },
            code => ApiError::UnexpectedStatus {
                status: code,
                body: truncated,
            },
        }
    }

    /// Response body captured with a failed status, if any
    pub fn body(&self) -> Option<&str> {
        match self {
            ApiError::ServerError { body, .. } | ApiError::UnexpectedStatus { body, .. } => {
                Some(body.as_str())
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_from_status_maps_server_errors() {
        let err = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "boom");
        assert!(matches!(err, ApiError::ServerError { status: 500, .. }));
        assert_eq!(err.to_string(), "Failed to fetch users: server error 500");
        assert_eq!(err.body(), Some("boom"));
    }

    #[test]
    fn test_from_status_maps_client_errors() {
        assert!(matches!(
            ApiError::from_status(StatusCode::TOO_MANY_REQUESTS, ""),
            ApiError::RateLimited
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::NOT_FOUND, ""),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::FORBIDDEN, "nope"),
            ApiError::UnexpectedStatus { status: 403, .. }
        ));
    }

    #[test]
    fn test_truncate_body() {
        let short = "short body";
        assert_eq!(ApiError::truncate_body(short), short);

        let long = "x".repeat(MAX_ERROR_BODY_LENGTH + 20);
        let truncated = ApiError::truncate_body(&long);
        assert!(truncated.starts_with(&"x".repeat(MAX_ERROR_BODY_LENGTH)));
        assert!(truncated.contains("520 total bytes"));
    }

    #[test]
    fn test_truncate_body_respects_char_boundaries() {
        // 'é' is two bytes, so byte 500 falls mid-character
        let long = format!("a{}", "é".repeat(MAX_ERROR_BODY_LENGTH));
        let truncated = ApiError::truncate_body(&long);
        assert!(truncated.contains("truncated"));
    }
}
