//! Journey API client error types.

/// Errors from the journey API HTTP client.
#[derive(Debug, thiserror::Error)]
pub enum VendoError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON deserialization failed
    #[error("JSON parse error: {message}{}", body.as_ref().map(|b| format!(" (body: {b})")).unwrap_or_default())]
    Json {
        message: String,
        body: Option<String>,
    },

    /// API returned an error status code
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Rate limited by the API
    #[error("rate limited by journey API")]
    RateLimited,

    /// Rejected our credentials or user agent
    #[error("unauthorized by journey API")]
    Unauthorized,

    /// Client could not be configured
    #[error("invalid client configuration: {0}")]
    Config(String),
}

impl VendoError {
    /// True when the API could not be reached at all.
    ///
    /// Connection failures count; timeouts and anything the API itself
    /// answered do not.
    pub fn is_unreachable(&self) -> bool {
        match self {
            VendoError::Http(e) => e.is_connect(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = VendoError::Api {
            status: 500,
            message: "Internal Server Error".into(),
        };
        assert_eq!(err.to_string(), "API error 500: Internal Server Error");

        let err = VendoError::Json {
            message: "expected string".into(),
            body: Some("{}".into()),
        };
        assert_eq!(err.to_string(), "JSON parse error: expected string (body: {})");

        let err = VendoError::Json {
            message: "expected string".into(),
            body: None,
        };
        assert_eq!(err.to_string(), "JSON parse error: expected string");

        assert_eq!(
            VendoError::RateLimited.to_string(),
            "rate limited by journey API"
        );
    }

    #[test]
    fn api_errors_are_not_unreachable() {
        assert!(!VendoError::RateLimited.is_unreachable());
        assert!(!VendoError::Unauthorized.is_unreachable());
        assert!(
            !VendoError::Api {
                status: 503,
                message: String::new()
            }
            .is_unreachable()
        );
    }
}
