//! Errors from the row store, its transport and authentication.

/// Remote row store errors.
#[derive(Debug, thiserror::Error)]
pub enum SheetsError {
    /// Service-account key could not be read or parsed.
    #[error("failed to load credentials at {path}: {reason}")]
    Credentials {
        /// Key file path.
        path: String,
        /// Error description.
        reason: String,
    },
    /// Signing the token-exchange assertion failed.
    #[error("failed to sign token assertion: {0}")]
    Jwt(String),
    /// The token endpoint refused the assertion.
    #[error("token exchange failed with status {status}: {message}")]
    TokenExchange {
        /// HTTP status.
        status: u16,
        /// Response body or error description.
        message: String,
    },
    /// Transport failure talking to the API.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    /// The Sheets API answered with a non-success status.
    #[error("Sheets API error {status}: {message}")]
    Api {
        /// HTTP status.
        status: u16,
        /// `error.message` from the response, or the raw body.
        message: String,
    },
    /// The range cannot be used for this operation.
    #[error("invalid range: {0}")]
    InvalidRange(String),
    /// Client configuration is unusable (e.g. bad base URL).
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl SheetsError {
    /// Short classification string for logging/metrics.
    pub fn error_kind(&self) -> &'static str {
        match self {
            Self::Credentials { .. } => "credentials",
            Self::Jwt(_) => "jwt",
            Self::TokenExchange { .. } => "token_exchange",
            Self::Http(_) => "http",
            Self::Api { .. } => "api",
            Self::InvalidRange(_) => "invalid_range",
            Self::Config(_) => "config",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_display() {
        let err = SheetsError::Api {
            status: 403,
            message: "The caller does not have permission".into(),
        };
        assert_eq!(
            err.to_string(),
            "Sheets API error 403: The caller does not have permission"
        );
        assert_eq!(err.error_kind(), "api");
    }

    #[test]
    fn credentials_error_mentions_path() {
        let err = SheetsError::Credentials {
            path: "/keys/sa.json".into(),
            reason: "not found".into(),
        };
        assert!(err.to_string().contains("/keys/sa.json"));
        assert!(err.to_string().contains("not found"));
    }
}
