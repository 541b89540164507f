use reqwest::StatusCode;
use thiserror::Error;

/// CJ response codes that mean the API key or access token was rejected.
const AUTH_ERROR_CODES: [i64; 3] = [1_600_001, 1_600_002, 1_600_003];

/// Errors returned by the CJ API client.
#[derive(Debug, Error)]
pub enum CjError {
    /// Network or TLS failure, or a non-2xx HTTP status.
    #[error("CJ HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The envelope carried a `code` other than 200.
    #[error("CJ API error {code}: {message}")]
    Api { code: i64, message: String },

    /// The response body did not match the expected shape.
    #[error("CJ response for {context} could not be decoded: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid CJ base URL '{0}'")]
    InvalidBaseUrl(String),
}

impl CjError {
    /// Whether the failure means the cached access token should be dropped.
    pub fn is_auth_failure(&self) -> bool {
        match self {
            CjError::Api { code, .. } => AUTH_ERROR_CODES.contains(code),
            CjError::Http(err) => matches!(
                err.status(),
                Some(StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
            ),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::CjError;

    #[test]
    fn auth_codes_are_detected() {
        let err = CjError::Api {
            code: 1_600_001,
            message: "Invalid token".into(),
        };
        assert!(err.is_auth_failure());

        let err = CjError::Api {
            code: 1_600_100,
            message: "Param error".into(),
        };
        assert!(!err.is_auth_failure());
        assert!(!CjError::InvalidBaseUrl("x".into()).is_auth_failure());
    }
}
