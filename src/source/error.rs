//! Error types for fetch cycles.

use thiserror::Error;

/// Errors that can end a polling cycle.
///
/// All variants are handled the same way by the controller: the source is
/// marked FAIL and the surface shows an error placeholder until the next
/// successful cycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Request could not be sent, the connection failed, or it timed out.
    #[error("request failed: {0}")]
    Network(String),

    /// Response received but the status indicates failure.
    #[error("server returned status {0}")]
    Status(u16),

    /// Body was not valid JSON or did not have the expected shape.
    #[error("failed to parse response: {0}")]
    Parse(String),
}

impl FetchError {
    /// Short text for inline error placeholders.
    pub fn short(&self) -> String {
        match self {
            FetchError::Network(_) => "unreachable".to_string(),
            FetchError::Status(code) => format!("HTTP {}", code),
            FetchError::Parse(_) => "bad response".to_string(),
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Network("timed out".to_string())
        } else if let Some(status) = err.status() {
            FetchError::Status(status.as_u16())
        } else if err.is_decode() {
            FetchError::Parse(err.to_string())
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

impl From<std::io::Error> for FetchError {
    fn from(err: std::io::Error) -> Self {
        FetchError::Network(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_labels() {
        assert_eq!(FetchError::Network("refused".into()).short(), "unreachable");
        assert_eq!(FetchError::Status(503).short(), "HTTP 503");
        assert_eq!(FetchError::Parse("eof".into()).short(), "bad response");
    }

    #[test]
    fn test_display() {
        assert_eq!(FetchError::Status(404).to_string(), "server returned status 404");
    }
}
