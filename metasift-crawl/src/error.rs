use metasift_core::FailureKind;

/// Errors a source adapter can report for one lookup.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("no entry for this identifier")]
    NotFound,

    #[error("identifier maps to more than one entry")]
    Duplicate,

    #[error("access denied: {0}")]
    AccessDenied(String),

    #[error("credentials required: {0}")]
    CredentialRequired(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("unexpected response structure: {0}")]
    Structure(String),

    #[error("{0}")]
    Other(String),
}

impl FetchError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    pub fn structure(message: impl Into<String>) -> Self {
        Self::Structure(message.into())
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            Self::NotFound => FailureKind::NotFound,
            Self::Duplicate => FailureKind::DuplicateEntry,
            Self::AccessDenied(_) => FailureKind::AccessDenied,
            Self::CredentialRequired(_) => FailureKind::CredentialRequired,
            Self::Network(_) => FailureKind::TransientNetwork,
            Self::Structure(_) => FailureKind::Structural,
            Self::Other(_) => FailureKind::Unknown,
        }
    }

    /// Map an HTTP status onto a fetch error, or `None` for success codes.
    pub fn from_status(status: reqwest::StatusCode) -> Option<Self> {
        use reqwest::StatusCode;

        if status.is_success() {
            return None;
        }
        Some(match status {
            StatusCode::NOT_FOUND | StatusCode::GONE => Self::NotFound,
            StatusCode::CONFLICT | StatusCode::MULTIPLE_CHOICES => Self::Duplicate,
            StatusCode::UNAUTHORIZED => Self::CredentialRequired(status.to_string()),
            StatusCode::FORBIDDEN | StatusCode::UNAVAILABLE_FOR_LEGAL_REASONS => {
                Self::AccessDenied(status.to_string())
            }
            s if s.is_server_error() || s == StatusCode::TOO_MANY_REQUESTS => {
                Self::Network(format!("HTTP {}", s))
            }
            s => Self::Other(format!("HTTP {}", s)),
        })
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            return Self::Structure(e.to_string());
        }
        if let Some(err) = e.status().and_then(Self::from_status) {
            return err;
        }
        Self::Network(e.to_string())
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        Self::Structure(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn status_mapping() {
        assert!(FetchError::from_status(StatusCode::OK).is_none());
        let kind = |s| FetchError::from_status(s).map(|e| e.kind());
        assert_eq!(kind(StatusCode::NOT_FOUND), Some(FailureKind::NotFound));
        assert_eq!(kind(StatusCode::CONFLICT), Some(FailureKind::DuplicateEntry));
        assert_eq!(kind(StatusCode::FORBIDDEN), Some(FailureKind::AccessDenied));
        assert_eq!(
            kind(StatusCode::UNAUTHORIZED),
            Some(FailureKind::CredentialRequired)
        );
        assert_eq!(
            kind(StatusCode::BAD_GATEWAY),
            Some(FailureKind::TransientNetwork)
        );
        assert_eq!(kind(StatusCode::IM_A_TEAPOT), Some(FailureKind::Unknown));
    }

    #[test]
    fn json_errors_are_structural() {
        let err: FetchError = serde_json::from_str::<u32>("{").unwrap_err().into();
        assert_eq!(err.kind(), FailureKind::Structural);
    }
}
