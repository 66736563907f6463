use serde::{Deserialize, Serialize};

/// Why a source failed to produce a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    NotFound,
    DuplicateEntry,
    AccessDenied,
    CredentialRequired,
    TransientNetwork,
    Structural,
    Unknown,
}

impl FailureKind {
    /// Terminal failures end a source's attempts immediately.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::NotFound | Self::DuplicateEntry | Self::AccessDenied | Self::CredentialRequired
        )
    }

    /// Not found and duplicate entries are expected answers, not errors.
    pub fn is_error(&self) -> bool {
        !matches!(self, Self::NotFound | Self::DuplicateEntry)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::NotFound => "not found",
            Self::DuplicateEntry => "duplicate entry",
            Self::AccessDenied => "access denied",
            Self::CredentialRequired => "credential required",
            Self::TransientNetwork => "network error",
            Self::Structural => "unexpected page structure",
            Self::Unknown => "unknown error",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_and_missing_entries_stop_retrying() {
        let retryable: Vec<_> = [
            FailureKind::NotFound,
            FailureKind::DuplicateEntry,
            FailureKind::AccessDenied,
            FailureKind::CredentialRequired,
            FailureKind::TransientNetwork,
            FailureKind::Structural,
            FailureKind::Unknown,
        ]
        .into_iter()
        .filter(|k| !k.is_terminal())
        .collect();
        assert_eq!(
            retryable,
            vec![
                FailureKind::TransientNetwork,
                FailureKind::Structural,
                FailureKind::Unknown
            ]
        );
        assert!(!FailureKind::NotFound.is_error());
        assert!(FailureKind::AccessDenied.is_error());
    }
}
