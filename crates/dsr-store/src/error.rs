/// Errors from repository operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The repository could not be reached or failed to serve the request
    /// (timeouts, refused connections, 5xx).
    #[error("repository unreachable at {locator}: {reason}")]
    RepositoryUnreachable { locator: String, reason: String },

    /// The repository answered, but with a status that is neither success
    /// nor "not found" (401, 403, 400, unfollowed redirects).
    #[error("unexpected status {status} from {locator}")]
    UnexpectedStatus { locator: String, status: u16 },

    /// A locator could not be turned into a request.
    #[error("invalid locator: {0}")]
    InvalidLocator(String),

    /// Repository configuration could not be loaded or parsed.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error while reading configuration.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub(crate) fn unreachable(locator: impl ToString, reason: impl ToString) -> Self {
        Self::RepositoryUnreachable {
            locator: locator.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Map a status that is neither success nor "not found": 5xx means the
    /// repository failed, anything else is a refusal it answered with.
    pub(crate) fn from_status(locator: impl ToString, status: u16) -> Self {
        if (500..=599).contains(&status) {
            Self::unreachable(locator, format!("server error {status}"))
        } else {
            Self::UnexpectedStatus {
                locator: locator.to_string(),
                status,
            }
        }
    }

    /// Returns `true` for transport-level failures.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::RepositoryUnreachable { .. })
    }

    /// The HTTP status of an answered but unexpected response.
    pub fn unexpected_status(&self) -> Option<u16> {
        match self {
            Self::UnexpectedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<dsr_types::TypeError> for StoreError {
    fn from(e: dsr_types::TypeError) -> Self {
        Self::InvalidLocator(e.to_string())
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
