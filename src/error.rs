use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SyncViewErrorCode {
    InvalidArgument,
    Internal,
    NotFound,
    PermissionDenied,
    Unauthenticated,
    Unavailable,
    DeadlineExceeded,
    ResourceExhausted,
}

impl SyncViewErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncViewErrorCode::InvalidArgument => "syncview/invalid-argument",
            SyncViewErrorCode::Internal => "syncview/internal",
            SyncViewErrorCode::NotFound => "syncview/not-found",
            SyncViewErrorCode::PermissionDenied => "syncview/permission-denied",
            SyncViewErrorCode::Unauthenticated => "syncview/unauthenticated",
            SyncViewErrorCode::Unavailable => "syncview/unavailable",
            SyncViewErrorCode::DeadlineExceeded => "syncview/deadline-exceeded",
            SyncViewErrorCode::ResourceExhausted => "syncview/resource-exhausted",
        }
    }
}

/// Error surfaced by this crate or relayed verbatim from the sync layer.
///
/// Listener observers receive these through `QueryListener::on_error`; the
/// core never inspects or retries an upstream error.
#[derive(Clone, Debug, PartialEq)]
pub struct SyncViewError {
    pub code: SyncViewErrorCode,
    message: String,
}

impl SyncViewError {
    pub fn new(code: SyncViewErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for SyncViewError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code_str())
    }
}

impl Error for SyncViewError {}

pub type SyncViewResult<T> = Result<T, SyncViewError>;

pub fn invalid_argument(message: impl Into<String>) -> SyncViewError {
    SyncViewError::new(SyncViewErrorCode::InvalidArgument, message)
}

pub fn internal_error(message: impl Into<String>) -> SyncViewError {
    SyncViewError::new(SyncViewErrorCode::Internal, message)
}

pub fn not_found(message: impl Into<String>) -> SyncViewError {
    SyncViewError::new(SyncViewErrorCode::NotFound, message)
}

pub fn permission_denied(message: impl Into<String>) -> SyncViewError {
    SyncViewError::new(SyncViewErrorCode::PermissionDenied, message)
}

pub fn unauthenticated(message: impl Into<String>) -> SyncViewError {
    SyncViewError::new(SyncViewErrorCode::Unauthenticated, message)
}

pub fn unavailable(message: impl Into<String>) -> SyncViewError {
    SyncViewError::new(SyncViewErrorCode::Unavailable, message)
}

pub fn deadline_exceeded(message: impl Into<String>) -> SyncViewError {
    SyncViewError::new(SyncViewErrorCode::DeadlineExceeded, message)
}

pub fn resource_exhausted(message: impl Into<String>) -> SyncViewError {
    SyncViewError::new(SyncViewErrorCode::ResourceExhausted, message)
}
