use thiserror::Error;

/// Why a blob could not be read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlobReadErrorKind {
    /// Nothing is stored at the path
    NotFound,
    /// The stored payload exceeds the caller's size bound
    TooLarge,
    /// The blob store could not be reached or the transfer failed
    Transport,
}

impl std::fmt::Display for BlobReadErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(f, "not found"),
            Self::TooLarge => write!(f, "too large"),
            Self::Transport => write!(f, "transport"),
        }
    }
}

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Authentication required: {message}")]
    AuthRequired { message: String },

    #[error("Store write error: {message}")]
    StoreWrite { message: String },

    #[error("Store read error: {message}")]
    StoreRead { message: String },

    #[error("Blob write error: {path} - {message}")]
    BlobWrite { path: String, message: String },

    #[error("Blob read error ({kind}): {path} - {message}")]
    BlobRead {
        kind: BlobReadErrorKind,
        path: String,
        message: String,
    },

    #[error("Subscription error: {message}")]
    Subscription { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn auth_required(message: impl Into<String>) -> Self {
        Self::AuthRequired {
            message: message.into(),
        }
    }

    pub fn store_write(message: impl Into<String>) -> Self {
        Self::StoreWrite {
            message: message.into(),
        }
    }

    pub fn store_read(message: impl Into<String>) -> Self {
        Self::StoreRead {
            message: message.into(),
        }
    }

    pub fn blob_write(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BlobWrite {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn blob_read(
        kind: BlobReadErrorKind,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::BlobRead {
            kind,
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn blob_not_found(path: impl Into<String>) -> Self {
        Self::blob_read(BlobReadErrorKind::NotFound, path, "no blob stored at path")
    }

    pub fn blob_too_large(path: impl Into<String>, size: u64, max_bytes: usize) -> Self {
        Self::blob_read(
            BlobReadErrorKind::TooLarge,
            path,
            format!("payload of {} bytes exceeds limit of {} bytes", size, max_bytes),
        )
    }

    pub fn subscription(message: impl Into<String>) -> Self {
        Self::Subscription {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns the read failure kind for blob read errors
    pub fn blob_read_kind(&self) -> Option<BlobReadErrorKind> {
        match self {
            Self::BlobRead { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}
