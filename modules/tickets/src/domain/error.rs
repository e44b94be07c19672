use thiserror::Error;
use ticketdesk_auth::TokenError;

use super::repo::StoreError;

/// Domain-specific errors using thiserror
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("missing {field}")]
    MissingField { field: &'static str },

    #[error("invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("missing patch operation")]
    MissingPatchOperation,

    #[error("missing patch path")]
    MissingPatchPath,

    #[error("missing patch value")]
    MissingPatchValue,

    #[error("invalid patch operation: {op}")]
    InvalidPatchOperation { op: String },

    #[error("invalid owner id")]
    InvalidOwnerId,

    #[error("invalid status")]
    InvalidStatus,

    #[error("nothing to update")]
    NothingToUpdate,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("{resource} not found")]
    NotFound { resource: &'static str },

    #[error("user with email '{email}' already exists")]
    EmailAlreadyExists { email: String },

    #[error("ticket {id} was modified concurrently")]
    VersionConflict { id: i64 },

    #[error("password hashing failed: {0}")]
    PasswordHashing(String),

    #[error("token signing failed: {0}")]
    Signing(#[from] TokenError),

    #[error("store error: {0}")]
    Store(String),
}

impl DomainError {
    pub fn missing(field: &'static str) -> Self {
        Self::MissingField { field }
    }

    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }

    pub fn not_found(resource: &'static str) -> Self {
        Self::NotFound { resource }
    }

    pub fn invalid_patch_operation(op: impl Into<String>) -> Self {
        Self::InvalidPatchOperation { op: op.into() }
    }

    pub fn email_already_exists(email: impl Into<String>) -> Self {
        Self::EmailAlreadyExists {
            email: email.into(),
        }
    }

    pub fn password_hashing(message: impl Into<String>) -> Self {
        Self::PasswordHashing(message.into())
    }

    /// Client errors are reported verbatim; everything else is internal.
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            Self::PasswordHashing(_) | Self::Signing(_) | Self::Store(_)
        )
    }
}

/// Store errors without a more specific meaning in the calling operation.
impl From<StoreError> for DomainError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound => Self::not_found("record"),
            StoreError::NothingToUpdate => Self::NothingToUpdate,
            StoreError::VersionConflict { id } => Self::VersionConflict { id },
            StoreError::Duplicate { field } => Self::invalid(field, "already in use"),
            StoreError::Database(message) => Self::Store(message),
        }
    }
}
