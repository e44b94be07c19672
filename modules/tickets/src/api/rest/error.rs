use ticketdesk_errors::{Problem, bad_request, conflict, internal_error, not_found};

use crate::domain::error::DomainError;

/// Map domain error to an RFC 9457 Problem
pub fn domain_error_to_problem(e: &DomainError) -> Problem {
    let problem = match e {
        DomainError::MissingField { .. } | DomainError::InvalidField { .. } => {
            bad_request(e.to_string()).with_code("VALIDATION")
        }
        DomainError::MissingPatchOperation
        | DomainError::MissingPatchPath
        | DomainError::MissingPatchValue
        | DomainError::InvalidPatchOperation { .. }
        | DomainError::InvalidOwnerId
        | DomainError::InvalidStatus => bad_request(e.to_string()).with_code("INVALID_PATCH"),
        DomainError::NothingToUpdate => bad_request(e.to_string()).with_code("NOTHING_TO_UPDATE"),
        DomainError::InvalidCredentials => {
            bad_request(e.to_string()).with_code("INVALID_CREDENTIALS")
        }
        DomainError::NotFound { .. } => not_found(e.to_string()),
        DomainError::EmailAlreadyExists { .. } => {
            conflict(e.to_string()).with_code("EMAIL_ALREADY_EXISTS")
        }
        DomainError::VersionConflict { .. } => conflict(e.to_string()).with_code("VERSION_CONFLICT"),
        DomainError::PasswordHashing(_) | DomainError::Signing(_) | DomainError::Store(_) => {
            internal_error("An internal error occurred")
        }
    };
    if !e.is_client_error() {
        tracing::error!(error = %e, "internal error");
    }
    problem.with_current_trace_id()
}

/// Implement From<DomainError> for Problem so `?` works in handlers
impl From<DomainError> for Problem {
    fn from(e: DomainError) -> Self {
        domain_error_to_problem(&e)
    }
}
