//! Error response types for the ticketdesk HTTP surface.
//!
//! Every failure rendered to a client goes through [`Problem`], an RFC 9457
//! problem document served as `application/problem+json`.

pub mod problem;

pub use problem::{
    APPLICATION_PROBLEM_JSON, Problem, bad_request, conflict, forbidden, internal_error, not_found,
    unauthorized,
};

/// Result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Problem>;
