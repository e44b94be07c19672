use thiserror::Error;

/// Failures of issuing or verifying a token.
///
/// The kinds stay distinct so operators can tell them apart in logs; the
/// access gate collapses all verification kinds into one forbidden response.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("failed to sign token: {0}")]
    Signing(String),

    #[error("invalid token signature")]
    InvalidSignature,

    #[error("unsupported signing algorithm '{alg}'")]
    UnsupportedAlgorithm { alg: String },

    #[error("token expired")]
    Expired,

    #[error("malformed token: {0}")]
    Malformed(String),
}

impl TokenError {
    pub fn signing(msg: impl Into<String>) -> Self {
        Self::Signing(msg.into())
    }

    pub fn unsupported_algorithm(alg: impl Into<String>) -> Self {
        Self::UnsupportedAlgorithm { alg: alg.into() }
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }

    /// Short label used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            TokenError::Signing(_) => "signing",
            TokenError::InvalidSignature => "invalid_signature",
            TokenError::UnsupportedAlgorithm { .. } => "unsupported_algorithm",
            TokenError::Expired => "expired",
            TokenError::Malformed(_) => "malformed",
        }
    }
}

/// Rejections produced by the access gate and the identity extractor.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authentication required: missing bearer token")]
    Unauthenticated,

    #[error("Forbidden: invalid or expired token")]
    Forbidden,

    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(feature = "axum-ext")]
impl From<AuthError> for ticketdesk_errors::Problem {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Unauthenticated => ticketdesk_errors::unauthorized(err.to_string()),
            AuthError::Forbidden => ticketdesk_errors::forbidden(err.to_string()),
            AuthError::Internal(msg) => {
                tracing::error!(error = %msg, "auth pipeline misconfigured");
                ticketdesk_errors::internal_error("An internal error occurred")
            }
        }
    }
}

#[cfg(feature = "axum-ext")]
impl axum::response::IntoResponse for AuthError {
    fn into_response(self) -> axum::response::Response {
        ticketdesk_errors::Problem::from(self).into_response()
    }
}
