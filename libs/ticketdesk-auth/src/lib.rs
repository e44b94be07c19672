//! Bearer-token identity for ticketdesk.
//!
//! [`TokenIssuer`] signs HS256 tokens at login, [`TokenVerifier`] checks them,
//! and with the `axum-ext` feature [`axum_ext::require_identity`] turns a
//! verified token into an [`Identity`] stored in the request extensions.

pub mod claims;
pub mod config;
pub mod errors;
pub mod token;

#[cfg(feature = "axum-ext")]
pub mod axum_ext;

pub use claims::{Claims, Identity, Role};
pub use config::AuthConfig;
pub use errors::{AuthError, TokenError};
pub use token::{TokenIssuer, TokenVerifier};
