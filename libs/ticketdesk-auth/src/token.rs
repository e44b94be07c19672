//! HS256 token issuing and verification.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, decode_header, encode,
};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use time::OffsetDateTime;

use crate::claims::{Claims, Role};
use crate::config::AuthConfig;
use crate::errors::TokenError;

const EXPECTED_ALG: &str = "HS256";

/// Signs identity tokens with the shared secret.
pub struct TokenIssuer {
    secret: SecretString,
    issuer: String,
    ttl_secs: i64,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            secret: SecretString::from(config.secret.expose_secret().to_owned()),
            issuer: config.issuer.clone(),
            ttl_secs: i64::try_from(config.token_ttl_secs).unwrap_or(i64::MAX),
        }
    }

    /// Issues a token for `subject` valid from now for the configured lifetime.
    pub fn issue(&self, subject: i64, role: Role) -> Result<String, TokenError> {
        self.issue_at(subject, role, OffsetDateTime::now_utc())
    }

    /// Issues a token as if the current time were `issued_at`.
    pub fn issue_at(
        &self,
        subject: i64,
        role: Role,
        issued_at: OffsetDateTime,
    ) -> Result<String, TokenError> {
        let secret = self.secret.expose_secret();
        if secret.is_empty() {
            return Err(TokenError::signing("token secret is not configured"));
        }

        let iat = issued_at.unix_timestamp();
        let claims = Claims {
            sub: subject.to_string(),
            iss: self.issuer.clone(),
            user_type: role,
            iat,
            exp: iat.saturating_add(self.ttl_secs),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .map_err(|e| TokenError::signing(e.to_string()))
    }
}

#[derive(Deserialize)]
struct RawHeader {
    alg: String,
}

/// Checks signature, algorithm, issuer and expiry of presented tokens.
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = config.leeway_secs;
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);

        Self {
            key: DecodingKey::from_secret(config.secret.expose_secret().as_bytes()),
            validation,
        }
    }

    /// Verifies `token` and returns its claims.
    ///
    /// The header algorithm is inspected before any signature work so that
    /// `none`, asymmetric and other HMAC variants fail as unsupported.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let header = decode_header(token);
        if !matches!(&header, Ok(h) if h.alg == Algorithm::HS256) {
            return Err(rejected_header(token, header.err()));
        }

        decode::<Claims>(token, &self.key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidAlgorithm => TokenError::unsupported_algorithm(EXPECTED_ALG),
                _ => TokenError::malformed(e.to_string()),
            })
    }
}

/// Classifies a header that is not a readable HS256 header.
///
/// `decode_header` cannot deserialize `alg` values it has no variant for,
/// `none` included, so the name is read from the raw segment instead.
fn rejected_header(token: &str, decode_error: Option<jsonwebtoken::errors::Error>) -> TokenError {
    match raw_header_algorithm(token) {
        Ok(alg) if alg == EXPECTED_ALG => TokenError::malformed(
            decode_error.map_or_else(|| "unreadable token header".to_owned(), |e| e.to_string()),
        ),
        Ok(alg) => TokenError::unsupported_algorithm(alg),
        Err(e) => e,
    }
}

fn raw_header_algorithm(token: &str) -> Result<String, TokenError> {
    let mut parts = token.split('.');
    let (Some(header), Some(_), Some(_), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(TokenError::malformed("expected three dot-separated segments"));
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(header)
        .map_err(|e| TokenError::malformed(format!("header is not base64url: {e}")))?;
    let raw: RawHeader = serde_json::from_slice(&bytes)
        .map_err(|e| TokenError::malformed(format!("header is not valid JSON: {e}")))?;
    Ok(raw.alg)
}
