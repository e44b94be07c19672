use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, Serializer};

/// Token settings. The secret comes from configuration or the environment
/// and is never printed.
#[derive(Debug, Deserialize, Serialize)]
pub struct AuthConfig {
    #[serde(default = "default_secret", serialize_with = "redact")]
    pub secret: SecretString,
    #[serde(default = "default_issuer")]
    pub issuer: String,
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: u64,
    #[serde(default)]
    pub leeway_secs: u64,
}

impl AuthConfig {
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            secret: SecretString::from(secret.into()),
            ..Self::default()
        }
    }

    pub fn has_secret(&self) -> bool {
        !self.secret.expose_secret().is_empty()
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: default_secret(),
            issuer: default_issuer(),
            token_ttl_secs: default_token_ttl_secs(),
            leeway_secs: 0,
        }
    }
}

fn default_secret() -> SecretString {
    SecretString::from(String::new())
}

fn default_issuer() -> String {
    "ticketdesk".to_owned()
}

fn default_token_ttl_secs() -> u64 {
    24 * 60 * 60
}

fn redact<S>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if secret.expose_secret().is_empty() {
        serializer.serialize_str("")
    } else {
        serializer.serialize_str("[REDACTED]")
    }
}
