use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::TokenError;

/// Account role. Fixed when the account is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(UnknownRole(other.to_owned())),
        }
    }
}

/// Decoded token payload.
///
/// `sub` carries the user id as a decimal string and `userType` the role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iss: String,
    #[serde(rename = "userType")]
    pub user_type: Role,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    /// Converts verified claims into the request identity.
    ///
    /// Fails when `sub` is not a positive integer.
    pub fn identity(&self) -> Result<Identity, TokenError> {
        let user_id: i64 = self
            .sub
            .parse()
            .map_err(|_| TokenError::malformed("subject is not an integer"))?;
        if user_id <= 0 {
            return Err(TokenError::malformed("subject must be positive"));
        }
        Ok(Identity {
            user_id,
            role: self.user_type,
        })
    }
}

/// Verified caller, attached to the request by the access gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub user_id: i64,
    pub role: Role,
}

impl Identity {
    pub fn new(user_id: i64, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
