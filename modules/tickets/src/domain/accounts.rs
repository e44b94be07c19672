use std::sync::Arc;

use ticketdesk_auth::{Role, TokenIssuer};

use crate::contract::{LoginResult, NewUser, Signup, User};

use super::error::DomainError;
use super::password::PasswordHasher;
use super::repo::{StoreError, UsersRepository};

/// Signup and login.
pub struct AccountsService {
    users: Arc<dyn UsersRepository>,
    hasher: Arc<dyn PasswordHasher>,
    issuer: Arc<TokenIssuer>,
}

impl AccountsService {
    pub fn new(
        users: Arc<dyn UsersRepository>,
        hasher: Arc<dyn PasswordHasher>,
        issuer: Arc<TokenIssuer>,
    ) -> Self {
        Self {
            users,
            hasher,
            issuer,
        }
    }

    /// Creates a regular user account. The role is always `user`.
    pub async fn signup(&self, input: Signup) -> Result<User, DomainError> {
        let Signup {
            name,
            email,
            password,
        } = input;

        let name = name.trim().to_owned();
        let email = normalize_email(&email);
        if name.is_empty() {
            return Err(DomainError::missing("name"));
        }
        if email.is_empty() {
            return Err(DomainError::missing("email"));
        }
        if !looks_like_email(&email) {
            return Err(DomainError::invalid("email", "expected an address like name@host"));
        }
        if password.is_empty() {
            return Err(DomainError::missing("password"));
        }

        let password_hash = self.hash_password(password).await?;
        let user = self
            .users
            .create_user(NewUser {
                name,
                email: email.clone(),
                password_hash,
                role: Role::User,
            })
            .await
            .map_err(|e| match e {
                StoreError::Duplicate { .. } => DomainError::email_already_exists(email),
                other => other.into(),
            })?;

        tracing::info!(user_id = user.id, "user signed up");
        Ok(user)
    }

    /// Checks the credentials and issues a token. Unknown emails and wrong
    /// passwords fail the same way.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResult, DomainError> {
        let email = normalize_email(email);
        if email.is_empty() {
            return Err(DomainError::missing("email"));
        }
        if password.is_empty() {
            return Err(DomainError::missing("password"));
        }

        let user = match self.users.get_user_by_email(&email).await {
            Ok(user) => user,
            Err(StoreError::NotFound) => {
                tracing::debug!("login for unknown email");
                return Err(DomainError::InvalidCredentials);
            }
            Err(e) => return Err(e.into()),
        };

        if !self
            .verify_password(password.to_owned(), user.password_hash.clone())
            .await?
        {
            tracing::debug!(user_id = user.id, "login with wrong password");
            return Err(DomainError::InvalidCredentials);
        }

        let token = self.issuer.issue(user.id, user.role)?;
        tracing::info!(user_id = user.id, "user logged in");
        Ok(LoginResult { user, token })
    }

    async fn hash_password(&self, password: String) -> Result<String, DomainError> {
        let hasher = Arc::clone(&self.hasher);
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| DomainError::password_hashing(e.to_string()))?
    }

    async fn verify_password(&self, password: String, hash: String) -> Result<bool, DomainError> {
        let hasher = Arc::clone(&self.hasher);
        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| DomainError::password_hashing(e.to_string()))?
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn looks_like_email(email: &str) -> bool {
    email
        .split_once('@')
        .is_some_and(|(local, host)| !local.is_empty() && !host.is_empty() && !host.contains('@'))
}
