use super::error::DomainError;

/// Password hashing strategy injected into the accounts service.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String, DomainError>;

    fn verify(&self, password: &str, hash: &str) -> Result<bool, DomainError>;
}

pub struct BcryptHasher {
    cost: u32,
}

impl BcryptHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }
}

impl Default for BcryptHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

impl PasswordHasher for BcryptHasher {
    fn hash(&self, password: &str) -> Result<String, DomainError> {
        bcrypt::hash(password, self.cost).map_err(|e| DomainError::password_hashing(e.to_string()))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, DomainError> {
        bcrypt::verify(password, hash).map_err(|e| DomainError::password_hashing(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bcrypt_hash_verifies_original_password_only() {
        let hasher = BcryptHasher::new(4);
        let hash = hasher.hash("p").unwrap();

        assert_ne!(hash, "p");
        assert!(hasher.verify("p", &hash).unwrap());
        assert!(!hasher.verify("q", &hash).unwrap());
    }

    #[test]
    fn malformed_hash_is_an_error() {
        let hasher = BcryptHasher::new(4);
        assert!(matches!(
            hasher.verify("p", "not-a-bcrypt-hash"),
            Err(DomainError::PasswordHashing(_))
        ));
    }
}
