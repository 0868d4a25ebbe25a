//! Password credential hashing.

/// A salted bcrypt hash of an account password. The plaintext is never
/// stored or logged.
pub struct CredentialHash(String);

impl CredentialHash {
    pub(crate) fn generate(password: &str) -> Result<Self, bcrypt::BcryptError> {
        bcrypt::hash(password, bcrypt::DEFAULT_COST).map(Self)
    }

    pub(crate) fn from_stored(hash: String) -> Self {
        Self(hash)
    }

    /// Verifies a password against this hash in constant time.
    pub(crate) fn verify(&self, password: &str) -> bool {
        bcrypt::verify(password, &self.0).unwrap_or(false)
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.0
    }
}
