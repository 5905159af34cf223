// Password hashing utilities
// Uses bcrypt; the scheme and cost are embedded in every digest

use bcrypt::{hash, verify, BcryptError};

// Salt and checksum of a well-formed digest no password is expected to match
const DUMMY_SALT_AND_HASH: &str = "R9h/cIPz0gi.URNNX3kh2OPST9/PgBkqquzi.Ss7KIUgO2t0jWMUW";

/// bcrypt hasher with a configurable work factor
///
/// Changing the cost only affects new digests. Verification reads the cost
/// and variant (`$2a$`, `$2b$`, `$2y$`) from the stored digest, so older
/// digests keep verifying after an upgrade.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hashes a password using bcrypt
    ///
    /// # Example
    /// ```
    /// use keystone_api::auth::password::PasswordHasher;
    ///
    /// let hasher = PasswordHasher::new(4);
    /// let digest = hasher.hash("my_password").expect("valid hash");
    /// assert!(hasher.verify("my_password", &digest));
    /// ```
    pub fn hash(&self, password: &str) -> Result<String, BcryptError> {
        hash(password, self.cost)
    }

    /// Verifies a password against a bcrypt digest
    ///
    /// A malformed digest is reported as a mismatch.
    pub fn verify(&self, password: &str, digest: &str) -> bool {
        match verify(password, digest) {
            Ok(valid) => valid,
            Err(e) => {
                tracing::warn!(error = %e, "stored password digest could not be parsed");
                false
            }
        }
    }

    /// Runs a full verification at the configured cost and reports a mismatch
    ///
    /// Used when no account exists, so the response time does not reveal
    /// whether the login was known.
    pub fn verify_absent(&self, password: &str) -> bool {
        self.verify(password, &self.dummy_digest());
        false
    }

    fn dummy_digest(&self) -> String {
        format!("$2b${:02}${}", self.cost, DUMMY_SALT_AND_HASH)
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}
