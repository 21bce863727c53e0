use tracing::error;

/// bcrypt work factor; matches the credential format already in the field.
const HASH_COST: u32 = 10;

/// Salted one-way hash; bcrypt generates a fresh salt per call and embeds
/// it in the output string.
pub fn hash_password(plain: &str) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(plain, HASH_COST).map_err(|e| {
        error!(error = %e, "bcrypt hash error");
        e
    })
}

/// A malformed stored hash counts as a mismatch, never an error.
pub fn verify_password(plain: &str, hash: &str) -> bool {
    bcrypt::verify(plain, hash).unwrap_or(false)
}
