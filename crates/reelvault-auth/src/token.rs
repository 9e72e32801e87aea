use chrono::{DateTime, Duration, Utc};
use data_encoding::BASE32_NOPAD;
use rand::RngCore;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Token scope for account activation.
pub const SCOPE_ACTIVATION: &str = "activation";
/// Token scope for API authentication.
pub const SCOPE_AUTHENTICATION: &str = "authentication";

/// Exact length of a token's client-facing text: 16 random bytes encoded as
/// unpadded base32.
pub const PLAINTEXT_LEN: usize = 26;

/// A freshly generated token.
///
/// `plaintext` is shown to the caller once and never stored; `hash` is what
/// the token store persists and what lookups compare against.
#[derive(Debug, Clone)]
pub struct Token {
    pub plaintext: String,
    pub hash: Vec<u8>,
    pub user_id: Uuid,
    pub expiry: DateTime<Utc>,
    pub scope: String,
}

/// Generates a new token for `user_id` expiring `ttl` from now.
pub fn generate_token(user_id: Uuid, ttl: Duration, scope: &str) -> Token {
    let mut bytes = [0u8; 16];
    OsRng.fill_bytes(&mut bytes);

    let plaintext = BASE32_NOPAD.encode(&bytes);
    let hash = token_hash(&plaintext);

    Token {
        plaintext,
        hash,
        user_id,
        expiry: Utc::now() + ttl,
        scope: scope.to_string(),
    }
}

/// SHA-256 digest of a token's plaintext. Deterministic, so a presented
/// token can be matched against the stored digest without retaining the
/// secret itself.
pub fn token_hash(plaintext: &str) -> Vec<u8> {
    Sha256::digest(plaintext.as_bytes()).to_vec()
}

/// Whether `plaintext` has the shape of a token this crate could have
/// issued: exactly [`PLAINTEXT_LEN`] characters of the unpadded base32
/// alphabet (`A-Z`, `2-7`). Anything else can be rejected without a store
/// lookup.
pub fn valid_token_plaintext(plaintext: &str) -> bool {
    plaintext.len() == PLAINTEXT_LEN
        && plaintext
            .bytes()
            .all(|b| b.is_ascii_uppercase() || (b'2'..=b'7').contains(&b))
}
