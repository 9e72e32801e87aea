//! # Reelvault Auth
//!
//! Opaque bearer-token primitives: generation, digesting, and shape checks.
//!
//! Tokens are 16 bytes of OS entropy rendered as 26 characters of unpadded
//! base32. The plaintext is returned to the caller exactly once; only its
//! SHA-256 digest is ever persisted or compared.

pub mod token;

pub use token::{
    PLAINTEXT_LEN, SCOPE_ACTIVATION, SCOPE_AUTHENTICATION, Token, generate_token, token_hash,
    valid_token_plaintext,
};
