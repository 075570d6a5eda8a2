//! Crate-wide error taxonomy (§7).
//!
//! Every public, fallible operation in this crate returns `Result<_, LwcError>`.
//! Internal permutation routines are infallible by construction — only the
//! engine boundary (AEAD encrypt/decrypt, hash finalize, masked session
//! construction) can fail.

/// Errors surfaced at the AEAD/hash/masking engine boundary.
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone, Copy)]
pub enum LwcError {
    /// `decrypt` was called with `clen < tag_size`; the output length field
    /// is not written.
    #[error("ciphertext shorter than the tag length")]
    InvalidCiphertextLength,

    /// Decrypt completed but the constant-time tag comparison failed. The
    /// caller-visible plaintext buffer must be zeroed before this error is
    /// returned.
    #[error("authentication tag mismatch")]
    AuthenticationFailed,

    /// DryGASCON key-schedule condition: the derived `x[]` table does not
    /// have four pairwise-distinct 32-bit words. The reference C loops
    /// forever on this condition; this crate rejects immediately instead
    /// (see DESIGN.md for the bounded-retry-policy decision).
    #[error("DryGASCON key rejected: x-table words are not pairwise distinct")]
    WeakKeyRejected,

    /// The mask randomness source (C2) could not produce fresh shares.
    /// Masked operations must fail closed rather than fall back to
    /// deterministic zero shares.
    #[error("mask randomness source unavailable")]
    MaskingUnavailable,

    /// Key length does not match the algorithm's fixed `K` parameter.
    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    /// Nonce length does not match the algorithm's fixed `N` parameter.
    #[error("invalid nonce length: expected {expected}, got {actual}")]
    InvalidNonceLength { expected: usize, actual: usize },
}

pub type Result<T> = core::result::Result<T, LwcError>;
