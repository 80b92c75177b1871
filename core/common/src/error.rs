//! Shared error type for the sealed-stream workspace.
//!
//! The six terminal variants here are the complete error surface of the
//! sealing/opening construction itself (see `sealstream-crypto`). `Io` and
//! `InvalidKeyMaterial` are ambient — they exist so the CLI can `?`-propagate
//! file and key-loading failures through the same `Result`, but the crypto
//! crate's public API never produces them.

use std::sync::Arc;
use thiserror::Error;

/// Top-level error type for sealed-stream operations.
///
/// `Clone` is derived so the opening decoder can latch one of these in its
/// sticky-error slot and hand back an equivalent value on every subsequent
/// call (see `sealstream-crypto::open::Opener`).
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// The packet is shorter than the 5-byte frame header.
    #[error("packet shorter than frame header")]
    ShortMessagePackObject,

    /// The frame tag byte is not `0xC6`.
    #[error("frame tag byte {found:#04x} is not bin32 (0xC6)")]
    WrongMessagePackFormat {
        /// The byte actually found where the tag was expected.
        found: u8,
    },

    /// The frame length field does not match the packet's byte count.
    #[error("frame declared length {declared} does not match packet body of {actual} bytes")]
    WrongMessagePackLength {
        /// Length declared in the frame header.
        declared: u32,
        /// Actual number of ciphertext bytes present.
        actual: usize,
    },

    /// Authenticated decryption failed: wrong key, tampered ciphertext, or a
    /// packet truncated mid-body.
    #[error("secretbox authentication failed")]
    BadSecretbox,

    /// The decrypted chunk is shorter than the 64-byte signature prefix.
    #[error("decrypted chunk shorter than signature ({actual} bytes)")]
    ShortSignature {
        /// Number of bytes actually recovered from the AEAD.
        actual: usize,
    },

    /// The Ed25519 signature does not verify against the expected signed input.
    #[error("signature verification failed")]
    BadSignature,

    /// I/O failure while reading or writing a sealed stream.
    #[error("I/O error: {0}")]
    Io(Arc<std::io::Error>),

    /// Key or nonce material supplied to the CLI was malformed.
    #[error("invalid key material: {0}")]
    InvalidKeyMaterial(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(Arc::new(err))
    }
}

/// Result type alias using the shared [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sticky_error_is_clonable() {
        let err = Error::BadSignature;
        let cloned = err.clone();
        assert!(matches!(cloned, Error::BadSignature));
    }

    #[test]
    fn io_error_converts_and_clones() {
        let io_err = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "eof");
        let err: Error = io_err.into();
        let cloned = err.clone();
        assert!(matches!(cloned, Error::Io(_)));
    }
}
