//! Key and nonce types with secure memory handling.
//!
//! Every fixed-size quantity the packet codec needs is a newtype wrapping a
//! fixed-size array rather than a bare slice, so a length mismatch is a
//! compile error at the construction site instead of a runtime check deep
//! inside `open_packet`.

use ed25519_dalek::{SigningKey, VerifyingKey, SECRET_KEY_LENGTH};
use rand_core::{CryptoRng, RngCore};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Per-stream nonce, globally unique with respect to the keypair + symmetric key.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct StreamNonce([u8; 16]);

impl StreamNonce {
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Generate a fresh random stream nonce.
    ///
    /// An all-zero nonce is also acceptable per the concurrency model as long
    /// as the key material is one-time-use, but callers that don't control
    /// that invariant should generate one.
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let mut bytes = [0u8; 16];
        rng.fill_bytes(&mut bytes);
        Self(bytes)
    }
}

impl fmt::Debug for StreamNonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StreamNonce({})", hex::encode(self.0))
    }
}

/// Symmetric authenticated-encryption key shared by both ends of a stream.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey([u8; 32]);

impl SymmetricKey {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Generate a fresh random symmetric key.
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let mut bytes = [0u8; 32];
        rng.fill_bytes(&mut bytes);
        Self(bytes)
    }
}

impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SymmetricKey([REDACTED])")
    }
}

/// Ed25519 signing secret key, stored in the NaCl `crypto_sign` convention:
/// a 32-byte seed followed by the 32-byte public key it derives.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SigningSecretKey([u8; 64]);

impl SigningSecretKey {
    /// Build from the 64-byte `seed ‖ public_key` representation.
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// Generate a fresh signing keypair, returning the secret key and its
    /// matching public key together so callers can't end up with a
    /// mismatched pair.
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> (Self, SigningPublicKey) {
        let signing_key = SigningKey::generate(rng);
        let verifying_key = signing_key.verifying_key();

        let mut bytes = [0u8; 64];
        bytes[..SECRET_KEY_LENGTH].copy_from_slice(&signing_key.to_bytes());
        bytes[SECRET_KEY_LENGTH..].copy_from_slice(verifying_key.as_bytes());

        (
            Self(bytes),
            SigningPublicKey::from_bytes(*verifying_key.as_bytes()),
        )
    }

    pub(crate) fn to_dalek(&self) -> SigningKey {
        let mut seed = [0u8; SECRET_KEY_LENGTH];
        seed.copy_from_slice(&self.0[..SECRET_KEY_LENGTH]);
        SigningKey::from_bytes(&seed)
    }
}

impl fmt::Debug for SigningSecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SigningSecretKey([REDACTED])")
    }
}

/// Ed25519 signing public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SigningPublicKey([u8; 32]);

impl SigningPublicKey {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub(crate) fn to_dalek(&self) -> Result<VerifyingKey, ed25519_dalek::SignatureError> {
        VerifyingKey::from_bytes(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_core::OsRng;

    #[test]
    fn generated_keypair_round_trips_through_dalek() {
        let (sk, pk) = SigningSecretKey::generate(&mut OsRng);
        let verifying = sk.to_dalek().verifying_key();
        assert_eq!(verifying.as_bytes(), pk.as_bytes());
    }

    #[test]
    fn debug_redacts_key_material() {
        let key = SymmetricKey::from_bytes([0x42; 32]);
        assert_eq!(format!("{:?}", key), "SymmetricKey([REDACTED])");

        let (sk, _) = SigningSecretKey::generate(&mut OsRng);
        assert_eq!(format!("{:?}", sk), "SigningSecretKey([REDACTED])");
    }

    #[test]
    fn stream_nonce_generate_is_random() {
        let a = StreamNonce::generate(&mut OsRng);
        let b = StreamNonce::generate(&mut OsRng);
        assert_ne!(a.as_bytes(), b.as_bytes());
    }
}
