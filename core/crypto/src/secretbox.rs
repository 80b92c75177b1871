//! XSalsa20-Poly1305 "secretbox" authenticated encryption.
//!
//! RustCrypto's `xsalsa20poly1305` crate returns `ciphertext ‖ tag`; the
//! NaCl/libsodium `crypto_secretbox_easy` convention this construction
//! follows is `tag ‖ ciphertext`. Both directions reorder the two halves at
//! the boundary so the rest of the codec never has to think about it.

use xsalsa20poly1305::aead::generic_array::GenericArray;
use xsalsa20poly1305::aead::{Aead, KeyInit};
use xsalsa20poly1305::XSalsa20Poly1305;

use sealstream_common::Error;

pub const KEY_LEN: usize = 32;
pub const NONCE_LEN: usize = 24;
pub const TAG_LEN: usize = 16;

/// Seal `plaintext` under `key`/`nonce`, returning `tag(16) ‖ ciphertext`.
pub fn seal(key: &[u8; KEY_LEN], nonce: &[u8; NONCE_LEN], plaintext: &[u8]) -> Vec<u8> {
    let cipher = XSalsa20Poly1305::new(GenericArray::from_slice(key));
    let nonce_ga = GenericArray::from_slice(nonce);

    // RustCrypto layout: ciphertext ‖ tag.
    let rust_output = cipher
        .encrypt(nonce_ga, plaintext)
        .expect("XSalsa20Poly1305 encryption is infallible for in-memory buffers");

    let ct_len = rust_output.len() - TAG_LEN;
    let mut out = Vec::with_capacity(rust_output.len());
    out.extend_from_slice(&rust_output[ct_len..]); // tag
    out.extend_from_slice(&rust_output[..ct_len]); // ciphertext
    out
}

/// Open a buffer laid out as `tag(16) ‖ ciphertext`, returning the plaintext.
pub fn open(key: &[u8; KEY_LEN], nonce: &[u8; NONCE_LEN], boxed: &[u8]) -> Result<Vec<u8>, Error> {
    if boxed.len() < TAG_LEN {
        return Err(Error::BadSecretbox);
    }
    let tag = &boxed[..TAG_LEN];
    let ciphertext = &boxed[TAG_LEN..];

    // RustCrypto expects: ciphertext ‖ tag.
    let mut rust_input = Vec::with_capacity(boxed.len());
    rust_input.extend_from_slice(ciphertext);
    rust_input.extend_from_slice(tag);

    let cipher = XSalsa20Poly1305::new(GenericArray::from_slice(key));
    let nonce_ga = GenericArray::from_slice(nonce);

    cipher
        .decrypt(nonce_ga, rust_input.as_slice())
        .map_err(|_| Error::BadSecretbox)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips() {
        let key = [0x11u8; KEY_LEN];
        let nonce = [0x22u8; NONCE_LEN];
        let plaintext = b"hello, secretbox";

        let boxed = seal(&key, &nonce, plaintext);
        assert_eq!(boxed.len(), plaintext.len() + TAG_LEN);

        let opened = open(&key, &nonce, &boxed).unwrap();
        assert_eq!(opened, plaintext);
    }

    #[test]
    fn wrong_key_fails() {
        let key = [0x11u8; KEY_LEN];
        let wrong_key = [0x99u8; KEY_LEN];
        let nonce = [0x22u8; NONCE_LEN];

        let boxed = seal(&key, &nonce, b"secret");
        assert!(matches!(open(&wrong_key, &nonce, &boxed), Err(Error::BadSecretbox)));
    }

    #[test]
    fn tampered_byte_fails() {
        let key = [0x11u8; KEY_LEN];
        let nonce = [0x22u8; NONCE_LEN];

        let mut boxed = seal(&key, &nonce, b"tamper me");
        let mid = boxed.len() / 2;
        boxed[mid] ^= 0x01;

        assert!(matches!(open(&key, &nonce, &boxed), Err(Error::BadSecretbox)));
    }

    #[test]
    fn empty_plaintext_round_trips() {
        let key = [0x00u8; KEY_LEN];
        let nonce = [0x00u8; NONCE_LEN];

        let boxed = seal(&key, &nonce, b"");
        assert_eq!(boxed.len(), TAG_LEN);
        assert_eq!(open(&key, &nonce, &boxed).unwrap(), b"");
    }

    #[test]
    fn too_short_is_bad_secretbox() {
        let key = [0x00u8; KEY_LEN];
        let nonce = [0x00u8; NONCE_LEN];
        assert!(matches!(open(&key, &nonce, &[0u8; 4]), Err(Error::BadSecretbox)));
    }
}
