//! Packet codec: chunk nonce derivation, signature binding, authenticated
//! encryption, and `bin32` framing for a single chunk.
//!
//! This is the layer every other module in this crate is built on top of —
//! the streaming encoder/decoder in `seal`/`open` just call `seal_packet`/
//! `open_packet` in a loop over a buffered byte stream.

use ed25519_dalek::{Signature, Signer, Verifier};
use sha2::{Digest, Sha512};

use sealstream_common::Error;

use crate::keys::{SigningPublicKey, SigningSecretKey, SymmetricKey};
use crate::secretbox;

/// Size of every non-terminal plaintext chunk.
pub const CHUNK_PLAINTEXT: usize = 1 << 20;

/// Ed25519 detached signature size.
pub const SIG: usize = 64;

/// Overhead added by the secretbox AEAD construction.
pub const AEAD_OVERHEAD: usize = 16;

/// Outer framing overhead: one tag byte plus a big-endian u32 length.
pub const FRAME_OVERHEAD: usize = 5;

/// Exact on-wire size of every non-terminal packet.
pub const PACKET_FULL: usize = CHUNK_PLAINTEXT + SIG + AEAD_OVERHEAD + FRAME_OVERHEAD;

const FRAME_TAG: u8 = 0xC6;
const DOMAIN_PREFIX: &[u8] = b"keybase chat attachment\0";

/// `stream_nonce ‖ big-endian u64 chunk index`, the 24-byte nonce used both
/// as the AEAD nonce and as part of the signed input for a given chunk.
pub fn chunk_nonce(stream_nonce: &[u8; 16], n: u64) -> [u8; 24] {
    let mut out = [0u8; 24];
    out[..16].copy_from_slice(stream_nonce);
    out[16..].copy_from_slice(&n.to_be_bytes());
    out
}

/// The value actually signed for one chunk: a domain-separation prefix, the
/// symmetric key (binding the signature to this encryption key), the chunk
/// nonce (binding it to its position in this stream), and a hash of the
/// plaintext rather than the plaintext itself, so the signed input stays
/// bounded regardless of chunk size.
fn sig_input(plaintext_chunk: &[u8], sym_key: &[u8; 32], cn: &[u8; 24]) -> Vec<u8> {
    let hash = Sha512::digest(plaintext_chunk);

    let mut out = Vec::with_capacity(DOMAIN_PREFIX.len() + 32 + 24 + 64);
    out.extend_from_slice(DOMAIN_PREFIX);
    out.extend_from_slice(sym_key);
    out.extend_from_slice(cn);
    out.extend_from_slice(&hash);
    out
}

/// Seal one packet: sign, encrypt, frame.
pub fn seal_packet(
    plaintext_chunk: &[u8],
    chunk_index: u64,
    sym_key: &SymmetricKey,
    sign_sk: &SigningSecretKey,
    stream_nonce: &[u8; 16],
) -> Vec<u8> {
    let cn = chunk_nonce(stream_nonce, chunk_index);

    let signing_key = sign_sk.to_dalek();
    let sig = signing_key.sign(&sig_input(plaintext_chunk, sym_key.as_bytes(), &cn));

    let mut signed_chunk = Vec::with_capacity(SIG + plaintext_chunk.len());
    signed_chunk.extend_from_slice(&sig.to_bytes());
    signed_chunk.extend_from_slice(plaintext_chunk);

    let ciphertext = secretbox::seal(sym_key.as_bytes(), &cn, &signed_chunk);

    let mut packet = Vec::with_capacity(FRAME_OVERHEAD + ciphertext.len());
    packet.push(FRAME_TAG);
    packet.extend_from_slice(&(ciphertext.len() as u32).to_be_bytes());
    packet.extend_from_slice(&ciphertext);
    packet
}

/// Open one packet: unframe, decrypt, verify.
pub fn open_packet(
    packet_bytes: &[u8],
    chunk_index: u64,
    sym_key: &SymmetricKey,
    sign_pk: &SigningPublicKey,
    stream_nonce: &[u8; 16],
) -> Result<Vec<u8>, Error> {
    if packet_bytes.len() < FRAME_OVERHEAD {
        return Err(Error::ShortMessagePackObject);
    }
    if packet_bytes[0] != FRAME_TAG {
        return Err(Error::WrongMessagePackFormat {
            found: packet_bytes[0],
        });
    }

    let declared = u32::from_be_bytes(packet_bytes[1..5].try_into().unwrap());
    let actual = packet_bytes.len() - FRAME_OVERHEAD;
    if declared as usize != actual {
        return Err(Error::WrongMessagePackLength { declared, actual });
    }

    let cn = chunk_nonce(stream_nonce, chunk_index);
    let signed_chunk = secretbox::open(sym_key.as_bytes(), &cn, &packet_bytes[FRAME_OVERHEAD..])?;

    if signed_chunk.len() < SIG {
        return Err(Error::ShortSignature {
            actual: signed_chunk.len(),
        });
    }

    let (sig_bytes, plaintext) = signed_chunk.split_at(SIG);
    let sig_array: [u8; SIG] = sig_bytes.try_into().expect("split_at(SIG) guarantees this length");
    let sig = Signature::from_bytes(&sig_array);

    let verifying_key = sign_pk.to_dalek().map_err(|_| Error::BadSignature)?;
    verifying_key
        .verify(&sig_input(plaintext, sym_key.as_bytes(), &cn), &sig)
        .map_err(|_| Error::BadSignature)?;

    Ok(plaintext.to_vec())
}

/// `sealed_size(plaintext_len)`: the deterministic on-wire size of a whole
/// sealed stream as a pure function of plaintext length, used by callers to
/// preallocate.
pub fn sealed_size(plaintext_len: u64) -> u64 {
    let full_chunks = plaintext_len / CHUNK_PLAINTEXT as u64;
    let remainder = (plaintext_len % CHUNK_PLAINTEXT as u64) as usize;
    full_chunks * PACKET_FULL as u64 + frame_size_for(remainder) as u64
}

fn frame_size_for(k: usize) -> usize {
    k + SIG + AEAD_OVERHEAD + FRAME_OVERHEAD
}
