//! Opening decoder: the streaming state machine that turns a ciphertext byte
//! stream back into plaintext, verifying every packet as it goes.

use tracing::{trace, warn};

use sealstream_common::Error;

use crate::keys::{SigningPublicKey, StreamNonce, SymmetricKey};
use crate::packet::{open_packet, PACKET_FULL};

/// Streaming opening context. Owns the key material for one stream, a
/// ciphertext buffer, a monotonically increasing chunk index, and a sticky
/// error slot: once an error is latched, every subsequent call returns it
/// unchanged rather than attempting to make further progress.
pub struct Opener {
    sym_key: SymmetricKey,
    sign_pk: SigningPublicKey,
    stream_nonce: [u8; 16],
    buffer: Vec<u8>,
    chunk_index: u64,
    sticky_error: Option<Error>,
}

impl Opener {
    pub fn new(sym_key: SymmetricKey, sign_pk: SigningPublicKey, stream_nonce: StreamNonce) -> Self {
        Self {
            sym_key,
            sign_pk,
            stream_nonce: *stream_nonce.as_bytes(),
            buffer: Vec::new(),
            chunk_index: 0,
            sticky_error: None,
        }
    }

    /// Append `bytes` to the internal buffer, opening and verifying as many
    /// full-size packets as the buffer now holds. On the first packet error,
    /// the error is latched and returned from every call thereafter;
    /// plaintext already opened during the call that triggered the error is
    /// discarded.
    pub fn write(&mut self, bytes: &[u8]) -> Result<Vec<u8>, Error> {
        if let Some(err) = &self.sticky_error {
            return Err(err.clone());
        }

        self.buffer.extend_from_slice(bytes);

        let mut output = Vec::new();
        while self.buffer.len() >= PACKET_FULL {
            let packet: Vec<u8> = self.buffer.drain(..PACKET_FULL).collect();
            match self.open_next(&packet) {
                Ok(plaintext) => output.extend(plaintext),
                Err(err) => {
                    self.sticky_error = Some(err.clone());
                    return Err(err);
                }
            }
        }
        Ok(output)
    }

    /// Open the remaining buffer as the terminal packet. Consumes the
    /// opener: a stream is opened exactly once.
    pub fn finish(mut self) -> Result<Vec<u8>, Error> {
        if let Some(err) = self.sticky_error {
            return Err(err);
        }
        debug_assert!(self.buffer.len() < PACKET_FULL);
        let remaining = std::mem::take(&mut self.buffer);
        self.open_next(&remaining)
    }

    fn open_next(&mut self, packet: &[u8]) -> Result<Vec<u8>, Error> {
        let result = open_packet(
            packet,
            self.chunk_index,
            &self.sym_key,
            &self.sign_pk,
            &self.stream_nonce,
        );
        match &result {
            Ok(plaintext) => trace!(
                chunk_index = self.chunk_index,
                plaintext_len = plaintext.len(),
                "opened packet"
            ),
            Err(err) => warn!(chunk_index = self.chunk_index, %err, "packet failed to open"),
        }
        self.chunk_index = self
            .chunk_index
            .checked_add(1)
            .expect("chunk index overflowed u64");
        result
    }
}
