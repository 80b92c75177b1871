//! Sealing encoder: the streaming state machine that turns a plaintext byte
//! stream into a concatenation of packets.

use tracing::trace;

use crate::keys::{SigningSecretKey, StreamNonce, SymmetricKey};
use crate::packet::{seal_packet, CHUNK_PLAINTEXT};

/// Streaming sealing context. Owns the key material for one stream, a
/// plaintext buffer, and a monotonically increasing chunk index.
///
/// Single-use: `finish` consumes `self`, so the compiler rejects feeding a
/// sealer after it has finished rather than needing a runtime "already
/// finished" error.
pub struct Sealer {
    sym_key: SymmetricKey,
    sign_sk: SigningSecretKey,
    stream_nonce: [u8; 16],
    buffer: Vec<u8>,
    chunk_index: u64,
}

impl Sealer {
    pub fn new(sym_key: SymmetricKey, sign_sk: SigningSecretKey, stream_nonce: StreamNonce) -> Self {
        Self {
            sym_key,
            sign_sk,
            stream_nonce: *stream_nonce.as_bytes(),
            buffer: Vec::new(),
            chunk_index: 0,
        }
    }

    /// Append `bytes` to the internal buffer, sealing and emitting as many
    /// full-size packets as the buffer now supports. Returns whatever
    /// packets were produced, possibly empty.
    pub fn write(&mut self, bytes: &[u8]) -> Vec<u8> {
        self.buffer.extend_from_slice(bytes);

        let mut output = Vec::new();
        while self.buffer.len() >= CHUNK_PLAINTEXT {
            let chunk: Vec<u8> = self.buffer.drain(..CHUNK_PLAINTEXT).collect();
            output.extend(self.seal_next(&chunk));
        }
        output
    }

    /// Seal the remaining buffer (0 ≤ len < `CHUNK_PLAINTEXT`, by the
    /// invariant `write`'s loop maintains) as the terminal packet. Consumes
    /// the sealer: a stream is sealed exactly once.
    pub fn finish(mut self) -> Vec<u8> {
        debug_assert!(self.buffer.len() < CHUNK_PLAINTEXT);
        let remaining = std::mem::take(&mut self.buffer);
        self.seal_next(&remaining)
    }

    fn seal_next(&mut self, chunk: &[u8]) -> Vec<u8> {
        let packet = seal_packet(
            chunk,
            self.chunk_index,
            &self.sym_key,
            &self.sign_sk,
            &self.stream_nonce,
        );
        trace!(chunk_index = self.chunk_index, plaintext_len = chunk.len(), "sealed packet");
        self.chunk_index = self
            .chunk_index
            .checked_add(1)
            .expect("chunk index overflowed u64");
        packet
    }
}
