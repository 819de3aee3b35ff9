// src/exec/multiplex.rs

//! Combine a child's stdout and stderr into one byte buffer.
//!
//! Both streams are registered in a single `tokio::select!` loop: whichever
//! is ready gets a bounded read, and its bytes are appended to the shared
//! buffer as-is. Bytes from one stream keep their order; interleaving between
//! the two streams follows readiness order and is not deterministic.
//!
//! The loop ends once both streams have reached end-of-stream. Reads
//! interrupted by a signal are retried. Any other read error aborts the
//! drain and the accumulated bytes are discarded.

use std::io::{self, ErrorKind};

use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, trace};

use crate::errors::ExecError;

/// Read chunk used when none is configured.
pub const DEFAULT_CHUNK_SIZE: usize = 8192;

#[derive(Debug, Clone, Copy)]
pub struct StreamMultiplexer {
    chunk_size: usize,
}

impl Default for StreamMultiplexer {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE)
    }
}

impl StreamMultiplexer {
    pub fn new(chunk_size: usize) -> Self {
        // A zero-length read buffer would look like end-of-stream.
        Self {
            chunk_size: chunk_size.max(1),
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Drain both readers to end-of-stream and return everything they
    /// produced.
    pub async fn drain<A, B>(&self, mut a: A, mut b: B) -> Result<Vec<u8>, ExecError>
    where
        A: AsyncRead + Unpin,
        B: AsyncRead + Unpin,
    {
        let mut combined = Vec::new();
        let mut buf_a = vec![0u8; self.chunk_size];
        let mut buf_b = vec![0u8; self.chunk_size];
        let mut a_open = true;
        let mut b_open = true;

        while a_open || b_open {
            let (name, res, chunk, open) = tokio::select! {
                res = a.read(&mut buf_a), if a_open => ("a", res, &buf_a, &mut a_open),
                res = b.read(&mut buf_b), if b_open => ("b", res, &buf_b, &mut b_open),
            };

            match absorb(name, res, chunk, &mut combined) {
                Ok(still_open) => *open = still_open,
                Err(source) => {
                    return Err(ExecError::Capture {
                        partial: combined.len(),
                        source,
                    });
                }
            }
        }

        debug!(bytes = combined.len(), "both streams reached end-of-stream");
        Ok(combined)
    }
}

/// Apply one read result. Returns whether the stream is still open.
fn absorb(
    name: &'static str,
    res: io::Result<usize>,
    chunk: &[u8],
    out: &mut Vec<u8>,
) -> io::Result<bool> {
    match res {
        Ok(0) => {
            trace!(stream = name, "end-of-stream");
            Ok(false)
        }
        Ok(n) => {
            trace!(stream = name, n, "read chunk");
            out.extend_from_slice(&chunk[..n]);
            Ok(true)
        }
        Err(e) if e.kind() == ErrorKind::Interrupted => {
            trace!(stream = name, "read interrupted; retrying");
            Ok(true)
        }
        Err(e) => Err(e),
    }
}
