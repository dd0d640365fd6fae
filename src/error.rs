// bdgr -- a lossless raster image codec
// Licensed under the Apache License, Version 2.0.

//! The `error` module defines the error and result types surfaced at the
//! crate's public boundary.
//!
//! These are the *recoverable* failures named in the format's error model:
//! dimension mismatches, undersized output buffers, misaligned input, and
//! malformed PGM fixtures. Violations of the codec's internal invariants
//! (sample out of range, buffer overrun) remain `debug_assert!`s in the hot
//! loop, per contract, and never reach this type.

use thiserror::Error;

/// Either `T` on success, or a `CodecError` on failure.
pub type CodecResult<T> = Result<T, CodecError>;

/// An error that prevents successful encoding or decoding of a frame.
///
/// Not `PartialEq`/`Eq`: the `Io` variant wraps `std::io::Error`, which
/// implements neither, so callers match on variants (`matches!`) rather
/// than comparing whole errors for equality.
#[derive(Error, Debug)]
pub enum CodecError {
    /// The header decoded from the bitstream disagrees with the dimensions
    /// the caller supplied.
    #[error("dimension mismatch: expected {expected:?}, found {found:?}")]
    DimensionMismatch { expected: (u16, u16), found: (u16, u16) },

    /// The caller-supplied output buffer is smaller than the worst case
    /// requires.
    #[error("output buffer too small: need at least {needed} bytes, have {available}")]
    BufferTooSmall { needed: usize, available: usize },

    /// A bitstream buffer's length is not a multiple of 8 bytes.
    #[error("buffer length {len} is not a multiple of 8 bytes")]
    Misaligned { len: usize },

    /// `width` or `height` exceeds the 65535 the 16-bit header field can
    /// carry.
    #[error("dimensions {width}x{height} exceed the 65535 limit")]
    DimensionTooLarge { width: usize, height: usize },

    /// A PGM header did not match the `P5` raw-grayscale format this crate
    /// reads and writes.
    #[error("invalid PGM header: {0}")]
    InvalidPgmHeader(String),

    /// An underlying I/O operation failed while reading or writing a PGM
    /// file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
