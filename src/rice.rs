// bdgr -- a lossless raster image codec
// Licensed under the Apache License, Version 2.0.

//! Adaptive Golomb-Rice coding of an 8-bit unsigned symbol, with a tail
//! escape for the long tail of the distribution.
//!
//! This plays the role `claxon::subframe::decode_rice_partition` and the
//! `RiceRead`/`RiceWrite` traits of `dsi-bitstream` play for FLAC: an
//! unary quotient followed by a binary remainder. Two differences from
//! FLAC's Rice partitions: the parameter `k` is fixed at a single,
//! compile-time-bounded range (`0..=8`) and is *adapted* symbol by symbol
//! via [`K4RICE`] rather than signaled per partition, and the unary
//! quotient is capped at [`CUTOFF`] with a raw 8-bit escape instead of
//! growing unboundedly.

use crate::bitstream::{BitReader, BitWriter};

/// Unary-prefix cap before switching to an 8-bit raw escape. Part of the
/// wire format: encoder and decoder must agree.
pub const CUTOFF: u32 = 11;

/// Initial Rice parameter at the start of a frame. Part of the wire
/// format.
pub const K0: u8 = 7;

/// `k4rice[r]` is the Rice parameter the coder switches to immediately
/// after encoding or decoding residual symbol `r`.
///
/// Built from the bit-counting loop `bits = 0; while (1 << bits) < r { bits
/// += 1 }; if bits > 1 { bits -= 1 }`, which is the table's precise,
/// literal definition. The gloss `max(0, ceil(log2(r + 1)) - 1)` agrees
/// with it everywhere except at powers of two (e.g. `r == 4` or `r == 8`),
/// where the loop leaves `bits` one lower; the loop form is authoritative
/// here since encoder and decoder both need the exact same table, and
/// "roughly log2" is not precise enough to pin down a shared bitstream
/// convention. The "minus one" bias (when `bits > 1`) keeps `k` slightly
/// below what the bit count alone would suggest, which in practice costs
/// about half a percent more of the stream biased small rather than large.
pub static K4RICE: [u8; 256] = build_k4rice_table();

const fn build_k4rice_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut r = 0usize;
    while r < 256 {
        let mut bits = 0u32;
        while (1usize << bits) < r {
            bits += 1;
        }
        table[r] = if bits > 1 { (bits - 1) as u8 } else { bits as u8 };
        r += 1;
    }
    table
}

/// Encodes `r` (a byte-range residual symbol) with Rice parameter `k`.
///
/// `k` must be at most 8, matching the `[0, 8]` range the predictor state
/// keeps `k` in.
pub fn encode(writer: &mut BitWriter, r: u8, k: u8) {
    debug_assert!(k <= 8);
    let r = r as u32;
    let q = r >> k;

    if q < CUTOFF {
        for _ in 0..q {
            writer.push_bit(0);
        }
        writer.push_bit(1);
        if k > 0 {
            let m = r & ((1u32 << k) - 1);
            writer.push_bits(m as u64, k as u32);
        }
    } else {
        for _ in 0..CUTOFF {
            writer.push_bit(0);
        }
        writer.push_bit(1);
        writer.push_bits(r as u64, 8);
    }
}

/// Decodes one residual symbol with Rice parameter `k`, the dual of
/// [`encode`].
pub fn decode(reader: &mut BitReader, k: u8) -> u8 {
    debug_assert!(k <= 8);
    let q = reader.pull_unary_capped(CUTOFF);

    if q < CUTOFF {
        let m = if k > 0 { reader.pull_bits(k as u32) as u32 } else { 0 };
        ((q << k) | m) as u8
    } else {
        reader.pull_bits(8) as u8
    }
}

/// Returns the number of bits [`encode`] would write for `(r, k)`: the
/// testable property tying the coder's output length to `q`, `CUTOFF` and
/// `k`.
pub fn encoded_len_bits(r: u8, k: u8) -> u32 {
    let q = (r as u32) >> k;
    if q < CUTOFF {
        1 + q + k as u32
    } else {
        1 + CUTOFF + 8
    }
}
