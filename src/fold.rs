// bdgr -- a lossless raster image codec
// Licensed under the Apache License, Version 2.0.

//! The residual fold: a bijection between a signed 8-bit prediction error
//! and an unsigned Rice symbol in `[0, 255]`.
//!
//! There is no FLAC counterpart to this step -- FLAC's LPC/fixed
//! predictors already produce native signed residuals that Rice-code
//! directly. This format instead predicts and reconstructs modulo 256, so
//! folding first maps the wraparound-safe delta to a small signed range,
//! then zigzags it to unsigned, in the same spirit as
//! `claxon::subframe::rice_to_signed`'s odd/even unsigned-to-signed
//! mapping, just run in the opposite direction and over a byte instead of
//! a native machine integer.

/// Computes the unsigned Rice symbol for pixel value `v` predicted as `p`.
///
/// `v` and `p` are full bytes; the difference is taken modulo 256 and then
/// folded into `[-128, 127]` before the zigzag mapping, so every `(p, v)`
/// pair maps to exactly one `r` and every `r` maps back to exactly one
/// `v`.
pub fn fold(v: u8, p: u8) -> u8 {
    zigzag(signed_delta(v, p))
}

/// Reconstructs the pixel value from a decoded Rice symbol `r` and the
/// prediction `p`, the inverse of [`fold`].
pub fn unfold(r: u8, p: u8) -> u8 {
    reconstruct(p, unzigzag(r))
}

/// The modulo-256 difference `v - p`, folded into `[-128, 127]`.
///
/// Exposed separately from [`fold`] for the near-lossless predictor, which
/// needs this raw signed delta before quantizing it, rather than the
/// zigzagged symbol.
pub(crate) fn signed_delta(v: u8, p: u8) -> i32 {
    v.wrapping_sub(p) as i8 as i32
}

/// Reconstructs a pixel from prediction `p` and a signed delta `d`,
/// wrapping modulo 256. The inverse of [`signed_delta`], and also the
/// final step near-lossless reconstruction uses after rescaling its
/// quantized delta.
pub(crate) fn reconstruct(p: u8, d: i32) -> u8 {
    p.wrapping_add(d as u8)
}

/// Maps a signed delta in `[-128, 127]` (or any smaller-magnitude signed
/// value, as near-lossless quantization produces) to an unsigned Rice
/// symbol: even for non-negative deltas, odd for negative ones.
pub(crate) fn zigzag(d: i32) -> u8 {
    if d >= 0 {
        (2 * d) as u8
    } else {
        (-2 * d - 1) as u8
    }
}

/// The inverse of [`zigzag`].
pub(crate) fn unzigzag(r: u8) -> i32 {
    let r = r as i32;
    if r % 2 == 0 {
        r / 2
    } else {
        -(r / 2) - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fold_is_bijective_over_every_byte_pair() {
        for p in 0..=255u8 {
            for v in 0..=255u8 {
                let r = fold(v, p);
                assert_eq!(unfold(r, p), v, "p={p} v={v} r={r}");
            }
        }
    }

    #[test]
    fn symbols_cover_the_full_unsigned_byte_range() {
        use std::collections::HashSet;
        let p = 17u8;
        let symbols: HashSet<u8> = (0..=255u8).map(|v| fold(v, p)).collect();
        assert_eq!(symbols.len(), 256);
    }

    #[test]
    fn known_boundary_cases() {
        // v == p: zero delta folds to symbol 0.
        assert_eq!(fold(128, 128), 0);
        // v = p - 1: delta -1 folds to symbol 1.
        assert_eq!(fold(255, 0), 1);
        // v = p - 128: the worst-case delta exercises the tail escape (r = 255).
        assert_eq!(fold(0, 128), 255);
    }

    #[test]
    fn zigzag_round_trips_small_signed_deltas() {
        for d in -40..=40i32 {
            assert_eq!(unzigzag(zigzag(d)), d);
        }
    }
}
