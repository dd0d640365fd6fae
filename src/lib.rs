// bdgr -- a lossless raster image codec
// Licensed under the Apache License, Version 2.0.

//! `bdgr` is a lossless, and optionally near-lossless, codec for
//! single-channel 8-bit raster images.
//!
//! The required codec is a single running left-neighbor predictor paired
//! with an adaptive Golomb-Rice entropy coder; [`encode`]/[`decode`] drive
//! it end to end. Enabling the `med` feature (on by default) adds the
//! LOCO-I / JPEG-LS median edge detector, near-lossless quantization, and
//! a run-length mode for flat regions, through
//! [`encode_extended`]/[`decode_extended`].
//!
//! ```
//! use bdgr::{GrayImage, encode, decode};
//!
//! let image = GrayImage::new(4, 4, vec![10u8; 16]).unwrap();
//! let packed = encode(&image);
//! let round_tripped = decode(&packed, image.width, image.height).unwrap();
//! assert_eq!(round_tripped.pixels, image.pixels);
//! ```

pub mod bitstream;
pub mod error;
pub mod fold;
pub mod frame;
pub mod image;
pub mod pgm;
pub mod predictor;
pub mod rice;

pub use error::{CodecError, CodecResult};
pub use frame::{decode, decode_into, encode, encode_into, peek_header};
pub use image::GrayImage;

#[cfg(feature = "med")]
pub use frame::{decode_extended, encode_extended, ExtendedOptions};
