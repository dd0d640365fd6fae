#![no_main]

use libfuzzer_sys::fuzz_target;

use bdgr::GrayImage;

/// Builds a small image from arbitrary fuzzer bytes, encodes it, and checks
/// that decoding reproduces the original pixels exactly -- the central
/// round-trip property, but driven by a fuzzer instead of a fixed corpus.
fuzz_target!(|data: &[u8]| {
    if data.len() < 3 {
        return;
    }

    let width = 1 + (data[0] as u16 % 64);
    let height = 1 + (data[1] as u16 % 64);
    let needed = width as usize * height as usize;

    let pixels: Vec<u8> = (0..needed).map(|i| data[2 + i % (data.len() - 2)]).collect();
    let image = GrayImage { width, height, pixels };

    let encoded = bdgr::encode(&image);
    assert_eq!(encoded.len() % 8, 0);

    let decoded = bdgr::decode(&encoded, width, height).expect("decode of our own encode must succeed");
    assert_eq!(decoded.pixels, image.pixels);
});
