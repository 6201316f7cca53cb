//! Golden digest tests.
//!
//! Each case builds a small input, runs one engine and compares the SHA-256
//! of the packed output (little-endian `u32` per pixel) against a pinned
//! reference. The references were computed from the expected pixel values,
//! not from a previous run, so a mismatch is a real behavior change.

use pixfx_core::{pixel, NoProgress, PixelBuffer};
use pixfx_ops::{box_blur, convolve, BlurParams, ConvolveParams, EdgeAction, Kernel};
use sha2::{Digest, Sha256};

/// SHA-256 of nine `0xFF1C1C1C` pixels.
const GREY_28_3X3: &str = "51b8e8a2083db25888b5789340900f13f18ed888dc1db55690706fdd63391fa9";

/// SHA-256 of sixteen `0xFF336699` pixels.
const SOLID_4X4: &str = "a290ea4b42998121f1b606e2648c098065dda6b3de3374cacdbd8207d7c004b3";

fn sha256_hex(buf: &PixelBuffer) -> String {
    let bytes: Vec<u8> = buf.as_slice().iter().flat_map(|px| px.to_le_bytes()).collect();
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    hasher.finalize().iter().map(|b| format!("{b:02x}")).collect()
}

#[test]
fn golden_white_dot_blur() {
    let mut src = PixelBuffer::filled(3, 3, pixel::BLACK).unwrap();
    src.set(1, 1, pixel::WHITE).unwrap();
    let out = box_blur(&src, &BlurParams::uniform(1.0, 1), &NoProgress).unwrap();
    assert_eq!(sha256_hex(&out), GREY_28_3X3);
}

#[test]
fn golden_constant_blur() {
    let src = PixelBuffer::filled(4, 4, 0xFF33_6699).unwrap();
    let out = box_blur(&src, &BlurParams::uniform(1.0, 3), &NoProgress).unwrap();
    assert_eq!(sha256_hex(&out), SOLID_4X4);
}

#[test]
fn golden_constant_gaussian() {
    let src = PixelBuffer::filled(4, 4, 0xFF33_6699).unwrap();
    for edge in [EdgeAction::Clamp, EdgeAction::Wrap] {
        let params = ConvolveParams { edge_action: edge, ..Default::default() };
        let out = convolve(&src, &Kernel::gaussian(3, 1.0), &params, &NoProgress).unwrap();
        assert_eq!(sha256_hex(&out), SOLID_4X4, "{edge:?}");
    }
}

#[test]
fn golden_digest_matches_cli_summary() {
    let src = PixelBuffer::filled(4, 4, 0xFF33_6699).unwrap();
    assert_eq!(pixfx_cli::digest(&src), SOLID_4X4);
}
