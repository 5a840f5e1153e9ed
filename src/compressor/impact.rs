//! Lossy single-byte quantization of a BM25 partial score (spec §4.4). The
//! scale constant `36.06` is part of the on-disk wire format, not a tunable
//! — it must match between `quantize` and `dequantize` forever.

use crate::config::IMPACT_QUANTIZE_SCALE;

/// Maps a non-negative score `s` onto a single byte via
/// `floor(log2(s + 1) * 36.06)`, clamped to `[0, 255]`.
pub fn quantize(score: f64) -> u8 {
    if score <= 0.0 {
        return 0;
    }
    let raw = ((score + 1.0).log2() * IMPACT_QUANTIZE_SCALE).floor();
    raw.clamp(0.0, 255.0) as u8
}

/// Inverse of [`quantize`]: `2^(byte / 36.06) - 1`.
pub fn dequantize(byte: u8) -> f64 {
    if byte == 0 {
        return 0.0;
    }
    2f64.powf(byte as f64 / IMPACT_QUANTIZE_SCALE) - 1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_score_quantizes_to_zero_byte() {
        assert_eq!(quantize(0.0), 0);
        assert_eq!(dequantize(0), 0.0);
    }

    #[test]
    fn quantization_is_monotone_in_score() {
        let scores = [0.1, 1.0, 2.5, 5.0, 10.0, 20.0, 100.0];
        let bytes: Vec<u8> = scores.iter().map(|&s| quantize(s)).collect();
        for pair in bytes.windows(2) {
            assert!(pair[1] >= pair[0]);
        }
    }

    #[test]
    fn clamps_to_byte_range_for_large_scores() {
        assert_eq!(quantize(1e12), 255);
    }

    #[test]
    fn negative_or_zero_scores_clamp_to_zero() {
        assert_eq!(quantize(-5.0), 0);
    }

    #[test]
    fn decode_is_approximately_inverse_of_encode() {
        for &s in &[1.0, 4.0, 9.5, 30.0] {
            let b = quantize(s);
            let back = dequantize(b);
            assert!((back - s).abs() / s < 0.05, "s={s} back={back}");
        }
    }
}
