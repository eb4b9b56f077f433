//! Fixed-point numeric primitives shared by the modulator and demodulator
//!
//! All reductions follow the usual CMSIS-DSP Q15 conventions: products are
//! accumulated in 64 bits (2.30 terms into a 34.30 sum), convolution results
//! are shifted back by 15 and saturated, shifts are arithmetic.

use crate::types::Q15;

/// Right shift applied to the matched-filter output before the polarity decision
pub const SCALE_SHIFT: u32 = 4;

/// Lowest accumulator bit of the 16-bit power slice compared against the threshold
pub const POWER_SLICE_SHIFT: u32 = 22;

/// Full output length of convolving `a` with `b`
pub const fn conv_len(a: usize, b: usize) -> usize {
    if a == 0 || b == 0 {
        0
    } else {
        a + b - 1
    }
}

/// Convolve `input` with `kernel` into `output`
///
/// `output[n] = sat16((sum input[k] * kernel[n - k]) >> 15)`.
/// Writes at most `output.len()` samples and returns the full convolution
/// length, `input.len() + kernel.len() - 1`.
pub fn convolve(input: &[Q15], kernel: &[Q15], output: &mut [Q15]) -> usize {
    let len = conv_len(input.len(), kernel.len());

    for (n, out) in output.iter_mut().take(len).enumerate() {
        let first = n.saturating_sub(kernel.len() - 1);
        let last = n.min(input.len() - 1);

        let acc: i64 = (first..=last)
            .map(|k| input[k].0 as i64 * kernel[n - k].0 as i64)
            .sum();
        *out = Q15::saturate(acc >> 15);
    }

    len
}

/// Sum of squares in 34.30 format
pub fn power(samples: &[Q15]) -> i64 {
    samples
        .iter()
        .map(|s| {
            let v = s.0 as i64;
            v * v
        })
        .sum()
}

/// 16-bit slice of an accumulated power value used for threshold comparison
///
/// Takes accumulator bits 22..38. A sum of at most 127 full-scale squares
/// stays below `2^37`, so the slice does not wrap for any window/kernel
/// pair the demodulator accepts.
pub const fn power_slice(power: i64) -> i16 {
    (power >> POWER_SLICE_SHIFT) as i16
}

/// Arithmetic right shift of every sample in place
pub fn shift_right(samples: &mut [Q15], shift: u32) {
    for s in samples.iter_mut() {
        *s = s.shr(shift);
    }
}

/// Smallest value and the index of its first occurrence
pub fn min(samples: &[Q15]) -> Option<(Q15, usize)> {
    samples
        .iter()
        .enumerate()
        .fold(None, |best, (i, &s)| match best {
            Some((v, _)) if v <= s => best,
            _ => Some((s, i)),
        })
}

/// Largest value and the index of its first occurrence
pub fn max(samples: &[Q15]) -> Option<(Q15, usize)> {
    samples
        .iter()
        .enumerate()
        .fold(None, |best, (i, &s)| match best {
            Some((v, _)) if v >= s => best,
            _ => Some((s, i)),
        })
}
