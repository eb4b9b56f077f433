//! Filter kernels for pulse shaping and matched filtering

use crate::types::Q15;

/// Square pulse: 16 taps of 0.25, one bit period long
pub const BOXCAR: [Q15; 16] = [Q15(0x2000); 16];

/// Root-raised-cosine kernel, beta = 0.5, 16 samples per symbol, 3 side lobes
///
/// Stored with 14 fractional bits because the centre tap (about 1.137)
/// does not fit Q15.
pub const ROOT_RAISED_COSINE: [Q15; 112] = [
    Q15(175), Q15(224), Q15(258), Q15(274), Q15(269), Q15(242), Q15(195), Q15(129),
    Q15(49), Q15(-38), Q15(-126), Q15(-206), Q15(-270), Q15(-311), Q15(-323), Q15(-302),
    Q15(-246), Q15(-157), Q15(-38), Q15(102), Q15(253), Q15(402), Q15(536), Q15(638),
    Q15(695), Q15(693), Q15(622), Q15(476), Q15(253), Q15(-42), Q15(-400), Q15(-803),
    Q15(-1230), Q15(-1653), Q15(-2040), Q15(-2358), Q15(-2570), Q15(-2644), Q15(-2546), Q15(-2251),
    Q15(-1739), Q15(-998), Q15(-25), Q15(1170), Q15(2569), Q15(4143), Q15(5852), Q15(7649),
    Q15(9480), Q15(11287), Q15(13009), Q15(14587), Q15(15966), Q15(17095), Q15(17932), Q15(18448),
    Q15(18622), Q15(18448), Q15(17932), Q15(17095), Q15(15966), Q15(14587), Q15(13009), Q15(11287),
    Q15(9480), Q15(7649), Q15(5852), Q15(4143), Q15(2569), Q15(1170), Q15(-25), Q15(-998),
    Q15(-1739), Q15(-2251), Q15(-2546), Q15(-2644), Q15(-2570), Q15(-2358), Q15(-2040), Q15(-1653),
    Q15(-1230), Q15(-803), Q15(-400), Q15(-42), Q15(253), Q15(476), Q15(622), Q15(693),
    Q15(695), Q15(638), Q15(536), Q15(402), Q15(253), Q15(102), Q15(-38), Q15(-157),
    Q15(-246), Q15(-302), Q15(-323), Q15(-311), Q15(-270), Q15(-206), Q15(-126), Q15(-38),
    Q15(49), Q15(129), Q15(195), Q15(242), Q15(269), Q15(274), Q15(258), Q15(224),
];

/// Fractional bits of [`ROOT_RAISED_COSINE`]
pub const RRC_FRAC_BITS: u32 = 14;

/// Quantise a real coefficient to `frac_bits` fractional bits, truncating
/// toward negative infinity
#[cfg(any(test, feature = "std"))]
pub fn to_fixed(value: f64, frac_bits: u32) -> Q15 {
    Q15::saturate((value * (1u64 << frac_bits) as f64).floor() as i64)
}

/// Design a root-raised-cosine kernel into `out`
///
/// The kernel spans `sps * (2 * lobes + 1)` taps centred on `t = 0`; returns
/// the number of taps written, or `None` if `out` is too short.
#[cfg(any(test, feature = "std"))]
pub fn root_raised_cosine(
    sps: usize,
    beta: f64,
    lobes: usize,
    frac_bits: u32,
    out: &mut [Q15],
) -> Option<usize> {
    use std::f64::consts::{FRAC_1_SQRT_2, PI};

    let len = sps * (lobes * 2 + 1);
    if out.len() < len || sps == 0 {
        return None;
    }

    for (n, tap) in out.iter_mut().take(len).enumerate() {
        let t = (n as f64 - len as f64 / 2.0) / sps as f64;
        let h = if t == 0.0 {
            1.0 - beta + 4.0 * beta / PI
        } else if t.abs() == 1.0 / (4.0 * beta) {
            beta * FRAC_1_SQRT_2
                * ((1.0 + 2.0 / PI) * (PI / (4.0 * beta)).sin()
                    + (1.0 - 2.0 / PI) * (PI / (4.0 * beta)).cos())
        } else {
            let num = (PI * t * (1.0 - beta)).sin() + 4.0 * beta * t * (PI * t * (1.0 + beta)).cos();
            num / (PI * t * (1.0 - (4.0 * beta * t).powi(2)))
        };
        *tap = to_fixed(h, frac_bits);
    }

    Some(len)
}
