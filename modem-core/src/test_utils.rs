//! Test utilities for modem core functionality
//!
//! Helpers that run the modulator and demodulator over whole sample
//! vectors, plus a few deterministic channel impairments.

use std::vec::Vec;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::demodulator::Demodulator;
use crate::fault::ModemError;
use crate::framing::Framing;
use crate::modulator::Modulator;
use crate::sync::FrameSync;
use crate::types::Q15;

/// Stream every sample of the current frame
pub fn drain_frame(modulator: &mut Modulator) -> Result<Vec<Q15>, ModemError> {
    if !modulator.is_data_valid() {
        return Err(ModemError::GetSampleWithoutDataValid);
    }
    let mut samples = Vec::with_capacity(modulator.frame_len());
    samples.push(modulator.get_sample()?);
    while !modulator.is_ready_for_data() {
        samples.push(modulator.get_sample()?);
    }
    Ok(samples)
}

/// Modulate `bytes` back to back, one frame per completed frame buffer
///
/// Bytes left over in an incomplete frame are not transmitted.
pub fn modulate_bytes(modulator: &mut Modulator, bytes: &[u8]) -> Result<Vec<Q15>, ModemError> {
    let mut samples = Vec::new();
    for byte in bytes {
        modulator.add_byte(*byte)?;
        if modulator.is_data_valid() {
            samples.extend(drain_frame(modulator)?);
        }
    }
    Ok(samples)
}

/// Run `samples` through a fresh demodulator, collecting every accepted bit
pub fn demodulate(taps: &'static [Q15], threshold: i16, samples: &[Q15]) -> Vec<bool> {
    let Ok(mut demod) = Demodulator::new(taps, threshold) else {
        return Vec::new();
    };
    let mut bits = Vec::new();
    for sample in samples {
        let _ = demod.feed_sample(*sample);
        if let Ok(bit) = demod.get_bit() {
            bits.push(bit);
        }
    }
    bits
}

/// Recover payload bytes from a bit stream sent with `framing`
pub fn decode_bits(bits: &[bool], framing: Framing) -> Vec<u8> {
    let mut sync = FrameSync::new(framing);
    bits.iter().filter_map(|bit| sync.push_bit(*bit)).collect()
}

/// Delay by `n` zero samples
pub fn delay(samples: &[Q15], n: usize) -> Vec<Q15> {
    let mut out = vec![Q15::ZERO; n];
    out.extend_from_slice(samples);
    out
}

/// Pad with `n` trailing zero samples
pub fn pad(samples: &[Q15], n: usize) -> Vec<Q15> {
    let mut out = samples.to_vec();
    out.resize(samples.len() + n, Q15::ZERO);
    out
}

/// Attenuate by `2^shift`
pub fn attenuate(samples: &[Q15], shift: u32) -> Vec<Q15> {
    samples.iter().map(|s| s.shr(shift)).collect()
}

/// Add a constant offset, saturating
pub fn offset(samples: &[Q15], dc: i16) -> Vec<Q15> {
    samples
        .iter()
        .map(|s| Q15::saturate(s.0 as i64 + dc as i64))
        .collect()
}

/// Add uniform noise in `[-amplitude, amplitude]`, saturating
///
/// Seeded so runs are reproducible.
pub fn add_noise(samples: &[Q15], amplitude: i16, seed: u64) -> Vec<Q15> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let amplitude = amplitude.unsigned_abs().min(i16::MAX as u16) as i32;
    samples
        .iter()
        .map(|s| Q15::saturate(s.0 as i64 + rng.random_range(-amplitude..=amplitude) as i64))
        .collect()
}
