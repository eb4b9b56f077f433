//! Property-based tests for the numeric primitives and frame buffers

use proptest::prelude::*;

use modem_core::dsp;
use modem_core::framing::{lsb_first, Framing};
use modem_core::taps::{BOXCAR, ROOT_RAISED_COSINE};
use modem_core::test_utils::*;
use modem_core::{
    Demodulator, ModemError, Modulator, Q15, DEFAULT_THRESHOLD, FRAME_BITS, WINDOW_LEN,
};

fn q15() -> impl Strategy<Value = Q15> {
    any::<i16>().prop_map(Q15)
}

proptest! {
    #[test]
    fn prop_conv_length_and_bounds(
        input in prop::collection::vec(q15(), 1..64),
        kernel in prop::collection::vec(q15(), 1..32),
    ) {
        let mut out = vec![Q15::ZERO; input.len() + kernel.len()];
        let len = dsp::convolve(&input, &kernel, &mut out);
        prop_assert_eq!(len, input.len() + kernel.len() - 1);
        prop_assert_eq!(out[len], Q15::ZERO);
    }

    #[test]
    fn prop_conv_is_commutative(
        a in prop::collection::vec(q15(), 1..32),
        b in prop::collection::vec(q15(), 1..32),
    ) {
        let mut ab = vec![Q15::ZERO; a.len() + b.len()];
        let mut ba = vec![Q15::ZERO; a.len() + b.len()];
        dsp::convolve(&a, &b, &mut ab);
        dsp::convolve(&b, &a, &mut ba);
        prop_assert_eq!(ab, ba);
    }

    #[test]
    fn prop_min_max_bracket_every_sample(samples in prop::collection::vec(q15(), 1..128)) {
        let (low, low_i) = dsp::min(&samples).unwrap();
        let (high, high_i) = dsp::max(&samples).unwrap();
        prop_assert!(samples.iter().all(|s| low <= *s && *s <= high));
        prop_assert_eq!(samples.iter().position(|s| *s == low), Some(low_i));
        prop_assert_eq!(samples.iter().position(|s| *s == high), Some(high_i));
    }

    #[test]
    fn prop_power_slice_never_negative(window in prop::collection::vec(q15(), WINDOW_LEN)) {
        let mut matched = vec![Q15::ZERO; WINDOW_LEN + ROOT_RAISED_COSINE.len()];
        let len = dsp::convolve(&window, &ROOT_RAISED_COSINE, &mut matched);
        prop_assert!(dsp::power_slice(dsp::power(&matched[..len])) >= 0);
    }

    #[test]
    fn prop_modulator_accepts_exactly_free_slots(bits in prop::collection::vec(any::<bool>(), 0..40)) {
        let mut modulator = Modulator::new(&BOXCAR, Framing::default()).unwrap();
        let free = modulator.free_bits();

        for (i, bit) in bits.iter().enumerate() {
            let result = modulator.add_bit(*bit);
            if i < free {
                prop_assert_eq!(result, Ok(()));
            } else {
                prop_assert_eq!(result, Err(ModemError::BufferFull));
            }
        }
        prop_assert_eq!(modulator.queued_bits(), FRAME_BITS.min(FRAME_BITS - free + bits.len()));
        prop_assert_eq!(modulator.is_data_valid(), bits.len() >= free);
    }

    #[test]
    fn prop_boxcar_byte_survives_small_delay(byte in any::<u8>(), delay_by in 0usize..8) {
        let mut modulator = Modulator::new(&BOXCAR, Framing::default()).unwrap();
        let samples = modulate_bytes(&mut modulator, &[byte]).unwrap();
        let received = pad(&delay(&samples, delay_by), 32);

        let bits = demodulate(&BOXCAR, DEFAULT_THRESHOLD, &received);
        prop_assert_eq!(decode_bits(&bits, Framing::default()), vec![byte]);
    }

    #[test]
    fn prop_rrc_byte_survives_small_delay(byte in any::<u8>(), delay_by in 0usize..4) {
        let mut modulator = Modulator::new(&ROOT_RAISED_COSINE, Framing::default()).unwrap();
        let samples = modulate_bytes(&mut modulator, &[byte]).unwrap();
        let received = pad(&delay(&samples, delay_by), 32);

        let bits = demodulate(&ROOT_RAISED_COSINE, DEFAULT_THRESHOLD, &received);
        prop_assert_eq!(decode_bits(&bits, Framing::default()), vec![byte]);
    }

    #[test]
    fn prop_raw_frame_bits_are_exact(first in any::<u8>(), second in any::<u8>()) {
        let mut modulator = Modulator::new(&BOXCAR, Framing::Raw).unwrap();
        let samples = modulate_bytes(&mut modulator, &[first, second]).unwrap();

        let bits = demodulate(&BOXCAR, DEFAULT_THRESHOLD, &samples);
        let expected: Vec<bool> = lsb_first(first).chain(lsb_first(second)).collect();
        prop_assert_eq!(bits, expected);
    }

    #[test]
    fn prop_demodulator_emits_at_most_one_bit_per_window(
        samples in prop::collection::vec(q15(), 0..256),
    ) {
        let mut demod = Demodulator::new(&BOXCAR, 0).unwrap();
        let mut bits = 0;
        for sample in &samples {
            demod.feed_sample(*sample).unwrap();
            if demod.get_bit().is_ok() {
                bits += 1;
            }
        }
        prop_assert!(bits <= samples.len() / WINDOW_LEN);
    }

    #[test]
    fn prop_adc_dac_round_trip(raw in 0u16..1024) {
        prop_assert_eq!(Q15::from_adc10(raw).to_dac10(), raw);
    }
}
