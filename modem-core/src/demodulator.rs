//! Windowed matched-filter demodulator
//!
//! Raw samples are collected into a window of one bit period. When the
//! window is full it is correlated against the matched filter and reduced to
//! one decision:
//!
//! - power: sum of squares of the matched-filter output, reduced to a 16-bit
//!   slice and compared against the threshold (below → noise, no bit);
//! - polarity: the output is shifted right by [`dsp::SCALE_SHIFT`] and the bit
//!   is `1` iff the largest positive excursion strictly exceeds the magnitude
//!   of the most negative one.
//!
//! No state is carried between windows; symbol timing is whatever the
//! window boundary happens to be.

use crate::dsp;
use crate::fault::ModemError;
use crate::types::{DemodulatorState, Q15, MATCHED_CAPACITY, MAX_TAPS, WINDOW_LEN};

/// Outcome of analysing one window
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Detection {
    /// Polarity decision
    pub bit: bool,
    /// Power slice of the matched-filter output
    pub power: i16,
    /// Power slice exceeded the threshold
    pub accepted: bool,
}

/// Baseband demodulator
pub struct Demodulator {
    taps: &'static [Q15],
    threshold: i16,
    state: DemodulatorState,
    window: [Q15; WINDOW_LEN],
    window_i: usize,
    matched: [Q15; MATCHED_CAPACITY],
    bit: bool,
    last_power: i16,
}

impl Demodulator {
    /// Create a demodulator over an immutable matched-filter kernel
    pub fn new(taps: &'static [Q15], threshold: i16) -> Result<Self, &'static str> {
        if taps.is_empty() || taps.len() > MAX_TAPS {
            return Err("Matched filter must have between 1 and MAX_TAPS taps");
        }

        Ok(Self {
            taps,
            threshold,
            state: DemodulatorState::Filling,
            window: [Q15::ZERO; WINDOW_LEN],
            window_i: 0,
            matched: [Q15::ZERO; MATCHED_CAPACITY],
            bit: false,
            last_power: 0,
        })
    }

    /// Append one raw sample to the window
    ///
    /// Fails with `DemodBufferFull` while the previous bit is unconsumed; the
    /// sample is dropped. A full window is analysed immediately.
    pub fn feed_sample(&mut self, sample: Q15) -> Result<(), ModemError> {
        if self.state == DemodulatorState::Holding {
            return Err(ModemError::DemodBufferFull);
        }

        self.window[self.window_i] = sample;
        self.window_i += 1;

        if self.window_i == WINDOW_LEN {
            self.window_i = 0;
            self.state = DemodulatorState::Analyzing;

            let detection = self.analyze();
            self.last_power = detection.power;

            if detection.accepted {
                self.bit = detection.bit;
                self.state = DemodulatorState::Holding;

                #[cfg(feature = "defmt")]
                defmt::trace!("demodulator: bit {} at power {}", detection.bit, detection.power);
            } else {
                self.state = DemodulatorState::Filling;
            }
        }

        Ok(())
    }

    fn analyze(&mut self) -> Detection {
        let len = dsp::convolve(&self.window, self.taps, &mut self.matched);
        let matched = &mut self.matched[..len];

        let power = dsp::power_slice(dsp::power(matched));
        dsp::shift_right(matched, dsp::SCALE_SHIFT);

        let (low, _) = dsp::min(matched).unwrap_or((Q15::ZERO, 0));
        let (high, _) = dsp::max(matched).unwrap_or((Q15::ZERO, 0));

        Detection {
            bit: high.0 as i32 > low.magnitude(),
            power,
            accepted: power > self.threshold,
        }
    }

    /// True iff a detected bit is waiting
    pub fn is_data_available(&self) -> bool {
        self.state == DemodulatorState::Holding
    }

    /// Take the detected bit
    ///
    /// Fails with `DemodDataNotReady` when no bit is waiting; a second call
    /// after a successful one fails until the next accepted window.
    pub fn get_bit(&mut self) -> Result<bool, ModemError> {
        if !self.is_data_available() {
            return Err(ModemError::DemodDataNotReady);
        }
        self.state = DemodulatorState::Filling;
        Ok(self.bit)
    }

    /// Current state
    pub fn state(&self) -> DemodulatorState {
        self.state
    }

    /// Power slice of the most recently analysed window
    pub fn last_power(&self) -> i16 {
        self.last_power
    }

    /// Detection threshold in use
    pub fn threshold(&self) -> i16 {
        self.threshold
    }

    /// Samples collected in the current window
    pub fn window_fill(&self) -> usize {
        self.window_i
    }
}
