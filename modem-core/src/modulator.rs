//! Pulse-shaping modulator
//!
//! Bits are mapped onto an impulse train (one symbol level at the first
//! sample of each bit slot) and shaped by convolving the whole frame with the
//! filter kernel. The convolution runs once per frame, on the first
//! `get_sample` after the frame is complete; every other call streams one
//! precomputed sample.

use crate::dsp;
use crate::fault::ModemError;
use crate::framing::{self, Framing};
use crate::types::{ModulatorState, Q15, FILTERED_CAPACITY, FRAME_BITS, MAPPED_LEN, MAX_TAPS, SAMPLES_PER_BIT};

/// Baseband modulator for one frame of `FRAME_BITS` bits
pub struct Modulator {
    taps: &'static [Q15],
    framing: Framing,
    state: ModulatorState,
    mapped: [Q15; MAPPED_LEN],
    filtered: [Q15; FILTERED_CAPACITY],
    filtered_len: usize,
    /// Bits loaded into the current frame
    buff_i: usize,
    /// Next sample of `filtered` to stream
    out_i: usize,
}

impl Modulator {
    /// Create a modulator over an immutable kernel and preload the preamble
    pub fn new(taps: &'static [Q15], framing: Framing) -> Result<Self, &'static str> {
        if taps.is_empty() || taps.len() > MAX_TAPS {
            return Err("Filter kernel must have between 1 and MAX_TAPS taps");
        }

        let mut modulator = Self {
            taps,
            framing,
            state: ModulatorState::Filling,
            mapped: [Q15::ZERO; MAPPED_LEN],
            filtered: [Q15::ZERO; FILTERED_CAPACITY],
            filtered_len: dsp::conv_len(MAPPED_LEN, taps.len()),
            buff_i: 0,
            out_i: 0,
        };

        for i in 0..framing.preloaded_bits() {
            modulator.map_bit(i, framing::preamble_bit(i));
        }
        modulator.buff_i = framing.preloaded_bits();

        Ok(modulator)
    }

    fn map_bit(&mut self, slot: usize, bit: bool) {
        self.mapped[slot * SAMPLES_PER_BIT] = Q15::from_bit(bit);
    }

    /// Queue one bit in the next free slot
    ///
    /// Fails with `BufferFull` when the frame already holds `FRAME_BITS` bits;
    /// the bit is discarded and nothing is overwritten.
    pub fn add_bit(&mut self, bit: bool) -> Result<(), ModemError> {
        if self.buff_i >= FRAME_BITS {
            return Err(ModemError::BufferFull);
        }
        self.map_bit(self.buff_i, bit);
        self.buff_i += 1;
        Ok(())
    }

    /// Queue a byte least-significant bit first
    ///
    /// Stops at the first failing bit, so a byte that does not fit is
    /// enqueued partially.
    pub fn add_byte(&mut self, byte: u8) -> Result<(), ModemError> {
        for bit in framing::lsb_first(byte) {
            self.add_bit(bit)?;
        }
        Ok(())
    }

    /// True while no output stream is in flight
    pub fn is_ready_for_data(&self) -> bool {
        self.state == ModulatorState::Filling
    }

    /// True once the frame holds all of its bits
    pub fn is_data_valid(&self) -> bool {
        self.buff_i == FRAME_BITS
    }

    /// Next output sample
    ///
    /// Fails with `GetSampleWithoutDataValid` (caller emits zero) while the
    /// frame is incomplete; cursors are left untouched in that case.
    pub fn get_sample(&mut self) -> Result<Q15, ModemError> {
        if !self.is_data_valid() {
            return Err(ModemError::GetSampleWithoutDataValid);
        }

        if self.state == ModulatorState::Filling {
            dsp::convolve(&self.mapped, self.taps, &mut self.filtered);
            self.state = ModulatorState::Streaming;
            self.out_i = 0;

            #[cfg(feature = "defmt")]
            defmt::debug!("modulator: frame filtered, streaming {} samples", self.filtered_len);
        }

        let sample = self.filtered[self.out_i];
        self.out_i += 1;

        if self.out_i == self.filtered_len {
            self.out_i = 0;
            self.buff_i = self.framing.rewind_to();
            self.state = ModulatorState::Filling;

            #[cfg(feature = "defmt")]
            defmt::debug!("modulator: frame sent, ready for data");
        }

        Ok(sample)
    }

    /// Current state
    pub fn state(&self) -> ModulatorState {
        self.state
    }

    /// Bits loaded into the current frame
    pub fn queued_bits(&self) -> usize {
        self.buff_i
    }

    /// Free bit slots in the current frame
    pub fn free_bits(&self) -> usize {
        FRAME_BITS - self.buff_i
    }

    /// Samples streamed per frame
    pub fn frame_len(&self) -> usize {
        self.filtered_len
    }

    /// Read cursor inside the filtered frame
    pub fn position(&self) -> usize {
        self.out_i
    }

    /// Preamble policy in use
    pub fn framing(&self) -> Framing {
        self.framing
    }
}
