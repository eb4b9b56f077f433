//! Preamble and start-of-frame policy
//!
//! The preamble is a run of alternating bits starting at `1`; its last
//! position breaks the alternation and doubles as the start-of-frame
//! delimiter. Stored as one byte and expanded least-significant bit first,
//! the same ordering `Modulator::add_byte` uses for payload bytes.

use crate::types::FRAME_BITS;

/// Preamble positions, SFD included
pub const PREAMBLE_BITS: usize = 8;

/// Preamble pattern, LSB first: `1,0,1,0,1,0,1,1`
pub const PREAMBLE: u8 = 0xD5;

/// Payload bits carried by a frame that repeats the preamble
pub const PAYLOAD_BITS: usize = FRAME_BITS - PREAMBLE_BITS;

/// Bit at `index` of the preamble, in transmission order
pub const fn preamble_bit(index: usize) -> bool {
    (PREAMBLE >> index) & 1 == 1
}

/// Iterate over a byte least-significant bit first
pub fn lsb_first(byte: u8) -> impl Iterator<Item = bool> {
    (0..8).map(move |i| (byte >> i) & 1 == 1)
}

/// How the modulator lays out preamble and payload inside its frames
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Framing {
    /// No preamble; every frame is all payload
    Raw,
    /// Preamble preloaded at start-up
    Preamble {
        /// Keep the preamble in every frame, or send it with the first frame only
        repeat: bool,
    },
}

impl Default for Framing {
    fn default() -> Self {
        Framing::Preamble { repeat: true }
    }
}

impl Framing {
    /// Number of bit slots preloaded when the modulator is created
    pub const fn preloaded_bits(&self) -> usize {
        match self {
            Framing::Raw => 0,
            Framing::Preamble { .. } => PREAMBLE_BITS,
        }
    }

    /// Write cursor position after a frame has been fully streamed
    pub const fn rewind_to(&self) -> usize {
        match self {
            Framing::Preamble { repeat: true } => PREAMBLE_BITS,
            Framing::Preamble { repeat: false } | Framing::Raw => 0,
        }
    }

    /// Payload bits available in each frame after the first
    pub const fn payload_bits(&self) -> usize {
        FRAME_BITS - self.rewind_to()
    }
}
