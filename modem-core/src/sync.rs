//! Preamble / start-of-frame synchroniser
//!
//! Sits behind the demodulator and turns the stream of detected bits back
//! into payload bytes, following the transmitter's framing:
//!
//! - `Preamble { repeat: true }`: hunt for the alternating preamble, lock on
//!   the repeated `1` that ends it, assemble one frame of payload, hunt again.
//! - `Preamble { repeat: false }`: hunt once, then stay locked and assemble
//!   bytes from every following bit.
//! - `Raw`: locked from the start, every bit is payload.
//!
//! The two continuous framings rely on the demodulator emitting exactly the
//! transmitted bits, which holds for kernels without energy past the frame.
//! The demodulator itself still accepts or rejects windows purely on energy.

use crate::framing::Framing;
use crate::types::LinkState;

/// Alternating bits required before a repeated `1` counts as SFD
pub const MIN_PREAMBLE_RUN: u8 = 4;

/// Bit-level frame synchroniser
#[derive(Debug, Clone)]
pub struct FrameSync {
    framing: Framing,
    state: LinkState,
    last_bit: bool,
    run: u8,
    /// Payload bits assembled since the SFD
    received: usize,
    byte: u8,
}

impl FrameSync {
    /// Synchroniser matching a transmitter that uses `framing`
    pub fn new(framing: Framing) -> Self {
        Self {
            framing,
            state: Self::initial_state(framing),
            last_bit: false,
            run: 0,
            received: 0,
            byte: 0,
        }
    }

    fn initial_state(framing: Framing) -> LinkState {
        match framing {
            Framing::Raw => LinkState::DataSampling,
            Framing::Preamble { .. } => LinkState::NoSignal,
        }
    }

    /// Current link state
    pub fn state(&self) -> LinkState {
        self.state
    }

    /// Framing this synchroniser follows
    pub fn framing(&self) -> Framing {
        self.framing
    }

    /// Drop any partial byte and start over
    ///
    /// Preamble framings go back to hunting; raw framing stays locked.
    pub fn reset(&mut self) {
        self.state = Self::initial_state(self.framing);
        self.run = 0;
        self.received = 0;
        self.byte = 0;
    }

    /// Feed one detected bit, returns a byte when one is complete
    pub fn push_bit(&mut self, bit: bool) -> Option<u8> {
        match self.state {
            LinkState::NoSignal | LinkState::DataReady => {
                self.hunt(bit);
                None
            }
            LinkState::Preamble => {
                if bit != self.last_bit {
                    self.run = self.run.saturating_add(1);
                    self.last_bit = bit;
                } else if bit && self.run >= MIN_PREAMBLE_RUN {
                    self.state = LinkState::Sfd;
                    self.received = 0;
                    self.byte = 0;

                    #[cfg(feature = "defmt")]
                    defmt::debug!("sync: SFD after {} preamble bits", self.run);
                } else {
                    self.hunt(bit);
                }
                None
            }
            LinkState::Sfd | LinkState::DataSampling => {
                self.state = LinkState::DataSampling;
                self.sample(bit)
            }
        }
    }

    fn hunt(&mut self, bit: bool) {
        if bit {
            self.state = LinkState::Preamble;
            self.last_bit = true;
            self.run = 1;
        } else {
            self.state = LinkState::NoSignal;
            self.run = 0;
        }
    }

    fn sample(&mut self, bit: bool) -> Option<u8> {
        if bit {
            self.byte |= 1 << (self.received % 8);
        }
        self.received += 1;

        if self.received % 8 != 0 {
            return None;
        }

        match self.framing {
            Framing::Preamble { repeat: true } if self.received >= self.framing.payload_bits() => {
                self.state = LinkState::DataReady;
            }
            Framing::Preamble { repeat: true } => {}
            Framing::Preamble { repeat: false } | Framing::Raw => self.received = 0,
        }
        Some(core::mem::take(&mut self.byte))
    }
}

impl Default for FrameSync {
    fn default() -> Self {
        Self::new(Framing::default())
    }
}
