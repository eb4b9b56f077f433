//! Hardware Abstraction Layer for the modem scheduler
//!
//! The scheduler only ever polls: every call here must return immediately.

use embedded_hal::digital::OutputPin;
use crate::types::Q15;

/// Error types for HAL operations
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HalError {
    /// TX indicator pin write failed
    GpioError,
}

#[cfg(feature = "std")]
impl core::fmt::Display for HalError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            HalError::GpioError => write!(f, "TX indicator pin write failed"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for HalError {}

/// Sample and byte transducers used by the scheduler
pub trait ModemHal {
    /// Latest input sample; there is no "no data" case
    fn read_input_sample(&mut self) -> Q15;

    /// Drive the output transducer
    fn write_output_sample(&mut self, sample: Q15);

    /// Pending inbound byte from the transport, if any
    fn try_read_inbound_byte(&mut self) -> Option<u8>;

    /// Queue bytes on the outbound transport (telemetry)
    fn write_outbound_bytes(&mut self, bytes: &[u8]);

    /// Reflect whether a frame is on the air
    fn set_tx_active(&mut self, _active: bool) {}

    /// Once-per-tick housekeeping (e.g. topping up a UART FIFO)
    fn service(&mut self) {}
}

/// Free-running cycle counter used to pace the scheduler
pub trait CycleCounter {
    /// Restart counting from zero
    fn reset(&mut self);

    /// Cycles since the last reset
    fn elapsed(&self) -> u32;
}

/// TX activity indicator on an embedded-hal output pin
pub struct TxIndicator<P> {
    pin: P,
    active_low: bool,
    active: bool,
}

impl<P> TxIndicator<P>
where
    P: OutputPin,
{
    pub fn new(pin: P, active_low: bool) -> Self {
        Self {
            pin,
            active_low,
            active: false,
        }
    }

    /// Drive the pin; only touches hardware when the state changes
    pub fn set_active(&mut self, active: bool) -> Result<(), HalError> {
        if active == self.active {
            return Ok(());
        }
        let level = active != self.active_low;
        let result = if level {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        result.map_err(|_| HalError::GpioError)?;
        self.active = active;
        Ok(())
    }

    /// Last state successfully driven
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Release the pin
    pub fn free(self) -> P {
        self.pin
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub mod mock {
    //! Mock implementations for testing

    use super::*;
    use std::collections::VecDeque;
    use std::vec::Vec;

    /// Transducer mock recording every access
    #[derive(Default, Debug)]
    pub struct MockModemHal {
        /// Samples returned by `read_input_sample`, zero once exhausted
        pub input: VecDeque<Q15>,
        /// Feed each written output back as the next input
        pub loopback: bool,
        /// Bytes returned by `try_read_inbound_byte`
        pub inbound: VecDeque<u8>,
        /// Every sample written
        pub output: Vec<Q15>,
        /// Every outbound byte written
        pub outbound: Vec<u8>,
        pub reads: usize,
        pub writes: usize,
        pub inbound_polls: usize,
        pub services: usize,
        pub tx_active: bool,
        pub tx_edges: usize,
    }

    impl MockModemHal {
        pub fn new() -> Self {
            Self::default()
        }

        /// Mock whose input is its own output delayed by one tick
        pub fn loopback() -> Self {
            Self {
                loopback: true,
                ..Self::default()
            }
        }

        pub fn with_input(samples: impl IntoIterator<Item = Q15>) -> Self {
            Self {
                input: samples.into_iter().collect(),
                ..Self::default()
            }
        }

        pub fn push_inbound(&mut self, bytes: &[u8]) {
            self.inbound.extend(bytes.iter().copied());
        }
    }

    impl ModemHal for MockModemHal {
        fn read_input_sample(&mut self) -> Q15 {
            self.reads += 1;
            self.input.pop_front().unwrap_or(Q15::ZERO)
        }

        fn write_output_sample(&mut self, sample: Q15) {
            self.writes += 1;
            self.output.push(sample);
            if self.loopback {
                self.input.push_back(sample);
            }
        }

        fn try_read_inbound_byte(&mut self) -> Option<u8> {
            self.inbound_polls += 1;
            self.inbound.pop_front()
        }

        fn write_outbound_bytes(&mut self, bytes: &[u8]) {
            self.outbound.extend_from_slice(bytes);
        }

        fn set_tx_active(&mut self, active: bool) {
            if active != self.tx_active {
                self.tx_edges += 1;
            }
            self.tx_active = active;
        }

        fn service(&mut self) {
            self.services += 1;
        }
    }

    /// Cycle counter that advances by `step` on every read
    ///
    /// A zero `step` is raised to one so a busy-wait always terminates.
    #[derive(Debug)]
    pub struct MockCycleCounter {
        now: core::cell::Cell<u32>,
        step: u32,
        /// Cycles charged at the first read after a reset (simulated work)
        pub work: u32,
        pub resets: usize,
    }

    impl MockCycleCounter {
        pub fn new(step: u32) -> Self {
            Self {
                now: core::cell::Cell::new(0),
                step: step.max(1),
                work: 0,
                resets: 0,
            }
        }

        pub fn with_work(step: u32, work: u32) -> Self {
            Self {
                work,
                ..Self::new(step)
            }
        }
    }

    impl CycleCounter for MockCycleCounter {
        fn reset(&mut self) {
            self.resets += 1;
            self.now.set(0);
        }

        fn elapsed(&self) -> u32 {
            let now = if self.now.get() == 0 {
                self.work.max(self.step)
            } else {
                self.now.get().saturating_add(self.step)
            };
            self.now.set(now);
            now
        }
    }
}
