#![cfg_attr(not(any(test, feature = "std")), no_std)]

//! # Modem Core
//!
//! Fixed-point (Q15) baseband modem for embedded systems.
//! Pulse-shaping modulator, windowed matched-filter demodulator and the
//! fixed-period scheduler that moves one sample in and one sample out per tick.

pub mod types;
pub mod framing;
pub mod dsp;
pub mod taps;
pub mod fault;
pub mod modulator;
pub mod demodulator;
pub mod sync;
pub mod hal;
pub mod telemetry;
pub mod scheduler;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;


pub use types::*;
pub use framing::Framing;
pub use fault::{FaultRegister, ModemError};
pub use modulator::Modulator;
pub use demodulator::{Demodulator, Detection};
pub use sync::FrameSync;
pub use hal::{CycleCounter, HalError, ModemHal, TxIndicator};
pub use telemetry::{DebugCounters, TelemetryHeader};
pub use scheduler::Scheduler;

/// Modem library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default configuration: 8 kHz ticks, 500 bit/s, preamble in every frame
pub fn default_config() -> ModemConfig {
    ModemConfig {
        tick_hz: TICK_HZ,
        core_clock_hz: CORE_CLOCK_HZ,
        detection_threshold: DEFAULT_THRESHOLD,
        framing: Framing::Preamble { repeat: true },
        report_interval: REPORT_INTERVAL,
        stream_input: false,
    }
}
