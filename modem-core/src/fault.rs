//! Modem fault kinds and the last-fault register
//!
//! Every fault is local and non-fatal: the failing call returns `Err` and the
//! caller applies a benign default (drop the bit, emit zero). Nothing is
//! retried. The scheduler keeps the most recent fault for telemetry only.

/// Fault kinds reported by modulator and demodulator operations
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ModemError {
    /// Modulator symbol buffer already holds a full frame; the bit was discarded
    BufferFull = 1,
    /// Modulator output requested before a frame was complete
    GetSampleWithoutDataValid = 2,
    /// Demodulator window completed while the previous bit was unconsumed; sample dropped
    DemodBufferFull = 3,
    /// Bit read requested with no detected bit available
    DemodDataNotReady = 4,
}

impl ModemError {
    /// Stable numeric code, `0` is reserved for "no fault"
    pub const fn code(&self) -> u8 {
        *self as u8
    }

    /// Convert from a wire code, `0` and unknown codes map to `None`
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(ModemError::BufferFull),
            2 => Some(ModemError::GetSampleWithoutDataValid),
            3 => Some(ModemError::DemodBufferFull),
            4 => Some(ModemError::DemodDataNotReady),
            _ => None,
        }
    }
}

impl core::fmt::Display for ModemError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ModemError::BufferFull => write!(f, "modulator buffer full"),
            ModemError::GetSampleWithoutDataValid => write!(f, "sample requested without a complete frame"),
            ModemError::DemodBufferFull => write!(f, "demodulator bit not consumed"),
            ModemError::DemodDataNotReady => write!(f, "no demodulated bit available"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ModemError {}

/// Last-fault register
///
/// Overwritten on every fault, no history. `misses` counts faults since the
/// last telemetry report and is cleared by [`FaultRegister::take_misses`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FaultRegister {
    last: Option<ModemError>,
    misses: u16,
}

impl FaultRegister {
    /// Create an empty register
    pub const fn new() -> Self {
        Self {
            last: None,
            misses: 0,
        }
    }

    /// Record a fault, replacing the previous one
    pub fn record(&mut self, fault: ModemError) {
        #[cfg(feature = "defmt")]
        defmt::warn!("modem fault: {}", fault);

        self.last = Some(fault);
        self.misses = self.misses.saturating_add(1);
    }

    /// Record the error side of a result and pass the result through
    pub fn check<T>(&mut self, result: Result<T, ModemError>) -> Result<T, ModemError> {
        if let Err(fault) = result {
            self.record(fault);
        }
        result
    }

    /// Most recent fault, if any
    pub fn last(&self) -> Option<ModemError> {
        self.last
    }

    /// Faults recorded since the last call
    pub fn take_misses(&mut self) -> u16 {
        core::mem::take(&mut self.misses)
    }

    /// Faults recorded since the last `take_misses`
    pub fn misses(&self) -> u16 {
        self.misses
    }
}
