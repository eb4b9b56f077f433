//! Core data types for the baseband modem

use crate::framing::Framing;

/// Scheduler rate in ticks per second (one sample in, one sample out per tick)
pub const TICK_HZ: u32 = 8_000;

/// Core clock of the reference board (LPC4337 running from PLL1)
pub const CORE_CLOCK_HZ: u32 = 204_000_000;

/// Oversampling factor: samples per transmitted bit
pub const SAMPLES_PER_BIT: usize = 16;

/// Bit slots in one modulator frame
pub const FRAME_BITS: usize = 16;

/// Length of the mapped (impulse train) symbol buffer
pub const MAPPED_LEN: usize = FRAME_BITS * SAMPLES_PER_BIT;

/// Largest filter kernel accepted by the modulator and the demodulator
pub const MAX_TAPS: usize = 112;

/// Capacity of the modulator's filtered output buffer
pub const FILTERED_CAPACITY: usize = MAPPED_LEN + MAX_TAPS - 1;

/// Demodulator window length, one bit period of raw samples
pub const WINDOW_LEN: usize = SAMPLES_PER_BIT;

/// Capacity of the demodulator's matched-filter output buffer
pub const MATCHED_CAPACITY: usize = WINDOW_LEN + MAX_TAPS - 1;

/// Default detection threshold, compared against the power slice
pub const DEFAULT_THRESHOLD: i16 = 0x0100;

/// Ticks between two telemetry reports
pub const REPORT_INTERVAL: u16 = 1024;

/// Q15 fixed-point sample: one sign bit, 15 fractional bits, range [-1.0, 1.0)
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct Q15(pub i16);

impl Q15 {
    /// 0.0
    pub const ZERO: Q15 = Q15(0);
    /// Largest representable value (1.0 - 2^-15), the "high" symbol level
    pub const MAX: Q15 = Q15(i16::MAX);
    /// -1.0, the "low" symbol level
    pub const MIN: Q15 = Q15(i16::MIN);
    /// Number of fractional bits
    pub const FRAC_BITS: u32 = 15;

    /// Wrap a raw Q15 bit pattern
    pub const fn from_bits(bits: i16) -> Self {
        Q15(bits)
    }

    /// Raw Q15 bit pattern
    pub const fn to_bits(self) -> i16 {
        self.0
    }

    /// Saturate a wide accumulator into the Q15 range
    pub const fn saturate(acc: i64) -> Self {
        if acc > i16::MAX as i64 {
            Q15::MAX
        } else if acc < i16::MIN as i64 {
            Q15::MIN
        } else {
            Q15(acc as i16)
        }
    }

    /// Arithmetic right shift (rounds toward negative infinity)
    pub const fn shr(self, shift: u32) -> Self {
        Q15(self.0 >> shift)
    }

    /// Magnitude widened to `i32`, so that `|MIN|` is representable
    pub const fn magnitude(self) -> i32 {
        (self.0 as i32).abs()
    }

    /// Map a logical bit onto the symbol level used by the modulator
    pub const fn from_bit(bit: bool) -> Self {
        if bit {
            Q15::MAX
        } else {
            Q15::MIN
        }
    }

    /// Convert a 10-bit unsigned ADC reading (mid-scale 512) to Q15
    pub const fn from_adc10(raw: u16) -> Self {
        Q15((((raw & 0x03FF) as i16) - 512) << 6)
    }

    /// Convert to a 10-bit unsigned DAC code, Q15 zero maps to mid-scale 512
    pub const fn to_dac10(self) -> u16 {
        ((self.0 >> 6) + 512) as u16
    }

    /// Convert from a float, truncating toward zero and saturating
    pub fn from_f32(value: f32) -> Self {
        Q15::saturate((value * 32768.0) as i64)
    }

    /// Convert to a float in [-1.0, 1.0)
    pub fn to_f32(self) -> f32 {
        self.0 as f32 / 32768.0
    }
}

impl From<i16> for Q15 {
    fn from(bits: i16) -> Self {
        Q15(bits)
    }
}

impl From<Q15> for i16 {
    fn from(sample: Q15) -> Self {
        sample.0
    }
}

/// Modulator states
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ModulatorState {
    /// Accepting bits; no output stream in flight (ready for data)
    Filling,
    /// Filtered frame computed, samples being streamed out
    Streaming,
}

/// Demodulator states
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DemodulatorState {
    /// Collecting samples into the current window
    Filling,
    /// Window complete, detection running
    Analyzing,
    /// A detected bit waits for the consumer
    Holding,
}

/// Link-level synchronisation states driven by the frame synchroniser
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkState {
    /// Hunting for the first preamble bit
    NoSignal,
    /// Alternating preamble bits being received
    Preamble,
    /// Start-of-frame delimiter seen, next bit is payload
    Sfd,
    /// Payload bits being assembled
    DataSampling,
    /// Last payload bit received
    DataReady,
}

impl LinkState {
    /// Returns true while the synchroniser is locked onto a frame
    pub const fn is_locked(&self) -> bool {
        match self {
            LinkState::Sfd | LinkState::DataSampling => true,
            LinkState::NoSignal | LinkState::Preamble | LinkState::DataReady => false,
        }
    }
}

/// Modem configuration parameters
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ModemConfig {
    /// Scheduler rate in Hz
    pub tick_hz: u32,
    /// Core clock in Hz, used to derive the per-tick cycle budget
    pub core_clock_hz: u32,
    /// Power-slice threshold above which a window holds a symbol
    pub detection_threshold: i16,
    /// Preamble policy for the modulator
    pub framing: Framing,
    /// Ticks between telemetry reports
    pub report_interval: u16,
    /// Mirror every raw input sample to the outbound byte stream
    pub stream_input: bool,
}

impl Default for ModemConfig {
    fn default() -> Self {
        Self {
            tick_hz: TICK_HZ,
            core_clock_hz: CORE_CLOCK_HZ,
            detection_threshold: DEFAULT_THRESHOLD,
            framing: Framing::default(),
            report_interval: REPORT_INTERVAL,
            stream_input: false,
        }
    }
}

impl ModemConfig {
    /// Create a new configuration with validation
    pub fn new(
        tick_hz: u32,
        core_clock_hz: u32,
        detection_threshold: i16,
        framing: Framing,
        report_interval: u16,
        stream_input: bool,
    ) -> Result<Self, &'static str> {
        if tick_hz == 0 || tick_hz > 48_000 {
            return Err("Tick rate must be between 1 and 48000 Hz");
        }
        if core_clock_hz < tick_hz {
            return Err("Core clock must be at least the tick rate");
        }
        if detection_threshold < 0 {
            return Err("Detection threshold must not be negative");
        }
        if report_interval == 0 {
            return Err("Report interval must be at least one tick");
        }

        Ok(Self {
            tick_hz,
            core_clock_hz,
            detection_threshold,
            framing,
            report_interval,
            stream_input,
        })
    }

    /// Cycle budget of one scheduler tick, zero when `tick_hz` is zero
    pub fn cycles_per_tick(&self) -> u32 {
        self.core_clock_hz.checked_div(self.tick_hz).unwrap_or(0)
    }

    /// Symbol rate in bits per second
    pub fn bit_rate(&self) -> u32 {
        self.tick_hz / SAMPLES_PER_BIT as u32
    }
}
