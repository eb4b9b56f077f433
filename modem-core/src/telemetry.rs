//! Debug counters and the telemetry header sent over the serial link

/// Encoded size of [`TelemetryHeader`]
pub const HEADER_LEN: usize = 22;

const HEAD: [u8; 4] = *b"head";
const TAIL: [u8; 4] = *b"tail";

/// Counters accumulated between two reports
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DebugCounters {
    /// Payload bits accepted by the modulator
    pub bits_transmitted: u16,
    /// Bits the demodulator handed to the application
    pub bits_received: u16,
    /// Power slice of the last analysed window
    pub last_power: i16,
    /// Ticks whose work exceeded the cycle budget
    pub overruns: u16,
}

impl DebugCounters {
    pub const fn new() -> Self {
        Self {
            bits_transmitted: 0,
            bits_received: 0,
            last_power: 0,
            overruns: 0,
        }
    }

    /// Read and clear
    pub fn take(&mut self) -> Self {
        core::mem::take(self)
    }
}

/// Telemetry packet header, little-endian and packed on the wire:
///
/// | offset | field  | type     |
/// |--------|--------|----------|
/// | 0      | "head" | [u8; 4]  |
/// | 4      | id     | u32      |
/// | 8      | n      | u16      |
/// | 10     | fs     | u16      |
/// | 12     | dbg1   | u16      |
/// | 14     | dbg2   | u16      |
/// | 16     | dbg3   | u16      |
/// | 18     | "tail" | [u8; 4]  |
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TelemetryHeader {
    /// Report sequence number
    pub id: u32,
    /// Ticks covered by the report
    pub n: u16,
    /// Tick rate in Hz
    pub fs: u16,
    /// Bits transmitted
    pub dbg1: u16,
    /// Faults (misses)
    pub dbg2: u16,
    /// Last detection power slice
    pub dbg3: u16,
}

impl TelemetryHeader {
    pub fn new(n: u16, fs: u16) -> Self {
        Self {
            n,
            fs,
            ..Self::default()
        }
    }

    /// Fill the debug fields for one report
    pub fn load(&mut self, counters: &DebugCounters, misses: u16) {
        self.dbg1 = counters.bits_transmitted;
        self.dbg2 = misses;
        self.dbg3 = counters.last_power as u16;
    }

    pub fn encode(&self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        out[0..4].copy_from_slice(&HEAD);
        out[4..8].copy_from_slice(&self.id.to_le_bytes());
        out[8..10].copy_from_slice(&self.n.to_le_bytes());
        out[10..12].copy_from_slice(&self.fs.to_le_bytes());
        out[12..14].copy_from_slice(&self.dbg1.to_le_bytes());
        out[14..16].copy_from_slice(&self.dbg2.to_le_bytes());
        out[16..18].copy_from_slice(&self.dbg3.to_le_bytes());
        out[18..22].copy_from_slice(&TAIL);
        out
    }

    /// Parse a header, `None` unless both markers are present
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        let bytes: &[u8; HEADER_LEN] = bytes.get(..HEADER_LEN)?.try_into().ok()?;
        if bytes[0..4] != HEAD || bytes[18..22] != TAIL {
            return None;
        }
        let u16_at = |i: usize| u16::from_le_bytes([bytes[i], bytes[i + 1]]);

        Some(Self {
            id: u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
            n: u16_at(8),
            fs: u16_at(10),
            dbg1: u16_at(12),
            dbg2: u16_at(14),
            dbg3: u16_at(16),
        })
    }
}
