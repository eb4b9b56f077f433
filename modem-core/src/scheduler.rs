//! Fixed-period scheduler loop
//!
//! One tick, in order:
//! 1. restart the cycle counter;
//! 2. read one input sample, feed it to the demodulator (and optionally
//!    mirror it to the outbound stream);
//! 3. drain at most one detected bit into the frame synchroniser;
//! 4. if the modulator is ready for data, move one pending inbound byte into it;
//! 5. write one modulator sample, or the idle level when no frame is valid;
//! 6. emit telemetry when the report interval elapses;
//! 7. busy-wait until the cycle budget is spent.
//!
//! Input is always sampled before output is written, so nothing passes
//! from modulator to demodulator within one tick.

use heapless::Deque;

use crate::demodulator::Demodulator;
use crate::fault::{FaultRegister, ModemError};
use crate::hal::{CycleCounter, ModemHal};
use crate::modulator::Modulator;
use crate::sync::FrameSync;
use crate::telemetry::{DebugCounters, TelemetryHeader};
use crate::types::{ModemConfig, Q15};

/// Received bytes buffered for the application
pub const RX_QUEUE_LEN: usize = 16;

/// Output level written while no frame is on the air
pub const IDLE_LEVEL: Q15 = Q15::ZERO;

/// Top-level control loop owning modulator, demodulator and transducers
pub struct Scheduler<H, C> {
    hal: H,
    cycles: C,
    config: ModemConfig,
    budget: u32,
    modulator: Modulator,
    demodulator: Demodulator,
    sync: FrameSync,
    received: Deque<u8, RX_QUEUE_LEN>,
    faults: FaultRegister,
    counters: DebugCounters,
    header: TelemetryHeader,
    report_countdown: u16,
    ticks: u64,
}

impl<H, C> Scheduler<H, C>
where
    H: ModemHal,
    C: CycleCounter,
{
    /// Build a scheduler; modulator and demodulator are created by the caller
    pub fn new(
        hal: H,
        cycles: C,
        config: ModemConfig,
        modulator: Modulator,
        demodulator: Demodulator,
    ) -> Self {
        #[cfg(feature = "defmt")]
        defmt::info!(
            "scheduler: {} Hz, {} cycles per tick, framing {}",
            config.tick_hz,
            config.cycles_per_tick(),
            config.framing
        );

        Self {
            hal,
            cycles,
            budget: config.cycles_per_tick(),
            sync: FrameSync::new(modulator.framing()),
            modulator,
            demodulator,
            received: Deque::new(),
            faults: FaultRegister::new(),
            counters: DebugCounters::new(),
            header: TelemetryHeader::new(config.report_interval, config.tick_hz as u16),
            report_countdown: config.report_interval,
            ticks: 0,
            config,
        }
    }

    /// Build modulator and demodulator from `config` over the given kernels
    pub fn with_kernels(
        hal: H,
        cycles: C,
        config: ModemConfig,
        tx_taps: &'static [Q15],
        rx_taps: &'static [Q15],
    ) -> Result<Self, &'static str> {
        let modulator = Modulator::new(tx_taps, config.framing)?;
        let demodulator = Demodulator::new(rx_taps, config.detection_threshold)?;
        Ok(Self::new(hal, cycles, config, modulator, demodulator))
    }

    /// Run forever; only a reset ends the loop
    pub fn run(&mut self) -> ! {
        loop {
            self.tick();
        }
    }

    /// Execute one scheduler period
    pub fn tick(&mut self) {
        self.cycles.reset();

        self.receive();
        self.drain_bit();
        self.accept_inbound();
        self.transmit();
        self.hal.service();
        self.report();

        if self.cycles.elapsed() > self.budget {
            self.counters.overruns = self.counters.overruns.saturating_add(1);
        }
        while self.cycles.elapsed() < self.budget {}

        self.ticks += 1;
    }

    fn receive(&mut self) {
        let sample = self.hal.read_input_sample();
        if self.config.stream_input {
            self.hal.write_outbound_bytes(&sample.to_bits().to_le_bytes());
        }
        let _ = self.faults.check(self.demodulator.feed_sample(sample));
    }

    fn drain_bit(&mut self) {
        if !self.demodulator.is_data_available() {
            return;
        }
        self.counters.last_power = self.demodulator.last_power();

        let Ok(bit) = self.faults.check(self.demodulator.get_bit()) else {
            return;
        };
        self.counters.bits_received = self.counters.bits_received.saturating_add(1);

        if let Some(byte) = self.sync.push_bit(bit) {
            if self.received.is_full() {
                self.received.pop_front();
            }
            let _ = self.received.push_back(byte);

            #[cfg(feature = "defmt")]
            defmt::debug!("scheduler: received byte {=u8:#x}", byte);
        }
    }

    fn accept_inbound(&mut self) {
        if !self.modulator.is_ready_for_data() {
            return;
        }
        let Some(byte) = self.hal.try_read_inbound_byte() else {
            return;
        };

        let before = self.modulator.queued_bits();
        let _ = self.faults.check(self.modulator.add_byte(byte));
        let added = (self.modulator.queued_bits() - before) as u16;
        self.counters.bits_transmitted = self.counters.bits_transmitted.saturating_add(added);
    }

    fn transmit(&mut self) {
        let valid = self.modulator.is_data_valid();
        let sample = if valid {
            self.faults.check(self.modulator.get_sample()).unwrap_or(IDLE_LEVEL)
        } else {
            IDLE_LEVEL
        };
        self.hal.write_output_sample(sample);
        self.hal.set_tx_active(valid);
    }

    fn report(&mut self) {
        self.report_countdown = self.report_countdown.saturating_sub(1);
        if self.report_countdown > 0 {
            return;
        }
        self.report_countdown = self.config.report_interval.max(1);

        let counters = self.counters.take();
        self.header.load(&counters, self.faults.take_misses());
        self.hal.write_outbound_bytes(&self.header.encode());
        self.header.id = self.header.id.wrapping_add(1);

        #[cfg(feature = "defmt")]
        defmt::trace!("scheduler: telemetry {}", counters);
    }

    /// Oldest received payload byte
    pub fn pop_received(&mut self) -> Option<u8> {
        self.received.pop_front()
    }

    /// Most recent fault, for telemetry and debugging only
    pub fn last_fault(&self) -> Option<ModemError> {
        self.faults.last()
    }

    /// Counters accumulated since the last report
    pub fn counters(&self) -> &DebugCounters {
        &self.counters
    }

    /// Ticks executed so far
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn config(&self) -> &ModemConfig {
        &self.config
    }

    pub fn modulator(&self) -> &Modulator {
        &self.modulator
    }

    pub fn demodulator(&self) -> &Demodulator {
        &self.demodulator
    }

    pub fn sync(&self) -> &FrameSync {
        &self.sync
    }

    pub fn hal(&self) -> &H {
        &self.hal
    }

    pub fn hal_mut(&mut self) -> &mut H {
        &mut self.hal
    }

    pub fn cycles(&self) -> &C {
        &self.cycles
    }

    /// Tear down, returning the transducers
    pub fn release(self) -> (H, C) {
        (self.hal, self.cycles)
    }
}
