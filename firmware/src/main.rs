#![no_std]
#![no_main]

// Logging support
#[cfg(feature = "defmt")]
use defmt::{error, info};
#[cfg(feature = "defmt")]
use defmt_rtt as _;
use panic_halt as _;

// Define simple logging macros when defmt is not available
#[cfg(not(feature = "defmt"))]
macro_rules! info {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "defmt"))]
macro_rules! error {
    ($($arg:tt)*) => {};
}

use cortex_m_rt::entry;

use ook_modem_firmware::*;
use ook_modem_firmware::taps::BOXCAR;

static SCHEDULER: StaticCell<BoardScheduler> = StaticCell::new();

#[entry]
fn main() -> ! {
    let Some(cp) = cortex_m::Peripherals::take() else {
        halt();
    };

    init_clocks();
    info!("OOK modem v{} starting", VERSION);

    let hal = EduCiaaModemHal::new();
    let cycles = DwtCycleCounter::new(cp.DCB, cp.DWT);
    let config = default_config();

    let scheduler = match BoardScheduler::with_kernels(
        hal,
        cycles,
        config,
        &BOXCAR,
        &BOXCAR,
    ) {
        Ok(scheduler) => SCHEDULER.init(scheduler),
        Err(_e) => {
            error!("scheduler setup failed: {}", _e);
            halt();
        }
    };

    info!("{} bit/s, {} cycles per tick", config.bit_rate(), config.cycles_per_tick());
    scheduler.run()
}

fn halt() -> ! {
    loop {
        cortex_m::asm::nop();
    }
}
