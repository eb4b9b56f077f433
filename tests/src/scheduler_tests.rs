//! Scheduler scenarios over the loopback mock

use rstest::rstest;

use modem_core::hal::mock::{MockCycleCounter, MockModemHal};
use modem_core::scheduler::IDLE_LEVEL;
use modem_core::taps::{BOXCAR, ROOT_RAISED_COSINE};
use modem_core::telemetry::HEADER_LEN;
use modem_core::{
    default_config, Framing, LinkState, ModemConfig, Q15, Scheduler, TelemetryHeader, TICK_HZ,
};

use crate::{loopback_scheduler, run_collect, HOST_CYCLE_STEP};

#[rstest]
#[case::boxcar(&BOXCAR)]
#[case::root_raised_cosine(&ROOT_RAISED_COSINE)]
fn test_one_second_loopback(#[case] taps: &'static [Q15]) {
    let mut sched = loopback_scheduler(default_config(), taps).unwrap();
    sched.hal_mut().push_inbound(b"HELLO");

    let received = run_collect(&mut sched, TICK_HZ);

    assert_eq!(received, b"HELLO");
    assert_eq!(sched.ticks(), TICK_HZ as u64);
    assert_eq!(sched.hal().reads, TICK_HZ as usize);
    assert_eq!(sched.hal().writes, TICK_HZ as usize);
    assert_eq!(sched.last_fault(), None);
}

#[test]
fn test_back_to_back_frames() {
    let message = [0x00, 0xFF, 0x55, 0xAA, 0x01, 0x80, 0x7E, 0x81, 0xC3];
    let mut sched = loopback_scheduler(default_config(), &BOXCAR).unwrap();
    sched.hal_mut().push_inbound(&message);

    assert_eq!(run_collect(&mut sched, TICK_HZ), message);
}

fn continuous_config(framing: Framing) -> ModemConfig {
    ModemConfig {
        framing,
        ..default_config()
    }
}

#[rstest]
#[case::raw(Framing::Raw, b"ABCD".as_slice())]
#[case::preamble_once(Framing::Preamble { repeat: false }, b"ABCDEFG".as_slice())]
fn test_continuous_framing_loopback(#[case] framing: Framing, #[case] message: &[u8]) {
    let mut sched = loopback_scheduler(continuous_config(framing), &BOXCAR).unwrap();
    sched.hal_mut().push_inbound(message);

    assert_eq!(run_collect(&mut sched, TICK_HZ), message);
    assert_eq!(sched.sync().state(), LinkState::DataSampling);
    assert_eq!(sched.last_fault(), None);
}

#[rstest]
#[case::raw(Framing::Raw, 36)]
#[case::preamble_once(Framing::Preamble { repeat: false }, 37)]
fn test_continuous_framing_long_message(#[case] framing: Framing, #[case] len: usize) {
    let message: Vec<u8> = (0u8..=252).step_by(7).take(len).collect();
    let mut sched = loopback_scheduler(continuous_config(framing), &BOXCAR).unwrap();
    sched.hal_mut().push_inbound(&message);

    assert_eq!(run_collect(&mut sched, TICK_HZ), message);
}

#[test]
fn test_raw_framing_holds_unpaired_byte() {
    let mut sched = loopback_scheduler(continuous_config(Framing::Raw), &BOXCAR).unwrap();
    sched.hal_mut().push_inbound(b"HELLO");

    assert_eq!(run_collect(&mut sched, TICK_HZ), b"HELL");
    assert_eq!(sched.modulator().queued_bits(), 8);
    assert!(!sched.modulator().is_data_valid());
}

#[test]
fn test_idle_line_stays_quiet() {
    let mut sched = loopback_scheduler(default_config(), &BOXCAR).unwrap();
    assert!(run_collect(&mut sched, 2_000).is_empty());

    let hal = sched.hal();
    assert!(hal.output.iter().all(|s| *s == IDLE_LEVEL));
    assert_eq!(hal.tx_edges, 0);
    assert_eq!(hal.services, 2_000);
}

#[test]
fn test_telemetry_over_one_second() {
    let mut sched = loopback_scheduler(default_config(), &BOXCAR).unwrap();
    sched.hal_mut().push_inbound(b"HELLO");
    run_collect(&mut sched, TICK_HZ);

    let outbound = &sched.hal().outbound;
    assert_eq!(outbound.len(), 7 * HEADER_LEN);

    let headers: Vec<TelemetryHeader> = outbound
        .chunks(HEADER_LEN)
        .map(|chunk| TelemetryHeader::decode(chunk).unwrap())
        .collect();
    for (i, header) in headers.iter().enumerate() {
        assert_eq!(header.id, i as u32);
        assert_eq!(header.n, 1024);
        assert_eq!(header.fs, 8000);
        assert_eq!(header.dbg2, 0);
    }
    // Four frames start before the first report, the fifth after it
    assert_eq!(headers[0].dbg1, 32);
    assert_eq!(headers[1].dbg1, 8);
    assert!(headers[2..].iter().all(|h| h.dbg1 == 0));
}

#[test]
fn test_stream_input_interleaves_telemetry() {
    let config = ModemConfig {
        stream_input: true,
        report_interval: 4,
        ..default_config()
    };
    let hal = MockModemHal::with_input((1..=4).map(Q15));
    let mut sched =
        Scheduler::with_kernels(hal, MockCycleCounter::new(HOST_CYCLE_STEP), config, &BOXCAR, &BOXCAR)
            .unwrap();
    for _ in 0..4 {
        sched.tick();
    }

    let outbound = &sched.hal().outbound;
    assert_eq!(&outbound[..8], &[1, 0, 2, 0, 3, 0, 4, 0]);
    let header = TelemetryHeader::decode(&outbound[8..]).unwrap();
    assert_eq!(header.id, 0);
    assert_eq!(header.n, 4);
}

#[test]
fn test_overruns_reported_in_counters() {
    let config = default_config();
    let cycles = MockCycleCounter::with_work(HOST_CYCLE_STEP, config.cycles_per_tick() * 2);
    let mut sched =
        Scheduler::with_kernels(MockModemHal::new(), cycles, config, &BOXCAR, &BOXCAR).unwrap();

    for _ in 0..10 {
        sched.tick();
    }
    assert_eq!(sched.counters().overruns, 10);
    assert_eq!(sched.hal().writes, 10);
}

#[test]
fn test_high_threshold_hears_nothing() {
    let config = ModemConfig {
        detection_threshold: i16::MAX,
        ..default_config()
    };
    let mut sched = loopback_scheduler(config, &BOXCAR).unwrap();
    sched.hal_mut().push_inbound(b"HI");

    assert!(run_collect(&mut sched, 1_000).is_empty());
    assert_eq!(sched.demodulator().window_fill(), 1_000 % 16);
}
