// Loopback simulation: one second of scheduler ticks with the output fed back to the input

use modem_core::taps::{BOXCAR, ROOT_RAISED_COSINE};
use modem_core::telemetry::{TelemetryHeader, HEADER_LEN};
use modem_core::{default_config, Q15, TICK_HZ};
use modem_tests::{loopback_scheduler, run_collect};

fn main() {
    println!("🧪 Baseband modem loopback simulation");

    let message = b"73 DE LU";
    let kernels: [(&str, &'static [Q15]); 2] = [
        ("boxcar", &BOXCAR),
        ("root raised cosine", &ROOT_RAISED_COSINE),
    ];
    for (name, taps) in kernels {
        run(name, taps, message);
    }

    println!("✅ Loopback simulation finished");
}

fn run(name: &str, taps: &'static [Q15], message: &[u8]) {
    println!();
    println!("📡 Kernel: {} ({} taps)", name, taps.len());

    let Ok(mut sched) = loopback_scheduler(default_config(), taps) else {
        println!("  ❌ could not build scheduler");
        return;
    };
    sched.hal_mut().push_inbound(message);

    let received = run_collect(&mut sched, 2 * TICK_HZ);
    println!("  sent:     {:?}", String::from_utf8_lossy(message));
    println!("  received: {:?}", String::from_utf8_lossy(&received));
    println!("  link:     {:?}", sched.sync().state());

    for chunk in sched.hal().outbound.chunks(HEADER_LEN) {
        if let Some(header) = TelemetryHeader::decode(chunk) {
            println!(
                "  report {:>2}: bits out {:>3}, misses {}, power {}",
                header.id, header.dbg1, header.dbg2, header.dbg3 as i16
            );
        }
    }

    if received == message {
        println!("  ✅ round trip ok");
    } else {
        println!("  ❌ round trip mismatch");
    }
}
