//! Sender → byte stream → receiver.

use absorbsim::app::service::AppService;
use absorbsim::link::monitor::{Monitor, byte_to_volts};
use absorbsim::link::transport::IoTransport;

use crate::mock_hw::{MockDelay, MockOptics, RecordingSink, quiet_sensor, unity_config};

/// Run `ticks` ticks at absorbance `a` and return the wire bytes.
fn stream(a: f32, ticks: usize) -> Vec<u8> {
    let config = unity_config(&[quiet_sensor("a", 0), quiet_sensor("b", 0)]);
    let service = AppService::new(config, 3).unwrap();
    let mut optics = MockOptics::new(100.0, 900.0);
    let mut sink = RecordingSink::default();
    let mut running = service.calibrate(&mut optics, &mut MockDelay::default(), &mut sink);

    optics.set_absorbance(a);
    let mut link = IoTransport::new(Vec::new());
    for _ in 0..ticks {
        running.sample(&mut optics);
        running.tick(&mut link, &mut sink).unwrap();
    }
    link.into_inner()
}

#[test]
fn monitor_reads_what_the_service_sends() {
    let bytes = stream(1.0, 8);
    let mut monitor = Monitor::new(25);
    let samples = monitor.ingest(&bytes);

    assert_eq!(monitor.channels(), Some(3));
    assert_eq!(samples.len(), 8);
    assert_eq!(samples[7].t_ms, 7 * 25);
    for sample in &samples {
        assert!(sample.volts.iter().all(|&v| v == byte_to_volts(100)));
    }
}

#[test]
fn monitor_survives_values_equal_to_newline() {
    // 0.1 absorbance -> 10 counts -> 0x0A on every value byte.
    let bytes = stream(0.1, 5);
    assert_eq!(&bytes[..5], &[10, 10, 10, 3, b'\n']);

    let mut monitor = Monitor::new(25);
    let samples = monitor.ingest(&bytes);
    assert_eq!(samples.len(), 5);
    assert_eq!(monitor.mismatches(), 0);
}

#[test]
fn monitor_joins_a_running_stream() {
    let bytes = stream(1.0, 10);
    let mut monitor = Monitor::new(25);

    // Attach halfway through the second frame.
    // The torn tail poisons a line or two before the decoder resyncs.
    let samples = monitor.ingest(&bytes[7..]);
    assert!(samples.len() >= 5, "only {} frames recovered", samples.len());
    assert!(monitor.mismatches() >= 1);
    assert_eq!(monitor.channels(), Some(3));
    for sample in &samples {
        assert!(sample.volts.iter().all(|&v| v == byte_to_volts(100)));
    }
}

#[test]
fn split_reads_reassemble() {
    let bytes = stream(1.0, 4);
    let mut monitor = Monitor::new(25);

    let mut total = 0;
    for chunk in bytes.chunks(3) {
        total += monitor.ingest(chunk).len();
    }
    assert_eq!(total, 4);
}
