//! Steady-state pipeline: polling, tick boundaries, frame contents.

use absorbsim::app::events::AppEvent;
use absorbsim::app::service::{AppService, RunningService};
use absorbsim::config::SystemConfig;
use absorbsim::link::codec::FrameDecoder;
use absorbsim::link::transport::{IoTransport, NullTransport};

use crate::mock_hw::{
    BrokenLink, MockDelay, MockOptics, RecordingSink, quiet_sensor, unity_config,
};

fn calibrated(config: SystemConfig) -> (RunningService, MockOptics, RecordingSink) {
    let service = AppService::new(config, 11).unwrap();
    let mut optics = MockOptics::new(100.0, 900.0);
    let mut sink = RecordingSink::default();
    let running = service.calibrate(&mut optics, &mut MockDelay::default(), &mut sink);
    (running, optics, sink)
}

#[test]
fn one_frame_per_interval() {
    let (mut running, mut optics, mut sink) = calibrated(unity_config(&[quiet_sensor("a", 0)]));
    let mut link = IoTransport::new(Vec::new());

    // 1 ms polls for 250 ms of a 25 ms interval.
    let mut frames = 0;
    for now_ms in 0..=250 {
        if running.poll(&mut optics, now_ms, &mut link, &mut sink).is_some() {
            frames += 1;
        }
    }
    assert_eq!(frames, 10);
    assert_eq!(running.frames_sent(), 10);
    assert_eq!(sink.frames(), 10);

    // Every byte on the wire decodes back into those frames.
    let bytes = link.into_inner();
    let mut decoder = FrameDecoder::new();
    assert_eq!(decoder.feed(&bytes).count(), 10);
    assert_eq!(decoder.mismatches(), 0);
}

#[test]
fn tick_averages_every_read_in_the_interval() {
    let (mut running, mut optics, mut sink) = calibrated(unity_config(&[quiet_sensor("a", 0)]));
    let mut link = NullTransport;

    running.poll(&mut optics, 0, &mut link, &mut sink); // starts the scheduler
    for now_ms in 1..25 {
        running.poll(&mut optics, now_ms, &mut link, &mut sink);
    }
    running.poll(&mut optics, 25, &mut link, &mut sink);

    let Some(AppEvent::Frame(report)) = sink.events.last() else {
        panic!("expected a frame event, got {:?}", sink.events.last());
    };
    assert_eq!(report.tick, 1);
    assert_eq!(report.reads, 26);
    assert_eq!(report.raw_average, 900.0);
    assert_eq!(report.absorbance, 0.0);
}

#[test]
fn attenuation_reaches_every_sensor_in_order() {
    let (mut running, mut optics, mut sink) = calibrated(unity_config(&[
        quiet_sensor("fast", 0),
        quiet_sensor("slow", 50),
    ]));
    let mut link = IoTransport::new(Vec::new());

    optics.set_absorbance(1.0);
    running.sample(&mut optics);
    let frame = running.tick(&mut link, &mut sink).unwrap();

    // Depth 2 for the slow sensor: (0 + 0 + 1.0) / 3.
    assert_eq!(frame.calibrated(), Some(100));
    assert_eq!(frame.sensors(), &[100, 33]);
    assert_eq!(link.into_inner(), vec![100, 100, 33, 3, b'\n']);
}

#[test]
fn slow_sensor_ramps_up_on_a_step() {
    let (mut running, mut optics, mut sink) = calibrated(unity_config(&[quiet_sensor("slow", 100)]));
    optics.set_absorbance(1.0);

    let mut last = 0;
    for _ in 0..20 {
        running.sample(&mut optics);
        let frame = running.tick(&mut NullTransport, &mut sink).unwrap();
        let out = frame.sensors()[0];
        assert!(out >= last, "step response must not fall back");
        last = out;
    }
    // Depth 4 feeds back its own outputs: about 84 after 20 ticks.
    assert!((80..100).contains(&last), "got {last}");
}

#[test]
fn calibrated_byte_can_be_disabled() {
    let mut config = unity_config(&[quiet_sensor("a", 0)]);
    config.emit_calibrated = false;
    let (mut running, mut optics, mut sink) = calibrated(config);
    let mut link = IoTransport::new(Vec::new());

    running.sample(&mut optics);
    running.tick(&mut link, &mut sink).unwrap();
    assert_eq!(link.into_inner(), vec![0, 1, b'\n']);
}

#[test]
fn empty_interval_is_skipped() {
    let (mut running, _optics, mut sink) = calibrated(unity_config(&[quiet_sensor("a", 0)]));
    assert!(running.tick(&mut NullTransport, &mut sink).is_none());
    assert_eq!(sink.events.last(), Some(&AppEvent::TickSkipped { tick: 1 }));
    assert_eq!(running.frames_sent(), 0);
}

#[test]
fn transport_failure_counts_dropped_frames() {
    let (mut running, mut optics, mut sink) = calibrated(unity_config(&[quiet_sensor("a", 0)]));

    running.sample(&mut optics);
    let frame = running.tick(&mut BrokenLink, &mut sink);

    assert!(frame.is_some(), "the frame is still produced");
    assert_eq!(running.frames_dropped(), 1);
    assert_eq!(running.frames_sent(), 0);
    assert!(sink.events.contains(&AppEvent::FrameDropped { tick: 1 }));
}

#[test]
fn default_table_frame_layout() {
    let (mut running, mut optics, mut sink) = calibrated(SystemConfig::default());
    let mut link = IoTransport::new(Vec::new());

    running.sample(&mut optics);
    let frame = running.tick(&mut link, &mut sink).unwrap();
    let bytes = link.into_inner();

    let values = 1 + SystemConfig::default().sensors.len();
    assert_eq!(frame.value_count(), values);
    assert_eq!(bytes.len(), values + 2);
    assert_eq!(bytes[values], values as u8);
    assert_eq!(bytes[values + 1], b'\n');
}
