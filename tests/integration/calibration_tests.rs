//! Startup calibration protocol against mock optics.

use absorbsim::app::events::{AppEvent, CalibrationReport};
use absorbsim::app::ports::{IlluminationPort, PinIllumination};
use absorbsim::app::service::AppService;
use absorbsim::link::transport::NullTransport;

use crate::mock_hw::{MockDelay, MockOptics, MockPin, RecordingSink, quiet_sensor, unity_config};

#[test]
fn dark_first_then_full_with_settle_delays() {
    let config = unity_config(&[quiet_sensor("a", 0)]);
    let settle_ms = config.illumination_settle_ms;
    let service = AppService::new(config, 7).unwrap();

    let mut optics = MockOptics::new(100.0, 900.0);
    let mut delay = MockDelay::default();
    let mut sink = RecordingSink::default();
    let running = service.calibrate(&mut optics, &mut delay, &mut sink);

    assert_eq!(optics.illumination, vec![false, true]);
    assert_eq!(optics.reads, 2 * 16);
    assert_eq!(delay.total_ns, 2 * u64::from(settle_ms) * 1_000_000);
    assert!(optics.lit, "illumination must stay on after calibration");

    assert_eq!(running.calibration().dark_level(), 100.0);
    assert_eq!(running.calibration().full_level(), 900.0);
}

#[test]
fn calibrated_model_matches_reference_points() {
    let service = AppService::new(unity_config(&[quiet_sensor("a", 0)]), 7).unwrap();
    let mut optics = MockOptics::new(100.0, 900.0);
    let running = service.calibrate(&mut optics, &mut MockDelay::default(), &mut RecordingSink::default());

    let cal = running.calibration();
    assert_eq!(cal.calibrate(900.0), 0.0);
    assert!((cal.calibrate(90.0) - 1.0).abs() < 1e-5);
}

#[test]
fn low_contrast_is_reported_not_fatal() {
    let service = AppService::new(unity_config(&[quiet_sensor("a", 0)]), 7).unwrap();
    let mut optics = MockOptics::new(100.0, 110.0);
    let mut sink = RecordingSink::default();
    let mut running = service.calibrate(&mut optics, &mut MockDelay::default(), &mut sink);

    assert!(sink.events.iter().any(|e| matches!(
        e,
        AppEvent::Calibrated(CalibrationReport {
            low_contrast: true,
            ..
        })
    )));

    // The service still ticks.
    running.sample(&mut optics);
    assert!(running.tick(&mut NullTransport, &mut sink).is_some());
}

#[test]
fn pin_illumination_drives_output_pin() {
    let mut light = PinIllumination::new(MockPin::default());
    light.set_illumination(false);
    light.set_illumination(true);
    assert_eq!(light.into_inner().writes, vec![false, true]);
}
