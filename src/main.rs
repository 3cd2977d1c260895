//! absorbsim: main entry point.
//!
//! The same pipeline runs against real optics on ESP-IDF and against a
//! simulated optical bench on the host.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter / SimulatedOptics   LogEventSink   Clock      │
//! │  (RawSource + Illumination + Entropy) (EventSink)              │
//! │  UartTransport / IoTransport(stdout)                           │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │            RunningService (pure logic)                 │    │
//! │  │  Accumulator · Calibration · SensorBank · Scheduler    │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use log::info;

use absorbsim::adapters::log_sink::LogEventSink;
use absorbsim::adapters::time::MonotonicClock;
use absorbsim::app::ports::EntropyPort;
use absorbsim::app::service::AppService;
use absorbsim::config::SystemConfig;

// ── Host simulator ────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
mod host {
    use std::path::{Path, PathBuf};
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    use anyhow::{Context, anyhow};
    use clap::Parser;
    use tracing_subscriber::EnvFilter;

    use absorbsim::adapters::delay::{NoDelay, ThreadDelay};
    use absorbsim::adapters::optics::SimulatedOptics;
    use absorbsim::adapters::time::VirtualClock;
    use absorbsim::link::transport::IoTransport;

    use super::*;

    /// Simulated absorbance sensors: frames on stdout, logs on stderr.
    #[derive(Debug, Parser)]
    #[command(name = "absorbsim", version, about)]
    pub struct Args {
        /// JSON file overriding the built-in sensor table.
        #[arg(long)]
        pub config: Option<PathBuf>,

        /// Stop after this many ticks (default: run forever).
        #[arg(long)]
        pub ticks: Option<u64>,

        /// Noise seed (default: derived from the wall clock).
        #[arg(long)]
        pub seed: Option<u64>,

        /// Pace the loop with the wall clock instead of virtual time.
        #[arg(long)]
        pub realtime: bool,

        /// Milliseconds between raw reads.
        #[arg(long, default_value_t = 1)]
        pub poll_ms: u64,
    }

    pub fn init_logging() {
        // stdout carries binary frames; keep log text on stderr.
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_writer(std::io::stderr)
            .init();
    }

    pub fn load_config(path: Option<&Path>) -> Result<SystemConfig> {
        let Some(path) = path else {
            return Ok(SystemConfig::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: SystemConfig = serde_json::from_str(&text)
            .map_err(|e| anyhow!("parsing config {}: {}", path.display(), e))?;
        info!("Config loaded from {}", path.display());
        Ok(config)
    }

    fn clock_seed() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default()
    }

    enum Clock {
        Real(MonotonicClock),
        Virtual(VirtualClock),
    }

    impl Clock {
        fn now_ms(&self) -> u64 {
            match self {
                Self::Real(c) => c.now_ms(),
                Self::Virtual(c) => c.now_ms(),
            }
        }

        fn wait(&mut self, ms: u64) {
            match self {
                Self::Real(_) => std::thread::sleep(Duration::from_millis(ms)),
                Self::Virtual(c) => c.advance(ms),
            }
        }
    }

    pub fn run(args: &Args) -> Result<()> {
        // ── 1. Configuration ──────────────────────────────────
        let config = load_config(args.config.as_deref())?;

        // ── 2. Adapters ───────────────────────────────────────
        let mut optics = SimulatedOptics::new(args.seed.unwrap_or_else(clock_seed));
        let seed = optics.seed();
        info!("Noise seed: {}", seed);
        let mut sink = LogEventSink::new();
        let mut link = IoTransport::new(std::io::stdout().lock());

        // ── 3. Calibrate ──────────────────────────────────────
        let service = AppService::new(config, seed).context("invalid configuration")?;
        let mut running = if args.realtime {
            service.calibrate(&mut optics, &mut ThreadDelay, &mut sink)
        } else {
            service.calibrate(&mut optics, &mut NoDelay, &mut sink)
        };

        // ── 4. Polling loop ───────────────────────────────────
        let mut clock = if args.realtime {
            Clock::Real(MonotonicClock::new())
        } else {
            Clock::Virtual(VirtualClock::new())
        };
        let poll_ms = args.poll_ms.max(1);

        while args.ticks.is_none_or(|limit| running.ticks() < limit) {
            let now_ms = clock.now_ms();
            optics.set_time(now_ms);
            running.poll(&mut optics, now_ms, &mut link, &mut sink);
            anyhow::ensure!(running.frames_dropped() == 0, "frame link closed");
            clock.wait(poll_ms);
        }

        info!(
            "Done: {} ticks, {} frames sent, {} intervals missed",
            running.ticks(),
            running.frames_sent(),
            running.scheduler().missed()
        );
        Ok(())
    }
}

#[cfg(not(target_os = "espidf"))]
fn main() -> Result<()> {
    use clap::Parser;

    let args = host::Args::parse();
    host::init_logging();
    info!("absorbsim v{} (host simulator)", env!("CARGO_PKG_VERSION"));
    host::run(&args)
}

// ── ESP-IDF firmware ──────────────────────────────────────────

#[cfg(target_os = "espidf")]
fn main() -> Result<()> {
    use esp_idf_svc::hal::delay::FreeRtos;

    use absorbsim::adapters::hardware::{HardwareAdapter, UartTransport};
    use absorbsim::drivers::hw_init;
    use absorbsim::drivers::illumination_led::IlluminationLed;
    use absorbsim::drivers::photodiode::Photodiode;

    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  absorbsim v{}                    ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Peripherals ────────────────────────────────────────
    let config = SystemConfig::default();
    if let Err(e) = hw_init::init_peripherals(config.baud_rate) {
        // Without ADC or UART there is nothing to do; the task
        // watchdog resets the chip after its timeout.
        log::error!("HAL init failed: {}, halting", e);
        #[allow(clippy::empty_loop)]
        loop {}
    }

    let mut hw = HardwareAdapter::new(Photodiode::new(), IlluminationLed::new());
    let mut uart = UartTransport::new();
    let mut sink = LogEventSink::new();
    let clock = MonotonicClock::new();

    // ── 3. Calibrate ──────────────────────────────────────────
    let seed = hw.seed();
    let service = AppService::new(config, seed)?;
    let mut running = service.calibrate(&mut hw, &mut FreeRtos, &mut sink);

    info!("System ready. Entering polling loop.");

    // ── 4. Polling loop ───────────────────────────────────────
    loop {
        if running
            .poll(&mut hw, clock.now_ms(), &mut uart, &mut sink)
            .is_some()
        {
            // Yield once per tick so the idle task can feed the watchdog.
            FreeRtos::delay_ms(1);
        }
    }
}
