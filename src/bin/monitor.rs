//! absorbsim-monitor: receiver side of the frame link.
//!
//! Reads the byte stream from a serial device (or stdin), decodes
//! frames, and prints one CSV row per frame:
//!
//! ```text
//! t_ms,ch1_v,ch2_v,…
//! ```
//!
//! Typical use: `absorbsim --ticks 800 | absorbsim-monitor > trace.csv`.
#![deny(unused_must_use)]

#[cfg(not(target_os = "espidf"))]
fn main() -> anyhow::Result<()> {
    use std::fs::File;
    use std::io::{self, BufWriter, Read, Write};
    use std::path::PathBuf;

    use anyhow::Context;
    use clap::Parser;
    use log::info;
    use tracing_subscriber::EnvFilter;

    use absorbsim::config::SystemConfig;
    use absorbsim::link::monitor::Monitor;

    /// Decode absorbsim frames into CSV (volts per channel).
    #[derive(Debug, Parser)]
    #[command(name = "absorbsim-monitor", version, about)]
    struct Args {
        /// Serial device or capture file (default: stdin).
        input: Option<PathBuf>,

        /// Sampling interval of the sender, for the time axis.
        #[arg(long, default_value_t = SystemConfig::default().sample_interval_ms)]
        interval_ms: u32,

        /// Expected values per frame (default: learn from the first frame).
        #[arg(long)]
        channels: Option<usize>,
    }

    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let mut input: Box<dyn Read> = match &args.input {
        Some(path) => Box::new(
            File::open(path).with_context(|| format!("opening {}", path.display()))?,
        ),
        None => Box::new(io::stdin().lock()),
    };
    let mut out = BufWriter::new(io::stdout().lock());

    let mut monitor = match args.channels {
        Some(n) => Monitor::with_channels(args.interval_ms, n),
        None => Monitor::new(args.interval_ms),
    };
    let mut header_written = false;
    let mut buf = [0u8; 256];

    loop {
        let n = match input.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e).context("reading frame stream"),
        };

        for sample in monitor.ingest(&buf[..n]) {
            if !header_written {
                write!(out, "t_ms")?;
                for ch in 1..=sample.volts.len() {
                    write!(out, ",ch{}_v", ch)?;
                }
                writeln!(out)?;
                header_written = true;
            }
            write!(out, "{}", sample.t_ms)?;
            for v in &sample.volts {
                write!(out, ",{:.4}", v)?;
            }
            writeln!(out)?;
        }
    }
    out.flush().context("writing CSV")?;

    info!(
        "Monitor: {} frames on {} channels, {} rejected lines",
        monitor.samples(),
        monitor.channels().unwrap_or(0),
        monitor.mismatches()
    );
    Ok(())
}

#[cfg(target_os = "espidf")]
fn main() {}
