//! Event packet inspection CLI.
//!
//! Reads a single event packet file, prints its header and optionally
//! exports the events as CSV.

use anyhow::{Context, Result};
use caer_core::{output, read_packet_file, AnyEventPacket, EventFilter, FieldOrder, LogLevel};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Instant;

/// Event packet dump tool for polarity and IMU9 packets.
///
/// Prints the packet header and, when an output path is given, writes the
/// events as CSV.
#[derive(Parser, Debug)]
#[command(name = "caer-dump")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input packet file path
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output CSV file path (optional)
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Field order for polarity CSV output.
    ///
    /// Format: comma-separated field names (x, y, p, t)
    ///
    /// Examples:
    /// - "x,y,p,t" (default)
    /// - "t,x,y,p" (timestamp first)
    #[arg(short, long, default_value = "x,y,p,t")]
    format: String,

    /// Also export events whose valid mark is cleared
    #[arg(short, long)]
    all: bool,

    /// Diagnostic threshold (emergency, alert, critical, error, warning, notice, info, debug)
    #[arg(short, long, default_value = "error")]
    log_level: String,

    /// Suppress progress output
    #[arg(short, long)]
    quiet: bool,
}

fn init_logging(level: LogLevel) -> Result<()> {
    caer_core::set_log_level(level);
    simplelog::TermLogger::init(
        level.to_level_filter(),
        simplelog::Config::default(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    )
    .context("Failed to initialise logging")?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = LogLevel::from_str(&args.log_level).map_err(anyhow::Error::msg)?;
    init_logging(level)?;

    let field_order = FieldOrder::from_str(&args.format)
        .context("Invalid field format. Use comma-separated: x,y,p,t")?;
    let filter = if args.all {
        EventFilter::All
    } else {
        EventFilter::Valid
    };

    let progress = if args.quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .context("Invalid progress template")?,
        );
        pb
    };

    let start_time = Instant::now();

    progress.set_message(format!(
        "Reading {:?}...",
        args.input.file_name().unwrap_or_default()
    ));

    let packet = read_packet_file(&args.input).context("Failed to read event packet")?;
    let header = packet.as_generic().header();
    log::info!(
        "Loaded {:?} packet with {} events from {:?}",
        packet.event_type(),
        header.event_number(),
        args.input
    );

    let mut exported = 0;
    if let Some(output_path) = &args.output {
        progress.set_message(format!(
            "Writing to {:?}...",
            output_path.file_name().unwrap_or_default()
        ));

        exported = match &packet {
            AnyEventPacket::Polarity(polarity) => {
                output::write_polarity_csv(output_path, polarity, field_order, filter)
                    .context("Failed to write polarity CSV")?
            }
            AnyEventPacket::Imu9(imu) => output::write_imu9_csv(output_path, imu, filter)
                .context("Failed to write IMU9 CSV")?,
        };
    }

    let total_duration = start_time.elapsed();

    progress.finish_with_message(format!(
        "Done! Read {} events in {:.3}s",
        header.event_number(),
        total_duration.as_secs_f64()
    ));

    if !args.quiet {
        eprintln!();
        eprintln!("Packet:");
        eprintln!("  Input:        {:?}", args.input);
        eprintln!("  Event type:   {:?}", packet.event_type());
        eprintln!("  Source:       {}", header.event_source());
        eprintln!("  Event size:   {} bytes", header.event_size());
        eprintln!("  Capacity:     {}", header.event_capacity());
        eprintln!("  Events:       {}", header.event_number());
        eprintln!("  Valid:        {}", header.event_valid());
        eprintln!("  TS overflow:  {}", header.event_ts_overflow());
        if let Some(output_path) = &args.output {
            eprintln!("  Output:       {:?}", output_path);
            eprintln!("  Exported:     {}", exported);
        }
    }

    Ok(())
}
