//! Command line interface.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::Parser;

use crate::rpicam::DEFAULT_PROGRAM;
use crate::traits::Resolution;

/// Record and preview Raspberry Pi camera output with a timestamp overlay;
/// the time is taken from the system clock.
#[derive(Debug, Clone, Parser)]
#[command(name = "time-cam", version, about)]
pub struct Cli {
    /// Enable preview.
    #[arg(short = 'p', long)]
    pub preview: bool,

    /// Enable video capture to file.
    #[arg(short = 'c', long)]
    pub capture: bool,

    /// Recording output destination, only used when capture is enabled.
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Screen resolution as WIDTHxHEIGHT.
    #[arg(short = 's', long = "screen_resolution", default_value = "640x480")]
    pub screen_resolution: Resolution,

    /// Video framerate.
    #[arg(short = 'r', long, default_value_t = 25)]
    pub framerate: u32,

    /// Label displayed before the date and time in the timestamp.
    #[arg(
        short = 'l',
        long = "timestamp_label",
        default_value = "LABEL",
        allow_hyphen_values = true
    )]
    pub timestamp_label: String,

    /// Timestamp size, between 1 and 170 (short form: -ts).
    #[arg(
        long = "timestamp_size",
        default_value_t = 50,
        value_parser = clap::value_parser!(u8).range(1..=170)
    )]
    pub timestamp_size: u8,

    /// Record time per interval in seconds, -1 for infinite.
    #[arg(
        short = 't',
        long = "record_time",
        default_value_t = -1,
        allow_negative_numbers = true
    )]
    pub record_time: i64,

    /// Number of intervals to record, each to a new numbered file; -1 for infinite.
    #[arg(
        short = 'i',
        long,
        default_value_t = 1,
        allow_negative_numbers = true
    )]
    pub intervals: i64,

    /// Delay in seconds before any preview or capture starts.
    #[arg(short = 'd', long = "delay_time")]
    pub delay_time: Option<u64>,

    /// Camera program to run.
    #[arg(long, env = "TIME_CAM_CAMERA_BIN", default_value = DEFAULT_PROGRAM)]
    pub camera_bin: String,

    /// V4L2 index of the camera node to query.
    #[arg(long, env = "TIME_CAM_DEVICE_INDEX", default_value_t = 0)]
    pub device_index: u32,
}

impl Cli {
    /// Parse from the process arguments.
    pub fn parse_args() -> Self {
        Self::parse_from(normalize_args(std::env::args_os()))
    }

    /// Parse from an explicit argument list, first item being the program name.
    pub fn try_parse_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        Self::try_parse_from(normalize_args(args.into_iter().map(Into::into)))
    }
}

/// Flags whose value is the following argument.
const VALUE_FLAGS: &[&str] = &[
    "-o",
    "--output",
    "-s",
    "--screen_resolution",
    "-r",
    "--framerate",
    "-l",
    "--timestamp_label",
    "-ts",
    "--timestamp_size",
    "-t",
    "--record_time",
    "-i",
    "--intervals",
    "-d",
    "--delay_time",
    "--camera-bin",
    "--device-index",
];

/// Rewrite the two-letter `-ts` short flag to `--timestamp_size`.
///
/// Handles `-ts N`, `-tsN` and `-ts=N`. Stops at `--`. Values of other
/// flags are passed through, so `-l -tsunami` keeps its label.
pub fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut out = Vec::new();
    let mut passthrough = false;
    let mut value_next = false;

    for arg in args {
        if passthrough || value_next {
            value_next = false;
            out.push(arg);
            continue;
        }

        value_next = arg.to_str().is_some_and(|s| VALUE_FLAGS.contains(&s));
        let rewritten = arg.to_str().and_then(|s| {
            if s == "--" {
                None
            } else if s == "-ts" {
                Some(OsString::from("--timestamp_size"))
            } else {
                s.strip_prefix("-ts").map(|value| {
                    let value = value.strip_prefix('=').unwrap_or(value);
                    OsString::from(format!("--timestamp_size={value}"))
                })
            }
        });

        if arg == "--" {
            passthrough = true;
        }
        out.push(rewritten.unwrap_or(arg));
    }

    out
}
