//! Session configuration built once from the command line.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cli::Cli;
use crate::traits::{CameraSettings, Color, Overlay, Resolution};

/// File suffix of the raw H.264 stream written by the encoder.
pub const VIDEO_SUFFIX: &str = ".h264";

/// Command line value meaning "no limit".
const UNBOUNDED: i64 = -1;

/// Rejected command line combinations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Neither `--preview` nor `--capture` was given.
    #[error("Neither preview nor capture was enabled. Exiting...")]
    NoModeSelected,
    /// `--capture` without `--output`.
    #[error("An output must be specified if capturing video")]
    MissingOutput,
    /// Record time below -1.
    #[error("Invalid record time {0}: use a number of seconds or -1 for infinite")]
    InvalidRecordTime(i64),
    /// Interval count below -1.
    #[error("Invalid interval count {0}: use a count or -1 for infinite")]
    InvalidIntervals(i64),
}

/// How long each interval records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordTime {
    /// Record until the process is stopped.
    Unbounded,
    /// Record this many seconds per interval.
    Seconds(u32),
}

impl RecordTime {
    /// Number of ticks in one interval, `None` when unbounded.
    pub fn ticks(self, ticks_per_second: u64) -> Option<u64> {
        match self {
            Self::Unbounded => None,
            Self::Seconds(secs) => Some(u64::from(secs) * ticks_per_second),
        }
    }
}

impl TryFrom<i64> for RecordTime {
    type Error = ConfigError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if value == UNBOUNDED {
            return Ok(Self::Unbounded);
        }
        u32::try_from(value)
            .map(Self::Seconds)
            .map_err(|_| ConfigError::InvalidRecordTime(value))
    }
}

/// How many intervals the session records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intervals {
    /// Keep starting new intervals until the process is stopped.
    Unbounded,
    /// Stop after this many intervals.
    Count(u32),
}

impl Intervals {
    /// Whether interval `index` is past the budget.
    pub const fn is_exhausted(self, index: u32) -> bool {
        match self {
            Self::Unbounded => false,
            Self::Count(count) => index >= count,
        }
    }

    /// Whether each interval gets its own numbered file.
    pub const fn numbered_files(self) -> bool {
        matches!(self, Self::Count(count) if count > 1)
    }

    /// Whether per-interval completion is reported.
    pub const fn reports_progress(self) -> bool {
        matches!(self, Self::Count(count) if count > 0)
    }
}

impl TryFrom<i64> for Intervals {
    type Error = ConfigError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if value == UNBOUNDED {
            return Ok(Self::Unbounded);
        }
        u32::try_from(value)
            .map(Self::Count)
            .map_err(|_| ConfigError::InvalidIntervals(value))
    }
}

/// Everything a session needs, fixed for its lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Capture resolution.
    pub resolution: Resolution,
    /// Frames per second.
    pub framerate: u32,
    /// Label shown before the timestamp.
    pub label: String,
    /// Overlay text size.
    pub font_size: u8,
    /// Wait before touching the camera.
    pub delay: Option<Duration>,
    /// Record time per interval.
    pub record_time: RecordTime,
    /// Interval budget.
    pub intervals: Intervals,
    /// Recording destination, always ending in [`VIDEO_SUFFIX`]. Set iff capturing.
    pub output: Option<PathBuf>,
    /// Show a live preview.
    pub preview: bool,
}

impl SessionConfig {
    /// Validate the command line and build the configuration.
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        if !cli.preview && !cli.capture {
            return Err(ConfigError::NoModeSelected);
        }

        let output = if cli.capture {
            let output = cli.output.as_deref().ok_or(ConfigError::MissingOutput)?;
            Some(with_video_suffix(output))
        } else {
            None
        };

        Ok(Self {
            resolution: cli.screen_resolution,
            framerate: cli.framerate,
            label: cli.timestamp_label.clone(),
            font_size: cli.timestamp_size,
            delay: cli.delay_time.map(Duration::from_secs),
            record_time: RecordTime::try_from(cli.record_time)?,
            intervals: Intervals::try_from(cli.intervals)?,
            output,
            preview: cli.preview,
        })
    }

    /// Whether video is written to disk.
    pub const fn capture(&self) -> bool {
        self.output.is_some()
    }

    /// Settings handed to the camera at initialisation.
    pub fn camera_settings(&self) -> CameraSettings {
        CameraSettings {
            resolution: self.resolution,
            framerate: self.framerate,
            overlay: Overlay {
                label: self.label.clone(),
                background: Color::BLACK,
                text_size: self.font_size,
            },
        }
    }

    /// Output file of interval `index`, `None` when not capturing.
    ///
    /// With more than one interval the zero-based index goes in front of the
    /// suffix: `clip.h264` becomes `clip0.h264`, `clip1.h264`, ...
    pub fn output_for_interval(&self, index: u32) -> Option<PathBuf> {
        let base = self.output.as_deref()?;
        if !self.intervals.numbered_files() {
            return Some(base.to_path_buf());
        }

        let mut name = strip_video_suffix(base).into_os_string();
        name.push(index.to_string());
        name.push(VIDEO_SUFFIX);
        Some(PathBuf::from(name))
    }
}

fn has_video_suffix(path: &Path) -> bool {
    path.as_os_str()
        .as_encoded_bytes()
        .ends_with(VIDEO_SUFFIX.as_bytes())
}

/// Append [`VIDEO_SUFFIX`] unless the path already ends with it.
pub fn with_video_suffix(path: &Path) -> PathBuf {
    if has_video_suffix(path) {
        return path.to_path_buf();
    }
    let mut name = OsString::from(path.as_os_str());
    name.push(VIDEO_SUFFIX);
    PathBuf::from(name)
}

/// Drop a trailing [`VIDEO_SUFFIX`], leaving every other byte untouched.
fn strip_video_suffix(path: &Path) -> PathBuf {
    if !has_video_suffix(path) {
        return path.to_path_buf();
    }
    if path.extension().is_some() {
        // `clip.h264` -> `clip`
        path.with_extension("")
    } else {
        // A bare `.h264` file name has no extension, only a stem.
        path.with_file_name("")
    }
}
