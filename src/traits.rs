//! Core traits and types for the camera abstraction.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::str::FromStr;
use std::time::Duration;

use crate::annotation::Annotation;

/// Capture resolution in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
}

impl Resolution {
    /// Create a new resolution.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self::new(640, 480)
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for Resolution {
    type Err = String;

    /// Parse a `WxH` string such as `1280x720`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (width, height) = s
            .split_once(['x', 'X'])
            .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{s}'"))?;

        let parse = |part: &str| {
            part.trim()
                .parse::<u32>()
                .ok()
                .filter(|v| *v > 0)
                .ok_or_else(|| format!("invalid dimension '{part}' in '{s}'"))
        };

        Ok(Self::new(parse(width)?, parse(height)?))
    }
}

/// Greyscale overlay colour, as understood by the camera encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color(pub u8);

impl Color {
    /// Solid black.
    pub const BLACK: Self = Self(0);
    /// Solid white.
    pub const WHITE: Self = Self(255);
}

/// Text overlay drawn by the camera encoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overlay {
    /// Label shown before the date and time.
    pub label: String,
    /// Background behind the overlay text.
    pub background: Color,
    /// Text height, 1 to 170.
    pub text_size: u8,
}

/// Settings applied once when the camera is initialised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraSettings {
    /// Capture resolution.
    pub resolution: Resolution,
    /// Frames per second.
    pub framerate: u32,
    /// Timestamp overlay.
    pub overlay: Overlay,
}

/// Error type for camera operations.
#[derive(Debug, thiserror::Error)]
pub enum CameraError {
    /// Device with given index was not found.
    #[error("Device {0} not found")]
    DeviceNotFound(u32),
    /// Failed to open device.
    #[error("Failed to open device: {0}")]
    DeviceOpenFailed(String),
    /// An operation needed settings that were never applied.
    #[error("Camera used before it was configured")]
    NotConfigured,
    /// The recording destination could not be created.
    #[error("Cannot write to {}: {source}", path.display())]
    OutputUnavailable {
        /// Requested output file.
        path: PathBuf,
        /// Underlying I/O failure.
        source: io::Error,
    },
    /// A recording is already in progress.
    #[error("A recording is already in progress")]
    AlreadyRecording,
    /// No recording is in progress.
    #[error("No recording is in progress")]
    NotRecording,
    /// The camera program could not be started.
    #[error("Failed to start {program}: {source}")]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// Underlying I/O failure.
        source: io::Error,
    },
    /// The camera program stopped on its own.
    #[error("Camera process exited unexpectedly ({status})")]
    ProcessExited {
        /// Exit status reported by the OS.
        status: ExitStatus,
    },
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for camera operations.
pub type Result<T> = std::result::Result<T, CameraError>;

/// Abstraction over the camera capabilities the session needs.
///
/// Production code drives real hardware; tests substitute a recording fake.
pub trait CameraDevice {
    /// Initialise the camera with resolution, framerate and overlay style.
    fn configure(&mut self, settings: &CameraSettings) -> Result<()>;

    /// Show a live preview.
    fn start_preview(&mut self) -> Result<()>;

    /// Hide the live preview.
    fn stop_preview(&mut self) -> Result<()>;

    /// Start encoding H.264 to `path`.
    fn start_recording(&mut self, path: &Path) -> Result<()>;

    /// Stop the current recording and close its file.
    fn stop_recording(&mut self) -> Result<()>;

    /// Replace the on-screen annotation.
    fn set_annotation(&mut self, annotation: &Annotation) -> Result<()>;

    /// Block for `duration` while a recording runs, surfacing encoder errors.
    fn wait_recording(&mut self, duration: Duration) -> Result<()>;
}
