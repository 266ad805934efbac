//! Pi-Time-Cam: preview and record Raspberry Pi camera video with a live
//! timestamp overlay.
//!
//! The session loop is written against the [`CameraDevice`] and [`Clock`]
//! traits, so it runs the same against the `rpicam-vid` backed camera and
//! against the test doubles.

pub mod annotation;
pub mod cli;
pub mod clock;
pub mod config;
pub mod device;
pub mod rpicam;
pub mod session;
pub mod traits;

#[cfg(test)]
pub mod mock;

pub use annotation::Annotation;
pub use cli::Cli;
pub use clock::{Clock, SystemClock};
pub use config::{ConfigError, Intervals, RecordTime, SessionConfig};
pub use rpicam::RpicamCamera;
pub use session::{Session, SessionError, Summary};
pub use traits::{CameraDevice, CameraError, CameraSettings, Color, Overlay, Resolution};
