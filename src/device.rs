//! V4L2 sensor lookup using the v4l crate.
//!
//! The camera pipeline itself is driven by [`crate::rpicam`]; this only checks
//! that a capture node exists before anything is started.

use v4l::capability::Flags;
use v4l::Device;

use crate::traits::{CameraError, Result};

/// Capabilities reported by a V4L2 capture node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SensorInfo {
    /// V4L2 device index (`/dev/video<index>`).
    pub index: u32,
    /// Driver name, e.g. `unicam` or `rp1-cfe`.
    pub driver: String,
    /// Card/device name.
    pub card: String,
    /// Bus information.
    pub bus_info: String,
    /// Whether the device can capture video.
    pub can_capture: bool,
    /// Whether the device supports streaming.
    pub can_stream: bool,
}

impl SensorInfo {
    /// Check that the node is usable as a camera source.
    pub fn ensure_capture(self) -> Result<Self> {
        if self.can_capture {
            Ok(self)
        } else {
            Err(CameraError::DeviceNotFound(self.index))
        }
    }
}

/// Open `/dev/video<index>` and read its capabilities.
pub fn query_sensor(index: u32) -> Result<SensorInfo> {
    let device = Device::new(index as usize).map_err(|err| {
        if err.kind() == std::io::ErrorKind::NotFound {
            CameraError::DeviceNotFound(index)
        } else {
            CameraError::DeviceOpenFailed(err.to_string())
        }
    })?;

    let caps = device
        .query_caps()
        .map_err(|err| CameraError::DeviceOpenFailed(err.to_string()))?;

    let info = SensorInfo {
        index,
        driver: caps.driver,
        card: caps.card,
        bus_info: caps.bus,
        can_capture: caps.capabilities.contains(Flags::VIDEO_CAPTURE),
        can_stream: caps.capabilities.contains(Flags::STREAMING),
    };

    log::info!(
        "Camera node /dev/video{}: {} ({}, {})",
        info.index,
        info.card,
        info.driver,
        info.bus_info
    );

    info.ensure_capture()
}
