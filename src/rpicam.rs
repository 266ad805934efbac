//! Camera implementation driving `rpicam-vid` as a child process.
//!
//! The encoder renders the overlay itself through its `annotate_cv`
//! post-processing stage, expanding the clock escapes on every frame.

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::time::Duration;

use tempfile::NamedTempFile;

use crate::annotation::Annotation;
use crate::device;
use crate::traits::{CameraDevice, CameraError, CameraSettings, Color, Overlay, Result};

/// Default camera program on Raspberry Pi OS.
pub const DEFAULT_PROGRAM: &str = "rpicam-vid";

/// Overlay text size that maps to an OpenCV font scale of 1.0.
const BASE_TEXT_SIZE: f64 = 32.0;

/// What the running child process is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Preview,
    Recording,
}

/// `rpicam-vid` backed camera.
pub struct RpicamCamera {
    program: String,
    device_index: u32,
    settings: Option<CameraSettings>,
    post_process_file: Option<NamedTempFile>,
    preview: bool,
    child: Option<(Mode, Child)>,
    annotation: Option<Annotation>,
}

impl RpicamCamera {
    /// Create a camera that will run `program` and query `/dev/video<device_index>`.
    ///
    /// Nothing is touched until [`CameraDevice::configure`].
    #[must_use]
    pub fn new(program: &str, device_index: u32) -> Self {
        Self {
            program: program.to_owned(),
            device_index,
            settings: None,
            post_process_file: None,
            preview: false,
            child: None,
            annotation: None,
        }
    }

    /// Last annotation handed to the camera.
    pub const fn annotation(&self) -> Option<&Annotation> {
        self.annotation.as_ref()
    }

    fn base_args(&self) -> Result<Vec<String>> {
        let settings = self.settings.as_ref().ok_or(CameraError::NotConfigured)?;

        let mut args = vec![
            "-t".to_owned(),
            "0".to_owned(), // Run until stopped
            "--width".to_owned(),
            settings.resolution.width.to_string(),
            "--height".to_owned(),
            settings.resolution.height.to_string(),
            "--framerate".to_owned(),
            settings.framerate.to_string(),
        ];

        if let Some(file) = &self.post_process_file {
            args.push("--post-process-file".to_owned());
            args.push(file.path().display().to_string());
        }

        Ok(args)
    }

    fn spawn(&mut self, mode: Mode, args: &[String]) -> Result<()> {
        log::debug!("{} args: {:?}", self.program, args);

        let child = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| CameraError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        self.child = Some((mode, child));
        Ok(())
    }

    fn spawn_preview(&mut self) -> Result<()> {
        let args = self.base_args()?;
        self.spawn(Mode::Preview, &args)
    }

    fn terminate(&mut self) -> Result<()> {
        if let Some((mode, mut child)) = self.child.take() {
            // Already-exited children still need reaping.
            if let Err(err) = child.kill() {
                log::debug!("{} ({mode:?}) already gone: {err}", self.program);
            }
            let status = child.wait()?;
            log::debug!("{} ({mode:?}) stopped: {status}", self.program);
        }
        Ok(())
    }

    fn recording_child(&mut self) -> Result<&mut Child> {
        match &mut self.child {
            Some((Mode::Recording, child)) => Ok(child),
            _ => Err(CameraError::NotRecording),
        }
    }
}

/// `annotate_cv` stage configuration for an overlay.
pub fn post_process_config(overlay: &Overlay) -> serde_json::Value {
    serde_json::json!({
        "annotate_cv": {
            "text": Annotation::template(&overlay.label),
            "fg": Color::WHITE.0,
            "bg": overlay.background.0,
            "scale": f64::from(overlay.text_size) / BASE_TEXT_SIZE,
            "thickness": 2,
            "alpha": 1.0,
        }
    })
}

/// Write the `annotate_cv` configuration to a fresh, uniquely named temp file.
///
/// The file is removed when the handle is dropped.
pub fn write_post_process_file(overlay: &Overlay) -> Result<NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .prefix("time-cam-")
        .suffix(".json")
        .tempfile()?;
    file.write_all(post_process_config(overlay).to_string().as_bytes())?;
    file.flush()?;
    Ok(file)
}

impl CameraDevice for RpicamCamera {
    fn configure(&mut self, settings: &CameraSettings) -> Result<()> {
        let sensor = device::query_sensor(self.device_index)?;
        log::debug!("Using sensor {sensor:?}");

        self.post_process_file = Some(write_post_process_file(&settings.overlay)?);
        self.settings = Some(settings.clone());
        Ok(())
    }

    fn start_preview(&mut self) -> Result<()> {
        self.preview = true;
        if self.child.is_none() {
            self.spawn_preview()?;
        }
        Ok(())
    }

    fn stop_preview(&mut self) -> Result<()> {
        self.preview = false;
        if matches!(self.child, Some((Mode::Preview, _))) {
            self.terminate()?;
        }
        Ok(())
    }

    fn start_recording(&mut self, path: &Path) -> Result<()> {
        if matches!(self.child, Some((Mode::Recording, _))) {
            return Err(CameraError::AlreadyRecording);
        }

        let mut args = self.base_args()?;

        File::create(path).map_err(|source| CameraError::OutputUnavailable {
            path: path.to_path_buf(),
            source,
        })?;

        // Only one process can own the sensor.
        self.terminate()?;

        if !self.preview {
            args.push("-n".to_owned());
        }
        args.extend([
            "--codec".to_owned(),
            "h264".to_owned(),
            "--flush".to_owned(),
            "-o".to_owned(),
            path.display().to_string(),
        ]);

        log::info!("Recording to {}", path.display());
        self.spawn(Mode::Recording, &args)
    }

    fn stop_recording(&mut self) -> Result<()> {
        self.recording_child()?;
        self.terminate()?;
        log::info!("Recording stopped");

        if self.preview {
            self.spawn_preview()?;
        }
        Ok(())
    }

    fn set_annotation(&mut self, annotation: &Annotation) -> Result<()> {
        log::trace!("Annotation: {annotation}");
        self.annotation = Some(annotation.clone());
        Ok(())
    }

    fn wait_recording(&mut self, duration: Duration) -> Result<()> {
        std::thread::sleep(duration);

        if let Some(status) = self.recording_child()?.try_wait()? {
            self.child = None;
            return Err(CameraError::ProcessExited { status });
        }
        Ok(())
    }
}

impl Drop for RpicamCamera {
    fn drop(&mut self) {
        if let Err(err) = self.terminate() {
            log::warn!("Failed to stop {}: {err}", self.program);
        }
    }
}
