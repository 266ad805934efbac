//! Mock camera and clock for testing without hardware.

use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use chrono::{DateTime, Local, TimeDelta};

use crate::annotation::Annotation;
use crate::clock::Clock;
use crate::traits::{CameraDevice, CameraError, CameraSettings, Result};

/// A call made on [`MockCamera`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraCall {
    /// `configure`
    Configure(CameraSettings),
    /// `start_preview`
    StartPreview,
    /// `stop_preview`
    StopPreview,
    /// `start_recording`
    StartRecording(PathBuf),
    /// `stop_recording`
    StopRecording,
    /// `set_annotation`, rendered
    Annotate(String),
    /// `wait_recording`
    WaitRecording(Duration),
}

/// Simulated wall-clock time shared between test doubles.
#[derive(Debug, Clone)]
pub struct SimulatedTime(Rc<Cell<DateTime<Local>>>);

impl SimulatedTime {
    /// Start at `now`.
    #[must_use]
    pub fn new(now: DateTime<Local>) -> Self {
        Self(Rc::new(Cell::new(now)))
    }

    /// Current simulated time.
    pub fn now(&self) -> DateTime<Local> {
        self.0.get()
    }

    /// Move time forward by `duration`.
    pub fn advance(&self, duration: Duration) {
        let step = TimeDelta::from_std(duration).unwrap_or(TimeDelta::MAX);
        self.0.set(self.0.get() + step);
    }
}

/// Mock camera that records every call.
#[derive(Debug, Default)]
pub struct MockCamera {
    calls: Vec<CameraCall>,
    recordings_allowed: Option<usize>,
    recording: bool,
    time: Option<SimulatedTime>,
}

impl MockCamera {
    /// Create a mock that accepts everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail `start_recording` once `count` recordings have been started.
    #[must_use]
    pub const fn fail_recording_after(mut self, count: usize) -> Self {
        self.recordings_allowed = Some(count);
        self
    }

    /// Let `wait_recording` advance `time`.
    #[must_use]
    pub fn sharing_time(mut self, time: SimulatedTime) -> Self {
        self.time = Some(time);
        self
    }

    /// All calls in order.
    pub fn calls(&self) -> &[CameraCall] {
        &self.calls
    }

    /// Paths passed to `start_recording`, in order.
    pub fn recordings(&self) -> Vec<PathBuf> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                CameraCall::StartRecording(path) => Some(path.clone()),
                _ => None,
            })
            .collect()
    }

    /// Rendered annotations, in order.
    pub fn annotations(&self) -> Vec<String> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                CameraCall::Annotate(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    /// Number of calls matching `predicate`.
    pub fn count<F>(&self, predicate: F) -> usize
    where
        F: Fn(&CameraCall) -> bool,
    {
        self.calls.iter().filter(|call| predicate(call)).count()
    }
}

impl CameraDevice for MockCamera {
    fn configure(&mut self, settings: &CameraSettings) -> Result<()> {
        self.calls.push(CameraCall::Configure(settings.clone()));
        Ok(())
    }

    fn start_preview(&mut self) -> Result<()> {
        self.calls.push(CameraCall::StartPreview);
        Ok(())
    }

    fn stop_preview(&mut self) -> Result<()> {
        self.calls.push(CameraCall::StopPreview);
        Ok(())
    }

    fn start_recording(&mut self, path: &Path) -> Result<()> {
        if self.recording {
            return Err(CameraError::AlreadyRecording);
        }
        if self
            .recordings_allowed
            .is_some_and(|allowed| self.recordings().len() >= allowed)
        {
            return Err(CameraError::OutputUnavailable {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "mock failure"),
            });
        }
        self.calls.push(CameraCall::StartRecording(path.to_path_buf()));
        self.recording = true;
        Ok(())
    }

    fn stop_recording(&mut self) -> Result<()> {
        if !self.recording {
            return Err(CameraError::NotRecording);
        }
        self.calls.push(CameraCall::StopRecording);
        self.recording = false;
        Ok(())
    }

    fn set_annotation(&mut self, annotation: &Annotation) -> Result<()> {
        self.calls.push(CameraCall::Annotate(annotation.to_string()));
        Ok(())
    }

    fn wait_recording(&mut self, duration: Duration) -> Result<()> {
        if !self.recording {
            return Err(CameraError::NotRecording);
        }
        self.calls.push(CameraCall::WaitRecording(duration));
        if let Some(time) = &self.time {
            time.advance(duration);
        }
        Ok(())
    }
}

/// Clock whose time only moves when something waits on it.
///
/// Sleeping advances it; so does `wait_recording` on a [`MockCamera`]
/// built with [`MockCamera::sharing_time`] and [`FakeClock::time`].
#[derive(Debug, Clone)]
pub struct FakeClock {
    time: SimulatedTime,
    sleeps: Vec<Duration>,
}

impl FakeClock {
    /// Start the clock at `now`.
    #[must_use]
    pub fn starting_at(now: DateTime<Local>) -> Self {
        Self {
            time: SimulatedTime::new(now),
            sleeps: Vec::new(),
        }
    }

    /// Handle to this clock's time, for sharing with a [`MockCamera`].
    pub fn time(&self) -> SimulatedTime {
        self.time.clone()
    }

    /// Durations passed to `sleep`, in order.
    pub fn sleeps(&self) -> &[Duration] {
        &self.sleeps
    }
}

impl Clock for FakeClock {
    fn now(&self) -> DateTime<Local> {
        self.time.now()
    }

    fn sleep(&mut self, duration: Duration) {
        self.sleeps.push(duration);
        self.time.advance(duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_camera_records_calls() {
        let mut camera = MockCamera::new();
        camera.start_preview().expect("preview");
        camera
            .start_recording(Path::new("a.h264"))
            .expect("recording");
        camera
            .wait_recording(Duration::from_millis(200))
            .expect("wait");
        camera.stop_recording().expect("stop");

        assert_eq!(
            camera.calls(),
            [
                CameraCall::StartPreview,
                CameraCall::StartRecording(PathBuf::from("a.h264")),
                CameraCall::WaitRecording(Duration::from_millis(200)),
                CameraCall::StopRecording,
            ]
        );
    }

    #[test]
    fn test_mock_camera_rejects_double_start() {
        let mut camera = MockCamera::new();
        camera
            .start_recording(Path::new("a.h264"))
            .expect("recording");
        assert!(matches!(
            camera.start_recording(Path::new("b.h264")),
            Err(CameraError::AlreadyRecording)
        ));
    }

    #[test]
    fn test_mock_camera_fails_after_limit() {
        let mut camera = MockCamera::new().fail_recording_after(1);
        camera
            .start_recording(Path::new("a.h264"))
            .expect("first recording");
        camera.stop_recording().expect("stop");
        assert!(camera.start_recording(Path::new("b.h264")).is_err());
        assert_eq!(camera.recordings(), [PathBuf::from("a.h264")]);
    }

    #[test]
    fn test_fake_clock_advances_on_sleep() {
        let start = Local::now();
        let mut clock = FakeClock::starting_at(start);
        clock.sleep(Duration::from_secs(2));
        assert_eq!(clock.now() - start, TimeDelta::seconds(2));
        assert_eq!(clock.sleeps(), [Duration::from_secs(2)]);
    }

    #[test]
    fn test_wait_recording_advances_shared_clock() {
        let start = Local::now();
        let clock = FakeClock::starting_at(start);
        let mut camera = MockCamera::new().sharing_time(clock.time());

        camera
            .start_recording(Path::new("a.h264"))
            .expect("recording");
        camera
            .wait_recording(Duration::from_millis(200))
            .expect("wait");
        camera
            .wait_recording(Duration::from_millis(200))
            .expect("wait");

        assert_eq!(clock.now() - start, TimeDelta::milliseconds(400));
        assert!(clock.sleeps().is_empty());
    }
}
