//! The session runner: delay, camera setup, and the interval/tick loops.

use std::path::PathBuf;
use std::time::Duration;

use crate::annotation::Annotation;
use crate::clock::Clock;
use crate::config::SessionConfig;
use crate::traits::{CameraDevice, CameraError};

/// Length of one tick of the inner loop.
pub const TICK: Duration = Duration::from_millis(200);

/// Ticks counted as one second of record time.
pub const TICKS_PER_SECOND: u64 = 5;

/// Fatal session failures.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// A recording could not be started.
    #[error(
        "Could not capture to file {}, please make sure the file path exists \
         (folders must exist, the output file is created automatically): {source}",
        path.display()
    )]
    Recording {
        /// File the recording was meant for.
        path: PathBuf,
        /// Reason reported by the camera.
        source: CameraError,
    },
    /// Any other camera failure.
    #[error("Camera error: {0}")]
    Camera(#[from] CameraError),
}

/// What a session has done so far. Fixed size however long the session runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    /// Intervals run to completion.
    pub intervals: u32,
    /// Ticks run across all intervals.
    pub ticks: u64,
    /// Recordings run to completion.
    pub files_recorded: u32,
    /// Most recently completed recording.
    pub last_file: Option<PathBuf>,
}

/// Runs one preview/record session against a camera.
pub struct Session<C, K> {
    config: SessionConfig,
    camera: C,
    clock: K,
    summary: Summary,
}

impl<C: CameraDevice, K: Clock> Session<C, K> {
    /// Create a session. The camera is not touched until [`Session::run`].
    pub fn new(config: SessionConfig, camera: C, clock: K) -> Self {
        Self {
            config,
            camera,
            clock,
            summary: Summary::default(),
        }
    }

    /// Run until the interval budget is used up.
    ///
    /// With an unbounded interval budget this only returns on error.
    pub fn run(&mut self) -> Result<Summary, SessionError> {
        if let Some(delay) = self.config.delay {
            log::info!("Waiting {}s before starting", delay.as_secs());
            self.clock.sleep(delay);
        }

        self.camera.configure(&self.config.camera_settings())?;
        log::info!(
            "Camera configured: {} @ {}fps, label '{}'",
            self.config.resolution,
            self.config.framerate,
            self.config.label
        );

        if self.config.preview {
            self.camera.start_preview()?;
        }

        self.summary = Summary::default();
        let mut index: u32 = 0;

        loop {
            if self.config.intervals.is_exhausted(index) {
                if self.config.preview {
                    self.camera.stop_preview()?;
                }
                println!("Finished... exiting");
                return Ok(self.summary.clone());
            }

            let output = self.config.output_for_interval(index);
            if let Some(path) = &output {
                log::debug!("Interval {index} recording to {}", path.display());
                if let Err(source) = self.camera.start_recording(path) {
                    return Err(SessionError::Recording {
                        path: path.clone(),
                        source,
                    });
                }
            }

            self.summary.ticks += self.run_interval(output.is_some())?;
            self.summary.intervals += 1;
            if output.is_some() {
                self.summary.files_recorded = self.summary.files_recorded.saturating_add(1);
                self.summary.last_file = output;
            }

            if self.config.intervals.reports_progress() {
                println!("Finished Interval #{index}");
            }

            index = index.saturating_add(1);
        }
    }

    /// Tick until the record time is used up. Returns the ticks run.
    fn run_interval(&mut self, recording: bool) -> Result<u64, SessionError> {
        let limit = self.config.record_time.ticks(TICKS_PER_SECOND);
        let mut tick: u64 = 0;

        loop {
            if limit.is_some_and(|limit| tick >= limit) {
                if recording {
                    self.camera.stop_recording()?;
                }
                return Ok(tick);
            }

            let annotation = Annotation::new(&self.config.label, self.clock.now());
            self.camera.set_annotation(&annotation)?;

            if recording {
                self.camera.wait_recording(TICK)?;
            } else {
                self.clock.sleep(TICK);
            }

            tick += 1;
        }
    }

    /// The camera, for inspection after a run.
    pub const fn camera(&self) -> &C {
        &self.camera
    }

    /// Progress so far, also after a failed run.
    pub const fn summary(&self) -> &Summary {
        &self.summary
    }

    /// The clock, for inspection after a run.
    pub const fn clock(&self) -> &K {
        &self.clock
    }
}
