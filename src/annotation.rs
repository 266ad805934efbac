//! Timestamp annotation shown on the preview and burned into recordings.

use std::fmt;

use chrono::{DateTime, Local};

/// `strftime` layout of the date and time part of the overlay.
pub const TIMESTAMP_FORMAT: &str = "%m/%d/%Y | %H:%M:%S";

/// Label plus the wall-clock time it was taken at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    label: String,
    time: DateTime<Local>,
}

impl Annotation {
    /// Create an annotation for `label` at `time`.
    #[must_use]
    pub fn new(label: &str, time: DateTime<Local>) -> Self {
        Self {
            label: label.to_owned(),
            time,
        }
    }

    /// The user supplied label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The time stamped into the overlay.
    pub const fn time(&self) -> DateTime<Local> {
        self.time
    }

    /// Overlay text with the clock left as `strftime` escapes.
    ///
    /// Encoders that render the time per frame take this instead of the
    /// rendered text. Any `%` in the label is doubled.
    #[must_use]
    pub fn template(label: &str) -> String {
        format!("{} | {TIMESTAMP_FORMAT}", label.replace('%', "%%"))
    }
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | {}", self.label, self.time.format(TIMESTAMP_FORMAT))
    }
}
