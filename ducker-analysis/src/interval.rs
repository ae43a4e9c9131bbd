//! Silence interval data types

/// A closed time range in seconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeInterval {
    /// Start of the range in seconds
    pub start_secs: f64,
    /// End of the range in seconds
    pub end_secs: f64,
}

impl TimeInterval {
    /// Create a new interval
    pub fn new(start_secs: f64, end_secs: f64) -> Self {
        Self {
            start_secs,
            end_secs,
        }
    }

    /// Length of the interval in seconds (zero if inverted)
    pub fn duration_secs(&self) -> f64 {
        (self.end_secs - self.start_secs).max(0.0)
    }
}

/// A silence range as reported by a detector
///
/// The end is `None` when the detector reached the end of the stream while
/// still silent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SilenceInterval {
    /// Time at which silence began, in seconds
    pub start_secs: f64,
    /// Time at which sound resumed, if it did
    pub end_secs: Option<f64>,
}

impl SilenceInterval {
    /// Create a terminated silence interval
    pub fn new(start_secs: f64, end_secs: f64) -> Self {
        Self {
            start_secs,
            end_secs: Some(end_secs),
        }
    }

    /// Create a silence interval that runs to the end of the stream
    pub fn open(start_secs: f64) -> Self {
        Self {
            start_secs,
            end_secs: None,
        }
    }

    /// Check if the interval never terminated
    pub fn is_open(&self) -> bool {
        self.end_secs.is_none()
    }

    /// Close the interval, using `total_secs` for an unterminated end
    pub fn close(&self, total_secs: f64) -> TimeInterval {
        TimeInterval::new(self.start_secs, self.end_secs.unwrap_or(total_secs))
    }
}
