//! Recognition capability used by the attendance scan.
//!
//! # Responsibility
//! - Define the seam a real face-recognition engine plugs into.
//! - Ship [`SimulatedRecognizer`], an explicitly labeled stub.
//!
//! # Invariants
//! - A recognizer only identifies a student; marking attendance stays in the
//!   attendance service.
//! - An empty candidate list is a recognition failure, not a system error.

use crate::model::attendance::AttendanceEntry;
use crate::model::student::{Student, StudentId};
use std::error::Error;
use std::fmt::{Display, Formatter};

mod simulated;

pub use simulated::SimulatedRecognizer;

/// Why a capture did not identify a student.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotRecognized {
    /// No enrolled students to match against.
    NoCandidates,
    /// A capture happened but matched nobody.
    NoMatch,
    /// The capture device or engine could not run.
    Unavailable(String),
}

impl Display for NotRecognized {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoCandidates => write!(f, "no enrolled students to recognize"),
            Self::NoMatch => write!(f, "face not recognized"),
            Self::Unavailable(reason) => write!(f, "recognizer unavailable: {reason}"),
        }
    }
}

impl Error for NotRecognized {}

/// Identifies which candidate is in front of the camera.
pub trait Recognizer {
    /// Stable short id used in log events.
    fn name(&self) -> &'static str;

    /// Runs one capture against `candidates`, which is never empty.
    fn capture(&mut self, candidates: &[Student]) -> Result<StudentId, NotRecognized>;
}

impl<R: Recognizer + ?Sized> Recognizer for Box<R> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn capture(&mut self, candidates: &[Student]) -> Result<StudentId, NotRecognized> {
        (**self).capture(candidates)
    }
}

/// Result of one scan attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// A student was recognized and marked present.
    Marked(AttendanceEntry),
    NotRecognized(NotRecognized),
}

impl ScanOutcome {
    pub fn is_marked(&self) -> bool {
        matches!(self, Self::Marked(_))
    }
}
