//! Stand-in recognizer: waits, then succeeds at random.
//!
//! This is not a recognition engine. It exists so the scan workflow can run
//! end to end until a real capability is plugged in.

use super::{NotRecognized, Recognizer};
use crate::config::ScanSettings;
use crate::model::student::{Student, StudentId};
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::thread;
use std::time::Duration;

/// Simulated scan: fixed delay, fixed success probability, arbitrary pick.
pub struct SimulatedRecognizer<R: Rng = StdRng> {
    delay: Duration,
    success_rate: f64,
    rng: R,
}

impl SimulatedRecognizer<StdRng> {
    pub fn new(settings: &ScanSettings) -> Self {
        Self::with_rng(settings, StdRng::from_os_rng())
    }

    /// Deterministic variant for reproducible runs.
    pub fn seeded(settings: &ScanSettings, seed: u64) -> Self {
        Self::with_rng(settings, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> SimulatedRecognizer<R> {
    pub fn with_rng(settings: &ScanSettings, rng: R) -> Self {
        let success_rate = if settings.success_rate.is_finite() {
            settings.success_rate.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            delay: settings.delay,
            success_rate,
            rng,
        }
    }

    pub fn success_rate(&self) -> f64 {
        self.success_rate
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl<R: Rng> Recognizer for SimulatedRecognizer<R> {
    fn name(&self) -> &'static str {
        "simulated"
    }

    fn capture(&mut self, candidates: &[Student]) -> Result<StudentId, NotRecognized> {
        if candidates.is_empty() {
            return Err(NotRecognized::NoCandidates);
        }
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }

        if !self.rng.random_bool(self.success_rate) {
            debug!("event=scan_capture module=recognition recognizer=simulated status=no_match");
            return Err(NotRecognized::NoMatch);
        }

        let picked = &candidates[self.rng.random_range(0..candidates.len())];
        Ok(picked.id)
    }
}

#[cfg(test)]
mod tests {
    use super::SimulatedRecognizer;
    use crate::config::ScanSettings;
    use crate::model::student::Student;
    use crate::recognition::{NotRecognized, Recognizer};
    use std::time::Duration;
    use uuid::Uuid;

    fn settings(success_rate: f64) -> ScanSettings {
        ScanSettings {
            delay: Duration::ZERO,
            success_rate,
        }
    }

    fn student(name: &str) -> Student {
        Student {
            id: Uuid::new_v4(),
            name: name.to_string(),
            student_code: format!("CS-{name}"),
            email: None,
            department: "Computer Science".to_string(),
            year: "1st Year".to_string(),
            avatar_url: None,
            created_at: 0,
        }
    }

    #[test]
    fn certain_success_picks_a_candidate() {
        let candidates = vec![student("Emma"), student("John")];
        let mut recognizer = SimulatedRecognizer::seeded(&settings(1.0), 7);
        for _ in 0..20 {
            let id = recognizer.capture(&candidates).unwrap();
            assert!(candidates.iter().any(|candidate| candidate.id == id));
        }
    }

    #[test]
    fn zero_rate_never_matches() {
        let candidates = vec![student("Emma")];
        let mut recognizer = SimulatedRecognizer::seeded(&settings(0.0), 7);
        assert_eq!(
            recognizer.capture(&candidates).unwrap_err(),
            NotRecognized::NoMatch
        );
    }

    #[test]
    fn empty_candidates_fail_without_drawing() {
        let mut recognizer = SimulatedRecognizer::seeded(&settings(1.0), 7);
        assert_eq!(
            recognizer.capture(&[]).unwrap_err(),
            NotRecognized::NoCandidates
        );
    }

    #[test]
    fn out_of_range_rates_are_clamped() {
        assert_eq!(SimulatedRecognizer::seeded(&settings(4.0), 1).success_rate(), 1.0);
        assert_eq!(
            SimulatedRecognizer::seeded(&settings(f64::NAN), 1).success_rate(),
            0.0
        );
    }

    #[test]
    fn default_rate_succeeds_most_of_the_time() {
        let candidates = vec![student("Emma")];
        let mut recognizer = SimulatedRecognizer::seeded(&settings(0.8), 42);
        let hits = (0..1000)
            .filter(|_| recognizer.capture(&candidates).is_ok())
            .count();
        assert!((700..=900).contains(&hits), "hits={hits}");
    }
}
