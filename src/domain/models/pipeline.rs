//! Pipeline run state and reporting.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Snapshot of pipeline progress, emitted after each completed round so
/// long runs are observable mid-flight.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PipelineProgress {
    /// Candidates counted at run start.
    pub total_candidates: u64,
    /// Records embedded and durably committed so far.
    pub embedded: u64,
    /// Records whose sub-batch failed after retries.
    pub failed: u64,
}

impl PipelineProgress {
    pub fn remaining(&self) -> u64 {
        self.total_candidates
            .saturating_sub(self.embedded)
            .saturating_sub(self.failed)
    }
}

/// Final report of one pipeline invocation.
///
/// A deadline expiry is an expected termination condition, not a failure:
/// the run reports partial completion and every unembedded record remains
/// selectable by the next invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineReport {
    pub total_candidates: u64,
    pub embedded: u64,
    pub failed: u64,
    /// Records skipped because the deadline expired before their
    /// sub-batch was dispatched.
    pub skipped: u64,
    pub deadline_hit: bool,
    #[serde(with = "duration_secs")]
    pub elapsed: Duration,
}

impl PipelineReport {
    pub fn remaining(&self) -> u64 {
        self.total_candidates
            .saturating_sub(self.embedded)
            .saturating_sub(self.failed)
    }

    /// True when every candidate counted at start was embedded.
    pub fn complete(&self) -> bool {
        self.embedded == self.total_candidates
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(d)?;
        Ok(Duration::from_secs_f64(secs))
    }
}
