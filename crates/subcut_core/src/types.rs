use crate::error::{CoreError, Result};
use crate::timecode::timestamp_to_seconds;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Cue
// ---------------------------------------------------------------------------

/// One timed subtitle entry.
///
/// `start`/`end` hold the canonical `HH:MM:SS.mmm` strings; `start_time` and
/// `end_time` are the seconds derived from them at construction. The pairs are
/// never updated independently, so formatting the seconds back through the
/// timecode module reproduces the strings.
#[derive(Debug, Clone, PartialEq)]
pub struct Cue {
    pub id: Uuid,
    pub start: String,
    pub end: String,
    pub start_time: f64,
    pub end_time: f64,
    pub text: String,
    /// Caller-side content flag. The engine stores and forwards it but never
    /// computes it; cues built by the engine start out with `true`.
    pub check: bool,
}

impl Cue {
    /// Build a cue from formatted timestamps. Fails when either timestamp is
    /// malformed or when `end <= start`.
    pub fn new(start: impl Into<String>, end: impl Into<String>, text: impl Into<String>) -> Result<Self> {
        let start = start.into();
        let end = end.into();
        let start_time = timestamp_to_seconds(&start)?;
        let end_time = timestamp_to_seconds(&end)?;
        if end_time <= start_time {
            return Err(CoreError::InvalidTimeRange { start, end });
        }
        Ok(Self {
            id: Uuid::new_v4(),
            start,
            end,
            start_time,
            end_time,
            text: text.into(),
            check: true,
        })
    }

    /// New cue with the patched fields replaced and the derived seconds
    /// recomputed. Keeps the cue id, so the replacement still resolves to the
    /// same track position. Same range rule as [`Cue::new`].
    pub fn with_patch(&self, patch: &CuePatch) -> Result<Self> {
        let start = patch.start.clone().unwrap_or_else(|| self.start.clone());
        let end = patch.end.clone().unwrap_or_else(|| self.end.clone());
        let start_time = timestamp_to_seconds(&start)?;
        let end_time = timestamp_to_seconds(&end)?;
        if end_time <= start_time {
            return Err(CoreError::InvalidTimeRange { start, end });
        }
        Ok(Self {
            id: self.id,
            start,
            end,
            start_time,
            end_time,
            text: patch.text.clone().unwrap_or_else(|| self.text.clone()),
            check: patch.check.unwrap_or(self.check),
        })
    }

    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }
}

// ---------------------------------------------------------------------------
// CuePatch
// ---------------------------------------------------------------------------

/// Partial cue update; `None` fields keep their current value.
#[derive(Debug, Clone, Default)]
pub struct CuePatch {
    pub start: Option<String>,
    pub end: Option<String>,
    pub text: Option<String>,
    pub check: Option<bool>,
}

// ---------------------------------------------------------------------------
// CueRecord
// ---------------------------------------------------------------------------

/// Persisted form of a cue: formatted timestamps, no derived fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CueRecord {
    pub start: String,
    pub end: String,
    pub text: String,
}

// ---------------------------------------------------------------------------
// Track
// ---------------------------------------------------------------------------

/// Ordered sequence of cues for one editing session.
///
/// Order is expected to follow non-decreasing start time, but the engine does
/// not re-sort after edits; positional correctness of `insert` is the caller's
/// responsibility.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Track {
    pub cues: Vec<Cue>,
}

impl Track {
    pub fn new(cues: Vec<Cue>) -> Self {
        Self { cues }
    }

    /// Build a track from persisted records. Any malformed record fails the
    /// whole load; the caller decides what to fall back to.
    pub fn from_records(records: &[CueRecord]) -> Result<Self> {
        let cues = records
            .iter()
            .map(|r| Cue::new(r.start.clone(), r.end.clone(), r.text.clone()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { cues })
    }

    /// Flatten into the persisted record form.
    pub fn to_records(&self) -> Vec<CueRecord> {
        self.cues
            .iter()
            .map(|c| CueRecord {
                start: c.start.clone(),
                end: c.end.clone(),
                text: c.text.clone(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Cue> {
        self.cues.get(index)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
