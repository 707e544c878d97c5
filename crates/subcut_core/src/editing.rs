use crate::error::{CoreError, Result};
use crate::timecode::{round_to_ms, seconds_to_timestamp};
use crate::types::{Cue, CuePatch, Track};
use crate::validate::MIN_CUE_DURATION;
use tracing::debug;
use uuid::Uuid;

/// Track mutations and queries.
///
/// Every mutation is a pure transformation: it returns a new track on success
/// and `None` when the operation is a no-op (stale cue id, empty split half,
/// rejected replacement, ...). The receiver is never modified, so a playback
/// query running against the old value always sees a self-consistent track.
impl Track {
    /// Resolve a cue's current position by id.
    pub fn index_of(&self, cue_id: Uuid) -> Option<usize> {
        self.cues.iter().position(|c| c.id == cue_id)
    }

    /// Insert `cue` at `index`, shifting later cues right. The index is
    /// clamped to the track length. Ordering is not re-validated; the caller
    /// owns positional correctness.
    pub fn insert(&self, index: usize, cue: Cue) -> Track {
        let index = index.min(self.cues.len());
        let mut cues = self.cues.clone();
        cues.insert(index, cue);
        debug!(index, cue_count = cues.len(), "cue inserted");
        Track { cues }
    }

    /// Delete the cue with the given id; `None` when it is not in the track.
    pub fn remove(&self, cue_id: Uuid) -> Option<Track> {
        let index = self.index_of(cue_id)?;
        let mut cues = self.cues.clone();
        cues.remove(index);
        debug!(index, cue_count = cues.len(), "cue removed");
        Some(Track { cues })
    }

    /// Replace the cue with a patched copy.
    ///
    /// The replacement is built via [`Cue::with_patch`] and applied only when
    /// its own `check` flag is still set; a replacement the content policy has
    /// flagged is silently dropped. A patch producing an inverted time range
    /// is likewise a no-op. Malformed timestamps in the patch are a caller
    /// input error and propagate.
    pub fn update(&self, cue_id: Uuid, patch: &CuePatch) -> Result<Option<Track>> {
        let Some(index) = self.index_of(cue_id) else {
            return Ok(None);
        };
        let replacement = match self.cues[index].with_patch(patch) {
            Ok(cue) => cue,
            Err(CoreError::InvalidTimeRange { .. }) => return Ok(None),
            Err(e) => return Err(e),
        };
        if !replacement.check {
            debug!(index, "update rejected: content flag cleared");
            return Ok(None);
        }
        let mut cues = self.cues.clone();
        cues[index] = replacement;
        debug!(index, "cue updated");
        Ok(Some(Track { cues }))
    }

    /// Merge the cue with its successor into one cue spanning both, the texts
    /// trimmed and joined with a line break. No successor means no-op, as does
    /// a pair whose combined range is inverted (possible on an out-of-order
    /// track).
    pub fn merge(&self, cue_id: Uuid) -> Result<Option<Track>> {
        let Some(index) = self.index_of(cue_id) else {
            return Ok(None);
        };
        let Some(next) = self.cues.get(index + 1) else {
            return Ok(None);
        };
        let cue = &self.cues[index];

        let text = format!("{}\n{}", cue.text.trim(), next.text.trim());
        let merged = match Cue::new(cue.start.clone(), next.end.clone(), text) {
            Ok(cue) => cue,
            Err(CoreError::InvalidTimeRange { .. }) => return Ok(None),
            Err(e) => return Err(e),
        };

        let mut cues = self.cues.clone();
        cues[index] = merged;
        cues.remove(index + 1);
        debug!(index, cue_count = cues.len(), "cues merged");
        Ok(Some(Track { cues }))
    }

    /// Split the cue at a character offset into two cues, dividing the time
    /// span proportionally to the text lengths (rounded to the millisecond).
    ///
    /// No-op when the cue has no text, the offset is zero or past the end,
    /// either trimmed half is empty, or either half would fall under the
    /// minimum cue duration.
    pub fn split(&self, cue_id: Uuid, char_offset: usize) -> Result<Option<Track>> {
        let Some(index) = self.index_of(cue_id) else {
            return Ok(None);
        };
        let cue = &self.cues[index];
        if cue.text.is_empty() || char_offset == 0 {
            return Ok(None);
        }

        let char_len = cue.text.chars().count();
        if char_offset >= char_len {
            return Ok(None);
        }
        let byte_offset = cue
            .text
            .char_indices()
            .nth(char_offset)
            .map(|(i, _)| i)
            .unwrap_or(cue.text.len());
        let text1 = cue.text[..byte_offset].trim();
        let text2 = cue.text[byte_offset..].trim();
        if text1.is_empty() || text2.is_empty() {
            return Ok(None);
        }

        let split_duration = round_to_ms(cue.duration() * (char_offset as f64 / char_len as f64));
        if split_duration < MIN_CUE_DURATION || cue.duration() - split_duration < MIN_CUE_DURATION {
            debug!(index, split_duration, "split rejected: half under minimum duration");
            return Ok(None);
        }

        let middle = seconds_to_timestamp(cue.start_time + split_duration);
        let left = Cue::new(cue.start.clone(), middle.clone(), text1)?;
        let right = Cue::new(middle, cue.end.clone(), text2)?;

        let mut cues = self.cues.clone();
        cues[index] = left;
        cues.insert(index + 1, right);
        debug!(index, char_offset, split_duration, "cue split");
        Ok(Some(Track { cues }))
    }

    /// Index of the first cue whose `[start_time, end_time)` span contains the
    /// playback position. Linear scan; this runs on every playback tick.
    pub fn active_index(&self, playback_seconds: f64) -> Option<usize> {
        self.cues
            .iter()
            .position(|c| c.start_time <= playback_seconds && playback_seconds < c.end_time)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
