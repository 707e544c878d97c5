use crate::types::Track;

/// Shortest cue any mutation may produce, in seconds.
pub const MIN_CUE_DURATION: f64 = 0.2;

/// Whether the cue at `index` passes the acceptance rules.
///
/// A cue is unacceptable when it starts before its immediate predecessor ends,
/// when its caller-side `check` flag is cleared, or when it is shorter than
/// [`MIN_CUE_DURATION`]. Pure read; the UI uses it to highlight unresolved
/// cues. An out-of-range index has nothing to flag and reports acceptable.
pub fn is_acceptable(track: &Track, index: usize) -> bool {
    let Some(cue) = track.get(index) else {
        return true;
    };

    if let Some(previous) = index.checked_sub(1).and_then(|i| track.get(i)) {
        if cue.start_time < previous.end_time {
            return false;
        }
    }

    cue.check && cue.duration() >= MIN_CUE_DURATION
}
