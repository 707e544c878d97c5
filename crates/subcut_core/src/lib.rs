//! In-memory subtitle track editing engine: timed cues, pure mutation
//! operations, a bounded undo history and the playback-position query. All
//! rendering, playback and notification concerns live with the caller.

pub mod editing;
pub mod error;
pub mod history;
pub mod session;
pub mod timecode;
pub mod types;
pub mod validate;

pub use error::{CoreError, Result};
pub use history::{History, MAX_HISTORY};
pub use session::{JsonFileStore, MemoryStore, Session, TrackStore};
pub use timecode::{round_to_ms, seconds_to_timestamp, timestamp_to_seconds};
pub use types::{Cue, CuePatch, CueRecord, Track};
pub use validate::{is_acceptable, MIN_CUE_DURATION};
