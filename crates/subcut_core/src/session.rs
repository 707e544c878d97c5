use crate::error::Result;
use crate::history::History;
use crate::types::{Cue, CuePatch, CueRecord, Track};
use crate::validate;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// TrackStore
// ---------------------------------------------------------------------------

/// Key-value persistence contract for the session's track.
///
/// One session persists under one fixed key, so the store surface is just
/// load/save of the flat record list. Storage failures surface to the caller;
/// the session never retries or manages quotas.
pub trait TrackStore {
    /// Last persisted records, or `None` when nothing was ever saved.
    fn load(&self) -> Result<Option<Vec<CueRecord>>>;

    fn save(&mut self, records: &[CueRecord]) -> Result<()>;
}

/// Store backed by a pretty-printed JSON file at a fixed path.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl TrackStore for JsonFileStore {
    fn load(&self) -> Result<Option<Vec<CueRecord>>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let data = std::fs::read_to_string(&self.path)?;
        let records: Vec<CueRecord> = serde_json::from_str(&data)?;
        Ok(Some(records))
    }

    fn save(&mut self, records: &[CueRecord]) -> Result<()> {
        let json = serde_json::to_string_pretty(records)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

/// In-memory store for non-persistent sessions and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Option<Vec<CueRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that already holds persisted records, as if from a prior session.
    pub fn with_records(records: Vec<CueRecord>) -> Self {
        Self {
            records: Some(records),
        }
    }

    pub fn records(&self) -> Option<&Vec<CueRecord>> {
        self.records.as_ref()
    }
}

impl TrackStore for MemoryStore {
    fn load(&self) -> Result<Option<Vec<CueRecord>>> {
        Ok(self.records.clone())
    }

    fn save(&mut self, records: &[CueRecord]) -> Result<()> {
        self.records = Some(records.to_vec());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// One interactive editing session: the live track, its undo history and the
/// persistence store, serialized behind a single caller.
///
/// Mutations go through [`Session::commit`]: a candidate structurally equal to
/// the current track is dropped for free (no snapshot, no write); otherwise
/// the pre-mutation track is snapshotted, the new records are persisted and
/// the candidate becomes current. Every mutating method returns whether a
/// change was applied so the caller can drive notifications.
pub struct Session<S: TrackStore> {
    store: S,
    track: Track,
    history: History,
}

impl<S: TrackStore> Session<S> {
    /// Open a session from the store's persisted state, falling back to the
    /// supplied records when the store is empty, holds an empty list, or its
    /// contents fail to load or parse. Fallback records themselves must be
    /// well-formed.
    pub fn open(store: S, fallback: &[CueRecord]) -> Result<Self> {
        let track = match store.load() {
            Ok(Some(records)) if !records.is_empty() => match Track::from_records(&records) {
                Ok(track) => track,
                Err(e) => {
                    warn!(error = %e, "persisted track is malformed, using fallback");
                    Track::from_records(fallback)?
                }
            },
            Ok(_) => Track::from_records(fallback)?,
            Err(e) => {
                warn!(error = %e, "persisted track failed to load, using fallback");
                Track::from_records(fallback)?
            }
        };
        debug!(cue_count = track.len(), "session opened");
        Ok(Self {
            store,
            track,
            history: History::default(),
        })
    }

    pub fn track(&self) -> &Track {
        &self.track
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// See [`Track::active_index`].
    pub fn active_index(&self, playback_seconds: f64) -> Option<usize> {
        self.track.active_index(playback_seconds)
    }

    /// See [`validate::is_acceptable`].
    pub fn is_acceptable(&self, index: usize) -> bool {
        validate::is_acceptable(&self.track, index)
    }

    pub fn insert(&mut self, index: usize, cue: Cue) -> Result<bool> {
        let candidate = self.track.insert(index, cue);
        self.commit(candidate)
    }

    pub fn remove(&mut self, cue_id: Uuid) -> Result<bool> {
        match self.track.remove(cue_id) {
            Some(candidate) => self.commit(candidate),
            None => Ok(false),
        }
    }

    pub fn update(&mut self, cue_id: Uuid, patch: &CuePatch) -> Result<bool> {
        match self.track.update(cue_id, patch)? {
            Some(candidate) => self.commit(candidate),
            None => Ok(false),
        }
    }

    pub fn merge(&mut self, cue_id: Uuid) -> Result<bool> {
        match self.track.merge(cue_id)? {
            Some(candidate) => self.commit(candidate),
            None => Ok(false),
        }
    }

    pub fn split(&mut self, cue_id: Uuid, char_offset: usize) -> Result<bool> {
        match self.track.split(cue_id, char_offset)? {
            Some(candidate) => self.commit(candidate),
            None => Ok(false),
        }
    }

    /// Restore the most recent snapshot. The restored track is persisted but
    /// not re-snapshotted; there is no redo.
    pub fn undo(&mut self) -> Result<bool> {
        let Some(previous) = self.history.pop() else {
            return Ok(false);
        };
        self.store.save(&previous.to_records())?;
        self.track = previous;
        debug!(cue_count = self.track.len(), "undo applied");
        Ok(true)
    }

    /// Drop all cues and reset history. Clearing is itself not undoable.
    pub fn clear(&mut self) -> Result<bool> {
        self.history.clear();
        if self.track.is_empty() {
            return Ok(false);
        }
        let empty = Track::default();
        self.store.save(&empty.to_records())?;
        self.track = empty;
        debug!("track cleared");
        Ok(true)
    }

    fn commit(&mut self, candidate: Track) -> Result<bool> {
        if candidate == self.track {
            return Ok(false);
        }
        self.store.save(&candidate.to_records())?;
        self.history.push(std::mem::replace(&mut self.track, candidate));
        Ok(true)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(start: &str, end: &str, text: &str) -> CueRecord {
        CueRecord {
            start: start.into(),
            end: end.into(),
            text: text.into(),
        }
    }

    fn sample_records() -> Vec<CueRecord> {
        vec![
            record("00:00:00.000", "00:00:02.000", "Hello"),
            record("00:00:02.000", "00:00:04.000", "World"),
        ]
    }

    fn open_with_fallback() -> Session<MemoryStore> {
        Session::open(MemoryStore::new(), &sample_records()).unwrap()
    }

    // -----------------------------------------------------------------------
    // open / fallback
    // -----------------------------------------------------------------------

    #[test]
    fn open_uses_persisted_records_when_present() {
        let store = MemoryStore::with_records(vec![record(
            "00:00:05.000",
            "00:00:06.000",
            "persisted",
        )]);
        let session = Session::open(store, &sample_records()).unwrap();
        assert_eq!(session.track().len(), 1);
        assert_eq!(session.track().cues[0].text, "persisted");
    }

    #[test]
    fn open_falls_back_when_store_is_empty() {
        let session = open_with_fallback();
        assert_eq!(session.track().len(), 2);
        assert_eq!(session.track().cues[0].text, "Hello");
    }

    #[test]
    fn open_falls_back_on_empty_persisted_list() {
        let store = MemoryStore::with_records(vec![]);
        let session = Session::open(store, &sample_records()).unwrap();
        assert_eq!(session.track().len(), 2);
    }

    #[test]
    fn open_falls_back_on_malformed_persisted_records() {
        let store = MemoryStore::with_records(vec![record("garbage", "also garbage", "x")]);
        let session = Session::open(store, &sample_records()).unwrap();
        assert_eq!(session.track().cues[0].text, "Hello");
    }

    #[test]
    fn open_fails_when_fallback_is_malformed_too() {
        let bad = vec![record("garbage", "00:00:01.000", "x")];
        assert!(Session::open(MemoryStore::new(), &bad).is_err());
    }

    // -----------------------------------------------------------------------
    // mutation / persistence / history coupling
    // -----------------------------------------------------------------------

    #[test]
    fn accepted_mutation_persists_and_snapshots() {
        let mut session = open_with_fallback();
        let id = session.track().cues[0].id;

        let changed = session
            .update(
                id,
                &CuePatch {
                    text: Some("Edited".into()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert!(changed);
        assert!(session.can_undo());
        let persisted = session.store().records().unwrap();
        assert_eq!(persisted[0].text, "Edited");
    }

    #[test]
    fn noop_update_skips_history_and_persistence() {
        let mut session = open_with_fallback();
        let id = session.track().cues[0].id;

        // Patch that changes nothing: structurally equal candidate.
        let changed = session.update(id, &CuePatch::default()).unwrap();

        assert!(!changed);
        assert!(!session.can_undo());
        assert!(session.store().records().is_none());
    }

    #[test]
    fn stale_reference_mutations_are_free() {
        let mut session = open_with_fallback();
        let stale = Uuid::new_v4();

        assert!(!session.remove(stale).unwrap());
        assert!(!session.merge(stale).unwrap());
        assert!(!session.split(stale, 2).unwrap());
        assert!(!session
            .update(
                stale,
                &CuePatch {
                    text: Some("x".into()),
                    ..Default::default()
                }
            )
            .unwrap());

        assert!(!session.can_undo());
        assert!(session.store().records().is_none());
    }

    #[test]
    fn undo_restores_previous_track_and_persists_it() {
        let mut session = open_with_fallback();
        let id = session.track().cues[0].id;
        session.remove(id).unwrap();
        assert_eq!(session.track().len(), 1);

        assert!(session.undo().unwrap());
        assert_eq!(session.track().len(), 2);
        assert_eq!(session.track().cues[0].text, "Hello");
        assert_eq!(session.store().records().unwrap().len(), 2);

        // Nothing left to undo.
        assert!(!session.undo().unwrap());
    }

    #[test]
    fn undo_depth_is_bounded() {
        let mut session = open_with_fallback();

        // More undoable edits than the history cap.
        for i in 0..(crate::history::MAX_HISTORY + 10) {
            let id = session.track().cues[0].id;
            session
                .update(
                    id,
                    &CuePatch {
                        text: Some(format!("edit {i}")),
                        ..Default::default()
                    },
                )
                .unwrap();
        }

        let mut undone = 0;
        while session.undo().unwrap() {
            undone += 1;
        }
        assert_eq!(undone, crate::history::MAX_HISTORY);
    }

    #[test]
    fn clear_empties_track_and_resets_history() {
        let mut session = open_with_fallback();
        let id = session.track().cues[0].id;
        session.remove(id).unwrap();
        assert!(session.can_undo());

        assert!(session.clear().unwrap());
        assert!(session.track().is_empty());
        assert!(!session.can_undo());
        assert!(!session.undo().unwrap());
        assert!(session.store().records().unwrap().is_empty());
    }

    #[test]
    fn clear_on_empty_track_reports_no_change() {
        let mut session = Session::open(MemoryStore::new(), &[]).unwrap();
        assert!(!session.clear().unwrap());
    }

    #[test]
    fn insert_remove_round_trip() {
        let mut session = open_with_fallback();
        let cue = Cue::new("00:00:04.000", "00:00:05.000", "tail").unwrap();
        let id = cue.id;

        assert!(session.insert(2, cue).unwrap());
        assert_eq!(session.track().len(), 3);

        assert!(session.remove(id).unwrap());
        assert_eq!(session.track().len(), 2);
    }

    #[test]
    fn split_and_merge_through_session() {
        let mut session = open_with_fallback();
        let id = session.track().cues[0].id;

        assert!(session.split(id, 2).unwrap());
        assert_eq!(session.track().len(), 3);

        let left_id = session.track().cues[0].id;
        assert!(session.merge(left_id).unwrap());
        assert_eq!(session.track().len(), 2);
        assert_eq!(session.track().cues[0].text, "He\nllo");

        // Two edits, two undos.
        assert!(session.undo().unwrap());
        assert!(session.undo().unwrap());
        assert_eq!(session.track().cues[0].text, "Hello");
        assert!(!session.undo().unwrap());
    }

    #[test]
    fn read_queries_pass_through() {
        let session = open_with_fallback();
        assert_eq!(session.active_index(1.0), Some(0));
        assert_eq!(session.active_index(4.0), None);
        assert!(session.is_acceptable(0));
        assert!(session.is_acceptable(1));
    }

    // -----------------------------------------------------------------------
    // JsonFileStore
    // -----------------------------------------------------------------------

    #[test]
    fn json_file_store_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("track.json");

        let mut store = JsonFileStore::new(&path);
        assert!(store.load().unwrap().is_none());

        store.save(&sample_records()).unwrap();
        let loaded = JsonFileStore::new(&path).load().unwrap().unwrap();
        assert_eq!(loaded, sample_records());
    }

    #[test]
    fn json_file_store_corrupt_file_errors_and_session_falls_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("track.json");
        std::fs::write(&path, "not json at all").unwrap();

        let store = JsonFileStore::new(&path);
        assert!(store.load().is_err());

        let session = Session::open(JsonFileStore::new(&path), &sample_records()).unwrap();
        assert_eq!(session.track().cues[0].text, "Hello");
    }

    #[test]
    fn session_persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("track.json");

        {
            let mut session =
                Session::open(JsonFileStore::new(&path), &sample_records()).unwrap();
            let id = session.track().cues[1].id;
            session.remove(id).unwrap();
        }

        let reopened = Session::open(JsonFileStore::new(&path), &sample_records()).unwrap();
        assert_eq!(reopened.track().len(), 1);
        assert_eq!(reopened.track().cues[0].text, "Hello");
    }
}
