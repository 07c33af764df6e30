//! Patch-based undo/redo history.
//!
//! The document serializes to JSON after every committed mutation; the
//! history keeps one reversible frame (forward + backward patch) per commit.
//! Transform sessions wrap an entire drag in `pause`/`resume` so the whole
//! gesture coalesces into a single frame.

use crate::patch::{self, Patch};
use log::debug;
use serde_json::Value;

/// Playback status of the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryStatus {
    /// Not recording; persists are ignored.
    Stopped,
    /// Recording one frame per persisted mutation.
    Playing,
    /// Recording deferred; mutations coalesce until resume.
    Paused,
}

/// One undoable unit of document change.
#[derive(Debug, Clone)]
struct Frame {
    forward: Patch,
    backward: Patch,
}

/// Undo/redo manager over serialized document snapshots.
#[derive(Debug)]
pub struct History {
    frames: Vec<Frame>,
    /// Index of the last applied frame, -1 when at the initial state.
    cursor: isize,
    status: HistoryStatus,
    /// Snapshot matching the current committed document state.
    prev: Value,
    /// Latest snapshot seen while paused.
    pending: Option<Value>,
    /// Set by undo/redo so their own side-effect persist is absorbed.
    skip_next_frame: bool,
}

impl History {
    /// Create a history anchored at the given initial snapshot.
    pub fn new(initial: Value) -> Self {
        Self {
            frames: Vec::new(),
            cursor: -1,
            status: HistoryStatus::Playing,
            prev: initial,
            pending: None,
            skip_next_frame: false,
        }
    }

    /// Current playback status.
    pub fn status(&self) -> HistoryStatus {
        self.status
    }

    /// Whether the history is currently paused.
    pub fn is_paused(&self) -> bool {
        self.status == HistoryStatus::Paused
    }

    /// Whether an undo step is available.
    pub fn can_undo(&self) -> bool {
        self.cursor >= 0
    }

    /// Whether a redo step is available.
    pub fn can_redo(&self) -> bool {
        ((self.cursor + 1) as usize) < self.frames.len()
    }

    /// Record a committed document snapshot.
    ///
    /// While paused the snapshot is deferred; after an undo/redo the first
    /// persist is absorbed (it is the undo's own side effect, not a new
    /// mutation).
    pub fn persist(&mut self, snapshot: Value) {
        if self.skip_next_frame {
            self.skip_next_frame = false;
            self.prev = snapshot;
            return;
        }
        match self.status {
            HistoryStatus::Stopped => {}
            HistoryStatus::Paused => {
                self.pending = Some(snapshot);
            }
            HistoryStatus::Playing => self.commit(snapshot),
        }
    }

    fn commit(&mut self, snapshot: Value) {
        if snapshot == self.prev {
            return;
        }
        let forward = patch::diff(&self.prev, &snapshot);
        let backward = patch::diff(&snapshot, &self.prev);
        // Splice off stale redo frames beyond the cursor
        self.frames.truncate((self.cursor + 1) as usize);
        self.frames.push(Frame { forward, backward });
        self.cursor += 1;
        self.prev = snapshot;
        debug!("history: committed frame {} ({} ops)", self.cursor, self.frames[self.cursor as usize].forward.len());
    }

    /// Suspend frame recording; mutations coalesce until `resume`.
    pub fn pause(&mut self) {
        if self.status == HistoryStatus::Playing {
            self.status = HistoryStatus::Paused;
        }
    }

    /// Resume recording, committing one consolidated frame if anything
    /// changed while paused.
    pub fn resume(&mut self) {
        if self.status != HistoryStatus::Paused {
            return;
        }
        self.status = HistoryStatus::Playing;
        if let Some(snapshot) = self.pending.take() {
            self.commit(snapshot);
        }
    }

    /// Stop recording entirely.
    pub fn stop(&mut self) {
        self.status = HistoryStatus::Stopped;
        self.pending = None;
    }

    /// Step back one frame, returning the snapshot to load, or None if at
    /// the initial state.
    pub fn undo(&mut self) -> Option<Value> {
        self.resume();
        if self.cursor < 0 {
            return None;
        }
        let frame = &self.frames[self.cursor as usize];
        let restored = match patch::apply(&self.prev, &frame.backward) {
            Ok(value) => value,
            Err(err) => {
                debug!("history: undo patch failed: {err}");
                return None;
            }
        };
        self.cursor -= 1;
        self.prev = restored.clone();
        self.skip_next_frame = true;
        Some(restored)
    }

    /// Step forward one frame, returning the snapshot to load, or None if
    /// at the newest state.
    pub fn redo(&mut self) -> Option<Value> {
        self.resume();
        if !self.can_redo() {
            return None;
        }
        let frame = &self.frames[(self.cursor + 1) as usize];
        let restored = match patch::apply(&self.prev, &frame.forward) {
            Ok(value) => value,
            Err(err) => {
                debug!("history: redo patch failed: {err}");
                return None;
            }
        };
        self.cursor += 1;
        self.prev = restored.clone();
        self.skip_next_frame = true;
        Some(restored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(ids: &[&str]) -> Value {
        json!({ "shapes": ids.iter().map(|id| json!({"id": id})).collect::<Vec<_>>() })
    }

    #[test]
    fn test_undo_redo_roundtrip() {
        let mut history = History::new(doc(&[]));
        history.persist(doc(&["a"]));
        history.persist(doc(&["a", "b"]));

        assert_eq!(history.undo().unwrap(), doc(&["a"]));
        assert_eq!(history.undo().unwrap(), doc(&[]));
        assert!(history.undo().is_none());

        assert_eq!(history.redo().unwrap(), doc(&["a"]));
        assert_eq!(history.redo().unwrap(), doc(&["a", "b"]));
        assert!(history.redo().is_none());
    }

    #[test]
    fn test_new_mutation_splices_redo() {
        let mut history = History::new(doc(&[]));
        history.persist(doc(&["a"]));
        history.persist(doc(&["a", "b"]));
        history.undo();
        assert!(history.can_redo());

        // The undo side effect is absorbed, then a fresh mutation lands
        history.persist(doc(&["a"]));
        history.persist(doc(&["a", "c"]));
        assert!(!history.can_redo());
        assert_eq!(history.undo().unwrap(), doc(&["a"]));
    }

    #[test]
    fn test_pause_coalesces_to_one_frame() {
        let mut history = History::new(doc(&[]));
        history.pause();
        history.persist(doc(&["a"]));
        history.persist(doc(&["a", "b"]));
        history.resume();

        // One undo reverts both mutations
        assert_eq!(history.undo().unwrap(), doc(&[]));
        assert!(history.undo().is_none());
    }

    #[test]
    fn test_pause_without_changes_adds_nothing() {
        let mut history = History::new(doc(&["a"]));
        history.pause();
        history.resume();
        assert!(!history.can_undo());
    }

    #[test]
    fn test_skip_next_frame_absorbs_side_effect() {
        let mut history = History::new(doc(&[]));
        history.persist(doc(&["a"]));

        let restored = history.undo().unwrap();
        // The app reloads the document and persists it back
        history.persist(restored);
        assert!(!history.can_undo());
        assert!(history.can_redo());
    }

    #[test]
    fn test_identical_snapshot_is_noop() {
        let mut history = History::new(doc(&["a"]));
        history.persist(doc(&["a"]));
        assert!(!history.can_undo());
    }

    #[test]
    fn test_stopped_ignores_persist() {
        let mut history = History::new(doc(&[]));
        history.stop();
        history.persist(doc(&["a"]));
        assert!(!history.can_undo());
    }

    #[test]
    fn test_undo_while_paused_resumes_first() {
        let mut history = History::new(doc(&[]));
        history.pause();
        history.persist(doc(&["a"]));
        // Undo mid-session commits the pending frame, then reverts it
        assert_eq!(history.undo().unwrap(), doc(&[]));
        assert_eq!(history.status(), HistoryStatus::Playing);
    }
}
