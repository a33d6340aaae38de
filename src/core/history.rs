//! Clipboard history engine
//!
//! Owns the ordered, bounded, deduplicated entry list plus the monitoring
//! flag and the last-captured signature used by the poll loop for change
//! suppression. Every mutation persists its state slice synchronously and
//! then notifies subscribers; a failed persistence write is logged and the
//! in-memory state stays authoritative for the rest of the session.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::broadcast;

use crate::core::classifier;
use crate::shared::error::CommandResult;
use crate::shared::events::AppEvent;
use crate::shared::types::HistoryEntry;
use crate::storage::{self, StateStore, KEY_HISTORY, KEY_MONITORING, KEY_SCHEMA_VERSION, SCHEMA_VERSION};

/// Maximum number of history entries to keep
const MAX_HISTORY_SIZE: usize = 100;

/// Capacity of the subscriber channel; laggy observers re-fetch anyway
const EVENT_CHANNEL_CAPACITY: usize = 32;

struct EngineState {
    history: Vec<HistoryEntry>,
    monitoring_enabled: bool,
    /// Last raw signature seen by the poll loop or written by a command,
    /// shared across all three content types. Engine-private.
    last_captured: String,
}

/// Clipboard history engine with key-value persistence
pub struct HistoryEngine {
    state: Arc<Mutex<EngineState>>,
    store: Arc<dyn StateStore>,
    events: broadcast::Sender<AppEvent>,
}

impl HistoryEngine {
    /// Hydrate the engine from the persisted state store.
    ///
    /// Missing keys fall back to an empty history with monitoring on; the
    /// schema version is stamped on first load and a newer-than-known
    /// version only warns, it never refuses to start.
    pub fn load(store: Arc<dyn StateStore>) -> CommandResult<Self> {
        match storage::read_slice::<u32>(store.as_ref(), KEY_SCHEMA_VERSION)? {
            None => {
                storage::write_slice(store.as_ref(), KEY_SCHEMA_VERSION, &SCHEMA_VERSION)?;
            }
            Some(version) if version > SCHEMA_VERSION => {
                log::warn!(
                    "[HistoryEngine] Persisted state has schema version {} (newer than {}), loading best-effort",
                    version,
                    SCHEMA_VERSION
                );
            }
            Some(_) => {}
        }

        let history: Vec<HistoryEntry> =
            storage::read_slice(store.as_ref(), KEY_HISTORY)?.unwrap_or_default();
        let monitoring_enabled: bool =
            storage::read_slice(store.as_ref(), KEY_MONITORING)?.unwrap_or(true);

        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Ok(Self {
            state: Arc::new(Mutex::new(EngineState {
                history,
                monitoring_enabled,
                last_captured: String::new(),
            })),
            store,
            events,
        })
    }

    /// Subscribe to engine notifications
    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.events.subscribe()
    }

    /// Current ordered view of the history, newest first
    pub fn get_history(&self) -> Vec<HistoryEntry> {
        self.lock_state().history.clone()
    }

    /// Record a text capture.
    ///
    /// Any existing entry with the same content is removed first, so
    /// re-copying known text bumps it to the front with a fresh timestamp
    /// instead of creating a second row.
    pub fn add_text(&self, text: String) {
        let mut state = self.lock_state();
        state.history.retain(|entry| entry.content != text);
        state.history.insert(0, HistoryEntry::new_text(text));
        self.finalize_history_update(&mut state);
    }

    /// Record an image capture with its decoded dimensions
    pub fn add_image(&self, data_url: String, width: u32, height: u32) {
        let mut state = self.lock_state();
        state
            .history
            .insert(0, HistoryEntry::new_image(data_url, width, height));
        self.finalize_history_update(&mut state);
    }

    /// Record a file capture from the raw clipboard payload.
    ///
    /// Normalization (scheme strip, percent-decode, first entry only) and
    /// the file-name derivation happen here.
    pub fn add_file(&self, raw: String) {
        let (path, file_name) = classifier::normalize_file_path(&raw);

        let mut state = self.lock_state();
        state.history.insert(0, HistoryEntry::new_file(path, file_name));
        self.finalize_history_update(&mut state);
    }

    /// Remove one entry by id. Removing an unknown id is a no-op.
    pub fn delete(&self, id: &str) {
        let mut state = self.lock_state();
        let before = state.history.len();
        state.history.retain(|entry| entry.id != id);

        if state.history.len() != before {
            self.finalize_history_update(&mut state);
        }
    }

    /// Empty the history
    pub fn clear(&self) {
        let mut state = self.lock_state();
        state.history.clear();
        self.finalize_history_update(&mut state);
    }

    pub fn is_monitoring(&self) -> bool {
        self.lock_state().monitoring_enabled
    }

    /// Toggle the poll loop's effect; the timer itself keeps running
    pub fn set_monitoring(&self, enabled: bool) {
        let mut state = self.lock_state();
        state.monitoring_enabled = enabled;

        if let Err(e) = storage::write_slice(self.store.as_ref(), KEY_MONITORING, &enabled) {
            log::error!("[HistoryEngine] Failed to persist monitoring flag: {}", e);
        }
        log::info!(
            "[HistoryEngine] Monitoring {}",
            if enabled { "enabled" } else { "disabled" }
        );
    }

    /// Compare a raw capture signature against the last one seen and claim
    /// it when it differs. Returns false for a no-op repeat.
    pub(crate) fn try_mark_captured(&self, signature: &str) -> bool {
        let mut state = self.lock_state();
        if state.last_captured == signature {
            return false;
        }
        state.last_captured = signature.to_string();
        true
    }

    /// Unconditionally record a signature as seen. Used after writing to
    /// the clipboard so the next poll tick does not re-capture our own
    /// write.
    pub(crate) fn mark_captured(&self, signature: &str) {
        self.lock_state().last_captured = signature.to_string();
    }

    /// Trim to capacity, persist, notify. Call sites hold the state lock.
    fn finalize_history_update(&self, state: &mut MutexGuard<'_, EngineState>) {
        state.history.truncate(MAX_HISTORY_SIZE);

        if let Err(e) = storage::write_slice(self.store.as_ref(), KEY_HISTORY, &state.history) {
            log::error!("[HistoryEngine] Failed to persist history: {}", e);
        }

        let _ = self.events.send(AppEvent::HistoryChanged);
    }

    fn lock_state(&self) -> MutexGuard<'_, EngineState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::warn!("[HistoryEngine] State mutex poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    /// Get a clone for sharing across threads
    pub fn clone_arc(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            store: Arc::clone(&self.store),
            events: self.events.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::types::{EntryMeta, EntryType};
    use crate::storage::MemoryStore;

    fn engine() -> HistoryEngine {
        HistoryEngine::load(Arc::new(MemoryStore::new())).unwrap()
    }

    #[test]
    fn test_newest_first_ordering() {
        let engine = engine();
        engine.add_text("A".to_string());
        engine.add_text("B".to_string());
        engine.add_text("C".to_string());

        let contents: Vec<_> = engine.get_history().into_iter().map(|e| e.content).collect();
        assert_eq!(contents, vec!["C", "B", "A"]);
    }

    #[test]
    fn test_text_dedup_bumps_to_front() {
        let engine = engine();
        engine.add_text("A".to_string());
        let first_insert = engine.get_history()[0].clone();

        engine.add_text("B".to_string());
        engine.add_text("A".to_string());

        let history = engine.get_history();
        let contents: Vec<_> = history.iter().map(|e| e.content.as_str()).collect();
        assert_eq!(contents, vec!["A", "B"]);

        // The surviving "A" is the second insertion, not the original row
        assert!(history[0].timestamp >= first_insert.timestamp);
        assert_ne!(history[0].id, first_insert.id);
    }

    #[test]
    fn test_images_are_not_globally_deduped() {
        let engine = engine();
        let url = "data:image/png;base64,AAAA".to_string();

        engine.add_image(url.clone(), 1, 1);
        engine.add_text("between".to_string());
        engine.add_image(url, 1, 1);

        // Distinct non-consecutive repeats coexist
        assert_eq!(engine.get_history().len(), 3);
    }

    #[test]
    fn test_bounded_size() {
        let engine = engine();
        for i in 0..250 {
            engine.add_text(format!("entry {}", i));
        }

        let history = engine.get_history();
        assert_eq!(history.len(), MAX_HISTORY_SIZE);
        assert_eq!(history[0].content, "entry 249");
        assert_eq!(history[MAX_HISTORY_SIZE - 1].content, "entry 150");
    }

    #[test]
    fn test_add_file_normalizes() {
        let engine = engine();
        engine.add_file("file:///Users/x/report%20final.pdf".to_string());

        let entry = &engine.get_history()[0];
        assert_eq!(entry.entry_type, EntryType::File);
        assert_eq!(entry.content, "/Users/x/report final.pdf");
        assert_eq!(
            entry.meta,
            Some(EntryMeta::File {
                file_name: "report final.pdf".to_string()
            })
        );
    }

    #[test]
    fn test_delete_is_idempotent() {
        let engine = engine();
        engine.add_text("keep".to_string());
        let id = engine.get_history()[0].id.clone();

        engine.delete("no-such-id");
        assert_eq!(engine.get_history().len(), 1);

        engine.delete(&id);
        assert!(engine.get_history().is_empty());

        engine.delete(&id);
        assert!(engine.get_history().is_empty());
    }

    #[test]
    fn test_clear() {
        let engine = engine();
        engine.add_text("one".to_string());
        engine.add_image("data:image/png;base64,BBBB".to_string(), 2, 2);

        engine.clear();
        assert!(engine.get_history().is_empty());
    }

    #[test]
    fn test_persistence_durability() {
        let store: Arc<dyn StateStore> = Arc::new(MemoryStore::new());

        let engine = HistoryEngine::load(Arc::clone(&store)).unwrap();
        engine.add_text("survives".to_string());
        engine.add_file("/tmp/report.pdf".to_string());
        engine.set_monitoring(false);

        // A fresh hydration from the same store sees the same state
        let reloaded = HistoryEngine::load(store).unwrap();
        let history = reloaded.get_history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].content, "/tmp/report.pdf");
        assert_eq!(history[1].content, "survives");
        assert!(!reloaded.is_monitoring());
    }

    #[test]
    fn test_schema_version_is_stamped() {
        let store: Arc<dyn StateStore> = Arc::new(MemoryStore::new());
        let _engine = HistoryEngine::load(Arc::clone(&store)).unwrap();

        let version: Option<u32> =
            storage::read_slice(store.as_ref(), KEY_SCHEMA_VERSION).unwrap();
        assert_eq!(version, Some(SCHEMA_VERSION));
    }

    #[test]
    fn test_change_notification() {
        let engine = engine();
        let mut events = engine.subscribe();

        engine.add_text("ping".to_string());
        assert_eq!(events.try_recv().unwrap(), AppEvent::HistoryChanged);

        // A no-op delete does not notify
        engine.delete("missing");
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn test_capture_signature_slot() {
        let engine = engine();

        assert!(engine.try_mark_captured("sig"));
        assert!(!engine.try_mark_captured("sig"));
        assert!(engine.try_mark_captured("other"));

        engine.mark_captured("written");
        assert!(!engine.try_mark_captured("written"));
    }
}
