//! Snippet store
//!
//! User-authored reusable text templates: an ordered list with add and
//! delete, persisted through the same state store as the history. No
//! classification, no dedup, no cap.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::shared::error::CommandResult;
use crate::shared::types::Snippet;
use crate::storage::{self, StateStore, KEY_SNIPPETS};

/// Snippet collection with key-value persistence
pub struct SnippetStore {
    snippets: Arc<Mutex<Vec<Snippet>>>,
    store: Arc<dyn StateStore>,
}

impl SnippetStore {
    /// Hydrate from the store, seeding the starter set when none exist.
    pub fn load(store: Arc<dyn StateStore>) -> CommandResult<Self> {
        let snippets: Vec<Snippet> =
            storage::read_slice(store.as_ref(), KEY_SNIPPETS)?.unwrap_or_else(Self::seed_snippets);

        Ok(Self {
            snippets: Arc::new(Mutex::new(snippets)),
            store,
        })
    }

    /// Current ordered list, newest first
    pub fn list(&self) -> Vec<Snippet> {
        self.lock_snippets().clone()
    }

    /// Prepend a new snippet and return the updated list
    pub fn add(&self, title: String, content: String, emoji: String) -> Vec<Snippet> {
        let mut snippets = self.lock_snippets();
        snippets.insert(0, Snippet::new(title, content, emoji));
        self.persist(&snippets);
        snippets.clone()
    }

    /// Remove a snippet by id and return the updated list. Removing an
    /// unknown id just returns the list unchanged.
    pub fn delete(&self, id: &str) -> Vec<Snippet> {
        let mut snippets = self.lock_snippets();
        snippets.retain(|snippet| snippet.id != id);
        self.persist(&snippets);
        snippets.clone()
    }

    fn persist(&self, snippets: &[Snippet]) {
        if let Err(e) = storage::write_slice(self.store.as_ref(), KEY_SNIPPETS, &snippets) {
            log::error!("[SnippetStore] Failed to persist snippets: {}", e);
        }
    }

    fn lock_snippets(&self) -> MutexGuard<'_, Vec<Snippet>> {
        match self.snippets.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::warn!("[SnippetStore] Mutex poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    fn seed_snippets() -> Vec<Snippet> {
        vec![
            Snippet::new(
                "Greeting".to_string(),
                "Hello, have a great day!".to_string(),
                "👋".to_string(),
            ),
            Snippet::new(
                "Thanks".to_string(),
                "Thank you for your help.".to_string(),
                "🙏".to_string(),
            ),
            Snippet::new(
                "Email".to_string(),
                "I will confirm and get back to you.\nThanks.".to_string(),
                "📧".to_string(),
            ),
        ]
    }

    /// Get a clone for sharing across threads
    pub fn clone_arc(&self) -> Self {
        Self {
            snippets: Arc::clone(&self.snippets),
            store: Arc::clone(&self.store),
        }
    }
}
