//! Clipboard history engine
//!
//! Polls the system clipboard, keeps a bounded newest-first history of
//! distinct text/image/file captures alongside a user-authored snippet
//! collection, persists both after every mutation, and notifies
//! subscribers on each history change. Host shells (overlay, browser
//! window, tray) drive it through `api::commands` and the engine's event
//! channel; this crate owns no windows, hotkeys or rendering.

pub mod api;
pub mod core;
pub mod shared;
pub mod storage;
pub mod system;

use std::sync::Arc;

use crate::shared::error::CommandResult;

pub use crate::core::history::HistoryEngine;
pub use crate::core::monitor::ClipboardMonitor;
pub use crate::core::snippets::SnippetStore;
pub use crate::shared::events::AppEvent;
pub use crate::shared::types::{EntryMeta, EntryType, HistoryEntry, Snippet};
pub use crate::system::clipboard::{ClipboardAccessor, SystemClipboard};

/// Hydrate the engine from the default store, start the poll loop and run
/// until interrupted.
pub async fn run() -> CommandResult<()> {
    let store = storage::open_default_store();

    let engine = HistoryEngine::load(Arc::clone(&store))?;
    let snippets = SnippetStore::load(store)?;

    let accessor: Arc<dyn system::clipboard::ClipboardAccessor> =
        Arc::new(system::clipboard::SystemClipboard::new()?);

    let monitor = ClipboardMonitor::new(engine.clone_arc(), accessor);
    monitor.start();

    log::info!(
        "[Collector] Ready: {} history entries, {} snippets, monitoring {}",
        engine.get_history().len(),
        snippets.list().len(),
        if engine.is_monitoring() { "on" } else { "paused" }
    );

    tokio::signal::ctrl_c().await?;
    log::info!("[Collector] Shutting down");
    Ok(())
}
