//! Command layer over the engine
//!
//! The request/response surface host shells call. Every function returns
//! a `CommandResult` whose error serializes to a structured `{type,
//! message}` payload for the host UI.

use crate::core::classifier;
use crate::core::history::HistoryEngine;
use crate::core::snippets::SnippetStore;
use crate::shared::error::CommandResult;
use crate::shared::types::{EntryType, HistoryEntry, Snippet};
use crate::system::clipboard::ClipboardAccessor;

/// Get the ordered clipboard history
pub fn get_history(engine: &HistoryEngine) -> CommandResult<Vec<HistoryEntry>> {
    Ok(engine.get_history())
}

/// Get the ordered snippet list
pub fn get_snippets(snippets: &SnippetStore) -> CommandResult<Vec<Snippet>> {
    Ok(snippets.list())
}

/// Create a snippet; returns the updated list
pub fn add_snippet(
    snippets: &SnippetStore,
    title: String,
    content: String,
    emoji: String,
) -> CommandResult<Vec<Snippet>> {
    Ok(snippets.add(title, content, emoji))
}

/// Delete a snippet by id; returns the updated list
pub fn delete_snippet(snippets: &SnippetStore, id: &str) -> CommandResult<Vec<Snippet>> {
    Ok(snippets.delete(id))
}

/// Clear the capture history
pub fn clear_history(engine: &HistoryEngine) -> CommandResult<bool> {
    engine.clear();
    Ok(true)
}

/// Delete one history entry by id; deleting an unknown id succeeds
pub fn delete_history_entry(engine: &HistoryEngine, id: &str) -> CommandResult<bool> {
    engine.delete(id);
    Ok(true)
}

/// Set the monitoring flag
pub fn set_monitoring(engine: &HistoryEngine, enabled: bool) -> CommandResult<bool> {
    engine.set_monitoring(enabled);
    Ok(enabled)
}

/// Flip the monitoring flag; returns the new state
pub fn toggle_monitoring(engine: &HistoryEngine) -> CommandResult<bool> {
    let enabled = !engine.is_monitoring();
    engine.set_monitoring(enabled);
    Ok(enabled)
}

/// Get the monitoring flag
pub fn get_monitoring_status(engine: &HistoryEngine) -> CommandResult<bool> {
    Ok(engine.is_monitoring())
}

/// Write an entry's content back to the system clipboard.
///
/// The written value is marked as captured so the next poll tick does not
/// record our own write as a new entry.
pub fn copy_to_clipboard(
    engine: &HistoryEngine,
    accessor: &dyn ClipboardAccessor,
    content: &str,
    entry_type: EntryType,
) -> CommandResult<bool> {
    write_back(engine, accessor, content, entry_type)?;
    Ok(true)
}

/// Write an entry's content to the clipboard for an immediate paste.
///
/// Same write path as `copy_to_clipboard`; on a success result the host
/// hides its overlay and returns focus to the previously active surface.
pub fn paste_and_write_back(
    engine: &HistoryEngine,
    accessor: &dyn ClipboardAccessor,
    content: &str,
    entry_type: EntryType,
) -> CommandResult<bool> {
    write_back(engine, accessor, content, entry_type)?;
    Ok(true)
}

/// Capture whatever text is on the clipboard right now, bypassing change
/// detection. Returns false when the clipboard holds no text.
pub fn capture_now(
    engine: &HistoryEngine,
    accessor: &dyn ClipboardAccessor,
) -> CommandResult<bool> {
    let text = accessor.read_text().unwrap_or_default();
    if text.is_empty() {
        return Ok(false);
    }

    engine.mark_captured(&text);
    engine.add_text(text);
    Ok(true)
}

fn write_back(
    engine: &HistoryEngine,
    accessor: &dyn ClipboardAccessor,
    content: &str,
    entry_type: EntryType,
) -> CommandResult<()> {
    match entry_type {
        EntryType::Image => {
            let png = classifier::decode_image_data_url(content)?;
            accessor.write_image(&png)?;
        }
        // File entries hold a plain path; writing them back is a text write
        EntryType::Text | EntryType::File => accessor.write_text(content)?,
    }

    engine.mark_captured(content);
    Ok(())
}
