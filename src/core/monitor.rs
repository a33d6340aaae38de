//! Clipboard poll loop and change detection
//!
//! A fixed-interval tick probes the accessor in strict priority order
//! (image, then files, then text) and records at most one capture per
//! tick. A single copy action usually exposes several formats at once;
//! stopping at the first recorded match keeps it one history entry.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::Duration;

use crate::core::classifier::{self, MIN_IMAGE_DATA_URL_LEN};
use crate::core::history::HistoryEngine;
use crate::system::clipboard::{ClipboardAccessor, ClipboardFormat};

/// Poll cadence in milliseconds
const POLL_INTERVAL_MS: u64 = 500;

/// Clipboard monitor that polls for changes
pub struct ClipboardMonitor {
    engine: HistoryEngine,
    accessor: Arc<dyn ClipboardAccessor>,
}

impl ClipboardMonitor {
    pub fn new(engine: HistoryEngine, accessor: Arc<dyn ClipboardAccessor>) -> Self {
        Self { engine, accessor }
    }

    /// Spawn the background poll task. The timer runs for the process
    /// lifetime; disabling monitoring only blanks the effect of each tick.
    pub fn start(&self) -> JoinHandle<()> {
        let engine = self.engine.clone_arc();
        let accessor = Arc::clone(&self.accessor);

        tokio::spawn(async move {
            log::info!("[ClipboardMonitor] Started monitoring ({}ms interval)", POLL_INTERVAL_MS);
            let mut consecutive_errors = 0u32;

            loop {
                Self::poll_once(&engine, &accessor, &mut consecutive_errors);
                tokio::time::sleep(Duration::from_millis(POLL_INTERVAL_MS)).await;
            }
        })
    }

    /// Run one detection pass immediately. Exposed so tests (and hosts
    /// that own their own scheduler) can drive the loop without the timer.
    pub fn tick(&self) {
        let mut consecutive_errors = 0;
        Self::poll_once(&self.engine, &self.accessor, &mut consecutive_errors);
    }

    fn poll_once(
        engine: &HistoryEngine,
        accessor: &Arc<dyn ClipboardAccessor>,
        consecutive_errors: &mut u32,
    ) {
        if !engine.is_monitoring() {
            return;
        }

        // 1. Image: a new capture ends the tick; an unchanged image falls
        // through to the file/text checks.
        if accessor.has(ClipboardFormat::Image) {
            if let Ok(png) = accessor.read_image() {
                if let Ok(candidate) = classifier::classify_image(&png) {
                    if candidate.data_url.len() > MIN_IMAGE_DATA_URL_LEN
                        && engine.try_mark_captured(&candidate.data_url)
                    {
                        engine.add_image(candidate.data_url, candidate.width, candidate.height);
                        *consecutive_errors = 0;
                        return;
                    }
                }
            }
        }

        // 2. Files: compared against the raw un-normalized payload
        if accessor.has(ClipboardFormat::Files) {
            if let Ok(raw) = accessor.read_file_list() {
                if !raw.is_empty() && engine.try_mark_captured(&raw) {
                    engine.add_file(raw);
                    *consecutive_errors = 0;
                    return;
                }
            }
        }

        // 3. Text: an empty or failed read is "no change", never an error
        match accessor.read_text() {
            Ok(text) => {
                *consecutive_errors = 0;
                if !text.is_empty() && engine.try_mark_captured(&text) {
                    engine.add_text(text);
                }
            }
            Err(e) => {
                *consecutive_errors += 1;
                if *consecutive_errors == 1 || *consecutive_errors % 10 == 0 {
                    log::warn!(
                        "[ClipboardMonitor] Failed to read clipboard (error #{}): {}",
                        consecutive_errors,
                        e
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::types::{EntryMeta, EntryType};
    use crate::storage::MemoryStore;
    use crate::system::clipboard::test_support::ScriptedClipboard;
    use std::io::Cursor;

    fn setup() -> (ClipboardMonitor, HistoryEngine, Arc<ScriptedClipboard>) {
        let engine = HistoryEngine::load(Arc::new(MemoryStore::new())).unwrap();
        let clipboard = Arc::new(ScriptedClipboard::new());
        let monitor = ClipboardMonitor::new(
            engine.clone_arc(),
            Arc::clone(&clipboard) as Arc<dyn ClipboardAccessor>,
        );
        (monitor, engine, clipboard)
    }

    fn png_fixture(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([0, 0, 0, 255]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_text_capture_and_repeat_suppression() {
        let (monitor, engine, clipboard) = setup();

        clipboard.put_text("hello");
        monitor.tick();
        monitor.tick();
        monitor.tick();

        // Identical consecutive ticks record exactly one entry
        let history = engine.get_history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].content, "hello");
    }

    #[test]
    fn test_empty_text_is_no_change() {
        let (monitor, engine, clipboard) = setup();

        clipboard.put_text("");
        monitor.tick();

        assert!(engine.get_history().is_empty());
    }

    #[test]
    fn test_image_takes_priority_over_text() {
        let (monitor, engine, clipboard) = setup();

        clipboard.put_text("screenshot.png");
        clipboard.put_image(png_fixture(3, 2));
        monitor.tick();

        // One physical copy, one entry, and it is the image
        let history = engine.get_history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].entry_type, EntryType::Image);
        assert_eq!(history[0].meta, Some(EntryMeta::Image { width: 3, height: 2 }));
    }

    #[test]
    fn test_unchanged_image_falls_through_to_text() {
        let (monitor, engine, clipboard) = setup();

        clipboard.put_image(png_fixture(2, 2));
        monitor.tick();
        assert_eq!(engine.get_history().len(), 1);

        // Same image still present, but the text slot changed
        clipboard.put_text("fresh text");
        monitor.tick();

        let history = engine.get_history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].entry_type, EntryType::Text);
        assert_eq!(history[0].content, "fresh text");
    }

    #[test]
    fn test_file_capture_beats_text() {
        let (monitor, engine, clipboard) = setup();

        clipboard.put_files("file:///Users/x/report%20final.pdf");
        clipboard.put_text("/Users/x/report final.pdf");
        monitor.tick();

        let history = engine.get_history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].entry_type, EntryType::File);
        assert_eq!(history[0].content, "/Users/x/report final.pdf");
    }

    #[test]
    fn test_monitoring_toggle_blanks_ticks() {
        let (monitor, engine, clipboard) = setup();

        clipboard.put_text("seen");
        monitor.tick();
        assert_eq!(engine.get_history().len(), 1);

        engine.set_monitoring(false);
        clipboard.put_text("missed");
        monitor.tick();
        monitor.tick();
        assert_eq!(engine.get_history().len(), 1);

        // Re-enabling resumes detection against the still-current signature
        engine.set_monitoring(true);
        monitor.tick();
        let history = engine.get_history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].content, "missed");
    }

    #[test]
    fn test_cross_type_signature_suppression() {
        let (monitor, engine, clipboard) = setup();

        clipboard.put_files("/tmp/a.txt");
        monitor.tick();
        assert_eq!(engine.get_history().len(), 1);

        // A text capture matching the previous raw file payload is a
        // no-op repeat: the signature slot is shared across types.
        clipboard.clear();
        clipboard.put_text("/tmp/a.txt");
        monitor.tick();
        assert_eq!(engine.get_history().len(), 1);
    }

    #[test]
    fn test_two_distinct_texts() {
        let (monitor, engine, clipboard) = setup();

        clipboard.put_text("first");
        monitor.tick();
        clipboard.put_text("second");
        monitor.tick();

        let contents: Vec<_> = engine.get_history().into_iter().map(|e| e.content).collect();
        assert_eq!(contents, vec!["second", "first"]);
    }
}
