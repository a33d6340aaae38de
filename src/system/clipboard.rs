//! System clipboard access
//!
//! `ClipboardAccessor` is the seam between the engine and the host
//! platform: format availability, reads and writes. `SystemClipboard` is
//! the production implementation on top of `clipboard-rs`; tests inject
//! scripted doubles instead.

use clipboard_rs::common::RustImage;
use clipboard_rs::{Clipboard, ClipboardContext, ContentFormat, RustImageData};

use crate::shared::error::{CommandError, CommandResult};

/// Clipboard content formats the engine distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipboardFormat {
    Text,
    Image,
    Files,
}

/// Platform clipboard capability consumed by the engine
pub trait ClipboardAccessor: Send + Sync {
    /// Whether the clipboard currently carries the given format
    fn has(&self, format: ClipboardFormat) -> bool;

    /// Plain-text payload
    fn read_text(&self) -> CommandResult<String>;

    /// Image payload as encoded PNG bytes
    fn read_image(&self) -> CommandResult<Vec<u8>>;

    /// Raw file payload: newline-separated URI/path list as the platform
    /// exposes it, un-normalized
    fn read_file_list(&self) -> CommandResult<String>;

    fn write_text(&self, text: &str) -> CommandResult<()>;

    fn write_image(&self, png: &[u8]) -> CommandResult<()>;
}

/// `clipboard-rs` backed accessor.
///
/// A fresh context is opened per operation; the context is not kept across
/// calls so the accessor stays Send + Sync without locking.
pub struct SystemClipboard;

impl SystemClipboard {
    pub fn new() -> CommandResult<Self> {
        // Probe once so construction fails fast where no clipboard exists
        Self::context()?;
        Ok(Self)
    }

    fn context() -> CommandResult<ClipboardContext> {
        ClipboardContext::new().map_err(|e| CommandError::Clipboard(e.to_string()))
    }
}


impl ClipboardAccessor for SystemClipboard {
    fn has(&self, format: ClipboardFormat) -> bool {
        let Ok(ctx) = Self::context() else {
            return false;
        };

        let format = match format {
            ClipboardFormat::Text => ContentFormat::Text,
            ClipboardFormat::Image => ContentFormat::Image,
            ClipboardFormat::Files => ContentFormat::Files,
        };
        ctx.has(format)
    }

    fn read_text(&self) -> CommandResult<String> {
        Self::context()?
            .get_text()
            .map_err(|e| CommandError::Clipboard(e.to_string()))
    }

    fn read_image(&self) -> CommandResult<Vec<u8>> {
        let image = Self::context()?
            .get_image()
            .map_err(|e| CommandError::Clipboard(e.to_string()))?;

        let png = image
            .to_png()
            .map_err(|e| CommandError::Clipboard(format!("PNG encode failed: {}", e)))?;

        Ok(png.get_bytes().to_vec())
    }

    fn read_file_list(&self) -> CommandResult<String> {
        Self::context()?
            .get_files()
            .map(|files| files.join("\n"))
            .map_err(|e| CommandError::Clipboard(e.to_string()))
    }

    fn write_text(&self, text: &str) -> CommandResult<()> {
        Self::context()?
            .set_text(text.to_string())
            .map_err(|e| CommandError::Clipboard(e.to_string()))
    }

    fn write_image(&self, png: &[u8]) -> CommandResult<()> {
        let image = RustImageData::from_bytes(png)
            .map_err(|e| CommandError::Clipboard(format!("Invalid image bytes: {}", e)))?;

        Self::context()?
            .set_image(image)
            .map_err(|e| CommandError::Clipboard(e.to_string()))
    }
}
