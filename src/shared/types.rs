use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Type of a captured clipboard entry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/types.ts")]
pub enum EntryType {
    Text,
    Image,
    File,
}

/// Type-dependent entry metadata.
///
/// Untagged: an image carries its pixel dimensions, a file its final path
/// segment, text carries nothing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[serde(untagged)]
#[ts(export, export_to = "bindings/types.ts")]
pub enum EntryMeta {
    Image {
        width: u32,
        height: u32,
    },
    File {
        #[serde(rename = "fileName")]
        file_name: String,
    },
}

/// A single captured clipboard snapshot
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/types.ts")]
pub struct HistoryEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    /// Raw text, a `data:image/png;base64,` URL, or a normalized absolute path
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<EntryMeta>,
    #[ts(type = "string")]
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    /// Create a new text entry
    pub fn new_text(content: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            entry_type: EntryType::Text,
            content,
            meta: None,
            timestamp: Utc::now(),
        }
    }

    /// Create a new image entry from its encoded form and decoded dimensions
    pub fn new_image(data_url: String, width: u32, height: u32) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            entry_type: EntryType::Image,
            content: data_url,
            meta: Some(EntryMeta::Image { width, height }),
            timestamp: Utc::now(),
        }
    }

    /// Create a new file entry from an already-normalized path
    pub fn new_file(path: String, file_name: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            entry_type: EntryType::File,
            content: path,
            meta: Some(EntryMeta::File { file_name }),
            timestamp: Utc::now(),
        }
    }
}

/// A user-authored reusable text template, distinct from captured history
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/types.ts")]
pub struct Snippet {
    pub id: String,
    pub title: String,
    pub content: String,
    pub emoji: String,
    #[serde(rename = "createdAt")]
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

impl Snippet {
    pub fn new(title: String, content: String, emoji: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title,
            content,
            emoji,
            created_at: Utc::now(),
        }
    }
}
