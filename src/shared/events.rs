use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Events published by the engine to subscribed observers.
///
/// `HistoryChanged` carries no payload: consumers re-fetch through
/// `get_history` rather than diffing an event body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[serde(tag = "event")] // Tagged enum for easier frontend parsing
#[ts(export, export_to = "bindings/events.ts")]
pub enum AppEvent {
    #[serde(rename = "history://changed")]
    HistoryChanged,
}
