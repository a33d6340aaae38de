//! Engine core
//!
//! - `history`: bounded, deduplicated capture history with persistence
//! - `classifier`: raw payload -> canonical entry content
//! - `monitor`: poll loop driving change detection
//! - `snippets`: user-authored reusable templates

pub mod classifier;
pub mod history;
pub mod monitor;
pub mod snippets;
