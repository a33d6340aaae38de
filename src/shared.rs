//! Types, errors and events shared between the engine and its consumers.

pub mod error;
pub mod events;
pub mod types;
