//! Host-facing command surface.

pub mod commands;
