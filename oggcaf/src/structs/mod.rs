//! Data structures representing container format components.
//!
//! Contains structured representations of chunked-container records,
//! page-stream framing, and the Opus codec header packets.

pub mod caf;
pub mod ogg;
pub mod opus;
