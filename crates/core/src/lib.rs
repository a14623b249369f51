//! Domain core for box scanning and batch box operations.
//!
//! Pure, synchronous building blocks: the box snapshot model, the code
//! format classifier, the closed set of resolution outcomes, the
//! selected-boxes accumulator, and per-item reconciliation of batch
//! operation responses. Nothing here performs I/O.

pub mod batch;
pub mod box_state;
pub mod boxes;
pub mod code_format;
pub mod error;
pub mod resolution;
pub mod selection;
pub mod types;
