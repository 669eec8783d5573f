//! Embedding helpers for the `reflow` crate.
//!
//! The `reflow` crate is UI-agnostic and focuses on the timing/decision
//! engine. This crate provides small, framework-neutral pieces commonly
//! needed by embeddings:
//!
//! - [`ScrollModel`]: a minimal scroll position implementing
//!   [`reflow::ScrollHost`]
//! - [`Viewer`]: the composition root wiring an engine to a scroll model and
//!   a pumpable task queue
//!
//! This crate is intentionally toolkit-agnostic (no winit/egui/ratatui
//! bindings).
#![forbid(unsafe_code)]

mod scroll;
mod viewer;


pub use scroll::ScrollModel;
pub use viewer::Viewer;
