//! Camera-observed hand gestures as a second input path.
//!
//! The hand-tracking model runs on the page side; this module consumes its
//! per-frame results and turns them into orbit deltas and scene state
//! requests. The scene never depends on this pipeline being healthy.

/// Message bridge to the page-side hand-tracking pipeline.
pub mod bridge;

/// Gesture-to-control state machine: drag anchor, debounce, transitions.
pub mod interpreter;
