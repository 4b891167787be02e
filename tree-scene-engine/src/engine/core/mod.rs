//! Core application setup and state management.

/// Application setup, plugin wiring and UI overlay.
pub mod app_setup;

/// Discrete scene state (assembled tree vs. scattered cloud).
pub mod app_state;

/// Platform-specific window configuration for native and WASM builds.
pub mod window_config;
