//! Particle choreography: static layout records, the scatter/tree blend,
//! and the per-frame pose synthesis that animates every particle.

/// Scatter/tree blend factor and its per-frame scheduler.
pub mod blend;

/// Per-group particle layout generation (the static records).
pub mod layout;

/// Scene spawning and per-frame transform writes.
pub mod particles;

/// Pure per-particle pose math.
pub mod pose;
