/// Orbit camera resource and pointer-driven controller.
pub mod orbit_camera;
