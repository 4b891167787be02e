/// FPS overlay text and throttled FPS notifications.
pub mod fps_tracking;
