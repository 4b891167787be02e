use bevy::input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use std::f32::consts::{FRAC_PI_2, PI};

const MIN_DISTANCE: f32 = 10.0;
const MAX_DISTANCE: f32 = 40.0;
/// Keep the polar angle off the poles so the view never flips.
const POLAR_MARGIN: f32 = 0.05;
/// Slow idle turn, roughly one lap every two minutes.
const AUTO_ROTATE_RATE: f32 = 0.052;
const ORBIT_SENSITIVITY: f32 = 0.005;
const SMOOTHING_RATE: f32 = 12.0;

/// Orbit camera state around a fixed focus point. The transform is only
/// derived from this; gestures and the pointer both steer the same angles.
#[derive(Resource, Debug, Clone)]
pub struct OrbitCamera {
    pub focus: Vec3,
    azimuth: f32,
    polar: f32,
    radius: f32,
    pub auto_rotate: bool,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            focus: Vec3::ZERO,
            azimuth: 0.0,
            polar: FRAC_PI_2,
            radius: 25.0,
            auto_rotate: true,
        }
    }
}

impl OrbitCamera {
    pub fn azimuthal_angle(&self) -> f32 {
        self.azimuth
    }

    pub fn set_azimuthal_angle(&mut self, angle: f32) {
        self.azimuth = angle;
    }

    pub fn polar_angle(&self) -> f32 {
        self.polar
    }

    pub fn set_polar_angle(&mut self, angle: f32) {
        self.polar = angle.clamp(POLAR_MARGIN, PI - POLAR_MARGIN);
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn set_radius(&mut self, radius: f32) {
        self.radius = radius.clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    /// Camera position on the orbit sphere. Azimuth 0 looks down -Z, so
    /// the default view sits at (0, 0, radius).
    pub fn position(&self) -> Vec3 {
        let sin_polar = self.polar.sin();
        self.focus
            + Vec3::new(
                self.radius * sin_polar * self.azimuth.sin(),
                self.radius * self.polar.cos(),
                self.radius * sin_polar * self.azimuth.cos(),
            )
    }
}

/// Pointer fallback input: left-drag orbits, the wheel dollies, and the
/// view drifts slowly while idle. The transform eases toward the orbit
/// target instead of snapping.
pub fn camera_controller(
    mut camera_query: Query<&mut Transform, With<Camera3d>>,
    mut orbit: ResMut<OrbitCamera>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: EventReader<MouseMotion>,
    mut scroll_events: EventReader<MouseWheel>,
    time: Res<Time>,
) {
    let Ok(mut camera_transform) = camera_query.single_mut() else {
        return;
    };

    let mouse_delta: Vec2 = mouse_motion.read().map(|m| m.delta).sum();
    let dragging = mouse_button.pressed(MouseButton::Left);
    if dragging && mouse_delta != Vec2::ZERO {
        let azimuth = orbit.azimuthal_angle() - mouse_delta.x * ORBIT_SENSITIVITY;
        let polar = orbit.polar_angle() - mouse_delta.y * ORBIT_SENSITIVITY;
        orbit.set_azimuthal_angle(azimuth);
        orbit.set_polar_angle(polar);
    }

    // Mouse wheel scroll accumulation (pixel and line scroll).
    let mut scroll_accum = 0.0;
    for ev in scroll_events.read() {
        scroll_accum += match ev.unit {
            MouseScrollUnit::Line => ev.y * 1.0,
            MouseScrollUnit::Pixel => ev.y * 0.05,
        };
    }
    if scroll_accum.abs() > f32::EPSILON {
        let radius = orbit.radius() - scroll_accum * orbit.radius() * 0.1;
        orbit.set_radius(radius);
    }

    if orbit.auto_rotate && !dragging {
        let azimuth = orbit.azimuthal_angle() + AUTO_ROTATE_RATE * time.delta_secs();
        orbit.set_azimuthal_angle(azimuth);
    }

    let target_pos = orbit.position();
    let target_rot = Transform::from_translation(target_pos)
        .looking_at(orbit.focus, Vec3::Y)
        .rotation;

    let lerp_speed = (SMOOTHING_RATE * time.delta_secs()).min(1.0);
    camera_transform.translation = camera_transform.translation.lerp(target_pos, lerp_speed);
    camera_transform.rotation = camera_transform.rotation.slerp(target_rot, lerp_speed);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polar_angle_is_clamped_away_from_the_poles() {
        let mut orbit = OrbitCamera::default();
        orbit.set_polar_angle(-3.0);
        assert_eq!(orbit.polar_angle(), POLAR_MARGIN);
        orbit.set_polar_angle(10.0);
        assert_eq!(orbit.polar_angle(), PI - POLAR_MARGIN);
    }

    #[test]
    fn radius_is_clamped_to_the_dolly_range() {
        let mut orbit = OrbitCamera::default();
        orbit.set_radius(1.0);
        assert_eq!(orbit.radius(), MIN_DISTANCE);
        orbit.set_radius(100.0);
        assert_eq!(orbit.radius(), MAX_DISTANCE);
    }

    #[test]
    fn default_view_sits_on_the_z_axis_at_full_distance() {
        let orbit = OrbitCamera::default();
        assert!((orbit.position() - Vec3::new(0.0, 0.0, 25.0)).length() < 1e-4);
        assert!(((orbit.position() - orbit.focus).length() - orbit.radius()).abs() < 1e-4);
    }

    #[test]
    fn azimuth_is_unclamped_for_continuous_orbiting() {
        let mut orbit = OrbitCamera::default();
        orbit.set_azimuthal_angle(17.0);
        assert_eq!(orbit.azimuthal_angle(), 17.0);
    }
}
