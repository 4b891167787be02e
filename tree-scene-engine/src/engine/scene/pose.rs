use bevy::math::EulerRot;
use bevy::prelude::*;

use super::layout::{GroupKind, ParticleRecord};

const NEEDLE_FLOAT_AMPLITUDE: f32 = 0.02;
/// 0.01 rad per frame at 60 fps, expressed as a rate.
const NEEDLE_DRIFT_RATE: f32 = 0.6;
/// Above this factor the needles are considered settled: no float, no drift.
const NEEDLE_SETTLE_FACTOR: f32 = 0.9;
const ORNAMENT_SPIN_RATE: f32 = 0.6;
const GIFT_SPIN_RATE: f32 = 0.1;
const GIFT_WOBBLE_RATE: f32 = 0.5;
const GIFT_WOBBLE_AMPLITUDE: f32 = 0.05;
const RIBBON_SWIRL_RATE: f32 = 0.5;
const RIBBON_SWIRL_THRESHOLD: f32 = 0.5;
const RIBBON_BOB_AMPLITUDE: f32 = 0.1;
const RIBBON_PULSE_AMPLITUDE: f32 = 0.3;

/// One rendered transform, synthesized fresh every frame from the static
/// record, the blend factor and the elapsed time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: f32,
}

/// Synthesize the current pose of particle `index` of a group. Pure: the
/// same inputs always produce the same pose, which is what keeps
/// index-keyed phase offsets coherent frame to frame.
pub fn particle_pose(
    kind: GroupKind,
    record: &ParticleRecord,
    index: usize,
    factor: f32,
    time: f32,
) -> Pose {
    match kind {
        GroupKind::Needles => needle_pose(record, factor, time),
        GroupKind::Ornaments => ornament_pose(record, factor, time),
        GroupKind::Gifts => gift_pose(record, factor, time),
        GroupKind::Ribbon => ribbon_pose(record, index, factor, time),
    }
}

/// Needles float gently until they settle into the tree, then snap to
/// their static orientation. Scale eases from 80% to 100% of base.
fn needle_pose(record: &ParticleRecord, factor: f32, time: f32) -> Pose {
    let mut position = record
        .scatter_position
        .lerp(record.tree_position, factor);
    let mut drift = 0.0;
    if factor < NEEDLE_SETTLE_FACTOR {
        // Phase keyed by scatter X so neighbours do not bob in unison.
        position.y += (time + record.scatter_position.x).sin()
            * NEEDLE_FLOAT_AMPLITUDE
            * (1.0 - factor);
        drift = time * NEEDLE_DRIFT_RATE * (1.0 - factor);
    }
    Pose {
        position,
        rotation: euler_rotation(record.rotation + Vec3::new(drift, 0.0, 0.0)),
        scale: record.scale * (0.8 + 0.2 * factor),
    }
}

/// Ornaments spin slowly about Y regardless of the blend factor.
fn ornament_pose(record: &ParticleRecord, factor: f32, time: f32) -> Pose {
    Pose {
        position: record
            .scatter_position
            .lerp(record.tree_position, factor),
        rotation: euler_rotation(
            record.rotation + Vec3::new(0.0, time * ORNAMENT_SPIN_RATE, 0.0),
        ),
        scale: record.scale * (0.5 + 0.5 * factor),
    }
}

/// Gifts turn slowly and wobble about Z while growing as they land.
fn gift_pose(record: &ParticleRecord, factor: f32, time: f32) -> Pose {
    let spin = Vec3::new(
        0.0,
        time * GIFT_SPIN_RATE,
        (time * GIFT_WOBBLE_RATE).sin() * GIFT_WOBBLE_AMPLITUDE,
    );
    Pose {
        position: record
            .scatter_position
            .lerp(record.tree_position, factor),
        rotation: euler_rotation(record.rotation + spin),
        scale: record.scale * (0.6 + 0.4 * factor),
    }
}

/// Once the ribbon is mostly assembled it revolves around the trunk, bobs
/// per particle and pulses in size.
fn ribbon_pose(record: &ParticleRecord, index: usize, factor: f32, time: f32) -> Pose {
    let mut position = record
        .scatter_position
        .lerp(record.tree_position, factor);
    if factor > RIBBON_SWIRL_THRESHOLD {
        // The swirl angle is recomputed from the already-lerped Cartesian
        // point on purpose; interpolating polar coordinates instead
        // changes the look. atan2(0, 0) is 0, so the axis degenerates
        // quietly.
        let radius = Vec2::new(position.x, position.z).length();
        let angle = position.z.atan2(position.x) + time * RIBBON_SWIRL_RATE;
        position.x = angle.cos() * radius;
        position.z = angle.sin() * radius;
        position.y += (time * 2.0 + index as f32).sin() * RIBBON_BOB_AMPLITUDE;
    }
    let pulse = 1.0 + (time * 3.0 + index as f32).sin() * RIBBON_PULSE_AMPLITUDE;
    Pose {
        position,
        rotation: Quat::IDENTITY,
        scale: record.scale * pulse,
    }
}

fn euler_rotation(euler: Vec3) -> Quat {
    Quat::from_euler(EulerRot::XYZ, euler.x, euler.y, euler.z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::scene::blend::SceneBlendState;
    use crate::engine::scene::layout::{GiftColor, generate};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn record(scatter: Vec3, tree: Vec3) -> ParticleRecord {
        ParticleRecord {
            scatter_position: scatter,
            tree_position: tree,
            rotation: Vec3::new(0.3, 1.1, 2.0),
            scale: 0.7,
            color: Some(GiftColor::Crimson),
        }
    }

    #[test]
    fn needles_rest_at_scatter_when_factor_is_zero() {
        let rec = record(Vec3::new(3.0, -1.0, 2.0), Vec3::new(0.0, 5.0, 0.0));
        let pose = particle_pose(GroupKind::Needles, &rec, 0, 0.0, 1.7);
        // The float term only touches Y; X and Z are exact.
        assert_eq!(pose.position.x, rec.scatter_position.x);
        assert_eq!(pose.position.z, rec.scatter_position.z);
        assert!((pose.position.y - rec.scatter_position.y).abs() <= NEEDLE_FLOAT_AMPLITUDE + 1e-6);
        assert!((pose.scale - rec.scale * 0.8).abs() < 1e-6);
    }

    #[test]
    fn needles_settle_exactly_on_tree_position_at_factor_one() {
        let rec = record(Vec3::new(3.0, -1.0, 2.0), Vec3::new(0.4, 5.0, -0.3));
        let pose = particle_pose(GroupKind::Needles, &rec, 0, 1.0, 123.456);
        assert!((pose.position - rec.tree_position).length() < 1e-5);
        // Drift is gated off: orientation is the static record rotation.
        let expected =
            Quat::from_euler(EulerRot::XYZ, rec.rotation.x, rec.rotation.y, rec.rotation.z);
        assert!(pose.rotation.angle_between(expected) < 1e-5);
        assert!((pose.scale - rec.scale).abs() < 1e-6);
    }

    #[test]
    fn ornaments_lerp_exactly_and_spin_continuously() {
        let rec = ParticleRecord {
            rotation: Vec3::ZERO,
            scale: 1.0,
            color: None,
            ..record(Vec3::new(-2.0, 1.0, 4.0), Vec3::new(1.0, -3.0, 2.0))
        };
        let at_zero = particle_pose(GroupKind::Ornaments, &rec, 0, 0.0, 2.0);
        assert_eq!(at_zero.position, rec.scatter_position);
        assert!((at_zero.scale - 0.5).abs() < 1e-6);

        let at_one = particle_pose(GroupKind::Ornaments, &rec, 0, 1.0, 2.0);
        assert!((at_one.position - rec.tree_position).length() < 1e-5);
        assert!((at_one.scale - 1.0).abs() < 1e-6);

        // Spin is independent of the factor and advances with time.
        let later = particle_pose(GroupKind::Ornaments, &rec, 0, 1.0, 3.0);
        let expected = Quat::from_rotation_y(3.0 * 0.6);
        assert!(later.rotation.angle_between(expected) < 1e-5);
        assert!(at_one.rotation.angle_between(later.rotation) > 0.1);
    }

    #[test]
    fn gifts_spin_and_wobble_over_the_static_rotation() {
        let rec = record(Vec3::ZERO, Vec3::new(2.0, -5.0, 1.0));
        let time = 4.0;
        let pose = particle_pose(GroupKind::Gifts, &rec, 0, 1.0, time);
        assert!((pose.position - rec.tree_position).length() < 1e-5);
        let expected = Quat::from_euler(
            EulerRot::XYZ,
            rec.rotation.x,
            rec.rotation.y + time * 0.1,
            rec.rotation.z + (time * 0.5).sin() * 0.05,
        );
        assert!(pose.rotation.angle_between(expected) < 1e-5);
        assert!((pose.scale - rec.scale).abs() < 1e-6);
    }

    #[test]
    fn ribbon_below_threshold_is_a_plain_lerp_with_pulsing_scale() {
        let rec = ParticleRecord {
            rotation: Vec3::ZERO,
            scale: 0.3,
            color: None,
            ..record(Vec3::new(10.0, 2.0, -4.0), Vec3::new(1.2, 8.0, 0.0))
        };
        let index = 5;
        let time = 1.5;
        let pose = particle_pose(GroupKind::Ribbon, &rec, index, 0.4, time);
        assert_eq!(
            pose.position,
            rec.scatter_position.lerp(rec.tree_position, 0.4)
        );
        let pulse = 1.0 + (time * 3.0 + index as f32).sin() * 0.3;
        assert!((pose.scale - rec.scale * pulse).abs() < 1e-6);
    }

    #[test]
    fn ribbon_swirl_preserves_radius_and_offsets_angle() {
        let rec = ParticleRecord {
            rotation: Vec3::ZERO,
            scale: 0.3,
            color: None,
            ..record(Vec3::new(10.0, 2.0, -4.0), Vec3::new(3.0, -2.0, 4.0))
        };
        let index = 2;
        let time = 2.0;
        let pose = particle_pose(GroupKind::Ribbon, &rec, index, 1.0, time);

        let tree_radius = Vec2::new(rec.tree_position.x, rec.tree_position.z).length();
        let pose_radius = Vec2::new(pose.position.x, pose.position.z).length();
        assert!((pose_radius - tree_radius).abs() < 1e-4);

        let tree_angle = rec.tree_position.z.atan2(rec.tree_position.x);
        let pose_angle = pose.position.z.atan2(pose.position.x);
        let mut offset = pose_angle - tree_angle;
        while offset < 0.0 {
            offset += std::f32::consts::TAU;
        }
        assert!((offset - time * 0.5).abs() < 1e-4);

        let bob = (time * 2.0 + index as f32).sin() * 0.1;
        assert!((pose.position.y - (rec.tree_position.y + bob)).abs() < 1e-5);
    }

    #[test]
    fn scattered_needles_converge_onto_the_tree() {
        // Drive the scheduler from scattered to assembled over simulated
        // 16 ms frames, then check particle 0 landed on its tree slot.
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let needles = generate(GroupKind::Needles, 3000, &mut rng);
        assert_eq!(needles.len(), 3000);

        let mut blend = SceneBlendState::default();
        blend.set_target(0.0);
        for _ in 0..400 {
            blend.advance(0.016);
        }
        assert!(blend.factor() < 0.01);

        blend.set_target(1.0);
        let mut elapsed = 0.0;
        let mut frames = 0;
        while blend.factor() <= 0.99 {
            blend.advance(0.016);
            elapsed += 0.016;
            frames += 1;
            assert!(frames < 1000, "factor failed to converge");
        }

        let pose = particle_pose(
            GroupKind::Needles,
            &needles[0],
            0,
            blend.factor(),
            elapsed,
        );
        assert!(
            (pose.position - needles[0].tree_position).length() < 0.5,
            "landed at {:?}, expected {:?}",
            pose.position,
            needles[0].tree_position
        );
    }
}
