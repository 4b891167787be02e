use bevy::prelude::*;
use rand::Rng;
use std::f32::consts::{PI, TAU};

/// ~2.39996 rad spreads needle slots around the trunk with no visible seams.
pub const GOLDEN_ANGLE: f32 = 2.39996;

const TREE_HEIGHT: f32 = 15.0;
const RIBBON_HEIGHT: f32 = 16.0;
const RIBBON_LOOPS: f32 = 6.0;

/// The four particle groups of the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupKind {
    Needles,
    Ornaments,
    Gifts,
    Ribbon,
}

/// Palette category for gift boxes, fixed per particle at generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GiftColor {
    Crimson,
    Gold,
}

/// Static per-particle record. Immutable after generation; render slots
/// address these by index, so the sequence is never reordered.
#[derive(Debug, Clone)]
pub struct ParticleRecord {
    /// Resting position in the disordered state.
    pub scatter_position: Vec3,
    /// Resting position in the assembled tree.
    pub tree_position: Vec3,
    /// Fixed Euler XYZ orientation (zero for rotationally symmetric groups).
    pub rotation: Vec3,
    /// Base size before any scale easing or pulsing.
    pub scale: f32,
    /// Gift palette choice; `None` for every other group.
    pub color: Option<GiftColor>,
}

/// Uniform random point inside a sphere, by volume. The cube-root radius
/// law keeps density uniform rather than piling samples near the center.
pub fn random_sphere_point(radius: f32, rng: &mut impl Rng) -> Vec3 {
    let u: f32 = rng.gen_range(0.0..1.0);
    let v: f32 = rng.gen_range(0.0..1.0);
    let theta = TAU * u;
    let phi = (2.0 * v - 1.0).acos();
    let r = radius * rng.gen_range(0.0f32..1.0).cbrt();
    let sin_phi = phi.sin();
    Vec3::new(
        r * sin_phi * theta.cos(),
        r * sin_phi * theta.sin(),
        r * phi.cos(),
    )
}

/// Generate the fixed record sequence for one group. The formulas are
/// deterministic per index; only scatter positions, jitters and rotations
/// draw from the injected random source.
pub fn generate(kind: GroupKind, count: usize, rng: &mut impl Rng) -> Vec<ParticleRecord> {
    debug_assert!(count > 0);
    match kind {
        GroupKind::Needles => generate_needles(count, rng),
        GroupKind::Ornaments => generate_ornaments(count, rng),
        GroupKind::Gifts => generate_gifts(count, rng),
        GroupKind::Ribbon => generate_ribbon(count, rng),
    }
}

/// Needles form a conical spiral: golden-angle placement, radius growing
/// from 10% to 100% of the cone toward the base, with a little jitter.
fn generate_needles(count: usize, rng: &mut impl Rng) -> Vec<ParticleRecord> {
    let max_radius = 5.0;
    (0..count)
        .map(|i| {
            let scatter_position = random_sphere_point(18.0, rng);

            let t = i as f32 / count as f32;
            let y = (0.5 - t) * TREE_HEIGHT;
            let radius_at_height = max_radius * (t * 0.9 + 0.1);
            let angle = i as f32 * GOLDEN_ANGLE;
            let r = radius_at_height + (rng.gen_range(0.0f32..1.0) - 0.5) * 0.5;

            ParticleRecord {
                scatter_position,
                tree_position: Vec3::new(angle.cos() * r, y, angle.sin() * r),
                rotation: Vec3::new(
                    rng.gen_range(0.0..PI),
                    rng.gen_range(0.0..PI),
                    rng.gen_range(0.0..PI),
                ),
                scale: 0.5 + rng.gen_range(0.0f32..1.0) * 0.5,
                color: None,
            }
        })
        .collect()
}

/// Ornaments hang on a tapered helix. The angular step of 13 rad is only
/// there to decorrelate their spread from the needles' golden angle.
fn generate_ornaments(count: usize, rng: &mut impl Rng) -> Vec<ParticleRecord> {
    let max_radius = 5.2;
    (0..count)
        .map(|i| {
            let scatter_position = random_sphere_point(20.0, rng);

            let t = i as f32 / count as f32;
            let y = (0.5 - t) * TREE_HEIGHT;
            let radius_at_height = max_radius * t;
            let angle = i as f32 * 13.0;

            ParticleRecord {
                scatter_position,
                tree_position: Vec3::new(
                    angle.cos() * radius_at_height,
                    y,
                    angle.sin() * radius_at_height,
                ),
                rotation: Vec3::ZERO,
                scale: 1.0,
                color: None,
            }
        })
        .collect()
}

/// Gifts cluster near the tree base: `sqrt` biases the height parameter
/// toward 1, which is the bottom of the cone.
fn generate_gifts(count: usize, rng: &mut impl Rng) -> Vec<ParticleRecord> {
    let max_radius = 5.5;
    (0..count)
        .map(|_| {
            let scatter_position = random_sphere_point(22.0, rng);

            let biased_t = rng.gen_range(0.0f32..1.0).sqrt();
            let y = (0.5 - biased_t) * TREE_HEIGHT;
            let radius_at_height = max_radius * biased_t;
            let angle = rng.gen_range(0.0..TAU);
            let r = radius_at_height + (rng.gen_range(0.0f32..1.0) - 0.5) * 1.0;

            ParticleRecord {
                scatter_position,
                tree_position: Vec3::new(angle.cos() * r, y, angle.sin() * r),
                rotation: Vec3::new(
                    rng.gen_range(0.0..PI),
                    rng.gen_range(0.0..PI),
                    rng.gen_range(0.0..PI),
                ),
                scale: 0.8 + rng.gen_range(0.0f32..1.0) * 0.6,
                // 60% crimson, 40% gold.
                color: Some(if rng.gen_bool(0.6) {
                    GiftColor::Crimson
                } else {
                    GiftColor::Gold
                }),
            }
        })
        .collect()
}

/// The ribbon is an explicit six-loop spiral, slightly taller and wider
/// than the tree itself.
fn generate_ribbon(count: usize, rng: &mut impl Rng) -> Vec<ParticleRecord> {
    let max_radius = 6.0;
    (0..count)
        .map(|i| {
            let scatter_position = random_sphere_point(25.0, rng);

            let t = i as f32 / count as f32;
            let y = (0.5 - t) * RIBBON_HEIGHT;
            let radius_at_height = max_radius * (t * 0.8 + 0.2);
            let angle = t * RIBBON_LOOPS * TAU;

            ParticleRecord {
                scatter_position,
                tree_position: Vec3::new(
                    angle.cos() * radius_at_height,
                    y,
                    angle.sin() * radius_at_height,
                ),
                rotation: Vec3::ZERO,
                scale: 0.2 + rng.gen_range(0.0f32..1.0) * 0.3,
                color: None,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng(seed: u64) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(seed)
    }

    #[test]
    fn generate_produces_exactly_count_records() {
        let mut r = rng(1);
        for kind in [
            GroupKind::Needles,
            GroupKind::Ornaments,
            GroupKind::Gifts,
            GroupKind::Ribbon,
        ] {
            assert_eq!(generate(kind, 37, &mut r).len(), 37);
            assert_eq!(generate(kind, 1, &mut r).len(), 1);
        }
    }

    #[test]
    fn sphere_sampling_is_uniform_by_volume() {
        let mut r = rng(2);
        let radius = 10.0;
        let n = 20_000;
        let samples: Vec<f32> = (0..n)
            .map(|_| random_sphere_point(radius, &mut r).length())
            .collect();

        // Cubic CDF: P(len <= x) = (x / radius)^3.
        for x in [5.0f32, 7.937, 9.0] {
            let expected = (x / radius).powi(3);
            let observed =
                samples.iter().filter(|&&len| len <= x).count() as f32 / n as f32;
            assert!(
                (observed - expected).abs() < 0.02,
                "CDF at {x}: observed {observed}, expected {expected}"
            );
        }

        // Guard against the surface/radius-biased bug: uniform-in-radius
        // would put half the samples inside half the radius.
        let inside_half =
            samples.iter().filter(|&&len| len <= radius / 2.0).count() as f32 / n as f32;
        assert!(inside_half < 0.2);

        for len in samples {
            assert!(len <= radius);
        }
    }

    #[test]
    fn ornament_tree_positions_are_index_stable_across_regenerations() {
        // Tree placement for ornaments has no random term, so two
        // generations with different seeds must agree index by index even
        // though scatter positions differ.
        let a = generate(GroupKind::Ornaments, 120, &mut rng(3));
        let b = generate(GroupKind::Ornaments, 120, &mut rng(4));
        for i in 0..120 {
            assert_eq!(a[i].tree_position, b[i].tree_position);
        }
        assert_ne!(a[0].scatter_position, b[0].scatter_position);
    }

    #[test]
    fn needle_cone_signature() {
        let count = 300;
        let needles = generate(GroupKind::Needles, count, &mut rng(5));
        for (i, rec) in needles.iter().enumerate() {
            let t = i as f32 / count as f32;
            assert!((rec.tree_position.y - (0.5 - t) * 15.0).abs() < 1e-4);

            // Radius within the +-0.25 jitter of the linear taper.
            let expected_r = 5.0 * (t * 0.9 + 0.1);
            let r = Vec2::new(rec.tree_position.x, rec.tree_position.z).length();
            assert!((r - expected_r).abs() <= 0.2501, "index {i}: r {r}");

            assert!(rec.scale >= 0.5 && rec.scale <= 1.0);
            assert!(rec.scatter_position.length() <= 18.0);
            assert!(rec.color.is_none());
        }

        // Golden-angle placement: angular direction matches the formula.
        let rec = &needles[7];
        let angle = 7.0 * GOLDEN_ANGLE;
        let dir = Vec2::new(angle.cos(), angle.sin());
        let actual = Vec2::new(rec.tree_position.x, rec.tree_position.z).normalize();
        assert!(dir.dot(actual) > 0.999);
    }

    #[test]
    fn gifts_are_bottom_biased_and_split_by_palette() {
        let count = 2000;
        let gifts = generate(GroupKind::Gifts, count, &mut rng(6));

        // E[sqrt(U)] = 2/3, so mean height is (0.5 - 2/3) * 15 = -2.5.
        let mean_y: f32 =
            gifts.iter().map(|g| g.tree_position.y).sum::<f32>() / count as f32;
        assert!(mean_y < -1.5, "mean y {mean_y}");

        let crimson = gifts
            .iter()
            .filter(|g| g.color == Some(GiftColor::Crimson))
            .count() as f32
            / count as f32;
        assert!((crimson - 0.6).abs() < 0.05, "crimson share {crimson}");
    }

    #[test]
    fn ribbon_spiral_signature() {
        let count = 400;
        let ribbon = generate(GroupKind::Ribbon, count, &mut rng(7));

        // Index 0 sits at angle 0: 20% of the max radius, top of the span.
        let first = ribbon[0].tree_position;
        assert!((first - Vec3::new(1.2, 8.0, 0.0)).length() < 1e-4);

        // Adjacent indices step by loops * TAU / count around the axis.
        let step = RIBBON_LOOPS * TAU / count as f32;
        let a = ribbon[10].tree_position;
        let angle = a.z.atan2(a.x);
        assert!((angle - 10.0 * step).abs() < 1e-3);

        for rec in &ribbon {
            assert_eq!(rec.rotation, Vec3::ZERO);
            assert!(rec.scale >= 0.2 && rec.scale <= 0.5);
        }
    }
}
