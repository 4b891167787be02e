use bevy::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::blend::SceneBlendState;
use super::layout::{self, GiftColor, GroupKind, ParticleRecord};
use super::pose::particle_pose;

pub const NEEDLE_COUNT: usize = 3000;
pub const ORNAMENT_COUNT: usize = 120;
pub const GIFT_COUNT: usize = 80;
pub const RIBBON_COUNT: usize = 400;

/// Immutable per-particle records for every group, generated once at scene
/// start. The single source for the pose synthesizer.
#[derive(Resource)]
pub struct ParticleSets {
    needles: Vec<ParticleRecord>,
    ornaments: Vec<ParticleRecord>,
    gifts: Vec<ParticleRecord>,
    ribbon: Vec<ParticleRecord>,
}

impl ParticleSets {
    pub fn generate(rng: &mut impl Rng) -> Self {
        Self {
            needles: layout::generate(GroupKind::Needles, NEEDLE_COUNT, rng),
            ornaments: layout::generate(GroupKind::Ornaments, ORNAMENT_COUNT, rng),
            gifts: layout::generate(GroupKind::Gifts, GIFT_COUNT, rng),
            ribbon: layout::generate(GroupKind::Ribbon, RIBBON_COUNT, rng),
        }
    }

    pub fn records(&self, kind: GroupKind) -> &[ParticleRecord] {
        match kind {
            GroupKind::Needles => &self.needles,
            GroupKind::Ornaments => &self.ornaments,
            GroupKind::Gifts => &self.gifts,
            GroupKind::Ribbon => &self.ribbon,
        }
    }
}

/// Stable render slot: a group and an index into that group's records.
/// The index never changes for the lifetime of the entity.
#[derive(Component, Debug, Clone, Copy)]
pub struct Particle {
    pub group: GroupKind,
    pub index: usize,
}

/// Generate all particle records and spawn one instance entity per record,
/// resting in the scatter pose.
pub fn setup_tree_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let mut rng = ChaCha8Rng::from_entropy();
    let sets = ParticleSets::generate(&mut rng);

    // Needle facets: a small regular tetrahedron, circumradius 0.2.
    let a = 0.2 / 3.0f32.sqrt();
    let needle_mesh = meshes.add(Tetrahedron::new(
        Vec3::new(a, a, a),
        Vec3::new(a, -a, -a),
        Vec3::new(-a, a, -a),
        Vec3::new(-a, -a, a),
    ));
    let ornament_mesh = meshes.add(Sphere::new(0.3));
    let gift_mesh = meshes.add(Cuboid::new(0.5, 0.5, 0.5));
    let ribbon_mesh = meshes.add(Sphere::new(0.15));

    let needle_material = materials.add(StandardMaterial {
        base_color: Color::srgb_u8(0x02, 0x40, 0x20),
        emissive: Color::srgb_u8(0x00, 0x1a, 0x0d).to_linear() * 0.2,
        perceptual_roughness: 0.6,
        metallic: 0.4,
        ..default()
    });
    let ornament_material = materials.add(StandardMaterial {
        base_color: Color::srgb_u8(0xff, 0xd7, 0x00),
        emissive: Color::srgb_u8(0xb8, 0x86, 0x0b).to_linear() * 0.5,
        perceptual_roughness: 0.1,
        metallic: 1.0,
        ..default()
    });
    let gift_crimson = materials.add(StandardMaterial {
        base_color: Color::srgb_u8(0x8a, 0x00, 0x00),
        perceptual_roughness: 0.2,
        metallic: 0.8,
        ..default()
    });
    let gift_gold = materials.add(StandardMaterial {
        base_color: Color::srgb_u8(0xff, 0xd7, 0x00),
        perceptual_roughness: 0.2,
        metallic: 0.8,
        ..default()
    });
    let ribbon_material = materials.add(StandardMaterial {
        base_color: Color::srgb_u8(0xff, 0xfb, 0xd0),
        emissive: Color::srgb_u8(0xff, 0xfb, 0xd0).to_linear() * 2.0,
        ..default()
    });

    spawn_group(
        &mut commands,
        GroupKind::Needles,
        sets.records(GroupKind::Needles),
        &needle_mesh,
        |_| needle_material.clone(),
    );
    spawn_group(
        &mut commands,
        GroupKind::Ornaments,
        sets.records(GroupKind::Ornaments),
        &ornament_mesh,
        |_| ornament_material.clone(),
    );
    // Gift color is fixed at generation; it picks one of two shared
    // materials here and never changes again.
    spawn_group(
        &mut commands,
        GroupKind::Gifts,
        sets.records(GroupKind::Gifts),
        &gift_mesh,
        |record| match record.color {
            Some(GiftColor::Gold) => gift_gold.clone(),
            _ => gift_crimson.clone(),
        },
    );
    spawn_group(
        &mut commands,
        GroupKind::Ribbon,
        sets.records(GroupKind::Ribbon),
        &ribbon_mesh,
        |_| ribbon_material.clone(),
    );

    info!(
        "Tree scene spawned: {} needles, {} ornaments, {} gifts, {} ribbon lights",
        NEEDLE_COUNT, ORNAMENT_COUNT, GIFT_COUNT, RIBBON_COUNT
    );

    commands.insert_resource(sets);
}

fn spawn_group(
    commands: &mut Commands,
    group: GroupKind,
    records: &[ParticleRecord],
    mesh: &Handle<Mesh>,
    material_for: impl Fn(&ParticleRecord) -> Handle<StandardMaterial>,
) {
    for (index, record) in records.iter().enumerate() {
        let pose = particle_pose(group, record, index, 0.0, 0.0);
        commands.spawn((
            Mesh3d(mesh.clone()),
            MeshMaterial3d(material_for(record)),
            Transform {
                translation: pose.position,
                rotation: pose.rotation,
                scale: Vec3::splat(pose.scale),
            },
            Particle { group, index },
        ));
    }
}

/// Per-frame pose synthesis: every particle's transform is recomputed from
/// its record, the current blend factor and the elapsed time, and written
/// to its render slot.
pub fn update_particle_poses(
    sets: Res<ParticleSets>,
    blend: Res<SceneBlendState>,
    time: Res<Time>,
    mut particles: Query<(&Particle, &mut Transform)>,
) {
    let factor = blend.factor();
    let elapsed = time.elapsed_secs();
    for (particle, mut transform) in &mut particles {
        let records = sets.records(particle.group);
        let Some(record) = records.get(particle.index) else {
            continue;
        };
        let pose = particle_pose(particle.group, record, particle.index, factor, elapsed);
        transform.translation = pose.position;
        transform.rotation = pose.rotation;
        transform.scale = Vec3::splat(pose.scale);
    }
}
