use bevy::diagnostic::FrameTimeDiagnosticsPlugin;
use bevy::prelude::*;

use crate::engine::camera::orbit_camera::{OrbitCamera, camera_controller};
use crate::engine::core::app_state::{
    TreeState, keyboard_state_toggle, notify_state_changes,
};
use crate::engine::core::window_config::create_window_config;
use crate::engine::scene::blend::{SceneBlendState, advance_blend_factor};
use crate::engine::scene::particles::{setup_tree_scene, update_particle_poses};
use crate::engine::systems::fps_tracking::{
    FpsText, fps_notification_system, fps_text_update_system,
};
use crate::gesture::bridge::GestureBridgePlugin;

pub fn create_app() -> App {
    let mut app = App::new();

    app.add_plugins(create_default_plugins())
        .add_plugins(FrameTimeDiagnosticsPlugin::default())
        .add_plugins(GestureBridgePlugin)
        .init_state::<TreeState>()
        .init_resource::<SceneBlendState>()
        .init_resource::<OrbitCamera>()
        .insert_resource(ClearColor(Color::srgb_u8(0x00, 0x05, 0x00)))
        .insert_resource(AmbientLight {
            color: Color::WHITE,
            brightness: 80.0,
            ..default()
        })
        .add_systems(Startup, (setup_scene, setup_tree_scene, spawn_ui))
        .add_systems(
            Update,
            (
                camera_controller,
                advance_blend_factor,
                update_particle_poses.after(advance_blend_factor),
                keyboard_state_toggle,
                handle_toggle_button,
                update_toggle_label,
                notify_state_changes,
                fps_text_update_system,
                fps_notification_system,
            ),
        );

    app
}

fn create_default_plugins() -> impl PluginGroup {
    DefaultPlugins.set(WindowPlugin {
        primary_window: Some(create_window_config()),
        ..default()
    })
}

/// Camera and lighting for the scene; the particle groups spawn in
/// `setup_tree_scene`.
fn setup_scene(mut commands: Commands, orbit: Res<OrbitCamera>) {
    commands.spawn((
        Camera3d::default(),
        Transform::from_translation(orbit.position()).looking_at(orbit.focus, Vec3::Y),
    ));

    commands.spawn((
        PointLight {
            intensity: 2_000_000.0,
            color: Color::srgb_u8(0xff, 0xf5, 0xb6),
            range: 100.0,
            shadows_enabled: false,
            ..default()
        },
        Transform::from_xyz(10.0, 10.0, 10.0),
    ));
    commands.spawn((
        PointLight {
            intensity: 600_000.0,
            color: Color::srgb_u8(0x00, 0xff, 0x00),
            range: 100.0,
            shadows_enabled: false,
            ..default()
        },
        Transform::from_xyz(-10.0, -10.0, -10.0),
    ));
    commands.spawn((
        SpotLight {
            intensity: 5_000_000.0,
            color: Color::srgb_u8(0xff, 0xd7, 0x00),
            range: 60.0,
            outer_angle: 0.5,
            shadows_enabled: false,
            ..default()
        },
        Transform::from_xyz(0.0, 20.0, 0.0).looking_at(Vec3::ZERO, Vec3::Z),
    ));
}

#[derive(Component)]
struct StateToggleButton;

#[derive(Component)]
struct ToggleButtonLabel;

fn spawn_ui(mut commands: Commands) {
    commands
        .spawn(Node {
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            ..default()
        })
        .with_children(|parent| {
            parent.spawn((
                Text::new("FPS: "),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(Color::srgb(1., 0., 0.)),
                Node {
                    position_type: PositionType::Absolute,
                    bottom: Val::Px(12.0),
                    right: Val::Px(12.0),
                    ..default()
                },
                FpsText,
            ));

            parent.spawn((
                Text::new("Fist: drag   Palm: scatter   Victory: build   [Space] toggles"),
                TextFont {
                    font_size: 13.0,
                    ..default()
                },
                TextColor(Color::srgba(1.0, 0.95, 0.6, 0.6)),
                Node {
                    position_type: PositionType::Absolute,
                    bottom: Val::Px(16.0),
                    left: Val::Px(16.0),
                    ..default()
                },
            ));

            parent
                .spawn((
                    Button,
                    Node {
                        position_type: PositionType::Absolute,
                        bottom: Val::Px(48.0),
                        left: Val::Percent(50.0),
                        padding: UiRect::axes(Val::Px(24.0), Val::Px(10.0)),
                        justify_content: JustifyContent::Center,
                        align_items: AlignItems::Center,
                        ..default()
                    },
                    BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.4)),
                    StateToggleButton,
                ))
                .with_children(|button| {
                    button.spawn((
                        Text::new("Scatter Magic"),
                        TextFont {
                            font_size: 16.0,
                            ..default()
                        },
                        TextColor(Color::srgb(1.0, 0.95, 0.7)),
                        ToggleButtonLabel,
                    ));
                });
        });
}

/// The UI control mirrors the gesture transitions: one press toggles
/// between scattering and summoning.
fn handle_toggle_button(
    interactions: Query<&Interaction, (Changed<Interaction>, With<StateToggleButton>)>,
    state: Res<State<TreeState>>,
    mut next_state: ResMut<NextState<TreeState>>,
) {
    for interaction in &interactions {
        if *interaction == Interaction::Pressed {
            next_state.set(state.get().toggled());
        }
    }
}

fn update_toggle_label(
    state: Res<State<TreeState>>,
    mut labels: Query<&mut Text, With<ToggleButtonLabel>>,
) {
    if !state.is_changed() {
        return;
    }
    let label = match state.get() {
        TreeState::TreeShape => "Scatter Magic",
        TreeState::Scattered => "Summon Tree",
    };
    for mut text in &mut labels {
        text.0 = label.to_string();
    }
}
