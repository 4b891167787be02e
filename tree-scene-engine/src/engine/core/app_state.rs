use bevy::prelude::*;

use crate::gesture::bridge::TrackerNotifications;

/// Discrete scene state, toggled by the UI button, the keyboard, or a
/// recognized gesture.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, States)]
pub enum TreeState {
    #[default]
    TreeShape,
    Scattered,
}

impl TreeState {
    pub fn toggled(self) -> Self {
        match self {
            Self::TreeShape => Self::Scattered,
            Self::Scattered => Self::TreeShape,
        }
    }

    /// Blend target the scheduler approaches in this state.
    pub fn blend_target(self) -> f32 {
        match self {
            Self::TreeShape => 1.0,
            Self::Scattered => 0.0,
        }
    }

    /// Identifier used in notifications to the embedding page.
    pub fn label(self) -> &'static str {
        match self {
            Self::TreeShape => "tree_shape",
            Self::Scattered => "scattered",
        }
    }
}

/// Keyboard fallback: Space toggles between assembling and scattering.
pub fn keyboard_state_toggle(
    keyboard: Res<ButtonInput<KeyCode>>,
    state: Res<State<TreeState>>,
    mut next_state: ResMut<NextState<TreeState>>,
) {
    if keyboard.just_pressed(KeyCode::Space) {
        next_state.set(state.get().toggled());
    }
}

/// Log state transitions and forward them to the embedding page.
pub fn notify_state_changes(
    state: Res<State<TreeState>>,
    mut notifications: ResMut<TrackerNotifications>,
) {
    if state.is_changed() && !state.is_added() {
        info!("Tree state changed: {}", state.get().label());
        notifications.send(
            "tree_state_changed",
            serde_json::json!({ "state": state.get().label() }),
        );
    }
}
