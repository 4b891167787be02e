use bevy::prelude::*;

use crate::engine::core::app_state::TreeState;

/// Time constant of the exponential approach. The factor covers ~98% of
/// the remaining distance in 1.2 s regardless of frame rate.
const BLEND_TIME_CONSTANT: f32 = 0.3;

/// The single animation-phase scalar of the scene: 0 = scattered,
/// 1 = assembled tree. Written once per frame by [`advance_blend_factor`],
/// read by the pose synthesizer.
#[derive(Resource, Debug, Clone, Copy)]
pub struct SceneBlendState {
    factor: f32,
    target: f32,
}

impl Default for SceneBlendState {
    fn default() -> Self {
        // Factor starts at 0 so the tree assembles on load.
        Self {
            factor: 0.0,
            target: TreeState::default().blend_target(),
        }
    }
}

impl SceneBlendState {
    pub fn factor(&self) -> f32 {
        self.factor
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn set_target(&mut self, target: f32) {
        self.target = target.clamp(0.0, 1.0);
    }

    /// Move the factor toward the target. Exponential, not linear: motion
    /// decelerates near the target and is stable under variable frame
    /// deltas. Non-positive deltas are a no-op.
    pub fn advance(&mut self, delta_seconds: f32) -> f32 {
        if delta_seconds <= 0.0 {
            return self.factor;
        }
        let k = 1.0 - (-delta_seconds / BLEND_TIME_CONSTANT).exp();
        self.factor += (self.target - self.factor) * k;
        self.factor = self.factor.clamp(0.0, 1.0);
        self.factor
    }
}

/// Per-frame scheduler: the target follows the discrete scene state.
pub fn advance_blend_factor(
    mut blend: ResMut<SceneBlendState>,
    state: Res<State<TreeState>>,
    time: Res<Time>,
) {
    blend.set_target(state.get().blend_target());
    blend.advance(time.delta_secs());
}
