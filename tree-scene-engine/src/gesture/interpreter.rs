use bevy::prelude::*;

use crate::engine::core::app_state::TreeState;

/// Hand-position delta to camera-angle scaling.
pub const DRAG_SENSITIVITY: f32 = 5.0;
/// Minimum seconds between accepted discrete gesture transitions.
pub const GESTURE_COOLDOWN: f32 = 1.0;

/// Landmark indices of the hand model (wrist and middle-finger base).
pub const WRIST: usize = 0;
pub const MIDDLE_MCP: usize = 9;

/// Closed gesture vocabulary. Anything the recognizer reports outside of
/// it collapses to `Other`, which behaves like an open hand at rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureLabel {
    ClosedFist,
    OpenPalm,
    Victory,
    Other,
}

impl GestureLabel {
    pub fn from_label(label: &str) -> Self {
        match label {
            "Closed_Fist" => Self::ClosedFist,
            "Open_Palm" => Self::OpenPalm,
            "Victory" => Self::Victory,
            _ => Self::Other,
        }
    }
}

/// One normalized inference result for a camera frame with a visible hand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureFrame {
    pub label: GestureLabel,
    pub hand_center: Vec2,
}

/// Midpoint of wrist and middle-finger base, with X mirrored so dragging
/// feels natural against the mirrored self-view.
pub fn hand_center(landmarks: &[Vec2]) -> Option<Vec2> {
    let wrist = landmarks.get(WRIST)?;
    let middle = landmarks.get(MIDDLE_MCP)?;
    Some(Vec2::new(
        1.0 - (wrist.x + middle.x) / 2.0,
        (wrist.y + middle.y) / 2.0,
    ))
}

/// What one interpreted frame asks of the rest of the app.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct GestureOutput {
    /// (azimuth, polar) deltas to add to the orbit camera.
    pub orbit_delta: Option<Vec2>,
    /// Discrete scene-state request, already debounced.
    pub requested_state: Option<TreeState>,
}

/// Gesture-to-control state machine. Fed once per distinct camera frame;
/// owns the drag anchor and the transition debounce, nothing else.
#[derive(Resource, Debug, Default)]
pub struct GestureInterpreter {
    dragging: bool,
    last_hand_pos: Option<Vec2>,
    debounce: f32,
}

impl GestureInterpreter {
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Consume one inference result. `None` means no hand was detected,
    /// which ends any drag but is not an error.
    pub fn update(&mut self, frame: Option<&GestureFrame>, delta_seconds: f32) -> GestureOutput {
        let mut output = GestureOutput::default();

        let Some(frame) = frame else {
            self.end_drag();
            self.debounce = (self.debounce - delta_seconds).max(0.0);
            return output;
        };

        // Drag: a closed fist grabs the view. The first fist frame only
        // records the anchor; subsequent ones emit deltas and re-anchor.
        if frame.label == GestureLabel::ClosedFist {
            if self.dragging {
                if let Some(anchor) = self.last_hand_pos {
                    output.orbit_delta =
                        Some(-(frame.hand_center - anchor) * DRAG_SENSITIVITY);
                }
            } else {
                self.dragging = true;
            }
            self.last_hand_pos = Some(frame.hand_center);
        } else {
            self.end_drag();
        }

        // Discrete transitions, independent of the drag state.
        if self.debounce <= 0.0 {
            match frame.label {
                GestureLabel::OpenPalm => {
                    output.requested_state = Some(TreeState::Scattered);
                    self.debounce = GESTURE_COOLDOWN;
                }
                GestureLabel::Victory => {
                    output.requested_state = Some(TreeState::TreeShape);
                    self.debounce = GESTURE_COOLDOWN;
                }
                GestureLabel::ClosedFist | GestureLabel::Other => {}
            }
        } else {
            self.debounce -= delta_seconds;
        }

        output
    }

    fn end_drag(&mut self) {
        self.dragging = false;
        self.last_hand_pos = None;
    }
}
