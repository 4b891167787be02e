use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::engine::camera::orbit_camera::OrbitCamera;
use crate::engine::core::app_state::TreeState;
use crate::gesture::interpreter::{
    GestureFrame, GestureInterpreter, GestureLabel, hand_center,
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use web_sys::{MessageEvent, window};

/// Message posted into the app by the page-side hand-tracking pipeline.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TrackerMessage {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Notification posted back to the embedding page.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TrackerNotification {
    pub jsonrpc: String,
    pub method: String,
    pub params: serde_json::Value,
}

#[derive(Deserialize, Debug, Clone, Copy)]
pub struct LandmarkDto {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

/// Payload of a `gesture_frame` message. A missing gesture or an empty
/// landmark list is a valid "no hand" frame, not an error.
#[derive(Deserialize, Debug, Clone)]
pub struct GestureFrameParams {
    #[serde(default)]
    pub gesture: Option<String>,
    #[serde(default)]
    pub landmarks: Vec<LandmarkDto>,
    pub timestamp: f64,
}

/// Readiness and stale-frame tracking for the inference pipeline. If the
/// page never reports ready (camera denied, model fetch failed), the
/// interpreter is simply skipped every frame and pointer input remains.
#[derive(Resource, Debug)]
pub struct GesturePipeline {
    ready: bool,
    last_timestamp: f64,
}

impl Default for GesturePipeline {
    fn default() -> Self {
        Self {
            ready: false,
            last_timestamp: -1.0,
        }
    }
}

impl GesturePipeline {
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn set_ready(&mut self) {
        self.ready = true;
    }

    /// True exactly once per distinct camera frame; repeated or older
    /// timestamps are dropped so inference results are never replayed.
    pub fn accept_timestamp(&mut self, timestamp: f64) -> bool {
        if timestamp <= self.last_timestamp {
            return false;
        }
        self.last_timestamp = timestamp;
        true
    }
}

/// Outgoing notification queue, drained to the parent window once per
/// frame.
#[derive(Resource, Default)]
pub struct TrackerNotifications {
    queue: Vec<TrackerNotification>,
}

impl TrackerNotifications {
    pub fn send(&mut self, method: &str, params: serde_json::Value) {
        self.queue.push(TrackerNotification {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
        });
    }
}

/// One interpreted camera frame; `None` means a frame with no hand.
#[derive(Event)]
pub struct HandFrameEvent {
    pub frame: Option<GestureFrame>,
}

/// Plugin wiring the page-side hand tracker into the scene: a message
/// listener feeds a queue, a drain system turns messages into hand-frame
/// events, and the apply system runs the interpreter over them.
pub struct GestureBridgePlugin;

impl Plugin for GestureBridgePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GesturePipeline>()
            .init_resource::<GestureInterpreter>()
            .init_resource::<TrackerNotifications>()
            .add_event::<HandFrameEvent>()
            .add_systems(
                Update,
                (
                    drain_tracker_messages,
                    apply_gesture_frames,
                    send_outgoing_notifications,
                )
                    .chain(),
            );

        #[cfg(target_arch = "wasm32")]
        app.add_systems(Startup, setup_message_listener);
    }
}

#[cfg(target_arch = "wasm32")]
fn setup_message_listener(mut commands: Commands) {
    use std::sync::{Arc, Mutex};

    let message_queue: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let queue_clone = message_queue.clone();

    let closure = Closure::wrap(Box::new(move |event: MessageEvent| {
        if let Ok(data) = event.data().dyn_into::<js_sys::JsString>() {
            let message_str: String = data.into();
            if message_str.contains("jsonrpc") {
                if let Ok(mut queue) = queue_clone.lock() {
                    queue.push(message_str);
                }
            }
        }
    }) as Box<dyn FnMut(MessageEvent)>);

    if let Some(window) = window() {
        if let Err(e) =
            window.add_event_listener_with_callback("message", closure.as_ref().unchecked_ref())
        {
            warn!("Failed to register tracker message listener: {:?}", e);
        }
    }

    // The closure stays alive for the page lifetime; JS owns it from here.
    closure.forget();
    commands.insert_resource(TrackerMessageQueue(message_queue));
}

/// Thread-safe queue the WASM message listener pushes into. Absent on
/// native targets, where the pipeline never becomes ready.
#[derive(Resource)]
pub struct TrackerMessageQueue(pub std::sync::Arc<std::sync::Mutex<Vec<String>>>);

/// Drain raw tracker messages and emit hand-frame events for every new
/// camera frame. Parse failures skip the message; they never propagate.
pub fn drain_tracker_messages(
    message_queue: Option<Res<TrackerMessageQueue>>,
    mut pipeline: ResMut<GesturePipeline>,
    mut frames: EventWriter<HandFrameEvent>,
) {
    let Some(queue_res) = message_queue else {
        return;
    };

    let messages = if let Ok(mut queue) = queue_res.0.lock() {
        std::mem::take(&mut *queue)
    } else {
        Vec::new()
    };

    for message_str in messages {
        let message = match serde_json::from_str::<TrackerMessage>(&message_str) {
            Ok(message) => message,
            Err(parse_error) => {
                warn!("Ignoring malformed tracker message: {}", parse_error);
                continue;
            }
        };

        match message.method.as_str() {
            "gesture_ready" => {
                pipeline.set_ready();
                info!("Hand-tracking pipeline ready, gestures enabled");
            }
            "gesture_error" => {
                // Init failure disables gestures for good; the scene and
                // pointer input carry on.
                warn!("Hand-tracking pipeline failed: {}", message.params);
            }
            "gesture_frame" => {
                if !pipeline.is_ready() {
                    continue;
                }
                match serde_json::from_value::<GestureFrameParams>(message.params) {
                    Ok(params) => {
                        if !pipeline.accept_timestamp(params.timestamp) {
                            continue; // stale camera frame
                        }
                        frames.write(HandFrameEvent {
                            frame: frame_from_params(&params),
                        });
                    }
                    Err(parse_error) => {
                        warn!("Skipping unreadable gesture frame: {}", parse_error);
                    }
                }
            }
            other => {
                warn!("Unknown tracker method: {}", other);
            }
        }
    }
}

/// Normalize one frame payload. Anything short of a gesture plus enough
/// landmarks for a hand center counts as "no hand".
fn frame_from_params(params: &GestureFrameParams) -> Option<GestureFrame> {
    let gesture = params.gesture.as_deref()?;
    let landmarks: Vec<Vec2> = params
        .landmarks
        .iter()
        .map(|landmark| Vec2::new(landmark.x, landmark.y))
        .collect();
    let hand_center = hand_center(&landmarks)?;
    Some(GestureFrame {
        label: GestureLabel::from_label(gesture),
        hand_center,
    })
}

/// Run the interpreter over this tick's hand frames and apply its outputs:
/// orbit deltas to the camera, debounced state requests to the scene.
pub fn apply_gesture_frames(
    mut events: EventReader<HandFrameEvent>,
    mut interpreter: ResMut<GestureInterpreter>,
    mut orbit: ResMut<OrbitCamera>,
    state: Res<State<TreeState>>,
    mut next_state: ResMut<NextState<TreeState>>,
    time: Res<Time>,
) {
    for event in events.read() {
        let output = interpreter.update(event.frame.as_ref(), time.delta_secs());

        if let Some(delta) = output.orbit_delta {
            let azimuth = orbit.azimuthal_angle() + delta.x;
            let polar = orbit.polar_angle() + delta.y;
            orbit.set_azimuthal_angle(azimuth);
            orbit.set_polar_angle(polar);
        }

        if let Some(requested) = output.requested_state {
            if requested != *state.get() {
                next_state.set(requested);
            }
        }
    }
}

/// Post queued notifications to the parent window.
pub fn send_outgoing_notifications(mut notifications: ResMut<TrackerNotifications>) {
    for notification in notifications.queue.drain(..) {
        send_message_to_parent(&notification);
    }
}

fn send_message_to_parent<T: Serialize>(message: &T) {
    #[cfg(target_arch = "wasm32")]
    {
        match serde_json::to_string(message) {
            Ok(json) => {
                if let Some(window) = window() {
                    if let Some(parent) = window.parent().ok().flatten() {
                        if let Err(e) = parent.post_message(&JsValue::from_str(&json), "*") {
                            error!("Failed to send message to parent: {:?}", e);
                        }
                    } else {
                        warn!("No parent window available for message transmission");
                    }
                } else {
                    error!("Window object not available");
                }
            }
            Err(e) => {
                error!("Failed to serialize message: {}", e);
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = message;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gesture_frame_message_round_trips_into_a_hand_frame() {
        let json = r#"{
            "jsonrpc": "2.0",
            "method": "gesture_frame",
            "params": {
                "gesture": "Closed_Fist",
                "landmarks": [
                    {"x": 0.2, "y": 0.4}, {"x": 0.0, "y": 0.0}, {"x": 0.0, "y": 0.0},
                    {"x": 0.0, "y": 0.0}, {"x": 0.0, "y": 0.0}, {"x": 0.0, "y": 0.0},
                    {"x": 0.0, "y": 0.0}, {"x": 0.0, "y": 0.0}, {"x": 0.0, "y": 0.0},
                    {"x": 0.4, "y": 0.6, "z": 0.1}
                ],
                "timestamp": 1234.5
            }
        }"#;
        let message: TrackerMessage = serde_json::from_str(json).unwrap();
        assert_eq!(message.method, "gesture_frame");

        let params: GestureFrameParams = serde_json::from_value(message.params).unwrap();
        let frame = frame_from_params(&params).unwrap();
        assert_eq!(frame.label, GestureLabel::ClosedFist);
        assert!((frame.hand_center - Vec2::new(0.7, 0.5)).length() < 1e-6);
    }

    #[test]
    fn missing_gesture_or_landmarks_means_no_hand() {
        let no_gesture = GestureFrameParams {
            gesture: None,
            landmarks: vec![],
            timestamp: 1.0,
        };
        assert!(frame_from_params(&no_gesture).is_none());

        let too_few_landmarks = GestureFrameParams {
            gesture: Some("Victory".to_string()),
            landmarks: vec![LandmarkDto { x: 0.1, y: 0.1, z: 0.0 }],
            timestamp: 1.0,
        };
        assert!(frame_from_params(&too_few_landmarks).is_none());
    }

    #[test]
    fn stale_timestamps_are_dropped() {
        let mut pipeline = GesturePipeline::default();
        assert!(pipeline.accept_timestamp(100.0));
        assert!(!pipeline.accept_timestamp(100.0));
        assert!(!pipeline.accept_timestamp(50.0));
        assert!(pipeline.accept_timestamp(100.1));
    }

    #[test]
    fn pipeline_starts_disabled() {
        let pipeline = GesturePipeline::default();
        assert!(!pipeline.is_ready());
    }

    #[test]
    fn unrecognized_recognizer_labels_still_form_a_frame() {
        let params = GestureFrameParams {
            gesture: Some("ILoveYou".to_string()),
            landmarks: (0..21)
                .map(|i| LandmarkDto {
                    x: i as f32 * 0.01,
                    y: 0.5,
                    z: 0.0,
                })
                .collect(),
            timestamp: 2.0,
        };
        let frame = frame_from_params(&params).unwrap();
        assert_eq!(frame.label, GestureLabel::Other);
    }
}
