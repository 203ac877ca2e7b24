//! Scripted input playback
//!
//! A replay is the full input to the controller: touches, frame ticks and
//! physics contacts with their timestamps. Feeding the same script to the
//! same scene always produces the same events.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::TIME_EPSILON;
use crate::controller::{SceneEvent, TurnShotController};
use crate::host::{Contact, Host, NodeId};

/// Failure to load or play a script
#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("failed to read script: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid script json: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("timestamp {at} is earlier than {previous}")]
    OutOfOrder { at: f64, previous: f64 },
    #[error("tick step must be positive, got {0}")]
    BadStep(f64),
}

/// One input to the controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InputEvent {
    TouchDown { at: f64, x: f32, y: f32 },
    TouchMoved { at: f64, x: f32, y: f32 },
    TouchUp { at: f64, x: f32, y: f32 },
    /// Single frame at `at`
    Tick { at: f64 },
    /// Frames every `step` seconds after the previous timestamp, through `until`
    Run { until: f64, step: f64 },
    Contact { at: f64, a: u32, b: u32, impulse: f32 },
}

impl InputEvent {
    /// Timestamp the event ends at
    pub fn time(&self) -> f64 {
        match *self {
            InputEvent::TouchDown { at, .. }
            | InputEvent::TouchMoved { at, .. }
            | InputEvent::TouchUp { at, .. }
            | InputEvent::Tick { at }
            | InputEvent::Contact { at, .. } => at,
            InputEvent::Run { until, .. } => until,
        }
    }
}

/// An ordered input stream
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Script {
    pub events: Vec<InputEvent>,
}

impl Script {
    pub fn new(events: Vec<InputEvent>) -> Self {
        Self { events }
    }

    pub fn from_json(json: &str) -> Result<Self, ReplayError> {
        let script: Script = serde_json::from_str(json)?;
        script.validate()?;
        Ok(script)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ReplayError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Timestamps must never go backwards
    pub fn validate(&self) -> Result<(), ReplayError> {
        let mut previous = f64::NEG_INFINITY;
        for event in &self.events {
            if let InputEvent::Run { step, .. } = *event {
                if step <= 0.0 {
                    return Err(ReplayError::BadStep(step));
                }
            }
            let at = event.time();
            if at < previous {
                return Err(ReplayError::OutOfOrder { at, previous });
            }
            previous = at;
        }
        Ok(())
    }

    /// The stock demo for the `HeadlessScene::demo` layout: one shot that
    /// settles and swaps the camera, then a long-press move of the tree.
    pub fn demo() -> Self {
        Self::new(vec![
            InputEvent::TouchDown { at: 0.0, x: 200.0, y: 180.0 },
            InputEvent::TouchMoved { at: 0.1, x: 160.0, y: 150.0 },
            InputEvent::TouchMoved { at: 0.2, x: 120.0, y: 120.0 },
            InputEvent::TouchUp { at: 0.3, x: 120.0, y: 120.0 },
            InputEvent::Run { until: 4.0, step: 1.0 / 60.0 },
            InputEvent::TouchDown { at: 4.0, x: 210.0, y: 200.0 },
            InputEvent::Run { until: 7.5, step: 1.0 / 60.0 },
            InputEvent::TouchMoved { at: 7.6, x: 300.0, y: 200.0 },
            InputEvent::TouchUp { at: 7.7, x: 300.0, y: 200.0 },
            InputEvent::Tick { at: 7.8 },
        ])
    }

    /// Play the script, stepping the host's physics between frames.
    /// Returns every event the controller recorded.
    pub fn run<H: Host>(&self, controller: &mut TurnShotController<H>) -> Result<Vec<SceneEvent>, ReplayError> {
        self.validate()?;
        let mut events = Vec::new();
        let mut last_frame: Option<f64> = None;
        let mut clock = 0.0;

        for input in &self.events {
            match *input {
                InputEvent::TouchDown { at, x, y } => controller.touch_down(Vec2::new(x, y), at),
                InputEvent::TouchMoved { at, x, y } => controller.touch_moved(Vec2::new(x, y), at),
                InputEvent::TouchUp { at, x, y } => controller.touch_up(Vec2::new(x, y), at),
                InputEvent::Tick { at } => frame(controller, &mut last_frame, at),
                InputEvent::Run { until, step } => {
                    let mut n = 1u64;
                    let mut at = clock + step;
                    while at <= until + TIME_EPSILON {
                        frame(controller, &mut last_frame, at.min(until));
                        n += 1;
                        at = clock + step * n as f64;
                    }
                }
                InputEvent::Contact { at: _, a, b, impulse } => controller.on_contact(Contact {
                    a: NodeId(a),
                    b: NodeId(b),
                    impulse,
                }),
            }
            clock = input.time();
            events.extend(controller.drain_events());
        }

        log::debug!("Replayed {} inputs, {} scene events", self.events.len(), events.len());
        Ok(events)
    }
}

fn frame<H: Host>(controller: &mut TurnShotController<H>, last_frame: &mut Option<f64>, at: f64) {
    if let Some(previous) = *last_frame {
        let dt = (at - previous).max(0.0) as f32;
        controller.host_mut().step(dt);
    }
    *last_frame = Some(at);
    controller.update(at);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessScene;
    use crate::host::SceneGraph;
    use crate::tuning::Tuning;

    fn demo_controller() -> TurnShotController<HeadlessScene> {
        TurnShotController::new(HeadlessScene::demo(Vec2::new(1024.0, 768.0)), Tuning::default(), 42)
    }

    #[test]
    fn test_json_shape() {
        let json = r#"{ "events": [
            { "kind": "touch_down", "at": 0.0, "x": 200.0, "y": 180.0 },
            { "kind": "run", "until": 1.0, "step": 0.5 },
            { "kind": "contact", "at": 1.0, "a": 1, "b": 4, "impulse": 30.0 }
        ] }"#;
        let script = Script::from_json(json).unwrap();
        assert_eq!(script.events.len(), 3);
        assert_eq!(script.events[1], InputEvent::Run { until: 1.0, step: 0.5 });
    }

    #[test]
    fn test_out_of_order_rejected() {
        let script = Script::new(vec![InputEvent::Tick { at: 2.0 }, InputEvent::Tick { at: 1.0 }]);
        assert!(matches!(script.validate(), Err(ReplayError::OutOfOrder { .. })));
    }

    #[test]
    fn test_zero_step_rejected() {
        let script = Script::new(vec![InputEvent::Run { until: 1.0, step: 0.0 }]);
        assert!(matches!(script.validate(), Err(ReplayError::BadStep(_))));
    }

    #[test]
    fn test_demo_plays_a_full_turn_and_a_move() {
        let mut controller = demo_controller();
        let events = Script::demo().run(&mut controller).unwrap();

        let launched = events
            .iter()
            .filter(|e| matches!(e, SceneEvent::Launched { turn: 2, .. }))
            .count();
        assert_eq!(launched, 1);
        assert!(events.contains(&SceneEvent::TurnReady { turn: 2 }));
        assert!(events.iter().any(|e| matches!(e, SceneEvent::RepositionCommitted { .. })));
        assert_eq!(controller.turn(), 2);
        assert!(controller.can_shoot());
        assert!(events.contains(&SceneEvent::ShotSettled {
            turn: 2,
            camera_target: controller.anchors().opponent
        }));
        // The tree was dragged from x=200 to x=300
        let tree = controller.host().find(crate::consts::TREE_NODE).unwrap();
        assert_eq!(controller.host().position(tree), Some(Vec2::new(300.0, 180.0)));
    }

    #[test]
    fn test_same_script_same_events() {
        let script = Script::demo();
        let a = script.run(&mut demo_controller()).unwrap();
        let b = script.run(&mut demo_controller()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_run_reaches_its_end_time() {
        // Ten 0.1 s steps land on 1.0 even though summing 0.1 drifts past it
        let mut controller = demo_controller();
        let script = Script::new(vec![
            InputEvent::TouchDown { at: 0.0, x: 210.0, y: 200.0 },
            InputEvent::Run { until: 3.0, step: 0.1 },
        ]);
        let events = script.run(&mut controller).unwrap();
        let tree = controller.host().find(crate::consts::TREE_NODE).unwrap();
        assert!(events.contains(&SceneEvent::RepositionReady { piece: tree }));
    }

    #[test]
    fn test_contact_event_removes_skull() {
        let mut controller = demo_controller();
        let skull = controller.host().find(crate::consts::SKULL_NODE).unwrap();
        let script = Script::new(vec![InputEvent::Contact {
            at: 0.0,
            a: 1,
            b: skull.0,
            impulse: 40.0,
        }]);
        let events = script.run(&mut controller).unwrap();
        assert_eq!(events, vec![SceneEvent::SkullRemoved { node: skull }]);
    }
}
