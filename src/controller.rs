//! Scene controller
//!
//! Glue between the host engine callbacks and the pure state in `sim`.
//! The host forwards touches and frame ticks; the controller mutates the
//! scene through the `Host` traits and records `SceneEvent`s for the host to
//! drain.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{CANCEL_NODE, SKULL_NODE, SUN_NODE, TREE_NODE};
use crate::host::{Contact, Host, NodeId};
use crate::sim::{
    AimGesture, CameraAnchors, CameraMove, DragResponse, LevelPicker, PathPrediction, ReleaseKind,
    RepositionState, RestDetector, ShotPhase, TurnState,
};
use crate::tuning::Tuning;
use crate::{clamp_inside, clamp_scalar};

/// Things that happened during a callback, for the host's UI/audio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SceneEvent {
    AimStarted { at: Vec2 },
    Launched { impulse: Vec2, turn: u32 },
    /// Projectile at rest; camera heading to `camera_target`
    ShotSettled { turn: u32, camera_target: Vec2 },
    /// Projectile removed, next shot allowed
    TurnReady { turn: u32 },
    RepositionReady { piece: NodeId },
    RepositionCancelled { piece: NodeId },
    RepositionCommitted { piece: NodeId, position: Vec2 },
    SkullRemoved { node: NodeId },
    LevelChanged { level: u32 },
}

/// Touch-and-tick driven turn/shot controller
pub struct TurnShotController<H: Host> {
    host: H,
    tuning: Tuning,
    turn: TurnState,
    /// Live only while Aiming
    aim: Option<AimGesture>,
    /// Latest path preview; cleared on release
    path: Option<PathPrediction>,
    /// Spawned on aim, removed after the camera swap or a reposition drag
    projectile: Option<NodeId>,
    /// Live from launch until the projectile is removed
    rest: Option<RestDetector>,
    /// Camera swap in progress; its completion ends the shot
    camera_move: Option<CameraMove>,
    anchors: CameraAnchors,
    reposition: RepositionState,
    levels: LevelPicker,
    cancel_icon: Option<NodeId>,
    events: Vec<SceneEvent>,
}

impl<H: Host> TurnShotController<H> {
    /// Wrap a host scene and attach to it
    pub fn new(host: H, tuning: Tuning, seed: u64) -> Self {
        let anchors = CameraAnchors::for_scene(host.size());
        let mut controller = Self {
            reposition: RepositionState::new(tuning.initial_move_tokens, tuning.long_press_threshold),
            levels: LevelPicker::new(seed, tuning.num_levels),
            host,
            tuning,
            turn: TurnState::new(),
            aim: None,
            path: None,
            projectile: None,
            rest: None,
            camera_move: None,
            anchors,
            cancel_icon: None,
            events: Vec::new(),
        };
        controller.attach();
        controller
    }

    /// Put the camera on the initial anchor and hide the cancel icon
    pub fn attach(&mut self) {
        self.anchors = CameraAnchors::for_scene(self.host.size());
        self.host.set_camera_position(self.anchors.initial);
        self.cancel_icon = self.host.find(CANCEL_NODE);
        if self.cancel_icon.is_none() {
            log::warn!("Scene has no '{CANCEL_NODE}' node; reposition cancel is unavailable");
        }
        self.set_cancel_visible(false);
        log::info!(
            "Attached to {}x{} scene, anchors {:?} / {:?}",
            self.host.size().x,
            self.host.size().y,
            self.anchors.initial,
            self.anchors.opponent
        );
    }

    // === Accessors ===

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn turn(&self) -> u32 {
        self.turn.turn
    }

    pub fn turn_state(&self) -> &TurnState {
        &self.turn
    }

    pub fn phase(&self) -> ShotPhase {
        self.turn.phase
    }

    pub fn can_shoot(&self) -> bool {
        self.turn.can_shoot
    }

    pub fn aim(&self) -> Option<&AimGesture> {
        self.aim.as_ref()
    }

    pub fn path(&self) -> Option<&PathPrediction> {
        self.path.as_ref()
    }

    pub fn projectile(&self) -> Option<NodeId> {
        self.projectile
    }

    pub fn camera_move(&self) -> Option<&CameraMove> {
        self.camera_move.as_ref()
    }

    pub fn anchors(&self) -> &CameraAnchors {
        &self.anchors
    }

    pub fn reposition(&self) -> &RepositionState {
        &self.reposition
    }

    /// Take the events recorded since the last drain
    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.events)
    }

    // === Touch callbacks ===

    pub fn touch_down(&mut self, point: Vec2, now: f64) {
        let tree = self
            .host
            .node_at(point)
            .filter(|node| self.host.name(*node) == Some(TREE_NODE));

        if let Some(tree) = tree {
            self.begin_aim(point);

            let origin = self.host.position(tree).unwrap_or(point);
            self.reposition.press(tree, origin, now);
            self.set_cancel_visible(false);
        }

        let sun_tapped = self
            .host
            .nodes_at(point)
            .into_iter()
            .any(|node| self.host.name(node) == Some(SUN_NODE));
        if sun_tapped {
            self.change_level();
        }
    }

    pub fn touch_moved(&mut self, point: Vec2, _now: f64) {
        if !self.reposition.is_ready() {
            if let Some(aim) = self.aim.as_mut() {
                let end = aim.drag_to(point);
                if let Some(projectile) = self.projectile {
                    self.host.set_position(projectile, end);
                }

                // Start and end both change every sample, so rebuild from scratch
                let path = aim.predict_path(self.host.gravity().y, &self.tuning);
                let dots: Vec<Vec2> = path.iter().collect();
                self.host.set_path_dots(&dots);
                self.host.set_aim_line(Some((aim.start, end)));
                self.path = Some(path);
            }
        }

        let Some(piece) = self.reposition.piece else {
            return;
        };
        let over_piece = self.host.frame(piece).is_some_and(|frame| frame.contains(point));

        match self.reposition.pointer_moved(over_piece) {
            DragResponse::Follow => {
                if let Some(pos) = self.host.position(piece) {
                    self.host.set_position(piece, Vec2::new(point.x, pos.y));
                }
                if self.projectile.is_some() {
                    log::debug!("Reposition drag discards the pending shot");
                }
                self.discard_aim();
            }
            DragResponse::Aborted => log::debug!("Long press abandoned, touch left the piece"),
            DragResponse::Held | DragResponse::Ignored => {}
        }
    }

    pub fn touch_up(&mut self, point: Vec2, _now: f64) {
        if self.reposition.is_ready() {
            // Reposition and aiming never share a release
            self.discard_aim();
        } else if let Some(aim) = self.aim.take() {
            self.launch(aim, point);
        }

        let Some(piece) = self.reposition.piece else {
            return;
        };
        let current = self.host.position(piece).unwrap_or(self.reposition.original_position);
        let over_cancel = self
            .cancel_icon
            .and_then(|icon| self.host.frame(icon))
            .is_some_and(|frame| frame.contains(point));

        if let Some((piece, kind)) = self.reposition.release(over_cancel, current) {
            match kind {
                ReleaseKind::Cancelled { original } => {
                    self.host.set_position(piece, original);
                    log::info!("Reposition cancelled, piece restored to {original:?}");
                    self.events.push(SceneEvent::RepositionCancelled { piece });
                }
                ReleaseKind::Committed { position } => {
                    log::info!("Piece moved to {position:?}");
                    self.events.push(SceneEvent::RepositionCommitted { piece, position });
                }
                ReleaseKind::Released => {}
            }
            self.host.set_alpha(piece, 1.0);
        }
        self.set_cancel_visible(false);
    }

    // === Frame tick ===

    /// Per-frame update; `now` is the host's frame timestamp in seconds
    pub fn update(&mut self, now: f64) {
        self.advance_camera_move(now);

        if let Some(projectile) = self.projectile {
            self.clamp_to_field(projectile);
            self.poll_rest(projectile, now);
        }

        if self.reposition.poll(now) {
            if let Some(piece) = self.reposition.piece {
                self.host.set_alpha(piece, self.tuning.reposition_alpha);
                self.set_cancel_visible(true);
                log::debug!("Piece {piece:?} ready to move");
                self.events.push(SceneEvent::RepositionReady { piece });
            }
        }
    }

    // === Physics contacts ===

    /// Hard hits knock skulls out of the scene
    pub fn on_contact(&mut self, contact: Contact) {
        if contact.impulse <= self.tuning.skull_impulse_threshold {
            return;
        }
        let skull = [contact.a, contact.b]
            .into_iter()
            .find(|node| self.host.name(*node) == Some(SKULL_NODE));
        if let Some(node) = skull {
            self.host.remove(node);
            log::info!("Skull {node:?} removed (impulse {:.1})", contact.impulse);
            self.events.push(SceneEvent::SkullRemoved { node });
        }
    }

    /// Scene is going away: stop the camera swap and drop any projectile
    /// without running the end-of-shot step
    pub fn teardown(&mut self) {
        self.camera_move = None;
        self.discard_aim();
        if let Some(projectile) = self.projectile.take() {
            self.host.remove(projectile);
        }
        self.rest = None;
        self.reposition.reset();
    }

    // === Internals ===

    fn begin_aim(&mut self, point: Vec2) {
        if !self.turn.begin_aim() {
            log::debug!("Shot not allowed yet (turn {})", self.turn.turn);
            return;
        }
        let projectile = self.host.spawn_projectile(point);
        self.host.set_dynamic(projectile, false);
        self.projectile = Some(projectile);
        self.aim = Some(AimGesture::new(point, self.tuning.max_drag_distance));
        self.events.push(SceneEvent::AimStarted { at: point });
    }

    fn launch(&mut self, mut aim: AimGesture, release: Vec2) {
        aim.drag_to(release);
        let impulse = aim.launch_impulse(self.tuning.launch_impulse_scale);

        if let Some(projectile) = self.projectile {
            self.host.set_dynamic(projectile, true);
            self.host.apply_impulse(projectile, impulse);
        }

        let turn = self.turn.launch();
        self.rest = Some(RestDetector::new(self.tuning.rest_threshold));
        self.clear_aim_visuals();

        log::info!("Launched with impulse {impulse:?}, now turn {turn}");
        self.events.push(SceneEvent::Launched { impulse, turn });
    }

    /// Drop an unlaunched aim and its projectile
    fn discard_aim(&mut self) {
        if self.aim.take().is_none() {
            return;
        }
        if let Some(projectile) = self.projectile.take() {
            self.host.remove(projectile);
        }
        self.turn.cancel_aim();
        self.clear_aim_visuals();
    }

    fn clear_aim_visuals(&mut self) {
        self.path = None;
        self.host.set_path_dots(&[]);
        self.host.set_aim_line(None);
    }

    /// Camera follows the projectile within the middle half of the field;
    /// the projectile stays fully on screen
    fn clamp_to_field(&mut self, projectile: NodeId) {
        let size = self.host.size();
        let Some(pos) = self.host.position(projectile) else {
            return;
        };

        if self.camera_move.is_none() {
            let camera_x = clamp_scalar(pos.x, size.x / 4.0, size.x - size.x / 4.0);
            self.host.set_camera_position(Vec2::new(camera_x, size.y / 2.0));
        }

        let body = self.host.frame(projectile).map_or(Vec2::ZERO, |frame| frame.size());
        let clamped = clamp_inside(pos, body, size);
        if clamped != pos {
            self.host.set_position(projectile, clamped);
        }
    }

    fn poll_rest(&mut self, projectile: NodeId, now: f64) {
        if !self.turn.shot_in_flight || self.camera_move.is_some() {
            return;
        }
        let velocity = self.host.velocity(projectile);
        let Some(rest) = self.rest.as_mut() else {
            return;
        };

        // A body without a velocity never counts as stopped
        let settled = match velocity {
            Some(velocity) => rest.observe(velocity, now),
            None => {
                rest.stopped_since = None;
                false
            }
        };
        self.turn.phase = if rest.is_timing() {
            ShotPhase::Settling
        } else {
            ShotPhase::Flying
        };

        if settled {
            self.start_camera_move(now);
        }
    }

    fn start_camera_move(&mut self, now: f64) {
        let turn = self.turn.turn;
        let target = self.anchors.for_turn(turn);
        self.camera_move = Some(CameraMove::new(
            self.host.camera_position(),
            target,
            now,
            self.tuning.camera_move_duration,
        ));
        log::info!("Shot settled on turn {turn}, camera moving to {target:?}");
        self.events.push(SceneEvent::ShotSettled {
            turn,
            camera_target: target,
        });
    }

    fn advance_camera_move(&mut self, now: f64) {
        let Some(camera_move) = self.camera_move else {
            return;
        };
        self.host.set_camera_position(camera_move.position(now));
        if camera_move.is_finished(now) {
            self.camera_move = None;
            self.finish_shot();
        }
    }

    /// Camera swap done: remove the projectile and hand over the turn
    fn finish_shot(&mut self) {
        if let Some(projectile) = self.projectile.take() {
            self.host.remove(projectile);
        }
        self.rest = None;
        self.turn.finish_shot();
        log::info!("Turn {} ready", self.turn.turn);
        self.events.push(SceneEvent::TurnReady { turn: self.turn.turn });
    }

    fn change_level(&mut self) {
        let Some(level) = self.levels.pick() else {
            log::warn!("No levels configured");
            return;
        };
        match self.host.present_level(level) {
            Ok(()) => {
                log::info!("Presenting level {level}");
                self.events.push(SceneEvent::LevelChanged { level });
            }
            Err(err) => log::warn!("Staying on current scene: {err}"),
        }
    }

    fn set_cancel_visible(&mut self, visible: bool) {
        if let Some(icon) = self.cancel_icon {
            self.host.set_hidden(icon, !visible);
        }
    }
}
