/*!
Game loop driver.

[`Game::frame`] runs one display frame:

1. drain queued [`InputEvent`]s
2. title screen: drift the camera; in play: advance a finished level, oscillate the charge
3. step physics by the configured time step
4. evaluate MOVING transitions
5. copy the ball pose into the scene graph
6. point the camera at the ball and hand a [`FrameOutput`] to the renderer

Until [`Game::load_course`] succeeds a frame does nothing.
*/

use crate::{
    GolfError, Result,
    camera::CameraRig,
    collision,
    config::GameConfig,
    input::InputEvent,
    level::LevelTable,
    physics::{BodyHandle, PhysicsWorld},
    scene::{NodeId, SceneGraph},
    session::{Advance, SessionState},
    shot::{ShotMachine, ShotState},
    storage::ScoreStore,
    sync::{self, LoadReport},
    types::{Mat4, Pose, Vec3},
};

/// What the stroke and force widgets display.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HudSnapshot {
    /// Zero-based level index.
    pub level: usize,
    pub strokes: u32,
    pub total_strokes: u32,
    pub best: Option<u32>,
    pub charge: f32,
    pub state: ShotState,
    pub running: bool,
}

/// Render hand-off for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameOutput {
    pub projection: Mat4,
    pub view: Mat4,
    pub eye: Vec3,
    pub target: Vec3,
    pub ball_pose: Pose,
    pub hud: HudSnapshot,
    /// Internal physics steps taken this frame.
    pub physics_steps: u32,
}

/// Ball body and the scene node that renders it, present once the course is built.
#[derive(Clone, Copy, Debug)]
struct Built {
    ball: BodyHandle,
    ball_node: Option<NodeId>,
}

pub struct Game<W: PhysicsWorld, S: ScoreStore> {
    config: GameConfig,
    world: W,
    store: S,
    levels: LevelTable,
    scene: SceneGraph,
    session: SessionState,
    shot: ShotMachine,
    camera: CameraRig,
    built: Option<Built>,
    running: bool,
}

impl<W: PhysicsWorld, S: ScoreStore> Game<W, S> {
    pub fn new(config: GameConfig, world: W, store: S) -> Self {
        if config.debug.enabled {
            log::warn!("debug input enabled");
        }
        Self {
            levels: LevelTable::from_defs(&config.levels),
            shot: ShotMachine::new(config.shot.clone()),
            camera: CameraRig::new(config.camera.clone()),
            scene: SceneGraph::new(),
            session: SessionState::default(),
            built: None,
            running: false,
            config,
            world,
            store,
        }
    }

    /// Resolve tags, build every static collider and the ball, then open the built gate.
    ///
    /// Bad mesh nodes are skipped and listed in the report. Fails when the course is
    /// already loaded, when level 0 is missing, or when the ball cannot be created.
    /// On failure the world and the level table are left as they were.
    pub fn load_course(&mut self, mut scene: SceneGraph) -> Result<LoadReport> {
        if self.built.is_some() {
            return Err(GolfError::CourseAlreadyLoaded);
        }
        let spawn = self.levels.get(0)?.spawn;
        scene.resolve_tags(&self.config.tags);

        let floor = match self.config.physics.floor_height {
            Some(height) => Some(collision::build_floor(
                &mut self.world,
                height,
                &self.config.terrain,
            )?),
            None => None,
        };
        let report = sync::load_colliders(&scene, &mut self.world, &mut self.levels, &self.config);

        let ball = match collision::build_ball(&mut self.world, spawn, &self.config.ball) {
            Ok(ball) => ball,
            Err(err) => {
                self.unload(floor.into_iter().chain(report.colliders.iter().map(|&(_, h)| h)));
                return Err(err);
            }
        };
        if report.ball_node.is_none() {
            log::warn!("course has no `{}` node", self.config.tags.ball_name);
        }

        self.scene = scene;
        self.built = Some(Built {
            ball,
            ball_node: report.ball_node,
        });
        self.load_best();
        Ok(report)
    }

    /// Remove bodies from a failed load and forget the hole boxes it stored.
    fn unload(&mut self, bodies: impl Iterator<Item = BodyHandle>) {
        for handle in bodies {
            if let Err(err) = self.world.remove_body(handle) {
                log::error!("could not remove {handle:?}: {err}");
            }
        }
        self.levels = LevelTable::from_defs(&self.config.levels);
    }

    pub fn is_built(&self) -> bool {
        self.built.is_some()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn shot_state(&self) -> ShotState {
        self.shot.state()
    }

    pub fn levels(&self) -> &LevelTable {
        &self.levels
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn ball(&self) -> Option<BodyHandle> {
        self.built.map(|b| b.ball)
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut W {
        &mut self.world
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run one frame. `Ok(None)` while the course is not built.
    pub fn frame(&mut self, events: &[InputEvent]) -> Result<Option<FrameOutput>> {
        let Some(built) = self.built else {
            for event in events {
                if let InputEvent::Resize { width, height } = *event {
                    self.camera.resize(width, height);
                }
            }
            return Ok(None);
        };

        for event in events {
            self.handle_event(built.ball, *event)?;
        }

        if self.running {
            if self.shot.state() == ShotState::Finishing {
                self.advance()?;
            }
            self.shot.tick();
        } else {
            self.camera.drift();
        }

        let physics_steps = self.world.step_simulation(
            self.config.physics.time_step,
            self.config.physics.max_sub_steps,
        );

        let hole = self.levels.get(self.session.current_level)?.hole;
        let before = self.shot.state();
        let after = self.shot.evaluate(&self.world, built.ball, &hole)?;
        if before != after {
            log::debug!("shot {} -> {}", before.label(), after.label());
        }

        if let Some(node) = built.ball_node {
            sync::sync_ball(&self.world, built.ball, &mut self.scene, node)?;
        }

        let ball_pose = self.world.pose(built.ball)?;
        if self.running {
            self.camera.follow(ball_pose.translation, self.shot.aim());
        }
        self.camera.look_at(ball_pose.translation);

        Ok(Some(FrameOutput {
            projection: self.camera.projection_matrix(),
            view: self.camera.view_matrix(),
            eye: self.camera.eye(),
            target: self.camera.target(),
            ball_pose,
            hud: self.hud(),
            physics_steps,
        }))
    }

    pub fn hud(&self) -> HudSnapshot {
        HudSnapshot {
            level: self.session.current_level,
            strokes: self.session.strokes,
            total_strokes: self.session.total_strokes,
            best: self.session.best,
            charge: self.shot.charge(),
            state: self.shot.state(),
            running: self.running,
        }
    }

    fn handle_event(&mut self, ball: BodyHandle, event: InputEvent) -> Result<()> {
        match event {
            InputEvent::Resize { width, height } => self.camera.resize(width, height),
            InputEvent::Start => {
                if !self.running {
                    self.running = true;
                    self.prepare_level(self.session.current_level)?;
                    log::info!("session started");
                }
            }
            // Everything below needs a started session.
            _ if !self.running => {}
            InputEvent::ChargePressed => {
                self.shot.press_charge();
            }
            InputEvent::ChargeReleased => {
                self.shot.release(&mut self.world, ball, &mut self.session)?;
            }
            InputEvent::Reset => {
                let spawn = self.levels.get(self.session.current_level)?.spawn;
                self.shot
                    .reset_ball(&mut self.world, ball, spawn, &mut self.session)?;
            }
            InputEvent::AimLeft => self.shot.rotate_aim(self.config.shot.aim_speed),
            InputEvent::AimRight => self.shot.rotate_aim(-self.config.shot.aim_speed),
            InputEvent::DebugPush(direction) => {
                if self.config.debug.enabled {
                    let velocity = direction.unit() * self.config.debug.push_speed;
                    self.world.set_linear_velocity(ball, velocity)?;
                }
            }
        }
        Ok(())
    }

    /// Finish the current level and start the next one.
    fn advance(&mut self) -> Result<()> {
        match self.session.finish_level(self.levels.len()) {
            Advance::NextLevel(level) => log::info!("level {level}"),
            Advance::CourseComplete { total, new_best } => {
                log::info!("course complete in {total} strokes");
                if new_best {
                    let key = self.config.storage.best_score_key.as_str();
                    if let Err(err) = self.store.save(key, total) {
                        log::warn!("could not save best score: {err}");
                    }
                }
            }
        }
        self.prepare_level(self.session.current_level)
    }

    fn load_best(&mut self) {
        match self.store.load(&self.config.storage.best_score_key) {
            // A failed save leaves the store behind the session.
            Ok(stored) => {
                self.session.best = match (stored, self.session.best) {
                    (Some(a), Some(b)) => Some(a.min(b)),
                    (a, b) => a.or(b),
                }
            }
            Err(err) => log::warn!("could not read best score: {err}"),
        }
    }

    /// Spawn the ball for `level` at rest and reset per-level shot state.
    fn prepare_level(&mut self, level: usize) -> Result<()> {
        let Some(built) = self.built else {
            return Ok(());
        };
        self.load_best();

        let def = self.levels.get(level)?;
        let (spawn, direction) = (def.spawn, def.direction);
        self.session.start_level(level);
        self.shot.begin_level(direction);
        self.world.teleport(built.ball, Pose::from_translation(spawn))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{physics::RapierWorld, storage::MemoryScoreStore};

    fn game() -> Game<RapierWorld, MemoryScoreStore> {
        let config = GameConfig::default();
        let world = RapierWorld::new(&config.physics);
        Game::new(config, world, MemoryScoreStore::new())
    }

    #[test]
    fn frames_are_inert_until_the_course_is_built() {
        let mut g = game();
        assert!(g.frame(&[InputEvent::Start]).unwrap().is_none());
        assert!(!g.is_running());
        assert_eq!(g.world().body_count(), 0);
    }

    #[test]
    fn title_screen_keeps_the_shot_machine_waiting() {
        let mut g = game();
        g.load_course(SceneGraph::new()).unwrap();
        let first = g.frame(&[InputEvent::ChargePressed]).unwrap().unwrap();
        let second = g.frame(&[InputEvent::Reset]).unwrap().unwrap();
        assert_eq!(g.shot_state(), ShotState::Waiting);
        assert!(!first.hud.running);
        assert_eq!(second.hud.strokes, 0);
        // The camera drifts on the title screen.
        assert_ne!(first.eye, second.eye);
        assert_eq!(second.target, second.ball_pose.translation);
    }

    #[test]
    fn start_puts_the_ball_on_level_zero_spawn() {
        let mut g = game();
        g.load_course(SceneGraph::new()).unwrap();
        let out = g.frame(&[InputEvent::Start]).unwrap().unwrap();
        assert!(out.hud.running);
        assert_eq!(out.hud.state, ShotState::Ready);
        assert_eq!(out.hud.level, 0);
        assert_eq!(out.physics_steps, 1);
    }

    #[test]
    fn debug_push_is_ignored_unless_enabled() {
        use crate::input::PushDirection;

        let mut g = game();
        g.load_course(SceneGraph::new()).unwrap();
        g.frame(&[InputEvent::Start]).unwrap();
        let ball = g.ball().unwrap();
        g.frame(&[InputEvent::DebugPush(PushDirection::PosX)]).unwrap();
        assert_eq!(g.world().linear_velocity(ball).unwrap().x, 0.0);

        let mut config = GameConfig::default();
        config.debug.enabled = true;
        config.debug.push_speed = 2.0;
        let world = RapierWorld::new(&config.physics);
        let mut g = Game::new(config, world, MemoryScoreStore::new());
        g.load_course(SceneGraph::new()).unwrap();
        g.frame(&[InputEvent::Start]).unwrap();
        g.frame(&[InputEvent::DebugPush(PushDirection::PosX)]).unwrap();
        let ball = g.ball().unwrap();
        assert!(g.world().linear_velocity(ball).unwrap().x > 1.5);
    }

    #[test]
    fn course_without_levels_builds_nothing() {
        let mut config = GameConfig::default();
        config.levels.clear();
        config.physics.floor_height = Some(-1.0);
        let world = RapierWorld::new(&config.physics);
        let mut g = Game::new(config, world, MemoryScoreStore::new());

        for _ in 0..2 {
            let err = g.load_course(SceneGraph::new()).unwrap_err();
            assert!(matches!(err, GolfError::UnknownLevel(0)));
            assert!(!g.is_built());
            assert_eq!(g.world().body_count(), 0);
        }
    }

    #[test]
    fn second_load_is_rejected_without_touching_the_world() {
        let mut config = GameConfig::default();
        config.physics.floor_height = Some(-1.0);
        let world = RapierWorld::new(&config.physics);
        let mut g = Game::new(config, world, MemoryScoreStore::new());
        g.load_course(SceneGraph::new()).unwrap();
        assert_eq!(g.world().body_count(), 2);

        let err = g.load_course(SceneGraph::new()).unwrap_err();
        assert!(matches!(err, GolfError::CourseAlreadyLoaded));
        assert_eq!(g.world().body_count(), 2);
        assert_eq!(g.world().dynamic_body_count(), 1);
    }

    #[test]
    fn failed_ball_creation_removes_the_statics_it_built() {
        let mut config = GameConfig::default();
        config.physics.floor_height = Some(-1.0);
        let mut world = RapierWorld::new(&config.physics);
        collision::build_ball(&mut world, Vec3::zeros(), &config.ball).unwrap();
        let mut g = Game::new(config, world, MemoryScoreStore::new());

        let err = g.load_course(SceneGraph::new()).unwrap_err();
        assert!(matches!(err, GolfError::SecondDynamicBody(_)));
        assert!(!g.is_built());
        assert_eq!(g.world().body_count(), 1);
        assert_eq!(g.levels().missing_holes().len(), g.levels().len());
    }

    /// Holds a stale record and refuses every write.
    struct ReadOnlyStore(u32);

    impl ScoreStore for ReadOnlyStore {
        fn load(&self, _key: &str) -> Result<Option<u32>> {
            Ok(Some(self.0))
        }

        fn save(&mut self, _key: &str, _value: u32) -> Result<()> {
            Err(GolfError::StorageParse("read-only".to_string()))
        }
    }

    #[test]
    fn unsaved_better_record_survives_the_next_level() {
        let config = GameConfig::default();
        let world = RapierWorld::new(&config.physics);
        let mut g = Game::new(config, world, ReadOnlyStore(10));
        g.load_course(SceneGraph::new()).unwrap();
        assert_eq!(g.session().best, Some(10));

        g.session.best = Some(8);
        g.prepare_level(0).unwrap();
        assert_eq!(g.session().best, Some(8));
    }
}
