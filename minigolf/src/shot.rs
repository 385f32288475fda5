/*!
Shot state machine.

```text
WAITING --start--> READY --charge press--> SHOOTING --release--> MOVING
                     ^                                             |
                     +------------- ball stopped ------------------+
                     |                                             |
                     +--- next level / course wrap --- FINISHING <-+ (ball in hole)
```

A reset input returns any started state to READY with the ball back on its spawn.
The machine only touches the physics world through the ball handle it is given.
*/

use crate::{
    Result,
    config::{ShotConfig, StopRule},
    physics::{BodyHandle, PhysicsWorld},
    session::SessionState,
    types::{Aabb, Pose, Quat, Vec3},
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ShotState {
    #[default]
    Waiting,
    Ready,
    Shooting,
    Moving,
    Finishing,
}

impl ShotState {
    pub fn label(&self) -> &'static str {
        match self {
            ShotState::Waiting => "waiting",
            ShotState::Ready => "ready",
            ShotState::Shooting => "shooting",
            ShotState::Moving => "moving",
            ShotState::Finishing => "finishing",
        }
    }
}

/// Triangle wave in `[0, 1]`, advanced once per frame while charging.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChargeForce {
    value: f32,
    rising: bool,
    step: f32,
}

impl ChargeForce {
    pub fn new(step: f32) -> Self {
        Self {
            value: 0.0,
            rising: true,
            step,
        }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn tick(&mut self) {
        if self.rising {
            self.value += self.step;
            if self.value >= 1.0 {
                self.value = 1.0;
                self.rising = false;
            }
        } else {
            self.value -= self.step;
            if self.value <= 0.0 {
                self.value = 0.0;
                self.rising = true;
            }
        }
    }

    pub fn reset(&mut self) {
        self.value = 0.0;
        self.rising = true;
    }

    /// Current value, leaving the charge reset.
    pub fn take(&mut self) -> f32 {
        let value = self.value;
        self.reset();
        value
    }
}

/// Stop test for a moving ball.
pub fn is_stopped(rule: &StopRule, linear: &Vec3, angular: &Vec3) -> bool {
    match *rule {
        // Exact comparison: a near-zero product never counts as stopped.
        StopRule::ExactDot => linear.dot(angular) == 0.0,
        StopRule::Resting {
            linear: max_linear,
            angular: max_angular,
        } => linear.norm() <= max_linear && angular.norm() <= max_angular,
    }
}

#[derive(Clone, Debug)]
pub struct ShotMachine {
    state: ShotState,
    charge: ChargeForce,
    aim: Vec3,
    config: ShotConfig,
}

impl ShotMachine {
    pub fn new(config: ShotConfig) -> Self {
        Self {
            state: ShotState::Waiting,
            charge: ChargeForce::new(config.charge_step),
            aim: Vec3::zeros(),
            config,
        }
    }

    pub fn state(&self) -> ShotState {
        self.state
    }

    pub fn charge(&self) -> f32 {
        self.charge.value()
    }

    pub fn aim(&self) -> Vec3 {
        self.aim
    }

    pub fn is_started(&self) -> bool {
        self.state != ShotState::Waiting
    }

    /// Enter READY for a freshly started level with its initial aim.
    pub fn begin_level(&mut self, direction: Vec3) {
        self.aim = direction;
        self.charge.reset();
        self.state = ShotState::Ready;
    }

    /// READY -> SHOOTING.
    pub fn press_charge(&mut self) -> bool {
        if self.state != ShotState::Ready {
            return false;
        }
        self.state = ShotState::Shooting;
        true
    }

    /// Per-frame charge oscillation.
    pub fn tick(&mut self) {
        if self.state == ShotState::Shooting {
            self.charge.tick();
        }
    }

    /// Turn the aim about +Y. Only while READY.
    pub fn rotate_aim(&mut self, radians: f32) {
        if self.state != ShotState::Ready {
            return;
        }
        self.aim = Quat::from_axis_angle(&Vec3::y_axis(), radians) * self.aim;
    }

    /// Horizontal launch velocity for a given charge.
    pub fn launch_velocity(&self, charge: f32) -> Vec3 {
        Vec3::new(self.aim.x, 0.0, self.aim.z) * charge * self.config.max_force
    }

    /// SHOOTING -> MOVING: launch the ball and count the stroke.
    ///
    /// Returns the applied velocity, or `None` when not charging.
    pub fn release<W: PhysicsWorld>(
        &mut self,
        world: &mut W,
        ball: BodyHandle,
        session: &mut SessionState,
    ) -> Result<Option<Vec3>> {
        if self.state != ShotState::Shooting {
            return Ok(None);
        }
        let charge = self.charge.take();
        let velocity = self.launch_velocity(charge);
        world.set_linear_velocity(ball, velocity)?;
        session.record_stroke();
        self.state = ShotState::Moving;
        log::debug!(
            "stroke {} on level {}: {:?}",
            session.strokes,
            session.current_level,
            velocity.as_slice()
        );
        Ok(Some(velocity))
    }

    /// MOVING transitions: into the hole first, otherwise stopped.
    pub fn evaluate<W: PhysicsWorld>(
        &mut self,
        world: &W,
        ball: BodyHandle,
        hole: &Aabb,
    ) -> Result<ShotState> {
        if self.state != ShotState::Moving {
            return Ok(self.state);
        }
        let position = world.pose(ball)?.translation;
        if hole.contains_below_top(&position, self.config.hole_top_margin) {
            self.state = ShotState::Finishing;
        } else if is_stopped(
            &self.config.stop_rule,
            &world.linear_velocity(ball)?,
            &world.angular_velocity(ball)?,
        ) {
            self.state = ShotState::Ready;
        }
        Ok(self.state)
    }

    /// Manual reset: ball back on `spawn` at rest, one stroke counted, READY.
    ///
    /// Ignored before the session has started.
    pub fn reset_ball<W: PhysicsWorld>(
        &mut self,
        world: &mut W,
        ball: BodyHandle,
        spawn: Vec3,
        session: &mut SessionState,
    ) -> Result<bool> {
        if !self.is_started() {
            return Ok(false);
        }
        world.teleport(ball, Pose::from_translation(spawn))?;
        session.record_stroke();
        self.charge.reset();
        self.state = ShotState::Ready;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        collision::build_ball,
        config::{BallConfig, PhysicsConfig},
        physics::RapierWorld,
    };
    use approx::assert_relative_eq;

    fn machine() -> ShotMachine {
        let mut m = ShotMachine::new(ShotConfig::default());
        m.begin_level(Vec3::new(0.0, -0.3, -1.0));
        m
    }

    fn world_with_ball(at: Vec3) -> (RapierWorld, BodyHandle) {
        let mut w = RapierWorld::new(&PhysicsConfig::default());
        let ball = build_ball(&mut w, at, &BallConfig::default()).unwrap();
        (w, ball)
    }

    #[test]
    fn charge_rises_then_falls_without_overshoot() {
        let mut charge = ChargeForce::new(0.01);
        let mut previous = charge.value();
        let mut peaked = false;
        for _ in 0..350 {
            charge.tick();
            let v = charge.value();
            assert!((0.0..=1.0).contains(&v), "charge out of range: {v}");
            let delta = v - previous;
            assert!(delta.abs() <= 0.01 + 1.0e-5);
            if v == 1.0 {
                peaked = true;
            }
            if !peaked {
                assert!(delta > 0.0);
            }
            previous = v;
        }
        assert!(peaked);
    }

    #[test]
    fn charge_reverses_at_both_bounds() {
        let mut charge = ChargeForce::new(0.25);
        let values: Vec<f32> = (0..9)
            .map(|_| {
                charge.tick();
                charge.value()
            })
            .collect();
        assert_eq!(values, vec![0.25, 0.5, 0.75, 1.0, 0.75, 0.5, 0.25, 0.0, 0.25]);
    }

    #[test]
    fn waiting_machine_ignores_play_inputs() {
        let mut m = ShotMachine::new(ShotConfig::default());
        assert_eq!(m.state(), ShotState::Waiting);
        assert!(!m.press_charge());
        m.tick();
        assert_eq!(m.charge(), 0.0);

        let (mut w, ball) = world_with_ball(Vec3::zeros());
        let mut session = SessionState::default();
        assert!(!m.reset_ball(&mut w, ball, Vec3::zeros(), &mut session).unwrap());
        assert_eq!(session.strokes, 0);
    }

    #[test]
    fn release_launches_horizontally_and_counts_the_stroke() {
        let mut m = machine();
        let (mut w, ball) = world_with_ball(Vec3::zeros());
        let mut session = SessionState::default();

        assert!(m.press_charge());
        for _ in 0..30 {
            m.tick();
        }
        let charge = m.charge();
        assert_relative_eq!(charge, 0.3, epsilon = 1.0e-4);

        let velocity = m.release(&mut w, ball, &mut session).unwrap().unwrap();
        assert_relative_eq!(velocity, Vec3::new(0.0, 0.0, -1.0) * charge * 50.0);
        assert_eq!(velocity.y, 0.0);
        assert_eq!(w.linear_velocity(ball).unwrap(), velocity);
        assert_eq!((session.strokes, session.total_strokes), (1, 1));
        assert_eq!(m.charge(), 0.0);
        assert_eq!(m.state(), ShotState::Moving);

        // A second release without charging does nothing.
        assert!(m.release(&mut w, ball, &mut session).unwrap().is_none());
        assert_eq!(session.total_strokes, 1);
    }

    #[test]
    fn ball_in_hole_finishes_before_stop_check() {
        let mut m = machine();
        let (mut w, ball) = world_with_ball(Vec3::new(0.0, 0.84, 0.0));
        let mut session = SessionState::default();
        let hole = Aabb::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));

        m.press_charge();
        m.release(&mut w, ball, &mut session).unwrap();
        // Zero charge: the ball is at rest and inside the box.
        assert_eq!(m.evaluate(&w, ball, &hole).unwrap(), ShotState::Finishing);
    }

    #[test]
    fn ball_above_tightened_top_is_not_in_the_hole() {
        let mut m = machine();
        let (mut w, ball) = world_with_ball(Vec3::new(0.0, 0.86, 0.0));
        let mut session = SessionState::default();
        let hole = Aabb::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));

        m.press_charge();
        m.release(&mut w, ball, &mut session).unwrap();
        // At rest outside the hole: stopped by the exact-dot rule.
        assert_eq!(m.evaluate(&w, ball, &hole).unwrap(), ShotState::Ready);
    }

    #[test]
    fn exact_dot_rule_needs_an_exact_zero() {
        let rule = StopRule::ExactDot;
        assert!(is_stopped(&rule, &Vec3::zeros(), &Vec3::zeros()));
        assert!(is_stopped(
            &rule,
            &Vec3::new(1.0, 0.0, 0.0),
            &Vec3::new(0.0, 0.0, 2.0)
        ));
        assert!(!is_stopped(
            &rule,
            &Vec3::new(1.0e-6, 0.0, 0.0),
            &Vec3::new(1.0e-6, 0.0, 0.0)
        ));
    }

    #[test]
    fn resting_rule_accepts_small_speeds() {
        let rule = StopRule::Resting {
            linear: 0.01,
            angular: 0.1,
        };
        assert!(is_stopped(
            &rule,
            &Vec3::new(0.005, 0.0, 0.0),
            &Vec3::new(0.0, 0.05, 0.0)
        ));
        assert!(!is_stopped(
            &rule,
            &Vec3::new(0.5, 0.0, 0.0),
            &Vec3::zeros()
        ));
    }

    #[test]
    fn reset_returns_ball_to_spawn_at_rest() {
        let mut m = machine();
        let spawn = Vec3::new(-1.37718, 0.124897, 0.21976);
        let (mut w, ball) = world_with_ball(Vec3::new(4.0, 3.0, 2.0));
        let mut session = SessionState::default();

        m.press_charge();
        m.tick();
        m.release(&mut w, ball, &mut session).unwrap();
        w.set_angular_velocity(ball, Vec3::new(1.0, 2.0, 3.0)).unwrap();

        assert!(m.reset_ball(&mut w, ball, spawn, &mut session).unwrap());
        assert_eq!(w.pose(ball).unwrap().translation, spawn);
        assert_eq!(w.linear_velocity(ball).unwrap(), Vec3::zeros());
        assert_eq!(w.angular_velocity(ball).unwrap(), Vec3::zeros());
        assert_eq!(session.strokes, 2);
        assert_eq!(m.state(), ShotState::Ready);
    }

    #[test]
    fn aim_turns_about_vertical_only_when_ready() {
        let mut m = machine();
        m.rotate_aim(std::f32::consts::FRAC_PI_2);
        // -Z turned a quarter turn counter-clockwise about +Y points along -X.
        assert_relative_eq!(m.aim(), Vec3::new(-1.0, -0.3, 0.0), epsilon = 1.0e-5);

        m.press_charge();
        let before = m.aim();
        m.rotate_aim(1.0);
        assert_eq!(m.aim(), before);
    }
}
