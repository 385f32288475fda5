//! Configuration system
//!
//! Every section is optional in the file; missing fields fall back to the
//! values in [`crate::constants`].

use crate::{GolfError, Result, constants::*, level::LevelDef};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Complete gameplay configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub physics: PhysicsConfig,
    pub ball: BallConfig,
    /// Concave course geometry.
    pub terrain: SurfaceConfig,
    /// Convex small pieces (boards, rails).
    pub small_piece: SurfaceConfig,
    pub shot: ShotConfig,
    pub camera: CameraConfig,
    pub tags: TagConfig,
    pub debug: DebugConfig,
    pub storage: StorageConfig,
    pub levels: Vec<LevelDef>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            physics: PhysicsConfig::default(),
            ball: BallConfig::default(),
            terrain: SurfaceConfig::default(),
            small_piece: SurfaceConfig::default(),
            shot: ShotConfig::default(),
            camera: CameraConfig::default(),
            tags: TagConfig::default(),
            debug: DebugConfig::default(),
            storage: StorageConfig::default(),
            levels: crate::level::default_course(),
        }
    }
}

impl GameConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| GolfError::ConfigParse(e.to_string()))
    }

    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(GolfError::ConfigIo)?;
        Self::from_toml_str(&contents)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| GolfError::ConfigParse(e.to_string()))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Gravity magnitude, applied along -Y.
    pub gravity: f32,
    /// Internal fixed integration step.
    pub fixed_dt: f32,
    /// Time handed to `step_simulation` once per frame.
    pub time_step: f32,
    pub max_sub_steps: u32,
    /// Height of an optional infinite ground plane under the course.
    pub floor_height: Option<f32>,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: GRAVITY_MPS2,
            fixed_dt: FIXED_DT,
            time_step: FIXED_DT,
            max_sub_steps: MAX_SUB_STEPS,
            floor_height: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BallConfig {
    pub radius: f32,
    pub mass: f32,
    pub margin: f32,
    pub ccd_motion_threshold: f32,
    pub ccd_swept_radius: f32,
    pub restitution: f32,
    pub friction: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
}

impl Default for BallConfig {
    fn default() -> Self {
        Self {
            radius: BALL_RADIUS,
            mass: BALL_MASS,
            margin: BALL_MARGIN,
            ccd_motion_threshold: BALL_CCD_MOTION_THRESHOLD,
            ccd_swept_radius: BALL_CCD_SWEPT_RADIUS,
            restitution: BALL_RESTITUTION,
            friction: BALL_FRICTION,
            linear_damping: BALL_LINEAR_DAMPING,
            angular_damping: BALL_ANGULAR_DAMPING,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    pub restitution: f32,
    pub friction: f32,
    pub rolling_friction: f32,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            restitution: TERRAIN_RESTITUTION,
            friction: TERRAIN_FRICTION,
            rolling_friction: TERRAIN_ROLLING_FRICTION,
        }
    }
}

/// How the shot machine decides a moving ball has come to rest.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum StopRule {
    /// `dot(linear, angular) == 0.0`, compared exactly.
    ExactDot,
    /// Both speeds at or below the given magnitudes.
    Resting { linear: f32, angular: f32 },
}

impl Default for StopRule {
    fn default() -> Self {
        Self::ExactDot
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShotConfig {
    pub charge_step: f32,
    pub max_force: f32,
    pub hole_top_margin: f32,
    pub aim_speed: f32,
    pub stop_rule: StopRule,
}

impl Default for ShotConfig {
    fn default() -> Self {
        Self {
            charge_step: CHARGE_STEP,
            max_force: MAX_SHOT_FORCE,
            hole_top_margin: HOLE_TOP_MARGIN,
            aim_speed: AIM_SPEED,
            stop_rule: StopRule::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view (radians).
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
    /// Distance behind the ball, against the aim, while playing.
    pub follow_distance: f32,
    pub follow_height: f32,
    /// Center, radius, height and angular speed (radians per frame) of the menu orbit.
    pub drift_center: [f32; 3],
    pub drift_radius: f32,
    pub drift_height: f32,
    pub drift_speed: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y: std::f32::consts::FRAC_PI_4,
            near: 0.01,
            far: 1000.0,
            follow_distance: 1.2,
            follow_height: 0.5,
            drift_center: [-30.0, 0.0, -15.0],
            drift_radius: 45.0,
            drift_height: 25.0,
            drift_speed: 0.002,
        }
    }
}

/// Name rules used to tag course nodes that carry no explicit tag.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TagConfig {
    pub ball_name: String,
    pub small_piece_pattern: String,
    pub hole_prefix: String,
}

impl Default for TagConfig {
    fn default() -> Self {
        Self {
            ball_name: BALL_NODE_NAME.to_string(),
            small_piece_pattern: SMALL_PIECE_PATTERN.to_string(),
            hole_prefix: HOLE_PREFIX.to_string(),
        }
    }
}

/// Debug-only behavior. Fixed when the game is constructed.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    pub enabled: bool,
    /// Speed injected by the debug push keys (meters per second).
    pub push_speed: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub best_score_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            best_score_key: BEST_SCORE_KEY.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config = GameConfig::from_toml_str("").unwrap();
        assert_eq!(config, GameConfig::default());
        assert_eq!(config.levels.len(), 5);
        assert_eq!(config.shot.stop_rule, StopRule::ExactDot);
    }

    #[test]
    fn partial_sections_override_only_named_fields() {
        let config = GameConfig::from_toml_str(
            r#"
            [ball]
            mass = 0.05

            [shot.stop_rule]
            rule = "resting"
            linear = 0.02
            angular = 0.1

            [debug]
            enabled = true
            push_speed = 3.0

            [[levels]]
            spawn = [1.0, 2.0, 3.0]
            direction = [0.0, 0.0, 1.0]
            "#,
        )
        .unwrap();

        assert_eq!(config.ball.mass, 0.05);
        assert_eq!(config.ball.radius, BALL_RADIUS);
        assert_eq!(
            config.shot.stop_rule,
            StopRule::Resting {
                linear: 0.02,
                angular: 0.1
            }
        );
        assert!(config.debug.enabled);
        assert_eq!(config.levels.len(), 1);
        assert_eq!(config.levels[0].spawn, [1.0, 2.0, 3.0]);
    }

    #[test]
    fn serialized_config_parses_back() {
        let mut config = GameConfig::default();
        config.physics.floor_height = Some(-5.0);
        let text = config.to_toml_string().unwrap();
        assert_eq!(GameConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let err = GameConfig::from_toml_str("[ball\nmass = ").unwrap_err();
        assert!(matches!(err, GolfError::ConfigParse(_)));
    }
}
