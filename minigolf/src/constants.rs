/*!
Gameplay and physics tuning constants.

These centralize the defaults used by the collision builder, the physics
world and the shot machine. Every value here is also a `GameConfig` default,
so a config file can override any of them.

Notes
- Distances are in meters, time in seconds, mass in kilograms.
*/

/// Gravity magnitude in meters per second squared (positive value, applied along -Y).
pub const GRAVITY_MPS2: f32 = 9.82;

/// Fixed internal physics step (seconds).
pub const FIXED_DT: f32 = 1.0 / 60.0;

/// Maximum internal sub-steps per `step_simulation` call.
pub const MAX_SUB_STEPS: u32 = 2;

/// Radius of a regulation golf ball in course units.
///
/// Also the uniform visual scale of the ball model in the course file.
pub const BALL_RADIUS: f32 = 0.070_237_85;

/// Ball mass in kilograms.
pub const BALL_MASS: f32 = 0.0459;

/// Collision margin of the ball. Wide on purpose: it keeps contacts alive while
/// the ball creeps over seams at low speed.
pub const BALL_MARGIN: f32 = 1.0;

/// Per-step motion above which continuous collision detection kicks in (meters).
pub const BALL_CCD_MOTION_THRESHOLD: f32 = 0.05;

/// Radius of the swept sphere used by continuous collision detection (meters).
pub const BALL_CCD_SWEPT_RADIUS: f32 = 0.06;

pub const BALL_RESTITUTION: f32 = 0.4;
pub const BALL_FRICTION: f32 = 0.5;
pub const BALL_LINEAR_DAMPING: f32 = 0.5;
pub const BALL_ANGULAR_DAMPING: f32 = 0.5;

/// Course surfaces: dampened bounce, grass-like grip.
pub const TERRAIN_RESTITUTION: f32 = 0.5;
pub const TERRAIN_FRICTION: f32 = 0.8;
pub const TERRAIN_ROLLING_FRICTION: f32 = 0.3;

/// Charge force change per frame while shooting.
pub const CHARGE_STEP: f32 = 0.01;

/// Launch speed at full charge (meters per second).
pub const MAX_SHOT_FORCE: f32 = 50.0;

/// Amount the hole box's top is lowered before the in-hole test (meters).
pub const HOLE_TOP_MARGIN: f32 = 0.15;

/// Aim rotation per frame while an aim key is held (radians).
pub const AIM_SPEED: f32 = 0.02;

/// Fixed storage key of the personal-best cumulative stroke count.
pub const BEST_SCORE_KEY: &str = "minigolf.best_strokes";

/// Reserved node names/patterns of the course file.
pub const BALL_NODE_NAME: &str = "Golf_zogica";
pub const SMALL_PIECE_PATTERN: &str = "deska";
pub const HOLE_PREFIX: &str = "Luknja";
