//! Physics-driven mini-golf gameplay core.
//!
//! The crate turns a parsed course scene into static colliders, simulates the
//! ball with Rapier and runs the shot/level loop. Rendering, asset decoding and
//! windowing stay with the host application, which feeds [`InputEvent`]s into
//! [`Game::frame`] and draws from the returned [`FrameOutput`].
//!
//! ```ignore
//! let config = GameConfig::load("assets/golf.toml")?;
//! let world = RapierWorld::new(&config.physics);
//! let mut game = Game::new(config, world, MemoryScoreStore::new());
//! game.load_course(scene)?;
//! let out = game.frame(&[InputEvent::Start])?;
//! ```

pub mod camera;
pub mod collision;
pub mod config;
pub mod constants;
pub mod error;
pub mod game;
pub mod input;
pub mod level;
pub mod physics;
pub mod scene;
pub mod session;
pub mod shot;
pub mod storage;
pub mod sync;
pub mod types;

pub use config::{GameConfig, StopRule};
pub use error::{GolfError, Result};
pub use game::{FrameOutput, Game, HudSnapshot};
pub use input::{InputEvent, PushDirection};
pub use level::{Level, LevelDef, LevelTable};
pub use physics::{BodyHandle, PhysicsWorld, RapierWorld};
pub use scene::{MeshData, NodeId, NodeTag, SceneGraph, SceneNode};
pub use shot::ShotState;
pub use storage::{FileScoreStore, MemoryScoreStore, ScoreStore};
pub use sync::LoadReport;
pub use types::{Aabb, NodeTransform, Pose, Quat, Vec3};
