//! Error types for the gameplay core

use crate::physics::BodyHandle;
use thiserror::Error;

/// Gameplay core errors
#[derive(Debug, Error)]
pub enum GolfError {
    /// Mesh data violates the collision builder's preconditions
    #[error("Invalid mesh for node `{node}`: {reason}")]
    InvalidMesh { node: String, reason: String },

    /// Convex hull could not be computed (coplanar or too few points)
    #[error("Degenerate convex hull for node `{0}`")]
    DegenerateHull(String),

    /// A hole collider produced a box that is flat on some axis
    #[error("Hole bounds for level {level} are degenerate: {min:?} .. {max:?}")]
    DegenerateHoleBounds {
        level: usize,
        min: [f32; 3],
        max: [f32; 3],
    },

    /// Level index outside the level table
    #[error("Unknown level index {0}")]
    UnknownLevel(usize),

    /// Rigid body not found
    #[error("Rigid body not found: {0:?}")]
    BodyNotFound(BodyHandle),

    /// Scene node id outside the scene graph
    #[error("Scene node not found: {0}")]
    NodeNotFound(usize),

    /// `load_course` was called on a game whose course is already built
    #[error("Course is already loaded")]
    CourseAlreadyLoaded,

    /// The world already holds its single dynamic body
    #[error("A dynamic body already exists: {0:?}")]
    SecondDynamicBody(BodyHandle),

    /// Durable score storage could not be read or written
    #[error("Score storage I/O error: {0}")]
    StorageIo(#[source] std::io::Error),

    /// Durable score storage holds unreadable data
    #[error("Score storage parse error: {0}")]
    StorageParse(String),

    /// Configuration file could not be read
    #[error("Config I/O error: {0}")]
    ConfigIo(#[source] std::io::Error),

    /// Configuration file is not valid TOML for `GameConfig`
    #[error("Config parse error: {0}")]
    ConfigParse(String),
}

impl GolfError {
    pub(crate) fn invalid_mesh(node: &str, reason: impl Into<String>) -> Self {
        Self::InvalidMesh {
            node: node.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type for gameplay core operations
pub type Result<T> = std::result::Result<T, GolfError>;
