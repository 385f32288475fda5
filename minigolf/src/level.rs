//! Course levels: spawn point, initial aim and the win region of each hole.

use crate::{
    GolfError, Result,
    types::{Aabb, Vec3},
};
use serde::{Deserialize, Serialize};

/// Serializable level definition as written in the config file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelDef {
    pub spawn: [f32; 3],
    pub direction: [f32; 3],
}

#[derive(Clone, Debug, PartialEq)]
pub struct Level {
    pub spawn: Vec3,
    pub direction: Vec3,
    /// `Aabb::UNSET` until the level's hole collider is built.
    pub hole: Aabb,
}

impl From<&LevelDef> for Level {
    fn from(def: &LevelDef) -> Self {
        Self {
            spawn: Vec3::from(def.spawn),
            direction: Vec3::from(def.direction),
            hole: Aabb::UNSET,
        }
    }
}

/// Ordered level table. Levels are played by ascending index.
#[derive(Clone, Debug, PartialEq)]
pub struct LevelTable {
    levels: Vec<Level>,
}

impl LevelTable {
    pub fn from_defs(defs: &[LevelDef]) -> Self {
        Self {
            levels: defs.iter().map(Level::from).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<&Level> {
        self.levels.get(index).ok_or(GolfError::UnknownLevel(index))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Level> {
        self.levels.iter()
    }

    /// Store a hole box built from the level's hole collider.
    ///
    /// Rejects boxes that are flat on any axis so a built hole is always enterable.
    pub fn set_hole(&mut self, index: usize, hole: Aabb) -> Result<()> {
        if hole.is_degenerate() {
            return Err(GolfError::DegenerateHoleBounds {
                level: index,
                min: hole.min.into(),
                max: hole.max.into(),
            });
        }
        let level = self
            .levels
            .get_mut(index)
            .ok_or(GolfError::UnknownLevel(index))?;
        level.hole = hole;
        Ok(())
    }

    /// Indices of levels whose hole collider has not been built.
    pub fn missing_holes(&self) -> Vec<usize> {
        self.levels
            .iter()
            .enumerate()
            .filter(|(_, level)| level.hole.is_unset())
            .map(|(i, _)| i)
            .collect()
    }
}

/// The five holes of the bundled course.
pub fn default_course() -> Vec<LevelDef> {
    vec![
        LevelDef {
            spawn: [-1.37718, 0.124897, 0.21976],
            direction: [0.0, -0.3, -1.0],
        },
        LevelDef {
            spawn: [-19.0117, 0.087875, 0.21976],
            direction: [0.0, -0.3, -1.0],
        },
        LevelDef {
            spawn: [-29.4804, 0.124072, 0.21976],
            direction: [0.0, -0.3, -1.0],
        },
        LevelDef {
            spawn: [-36.7476, 0.116281, -25.5886],
            direction: [0.0, -0.3, 1.0],
        },
        LevelDef {
            spawn: [-63.3003, 13.7276, -34.565],
            direction: [0.0, -0.3, 1.0],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_course_starts_with_unset_holes() {
        let table = LevelTable::from_defs(&default_course());
        assert_eq!(table.len(), 5);
        assert_eq!(table.missing_holes(), vec![0, 1, 2, 3, 4]);
        assert!(table.iter().all(|l| l.hole.is_unset()));
    }

    #[test]
    fn set_hole_rejects_flat_boxes_and_unknown_levels() {
        let mut table = LevelTable::from_defs(&default_course());

        let flat = Aabb::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 1.0));
        assert!(matches!(
            table.set_hole(0, flat),
            Err(GolfError::DegenerateHoleBounds { level: 0, .. })
        ));

        let good = Aabb::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0));
        assert!(matches!(
            table.set_hole(9, good),
            Err(GolfError::UnknownLevel(9))
        ));

        table.set_hole(2, good).unwrap();
        assert_eq!(table.get(2).unwrap().hole, good);
        assert_eq!(table.missing_holes(), vec![0, 1, 3, 4]);
    }
}
