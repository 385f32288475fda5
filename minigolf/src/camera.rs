//! Camera rig: a slow orbit over the course on the title screen, then a
//! chase view behind the ball along the aim.

use crate::{
    config::CameraConfig,
    types::{Iso, Mat4, Point3, Vec3},
};
use nalgebra::Perspective3;

/// Eye and target closer than this are treated as coincident.
const MIN_VIEW_DISTANCE: f32 = 1.0e-4;

#[derive(Clone, Debug)]
pub struct CameraRig {
    config: CameraConfig,
    eye: Vec3,
    target: Vec3,
    drift_angle: f32,
    aspect: f32,
}

impl CameraRig {
    pub fn new(config: CameraConfig) -> Self {
        let mut rig = Self {
            config,
            eye: Vec3::zeros(),
            target: Vec3::zeros(),
            drift_angle: 0.0,
            aspect: 16.0 / 9.0,
        };
        rig.drift();
        rig
    }

    pub fn eye(&self) -> Vec3 {
        self.eye
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Zero-sized surfaces keep the previous aspect.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    /// Advance the title-screen orbit by one frame.
    pub fn drift(&mut self) {
        self.drift_angle = (self.drift_angle + self.config.drift_speed) % std::f32::consts::TAU;
        let center = Vec3::from(self.config.drift_center);
        let (sin, cos) = self.drift_angle.sin_cos();
        self.eye = center
            + Vec3::new(
                cos * self.config.drift_radius,
                self.config.drift_height,
                sin * self.config.drift_radius,
            );
    }

    /// Place the eye behind `ball`, opposite the horizontal aim.
    pub fn follow(&mut self, ball: Vec3, aim: Vec3) {
        let flat = Vec3::new(aim.x, 0.0, aim.z);
        let back = flat
            .try_normalize(MIN_VIEW_DISTANCE)
            .map(|dir| -dir)
            .unwrap_or_else(Vec3::z);
        self.eye = ball
            + back * self.config.follow_distance
            + Vec3::new(0.0, self.config.follow_height, 0.0);
    }

    pub fn look_at(&mut self, target: Vec3) {
        self.target = target;
    }

    pub fn view_matrix(&self) -> Mat4 {
        let eye = Point3::from(self.eye);
        let mut target = Point3::from(self.target);
        if (target - eye).norm() < MIN_VIEW_DISTANCE {
            target = eye - Vec3::z();
        }
        Iso::look_at_rh(&eye, &target, &Vec3::y()).to_homogeneous()
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Perspective3::new(
            self.aspect,
            self.config.fov_y,
            self.config.near,
            self.config.far,
        )
        .to_homogeneous()
    }
}
