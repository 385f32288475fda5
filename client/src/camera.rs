use crate::{
    config::Settings,
    game::{FrameSet, LastFrame},
};
use bevy::{camera::Exposure, prelude::*};

pub(super) fn plugin(app: &mut App) {
    app.add_systems(Startup, add_camera);
    app.add_systems(Update, follow_rig.in_set(FrameSet::Present));
}

fn add_camera(mut commands: Commands, settings: Res<Settings>) {
    let camera = &settings.game.camera;
    commands.spawn((
        Exposure { ev100: 13.0 },
        bevy::core_pipeline::tonemapping::Tonemapping::AcesFitted,
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: camera.fov_y,
            near: camera.near,
            far: camera.far,
            ..default()
        }),
        Transform::from_xyz(0.0, 25.0, 45.0).looking_at(Vec3::ZERO, Vec3::Y),
        DistanceFog {
            color: Color::srgba(0.35, 0.48, 0.66, 1.0),
            directional_light_color: Color::srgba(1.0, 0.95, 0.85, 0.5),
            directional_light_exponent: 30.0,
            falloff: FogFalloff::from_visibility_colors(
                camera.far,
                Color::srgb(0.35, 0.5, 0.66),
                Color::srgb(0.8, 0.8, 0.7),
            ),
        },
    ));
}

/// Place the camera where the core's rig says. Bevy derives the projection
/// aspect from the window itself.
fn follow_rig(last: Res<LastFrame>, mut camera: Single<&mut Transform, With<Camera3d>>) {
    let Some(out) = &last.0 else {
        return;
    };
    let eye = Vec3::new(out.eye.x, out.eye.y, out.eye.z);
    let target = Vec3::new(out.target.x, out.target.y, out.target.z);
    if eye.distance_squared(target) > f32::EPSILON {
        **camera = Transform::from_translation(eye).looking_at(target, Vec3::Y);
    }
}
