use crate::{
    config::Settings,
    game::{FrameSet, LastFrame},
};
use bevy::prelude::*;

/// The rendered ball model from the course scene.
#[derive(Component)]
pub struct BallVisual;

pub(super) fn plugin(app: &mut App) {
    app.add_systems(Update, tag_ball);
    app.add_systems(Update, sync_ball.in_set(FrameSet::Present));
}

/// Scene instances spawn asynchronously; pick the ball out by name when it appears.
fn tag_ball(
    mut commands: Commands,
    named: Query<(Entity, &Name), Added<Name>>,
    settings: Res<Settings>,
) {
    for (entity, name) in &named {
        if name.as_str() == settings.game.tags.ball_name {
            debug!("ball visual is {entity}");
            commands.entity(entity).insert(BallVisual);
        }
    }
}

/// Copy the simulated pose, leaving the model's scale alone.
fn sync_ball(last: Res<LastFrame>, mut balls: Query<&mut Transform, With<BallVisual>>) {
    let Some(out) = &last.0 else {
        return;
    };
    let pose = out.ball_pose;
    for mut tf in &mut balls {
        tf.translation = Vec3::new(pose.translation.x, pose.translation.y, pose.translation.z);
        tf.rotation = Quat::from_xyzw(pose.rotation.i, pose.rotation.j, pose.rotation.k, pose.rotation.w);
    }
}
