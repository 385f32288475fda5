//! Debug/performance tooling for native dev builds.
//!
//! Gated behind `dev_native` in `main.rs`. Adds the perf overlay and outlines
//! every built hole region.

use crate::game::Golf;
use bevy::diagnostic::{
    EntityCountDiagnosticsPlugin, FrameTimeDiagnosticsPlugin, SystemInformationDiagnosticsPlugin,
};
use bevy::prelude::*;
use bevy::render::diagnostic::RenderDiagnosticsPlugin;
use iyes_perf_ui::prelude::*;

pub(super) fn plugin(app: &mut App) {
    app.add_plugins((
        FrameTimeDiagnosticsPlugin::default(),
        EntityCountDiagnosticsPlugin::default(),
        SystemInformationDiagnosticsPlugin::default(),
        RenderDiagnosticsPlugin,
        PerfUiPlugin,
    ));

    app.add_systems(Startup, spawn_perf_ui);
    app.add_systems(Update, draw_holes.run_if(resource_exists::<Golf>));
}

fn spawn_perf_ui(mut commands: Commands) {
    commands.spawn(PerfUiAllEntries::default());
}

fn draw_holes(golf: Res<Golf>, mut gizmos: Gizmos) {
    if !golf.is_built() {
        return;
    }
    let current = golf.session().current_level;
    for (index, level) in golf.levels().iter().enumerate() {
        if level.hole.is_unset() {
            continue;
        }
        let min = Vec3::new(level.hole.min.x, level.hole.min.y, level.hole.min.z);
        let max = Vec3::new(level.hole.max.x, level.hole.max.y, level.hole.max.z);
        let color = if index == current {
            Color::srgb(1.0, 0.8, 0.1)
        } else {
            Color::srgb(0.4, 0.4, 0.4)
        };
        gizmos.cuboid(
            Transform::from_translation((min + max) * 0.5).with_scale(max - min),
            color,
        );
    }
}
