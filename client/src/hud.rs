//! Text overlay for the stroke counters and the shot force.

use crate::game::{FrameSet, LastFrame};
use bevy::prelude::*;
use minigolf::{HudSnapshot, ShotState};

const FORCE_BAR_CELLS: usize = 20;

#[derive(Component)]
struct HudText;

pub(super) fn plugin(app: &mut App) {
    app.add_systems(Startup, spawn_hud);
    app.add_systems(Update, update_hud.in_set(FrameSet::Present));
}

fn spawn_hud(mut commands: Commands) {
    commands.spawn((
        HudText,
        Text::new("Loading course..."),
        TextFont {
            font_size: 22.0,
            ..default()
        },
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(12.0),
            left: Val::Px(12.0),
            ..default()
        },
    ));
}

fn update_hud(last: Res<LastFrame>, mut text: Single<&mut Text, With<HudText>>) {
    let Some(out) = &last.0 else {
        return;
    };
    let line = hud_line(&out.hud);
    if text.0 != line {
        text.0 = line;
    }
}

fn hud_line(hud: &HudSnapshot) -> String {
    if !hud.running {
        return match hud.best {
            Some(best) => format!("Press Enter to play\nBest: {best}"),
            None => "Press Enter to play".to_string(),
        };
    }

    let best = hud.best.map_or_else(|| "-".to_string(), |b| b.to_string());
    let mut line = format!(
        "Hole {}   Strokes {}   Total {}   Best {}",
        hud.level + 1,
        hud.strokes,
        hud.total_strokes,
        best
    );
    match hud.state {
        ShotState::Shooting => {
            let filled = (hud.charge * FORCE_BAR_CELLS as f32).round() as usize;
            line.push_str("\nForce [");
            line.push_str(&"#".repeat(filled));
            line.push_str(&".".repeat(FORCE_BAR_CELLS.saturating_sub(filled)));
            line.push(']');
        }
        ShotState::Ready => line.push_str("\nHold Space to charge, A/D to aim, R to reset"),
        ShotState::Finishing => line.push_str("\nIn the hole!"),
        ShotState::Moving | ShotState::Waiting => {}
    }
    line
}
