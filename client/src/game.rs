//! Owns the gameplay core and runs one core frame per Bevy frame.

use crate::config::Settings;
use bevy::prelude::*;
use minigolf::{FileScoreStore, FrameOutput, Game, InputEvent, RapierWorld};

pub type GolfGame = Game<RapierWorld, FileScoreStore>;

/// The running session.
#[derive(Resource, Deref, DerefMut)]
pub struct Golf(pub GolfGame);

/// Events gathered this frame, drained by [`run_frame`].
#[derive(Resource, Default)]
pub struct PendingInput(pub Vec<InputEvent>);

/// Latest render hand-off. `None` until the course is built.
#[derive(Resource, Default)]
pub struct LastFrame(pub Option<FrameOutput>);

/// Per-frame order: gather input, step the core, present the result.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameSet {
    Input,
    Step,
    Present,
}

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<PendingInput>();
    app.init_resource::<LastFrame>();
    app.add_systems(Startup, create_game);

    app.configure_sets(
        Update,
        (FrameSet::Input, FrameSet::Step, FrameSet::Present).chain(),
    );
    app.add_systems(Update, crate::input::queue_actions.in_set(FrameSet::Input));
    app.add_systems(Update, run_frame.in_set(FrameSet::Step));
}

fn create_game(mut commands: Commands, settings: Res<Settings>) {
    let config = settings.game.clone();
    let world = RapierWorld::new(&config.physics);
    let store = FileScoreStore::new(&settings.client.score_file);
    info!("best scores in {}", store.path().display());
    commands.insert_resource(Golf(Game::new(config, world, store)));
}

fn run_frame(
    golf: Option<ResMut<Golf>>,
    mut pending: ResMut<PendingInput>,
    mut last: ResMut<LastFrame>,
) {
    let Some(mut golf) = golf else {
        return;
    };
    let events = std::mem::take(&mut pending.0);
    match golf.frame(&events) {
        Ok(out) => last.0 = out,
        Err(err) => error!("frame failed: {err}"),
    }
}
