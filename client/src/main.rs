// Support configuring Bevy lints within code.
#![cfg_attr(bevy_lint, feature(register_tool), register_tool(bevy))]
// Disable console on Windows for non-dev builds.
#![cfg_attr(not(feature = "dev"), windows_subsystem = "windows")]

#[cfg(feature = "dev_native")]
mod debug_tools;

mod ball;
mod camera;
mod config;
mod course;
mod game;
mod hud;
mod input;

use bevy::prelude::*;
use config::Settings;

fn main() -> AppExit {
    App::new().add_plugins(AppPlugin).run()
}

pub struct AppPlugin;
impl Plugin for AppPlugin {
    fn build(&self, app: &mut App) {
        let settings = Settings::load();

        app.add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Window {
                title: settings.client.window_title.clone(),
                fit_canvas_to_parent: true,
                ..default()
            }
            .into(),
            ..default()
        }));
        app.insert_resource(ClearColor(Color::srgb(0.53, 0.72, 0.9)));
        app.insert_resource(settings);

        app.add_plugins((
            config::plugin,
            game::plugin,
            input::plugin,
            course::plugin,
            ball::plugin,
            camera::plugin,
            hud::plugin,
        ));

        #[cfg(feature = "dev_native")]
        app.add_plugins(debug_tools::plugin);
    }
}
