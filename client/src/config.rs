//! Loads `assets/golf.toml`: the gameplay sections plus a `[client]` section.

use bevy::prelude::*;
use minigolf::GameConfig;
use serde::Deserialize;
use std::path::PathBuf;

const CONFIG_FILE: &str = "assets/golf.toml";

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// glTF course model, relative to the asset folder.
    pub course: String,
    /// Best-score file, relative to the working directory.
    pub score_file: PathBuf,
    pub window_title: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            course: "course/minigolf.glb".to_string(),
            score_file: PathBuf::from("minigolf_scores.toml"),
            window_title: "Minigolf".to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ClientFile {
    client: ClientConfig,
}

#[derive(Resource, Clone, Debug, Default)]
pub struct Settings {
    pub game: GameConfig,
    pub client: ClientConfig,
    /// Problems met while loading, logged once logging is up.
    problems: Vec<String>,
}

impl Settings {
    /// Read the config file, falling back to defaults when it is missing or broken.
    ///
    /// Runs while the app is being built, before the log plugin exists.
    pub fn load() -> Self {
        let path = config_path();
        let mut settings = Self::default();
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) => {
                settings
                    .problems
                    .push(format!("no config at {} ({err}), using defaults", path.display()));
                return settings;
            }
        };

        match GameConfig::from_toml_str(&contents) {
            Ok(game) => settings.game = game,
            Err(err) => settings.problems.push(format!("{}: {err}", path.display())),
        }
        match toml::from_str::<ClientFile>(&contents) {
            Ok(file) => settings.client = file.client,
            Err(err) => settings
                .problems
                .push(format!("{} [client]: {err}", path.display())),
        }
        settings
    }
}

pub(super) fn plugin(app: &mut App) {
    app.add_systems(Startup, report_problems);
}

fn report_problems(settings: Res<Settings>) {
    for problem in &settings.problems {
        warn!("config: {problem}");
    }
    if settings.game.debug.enabled {
        info!("debug push keys enabled");
    }
}

/// Bevy resolves assets next to the manifest when run through cargo; do the same.
fn config_path() -> PathBuf {
    std::env::var_os("CARGO_MANIFEST_DIR")
        .map(PathBuf::from)
        .unwrap_or_default()
        .join(CONFIG_FILE)
}
