use std::path::PathBuf;

use tour_engine::{resolve_app_paths, LoopConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use super::settings::{resolve_settings, TourSettings};
use super::tour::{self, SessionState, Stage};

const ANIMATION_MANIFEST: &str = "anims/player.json";
const BACKGROUND_SPRITE_ENV_VAR: &str = "TOUR_BACKGROUND_SPRITE";
const DEFAULT_BACKGROUND_SPRITE: &str = "background";

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) stages: Vec<Stage>,
    pub(crate) session: SessionState,
}

pub(crate) fn build_app() -> AppWiring {
    init_tracing();
    info!("=== Bindings Tour Startup ===");

    let asset_dir = match resolve_app_paths() {
        Ok(paths) => Some(paths.asset_dir),
        Err(error) => {
            warn!(error = %error, "asset_dir_unresolved_settings_default");
            None
        }
    };
    let settings = resolve_settings(asset_dir.as_deref());
    build_wiring(&settings, background_sprite_from_env())
}

fn build_wiring(settings: &TourSettings, background_sprite: String) -> AppWiring {
    let config = LoopConfig {
        window_title: tour::TOUR_TITLE.to_string(),
        background_sprite: Some(background_sprite),
        animation_manifest: Some(PathBuf::from(ANIMATION_MANIFEST)),
        ..LoopConfig::default()
    };

    AppWiring {
        config,
        stages: tour::build_stages(settings),
        session: SessionState::default(),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

fn background_sprite_from_env() -> String {
    std::env::var(BACKGROUND_SPRITE_ENV_VAR)
        .ok()
        .map(|raw| raw.trim().to_string())
        .filter(|key| !key.is_empty())
        .unwrap_or_else(|| DEFAULT_BACKGROUND_SPRITE.to_string())
}
