use scroller_engine::{
    resolve_app_paths, DisplayConfig, FsAssetProvider, LevelLoadError, LoopConfig, Scene,
    StartupError,
};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::enemy_file::{load_enemy_table, EnemyFileError};
use super::level_scene::LevelScene;
use super::settings::GameSettings;

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) scene: Box<dyn Scene>,
}

#[derive(Debug, Error)]
pub(crate) enum BootstrapError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error(transparent)]
    EnemyTable(#[from] EnemyFileError),
    #[error("failed to load start level: {0}")]
    StartLevel(#[from] LevelLoadError),
}

pub(crate) fn build_app() -> Result<AppWiring, BootstrapError> {
    init_tracing();
    info!("=== Scroller Startup ===");

    let settings = GameSettings::from_env();
    let paths = resolve_app_paths()?;
    let display_config = DisplayConfig::from_tile_size(settings.tile_size);
    info!(
        root = %paths.root.display(),
        levels_dir = %paths.levels_dir.display(),
        graphics_dir = %paths.graphics_dir.display(),
        start_level = settings.start_level,
        tile_size = display_config.tile_size(),
        screen_width = display_config.screen_width(),
        screen_height = display_config.screen_height(),
        asset_policy = ?settings.missing_asset_policy,
        "startup"
    );

    let enemies = load_enemy_table(&paths.enemy_table_path())?;
    let assets = FsAssetProvider::new(
        paths.graphics_dir.clone(),
        display_config.tile_size(),
        settings.missing_asset_policy,
    );
    let scene = LevelScene::start(
        paths.levels_dir.clone(),
        settings.start_level,
        display_config,
        enemies,
        assets,
    )?;

    let config = LoopConfig {
        window_width: display_config.screen_width(),
        window_height: display_config.screen_height(),
        ..LoopConfig::default()
    };

    Ok(AppWiring {
        config,
        scene: Box::new(scene),
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
