mod assets;
mod descriptor;
mod enemy_table;
mod error;
mod grid;
mod loader;

pub use assets::{AssetError, AssetProvider, FsAssetProvider, ImageStore, MissingAssetPolicy};
pub use descriptor::{
    level_files_exist, theme_for_level, LayerKind, LevelDescriptor, LevelGrids, LevelTheme,
    BEACH_THEME, HILLS_THEME,
};
pub use enemy_table::{EnemyBehavior, EnemyDefinition, EnemyTable, EnemyTableError};
pub use error::{GridError, GridLocation, LevelDataError, LevelDataErrorCode, LevelLoadError};
pub use grid::{TileGrid, EMPTY_CODE};
#[cfg(test)]
pub(crate) use loader::assemble_level;
pub use loader::{
    build_level, load_level, LevelContext, PLAYER_DEAD_KEY, PLAYER_IDLE_KEY, PLAYER_RUN_KEY,
    PORTAL_KEY,
};
