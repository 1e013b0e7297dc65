use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use super::error::{LevelDataError, LevelDataErrorCode};
use super::grid::TileGrid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LayerKind {
    Terrain,
    Platforms,
    Fill,
    Items,
    Enemies,
    Constraints,
    /// Player spawn (code 0) and portal (code 1).
    Player,
}

impl LayerKind {
    pub const ALL: [LayerKind; 7] = [
        LayerKind::Terrain,
        LayerKind::Platforms,
        LayerKind::Fill,
        LayerKind::Items,
        LayerKind::Enemies,
        LayerKind::Constraints,
        LayerKind::Player,
    ];

    pub fn name(self) -> &'static str {
        match self {
            LayerKind::Terrain => "terrain",
            LayerKind::Platforms => "platforms",
            LayerKind::Fill => "fill",
            LayerKind::Items => "items",
            LayerKind::Enemies => "enemies",
            LayerKind::Constraints => "constraints",
            LayerKind::Player => "player",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelTheme {
    pub name: &'static str,
    pub background: [u8; 4],
    /// Image used for every cell of the fill layer.
    pub fill_key: &'static str,
}

pub const HILLS_THEME: LevelTheme = LevelTheme {
    name: "hills",
    background: [153, 217, 234, 255],
    fill_key: "terrain/1",
};

pub const BEACH_THEME: LevelTheme = LevelTheme {
    name: "beach",
    background: [153, 217, 234, 255],
    fill_key: "terrain/2",
};

/// Levels 1-5 are hills, 6-10 beach. Returns `None` outside those ranges.
pub fn theme_for_level(level_id: u32) -> Option<LevelTheme> {
    match level_id {
        1..=5 => Some(HILLS_THEME),
        6..=10 => Some(BEACH_THEME),
        _ => None,
    }
}

/// Checks for level `id` without resolving its theme.
pub fn level_files_exist(levels_dir: &Path, id: u32) -> bool {
    all_layer_files_exist(&levels_dir.join(id.to_string()), id)
}

fn all_layer_files_exist(level_dir: &Path, id: u32) -> bool {
    LayerKind::ALL
        .iter()
        .all(|layer| level_dir.join(layer_file_name(id, *layer)).is_file())
}

fn layer_file_name(id: u32, layer: LayerKind) -> String {
    format!("level_{id}_{}.csv", layer.name())
}

/// Where a level's layer files live and how it looks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelDescriptor {
    pub id: u32,
    pub theme: LevelTheme,
    level_dir: PathBuf,
}

impl LevelDescriptor {
    pub fn for_level(levels_dir: &Path, id: u32) -> Self {
        let theme = theme_for_level(id).unwrap_or_else(|| {
            warn!(level = id, fallback = HILLS_THEME.name, "level_theme_unknown");
            HILLS_THEME
        });
        Self {
            id,
            theme,
            level_dir: levels_dir.join(id.to_string()),
        }
    }

    /// `levels/<id>/level_<id>_<layer>.csv`
    pub fn layer_path(&self, layer: LayerKind) -> PathBuf {
        self.level_dir.join(layer_file_name(self.id, layer))
    }

    /// True when every layer file is present on disk.
    pub fn exists(&self) -> bool {
        all_layer_files_exist(&self.level_dir, self.id)
    }

    pub fn read_layer(&self, layer: LayerKind) -> Result<TileGrid, LevelDataError> {
        let path = self.layer_path(layer);
        let raw = fs::read_to_string(&path).map_err(|source| LevelDataError {
            code: LevelDataErrorCode::ReadFile,
            message: format!("failed to read layer file: {source}"),
            level_id: self.id,
            layer,
            file_path: path.clone(),
            location: None,
        })?;
        TileGrid::parse(&raw).map_err(|error| error.in_layer(self.id, layer, path))
    }

    pub fn read_layers(&self) -> Result<LevelGrids, LevelDataError> {
        Ok(LevelGrids {
            terrain: self.read_layer(LayerKind::Terrain)?,
            platforms: self.read_layer(LayerKind::Platforms)?,
            fill: self.read_layer(LayerKind::Fill)?,
            items: self.read_layer(LayerKind::Items)?,
            enemies: self.read_layer(LayerKind::Enemies)?,
            constraints: self.read_layer(LayerKind::Constraints)?,
            player: self.read_layer(LayerKind::Player)?,
        })
    }
}

/// Decoded grids of every layer of one level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelGrids {
    pub terrain: TileGrid,
    pub platforms: TileGrid,
    pub fill: TileGrid,
    pub items: TileGrid,
    pub enemies: TileGrid,
    pub constraints: TileGrid,
    pub player: TileGrid,
}

impl LevelGrids {
    pub fn layer(&self, layer: LayerKind) -> &TileGrid {
        match layer {
            LayerKind::Terrain => &self.terrain,
            LayerKind::Platforms => &self.platforms,
            LayerKind::Fill => &self.fill,
            LayerKind::Items => &self.items,
            LayerKind::Enemies => &self.enemies,
            LayerKind::Constraints => &self.constraints,
            LayerKind::Player => &self.player,
        }
    }
}
