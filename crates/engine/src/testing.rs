//! Builders shared by unit tests across the crate.
//!
//! Levels are sketched as rows of characters, one per cell:
//!
//! | char | layer       | code |
//! |------|-------------|------|
//! | `X`  | terrain     | 0    |
//! | `f`  | fill        | 0    |
//! | `i`  | items       | 0    |
//! | `j`  | items       | 1    |
//! | `e`  | enemies     | 0    |
//! | `a`  | enemies     | 1    |
//! | `c`  | constraints | 0    |
//! | `H`  | platforms   | 0    |
//! | `V`  | platforms   | 1    |
//! | `P`  | player      | 0    |
//! | `O`  | player      | 1    |

use std::collections::HashMap;
use std::path::Path;

use image::{Rgba, RgbaImage};

use crate::content::{
    assemble_level, build_level, AssetError, AssetProvider, EnemyTable, ImageStore, LevelContext,
    LevelDescriptor, LevelGrids, TileGrid, EMPTY_CODE,
};
use crate::world::{DisplayConfig, ImageId, ImageRef, Level, LevelRules};

pub(crate) const TEST_TILE: f32 = 64.0;

pub(crate) fn image(id: u32) -> ImageRef {
    ImageRef::new(ImageId(id))
}

/// In-memory asset provider; each frame is a distinct 1x1 image.
#[derive(Debug, Default)]
pub(crate) struct MemoryAssets {
    store: ImageStore,
    frames: HashMap<String, Vec<ImageRef>>,
}

impl MemoryAssets {
    /// Every key the sketch legend can reference.
    pub(crate) fn standard() -> Self {
        let mut assets = Self::default();
        for key in [
            "terrain/0",
            "terrain/1",
            "terrain/2",
            "items/0",
            "items/1",
            "platforms/0",
            "platforms/1",
            "enemies/0",
            "enemies/2",
            "world/portal",
            "player/dead",
        ] {
            assets.insert_frames(key, 1);
        }
        for key in ["enemies/1", "enemies/3", "player/idle", "player/run"] {
            assets.insert_frames(key, 2);
        }
        assets
    }

    pub(crate) fn insert_frames(&mut self, key: &str, count: usize) {
        let frames = (0..count)
            .map(|index| {
                let shade = (self.store.len() % 256) as u8;
                let pixel = Rgba([shade, index as u8, 0, 255]);
                ImageRef::new(self.store.insert(RgbaImage::from_pixel(1, 1, pixel)))
            })
            .collect();
        self.frames.insert(key.to_string(), frames);
    }

    pub(crate) fn remove(&mut self, key: &str) {
        self.frames.remove(key);
    }
}

impl AssetProvider for MemoryAssets {
    fn frames(&mut self, key: &str) -> Result<Vec<ImageRef>, AssetError> {
        self.frames
            .get(key)
            .cloned()
            .ok_or_else(|| AssetError::key_not_found(key))
    }

    fn images(&self) -> &ImageStore {
        &self.store
    }
}

pub(crate) fn grids_from_rows(rows: &[&str]) -> LevelGrids {
    let mut layers: HashMap<char, Vec<Vec<i32>>> = HashMap::new();
    for layer in ['X', 'f', 'i', 'e', 'c', 'H', 'P'] {
        layers.insert(
            layer,
            rows.iter()
                .map(|row| vec![EMPTY_CODE; row.chars().count()])
                .collect(),
        );
    }

    for (row_index, row) in rows.iter().enumerate() {
        for (column, ch) in row.chars().enumerate() {
            let (layer, code) = match ch {
                'X' => ('X', 0),
                'f' => ('f', 0),
                'i' => ('i', 0),
                'j' => ('i', 1),
                'e' => ('e', 0),
                'a' => ('e', 1),
                'c' => ('c', 0),
                'H' => ('H', 0),
                'V' => ('H', 1),
                'P' => ('P', 0),
                'O' => ('P', 1),
                _ => continue,
            };
            if let Some(cells) = layers.get_mut(&layer) {
                cells[row_index][column] = code;
            }
        }
    }

    let mut take = |layer: char| TileGrid::from_rows(layers.remove(&layer).unwrap_or_default());
    LevelGrids {
        terrain: take('X'),
        platforms: take('H'),
        fill: take('f'),
        items: take('i'),
        enemies: take('e'),
        constraints: take('c'),
        player: take('P'),
    }
}

/// Sketches without an `O` get their portal in the bottom-right cell.
fn grids_with_portal(rows: &[&str]) -> LevelGrids {
    let mut grids = grids_from_rows(rows);
    if !rows.iter().any(|row| row.contains('O')) {
        let mut cells: Vec<Vec<i32>> = (0..grids.player.height())
            .map(|row| {
                (0..grids.player.width())
                    .map(|column| grids.player.get(row, column).unwrap_or(EMPTY_CODE))
                    .collect()
            })
            .collect();
        if let Some(last) = cells.last_mut().and_then(|row| row.last_mut()) {
            *last = 1;
        }
        grids.player = TileGrid::from_rows(cells);
    }
    grids
}

fn test_descriptor() -> LevelDescriptor {
    LevelDescriptor::for_level(Path::new("levels"), 1)
}

pub(crate) fn level_with_rules(rows: &[&str], rules: LevelRules) -> Level {
    let enemies = EnemyTable::builtin();
    let mut assets = MemoryAssets::standard();
    build_level(
        &test_descriptor(),
        &grids_with_portal(rows),
        LevelContext {
            assets: &mut assets,
            enemies: &enemies,
            display: DisplayConfig::from_tile_size(TEST_TILE as u32),
            rules,
        },
    )
    .expect("sketched level")
}

pub(crate) fn level_from_rows(rows: &[&str]) -> Level {
    level_with_rules(rows, LevelRules::default())
}

pub(crate) fn unstarted_level(rows: &[&str]) -> Level {
    let enemies = EnemyTable::builtin();
    let mut assets = MemoryAssets::standard();
    assemble_level(
        &test_descriptor(),
        &grids_with_portal(rows),
        LevelContext {
            assets: &mut assets,
            enemies: &enemies,
            display: DisplayConfig::from_tile_size(TEST_TILE as u32),
            rules: LevelRules::default(),
        },
    )
    .expect("sketched level")
}
