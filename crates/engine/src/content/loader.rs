use tracing::info;

use crate::world::{
    Animation, Axis, DisplayConfig, Level, LevelLayout, LevelRules, Patrol, Player,
    PlayerAnimations, PlayerTuning, Rect, Tile, Vec2, PLATFORM_BASE_SPEED, TILE_ANIMATION_RATE,
};

use super::assets::{AssetError, AssetProvider};
use super::descriptor::{LayerKind, LevelDescriptor, LevelGrids};
use super::enemy_table::{EnemyBehavior, EnemyTable};
use super::error::{GridError, LevelDataError, LevelDataErrorCode, LevelLoadError};
use super::grid::TileGrid;

const PLAYER_SPAWN_CODE: i32 = 0;
const PORTAL_SPAWN_CODE: i32 = 1;

pub const PLAYER_IDLE_KEY: &str = "player/idle";
pub const PLAYER_RUN_KEY: &str = "player/run";
pub const PLAYER_DEAD_KEY: &str = "player/dead";
pub const PORTAL_KEY: &str = "world/portal";

/// Everything a level build needs besides its grids.
pub struct LevelContext<'a> {
    pub assets: &'a mut dyn AssetProvider,
    pub enemies: &'a EnemyTable,
    pub display: DisplayConfig,
    pub rules: LevelRules,
}

/// Reads the level's layer files and builds a running level.
pub fn load_level(
    descriptor: &LevelDescriptor,
    context: LevelContext<'_>,
) -> Result<Level, LevelLoadError> {
    let grids = descriptor.read_layers()?;
    build_level(descriptor, &grids, context)
}

/// Builds a running level from already-decoded grids.
pub fn build_level(
    descriptor: &LevelDescriptor,
    grids: &LevelGrids,
    context: LevelContext<'_>,
) -> Result<Level, LevelLoadError> {
    let mut level = assemble_level(descriptor, grids, context)?;
    level.start();
    Ok(level)
}

/// Builds the level but leaves it in `Loading`.
pub(crate) fn assemble_level(
    descriptor: &LevelDescriptor,
    grids: &LevelGrids,
    context: LevelContext<'_>,
) -> Result<Level, LevelLoadError> {
    let LevelContext {
        assets,
        enemies,
        display,
        rules,
    } = context;

    let mut builder = LayoutBuilder {
        descriptor,
        assets,
        enemies,
        display,
    };
    let layout = builder.layout(grids)?;
    let player = builder.player(layout.player_spawn)?;

    info!(
        level = descriptor.id,
        theme = descriptor.theme.name,
        terrain = layout.terrain.len(),
        platforms = layout.platforms.len(),
        items = layout.items.len(),
        enemies = layout.enemies.len(),
        constraints = layout.constraints.len(),
        world_length = layout.world_length,
        "level_loaded"
    );

    Ok(Level::new(
        descriptor.id,
        layout,
        player,
        display,
        rules,
        descriptor.theme.background,
    ))
}

struct LayoutBuilder<'a> {
    descriptor: &'a LevelDescriptor,
    assets: &'a mut dyn AssetProvider,
    enemies: &'a EnemyTable,
    display: DisplayConfig,
}

impl LayoutBuilder<'_> {
    fn layout(&mut self, grids: &LevelGrids) -> Result<LevelLayout, LevelLoadError> {
        let (player_spawn, portal_rect) = self.spawns(&grids.player)?;
        let portal = Tile::new_static(portal_rect, self.assets.image(PORTAL_KEY)?);

        Ok(LevelLayout {
            terrain: self.keyed_layer(LayerKind::Terrain, &grids.terrain)?,
            platforms: self.platforms(&grids.platforms)?,
            fill: self.fill(&grids.fill)?,
            items: self.items(&grids.items)?,
            enemies: self.enemy_layer(&grids.enemies)?,
            constraints: self.constraints(&grids.constraints)?,
            portal,
            player_spawn,
            world_length: grids.terrain.width() as f32 * self.display.tile_size_f32(),
        })
    }

    fn cell_rect(&self, row: usize, column: usize) -> Rect {
        let size = self.display.tile_size_f32();
        Rect::square(column as f32 * size, row as f32 * size, size)
    }

    fn data_error(
        &self,
        layer: LayerKind,
        code: LevelDataErrorCode,
        message: String,
        cell: Option<(usize, usize)>,
    ) -> LevelDataError {
        let error = match cell {
            Some((row, column)) => GridError::at(code, message, row + 1, column + 1),
            None => GridError {
                code,
                message,
                location: None,
            },
        };
        error.in_layer(self.descriptor.id, layer, self.descriptor.layer_path(layer))
    }

    /// Only `-1` marks an empty cell; other negative codes are unknown.
    fn check_code(
        &self,
        layer: LayerKind,
        row: usize,
        column: usize,
        code: i32,
    ) -> Result<(), LevelDataError> {
        if code < 0 {
            return Err(self.data_error(
                layer,
                LevelDataErrorCode::UnknownCode,
                format!("code {code} is not a valid {} code", layer.name()),
                Some((row, column)),
            ));
        }
        Ok(())
    }

    /// Cell codes name an image under the layer's directory.
    fn keyed_layer(
        &mut self,
        layer: LayerKind,
        grid: &TileGrid,
    ) -> Result<Vec<Tile>, LevelLoadError> {
        let mut tiles = Vec::new();
        for (row, column, code) in grid.occupied() {
            self.check_code(layer, row, column, code)?;
            let image = self.assets.image(&format!("{}/{code}", layer.name()))?;
            tiles.push(Tile::new_static(self.cell_rect(row, column), image));
        }
        Ok(tiles)
    }

    /// One theme image for the whole layer; codes only mark occupancy.
    fn fill(&mut self, grid: &TileGrid) -> Result<Vec<Tile>, LevelLoadError> {
        let mut tiles = Vec::new();
        let mut image = None;
        for (row, column, _) in grid.occupied() {
            let fill_image = match image {
                Some(fill_image) => fill_image,
                None => {
                    let loaded = self.assets.image(self.descriptor.theme.fill_key)?;
                    image = Some(loaded);
                    loaded
                }
            };
            tiles.push(Tile::new_static(self.cell_rect(row, column), fill_image));
        }
        Ok(tiles)
    }

    /// A multi-frame item key animates in place.
    fn items(&mut self, grid: &TileGrid) -> Result<Vec<Tile>, LevelLoadError> {
        let mut tiles = Vec::new();
        for (row, column, code) in grid.occupied() {
            self.check_code(LayerKind::Items, row, column, code)?;
            let key = format!("items/{code}");
            let frames = self.assets.frames(&key)?;
            let rect = self.cell_rect(row, column);
            let tile = if frames.len() > 1 {
                let animation = Animation::new(frames, TILE_ANIMATION_RATE)
                    .ok_or_else(|| AssetError::key_not_found(&key))?;
                Tile::new_animated(rect, animation)
            } else {
                let image = frames
                    .first()
                    .copied()
                    .ok_or_else(|| AssetError::key_not_found(&key))?;
                Tile::new_static(rect, image)
            };
            tiles.push(tile);
        }
        Ok(tiles)
    }

    /// Even codes patrol horizontally, odd codes vertically.
    fn platforms(&mut self, grid: &TileGrid) -> Result<Vec<Tile>, LevelLoadError> {
        let speed = PLATFORM_BASE_SPEED * self.display.screen_ratio();
        let mut tiles = Vec::new();
        for (row, column, code) in grid.occupied() {
            self.check_code(LayerKind::Platforms, row, column, code)?;
            let image = self.assets.image(&format!("platforms/{code}"))?;
            let patrol = Patrol::new(Axis::from_platform_code(code), speed);
            tiles.push(Tile::new_moving(self.cell_rect(row, column), image, patrol));
        }
        Ok(tiles)
    }

    fn enemy_layer(&mut self, grid: &TileGrid) -> Result<Vec<Tile>, LevelLoadError> {
        let ratio = self.display.screen_ratio();
        let mut tiles = Vec::new();
        for (row, column, code) in grid.occupied() {
            let Some(definition) = self.enemies.get(code).copied() else {
                return Err(self
                    .data_error(
                        LayerKind::Enemies,
                        LevelDataErrorCode::UnknownCode,
                        format!("no enemy is defined for code {code}"),
                        Some((row, column)),
                    )
                    .into());
            };
            let key = format!("enemies/{code}");
            let rect = self.cell_rect(row, column);
            let patrol = Patrol::new(definition.axis, definition.speed * ratio);
            let tile = match definition.behavior {
                EnemyBehavior::Static => Tile::new_enemy(rect, self.assets.image(&key)?, patrol),
                EnemyBehavior::Animated => {
                    let frames = self.assets.frames(&key)?;
                    let animation = Animation::new(frames, TILE_ANIMATION_RATE)
                        .ok_or_else(|| AssetError::key_not_found(&key))?;
                    Tile::new_animated_enemy(rect, animation, patrol)
                }
            };
            tiles.push(tile);
        }
        Ok(tiles)
    }

    fn constraints(&self, grid: &TileGrid) -> Result<Vec<Tile>, LevelDataError> {
        let mut tiles = Vec::new();
        for (row, column, code) in grid.occupied() {
            self.check_code(LayerKind::Constraints, row, column, code)?;
            tiles.push(Tile::new_constraint(self.cell_rect(row, column)));
        }
        Ok(tiles)
    }

    /// Exactly one player spawn and one portal are required.
    fn spawns(&self, grid: &TileGrid) -> Result<(Vec2, Rect), LevelDataError> {
        let mut player = None;
        let mut portal = None;
        for (row, column, code) in grid.occupied() {
            let (slot, what) = match code {
                PLAYER_SPAWN_CODE => (&mut player, "player spawn"),
                PORTAL_SPAWN_CODE => (&mut portal, "portal"),
                _ => {
                    return Err(self.data_error(
                        LayerKind::Player,
                        LevelDataErrorCode::UnknownCode,
                        format!("code {code} is neither a player spawn (0) nor a portal (1)"),
                        Some((row, column)),
                    ))
                }
            };
            if slot.is_some() {
                return Err(self.data_error(
                    LayerKind::Player,
                    LevelDataErrorCode::DuplicateSpawn,
                    format!("level has more than one {what}"),
                    Some((row, column)),
                ));
            }
            *slot = Some(self.cell_rect(row, column));
        }

        let missing = |what: &str| {
            self.data_error(
                LayerKind::Player,
                LevelDataErrorCode::MissingSpawn,
                format!("level has no {what}"),
                None,
            )
        };
        let player = player.ok_or_else(|| missing("player spawn"))?;
        let portal = portal.ok_or_else(|| missing("portal"))?;
        Ok((Vec2::new(player.x, player.y), portal))
    }

    fn player(&mut self, spawn: Vec2) -> Result<Player, AssetError> {
        let idle = self.assets.frames(PLAYER_IDLE_KEY)?;
        let run = self.assets.frames(PLAYER_RUN_KEY)?;
        let dead = self.assets.image(PLAYER_DEAD_KEY)?;
        let animations = PlayerAnimations::new(idle, run, dead)
            .ok_or_else(|| AssetError::key_not_found(PLAYER_IDLE_KEY))?;
        Ok(Player::new(
            spawn,
            self.display.tile_size_f32(),
            PlayerTuning::for_display(&self.display),
            animations,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{grids_from_rows, MemoryAssets};
    use crate::world::{LevelStatus, TileKind};
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn descriptor(id: u32) -> LevelDescriptor {
        LevelDescriptor::for_level(Path::new("levels"), id)
    }

    fn build(grids: &LevelGrids, assets: &mut MemoryAssets) -> Result<Level, LevelLoadError> {
        let enemies = EnemyTable::builtin();
        build_level(
            &descriptor(1),
            grids,
            LevelContext {
                assets,
                enemies: &enemies,
                display: DisplayConfig::from_tile_size(32),
                rules: LevelRules::default(),
            },
        )
    }

    #[test]
    fn builds_typed_tiles_on_the_pixel_grid() {
        let grids = grids_from_rows(&[
            "P.......O",
            "..i.e.cH.",
            "XXXXffXXX",
        ]);
        let mut assets = MemoryAssets::standard();
        let level = build(&grids, &mut assets).expect("level");

        assert_eq!(level.status(), LevelStatus::Running);
        assert_eq!(level.terrain().len(), 7);
        assert_eq!(level.fill().len(), 2);
        assert_eq!(level.items().len(), 1);
        assert_eq!(level.enemies().len(), 1);
        assert_eq!(level.constraints().len(), 1);
        assert_eq!(level.platforms().len(), 1);
        assert_eq!(level.world_length(), 9.0 * 32.0);

        for tile in level.terrain().iter().chain(level.constraints()) {
            let rect = tile.rect();
            assert_eq!(rect.x % 32.0, 0.0);
            assert_eq!(rect.y % 32.0, 0.0);
        }
        assert_eq!(level.player().rect(), Rect::square(0.0, 0.0, 32.0));
        assert_eq!(level.portal().rect(), Rect::square(8.0 * 32.0, 0.0, 32.0));
    }

    #[test]
    fn platform_axis_comes_from_code_parity_and_speed_scales() {
        let grids = grids_from_rows(&["P.H.V...O", "XXXXXXXXX"]);
        let mut assets = MemoryAssets::standard();
        let level = build(&grids, &mut assets).expect("level");
        let axes: Vec<_> = level
            .platforms()
            .iter()
            .map(|tile| tile.patrol().map(|p| (p.axis, p.speed)))
            .collect();
        assert_eq!(
            axes,
            vec![Some((Axis::Horizontal, 1.5)), Some((Axis::Vertical, 1.5))]
        );
    }

    #[test]
    fn multi_frame_items_animate() {
        let grids = grids_from_rows(&["P.i.j...O", "XXXXXXXXX"]);
        let mut assets = MemoryAssets::standard();
        assets.insert_frames("items/1", 4);
        let level = build(&grids, &mut assets).expect("level");
        let kinds: Vec<_> = level.items().iter().map(Tile::kind).collect();
        assert_eq!(kinds, vec![TileKind::Static, TileKind::Animated]);
    }

    #[test]
    fn enemies_follow_the_definition_table() {
        let grids = grids_from_rows(&["P.e.a...O", "XXXXXXXXX"]);
        let mut assets = MemoryAssets::standard();
        let level = build(&grids, &mut assets).expect("level");
        let kinds: Vec<_> = level.enemies().iter().map(Tile::kind).collect();
        assert_eq!(kinds, vec![TileKind::Enemy, TileKind::AnimatedEnemy]);
        assert_eq!(level.enemies()[0].patrol().map(|p| p.speed), Some(1.5));
    }

    #[test]
    fn unknown_enemy_code_is_invalid_data() {
        let mut grids = grids_from_rows(&["P.......O", "XXXXXXXXX"]);
        grids.enemies = TileGrid::from_rows(vec![vec![-1, 42]]);
        let mut assets = MemoryAssets::standard();
        let error = build(&grids, &mut assets).expect_err("unknown enemy");
        assert_eq!(error.data_code(), Some(LevelDataErrorCode::UnknownCode));
    }

    #[test]
    fn spawn_layer_must_have_one_player_and_one_portal() {
        let mut assets = MemoryAssets::standard();

        let no_portal = grids_from_rows(&["P........", "XXXXXXXXX"]);
        let error = build(&no_portal, &mut assets).expect_err("missing portal");
        assert_eq!(error.data_code(), Some(LevelDataErrorCode::MissingSpawn));

        let two_players = grids_from_rows(&["P.P.....O", "XXXXXXXXX"]);
        let error = build(&two_players, &mut assets).expect_err("duplicate player");
        assert_eq!(error.data_code(), Some(LevelDataErrorCode::DuplicateSpawn));

        let mut stray = grids_from_rows(&["P.......O", "XXXXXXXXX"]);
        stray.player = TileGrid::from_rows(vec![vec![0, 7, 1]]);
        let error = build(&stray, &mut assets).expect_err("stray code");
        assert_eq!(error.data_code(), Some(LevelDataErrorCode::UnknownCode));
    }

    #[test]
    fn missing_image_aborts_the_load() {
        let grids = grids_from_rows(&["P.......O", "XXXXXXXXX"]);
        let mut assets = MemoryAssets::standard();
        assets.remove("terrain/0");
        let error = build(&grids, &mut assets).expect_err("missing terrain image");
        assert!(matches!(
            error,
            LevelLoadError::Asset(AssetError::AssetNotFound { ref key, .. }) if key == "terrain/0"
        ));
    }

    #[test]
    fn negative_codes_other_than_empty_are_rejected() {
        let mut grids = grids_from_rows(&["P.......O", "XXXXXXXXX"]);
        grids.terrain = TileGrid::from_rows(vec![vec![-1, -3]]);
        let mut assets = MemoryAssets::standard();
        let error = build(&grids, &mut assets).expect_err("negative");
        assert_eq!(error.data_code(), Some(LevelDataErrorCode::UnknownCode));
    }

    #[test]
    fn loads_a_level_from_layer_files() {
        let temp = TempDir::new().expect("temp dir");
        let dir = temp.path().join("6");
        fs::create_dir_all(&dir).expect("dir");
        let layers = [
            ("terrain", "-1,-1,-1,-1\n0,0,0,0\n"),
            ("platforms", "-1,-1,-1,-1\n-1,-1,-1,-1\n"),
            ("fill", "-1,-1,-1,-1\n-1,-1,-1,-1\n"),
            ("items", "-1,0,-1,-1\n-1,-1,-1,-1\n"),
            ("enemies", "-1,-1,-1,-1\n-1,-1,-1,-1\n"),
            ("constraints", "-1,-1,-1,-1\n-1,-1,-1,-1\n"),
            ("player", "0,-1,-1,1\n-1,-1,-1,-1\n"),
        ];
        for (name, body) in layers {
            fs::write(dir.join(format!("level_6_{name}.csv")), body).expect("layer");
        }

        let descriptor = LevelDescriptor::for_level(temp.path(), 6);
        let enemies = EnemyTable::builtin();
        let mut assets = MemoryAssets::standard();
        let level = load_level(
            &descriptor,
            LevelContext {
                assets: &mut assets,
                enemies: &enemies,
                display: DisplayConfig::from_tile_size(32),
                rules: LevelRules::default(),
            },
        )
        .expect("level");
        assert_eq!(level.id(), 6);
        assert_eq!(level.total_items(), 1);
        assert_eq!(level.background(), descriptor.theme.background);
    }
}
