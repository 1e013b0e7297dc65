/// Tile size every pixel constant in the game is authored against.
pub const REFERENCE_TILE_SIZE: u32 = 64;
pub const DEFAULT_VERTICAL_TILES: u32 = 14;
/// Tiles of head-room left between the play area and the monitor height.
const WINDOW_BUFFER_TILES: u32 = 2;
const MIN_TILE_SIZE: u32 = 4;

/// Screen-derived sizes, computed once at startup and passed by value into
/// everything that needs pixel dimensions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayConfig {
    tile_size: u32,
    vertical_tiles: u32,
    screen_width: u32,
    screen_height: u32,
    screen_ratio: f32,
}

impl DisplayConfig {
    pub fn from_tile_size(tile_size: u32) -> Self {
        Self::with_vertical_tiles(tile_size, DEFAULT_VERTICAL_TILES)
    }

    pub fn with_vertical_tiles(tile_size: u32, vertical_tiles: u32) -> Self {
        let tile_size = tile_size.max(MIN_TILE_SIZE);
        let vertical_tiles = vertical_tiles.max(1);
        let screen_height = tile_size * vertical_tiles;
        Self {
            tile_size,
            vertical_tiles,
            screen_width: screen_height * 2,
            screen_height,
            screen_ratio: tile_size as f32 / REFERENCE_TILE_SIZE as f32,
        }
    }

    /// Largest tile size that fits the play area plus a small buffer into
    /// `monitor_height` pixels.
    pub fn from_monitor_height(monitor_height: u32) -> Self {
        let tile_size = monitor_height / (DEFAULT_VERTICAL_TILES + WINDOW_BUFFER_TILES);
        Self::from_tile_size(tile_size)
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    pub fn tile_size_f32(&self) -> f32 {
        self.tile_size as f32
    }

    pub fn vertical_tiles(&self) -> u32 {
        self.vertical_tiles
    }

    pub fn screen_width(&self) -> u32 {
        self.screen_width
    }

    pub fn screen_height(&self) -> u32 {
        self.screen_height
    }

    pub fn screen_ratio(&self) -> f32 {
        self.screen_ratio
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self::from_tile_size(32)
    }
}
