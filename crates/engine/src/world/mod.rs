mod display;
mod geometry;
mod level;
mod player;
mod render;
mod resolver;
mod tile;

pub use display::{DisplayConfig, DEFAULT_VERTICAL_TILES, REFERENCE_TILE_SIZE};
pub use geometry::{Rect, Vec2};
pub use level::{FramePhase, Level, LevelLayout, LevelRules, LevelStatus, FRAME_PHASE_ORDER};
pub use player::{
    FrameInput, Player, PlayerAnimations, PlayerStatus, PlayerTuning, PLAYER_ANIMATION_RATE,
};
pub use render::{
    DrawCommand, DrawList, ImageId, ImageRef, RenderSink, PLATFORM_OUTLINE_COLOR,
    TERRAIN_OUTLINE_COLOR,
};
pub use resolver::{
    constraint_reversals, decide_scroll, overlapping_indices, overlaps_any, platform_face_hit,
    PlatformFace, PlatformTuning, ScrollDecision, ScrollInput, ScrollOutcome, WallSide,
};
pub use tile::{
    Animation, Axis, Patrol, Tile, TileBehavior, TileKind, PLATFORM_BASE_SPEED,
    TILE_ANIMATION_RATE,
};
