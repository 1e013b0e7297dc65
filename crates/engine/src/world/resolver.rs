//! Per-frame collision and scroll resolution.
//!
//! Player collision phases mutate the player against read-only tile slices.
//! Patrol reversal and world scroll only compute decisions; `Level` applies
//! them in its fixed frame order.

use super::display::DisplayConfig;
use super::geometry::Rect;
use super::player::Player;
use super::tile::{Axis, Tile};

/// Fraction of a tile a platform face may be penetrated by and still count
/// as a hit on that face. Absorbs the platform outrunning a single check.
const PLATFORM_FACE_TOLERANCE_TILES: f32 = 1.0 / 3.0;
/// Downward speed given to a player who bumps a platform's underside, at the
/// reference tile size.
const PLATFORM_UNDERSIDE_REBOUND: f32 = 1.0;
/// Pixels a rider sinks into a rising platform, at the reference tile size.
const PLATFORM_RISE_SETTLE: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlatformTuning {
    pub face_tolerance: f32,
    pub underside_rebound: f32,
    pub rise_settle: f32,
}

impl PlatformTuning {
    pub fn for_display(display: &DisplayConfig) -> Self {
        let ratio = display.screen_ratio();
        Self {
            face_tolerance: display.tile_size_f32() * PLATFORM_FACE_TOLERANCE_TILES,
            underside_rebound: PLATFORM_UNDERSIDE_REBOUND * ratio,
            rise_settle: PLATFORM_RISE_SETTLE * ratio,
        }
    }
}

/// Side of the player a solid tile was pinned against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallSide {
    Left,
    Right,
}

/// Pushes the player out of terrain that the world shift just moved into it,
/// back along the direction the tiles travelled.
pub(crate) fn resolve_world_shift(
    player: &mut Player,
    terrain: &[Tile],
    world_shift: f32,
) -> Option<WallSide> {
    if world_shift == 0.0 {
        return None;
    }

    let mut wall = None;
    for tile in terrain {
        let solid = tile.rect();
        if !solid.overlaps(&player.rect) {
            continue;
        }
        if world_shift < 0.0 {
            player.rect.set_right(solid.left());
            wall = Some(WallSide::Right);
        } else {
            player.rect.set_left(solid.right());
            wall = Some(WallSide::Left);
        }
    }
    wall
}

/// Moves the player by its horizontal intent and pins it against any solid
/// tile it entered. Returns the side that was hit.
pub(crate) fn resolve_horizontal(player: &mut Player, terrain: &[Tile]) -> Option<WallSide> {
    player.rect.x += player.velocity.x * player.current_speed;

    let mut wall = None;
    for tile in terrain {
        let solid = tile.rect();
        if !solid.overlaps(&player.rect) {
            continue;
        }
        if player.velocity.x < 0.0 {
            player.rect.set_left(solid.right());
            wall = Some(WallSide::Left);
        } else if player.velocity.x > 0.0 {
            player.rect.set_right(solid.left());
            wall = Some(WallSide::Right);
        }
    }

    // Clipping a wall mid-fall is not a landing.
    if wall.is_some() && player.velocity.y > 0.0 {
        player.on_ground = false;
    }
    wall
}

/// Applies gravity, then pins the player to the first face it crossed.
pub(crate) fn resolve_vertical(player: &mut Player, terrain: &[Tile]) {
    player.apply_gravity();

    for tile in terrain {
        let solid = tile.rect();
        if !solid.overlaps(&player.rect) {
            continue;
        }
        if player.velocity.y > 0.0 {
            player.rect.set_bottom(solid.top());
            player.velocity.y = 0.0;
            player.on_ground = true;
        } else if player.velocity.y < 0.0 {
            player.rect.set_top(solid.bottom());
            player.velocity.y = 0.0;
        }
    }

    if player.velocity.y != 0.0 {
        player.on_ground = false;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformFace {
    Top,
    Underside,
    Left,
    Right,
}

/// Face of `platform` the player box hit, if any face is within tolerance.
pub fn platform_face_hit(
    player: &Rect,
    falling_or_resting: bool,
    platform: &Rect,
    tolerance: f32,
) -> Option<PlatformFace> {
    if !platform.overlaps(player) {
        return None;
    }
    let top_depth = player.bottom() - platform.top();
    let underside_depth = platform.bottom() - player.top();
    let left_depth = player.right() - platform.left();
    let right_depth = platform.right() - player.left();

    if falling_or_resting && top_depth <= tolerance {
        Some(PlatformFace::Top)
    } else if !falling_or_resting && underside_depth <= tolerance {
        Some(PlatformFace::Underside)
    } else if left_depth <= tolerance {
        Some(PlatformFace::Left)
    } else if right_depth <= tolerance {
        Some(PlatformFace::Right)
    } else {
        None
    }
}

/// Lands, bumps or blocks the player against moving platforms. A rider is
/// carried by the platform's own motion.
pub(crate) fn resolve_platforms(player: &mut Player, platforms: &[Tile], tuning: &PlatformTuning) {
    player.on_platform = false;

    for platform in platforms {
        let Some(patrol) = platform.patrol() else {
            continue;
        };
        let bounds = platform.rect();
        let face = platform_face_hit(
            &player.rect,
            player.velocity.y >= 0.0,
            &bounds,
            tuning.face_tolerance,
        );
        match face {
            Some(PlatformFace::Top) => {
                player.rect.set_bottom(bounds.top());
                player.velocity.y = 0.0;
                player.on_ground = true;
                player.on_platform = true;
                match patrol.axis {
                    Axis::Horizontal => player.rect.x += patrol.speed,
                    Axis::Vertical => {
                        // Sink far enough that next frame's platform step
                        // still meets the rider.
                        let settle = if patrol.speed > 0.0 {
                            patrol.speed
                        } else {
                            tuning.rise_settle
                        };
                        player.rect.y += settle;
                    }
                }
            }
            Some(PlatformFace::Underside) => {
                player.rect.set_top(bounds.bottom());
                player.velocity.y = tuning.underside_rebound;
            }
            Some(PlatformFace::Left) => player.rect.set_right(bounds.left()),
            Some(PlatformFace::Right) => player.rect.set_left(bounds.right()),
            None => {}
        }
    }
}

/// Indices of patrolling tiles touching any constraint this frame. Sustained
/// overlap reports the tile again on every frame it persists.
pub fn constraint_reversals(patrollers: &[Tile], constraints: &[Tile]) -> Vec<usize> {
    patrollers
        .iter()
        .enumerate()
        .filter(|(_, tile)| tile.patrol().is_some())
        .filter(|(_, tile)| {
            let bounds = tile.rect();
            constraints
                .iter()
                .any(|constraint| constraint.rect().overlaps(&bounds))
        })
        .map(|(index, _)| index)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollInput {
    pub player: Rect,
    pub direction_x: f32,
    pub max_speed: f32,
    /// Signed sum of every world shift so far; never positive.
    pub total_world_shift: f32,
    pub world_length: f32,
    pub screen_width: f32,
    /// Terrain the player is pinned against this frame.
    pub wall: Option<WallSide>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollOutcome {
    /// Player is at the world's left edge.
    BlockLeft,
    /// Player is at the screen's right edge.
    BlockRight,
    /// Camera follows a player walking left; geometry moves right.
    ScrollWorldRight,
    /// Camera follows a player walking right; geometry moves left.
    ScrollWorldLeft,
    Free,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollDecision {
    pub outcome: ScrollOutcome,
    pub world_shift: f32,
}

impl ScrollDecision {
    fn still(outcome: ScrollOutcome) -> Self {
        Self {
            outcome,
            world_shift: 0.0,
        }
    }
}

pub fn decide_scroll(input: &ScrollInput) -> ScrollDecision {
    let half_screen = input.screen_width * 0.5;
    let scrolled = -input.total_world_shift;
    let max_scroll = input.world_length - input.screen_width;

    if input.player.left() <= input.total_world_shift + input.max_speed {
        ScrollDecision::still(ScrollOutcome::BlockLeft)
    } else if input.player.right() >= input.screen_width - input.max_speed {
        ScrollDecision::still(ScrollOutcome::BlockRight)
    } else if input.player.center_x() < half_screen
        && input.direction_x < 0.0
        && scrolled > 0.0
        && input.wall != Some(WallSide::Left)
    {
        ScrollDecision {
            outcome: ScrollOutcome::ScrollWorldRight,
            world_shift: input.max_speed.min(scrolled),
        }
    } else if input.player.center_x() > half_screen
        && input.direction_x > 0.0
        && scrolled < max_scroll
        && input.wall != Some(WallSide::Right)
    {
        ScrollDecision {
            outcome: ScrollOutcome::ScrollWorldLeft,
            world_shift: -input.max_speed.min(max_scroll - scrolled),
        }
    } else {
        ScrollDecision::still(ScrollOutcome::Free)
    }
}

/// Gates the player's movement for the scroll outcome. While the camera
/// moves the player stands still on screen.
pub(crate) fn apply_scroll_to_player(player: &mut Player, outcome: ScrollOutcome) {
    let max_speed = player.max_speed();
    match outcome {
        ScrollOutcome::BlockLeft => {
            player.can_move_left = false;
            player.can_move_right = true;
            player.current_speed = max_speed;
        }
        ScrollOutcome::BlockRight => {
            player.can_move_left = true;
            player.can_move_right = false;
            player.current_speed = max_speed;
        }
        ScrollOutcome::ScrollWorldRight | ScrollOutcome::ScrollWorldLeft => {
            player.can_move_left = true;
            player.can_move_right = true;
            player.current_speed = 0.0;
        }
        ScrollOutcome::Free => {
            player.can_move_left = true;
            player.can_move_right = true;
            player.current_speed = max_speed;
        }
    }
}

pub fn overlapping_indices(bounds: &Rect, tiles: &[Tile]) -> Vec<usize> {
    tiles
        .iter()
        .enumerate()
        .filter(|(_, tile)| tile.rect().overlaps(bounds))
        .map(|(index, _)| index)
        .collect()
}

pub fn overlaps_any(bounds: &Rect, tiles: &[Tile]) -> bool {
    tiles.iter().any(|tile| tile.rect().overlaps(bounds))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::geometry::Vec2;
    use crate::world::player::{PlayerAnimations, PlayerTuning};
    use crate::world::render::{ImageId, ImageRef};
    use crate::world::tile::Patrol;

    const TILE: f32 = 64.0;

    fn image() -> ImageRef {
        ImageRef::new(ImageId(0))
    }

    fn player_at(x: f32, y: f32) -> Player {
        let display = DisplayConfig::from_tile_size(64);
        let animations =
            PlayerAnimations::new(vec![image()], vec![image()], image()).expect("animations");
        Player::new(
            Vec2::new(x, y),
            TILE,
            PlayerTuning::for_display(&display),
            animations,
        )
    }

    fn solid(col: f32, row: f32) -> Tile {
        Tile::new_static(Rect::square(col * TILE, row * TILE, TILE), image())
    }

    fn platform(x: f32, y: f32, axis: Axis, speed: f32) -> Tile {
        Tile::new_moving(Rect::square(x, y, TILE), image(), Patrol::new(axis, speed))
    }

    fn tuning() -> PlatformTuning {
        PlatformTuning::for_display(&DisplayConfig::from_tile_size(64))
    }

    #[test]
    fn moving_right_into_wall_pins_right_edge() {
        let mut player = player_at(TILE * 2.0 - 4.0, 0.0);
        player.velocity.x = 1.0;
        let wall = [solid(3.0, 0.0)];
        assert_eq!(resolve_horizontal(&mut player, &wall), Some(WallSide::Right));
        assert_eq!(player.rect().right(), TILE * 3.0);
    }

    #[test]
    fn moving_left_into_wall_pins_left_edge() {
        let mut player = player_at(TILE + 4.0, 0.0);
        player.velocity.x = -1.0;
        let wall = [solid(0.0, 0.0)];
        assert_eq!(resolve_horizontal(&mut player, &wall), Some(WallSide::Left));
        assert_eq!(player.rect().left(), TILE);
    }

    #[test]
    fn standing_player_is_pushed_out_by_shifted_wall() {
        let mut player = player_at(TILE * 2.0, TILE);
        let walls = [
            solid(2.0, 0.0),
            Tile::new_static(Rect::square(TILE * 3.0 - 8.0, TILE, TILE), image()),
        ];
        assert_eq!(
            resolve_world_shift(&mut player, &walls, -8.0),
            Some(WallSide::Right)
        );
        assert_eq!(player.rect().right(), TILE * 3.0 - 8.0);
        assert_eq!(player.rect().y, TILE);
        assert!(!overlaps_any(&player.rect(), &walls));
    }

    #[test]
    fn shift_toward_the_player_from_the_left_pins_left_edge() {
        let mut player = player_at(TILE * 2.0, 0.0);
        let walls = [Tile::new_static(Rect::square(TILE + 8.0, 0.0, TILE), image())];
        assert_eq!(
            resolve_world_shift(&mut player, &walls, 8.0),
            Some(WallSide::Left)
        );
        assert_eq!(player.rect().left(), TILE * 2.0 + 8.0);
    }

    #[test]
    fn no_shift_leaves_player_alone() {
        let mut player = player_at(TILE * 2.0, 0.0);
        assert_eq!(resolve_world_shift(&mut player, &[solid(3.0, 0.0)], 0.0), None);
        assert_eq!(player.rect().x, TILE * 2.0);
    }

    #[test]
    fn side_hit_while_falling_cancels_ground() {
        let mut player = player_at(TILE * 2.0 - 4.0, 0.0);
        player.velocity = Vec2::new(1.0, 5.0);
        player.on_ground = true;
        resolve_horizontal(&mut player, &[solid(3.0, 0.0)]);
        assert!(!player.on_ground());
    }

    #[test]
    fn falling_onto_floor_lands() {
        let mut player = player_at(0.0, TILE - 10.0);
        player.velocity.y = 12.0;
        let floor = [solid(0.0, 2.0)];
        resolve_vertical(&mut player, &floor);
        assert_eq!(player.rect().bottom(), TILE * 2.0);
        assert_eq!(player.velocity().y, 0.0);
        assert!(player.on_ground());
    }

    #[test]
    fn resting_player_stays_grounded_every_frame() {
        let mut player = player_at(0.0, TILE);
        let floor = [solid(0.0, 2.0)];
        for _ in 0..10 {
            resolve_vertical(&mut player, &floor);
            assert!(player.on_ground());
            assert_eq!(player.rect().bottom(), TILE * 2.0);
        }
    }

    #[test]
    fn rising_into_ceiling_pins_top() {
        let mut player = player_at(0.0, TILE + 4.0);
        player.velocity.y = -10.0;
        let ceiling = [solid(0.0, 0.0)];
        resolve_vertical(&mut player, &ceiling);
        assert_eq!(player.rect().top(), TILE);
        assert_eq!(player.velocity().y, 0.0);
        assert!(!player.on_ground());
    }

    #[test]
    fn free_fall_clears_ground() {
        let mut player = player_at(0.0, 0.0);
        player.on_ground = true;
        resolve_vertical(&mut player, &[]);
        assert!(!player.on_ground());
    }

    #[test]
    fn face_hit_classification() {
        let platform_box = Rect::square(100.0, 100.0, TILE);
        let tolerance = TILE / 3.0;
        let landing = Rect::square(100.0, 100.0 - TILE + 5.0, TILE);
        let bump = Rect::square(100.0, 100.0 + TILE - 5.0, TILE);
        let left = Rect::square(100.0 - TILE + 5.0, 100.0, TILE);
        let right = Rect::square(100.0 + TILE - 5.0, 100.0, TILE);
        assert_eq!(
            platform_face_hit(&landing, true, &platform_box, tolerance),
            Some(PlatformFace::Top)
        );
        assert_eq!(
            platform_face_hit(&bump, false, &platform_box, tolerance),
            Some(PlatformFace::Underside)
        );
        assert_eq!(
            platform_face_hit(&left, true, &platform_box, tolerance),
            Some(PlatformFace::Left)
        );
        assert_eq!(
            platform_face_hit(&right, true, &platform_box, tolerance),
            Some(PlatformFace::Right)
        );
        let apart = Rect::square(0.0, 0.0, TILE);
        assert_eq!(platform_face_hit(&apart, true, &platform_box, tolerance), None);
    }

    #[test]
    fn rider_is_carried_by_horizontal_platform() {
        let mut player = player_at(200.0, 300.0 - TILE + 2.0);
        player.velocity.y = 2.0;
        let platforms = [platform(200.0, 300.0, Axis::Horizontal, -3.0)];
        resolve_platforms(&mut player, &platforms, &tuning());
        assert!(player.on_ground());
        assert!(player.on_platform());
        assert_eq!(player.velocity().y, 0.0);
        assert_eq!(player.rect().bottom(), 300.0);
        assert_eq!(player.rect().x, 197.0);
    }

    #[test]
    fn rider_sinks_into_descending_platform_by_its_speed() {
        let mut player = player_at(200.0, 300.0 - TILE + 1.0);
        player.velocity.y = 1.0;
        let platforms = [platform(200.0, 300.0, Axis::Vertical, 3.0)];
        resolve_platforms(&mut player, &platforms, &tuning());
        assert_eq!(player.rect().bottom(), 303.0);
        assert!(player.on_platform());
    }

    #[test]
    fn rider_settles_on_rising_platform() {
        let mut player = player_at(200.0, 300.0 - TILE + 4.0);
        let platforms = [platform(200.0, 300.0, Axis::Vertical, -3.0)];
        resolve_platforms(&mut player, &platforms, &tuning());
        assert_eq!(player.rect().bottom(), 301.0);
    }

    #[test]
    fn underside_bump_rebounds_downward() {
        let mut player = player_at(200.0, 300.0 + TILE - 6.0);
        player.velocity.y = -9.0;
        let platforms = [platform(200.0, 300.0, Axis::Horizontal, 3.0)];
        resolve_platforms(&mut player, &platforms, &tuning());
        assert_eq!(player.rect().top(), 300.0 + TILE);
        assert!(player.velocity().y > 0.0);
        assert!(!player.on_platform());
    }

    #[test]
    fn platform_side_blocks_player() {
        let mut player = player_at(200.0 - TILE + 6.0, 300.0);
        let platforms = [platform(200.0, 300.0, Axis::Vertical, 3.0)];
        resolve_platforms(&mut player, &platforms, &tuning());
        assert_eq!(player.rect().right(), 200.0);
    }

    #[test]
    fn reversal_repeats_while_overlap_persists() {
        let enemy = Tile::new_enemy(
            Rect::square(10.0, 0.0, TILE),
            image(),
            Patrol::new(Axis::Horizontal, 3.0),
        );
        let far = Tile::new_enemy(
            Rect::square(500.0, 0.0, TILE),
            image(),
            Patrol::new(Axis::Horizontal, 3.0),
        );
        let constraints = [Tile::new_constraint(Rect::square(0.0, 0.0, TILE))];
        let patrollers = [enemy, far];
        assert_eq!(constraint_reversals(&patrollers, &constraints), vec![0]);
        assert_eq!(constraint_reversals(&patrollers, &constraints), vec![0]);
    }

    fn scroll_input(player_x: f32, direction_x: f32, total: f32) -> ScrollInput {
        ScrollInput {
            player: Rect::square(player_x, 0.0, TILE),
            direction_x,
            max_speed: 8.0,
            total_world_shift: total,
            world_length: 4000.0,
            screen_width: 1792.0,
            wall: None,
        }
    }

    #[test]
    fn wall_ahead_holds_the_camera() {
        let mut pinned_right = scroll_input(900.0, 1.0, 0.0);
        pinned_right.wall = Some(WallSide::Right);
        assert_eq!(
            decide_scroll(&pinned_right),
            ScrollDecision::still(ScrollOutcome::Free)
        );

        let mut pinned_left = scroll_input(800.0, -1.0, -16.0);
        pinned_left.wall = Some(WallSide::Left);
        assert_eq!(decide_scroll(&pinned_left).world_shift, 0.0);

        let mut wall_behind = scroll_input(900.0, 1.0, 0.0);
        wall_behind.wall = Some(WallSide::Left);
        assert_eq!(decide_scroll(&wall_behind).outcome, ScrollOutcome::ScrollWorldLeft);
    }

    #[test]
    fn left_world_edge_blocks_left() {
        let decision = decide_scroll(&scroll_input(4.0, -1.0, 0.0));
        assert_eq!(decision.outcome, ScrollOutcome::BlockLeft);
        assert_eq!(decision.world_shift, 0.0);
    }

    #[test]
    fn right_screen_edge_blocks_right() {
        let decision = decide_scroll(&scroll_input(1792.0 - TILE - 4.0, 1.0, -2208.0));
        assert_eq!(decision.outcome, ScrollOutcome::BlockRight);
    }

    #[test]
    fn centered_player_walking_right_scrolls_world_left() {
        let decision = decide_scroll(&scroll_input(900.0, 1.0, 0.0));
        assert_eq!(decision.outcome, ScrollOutcome::ScrollWorldLeft);
        assert_eq!(decision.world_shift, -8.0);
    }

    #[test]
    fn scroll_left_stops_exactly_at_world_end() {
        let max_scroll = 4000.0 - 1792.0;
        let decision = decide_scroll(&scroll_input(900.0, 1.0, -(max_scroll - 3.0)));
        assert_eq!(decision.world_shift, -3.0);
        let done = decide_scroll(&scroll_input(900.0, 1.0, -max_scroll));
        assert_eq!(done.outcome, ScrollOutcome::Free);
    }

    #[test]
    fn walking_left_only_scrolls_after_world_has_moved() {
        let unscrolled = decide_scroll(&scroll_input(800.0, -1.0, 0.0));
        assert_eq!(unscrolled.outcome, ScrollOutcome::Free);
        let scrolled = decide_scroll(&scroll_input(800.0, -1.0, -16.0));
        assert_eq!(scrolled.outcome, ScrollOutcome::ScrollWorldRight);
        assert_eq!(scrolled.world_shift, 8.0);
    }

    #[test]
    fn scrolling_freezes_player_speed() {
        let mut player = player_at(900.0, 0.0);
        apply_scroll_to_player(&mut player, ScrollOutcome::ScrollWorldLeft);
        assert_eq!(player.current_speed(), 0.0);
        apply_scroll_to_player(&mut player, ScrollOutcome::BlockLeft);
        assert!(!player.can_move_left());
        assert!(player.can_move_right());
        assert_eq!(player.current_speed(), player.max_speed());
    }
}
