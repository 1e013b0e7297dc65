use tracing::{debug, info};

use super::display::DisplayConfig;
use super::geometry::{Rect, Vec2};
use super::player::{FrameInput, Player};
use super::render::{RenderSink, PLATFORM_OUTLINE_COLOR, TERRAIN_OUTLINE_COLOR};
use super::resolver::{
    apply_scroll_to_player, constraint_reversals, decide_scroll, overlapping_indices,
    overlaps_any, resolve_horizontal, resolve_platforms, resolve_vertical, resolve_world_shift,
    PlatformTuning, ScrollInput, ScrollOutcome, WallSide,
};
use super::tile::Tile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelStatus {
    Loading,
    Running,
    Complete,
    GameOver,
}

impl LevelStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, LevelStatus::Complete | LevelStatus::GameOver)
    }

    pub fn name(self) -> &'static str {
        match self {
            LevelStatus::Loading => "loading",
            LevelStatus::Running => "running",
            LevelStatus::Complete => "complete",
            LevelStatus::GameOver => "game_over",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelRules {
    /// When false the portal completes the level regardless of items.
    pub portal_requires_all_items: bool,
}

impl Default for LevelRules {
    fn default() -> Self {
        Self {
            portal_requires_all_items: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramePhase {
    Geometry,
    Input,
    Horizontal,
    Vertical,
    Platforms,
    Reversal,
    Scroll,
    Gameplay,
    Animation,
}

impl FramePhase {
    pub fn name(self) -> &'static str {
        match self {
            Self::Geometry => "geometry",
            Self::Input => "input",
            Self::Horizontal => "horizontal",
            Self::Vertical => "vertical",
            Self::Platforms => "platforms",
            Self::Reversal => "reversal",
            Self::Scroll => "scroll",
            Self::Gameplay => "gameplay",
            Self::Animation => "animation",
        }
    }
}

/// Each phase reads positions committed by the ones before it.
pub const FRAME_PHASE_ORDER: [FramePhase; 9] = [
    FramePhase::Geometry,
    FramePhase::Input,
    FramePhase::Horizontal,
    FramePhase::Vertical,
    FramePhase::Platforms,
    FramePhase::Reversal,
    FramePhase::Scroll,
    FramePhase::Gameplay,
    FramePhase::Animation,
];

/// Typed tiles of one level, as produced by the loader.
#[derive(Debug, Clone)]
pub struct LevelLayout {
    pub terrain: Vec<Tile>,
    pub platforms: Vec<Tile>,
    pub fill: Vec<Tile>,
    pub items: Vec<Tile>,
    pub enemies: Vec<Tile>,
    pub constraints: Vec<Tile>,
    pub portal: Tile,
    pub player_spawn: Vec2,
    pub world_length: f32,
}

#[derive(Debug, Clone)]
pub struct Level {
    id: u32,
    display: DisplayConfig,
    rules: LevelRules,
    platform_tuning: PlatformTuning,
    background: [u8; 4],
    player: Player,
    portal: Tile,
    terrain: Vec<Tile>,
    platforms: Vec<Tile>,
    fill: Vec<Tile>,
    items: Vec<Tile>,
    enemies: Vec<Tile>,
    constraints: Vec<Tile>,
    world_shift: f32,
    total_world_shift: f32,
    world_length: f32,
    wall: Option<WallSide>,
    collected_items: u32,
    total_items: u32,
    status: LevelStatus,
    frame: u64,
    show_collision_outlines: bool,
    last_frame_phases: Vec<FramePhase>,
}

impl Level {
    /// Builds a level in `Loading`; call [`Level::start`] before advancing.
    pub fn new(
        id: u32,
        layout: LevelLayout,
        player: Player,
        display: DisplayConfig,
        rules: LevelRules,
        background: [u8; 4],
    ) -> Self {
        let total_items = layout.items.len() as u32;
        Self {
            id,
            display,
            rules,
            platform_tuning: PlatformTuning::for_display(&display),
            background,
            player,
            portal: layout.portal,
            terrain: layout.terrain,
            platforms: layout.platforms,
            fill: layout.fill,
            items: layout.items,
            enemies: layout.enemies,
            constraints: layout.constraints,
            world_shift: 0.0,
            total_world_shift: 0.0,
            world_length: layout.world_length,
            wall: None,
            collected_items: 0,
            total_items,
            status: LevelStatus::Loading,
            frame: 0,
            show_collision_outlines: false,
            last_frame_phases: Vec::with_capacity(FRAME_PHASE_ORDER.len()),
        }
    }

    /// Evaluates the spawn position against the screen edges so the
    /// can-move flags are valid on the first frame, then starts running.
    pub fn start(&mut self) {
        if self.status != LevelStatus::Loading {
            return;
        }
        let decision = decide_scroll(&self.scroll_input());
        apply_scroll_to_player(&mut self.player, decision.outcome);
        self.set_status(LevelStatus::Running);
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn display(&self) -> DisplayConfig {
        self.display
    }

    pub fn rules(&self) -> LevelRules {
        self.rules
    }

    pub fn background(&self) -> [u8; 4] {
        self.background
    }

    pub fn status(&self) -> LevelStatus {
        self.status
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn portal(&self) -> &Tile {
        &self.portal
    }

    pub fn terrain(&self) -> &[Tile] {
        &self.terrain
    }

    pub fn platforms(&self) -> &[Tile] {
        &self.platforms
    }

    pub fn fill(&self) -> &[Tile] {
        &self.fill
    }

    pub fn items(&self) -> &[Tile] {
        &self.items
    }

    pub fn enemies(&self) -> &[Tile] {
        &self.enemies
    }

    pub fn constraints(&self) -> &[Tile] {
        &self.constraints
    }

    /// Shift decided last frame, applied to tiles at the start of the next.
    pub fn world_shift(&self) -> f32 {
        self.world_shift
    }

    pub fn total_world_shift(&self) -> f32 {
        self.total_world_shift
    }

    /// How far the camera has moved right, in `[0, world_length - screen_width]`.
    pub fn scroll_offset(&self) -> f32 {
        -self.total_world_shift
    }

    pub fn world_length(&self) -> f32 {
        self.world_length
    }

    pub fn collected_items(&self) -> u32 {
        self.collected_items
    }

    pub fn total_items(&self) -> u32 {
        self.total_items
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn last_frame_phases(&self) -> &[FramePhase] {
        &self.last_frame_phases
    }

    pub fn show_collision_outlines(&self) -> bool {
        self.show_collision_outlines
    }

    pub fn set_show_collision_outlines(&mut self, show: bool) {
        self.show_collision_outlines = show;
    }

    pub fn toggle_collision_outlines(&mut self) {
        self.show_collision_outlines = !self.show_collision_outlines;
    }

    /// Advances one simulated frame. Outside `Running` this does nothing.
    pub fn advance_frame(&mut self, input: FrameInput) -> LevelStatus {
        if self.status != LevelStatus::Running {
            return self.status;
        }

        self.frame += 1;
        self.last_frame_phases.clear();
        for phase in FRAME_PHASE_ORDER {
            self.last_frame_phases.push(phase);
            self.run_phase(phase, input);
        }
        self.status
    }

    /// Advance then draw, the single per-tick entry point for hosts.
    pub fn run_frame(&mut self, input: FrameInput, sink: &mut impl RenderSink) -> LevelStatus {
        let status = self.advance_frame(input);
        self.render(sink);
        status
    }

    pub fn render(&self, sink: &mut impl RenderSink) {
        sink.clear(self.background);
        for tile in self
            .terrain
            .iter()
            .chain(&self.platforms)
            .chain(&self.fill)
            .chain(&self.items)
            .chain(std::iter::once(&self.portal))
        {
            draw_tile(sink, tile);
        }
        let player_rect = self.player.rect();
        sink.draw_image(
            self.player.image(),
            Vec2::new(player_rect.x, player_rect.y),
        );
        for enemy in &self.enemies {
            draw_tile(sink, enemy);
        }

        if self.show_collision_outlines {
            for tile in &self.terrain {
                sink.draw_outline(tile.rect(), TERRAIN_OUTLINE_COLOR);
            }
            for tile in &self.platforms {
                sink.draw_outline(tile.rect(), PLATFORM_OUTLINE_COLOR);
            }
        }
    }

    fn run_phase(&mut self, phase: FramePhase, input: FrameInput) {
        match phase {
            FramePhase::Geometry => self.advance_geometry(),
            FramePhase::Input => self.player.apply_input(input),
            FramePhase::Horizontal => {
                self.wall = resolve_horizontal(&mut self.player, &self.terrain).or(self.wall);
            }
            FramePhase::Vertical => resolve_vertical(&mut self.player, &self.terrain),
            FramePhase::Platforms => {
                resolve_platforms(&mut self.player, &self.platforms, &self.platform_tuning)
            }
            FramePhase::Reversal => self.reverse_constrained(),
            FramePhase::Scroll => self.scroll(),
            FramePhase::Gameplay => self.resolve_gameplay(),
            FramePhase::Animation => self.player.animate(),
        }
    }

    fn advance_geometry(&mut self) {
        let shift = self.world_shift;
        for tile in self
            .terrain
            .iter_mut()
            .chain(self.platforms.iter_mut())
            .chain(self.fill.iter_mut())
            .chain(self.items.iter_mut())
            .chain(self.enemies.iter_mut())
            .chain(self.constraints.iter_mut())
            .chain(std::iter::once(&mut self.portal))
        {
            if shift != 0.0 {
                tile.shift(shift);
            }
            tile.advance();
        }
        self.wall = resolve_world_shift(&mut self.player, &self.terrain, shift);
    }

    fn reverse_constrained(&mut self) {
        for index in constraint_reversals(&self.platforms, &self.constraints) {
            self.platforms[index].reverse_direction();
        }
        for index in constraint_reversals(&self.enemies, &self.constraints) {
            self.enemies[index].reverse_direction();
            debug!(level = self.id, enemy = index, "enemy_reversed");
        }
    }

    fn scroll(&mut self) {
        let decision = decide_scroll(&self.scroll_input());
        apply_scroll_to_player(&mut self.player, decision.outcome);
        self.world_shift = decision.world_shift;
        self.total_world_shift += decision.world_shift;
        if decision.outcome != ScrollOutcome::Free {
            debug!(
                level = self.id,
                outcome = ?decision.outcome,
                world_shift = decision.world_shift,
                total_world_shift = self.total_world_shift,
                "scroll_decided"
            );
        }
    }

    fn scroll_input(&self) -> ScrollInput {
        ScrollInput {
            player: self.player.rect(),
            direction_x: self.player.direction_x(),
            max_speed: self.player.max_speed(),
            total_world_shift: self.total_world_shift,
            world_length: self.world_length,
            screen_width: self.display.screen_width() as f32,
            wall: self.wall,
        }
    }

    fn resolve_gameplay(&mut self) {
        let player_rect = self.player.rect();
        self.collect_items(&player_rect);

        if overlaps_any(&player_rect, &self.enemies) {
            self.end_in_game_over("enemy");
            return;
        }
        if player_rect.top() > self.display.screen_height() as f32 {
            self.end_in_game_over("fell");
            return;
        }

        if self.portal_open() && self.portal.rect().overlaps(&player_rect) {
            info!(
                level = self.id,
                frame = self.frame,
                collected = self.collected_items,
                "level_complete"
            );
            self.set_status(LevelStatus::Complete);
        }
    }

    fn collect_items(&mut self, player_rect: &Rect) {
        let hits = overlapping_indices(player_rect, &self.items);
        for index in hits.into_iter().rev() {
            self.items.remove(index);
            self.collected_items += 1;
            info!(
                level = self.id,
                collected = self.collected_items,
                total = self.total_items,
                "item_collected"
            );
        }
    }

    fn portal_open(&self) -> bool {
        !self.rules.portal_requires_all_items || self.collected_items >= self.total_items
    }

    fn end_in_game_over(&mut self, cause: &'static str) {
        self.player.set_game_over();
        info!(level = self.id, frame = self.frame, cause, "game_over");
        self.set_status(LevelStatus::GameOver);
    }

    fn set_status(&mut self, status: LevelStatus) {
        if self.status == status {
            return;
        }
        debug!(
            level = self.id,
            from = self.status.name(),
            to = status.name(),
            "level_status_changed"
        );
        self.status = status;
    }
}

fn draw_tile(sink: &mut impl RenderSink, tile: &Tile) {
    if let Some(image) = tile.image() {
        let rect = tile.rect();
        sink.draw_image(image, Vec2::new(rect.x, rect.y));
    }
}
