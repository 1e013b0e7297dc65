use super::display::DisplayConfig;
use super::geometry::{Rect, Vec2};
use super::render::ImageRef;

/// Frames advanced per tick by the player's idle/run cycles.
pub const PLAYER_ANIMATION_RATE: f32 = 0.7;
const BASE_MAX_SPEED: f32 = 8.0;
const BASE_GRAVITY: f32 = 0.8;
const BASE_JUMP_SPEED: f32 = -18.0;

/// Keyboard state for one simulated frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameInput {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
}

impl FrameInput {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn left() -> Self {
        Self {
            left: true,
            ..Self::default()
        }
    }

    pub fn right() -> Self {
        Self {
            right: true,
            ..Self::default()
        }
    }

    pub fn jump() -> Self {
        Self {
            jump: true,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerStatus {
    Idle,
    Running,
}

/// Movement constants scaled from the reference tile size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerTuning {
    pub max_speed: f32,
    pub gravity: f32,
    pub jump_speed: f32,
    pub animation_rate: f32,
}

impl PlayerTuning {
    pub fn for_display(display: &DisplayConfig) -> Self {
        let ratio = display.screen_ratio();
        Self {
            max_speed: (BASE_MAX_SPEED * ratio).floor().max(1.0),
            gravity: BASE_GRAVITY * ratio,
            jump_speed: BASE_JUMP_SPEED * ratio,
            animation_rate: PLAYER_ANIMATION_RATE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerAnimations {
    idle: Vec<ImageRef>,
    run: Vec<ImageRef>,
    dead: ImageRef,
}

impl PlayerAnimations {
    /// Returns `None` when either cycle has no frames.
    pub fn new(idle: Vec<ImageRef>, run: Vec<ImageRef>, dead: ImageRef) -> Option<Self> {
        if idle.is_empty() || run.is_empty() {
            return None;
        }
        Some(Self { idle, run, dead })
    }

    fn frames(&self, status: PlayerStatus) -> &[ImageRef] {
        match status {
            PlayerStatus::Idle => &self.idle,
            PlayerStatus::Running => &self.run,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Player {
    pub(crate) rect: Rect,
    /// `x` is the intended direction in {-1, 0, 1}; `y` is the fall speed.
    pub(crate) velocity: Vec2,
    pub(crate) current_speed: f32,
    pub(crate) on_ground: bool,
    pub(crate) on_platform: bool,
    pub(crate) can_move_left: bool,
    pub(crate) can_move_right: bool,
    tuning: PlayerTuning,
    status: PlayerStatus,
    facing_right: bool,
    game_over: bool,
    animations: PlayerAnimations,
    frame_index: f32,
    image: ImageRef,
}

impl Player {
    pub fn new(top_left: Vec2, size: f32, tuning: PlayerTuning, animations: PlayerAnimations) -> Self {
        let image = animations.idle[0];
        Self {
            rect: Rect::square(top_left.x, top_left.y, size),
            velocity: Vec2::ZERO,
            current_speed: tuning.max_speed,
            on_ground: false,
            on_platform: false,
            can_move_left: true,
            can_move_right: true,
            tuning,
            status: PlayerStatus::Idle,
            facing_right: true,
            game_over: false,
            animations,
            frame_index: 0.0,
            image,
        }
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn direction_x(&self) -> f32 {
        self.velocity.x
    }

    pub fn tuning(&self) -> PlayerTuning {
        self.tuning
    }

    pub fn max_speed(&self) -> f32 {
        self.tuning.max_speed
    }

    pub fn current_speed(&self) -> f32 {
        self.current_speed
    }

    pub fn status(&self) -> PlayerStatus {
        self.status
    }

    pub fn facing_right(&self) -> bool {
        self.facing_right
    }

    pub fn on_ground(&self) -> bool {
        self.on_ground
    }

    pub fn on_platform(&self) -> bool {
        self.on_platform
    }

    pub fn can_move_left(&self) -> bool {
        self.can_move_left
    }

    pub fn can_move_right(&self) -> bool {
        self.can_move_right
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn image(&self) -> ImageRef {
        self.image
    }

    /// Derives this frame's horizontal intent from the keys. Right wins when
    /// both directions are held. The can-move flags are only read here.
    pub fn apply_input(&mut self, input: FrameInput) {
        if self.game_over {
            self.velocity.x = 0.0;
            self.status = PlayerStatus::Idle;
            return;
        }

        if input.right {
            self.facing_right = true;
            self.velocity.x = if self.can_move_right { 1.0 } else { 0.0 };
        } else if input.left {
            self.facing_right = false;
            self.velocity.x = if self.can_move_left { -1.0 } else { 0.0 };
        } else {
            self.velocity.x = 0.0;
        }

        self.status = if self.velocity.x != 0.0 {
            PlayerStatus::Running
        } else {
            PlayerStatus::Idle
        };

        if input.jump && self.on_ground {
            self.jump();
        }
    }

    pub fn jump(&mut self) {
        if self.game_over {
            return;
        }
        self.velocity.y = self.tuning.jump_speed;
        self.on_ground = false;
        self.on_platform = false;
    }

    /// Only called from vertical collision resolution so gravity and the
    /// collision response land in the same frame.
    pub(crate) fn apply_gravity(&mut self) {
        self.velocity.y += self.tuning.gravity;
        self.rect.y += self.velocity.y;
    }

    pub fn animate(&mut self) {
        if self.game_over {
            self.image = self.animations.dead;
            return;
        }

        let frames = self.animations.frames(self.status);
        self.frame_index += self.tuning.animation_rate;
        if self.frame_index >= frames.len() as f32 {
            self.frame_index = 0.0;
        }
        let frame = frames[(self.frame_index.floor() as usize).min(frames.len() - 1)];
        self.image = if self.facing_right {
            frame
        } else {
            frame.mirrored()
        };
    }

    /// One-way: a dead player never comes back within the same level.
    pub fn set_game_over(&mut self) {
        self.game_over = true;
        self.velocity.x = 0.0;
    }
}
