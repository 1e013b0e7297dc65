use serde::{Deserialize, Serialize};

use super::geometry::{Rect, Vec2};
use super::render::ImageRef;

/// Frames advanced per tick by every animated tile and enemy.
pub const TILE_ANIMATION_RATE: f32 = 0.15;
/// Pixels per tick a platform travels at the reference tile size.
pub const PLATFORM_BASE_SPEED: f32 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    /// Platform cells encode their axis in the parity of the cell code.
    pub fn from_platform_code(code: i32) -> Self {
        if code.rem_euclid(2) == 0 {
            Axis::Horizontal
        } else {
            Axis::Vertical
        }
    }
}

/// Back-and-forth motion along one axis. The range is not stored here; it is
/// bounded by constraint tiles in the level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Patrol {
    pub axis: Axis,
    pub speed: f32,
}

impl Patrol {
    pub fn new(axis: Axis, speed: f32) -> Self {
        Self { axis, speed }
    }

    pub fn step(&self) -> Vec2 {
        match self.axis {
            Axis::Horizontal => Vec2::new(self.speed, 0.0),
            Axis::Vertical => Vec2::new(0.0, self.speed),
        }
    }

    pub fn reverse(&mut self) {
        self.speed = -self.speed;
    }
}

/// Looping frame cycle with a fractional cursor.
#[derive(Debug, Clone, PartialEq)]
pub struct Animation {
    frames: Vec<ImageRef>,
    frame_index: f32,
    rate: f32,
}

impl Animation {
    /// Returns `None` for an empty frame list.
    pub fn new(frames: Vec<ImageRef>, rate: f32) -> Option<Self> {
        if frames.is_empty() {
            return None;
        }
        Some(Self {
            frames,
            frame_index: 0.0,
            rate,
        })
    }

    pub fn advance(&mut self) {
        self.frame_index += self.rate;
        if self.frame_index >= self.frames.len() as f32 {
            self.frame_index = 0.0;
        }
    }

    pub fn current(&self) -> ImageRef {
        let index = (self.frame_index.floor() as usize).min(self.frames.len() - 1);
        self.frames[index]
    }

    pub fn frame_index(&self) -> f32 {
        self.frame_index
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TileBehavior {
    /// Terrain, fill, items and the portal.
    Static,
    /// Patrolling platform the player can ride.
    Moving { patrol: Patrol },
    Animated { animation: Animation },
    Enemy { patrol: Patrol },
    AnimatedEnemy { patrol: Patrol, animation: Animation },
    /// Invisible patrol bound.
    Constraint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileKind {
    Static,
    Moving,
    Animated,
    Enemy,
    AnimatedEnemy,
    Constraint,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    rect: Rect,
    image: Option<ImageRef>,
    behavior: TileBehavior,
}

impl Tile {
    pub fn new_static(rect: Rect, image: ImageRef) -> Self {
        Self {
            rect,
            image: Some(image),
            behavior: TileBehavior::Static,
        }
    }

    pub fn new_moving(rect: Rect, image: ImageRef, patrol: Patrol) -> Self {
        Self {
            rect,
            image: Some(image),
            behavior: TileBehavior::Moving { patrol },
        }
    }

    pub fn new_animated(rect: Rect, animation: Animation) -> Self {
        Self {
            rect,
            image: Some(animation.current()),
            behavior: TileBehavior::Animated { animation },
        }
    }

    pub fn new_enemy(rect: Rect, image: ImageRef, patrol: Patrol) -> Self {
        Self {
            rect,
            image: Some(image),
            behavior: TileBehavior::Enemy { patrol },
        }
    }

    pub fn new_animated_enemy(rect: Rect, animation: Animation, patrol: Patrol) -> Self {
        let image = facing_for_speed(animation.current(), patrol);
        Self {
            rect,
            image: Some(image),
            behavior: TileBehavior::AnimatedEnemy { patrol, animation },
        }
    }

    pub fn new_constraint(rect: Rect) -> Self {
        Self {
            rect,
            image: None,
            behavior: TileBehavior::Constraint,
        }
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Image drawn this frame; constraints have none.
    pub fn image(&self) -> Option<ImageRef> {
        self.image
    }

    pub fn behavior(&self) -> &TileBehavior {
        &self.behavior
    }

    pub fn kind(&self) -> TileKind {
        match self.behavior {
            TileBehavior::Static => TileKind::Static,
            TileBehavior::Moving { .. } => TileKind::Moving,
            TileBehavior::Animated { .. } => TileKind::Animated,
            TileBehavior::Enemy { .. } => TileKind::Enemy,
            TileBehavior::AnimatedEnemy { .. } => TileKind::AnimatedEnemy,
            TileBehavior::Constraint => TileKind::Constraint,
        }
    }

    pub fn patrol(&self) -> Option<Patrol> {
        match &self.behavior {
            TileBehavior::Moving { patrol }
            | TileBehavior::Enemy { patrol }
            | TileBehavior::AnimatedEnemy { patrol, .. } => Some(*patrol),
            _ => None,
        }
    }

    /// World-scroll translation, applied to every tile regardless of kind.
    pub fn shift(&mut self, dx: f32) {
        self.rect.translate(dx, 0.0);
    }

    /// Own per-tick behavior: patrol movement and frame cycling.
    pub fn advance(&mut self) {
        match &mut self.behavior {
            TileBehavior::Static | TileBehavior::Constraint => {}
            TileBehavior::Moving { patrol } | TileBehavior::Enemy { patrol } => {
                let step = patrol.step();
                self.rect.translate(step.x, step.y);
            }
            TileBehavior::Animated { animation } => {
                animation.advance();
                self.image = Some(animation.current());
            }
            TileBehavior::AnimatedEnemy { patrol, animation } => {
                animation.advance();
                let step = patrol.step();
                self.rect.translate(step.x, step.y);
                self.image = Some(facing_for_speed(animation.current(), *patrol));
            }
        }
    }

    /// Negates patrol speed. Horizontally patrolling enemies also turn to
    /// face their new travel direction; platforms have no facing.
    pub fn reverse_direction(&mut self) {
        match &mut self.behavior {
            TileBehavior::Moving { patrol } => patrol.reverse(),
            TileBehavior::Enemy { patrol } => {
                patrol.reverse();
                if patrol.axis == Axis::Horizontal {
                    self.image = self.image.map(ImageRef::mirrored);
                }
            }
            TileBehavior::AnimatedEnemy { patrol, animation } => {
                patrol.reverse();
                self.image = Some(facing_for_speed(animation.current(), *patrol));
            }
            TileBehavior::Static | TileBehavior::Animated { .. } | TileBehavior::Constraint => {}
        }
    }
}

/// Animated enemy frames are authored facing right.
fn facing_for_speed(frame: ImageRef, patrol: Patrol) -> ImageRef {
    frame.with_flip(patrol.axis == Axis::Horizontal && patrol.speed < 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::render::ImageId;

    fn image(id: u32) -> ImageRef {
        ImageRef::new(ImageId(id))
    }

    #[test]
    fn platform_axis_follows_code_parity() {
        assert_eq!(Axis::from_platform_code(0), Axis::Horizontal);
        assert_eq!(Axis::from_platform_code(1), Axis::Vertical);
        assert_eq!(Axis::from_platform_code(4), Axis::Horizontal);
        assert_eq!(Axis::from_platform_code(7), Axis::Vertical);
    }

    #[test]
    fn animation_wraps_to_first_frame() {
        let mut animation = Animation::new(vec![image(1), image(2)], 0.5).expect("frames");
        animation.advance();
        assert_eq!(animation.current(), image(1));
        animation.advance();
        assert_eq!(animation.current(), image(2));
        animation.advance();
        animation.advance();
        assert_eq!(animation.frame_index(), 0.0);
        assert_eq!(animation.current(), image(1));
    }

    #[test]
    fn empty_animation_is_rejected() {
        assert!(Animation::new(Vec::new(), TILE_ANIMATION_RATE).is_none());
    }

    #[test]
    fn moving_tile_patrols_along_its_axis() {
        let rect = Rect::square(64.0, 64.0, 32.0);
        let mut horizontal = Tile::new_moving(rect, image(0), Patrol::new(Axis::Horizontal, 3.0));
        let mut vertical = Tile::new_moving(rect, image(0), Patrol::new(Axis::Vertical, 3.0));
        horizontal.advance();
        vertical.advance();
        assert_eq!(horizontal.rect().x, 67.0);
        assert_eq!(horizontal.rect().y, 64.0);
        assert_eq!(vertical.rect().x, 64.0);
        assert_eq!(vertical.rect().y, 67.0);
    }

    #[test]
    fn platform_reverse_keeps_image() {
        let mut tile = Tile::new_moving(
            Rect::square(0.0, 0.0, 32.0),
            image(5),
            Patrol::new(Axis::Horizontal, 3.0),
        );
        tile.reverse_direction();
        assert_eq!(tile.patrol().map(|p| p.speed), Some(-3.0));
        assert_eq!(tile.image(), Some(image(5)));
    }

    #[test]
    fn horizontal_enemy_reverse_mirrors_image() {
        let mut enemy = Tile::new_enemy(
            Rect::square(0.0, 0.0, 32.0),
            image(9),
            Patrol::new(Axis::Horizontal, 3.0),
        );
        enemy.reverse_direction();
        assert_eq!(enemy.patrol().map(|p| p.speed), Some(-3.0));
        assert_eq!(enemy.image(), Some(image(9).mirrored()));
    }

    #[test]
    fn vertical_enemy_reverse_keeps_image() {
        let mut enemy = Tile::new_enemy(
            Rect::square(0.0, 0.0, 32.0),
            image(9),
            Patrol::new(Axis::Vertical, 2.0),
        );
        enemy.reverse_direction();
        assert_eq!(enemy.image(), Some(image(9)));
    }

    #[test]
    fn animated_enemy_faces_travel_direction() {
        let animation = Animation::new(vec![image(1), image(2)], TILE_ANIMATION_RATE).expect("frames");
        let mut enemy = Tile::new_animated_enemy(
            Rect::square(0.0, 0.0, 32.0),
            animation,
            Patrol::new(Axis::Horizontal, 2.0),
        );
        assert_eq!(enemy.image().map(|i| i.flip_x), Some(false));
        enemy.reverse_direction();
        assert_eq!(enemy.image().map(|i| i.flip_x), Some(true));
        enemy.advance();
        assert_eq!(enemy.rect().x, -2.0);
        assert_eq!(enemy.image().map(|i| i.flip_x), Some(true));
    }

    #[test]
    fn shift_moves_constraints_too() {
        let mut constraint = Tile::new_constraint(Rect::square(32.0, 0.0, 32.0));
        constraint.shift(-8.0);
        constraint.advance();
        assert_eq!(constraint.rect().x, 24.0);
        assert!(constraint.image().is_none());
        assert_eq!(constraint.kind(), TileKind::Constraint);
    }
}
