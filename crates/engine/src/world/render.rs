use super::geometry::{Rect, Vec2};

/// Handle to a decoded image owned by an asset store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageId(pub u32);

/// An image plus the horizontal mirroring to apply when drawing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageRef {
    pub id: ImageId,
    pub flip_x: bool,
}

impl ImageRef {
    pub const fn new(id: ImageId) -> Self {
        Self { id, flip_x: false }
    }

    pub fn mirrored(self) -> Self {
        Self {
            flip_x: !self.flip_x,
            ..self
        }
    }

    pub fn with_flip(self, flip_x: bool) -> Self {
        Self { flip_x, ..self }
    }
}

pub const TERRAIN_OUTLINE_COLOR: [u8; 4] = [255, 60, 60, 255];
pub const PLATFORM_OUTLINE_COLOR: [u8; 4] = [60, 140, 255, 255];

/// Where a level submits what it wants drawn this frame.
pub trait RenderSink {
    fn clear(&mut self, color: [u8; 4]);
    fn draw_image(&mut self, image: ImageRef, top_left: Vec2);
    fn draw_outline(&mut self, rect: Rect, color: [u8; 4]);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawCommand {
    Image { image: ImageRef, top_left: Vec2 },
    Outline { rect: Rect, color: [u8; 4] },
}

/// Retained draw commands for one frame, replayed by the renderer.
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    clear_color: [u8; 4],
    commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.clear_color = [0, 0, 0, 255];
        self.commands.clear();
    }

    pub fn clear_color(&self) -> [u8; 4] {
        self.clear_color
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn image_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|command| matches!(command, DrawCommand::Image { .. }))
            .count()
    }
}

impl RenderSink for DrawList {
    fn clear(&mut self, color: [u8; 4]) {
        self.clear_color = color;
        self.commands.clear();
    }

    fn draw_image(&mut self, image: ImageRef, top_left: Vec2) {
        self.commands.push(DrawCommand::Image { image, top_left });
    }

    fn draw_outline(&mut self, rect: Rect, color: [u8; 4]) {
        self.commands.push(DrawCommand::Outline { rect, color });
    }
}
