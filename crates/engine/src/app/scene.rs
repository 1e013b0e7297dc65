use crate::content::ImageStore;
use crate::world::DrawList;

use super::InputSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    None,
    Quit,
}

/// A host-driven game state: ticked at a fixed rate, drawn once per
/// presented frame.
pub trait Scene {
    fn update(&mut self, input: &InputSnapshot) -> SceneCommand;
    /// Record this frame's draw commands. The list is already reset.
    fn render(&self, draw_list: &mut DrawList);
    /// Store that every image in the draw list resolves against.
    fn images(&self) -> &ImageStore;
    fn debug_title(&self) -> Option<String> {
        None
    }
    fn shutdown(&mut self) {}
}
