use crate::world::FrameInput;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveLeft,
    MoveRight,
    Jump,
    ToggleOutlines,
    Quit,
}

const ACTION_COUNT: usize = 5;

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ActionStates {
    down: [bool; ACTION_COUNT],
}

impl ActionStates {
    pub(crate) fn set(&mut self, action: InputAction, is_down: bool) {
        self.down[action.index()] = is_down;
    }

    pub(crate) fn is_down(&self, action: InputAction) -> bool {
        self.down[action.index()]
    }
}

impl InputAction {
    const fn index(self) -> usize {
        match self {
            InputAction::MoveLeft => 0,
            InputAction::MoveRight => 1,
            InputAction::Jump => 2,
            InputAction::ToggleOutlines => 3,
            InputAction::Quit => 4,
        }
    }
}

/// Input state sampled once per simulation tick.
///
/// Held actions report whether the key is down during the tick; the
/// outline toggle is a press edge seen by exactly one tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    quit_requested: bool,
    toggle_outlines_pressed: bool,
    actions: ActionStates,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn new(
        quit_requested: bool,
        toggle_outlines_pressed: bool,
        actions: ActionStates,
    ) -> Self {
        Self {
            quit_requested,
            toggle_outlines_pressed,
            actions,
        }
    }

    /// Builds a snapshot with the given actions held, for hosts that
    /// drive scenes without a window.
    pub fn with_held(held: &[InputAction]) -> Self {
        let mut actions = ActionStates::default();
        for action in held {
            actions.set(*action, true);
        }
        Self {
            quit_requested: held.contains(&InputAction::Quit),
            toggle_outlines_pressed: held.contains(&InputAction::ToggleOutlines),
            actions,
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn toggle_outlines_pressed(&self) -> bool {
        self.toggle_outlines_pressed
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    /// The player intent for one level frame.
    pub fn frame_input(&self) -> FrameInput {
        FrameInput {
            left: self.is_down(InputAction::MoveLeft),
            right: self.is_down(InputAction::MoveRight),
            jump: self.is_down(InputAction::Jump),
        }
    }
}
