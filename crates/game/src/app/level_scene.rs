use std::path::{Path, PathBuf};

use scroller_engine::{
    level_files_exist, load_level, AssetProvider, DisplayConfig, DrawList, EnemyTable,
    ImageStore, InputSnapshot, Level, LevelContext, LevelDescriptor, LevelLoadError, LevelRules,
    LevelStatus, Scene, SceneCommand,
};
use tracing::{error, info};

/// Plays levels in sequence: a completed level advances to the next id,
/// wrapping to the first when there is none, and a lost level restarts.
pub(crate) struct LevelScene<A> {
    levels_dir: PathBuf,
    first_level: u32,
    display: DisplayConfig,
    rules: LevelRules,
    enemies: EnemyTable,
    assets: A,
    level: Level,
    attempts: u32,
    completed_levels: u32,
}

impl<A: AssetProvider> LevelScene<A> {
    /// Loads `first_level`; failing here is fatal to the caller.
    pub(crate) fn start(
        levels_dir: PathBuf,
        first_level: u32,
        display: DisplayConfig,
        enemies: EnemyTable,
        mut assets: A,
    ) -> Result<Self, LevelLoadError> {
        let rules = LevelRules::default();
        let level = load_numbered_level(
            &levels_dir,
            first_level,
            display,
            rules,
            &enemies,
            &mut assets,
        )?;
        info!(level = first_level, "level_started");
        Ok(Self {
            levels_dir,
            first_level,
            display,
            rules,
            enemies,
            assets,
            level,
            attempts: 1,
            completed_levels: 0,
        })
    }

    #[cfg(test)]
    fn level(&self) -> &Level {
        &self.level
    }

    #[cfg(test)]
    fn attempts(&self) -> u32 {
        self.attempts
    }

    #[cfg(test)]
    fn completed_levels(&self) -> u32 {
        self.completed_levels
    }

    fn next_level_id(&self) -> u32 {
        let next = self.level.id().saturating_add(1);
        if level_files_exist(&self.levels_dir, next) {
            next
        } else {
            self.first_level
        }
    }

    /// Swaps in a freshly loaded level, keeping the outline toggle.
    fn switch_to(&mut self, id: u32) -> Result<(), LevelLoadError> {
        let mut level = load_numbered_level(
            &self.levels_dir,
            id,
            self.display,
            self.rules,
            &self.enemies,
            &mut self.assets,
        )?;
        level.set_show_collision_outlines(self.level.show_collision_outlines());
        self.level = level;
        Ok(())
    }

    fn handle_terminal_status(&mut self, status: LevelStatus) -> SceneCommand {
        let finished = self.level.id();
        let (next, reason) = match status {
            LevelStatus::Complete => {
                self.completed_levels = self.completed_levels.saturating_add(1);
                self.attempts = 1;
                (self.next_level_id(), "complete")
            }
            LevelStatus::GameOver => {
                self.attempts = self.attempts.saturating_add(1);
                (finished, "game_over")
            }
            LevelStatus::Loading | LevelStatus::Running => return SceneCommand::None,
        };

        match self.switch_to(next) {
            Ok(()) => {
                info!(
                    from = finished,
                    to = next,
                    reason,
                    attempt = self.attempts,
                    "level_started"
                );
                SceneCommand::None
            }
            Err(error) => {
                error!(level = next, error = %error, "level_load_failed");
                SceneCommand::Quit
            }
        }
    }
}

fn load_numbered_level<A: AssetProvider>(
    levels_dir: &Path,
    id: u32,
    display: DisplayConfig,
    rules: LevelRules,
    enemies: &EnemyTable,
    assets: &mut A,
) -> Result<Level, LevelLoadError> {
    let descriptor = LevelDescriptor::for_level(levels_dir, id);
    load_level(
        &descriptor,
        LevelContext {
            assets,
            enemies,
            display,
            rules,
        },
    )
}

impl<A: AssetProvider> Scene for LevelScene<A> {
    fn update(&mut self, input: &InputSnapshot) -> SceneCommand {
        if input.quit_requested() {
            return SceneCommand::Quit;
        }
        if input.toggle_outlines_pressed() {
            self.level.toggle_collision_outlines();
            info!(
                visible = self.level.show_collision_outlines(),
                "collision_outlines_toggled"
            );
        }

        let status = self.level.advance_frame(input.frame_input());
        if status.is_terminal() {
            return self.handle_terminal_status(status);
        }
        SceneCommand::None
    }

    fn render(&self, draw_list: &mut DrawList) {
        self.level.render(draw_list);
    }

    fn images(&self) -> &ImageStore {
        self.assets.images()
    }

    fn debug_title(&self) -> Option<String> {
        Some(format!(
            "Scroller | level {} | items {}/{} | attempt {}",
            self.level.id(),
            self.level.collected_items(),
            self.level.total_items(),
            self.attempts
        ))
    }

    fn shutdown(&mut self) {
        info!(
            level = self.level.id(),
            completed_levels = self.completed_levels,
            "session_ended"
        );
    }
}
