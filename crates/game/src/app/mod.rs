pub(crate) mod bootstrap;
mod enemy_file;
mod level_scene;
pub(crate) mod loop_runner;
mod settings;
