//! Beatfarm library crate: every domain module, plus the two plugin
//! groups the binary and the headless tests assemble.
//!
//! `SimulationPlugins` is the game itself and needs no window, GPU or
//! assets. `PresentationPlugins` adds keyboard input, placeholder sprites,
//! the beat-track UI, HUD and audio on top.

use bevy::app::PluginGroupBuilder;
use bevy::prelude::*;

pub mod shared;
pub mod config;
pub mod farming;
pub mod islands;
pub mod rhythm;
pub mod avatar;
pub mod session;
pub mod input;
pub mod ui;

pub struct SimulationPlugins;

impl PluginGroup for SimulationPlugins {
    fn build(self) -> PluginGroupBuilder {
        PluginGroupBuilder::start::<Self>()
            .add(farming::FarmingPlugin)
            .add(islands::IslandPlugin)
            .add(rhythm::RhythmPlugin)
            .add(avatar::AvatarPlugin)
            .add(session::SessionPlugin)
    }
}

pub struct PresentationPlugins;

impl PluginGroup for PresentationPlugins {
    fn build(self) -> PluginGroupBuilder {
        PluginGroupBuilder::start::<Self>()
            .add(input::InputPlugin)
            .add(farming::FarmingViewPlugin)
            .add(islands::IslandViewPlugin)
            .add(rhythm::RhythmViewPlugin)
            .add(avatar::AvatarViewPlugin)
            .add(ui::UiPlugin)
    }
}
