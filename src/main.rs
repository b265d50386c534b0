use bevy::prelude::*;
use bevy::window::{PresentMode, WindowResolution};

use beatfarm::config::GameConfig;
use beatfarm::shared::*;
use beatfarm::{PresentationPlugins, SimulationPlugins};

fn main() {
    let config = GameConfig::load_or_default();

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Beatfarm".into(),
                resolution: WindowResolution::new(SCREEN_WIDTH, SCREEN_HEIGHT),
                present_mode: PresentMode::AutoVsync,
                resizable: true,
                ..default()
            }),
            ..default()
        }))
        // Game state
        .init_state::<GameState>()
        // Shared resources
        .insert_resource(config)
        .init_resource::<PlayerInput>()
        // Events
        .add_event::<ActionCommittedEvent>()
        .add_event::<AvatarArrivedEvent>()
        .add_event::<BeatHitEvent>()
        .add_event::<BeatMissedEvent>()
        .add_event::<IslandDamagedEvent>()
        .add_event::<IslandDestroyedEvent>()
        .add_event::<IslandUnlockedEvent>()
        .add_event::<ScoreChangedEvent>()
        .add_event::<PlaySfxEvent>()
        .add_event::<PlayMusicEvent>()
        // Domain plugins
        .add_plugins(SimulationPlugins)
        .add_plugins(PresentationPlugins)
        // Camera
        .add_systems(Startup, setup_camera)
        .run();
}

fn setup_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}
