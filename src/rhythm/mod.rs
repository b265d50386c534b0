//! Rhythm domain: the beat track the player has to hit actions on.

use bevy::prelude::*;
use crate::config::GameConfig;
use crate::shared::*;

pub mod beat;
pub mod track;
mod render;

pub use beat::{Beat, BeatId, BeatPool};
pub use track::{HitCandidate, RhythmTrack, TrackTick};

pub struct RhythmPlugin;

impl Plugin for RhythmPlugin {
    fn build(&self, app: &mut App) {
        // Sized from the tuning up front: the track UI spawns one marker per
        // pool slot at startup.
        let config = app
            .world()
            .get_resource::<GameConfig>()
            .cloned()
            .unwrap_or_default();
        app.insert_resource(RhythmTrack::from_config(&config))
            .add_systems(OnEnter(GameState::InGame), start_track)
            .add_systems(OnExit(GameState::InGame), stop_track)
            .add_systems(
                Update,
                advance_track
                    .in_set(TickSet::Clock)
                    .run_if(in_state(GameState::InGame)),
            );
    }
}

pub struct RhythmViewPlugin;

impl Plugin for RhythmViewPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, render::spawn_track_ui)
            .add_systems(
                PostUpdate,
                (render::sync_beat_markers, render::flash_hit_pointer),
            );
    }
}

pub fn start_track(mut track: ResMut<RhythmTrack>) {
    track.start();
    info!(
        "[Rhythm] Track started: {:.0} px/s, {} ms per unit",
        track.velocity(),
        track.unit_time().as_millis()
    );
}

pub fn stop_track(mut track: ResMut<RhythmTrack>) {
    track.stop();
    info!("[Rhythm] Track stopped");
}

pub fn advance_track(time: Res<Time>, mut track: ResMut<RhythmTrack>) {
    track.advance(time.delta());
}
