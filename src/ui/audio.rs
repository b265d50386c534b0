use bevy::prelude::*;
use crate::shared::*;

// ═══════════════════════════════════════════════════════════════════════
// MUSIC STATE: tracks the currently playing music entity
// ═══════════════════════════════════════════════════════════════════════

#[derive(Resource, Default)]
pub struct MusicState {
    pub current_track: Option<Entity>,
    pub current_track_id: String,
}

// ═══════════════════════════════════════════════════════════════════════
// PATH MAPPING
// ═══════════════════════════════════════════════════════════════════════

/// Maps SFX IDs (sent by other domains) to audio file paths.
fn sfx_path(sfx_id: &str) -> Option<&'static str> {
    match sfx_id {
        "plow" => Some("audio/sfx/plow.ogg"),
        "sow" => Some("audio/sfx/sow.ogg"),
        "water" => Some("audio/sfx/water.ogg"),
        "yeah" => Some("audio/sfx/yeah.ogg"),
        "jump" => Some("audio/sfx/jump.ogg"),
        "error" => Some("audio/sfx/error.ogg"),
        "wow" => Some("audio/sfx/wow.ogg"),
        "applause" => Some("audio/sfx/applause.ogg"),
        "ahhh" => Some("audio/sfx/ahhh.ogg"),
        _ => None,
    }
}

fn music_path(track_id: &str) -> Option<&'static str> {
    match track_id {
        "round" => Some("audio/music/round.ogg"),
        _ => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════
// SYSTEMS
// ═══════════════════════════════════════════════════════════════════════

/// Spawn a one-shot audio source per PlaySfxEvent; it despawns itself.
pub fn handle_play_sfx(
    mut events: EventReader<PlaySfxEvent>,
    mut commands: Commands,
    asset_server: Res<AssetServer>,
) {
    for event in events.read() {
        match sfx_path(&event.sfx_id) {
            Some(path) => {
                commands.spawn((
                    AudioPlayer::new(asset_server.load(path)),
                    PlaybackSettings::DESPAWN,
                ));
            }
            None => warn!("[Audio] Unknown sfx id '{}'", event.sfx_id),
        }
    }
}

/// Stop the current music track, then start the requested one (if any).
pub fn handle_play_music(
    mut events: EventReader<PlayMusicEvent>,
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    mut music_state: ResMut<MusicState>,
) {
    for event in events.read() {
        if let Some(entity) = music_state.current_track.take() {
            commands.entity(entity).despawn_recursive();
        }
        music_state.current_track_id.clear();

        let Some(track_id) = event.track_id.as_deref() else {
            continue;
        };
        if let Some(path) = music_path(track_id) {
            let entity = commands
                .spawn((
                    AudioPlayer::new(asset_server.load(path)),
                    PlaybackSettings::LOOP,
                ))
                .id();
            music_state.current_track = Some(entity);
            music_state.current_track_id = track_id.to_string();
        } else {
            warn!("[Audio] Unknown music track '{}'", track_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_gameplay_sound_has_a_file() {
        let ids = ActionType::ALL
            .iter()
            .map(|a| a.sfx_id())
            .chain(["jump", "error", "wow", "applause", "ahhh"]);
        for id in ids {
            assert!(sfx_path(id).is_some(), "missing sfx '{}'", id);
        }
        assert!(music_path(crate::session::ROUND_TRACK).is_some());
    }
}
