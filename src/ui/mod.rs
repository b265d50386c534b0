mod audio;
mod hud;

use bevy::prelude::*;

pub use audio::MusicState;

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        // ─── AUDIO: fire-and-forget effects, one looping track ───
        app.init_resource::<MusicState>();
        app.add_systems(Update, (audio::handle_play_sfx, audio::handle_play_music));

        // ─── HUD: always present, text follows session state ───
        app.add_systems(Startup, hud::spawn_hud);
        app.add_systems(
            PostUpdate,
            (
                hud::update_score_text,
                hud::update_island_text,
                hud::update_banner,
            ),
        );
    }
}
