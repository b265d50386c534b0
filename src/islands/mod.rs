//! Islands domain: per-island damage and visibility, plus where the
//! camera should be looking.

use bevy::prelude::*;
use crate::farming::PlotGrid;
use crate::shared::*;

pub mod map;
mod camera;
mod render;

pub use map::{DamageOutcome, Island, IslandMap};

/// Duration of the camera shake after a missed beat.
pub const SHAKE_SECS: f32 = 0.25;

/// Which island the camera is framing, and any shake in progress.
#[derive(Resource, Debug, Clone, Default)]
pub struct CameraFocus {
    pub island: Coord,
    shake: Option<Timer>,
}

impl CameraFocus {
    pub fn focus(&mut self, island: Coord) {
        self.island = island;
    }

    pub fn reset(&mut self, island: Coord) {
        self.island = island;
        self.shake = None;
    }

    pub fn start_shake(&mut self) {
        self.shake = Some(Timer::from_seconds(SHAKE_SECS, TimerMode::Once));
    }

    pub fn tick(&mut self, delta: std::time::Duration) {
        if let Some(timer) = self.shake.as_mut() {
            if timer.tick(delta).finished() {
                self.shake = None;
            }
        }
    }

    /// 1.0 right after a miss, decaying to 0.0 when the shake ends.
    pub fn shake_strength(&self) -> f32 {
        self.shake.as_ref().map(|t| t.fraction_remaining()).unwrap_or(0.0)
    }

    pub fn target(&self) -> Vec2 {
        island_origin(self.island)
    }
}

pub struct IslandPlugin;

impl Plugin for IslandPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<IslandMap>()
            .init_resource::<CameraFocus>()
            .add_systems(Update, tick_camera_focus.in_set(TickSet::Clock))
            .add_systems(
                Update,
                (apply_miss_damage, refocus_on_arrival).in_set(TickSet::Resolve),
            );
    }
}

pub struct IslandViewPlugin;

impl Plugin for IslandViewPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<render::IslandSprites>()
            .add_systems(PostUpdate, (render::sync_island_sprites, camera::follow_focus));
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Systems
// ─────────────────────────────────────────────────────────────────────────────

/// Every miss costs the island the avatar stood on one damage level.
pub fn apply_miss_damage(
    mut misses: EventReader<BeatMissedEvent>,
    mut islands: ResMut<IslandMap>,
    mut grid: ResMut<PlotGrid>,
    mut focus: ResMut<CameraFocus>,
    mut damaged: EventWriter<IslandDamagedEvent>,
    mut destroyed: EventWriter<IslandDestroyedEvent>,
) {
    for miss in misses.read() {
        focus.start_shake();
        match islands.register_damage(miss.island, &mut grid) {
            DamageOutcome::Damaged(level) => {
                debug!("[Island] Island {} damage {}/{}", miss.island, level, MAX_ISLAND_DAMAGE);
                damaged.send(IslandDamagedEvent { island: miss.island, damage: level });
            }
            DamageOutcome::Destroyed => {
                damaged.send(IslandDamagedEvent { island: miss.island, damage: MAX_ISLAND_DAMAGE });
                destroyed.send(IslandDestroyedEvent { island: miss.island });
            }
            DamageOutcome::Ignored => {
                debug!("[Island] Miss on island {} had no effect", miss.island);
            }
        }
    }
}

pub fn refocus_on_arrival(
    mut arrivals: EventReader<AvatarArrivedEvent>,
    mut focus: ResMut<CameraFocus>,
) {
    for ev in arrivals.read() {
        if focus.island != ev.island {
            debug!("[Island] Camera refocus {} -> {}", focus.island, ev.island);
            focus.focus(ev.island);
        }
    }
}

pub fn tick_camera_focus(time: Res<Time>, mut focus: ResMut<CameraFocus>) {
    focus.tick(time.delta());
}
