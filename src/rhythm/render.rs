//! Beat track UI: one pre-spawned node per pool slot plus the hit pointer.

use bevy::prelude::*;
use crate::shared::*;
use super::RhythmTrack;

/// Screen x of the hit zone inside the track bar.
const HIT_ZONE_X: f32 = 160.0;
const BAR_TOP: f32 = 16.0;
const BAR_HEIGHT: f32 = 64.0;
const BIG_SIZE: f32 = 40.0;
const SMALL_SIZE: f32 = 18.0;
const FLASH_SECS: f32 = 0.15;

#[derive(Component, Debug, Clone)]
pub struct BeatMarker {
    pub slot: usize,
}

#[derive(Component, Debug)]
pub struct HitPointer {
    flash: Timer,
    color: Color,
}

const POINTER_IDLE: Color = Color::srgba(1.0, 1.0, 1.0, 0.35);

fn action_color(action: Option<ActionType>) -> Color {
    match action {
        Some(ActionType::Plow) => Color::srgb(0.80, 0.55, 0.30),
        Some(ActionType::Water) => Color::srgb(0.30, 0.60, 0.95),
        Some(ActionType::Sow) => Color::srgb(0.45, 0.85, 0.35),
        Some(ActionType::Reap) => Color::srgb(0.95, 0.55, 0.15),
        None => Color::srgb(0.85, 0.85, 0.85),
    }
}

pub fn spawn_track_ui(mut commands: Commands, track: Res<RhythmTrack>) {
    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                left: Val::Px(0.0),
                top: Val::Px(BAR_TOP),
                width: Val::Percent(100.0),
                height: Val::Px(BAR_HEIGHT),
                ..default()
            },
            BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.45)),
            PickingBehavior::IGNORE,
        ))
        .with_children(|bar| {
            bar.spawn((
                Node {
                    position_type: PositionType::Absolute,
                    left: Val::Px(HIT_ZONE_X - 2.0),
                    top: Val::Px(0.0),
                    width: Val::Px(4.0),
                    height: Val::Percent(100.0),
                    ..default()
                },
                BackgroundColor(POINTER_IDLE),
                HitPointer {
                    flash: Timer::from_seconds(FLASH_SECS, TimerMode::Once),
                    color: POINTER_IDLE,
                },
            ));
            for slot in 0..track.capacity() {
                bar.spawn((
                    Node {
                        position_type: PositionType::Absolute,
                        display: Display::None,
                        ..default()
                    },
                    BackgroundColor(Color::NONE),
                    BeatMarker { slot },
                ));
            }
        });
}

pub fn sync_beat_markers(
    track: Res<RhythmTrack>,
    mut query: Query<(&BeatMarker, &mut Node, &mut BackgroundColor)>,
) {
    let mut by_slot = vec![None; track.capacity()];
    for (id, beat) in track.beats() {
        if let Some(entry) = by_slot.get_mut(id.slot()) {
            *entry = Some(beat);
        }
    }

    // Sharp swell on every pulse, easing back to rest size.
    let pulse = 1.0 + 0.25 * (1.0 - track.pulse_phase()).powi(4);

    for (marker, mut node, mut bg) in query.iter_mut() {
        let Some(Some(beat)) = by_slot.get(marker.slot) else {
            node.display = Display::None;
            continue;
        };
        let base = match beat.beat_type() {
            BeatType::Big => BIG_SIZE,
            BeatType::Small => SMALL_SIZE,
        };
        let size = base * pulse;
        node.display = Display::Flex;
        node.width = Val::Px(size);
        node.height = Val::Px(size);
        node.left = Val::Px(HIT_ZONE_X + beat.position - size * 0.5);
        node.top = Val::Px((BAR_HEIGHT - size) * 0.5);

        let alpha = match (beat.beat_type(), beat.hit, beat.available) {
            (_, true, _) => 0.2,
            (BeatType::Big, false, true) => 1.0,
            (BeatType::Big, false, false) => 0.4,
            (BeatType::Small, false, _) => 0.6,
        };
        bg.0 = action_color(beat.action()).with_alpha(alpha);
    }
}

pub fn flash_hit_pointer(
    time: Res<Time>,
    mut hits: EventReader<BeatHitEvent>,
    mut misses: EventReader<BeatMissedEvent>,
    mut query: Query<(&mut HitPointer, &mut BackgroundColor)>,
) {
    let missed = misses.read().count() > 0;
    let hit = hits.read().count() > 0;
    let flash = if missed {
        Some(Color::srgb(0.95, 0.25, 0.2))
    } else if hit {
        Some(Color::srgb(0.4, 1.0, 0.5))
    } else {
        None
    };

    for (mut pointer, mut bg) in query.iter_mut() {
        if let Some(color) = flash {
            pointer.flash.reset();
            pointer.color = color;
        }
        pointer.flash.tick(time.delta());
        bg.0 = if pointer.flash.finished() {
            POINTER_IDLE
        } else {
            pointer.color
        };
    }
}
