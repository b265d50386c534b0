use bevy::prelude::*;
use crate::farming::PlotGrid;
use crate::shared::*;
use super::{AnimationKey, Avatar, TaskKind};

const HOP_HEIGHT: f32 = TILE_SIZE * 0.5;

#[derive(Component, Debug)]
pub struct AvatarSprite;

fn animation_color(key: AnimationKey) -> Color {
    match key {
        AnimationKey::Idle | AnimationKey::Jump => Color::srgb(0.95, 0.90, 0.80),
        AnimationKey::Plow => Color::srgb(0.80, 0.55, 0.30),
        AnimationKey::Water => Color::srgb(0.30, 0.60, 0.95),
        AnimationKey::Sow => Color::srgb(0.45, 0.85, 0.35),
        AnimationKey::Reap => Color::srgb(0.95, 0.55, 0.15),
        AnimationKey::Applause => Color::srgb(1.0, 0.85, 0.2),
    }
}

pub fn spawn_avatar_sprite(mut commands: Commands) {
    commands.spawn((
        Sprite {
            color: animation_color(AnimationKey::Idle),
            custom_size: Some(Vec2::new(TILE_SIZE * 0.8, TILE_SIZE * 1.2)),
            ..default()
        },
        Transform::from_xyz(0.0, 0.0, 5.0),
        AvatarSprite,
    ));
}

/// Places the sprite on its plot, gliding and hopping between plots while
/// a step is in flight.
pub fn sync_avatar_sprite(
    avatar: Res<Avatar>,
    grid: Res<PlotGrid>,
    time: Res<Time>,
    mut query: Query<(&mut Sprite, &mut Transform), With<AvatarSprite>>,
) {
    let Ok((mut sprite, mut transform)) = query.get_single_mut() else {
        return;
    };
    let side = grid.side();
    let from = plot_to_world(avatar.island, avatar.local, side);
    let t = avatar.task_progress();

    let mut pos = match avatar.task().map(|task| task.kind) {
        Some(TaskKind::Move { island, local }) => {
            let to = plot_to_world(island, local, side);
            let hop = HOP_HEIGHT * (t * std::f32::consts::PI).sin();
            from.lerp(to, t) + Vec2::new(0.0, hop)
        }
        _ => from,
    };

    let key = avatar.animation();
    match key {
        AnimationKey::Plow | AnimationKey::Water | AnimationKey::Sow | AnimationKey::Reap => {
            // Small bow into the soil.
            pos.y -= 4.0 * (t * std::f32::consts::PI).sin();
        }
        AnimationKey::Applause => {
            pos.y += 6.0 * (time.elapsed_secs() * 10.0).sin().abs();
        }
        AnimationKey::Idle | AnimationKey::Jump => {}
    }

    sprite.color = animation_color(key);
    transform.translation.x = pos.x;
    transform.translation.y = pos.y + TILE_SIZE * 0.25;
}
