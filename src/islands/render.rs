//! Island base sprites: tinted as damage builds up, hidden once destroyed.

use std::collections::HashMap;

use bevy::prelude::*;
use crate::shared::*;
use super::IslandMap;

#[derive(Component, Debug, Clone)]
pub struct IslandTile {
    pub coord: Coord,
}

#[derive(Resource, Default, Debug)]
pub struct IslandSprites {
    pub entities: HashMap<Coord, Entity>,
}

/// Healthy sand darkening to scorched red-brown at damage 3.
pub fn damage_color(damage: u8) -> Color {
    let t = (damage as f32 / (MAX_ISLAND_DAMAGE - 1) as f32).clamp(0.0, 1.0);
    let healthy = Vec3::new(0.86, 0.78, 0.55);
    let scorched = Vec3::new(0.55, 0.25, 0.18);
    let c = healthy.lerp(scorched, t);
    Color::srgb(c.x, c.y, c.z)
}

pub fn sync_island_sprites(
    mut commands: Commands,
    islands: Res<IslandMap>,
    mut sprites: ResMut<IslandSprites>,
    mut query: Query<(&IslandTile, &mut Sprite, &mut Visibility)>,
) {
    for (tile, mut sprite, mut visibility) in query.iter_mut() {
        let Some(island) = islands.get(tile.coord) else {
            continue;
        };
        sprite.color = damage_color(island.damage);
        *visibility = if island.visible {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
    }

    for island in islands.iter() {
        if sprites.entities.contains_key(&island.coord) {
            continue;
        }
        let entity = commands
            .spawn((
                Sprite {
                    color: damage_color(island.damage),
                    custom_size: Some(Vec2::splat(ISLAND_SPAN - TILE_SIZE)),
                    ..default()
                },
                Transform::from_translation(island_origin(island.coord).extend(0.0)),
                IslandTile { coord: island.coord },
            ))
            .id();
        sprites.entities.insert(island.coord, entity);
    }

    sprites.entities.retain(|coord, entity| {
        let keep = islands.contains(*coord);
        if !keep {
            commands.entity(*entity).despawn();
        }
        keep
    });
}
