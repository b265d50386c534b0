//! Visual synchronisation: keep plot sprites in sync with `PlotGrid`.

use std::collections::HashMap;

use bevy::prelude::*;
use crate::shared::*;
use super::{Plot, PlotGrid, ReapPhase};

/// How far a harvested plant lifts off the soil before fading.
const REAP_LIFT: f32 = TILE_SIZE * 0.75;

#[derive(Component, Debug, Clone)]
pub struct PlotTile {
    pub island: Coord,
    pub local: Coord,
}

#[derive(Component, Debug, Clone)]
pub struct PlantSprite {
    pub island: Coord,
    pub local: Coord,
}

/// (island, local) → (soil entity, plant entity)
#[derive(Resource, Default, Debug)]
pub struct PlotSprites {
    pub entities: HashMap<(Coord, Coord), (Entity, Entity)>,
}

pub fn soil_color(soil: SoilState) -> Color {
    match soil {
        SoilState::Virgin => Color::srgb(0.42, 0.62, 0.30),
        SoilState::Plowed => Color::srgb(0.55, 0.38, 0.22),
        SoilState::Watered => Color::srgb(0.36, 0.24, 0.14),
        SoilState::Deprecated => Color::srgb(0.35, 0.35, 0.38),
    }
}

/// Seedling green ramping towards carrot orange at maturity.
pub fn plant_color(age: u8, mature_age: u8) -> Color {
    let t = (age as f32 / mature_age.max(1) as f32).clamp(0.0, 1.0);
    let sprout = Vec3::new(0.45, 0.85, 0.35);
    let ripe = Vec3::new(0.95, 0.55, 0.15);
    let c = sprout.lerp(ripe, t);
    Color::srgb(c.x, c.y, c.z)
}

// ─────────────────────────────────────────────────────────────────────────────
// Sprite sync
// ─────────────────────────────────────────────────────────────────────────────

/// Spawns a soil and a plant sprite for each plot, recolours existing ones,
/// and despawns sprites whose plot vanished (world reset).
pub fn sync_plot_sprites(
    mut commands: Commands,
    grid: Res<PlotGrid>,
    mut sprites: ResMut<PlotSprites>,
    mut soil_query: Query<(&PlotTile, &mut Sprite), Without<PlantSprite>>,
) {
    for (tile, mut sprite) in soil_query.iter_mut() {
        if let Some(plot) = grid.get(tile.island, tile.local) {
            sprite.color = soil_color(plot.soil_state());
        }
    }

    let side = grid.side();
    let missing: Vec<&Plot> = grid
        .iter()
        .filter(|p| !sprites.entities.contains_key(&(p.island, p.local)))
        .collect();

    for plot in missing {
        let pos = plot_to_world(plot.island, plot.local, side);
        let soil = commands
            .spawn((
                Sprite {
                    color: soil_color(plot.soil_state()),
                    custom_size: Some(Vec2::splat(PLOT_SIZE - 4.0)),
                    ..default()
                },
                Transform::from_translation(pos.extend(1.0)),
                PlotTile { island: plot.island, local: plot.local },
            ))
            .id();
        let plant = commands
            .spawn((
                Sprite {
                    color: Color::NONE,
                    custom_size: Some(Vec2::splat(TILE_SIZE * 0.8)),
                    ..default()
                },
                Transform::from_translation(pos.extend(2.0)),
                Visibility::Hidden,
                PlantSprite { island: plot.island, local: plot.local },
            ))
            .id();
        sprites.entities.insert((plot.island, plot.local), (soil, plant));
    }

    let stale: Vec<(Coord, Coord)> = sprites
        .entities
        .keys()
        .filter(|(island, local)| grid.get(*island, *local).is_none())
        .cloned()
        .collect();

    for key in stale {
        if let Some((soil, plant)) = sprites.entities.remove(&key) {
            commands.entity(soil).despawn();
            commands.entity(plant).despawn();
        }
    }
}

/// Plant colour follows age; a reap lifts the plant, holds, then fades it.
pub fn animate_plants(
    grid: Res<PlotGrid>,
    mut query: Query<(&PlantSprite, &mut Sprite, &mut Transform, &mut Visibility)>,
) {
    let side = grid.side();
    for (tag, mut sprite, mut transform, mut visibility) in query.iter_mut() {
        let Some(plot) = grid.get(tag.island, tag.local) else {
            continue;
        };
        let Some(age) = plot.plant_age() else {
            *visibility = Visibility::Hidden;
            continue;
        };
        *visibility = Visibility::Inherited;

        let base = plot_to_world(plot.island, plot.local, side);
        let shown = age.min(plot.mature_age());
        let t = plot.reap_progress();
        let (lift, alpha) = match plot.reap_phase() {
            None => (0.0, 1.0),
            Some(ReapPhase::Rise) => (REAP_LIFT * t, 1.0),
            Some(ReapPhase::Hold) => (REAP_LIFT, 1.0),
            Some(ReapPhase::Fade) => (REAP_LIFT, 1.0 - t),
        };
        sprite.color = plant_color(shown, plot.mature_age()).with_alpha(alpha);
        transform.translation = (base + Vec2::new(0.0, lift)).extend(2.0);
    }
}
