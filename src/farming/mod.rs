//! Farming domain: plot lifecycle and the timers that drive growth and reaping.
//!
//! The avatar never touches a plot directly: it announces a committed
//! action through `ActionCommittedEvent` and this domain applies it.

use bevy::prelude::*;
use crate::shared::*;

pub mod grid;
pub mod plot;
mod render;

pub use grid::PlotGrid;
pub use plot::{available_actions, InteractOutcome, PlantProfile, Plot, PlotTick, ReapPhase};

pub struct FarmingPlugin;

impl Plugin for FarmingPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PlotGrid>()
            // ------------------------------------------------------------------
            // Growth and reap timers only run while a round is being played
            // ------------------------------------------------------------------
            .add_systems(
                Update,
                tick_plots
                    .in_set(TickSet::Clock)
                    .run_if(in_state(GameState::InGame)),
            )
            // ------------------------------------------------------------------
            // Committed avatar work lands on plots in every state, so an
            // action started on the winning beat still finishes
            // ------------------------------------------------------------------
            .add_systems(Update, apply_committed_actions.in_set(TickSet::Resolve));
    }
}

/// Presentation half of the domain: colored placeholder sprites per plot.
pub struct FarmingViewPlugin;

impl Plugin for FarmingViewPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<render::PlotSprites>()
            .add_systems(PostUpdate, (render::sync_plot_sprites, render::animate_plants).chain());
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Systems
// ─────────────────────────────────────────────────────────────────────────────

/// Advances every plot's growth and reap timers, wherever the avatar is.
pub fn tick_plots(time: Res<Time>, mut grid: ResMut<PlotGrid>) {
    let delta = time.delta();
    for plot in grid.iter_mut() {
        let tick = plot.tick(delta);
        if tick.matured {
            debug!("[Farming] {} at {}/{} is ready to reap", kind_name(plot), plot.island, plot.local);
        }
        if tick.cleared {
            debug!("[Farming] Harvest finished at {}/{}", plot.island, plot.local);
        }
    }
}

/// Feeds each committed avatar action into the plot it was performed on.
pub fn apply_committed_actions(
    mut events: EventReader<ActionCommittedEvent>,
    mut grid: ResMut<PlotGrid>,
) {
    for ev in events.read() {
        let Some(plot) = grid.get_mut(ev.island, ev.local) else {
            debug!("[Farming] {:?} committed on missing plot {}/{}", ev.action, ev.island, ev.local);
            continue;
        };
        match plot.be_interacted(ev.action) {
            InteractOutcome::Applied => {
                debug!(
                    "[Farming] {:?} at {}/{} -> {:?}, plant {:?}",
                    ev.action,
                    ev.island,
                    ev.local,
                    plot.soil_state(),
                    plot.plant_age()
                );
            }
            InteractOutcome::Ignored => {
                debug!(
                    "[Farming] Ignored {:?} at {}/{} ({:?})",
                    ev.action, ev.island, ev.local, plot.soil_state()
                );
            }
        }
    }
}

fn kind_name(plot: &Plot) -> &'static str {
    match plot.plant_type() {
        PlantType::Carrot => "Carrot",
    }
}
