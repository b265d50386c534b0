//! The plot state machine: soil × plant age, driven by `be_interacted`
//! and by its own growth / reap timers.

use std::time::Duration;

use bevy::prelude::*;
use crate::config::GameConfig;
use crate::shared::*;

/// Per-plant tuning copied into every plot when it is created.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlantProfile {
    pub kind: PlantType,
    pub mature_age: u8,
    pub growth_step: Duration,
    pub reap_rise: Duration,
    pub reap_hold: Duration,
    pub reap_fade: Duration,
}

impl PlantProfile {
    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            kind: PlantType::Carrot,
            mature_age: config.mature_age,
            growth_step: Duration::from_secs_f32(config.growth_step_secs),
            reap_rise: Duration::from_secs_f32(config.reap_rise_secs),
            reap_hold: Duration::from_secs_f32(config.reap_hold_secs),
            reap_fade: Duration::from_secs_f32(config.reap_fade_secs),
        }
    }

    /// Age written on reap while the harvest animation plays.
    pub fn harvested_age(&self) -> u8 {
        self.mature_age.saturating_add(1)
    }
}

impl Default for PlantProfile {
    fn default() -> Self {
        Self::from_config(&GameConfig::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractOutcome {
    Applied,
    /// Action not legal in the current state; nothing changed.
    Ignored,
}

/// Visual phases of a reap. The plot clears only after `Fade` ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReapPhase {
    Rise,
    Hold,
    Fade,
}

#[derive(Debug, Clone)]
struct ReapSequence {
    phase: ReapPhase,
    timer: Timer,
}

/// What a plot's timers did during one `tick`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlotTick {
    pub grew: u8,
    pub matured: bool,
    pub cleared: bool,
}

#[derive(Debug, Clone)]
pub struct Plot {
    pub island: Coord,
    pub local: Coord,
    soil: SoilState,
    profile: PlantProfile,
    /// `None` = no plant.
    plant_age: Option<u8>,
    growth: Option<Timer>,
    reap: Option<ReapSequence>,
}

impl Plot {
    pub fn new(island: Coord, local: Coord, profile: PlantProfile) -> Self {
        Self {
            island,
            local,
            soil: SoilState::Virgin,
            profile,
            plant_age: None,
            growth: None,
            reap: None,
        }
    }

    pub fn soil_state(&self) -> SoilState {
        self.soil
    }

    pub fn plant_type(&self) -> PlantType {
        self.profile.kind
    }

    pub fn plant_age(&self) -> Option<u8> {
        self.plant_age
    }

    pub fn has_plant(&self) -> bool {
        self.plant_age.is_some()
    }

    pub fn mature_age(&self) -> u8 {
        self.profile.mature_age
    }

    pub fn is_mature(&self) -> bool {
        self.plant_age == Some(self.profile.mature_age)
    }

    pub fn is_growing(&self) -> bool {
        self.growth.is_some()
    }

    pub fn is_deprecated(&self) -> bool {
        self.soil == SoilState::Deprecated
    }

    pub fn reap_phase(&self) -> Option<ReapPhase> {
        self.reap.as_ref().map(|r| r.phase)
    }

    /// Fraction of the current reap phase already played (0..=1).
    pub fn reap_progress(&self) -> f32 {
        self.reap.as_ref().map(|r| r.timer.fraction()).unwrap_or(0.0)
    }

    pub fn available_actions(&self) -> &'static [ActionType] {
        available_actions(self.soil, self.has_plant(), self.is_mature())
    }

    pub fn accepts(&self, action: ActionType) -> bool {
        self.available_actions().contains(&action)
    }

    /// Sole mutation entry point for player actions.
    pub fn be_interacted(&mut self, action: ActionType) -> InteractOutcome {
        if !self.accepts(action) {
            return InteractOutcome::Ignored;
        }
        match action {
            ActionType::Plow => self.soil = SoilState::Plowed,
            ActionType::Water => {
                self.soil = SoilState::Watered;
                if self.plant_age == Some(0) {
                    self.start_growth();
                }
            }
            ActionType::Sow => {
                self.plant_age = Some(0);
                if self.soil == SoilState::Watered {
                    self.start_growth();
                }
            }
            ActionType::Reap => {
                self.plant_age = Some(self.profile.harvested_age());
                self.reap = Some(ReapSequence {
                    phase: ReapPhase::Rise,
                    timer: Timer::new(self.profile.reap_rise, TimerMode::Once),
                });
            }
        }
        InteractOutcome::Applied
    }

    /// Irreversible; stops every timer on the plot.
    pub fn be_deprecated(&mut self) {
        self.soil = SoilState::Deprecated;
        self.growth = None;
        self.reap = None;
    }

    /// Advance growth and reap timers by `delta`.
    pub fn tick(&mut self, delta: Duration) -> PlotTick {
        let mut out = PlotTick::default();

        if let Some(timer) = self.growth.as_mut() {
            timer.tick(delta);
            let steps = timer.times_finished_this_tick();
            let mature_age = self.profile.mature_age;
            for _ in 0..steps {
                match self.plant_age {
                    Some(age) if age < mature_age => {
                        self.plant_age = Some(age + 1);
                        out.grew += 1;
                    }
                    _ => break,
                }
            }
            if self.plant_age.is_some_and(|age| age >= mature_age) {
                self.growth = None;
                out.matured = out.grew > 0;
            }
        }

        let mut budget = delta;
        while let Some(seq) = self.reap.as_mut() {
            let left = seq.timer.remaining();
            if budget < left {
                seq.timer.tick(budget);
                break;
            }
            budget -= left;
            let phase = seq.phase;
            match phase {
                ReapPhase::Rise => {
                    seq.phase = ReapPhase::Hold;
                    seq.timer = Timer::new(self.profile.reap_hold, TimerMode::Once);
                }
                ReapPhase::Hold => {
                    seq.phase = ReapPhase::Fade;
                    seq.timer = Timer::new(self.profile.reap_fade, TimerMode::Once);
                }
                ReapPhase::Fade => {
                    self.reap = None;
                    self.soil = SoilState::Plowed;
                    self.plant_age = None;
                    out.cleared = true;
                }
            }
        }

        out
    }

    fn start_growth(&mut self) {
        if self.growth.is_some() {
            return;
        }
        if self.plant_age.is_some_and(|age| age < self.profile.mature_age) {
            self.growth = Some(Timer::new(self.profile.growth_step, TimerMode::Repeating));
        }
    }
}

/// Legal actions as a pure function of soil, plant presence and maturity.
pub fn available_actions(soil: SoilState, has_plant: bool, is_mature: bool) -> &'static [ActionType] {
    match (soil, has_plant, is_mature) {
        (SoilState::Virgin, _, _) => &[ActionType::Plow],
        (SoilState::Plowed, false, _) => &[ActionType::Water, ActionType::Sow],
        (SoilState::Plowed, true, _) => &[ActionType::Water],
        (SoilState::Watered, false, _) => &[ActionType::Sow],
        (SoilState::Watered, true, false) => &[],
        (SoilState::Watered, true, true) => &[ActionType::Reap],
        (SoilState::Deprecated, _, _) => &[],
    }
}
