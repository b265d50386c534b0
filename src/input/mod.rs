use std::time::Duration;

use bevy::prelude::*;
use crate::config::GameConfig;
use crate::shared::*;

pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        let repeat = app
            .world()
            .get_resource::<GameConfig>()
            .map(|c| c.input_repeat_secs)
            .unwrap_or(0.5);
        app.init_resource::<KeyBindings>()
            .insert_resource(InputGates::new(Duration::from_secs_f32(repeat)))
            .add_systems(PreUpdate, read_keyboard);
    }
}

#[derive(Resource, Debug, Clone)]
pub struct KeyBindings {
    pub up: [KeyCode; 2],
    pub down: [KeyCode; 2],
    pub left: [KeyCode; 2],
    pub right: [KeyCode; 2],
    pub confirm: [KeyCode; 2],
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            up: [KeyCode::KeyW, KeyCode::ArrowUp],
            down: [KeyCode::KeyS, KeyCode::ArrowDown],
            left: [KeyCode::KeyA, KeyCode::ArrowLeft],
            right: [KeyCode::KeyD, KeyCode::ArrowRight],
            confirm: [KeyCode::Space, KeyCode::Enter],
        }
    }
}

/// Turns a held control into discrete presses: fires on the first frame it
/// is down, then once per `interval` while it stays down.
#[derive(Debug, Clone)]
pub struct RepeatGate {
    interval: Duration,
    held: Option<Timer>,
}

impl RepeatGate {
    pub fn new(interval: Duration) -> Self {
        Self { interval, held: None }
    }

    pub fn update(&mut self, down: bool, delta: Duration) -> bool {
        if !down {
            self.held = None;
            return false;
        }
        match self.held.as_mut() {
            None => {
                self.held = Some(Timer::new(self.interval, TimerMode::Repeating));
                true
            }
            Some(timer) => timer.tick(delta).just_finished(),
        }
    }
}

#[derive(Resource, Debug, Clone)]
pub struct InputGates {
    pub up: RepeatGate,
    pub down: RepeatGate,
    pub left: RepeatGate,
    pub right: RepeatGate,
    pub confirm: RepeatGate,
}

impl InputGates {
    pub fn new(interval: Duration) -> Self {
        Self {
            up: RepeatGate::new(interval),
            down: RepeatGate::new(interval),
            left: RepeatGate::new(interval),
            right: RepeatGate::new(interval),
            confirm: RepeatGate::new(interval),
        }
    }
}

/// The single point where hardware input becomes game intents.
fn read_keyboard(
    time: Res<Time>,
    keys: Res<ButtonInput<KeyCode>>,
    bindings: Res<KeyBindings>,
    mut gates: ResMut<InputGates>,
    mut input: ResMut<PlayerInput>,
) {
    let delta = time.delta();
    let held = |codes: &[KeyCode; 2]| keys.any_pressed(codes.iter().copied());

    *input = PlayerInput {
        up: gates.up.update(held(&bindings.up), delta),
        down: gates.down.update(held(&bindings.down), delta),
        left: gates.left.update(held(&bindings.left), delta),
        right: gates.right.update(held(&bindings.right), delta),
        confirm: gates.confirm.update(held(&bindings.confirm), delta),
    };
}
