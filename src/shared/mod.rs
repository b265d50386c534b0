//! Shared components, resources, events, and states for Beatfarm.
//!
//! This is the type contract. Every domain plugin imports from here.
//! No domain imports from any other domain directly, except through the
//! resource types re-exported by `lib.rs`.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════
// GAME STATE: top-level state machine
// ═══════════════════════════════════════════════════════════════════════

/// BeforeGame → InGame → {Win | Lose}; Win → BeforeGame restarts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, States, Default)]
pub enum GameState {
    #[default]
    BeforeGame,
    InGame,
    Win,
    Lose,
}

impl GameState {
    /// Whether `self → to` is one of the edges the session allows.
    pub fn can_transition_to(self, to: GameState) -> bool {
        matches!(
            (self, to),
            (GameState::BeforeGame, GameState::InGame)
                | (GameState::InGame, GameState::Win)
                | (GameState::InGame, GameState::Lose)
                | (GameState::Win, GameState::BeforeGame)
        )
    }
}

/// Per-frame ordering of the simulation. Configured once by the session
/// plugin; every domain places its systems in one of these.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TickSet {
    /// Timers advance: beat scrolling, plant growth, avatar tasks.
    Clock,
    /// Deferred consequences land: committed avatar actions reach their
    /// plot, misses from the previous frame damage their island.
    Resolve,
    /// Player intents become avatar commands and beat hits.
    Commands,
    /// Unlocks, then win/lose.
    Feedback,
}

// ═══════════════════════════════════════════════════════════════════════
// COORDINATES
// ═══════════════════════════════════════════════════════════════════════

/// Integer pair used both for island identity and for a plot's address
/// inside its island.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const ZERO: Coord = Coord { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

/// Cardinal step. Screen convention: `y` grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// FARMING
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionType {
    Plow,
    Sow,
    Water,
    Reap,
}

impl ActionType {
    pub const ALL: [ActionType; 4] = [
        ActionType::Plow,
        ActionType::Sow,
        ActionType::Water,
        ActionType::Reap,
    ];

    /// Sound played when the avatar performs this action.
    pub fn sfx_id(self) -> &'static str {
        match self {
            ActionType::Plow => "plow",
            ActionType::Sow => "sow",
            ActionType::Water => "water",
            ActionType::Reap => "yeah",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SoilState {
    #[default]
    Virgin,
    Plowed,
    Watered,
    Deprecated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PlantType {
    #[default]
    Carrot,
}

// ═══════════════════════════════════════════════════════════════════════
// RHYTHM
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BeatType {
    /// Filler marker, never hittable.
    Small,
    /// Carries the action the player must perform on it.
    Big,
}

/// One entry of the repeating beat sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeatSpec {
    pub beat_type: BeatType,
    #[serde(default)]
    pub action: Option<ActionType>,
}

impl BeatSpec {
    pub const fn small() -> Self {
        Self { beat_type: BeatType::Small, action: None }
    }

    pub const fn big(action: ActionType) -> Self {
        Self { beat_type: BeatType::Big, action: Some(action) }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// INPUT: the only thing simulation systems read from the player
// ═══════════════════════════════════════════════════════════════════════

/// Rate-limited intents for the current frame. Written by the input
/// domain (or directly by tests), read by the session.
#[derive(Resource, Debug, Clone, Default)]
pub struct PlayerInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub confirm: bool,
}

impl PlayerInput {
    /// At most one step per frame; horizontal wins over vertical.
    pub fn direction(&self) -> Option<Direction> {
        if self.left {
            Some(Direction::Left)
        } else if self.right {
            Some(Direction::Right)
        } else if self.up {
            Some(Direction::Up)
        } else if self.down {
            Some(Direction::Down)
        } else {
            None
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// EVENTS: cross-domain communication
// ═══════════════════════════════════════════════════════════════════════

/// The avatar's action animation reached its commit point; the plot at
/// the address may now transition.
#[derive(Event, Debug, Clone)]
pub struct ActionCommittedEvent {
    pub action: ActionType,
    pub island: Coord,
    pub local: Coord,
}

/// The avatar finished a step and now stands on this plot.
#[derive(Event, Debug, Clone)]
pub struct AvatarArrivedEvent {
    pub island: Coord,
    pub local: Coord,
}

#[derive(Event, Debug, Clone)]
pub struct BeatHitEvent {
    pub action: ActionType,
    pub distance: f32,
}

/// Confirm pressed with no hittable beat while standing on `island`.
#[derive(Event, Debug, Clone)]
pub struct BeatMissedEvent {
    pub island: Coord,
}

#[derive(Event, Debug, Clone)]
pub struct IslandDamagedEvent {
    pub island: Coord,
    pub damage: u8,
}

#[derive(Event, Debug, Clone)]
pub struct IslandDestroyedEvent {
    pub island: Coord,
}

#[derive(Event, Debug, Clone)]
pub struct IslandUnlockedEvent {
    pub island: Coord,
}

#[derive(Event, Debug, Clone)]
pub struct ScoreChangedEvent {
    pub score: u32,
}

#[derive(Event, Debug, Clone)]
pub struct PlaySfxEvent {
    pub sfx_id: String,
}

#[derive(Event, Debug, Clone)]
pub struct PlayMusicEvent {
    /// `None` stops the current track.
    pub track_id: Option<String>,
}

// ═══════════════════════════════════════════════════════════════════════
// CONSTANTS
// ═══════════════════════════════════════════════════════════════════════

pub const TILE_SIZE: f32 = 32.0;
/// One plot is 2×2 tiles on screen.
pub const PLOT_SIZE: f32 = TILE_SIZE * 2.0;
/// Island footprint including the shoreline border.
pub const ISLAND_SPAN: f32 = TILE_SIZE * 8.0;
pub const SCREEN_WIDTH: f32 = 1200.0;
pub const SCREEN_HEIGHT: f32 = 750.0;

/// Damage level at which an island is destroyed.
pub const MAX_ISLAND_DAMAGE: u8 = 4;

/// World-space centre of an island. Island `y` grows downward on screen
/// while Bevy's world `y` grows upward.
pub fn island_origin(island: Coord) -> Vec2 {
    Vec2::new(island.x as f32 * ISLAND_SPAN, -(island.y as f32) * ISLAND_SPAN)
}

/// World-space centre of one plot of a `side`×`side` island.
pub fn plot_to_world(island: Coord, local: Coord, side: i32) -> Vec2 {
    let half = (side - 1) as f32 * 0.5;
    island_origin(island)
        + Vec2::new(
            (local.x as f32 - half) * PLOT_SIZE,
            -(local.y as f32 - half) * PLOT_SIZE,
        )
}
