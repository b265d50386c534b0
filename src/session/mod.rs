//! Session domain: the per-round orchestration. Turns player intents into
//! avatar commands and beat hits, keeps score, opens islands at score
//! thresholds and decides when the round is won or lost.

use bevy::prelude::*;
use crate::avatar::Avatar;
use crate::config::{GameConfig, UnlockRule};
use crate::farming::PlotGrid;
use crate::islands::{CameraFocus, IslandMap};
use crate::rhythm::RhythmTrack;
use crate::shared::*;

/// Music played while a round is running.
pub const ROUND_TRACK: &str = "round";

#[derive(Resource, Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub score: u32,
    /// Index of the next unlock rule still waiting for its score.
    unlock_cursor: usize,
    pub hits: u32,
    pub misses: u32,
}

impl Session {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn add_point(&mut self) -> u32 {
        self.score += 1;
        self.score
    }

    /// Islands whose threshold the score has now reached, each returned
    /// exactly once over the session's lifetime.
    pub fn take_unlocks(&mut self, rules: &[UnlockRule]) -> Vec<Coord> {
        let mut due = Vec::new();
        while let Some(rule) = rules.get(self.unlock_cursor) {
            if self.score < rule.score {
                break;
            }
            due.push(rule.island);
            self.unlock_cursor += 1;
        }
        due
    }

    pub fn unlocks_taken(&self) -> usize {
        self.unlock_cursor
    }
}

pub struct SessionPlugin;

impl Plugin for SessionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Session>()
            .configure_sets(
                Update,
                (TickSet::Clock, TickSet::Resolve, TickSet::Commands, TickSet::Feedback).chain(),
            )
            // ------------------------------------------------------------------
            // State entry / exit
            // ------------------------------------------------------------------
            .add_systems(OnEnter(GameState::BeforeGame), setup_world)
            .add_systems(OnEnter(GameState::InGame), start_round_music)
            .add_systems(OnExit(GameState::InGame), stop_round_music)
            .add_systems(OnEnter(GameState::Win), celebrate_win)
            .add_systems(OnEnter(GameState::Lose), mourn_loss)
            // ------------------------------------------------------------------
            // Per-frame orchestration
            // ------------------------------------------------------------------
            .add_systems(
                Update,
                (handle_movement, push_legal_actions, handle_confirm)
                    .chain()
                    .in_set(TickSet::Commands),
            )
            .add_systems(
                Update,
                (apply_unlocks, check_end_conditions)
                    .chain()
                    .in_set(TickSet::Feedback),
            )
            // Intents are one-frame; cleared after everything has read them.
            .add_systems(Last, clear_player_input);
    }
}

/// Moves to `to` if that edge is legal from `from`; otherwise logs and
/// does nothing.
fn request_transition(from: GameState, to: GameState, next: &mut NextState<GameState>) -> bool {
    if from.can_transition_to(to) {
        info!("[Session] {:?} -> {:?}", from, to);
        next.set(to);
        true
    } else {
        debug!("[Session] Refused transition {:?} -> {:?}", from, to);
        false
    }
}

// ═══════════════════════════════════════════════════════════════════════
// STATE ENTRY / EXIT
// ═══════════════════════════════════════════════════════════════════════

/// Builds a fresh world from the tuning: one island, avatar on its start
/// plot, empty track, zero score.
pub fn setup_world(
    config: Res<GameConfig>,
    mut grid: ResMut<PlotGrid>,
    mut islands: ResMut<IslandMap>,
    mut avatar: ResMut<Avatar>,
    mut track: ResMut<RhythmTrack>,
    mut focus: ResMut<CameraFocus>,
    mut session: ResMut<Session>,
    mut score_events: EventWriter<ScoreChangedEvent>,
) {
    *grid = PlotGrid::from_config(&config);
    islands.clear();
    islands.create(config.start_island, &mut grid);
    *avatar = Avatar::from_config(&config);
    *track = RhythmTrack::from_config(&config);
    focus.reset(config.start_island);
    session.reset();
    score_events.send(ScoreChangedEvent { score: 0 });
    info!(
        "[Session] World ready: island {}, avatar at {}",
        config.start_island, config.start_local
    );
}

pub fn start_round_music(mut music: EventWriter<PlayMusicEvent>) {
    music.send(PlayMusicEvent { track_id: Some(ROUND_TRACK.to_string()) });
}

pub fn stop_round_music(mut music: EventWriter<PlayMusicEvent>) {
    music.send(PlayMusicEvent { track_id: None });
}

pub fn celebrate_win(
    mut avatar: ResMut<Avatar>,
    session: Res<Session>,
    mut sfx: EventWriter<PlaySfxEvent>,
) {
    avatar.celebrate();
    sfx.send(PlaySfxEvent { sfx_id: "applause".into() });
    info!(
        "[Session] Won with {} points ({} hits, {} misses)",
        session.score, session.hits, session.misses
    );
}

pub fn mourn_loss(session: Res<Session>, mut sfx: EventWriter<PlaySfxEvent>) {
    sfx.send(PlaySfxEvent { sfx_id: "ahhh".into() });
    info!("[Session] Every island lost; final score {}", session.score);
}

// ═══════════════════════════════════════════════════════════════════════
// COMMANDS
// ═══════════════════════════════════════════════════════════════════════

pub fn handle_movement(
    input: Res<PlayerInput>,
    state: Res<State<GameState>>,
    grid: Res<PlotGrid>,
    mut avatar: ResMut<Avatar>,
    mut sfx: EventWriter<PlaySfxEvent>,
) {
    if *state.get() != GameState::InGame {
        return;
    }
    let Some(dir) = input.direction() else {
        return;
    };
    match avatar.try_move(dir, &grid) {
        Ok((island, local)) => {
            debug!("[Session] Step {:?} towards {}/{}", dir, island, local);
            sfx.send(PlaySfxEvent { sfx_id: "jump".into() });
        }
        Err(reason) => debug!("[Session] Move {:?} rejected: {}", dir, reason),
    }
}

/// Tells the track which actions the avatar's plot accepts right now.
pub fn push_legal_actions(
    avatar: Res<Avatar>,
    grid: Res<PlotGrid>,
    mut track: ResMut<RhythmTrack>,
) {
    let legal = grid
        .get(avatar.island, avatar.local)
        .map(|plot| plot.available_actions())
        .unwrap_or(&[]);
    if track.legal_actions() != legal {
        debug!("[Session] Legal actions at {}/{}: {:?}", avatar.island, avatar.local, legal);
    }
    track.update_available_beats(legal);
}

pub fn handle_confirm(
    input: Res<PlayerInput>,
    state: Res<State<GameState>>,
    mut next_state: ResMut<NextState<GameState>>,
    mut avatar: ResMut<Avatar>,
    mut track: ResMut<RhythmTrack>,
    mut session: ResMut<Session>,
    mut score_events: EventWriter<ScoreChangedEvent>,
    mut hit_events: EventWriter<BeatHitEvent>,
    mut miss_events: EventWriter<BeatMissedEvent>,
    mut sfx: EventWriter<PlaySfxEvent>,
) {
    if !input.confirm {
        return;
    }
    let current = *state.get();
    match current {
        GameState::BeforeGame => {
            request_transition(current, GameState::InGame, &mut next_state);
        }
        GameState::Win => {
            request_transition(current, GameState::BeforeGame, &mut next_state);
        }
        GameState::Lose => {
            debug!("[Session] Confirm ignored: round is over");
        }
        GameState::InGame => {
            if avatar.is_busy() {
                debug!("[Session] Confirm ignored: avatar is busy");
                return;
            }
            let Some(candidate) = track.hitable_beat() else {
                session.misses += 1;
                debug!("[Session] Miss on island {}", avatar.island);
                miss_events.send(BeatMissedEvent { island: avatar.island });
                sfx.send(PlaySfxEvent { sfx_id: "error".into() });
                return;
            };
            if let Err(reason) = avatar.interact(candidate.action) {
                debug!("[Session] {:?} rejected: {}", candidate.action, reason);
                return;
            }
            track.be_hit(candidate.id);
            session.hits += 1;
            if candidate.action == ActionType::Reap {
                let score = session.add_point();
                info!("[Session] Harvest! Score {}", score);
                score_events.send(ScoreChangedEvent { score });
            }
            hit_events.send(BeatHitEvent {
                action: candidate.action,
                distance: candidate.distance,
            });
            sfx.send(PlaySfxEvent { sfx_id: candidate.action.sfx_id().into() });
        }
    }
}

pub fn clear_player_input(mut input: ResMut<PlayerInput>) {
    *input = PlayerInput::default();
}

// ═══════════════════════════════════════════════════════════════════════
// FEEDBACK
// ═══════════════════════════════════════════════════════════════════════

pub fn apply_unlocks(
    config: Res<GameConfig>,
    mut session: ResMut<Session>,
    mut islands: ResMut<IslandMap>,
    mut grid: ResMut<PlotGrid>,
    mut unlocked: EventWriter<IslandUnlockedEvent>,
    mut sfx: EventWriter<PlaySfxEvent>,
) {
    for island in session.take_unlocks(&config.unlocks) {
        if islands.unlock(island, &mut grid) {
            unlocked.send(IslandUnlockedEvent { island });
            sfx.send(PlaySfxEvent { sfx_id: "wow".into() });
        }
    }
}

pub fn check_end_conditions(
    config: Res<GameConfig>,
    session: Res<Session>,
    islands: Res<IslandMap>,
    state: Res<State<GameState>>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    let current = *state.get();
    if current != GameState::InGame {
        return;
    }
    if session.score >= config.win_score {
        request_transition(current, GameState::Win, &mut next_state);
    } else if islands.check_all_destroyed() {
        request_transition(current, GameState::Lose, &mut next_state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> Vec<UnlockRule> {
        GameConfig::default().unlocks
    }

    #[test]
    fn unlocks_fire_once_per_threshold() {
        let rules = rules();
        let mut session = Session::default();
        assert!(session.take_unlocks(&rules).is_empty());

        session.add_point();
        session.add_point();
        assert_eq!(session.take_unlocks(&rules), vec![Coord::new(1, 0)]);
        assert!(session.take_unlocks(&rules).is_empty(), "same score again");

        session.add_point();
        assert!(session.take_unlocks(&rules).is_empty());
        session.add_point();
        assert_eq!(session.take_unlocks(&rules), vec![Coord::new(-1, 0)]);
        assert_eq!(session.unlocks_taken(), 2);
    }

    #[test]
    fn score_jump_releases_every_passed_threshold_in_order() {
        let rules = rules();
        let mut session = Session { score: 7, ..default() };
        assert_eq!(
            session.take_unlocks(&rules),
            vec![Coord::new(1, 0), Coord::new(-1, 0), Coord::new(0, 1)]
        );
    }

    #[test]
    fn reset_starts_over() {
        let rules = rules();
        let mut session = Session { score: 9, hits: 20, misses: 3, ..default() };
        session.take_unlocks(&rules);
        session.reset();
        assert_eq!(session, Session::default());
        session.score = 2;
        assert_eq!(session.take_unlocks(&rules).len(), 1);
    }
}
