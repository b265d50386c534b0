//! The scrolling beat track: spawn cadence, scrolling, availability and
//! the hit query.

use std::time::Duration;

use bevy::prelude::*;
use crate::config::GameConfig;
use crate::shared::*;
use super::beat::{Beat, BeatId, BeatPool};

/// Unit-times per pulse of the whole track.
pub const PULSE_UNITS: u32 = 4;

/// The beat `hitable_beat` picked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitCandidate {
    pub id: BeatId,
    pub action: ActionType,
    pub distance: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrackTick {
    pub spawned: u32,
    pub retired: usize,
}

#[derive(Resource, Debug, Clone)]
pub struct RhythmTrack {
    sequence: Vec<BeatSpec>,
    unit: Duration,
    spacing: f32,
    lead: f32,
    retire: f32,
    big_tolerance: f32,
    small_tolerance: f32,
    pool: BeatPool,
    /// `None` while stopped.
    spawner: Option<Timer>,
    cursor: usize,
    /// Legal actions last pushed by the session; applied to new spawns too.
    legal: Vec<ActionType>,
    clock: Duration,
    skipped: u32,
}

impl Default for RhythmTrack {
    fn default() -> Self {
        Self::from_config(&GameConfig::default())
    }
}

impl RhythmTrack {
    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            sequence: config.sequence.clone(),
            unit: config.unit_time(),
            spacing: config.beat_spacing,
            lead: config.delay_beats as f32 * config.beat_spacing,
            retire: config.retire_distance,
            big_tolerance: config.big_tolerance,
            small_tolerance: config.small_tolerance,
            pool: BeatPool::with_capacity(config.pool_capacity),
            spawner: None,
            cursor: 0,
            legal: Vec::new(),
            clock: Duration::ZERO,
            skipped: 0,
        }
    }

    // ── Derived timing ──────────────────────────────────────────────────

    pub fn unit_time(&self) -> Duration {
        self.unit
    }

    /// Pixels per second; chosen so one unit-time covers exactly `spacing`.
    pub fn velocity(&self) -> f32 {
        self.spacing / self.unit.as_secs_f32()
    }

    /// Spawn offset from the hit zone.
    pub fn lead_distance(&self) -> f32 {
        self.lead
    }

    pub fn retire_distance(&self) -> f32 {
        self.retire
    }

    pub fn tolerance(&self, beat_type: BeatType) -> f32 {
        match beat_type {
            BeatType::Big => self.big_tolerance,
            BeatType::Small => self.small_tolerance,
        }
    }

    /// 0..1 through the current pulse cycle.
    pub fn pulse_phase(&self) -> f32 {
        let period = self.unit.as_secs_f64() * PULSE_UNITS as f64;
        (self.clock.as_secs_f64() / period).fract() as f32
    }

    // ── Lifecycle ───────────────────────────────────────────────────────

    pub fn is_running(&self) -> bool {
        self.spawner.is_some()
    }

    /// Clears the track and spawns the first beat of the sequence at once.
    pub fn start(&mut self) {
        self.pool.clear();
        self.cursor = 0;
        self.clock = Duration::ZERO;
        self.skipped = 0;
        self.spawner = Some(Timer::new(self.unit, TimerMode::Repeating));
        self.spawn_next(Duration::ZERO);
    }

    pub fn stop(&mut self) {
        self.spawner = None;
        self.pool.clear();
    }

    /// Scrolls every beat, spawns the beats due in `delta`, then retires
    /// beats that have scrolled far enough past the hit zone.
    pub fn advance(&mut self, delta: Duration) -> TrackTick {
        let Some(timer) = self.spawner.as_mut() else {
            return TrackTick::default();
        };
        timer.tick(delta);
        let due = timer.times_finished_this_tick();
        let since_last = timer.elapsed();
        self.clock += delta;

        let secs = delta.as_secs_f32();
        for beat in self.pool.iter_mut() {
            beat.position -= beat.velocity * secs;
        }

        // Oldest first: each beat already scrolled for the part of `delta`
        // after its own spawn instant.
        for k in 0..due {
            let age = since_last + self.unit * (due - 1 - k);
            self.spawn_next(age);
        }

        let retire = self.retire;
        let retired = self.pool.release_where(|b| b.position < -retire);
        TrackTick { spawned: due, retired }
    }

    fn spawn_next(&mut self, age: Duration) {
        let Some(&spec) = self.sequence.get(self.cursor) else {
            return;
        };
        self.cursor = (self.cursor + 1) % self.sequence.len();

        let velocity = self.velocity();
        let mut beat = Beat {
            spec,
            position: self.lead - velocity * age.as_secs_f32(),
            velocity,
            available: false,
            hit: false,
        };
        beat.refresh_available(&self.legal);
        self.insert(beat);
    }

    fn insert(&mut self, beat: Beat) -> Option<BeatId> {
        let beat_type = beat.beat_type();
        let id = self.pool.acquire(beat);
        if id.is_none() {
            self.skipped += 1;
            warn!(
                "[Rhythm] Beat pool exhausted ({} slots); dropped a {:?} beat",
                self.pool.capacity(),
                beat_type
            );
        }
        id
    }

    /// Places a beat directly, bypassing the spawner.
    pub fn place_beat(&mut self, spec: BeatSpec, position: f32) -> Option<BeatId> {
        let mut beat = Beat {
            spec,
            position,
            velocity: self.velocity(),
            available: false,
            hit: false,
        };
        beat.refresh_available(&self.legal);
        self.insert(beat)
    }

    // ── Matching ────────────────────────────────────────────────────────

    pub fn update_available_beats(&mut self, legal: &[ActionType]) {
        if self.legal != legal {
            self.legal.clear();
            self.legal.extend_from_slice(legal);
        }
        for beat in self.pool.iter_mut() {
            beat.refresh_available(legal);
        }
    }

    /// Nearest available, unhit beat within its tolerance of the hit zone.
    pub fn hitable_beat(&self) -> Option<HitCandidate> {
        self.pool
            .iter()
            .filter(|(_, b)| b.available && !b.hit)
            .filter(|(_, b)| b.distance() <= self.tolerance(b.beat_type()))
            .filter_map(|(id, b)| {
                b.action().map(|action| HitCandidate { id, action, distance: b.distance() })
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }

    /// Marks the beat consumed. It keeps scrolling until retired.
    pub fn be_hit(&mut self, id: BeatId) -> bool {
        match self.pool.get_mut(id) {
            Some(beat) if !beat.hit => {
                beat.hit = true;
                true
            }
            _ => false,
        }
    }

    // ── Queries ─────────────────────────────────────────────────────────

    pub fn beat(&self, id: BeatId) -> Option<&Beat> {
        self.pool.get(id)
    }

    pub fn beats(&self) -> impl Iterator<Item = (BeatId, &Beat)> {
        self.pool.iter()
    }

    pub fn live_beats(&self) -> usize {
        self.pool.live_count()
    }

    pub fn capacity(&self) -> usize {
        self.pool.capacity()
    }

    /// Index of the template the next spawn will use.
    pub fn sequence_cursor(&self) -> usize {
        self.cursor
    }

    /// Beats dropped because the pool was full.
    pub fn skipped(&self) -> u32 {
        self.skipped
    }

    pub fn legal_actions(&self) -> &[ActionType] {
        &self.legal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-3;

    fn track_at(bpm: f32) -> RhythmTrack {
        RhythmTrack::from_config(&GameConfig { bpm, ..default() })
    }

    fn positions(track: &RhythmTrack) -> Vec<f32> {
        let mut p: Vec<f32> = track.beats().map(|(_, b)| b.position).collect();
        p.sort_by(|a, b| a.total_cmp(b));
        p
    }

    #[test]
    fn first_beat_spawns_immediately_at_lead_distance() {
        let mut track = RhythmTrack::default();
        track.start();
        assert!(track.is_running());
        let beats = positions(&track);
        assert_eq!(beats.len(), 1);
        assert!((beats[0] - track.lead_distance()).abs() < EPS);
        assert_eq!(track.sequence_cursor(), 1);
    }

    #[test]
    fn one_unit_time_covers_one_spacing_at_any_bpm() {
        for bpm in [45.0, 90.0, 120.0, 173.0] {
            let track = track_at(bpm);
            let per_unit = track.velocity() * track.unit_time().as_secs_f32();
            assert!((per_unit - 48.0).abs() < EPS, "bpm {}", bpm);
            assert!((track.lead_distance() - 8.0 * 48.0).abs() < EPS);
        }
    }

    #[test]
    fn arrival_takes_delay_beats_unit_times_regardless_of_bpm() {
        for bpm in [60.0, 120.0, 200.0] {
            let mut track = track_at(bpm);
            track.start();
            let arrival = Duration::from_secs_f32(track.lead_distance() / track.velocity());
            let units = arrival.as_secs_f32() / track.unit_time().as_secs_f32();
            assert!((units - 8.0).abs() < EPS, "bpm {}", bpm);

            track.advance(arrival);
            let first = positions(&track)[0];
            assert!(first.abs() < 0.05, "bpm {}: first beat at {}", bpm, first);
        }
    }

    #[test]
    fn catch_up_spawns_keep_exact_spacing() {
        let mut track = RhythmTrack::default();
        track.start();
        track.advance(track.unit_time().mul_f32(2.5));

        let beats = positions(&track);
        assert_eq!(beats.len(), 3);
        for pair in beats.windows(2) {
            assert!((pair[1] - pair[0] - 48.0).abs() < 0.05, "{:?}", beats);
        }
        let lead = track.lead_distance();
        assert!((beats[2] - (lead - 24.0)).abs() < 0.05);
    }

    #[test]
    fn beats_retire_past_the_boundary() {
        let mut track = RhythmTrack::default();
        track.start();
        let id = track.beats().next().map(|(id, _)| id).unwrap();
        let travel = track.lead_distance() + track.retire_distance() + 1.0;
        let secs = travel / track.velocity();
        let mut tick = TrackTick::default();
        let steps = 200;
        for _ in 0..steps {
            tick.retired += track.advance(Duration::from_secs_f32(secs / steps as f32)).retired;
        }
        assert!(track.beat(id).is_none());
        assert!(tick.retired >= 1);
    }

    #[test]
    fn nearest_available_beat_wins() {
        let mut track = RhythmTrack::default();
        track.update_available_beats(&[ActionType::Plow]);
        track.place_beat(BeatSpec::big(ActionType::Plow), 40.0);
        let near = track.place_beat(BeatSpec::big(ActionType::Plow), 10.0).unwrap();

        let hit = track.hitable_beat().unwrap();
        assert_eq!(hit.id, near);
        assert_eq!(hit.action, ActionType::Plow);
        assert!((hit.distance - 10.0).abs() < EPS);

        let mut track = RhythmTrack::default();
        track.update_available_beats(&[ActionType::Plow]);
        track.place_beat(BeatSpec::big(ActionType::Plow), -20.0);
        let near = track.place_beat(BeatSpec::big(ActionType::Plow), 12.0).unwrap();
        assert_eq!(track.hitable_beat().unwrap().id, near);
    }

    #[test]
    fn nothing_hitable_outside_tolerance_or_when_unavailable() {
        let mut track = RhythmTrack::default();
        track.update_available_beats(&[ActionType::Water]);
        track.place_beat(BeatSpec::big(ActionType::Plow), 5.0);
        track.place_beat(BeatSpec::big(ActionType::Water), 33.0);
        track.place_beat(BeatSpec::small(), 0.0);
        assert!(track.hitable_beat().is_none());

        track.update_available_beats(&[ActionType::Plow]);
        assert_eq!(track.hitable_beat().unwrap().action, ActionType::Plow);
    }

    #[test]
    fn hit_beat_is_consumed_but_stays_on_track() {
        let mut track = RhythmTrack::default();
        track.update_available_beats(&[ActionType::Sow]);
        let id = track.place_beat(BeatSpec::big(ActionType::Sow), 3.0).unwrap();

        assert!(track.be_hit(id));
        assert!(!track.be_hit(id));
        assert!(track.hitable_beat().is_none());
        assert!(track.beat(id).is_some_and(|b| b.hit));
    }

    #[test]
    fn new_spawns_inherit_current_availability() {
        let mut track = RhythmTrack::default();
        track.update_available_beats(&[ActionType::Plow]);
        track.start();
        let (_, first) = track.beats().next().unwrap();
        assert_eq!(first.action(), Some(ActionType::Plow));
        assert!(first.available);
    }

    #[test]
    fn full_pool_skips_beats_but_keeps_the_sequence_moving() {
        let config = GameConfig { pool_capacity: 2, ..default() };
        let mut track = RhythmTrack::from_config(&config);
        track.start();
        track.advance(track.unit_time() * 3);

        assert_eq!(track.live_beats(), 2);
        assert_eq!(track.skipped(), 2);
        assert_eq!(track.sequence_cursor(), 4);
    }

    #[test]
    fn each_beat_scrolls_at_its_own_velocity() {
        let mut track = RhythmTrack::default();
        track.start();
        let id = track.beats().next().map(|(id, _)| id).unwrap();
        track.pool.get_mut(id).unwrap().velocity = 0.0;
        track.advance(track.unit_time() / 2);
        let beat = track.beat(id).unwrap();
        assert!((beat.position - track.lead_distance()).abs() < EPS);
    }

    #[test]
    fn sequence_wraps() {
        let config = GameConfig {
            sequence: vec![BeatSpec::big(ActionType::Plow), BeatSpec::small()],
            ..default()
        };
        let mut track = RhythmTrack::from_config(&config);
        track.start();
        track.advance(track.unit_time());
        assert_eq!(track.sequence_cursor(), 0);
    }

    #[test]
    fn stop_clears_everything() {
        let mut track = RhythmTrack::default();
        track.start();
        track.advance(track.unit_time() * 4);
        track.stop();
        assert!(!track.is_running());
        assert_eq!(track.live_beats(), 0);
        assert_eq!(track.advance(Duration::from_secs(1)), TrackTick::default());
    }

    #[test]
    fn pulse_cycles_every_four_units() {
        let mut track = RhythmTrack::default();
        track.start();
        track.advance(track.unit_time() * 2);
        assert!((track.pulse_phase() - 0.5).abs() < EPS);
        track.advance(track.unit_time() * 2);
        assert!(track.pulse_phase() < EPS || track.pulse_phase() > 1.0 - EPS);
    }
}
