//! Avatar domain: the farmer's position and the busy gate that keeps
//! its movement and action animations from overlapping.
//!
//! Commands are accepted or rejected synchronously. Accepted commands run
//! as an `AvatarTask` whose completion is reported through events:
//! `ActionCommittedEvent` at the action's commit point and
//! `AvatarArrivedEvent` when a step lands.

use std::time::Duration;

use bevy::prelude::*;
use crate::config::GameConfig;
use crate::farming::PlotGrid;
use crate::shared::*;

mod render;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandRejected {
    /// A movement or action animation is still playing.
    Busy,
    /// The destination plot has not been materialized.
    NoPlot,
    /// The avatar is frozen in its victory pose.
    Frozen,
}

impl std::fmt::Display for CommandRejected {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            CommandRejected::Busy => "avatar is busy",
            CommandRejected::NoPlot => "no plot there",
            CommandRejected::Frozen => "avatar is celebrating",
        };
        f.write_str(reason)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimationKey {
    Idle,
    Jump,
    Plow,
    Sow,
    Water,
    Reap,
    Applause,
}

impl From<ActionType> for AnimationKey {
    fn from(action: ActionType) -> Self {
        match action {
            ActionType::Plow => AnimationKey::Plow,
            ActionType::Sow => AnimationKey::Sow,
            ActionType::Water => AnimationKey::Water,
            ActionType::Reap => AnimationKey::Reap,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Move { island: Coord, local: Coord },
    Act(ActionType),
}

#[derive(Debug, Clone)]
pub struct AvatarTask {
    pub kind: TaskKind,
    timer: Timer,
    commit_at: Duration,
    committed: bool,
}

/// Animation timing, copied from `GameConfig`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AvatarTiming {
    pub move_time: Duration,
    pub action_time: Duration,
    pub commit_delay: Duration,
}

impl AvatarTiming {
    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            move_time: Duration::from_secs_f32(config.move_secs),
            action_time: Duration::from_secs_f32(config.action_secs),
            commit_delay: Duration::from_secs_f32(config.commit_delay_secs),
        }
    }

    /// Point inside the action animation at which the plot may change.
    pub fn commit_point(&self, action: ActionType) -> Duration {
        match action {
            ActionType::Plow | ActionType::Water => self.commit_delay.min(self.action_time),
            ActionType::Sow => self.action_time,
            ActionType::Reap => Duration::ZERO,
        }
    }
}

/// What the in-flight task did during one `tick`.
#[derive(Debug, Clone, Default)]
pub struct AvatarTick {
    pub committed: Option<ActionCommittedEvent>,
    pub arrived: Option<AvatarArrivedEvent>,
    pub finished: bool,
}

#[derive(Resource, Debug, Clone)]
pub struct Avatar {
    pub island: Coord,
    pub local: Coord,
    side: i32,
    busy: bool,
    task: Option<AvatarTask>,
    celebrating: bool,
    timing: AvatarTiming,
}

impl Default for Avatar {
    fn default() -> Self {
        Self::from_config(&GameConfig::default())
    }
}

impl Avatar {
    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            island: config.start_island,
            local: config.start_local,
            side: config.plots_per_side,
            busy: false,
            task: None,
            celebrating: false,
            timing: AvatarTiming::from_config(config),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn is_celebrating(&self) -> bool {
        self.celebrating
    }

    pub fn task(&self) -> Option<&AvatarTask> {
        self.task.as_ref()
    }

    /// 0..1 through the running task; 0 when idle.
    pub fn task_progress(&self) -> f32 {
        self.task.as_ref().map(|t| t.timer.fraction()).unwrap_or(0.0)
    }

    pub fn animation(&self) -> AnimationKey {
        if self.celebrating {
            return AnimationKey::Applause;
        }
        match self.task.as_ref().map(|t| t.kind) {
            Some(TaskKind::Move { .. }) => AnimationKey::Jump,
            Some(TaskKind::Act(action)) => action.into(),
            None => AnimationKey::Idle,
        }
    }

    pub fn celebrate(&mut self) {
        self.celebrating = true;
    }

    /// Starts a one-plot step. Coordinates update when the step lands.
    pub fn try_move(&mut self, dir: Direction, grid: &PlotGrid) -> Result<(Coord, Coord), CommandRejected> {
        self.check_ready()?;
        let (island, local) = step(self.island, self.local, dir, self.side);
        if grid.get(island, local).is_none() {
            return Err(CommandRejected::NoPlot);
        }
        self.begin(TaskKind::Move { island, local }, self.timing.move_time, self.timing.move_time);
        Ok((island, local))
    }

    /// Starts the action animation on the current plot.
    pub fn interact(&mut self, action: ActionType) -> Result<(), CommandRejected> {
        self.check_ready()?;
        self.begin(
            TaskKind::Act(action),
            self.timing.action_time,
            self.timing.commit_point(action),
        );
        Ok(())
    }

    fn check_ready(&self) -> Result<(), CommandRejected> {
        if self.celebrating {
            Err(CommandRejected::Frozen)
        } else if self.busy {
            Err(CommandRejected::Busy)
        } else {
            Ok(())
        }
    }

    fn begin(&mut self, kind: TaskKind, length: Duration, commit_at: Duration) {
        self.busy = true;
        self.task = Some(AvatarTask {
            kind,
            timer: Timer::new(length, TimerMode::Once),
            commit_at,
            committed: false,
        });
    }

    /// Runs the in-flight task. The commit is reported before the arrival,
    /// and `busy` clears only once the whole animation has played.
    pub fn tick(&mut self, delta: Duration) -> AvatarTick {
        let mut out = AvatarTick::default();
        let Some(task) = self.task.as_mut() else {
            return out;
        };
        task.timer.tick(delta);

        if !task.committed && task.timer.elapsed() >= task.commit_at {
            task.committed = true;
            if let TaskKind::Act(action) = task.kind {
                out.committed = Some(ActionCommittedEvent {
                    action,
                    island: self.island,
                    local: self.local,
                });
            }
        }

        if task.timer.finished() {
            if let TaskKind::Move { island, local } = task.kind {
                self.island = island;
                self.local = local;
                out.arrived = Some(AvatarArrivedEvent { island, local });
            }
            self.task = None;
            self.busy = false;
            out.finished = true;
        }
        out
    }
}

/// One cardinal step on a `side`×`side` island. Leaving the island wraps
/// the local coordinate to the opposite edge of the neighbouring island.
pub fn step(island: Coord, local: Coord, dir: Direction, side: i32) -> (Coord, Coord) {
    let (dx, dy) = dir.delta();
    let (ix, lx) = wrap_axis(island.x, local.x + dx, side);
    let (iy, ly) = wrap_axis(island.y, local.y + dy, side);
    (Coord::new(ix, iy), Coord::new(lx, ly))
}

fn wrap_axis(island: i32, local: i32, side: i32) -> (i32, i32) {
    if local < 0 {
        (island - 1, side - 1)
    } else if local >= side {
        (island + 1, 0)
    } else {
        (island, local)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// PLUGIN
// ═══════════════════════════════════════════════════════════════════════

pub struct AvatarPlugin;

impl Plugin for AvatarPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Avatar>()
            .add_systems(Update, tick_avatar.in_set(TickSet::Clock));
    }
}

pub struct AvatarViewPlugin;

impl Plugin for AvatarViewPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, render::spawn_avatar_sprite)
            .add_systems(PostUpdate, render::sync_avatar_sprite);
    }
}

pub fn tick_avatar(
    time: Res<Time>,
    mut avatar: ResMut<Avatar>,
    mut committed: EventWriter<ActionCommittedEvent>,
    mut arrived: EventWriter<AvatarArrivedEvent>,
) {
    let tick = avatar.tick(time.delta());
    if let Some(ev) = tick.committed {
        debug!("[Avatar] {:?} committed at {}/{}", ev.action, ev.island, ev.local);
        committed.send(ev);
    }
    if let Some(ev) = tick.arrived {
        debug!("[Avatar] Arrived at {}/{}", ev.island, ev.local);
        arrived.send(ev);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> (Avatar, PlotGrid) {
        let mut grid = PlotGrid::default();
        grid.create_island_plots(Coord::ZERO);
        (Avatar::default(), grid)
    }

    fn run_to_idle(avatar: &mut Avatar) -> Vec<AvatarTick> {
        let mut ticks = Vec::new();
        for _ in 0..100 {
            let tick = avatar.tick(Duration::from_millis(10));
            let done = tick.finished;
            ticks.push(tick);
            if done {
                return ticks;
            }
        }
        panic!("task never finished");
    }

    #[test]
    fn step_inside_island() {
        let (island, local) = step(Coord::ZERO, Coord::new(1, 1), Direction::Up, 3);
        assert_eq!((island, local), (Coord::ZERO, Coord::new(1, 0)));
    }

    #[test]
    fn step_left_off_edge_wraps_to_west_neighbour() {
        let (island, local) = step(Coord::new(0, 0), Coord::new(0, 2), Direction::Left, 3);
        assert_eq!(island, Coord::new(-1, 0));
        assert_eq!(local, Coord::new(2, 2));
    }

    #[test]
    fn step_right_off_edge_wraps_to_east_neighbour() {
        let (island, local) = step(Coord::new(0, 0), Coord::new(2, 1), Direction::Right, 3);
        assert_eq!(island, Coord::new(1, 0));
        assert_eq!(local, Coord::new(0, 1));
    }

    #[test]
    fn step_vertical_wraps_use_screen_convention() {
        let (island, local) = step(Coord::ZERO, Coord::new(1, 0), Direction::Up, 3);
        assert_eq!((island, local), (Coord::new(0, -1), Coord::new(1, 2)));
        let (island, local) = step(Coord::ZERO, Coord::new(1, 2), Direction::Down, 3);
        assert_eq!((island, local), (Coord::new(0, 1), Coord::new(1, 0)));
    }

    #[test]
    fn move_into_missing_island_is_rejected_without_animation() {
        let (mut avatar, grid) = world();
        avatar.local = Coord::new(2, 1);
        assert_eq!(avatar.try_move(Direction::Right, &grid), Err(CommandRejected::NoPlot));
        assert!(!avatar.is_busy());
        assert_eq!(avatar.animation(), AnimationKey::Idle);
    }

    #[test]
    fn move_sets_busy_until_it_lands() {
        let (mut avatar, grid) = world();
        let target = avatar.try_move(Direction::Left, &grid).unwrap();
        assert_eq!(target, (Coord::ZERO, Coord::new(0, 1)));
        assert!(avatar.is_busy());
        assert_eq!(avatar.animation(), AnimationKey::Jump);
        assert_eq!(avatar.local, Coord::new(1, 1), "position updates on landing");

        assert_eq!(avatar.try_move(Direction::Up, &grid), Err(CommandRejected::Busy));
        assert_eq!(avatar.interact(ActionType::Plow), Err(CommandRejected::Busy));

        let ticks = run_to_idle(&mut avatar);
        let arrived = ticks.iter().filter_map(|t| t.arrived.clone()).collect::<Vec<_>>();
        assert_eq!(arrived.len(), 1);
        assert_eq!(arrived[0].local, Coord::new(0, 1));
        assert_eq!(avatar.local, Coord::new(0, 1));
        assert!(!avatar.is_busy());
    }

    #[test]
    fn plow_commits_mid_animation() {
        let (mut avatar, _) = world();
        avatar.interact(ActionType::Plow).unwrap();
        assert_eq!(avatar.animation(), AnimationKey::Plow);

        let tick = avatar.tick(Duration::from_millis(100));
        assert!(tick.committed.is_none());
        let tick = avatar.tick(Duration::from_millis(30));
        let ev = tick.committed.unwrap();
        assert_eq!((ev.action, ev.island, ev.local), (ActionType::Plow, Coord::ZERO, Coord::new(1, 1)));
        assert!(avatar.is_busy(), "commit precedes the end of the animation");

        let tick = avatar.tick(Duration::from_millis(80));
        assert!(tick.finished);
        assert!(tick.committed.is_none());
        assert!(!avatar.is_busy());
    }

    #[test]
    fn sow_commits_only_at_animation_end() {
        let (mut avatar, _) = world();
        avatar.interact(ActionType::Sow).unwrap();
        let tick = avatar.tick(Duration::from_millis(190));
        assert!(tick.committed.is_none());
        let tick = avatar.tick(Duration::from_millis(20));
        assert!(tick.committed.is_some());
        assert!(tick.finished);
    }

    #[test]
    fn reap_commits_on_first_tick() {
        let (mut avatar, _) = world();
        avatar.interact(ActionType::Reap).unwrap();
        let tick = avatar.tick(Duration::ZERO);
        assert_eq!(tick.committed.map(|e| e.action), Some(ActionType::Reap));
        assert!(avatar.is_busy());
    }

    #[test]
    fn exactly_one_commit_per_action() {
        let (mut avatar, _) = world();
        for action in ActionType::ALL {
            avatar.interact(action).unwrap();
            let commits = run_to_idle(&mut avatar)
                .into_iter()
                .filter(|t| t.committed.is_some())
                .count();
            assert_eq!(commits, 1, "{:?}", action);
        }
    }

    #[test]
    fn celebrating_avatar_takes_no_commands() {
        let (mut avatar, grid) = world();
        avatar.celebrate();
        assert_eq!(avatar.animation(), AnimationKey::Applause);
        assert_eq!(avatar.interact(ActionType::Plow), Err(CommandRejected::Frozen));
        assert_eq!(avatar.try_move(Direction::Up, &grid), Err(CommandRejected::Frozen));
    }
}
