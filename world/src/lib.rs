#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Maze Pursuit.
//!
//! The world owns the maze, the transform registry for host-tracked
//! entities, the pursuit agents with their timers, and the collectibles.
//! All mutation flows through [`apply`]; systems observe the resulting
//! [`Event`] stream and immutable snapshots from [`query`].

use std::collections::BTreeMap;
use std::time::Duration;

use maze_pursuit_core::{
    AgentId, CellCoord, CollectibleId, CollectibleKind, Command, EntityId, Event, WorldPosition,
    WAYPOINT_LIFT, WELCOME_BANNER,
};
use maze_pursuit_generation::{self as generation, GenerationRequest, Maze};

const DEFAULT_CELL_SIZE: f32 = 1.0;
const DEFAULT_SPAWN_DELAY: Duration = Duration::from_secs(2);
const DEFAULT_MAX_SPEED: f32 = 1.8;
const DEFAULT_MAX_ACCELERATION: f32 = 4.0;

/// Distance below which the pursuer counts as having caught its target.
pub const CATCH_RADIUS: f32 = 0.5;

/// Configuration parameters required to construct a world.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    cell_size: f32,
    spawn_delay: Duration,
}

impl Config {
    /// Creates a new configuration from a cell size and global spawn delay.
    ///
    /// The spawn delay gates every agent's sleep countdown: no agent starts
    /// counting down its sleep before this much simulated time has passed
    /// since the world was created.
    #[must_use]
    pub const fn new(cell_size: f32, spawn_delay: Duration) -> Self {
        Self {
            cell_size,
            spawn_delay,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_CELL_SIZE, DEFAULT_SPAWN_DELAY)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum AgentState {
    Sleeping { since: Duration },
    Active,
    Stunned { until: Duration },
}

#[derive(Clone, Debug)]
struct Agent {
    id: AgentId,
    spawn_cell: CellCoord,
    position: WorldPosition,
    state: AgentState,
    sleep_duration: Duration,
    target: Option<EntityId>,
    max_speed: f32,
    max_acceleration: f32,
    speed_multiplier: f32,
    speed_boost_until: Option<Duration>,
}

#[derive(Clone, Copy, Debug)]
struct Collectible {
    id: CollectibleId,
    kind: CollectibleKind,
    position: WorldPosition,
    collected: bool,
}

/// Represents the authoritative Maze Pursuit world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    maze: Option<Maze>,
    cell_size: f32,
    spawn_delay: Duration,
    clock: Duration,
    tick_index: u64,
    transforms: BTreeMap<EntityId, WorldPosition>,
    agents: Vec<Agent>,
    collectibles: Vec<Collectible>,
    score: u32,
    next_agent: u32,
    next_collectible: u32,
}

impl World {
    /// Creates a new world with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates a new world using the provided configuration.
    ///
    /// Non-positive cell sizes fall back to one world unit per cell.
    #[must_use]
    pub fn with_config(config: Config) -> Self {
        let cell_size = if config.cell_size > 0.0 {
            config.cell_size
        } else {
            DEFAULT_CELL_SIZE
        };
        Self {
            banner: WELCOME_BANNER,
            maze: None,
            cell_size,
            spawn_delay: config.spawn_delay,
            clock: Duration::ZERO,
            tick_index: 0,
            transforms: BTreeMap::new(),
            agents: Vec::new(),
            collectibles: Vec::new(),
            score: 0,
            next_agent: 0,
            next_collectible: 0,
        }
    }

    fn agent_mut(&mut self, agent: AgentId) -> Option<&mut Agent> {
        self.agents.iter_mut().find(|record| record.id == agent)
    }

    fn cell_center(&self, cell: CellCoord) -> Option<WorldPosition> {
        let maze = self.maze.as_ref()?;
        if cell.column() >= maze.columns() || cell.row() >= maze.rows() {
            return None;
        }
        Some(WorldPosition::new(
            (cell.column() as f32 + 0.5) * self.cell_size,
            WAYPOINT_LIFT,
            (cell.row() as f32 + 0.5) * self.cell_size,
        ))
    }

    fn advance_timers(&mut self, out_events: &mut Vec<Event>) {
        let clock = self.clock;
        let spawn_delay = self.spawn_delay;

        for agent in self.agents.iter_mut() {
            match agent.state {
                AgentState::Sleeping { since } => {
                    if clock >= spawn_delay {
                        // Sleep counts down from the spawn time or the end of
                        // the global spawn delay, whichever happened later.
                        let reference = if since < spawn_delay {
                            spawn_delay
                        } else {
                            since
                        };
                        if clock.saturating_sub(reference) >= agent.sleep_duration {
                            agent.state = AgentState::Active;
                            out_events.push(Event::AgentWoke { agent: agent.id });
                        }
                    }
                }
                AgentState::Stunned { until } => {
                    if clock >= until {
                        agent.state = AgentState::Active;
                        out_events.push(Event::AgentStunExpired { agent: agent.id });
                    }
                }
                AgentState::Active => {}
            }

            if let Some(until) = agent.speed_boost_until {
                if clock >= until {
                    agent.speed_multiplier = 1.0;
                    agent.speed_boost_until = None;
                    out_events.push(Event::AgentSpeedBoostExpired { agent: agent.id });
                }
            }
        }
    }

    fn apply_pickup_effect(
        &mut self,
        kind: CollectibleKind,
        out_events: &mut Vec<Event>,
    ) {
        let Some(duration) = kind.effect_duration() else {
            return;
        };
        let until = self.clock.saturating_add(duration);

        match kind {
            CollectibleKind::Treat => {}
            CollectibleKind::Fish => {
                let multiplier = kind.speed_multiplier();
                for agent in self.agents.iter_mut() {
                    agent.speed_multiplier = multiplier;
                    agent.speed_boost_until = Some(until);
                    out_events.push(Event::AgentSpeedBoosted {
                        agent: agent.id,
                        multiplier,
                        duration,
                    });
                }
            }
            CollectibleKind::Pillow => {
                for agent in self.agents.iter_mut() {
                    // Sleeping agents are already inert; only hunters are
                    // knocked out.
                    if matches!(agent.state, AgentState::Active) {
                        agent.state = AgentState::Stunned { until };
                        out_events.push(Event::AgentStunned {
                            agent: agent.id,
                            duration,
                        });
                    }
                }
            }
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::GenerateMaze {
            columns,
            rows,
            extra_loops,
            seed,
        } => match generation::generate(GenerationRequest::new(columns, rows, extra_loops, seed)) {
            Ok(maze) => {
                out_events.push(Event::MazeGenerated {
                    columns: maze.columns(),
                    rows: maze.rows(),
                    seed: maze.seed(),
                    requested_loops: maze.requested_loops(),
                    injected_loops: maze.injected_loops(),
                });
                world.maze = Some(maze);
                // Maze regeneration starts a fresh run: agent and
                // collectible records do not survive it.
                world.agents.clear();
                world.collectibles.clear();
            }
            Err(_) => {
                out_events.push(Event::MazeGenerationRejected { columns, rows });
            }
        },
        Command::Tick { dt } => {
            world.clock = world.clock.saturating_add(dt);
            world.tick_index = world.tick_index.saturating_add(1);
            out_events.push(Event::TimeAdvanced { dt });
            world.advance_timers(out_events);
        }
        Command::SpawnAgent {
            cell,
            sleep_duration,
            target,
        } => match world.cell_center(cell) {
            Some(position) => {
                let id = AgentId::new(world.next_agent);
                world.next_agent = world.next_agent.saturating_add(1);
                world.agents.push(Agent {
                    id,
                    spawn_cell: cell,
                    position,
                    state: AgentState::Sleeping { since: world.clock },
                    sleep_duration,
                    target: Some(target),
                    max_speed: DEFAULT_MAX_SPEED,
                    max_acceleration: DEFAULT_MAX_ACCELERATION,
                    speed_multiplier: 1.0,
                    speed_boost_until: None,
                });
                out_events.push(Event::AgentSpawned { agent: id, cell });
            }
            None => {
                out_events.push(Event::AgentSpawnRejected { cell });
            }
        },
        Command::SetEntityPosition { entity, position } => {
            let _ = world.transforms.insert(entity, position);
        }
        Command::MoveAgent { agent, delta } => {
            if let Some(record) = world.agent_mut(agent) {
                if matches!(record.state, AgentState::Active) {
                    let from = record.position;
                    record.position = from.offset_by(delta);
                    out_events.push(Event::AgentMoved {
                        agent,
                        from,
                        to: record.position,
                    });
                }
            }
        }
        Command::PlaceCollectible { kind, cell } => match world.cell_center(cell) {
            Some(position) => {
                let id = CollectibleId::new(world.next_collectible);
                world.next_collectible = world.next_collectible.saturating_add(1);
                world.collectibles.push(Collectible {
                    id,
                    kind,
                    position,
                    collected: false,
                });
                out_events.push(Event::CollectiblePlaced {
                    collectible: id,
                    kind,
                    cell,
                });
            }
            None => {
                out_events.push(Event::CollectiblePlacementRejected { cell });
            }
        },
        Command::CollectItem { collectible } => {
            let mut picked_up = None;
            if let Some(item) = world
                .collectibles
                .iter_mut()
                .find(|item| item.id == collectible)
            {
                // A second pickup attempt on a collected item is a no-op.
                if !item.collected {
                    item.collected = true;
                    picked_up = Some(item.kind);
                }
            }

            if let Some(kind) = picked_up {
                let points = kind.points();
                world.score = world.score.saturating_add(points);
                out_events.push(Event::ItemCollected {
                    collectible,
                    kind,
                    points,
                });
                world.apply_pickup_effect(kind, out_events);
            }
        }
        Command::ResetAgent { agent } => {
            let clock = world.clock;
            let spawn_position = world
                .agents
                .iter()
                .find(|record| record.id == agent)
                .map(|record| record.spawn_cell)
                .and_then(|cell| world.cell_center(cell));

            if let Some(record) = world.agent_mut(agent) {
                record.state = AgentState::Sleeping { since: clock };
                record.speed_multiplier = 1.0;
                record.speed_boost_until = None;
                if let Some(position) = spawn_position {
                    record.position = position;
                }
                out_events.push(Event::AgentReset { agent });
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::{AgentState, World, CATCH_RADIUS};
    use maze_pursuit_core::{
        proximity, AgentId, AgentSnapshot, AgentView, AiPhase, CellCoord, CollectibleSnapshot,
        CollectibleView, EntityId, WorldPosition,
    };
    use maze_pursuit_generation::Maze;

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Provides read-only access to the current maze, if one was generated.
    #[must_use]
    pub fn maze(world: &World) -> Option<&Maze> {
        world.maze.as_ref()
    }

    /// World-units-per-cell size used to place cells in world space.
    #[must_use]
    pub fn cell_size(world: &World) -> f32 {
        world.cell_size
    }

    /// Global delay before any agent's sleep countdown starts.
    #[must_use]
    pub fn spawn_delay(world: &World) -> Duration {
        world.spawn_delay
    }

    /// Simulated time accumulated since the world was created.
    #[must_use]
    pub fn clock(world: &World) -> Duration {
        world.clock
    }

    /// Number of ticks the world has processed.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Points accumulated from collected items.
    #[must_use]
    pub fn score(world: &World) -> u32 {
        world.score
    }

    /// World position of the provided cell's center, when it lies within
    /// the current maze.
    #[must_use]
    pub fn cell_center(world: &World, cell: CellCoord) -> Option<WorldPosition> {
        world.cell_center(cell)
    }

    /// Live transform of a tracked entity, if the registry knows it.
    #[must_use]
    pub fn entity_position(world: &World, entity: EntityId) -> Option<WorldPosition> {
        world.transforms.get(&entity).copied()
    }

    /// Captures a read-only view of the pursuit agents.
    ///
    /// Target positions are resolved through the transform registry at
    /// capture time, so consumers always see the pursued entity's live
    /// position.
    #[must_use]
    pub fn agent_view(world: &World) -> AgentView {
        let snapshots: Vec<AgentSnapshot> = world
            .agents
            .iter()
            .map(|agent| AgentSnapshot {
                id: agent.id,
                position: agent.position,
                phase: match agent.state {
                    AgentState::Sleeping { .. } => AiPhase::Sleeping,
                    AgentState::Active => AiPhase::Active,
                    AgentState::Stunned { .. } => AiPhase::Stunned,
                },
                target: agent.target,
                target_position: agent
                    .target
                    .and_then(|entity| world.transforms.get(&entity).copied()),
                max_speed: agent.max_speed,
                max_acceleration: agent.max_acceleration,
                effective_speed: agent.max_speed * agent.speed_multiplier,
            })
            .collect();
        AgentView::from_snapshots(snapshots)
    }

    /// Captures a read-only view of the collectibles.
    #[must_use]
    pub fn collectible_view(world: &World) -> CollectibleView {
        let snapshots: Vec<CollectibleSnapshot> = world
            .collectibles
            .iter()
            .map(|item| CollectibleSnapshot {
                id: item.id,
                kind: item.kind,
                position: item.position,
                collected: item.collected,
            })
            .collect();
        CollectibleView::from_snapshots(snapshots)
    }

    /// Reports whether the agent currently holds its target within the
    /// catch radius.
    ///
    /// Evaluated against live positions regardless of AI state; a missing
    /// agent, target handle, or transform reads as "not caught".
    #[must_use]
    pub fn agent_caught_target(world: &World, agent: AgentId) -> bool {
        let Some(record) = world.agents.iter().find(|record| record.id == agent) else {
            return false;
        };
        let Some(target) = record.target else {
            return false;
        };
        let Some(target_position) = world.transforms.get(&target).copied() else {
            return false;
        };
        proximity::within_radius(record.position, target_position, CATCH_RADIUS)
    }

    /// One-line summary of world state for diagnostics. Non-contractual.
    #[must_use]
    pub fn debug_summary(world: &World) -> String {
        let maze_part = match &world.maze {
            Some(maze) => format!(
                "maze {}x{} seed {}",
                maze.columns(),
                maze.rows(),
                maze.seed()
            ),
            None => String::from("no maze"),
        };

        let mut sleeping = 0;
        let mut active = 0;
        let mut stunned = 0;
        for agent in &world.agents {
            match agent.state {
                AgentState::Sleeping { .. } => sleeping += 1,
                AgentState::Active => active += 1,
                AgentState::Stunned { .. } => stunned += 1,
            }
        }

        format!(
            "{maze_part}, agents {sleeping} sleeping/{active} active/{stunned} stunned, \
             {} collectibles, score {}, clock {:.1}s",
            world.collectibles.len(),
            world.score,
            world.clock.as_secs_f32()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{apply, query, Config, World, CATCH_RADIUS};
    use maze_pursuit_core::{
        AgentId, AiPhase, CellCoord, CollectibleId, CollectibleKind, Command, EntityId, Event,
        WorldVector,
    };
    use std::time::Duration;

    const BALL: EntityId = EntityId::new(1);

    fn generated_world() -> (World, Vec<Event>) {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::GenerateMaze {
                columns: 6,
                rows: 5,
                extra_loops: 1,
                seed: 42,
            },
            &mut events,
        );
        (world, events)
    }

    fn spawn_default_agent(world: &mut World, events: &mut Vec<Event>) -> AgentId {
        apply(
            world,
            Command::SpawnAgent {
                cell: CellCoord::new(5, 4),
                sleep_duration: Duration::from_secs(2),
                target: BALL,
            },
            events,
        );
        query::agent_view(world)
            .iter()
            .last()
            .expect("agent spawned")
            .id
    }

    fn tick(world: &mut World, millis: u64) -> Vec<Event> {
        let mut events = Vec::new();
        apply(
            world,
            Command::Tick {
                dt: Duration::from_millis(millis),
            },
            &mut events,
        );
        events
    }

    #[test]
    fn generate_maze_reports_requested_and_injected_loops() {
        let (world, events) = generated_world();

        let maze = query::maze(&world).expect("maze generated");
        assert_eq!(maze.columns(), 6);
        assert_eq!(maze.rows(), 5);
        assert!(events.iter().any(|event| matches!(
            event,
            Event::MazeGenerated {
                columns: 6,
                rows: 5,
                requested_loops: 1,
                injected_loops: 1,
                ..
            }
        )));
    }

    #[test]
    fn invalid_maze_dimensions_are_rejected() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::GenerateMaze {
                columns: 0,
                rows: 5,
                extra_loops: 0,
                seed: 1,
            },
            &mut events,
        );

        assert!(query::maze(&world).is_none());
        assert_eq!(
            events,
            vec![Event::MazeGenerationRejected {
                columns: 0,
                rows: 5
            }]
        );
    }

    #[test]
    fn maze_regeneration_destroys_agents_and_collectibles() {
        let (mut world, _) = generated_world();
        let mut events = Vec::new();
        let _ = spawn_default_agent(&mut world, &mut events);
        apply(
            &mut world,
            Command::PlaceCollectible {
                kind: CollectibleKind::Treat,
                cell: CellCoord::new(1, 1),
            },
            &mut events,
        );

        events.clear();
        apply(
            &mut world,
            Command::GenerateMaze {
                columns: 6,
                rows: 5,
                extra_loops: 0,
                seed: 7,
            },
            &mut events,
        );

        assert_eq!(query::agent_view(&world).into_vec().len(), 0);
        assert_eq!(query::collectible_view(&world).into_vec().len(), 0);
    }

    #[test]
    fn spawn_outside_the_maze_is_rejected() {
        let (mut world, _) = generated_world();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnAgent {
                cell: CellCoord::new(6, 0),
                sleep_duration: Duration::from_secs(1),
                target: BALL,
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::AgentSpawnRejected {
                cell: CellCoord::new(6, 0)
            }]
        );
        assert!(query::agent_view(&world).into_vec().is_empty());
    }

    #[test]
    fn sleep_counts_down_only_after_the_spawn_delay() {
        let (mut world, _) = generated_world();
        let mut events = Vec::new();
        let agent = spawn_default_agent(&mut world, &mut events);

        // Spawn delay 2s, sleep 2s: the agent must wake at 4s, not 2s.
        let _ = tick(&mut world, 1_000);
        let _ = tick(&mut world, 1_000);
        let _ = tick(&mut world, 1_000);
        let phase = query::agent_view(&world).into_vec()[0].phase;
        assert_eq!(phase, AiPhase::Sleeping);

        let wake_events = tick(&mut world, 1_000);
        let phase = query::agent_view(&world).into_vec()[0].phase;
        assert_eq!(phase, AiPhase::Active);
        assert!(wake_events
            .iter()
            .any(|event| matches!(event, Event::AgentWoke { agent: woke } if *woke == agent)));
    }

    #[test]
    fn agents_spawned_after_the_delay_sleep_their_full_duration() {
        let (mut world, _) = generated_world();
        let _ = tick(&mut world, 5_000);

        let mut events = Vec::new();
        let _ = spawn_default_agent(&mut world, &mut events);

        let _ = tick(&mut world, 1_900);
        assert_eq!(
            query::agent_view(&world).into_vec()[0].phase,
            AiPhase::Sleeping
        );

        let _ = tick(&mut world, 100);
        assert_eq!(
            query::agent_view(&world).into_vec()[0].phase,
            AiPhase::Active
        );
    }

    #[test]
    fn move_commands_are_ignored_while_the_agent_sleeps() {
        let (mut world, _) = generated_world();
        let mut events = Vec::new();
        let agent = spawn_default_agent(&mut world, &mut events);
        let before = query::agent_view(&world).into_vec()[0].position;

        events.clear();
        apply(
            &mut world,
            Command::MoveAgent {
                agent,
                delta: WorldVector::new(0.5, 0.0, 0.0),
            },
            &mut events,
        );

        assert!(events.is_empty());
        assert_eq!(query::agent_view(&world).into_vec()[0].position, before);
    }

    #[test]
    fn move_commands_displace_active_agents() {
        let (mut world, _) = generated_world();
        let mut events = Vec::new();
        let agent = spawn_default_agent(&mut world, &mut events);
        let _ = tick(&mut world, 4_000);

        let before = query::agent_view(&world).into_vec()[0].position;
        events.clear();
        apply(
            &mut world,
            Command::MoveAgent {
                agent,
                delta: WorldVector::new(0.25, 0.0, -0.25),
            },
            &mut events,
        );

        let after = query::agent_view(&world).into_vec()[0].position;
        assert_eq!(after, before.offset_by(WorldVector::new(0.25, 0.0, -0.25)));
        assert!(events
            .iter()
            .any(|event| matches!(event, Event::AgentMoved { .. })));
    }

    #[test]
    fn collecting_a_treat_awards_points_once() {
        let (mut world, _) = generated_world();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::PlaceCollectible {
                kind: CollectibleKind::Treat,
                cell: CellCoord::new(2, 2),
            },
            &mut events,
        );
        let item = query::collectible_view(&world).into_vec()[0].id;

        events.clear();
        apply(&mut world, Command::CollectItem { collectible: item }, &mut events);
        assert_eq!(query::score(&world), 50);
        assert!(events.iter().any(|event| matches!(
            event,
            Event::ItemCollected { points: 50, .. }
        )));

        events.clear();
        apply(&mut world, Command::CollectItem { collectible: item }, &mut events);
        assert!(events.is_empty());
        assert_eq!(query::score(&world), 50);
    }

    #[test]
    fn fish_halves_agent_speed_until_expiry() {
        let (mut world, _) = generated_world();
        let mut events = Vec::new();
        let _ = spawn_default_agent(&mut world, &mut events);
        apply(
            &mut world,
            Command::PlaceCollectible {
                kind: CollectibleKind::Fish,
                cell: CellCoord::new(3, 3),
            },
            &mut events,
        );
        let item = query::collectible_view(&world).into_vec()[0].id;
        apply(&mut world, Command::CollectItem { collectible: item }, &mut events);

        let snapshot = query::agent_view(&world).into_vec()[0];
        assert!((snapshot.effective_speed - snapshot.max_speed * 0.5).abs() < f32::EPSILON);

        let expiry_events = tick(&mut world, 5_000);
        assert!(expiry_events
            .iter()
            .any(|event| matches!(event, Event::AgentSpeedBoostExpired { .. })));
        let snapshot = query::agent_view(&world).into_vec()[0];
        assert!((snapshot.effective_speed - snapshot.max_speed).abs() < f32::EPSILON);
    }

    #[test]
    fn pillows_stun_active_agents_and_wear_off() {
        let (mut world, _) = generated_world();
        let mut events = Vec::new();
        let _ = spawn_default_agent(&mut world, &mut events);
        let _ = tick(&mut world, 4_000);
        assert_eq!(
            query::agent_view(&world).into_vec()[0].phase,
            AiPhase::Active
        );

        apply(
            &mut world,
            Command::PlaceCollectible {
                kind: CollectibleKind::Pillow,
                cell: CellCoord::new(1, 3),
            },
            &mut events,
        );
        let item = query::collectible_view(&world).into_vec()[0].id;
        events.clear();
        apply(&mut world, Command::CollectItem { collectible: item }, &mut events);

        assert!(events
            .iter()
            .any(|event| matches!(event, Event::AgentStunned { .. })));
        assert_eq!(
            query::agent_view(&world).into_vec()[0].phase,
            AiPhase::Stunned
        );

        let recovery_events = tick(&mut world, 3_000);
        assert!(recovery_events
            .iter()
            .any(|event| matches!(event, Event::AgentStunExpired { .. })));
        assert_eq!(
            query::agent_view(&world).into_vec()[0].phase,
            AiPhase::Active
        );
    }

    #[test]
    fn pillows_leave_sleeping_agents_alone() {
        let (mut world, _) = generated_world();
        let mut events = Vec::new();
        let _ = spawn_default_agent(&mut world, &mut events);

        apply(
            &mut world,
            Command::PlaceCollectible {
                kind: CollectibleKind::Pillow,
                cell: CellCoord::new(1, 3),
            },
            &mut events,
        );
        let item = query::collectible_view(&world).into_vec()[0].id;
        events.clear();
        apply(&mut world, Command::CollectItem { collectible: item }, &mut events);

        assert!(!events
            .iter()
            .any(|event| matches!(event, Event::AgentStunned { .. })));
        assert_eq!(
            query::agent_view(&world).into_vec()[0].phase,
            AiPhase::Sleeping
        );
    }

    #[test]
    fn reset_returns_the_agent_to_its_spawn_state() {
        let (mut world, _) = generated_world();
        let mut events = Vec::new();
        let agent = spawn_default_agent(&mut world, &mut events);
        let spawn_position = query::agent_view(&world).into_vec()[0].position;

        let _ = tick(&mut world, 4_000);
        apply(
            &mut world,
            Command::MoveAgent {
                agent,
                delta: WorldVector::new(1.0, 0.0, 1.0),
            },
            &mut events,
        );

        events.clear();
        apply(&mut world, Command::ResetAgent { agent }, &mut events);

        let snapshot = query::agent_view(&world).into_vec()[0];
        assert_eq!(snapshot.phase, AiPhase::Sleeping);
        assert_eq!(snapshot.position, spawn_position);
        assert!((snapshot.effective_speed - snapshot.max_speed).abs() < f32::EPSILON);
        assert_eq!(events, vec![Event::AgentReset { agent }]);
    }

    #[test]
    fn catch_queries_are_strict_at_the_radius() {
        let (mut world, _) = generated_world();
        let mut events = Vec::new();
        let agent = spawn_default_agent(&mut world, &mut events);
        let agent_position = query::agent_view(&world).into_vec()[0].position;

        apply(
            &mut world,
            Command::SetEntityPosition {
                entity: BALL,
                position: agent_position.offset_by(WorldVector::new(CATCH_RADIUS, 0.0, 0.0)),
            },
            &mut events,
        );
        assert!(!query::agent_caught_target(&world, agent));

        apply(
            &mut world,
            Command::SetEntityPosition {
                entity: BALL,
                position: agent_position.offset_by(WorldVector::new(CATCH_RADIUS * 0.9, 0.0, 0.0)),
            },
            &mut events,
        );
        assert!(query::agent_caught_target(&world, agent));
    }

    #[test]
    fn missing_target_handles_read_as_not_caught() {
        let (mut world, _) = generated_world();
        let mut events = Vec::new();
        let agent = spawn_default_agent(&mut world, &mut events);

        assert!(!query::agent_caught_target(&world, agent));
        assert!(query::agent_view(&world).into_vec()[0]
            .target_position
            .is_none());
        assert!(!query::agent_caught_target(&world, AgentId::new(99)));
    }

    #[test]
    fn unknown_collectibles_are_ignored() {
        let (mut world, _) = generated_world();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::CollectItem {
                collectible: CollectibleId::new(9),
            },
            &mut events,
        );
        assert!(events.is_empty());
        assert_eq!(query::score(&world), 0);
    }

    #[test]
    fn worlds_with_custom_configuration_scale_cell_centers() {
        let mut world = World::with_config(Config::new(2.0, Duration::ZERO));
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::GenerateMaze {
                columns: 3,
                rows: 3,
                extra_loops: 0,
                seed: 1,
            },
            &mut events,
        );

        let center = query::cell_center(&world, CellCoord::new(2, 1)).expect("in bounds");
        assert_eq!(center.x(), 5.0);
        assert_eq!(center.z(), 3.0);
        assert!(query::cell_center(&world, CellCoord::new(3, 0)).is_none());
    }

    #[test]
    fn debug_summary_mentions_the_maze_and_population() {
        let (mut world, _) = generated_world();
        let mut events = Vec::new();
        let _ = spawn_default_agent(&mut world, &mut events);

        let summary = query::debug_summary(&world);
        assert!(summary.contains("maze 6x5 seed 42"));
        assert!(summary.contains("1 sleeping"));
    }
}
