#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Maze Pursuit engine.
//!
//! This crate defines the message surface that connects the host shell, the
//! authoritative world, and pure systems. The shell submits [`Command`]
//! values describing desired mutations, the world executes those commands via
//! its `apply` entry point, and then broadcasts [`Event`] values for systems
//! to react to deterministically. Systems consume event streams, query
//! immutable snapshots, and respond exclusively with new command batches.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Maze Pursuit.";

/// Height above the maze floor at which agents travel and waypoints sit.
///
/// Path waypoints and agent spawn positions share this lift so the distance
/// between an agent and its current waypoint stays planar.
pub const WAYPOINT_LIFT: f32 = 0.1;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Replaces the maze with a freshly generated topology.
    GenerateMaze {
        /// Number of cell columns in the requested maze.
        columns: u32,
        /// Number of cell rows in the requested maze.
        rows: u32,
        /// Number of extra connections to inject beyond the spanning tree.
        extra_loops: u32,
        /// Seed fed to the maze generator so runs reproduce exactly.
        seed: u64,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that a pursuit agent be spawned into the maze.
    SpawnAgent {
        /// Cell the agent should occupy when it spawns.
        cell: CellCoord,
        /// Time the agent sleeps before it starts hunting.
        sleep_duration: Duration,
        /// Entity the agent pursues once awake.
        target: EntityId,
    },
    /// Records the live transform of a tracked entity such as the ball.
    SetEntityPosition {
        /// Identifier of the tracked entity.
        entity: EntityId,
        /// World-space position reported by the host engine.
        position: WorldPosition,
    },
    /// Requests that an agent's transform move by the provided delta.
    MoveAgent {
        /// Identifier of the agent attempting to move.
        agent: AgentId,
        /// Position delta computed by the pursuit system for this tick.
        delta: WorldVector,
    },
    /// Requests placement of a collectible at the provided cell.
    PlaceCollectible {
        /// Type of collectible to place.
        kind: CollectibleKind,
        /// Cell whose center the collectible occupies.
        cell: CellCoord,
    },
    /// Requests that a collectible be marked collected and its effect applied.
    CollectItem {
        /// Identifier of the collectible being picked up.
        collectible: CollectibleId,
    },
    /// Returns an agent to its initial spawn state.
    ResetAgent {
        /// Identifier of the agent to reset.
        agent: AgentId,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Confirms that a new maze replaced the previous topology.
    MazeGenerated {
        /// Number of cell columns in the generated maze.
        columns: u32,
        /// Number of cell rows in the generated maze.
        rows: u32,
        /// Seed the generator consumed.
        seed: u64,
        /// Number of extra connections the request asked for.
        requested_loops: u32,
        /// Number of extra connections actually injected. Falls short of the
        /// request when no removable wall remained within the attempt budget.
        injected_loops: u32,
    },
    /// Reports that a maze generation request was rejected.
    MazeGenerationRejected {
        /// Number of cell columns provided in the rejected request.
        columns: u32,
        /// Number of cell rows provided in the rejected request.
        rows: u32,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that a pursuit agent was spawned.
    AgentSpawned {
        /// Identifier assigned to the newly spawned agent.
        agent: AgentId,
        /// Cell the agent occupies after spawning.
        cell: CellCoord,
    },
    /// Reports that an agent spawn request was rejected.
    AgentSpawnRejected {
        /// Cell provided in the rejected spawn request.
        cell: CellCoord,
    },
    /// Announces that a sleeping agent finished its sleep and began hunting.
    AgentWoke {
        /// Identifier of the agent that woke.
        agent: AgentId,
    },
    /// Confirms that an agent's transform moved.
    AgentMoved {
        /// Identifier of the agent that moved.
        agent: AgentId,
        /// Position the agent occupied before the move.
        from: WorldPosition,
        /// Position the agent occupies after the move.
        to: WorldPosition,
    },
    /// Confirms that an agent returned to its initial spawn state.
    AgentReset {
        /// Identifier of the agent that was reset.
        agent: AgentId,
    },
    /// Confirms that a collectible was placed into the maze.
    CollectiblePlaced {
        /// Identifier assigned to the collectible by the world.
        collectible: CollectibleId,
        /// Type of collectible that was placed.
        kind: CollectibleKind,
        /// Cell whose center the collectible occupies.
        cell: CellCoord,
    },
    /// Reports that a collectible placement request was rejected.
    CollectiblePlacementRejected {
        /// Cell provided in the rejected placement request.
        cell: CellCoord,
    },
    /// Confirms that a collectible was picked up and its effect applied.
    ItemCollected {
        /// Identifier of the collected item.
        collectible: CollectibleId,
        /// Type of the collected item.
        kind: CollectibleKind,
        /// Points awarded to the score by this pickup.
        points: u32,
    },
    /// Announces that an agent was stunned by a collectible effect.
    AgentStunned {
        /// Identifier of the stunned agent.
        agent: AgentId,
        /// Time the stun suppresses the agent's planning and movement.
        duration: Duration,
    },
    /// Announces that an agent's maximum speed was multiplied for a while.
    AgentSpeedBoosted {
        /// Identifier of the affected agent.
        agent: AgentId,
        /// Factor applied to the agent's maximum speed.
        multiplier: f32,
        /// Time the multiplier stays in effect.
        duration: Duration,
    },
    /// Announces that an agent's stun wore off.
    AgentStunExpired {
        /// Identifier of the recovered agent.
        agent: AgentId,
    },
    /// Announces that an agent's speed multiplier reverted to baseline.
    AgentSpeedBoostExpired {
        /// Identifier of the reverted agent.
        agent: AgentId,
    },
}

/// Unique identifier assigned to a pursuit agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(u32);

impl AgentId {
    /// Creates a new agent identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Opaque handle referring to an entity owned by the host engine.
///
/// Handles are lookup keys, never owning references; resolving a handle the
/// registry no longer knows degrades to "no target" rather than dangling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    /// Creates a new entity handle with the provided numeric value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the handle.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

/// Unique identifier assigned to a collectible.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CollectibleId(u32);

impl CollectibleId {
    /// Creates a new collectible identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single maze cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new maze cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }
}

/// Cardinal directions separating a cell from its four potential neighbors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Toward decreasing row indices.
    North,
    /// Toward increasing column indices.
    East,
    /// Toward increasing row indices.
    South,
    /// Toward decreasing column indices.
    West,
}

impl Direction {
    /// All four directions in a fixed enumeration order.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Returns the direction pointing the opposite way.
    ///
    /// Wall removal is always mutual: when a cell drops the wall facing a
    /// neighbor, the neighbor drops the wall facing back, which is the wall
    /// in this direction's opposite.
    #[must_use]
    pub const fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }
}

/// World-space position of an entity or waypoint.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldPosition {
    x: f32,
    y: f32,
    z: f32,
}

impl WorldPosition {
    /// Creates a new world-space position.
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Horizontal x component of the position.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical y component of the position.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Horizontal z component of the position.
    #[must_use]
    pub const fn z(&self) -> f32 {
        self.z
    }

    /// Euclidean distance between two positions.
    #[must_use]
    pub fn distance_to(self, other: WorldPosition) -> f32 {
        self.vector_to(other).length()
    }

    /// Vector pointing from this position to the other.
    #[must_use]
    pub fn vector_to(self, other: WorldPosition) -> WorldVector {
        WorldVector::new(other.x - self.x, other.y - self.y, other.z - self.z)
    }

    /// Returns the position displaced by the provided vector.
    #[must_use]
    pub fn offset_by(self, delta: WorldVector) -> WorldPosition {
        WorldPosition::new(self.x + delta.x(), self.y + delta.y(), self.z + delta.z())
    }
}

/// World-space displacement between two positions.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldVector {
    x: f32,
    y: f32,
    z: f32,
}

impl WorldVector {
    /// Creates a new world-space displacement.
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Horizontal x component of the displacement.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical y component of the displacement.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Horizontal z component of the displacement.
    #[must_use]
    pub const fn z(&self) -> f32 {
        self.z
    }

    /// Euclidean length of the displacement.
    #[must_use]
    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Returns the displacement scaled by the provided factor.
    #[must_use]
    pub fn scaled(self, factor: f32) -> WorldVector {
        WorldVector::new(self.x * factor, self.y * factor, self.z * factor)
    }

    /// Returns the unit-length displacement pointing the same way.
    ///
    /// Yields `None` for displacements too short to normalize safely.
    #[must_use]
    pub fn normalized(self) -> Option<WorldVector> {
        let length = self.length();
        if length <= f32::EPSILON {
            return None;
        }
        Some(self.scaled(1.0 / length))
    }
}

/// Euclidean-distance threshold checks shared by catch and pickup logic.
pub mod proximity {
    use super::WorldPosition;

    /// Reports whether two positions lie strictly within the given radius.
    ///
    /// A distance exactly equal to the radius is not a hit.
    #[must_use]
    pub fn within_radius(a: WorldPosition, b: WorldPosition, radius: f32) -> bool {
        a.distance_to(b) < radius
    }
}

/// Top-level phase of a pursuit agent's state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AiPhase {
    /// The agent sleeps and ignores its target entirely.
    Sleeping,
    /// The agent hunts its target, planning and following paths.
    Active,
    /// A collectible effect suspends planning and movement; the held path
    /// survives the stun.
    Stunned,
}

/// Types of collectibles that can be placed in the maze.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollectibleKind {
    /// Awards points on pickup; no timed effect.
    Treat,
    /// Slows the pursuit agent while it stops to eat.
    Fish,
    /// Stuns the pursuit agent outright.
    Pillow,
}

impl CollectibleKind {
    /// Points awarded to the score when an item of this kind is collected.
    #[must_use]
    pub const fn points(self) -> u32 {
        match self {
            Self::Treat => 50,
            Self::Fish | Self::Pillow => 0,
        }
    }

    /// Duration of the timed effect this kind applies, if any.
    #[must_use]
    pub const fn effect_duration(self) -> Option<Duration> {
        match self {
            Self::Treat => None,
            Self::Fish => Some(Duration::from_secs(5)),
            Self::Pillow => Some(Duration::from_secs(3)),
        }
    }

    /// Factor applied to an agent's maximum speed while the effect holds.
    ///
    /// Only `Fish` changes agent speed; the sub-unity factor models the
    /// pursuer pausing to eat.
    #[must_use]
    pub const fn speed_multiplier(self) -> f32 {
        match self {
            Self::Fish => 0.5,
            Self::Treat | Self::Pillow => 1.0,
        }
    }
}

/// Immutable representation of a single agent's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AgentSnapshot {
    /// Unique identifier assigned to the agent.
    pub id: AgentId,
    /// World-space position the agent currently occupies.
    pub position: WorldPosition,
    /// Top-level phase of the agent's state machine.
    pub phase: AiPhase,
    /// Handle of the entity the agent pursues, if any.
    pub target: Option<EntityId>,
    /// Live position of the pursued entity, resolved through the transform
    /// registry when the snapshot was captured. `None` when the handle no
    /// longer resolves.
    pub target_position: Option<WorldPosition>,
    /// Baseline maximum speed in world units per second.
    pub max_speed: f32,
    /// Maximum acceleration carried for tuning parity with the host engine.
    /// The kinematic mover applies direct position deltas and never
    /// integrates this value.
    pub max_acceleration: f32,
    /// Maximum speed with any active collectible multiplier applied.
    pub effective_speed: f32,
}

/// Read-only snapshot describing all pursuit agents.
#[derive(Clone, Debug, Default)]
pub struct AgentView {
    snapshots: Vec<AgentSnapshot>,
}

impl AgentView {
    /// Creates a new agent view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<AgentSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured agent snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &AgentSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<AgentSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single collectible used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CollectibleSnapshot {
    /// Unique identifier assigned to the collectible.
    pub id: CollectibleId,
    /// Type of the collectible.
    pub kind: CollectibleKind,
    /// World-space position of the collectible.
    pub position: WorldPosition,
    /// Indicates whether the collectible has already been picked up.
    pub collected: bool,
}

/// Read-only snapshot describing all collectibles in the maze.
#[derive(Clone, Debug, Default)]
pub struct CollectibleView {
    snapshots: Vec<CollectibleSnapshot>,
}

impl CollectibleView {
    /// Creates a new collectible view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<CollectibleSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured collectible snapshots in deterministic
    /// order.
    pub fn iter(&self) -> impl Iterator<Item = &CollectibleSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<CollectibleSnapshot> {
        self.snapshots
    }
}
