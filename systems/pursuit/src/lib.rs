#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pursuit AI system that plans paths and steers agents toward their targets.
//!
//! The system owns the pathfinding engine and a per-agent arena of
//! path-following scratch state. It consumes world events and immutable
//! snapshots, and responds exclusively with `MoveAgent` commands; the world
//! remains the only writer of agent transforms.

use std::collections::BTreeMap;

use maze_pursuit_core::{AgentId, AgentView, AiPhase, Command, Event, WorldPosition};
use maze_pursuit_generation::Maze;
use maze_pursuit_navigation::PathfindingEngine;

/// Distance the target may drift from the held path's destination before a
/// re-plan fires.
///
/// Kept above half a cell diagonal so a target idling inside its cell never
/// causes re-plan thrash, while a target that leaves the cell does.
pub const REPLAN_DISTANCE: f32 = 0.8;

/// Distance at which the current waypoint counts as reached.
pub const WAYPOINT_RADIUS: f32 = 0.4;

const MIN_STEP: f32 = 1e-6;

/// Per-agent path-following scratch state.
#[derive(Clone, Debug, Default)]
struct FollowState {
    path: Vec<WorldPosition>,
    index: usize,
    following: bool,
}

impl FollowState {
    fn destination(&self) -> Option<WorldPosition> {
        self.path.last().copied()
    }

    fn consumed(&self) -> bool {
        self.index >= self.path.len()
    }

    fn abandon(&mut self) {
        self.path.clear();
        self.index = 0;
        self.following = false;
    }
}

/// Pure system that reacts to world events and emits pursuit movement
/// commands.
#[derive(Debug)]
pub struct Pursuit {
    engine: PathfindingEngine,
    follows: BTreeMap<AgentId, FollowState>,
}

impl Pursuit {
    /// Creates a new pursuit system with the provided world-units-per-cell
    /// size.
    #[must_use]
    pub fn new(cell_size: f32) -> Self {
        Self {
            engine: PathfindingEngine::new(cell_size),
            follows: BTreeMap::new(),
        }
    }

    /// Read-only access to the owned pathfinding engine for diagnostics.
    #[must_use]
    pub fn engine(&self) -> &PathfindingEngine {
        &self.engine
    }

    /// Current waypoint cursor and path length for an agent the system is
    /// tracking. Non-contractual, for diagnostics and tests.
    #[must_use]
    pub fn path_progress(&self, agent: AgentId) -> Option<(usize, usize)> {
        self.follows
            .get(&agent)
            .map(|follow| (follow.index, follow.path.len()))
    }

    /// One-line summary of system state for diagnostics. Non-contractual.
    #[must_use]
    pub fn debug_summary(&self) -> String {
        format!(
            "{}, {} tracked agents",
            self.engine.debug_summary(),
            self.follows.len()
        )
    }

    /// Consumes world events and immutable views to emit movement commands.
    ///
    /// Planning happens only on ticks (a `TimeAdvanced` event must be
    /// present) and only for agents in the `Active` phase; sleeping and
    /// stunned agents are skipped, with a stunned agent's held path left
    /// intact for when the stun wears off.
    pub fn handle(
        &mut self,
        events: &[Event],
        maze: Option<&Maze>,
        agents: &AgentView,
        out: &mut Vec<Command>,
    ) {
        let mut dt = None;
        for event in events {
            match event {
                Event::MazeGenerated { .. } => {
                    if let Some(maze) = maze {
                        self.engine.set_maze(maze);
                    }
                    self.follows.clear();
                }
                Event::AgentWoke { agent } | Event::AgentReset { agent } => {
                    // Any held path predates the wake or reset and would
                    // steer from a stale position.
                    let _ = self.follows.remove(agent);
                }
                Event::TimeAdvanced { dt: elapsed } => {
                    dt = Some(*elapsed);
                }
                _ => {}
            }
        }

        let Some(dt) = dt else {
            return;
        };
        let Some(maze) = maze else {
            return;
        };
        let dt_seconds = dt.as_secs_f32();
        if dt_seconds <= 0.0 {
            return;
        }

        for agent in agents.iter() {
            if agent.phase != AiPhase::Active {
                continue;
            }
            let Some(target) = agent.target_position else {
                // Lost target handle: no destination, hold position.
                continue;
            };

            let follow = self.follows.entry(agent.id).or_default();

            let target_drifted = follow
                .destination()
                .map_or(true, |destination| {
                    destination.distance_to(target) > REPLAN_DISTANCE
                });
            if follow.path.is_empty() || follow.consumed() || target_drifted {
                let path = self.engine.find_path(maze, agent.position, target);
                if path.is_empty() {
                    follow.abandon();
                    continue;
                }
                follow.path = path;
                follow.index = 0;
                follow.following = true;
            }

            if !follow.following {
                continue;
            }

            let Some(&waypoint) = follow.path.get(follow.index) else {
                follow.following = false;
                continue;
            };
            let waypoint = if agent.position.distance_to(waypoint) < WAYPOINT_RADIUS {
                follow.index += 1;
                match follow.path.get(follow.index) {
                    Some(&next) => next,
                    None => {
                        // Path consumed; hold position until the next
                        // re-plan trigger.
                        follow.following = false;
                        continue;
                    }
                }
            } else {
                waypoint
            };

            let to_waypoint = agent.position.vector_to(waypoint);
            let remaining = to_waypoint.length();
            if remaining <= MIN_STEP {
                continue;
            }
            let Some(direction) = to_waypoint.normalized() else {
                continue;
            };

            let step = (agent.effective_speed * dt_seconds).min(remaining);
            out.push(Command::MoveAgent {
                agent: agent.id,
                delta: direction.scaled(step),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Pursuit, REPLAN_DISTANCE, WAYPOINT_RADIUS};
    use maze_pursuit_core::{
        AgentId, AgentSnapshot, AgentView, AiPhase, Event, WorldPosition,
    };
    use maze_pursuit_generation::{generate, GenerationRequest};
    use std::time::Duration;

    fn active_snapshot(position: WorldPosition, target: WorldPosition) -> AgentSnapshot {
        AgentSnapshot {
            id: AgentId::new(0),
            position,
            phase: AiPhase::Active,
            target: None,
            target_position: Some(target),
            max_speed: 1.8,
            max_acceleration: 4.0,
            effective_speed: 1.8,
        }
    }

    #[test]
    fn replan_threshold_exceeds_the_cell_center_drift() {
        // Largest distance from a unit cell's center to its corner.
        let corner_drift = (0.5_f32 * 0.5 + 0.5 * 0.5).sqrt();
        assert!(REPLAN_DISTANCE > corner_drift);
        assert!(WAYPOINT_RADIUS < REPLAN_DISTANCE);
    }

    #[test]
    fn no_commands_without_a_tick_event() {
        let maze = generate(GenerationRequest::new(4, 4, 0, 1)).expect("generate");
        let mut pursuit = Pursuit::new(1.0);
        let view = AgentView::from_snapshots(vec![active_snapshot(
            WorldPosition::new(0.5, 0.1, 0.5),
            WorldPosition::new(3.5, 0.1, 3.5),
        )]);

        let mut commands = Vec::new();
        pursuit.handle(
            &[Event::AgentWoke {
                agent: AgentId::new(0),
            }],
            Some(&maze),
            &view,
            &mut commands,
        );
        assert!(commands.is_empty());
    }

    #[test]
    fn no_commands_without_a_maze() {
        let mut pursuit = Pursuit::new(1.0);
        let view = AgentView::from_snapshots(vec![active_snapshot(
            WorldPosition::new(0.5, 0.1, 0.5),
            WorldPosition::new(3.5, 0.1, 3.5),
        )]);

        let mut commands = Vec::new();
        pursuit.handle(
            &[Event::TimeAdvanced {
                dt: Duration::from_millis(16),
            }],
            None,
            &view,
            &mut commands,
        );
        assert!(commands.is_empty());
    }

    #[test]
    fn inactive_agents_are_skipped() {
        let maze = generate(GenerationRequest::new(4, 4, 0, 1)).expect("generate");
        let mut pursuit = Pursuit::new(1.0);

        for phase in [AiPhase::Sleeping, AiPhase::Stunned] {
            let mut snapshot = active_snapshot(
                WorldPosition::new(0.5, 0.1, 0.5),
                WorldPosition::new(3.5, 0.1, 3.5),
            );
            snapshot.phase = phase;
            let view = AgentView::from_snapshots(vec![snapshot]);

            let mut commands = Vec::new();
            pursuit.handle(
                &[Event::TimeAdvanced {
                    dt: Duration::from_millis(16),
                }],
                Some(&maze),
                &view,
                &mut commands,
            );
            assert!(commands.is_empty(), "{phase:?} agent must not move");
        }
    }

    #[test]
    fn lost_target_handles_leave_the_agent_stationary() {
        let maze = generate(GenerationRequest::new(4, 4, 0, 1)).expect("generate");
        let mut pursuit = Pursuit::new(1.0);
        let mut snapshot = active_snapshot(
            WorldPosition::new(0.5, 0.1, 0.5),
            WorldPosition::new(3.5, 0.1, 3.5),
        );
        snapshot.target_position = None;
        let view = AgentView::from_snapshots(vec![snapshot]);

        let mut commands = Vec::new();
        pursuit.handle(
            &[Event::TimeAdvanced {
                dt: Duration::from_millis(16),
            }],
            Some(&maze),
            &view,
            &mut commands,
        );
        assert!(commands.is_empty());
    }
}
