#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that drives a headless Maze Pursuit run.
//!
//! Stands in for the host engine: it generates a maze, spawns the cat at
//! the exit, scripts the ball rolling from the start toward the exit, pumps
//! the tick loop through the pursuit and pickup systems, and reports how
//! the chase ended.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use maze_pursuit_core::{
    proximity, AgentId, CellCoord, CollectibleKind, Command, EntityId, Event, WorldPosition,
};
use maze_pursuit_generation::Maze;
use maze_pursuit_system_effects::Effects;
use maze_pursuit_system_pursuit::Pursuit;
use maze_pursuit_world::{self as world, query, World};
use rand::Rng;

const BALL: EntityId = EntityId::new(1);
const BALL_SPEED: f32 = 1.2;
const CAT_SLEEP: Duration = Duration::from_secs(2);
const EXIT_RADIUS: f32 = 0.5;

#[derive(Debug, Parser)]
#[command(name = "maze-pursuit", about = "Headless Maze Pursuit simulation driver")]
struct Args {
    /// Number of maze columns.
    #[arg(long, default_value_t = 8)]
    columns: u32,

    /// Number of maze rows.
    #[arg(long, default_value_t = 6)]
    rows: u32,

    /// Extra connections injected beyond the spanning tree.
    #[arg(long, default_value_t = 2)]
    extra_loops: u32,

    /// Maze seed; drawn from the platform source when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Simulated milliseconds per tick.
    #[arg(long, default_value_t = 16)]
    step_ms: u64,

    /// Maximum number of ticks to simulate before giving up.
    #[arg(long, default_value_t = 3_600)]
    ticks: u64,
}

/// Entry point for the Maze Pursuit command-line driver.
fn main() -> Result<()> {
    let args = Args::parse();
    let seed = args.seed.unwrap_or_else(|| rand::thread_rng().gen());

    let mut world = World::new();
    println!("{}", query::welcome_banner(&world));

    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::GenerateMaze {
            columns: args.columns,
            rows: args.rows,
            extra_loops: args.extra_loops,
            seed,
        },
        &mut events,
    );
    if events
        .iter()
        .any(|event| matches!(event, Event::MazeGenerationRejected { .. }))
    {
        bail!(
            "maze generation rejected for {}x{}",
            args.columns,
            args.rows
        );
    }
    report(&world, &events);

    let maze = query::maze(&world)
        .cloned()
        .context("maze missing after generation")?;
    events.clear();
    let agent = set_scene(&mut world, &maze, &mut events)?;
    report(&world, &events);

    let mut pursuit = Pursuit::new(query::cell_size(&world));
    let mut effects = Effects::new();
    let exit_center = query::cell_center(&world, maze.exit_cell()).context("exit cell center")?;
    let dt = Duration::from_millis(args.step_ms);

    let mut outcome = "timeout";
    for _ in 0..args.ticks {
        events.clear();
        world::apply(&mut world, Command::Tick { dt }, &mut events);
        roll_ball(&mut world, exit_center, dt, &mut events);

        let agent_view = query::agent_view(&world);
        let collectible_view = query::collectible_view(&world);
        let ball = query::entity_position(&world, BALL);

        let mut commands = Vec::new();
        pursuit.handle(&events, Some(&maze), &agent_view, &mut commands);
        effects.handle(&events, ball, &collectible_view, &mut commands);
        for command in commands {
            world::apply(&mut world, command, &mut events);
        }
        report(&world, &events);

        if query::agent_caught_target(&world, agent) {
            outcome = "caught";
            break;
        }
        if matches!(
            query::entity_position(&world, BALL),
            Some(position) if proximity::within_radius(position, exit_center, EXIT_RADIUS)
        ) {
            outcome = "escaped";
            break;
        }
    }

    println!(
        "[{:>7.2}s] {}",
        query::clock(&world).as_secs_f32(),
        match outcome {
            "caught" => "the cat caught the ball",
            "escaped" => "the ball escaped through the exit",
            _ => "time ran out",
        }
    );
    println!("world: {}", query::debug_summary(&world));
    println!("pursuit: {}", pursuit.debug_summary());
    Ok(())
}

/// Spawns the cat at the exit, the ball at the start, and a few items.
fn set_scene(world: &mut World, maze: &Maze, events: &mut Vec<Event>) -> Result<AgentId> {
    world::apply(
        world,
        Command::SpawnAgent {
            cell: maze.exit_cell(),
            sleep_duration: CAT_SLEEP,
            target: BALL,
        },
        events,
    );
    let agent = query::agent_view(world)
        .iter()
        .last()
        .map(|snapshot| snapshot.id)
        .context("agent spawn rejected")?;

    let start = query::cell_center(world, maze.start_cell()).context("start cell center")?;
    world::apply(
        world,
        Command::SetEntityPosition {
            entity: BALL,
            position: start,
        },
        events,
    );

    let fish_cell = CellCoord::new(maze.columns() / 2, maze.rows() / 2);
    world::apply(
        world,
        Command::PlaceCollectible {
            kind: CollectibleKind::Fish,
            cell: fish_cell,
        },
        events,
    );
    let pillow_cell = CellCoord::new(maze.columns() / 2, maze.rows() - 1);
    world::apply(
        world,
        Command::PlaceCollectible {
            kind: CollectibleKind::Pillow,
            cell: pillow_cell,
        },
        events,
    );

    Ok(agent)
}

/// Scripts the ball rolling straight toward the exit at a fixed speed.
///
/// A stand-in for tilt input; it deliberately ignores walls, which only
/// makes the chase harder for the cat.
fn roll_ball(
    world: &mut World,
    exit_center: WorldPosition,
    dt: Duration,
    events: &mut Vec<Event>,
) {
    let Some(position) = query::entity_position(world, BALL) else {
        return;
    };
    let to_exit = position.vector_to(exit_center);
    let remaining = to_exit.length();
    let Some(direction) = to_exit.normalized() else {
        return;
    };

    let step = (BALL_SPEED * dt.as_secs_f32()).min(remaining);
    world::apply(
        world,
        Command::SetEntityPosition {
            entity: BALL,
            position: position.offset_by(direction.scaled(step)),
        },
        events,
    );
}

/// Prints the events a player would care to see, stamped with sim time.
fn report(world: &World, events: &[Event]) {
    let clock = query::clock(world).as_secs_f32();
    for event in events {
        let line = match event {
            Event::MazeGenerated {
                columns,
                rows,
                seed,
                requested_loops,
                injected_loops,
            } => format!(
                "maze {columns}x{rows} ready (seed {seed}, loops {injected_loops}/{requested_loops})"
            ),
            Event::AgentSpawned { agent, cell } => format!(
                "cat {} spawned at ({}, {})",
                agent.get(),
                cell.column(),
                cell.row()
            ),
            Event::AgentWoke { agent } => format!("cat {} woke up", agent.get()),
            Event::ItemCollected { kind, points, .. } => match kind {
                CollectibleKind::Treat => format!("treat collected (+{points})"),
                CollectibleKind::Fish => "fish collected, the cat stops to eat".to_string(),
                CollectibleKind::Pillow => "pillow collected".to_string(),
            },
            Event::AgentStunned { agent, duration } => format!(
                "cat {} stunned for {:.1}s",
                agent.get(),
                duration.as_secs_f32()
            ),
            Event::AgentStunExpired { agent } => format!("cat {} shakes off the stun", agent.get()),
            _ => continue,
        };
        println!("[{clock:>7.2}s] {line}");
    }
}
