#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Collectible pickup detection driven by world snapshots.
//!
//! The system scans uncollected collectibles against the tracked player
//! position once per tick and emits `CollectItem` commands for every item
//! the player is touching. Effect application and expiry stay inside the
//! world; this system only observes and requests.

use maze_pursuit_core::{proximity, CollectibleView, Command, Event, WorldPosition};

/// Distance below which the player counts as touching a collectible.
pub const PICKUP_RADIUS: f32 = 0.5;

/// Pure system that turns player-collectible proximity into pickup commands.
#[derive(Debug, Default)]
pub struct Effects;

impl Effects {
    /// Creates a new pickup detection system.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Consumes events and immutable views to emit pickup commands.
    ///
    /// Runs only on ticks (a `TimeAdvanced` event must be present) and only
    /// when the player's transform is known. Already collected items are
    /// skipped; the world treats repeated pickups as no-ops regardless.
    pub fn handle(
        &mut self,
        events: &[Event],
        player: Option<WorldPosition>,
        collectibles: &CollectibleView,
        out: &mut Vec<Command>,
    ) {
        if !events
            .iter()
            .any(|event| matches!(event, Event::TimeAdvanced { .. }))
        {
            return;
        }
        let Some(player) = player else {
            return;
        };

        for item in collectibles.iter() {
            if item.collected {
                continue;
            }
            if proximity::within_radius(player, item.position, PICKUP_RADIUS) {
                out.push(Command::CollectItem {
                    collectible: item.id,
                });
            }
        }
    }
}
