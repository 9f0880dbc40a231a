#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Grid movement system that turns held directions into single-cell steps.

mod intent;

use tilemaze_core::{AgentSnapshot, Command, Event, Intent, TileGridView};

pub use self::intent::IntentTracker;

/// Pure system that reacts to world events and emits agent step commands.
#[derive(Clone, Copy, Debug, Default)]
pub struct Movement;

impl Movement {
    /// Creates a new movement system.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Emits a step for an idle agent whose intended neighbour is walkable.
    ///
    /// Steps are only proposed on frames whose events advanced time, and the
    /// heading is sampled once when the move starts; changes of intent while
    /// the agent travels take effect on the next step.
    pub fn handle(
        &self,
        events: &[Event],
        agent: &AgentSnapshot,
        grid: TileGridView<'_>,
        intent: Intent,
        out: &mut Vec<Command>,
    ) {
        if !events
            .iter()
            .any(|event| matches!(event, Event::TimeAdvanced { .. }))
        {
            return;
        }

        if agent.is_moving() || intent.is_none() {
            return;
        }

        let (columns, rows) = grid.dimensions();
        let Some(candidate) = agent.cell.offset(intent, columns, rows) else {
            return;
        };

        if grid.is_walkable(candidate) {
            out.push(Command::StepAgent { heading: intent });
        }
    }
}
