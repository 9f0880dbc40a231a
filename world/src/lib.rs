#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for TileMaze.

mod agent;
mod grid;
mod walls;

use tilemaze_core::{CellCoord, Command, Event, Intent, MoveError};
use tracing::{debug, info};

use self::agent::Agent;
pub use self::grid::TileGrid;

const DEFAULT_GRID_COLUMNS: u32 = 28;
const DEFAULT_GRID_ROWS: u32 = 31;
const DEFAULT_AGENT_SPEED: f32 = 5.0;

/// Cell used for the agent when a grid holds no spawn point.
pub const FALLBACK_SPAWN: CellCoord = CellCoord::new(0, 0);

/// Represents the authoritative TileMaze world state.
#[derive(Debug)]
pub struct World {
    tile_grid: TileGrid,
    agent: Agent,
    agent_speed: f32,
    tick_index: u64,
}

impl World {
    /// Creates a new world holding a blank grid of the default size.
    #[must_use]
    pub fn new() -> Self {
        let tile_grid = TileGrid::new(DEFAULT_GRID_COLUMNS, DEFAULT_GRID_ROWS);
        let agent = Agent::spawn_at(spawn_for(&tile_grid));
        Self {
            tile_grid,
            agent,
            agent_speed: DEFAULT_AGENT_SPEED,
            tick_index: 0,
        }
    }

    fn replace_grid(&mut self, tile_grid: TileGrid) -> CellCoord {
        let spawn = spawn_for(&tile_grid);
        self.tile_grid = tile_grid;
        self.agent = Agent::spawn_at(spawn);
        spawn
    }

    fn try_step(&mut self, heading: Intent) -> Result<CellCoord, MoveError> {
        if self.agent.is_moving() {
            return Err(MoveError::Busy);
        }
        if heading.is_none() {
            return Err(MoveError::NoHeading);
        }

        let target = self
            .agent
            .cell()
            .offset(heading, self.tile_grid.columns(), self.tile_grid.rows())
            .ok_or(MoveError::OutOfBounds)?;
        if !self.tile_grid.view().is_walkable(target) {
            return Err(MoveError::Blocked);
        }

        self.agent.begin_move(target, heading);
        Ok(target)
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

fn spawn_for(tile_grid: &TileGrid) -> CellCoord {
    tile_grid.spawn_cell().unwrap_or(FALLBACK_SPAWN)
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureTileGrid { columns, rows } => {
            let _ = world.replace_grid(TileGrid::new(columns, rows));
            out_events.push(Event::TileGridConfigured { columns, rows });
        }
        Command::ConfigureAgentSpeed { cells_per_second } => {
            world.agent_speed = cells_per_second.max(0.0);
        }
        Command::EditCell { cell, kind, flags } => {
            match world.tile_grid.edit(cell, kind, flags) {
                Ok(contents) => out_events.push(Event::CellEdited { cell, contents }),
                Err(reason) => {
                    debug!(?cell, %reason, "cell edit rejected");
                    out_events.push(Event::CellEditRejected { cell, reason });
                }
            }
        }
        Command::LoadMap { image } => {
            let columns = image.columns();
            let rows = image.rows();
            let spawn = world.replace_grid(TileGrid::from_image(&image));
            info!(columns, rows, ?spawn, "map loaded");
            out_events.push(Event::MapLoaded {
                columns,
                rows,
                spawn,
            });
        }
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            out_events.push(Event::TimeAdvanced { dt });

            if let Some(cell) = world.agent.advance(dt, world.agent_speed) {
                out_events.push(Event::AgentArrived { cell });
            }
        }
        Command::StepAgent { heading } => {
            let from = world.agent.cell();
            match world.try_step(heading) {
                Ok(to) => out_events.push(Event::AgentMoveStarted { from, to }),
                Err(reason) => out_events.push(Event::AgentStepRejected { reason }),
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use tilemaze_core::{AgentSnapshot, MapImage, TileGridView};

    use super::{TileGrid, World};

    /// Provides read-only access to the world's tile grid.
    #[must_use]
    pub fn tile_grid(world: &World) -> &TileGrid {
        &world.tile_grid
    }

    /// Exposes a read-only view of the tile grid for systems.
    #[must_use]
    pub fn tile_grid_view(world: &World) -> TileGridView<'_> {
        world.tile_grid.view()
    }

    /// Captures the agent's current state.
    #[must_use]
    pub fn agent(world: &World) -> AgentSnapshot {
        world.agent.snapshot()
    }

    /// Captures the tile grid as a saveable image.
    #[must_use]
    pub fn map_image(world: &World) -> MapImage {
        world.tile_grid.to_image()
    }

    /// Speed at which the agent travels, in cells per second.
    #[must_use]
    pub fn agent_speed(world: &World) -> f32 {
        world.agent_speed
    }

    /// Number of ticks processed since the world was created.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tilemaze_core::{Cell, CellKind, Direction, EditError, MapImage, WallFlags};

    use super::*;

    fn configured_world(columns: u32, rows: u32) -> World {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ConfigureTileGrid { columns, rows },
            &mut events,
        );
        world
    }

    #[test]
    fn new_world_uses_default_layout() {
        let world = World::new();
        let grid = query::tile_grid(&world);
        assert_eq!((grid.columns(), grid.rows()), (28, 31));
        assert_eq!(query::agent(&world).cell, FALLBACK_SPAWN);
        assert!((query::agent_speed(&world) - 5.0).abs() < f32::EPSILON);
    }

    #[test]
    fn rejected_edit_reports_reason() {
        let mut world = configured_world(2, 2);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::EditCell {
                cell: CellCoord::new(5, 5),
                kind: CellKind::Wall,
                flags: WallFlags::EMPTY,
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::CellEditRejected {
                cell: CellCoord::new(5, 5),
                reason: EditError::OutOfBounds,
            }]
        );
    }

    #[test]
    fn load_positions_agent_on_spawn() {
        let mut world = configured_world(3, 3);
        let mut image = MapImage::blank(4, 2).expect("valid dimensions");
        let _ = image.set_cell(
            CellCoord::new(3, 1),
            Cell::new(CellKind::PlayerSpawn, WallFlags::EMPTY),
        );
        let mut events = Vec::new();

        apply(&mut world, Command::LoadMap { image }, &mut events);

        assert_eq!(
            events,
            vec![Event::MapLoaded {
                columns: 4,
                rows: 2,
                spawn: CellCoord::new(3, 1),
            }]
        );
        assert_eq!(query::agent(&world).cell, CellCoord::new(3, 1));
    }

    #[test]
    fn load_cancels_move_in_flight() {
        let mut world = configured_world(3, 1);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::StepAgent {
                heading: Intent::from(Direction::Right),
            },
            &mut events,
        );
        assert!(query::agent(&world).is_moving());

        let image = MapImage::blank(3, 1).expect("valid dimensions");
        apply(&mut world, Command::LoadMap { image }, &mut events);

        let agent = query::agent(&world);
        assert!(!agent.is_moving());
        assert_eq!(agent.cell, FALLBACK_SPAWN);
    }

    #[test]
    fn step_is_rejected_while_moving() {
        let mut world = configured_world(3, 3);
        let mut events = Vec::new();
        let heading = Intent::from(Direction::Down);
        apply(&mut world, Command::StepAgent { heading }, &mut events);
        apply(
            &mut world,
            Command::StepAgent {
                heading: Intent::from(Direction::Right),
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![
                Event::AgentMoveStarted {
                    from: CellCoord::new(0, 0),
                    to: CellCoord::new(0, 1),
                },
                Event::AgentStepRejected {
                    reason: MoveError::Busy,
                },
            ]
        );
        assert_eq!(query::agent(&world).heading, heading);
    }

    #[test]
    fn tick_reports_arrival() {
        let mut world = configured_world(2, 1);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::StepAgent {
                heading: Intent::from(Direction::Right),
            },
            &mut events,
        );
        events.clear();

        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(300),
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![
                Event::TimeAdvanced {
                    dt: Duration::from_millis(300),
                },
                Event::AgentArrived {
                    cell: CellCoord::new(1, 0),
                },
            ]
        );
        assert_eq!(query::tick_index(&world), 1);
    }

    #[test]
    fn negative_speed_is_clamped() {
        let mut world = configured_world(2, 1);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ConfigureAgentSpeed {
                cells_per_second: -3.0,
            },
            &mut events,
        );
        assert_eq!(query::agent_speed(&world), 0.0);
        assert!(events.is_empty());
    }
}
