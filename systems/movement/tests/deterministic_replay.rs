use std::time::Duration;

use tilemaze_core::{AgentSnapshot, CellCoord, CellKind, Command, Direction, Event, WallFlags};
use tilemaze_system_movement::{IntentTracker, Movement};
use tilemaze_world::{self as world, query, World};

#[test]
fn deterministic_replay_produces_expected_route() {
    let first = replay(&scripted_frames());
    let second = replay(&scripted_frames());

    assert_eq!(first, second, "replay diverged between runs");

    let route: Vec<_> = first
        .events
        .iter()
        .filter_map(|event| match event {
            Event::AgentArrived { cell } => Some(*cell),
            _ => None,
        })
        .collect();
    assert_eq!(
        route,
        vec![
            CellCoord::new(1, 2),
            CellCoord::new(1, 3),
            CellCoord::new(1, 4),
            CellCoord::new(2, 4),
        ],
        "agent should run down beside the wall and turn at its end"
    );
    assert_eq!(first.agent.cell, CellCoord::new(2, 4));
    assert!(!first.agent.is_moving());
}

#[derive(Clone, Copy, Debug)]
enum Input {
    Press(Direction),
    Release(Direction),
    Idle,
}

#[derive(Debug, PartialEq)]
struct ReplayOutcome {
    agent: AgentSnapshot,
    events: Vec<Event>,
}

fn replay(frames: &[Input]) -> ReplayOutcome {
    let mut world = World::new();
    let mut events = Vec::new();
    for command in layout_commands() {
        world::apply(&mut world, command, &mut events);
    }
    let image = query::map_image(&world);
    world::apply(&mut world, Command::LoadMap { image }, &mut events);

    let movement = Movement::new();
    let mut tracker = IntentTracker::new();
    let mut log = Vec::new();

    for input in frames {
        match *input {
            Input::Press(direction) => tracker.press(direction),
            Input::Release(direction) => tracker.release(direction),
            Input::Idle => {}
        }

        let mut events = Vec::new();
        world::apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(125),
            },
            &mut events,
        );

        let agent = query::agent(&world);
        let mut commands = Vec::new();
        movement.handle(
            &events,
            &agent,
            query::tile_grid_view(&world),
            tracker.intent(),
            &mut commands,
        );
        for command in commands {
            world::apply(&mut world, command, &mut events);
        }
        log.extend(events);
    }

    ReplayOutcome {
        agent: query::agent(&world),
        events: log,
    }
}

fn layout_commands() -> Vec<Command> {
    let mut commands = vec![
        Command::ConfigureTileGrid {
            columns: 5,
            rows: 5,
        },
        Command::EditCell {
            cell: CellCoord::new(1, 1),
            kind: CellKind::PlayerSpawn,
            flags: WallFlags::EMPTY,
        },
    ];
    for row in 1..4 {
        commands.push(Command::EditCell {
            cell: CellCoord::new(2, row),
            kind: CellKind::Wall,
            flags: WallFlags::EMPTY,
        });
    }
    commands
}

fn scripted_frames() -> Vec<Input> {
    vec![
        Input::Press(Direction::Right),
        Input::Press(Direction::Down),
        Input::Idle,
        Input::Idle,
        Input::Idle,
        Input::Idle,
        Input::Press(Direction::Right),
        Input::Release(Direction::Down),
        Input::Idle,
        Input::Release(Direction::Right),
        Input::Idle,
    ]
}
