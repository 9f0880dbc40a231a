use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use glam::Vec2;
use tilemaze_core::{CellKind, Command, Event};
use tilemaze_persistence::{load_from_path, save_to_path, MapFormat};
use tilemaze_rendering::{
    AgentPresentation, CellPresentation, Color, FrameInput, Scene, TileGridPresentation,
};
use tilemaze_system_editor::{Editor, EditorInput};
use tilemaze_system_movement::{IntentTracker, Movement};
use tilemaze_world::{self as world, query, World};
use tracing::{info, warn};

/// Startup options for an interactive session.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct SessionConfig {
    pub(crate) columns: Option<u32>,
    pub(crate) rows: Option<u32>,
    pub(crate) speed: Option<f32>,
    pub(crate) map_path: Option<PathBuf>,
    pub(crate) save_path: Option<PathBuf>,
}

/// Owns the world and the systems driving it for one editing session.
#[derive(Debug)]
pub(crate) struct EditorSession {
    world: World,
    editor: Editor,
    movement: Movement,
    intent: IntentTracker,
    wireframe: bool,
    map_path: Option<PathBuf>,
    save_path: Option<PathBuf>,
}

impl EditorSession {
    /// Builds the world from the config, loading the map file when it exists.
    pub(crate) fn new(config: SessionConfig) -> Result<Self> {
        let SessionConfig {
            columns,
            rows,
            speed,
            map_path,
            save_path,
        } = config;

        let mut world = World::new();
        let mut events = Vec::new();
        if columns.is_some() || rows.is_some() {
            let grid = query::tile_grid(&world);
            let columns = columns.unwrap_or(grid.columns());
            let rows = rows.unwrap_or(grid.rows());
            world::apply(
                &mut world,
                Command::ConfigureTileGrid { columns, rows },
                &mut events,
            );
        }
        if let Some(cells_per_second) = speed {
            world::apply(
                &mut world,
                Command::ConfigureAgentSpeed { cells_per_second },
                &mut events,
            );
        }

        let mut session = Self {
            world,
            editor: Editor::new(),
            movement: Movement::new(),
            intent: IntentTracker::new(),
            wireframe: false,
            map_path,
            save_path,
        };

        match session.map_path.clone() {
            Some(path) if path.exists() => session
                .load_map(&path)
                .with_context(|| format!("failed to open map {}", path.display()))?,
            Some(path) => info!(path = %path.display(), "map file missing; starting blank"),
            None => {}
        }

        Ok(session)
    }

    /// Runs one frame: input, editing, time, movement, then file requests.
    ///
    /// Presses are applied before releases, so a key tapped within a single
    /// frame leaves no intent behind.
    pub(crate) fn advance(&mut self, dt: Duration, input: FrameInput) {
        for direction in &input.direction_presses {
            self.intent.press(*direction);
        }
        for direction in &input.direction_releases {
            self.intent.release(*direction);
        }
        if input.toggle_wireframe {
            self.wireframe = !self.wireframe;
        }

        let mut commands = Vec::new();
        self.editor.handle(
            &EditorInput {
                commands: &input.editor_commands,
                paint_cell: input.paint_cell,
                erase_cell: input.erase_cell,
            },
            &mut commands,
        );
        let mut events = Vec::new();
        for command in commands {
            world::apply(&mut self.world, command, &mut events);
        }

        world::apply(&mut self.world, Command::Tick { dt }, &mut events);
        let agent = query::agent(&self.world);
        let mut steps = Vec::new();
        self.movement.handle(
            &events,
            &agent,
            query::tile_grid_view(&self.world),
            self.intent.intent(),
            &mut steps,
        );
        for command in steps {
            world::apply(&mut self.world, command, &mut events);
        }

        if input.load_requested {
            self.reload();
        }
        if input.save_requested {
            match self.save() {
                Ok(Some(path)) => info!(path = %path.display(), "map written"),
                Ok(None) => warn!("no save path configured; pass --save or --map"),
                Err(error) => warn!("save failed: {error:#}"),
            }
        }
    }

    fn reload(&mut self) {
        let Some(path) = self.map_path.clone() else {
            warn!("no map path configured; pass --map to enable loading");
            return;
        };
        if let Err(error) = self.load_map(&path) {
            warn!("load failed: {error:#}");
        }
    }

    fn load_map(&mut self, path: &Path) -> Result<()> {
        let (image, _) = load_from_path(path)?;
        let mut events = Vec::new();
        world::apply(&mut self.world, Command::LoadMap { image }, &mut events);
        if let Some(Event::MapLoaded { spawn, .. }) = events.first() {
            info!(path = %path.display(), ?spawn, "session map replaced");
        }
        Ok(())
    }

    /// Writes the grid to the save path, or the map path when none was given.
    ///
    /// The format follows the path's extension and defaults to binary.
    pub(crate) fn save(&self) -> Result<Option<PathBuf>> {
        let Some(path) = self.save_path.as_ref().or(self.map_path.as_ref()) else {
            return Ok(None);
        };
        let format = MapFormat::from_path(path).unwrap_or(MapFormat::Binary);
        let written = save_to_path(&query::map_image(&self.world), path, format)
            .with_context(|| format!("failed to write map {}", path.display()))?;
        Ok(Some(written))
    }

    /// Builds the initial scene for the renderer.
    pub(crate) fn scene(&self) -> Result<Scene> {
        let grid = query::tile_grid(&self.world);
        let tile_grid = TileGridPresentation::new(
            grid.columns(),
            grid.rows(),
            TileGridPresentation::DEFAULT_CELL_LENGTH,
            Color::from_rgb_u8(60, 60, 60),
        )
        .context("failed to describe tile grid")?;

        let mut scene = Scene::new(
            tile_grid,
            Vec::new(),
            AgentPresentation::new(Vec2::ZERO),
            self.editor.brush().cell(),
            self.wireframe,
        );
        self.populate_scene(&mut scene);
        Ok(scene)
    }

    /// Refreshes every scene channel from the world and the editor.
    pub(crate) fn populate_scene(&self, scene: &mut Scene) {
        let view = query::tile_grid_view(&self.world);
        let (columns, rows) = view.dimensions();
        scene.tile_grid.columns = columns;
        scene.tile_grid.rows = rows;

        scene.cells.clear();
        scene.cells.extend(
            view.iter()
                .filter(|(_, cell)| cell.kind() != CellKind::Blank)
                .map(|(coord, cell)| CellPresentation::new(coord, cell)),
        );

        let position = query::agent(&self.world).position;
        scene.agent = AgentPresentation::new(Vec2::new(position.column, position.row));
        scene.brush = self.editor.brush().cell();
        scene.wireframe = self.wireframe;
    }

    #[cfg(test)]
    fn world(&self) -> &World {
        &self.world
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tilemaze_core::{Cell, CellCoord, Direction, EditorCommand, WallFlags};

    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let directory = std::env::temp_dir().join(format!(
            "tilemaze-session-{}-{name}",
            std::process::id()
        ));
        fs::create_dir_all(&directory).expect("create scratch directory");
        directory
    }

    fn small_session(map_path: Option<PathBuf>, save_path: Option<PathBuf>) -> EditorSession {
        EditorSession::new(SessionConfig {
            columns: Some(4),
            rows: Some(3),
            map_path,
            save_path,
            ..SessionConfig::default()
        })
        .expect("session should start")
    }

    fn frame(session: &mut EditorSession, input: FrameInput) {
        session.advance(Duration::from_millis(125), input);
    }

    #[test]
    fn dimensions_override_defaults() {
        let session = EditorSession::new(SessionConfig {
            rows: Some(9),
            speed: Some(2.0),
            ..SessionConfig::default()
        })
        .expect("session should start");

        let grid = query::tile_grid(session.world());
        assert_eq!((grid.columns(), grid.rows()), (28, 9));
        assert_eq!(query::agent_speed(session.world()), 2.0);
    }

    #[test]
    fn painting_uses_the_brush_and_erasing_clears() {
        let mut session = small_session(None, None);

        frame(
            &mut session,
            FrameInput {
                editor_commands: vec![EditorCommand::ToggleDot],
                paint_cell: Some(CellCoord::new(2, 1)),
                ..FrameInput::default()
            },
        );
        let grid = query::tile_grid(session.world());
        assert_eq!(grid.cell(CellCoord::new(2, 1)).map(|cell| cell.kind()), Some(CellKind::Dot));

        frame(
            &mut session,
            FrameInput {
                erase_cell: Some(CellCoord::new(2, 1)),
                ..FrameInput::default()
            },
        );
        let grid = query::tile_grid(session.world());
        assert_eq!(grid.cell(CellCoord::new(2, 1)), Some(Cell::blank()));
    }

    #[test]
    fn held_direction_moves_the_agent_until_released() {
        let mut session = small_session(None, None);

        frame(
            &mut session,
            FrameInput {
                direction_presses: vec![Direction::Right],
                ..FrameInput::default()
            },
        );
        frame(&mut session, FrameInput::default());
        frame(&mut session, FrameInput::default());
        frame(
            &mut session,
            FrameInput {
                direction_releases: vec![Direction::Right],
                ..FrameInput::default()
            },
        );
        frame(&mut session, FrameInput::default());
        frame(&mut session, FrameInput::default());

        let agent = query::agent(session.world());
        assert_eq!(agent.cell, CellCoord::new(2, 0));
        assert!(!agent.is_moving());
    }

    #[test]
    fn key_tapped_within_one_frame_does_not_stick() {
        let mut session = EditorSession::new(SessionConfig {
            columns: Some(8),
            rows: Some(1),
            ..SessionConfig::default()
        })
        .expect("session should start");

        frame(
            &mut session,
            FrameInput {
                direction_presses: vec![Direction::Right],
                direction_releases: vec![Direction::Right],
                ..FrameInput::default()
            },
        );
        for _ in 0..200 {
            frame(&mut session, FrameInput::default());
        }

        let agent = query::agent(session.world());
        assert!(
            agent.cell.column() <= 1,
            "agent kept walking after the key was released: {:?}",
            agent.cell
        );
        assert!(!agent.is_moving());
    }

    #[test]
    fn switching_keys_within_one_frame_keeps_newest_direction() {
        let mut session = small_session(None, None);
        frame(
            &mut session,
            FrameInput {
                direction_presses: vec![Direction::Down],
                ..FrameInput::default()
            },
        );
        frame(&mut session, FrameInput::default());
        frame(
            &mut session,
            FrameInput {
                direction_presses: vec![Direction::Right],
                direction_releases: vec![Direction::Down],
                ..FrameInput::default()
            },
        );
        for _ in 0..3 {
            frame(&mut session, FrameInput::default());
        }

        let agent = query::agent(session.world());
        assert_eq!(agent.cell.row(), 1);
        assert!(agent.cell.column() >= 1, "newer key must keep the agent moving");
    }

    #[test]
    fn wireframe_toggle_flips_scene_flag() {
        let mut session = small_session(None, None);
        frame(
            &mut session,
            FrameInput {
                toggle_wireframe: true,
                ..FrameInput::default()
            },
        );

        let scene = session.scene().expect("scene should build");
        assert!(scene.wireframe);

        frame(
            &mut session,
            FrameInput {
                toggle_wireframe: true,
                ..FrameInput::default()
            },
        );
        assert!(!session.scene().expect("scene should build").wireframe);
    }

    #[test]
    fn scene_lists_non_blank_cells_and_brush() {
        let mut session = small_session(None, None);
        frame(
            &mut session,
            FrameInput {
                editor_commands: vec![EditorCommand::ToggleAutoWall],
                paint_cell: Some(CellCoord::new(1, 1)),
                ..FrameInput::default()
            },
        );

        let scene = session.scene().expect("scene should build");
        assert_eq!(scene.tile_grid.columns, 4);
        assert_eq!(scene.tile_grid.rows, 3);
        assert_eq!(
            scene.cells,
            vec![CellPresentation::new(
                CellCoord::new(1, 1),
                Cell::wall(WallFlags::EMPTY)
            )]
        );
        assert_eq!(scene.brush, Cell::wall(WallFlags::EMPTY));
    }

    #[test]
    fn save_then_load_restores_edits() {
        let directory = scratch_dir("round-trip");
        let map_path = directory.join("level.tmap");
        let _ = fs::remove_file(&map_path);

        let mut session = small_session(Some(map_path.clone()), None);
        frame(
            &mut session,
            FrameInput {
                editor_commands: vec![EditorCommand::ToggleSpawn],
                paint_cell: Some(CellCoord::new(3, 2)),
                save_requested: true,
                ..FrameInput::default()
            },
        );
        assert!(map_path.exists(), "save should write the map path");

        let reopened = small_session(Some(map_path), None);
        assert_eq!(query::agent(reopened.world()).cell, CellCoord::new(3, 2));
        assert_eq!(
            query::map_image(reopened.world()),
            query::map_image(session.world())
        );
    }

    #[test]
    fn save_appends_extension_for_legacy_paths() {
        let directory = scratch_dir("legacy-save");
        let session = small_session(None, Some(directory.join("level.pmap")));

        let written = session
            .save()
            .expect("save should succeed")
            .expect("a save path is configured");
        assert_eq!(written, directory.join("level.pmap"));
        assert_eq!(
            fs::read(&written).expect("read saved map").len(),
            4 + 4 * 3 * 4
        );
    }

    #[test]
    fn failed_reload_leaves_world_untouched() {
        let directory = scratch_dir("bad-reload");
        let map_path = directory.join("broken.tmap");
        let _ = fs::remove_file(&map_path);

        let mut session = small_session(Some(map_path.clone()), None);
        frame(
            &mut session,
            FrameInput {
                editor_commands: vec![EditorCommand::ToggleBigDot],
                paint_cell: Some(CellCoord::new(0, 2)),
                ..FrameInput::default()
            },
        );
        let before = query::map_image(session.world());

        fs::write(&map_path, b"tmap\x02\x00").expect("write broken map");
        frame(
            &mut session,
            FrameInput {
                load_requested: true,
                ..FrameInput::default()
            },
        );

        assert_eq!(query::map_image(session.world()), before);
    }

    #[test]
    fn corrupt_startup_map_is_an_error() {
        let directory = scratch_dir("bad-startup");
        let map_path = directory.join("broken.pmap");
        fs::write(&map_path, b"zz").expect("write broken map");

        let result = EditorSession::new(SessionConfig {
            map_path: Some(map_path),
            ..SessionConfig::default()
        });
        assert!(result.is_err());
    }
}
