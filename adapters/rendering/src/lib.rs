#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for TileMaze adapters.

use anyhow::Result as AnyResult;
use glam::Vec2;
use std::{error::Error, fmt, time::Duration};
use tilemaze_core::{Cell, CellCoord, CellKind, Direction, EditorCommand};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// Fill colors assigned to each cell kind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellPalette {
    /// Color of wall segments.
    pub wall: Color,
    /// Color of regular dots.
    pub dot: Color,
    /// Color of power dots.
    pub dot_big: Color,
    /// Color of spawn points.
    pub spawn: Color,
    /// Color of legacy player markers.
    pub marker: Color,
    /// Color of the agent.
    pub agent: Color,
}

impl CellPalette {
    /// Fill color for a cell kind, or `None` for blank floor.
    #[must_use]
    pub const fn color_for(&self, kind: CellKind) -> Option<Color> {
        match kind {
            CellKind::Blank => None,
            CellKind::Wall => Some(self.wall),
            CellKind::Dot => Some(self.dot),
            CellKind::DotBig => Some(self.dot_big),
            CellKind::PlayerSpawn => Some(self.spawn),
            CellKind::PlayerMarker => Some(self.marker),
        }
    }
}

impl Default for CellPalette {
    fn default() -> Self {
        Self {
            wall: Color::from_rgb_u8(33, 33, 222),
            dot: Color::from_rgb_u8(255, 184, 151),
            dot_big: Color::from_rgb_u8(255, 184, 151).lighten(0.3),
            spawn: Color::from_rgb_u8(0, 200, 80),
            marker: Color::from_rgb_u8(120, 120, 120),
            agent: Color::from_rgb_u8(255, 255, 0),
        }
    }
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct FrameInput {
    /// Directions whose keys went down on this frame.
    pub direction_presses: Vec<Direction>,
    /// Directions whose keys came up on this frame; consumers apply them
    /// after the presses so a tap within one frame cancels itself.
    pub direction_releases: Vec<Direction>,
    /// Brush edits requested on this frame, in binding order.
    pub editor_commands: Vec<EditorCommand>,
    /// Cell under the cursor while the paint button is held.
    pub paint_cell: Option<CellCoord>,
    /// Cell under the cursor while the erase button is held.
    pub erase_cell: Option<CellCoord>,
    /// Whether the wireframe toggle was pressed.
    pub toggle_wireframe: bool,
    /// Whether the player asked to reload the map file.
    pub load_requested: bool,
    /// Whether the player asked to save the map file.
    pub save_requested: bool,
    /// Whether the player asked to leave the session.
    pub quit_requested: bool,
}

/// Describes the tile grid layout in screen units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileGridPresentation {
    /// Number of columns contained in the grid.
    pub columns: u32,
    /// Number of rows contained in the grid.
    pub rows: u32,
    /// Side length of a single cell in screen units.
    pub cell_length: f32,
    /// Color used when drawing outlines in wireframe mode.
    pub line_color: Color,
}

impl TileGridPresentation {
    /// Default side length of a cell.
    pub const DEFAULT_CELL_LENGTH: f32 = 24.0;

    /// Creates a new tile grid descriptor.
    ///
    /// Returns an error when the grid has no cells or the cell length is not
    /// positive.
    pub fn new(
        columns: u32,
        rows: u32,
        cell_length: f32,
        line_color: Color,
    ) -> std::result::Result<Self, RenderingError> {
        if columns == 0 || rows == 0 {
            return Err(RenderingError::EmptyGrid { columns, rows });
        }
        if !(cell_length > f32::EPSILON) {
            return Err(RenderingError::InvalidCellLength);
        }

        Ok(Self {
            columns,
            rows,
            cell_length,
            line_color,
        })
    }

    /// Calculates the total width of the grid.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.columns as f32 * self.cell_length
    }

    /// Calculates the total height of the grid.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.rows as f32 * self.cell_length
    }

    /// Top-left corner of a cell in screen units.
    #[must_use]
    pub fn cell_origin(&self, cell: CellCoord) -> Vec2 {
        Vec2::new(cell.column() as f32, cell.row() as f32) * self.cell_length
    }

    /// Converts a position measured in cells into screen units.
    #[must_use]
    pub fn to_screen(&self, position_in_cells: Vec2) -> Vec2 {
        position_in_cells * self.cell_length
    }

    /// Cell containing the provided screen position.
    ///
    /// Returns `None` when the position lies outside the grid.
    #[must_use]
    pub fn cell_at(&self, position: Vec2) -> Option<CellCoord> {
        if position.x < 0.0 || position.y < 0.0 {
            return None;
        }

        let scaled = position / self.cell_length;
        let column = scaled.x.floor() as u32;
        let row = scaled.y.floor() as u32;
        let cell = CellCoord::new(column, row);
        cell.is_within(self.columns, self.rows).then_some(cell)
    }
}

/// Single cell drawn by the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CellPresentation {
    /// Location of the cell.
    pub cell: CellCoord,
    /// Contents of the cell, including wall connections.
    pub contents: Cell,
}

impl CellPresentation {
    /// Creates a new cell descriptor.
    #[must_use]
    pub const fn new(cell: CellCoord, contents: Cell) -> Self {
        Self { cell, contents }
    }
}

/// Describes the agent at its interpolated position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AgentPresentation {
    /// Continuous position measured in cells.
    pub position: Vec2,
}

impl AgentPresentation {
    /// Creates a new agent descriptor.
    #[must_use]
    pub const fn new(position: Vec2) -> Self {
        Self { position }
    }
}

/// Scene description consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Layout of the tile grid.
    pub tile_grid: TileGridPresentation,
    /// Colors used for cell contents and the agent.
    pub palette: CellPalette,
    /// Every non-blank cell of the grid.
    pub cells: Vec<CellPresentation>,
    /// Agent drawn on top of the cells.
    pub agent: AgentPresentation,
    /// Cell the editor currently paints with.
    pub brush: Cell,
    /// Draw outlines instead of filled shapes.
    pub wireframe: bool,
}

impl Scene {
    /// Creates a new scene descriptor with the default palette.
    #[must_use]
    pub fn new(
        tile_grid: TileGridPresentation,
        cells: Vec<CellPresentation>,
        agent: AgentPresentation,
        brush: Cell,
        wireframe: bool,
    ) -> Self {
        Self {
            tile_grid,
            palette: CellPalette::default(),
            cells,
            agent,
            brush,
            wireframe,
        }
    }

    /// Height of the entire scene including the brush preview strip.
    #[must_use]
    pub fn total_height(&self) -> f32 {
        self.tile_grid.height() + self.tile_grid.cell_length * 2.0
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting TileMaze scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until the player quits.
    ///
    /// The provided `update_scene` closure receives the frame delta and the
    /// input captured by the adapter, and may mutate the scene before it is
    /// rendered. Backends stop after a frame whose input requested quitting.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq, Eq)]
pub enum RenderingError {
    /// The grid must contain at least one cell.
    EmptyGrid {
        /// Provided column count.
        columns: u32,
        /// Provided row count.
        rows: u32,
    },
    /// Cells must have a positive side length.
    InvalidCellLength,
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyGrid { columns, rows } => {
                write!(f, "grid must contain cells (received {columns}x{rows})")
            }
            Self::InvalidCellLength => write!(f, "cell length must be positive"),
        }
    }
}

impl Error for RenderingError {}

#[cfg(test)]
mod tests {
    use tilemaze_core::WallFlags;

    use super::*;

    fn grid(columns: u32, rows: u32) -> TileGridPresentation {
        TileGridPresentation::new(columns, rows, 10.0, Color::from_rgb_u8(0, 0, 0))
            .expect("valid grid")
    }

    #[test]
    fn tile_grid_rejects_empty_layouts_without_panicking() {
        let error = TileGridPresentation::new(0, 5, 10.0, Color::from_rgb_u8(0, 0, 0))
            .expect_err("zero columns must be rejected");
        assert_eq!(error, RenderingError::EmptyGrid { columns: 0, rows: 5 });

        let error = TileGridPresentation::new(3, 5, 0.0, Color::from_rgb_u8(0, 0, 0))
            .expect_err("zero cell length must be rejected");
        assert_eq!(error, RenderingError::InvalidCellLength);
    }

    #[test]
    fn cell_at_maps_screen_positions_to_cells() {
        let presentation = grid(4, 3);

        assert_eq!(
            presentation.cell_at(Vec2::new(15.0, 29.9)),
            Some(CellCoord::new(1, 2))
        );
        assert_eq!(presentation.cell_at(Vec2::new(40.0, 5.0)), None);
        assert_eq!(presentation.cell_at(Vec2::new(-0.1, 5.0)), None);
    }

    #[test]
    fn cell_origin_scales_by_cell_length() {
        let presentation = grid(4, 3);
        assert_eq!(
            presentation.cell_origin(CellCoord::new(3, 2)),
            Vec2::new(30.0, 20.0)
        );
        assert_eq!(presentation.to_screen(Vec2::new(0.5, 1.0)), Vec2::new(5.0, 10.0));
        assert_eq!((presentation.width(), presentation.height()), (40.0, 30.0));
    }

    #[test]
    fn palette_leaves_blank_cells_unpainted() {
        let palette = CellPalette::default();
        assert!(palette.color_for(CellKind::Blank).is_none());
        assert_eq!(palette.color_for(CellKind::Wall), Some(palette.wall));
    }

    #[test]
    fn lighten_moves_towards_white() {
        let color = Color::new(0.0, 0.5, 1.0, 0.25).lighten(0.5);
        assert_eq!(color, Color::new(0.5, 0.75, 1.0, 0.25));
    }

    #[test]
    fn scene_new_keeps_every_channel() {
        let cells = vec![CellPresentation::new(
            CellCoord::new(1, 1),
            Cell::wall(WallFlags::UP),
        )];
        let agent = AgentPresentation::new(Vec2::new(0.5, 0.0));

        let scene = Scene::new(grid(2, 2), cells.clone(), agent, Cell::blank(), true);

        assert_eq!(scene.cells, cells);
        assert_eq!(scene.agent, agent);
        assert_eq!(scene.brush, Cell::blank());
        assert!(scene.wireframe);
        assert_eq!(scene.palette, CellPalette::default());
        assert_eq!(scene.total_height(), 40.0);
    }
}
