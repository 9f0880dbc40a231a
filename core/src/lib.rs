#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the TileMaze engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to. Systems consume event streams, query immutable views such as
//! [`TileGridView`], and respond exclusively with new command batches.

use std::{
    error::Error,
    fmt,
    ops::{BitOr, BitOrAssign},
    time::Duration,
};

use serde::{Deserialize, Serialize};

/// Title shown by adapters that open a window.
pub const WINDOW_TITLE: &str = "TileMaze";

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Replaces the world's tile grid with a blank grid of the provided size.
    ConfigureTileGrid {
        /// Number of columns laid out in the grid. Must be positive.
        columns: u32,
        /// Number of rows laid out in the grid. Must be positive.
        rows: u32,
    },
    /// Overrides the speed at which the agent travels between cells.
    ConfigureAgentSpeed {
        /// Travel speed measured in cells per second.
        cells_per_second: f32,
    },
    /// Overwrites a single cell and reconciles the surrounding wall connections.
    EditCell {
        /// Cell targeted by the edit.
        cell: CellCoord,
        /// Kind the cell should adopt.
        kind: CellKind,
        /// Connection flags requested for the cell. Ignored for non-wall kinds.
        flags: WallFlags,
    },
    /// Replaces the whole tile grid with a previously saved image.
    LoadMap {
        /// Decoded map snapshot that becomes the new grid.
        image: MapImage,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that an idle agent begin a single-cell move.
    StepAgent {
        /// Direction of travel for the requested move.
        heading: Intent,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that a blank grid replaced the previous one.
    TileGridConfigured {
        /// Number of columns in the new grid.
        columns: u32,
        /// Number of rows in the new grid.
        rows: u32,
    },
    /// Confirms that a saved map replaced the previous grid.
    MapLoaded {
        /// Number of columns in the loaded grid.
        columns: u32,
        /// Number of rows in the loaded grid.
        rows: u32,
        /// Cell the agent was placed on after loading.
        spawn: CellCoord,
    },
    /// Confirms that a cell edit was applied.
    CellEdited {
        /// Cell that received the edit.
        cell: CellCoord,
        /// Cell contents after wall connections were reconciled.
        contents: Cell,
    },
    /// Reports that a cell edit was rejected without touching the grid.
    CellEditRejected {
        /// Cell named by the rejected edit.
        cell: CellCoord,
        /// Specific reason the edit failed.
        reason: EditError,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that the agent left its cell toward a neighbour.
    AgentMoveStarted {
        /// Cell the agent is leaving.
        from: CellCoord,
        /// Cell the agent is travelling to.
        to: CellCoord,
    },
    /// Reports that a step request was suppressed.
    AgentStepRejected {
        /// Specific reason the step was not started.
        reason: MoveError,
    },
    /// Confirms that the agent reached the target of its move.
    AgentArrived {
        /// Cell the agent now occupies.
        cell: CellCoord,
    },
}

/// Cardinal directions used for wall connections and single-cell steps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Toward decreasing row indices.
    Up,
    /// Toward increasing row indices.
    Down,
    /// Toward decreasing column indices.
    Left,
    /// Toward increasing column indices.
    Right,
}

impl Direction {
    /// Every direction in the fixed order used when visiting neighbours.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Returns the direction pointing the other way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Column and row delta of a single step in this direction.
    #[must_use]
    pub const fn delta(self) -> (i8, i8) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }
}

/// Four-bit mask recording which sides of a wall join an adjacent wall.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WallFlags(u8);

impl WallFlags {
    /// No connections.
    pub const EMPTY: Self = Self(0);
    /// Connected to the wall above.
    pub const UP: Self = Self(0x1);
    /// Connected to the wall below.
    pub const DOWN: Self = Self(0x2);
    /// Connected to the wall on the left.
    pub const LEFT: Self = Self(0x4);
    /// Connected to the wall on the right.
    pub const RIGHT: Self = Self(0x8);
    /// Connected on every side.
    pub const ALL: Self = Self(0xF);

    /// Builds a mask from raw bits, rejecting bits outside the four directions.
    #[must_use]
    pub const fn from_bits(bits: u16) -> Option<Self> {
        if bits & !(Self::ALL.0 as u16) != 0 {
            None
        } else {
            Some(Self(bits as u8))
        }
    }

    /// Builds a mask from raw bits, discarding bits outside the four directions.
    #[must_use]
    pub const fn from_bits_truncate(bits: u8) -> Self {
        Self(bits & Self::ALL.0)
    }

    /// Mask containing only the bit for the provided direction.
    #[must_use]
    pub const fn from_direction(direction: Direction) -> Self {
        match direction {
            Direction::Up => Self::UP,
            Direction::Down => Self::DOWN,
            Direction::Left => Self::LEFT,
            Direction::Right => Self::RIGHT,
        }
    }

    /// Raw bit representation.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Returns `true` when no connection bit is set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` when the bit for `direction` is set.
    #[must_use]
    pub const fn contains(self, direction: Direction) -> bool {
        self.0 & Self::from_direction(direction).0 != 0
    }

    /// Sets the bit for `direction`.
    pub fn insert(&mut self, direction: Direction) {
        self.0 |= Self::from_direction(direction).0;
    }

    /// Clears the bit for `direction`.
    pub fn remove(&mut self, direction: Direction) {
        self.0 &= !Self::from_direction(direction).0;
    }

    /// Flips the bit for `direction`.
    pub fn toggle(&mut self, direction: Direction) {
        self.0 ^= Self::from_direction(direction).0;
    }

    /// Iterates the directions whose bits are set, in neighbour order.
    pub fn directions(self) -> impl Iterator<Item = Direction> {
        Direction::ALL
            .into_iter()
            .filter(move |direction| self.contains(*direction))
    }
}

impl BitOr for WallFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for WallFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Kinds of content a cell may hold.
///
/// The declaration order defines the ordinal written by the binary map format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellKind {
    /// Empty floor.
    #[default]
    Blank,
    /// Impassable wall segment.
    Wall,
    /// Collectable dot.
    Dot,
    /// Collectable power dot.
    DotBig,
    /// Location where the agent appears when a map is loaded.
    PlayerSpawn,
    /// Legacy marker recording where the agent stood when the map was saved.
    PlayerMarker,
}

impl CellKind {
    /// Every kind in ordinal order.
    pub const ALL: [CellKind; 6] = [
        CellKind::Blank,
        CellKind::Wall,
        CellKind::Dot,
        CellKind::DotBig,
        CellKind::PlayerSpawn,
        CellKind::PlayerMarker,
    ];

    /// Ordinal persisted by the binary map format.
    #[must_use]
    pub const fn ordinal(self) -> u16 {
        match self {
            Self::Blank => 0,
            Self::Wall => 1,
            Self::Dot => 2,
            Self::DotBig => 3,
            Self::PlayerSpawn => 4,
            Self::PlayerMarker => 5,
        }
    }

    /// Resolves a persisted ordinal back into a kind.
    #[must_use]
    pub const fn from_ordinal(ordinal: u16) -> Option<Self> {
        match ordinal {
            0 => Some(Self::Blank),
            1 => Some(Self::Wall),
            2 => Some(Self::Dot),
            3 => Some(Self::DotBig),
            4 => Some(Self::PlayerSpawn),
            5 => Some(Self::PlayerMarker),
            _ => None,
        }
    }
}

/// Contents of a single grid cell.
///
/// Connection flags only exist on walls; every other kind carries an empty
/// mask.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    kind: CellKind,
    flags: WallFlags,
}

impl Cell {
    /// Creates a cell, discarding flags for non-wall kinds.
    #[must_use]
    pub const fn new(kind: CellKind, flags: WallFlags) -> Self {
        let flags = match kind {
            CellKind::Wall => flags,
            _ => WallFlags::EMPTY,
        };
        Self { kind, flags }
    }

    /// Empty floor cell.
    #[must_use]
    pub const fn blank() -> Self {
        Self::new(CellKind::Blank, WallFlags::EMPTY)
    }

    /// Wall cell with the provided connection flags.
    #[must_use]
    pub const fn wall(flags: WallFlags) -> Self {
        Self::new(CellKind::Wall, flags)
    }

    /// Kind of content held by the cell.
    #[must_use]
    pub const fn kind(&self) -> CellKind {
        self.kind
    }

    /// Connection flags of the cell; always empty for non-wall kinds.
    #[must_use]
    pub const fn flags(&self) -> WallFlags {
        self.flags
    }

    /// Returns `true` for wall cells.
    #[must_use]
    pub const fn is_wall(&self) -> bool {
        matches!(self.kind, CellKind::Wall)
    }

    /// Returns `true` for a wall without explicit flags, whose connections are
    /// inferred from neighbouring walls.
    #[must_use]
    pub const fn is_auto_wall(&self) -> bool {
        self.is_wall() && self.flags.is_empty()
    }

    /// Marks the wall as joined to its neighbour in `direction`.
    ///
    /// Has no effect on non-wall cells.
    pub fn connect(&mut self, direction: Direction) {
        if self.is_wall() {
            self.flags.insert(direction);
        }
    }

    /// Marks the wall as detached from its neighbour in `direction`.
    pub fn disconnect(&mut self, direction: Direction) {
        self.flags.remove(direction);
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
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

    /// Returns `true` when the cell lies inside a grid of the given size.
    #[must_use]
    pub const fn is_within(&self, columns: u32, rows: u32) -> bool {
        self.column < columns && self.row < rows
    }

    /// Applies `intent` to the coordinate, returning `None` when the result
    /// leaves a grid of the given size.
    #[must_use]
    pub fn offset(self, intent: Intent, columns: u32, rows: u32) -> Option<Self> {
        let column = self.column.checked_add_signed(i32::from(intent.column()))?;
        let row = self.row.checked_add_signed(i32::from(intent.row()))?;
        let candidate = Self::new(column, row);
        candidate.is_within(columns, rows).then_some(candidate)
    }

    /// Neighbouring cell in `direction`, if it lies inside the grid.
    #[must_use]
    pub fn neighbor(self, direction: Direction, columns: u32, rows: u32) -> Option<Self> {
        self.offset(Intent::from(direction), columns, rows)
    }
}

/// Desired movement expressed as per-axis components in `{-1, 0, 1}`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Intent {
    column: i8,
    row: i8,
}

impl Intent {
    /// No movement requested.
    pub const NONE: Self = Self { column: 0, row: 0 };

    /// Creates an intent, reducing each component to its sign.
    #[must_use]
    pub const fn new(column: i8, row: i8) -> Self {
        Self {
            column: column.signum(),
            row: row.signum(),
        }
    }

    /// Column component.
    #[must_use]
    pub const fn column(&self) -> i8 {
        self.column
    }

    /// Row component.
    #[must_use]
    pub const fn row(&self) -> i8 {
        self.row
    }

    /// Returns `true` when neither axis requests movement.
    #[must_use]
    pub const fn is_none(&self) -> bool {
        self.column == 0 && self.row == 0
    }
}

impl From<Direction> for Intent {
    fn from(direction: Direction) -> Self {
        let (column, row) = direction.delta();
        Self::new(column, row)
    }
}

/// Continuous position used to interpolate the agent between cells.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AgentPosition {
    /// Position along the column axis measured in cells.
    pub column: f32,
    /// Position along the row axis measured in cells.
    pub row: f32,
}

impl AgentPosition {
    /// Position resting exactly on the provided cell.
    #[must_use]
    pub fn at_cell(cell: CellCoord) -> Self {
        Self {
            column: cell.column() as f32,
            row: cell.row() as f32,
        }
    }
}

/// Whole-grid snapshot exchanged with map files.
///
/// Cells are stored column by column (`column * rows + row`), matching the
/// order both persisted formats use.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MapImage {
    columns: u32,
    rows: u32,
    cells: Vec<Cell>,
}

impl MapImage {
    /// Assembles an image from cells listed column by column.
    ///
    /// Returns `None` when either dimension is zero or the cell count does not
    /// match the dimensions.
    #[must_use]
    pub fn from_cells(columns: u32, rows: u32, cells: Vec<Cell>) -> Option<Self> {
        if columns == 0 || rows == 0 {
            return None;
        }
        let expected = u64::from(columns) * u64::from(rows);
        if u64::try_from(cells.len()).ok()? != expected {
            return None;
        }
        Some(Self {
            columns,
            rows,
            cells,
        })
    }

    /// Image of the given size filled with blank cells.
    #[must_use]
    pub fn blank(columns: u32, rows: u32) -> Option<Self> {
        let count = usize::try_from(u64::from(columns) * u64::from(rows)).ok()?;
        Self::from_cells(columns, rows, vec![Cell::blank(); count])
    }

    /// Number of columns in the image.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows in the image.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Cells in persisted order.
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Cell stored at the provided coordinate.
    #[must_use]
    pub fn cell(&self, coord: CellCoord) -> Option<Cell> {
        self.index(coord)
            .and_then(|index| self.cells.get(index).copied())
    }

    /// Overwrites the cell stored at the provided coordinate.
    ///
    /// Returns `false` when the coordinate lies outside the image.
    pub fn set_cell(&mut self, coord: CellCoord, cell: Cell) -> bool {
        match self.index(coord).and_then(|index| self.cells.get_mut(index)) {
            Some(slot) => {
                *slot = cell;
                true
            }
            None => false,
        }
    }

    /// Iterates every coordinate and cell in persisted order.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, Cell)> + '_ {
        let rows = self.rows;
        self.cells.iter().enumerate().map(move |(index, cell)| {
            let index = index as u64;
            let column = (index / u64::from(rows)) as u32;
            let row = (index % u64::from(rows)) as u32;
            (CellCoord::new(column, row), *cell)
        })
    }

    fn index(&self, coord: CellCoord) -> Option<usize> {
        if !coord.is_within(self.columns, self.rows) {
            return None;
        }
        let column = usize::try_from(coord.column()).ok()?;
        let row = usize::try_from(coord.row()).ok()?;
        let rows = usize::try_from(self.rows).ok()?;
        Some(column * rows + row)
    }
}

/// Read-only view into the authoritative tile grid.
#[derive(Clone, Copy, Debug)]
pub struct TileGridView<'a> {
    cells: &'a [Cell],
    columns: u32,
    rows: u32,
}

impl<'a> TileGridView<'a> {
    /// Captures a view backed by cells stored row by row.
    #[must_use]
    pub fn new(cells: &'a [Cell], columns: u32, rows: u32) -> Self {
        Self {
            cells,
            columns,
            rows,
        }
    }

    /// Provides the dimensions of the underlying grid.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    /// Returns the cell stored at the coordinate, if it lies inside the grid.
    #[must_use]
    pub fn cell(&self, coord: CellCoord) -> Option<Cell> {
        self.index(coord)
            .and_then(|index| self.cells.get(index).copied())
    }

    /// Reports whether the agent may enter the cell.
    #[must_use]
    pub fn is_walkable(&self, coord: CellCoord) -> bool {
        self.cell(coord).is_some_and(|cell| !cell.is_wall())
    }

    /// Iterates every coordinate and cell row by row.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, Cell)> + 'a {
        let columns = self.columns.max(1);
        self.cells.iter().enumerate().map(move |(index, cell)| {
            let index = index as u64;
            let column = (index % u64::from(columns)) as u32;
            let row = (index / u64::from(columns)) as u32;
            (CellCoord::new(column, row), *cell)
        })
    }

    fn index(&self, coord: CellCoord) -> Option<usize> {
        if !coord.is_within(self.columns, self.rows) {
            return None;
        }
        let row = usize::try_from(coord.row()).ok()?;
        let column = usize::try_from(coord.column()).ok()?;
        let width = usize::try_from(self.columns).ok()?;
        Some(row * width + column)
    }
}

/// Immutable representation of the agent's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AgentSnapshot {
    /// Cell the agent occupies, or is leaving while a move is underway.
    pub cell: CellCoord,
    /// Destination of the in-flight move, if any.
    pub target: Option<CellCoord>,
    /// Heading of the in-flight move; [`Intent::NONE`] while idle.
    pub heading: Intent,
    /// Interpolated position used for rendering.
    pub position: AgentPosition,
}

impl AgentSnapshot {
    /// Returns `true` while a move is in flight.
    #[must_use]
    pub const fn is_moving(&self) -> bool {
        self.target.is_some()
    }
}

/// Brush edits issued by the editor's input bindings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EditorCommand {
    /// Flips the connection on one side of the wall brush.
    ToggleWallSide(Direction),
    /// Switches between auto wall, explicit wall, and no wall.
    ToggleAutoWall,
    /// Switches the brush between a dot and a blank cell.
    ToggleDot,
    /// Switches the brush between a power dot and a blank cell.
    ToggleBigDot,
    /// Switches the brush between a spawn point and a blank cell.
    ToggleSpawn,
    /// Resets the brush to a blank cell.
    ClearBrush,
}

/// Reasons a cell edit may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EditError {
    /// The requested cell lies outside the grid.
    OutOfBounds,
}

impl fmt::Display for EditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfBounds => write!(f, "cell lies outside the tile grid"),
        }
    }
}

impl Error for EditError {}

/// Reasons a step request may be suppressed by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MoveError {
    /// A move is already in flight.
    Busy,
    /// The step did not name a direction.
    NoHeading,
    /// The destination lies outside the grid.
    OutOfBounds,
    /// The destination is a wall.
    Blocked,
}

impl fmt::Display for MoveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Busy => write!(f, "agent is already moving"),
            Self::NoHeading => write!(f, "step request has no heading"),
            Self::OutOfBounds => write!(f, "destination lies outside the tile grid"),
            Self::Blocked => write!(f, "destination is a wall"),
        }
    }
}

impl Error for MoveError {}
