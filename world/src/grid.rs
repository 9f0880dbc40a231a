use tilemaze_core::{Cell, CellCoord, CellKind, EditError, MapImage, TileGridView, WallFlags};

use crate::walls;

/// Authoritative cell arena addressed by `(column, row)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileGrid {
    columns: u32,
    rows: u32,
    cells: Vec<Cell>,
}

impl TileGrid {
    /// Creates a blank grid.
    ///
    /// # Panics
    ///
    /// Panics when either dimension is zero; a grid without cells indicates a
    /// broken caller rather than bad data.
    #[must_use]
    pub fn new(columns: u32, rows: u32) -> Self {
        assert!(
            columns > 0 && rows > 0,
            "tile grid dimensions must be positive (received {columns}x{rows})"
        );
        let count = usize::try_from(u64::from(columns) * u64::from(rows))
            .expect("tile grid cell count fits in memory");
        Self {
            columns,
            rows,
            cells: vec![Cell::blank(); count],
        }
    }

    /// Rebuilds a grid from a saved image, keeping every cell's flags as stored.
    #[must_use]
    pub fn from_image(image: &MapImage) -> Self {
        let mut grid = Self::new(image.columns(), image.rows());
        for (coord, cell) in image.iter() {
            if let Some(index) = grid.index(coord) {
                grid.cells[index] = cell;
            }
        }
        grid
    }

    /// Captures the grid as an image in persisted cell order.
    #[must_use]
    pub fn to_image(&self) -> MapImage {
        let mut image = MapImage::blank(self.columns, self.rows)
            .expect("tile grid dimensions are always positive");
        for (coord, cell) in self.view().iter() {
            let _ = image.set_cell(coord, cell);
        }
        image
    }

    /// Number of columns contained in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows contained in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Cell stored at the coordinate, if it lies inside the grid.
    #[must_use]
    pub fn cell(&self, coord: CellCoord) -> Option<Cell> {
        self.index(coord).map(|index| self.cells[index])
    }

    /// Read-only view used by systems and renderers.
    #[must_use]
    pub fn view(&self) -> TileGridView<'_> {
        TileGridView::new(&self.cells, self.columns, self.rows)
    }

    /// Overwrites a cell and reconciles wall connections around it.
    ///
    /// Auto walls and non-wall kinds trigger neighbour resolution; a wall with
    /// explicit flags is stored as given and leaves neighbours untouched.
    /// Returns the edited cell's final contents.
    pub fn edit(
        &mut self,
        coord: CellCoord,
        kind: CellKind,
        flags: WallFlags,
    ) -> Result<Cell, EditError> {
        let index = self.index(coord).ok_or(EditError::OutOfBounds)?;
        let cell = Cell::new(kind, flags);
        self.cells[index] = cell;
        if walls::requires_resolution(cell) {
            walls::resolve(self, coord);
        }
        Ok(self.cells[index])
    }

    /// Cell where the agent should appear: the first spawn point, otherwise the
    /// first legacy player marker, scanning row by row.
    #[must_use]
    pub fn spawn_cell(&self) -> Option<CellCoord> {
        self.find(CellKind::PlayerSpawn)
            .or_else(|| self.find(CellKind::PlayerMarker))
    }

    fn find(&self, kind: CellKind) -> Option<CellCoord> {
        self.view()
            .iter()
            .find(|(_, cell)| cell.kind() == kind)
            .map(|(coord, _)| coord)
    }

    pub(crate) fn index(&self, coord: CellCoord) -> Option<usize> {
        if !coord.is_within(self.columns, self.rows) {
            return None;
        }
        let row = usize::try_from(coord.row()).ok()?;
        let column = usize::try_from(coord.column()).ok()?;
        let width = usize::try_from(self.columns).ok()?;
        Some(row * width + column)
    }

    pub(crate) fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }
}
