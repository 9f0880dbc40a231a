//! Wall connection reconciliation applied after single-cell edits.

use tilemaze_core::{Cell, CellCoord, Direction};

use crate::grid::TileGrid;

/// Reports whether an edit that produced `cell` must reconcile its neighbours.
///
/// Walls carrying explicit flags are authoritative and never trigger
/// resolution.
pub(crate) fn requires_resolution(cell: Cell) -> bool {
    cell.is_auto_wall() || !cell.is_wall()
}

/// Reconciles connection bits between the cell at `origin` and its walls.
///
/// An auto wall links itself to every adjacent wall and makes each of them
/// link back. Any other cell detaches adjacent walls from itself. Neighbours
/// are visited Up, Down, Left, Right and cells beyond the grid edge are
/// skipped.
pub(crate) fn resolve(grid: &mut TileGrid, origin: CellCoord) {
    let Some(origin_index) = grid.index(origin) else {
        return;
    };
    let (columns, rows) = (grid.columns(), grid.rows());
    let neighbours: Vec<(Direction, usize)> = Direction::ALL
        .into_iter()
        .filter_map(|direction| {
            let coord = origin.neighbor(direction, columns, rows)?;
            grid.index(coord).map(|index| (direction, index))
        })
        .collect();

    let cells = grid.cells_mut();
    let auto_mode = cells[origin_index].is_auto_wall();

    for (direction, neighbour_index) in neighbours {
        if !cells[neighbour_index].is_wall() {
            continue;
        }

        if auto_mode {
            cells[origin_index].connect(direction);
            cells[neighbour_index].connect(direction.opposite());
        } else {
            cells[neighbour_index].disconnect(direction.opposite());
        }
    }
}

#[cfg(test)]
mod tests {
    use tilemaze_core::{CellKind, WallFlags};

    use super::*;

    fn wall_at(grid: &mut TileGrid, column: u32, row: u32, flags: WallFlags) {
        let _ = grid
            .edit(CellCoord::new(column, row), CellKind::Wall, flags)
            .expect("inside grid");
    }

    fn flags_at(grid: &TileGrid, column: u32, row: u32) -> WallFlags {
        grid.cell(CellCoord::new(column, row))
            .expect("inside grid")
            .flags()
    }

    #[test]
    fn auto_wall_links_with_existing_neighbour() {
        let mut grid = TileGrid::new(2, 1);
        wall_at(&mut grid, 0, 0, WallFlags::EMPTY);
        wall_at(&mut grid, 1, 0, WallFlags::EMPTY);

        assert_eq!(flags_at(&grid, 0, 0), WallFlags::RIGHT);
        assert_eq!(flags_at(&grid, 1, 0), WallFlags::LEFT);
    }

    #[test]
    fn auto_wall_links_every_side_and_keeps_neighbour_bits() {
        let mut grid = TileGrid::new(3, 3);
        wall_at(&mut grid, 1, 0, WallFlags::LEFT | WallFlags::RIGHT);
        wall_at(&mut grid, 1, 2, WallFlags::EMPTY);
        wall_at(&mut grid, 0, 1, WallFlags::EMPTY);
        wall_at(&mut grid, 2, 1, WallFlags::EMPTY);

        wall_at(&mut grid, 1, 1, WallFlags::EMPTY);

        assert_eq!(flags_at(&grid, 1, 1), WallFlags::ALL);
        assert_eq!(
            flags_at(&grid, 1, 0),
            WallFlags::LEFT | WallFlags::RIGHT | WallFlags::DOWN
        );
        assert_eq!(flags_at(&grid, 1, 2), WallFlags::UP);
        assert_eq!(flags_at(&grid, 0, 1), WallFlags::RIGHT);
        assert_eq!(flags_at(&grid, 2, 1), WallFlags::LEFT);
    }

    #[test]
    fn lone_auto_wall_stays_auto() {
        let mut grid = TileGrid::new(3, 3);
        let _ = grid
            .edit(CellCoord::new(0, 1), CellKind::Dot, WallFlags::EMPTY)
            .expect("inside grid");
        wall_at(&mut grid, 1, 1, WallFlags::EMPTY);

        assert!(grid
            .cell(CellCoord::new(1, 1))
            .expect("inside grid")
            .is_auto_wall());
    }

    #[test]
    fn removing_wall_detaches_only_adjacent_walls() {
        let mut grid = TileGrid::new(4, 1);
        wall_at(&mut grid, 0, 0, WallFlags::EMPTY);
        wall_at(&mut grid, 1, 0, WallFlags::EMPTY);
        wall_at(&mut grid, 2, 0, WallFlags::EMPTY);
        wall_at(&mut grid, 3, 0, WallFlags::EMPTY);
        assert_eq!(flags_at(&grid, 3, 0), WallFlags::LEFT);

        let _ = grid
            .edit(CellCoord::new(1, 0), CellKind::Blank, WallFlags::EMPTY)
            .expect("inside grid");

        assert_eq!(flags_at(&grid, 0, 0), WallFlags::EMPTY);
        assert_eq!(flags_at(&grid, 2, 0), WallFlags::RIGHT);
        assert_eq!(flags_at(&grid, 3, 0), WallFlags::LEFT);
    }

    #[test]
    fn explicit_wall_leaves_neighbours_alone() {
        let mut grid = TileGrid::new(2, 1);
        wall_at(&mut grid, 0, 0, WallFlags::UP);

        wall_at(&mut grid, 1, 0, WallFlags::DOWN);

        assert_eq!(flags_at(&grid, 0, 0), WallFlags::UP);
        assert_eq!(flags_at(&grid, 1, 0), WallFlags::DOWN);
    }

    #[test]
    fn resolution_policy_matches_cell_contents() {
        assert!(requires_resolution(Cell::wall(WallFlags::EMPTY)));
        assert!(requires_resolution(Cell::blank()));
        assert!(!requires_resolution(Cell::wall(WallFlags::DOWN)));
    }
}
