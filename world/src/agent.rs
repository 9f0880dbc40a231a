use std::time::Duration;

use tilemaze_core::{AgentPosition, AgentSnapshot, CellCoord, Intent};

#[derive(Clone, Copy, Debug, PartialEq)]
struct Motion {
    target: CellCoord,
    heading: Intent,
}

/// Single agent travelling cell to cell with interpolated rendering position.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Agent {
    cell: CellCoord,
    motion: Option<Motion>,
    position: AgentPosition,
}

impl Agent {
    pub(crate) fn spawn_at(cell: CellCoord) -> Self {
        Self {
            cell,
            motion: None,
            position: AgentPosition::at_cell(cell),
        }
    }

    pub(crate) fn cell(&self) -> CellCoord {
        self.cell
    }

    pub(crate) fn is_moving(&self) -> bool {
        self.motion.is_some()
    }

    pub(crate) fn begin_move(&mut self, target: CellCoord, heading: Intent) {
        self.motion = Some(Motion { target, heading });
    }

    /// Moves the agent toward its target, snapping onto the target once the
    /// remaining distance is covered. Returns the reached cell on arrival.
    pub(crate) fn advance(&mut self, dt: Duration, cells_per_second: f32) -> Option<CellCoord> {
        let motion = self.motion?;
        let column_heading = f32::from(motion.heading.column());
        let row_heading = f32::from(motion.heading.row());
        let target = AgentPosition::at_cell(motion.target);

        let remaining = ((target.column - self.position.column) * column_heading)
            .max((target.row - self.position.row) * row_heading);
        let step = cells_per_second.max(0.0) * dt.as_secs_f32();

        if remaining > step {
            self.position.column += column_heading * step;
            self.position.row += row_heading * step;
            return None;
        }

        self.position = target;
        self.cell = motion.target;
        self.motion = None;
        Some(motion.target)
    }

    pub(crate) fn snapshot(&self) -> AgentSnapshot {
        AgentSnapshot {
            cell: self.cell,
            target: self.motion.map(|motion| motion.target),
            heading: self.motion.map_or(Intent::NONE, |motion| motion.heading),
            position: self.position,
        }
    }
}
