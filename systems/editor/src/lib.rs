#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure editor system that turns brush input into cell edit commands.

use tilemaze_core::{Cell, CellCoord, CellKind, Command, EditorCommand, WallFlags};

/// Cell contents the editor paints with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Brush {
    cell: Cell,
}

impl Brush {
    /// Creates a brush; flags are discarded for non-wall kinds.
    #[must_use]
    pub const fn new(kind: CellKind, flags: WallFlags) -> Self {
        Self {
            cell: Cell::new(kind, flags),
        }
    }

    /// Kind painted by the brush.
    #[must_use]
    pub const fn kind(&self) -> CellKind {
        self.cell.kind()
    }

    /// Wall flags painted by the brush.
    #[must_use]
    pub const fn flags(&self) -> WallFlags {
        self.cell.flags()
    }

    /// Cell the brush would paint.
    #[must_use]
    pub const fn cell(&self) -> Cell {
        self.cell
    }

    /// Returns the brush produced by applying `command` to this one.
    #[must_use]
    pub fn apply(self, command: EditorCommand) -> Self {
        match command {
            EditorCommand::ToggleWallSide(direction) => {
                let mut flags = self.flags();
                flags.toggle(direction);
                if flags.is_empty() {
                    Self::default()
                } else {
                    Self::new(CellKind::Wall, flags)
                }
            }
            EditorCommand::ToggleAutoWall => {
                if self.cell.is_auto_wall() {
                    Self::default()
                } else {
                    Self::new(CellKind::Wall, WallFlags::EMPTY)
                }
            }
            EditorCommand::ToggleDot => self.toggle_kind(CellKind::Dot),
            EditorCommand::ToggleBigDot => self.toggle_kind(CellKind::DotBig),
            EditorCommand::ToggleSpawn => self.toggle_kind(CellKind::PlayerSpawn),
            EditorCommand::ClearBrush => Self::default(),
        }
    }

    fn toggle_kind(self, kind: CellKind) -> Self {
        if self.kind() == kind {
            Self::default()
        } else {
            Self::new(kind, WallFlags::EMPTY)
        }
    }
}

/// Input snapshot distilled from adapter-provided frame input data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EditorInput<'a> {
    /// Brush edits requested on this frame, in the order they were issued.
    pub commands: &'a [EditorCommand],
    /// Cell under the cursor while the paint button is held.
    pub paint_cell: Option<CellCoord>,
    /// Cell under the cursor while the erase button is held.
    pub erase_cell: Option<CellCoord>,
}

/// Editor system that owns the brush and emits cell edit commands.
#[derive(Clone, Debug, Default)]
pub struct Editor {
    brush: Brush,
}

impl Editor {
    /// Creates a new editor holding a blank brush.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            brush: Brush::new(CellKind::Blank, WallFlags::EMPTY),
        }
    }

    /// Brush that painting currently applies.
    #[must_use]
    pub const fn brush(&self) -> Brush {
        self.brush
    }

    /// Updates the brush from the frame's editor commands, then emits edits
    /// for the painted and erased cells.
    pub fn handle(&mut self, input: &EditorInput<'_>, out: &mut Vec<Command>) {
        for command in input.commands {
            self.brush = self.brush.apply(*command);
        }

        if let Some(cell) = input.paint_cell {
            out.push(Command::EditCell {
                cell,
                kind: self.brush.kind(),
                flags: self.brush.flags(),
            });
        }

        if let Some(cell) = input.erase_cell {
            out.push(Command::EditCell {
                cell,
                kind: CellKind::Blank,
                flags: WallFlags::EMPTY,
            });
        }
    }
}
