use std::{fmt, path::Path};

use serde::Serialize;
use tilemaze_core::{CellKind, MapImage};
use tilemaze_persistence::MapFormat;
use tilemaze_world::TileGrid;

/// Summary of a map file printed by `tilemaze inspect`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub(crate) struct MapSummary {
    pub(crate) path: String,
    pub(crate) format: &'static str,
    pub(crate) columns: u32,
    pub(crate) rows: u32,
    pub(crate) spawn: Option<[u32; 2]>,
    pub(crate) kinds: Vec<KindCount>,
}

/// Number of cells holding one kind.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub(crate) struct KindCount {
    pub(crate) kind: &'static str,
    pub(crate) count: usize,
}

impl MapSummary {
    pub(crate) fn new(path: &Path, format: MapFormat, image: &MapImage) -> Self {
        let kinds = CellKind::ALL
            .into_iter()
            .map(|kind| KindCount {
                kind: kind_name(kind),
                count: image
                    .cells()
                    .iter()
                    .filter(|cell| cell.kind() == kind)
                    .count(),
            })
            .collect();
        let spawn = TileGrid::from_image(image)
            .spawn_cell()
            .map(|cell| [cell.column(), cell.row()]);

        Self {
            path: path.display().to_string(),
            format: format.extension(),
            columns: image.columns(),
            rows: image.rows(),
            spawn,
            kinds,
        }
    }
}

impl fmt::Display for MapSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ({})", self.path, self.format)?;
        writeln!(f, "size: {}x{}", self.columns, self.rows)?;
        match self.spawn {
            Some([column, row]) => writeln!(f, "spawn: {column},{row}")?,
            None => writeln!(f, "spawn: none")?,
        }
        for KindCount { kind, count } in &self.kinds {
            writeln!(f, "{kind:>13}: {count}")?;
        }
        Ok(())
    }
}

const fn kind_name(kind: CellKind) -> &'static str {
    match kind {
        CellKind::Blank => "blank",
        CellKind::Wall => "wall",
        CellKind::Dot => "dot",
        CellKind::DotBig => "dot_big",
        CellKind::PlayerSpawn => "player_spawn",
        CellKind::PlayerMarker => "player_marker",
    }
}
