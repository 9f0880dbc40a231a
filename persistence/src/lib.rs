#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Map persistence for TileMaze.
//!
//! Two on-disk generations exist: the legacy hex text format (`.pmap`) and the
//! binary format (`.tmap`). Each has its own module and both exchange whole
//! grids as [`MapImage`] values; nothing here touches the live world.

mod binary;
mod legacy;

use std::{
    ffi::OsString,
    fs, io,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tilemaze_core::MapImage;
use tracing::{debug, info};

/// Saved-map generations understood by the codec.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MapFormat {
    /// Hex text format with a trailing movement-map section.
    Legacy,
    /// Little-endian binary format introduced by the `tmap` magic.
    Binary,
}

impl MapFormat {
    /// File extension associated with the format, without the leading dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Legacy => "pmap",
            Self::Binary => "tmap",
        }
    }

    /// Chooses a format from the path's extension, if it names one.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?;
        [Self::Legacy, Self::Binary]
            .into_iter()
            .find(|format| extension.eq_ignore_ascii_case(format.extension()))
    }

    /// Guesses the format of raw map bytes from their leading magic.
    #[must_use]
    pub fn detect(bytes: &[u8]) -> Self {
        if bytes.starts_with(binary::MAGIC) {
            Self::Binary
        } else {
            Self::Legacy
        }
    }
}

/// Failures raised while reading or writing map files.
#[derive(Debug, Error)]
pub enum MapCodecError {
    /// The map file could not be read or written.
    #[error("could not access map file `{}`", path.display())]
    Io {
        /// File that was being accessed.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// The data ended before its header was complete.
    #[error("map data is truncated: header needs {expected} bytes but only {actual} are present")]
    Truncated {
        /// Number of bytes the header requires.
        expected: usize,
        /// Number of bytes actually present.
        actual: usize,
    },
    /// Binary data did not start with the `tmap` magic.
    #[error("map data does not start with the `tmap` magic")]
    BadMagic,
    /// Legacy data contained a character outside `0-9a-fA-F`.
    #[error("legacy map holds a non-hex character at offset {offset}")]
    NotHex {
        /// Byte offset of the offending character.
        offset: usize,
    },
    /// The body length disagreed with the declared dimensions.
    #[error("map data holds {actual} bytes where its dimensions require {expected}")]
    LengthMismatch {
        /// Length implied by the header.
        expected: u64,
        /// Length actually present.
        actual: u64,
    },
    /// The header declared a grid without cells.
    #[error("map dimensions must be positive (received {columns}x{rows})")]
    EmptyGrid {
        /// Declared column count.
        columns: u32,
        /// Declared row count.
        rows: u32,
    },
    /// The grid cannot be expressed by the legacy format's one-byte dimensions.
    #[error("legacy maps hold at most 255 columns and rows (received {columns}x{rows})")]
    DimensionsTooLarge {
        /// Column count of the rejected grid.
        columns: u32,
        /// Row count of the rejected grid.
        rows: u32,
    },
    /// A binary cell named a kind ordinal that does not exist.
    #[error("cell {index} has unknown kind ordinal {ordinal}")]
    UnknownCellKind {
        /// Position of the cell in persisted order.
        index: usize,
        /// Ordinal read from the file.
        ordinal: u16,
    },
    /// A binary cell carried flag bits outside the four directions.
    #[error("cell {index} has wall flags {flags:#06x} outside the four directions")]
    InvalidWallFlags {
        /// Position of the cell in persisted order.
        index: usize,
        /// Flags read from the file.
        flags: u16,
    },
}

/// Serialises an image in the requested format.
pub fn encode(image: &MapImage, format: MapFormat) -> Result<Vec<u8>, MapCodecError> {
    match format {
        MapFormat::Legacy => legacy::encode(image),
        MapFormat::Binary => Ok(binary::encode(image)),
    }
}

/// Parses map bytes stored in the requested format.
pub fn decode(bytes: &[u8], format: MapFormat) -> Result<MapImage, MapCodecError> {
    match format {
        MapFormat::Legacy => legacy::decode(bytes),
        MapFormat::Binary => binary::decode(bytes),
    }
}

/// Appends the format's extension unless the path already carries it.
#[must_use]
pub fn path_with_extension(path: &Path, format: MapFormat) -> PathBuf {
    if MapFormat::from_path(path) == Some(format) {
        return path.to_path_buf();
    }

    let mut name = OsString::from(path.as_os_str());
    name.push(".");
    name.push(format.extension());
    PathBuf::from(name)
}

/// Writes the image to disk and returns the path actually written.
pub fn save_to_path(
    image: &MapImage,
    path: &Path,
    format: MapFormat,
) -> Result<PathBuf, MapCodecError> {
    let bytes = encode(image, format)?;
    let target = path_with_extension(path, format);
    fs::write(&target, &bytes).map_err(|source| MapCodecError::Io {
        path: target.clone(),
        source,
    })?;
    info!(
        path = %target.display(),
        ?format,
        columns = image.columns(),
        rows = image.rows(),
        "map saved"
    );
    Ok(target)
}

/// Reads a map from disk, choosing the format by extension and falling back
/// to the leading magic.
pub fn load_from_path(path: &Path) -> Result<(MapImage, MapFormat), MapCodecError> {
    let bytes = fs::read(path).map_err(|source| MapCodecError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let format = match MapFormat::from_path(path) {
        Some(format) => format,
        None => {
            let format = MapFormat::detect(&bytes);
            debug!(path = %path.display(), ?format, "map format sniffed from contents");
            format
        }
    };
    let image = decode(&bytes, format)?;
    info!(
        path = %path.display(),
        ?format,
        columns = image.columns(),
        rows = image.rows(),
        "map read"
    );
    Ok((image, format))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_follows_extension_case_insensitively() {
        assert_eq!(
            MapFormat::from_path(Path::new("maps/level.TMAP")),
            Some(MapFormat::Binary)
        );
        assert_eq!(
            MapFormat::from_path(Path::new("level.pmap")),
            Some(MapFormat::Legacy)
        );
        assert_eq!(MapFormat::from_path(Path::new("level.txt")), None);
        assert_eq!(MapFormat::from_path(Path::new("level")), None);
    }

    #[test]
    fn detection_sniffs_binary_magic() {
        assert_eq!(MapFormat::detect(b"tmap\x01"), MapFormat::Binary);
        assert_eq!(MapFormat::detect(b"0201"), MapFormat::Legacy);
        assert_eq!(MapFormat::detect(b""), MapFormat::Legacy);
    }

    #[test]
    fn extension_is_appended_only_when_missing() {
        assert_eq!(
            path_with_extension(Path::new("maze"), MapFormat::Binary),
            PathBuf::from("maze.tmap")
        );
        assert_eq!(
            path_with_extension(Path::new("maze.pmap"), MapFormat::Legacy),
            PathBuf::from("maze.pmap")
        );
        assert_eq!(
            path_with_extension(Path::new("maze.pmap"), MapFormat::Binary),
            PathBuf::from("maze.pmap.tmap")
        );
    }
}
