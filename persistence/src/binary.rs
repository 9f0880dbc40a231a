//! Binary maps (`.tmap`).

use std::io::{self, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use tilemaze_core::{Cell, CellKind, MapImage, WallFlags};

use crate::MapCodecError;

pub(crate) const MAGIC: &[u8; 4] = b"tmap";

const HEADER_LEN: usize = 12;
const CELL_LEN: u64 = 4;

pub(crate) fn encode(image: &MapImage) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_LEN + image.cells().len() * 4);
    write_image(&mut out, image).expect("writing into a Vec never fails");
    out
}

fn write_image<W: Write>(writer: &mut W, image: &MapImage) -> io::Result<()> {
    writer.write_all(MAGIC)?;
    writer.write_u32::<LittleEndian>(image.columns())?;
    writer.write_u32::<LittleEndian>(image.rows())?;
    for cell in image.cells() {
        writer.write_u16::<LittleEndian>(cell.kind().ordinal())?;
        writer.write_u16::<LittleEndian>(u16::from(cell.flags().bits()))?;
    }
    Ok(())
}

pub(crate) fn decode(bytes: &[u8]) -> Result<MapImage, MapCodecError> {
    let truncated = || MapCodecError::Truncated {
        expected: HEADER_LEN,
        actual: bytes.len(),
    };

    let mut reader = bytes;
    let mut magic = [0_u8; 4];
    reader.read_exact(&mut magic).map_err(|_| truncated())?;
    if &magic != MAGIC {
        return Err(MapCodecError::BadMagic);
    }

    let columns = reader.read_u32::<LittleEndian>().map_err(|_| truncated())?;
    let rows = reader.read_u32::<LittleEndian>().map_err(|_| truncated())?;
    if columns == 0 || rows == 0 {
        return Err(MapCodecError::EmptyGrid { columns, rows });
    }

    let expected = (u64::from(columns) * u64::from(rows)).saturating_mul(CELL_LEN);
    let actual = reader.len() as u64;
    if actual != expected {
        return Err(MapCodecError::LengthMismatch { expected, actual });
    }

    let cell_count = reader.len() / 4;
    let mut cells = Vec::with_capacity(cell_count);
    for index in 0..cell_count {
        let ordinal = reader.read_u16::<LittleEndian>().map_err(|_| truncated())?;
        let flags = reader.read_u16::<LittleEndian>().map_err(|_| truncated())?;

        let kind = CellKind::from_ordinal(ordinal)
            .ok_or(MapCodecError::UnknownCellKind { index, ordinal })?;
        let flags =
            WallFlags::from_bits(flags).ok_or(MapCodecError::InvalidWallFlags { index, flags })?;
        cells.push(Cell::new(kind, flags));
    }

    MapImage::from_cells(columns, rows, cells).ok_or(MapCodecError::EmptyGrid { columns, rows })
}
