//! Legacy hex text maps (`.pmap`).
//!
//! Layout: two hex digits of width, two of height, one option byte per cell
//! in column-major order, then one movement byte per cell. The movement map
//! is written as zeroes and only validated on read.

use tilemaze_core::{Cell, CellKind, MapImage, WallFlags};

use crate::MapCodecError;

const HEADER_LEN: usize = 4;
const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

const WALL_BITS: u8 = 0x0F;
const AUTO_WALL: u8 = 0x10;
const DOT: u8 = 0x20;
const DOT_BIG: u8 = 0x40;
const PLAYER_MARKER: u8 = 0x80;

pub(crate) fn encode(image: &MapImage) -> Result<Vec<u8>, MapCodecError> {
    let (columns, rows) = (image.columns(), image.rows());
    let (Ok(width), Ok(height)) = (u8::try_from(columns), u8::try_from(rows)) else {
        return Err(MapCodecError::DimensionsTooLarge { columns, rows });
    };

    let cell_count = image.cells().len();
    let mut out = Vec::with_capacity(HEADER_LEN + cell_count * 4);
    push_hex(&mut out, width);
    push_hex(&mut out, height);
    for cell in image.cells() {
        push_hex(&mut out, option_byte(*cell));
    }
    for _ in 0..cell_count {
        push_hex(&mut out, 0);
    }
    Ok(out)
}

pub(crate) fn decode(bytes: &[u8]) -> Result<MapImage, MapCodecError> {
    if bytes.len() < HEADER_LEN {
        return Err(MapCodecError::Truncated {
            expected: HEADER_LEN,
            actual: bytes.len(),
        });
    }

    let columns = u32::from(hex_byte(bytes, 0)?);
    let rows = u32::from(hex_byte(bytes, 2)?);
    if columns == 0 || rows == 0 {
        return Err(MapCodecError::EmptyGrid { columns, rows });
    }

    let cell_count = u64::from(columns) * u64::from(rows);
    let expected = HEADER_LEN as u64 + cell_count * 4;
    let actual = bytes.len() as u64;
    if actual != expected {
        return Err(MapCodecError::LengthMismatch { expected, actual });
    }

    // Header dimensions are single bytes, so the count always fits.
    let cell_count = cell_count as usize;
    let cells = (0..cell_count)
        .map(|index| hex_byte(bytes, HEADER_LEN + index * 2).map(cell_from_option))
        .collect::<Result<Vec<_>, _>>()?;

    let movement_start = HEADER_LEN + cell_count * 2;
    if let Some(offset) = bytes[movement_start..]
        .iter()
        .position(|byte| !byte.is_ascii_hexdigit())
    {
        return Err(MapCodecError::NotHex {
            offset: movement_start + offset,
        });
    }

    MapImage::from_cells(columns, rows, cells).ok_or(MapCodecError::EmptyGrid { columns, rows })
}

fn option_byte(cell: Cell) -> u8 {
    match cell.kind() {
        CellKind::Blank => 0,
        CellKind::Wall if cell.flags().is_empty() => AUTO_WALL,
        CellKind::Wall => cell.flags().bits(),
        CellKind::Dot => DOT,
        CellKind::DotBig => DOT_BIG,
        CellKind::PlayerSpawn => PLAYER_MARKER | AUTO_WALL,
        CellKind::PlayerMarker => PLAYER_MARKER,
    }
}

fn cell_from_option(byte: u8) -> Cell {
    if byte & PLAYER_MARKER != 0 {
        let kind = if byte & AUTO_WALL != 0 {
            CellKind::PlayerSpawn
        } else {
            CellKind::PlayerMarker
        };
        return Cell::new(kind, WallFlags::EMPTY);
    }
    if byte & (WALL_BITS | AUTO_WALL) != 0 {
        return Cell::wall(WallFlags::from_bits_truncate(byte));
    }
    if byte & DOT_BIG != 0 {
        return Cell::new(CellKind::DotBig, WallFlags::EMPTY);
    }
    if byte & DOT != 0 {
        return Cell::new(CellKind::Dot, WallFlags::EMPTY);
    }
    Cell::blank()
}

fn push_hex(out: &mut Vec<u8>, byte: u8) {
    out.push(HEX_DIGITS[usize::from(byte >> 4)]);
    out.push(HEX_DIGITS[usize::from(byte & 0x0F)]);
}

fn hex_byte(bytes: &[u8], offset: usize) -> Result<u8, MapCodecError> {
    let high = hex_digit(bytes, offset)?;
    let low = hex_digit(bytes, offset + 1)?;
    Ok(high << 4 | low)
}

fn hex_digit(bytes: &[u8], offset: usize) -> Result<u8, MapCodecError> {
    let digit = bytes
        .get(offset)
        .and_then(|byte| char::from(*byte).to_digit(16))
        .ok_or(MapCodecError::NotHex { offset })?;
    Ok(digit as u8)
}
