use std::collections::BTreeMap;

use thiserror::Error;

use warren_blocks::{Block, BlockError, BlockRegistry};
use warren_geom::Vec2i;

use crate::tile::{Tile, TileMeta};

/// Side length of a chunk in tiles. Power of two so chunk-space
/// conversion is an arithmetic shift.
pub const CHUNK_SIZE: i32 = 16;
const CHUNK_SHIFT: u32 = CHUNK_SIZE.trailing_zeros();

/// Chunk-space coordinate owning the given tile coordinate. Arithmetic
/// shift floors toward negative infinity, which keeps negative addresses
/// correct.
#[inline]
pub fn chunk_of(tile: Vec2i) -> Vec2i {
    Vec2i::new(tile.x >> CHUNK_SHIFT, tile.y >> CHUNK_SHIFT)
}

/// Offset of a tile within its owning chunk, each component in
/// `0..CHUNK_SIZE`.
#[inline]
pub fn local_of(tile: Vec2i) -> Vec2i {
    tile - chunk_of(tile) * CHUNK_SIZE
}

#[derive(Debug, Error)]
pub enum ChunkError {
    #[error(transparent)]
    Block(#[from] BlockError),
    #[error("malformed chunk data: {0}")]
    Malformed(String),
}

/// Square block of `CHUNK_SIZE` x `CHUNK_SIZE` tiles, the unit of
/// caching and persistence. Identity is the chunk-space `pos`; `id` is
/// the row identity once the chunk has been persisted.
///
/// Packed form is a line-oriented ASCII artifact, stable for the
/// lifetime of a save file: a `"rows:cols"` header, then one line per
/// row of `;`-separated `"blockId:meta"` cells. An absent tile is
/// `"0:0"`; empty metadata is `0`, otherwise the toml rendering of the
/// metadata map with `%`, `:`, `;`, and newline percent-escaped.
#[derive(Clone, Debug, PartialEq)]
pub struct Chunk {
    pub id: Option<i64>,
    pub pos: Vec2i,
    tiles: Vec<Option<Tile>>,
}

impl Chunk {
    pub fn new(pos: Vec2i) -> Self {
        Self {
            id: None,
            pos,
            tiles: vec![None; (CHUNK_SIZE * CHUNK_SIZE) as usize],
        }
    }

    /// Linear index for a tile-space position. Handing this chunk a tile
    /// it does not own is a routing bug, so the bounds check is a panic,
    /// not a recoverable error.
    fn index_of(&self, tile_pos: Vec2i) -> usize {
        let local = tile_pos - self.pos * CHUNK_SIZE;
        assert!(
            local.x >= 0 && local.x < CHUNK_SIZE && local.y >= 0 && local.y < CHUNK_SIZE,
            "tile {tile_pos:?} outside chunk at {:?}",
            self.pos
        );
        (local.y * CHUNK_SIZE + local.x) as usize
    }

    /// Tile at a tile-space position, materializing the default (void)
    /// tile on first access.
    pub fn get_tile(&mut self, tile_pos: Vec2i, void: &Block) -> &Tile {
        self.tile_mut(tile_pos, void)
    }

    pub fn tile_mut(&mut self, tile_pos: Vec2i, void: &Block) -> &mut Tile {
        let i = self.index_of(tile_pos);
        self.tiles[i].get_or_insert_with(|| Tile::new(void.clone()))
    }

    pub fn set_tile(&mut self, tile_pos: Vec2i, tile: Tile) {
        let i = self.index_of(tile_pos);
        self.tiles[i] = Some(tile);
    }

    /// Number of explicitly materialized tiles.
    pub fn populated(&self) -> usize {
        self.tiles.iter().filter(|t| t.is_some()).count()
    }

    /// Renders the packed form. Requires the registry id map so block
    /// handles can be written as numeric ids.
    pub fn pack(&self, reg: &BlockRegistry) -> Result<String, ChunkError> {
        let mut out = format!("{CHUNK_SIZE}:{CHUNK_SIZE}\n");
        for y in 0..CHUNK_SIZE {
            for x in 0..CHUNK_SIZE {
                if x > 0 {
                    out.push(';');
                }
                match &self.tiles[(y * CHUNK_SIZE + x) as usize] {
                    None => out.push_str("0:0"),
                    Some(tile) => {
                        let id = reg.id_of(tile.block.name())?;
                        out.push_str(&id.to_string());
                        out.push(':');
                        out.push_str(&encode_meta(&tile.meta)?);
                    }
                }
            }
            out.push('\n');
        }
        Ok(out)
    }

    /// Rebuilds a chunk from its packed form. The registry id map must
    /// be the one the data was packed against.
    pub fn unpack(pos: Vec2i, data: &str, reg: &BlockRegistry) -> Result<Chunk, ChunkError> {
        let mut lines = data.lines();
        let header = lines
            .next()
            .ok_or_else(|| ChunkError::Malformed("empty chunk data".into()))?;
        let (rows, cols) = header
            .split_once(':')
            .ok_or_else(|| ChunkError::Malformed(format!("bad header {header:?}")))?;
        let rows: i32 = rows
            .parse()
            .map_err(|_| ChunkError::Malformed(format!("bad header {header:?}")))?;
        let cols: i32 = cols
            .parse()
            .map_err(|_| ChunkError::Malformed(format!("bad header {header:?}")))?;
        if rows != CHUNK_SIZE || cols != CHUNK_SIZE {
            return Err(ChunkError::Malformed(format!(
                "unexpected chunk dimensions {rows}x{cols}"
            )));
        }

        let mut chunk = Chunk::new(pos);
        for y in 0..rows {
            let line = lines
                .next()
                .ok_or_else(|| ChunkError::Malformed(format!("missing row {y}")))?;
            let mut x = 0;
            for cell in line.split(';') {
                if x >= cols {
                    return Err(ChunkError::Malformed(format!("row {y} too long")));
                }
                let (id, meta) = cell
                    .split_once(':')
                    .ok_or_else(|| ChunkError::Malformed(format!("bad cell {cell:?}")))?;
                let id: u16 = id
                    .parse()
                    .map_err(|_| ChunkError::Malformed(format!("bad block id {id:?}")))?;
                if id != 0 {
                    let block = reg.get_by_id(id)?.clone();
                    let tile = Tile::with_meta(block, decode_meta(meta)?);
                    chunk.tiles[(y * CHUNK_SIZE + x) as usize] = Some(tile);
                }
                x += 1;
            }
            if x != cols {
                return Err(ChunkError::Malformed(format!("row {y} too short")));
            }
        }
        Ok(chunk)
    }
}

// Characters that collide with the cell/line separators of the pack
// format, percent-escaped inside the meta field.
const ESCAPES: [(char, &str); 4] = [('%', "%25"), (':', "%3A"), (';', "%3B"), ('\n', "%0A")];

fn escape_meta(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ESCAPES.iter().find(|(c, _)| *c == ch) {
            Some((_, rep)) => out.push_str(rep),
            None => out.push(ch),
        }
    }
    out
}

fn unescape_meta(cell: &str) -> Result<String, ChunkError> {
    let mut out = String::with_capacity(cell.len());
    let mut chars = cell.chars();
    while let Some(ch) = chars.next() {
        if ch != '%' {
            out.push(ch);
            continue;
        }
        let code: String = chars.by_ref().take(2).collect();
        match ESCAPES.iter().find(|(_, rep)| rep[1..] == code) {
            Some((c, _)) => out.push(*c),
            None => {
                return Err(ChunkError::Malformed(format!("bad escape %{code}")));
            }
        }
    }
    Ok(out)
}

fn encode_meta(meta: &TileMeta) -> Result<String, ChunkError> {
    if meta.is_empty() {
        return Ok("0".into());
    }
    let sorted: BTreeMap<&str, &str> = meta.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
    let doc = toml::to_string(&sorted).map_err(|e| ChunkError::Malformed(e.to_string()))?;
    Ok(escape_meta(&doc))
}

fn decode_meta(cell: &str) -> Result<TileMeta, ChunkError> {
    if cell == "0" {
        return Ok(TileMeta::new());
    }
    let doc = unescape_meta(cell)?;
    toml::from_str(&doc).map_err(|e| ChunkError::Malformed(e.to_string()))
}
