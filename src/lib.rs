//! Spatial tile-storage engine for a roguelike: an effectively unbounded
//! 2D grid of tiles, addressed through a recursive chunk index, pooled in
//! memory, and persisted to a relational save file.
//!
//! The crates compose leaf-first: [`warren_geom`] supplies coordinates
//! and cache keys, [`warren_blocks`] the block kinds and their
//! persistable id map, [`warren_chunk`] the 16x16 tile chunks and their
//! packed codec, [`warren_save`] the SQLite-backed schema and upsert
//! store, and [`warren_world`] the chunk tree, chunk loader, and the
//! `World` / `Region` / `Level` hierarchy. This crate re-exports the
//! public surface.
#![forbid(unsafe_code)]

pub use warren_blocks::{
    Block, BlockError, BlockId, BlockRegistry, BlockType, FloorBlock, VoidBlock, WallBlock, names,
};
pub use warren_chunk::{CHUNK_SIZE, Chunk, ChunkError, Tile, TileMeta, chunk_of, local_of};
pub use warren_geom::{Vec2i, pair_key};
pub use warren_save::{
    BLOCK_MAPPINGS_KEY, ChunkRow, LevelRow, Record, RegionRow, SaveError, SaveFile, SaveSchema,
    TableDef, WorldRow,
};
pub use warren_world::{
    ChunkLoader, ChunkTree, DEFAULT_WORLD_SIZE, Level, MapError, Region, World,
};
