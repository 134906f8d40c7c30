//! Fixed-size tile chunks and their packed on-disk codec.
#![forbid(unsafe_code)]

pub mod chunk;
pub mod tile;

pub use chunk::{CHUNK_SIZE, Chunk, ChunkError, chunk_of, local_of};
pub use tile::{Tile, TileMeta};
