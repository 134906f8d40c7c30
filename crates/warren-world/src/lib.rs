//! Spatial chunk index, chunk pooling, and the world hierarchy.
#![forbid(unsafe_code)]

pub mod loader;
pub mod tree;
pub mod world;

use thiserror::Error;

use warren_blocks::BlockError;
use warren_chunk::ChunkError;
use warren_save::SaveError;

pub use loader::ChunkLoader;
pub use tree::ChunkTree;
pub use world::{DEFAULT_WORLD_SIZE, Level, Region, World};

#[derive(Debug, Error)]
pub enum MapError {
    #[error(transparent)]
    Block(#[from] BlockError),
    #[error(transparent)]
    Chunk(#[from] ChunkError),
    #[error(transparent)]
    Save(#[from] SaveError),
    #[error("world {0} does not exist in this save file")]
    UnknownWorld(i64),
}
