//! Block kinds and the registry mapping them to persistable numeric ids.
#![forbid(unsafe_code)]

pub mod registry;
pub mod types;

pub use registry::{BlockError, BlockRegistry};
pub use types::{Block, BlockId, BlockType, FloorBlock, VoidBlock, WallBlock, names};
