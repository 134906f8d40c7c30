//! Relational save-file layer: schema management and upsert-based stores.
#![forbid(unsafe_code)]

pub mod records;
pub mod schema;
pub mod store;

pub use records::{ChunkRow, LevelRow, RegionRow, WorldRow};
pub use schema::{SaveSchema, TableDef};
pub use store::{BLOCK_MAPPINGS_KEY, Record, SaveError, SaveFile};
