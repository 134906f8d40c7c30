use std::collections::HashMap;

use warren_blocks::Block;

/// Free-form per-tile metadata, interpreted by block behavior outside
/// this core.
pub type TileMeta = HashMap<String, String>;

/// Per-cell state: a block handle plus metadata. Owned exclusively by
/// its containing chunk.
#[derive(Clone, Debug, PartialEq)]
pub struct Tile {
    pub block: Block,
    pub meta: TileMeta,
}

impl Tile {
    pub fn new(block: Block) -> Self {
        Self {
            block,
            meta: TileMeta::new(),
        }
    }

    pub fn with_meta(block: Block, meta: TileMeta) -> Self {
        Self { block, meta }
    }

    /// Replaces block and metadata together; omitting the metadata
    /// resets it to empty.
    pub fn set_block(&mut self, block: Block, meta: Option<TileMeta>) {
        self.block = block;
        self.meta = meta.unwrap_or_default();
    }
}
