use std::collections::{BTreeMap, HashMap};

use log::debug;
use thiserror::Error;

use crate::types::{Block, BlockId, BlockType, FloorBlock, VoidBlock, WallBlock, names};

#[derive(Debug, Error)]
pub enum BlockError {
    #[error("block {0} is already registered")]
    DuplicateBlock(String),
    #[error("unknown block {0}")]
    UnknownBlock(String),
    #[error("unknown block id {0}")]
    UnknownBlockId(BlockId),
    #[error("block id map has not been built or loaded")]
    IdMapNotBuilt,
    #[error("malformed block id map: {0}")]
    BadIdMap(String),
}

#[derive(Debug, Default, Clone)]
struct IdMap {
    by_name: HashMap<String, BlockId>,
    by_id: HashMap<BlockId, String>,
}

/// Name-keyed registry of block kinds, owned by the host next to the
/// world it serves (there is deliberately no global instance). The
/// numeric id map is a per-save-file artifact: it is built or loaded
/// once and must match the data it is used to decode.
#[derive(Debug, Default)]
pub struct BlockRegistry {
    by_name: HashMap<String, Block>,
    order: Vec<String>,
    id_map: Option<IdMap>,
}

impl BlockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the built-in block kinds.
    pub fn with_defaults() -> Self {
        let mut reg = Self::new();
        reg.insert(Block::new(VoidBlock));
        reg.insert(Block::new(FloorBlock));
        reg.insert(Block::new(WallBlock));
        reg
    }

    fn insert(&mut self, block: Block) {
        debug!("registered block {}", block.name());
        self.order.push(block.name().to_string());
        self.by_name.insert(block.name().to_string(), block);
    }

    pub fn register(&mut self, ty: impl BlockType + 'static) -> Result<(), BlockError> {
        let block = Block::new(ty);
        if self.by_name.contains_key(block.name()) {
            return Err(BlockError::DuplicateBlock(block.name().to_string()));
        }
        self.insert(block);
        Ok(())
    }

    pub fn get_by_name(&self, name: &str) -> Result<&Block, BlockError> {
        self.by_name
            .get(name)
            .ok_or_else(|| BlockError::UnknownBlock(name.to_string()))
    }

    /// The default block every fresh tile starts with.
    pub fn void(&self) -> Result<&Block, BlockError> {
        self.get_by_name(names::VOID)
    }

    /// Resolves a persisted numeric id back to its block. Requires the
    /// id map to have been built or loaded first.
    pub fn get_by_id(&self, id: BlockId) -> Result<&Block, BlockError> {
        let map = self.id_map.as_ref().ok_or(BlockError::IdMapNotBuilt)?;
        let name = map.by_id.get(&id).ok_or(BlockError::UnknownBlockId(id))?;
        self.by_name
            .get(name)
            .ok_or_else(|| BlockError::UnknownBlock(name.clone()))
    }

    pub fn id_of(&self, name: &str) -> Result<BlockId, BlockError> {
        let map = self.id_map.as_ref().ok_or(BlockError::IdMapNotBuilt)?;
        map.by_name
            .get(name)
            .copied()
            .ok_or_else(|| BlockError::UnknownBlock(name.to_string()))
    }

    #[inline]
    pub fn has_id_map(&self) -> bool {
        self.id_map.is_some()
    }

    /// Assigns sequential ids (starting at 1; 0 stays the absent-cell
    /// sentinel) in registration order. Recomputing yields the same map
    /// for the same registration sequence, so this is a deterministic
    /// snapshot suitable for a fresh save.
    pub fn build_id_map(&mut self) {
        let mut map = IdMap::default();
        for (i, name) in self.order.iter().enumerate() {
            let id = (i + 1) as BlockId;
            map.by_name.insert(name.clone(), id);
            map.by_id.insert(id, name.clone());
        }
        debug!("built block id map with {} entries", map.by_name.len());
        self.id_map = Some(map);
    }

    /// Renders the name -> id map for storage in the save file's
    /// metadata table.
    pub fn serialize_id_map(&self) -> Result<String, BlockError> {
        let map = self.id_map.as_ref().ok_or(BlockError::IdMapNotBuilt)?;
        let sorted: BTreeMap<&str, BlockId> =
            map.by_name.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        toml::to_string(&sorted).map_err(|e| BlockError::BadIdMap(e.to_string()))
    }

    /// Restores a previously persisted id map. Must run before any chunk
    /// data referencing those ids is decoded.
    pub fn load_id_map(&mut self, data: &str) -> Result<(), BlockError> {
        let by_name: HashMap<String, BlockId> =
            toml::from_str(data).map_err(|e| BlockError::BadIdMap(e.to_string()))?;
        let mut by_id = HashMap::with_capacity(by_name.len());
        for (name, id) in &by_name {
            if *id == 0 {
                return Err(BlockError::BadIdMap(format!(
                    "block {name} uses reserved id 0"
                )));
            }
            if by_id.insert(*id, name.clone()).is_some() {
                return Err(BlockError::BadIdMap(format!("id {id} assigned twice")));
            }
        }
        debug!("loaded block id map with {} entries", by_name.len());
        self.id_map = Some(IdMap { by_name, by_id });
        Ok(())
    }
}
