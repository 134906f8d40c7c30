use std::collections::HashMap;
use std::rc::Rc;

use log::debug;

use warren_blocks::BlockRegistry;
use warren_chunk::Chunk;
use warren_geom::{Vec2i, pair_key};
use warren_save::{ChunkRow, SaveFile};

use crate::MapError;

/// Pool of materialized chunks for one level, keyed by the Cantor pair
/// key of the chunk position. Misses load from the save file when the
/// level has a persisted identity, otherwise start an empty chunk.
///
/// The pool only grows: nothing evicts a chunk while the level is alive.
/// Hosts that stream very large maps pay for every chunk ever touched.
pub struct ChunkLoader {
    save: Rc<SaveFile>,
    pool: HashMap<u64, Chunk>,
}

impl ChunkLoader {
    pub fn new(save: Rc<SaveFile>) -> Self {
        Self {
            save,
            pool: HashMap::new(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pool.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }

    pub fn get(
        &mut self,
        pos: Vec2i,
        level_id: Option<i64>,
        reg: &BlockRegistry,
    ) -> Result<&mut Chunk, MapError> {
        let key = pair_key(pos);
        if !self.pool.contains_key(&key) {
            let chunk = self.load_or_create(pos, level_id, reg)?;
            self.pool.insert(key, chunk);
        }
        Ok(self.pool.entry(key).or_insert_with(|| Chunk::new(pos)))
    }

    fn load_or_create(
        &self,
        pos: Vec2i,
        level_id: Option<i64>,
        reg: &BlockRegistry,
    ) -> Result<Chunk, MapError> {
        if let Some(level_id) = level_id {
            if let Some(row) = self.save.chunk_at(level_id, pos)? {
                let mut chunk = Chunk::unpack(pos, &row.tiles, reg)?;
                chunk.id = row.id;
                debug!("loaded chunk {:?} of level {level_id}", pos);
                return Ok(chunk);
            }
        }
        debug!("materialized empty chunk {:?}", pos);
        Ok(Chunk::new(pos))
    }

    /// Writes every pooled chunk back to the save file. Runs inside the
    /// caller's transaction; newly inserted chunks get their row id
    /// written back so later saves update in place.
    pub fn save(&mut self, level_id: i64, reg: &BlockRegistry) -> Result<(), MapError> {
        for chunk in self.pool.values_mut() {
            let tiles = chunk.pack(reg)?;
            let mut row = ChunkRow {
                id: chunk.id,
                level_id,
                pos: chunk.pos,
                tiles,
            };
            self.save.upsert(&mut row)?;
            chunk.id = row.id;
        }
        debug!("saved {} chunks for level {level_id}", self.pool.len());
        Ok(())
    }

    /// Reserved hook for a future eviction policy. Any implementation
    /// must write dirty chunks back before dropping them from the pool.
    pub fn purge(&mut self) {}
}
