use std::collections::HashMap;
use std::rc::Rc;

use log::{debug, info};

use warren_blocks::{Block, BlockRegistry};
use warren_chunk::{Tile, TileMeta, chunk_of};
use warren_geom::Vec2i;
use warren_save::{BLOCK_MAPPINGS_KEY, LevelRow, RegionRow, SaveFile, WorldRow};

use crate::MapError;
use crate::loader::ChunkLoader;
use crate::tree::ChunkTree;

/// Default world extent in chunk units, inherited by regions and levels.
pub const DEFAULT_WORLD_SIZE: Vec2i = Vec2i::new(16, 16);

struct LevelMap {
    tree: ChunkTree,
    loader: ChunkLoader,
}

impl LevelMap {
    fn new(size: Vec2i, save: Rc<SaveFile>) -> Self {
        Self {
            tree: ChunkTree::new(Vec2i::ZERO, size),
            loader: ChunkLoader::new(save),
        }
    }
}

/// One playable floor. The spatial index and chunk pool are built
/// exactly once, on first tile access; until then the level is a cheap
/// named shell, which is what region loading materializes in bulk.
pub struct Level {
    pub id: Option<i64>,
    pub name: String,
    pub size: Vec2i,
    map: Option<LevelMap>,
    save: Rc<SaveFile>,
}

impl Level {
    fn new(name: &str, size: Vec2i, save: Rc<SaveFile>) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            size,
            map: None,
            save,
        }
    }

    #[inline]
    pub fn is_loaded(&self) -> bool {
        self.map.is_some()
    }

    /// Builds the chunk tree and loader. Idempotent; every tile
    /// operation calls this first.
    pub fn init(&mut self) {
        if self.map.is_none() {
            debug!("initializing level {}", self.name);
        }
        self.map_mut();
    }

    fn map_mut(&mut self) -> &mut LevelMap {
        let size = self.size;
        let save = self.save.clone();
        self.map.get_or_insert_with(|| LevelMap::new(size, save))
    }

    pub fn get_tile(&mut self, pos: Vec2i, reg: &BlockRegistry) -> Result<&Tile, MapError> {
        let level_id = self.id;
        let void = reg.void()?.clone();
        let LevelMap { tree, loader } = self.map_mut();
        let chunk = tree.chunk_mut(chunk_of(pos), loader, level_id, reg)?;
        Ok(chunk.get_tile(pos, &void))
    }

    pub fn set_tile(&mut self, pos: Vec2i, tile: Tile, reg: &BlockRegistry) -> Result<(), MapError> {
        let level_id = self.id;
        let LevelMap { tree, loader } = self.map_mut();
        let chunk = tree.chunk_mut(chunk_of(pos), loader, level_id, reg)?;
        chunk.set_tile(pos, tile);
        Ok(())
    }

    /// Replaces the block (and metadata) of the tile at `pos` in place.
    pub fn set_block(
        &mut self,
        pos: Vec2i,
        block: &Block,
        meta: Option<TileMeta>,
        reg: &BlockRegistry,
    ) -> Result<(), MapError> {
        let level_id = self.id;
        let void = reg.void()?.clone();
        let LevelMap { tree, loader } = self.map_mut();
        let chunk = tree.chunk_mut(chunk_of(pos), loader, level_id, reg)?;
        chunk.tile_mut(pos, &void).set_block(block.clone(), meta);
        Ok(())
    }

    /// Chunks currently pooled for this level.
    pub fn loaded_chunks(&self) -> usize {
        self.map.as_ref().map_or(0, |m| m.loader.len())
    }

    fn save(&mut self, region_id: i64, reg: &BlockRegistry) -> Result<(), MapError> {
        let mut row = LevelRow {
            id: self.id,
            region_id,
            name: self.name.clone(),
            size: self.size,
        };
        let level_id = self.save.upsert(&mut row)?;
        self.id = Some(level_id);
        if let Some(map) = self.map.as_mut() {
            map.loader.save(level_id, reg)?;
        }
        Ok(())
    }
}

/// Named group of levels inside a world.
pub struct Region {
    pub id: Option<i64>,
    pub name: String,
    pub size: Vec2i,
    levels: HashMap<String, Level>,
    save: Rc<SaveFile>,
}

impl Region {
    fn new(name: &str, size: Vec2i, save: Rc<SaveFile>) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            size,
            levels: HashMap::new(),
            save,
        }
    }

    /// Memoized level factory: the first request creates an in-memory
    /// level inheriting this region's size, later requests return it.
    /// Persistence happens on `World::save`.
    pub fn level(&mut self, name: &str) -> &mut Level {
        let size = self.size;
        let save = self.save.clone();
        let region = self.name.as_str();
        self.levels.entry(name.to_string()).or_insert_with(|| {
            debug!("creating level {name} in region {region}");
            Level::new(name, size, save)
        })
    }

    pub fn level_names(&self) -> impl Iterator<Item = &str> {
        self.levels.keys().map(String::as_str)
    }

    fn save(&mut self, world_id: i64, reg: &BlockRegistry) -> Result<(), MapError> {
        let mut row = RegionRow {
            id: self.id,
            world_id,
            name: self.name.clone(),
            size: self.size,
        };
        let region_id = self.save.upsert(&mut row)?;
        self.id = Some(region_id);
        for level in self.levels.values_mut() {
            level.save(region_id, reg)?;
        }
        Ok(())
    }
}

/// Root of the hierarchy; owns its save-file handle and hands it down
/// to regions and levels. The block registry is deliberately not owned
/// here: the host constructs it and passes it into each call, so one
/// registry instance can serve exactly one save session.
pub struct World {
    pub id: Option<i64>,
    pub name: String,
    pub size: Vec2i,
    regions: HashMap<String, Region>,
    save: Rc<SaveFile>,
}

impl World {
    /// Fresh, unpersisted world. Rows appear on the first `save`.
    pub fn create(name: &str, size: Vec2i, save: Rc<SaveFile>) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            size,
            regions: HashMap::new(),
            save,
        }
    }

    /// Rebuilds a persisted world: restores the block id map (building
    /// and storing it when this is the file's first load), then the
    /// region and level shells. Chunks stay on disk until touched.
    pub fn load(
        save: Rc<SaveFile>,
        world_id: i64,
        reg: &mut BlockRegistry,
    ) -> Result<World, MapError> {
        save.ensure_schema()?;
        match save.metadata_get(BLOCK_MAPPINGS_KEY)? {
            Some(data) => reg.load_id_map(&data)?,
            None => {
                reg.build_id_map();
                save.metadata_put(BLOCK_MAPPINGS_KEY, &reg.serialize_id_map()?)?;
            }
        }

        let row = save
            .world_row(world_id)?
            .ok_or(MapError::UnknownWorld(world_id))?;
        let mut world = World::create(&row.name, row.size, save.clone());
        world.id = row.id;

        for region_row in save.regions_of(world_id)? {
            let mut region = Region::new(&region_row.name, region_row.size, save.clone());
            region.id = region_row.id;
            if let Some(region_id) = region_row.id {
                for level_row in save.levels_of(region_id)? {
                    let mut level = Level::new(&level_row.name, level_row.size, save.clone());
                    level.id = level_row.id;
                    region.levels.insert(level.name.clone(), level);
                }
            }
            world.regions.insert(region.name.clone(), region);
        }
        info!(
            "loaded world {} with {} regions",
            world.name,
            world.regions.len()
        );
        Ok(world)
    }

    /// Memoized region factory; same contract as `Region::level`.
    pub fn region(&mut self, name: &str) -> &mut Region {
        let size = self.size;
        let save = self.save.clone();
        let world = self.name.as_str();
        self.regions.entry(name.to_string()).or_insert_with(|| {
            debug!("creating region {name} in world {world}");
            Region::new(name, size, save)
        })
    }

    pub fn region_names(&self) -> impl Iterator<Item = &str> {
        self.regions.keys().map(String::as_str)
    }

    /// Persists the whole hierarchy and every pooled chunk in one
    /// transaction. Builds and stores the block id map on the file's
    /// first save so packed chunk data stays decodable.
    pub fn save(&mut self, reg: &mut BlockRegistry) -> Result<(), MapError> {
        self.save.ensure_schema()?;
        if !reg.has_id_map() {
            reg.build_id_map();
        }
        if self.save.metadata_get(BLOCK_MAPPINGS_KEY)?.is_none() {
            self.save
                .metadata_put(BLOCK_MAPPINGS_KEY, &reg.serialize_id_map()?)?;
        }

        let tx = self.save.transaction()?;
        let mut row = WorldRow {
            id: self.id,
            name: self.name.clone(),
            size: self.size,
        };
        let world_id = self.save.upsert(&mut row)?;
        self.id = Some(world_id);
        for region in self.regions.values_mut() {
            region.save(world_id, reg)?;
        }
        tx.commit().map_err(warren_save::SaveError::from)?;
        info!("saved world {} ({} regions)", self.name, self.regions.len());
        Ok(())
    }
}
