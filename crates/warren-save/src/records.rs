use rusqlite::{Connection, Row, params};

use warren_geom::Vec2i;

use crate::store::{Record, SaveError, insert_error};

#[derive(Clone, Debug, PartialEq)]
pub struct WorldRow {
    pub id: Option<i64>,
    pub name: String,
    pub size: Vec2i,
}

impl WorldRow {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: Some(row.get(0)?),
            name: row.get(1)?,
            size: Vec2i::new(row.get(2)?, row.get(3)?),
        })
    }
}

impl Record for WorldRow {
    const TABLE: &'static str = "worlds";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn insert(&self, conn: &Connection) -> Result<i64, SaveError> {
        conn.execute(
            "INSERT INTO worlds (name, size_x, size_y) VALUES (?1, ?2, ?3)",
            params![self.name, self.size.x, self.size.y],
        )
        .map_err(|e| insert_error(Self::TABLE, e))?;
        Ok(conn.last_insert_rowid())
    }

    fn update(&self, conn: &Connection) -> Result<(), SaveError> {
        conn.execute(
            "UPDATE worlds SET name = ?1, size_x = ?2, size_y = ?3 WHERE id = ?4",
            params![self.name, self.size.x, self.size.y, self.id],
        )?;
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RegionRow {
    pub id: Option<i64>,
    pub world_id: i64,
    pub name: String,
    pub size: Vec2i,
}

impl RegionRow {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: Some(row.get(0)?),
            world_id: row.get(1)?,
            name: row.get(2)?,
            size: Vec2i::new(row.get(3)?, row.get(4)?),
        })
    }
}

impl Record for RegionRow {
    const TABLE: &'static str = "regions";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn insert(&self, conn: &Connection) -> Result<i64, SaveError> {
        conn.execute(
            "INSERT INTO regions (world_id, name, size_x, size_y) VALUES (?1, ?2, ?3, ?4)",
            params![self.world_id, self.name, self.size.x, self.size.y],
        )
        .map_err(|e| insert_error(Self::TABLE, e))?;
        Ok(conn.last_insert_rowid())
    }

    fn update(&self, conn: &Connection) -> Result<(), SaveError> {
        conn.execute(
            "UPDATE regions SET world_id = ?1, name = ?2, size_x = ?3, size_y = ?4 WHERE id = ?5",
            params![self.world_id, self.name, self.size.x, self.size.y, self.id],
        )?;
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LevelRow {
    pub id: Option<i64>,
    pub region_id: i64,
    pub name: String,
    pub size: Vec2i,
}

impl LevelRow {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: Some(row.get(0)?),
            region_id: row.get(1)?,
            name: row.get(2)?,
            size: Vec2i::new(row.get(3)?, row.get(4)?),
        })
    }
}

impl Record for LevelRow {
    const TABLE: &'static str = "levels";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn insert(&self, conn: &Connection) -> Result<i64, SaveError> {
        conn.execute(
            "INSERT INTO levels (region_id, name, size_x, size_y) VALUES (?1, ?2, ?3, ?4)",
            params![self.region_id, self.name, self.size.x, self.size.y],
        )
        .map_err(|e| insert_error(Self::TABLE, e))?;
        Ok(conn.last_insert_rowid())
    }

    fn update(&self, conn: &Connection) -> Result<(), SaveError> {
        conn.execute(
            "UPDATE levels SET region_id = ?1, name = ?2, size_x = ?3, size_y = ?4 WHERE id = ?5",
            params![self.region_id, self.name, self.size.x, self.size.y, self.id],
        )?;
        Ok(())
    }
}

/// One persisted chunk; `tiles` is the packed ASCII form.
#[derive(Clone, Debug, PartialEq)]
pub struct ChunkRow {
    pub id: Option<i64>,
    pub level_id: i64,
    pub pos: Vec2i,
    pub tiles: String,
}

impl ChunkRow {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: Some(row.get(0)?),
            level_id: row.get(1)?,
            pos: Vec2i::new(row.get(2)?, row.get(3)?),
            tiles: row.get(4)?,
        })
    }
}

impl Record for ChunkRow {
    const TABLE: &'static str = "chunks";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn insert(&self, conn: &Connection) -> Result<i64, SaveError> {
        conn.execute(
            "INSERT INTO chunks (level_id, pos_x, pos_y, tiles) VALUES (?1, ?2, ?3, ?4)",
            params![self.level_id, self.pos.x, self.pos.y, self.tiles],
        )
        .map_err(|e| insert_error(Self::TABLE, e))?;
        Ok(conn.last_insert_rowid())
    }

    fn update(&self, conn: &Connection) -> Result<(), SaveError> {
        conn.execute(
            "UPDATE chunks SET level_id = ?1, pos_x = ?2, pos_y = ?3, tiles = ?4 WHERE id = ?5",
            params![self.level_id, self.pos.x, self.pos.y, self.tiles, self.id],
        )?;
        Ok(())
    }
}
