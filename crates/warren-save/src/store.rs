use std::path::{Path, PathBuf};

use log::info;
use rusqlite::{Connection, ErrorCode, OptionalExtension, Transaction, params};
use thiserror::Error;

use warren_geom::Vec2i;

use crate::records::{ChunkRow, LevelRow, RegionRow, WorldRow};
use crate::schema::SaveSchema;

/// Metadata key under which the serialized block id map is stored.
pub const BLOCK_MAPPINGS_KEY: &str = "block_mappings";

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("save schema is invalid: {0}")]
    SchemaInvalid(String),
    #[error("duplicate key in table {0}")]
    DuplicateKey(&'static str),
    #[error("storage unavailable: {0}")]
    Storage(#[from] rusqlite::Error),
}

pub(crate) fn insert_error(table: &'static str, e: rusqlite::Error) -> SaveError {
    match &e {
        rusqlite::Error::SqliteFailure(f, _) if f.code == ErrorCode::ConstraintViolation => {
            SaveError::DuplicateKey(table)
        }
        _ => SaveError::Storage(e),
    }
}

/// One row-mapped entity type. An entity is new exactly when its id is
/// unset; `SaveFile::upsert` turns that into insert-or-update.
pub trait Record {
    const TABLE: &'static str;

    fn id(&self) -> Option<i64>;
    fn set_id(&mut self, id: i64);
    fn insert(&self, conn: &Connection) -> Result<i64, SaveError>;
    fn update(&self, conn: &Connection) -> Result<(), SaveError>;
}

/// A SQLite-backed save file. All access is synchronous on the calling
/// thread; a host that wants concurrency must confine the file to one
/// worker.
pub struct SaveFile {
    path: PathBuf,
    conn: Connection,
    schema: SaveSchema,
}

impl SaveFile {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SaveError> {
        let path = path.as_ref().to_path_buf();
        let conn = Connection::open(&path)?;
        Ok(Self {
            path,
            conn,
            schema: SaveSchema::new(),
        })
    }

    /// Ephemeral save file, handy for tests and tools.
    pub fn open_in_memory() -> Result<Self, SaveError> {
        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn: Connection::open_in_memory()?,
            schema: SaveSchema::new(),
        })
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn has_schema(&self) -> Result<bool, SaveError> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table'")?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.schema.is_valid(names.iter().map(String::as_str)))
    }

    pub fn init(&self) -> Result<(), SaveError> {
        info!("creating save schema in {}", self.path.display());
        self.schema.create_all(&self.conn)
    }

    /// Creates the schema if any declared table is missing. One attempt;
    /// a failing creation propagates.
    pub fn ensure_schema(&self) -> Result<(), SaveError> {
        if !self.has_schema()? {
            self.init()?;
        }
        Ok(())
    }

    /// Empties every table while keeping the schema valid.
    pub fn clear(&self) -> Result<(), SaveError> {
        self.ensure_schema()?;
        self.schema.clear(&self.conn)
    }

    /// Transaction covering one logical save; every statement issued on
    /// this file joins it until commit.
    pub fn transaction(&self) -> Result<Transaction<'_>, SaveError> {
        Ok(self.conn.unchecked_transaction()?)
    }

    /// Inserts the record and writes the generated id back when the id
    /// is unset, otherwise updates by id. Returns the definitive id.
    pub fn upsert<R: Record>(&self, rec: &mut R) -> Result<i64, SaveError> {
        match rec.id() {
            None => {
                let id = rec.insert(&self.conn)?;
                rec.set_id(id);
                Ok(id)
            }
            Some(id) => {
                rec.update(&self.conn)?;
                Ok(id)
            }
        }
    }

    pub fn metadata_get(&self, key: &str) -> Result<Option<String>, SaveError> {
        let val = self
            .conn
            .query_row(
                "SELECT data_val FROM metadata WHERE data_key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(val)
    }

    /// Metadata rows are write-once per save file; inserting an existing
    /// key is a `DuplicateKey` error.
    pub fn metadata_put(&self, key: &str, val: &str) -> Result<(), SaveError> {
        self.conn
            .execute(
                "INSERT INTO metadata (data_key, data_val) VALUES (?1, ?2)",
                params![key, val],
            )
            .map_err(|e| insert_error("metadata", e))?;
        Ok(())
    }

    pub fn world_row(&self, id: i64) -> Result<Option<WorldRow>, SaveError> {
        let row = self
            .conn
            .query_row(
                "SELECT id, name, size_x, size_y FROM worlds WHERE id = ?1",
                params![id],
                WorldRow::from_row,
            )
            .optional()?;
        Ok(row)
    }

    pub fn regions_of(&self, world_id: i64) -> Result<Vec<RegionRow>, SaveError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, world_id, name, size_x, size_y FROM regions WHERE world_id = ?1",
        )?;
        let rows = stmt
            .query_map(params![world_id], RegionRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn levels_of(&self, region_id: i64) -> Result<Vec<LevelRow>, SaveError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, region_id, name, size_x, size_y FROM levels WHERE region_id = ?1",
        )?;
        let rows = stmt
            .query_map(params![region_id], LevelRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn chunk_at(&self, level_id: i64, pos: Vec2i) -> Result<Option<ChunkRow>, SaveError> {
        let row = self
            .conn
            .query_row(
                "SELECT id, level_id, pos_x, pos_y, tiles FROM chunks \
                 WHERE level_id = ?1 AND pos_x = ?2 AND pos_y = ?3",
                params![level_id, pos.x, pos.y],
                ChunkRow::from_row,
            )
            .optional()?;
        Ok(row)
    }
}
