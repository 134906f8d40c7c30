use std::collections::HashSet;

use log::debug;
use rusqlite::Connection;

use crate::store::SaveError;

/// Static definition of one save-file table: column list plus the tables
/// that must exist before it can be created.
#[derive(Debug)]
pub struct TableDef {
    pub name: &'static str,
    pub columns: &'static [(&'static str, &'static str)],
    pub depends: &'static [&'static str],
}

/// Every table a save file carries. Declaration order is not creation
/// order; `SaveSchema::create_order` resolves dependencies.
pub const TABLES: &[TableDef] = &[
    TableDef {
        name: "metadata",
        columns: &[("data_key", "TEXT PRIMARY KEY"), ("data_val", "TEXT")],
        depends: &[],
    },
    TableDef {
        name: "worlds",
        columns: &[
            ("id", "INTEGER PRIMARY KEY"),
            ("name", "TEXT"),
            ("size_x", "INTEGER"),
            ("size_y", "INTEGER"),
        ],
        depends: &[],
    },
    TableDef {
        name: "regions",
        columns: &[
            ("id", "INTEGER PRIMARY KEY"),
            ("world_id", "INTEGER"),
            ("name", "TEXT"),
            ("size_x", "INTEGER"),
            ("size_y", "INTEGER"),
        ],
        depends: &["worlds"],
    },
    TableDef {
        name: "levels",
        columns: &[
            ("id", "INTEGER PRIMARY KEY"),
            ("region_id", "INTEGER"),
            ("name", "TEXT"),
            ("size_x", "INTEGER"),
            ("size_y", "INTEGER"),
        ],
        depends: &["regions"],
    },
    TableDef {
        name: "chunks",
        columns: &[
            ("id", "INTEGER PRIMARY KEY"),
            ("level_id", "INTEGER"),
            ("pos_x", "INTEGER"),
            ("pos_y", "INTEGER"),
            ("tiles", "TEXT"),
        ],
        depends: &["levels"],
    },
];

#[derive(Debug)]
pub struct SaveSchema {
    tables: &'static [TableDef],
}

impl Default for SaveSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl SaveSchema {
    pub fn new() -> Self {
        Self { tables: TABLES }
    }

    #[cfg(test)]
    pub(crate) fn with_tables(tables: &'static [TableDef]) -> Self {
        Self { tables }
    }

    /// Tables in dependency-respecting creation order. A table never
    /// appears before one it depends on.
    pub fn create_order(&self) -> Result<Vec<&'static TableDef>, SaveError> {
        let mut order = Vec::with_capacity(self.tables.len());
        let mut created: HashSet<&str> = HashSet::new();
        let mut remaining: Vec<&'static TableDef> = self.tables.iter().collect();
        while !remaining.is_empty() {
            let before = remaining.len();
            remaining.retain(|table| {
                if table.depends.iter().all(|dep| created.contains(dep)) {
                    created.insert(table.name);
                    order.push(*table);
                    false
                } else {
                    true
                }
            });
            if remaining.len() == before {
                let stuck: Vec<&str> = remaining.iter().map(|t| t.name).collect();
                return Err(SaveError::SchemaInvalid(format!(
                    "unsatisfiable table dependencies: {stuck:?}"
                )));
            }
        }
        Ok(order)
    }

    pub fn create_all(&self, conn: &Connection) -> Result<(), SaveError> {
        for table in self.create_order()? {
            let columns = table
                .columns
                .iter()
                .map(|(name, ty)| format!("{name} {ty}"))
                .collect::<Vec<_>>()
                .join(", ");
            let ddl = format!("CREATE TABLE IF NOT EXISTS {} ({columns})", table.name);
            debug!("creating table {}", table.name);
            conn.execute(&ddl, [])?;
        }
        Ok(())
    }

    /// The schema is valid iff every declared table is present.
    pub fn is_valid<'a, I>(&self, existing: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        let existing: HashSet<&str> = existing.into_iter().collect();
        self.tables.iter().all(|t| existing.contains(t.name))
    }

    /// Deletes every row from every declared table and commits.
    pub fn clear(&self, conn: &Connection) -> Result<(), SaveError> {
        let tx = conn.unchecked_transaction()?;
        for table in self.tables {
            tx.execute(&format!("DELETE FROM {}", table.name), [])?;
        }
        tx.commit()?;
        Ok(())
    }
}
