use std::path::Path;

use rusqlite::{params, Connection};

use crate::error::SenbetsuError;
use crate::models::{EntityId, ListKind};
use crate::store::{KeywordStore, StoreError};

const SCHEMA_V1: &str = include_str!("../../../migrations/001_initial.sql");

/// SQLite-backed keyword storage.
pub struct Storage {
    conn: Connection,
}

impl Storage {
    /// Open (or create) the database at the given path and run migrations.
    pub fn open(path: &Path) -> Result<Self, SenbetsuError> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        run_migrations(&conn)?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, SenbetsuError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        run_migrations(&conn)?;
        Ok(Self { conn })
    }

    /// Entity ids that have at least one keyword in either list.
    pub fn entities_with_keywords(&self) -> Result<Vec<EntityId>, SenbetsuError> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT entity_id FROM release_group_keyword ORDER BY entity_id",
        )?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .filter_map(|r| r.ok())
            .filter_map(|id| EntityId::new(id).ok())
            .collect();
        Ok(rows)
    }
}

impl KeywordStore for Storage {
    fn query(&self, entity: &EntityId, kind: ListKind) -> Result<Vec<String>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT keyword FROM release_group_keyword
             WHERE entity_id = ?1 AND kind = ?2
             ORDER BY id",
        )?;
        let rows = stmt
            .query_map(params![entity.as_str(), kind.as_db_str()], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(rows)
    }

    fn delete_all(&self, entity: &EntityId, kind: ListKind) -> Result<(), StoreError> {
        self.conn.execute(
            "DELETE FROM release_group_keyword WHERE entity_id = ?1 AND kind = ?2",
            params![entity.as_str(), kind.as_db_str()],
        )?;
        Ok(())
    }

    fn insert(&self, entity: &EntityId, kind: ListKind, keyword: &str) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO release_group_keyword (entity_id, kind, keyword) VALUES (?1, ?2, ?3)",
            params![entity.as_str(), kind.as_db_str(), keyword],
        )?;
        Ok(())
    }

    fn replace(
        &self,
        entity: &EntityId,
        kind: ListKind,
        keywords: &[String],
    ) -> Result<(), StoreError> {
        // Dropping the transaction without commit rolls the delete back.
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "DELETE FROM release_group_keyword WHERE entity_id = ?1 AND kind = ?2",
            params![entity.as_str(), kind.as_db_str()],
        )?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO release_group_keyword (entity_id, kind, keyword) VALUES (?1, ?2, ?3)",
            )?;
            for keyword in keywords {
                stmt.execute(params![entity.as_str(), kind.as_db_str(), keyword])?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}

// ── Migrations ──────────────────────────────────────────────────

/// Run schema migrations using `PRAGMA user_version` for version tracking.
fn run_migrations(conn: &Connection) -> Result<(), SenbetsuError> {
    let version: i32 = conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .unwrap_or(0);

    if version < 1 {
        conn.execute_batch(SCHEMA_V1)?;
        conn.pragma_update(None, "user_version", 1)?;
    }
    Ok(())
}
