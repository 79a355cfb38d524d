//! SQLite-backed torrent catalog implementation.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::functions::FunctionFlags;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, ToSql};
use tracing::debug;

use super::{
    normalize_info_hash, CatalogError, CatalogStats, NewTorrent, TorrentCatalog, TorrentFile,
    TorrentMetadata,
};
use crate::search::{
    relevance_score, Cursor, OrderingCriterion, TorrentQuery, SQL_LAST_ID_PARAM,
    SQL_LAST_VALUE_PARAM,
};

const TORRENT_COLUMNS: &str = "t.id, t.info_hash, t.name, t.total_size, t.n_files, \
     t.discovered_on, t.updated_on, t.n_seeders, t.n_leechers";

/// SQLite-backed torrent catalog.
pub struct SqliteCatalog {
    conn: Mutex<Connection>,
}

impl SqliteCatalog {
    /// Open (or create) the catalog database at `path`.
    pub fn new(path: &Path) -> Result<Self, CatalogError> {
        let conn = Connection::open(path).map_err(|e| CatalogError::Database(e.to_string()))?;
        Self::register_functions(&conn)?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite catalog (useful for testing).
    pub fn in_memory() -> Result<Self, CatalogError> {
        let conn =
            Connection::open_in_memory().map_err(|e| CatalogError::Database(e.to_string()))?;
        Self::register_functions(&conn)?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// `torrent_relevance(query, name)`: the relevance key of text searches.
    fn register_functions(conn: &Connection) -> Result<(), CatalogError> {
        conn.create_scalar_function(
            "torrent_relevance",
            2,
            FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
            |ctx| {
                let query = ctx.get::<String>(0)?;
                let name = ctx.get::<String>(1)?;
                Ok(relevance_score(&query, &name))
            },
        )
        .map_err(|e| CatalogError::Database(e.to_string()))
    }

    fn initialize_schema(conn: &Connection) -> Result<(), CatalogError> {
        conn.execute_batch(
            r#"
            PRAGMA foreign_keys = ON;

            -- One row per discovered torrent. AUTOINCREMENT keeps ids strictly
            -- increasing even after deletions; they are the pagination tie-breaker.
            CREATE TABLE IF NOT EXISTS torrents (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                info_hash TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL,
                total_size INTEGER NOT NULL CHECK (total_size >= 0),
                n_files INTEGER NOT NULL CHECK (n_files >= 0),
                discovered_on INTEGER NOT NULL CHECK (discovered_on > 0),
                updated_on INTEGER NOT NULL,
                n_seeders INTEGER NOT NULL DEFAULT 0,
                n_leechers INTEGER NOT NULL DEFAULT 0
            );

            CREATE INDEX IF NOT EXISTS idx_torrents_discovered_on ON torrents(discovered_on, id);
            CREATE INDEX IF NOT EXISTS idx_torrents_total_size ON torrents(total_size, id);
            CREATE INDEX IF NOT EXISTS idx_torrents_n_files ON torrents(n_files, id);
            CREATE INDEX IF NOT EXISTS idx_torrents_updated_on ON torrents(updated_on, id);
            CREATE INDEX IF NOT EXISTS idx_torrents_n_seeders ON torrents(n_seeders, id);
            CREATE INDEX IF NOT EXISTS idx_torrents_n_leechers ON torrents(n_leechers, id);

            -- Files within torrents
            CREATE TABLE IF NOT EXISTS files (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                torrent_id INTEGER NOT NULL REFERENCES torrents(id) ON DELETE CASCADE,
                size INTEGER NOT NULL,
                path TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_files_torrent_id ON files(torrent_id);

            -- Full-text index over torrent names
            CREATE VIRTUAL TABLE IF NOT EXISTS torrents_idx USING fts5(
                name,
                content = 'torrents',
                content_rowid = 'id',
                tokenize = 'porter unicode61'
            );

            CREATE TRIGGER IF NOT EXISTS torrents_idx_ai AFTER INSERT ON torrents BEGIN
                INSERT INTO torrents_idx(rowid, name) VALUES (new.id, new.name);
            END;

            CREATE TRIGGER IF NOT EXISTS torrents_idx_ad AFTER DELETE ON torrents BEGIN
                INSERT INTO torrents_idx(torrents_idx, rowid, name) VALUES ('delete', old.id, old.name);
            END;

            CREATE TRIGGER IF NOT EXISTS torrents_idx_au AFTER UPDATE OF name ON torrents BEGIN
                INSERT INTO torrents_idx(torrents_idx, rowid, name) VALUES ('delete', old.id, old.name);
                INSERT INTO torrents_idx(rowid, name) VALUES (new.id, new.name);
            END;
            "#,
        )
        .map_err(|e| CatalogError::Database(e.to_string()))?;

        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, CatalogError> {
        self.conn
            .lock()
            .map_err(|_| CatalogError::Database("connection lock poisoned".to_string()))
    }

    /// SQL expression holding the primary key of `criterion`.
    fn sort_column(criterion: OrderingCriterion) -> &'static str {
        match criterion {
            OrderingCriterion::ByRelevance => "torrent_relevance(:query, t.name)",
            OrderingCriterion::ByTotalSize => "t.total_size",
            OrderingCriterion::ByDiscoveredOn => "t.discovered_on",
            OrderingCriterion::ByNFiles => "t.n_files",
            OrderingCriterion::ByUpdatedOn => "t.updated_on",
            OrderingCriterion::ByNSeeders => "t.n_seeders",
            OrderingCriterion::ByNLeechers => "t.n_leechers",
        }
    }

    /// Build the page query for `query`. Named parameters: `:epoch`, `:limit`,
    /// `:query` for text searches, and the cursor parameters when resuming.
    fn page_sql(query: &TorrentQuery) -> String {
        let key = Self::sort_column(query.order_by);
        let dir = query.direction.sql_keyword();

        let mut sql = if query.is_text_search() {
            format!(
                "WITH matched AS MATERIALIZED (
                     SELECT rowid AS id FROM torrents_idx WHERE torrents_idx MATCH :query
                 )
                 SELECT {TORRENT_COLUMNS}, torrent_relevance(:query, t.name)
                 FROM torrents t JOIN matched ON matched.id = t.id"
            )
        } else {
            format!("SELECT {TORRENT_COLUMNS}, NULL FROM torrents t")
        };

        sql.push_str(" WHERE t.discovered_on <= :epoch");
        if query.cursor.is_some() {
            sql.push_str(" AND ");
            sql.push_str(&Cursor::sql_predicate(key, "t.id", query.direction));
        }
        sql.push_str(&format!(" ORDER BY {key} {dir}, t.id {dir} LIMIT :limit"));
        sql
    }

    /// Convert a row (TORRENT_COLUMNS followed by relevance) to TorrentMetadata.
    fn row_to_torrent(row: &rusqlite::Row) -> rusqlite::Result<TorrentMetadata> {
        Ok(TorrentMetadata {
            id: row.get(0)?,
            info_hash: row.get(1)?,
            name: row.get(2)?,
            total_size: row.get(3)?,
            n_files: row.get(4)?,
            discovered_on: row.get(5)?,
            updated_on: row.get(6)?,
            n_seeders: row.get(7)?,
            n_leechers: row.get(8)?,
            relevance: row.get(9)?,
        })
    }

    /// Errors raised while evaluating a MATCH expression are the caller's
    /// fault (FTS5 syntax); everything else is a storage failure.
    fn classify_query_error(err: rusqlite::Error, text_search: bool) -> CatalogError {
        match &err {
            rusqlite::Error::SqliteFailure(failure, _)
                if text_search && failure.code == ErrorCode::Unknown =>
            {
                CatalogError::InvalidQuery(err.to_string())
            }
            _ => CatalogError::Database(err.to_string()),
        }
    }

    fn find_id(conn: &Connection, info_hash: &str) -> Result<Option<i64>, CatalogError> {
        conn.query_row(
            "SELECT id FROM torrents WHERE info_hash = ?",
            params![info_hash],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| CatalogError::Database(e.to_string()))
    }
}

impl TorrentCatalog for SqliteCatalog {
    fn query_torrents(&self, query: &TorrentQuery) -> Result<Vec<TorrentMetadata>, CatalogError> {
        let text_search = query.is_text_search();
        if query.order_by == OrderingCriterion::ByRelevance && !text_search {
            return Err(CatalogError::InvalidQuery(
                "relevance ordering requires a non-empty query".to_string(),
            ));
        }

        let sql = Self::page_sql(query);
        let limit = i64::from(query.page_size);
        let last_value = query.cursor.map(|c| c.last_ordered_value.get());
        let last_id = query.cursor.map(|c| c.last_id);

        let mut bindings: Vec<(&str, &dyn ToSql)> = vec![
            (":epoch", &query.epoch as &dyn ToSql),
            (":limit", &limit as &dyn ToSql),
        ];
        if text_search {
            bindings.push((":query", &query.query as &dyn ToSql));
        }
        if let (Some(value), Some(id)) = (&last_value, &last_id) {
            bindings.push((SQL_LAST_VALUE_PARAM, value as &dyn ToSql));
            bindings.push((SQL_LAST_ID_PARAM, id as &dyn ToSql));
        }

        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| Self::classify_query_error(e, text_search))?;

        let rows = stmt
            .query_map(bindings.as_slice(), Self::row_to_torrent)
            .map_err(|e| Self::classify_query_error(e, text_search))?;

        let mut torrents = Vec::new();
        for row in rows {
            torrents.push(row.map_err(|e| Self::classify_query_error(e, text_search))?);
        }

        debug!(
            order_by = query.order_by.label(),
            text_search,
            rows = torrents.len(),
            "Queried torrents"
        );

        Ok(torrents)
    }

    fn get_torrent(&self, info_hash: &str) -> Result<TorrentMetadata, CatalogError> {
        let info_hash = normalize_info_hash(info_hash)?;
        let conn = self.conn()?;

        conn.query_row(
            &format!("SELECT {TORRENT_COLUMNS}, NULL FROM torrents t WHERE t.info_hash = ?"),
            params![&info_hash],
            Self::row_to_torrent,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => CatalogError::NotFound(info_hash.clone()),
            _ => CatalogError::Database(e.to_string()),
        })
    }

    fn get_files(&self, info_hash: &str) -> Result<Vec<TorrentFile>, CatalogError> {
        let info_hash = normalize_info_hash(info_hash)?;
        let conn = self.conn()?;

        let torrent_id =
            Self::find_id(&conn, &info_hash)?.ok_or(CatalogError::NotFound(info_hash))?;

        let mut stmt = conn
            .prepare("SELECT path, size FROM files WHERE torrent_id = ? ORDER BY id")
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(params![torrent_id], |row| {
                Ok(TorrentFile {
                    path: row.get(0)?,
                    size: row.get(1)?,
                })
            })
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        let mut files = Vec::new();
        for row in rows {
            files.push(row.map_err(|e| CatalogError::Database(e.to_string()))?);
        }
        Ok(files)
    }

    fn stats(&self) -> Result<CatalogStats, CatalogError> {
        let conn = self.conn()?;

        let (n_torrents, total_size, oldest_discovered_on, newest_discovered_on) = conn
            .query_row(
                "SELECT COUNT(*), COALESCE(SUM(total_size), 0), MIN(discovered_on), MAX(discovered_on)
                 FROM torrents",
                [],
                |row| {
                    Ok((
                        row.get::<_, u64>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, Option<i64>>(2)?,
                        row.get::<_, Option<i64>>(3)?,
                    ))
                },
            )
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        let n_files: u64 = conn
            .query_row("SELECT COUNT(*) FROM files", [], |row| row.get(0))
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        Ok(CatalogStats {
            n_torrents,
            n_files,
            total_size: total_size as u64,
            oldest_discovered_on,
            newest_discovered_on,
        })
    }

    fn insert(&self, torrent: &NewTorrent) -> Result<i64, CatalogError> {
        let info_hash = normalize_info_hash(&torrent.info_hash)?;
        let mut conn = self.conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        tx.execute(
            "INSERT INTO torrents (info_hash, name, total_size, n_files, discovered_on, updated_on, n_seeders, n_leechers)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                &info_hash,
                &torrent.name,
                torrent.total_size() as i64,
                torrent.files.len() as i64,
                torrent.discovered_on,
                torrent.updated_on,
                torrent.n_seeders,
                torrent.n_leechers,
            ],
        )
        .map_err(|e| match &e {
            rusqlite::Error::SqliteFailure(failure, _)
                if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                CatalogError::Duplicate(info_hash.clone())
            }
            _ => CatalogError::Database(e.to_string()),
        })?;

        let id = tx.last_insert_rowid();

        for file in &torrent.files {
            tx.execute(
                "INSERT INTO files (torrent_id, size, path) VALUES (?, ?, ?)",
                params![id, file.size as i64, &file.path],
            )
            .map_err(|e| CatalogError::Database(e.to_string()))?;
        }

        tx.commit()
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        Ok(id)
    }

    fn remove(&self, info_hash: &str) -> Result<(), CatalogError> {
        let info_hash = normalize_info_hash(info_hash)?;
        let conn = self.conn()?;

        // Cascades to files; the trigger drops the full-text entry.
        let rows_affected = conn
            .execute("DELETE FROM torrents WHERE info_hash = ?", params![&info_hash])
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        if rows_affected == 0 {
            return Err(CatalogError::NotFound(info_hash));
        }

        Ok(())
    }
}
