//! Index store access.
//!
//! The index store is the system-provided metadata catalog of files. This
//! module defines the narrow query interface the engine needs plus a
//! SQLite-backed reference implementation used in production and in tests.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use rusqlite::types::Value;
use rusqlite::Connection;
use rustc_hash::FxHashSet;

use crate::error::EngineError;
use crate::models::{
    MediaCategory, QueryFilter, TypeFilter, ARCHIVE_EXTENSIONS, DOCUMENT_EXTENSIONS,
};

/// One row returned by an index store query.
#[derive(Debug, Clone)]
pub struct IndexRow {
    pub id: i64,
    pub category: MediaCategory,
    pub modified_secs: i64,
    pub display_name: String,
    pub path: Option<String>,
}

/// Paged, filtered access to the file metadata catalog.
///
/// `query_page` must return rows sorted by modified time descending so that
/// concatenated pages form one descending list.
pub trait IndexStore: Send + Sync {
    fn query_page(
        &self,
        filter: &QueryFilter,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<IndexRow>, EngineError>;

    /// Distinct parent-directory names whose name starts with `prefix`,
    /// case-insensitively. Used for folder autocompletion.
    fn folder_names(&self, prefix: &str) -> Result<Vec<String>, EngineError>;
}

/// SQLite-backed index store.
pub struct SqliteIndexStore {
    conn: Mutex<Connection>,
}

impl SqliteIndexStore {
    pub fn open(path: &Path) -> Result<Self, EngineError> {
        let conn = Connection::open(path)?;
        Self::init_schema(&conn)?;
        Ok(SqliteIndexStore {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> Result<Self, EngineError> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(SqliteIndexStore {
            conn: Mutex::new(conn),
        })
    }

    fn init_schema(conn: &Connection) -> Result<(), rusqlite::Error> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS files (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                category TEXT NOT NULL,
                modified_secs INTEGER NOT NULL,
                display_name TEXT NOT NULL,
                path TEXT
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_files_modified ON files(modified_secs)",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_files_category ON files(category)",
            [],
        )?;

        Ok(())
    }

    /// Insert a catalog row, returning its id.
    pub fn insert(
        &self,
        category: MediaCategory,
        modified_secs: i64,
        display_name: &str,
        path: Option<&str>,
    ) -> Result<i64, EngineError> {
        let conn = self.conn.lock().map_err(|_| EngineError::StorePoisoned)?;
        conn.execute(
            "INSERT INTO files (category, modified_secs, display_name, path)
             VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![category.as_str(), modified_secs, display_name, path],
        )?;
        Ok(conn.last_insert_rowid())
    }
}

/// Build an extension-suffix clause for kinds the store category does not
/// distinguish (documents, archives).
fn extension_clause(extensions: &[&str]) -> String {
    let alternatives: Vec<String> = extensions
        .iter()
        .map(|ext| format!("LOWER(display_name) LIKE '%.{ext}'"))
        .collect();
    format!("({})", alternatives.join(" OR "))
}

impl IndexStore for SqliteIndexStore {
    fn query_page(
        &self,
        filter: &QueryFilter,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<IndexRow>, EngineError> {
        let mut clauses: Vec<String> = Vec::new();
        let mut params: Vec<Value> = Vec::new();

        match filter.type_filter {
            TypeFilter::All => {}
            TypeFilter::Images => {
                clauses.push("category = ?".into());
                params.push(Value::Text("image".into()));
            }
            TypeFilter::Videos => {
                clauses.push("category = ?".into());
                params.push(Value::Text("video".into()));
            }
            TypeFilter::Documents => clauses.push(extension_clause(DOCUMENT_EXTENSIONS)),
            TypeFilter::Archives => clauses.push(extension_clause(ARCHIVE_EXTENSIONS)),
            TypeFilter::Other => {
                clauses.push("category NOT IN ('image', 'video', 'audio')".into())
            }
        }

        if let Some((start, end)) = filter.date_range {
            clauses.push("modified_secs >= ? AND modified_secs <= ?".into());
            params.push(Value::Integer(start));
            params.push(Value::Integer(end));
        }

        if let Some(folder) = &filter.folder {
            // Literal containment: `%` and `_` in the folder substring are
            // characters, not wildcards, matching the fallback scan.
            clauses.push("path LIKE ? ESCAPE '\\'".into());
            let escaped = folder
                .replace('\\', "\\\\")
                .replace('%', "\\%")
                .replace('_', "\\_");
            params.push(Value::Text(format!("%{escaped}%")));
        }

        let where_sql = if clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", clauses.join(" AND "))
        };
        let sql = format!(
            "SELECT id, category, modified_secs, display_name, path
             FROM files {where_sql}
             ORDER BY modified_secs DESC
             LIMIT ? OFFSET ?"
        );
        params.push(Value::Integer(limit as i64));
        params.push(Value::Integer(offset as i64));

        let conn = self.conn.lock().map_err(|_| EngineError::StorePoisoned)?;
        // The prepared statement lives only for this page; it is released
        // when the scope ends, even on an early error.
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(params.iter()), |row| {
            Ok(IndexRow {
                id: row.get(0)?,
                category: MediaCategory::parse(&row.get::<_, String>(1)?),
                modified_secs: row.get(2)?,
                display_name: row.get(3)?,
                path: row.get(4)?,
            })
        })?;

        let mut page = Vec::new();
        for row in rows {
            page.push(row?);
        }
        Ok(page)
    }

    fn folder_names(&self, prefix: &str) -> Result<Vec<String>, EngineError> {
        if prefix.is_empty() {
            return Ok(Vec::new());
        }
        let prefix_lower = prefix.to_lowercase();

        let paths: Vec<String> = {
            let conn = self.conn.lock().map_err(|_| EngineError::StorePoisoned)?;
            let mut stmt = conn.prepare("SELECT path FROM files WHERE path IS NOT NULL")?;
            let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
            let mut paths = Vec::new();
            for row in rows {
                paths.push(row?);
            }
            paths
        };

        let mut seen: FxHashSet<String> = FxHashSet::default();
        let mut names = Vec::new();
        for path in paths {
            let Some(parent_name) = PathBuf::from(&path)
                .parent()
                .and_then(|p| p.file_name())
                .and_then(|n| n.to_str().map(str::to_string))
            else {
                continue;
            };
            if parent_name.to_lowercase().starts_with(&prefix_lower)
                && seen.insert(parent_name.clone())
            {
                names.push(parent_name);
            }
        }
        names.sort();
        Ok(names)
    }
}
