// Catalog sources: JSON, JSON Lines, SQLite and in-memory records
use crate::error::LoadError;
use crate::product::{Catalog, ProductRecord};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub type LoadResult<T> = std::result::Result<T, LoadError>;

/// Default table name for SQLite catalogs.
pub const DEFAULT_TABLE: &str = "products";

/// Anything that can produce a catalog.
///
/// Sources only read: no caching, and no validation beyond turning missing
/// text fields into empty strings and rejecting duplicate ids.
/// A reachable source with zero records yields an empty catalog.
pub trait CatalogSource: Send + Sync {
    /// Human-readable location, used in logs and errors.
    fn describe(&self) -> String;

    fn load(&self) -> LoadResult<Catalog>;
}

fn finish(source: &dyn CatalogSource, records: Vec<ProductRecord>) -> LoadResult<Catalog> {
    let catalog = Catalog::from_records(records)?;
    info!("Loaded {} products from {}", catalog.len(), source.describe());
    Ok(catalog)
}

fn unavailable(path: &Path, reason: impl ToString) -> LoadError {
    LoadError::SourceUnavailable {
        location: path.display().to_string(),
        reason: reason.to_string(),
    }
}

/// A JSON array of product objects.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CatalogSource for JsonFileSource {
    fn describe(&self) -> String {
        format!("json:{}", self.path.display())
    }

    fn load(&self) -> LoadResult<Catalog> {
        let raw = fs::read_to_string(&self.path).map_err(|e| unavailable(&self.path, e))?;
        let records: Vec<ProductRecord> = serde_json::from_str(&raw)
            .map_err(|e| LoadError::Malformed(format!("{}: {}", self.path.display(), e)))?;
        finish(self, records)
    }
}

/// One JSON product object per line. Blank lines are skipped.
#[derive(Debug, Clone)]
pub struct JsonLinesSource {
    path: PathBuf,
}

impl JsonLinesSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CatalogSource for JsonLinesSource {
    fn describe(&self) -> String {
        format!("jsonl:{}", self.path.display())
    }

    fn load(&self) -> LoadResult<Catalog> {
        let file = fs::File::open(&self.path).map_err(|e| unavailable(&self.path, e))?;
        let mut records = Vec::new();

        for (line_no, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record: ProductRecord = serde_json::from_str(&line).map_err(|e| {
                LoadError::Malformed(format!(
                    "{} line {}: {}",
                    self.path.display(),
                    line_no + 1,
                    e
                ))
            })?;
            records.push(record);
        }

        finish(self, records)
    }
}

/// A SQLite table with `product_id, name, category, description` columns.
///
/// The database is opened read-only and never created.
#[derive(Debug, Clone)]
pub struct SqliteSource {
    path: PathBuf,
    table: String,
}

impl SqliteSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            table: DEFAULT_TABLE.to_string(),
        }
    }

    /// Read from a different table. The name must be a plain identifier.
    pub fn with_table(mut self, table: impl Into<String>) -> LoadResult<Self> {
        let table = table.into();
        if !is_identifier(&table) {
            return Err(LoadError::Malformed(format!(
                "invalid table name '{}'",
                table
            )));
        }
        self.table = table;
        Ok(self)
    }

    pub fn table(&self) -> &str {
        &self.table
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn text_column(value: ValueRef<'_>) -> rusqlite::Result<Option<String>> {
    Ok(match value {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Some(String::from_utf8_lossy(bytes).into_owned())
        }
    })
}

impl CatalogSource for SqliteSource {
    fn describe(&self) -> String {
        format!("sqlite:{}#{}", self.path.display(), self.table)
    }

    fn load(&self) -> LoadResult<Catalog> {
        if !self.path.is_file() {
            return Err(unavailable(&self.path, "database file not found"));
        }
        let conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| unavailable(&self.path, e))?;

        let sql = format!(
            "SELECT product_id, name, category, description FROM {}",
            self.table
        );
        debug!("Catalog query: {}", sql);

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], |row| {
            Ok((
                text_column(row.get_ref(0)?)?,
                text_column(row.get_ref(1)?)?,
                text_column(row.get_ref(2)?)?,
                text_column(row.get_ref(3)?)?,
            ))
        })?;

        let mut records = Vec::new();
        for (row_no, row) in rows.enumerate() {
            let (id, name, category, description) = row?;
            let id = id.ok_or_else(|| {
                LoadError::Malformed(format!("row {} has a NULL product_id", row_no))
            })?;
            records.push(ProductRecord::from_nullable(id, name, category, description));
        }

        finish(self, records)
    }
}

/// Records already in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    records: Vec<ProductRecord>,
}

impl MemorySource {
    pub fn new(records: Vec<ProductRecord>) -> Self {
        Self { records }
    }
}

impl CatalogSource for MemorySource {
    fn describe(&self) -> String {
        format!("memory:{} records", self.records.len())
    }

    fn load(&self) -> LoadResult<Catalog> {
        finish(self, self.records.clone())
    }
}

/// Pick a source from the file extension.
pub fn source_from_path(path: impl AsRef<Path>) -> LoadResult<Box<dyn CatalogSource>> {
    source_from_path_with_table(path, DEFAULT_TABLE)
}

/// Like [`source_from_path`], reading SQLite catalogs from `table`. The
/// table is ignored for other formats.
pub fn source_from_path_with_table(
    path: impl AsRef<Path>,
    table: &str,
) -> LoadResult<Box<dyn CatalogSource>> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "json" => Ok(Box::new(JsonFileSource::new(path))),
        "jsonl" | "ndjson" => Ok(Box::new(JsonLinesSource::new(path))),
        "db" | "sqlite" | "sqlite3" => Ok(Box::new(SqliteSource::new(path).with_table(table)?)),
        _ => Err(LoadError::UnsupportedFormat(path.display().to_string())),
    }
}
