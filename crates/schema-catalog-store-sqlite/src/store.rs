// crates/schema-catalog-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Catalog Store
// Description: Durable CatalogStore backed by SQLite.
// Purpose: Persist catalog rows with per-operation transactions.
// Dependencies: schema-catalog-core, rusqlite, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! This module implements a durable [`CatalogStore`] using `SQLite`. Version
//! snapshots are insert-if-absent and never rewritten; the subject high-water
//! mark only moves upward. Stale subject removal deletes every dependent row
//! in a single transaction, so a failed removal leaves the catalog unchanged.
//! Database contents are treated as untrusted on read: malformed JSON columns
//! or unknown schema types surface as [`SqliteStoreError::Invalid`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::Transaction;
use rusqlite::params;
use rusqlite::params_from_iter;
use schema_catalog_core::ArtifactRecord;
use schema_catalog_core::CatalogStore;
use schema_catalog_core::FieldsMeta;
use schema_catalog_core::MetadataRecord;
use schema_catalog_core::RemovalCounts;
use schema_catalog_core::SchemaReference;
use schema_catalog_core::SchemaType;
use schema_catalog_core::SchemaVersionSnapshot;
use schema_catalog_core::StoreError;
use schema_catalog_core::SubjectCatalogEntry;
use schema_catalog_core::SubjectMetaUpdate;
use schema_catalog_core::UpsertOutcome;
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version for the catalog store.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum bound parameters per `IN (...)` statement.
const IN_LIST_CHUNK: usize = 500;
/// Tables holding per-subject rows, in deletion order.
const SUBJECT_TABLES: [&str; 4] =
    ["schema_versions", "schema_artifacts", "subject_metadata", "subjects"];

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `journal_mode` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteStoreMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteStoreMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` catalog store.
///
/// # Invariants
/// - `path` must resolve to a file path (not a directory).
/// - `busy_timeout_ms` is interpreted as milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl SqliteStoreConfig {
    /// Creates a config for the given path with default pragmas.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` store errors.
///
/// # Invariants
/// - Error messages avoid embedding schema bodies.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Store schema version mismatch.
    #[error("sqlite store version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid store data or configuration.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
}

impl From<rusqlite::Error> for SqliteStoreError {
    fn from(error: rusqlite::Error) -> Self {
        Self::Db(error.to_string())
    }
}

impl From<SqliteStoreError> for StoreError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Io(message) => Self::Io(message),
            SqliteStoreError::Db(message) => Self::Store(message),
            SqliteStoreError::VersionMismatch(message) => Self::VersionMismatch(message),
            SqliteStoreError::Invalid(message) => Self::Invalid(message),
        }
    }
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// `SQLite`-backed catalog store.
///
/// # Invariants
/// - Connection access is serialized through a mutex; calls block the
///   calling thread, so async callers run them on the blocking pool.
/// - Every [`CatalogStore`] call commits or rolls back exactly one transaction.
#[derive(Clone)]
pub struct SqliteCatalogStore {
    /// Store configuration.
    config: SqliteStoreConfig,
    /// Shared connection guarded by a mutex.
    connection: Arc<Mutex<Connection>>,
}

impl SqliteCatalogStore {
    /// Opens (and if needed creates) an `SQLite` catalog store.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the path is invalid, the database
    /// cannot be opened, or its schema version is unsupported.
    pub fn open(config: SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        validate_store_path(&config.path)?;
        ensure_parent_dir(&config.path)?;
        let mut connection = open_connection(&config)?;
        initialize_schema(&mut connection)?;
        debug!(path = %config.path.display(), "opened sqlite catalog store");
        Ok(Self {
            config,
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// Returns the store configuration.
    #[must_use]
    pub const fn config(&self) -> &SqliteStoreConfig {
        &self.config
    }

    /// Verifies the store can execute a simple SQL statement.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] if the mutex is poisoned or the query fails.
    pub fn check_connection(&self) -> Result<(), SqliteStoreError> {
        let guard = self.lock()?;
        guard.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(())
    }

    /// Locks the shared connection.
    fn lock(&self) -> Result<MutexGuard<'_, Connection>, SqliteStoreError> {
        self.connection.lock().map_err(|_| SqliteStoreError::Io("sqlite mutex poisoned".to_string()))
    }

    /// Runs `op` inside a transaction, committing on success.
    fn with_tx<T>(
        &self,
        op: impl FnOnce(&Transaction<'_>) -> Result<T, SqliteStoreError>,
    ) -> Result<T, SqliteStoreError> {
        let mut guard = self.lock()?;
        let tx = guard.transaction()?;
        let value = op(&tx)?;
        tx.commit()?;
        Ok(value)
    }

    /// Inserts a snapshot if absent and ratchets the subject high-water mark.
    fn upsert_version_tx(
        tx: &Transaction<'_>,
        snapshot: &SchemaVersionSnapshot,
    ) -> Result<UpsertOutcome, SqliteStoreError> {
        let now = unix_millis();
        let inserted = tx.execute(
            "INSERT INTO schema_versions (subject, version, schema_type, registry_id, \
             schema_body, canonical_hash, references_json, rule_set_json, metadata_json, \
             fields_meta_json, lint_report_json, synced_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
             ON CONFLICT (subject, version) DO NOTHING",
            params![
                snapshot.subject,
                snapshot.version,
                snapshot.schema_type.as_str(),
                snapshot.registry_id,
                snapshot.schema_body,
                snapshot.canonical_hash,
                to_json_column(snapshot.references.as_ref())?,
                to_json_column(snapshot.rule_set.as_ref())?,
                to_json_column(snapshot.registry_metadata.as_ref())?,
                to_json_column(snapshot.fields_meta.as_ref())?,
                to_json_column(snapshot.lint_report.as_ref())?,
                now,
            ],
        )?;
        tx.execute(
            "INSERT INTO subjects (subject, latest_version, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT (subject) DO UPDATE SET
               latest_version = MAX(COALESCE(subjects.latest_version, 0), excluded.latest_version),
               updated_at = excluded.updated_at",
            params![snapshot.subject, snapshot.version, now],
        )?;
        Ok(if inserted == 0 { UpsertOutcome::AlreadyPresent } else { UpsertOutcome::Inserted })
    }
}

impl CatalogStore for SqliteCatalogStore {
    fn latest_version(&self, subject: &str) -> Result<Option<u32>, StoreError> {
        let guard = self.lock()?;
        let latest: Option<Option<u32>> = guard
            .query_row(
                "SELECT latest_version FROM subjects WHERE subject = ?1",
                params![subject],
                |row| row.get(0),
            )
            .optional()
            .map_err(SqliteStoreError::from)?;
        Ok(latest.flatten())
    }

    fn upsert_version(
        &self,
        snapshot: &SchemaVersionSnapshot,
    ) -> Result<UpsertOutcome, StoreError> {
        Ok(self.with_tx(|tx| Self::upsert_version_tx(tx, snapshot))?)
    }

    fn update_subject_meta(
        &self,
        subject: &str,
        update: &SubjectMetaUpdate,
    ) -> Result<bool, StoreError> {
        let changed = self.with_tx(|tx| {
            Ok(tx.execute(
                "UPDATE subjects SET
                   compatibility_level = COALESCE(?2, compatibility_level),
                   mode_read_only = COALESCE(?3, mode_read_only),
                   environment = COALESCE(?4, environment),
                   updated_at = ?5
                 WHERE subject = ?1",
                params![
                    subject,
                    update.compatibility_level,
                    update.mode_read_only,
                    update.environment,
                    unix_millis(),
                ],
            )?)
        })?;
        Ok(changed > 0)
    }

    fn known_subjects(&self) -> Result<BTreeSet<String>, StoreError> {
        let guard = self.lock()?;
        let mut stmt = guard
            .prepare(
                "SELECT subject FROM subjects
                 UNION SELECT subject FROM schema_versions
                 UNION SELECT subject FROM schema_artifacts
                 UNION SELECT subject FROM subject_metadata",
            )
            .map_err(SqliteStoreError::from)?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(SqliteStoreError::from)?;
        let mut subjects = BTreeSet::new();
        for row in rows {
            subjects.insert(row.map_err(SqliteStoreError::from)?);
        }
        Ok(subjects)
    }

    fn count_rows(&self, subjects: &BTreeSet<String>) -> Result<RemovalCounts, StoreError> {
        Ok(self.with_tx(|tx| count_subject_rows(tx, subjects))?)
    }

    fn remove_subjects(&self, subjects: &BTreeSet<String>) -> Result<RemovalCounts, StoreError> {
        if subjects.is_empty() {
            return Ok(RemovalCounts::default());
        }
        let counts = self.with_tx(|tx| {
            let counts = count_subject_rows(tx, subjects)?;
            for table in SUBJECT_TABLES {
                for_each_chunk(subjects, |placeholders, chunk| {
                    tx.execute(
                        &format!("DELETE FROM {table} WHERE subject IN ({placeholders})"),
                        params_from_iter(chunk.iter()),
                    )?;
                    Ok(())
                })?;
            }
            Ok(counts)
        })?;
        debug!(subjects = subjects.len(), versions = counts.versions, "removed subject rows");
        Ok(counts)
    }

    fn subject_entry(&self, subject: &str) -> Result<Option<SubjectCatalogEntry>, StoreError> {
        let guard = self.lock()?;
        let entry = guard
            .query_row(
                "SELECT subject, latest_version, compatibility_level, mode_read_only, environment, \
                 owner_team, pii_score, risk_score FROM subjects WHERE subject = ?1",
                params![subject],
                map_subject_row,
            )
            .optional()
            .map_err(SqliteStoreError::from)?;
        Ok(entry)
    }

    fn list_subject_entries(&self) -> Result<Vec<SubjectCatalogEntry>, StoreError> {
        let guard = self.lock()?;
        let mut stmt = guard
            .prepare(
                "SELECT subject, latest_version, compatibility_level, mode_read_only, environment, \
                 owner_team, pii_score, risk_score FROM subjects ORDER BY subject",
            )
            .map_err(SqliteStoreError::from)?;
        let rows = stmt.query_map([], map_subject_row).map_err(SqliteStoreError::from)?;
        let mut entries = Vec::new();
        for row in rows {
            entries.push(row.map_err(SqliteStoreError::from)?);
        }
        Ok(entries)
    }

    fn version_snapshot(
        &self,
        subject: &str,
        version: u32,
    ) -> Result<Option<SchemaVersionSnapshot>, StoreError> {
        let guard = self.lock()?;
        let row = guard
            .query_row(
                "SELECT schema_type, registry_id, schema_body, canonical_hash, references_json, \
                 rule_set_json, metadata_json, fields_meta_json, lint_report_json
                 FROM schema_versions WHERE subject = ?1 AND version = ?2",
                params![subject, version],
                |row| {
                    Ok(SnapshotRow {
                        schema_type: row.get(0)?,
                        registry_id: row.get(1)?,
                        schema_body: row.get(2)?,
                        canonical_hash: row.get(3)?,
                        references_json: row.get(4)?,
                        rule_set_json: row.get(5)?,
                        metadata_json: row.get(6)?,
                        fields_meta_json: row.get(7)?,
                        lint_report_json: row.get(8)?,
                    })
                },
            )
            .optional()
            .map_err(SqliteStoreError::from)?;
        drop(guard);
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(build_snapshot_from_row(subject, version, row)?))
    }

    fn list_versions(&self, subject: &str) -> Result<Vec<u32>, StoreError> {
        let guard = self.lock()?;
        let mut stmt = guard
            .prepare("SELECT version FROM schema_versions WHERE subject = ?1 ORDER BY version")
            .map_err(SqliteStoreError::from)?;
        let rows = stmt
            .query_map(params![subject], |row| row.get::<_, u32>(0))
            .map_err(SqliteStoreError::from)?;
        let mut versions = Vec::new();
        for row in rows {
            versions.push(row.map_err(SqliteStoreError::from)?);
        }
        Ok(versions)
    }

    fn record_artifact(&self, record: &ArtifactRecord) -> Result<(), StoreError> {
        let payload = to_json_text(&record.payload)?;
        self.with_tx(|tx| {
            tx.execute(
                "INSERT INTO schema_artifacts (subject, version, kind, payload_json, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![record.subject, record.version, record.kind, payload, unix_millis()],
            )?;
            Ok(())
        })?;
        Ok(())
    }

    fn record_metadata(&self, record: &MetadataRecord) -> Result<(), StoreError> {
        let value = to_json_text(&record.value)?;
        self.with_tx(|tx| {
            tx.execute(
                "INSERT INTO subject_metadata (subject, key, value_json, updated_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT (subject, key) DO UPDATE SET
                   value_json = excluded.value_json,
                   updated_at = excluded.updated_at",
                params![record.subject, record.key, value, unix_millis()],
            )?;
            Ok(())
        })?;
        Ok(())
    }
}

// ============================================================================
// SECTION: Row Mapping
// ============================================================================

/// Raw version row before JSON decoding.
struct SnapshotRow {
    /// Stored schema type label.
    schema_type: String,
    /// Registry schema identifier.
    registry_id: Option<i64>,
    /// Raw schema body.
    schema_body: String,
    /// Canonical hash.
    canonical_hash: String,
    /// JSON-encoded references.
    references_json: Option<String>,
    /// JSON-encoded rule set.
    rule_set_json: Option<String>,
    /// JSON-encoded registry metadata.
    metadata_json: Option<String>,
    /// JSON-encoded field metadata.
    fields_meta_json: Option<String>,
    /// JSON-encoded lint report.
    lint_report_json: Option<String>,
}

/// Maps a `subjects` row to a catalog entry.
fn map_subject_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SubjectCatalogEntry> {
    Ok(SubjectCatalogEntry {
        subject: row.get(0)?,
        latest_version: row.get(1)?,
        compatibility_level: row.get(2)?,
        mode_read_only: row.get(3)?,
        environment: row.get(4)?,
        owner_team: row.get(5)?,
        pii_score: row.get(6)?,
        risk_score: row.get(7)?,
    })
}

/// Decodes a stored version row into a snapshot.
fn build_snapshot_from_row(
    subject: &str,
    version: u32,
    row: SnapshotRow,
) -> Result<SchemaVersionSnapshot, SqliteStoreError> {
    let schema_type = SchemaType::parse(&row.schema_type).ok_or_else(|| {
        SqliteStoreError::Invalid(format!("unknown schema type for {subject} v{version}"))
    })?;
    Ok(SchemaVersionSnapshot {
        subject: subject.to_string(),
        version,
        schema_type,
        registry_id: row.registry_id,
        schema_body: row.schema_body,
        canonical_hash: row.canonical_hash,
        references: from_json_column::<Vec<SchemaReference>>(row.references_json)?,
        rule_set: from_json_column::<Value>(row.rule_set_json)?,
        registry_metadata: from_json_column::<Value>(row.metadata_json)?,
        fields_meta: from_json_column::<FieldsMeta>(row.fields_meta_json)?,
        lint_report: from_json_column::<Value>(row.lint_report_json)?,
    })
}

/// Counts rows referencing any of the given subjects.
fn count_subject_rows(
    tx: &Transaction<'_>,
    subjects: &BTreeSet<String>,
) -> Result<RemovalCounts, SqliteStoreError> {
    let mut counts = RemovalCounts::default();
    for table in SUBJECT_TABLES {
        let mut total = 0_u64;
        for_each_chunk(subjects, |placeholders, chunk| {
            let count: i64 = tx.query_row(
                &format!("SELECT COUNT(1) FROM {table} WHERE subject IN ({placeholders})"),
                params_from_iter(chunk.iter()),
                |row| row.get(0),
            )?;
            total = total.saturating_add(u64::try_from(count).unwrap_or(0));
            Ok(())
        })?;
        match table {
            "schema_versions" => counts.versions = total,
            "schema_artifacts" => counts.artifacts = total,
            "subject_metadata" => counts.metadata = total,
            _ => counts.subjects = total,
        }
    }
    Ok(counts)
}

/// Invokes `op` for each bounded chunk of subjects with matching placeholders.
fn for_each_chunk(
    subjects: &BTreeSet<String>,
    mut op: impl FnMut(&str, &[&String]) -> Result<(), SqliteStoreError>,
) -> Result<(), SqliteStoreError> {
    let all: Vec<&String> = subjects.iter().collect();
    for chunk in all.chunks(IN_LIST_CHUNK) {
        let placeholders = vec!["?"; chunk.len()].join(", ");
        op(&placeholders, chunk)?;
    }
    Ok(())
}

// ============================================================================
// SECTION: JSON Columns
// ============================================================================

/// Serializes an optional value into a nullable JSON text column.
fn to_json_column<T: Serialize>(value: Option<&T>) -> Result<Option<String>, SqliteStoreError> {
    value.map(to_json_text).transpose()
}

/// Serializes a value into JSON text.
fn to_json_text<T: Serialize + ?Sized>(value: &T) -> Result<String, SqliteStoreError> {
    serde_json::to_string(value).map_err(|err| SqliteStoreError::Invalid(err.to_string()))
}

/// Decodes a nullable JSON text column.
fn from_json_column<T: DeserializeOwned>(
    column: Option<String>,
) -> Result<Option<T>, SqliteStoreError> {
    column
        .map(|text| {
            serde_json::from_str(&text).map_err(|err| SqliteStoreError::Invalid(err.to_string()))
        })
        .transpose()
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Ensures the parent directory for the store exists.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteStoreError::Io("store path missing parent directory".to_string()));
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))
}

/// Validates store paths for safety limits.
fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
    if path.as_os_str().is_empty() {
        return Err(SqliteStoreError::Invalid("store path must not be empty".to_string()));
    }
    if path.display().to_string().len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteStoreError::Invalid("store path exceeds length limit".to_string()));
    }
    if path
        .components()
        .any(|component| component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH)
    {
        return Err(SqliteStoreError::Invalid(
            "store path contains an overlong component".to_string(),
        ));
    }
    if path.is_dir() {
        return Err(SqliteStoreError::Invalid(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Opens an `SQLite` connection and applies pragmas.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags)?;
    connection.execute_batch(&format!(
        "PRAGMA journal_mode = {};
         PRAGMA synchronous = {};",
        config.journal_mode.pragma_value(),
        config.sync_mode.pragma_value()
    ))?;
    connection.busy_timeout(std::time::Duration::from_millis(config.busy_timeout_ms))?;
    Ok(connection)
}

/// Initializes the catalog schema or validates the existing version.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction()?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])?;
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS subjects (
                    subject TEXT PRIMARY KEY,
                    latest_version INTEGER,
                    compatibility_level TEXT,
                    mode_read_only INTEGER NOT NULL DEFAULT 0,
                    environment TEXT,
                    owner_team TEXT,
                    pii_score REAL NOT NULL DEFAULT 0,
                    risk_score REAL NOT NULL DEFAULT 0,
                    updated_at INTEGER NOT NULL
                );
                CREATE TABLE IF NOT EXISTS schema_versions (
                    subject TEXT NOT NULL,
                    version INTEGER NOT NULL,
                    schema_type TEXT NOT NULL,
                    registry_id INTEGER,
                    schema_body TEXT NOT NULL,
                    canonical_hash TEXT NOT NULL,
                    references_json TEXT,
                    rule_set_json TEXT,
                    metadata_json TEXT,
                    fields_meta_json TEXT,
                    lint_report_json TEXT,
                    synced_at INTEGER NOT NULL,
                    PRIMARY KEY (subject, version)
                );
                CREATE INDEX IF NOT EXISTS idx_schema_versions_hash
                    ON schema_versions (canonical_hash);
                CREATE TABLE IF NOT EXISTS schema_artifacts (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    subject TEXT NOT NULL,
                    version INTEGER,
                    kind TEXT NOT NULL,
                    payload_json TEXT NOT NULL,
                    created_at INTEGER NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_schema_artifacts_subject
                    ON schema_artifacts (subject);
                CREATE TABLE IF NOT EXISTS subject_metadata (
                    subject TEXT NOT NULL,
                    key TEXT NOT NULL,
                    value_json TEXT NOT NULL,
                    updated_at INTEGER NOT NULL,
                    PRIMARY KEY (subject, key)
                );",
            )?;
        }
        Some(value) if value == SCHEMA_VERSION => {}
        Some(value) => {
            return Err(SqliteStoreError::VersionMismatch(format!(
                "unsupported schema version: {value}"
            )));
        }
    }
    tx.commit()?;
    Ok(())
}

/// Returns the current unix epoch in milliseconds.
fn unix_millis() -> i64 {
    let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
    i64::try_from(now.as_millis()).unwrap_or(i64::MAX)
}
