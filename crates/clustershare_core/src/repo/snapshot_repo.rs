//! SQLite snapshot cache repository.
//!
//! # Responsibility
//! - Atomically replace the cached snapshot (accounts, flags,
//!   coordinators, associations) in one transaction.
//! - Serve cached records through [`AccountingService`] for offline
//!   analysis.
//!
//! # Invariants
//! - The cache holds at most one snapshot; `replace_snapshot` swaps it
//!   wholesale, never merges.
//! - Account reads preserve insertion (rowid) order, so cached and live
//!   snapshots produce identical adjacency ordering.
//! - Coordinator order is persisted via an explicit `position` column.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::account::{AccountRecord, AccountValidationError};
use crate::model::association::AssociationRecord;
use crate::remote::service_spi::{
    AccountingService, AssociationFilter, ServiceError, ServiceResult,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Service id the cache reports through the accounting-service contract.
pub const CACHE_SERVICE_ID: &str = "sqlite-cache";

/// Result type used by snapshot cache operations.
pub type CacheResult<T> = Result<T, CacheRepoError>;

/// Errors from snapshot cache operations.
#[derive(Debug)]
pub enum CacheRepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Record rejected by model validation before persistence.
    Validation(AccountValidationError),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted data cannot be converted to a valid read model.
    InvalidData(String),
}

impl Display for CacheRepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "snapshot cache requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "snapshot cache requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "snapshot cache requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid cached snapshot data: {message}"),
        }
    }
}

impl Error for CacheRepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for CacheRepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for CacheRepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<AccountValidationError> for CacheRepoError {
    fn from(value: AccountValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Metadata describing the cached snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotMeta {
    /// Correlation id assigned when the snapshot was cached.
    pub snapshot_uuid: Uuid,
    /// Epoch ms timestamp of the cache write.
    pub fetched_at: i64,
}

/// SQLite-backed snapshot cache.
pub struct SqliteSnapshotRepository<'conn> {
    conn: &'conn Connection,
}

impl std::fmt::Debug for SqliteSnapshotRepository<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteSnapshotRepository").finish_non_exhaustive()
    }
}

impl<'conn> SqliteSnapshotRepository<'conn> {
    /// Creates a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> CacheResult<Self> {
        ensure_cache_connection_ready(conn)?;
        Ok(Self { conn })
    }

    /// Replaces the whole cached snapshot in one transaction.
    ///
    /// Every account record is validated before any SQL runs; a rejected
    /// record leaves the previous snapshot untouched.
    ///
    /// Returns the metadata row written for the new snapshot.
    pub fn replace_snapshot(
        &self,
        accounts: &[AccountRecord],
        associations: &[AssociationRecord],
    ) -> CacheResult<SnapshotMeta> {
        for account in accounts {
            account.validate()?;
        }

        let snapshot_uuid = Uuid::new_v4();
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        tx.execute("DELETE FROM associations;", [])?;
        tx.execute("DELETE FROM account_coordinators;", [])?;
        tx.execute("DELETE FROM account_flags;", [])?;
        tx.execute("DELETE FROM accounts;", [])?;

        for account in accounts {
            tx.execute(
                "INSERT INTO accounts (name, parent_name, description, organization)
                 VALUES (?1, ?2, ?3, ?4);",
                params![
                    account.name.as_str(),
                    account.parent_name.as_str(),
                    account.description.as_str(),
                    account.organization.as_str(),
                ],
            )?;

            for flag in &account.flags {
                tx.execute(
                    "INSERT OR IGNORE INTO account_flags (account_name, flag)
                     VALUES (?1, ?2);",
                    params![account.name.as_str(), flag.as_str()],
                )?;
            }

            for (position, user_name) in account.coordinators.iter().enumerate() {
                tx.execute(
                    "INSERT OR IGNORE INTO account_coordinators (account_name, user_name, position)
                     VALUES (?1, ?2, ?3);",
                    params![account.name.as_str(), user_name.as_str(), position as i64],
                )?;
            }
        }

        for association in associations {
            tx.execute(
                "INSERT INTO associations (user_name, account_name, cluster_name, partition_name, is_default)
                 VALUES (?1, ?2, ?3, ?4, ?5);",
                params![
                    association.user.as_str(),
                    association.account.as_str(),
                    association.cluster.as_deref(),
                    association.partition.as_deref(),
                    bool_to_int(association.is_default),
                ],
            )?;
        }

        tx.execute(
            "INSERT INTO snapshot_meta (id, snapshot_uuid) VALUES (1, ?1)
             ON CONFLICT(id) DO UPDATE SET
                snapshot_uuid = excluded.snapshot_uuid,
                fetched_at = (strftime('%s', 'now') * 1000);",
            [snapshot_uuid.to_string()],
        )?;

        tx.commit()?;

        self.snapshot_meta()?.ok_or_else(|| {
            CacheRepoError::InvalidData("snapshot_meta row missing after write".to_string())
        })
    }

    /// Returns metadata of the cached snapshot, if one exists.
    pub fn snapshot_meta(&self) -> CacheResult<Option<SnapshotMeta>> {
        let row = self
            .conn
            .query_row(
                "SELECT snapshot_uuid, fetched_at FROM snapshot_meta WHERE id = 1;",
                [],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, i64>(1)?,
                    ))
                },
            )
            .optional()?;

        match row {
            None => Ok(None),
            Some((uuid_text, fetched_at)) => {
                let snapshot_uuid = parse_uuid(&uuid_text, "snapshot_meta.snapshot_uuid")?;
                Ok(Some(SnapshotMeta {
                    snapshot_uuid,
                    fetched_at,
                }))
            }
        }
    }

    fn list_accounts_inner(&self) -> CacheResult<Vec<AccountRecord>> {
        let mut flags = self.load_flags()?;
        let mut coordinators = self.load_coordinators()?;

        let mut stmt = self.conn.prepare(
            "SELECT name, parent_name, description, organization
             FROM accounts
             ORDER BY rowid ASC;",
        )?;
        let mut rows = stmt.query([])?;

        let mut accounts = Vec::new();
        while let Some(row) = rows.next()? {
            let name: String = row.get("name")?;
            accounts.push(AccountRecord {
                flags: flags.remove(name.as_str()).unwrap_or_default(),
                coordinators: coordinators.remove(name.as_str()).unwrap_or_default(),
                name,
                parent_name: row.get("parent_name")?,
                description: row.get("description")?,
                organization: row.get("organization")?,
            });
        }
        Ok(accounts)
    }

    fn get_account_inner(&self, name: &str) -> CacheResult<Option<AccountRecord>> {
        let row = self
            .conn
            .query_row(
                "SELECT name, parent_name, description, organization
                 FROM accounts
                 WHERE name = ?1;",
                [name],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()?;

        let Some((name, parent_name, description, organization)) = row else {
            return Ok(None);
        };

        let mut flags = Vec::new();
        let mut stmt = self.conn.prepare(
            "SELECT flag FROM account_flags WHERE account_name = ?1 ORDER BY flag ASC;",
        )?;
        let mut rows = stmt.query([name.as_str()])?;
        while let Some(row) = rows.next()? {
            flags.push(row.get(0)?);
        }

        let mut coordinators = Vec::new();
        let mut stmt = self.conn.prepare(
            "SELECT user_name FROM account_coordinators
             WHERE account_name = ?1
             ORDER BY position ASC;",
        )?;
        let mut rows = stmt.query([name.as_str()])?;
        while let Some(row) = rows.next()? {
            coordinators.push(row.get(0)?);
        }

        Ok(Some(AccountRecord {
            name,
            parent_name,
            description,
            organization,
            flags,
            coordinators,
        }))
    }

    fn list_associations_inner(
        &self,
        filter: &AssociationFilter,
    ) -> CacheResult<Vec<AssociationRecord>> {
        let mut sql = String::from(
            "SELECT user_name, account_name, cluster_name, partition_name, is_default
             FROM associations
             WHERE 1 = 1",
        );
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(account) = filter.account.as_deref() {
            sql.push_str(" AND account_name = ?");
            bind_values.push(Value::Text(account.to_string()));
        }
        if let Some(user) = filter.user.as_deref() {
            sql.push_str(" AND user_name = ?");
            bind_values.push(Value::Text(user.to_string()));
        }

        sql.push_str(" ORDER BY id ASC;");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;

        let mut associations = Vec::new();
        while let Some(row) = rows.next()? {
            associations.push(parse_association_row(row)?);
        }
        Ok(associations)
    }

    fn load_flags(&self) -> CacheResult<HashMap<String, Vec<String>>> {
        let mut stmt = self.conn.prepare(
            "SELECT account_name, flag FROM account_flags
             ORDER BY account_name ASC, flag ASC;",
        )?;
        let mut rows = stmt.query([])?;

        let mut grouped: HashMap<String, Vec<String>> = HashMap::new();
        while let Some(row) = rows.next()? {
            let account_name: String = row.get(0)?;
            grouped.entry(account_name).or_default().push(row.get(1)?);
        }
        Ok(grouped)
    }

    fn load_coordinators(&self) -> CacheResult<HashMap<String, Vec<String>>> {
        let mut stmt = self.conn.prepare(
            "SELECT account_name, user_name FROM account_coordinators
             ORDER BY account_name ASC, position ASC;",
        )?;
        let mut rows = stmt.query([])?;

        let mut grouped: HashMap<String, Vec<String>> = HashMap::new();
        while let Some(row) = rows.next()? {
            let account_name: String = row.get(0)?;
            grouped.entry(account_name).or_default().push(row.get(1)?);
        }
        Ok(grouped)
    }
}

impl AccountingService for SqliteSnapshotRepository<'_> {
    fn service_id(&self) -> &str {
        CACHE_SERVICE_ID
    }

    fn list_accounts(&self) -> ServiceResult<Vec<AccountRecord>> {
        self.list_accounts_inner().map_err(to_service_error)
    }

    fn list_associations(
        &self,
        filter: &AssociationFilter,
    ) -> ServiceResult<Vec<AssociationRecord>> {
        self.list_associations_inner(filter).map_err(to_service_error)
    }

    fn get_account(&self, name: &str) -> ServiceResult<AccountRecord> {
        match self.get_account_inner(name) {
            Ok(Some(account)) => Ok(account),
            Ok(None) => Err(ServiceError::AccountNotFound(name.to_string())),
            Err(err) => Err(to_service_error(err)),
        }
    }
}

fn to_service_error(err: CacheRepoError) -> ServiceError {
    // Transient SQLite failures (locked database) are worth retrying;
    // schema and data-shape problems are not.
    let retryable = matches!(&err, CacheRepoError::Db(_));
    ServiceError::backend(CACHE_SERVICE_ID, err.to_string(), retryable)
}

fn parse_association_row(row: &Row<'_>) -> CacheResult<AssociationRecord> {
    let is_default = match row.get::<_, i64>("is_default")? {
        0 => false,
        1 => true,
        other => {
            return Err(CacheRepoError::InvalidData(format!(
                "invalid is_default value `{other}` in associations.is_default"
            )));
        }
    };

    Ok(AssociationRecord {
        user: row.get("user_name")?,
        account: row.get("account_name")?,
        cluster: row.get("cluster_name")?,
        partition: row.get("partition_name")?,
        is_default,
    })
}

fn parse_uuid(value: &str, column: &'static str) -> CacheResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| CacheRepoError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

fn ensure_cache_connection_ready(conn: &Connection) -> CacheResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(CacheRepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for table in [
        "accounts",
        "account_flags",
        "account_coordinators",
        "associations",
        "snapshot_meta",
    ] {
        if !table_exists(conn, table)? {
            return Err(CacheRepoError::MissingRequiredTable(table));
        }
    }

    for column in ["name", "parent_name", "description", "organization"] {
        if !table_has_column(conn, "accounts", column)? {
            return Err(CacheRepoError::MissingRequiredColumn {
                table: "accounts",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> CacheResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> CacheResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
