//! Connection bootstrap utilities for the snapshot cache.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections.
//! - Configure connection pragmas required by cache behavior.
//! - Trigger schema migrations before returning a usable connection.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON`.
//! - Returned connections have migrations fully applied.

use super::migrations::apply_migrations;
use super::DbResult;
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

/// Opens a snapshot cache database file and applies pending migrations.
///
/// # Side effects
/// - Performs connection bootstrap and migration checks.
/// - Emits `cache_open` logging events with duration and status.
pub fn open_cache_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=cache_open module=db status=start mode=file");
    let conn = Connection::open(path);
    finish_open(conn, started_at, "file")
}

/// Opens an in-memory snapshot cache and applies pending migrations.
///
/// # Side effects
/// - Performs connection bootstrap and migration checks.
/// - Emits `cache_open` logging events with duration and status.
pub fn open_cache_db_in_memory() -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=cache_open module=db status=start mode=memory");
    let conn = Connection::open_in_memory();
    finish_open(conn, started_at, "memory")
}

fn finish_open(
    conn: Result<Connection, rusqlite::Error>,
    started_at: Instant,
    mode: &str,
) -> DbResult<Connection> {
    let mut conn = match conn {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=cache_open module=db status=error mode={mode} duration_ms={} error_code=cache_open_failed error={err}",
                started_at.elapsed().as_millis()
            );
            return Err(err.into());
        }
    };

    match bootstrap_connection(&mut conn) {
        Ok(()) => {
            info!(
                "event=cache_open module=db status=ok mode={mode} duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=cache_open module=db status=error mode={mode} duration_ms={} error_code=cache_bootstrap_failed error={err}",
                started_at.elapsed().as_millis()
            );
            Err(err)
        }
    }
}

fn bootstrap_connection(conn: &mut Connection) -> DbResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_secs(5))?;
    apply_migrations(conn)?;
    Ok(())
}
