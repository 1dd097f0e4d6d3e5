use std::path::Path;
use std::time::Duration;

use diesel::connection::SimpleConnection;
use diesel::sqlite::SqliteConnection;
use diesel::Connection;
use diesel::result::{ConnectionError, ConnectionResult};
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};
use diesel_async::pooled_connection::{AsyncDieselConnectionManager, ManagerConfig};
use diesel_async::sync_connection_wrapper::SyncConnectionWrapper;
use diesel_async::{AsyncConnection, SimpleAsyncConnection};
use futures::future::BoxFuture;

use crate::migrate::{SchemaReport, ensure_schema};
use crate::store::{StoreError, StoreResult};

pub type SqliteAsyncConn = SyncConnectionWrapper<SqliteConnection>;
pub type SqlitePool = Pool<SqliteAsyncConn>;
pub type SqlitePooledConn<'a> = PooledConnection<'a, SqliteAsyncConn>;

const POOL_MAX_SIZE: u32 = 8;
const POOL_CONNECTION_TIMEOUT: Duration = Duration::from_secs(5);

// Applied to every connection: enforce declared foreign keys and make
// concurrent writers wait on the file lock instead of failing.
const CONNECTION_PRAGMAS: &str =
    "PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000; PRAGMA journal_mode = WAL;";

/// Opens (creating if absent) the database file, brings the schema up to
/// date and returns the connection pool handlers share.
#[tracing::instrument(name = "storage_initialize", skip_all, fields(path = %path.display()))]
pub async fn initialize(path: &Path) -> StoreResult<SqlitePool> {
    ensure_parent_dir(path)?;
    let database_url = path.to_string_lossy().into_owned();

    let report = run_ensure_schema(database_url.clone()).await?;
    tracing::info!(
        created_tables = ?report.created_tables,
        added_columns = ?report.added_columns,
        "Schema is up to date"
    );

    let mut config = ManagerConfig::default();
    config.custom_setup = Box::new(establish_with_pragmas);
    let manager = AsyncDieselConnectionManager::<SqliteAsyncConn>::new_with_config(
        database_url,
        config,
    );

    let pool = Pool::builder()
        .max_size(POOL_MAX_SIZE)
        .connection_timeout(POOL_CONNECTION_TIMEOUT)
        .build(manager)
        .await
        .map_err(|err| StoreError::Pool(err.to_string()))?;

    tracing::info!(
        max_size = POOL_MAX_SIZE,
        connection_timeout_secs = POOL_CONNECTION_TIMEOUT.as_secs(),
        "Database connection pool established"
    );

    Ok(pool)
}

fn establish_with_pragmas(url: &str) -> BoxFuture<'_, ConnectionResult<SqliteAsyncConn>> {
    Box::pin(async move {
        let mut conn = SqliteAsyncConn::establish(url).await?;
        conn.batch_execute(CONNECTION_PRAGMAS)
            .await
            .map_err(ConnectionError::CouldntSetupConfiguration)?;
        Ok(conn)
    })
}

fn ensure_parent_dir(path: &Path) -> StoreResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

async fn run_ensure_schema(database_url: String) -> StoreResult<SchemaReport> {
    tokio::task::spawn_blocking(move || {
        let mut conn = SqliteConnection::establish(&database_url)?;
        conn.batch_execute(CONNECTION_PRAGMAS)?;
        let report = ensure_schema(&mut conn)?;
        Ok::<_, StoreError>(report)
    })
    .await
    .map_err(|err| StoreError::Task(err.to_string()))?
}
