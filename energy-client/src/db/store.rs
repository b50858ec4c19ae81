use std::path::{Path, PathBuf};

use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteConnection, SqliteJournalMode},
    Connection, QueryBuilder, Sqlite,
};

use super::StoreError;
use crate::domain::{reading::format_timestamp, Reading};

/// Name of the single table holding all readings.
pub const ENERGY_TABLE: &str = "Energy";

/// SQLite's default cap on bound parameters in one statement.
const SQLITE_MAX_VARIABLES: usize = 32766;
/// Bound parameters per inserted row.
const ENERGY_COLUMNS: usize = 3;

/// Handle to the local SQLite file.
///
/// No connection is held: every operation opens its own connection and
/// closes it before returning.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) async fn connect_read_only(&self) -> Result<SqliteConnection, StoreError> {
        let options = SqliteConnectOptions::new()
            .filename(&self.path)
            .read_only(true);
        self.connect_with(options).await
    }

    async fn connect_read_write(&self) -> Result<SqliteConnection, StoreError> {
        let options = SqliteConnectOptions::new()
            .filename(&self.path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Delete);
        self.connect_with(options).await
    }

    async fn connect_with(&self, options: SqliteConnectOptions) -> Result<SqliteConnection, StoreError> {
        SqliteConnection::connect_with(&options)
            .await
            .map_err(|source| StoreError::Connect {
                path: self.path.display().to_string(),
                source,
            })
    }

    /// Drops the readings table and recreates it from `readings`.
    ///
    /// The drop, create and inserts share one transaction; a failure leaves
    /// the previous table in place.
    pub async fn replace_readings(&self, readings: &[Reading], batch_size: usize) -> Result<u64, StoreError> {
        let mut conn = self.connect_read_write().await?;
        let mut tx = conn.begin().await?;

        sqlx::query(&format!("DROP TABLE IF EXISTS {ENERGY_TABLE}"))
            .execute(&mut *tx)
            .await?;
        sqlx::query(&format!(
            "CREATE TABLE {ENERGY_TABLE} (timestamp TEXT, consumption REAL, temperature REAL)"
        ))
        .execute(&mut *tx)
        .await?;

        let rows_per_insert = batch_size.clamp(1, SQLITE_MAX_VARIABLES / ENERGY_COLUMNS);
        if rows_per_insert != batch_size {
            tracing::debug!(batch_size, rows_per_insert, "insert batch size clamped");
        }

        let mut written: u64 = 0;
        for chunk in readings.chunks(rows_per_insert) {
            let rows = chunk
                .iter()
                .map(|r| Ok((format_timestamp(r.timestamp)?, r.consumption, r.temperature)))
                .collect::<Result<Vec<_>, StoreError>>()?;

            let mut builder = QueryBuilder::<Sqlite>::new(format!(
                "INSERT INTO {ENERGY_TABLE} (timestamp, consumption, temperature) "
            ));
            builder.push_values(rows, |mut b, (ts, consumption, temperature)| {
                b.push_bind(ts).push_bind(consumption).push_bind(temperature);
            });
            written += builder.build().execute(&mut *tx).await?.rows_affected();
        }

        tx.commit().await?;
        conn.close().await?;

        tracing::debug!(rows = written, path = %self.path.display(), "replaced energy table");
        Ok(written)
    }

    pub async fn count_readings(&self) -> Result<i64, StoreError> {
        let mut conn = self.connect_read_only().await?;
        let count = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {ENERGY_TABLE}"))
            .fetch_one(&mut conn)
            .await?;
        conn.close().await?;
        Ok(count)
    }

    /// All stored readings in timestamp order, as `(timestamp, consumption, temperature)`.
    pub async fn dump_rows(&self) -> Result<Vec<(String, f64, f64)>, StoreError> {
        let mut conn = self.connect_read_only().await?;
        let rows = sqlx::query_as::<_, (String, f64, f64)>(&format!(
            "SELECT timestamp, consumption, temperature FROM {ENERGY_TABLE} ORDER BY timestamp"
        ))
        .fetch_all(&mut conn)
        .await?;
        conn.close().await?;
        Ok(rows)
    }
}
