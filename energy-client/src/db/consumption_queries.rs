use sqlx::{sqlite::SqliteConnection, Connection};

use super::{store::ENERGY_TABLE, Store, StoreError};
use crate::domain::{reading::format_timestamp, weekday_label, RecurringPattern, Resolution, Window};

/// One aggregated point: derived bucket key and its value.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Bucket {
    pub label: String,
    pub value: f64,
}

/// Sum of consumption per bucket over `window`.
///
/// Rows with non-positive consumption never contribute. Weekday and Day
/// hours buckets recur across the whole dataset, so `window` is ignored for
/// those resolutions. Weekday keys are returned as names.
pub async fn consumption_sum(
    store: &Store,
    resolution: Resolution,
    window: Option<&Window>,
) -> Result<Vec<Bucket>, StoreError> {
    let window = if resolution.is_recurring() { None } else { window };
    let sql = format!(
        r#"
        SELECT
            strftime('{fmt}', timestamp) AS label,
            CAST(SUM(consumption) AS REAL) AS value
        FROM {ENERGY_TABLE}
        WHERE consumption > 0
          {window_clause}
        GROUP BY label
        ORDER BY label
        "#,
        fmt = resolution.bucket_format(),
        window_clause = window_clause(window, "AND"),
    );

    let mut conn = store.connect_read_only().await?;
    let rows = fetch_buckets(&mut conn, &sql, window).await;
    conn.close().await?;

    let rows = rows?;
    Ok(if resolution == Resolution::Weekday {
        relabel_weekdays(rows)
    } else {
        rows
    })
}

/// Day-bucketed sum of temperature over `window`.
///
/// Unlike the consumption sum, no row is filtered out by its consumption.
pub async fn temperature_sum(store: &Store, window: Option<&Window>) -> Result<Vec<Bucket>, StoreError> {
    let sql = format!(
        r#"
        SELECT
            strftime('{fmt}', timestamp) AS label,
            CAST(SUM(temperature) AS REAL) AS value
        FROM {ENERGY_TABLE}
        {window_clause}
        GROUP BY label
        ORDER BY label
        "#,
        fmt = Resolution::Day.bucket_format(),
        window_clause = window_clause(window, "WHERE"),
    );

    let mut conn = store.connect_read_only().await?;
    let rows = fetch_buckets(&mut conn, &sql, window).await;
    conn.close().await?;
    rows
}

/// Average consumption per hour-of-day or day-of-week slot over the whole
/// dataset, scaled by [`RecurringPattern::scale`].
pub async fn recurring_average(store: &Store, pattern: RecurringPattern) -> Result<Vec<Bucket>, StoreError> {
    let sql = format!(
        r#"
        SELECT
            strftime('{fmt}', timestamp) AS label,
            CAST(AVG(consumption) * {scale:.1} AS REAL) AS value
        FROM {ENERGY_TABLE}
        WHERE consumption > 0
        GROUP BY label
        ORDER BY label
        "#,
        fmt = pattern.bucket_format(),
        scale = pattern.scale(),
    );

    let mut conn = store.connect_read_only().await?;
    let rows = fetch_buckets(&mut conn, &sql, None).await;
    conn.close().await?;

    let rows = rows?;
    Ok(match pattern {
        RecurringPattern::DayOfWeek => relabel_weekdays(rows),
        RecurringPattern::HourOfDay => rows,
    })
}

fn window_clause(window: Option<&Window>, keyword: &str) -> String {
    match window {
        Some(_) => format!("{keyword} timestamp >= ? AND timestamp <= ?"),
        None => String::new(),
    }
}

async fn fetch_buckets(
    conn: &mut SqliteConnection,
    sql: &str,
    window: Option<&Window>,
) -> Result<Vec<Bucket>, StoreError> {
    let mut query = sqlx::query_as::<_, Bucket>(sql);
    if let Some(w) = window {
        query = query
            .bind(format_timestamp(w.begin)?)
            .bind(format_timestamp(w.end)?);
    }
    Ok(query.fetch_all(conn).await?)
}

fn relabel_weekdays(rows: Vec<Bucket>) -> Vec<Bucket> {
    rows.into_iter()
        .map(|b| Bucket {
            label: weekday_label(&b.label),
            value: b.value,
        })
        .collect()
}
