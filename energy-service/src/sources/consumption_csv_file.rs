use std::{fs::File, path::{Path, PathBuf}};

use csv::ByteRecord;
use energy_client::domain::Reading;
use futures::Stream;
use time::{format_description::FormatItem, macros::format_description, PrimitiveDateTime};

use crate::pipeline::{Envelope, EnvelopeStream, PipelineError, Source};

const EXPORT_TIMESTAMP: &[FormatItem<'static>] = format_description!(
    "[day padding:none].[month padding:none].[year] [hour padding:none]:[minute]:[second]"
);

/// Semicolon-delimited consumption export from the utility portal.
///
/// Layout, by position (header labels are localized and ignored):
/// - interval start as `DD.MM. HH:MM`, without the year
/// - consumption, decimal comma
/// - temperature, decimal comma, may be empty
///
/// The file is Latin-1 encoded and ends with a summary line that is not a
/// reading. The year comes from the file name, see [`extract_year`].
pub struct ConsumptionCsvFileSource {
    path: PathBuf,
}

impl ConsumptionCsvFileSource {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum YearError {
    #[error("no file name in '{0}'")]
    NoFileName(String),
    #[error("file name '{0}' has no '_YYYYMMDD' segment")]
    MissingSegment(String),
}

/// Year of the export, taken from the first four characters after the
/// first `_` of the file name (`consumption_20200224_20210101.csv` → 2020).
pub fn extract_year(path: &Path) -> Result<i32, YearError> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| YearError::NoFileName(path.display().to_string()))?;

    name.split_once('_')
        .and_then(|(_, rest)| rest.get(..4))
        .filter(|digits| digits.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|digits| digits.parse().ok())
        .ok_or_else(|| YearError::MissingSegment(name.to_string()))
}

/// Decimal-comma number; empty or malformed cells read as zero.
fn parse_decimal(cell: &str) -> f64 {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed.replace(',', ".").parse::<f64>() {
        Ok(v) => v,
        Err(_) => {
            metrics::counter!("consumption_csv_numeric_defaults_total").increment(1);
            tracing::debug!(cell = trimmed, "unparseable number, using 0");
            0.0
        }
    }
}

fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Joins `DD.MM.` and `HH:MM[:SS]` with the export year into one timestamp.
fn assemble_timestamp(raw: &str, year: i32) -> Result<PrimitiveDateTime, PipelineError> {
    let (day_part, time_part) = raw
        .trim()
        .split_once(' ')
        .ok_or_else(|| PipelineError::Source(format!("timestamp '{raw}' has no time part")))?;
    let time_part = time_part.trim();

    let dot = if day_part.ends_with('.') { "" } else { "." };
    let seconds = if time_part.matches(':').count() == 1 { ":00" } else { "" };
    let full = format!("{day_part}{dot}{year} {time_part}{seconds}");

    PrimitiveDateTime::parse(&full, EXPORT_TIMESTAMP)
        .map_err(|e| PipelineError::Source(format!("invalid timestamp '{raw}': {e}")))
}

fn record_to_reading(record: &ByteRecord, year: i32) -> Result<Reading, PipelineError> {
    let field = |idx: usize| record.get(idx).map(latin1).unwrap_or_default();

    let raw_ts = field(0);
    if raw_ts.trim().is_empty() {
        return Err(PipelineError::Source("record has no timestamp".to_string()));
    }

    Ok(Reading {
        timestamp: assemble_timestamp(&raw_ts, year)?,
        consumption: parse_decimal(&field(1)),
        temperature: parse_decimal(&field(2)),
    })
}

fn read_export(path: PathBuf) -> impl Stream<Item = Result<Envelope<Reading>, PipelineError>> + Send {
    async_stream::try_stream! {
        let year = extract_year(&path).map_err(|e| PipelineError::Source(e.to_string()))?;
        let file = File::open(&path)
            .map_err(|e| PipelineError::Source(format!("failed to open CSV file: {e}")))?;
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(b';')
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        // One record of lookahead: the last record is the footer.
        let mut pending: Option<ByteRecord> = None;
        for result in rdr.byte_records() {
            let record = result.map_err(|e| PipelineError::Source(format!(
                "failed to read CSV record: {e}"
            )))?;

            if let Some(prev) = pending.replace(record) {
                let reading = match record_to_reading(&prev, year) {
                    Ok(r) => r,
                    Err(e) => {
                        metrics::counter!("consumption_csv_parse_errors_total").increment(1);
                        Err(e)?
                    }
                };
                metrics::counter!("consumption_csv_rows_total").increment(1);
                yield Envelope::new(reading);
            }
        }

        if let Some(footer) = pending {
            tracing::debug!(fields = footer.len(), "discarded footer line");
        }
    }
}

#[async_trait::async_trait]
impl Source<Reading> for ConsumptionCsvFileSource {
    async fn stream(&self) -> EnvelopeStream<Reading> {
        // Blocking reads inside one task; exports are a few thousand rows.
        Box::pin(read_export(self.path.clone()))
    }
}
