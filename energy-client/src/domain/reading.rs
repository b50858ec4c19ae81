use time::{format_description::FormatItem, macros::format_description, PrimitiveDateTime};

/// Storage form of a reading timestamp. Zero-padded so that lexical
/// comparison in SQL matches chronological order.
pub const TIMESTAMP_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// One measurement interval from a consumption export.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub timestamp: PrimitiveDateTime,
    pub consumption: f64,
    pub temperature: f64,
}

pub fn format_timestamp(ts: PrimitiveDateTime) -> Result<String, time::error::Format> {
    ts.format(TIMESTAMP_FORMAT)
}
