//! Export formatting shared by the CSV and document encoders.
//!
//! A [`Column`] pairs a field key and display label with a typed accessor
//! chosen when the column set is built. [`format_rows`] turns records into
//! [`FormattedRow`]s: numbers pass through, dates become localized date
//! strings, everything else is stringified. The two encoders only differ in
//! how they lay those rows out.

mod delimited;
mod document;

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::CoreError;
use crate::metrics::{CampaignConversion, OverviewMetrics, RevenueDataPoint};

pub use self::delimited::to_csv;
pub use self::document::{to_document, DocumentLayout};

/// `en-US` short date, e.g. `1/2/2024` rendered as `01/02/2024`.
pub const DATE_FORMAT: &str = "%m/%d/%Y";

/// A raw field value as read by a column accessor.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportValue {
    Number(f64),
    Date(DateTime<Utc>),
    Text(String),
}

/// A formatted cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Text(String),
}

impl Cell {
    /// Plain rendering used by CSV.
    pub fn raw(&self) -> String {
        match self {
            Cell::Number(n) => n.to_string(),
            Cell::Text(s) => s.clone(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            Cell::Number(_) => None,
        }
    }
}

pub fn format_value(value: ExportValue) -> Cell {
    match value {
        ExportValue::Number(n) => Cell::Number(n),
        ExportValue::Date(d) => Cell::Text(d.format(DATE_FORMAT).to_string()),
        ExportValue::Text(s) => Cell::Text(s),
    }
}

/// One exported column.
pub struct Column<T> {
    pub key: &'static str,
    pub label: &'static str,
    /// Preferred width in characters for document output.
    pub width: Option<usize>,
    accessor: fn(&T) -> ExportValue,
}

impl<T> Column<T> {
    pub fn new(key: &'static str, label: &'static str, accessor: fn(&T) -> ExportValue) -> Self {
        Self {
            key,
            label,
            width: None,
            accessor,
        }
    }

    pub fn with_width(mut self, width: usize) -> Self {
        self.width = Some(width);
        self
    }

    pub fn read(&self, record: &T) -> ExportValue {
        (self.accessor)(record)
    }
}

/// A record rendered against a column set, keyed by column key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormattedRow {
    pub cells: Vec<(&'static str, Cell)>,
}

impl FormattedRow {
    pub fn get(&self, key: &str) -> Option<&Cell> {
        self.cells.iter().find(|(k, _)| *k == key).map(|(_, c)| c)
    }
}

pub fn format_rows<T>(records: &[T], columns: &[Column<T>]) -> Vec<FormattedRow> {
    records
        .iter()
        .map(|record| FormattedRow {
            cells: columns
                .iter()
                .map(|col| (col.key, format_value(col.read(record))))
                .collect(),
        })
        .collect()
}

/// Record types with a default export column set.
pub trait Exportable: Sized {
    fn columns() -> Vec<Column<Self>>;
}

impl Exportable for CampaignConversion {
    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("campaign", "Campaign Name", |c: &Self| {
                ExportValue::Text(c.campaign.clone())
            })
            .with_width(30),
            Column::new("conversions", "Conversions", |c: &Self| {
                ExportValue::Number(c.conversions as f64)
            })
            .with_width(12),
            Column::new("date", "Date", |c: &Self| ExportValue::Date(c.date)).with_width(12),
        ]
    }
}

impl Exportable for RevenueDataPoint {
    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("date", "Date", |r: &Self| ExportValue::Date(r.date)).with_width(12),
            Column::new("revenue", "Revenue ($)", |r: &Self| ExportValue::Number(r.revenue))
                .with_width(14),
        ]
    }
}

impl Exportable for OverviewMetrics {
    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("date", "Date", |m: &Self| ExportValue::Date(m.date)).with_width(12),
            Column::new("revenue", "Revenue ($)", |m: &Self| ExportValue::Number(m.revenue))
                .with_width(14),
            Column::new("users", "Users", |m: &Self| ExportValue::Number(m.users as f64))
                .with_width(10),
            Column::new("conversions", "Conversions", |m: &Self| {
                ExportValue::Number(m.conversions as f64)
            })
            .with_width(12),
            Column::new("growth", "Growth (%)", |m: &Self| ExportValue::Number(m.growth))
                .with_width(10),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportHeader {
    pub key: &'static str,
    pub label: &'static str,
    pub width: Option<usize>,
}

/// Formatted rows plus the headers and title both encoders need.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportTable {
    pub title: Option<String>,
    pub headers: Vec<ExportHeader>,
    pub rows: Vec<FormattedRow>,
}

impl ExportTable {
    pub fn new<T>(title: Option<String>, records: &[T], columns: &[Column<T>]) -> Self {
        Self {
            title,
            headers: columns
                .iter()
                .map(|c| ExportHeader {
                    key: c.key,
                    label: c.label,
                    width: c.width,
                })
                .collect(),
            rows: format_rows(records, columns),
        }
    }

    /// Build with the record type's default columns.
    pub fn from_records<T: Exportable>(title: Option<String>, records: &[T]) -> Self {
        Self::new(title, records, &T::columns())
    }

    /// Cells of `row` in header order.
    pub(crate) fn ordered_cells<'a>(&'a self, row: &'a FormattedRow) -> Vec<Option<&'a Cell>> {
        self.headers.iter().map(|h| row.get(h.key)).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Document,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Document => "txt",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Document => "text/plain; charset=utf-8",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "document" | "doc" | "txt" | "pdf" => Ok(ExportFormat::Document),
            other => Err(format!("unsupported export format: {other}")),
        }
    }
}

/// A finished export ready to be written or downloaded.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportArtifact {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Encode `table` in `format`. `filename` is the stem; the extension is added.
pub fn export(
    format: ExportFormat,
    table: &ExportTable,
    filename: &str,
    generated_at: DateTime<Utc>,
) -> Result<ExportArtifact, CoreError> {
    let bytes = match format {
        ExportFormat::Csv => to_csv(table)?,
        ExportFormat::Document => {
            to_document(table, generated_at, &DocumentLayout::default()).into_bytes()
        }
    };
    Ok(ExportArtifact {
        filename: format!("{filename}.{}", format.extension()),
        content_type: format.content_type(),
        bytes,
    })
}
