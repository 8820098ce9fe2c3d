use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use pricewatch_core::records::{PromotionRecord, SellingRecord, OPEN_ENDED};

/// Date layouts seen across the source feeds.
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%y", "%d/%m/%Y"];

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: String,
        source: std::io::Error,
    },
}

/// Reasons a single row gets skipped. Never fatal; rows are dropped
/// with a warning and loading continues.
#[derive(Debug, Error)]
enum RowError {
    #[error("unparseable date '{0}'")]
    BadDate(String),

    #[error("missing required date field '{0}'")]
    MissingDate(&'static str),

    #[error("unparseable price '{0}'")]
    BadPrice(String),

    #[error("unparseable promotion number '{0}'")]
    BadPromotionNumber(String),

    #[error("validity range ends before it starts ({from} > {to})")]
    InvertedRange { from: NaiveDate, to: NaiveDate },
}

/// Raw selling price row as it appears in the feed.
#[derive(Debug, Deserialize)]
struct SellingRow {
    #[serde(rename = "ArtikelNummer")]
    article_number: String,
    #[serde(rename = "ArtikelDatum")]
    article_date: String,
    #[serde(rename = "IngangsDatumPrijs")]
    valid_from: String,
    #[serde(rename = "EindDatumPrijs")]
    valid_to: String,
    #[serde(rename = "Prijs")]
    price: String,
}

/// Raw promotion row as it appears in the feed.
#[derive(Debug, Deserialize)]
struct PromotionRow {
    #[serde(rename = "ActiePeriode")]
    campaign_period: String,
    #[serde(rename = "PromotieNummer")]
    promotion_number: String,
    #[serde(rename = "ArtikelNummer")]
    article_number: String,
    #[serde(rename = "ArtikelDatum")]
    article_date: String,
    #[serde(rename = "PromotieOmschrijving")]
    description: String,
    #[serde(rename = "StartDatumPromotie")]
    valid_from: String,
    #[serde(rename = "EindDatumPromotie")]
    valid_to: String,
    #[serde(rename = "Status")]
    status: String,
    #[serde(rename = "VanPrijs")]
    original_price: String,
    #[serde(rename = "VoorPrijs")]
    sale_price: String,
}

/// Parses a date that may legitimately be absent (empty or a null
/// marker). Tries every known layout before giving up.
fn parse_date_opt(raw: &str) -> Result<Option<NaiveDate>, RowError> {
    let raw = raw.trim();
    if raw.is_empty() || matches!(raw.to_ascii_lowercase().as_str(), "null" | "n/a" | "na") {
        return Ok(None);
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Ok(Some(date));
        }
    }

    Err(RowError::BadDate(raw.to_string()))
}

fn require_date(raw: &str, field: &'static str) -> Result<NaiveDate, RowError> {
    parse_date_opt(raw)?.ok_or(RowError::MissingDate(field))
}

/// Prices are normalized to 2 fractional digits at the boundary so the
/// engine never compares mixed scales.
fn parse_price(raw: &str) -> Result<Decimal, RowError> {
    let mut price: Decimal = raw
        .trim()
        .parse()
        .map_err(|_| RowError::BadPrice(raw.to_string()))?;
    price.rescale(2);
    Ok(price)
}

fn selling_record(row: SellingRow) -> Result<SellingRecord, RowError> {
    let article_date = require_date(&row.article_date, "ArtikelDatum")?;
    let valid_from = require_date(&row.valid_from, "IngangsDatumPrijs")?;
    // An absent end date means the price is open-ended.
    let valid_to = parse_date_opt(&row.valid_to)?.unwrap_or(OPEN_ENDED);

    if valid_to != OPEN_ENDED && valid_from > valid_to {
        return Err(RowError::InvertedRange {
            from: valid_from,
            to: valid_to,
        });
    }

    Ok(SellingRecord {
        article_number: row.article_number,
        article_date,
        valid_from,
        valid_to,
        price: parse_price(&row.price)?,
    })
}

fn promotion_record(row: PromotionRow) -> Result<PromotionRecord, RowError> {
    let article_date = require_date(&row.article_date, "ArtikelDatum")?;
    // Both promotion dates are mandatory; a promotion without a full
    // range is rejected rather than treated as open-ended.
    let valid_from = require_date(&row.valid_from, "StartDatumPromotie")?;
    let valid_to = require_date(&row.valid_to, "EindDatumPromotie")?;

    if valid_from > valid_to {
        return Err(RowError::InvertedRange {
            from: valid_from,
            to: valid_to,
        });
    }

    let promotion_number = row
        .promotion_number
        .trim()
        .parse()
        .map_err(|_| RowError::BadPromotionNumber(row.promotion_number.clone()))?;

    Ok(PromotionRecord {
        article_number: row.article_number,
        article_date,
        campaign_period: row.campaign_period,
        promotion_number,
        description: row.description,
        valid_from,
        valid_to,
        status: row.status,
        original_price: parse_price(&row.original_price)?,
        sale_price: parse_price(&row.sale_price)?,
    })
}

/// Reads selling price records from CSV, skipping malformed rows.
pub fn read_selling_prices<R: Read>(reader: R) -> Vec<SellingRecord> {
    let mut records = Vec::new();
    let mut csv_reader = csv::Reader::from_reader(reader);

    for (index, row) in csv_reader.deserialize::<SellingRow>().enumerate() {
        // Header is line 1, so data rows start at line 2.
        let line = index + 2;
        match row {
            Ok(row) => match selling_record(row) {
                Ok(record) => records.push(record),
                Err(error) => {
                    tracing::warn!(line, %error, "skipping malformed selling price row");
                }
            },
            Err(error) => {
                tracing::warn!(line, %error, "skipping unreadable selling price row");
            }
        }
    }

    tracing::info!(records = records.len(), "loaded selling price records");
    records
}

/// Reads promotion records from CSV, skipping malformed rows.
pub fn read_promotions<R: Read>(reader: R) -> Vec<PromotionRecord> {
    let mut records = Vec::new();
    let mut csv_reader = csv::Reader::from_reader(reader);

    for (index, row) in csv_reader.deserialize::<PromotionRow>().enumerate() {
        let line = index + 2;
        match row {
            Ok(row) => match promotion_record(row) {
                Ok(record) => records.push(record),
                Err(error) => {
                    tracing::warn!(line, %error, "skipping malformed promotion row");
                }
            },
            Err(error) => {
                tracing::warn!(line, %error, "skipping unreadable promotion row");
            }
        }
    }

    tracing::info!(records = records.len(), "loaded promotion records");
    records
}

pub fn load_selling_prices(path: impl AsRef<Path>) -> Result<Vec<SellingRecord>, IngestError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| IngestError::Open {
        path: path.display().to_string(),
        source,
    })?;
    Ok(read_selling_prices(file))
}

pub fn load_promotions(path: impl AsRef<Path>) -> Result<Vec<PromotionRecord>, IngestError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| IngestError::Open {
        path: path.display().to_string(),
        source,
    })?;
    Ok(read_promotions(file))
}
