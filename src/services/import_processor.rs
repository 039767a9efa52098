//! Delivery bulk import
//!
//! Parses an uploaded CSV, validates each row and creates one delivery per
//! valid row through the record store. Rows are handled strictly one after
//! another:
//! - a bad row is recorded in the summary and the next row is processed
//! - rows created before a failure stay created
//! - a malformed file fails the whole call before anything is created
//! - cancellation is checked between rows

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::defaults::{
    DEFAULT_PACKAGE_TYPE, DEFAULT_PACKAGE_WEIGHT_KG, DEFAULT_PICKUP_CITY, DEFAULT_PICKUP_NAME,
    DEFAULT_PICKUP_POSTCODE, DEFAULT_PICKUP_STREET,
};
use crate::error::{ImportError, RowError};
use crate::services::progress::{percent, ProgressSink};
use crate::services::store::RecordStore;
use crate::types::{
    Address, Coordinates, Delivery, ImportRow, ImportSummary, NewDelivery, Package, RowOutcome,
    REQUIRED_DELIVERY_COLUMNS,
};

/// Values used for columns a row leaves empty
#[derive(Debug, Clone, PartialEq)]
pub struct ImportDefaults {
    pub pickup: Address,
}

impl Default for ImportDefaults {
    fn default() -> Self {
        Self {
            pickup: Address {
                name: DEFAULT_PICKUP_NAME.to_string(),
                street: DEFAULT_PICKUP_STREET.to_string(),
                city: DEFAULT_PICKUP_CITY.to_string(),
                postcode: DEFAULT_PICKUP_POSTCODE.to_string(),
                coordinates: None,
            },
        }
    }
}

/// Bulk importer for delivery CSV files
pub struct DeliveryImporter {
    store: Arc<dyn RecordStore<Delivery>>,
    required_columns: Vec<String>,
    defaults: ImportDefaults,
}

impl DeliveryImporter {
    pub fn new(store: Arc<dyn RecordStore<Delivery>>) -> Self {
        Self {
            store,
            required_columns: REQUIRED_DELIVERY_COLUMNS.iter().map(|c| c.to_string()).collect(),
            defaults: ImportDefaults::default(),
        }
    }

    pub fn with_required_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_defaults(mut self, defaults: ImportDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Import every data row of `contents`.
    ///
    /// Progress is reported after each row. On cancellation the partial
    /// summary of the rows handled so far is returned inside
    /// `ImportError::Cancelled`.
    pub async fn run(
        &self,
        contents: &str,
        progress: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> Result<ImportSummary, ImportError> {
        let start_time = Instant::now();
        let rows = parse_csv(contents)?;
        let total = rows.len();

        info!("Importing {} delivery rows into {} store", total, self.store.name());

        let mut summary = ImportSummary::default();

        if total == 0 {
            progress.report(100);
            return Ok(summary);
        }

        for (idx, row) in rows.iter().enumerate() {
            if cancel.is_cancelled() {
                info!("Delivery import cancelled after {}/{} rows", idx, total);
                return Err(ImportError::Cancelled(summary));
            }

            let outcome = self.import_row(row).await;
            if let RowOutcome::Failed(ref message) = outcome {
                warn!("Row {} rejected: {}", row.row_number, message);
            }
            summary.record(row.row_number, outcome);

            progress.report(percent(idx + 1, total));
        }

        info!(
            "Delivery import finished in {}ms: {}/{} imported, {} failed",
            start_time.elapsed().as_millis(),
            summary.successful,
            summary.total,
            summary.failed
        );

        Ok(summary)
    }

    async fn import_row(&self, row: &ImportRow) -> RowOutcome {
        let draft = match validate_row(row, &self.required_columns)
            .and_then(|()| map_row(row, &self.defaults))
        {
            Ok(draft) => draft,
            Err(e) => return RowOutcome::Failed(e.to_string()),
        };

        match self.store.create(draft).await {
            Ok(delivery) => {
                debug!("Row {} created delivery {}", row.row_number, delivery.order_number);
                RowOutcome::Succeeded
            }
            Err(e) => RowOutcome::Failed(e.to_string()),
        }
    }
}

/// Split the file into rows keyed by header name.
///
/// Blank lines are skipped. Row numbers count the header as line 1.
pub fn parse_csv(contents: &str) -> Result<Vec<ImportRow>, ImportError> {
    let contents = contents.strip_prefix('\u{feff}').unwrap_or(contents);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b',')
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(contents.as_bytes());

    let headers = reader.headers()?.clone();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(ImportError::MissingHeader);
    }
    let mut seen_columns = HashSet::with_capacity(headers.len());
    if let Some(duplicate) = headers.iter().find(|column| !seen_columns.insert(*column)) {
        return Err(ImportError::DuplicateColumn(duplicate.to_string()));
    }

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        if record.iter().all(|field| field.is_empty()) && record.len() <= 1 {
            continue;
        }
        if record.len() != headers.len() {
            return Err(ImportError::FieldCount {
                line: record.position().map_or(0, |p| p.line()),
                expected: headers.len(),
                found: record.len(),
            });
        }

        let fields: HashMap<String, String> = headers
            .iter()
            .zip(record.iter())
            .map(|(column, value)| (column.to_string(), value.to_string()))
            .collect();

        rows.push(ImportRow {
            row_number: rows.len() + 2,
            fields,
        });
    }

    Ok(rows)
}

/// Every required column present and non-blank
pub fn validate_row(row: &ImportRow, required_columns: &[String]) -> Result<(), RowError> {
    let missing: Vec<String> = required_columns
        .iter()
        .filter(|column| row.field(column).is_none())
        .cloned()
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(RowError::MissingFields(missing))
    }
}

/// Map a validated row to a delivery draft
pub fn map_row(row: &ImportRow, defaults: &ImportDefaults) -> Result<NewDelivery, RowError> {
    let text = |column: &str| row.field(column).unwrap_or_default().to_string();
    let or_default = |column: &str, fallback: &str| row.field(column).unwrap_or(fallback).to_string();

    let delivery_address = Address {
        name: text("customerName"),
        street: text("customerStreet"),
        city: text("customerCity"),
        postcode: text("customerPostcode"),
        coordinates: parse_coordinates(row, "customerLat", "customerLng")?,
    };

    let pickup = &defaults.pickup;
    let pickup_address = Address {
        name: or_default("pickupName", &pickup.name),
        street: or_default("pickupStreet", &pickup.street),
        city: or_default("pickupCity", &pickup.city),
        postcode: or_default("pickupPostcode", &pickup.postcode),
        coordinates: parse_coordinates(row, "pickupLat", "pickupLng")?.or(pickup.coordinates),
    };

    let weight = match row.field("packageWeight") {
        Some(raw) => parse_weight(raw)?,
        None => DEFAULT_PACKAGE_WEIGHT_KG,
    };

    let package = Package {
        weight,
        dimensions: row.field("packageDimensions").map(str::to_string),
        package_type: or_default("packageType", DEFAULT_PACKAGE_TYPE),
    };

    Ok(NewDelivery {
        pickup_address,
        delivery_address,
        package,
        ..Default::default()
    })
}

fn parse_weight(raw: &str) -> Result<f64, RowError> {
    raw.parse::<f64>()
        .ok()
        .filter(|w| w.is_finite() && *w >= 0.0)
        .ok_or_else(|| RowError::InvalidValue {
            field: "packageWeight".to_string(),
            value: raw.to_string(),
        })
}

/// Both columns or neither
fn parse_coordinates(
    row: &ImportRow,
    lat_column: &str,
    lng_column: &str,
) -> Result<Option<Coordinates>, RowError> {
    let (lat, lng) = match (row.field(lat_column), row.field(lng_column)) {
        (None, None) => return Ok(None),
        (Some(lat), Some(lng)) => (lat, lng),
        (Some(_), None) => return Err(RowError::MissingFields(vec![lng_column.to_string()])),
        (None, Some(_)) => return Err(RowError::MissingFields(vec![lat_column.to_string()])),
    };

    let parse = |raw: &str, column: &str, limit: f64| {
        raw.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && v.abs() <= limit)
            .ok_or_else(|| RowError::InvalidValue {
                field: column.to_string(),
                value: raw.to_string(),
            })
    };

    Ok(Some(Coordinates {
        lat: parse(lat, lat_column, 90.0)?,
        lng: parse(lng, lng_column, 180.0)?,
    }))
}
