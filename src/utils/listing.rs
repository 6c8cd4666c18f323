use chrono::{DateTime, FixedOffset};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info};

use crate::models::listing::{DateRange, ListParams};
use crate::models::resource::{FilterParam, ResourceSpec};
use crate::store::{Document, DocumentStore, Filter, FindOptions, StoreError};

#[derive(Error, Debug, PartialEq)]
pub enum ListingError {
    #[error("limit must be a positive integer, got {0}")]
    NonPositiveLimit(i64),

    #[error("unknown dateRange `{0}`, expected all, today, week or month")]
    UnknownDateRange(String),
}

/// A listing query after normalization, ready to run against the store.
#[derive(Debug, PartialEq)]
pub enum ListRequest {
    Distinct,
    Find { filter: Filter, options: FindOptions },
}

#[derive(Debug)]
pub enum Listing {
    Records(Vec<Document>),
    Distinct(Vec<String>),
}

impl Listing {
    pub fn into_json(self, spec: &ResourceSpec) -> Value {
        match self {
            Listing::Records(records) => {
                Value::Array(records.into_iter().map(Value::Object).collect())
            }
            Listing::Distinct(values) => {
                let mut body = Map::new();
                body.insert(
                    spec.distinct_key.to_string(),
                    Value::Array(values.into_iter().map(Value::String).collect()),
                );
                Value::Object(body)
            }
        }
    }
}

fn present(raw: &Option<String>) -> Option<&str> {
    raw.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Unparseable input means no limit; parsed values must be positive.
pub fn parse_limit(raw: Option<&str>) -> Result<Option<usize>, ListingError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    match raw.parse::<i64>() {
        Ok(n) if n > 0 => Ok(Some(n as usize)),
        Ok(n) => Err(ListingError::NonPositiveLimit(n)),
        Err(_) => Ok(None),
    }
}

fn raw_param(params: &ListParams, param: FilterParam) -> &Option<String> {
    match param {
        FilterParam::SearchTerm => &params.search_term,
        FilterParam::Used => &params.used,
        FilterParam::Category => &params.category,
        FilterParam::Tag => &params.tag,
        FilterParam::Active => &params.active,
    }
}

pub fn build_request(
    spec: &ResourceSpec,
    params: &ListParams,
    now: DateTime<FixedOffset>,
) -> Result<ListRequest, ListingError> {
    if present(&params.filter_options).is_some_and(|v| matches!(v, "true" | "1")) {
        return Ok(ListRequest::Distinct);
    }

    let mut filter = Filter::new();
    for &param in spec.filters {
        let Some(value) = present(raw_param(params, param)) else {
            continue;
        };
        filter = match param {
            FilterParam::Tag => filter.contains(param.field(), value),
            FilterParam::Used | FilterParam::Active => {
                let flag = value == "true";
                // Records stored without the flag read as its default.
                if spec.read_default(param.field()) == Some(flag) {
                    filter.eq_or_missing(param.field(), flag)
                } else {
                    filter.eq(param.field(), flag)
                }
            }
            FilterParam::SearchTerm | FilterParam::Category => filter.eq(param.field(), value),
        };
    }

    let range = match present(&params.date_range) {
        Some(raw) => DateRange::parse(raw)
            .ok_or_else(|| ListingError::UnknownDateRange(raw.to_string()))?,
        None => DateRange::All,
    };
    if let Some((start, end)) = range.bounds(now) {
        filter = filter.between(spec.timestamp_field, start, end);
    }

    let options = FindOptions {
        sort_desc: Some(spec.timestamp_field.to_string()),
        limit: parse_limit(present(&params.limit))?,
    };
    Ok(ListRequest::Find { filter, options })
}

pub async fn run(
    store: &dyn DocumentStore,
    spec: &ResourceSpec,
    request: ListRequest,
) -> Result<Listing, StoreError> {
    match request {
        ListRequest::Distinct => {
            let values = store
                .distinct(spec.collection, spec.distinct_field)
                .await?;
            info!("Found {} distinct {} values", values.len(), spec.distinct_field);
            Ok(Listing::Distinct(values))
        }
        ListRequest::Find { filter, options } => {
            debug!("Executing {} query with filters: {:?}", spec.name, filter);
            let mut records = store.find(spec.collection, &filter, &options).await?;
            for record in records.iter_mut() {
                spec.normalize(record);
            }
            info!("Found {} {}", records.len(), spec.name);
            Ok(Listing::Records(records))
        }
    }
}
