use chrono::DateTime;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::store::Document;

/// Query parameters a resource kind can be filtered by, beyond `dateRange`
/// and `limit` which every kind accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterParam {
    SearchTerm,
    Used,
    Category,
    Tag,
    Active,
}

impl FilterParam {
    /// Stored field the parameter constrains.
    pub fn field(self) -> &'static str {
        match self {
            FilterParam::SearchTerm => "searchTerm",
            FilterParam::Used => "used",
            FilterParam::Category => "category",
            FilterParam::Tag => "tags",
            FilterParam::Active => "active",
        }
    }
}

/// Shape a stored field must keep when it is patched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Non-blank string.
    Text,
    /// String or null.
    OptionalText,
    Flag,
    /// RFC 3339 timestamp.
    Timestamp,
    OptionalTimestamp,
    /// List of strings.
    Tags,
    /// Non-negative integer.
    Count,
}

impl FieldKind {
    fn check(self, field: &str, value: &Value) -> Result<(), String> {
        let is_timestamp =
            |v: &Value| v.as_str().is_some_and(|raw| DateTime::parse_from_rfc3339(raw).is_ok());
        let (valid, expected) = match self {
            FieldKind::Text => (
                value.as_str().is_some_and(|v| !v.trim().is_empty()),
                "a non-empty string",
            ),
            FieldKind::OptionalText => (value.is_string() || value.is_null(), "a string"),
            FieldKind::Flag => (value.is_boolean(), "a boolean"),
            FieldKind::Timestamp => (is_timestamp(value), "an RFC 3339 timestamp"),
            FieldKind::OptionalTimestamp => (
                value.is_null() || is_timestamp(value),
                "an RFC 3339 timestamp",
            ),
            FieldKind::Tags => (
                value
                    .as_array()
                    .is_some_and(|items| items.iter().all(Value::is_string)),
                "a list of strings",
            ),
            FieldKind::Count => (value.is_u64(), "a non-negative integer"),
        };
        if valid {
            Ok(())
        } else {
            Err(format!("{field} must be {expected}"))
        }
    }
}

/// Field-mapping table for one resource kind.
#[derive(Debug)]
pub struct ResourceSpec {
    /// Plural name used in messages, e.g. "Failed to fetch tools".
    pub name: &'static str,
    /// Singular label used in messages, e.g. "Tool ID is required".
    pub label: &'static str,
    pub collection: &'static str,
    /// Request key carrying the record id on update and delete.
    pub id_param: &'static str,
    /// Listings sort newest first on this field and date ranges apply to it.
    pub timestamp_field: &'static str,
    /// Fields a partial update may set, with the shape each must keep.
    pub fields: &'static [(&'static str, FieldKind)],
    pub filters: &'static [FilterParam],
    /// Field whose distinct values populate the filter dropdown.
    pub distinct_field: &'static str,
    /// Response key for the distinct values.
    pub distinct_key: &'static str,
    /// Boolean fields filled in on read when a stored record lacks them.
    pub read_defaults: &'static [(&'static str, bool)],
    /// Collection and referencing field cleaned up when a record is deleted.
    pub cascade: Option<(&'static str, &'static str)>,
}

impl ResourceSpec {
    /// Value a stored record is read as when it lacks `field`.
    pub fn read_default(&self, field: &str) -> Option<bool> {
        self.read_defaults
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, default)| *default)
    }

    /// Rejects patches that name unknown fields or change a field's shape.
    pub fn check_patch(&self, patch: &Document) -> Result<(), String> {
        for (field, value) in patch {
            let kind = self
                .fields
                .iter()
                .find(|(name, _)| *name == field.as_str())
                .map(|(_, kind)| *kind)
                .ok_or_else(|| format!("{field} cannot be updated"))?;
            kind.check(field, value)?;
        }
        Ok(())
    }

    /// Fills in missing `read_defaults` on a stored record.
    pub fn normalize(&self, document: &mut Document) {
        for (field, default) in self.read_defaults {
            match document.get(*field) {
                Some(Value::Bool(_)) => {}
                _ => {
                    document.insert(field.to_string(), Value::Bool(*default));
                }
            }
        }
    }
}

/// Validated create payload of a resource kind.
pub trait Draft: DeserializeOwned + Serialize + Send {
    /// Trims string fields and checks that required ones are non-empty.
    fn validate(&mut self) -> Result<(), String>;
}

pub trait Resource: Send + Sync + 'static {
    const SPEC: &'static ResourceSpec;
    type Draft: Draft;
}

/// Turns a raw create body into the document to store.
pub fn draft_document<R: Resource>(body: Value) -> Result<Document, String> {
    let mut draft: R::Draft = serde_json::from_value(body).map_err(|e| e.to_string())?;
    draft.validate()?;
    match serde_json::to_value(draft).map_err(|e| e.to_string())? {
        Value::Object(document) => Ok(document),
        _ => Err(format!("{} must be a JSON object", R::SPEC.label)),
    }
}

pub(crate) fn require(field: &str, value: &mut String) -> Result<(), String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(format!("{field} is required"));
    }
    *value = trimmed.to_string();
    Ok(())
}

pub(crate) fn trim_optional(value: &mut Option<String>) {
    *value = value
        .take()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
}

pub(crate) fn trim_tags(tags: &mut Vec<String>) {
    *tags = tags
        .iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();
}
