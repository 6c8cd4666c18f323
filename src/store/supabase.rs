use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::SecondsFormat;
use postgrest::{Builder, Postgrest};
use serde_json::Value;
use tracing::{debug, info};
use uuid::Uuid;

use super::{
    Condition, Document, DocumentStore, Filter, FindOptions, Result, StoreError, ID_FIELD,
};

/// Collection probed when a connection is first established.
const PROBE_COLLECTION: &str = "articles";

#[derive(Debug, Clone)]
pub struct PostgrestConfig {
    pub project_url: String,
    pub service_role_key: String,
}

impl PostgrestConfig {
    pub fn rest_url(&self) -> String {
        format!("{}/rest/v1", self.project_url.trim_end_matches('/'))
    }
}

/// Document store backed by Supabase's PostgREST endpoint.
pub struct PostgrestStore {
    client: Postgrest,
}

impl PostgrestStore {
    /// Builds the client and checks that the endpoint answers.
    pub async fn connect(config: &PostgrestConfig) -> Result<Self> {
        let client = Postgrest::new(config.rest_url())
            .insert_header("apikey", &config.service_role_key)
            .insert_header(
                "Authorization",
                format!("Bearer {}", config.service_role_key),
            );
        let store = Self { client };

        info!("Attempting to connect to {}", config.rest_url());
        let probe = store
            .client
            .from(PROBE_COLLECTION)
            .select(ID_FIELD)
            .limit(1);
        rows(probe)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        info!("Successfully connected to document store");

        Ok(store)
    }
}

fn param(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn apply(mut builder: Builder, filter: &Filter) -> Builder {
    for condition in filter.conditions() {
        builder = match condition {
            Condition::Eq(field, value) => builder.eq(field, param(value)),
            Condition::EqOrMissing(field, value) => {
                builder.or(format!("{field}.eq.{},{field}.is.null", param(value)))
            }
            Condition::Contains(field, item) => {
                builder.cs(field, format!("{{\"{}\"}}", item.replace('"', "\\\"")))
            }
            Condition::Between(field, start, end) => builder
                .gte(field, start.to_rfc3339_opts(SecondsFormat::Millis, true))
                .lte(field, end.to_rfc3339_opts(SecondsFormat::Millis, true)),
        };
    }
    builder
}

/// Sends the request and decodes the returned row array.
async fn rows(builder: Builder) -> Result<Vec<Document>> {
    let response = builder
        .execute()
        .await
        .map_err(|e| StoreError::Transport(e.to_string()))?;
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| StoreError::Transport(e.to_string()))?;

    if !status.is_success() {
        return Err(StoreError::Rejected {
            status: status.as_u16(),
            message: body,
        });
    }
    Ok(serde_json::from_str(&body)?)
}

/// Ids are `uuid` columns. Anything else cannot name a row, and PostgREST
/// would reject the cast instead of matching nothing.
fn row_id(collection: &str, id: &str) -> Option<Uuid> {
    let parsed = Uuid::parse_str(id).ok();
    if parsed.is_none() {
        debug!("{id} is not a {collection} id");
    }
    parsed
}

fn body(document: &Document) -> String {
    Value::Object(document.clone()).to_string()
}

#[async_trait]
impl DocumentStore for PostgrestStore {
    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> Result<Vec<Document>> {
        let mut builder = apply(self.client.from(collection).select("*"), filter);
        if let Some(field) = &options.sort_desc {
            builder = builder.order(format!("{field}.desc"));
        }
        if let Some(limit) = options.limit {
            builder = builder.limit(limit);
        }
        debug!("find on {collection}: {:?}", filter);
        rows(builder).await
    }

    async fn distinct(&self, collection: &str, field: &str) -> Result<Vec<String>> {
        // PostgREST has no DISTINCT, so the column is deduplicated here.
        let found = rows(self.client.from(collection).select(field)).await?;
        let values: BTreeSet<String> = found
            .iter()
            .filter_map(|row| row.get(field).and_then(Value::as_str))
            .map(str::to_string)
            .collect();
        Ok(values.into_iter().collect())
    }

    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Document>> {
        let builder = apply(self.client.from(collection).select("*"), filter).limit(1);
        Ok(rows(builder).await?.into_iter().next())
    }

    async fn insert(&self, collection: &str, document: Document) -> Result<Document> {
        let builder = self.client.from(collection).insert(body(&document));
        rows(builder)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::NoRows(format!("insert into {collection}")))
    }

    async fn update_by_id(
        &self,
        collection: &str,
        id: &str,
        mut patch: Document,
    ) -> Result<Option<Document>> {
        let Some(id) = row_id(collection, id) else {
            return Ok(None);
        };
        patch.remove(ID_FIELD);
        let builder = self
            .client
            .from(collection)
            .eq(ID_FIELD, id.to_string())
            .update(body(&patch));
        Ok(rows(builder).await?.into_iter().next())
    }

    async fn delete_by_id(&self, collection: &str, id: &str) -> Result<bool> {
        let Some(id) = row_id(collection, id) else {
            return Ok(false);
        };
        let builder = self
            .client
            .from(collection)
            .eq(ID_FIELD, id.to_string())
            .delete();
        Ok(!rows(builder).await?.is_empty())
    }

    async fn delete_many(&self, collection: &str, filter: &Filter) -> Result<u64> {
        let builder = apply(self.client.from(collection), filter).delete();
        Ok(rows(builder).await?.len() as u64)
    }

    async fn upsert(&self, collection: &str, key: &Filter, set: Document) -> Result<Document> {
        let mut document = Document::new();
        let mut conflict_columns = Vec::new();
        for condition in key.conditions() {
            if let Condition::Eq(field, value) = condition {
                document.insert(field.clone(), value.clone());
                conflict_columns.push(field.as_str());
            }
        }
        for (field, value) in set {
            document.insert(field, value);
        }

        let builder = self
            .client
            .from(collection)
            .upsert(body(&document))
            .on_conflict(conflict_columns.join(","));
        rows(builder)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::NoRows(format!("upsert into {collection}")))
    }
}
