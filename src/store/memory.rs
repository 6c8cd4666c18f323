use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    Condition, Document, DocumentStore, Filter, FindOptions, Result, CREATED_AT_FIELD, ID_FIELD,
};

/// In-process document store. Collections are created on first write.
#[derive(Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<HashMap<String, Vec<Document>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn timestamp(document: &Document, field: &str) -> Option<DateTime<Utc>> {
    document
        .get(field)
        .and_then(Value::as_str)
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|parsed| parsed.with_timezone(&Utc))
}

fn matches(document: &Document, filter: &Filter) -> bool {
    filter.conditions().iter().all(|condition| match condition {
        Condition::Eq(field, value) => document.get(field) == Some(value),
        Condition::EqOrMissing(field, value) => match document.get(field) {
            None | Some(Value::Null) => true,
            Some(stored) => stored == value,
        },
        Condition::Contains(field, item) => document
            .get(field)
            .and_then(Value::as_array)
            .is_some_and(|items| items.iter().any(|v| v.as_str() == Some(item.as_str()))),
        Condition::Between(field, start, end) => {
            timestamp(document, field).is_some_and(|at| *start <= at && at <= *end)
        }
    })
}

fn id_of(document: &Document) -> Option<&str> {
    document.get(ID_FIELD).and_then(Value::as_str)
}

/// Fills the fields the Postgres schema defaults on insert.
fn stamp_new(document: &mut Document) {
    if id_of(document).is_none() {
        document.insert(ID_FIELD.into(), Value::String(Uuid::new_v4().to_string()));
    }
    if !document.contains_key(CREATED_AT_FIELD) {
        document.insert(
            CREATED_AT_FIELD.into(),
            Value::String(Utc::now().to_rfc3339()),
        );
    }
}

fn merge(document: &mut Document, patch: Document) {
    for (field, value) in patch {
        if field != ID_FIELD {
            document.insert(field, value);
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> Result<Vec<Document>> {
        let collections = self.collections.read().await;
        let mut found: Vec<Document> = collections
            .get(collection)
            .map(|docs| docs.iter().filter(|d| matches(d, filter)).cloned().collect())
            .unwrap_or_default();

        if let Some(field) = &options.sort_desc {
            // Stable sort, documents without a timestamp go last.
            found.sort_by(|a, b| timestamp(b, field).cmp(&timestamp(a, field)));
        }
        if let Some(limit) = options.limit {
            found.truncate(limit);
        }
        Ok(found)
    }

    async fn distinct(&self, collection: &str, field: &str) -> Result<Vec<String>> {
        let collections = self.collections.read().await;
        let values: BTreeSet<String> = collections
            .get(collection)
            .into_iter()
            .flatten()
            .filter_map(|d| d.get(field).and_then(Value::as_str))
            .map(str::to_string)
            .collect();
        Ok(values.into_iter().collect())
    }

    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| matches(d, filter)).cloned()))
    }

    async fn insert(&self, collection: &str, mut document: Document) -> Result<Document> {
        stamp_new(&mut document);
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .push(document.clone());
        Ok(document)
    }

    async fn update_by_id(
        &self,
        collection: &str,
        id: &str,
        patch: Document,
    ) -> Result<Option<Document>> {
        let mut collections = self.collections.write().await;
        let Some(document) = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|d| id_of(d) == Some(id)))
        else {
            return Ok(None);
        };
        merge(document, patch);
        Ok(Some(document.clone()))
    }

    async fn delete_by_id(&self, collection: &str, id: &str) -> Result<bool> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(false);
        };
        match docs.iter().position(|d| id_of(d) == Some(id)) {
            Some(index) => {
                docs.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_many(&self, collection: &str, filter: &Filter) -> Result<u64> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(0);
        };
        let before = docs.len();
        docs.retain(|d| !matches(d, filter));
        Ok((before - docs.len()) as u64)
    }

    async fn upsert(&self, collection: &str, key: &Filter, set: Document) -> Result<Document> {
        // Lookup and write happen under one write guard.
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();

        if let Some(existing) = docs.iter_mut().find(|d| matches(d, key)) {
            merge(existing, set);
            return Ok(existing.clone());
        }

        let mut created = Document::new();
        for condition in key.conditions() {
            if let Condition::Eq(field, value) = condition {
                created.insert(field.clone(), value.clone());
            }
        }
        merge(&mut created, set);
        stamp_new(&mut created);
        docs.push(created.clone());
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_find_sorts_newest_first_and_limits() {
        let store = MemoryStore::new();
        for (title, at) in [
            ("old", "2024-01-01T00:00:00Z"),
            ("new", "2024-03-01T00:00:00Z"),
            ("mid", "2024-02-01T00:00:00Z"),
        ] {
            store
                .insert("articles", doc(json!({"title": title, "datetime": at})))
                .await
                .unwrap();
        }

        let options = FindOptions {
            sort_desc: Some("datetime".into()),
            limit: Some(2),
        };
        let found = store.find("articles", &Filter::new(), &options).await.unwrap();
        let titles: Vec<_> = found.iter().map(|d| d["title"].as_str().unwrap()).collect();
        assert_eq!(titles, vec!["new", "mid"]);
    }

    #[tokio::test]
    async fn test_filters_by_tag_membership_and_range() {
        let store = MemoryStore::new();
        store
            .insert(
                "news",
                doc(json!({"tags": ["ai", "rust"], "createdAt": "2024-05-02T10:00:00Z"})),
            )
            .await
            .unwrap();
        store
            .insert(
                "news",
                doc(json!({"tags": ["go"], "createdAt": "2024-05-02T11:00:00Z"})),
            )
            .await
            .unwrap();

        let tagged = Filter::new().contains("tags", "rust");
        let found = store
            .find("news", &tagged, &FindOptions::default())
            .await
            .unwrap();
        assert_eq!(found.len(), 1);

        let start = "2024-05-02T10:30:00Z".parse().unwrap();
        let end = "2024-05-02T11:00:00Z".parse().unwrap();
        let ranged = Filter::new().between("createdAt", start, end);
        let found = store
            .find("news", &ranged, &FindOptions::default())
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0]["tags"], json!(["go"]));
    }

    #[tokio::test]
    async fn test_upsert_keeps_single_document_per_key() {
        let store = MemoryStore::new();
        let key = Filter::new().eq("postId", "p1").eq("userId", "a@b.c");

        let first = store
            .upsert("ratings", &key, doc(json!({"rating": 2})))
            .await
            .unwrap();
        let second = store
            .upsert("ratings", &key, doc(json!({"rating": 5})))
            .await
            .unwrap();

        assert_eq!(first["id"], second["id"]);
        let all = store
            .find("ratings", &Filter::new(), &FindOptions::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0]["rating"], json!(5));
        assert_eq!(all[0]["userId"], json!("a@b.c"));
        assert_eq!(all[0]["createdAt"], first["createdAt"]);
        assert!(all[0]["createdAt"]
            .as_str()
            .is_some_and(|at| DateTime::parse_from_rfc3339(at).is_ok()));
    }

    #[tokio::test]
    async fn test_eq_or_missing_matches_absent_and_null() {
        let store = MemoryStore::new();
        for document in [
            json!({"title": "imported"}),
            json!({"title": "cleared", "used": null}),
            json!({"title": "fresh", "used": false}),
            json!({"title": "done", "used": true}),
        ] {
            store.insert("articles", doc(document)).await.unwrap();
        }

        let unused = Filter::new().eq_or_missing("used", false);
        let found = store
            .find("articles", &unused, &FindOptions::default())
            .await
            .unwrap();
        let mut titles: Vec<_> = found.iter().map(|d| d["title"].as_str().unwrap()).collect();
        titles.sort();
        assert_eq!(titles, vec!["cleared", "fresh", "imported"]);
    }

    #[tokio::test]
    async fn test_update_never_rewrites_id() {
        let store = MemoryStore::new();
        let created = store
            .insert("tools", doc(json!({"name": "x"})))
            .await
            .unwrap();
        let id = created["id"].as_str().unwrap().to_string();

        let updated = store
            .update_by_id("tools", &id, doc(json!({"id": "other", "name": "y"})))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated["id"], json!(id));
        assert_eq!(updated["name"], json!("y"));

        assert!(store
            .update_by_id("tools", "missing", Document::new())
            .await
            .unwrap()
            .is_none());
    }
}
