use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::resource::{
    require, trim_optional, trim_tags, Draft, FieldKind, FilterParam, Resource, ResourceSpec,
};

pub struct News;

pub const NEWS: ResourceSpec = ResourceSpec {
    name: "news",
    label: "News article",
    collection: "news",
    id_param: "newsId",
    timestamp_field: "createdAt",
    fields: &[
        ("title", FieldKind::Text),
        ("link", FieldKind::Text),
        ("category", FieldKind::Text),
        ("source", FieldKind::OptionalText),
        ("description", FieldKind::OptionalText),
        ("tags", FieldKind::Tags),
        ("publishedAt", FieldKind::OptionalTimestamp),
        ("active", FieldKind::Flag),
        ("clicks", FieldKind::Count),
    ],
    filters: &[FilterParam::Category, FilterParam::Tag, FilterParam::Active],
    distinct_field: "category",
    distinct_key: "categories",
    read_defaults: &[],
    cascade: None,
};

impl Resource for News {
    const SPEC: &'static ResourceSpec = &NEWS;
    type Draft = NewNewsItem;
}

pub(crate) fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNewsItem {
    pub title: String,
    pub link: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub clicks: i64,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Draft for NewNewsItem {
    fn validate(&mut self) -> Result<(), String> {
        require("title", &mut self.title)?;
        require("link", &mut self.link)?;
        require("category", &mut self.category)?;
        trim_optional(&mut self.source);
        trim_optional(&mut self.description);
        trim_tags(&mut self.tags);
        Ok(())
    }
}
