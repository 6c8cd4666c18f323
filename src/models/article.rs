use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::resource::{
    require, trim_optional, Draft, FieldKind, FilterParam, Resource, ResourceSpec,
};

pub struct Articles;

pub const ARTICLES: ResourceSpec = ResourceSpec {
    name: "posts",
    label: "Post",
    collection: "articles",
    id_param: "postId",
    timestamp_field: "datetime",
    fields: &[
        ("title", FieldKind::Text),
        ("link", FieldKind::Text),
        ("source", FieldKind::Text),
        ("datetime", FieldKind::Timestamp),
        ("searchTerm", FieldKind::Text),
        ("image", FieldKind::OptionalText),
        ("time", FieldKind::OptionalText),
        ("articleType", FieldKind::OptionalText),
        ("used", FieldKind::Flag),
    ],
    filters: &[FilterParam::SearchTerm, FilterParam::Used],
    distinct_field: "searchTerm",
    distinct_key: "searchTerms",
    read_defaults: &[("used", false)],
    cascade: Some(("ratings", "postId")),
};

impl Resource for Articles {
    const SPEC: &'static ResourceSpec = &ARTICLES;
    type Draft = NewArticle;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewArticle {
    pub title: String,
    pub link: String,
    pub source: String,
    pub datetime: DateTime<Utc>,
    pub search_term: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub article_type: Option<String>,
    #[serde(default)]
    pub used: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Draft for NewArticle {
    fn validate(&mut self) -> Result<(), String> {
        require("title", &mut self.title)?;
        require("link", &mut self.link)?;
        require("source", &mut self.source)?;
        require("searchTerm", &mut self.search_term)?;
        trim_optional(&mut self.image);
        trim_optional(&mut self.time);
        trim_optional(&mut self.article_type);
        Ok(())
    }
}
