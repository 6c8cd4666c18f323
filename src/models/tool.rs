use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::news::default_active;
use super::resource::{
    require, trim_optional, trim_tags, Draft, FieldKind, FilterParam, Resource, ResourceSpec,
};

pub struct Tools;

pub const TOOLS: ResourceSpec = ResourceSpec {
    name: "tools",
    label: "Tool",
    collection: "tools",
    id_param: "toolId",
    timestamp_field: "createdAt",
    fields: &[
        ("name", FieldKind::Text),
        ("link", FieldKind::Text),
        ("description", FieldKind::Text),
        ("category", FieldKind::Text),
        ("affiliate", FieldKind::OptionalText),
        ("dashboard", FieldKind::OptionalText),
        ("tagline", FieldKind::OptionalText),
        ("tags", FieldKind::Tags),
        ("active", FieldKind::Flag),
        ("clicks", FieldKind::Count),
    ],
    filters: &[FilterParam::Category, FilterParam::Tag, FilterParam::Active],
    distinct_field: "category",
    distinct_key: "categories",
    read_defaults: &[],
    cascade: None,
};

impl Resource for Tools {
    const SPEC: &'static ResourceSpec = &TOOLS;
    type Draft = NewTool;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTool {
    pub name: String,
    pub link: String,
    pub description: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affiliate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dashboard: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tagline: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub clicks: i64,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Draft for NewTool {
    fn validate(&mut self) -> Result<(), String> {
        require("name", &mut self.name)?;
        require("link", &mut self.link)?;
        require("description", &mut self.description)?;
        require("category", &mut self.category)?;
        trim_optional(&mut self.affiliate);
        trim_optional(&mut self.dashboard);
        trim_optional(&mut self.tagline);
        trim_tags(&mut self.tags);
        Ok(())
    }
}
