//! Tag Entity
//!
//! Tags belong to a tag type and form a forest through an optional parent
//! reference. They are attached to business object definitions for
//! categorization and filtering.

use serde::{Deserialize, Serialize};
use super::entity::Entity;

/// Business key of a tag: the owning tag type plus the tag code
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagKey {
    pub tag_type_code: String,
    pub tag_code: String,
}

impl TagKey {
    pub fn new(tag_type_code: impl Into<String>, tag_code: impl Into<String>) -> Self {
        Self {
            tag_type_code: tag_type_code.into(),
            tag_code: tag_code.into(),
        }
    }
}

impl std::fmt::Display for TagKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "tagTypeCode: \"{}\", tagCode: \"{}\"",
            self.tag_type_code, self.tag_code
        )
    }
}

/// A stored tag
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: i64,
    pub tag_type_code: String,
    pub tag_code: String,
    pub display_name: String,
    pub description: Option<String>,
    /// `None` for a root tag
    pub parent_tag_id: Option<i64>,
}

impl Tag {
    pub fn key(&self) -> TagKey {
        TagKey::new(self.tag_type_code.clone(), self.tag_code.clone())
    }

    pub fn is_root(&self) -> bool {
        self.parent_tag_id.is_none()
    }
}

impl Entity for Tag {
    type Id = i64;

    fn id(&self) -> Self::Id {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagCreateRequest {
    pub tag_key: TagKey,
    pub display_name: String,
    pub description: Option<String>,
    pub parent_tag_key: Option<TagKey>,
}

impl TagCreateRequest {
    pub fn new(tag_key: TagKey, display_name: &str) -> Self {
        Self {
            tag_key,
            display_name: display_name.to_string(),
            description: None,
            parent_tag_key: None,
        }
    }

    pub fn with_parent(mut self, parent_tag_key: TagKey) -> Self {
        self.parent_tag_key = Some(parent_tag_key);
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }
}

/// Replaces the mutable attributes of a tag; a `None` parent makes it a root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagUpdateRequest {
    pub display_name: String,
    pub description: Option<String>,
    pub parent_tag_key: Option<TagKey>,
}
