//! Business Object Definition Entity
//!
//! A business object definition is identified by its namespace and name. Both
//! parts compare case-insensitively; stored values keep the casing they were
//! created with.

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use super::entity::Entity;
use super::key::lookup_key;
use super::tag::TagKey;

/// Composite business key; equality and hashing ignore letter case
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessObjectDefinitionKey {
    pub namespace: String,
    pub business_object_definition_name: String,
}

impl BusinessObjectDefinitionKey {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            business_object_definition_name: name.into(),
        }
    }
}

impl PartialEq for BusinessObjectDefinitionKey {
    fn eq(&self, other: &Self) -> bool {
        lookup_key(&self.namespace) == lookup_key(&other.namespace)
            && lookup_key(&self.business_object_definition_name)
                == lookup_key(&other.business_object_definition_name)
    }
}

impl Eq for BusinessObjectDefinitionKey {}

impl Hash for BusinessObjectDefinitionKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        lookup_key(&self.namespace).hash(state);
        lookup_key(&self.business_object_definition_name).hash(state);
    }
}

impl std::fmt::Display for BusinessObjectDefinitionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "namespace: \"{}\", business object definition name: \"{}\"",
            self.namespace, self.business_object_definition_name
        )
    }
}

/// A stored business object definition
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessObjectDefinition {
    pub id: i64,
    pub namespace: String,
    pub business_object_definition_name: String,
    pub data_provider_name: String,
    pub description: Option<String>,
    pub display_name: Option<String>,
}

impl BusinessObjectDefinition {
    pub fn key(&self) -> BusinessObjectDefinitionKey {
        BusinessObjectDefinitionKey::new(
            self.namespace.clone(),
            self.business_object_definition_name.clone(),
        )
    }
}

impl Entity for BusinessObjectDefinition {
    type Id = i64;

    fn id(&self) -> Self::Id {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessObjectDefinitionCreateRequest {
    pub namespace: String,
    pub business_object_definition_name: String,
    pub data_provider_name: String,
    pub description: Option<String>,
    pub display_name: Option<String>,
}

impl BusinessObjectDefinitionCreateRequest {
    pub fn new(namespace: &str, name: &str, data_provider_name: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            business_object_definition_name: name.to_string(),
            data_provider_name: data_provider_name.to_string(),
            description: None,
            display_name: None,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessObjectDefinitionUpdateRequest {
    pub description: Option<String>,
    pub display_name: Option<String>,
}

/// Join row linking a business object definition with a tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessObjectDefinitionTag {
    pub business_object_definition_id: i64,
    pub tag_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessObjectDefinitionTagKey {
    pub business_object_definition_key: BusinessObjectDefinitionKey,
    pub tag_key: TagKey,
}
