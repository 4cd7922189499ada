//! Model types shared by several resource families.
//!
//! # Design
//! Every field is optional. The same structs are sent in PUT bodies, where
//! read-only fields must stay unset, and received in GET responses, where
//! the service fills them in. Unset fields are never serialized.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Resource tags.
pub type Tags = BTreeMap<String, String>;

/// A reference to another resource by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubResource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl SubResource {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: Some(id.into()) }
    }
}

/// Pricing tier of a resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sku {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<String>,
}

/// Any tracked resource, as listed inside a resource group. Properties are
/// kept undecoded because their shape depends on the resource type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenericResource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub managed_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<Sku>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Tags>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_fields_are_not_serialized() {
        let json = serde_json::to_string(&GenericResource {
            name: Some("disk1".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(json, r#"{"name":"disk1"}"#);
    }

    #[test]
    fn resource_type_maps_to_type_field() {
        let r: GenericResource = serde_json::from_str(
            r#"{"id":"/x","type":"Microsoft.Compute/disks","managedBy":"/vm","tags":{"env":"dev"}}"#,
        )
        .unwrap();
        assert_eq!(r.resource_type.as_deref(), Some("Microsoft.Compute/disks"));
        assert_eq!(r.managed_by.as_deref(), Some("/vm"));
        assert_eq!(r.tags.unwrap()["env"], "dev");
    }
}
