//! Sitecore instance domain types.
//!
//! An instance is a configured connection to one Sitecore product
//! environment. Its `fields` carry the values entered against the fields of
//! an API definition (client id, tenant, region, ...).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Definition of a single instance field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub required: bool,
}

/// A field value paired with its definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstanceField {
    #[serde(default)]
    pub definition: FieldDefinition,
    #[serde(default)]
    pub value: Value,
}

/// A configured connection to a Sitecore environment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instance {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub api_type: String,
    #[serde(default)]
    pub product: String,
    #[serde(default)]
    pub environment: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_definition_id: Option<String>,
    #[serde(default)]
    pub fields: BTreeMap<String, InstanceField>,
}

impl Instance {
    /// Resolve a possibly dot-separated field path to a header-ready string.
    ///
    /// The first segment selects a field; later segments walk into its JSON
    /// value. Any missing step yields an empty string.
    pub fn field_path(&self, path: &str) -> String {
        let mut segments = path.split('.').filter(|s| !s.is_empty());
        let Some(first) = segments.next() else {
            return String::new();
        };
        let Some(field) = self.fields.get(first) else {
            return String::new();
        };

        let mut current = &field.value;
        for segment in segments {
            let next = match current {
                Value::Object(map) => map.get(segment),
                Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
                _ => None,
            };
            match next {
                Some(value) => current = value,
                None => return String::new(),
            }
        }

        scalar_to_string(current)
    }

    /// Value of a field by id, as a string (empty when absent).
    pub fn field_value(&self, field_id: &str) -> String {
        self.fields
            .get(field_id)
            .map(|f| scalar_to_string(&f.value))
            .unwrap_or_default()
    }

    /// Whether this instance can satisfy a server's API definition.
    pub fn serves_api_definition(&self, api_definition_id: &str) -> bool {
        self.is_active && self.api_definition_id.as_deref() == Some(api_definition_id)
    }
}

/// Strings pass through; numbers and booleans are rendered; everything else is empty.
fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

/// An instance to be stored (no ID yet).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInstance {
    pub name: String,
    #[serde(default)]
    pub api_type: String,
    #[serde(default)]
    pub product: String,
    #[serde(default)]
    pub environment: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub api_definition_id: Option<String>,
    #[serde(default)]
    pub fields: BTreeMap<String, InstanceField>,
}

impl NewInstance {
    /// Check the fields a user must fill in before an instance can be saved.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Instance name is required".to_string());
        }
        if self.product.trim().is_empty() {
            return Err("Please select a product".to_string());
        }
        if self.environment.trim().is_empty() {
            return Err("Please select an environment".to_string());
        }
        Ok(())
    }

    /// Attach an id, producing a stored instance.
    pub fn into_instance(self, id: String) -> Instance {
        Instance {
            id,
            name: self.name,
            api_type: self.api_type,
            product: self.product,
            environment: self.environment,
            is_active: self.is_active,
            api_definition_id: self.api_definition_id,
            fields: self.fields,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn instance_with(name: &str, value: Value) -> Instance {
        let mut fields = BTreeMap::new();
        fields.insert(
            name.to_string(),
            InstanceField {
                definition: FieldDefinition::default(),
                value,
            },
        );
        Instance {
            id: "i1".into(),
            name: "Personalize EU".into(),
            fields,
            ..Instance::default()
        }
    }

    #[test]
    fn field_path_reads_top_level_string() {
        let instance = instance_with("clientId", json!("abc"));
        assert_eq!(instance.field_path("clientId"), "abc");
    }

    #[test]
    fn field_path_walks_nested_objects() {
        let instance = instance_with("auth", json!({"credentials": {"key": "k-1", "ttl": 30}}));
        assert_eq!(instance.field_path("auth.credentials.key"), "k-1");
        assert_eq!(instance.field_path("auth.credentials.ttl"), "30");
    }

    #[test]
    fn missing_intermediate_yields_empty() {
        let instance = instance_with("auth", json!({"credentials": {}}));
        assert_eq!(instance.field_path("auth.credentials.key"), "");
        assert_eq!(instance.field_path("auth.missing.key"), "");
        assert_eq!(instance.field_path("nope"), "");
        assert_eq!(instance.field_path(""), "");
    }

    #[test]
    fn validate_requires_product_and_environment() {
        let mut new = NewInstance {
            name: "XM".into(),
            ..NewInstance::default()
        };
        assert_eq!(new.validate().unwrap_err(), "Please select a product");
        new.product = "xmcloud".into();
        assert_eq!(new.validate().unwrap_err(), "Please select an environment");
        new.environment = "production".into();
        assert!(new.validate().is_ok());
    }

    #[test]
    fn deserializes_browser_shape() {
        let json = json!({
            "id": "i9",
            "name": "CDP prod",
            "apiType": "rest",
            "product": "personalize",
            "isActive": true,
            "apiDefinitionId": "cdp-api",
            "fields": {
                "clientKey": {"definition": {"id": "clientKey", "label": "Client key", "required": true}, "value": "ck"}
            }
        });
        let instance: Instance = serde_json::from_value(json).unwrap();
        assert!(instance.serves_api_definition("cdp-api"));
        assert_eq!(instance.field_value("clientKey"), "ck");
        assert!(instance.environment.is_empty());
    }
}
