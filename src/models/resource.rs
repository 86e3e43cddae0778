use crate::errors::StoreError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// Generic JSON:API shapes shared by every resource type
// -------------------------------------------------------------------------------------------------

/// A server-side entity: string id plus an attribute map
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct ResourceObject {
    pub id: String,
    #[serde(
        rename(deserialize = "type", serialize = "type"),
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub resource_type: Option<String>,
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

impl ResourceObject {
    /// Parses the string id the server sends into an integer id.
    pub fn numeric_id(&self) -> Result<i64, StoreError> {
        self.id
            .trim()
            .parse::<i64>()
            .map_err(|_| StoreError::MalformedId {
                id: self.id.clone(),
            })
    }

    /// The attribute map with `key` set to `value`, overriding any attribute of the same name.
    pub fn attributes_with(&self, key: &str, value: Value) -> Value {
        let mut attributes = self.attributes.clone();
        attributes.insert(key.to_string(), value);
        Value::Object(attributes)
    }
}

/// Response document; `data` is either a single resource or a list of them
#[derive(Debug, Deserialize, Serialize)]
pub struct ResourceDocument<D> {
    pub data: D,
    #[serde(default)]
    pub included: Vec<ResourceObject>,
}

/// Request envelope wrapping the request payload in `data`
#[derive(Debug, Serialize)]
pub struct RequestEnvelope<D> {
    pub data: D,
}

/// A resource sent to the server without an id (create and single patch)
#[derive(Debug, Serialize)]
pub struct NewResource<A> {
    #[serde(rename = "type")]
    pub resource_type: &'static str,
    pub attributes: A,
}

/// A resource sent to the server with its id in string form (batch patch)
#[derive(Debug, Serialize)]
pub struct IdentifiedResource<A> {
    pub id: String,
    #[serde(rename = "type")]
    pub resource_type: &'static str,
    pub attributes: A,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tests::read_json_from_file;
    use serde_json::json;

    #[test]
    fn deserialize_list_document() {
        let doc: ResourceDocument<Vec<ResourceObject>> =
            read_json_from_file("test/test_environment_list_response.json").unwrap();

        assert_eq!(doc.data.len(), 3);
        assert_eq!(doc.data.first().unwrap().id, "101");
        assert_eq!(
            doc.data.first().unwrap().resource_type.as_deref(),
            Some("environment")
        );
        assert_eq!(doc.included.len(), 1);
    }

    #[test]
    fn missing_included_defaults_to_empty() {
        let doc: ResourceDocument<ResourceObject> =
            serde_json::from_value(json!({"data": {"id": "7", "attributes": {}}})).unwrap();
        assert!(doc.included.is_empty());
        assert_eq!(doc.data.numeric_id().unwrap(), 7);
    }

    #[test]
    fn non_numeric_id_is_rejected() {
        let resource = ResourceObject {
            id: "prod".to_string(),
            resource_type: None,
            attributes: Map::new(),
        };
        match resource.numeric_id() {
            Err(StoreError::MalformedId { id }) => assert_eq!(id, "prod"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn attributes_with_overrides_existing_key() {
        let resource: ResourceObject = serde_json::from_value(json!({
            "id": "3",
            "attributes": {"id": "stale", "name": "Test"}
        }))
        .unwrap();
        let merged = resource.attributes_with("id", json!(3));
        assert_eq!(merged, json!({"id": 3, "name": "Test"}));
    }

    #[test]
    fn serialize_identified_resource_envelope() {
        let envelope = RequestEnvelope {
            data: vec![IdentifiedResource {
                id: "2".to_string(),
                resource_type: "environmentPatch",
                attributes: json!({"order": 0}),
            }],
        };
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({"data": [{"id": "2", "type": "environmentPatch", "attributes": {"order": 0}}]})
        );
    }
}
