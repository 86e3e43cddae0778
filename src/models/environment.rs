use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use strum_macros::{EnumString, IntoStaticStr};

pub type EnvironmentId = i64;

/// Id of an environment that has not been assigned yet
pub const EMPTY_ID: EnvironmentId = 0;
/// Id handed out for an environment that is not in the cache
pub const UNKNOWN_ID: EnvironmentId = -1;

static EMPTY_ENVIRONMENT: LazyLock<Environment> = LazyLock::new(Environment::empty);
static UNKNOWN_ENVIRONMENT: LazyLock<Environment> = LazyLock::new(Environment::unknown);

/// Possible lifecycle states of a row.
///
/// Statuses the server sends that are not listed here are kept verbatim in `Other`, so such
/// rows still decode and serialize back unchanged. Parsing with `FromStr` only accepts the
/// known names.
#[derive(Clone, Debug, Deserialize, Serialize, IntoStaticStr, EnumString, PartialEq, Eq, Hash)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(from = "String", into = "String")]
pub enum RowStatus {
    Normal,
    Archived,
    PendingDelete,
    #[strum(disabled)]
    Other(String),
}

impl From<String> for RowStatus {
    fn from(raw: String) -> Self {
        RowStatus::from_str(raw.as_str()).unwrap_or_else(|_| RowStatus::Other(raw))
    }
}

impl From<RowStatus> for String {
    fn from(row_status: RowStatus) -> Self {
        row_status.to_string()
    }
}

impl fmt::Display for RowStatus {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RowStatus::Other(raw) => write!(formatter, "{}", raw),
            known => {
                let s: &'static str = known.into();
                write!(formatter, "{}", s)
            }
        }
    }
}

/// Possible tiers of an environment
#[derive(Clone, Copy, Debug, Deserialize, Serialize, IntoStaticStr, EnumString, PartialEq, Eq)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnvironmentTier {
    Protected,
    Unprotected,
}

/// Model for an environment and its relevant metadata.
///
/// Only `id`, `name`, `order` and `rowStatus` are interpreted; every other attribute the
/// server sends is kept in `attributes` and serialized back unchanged.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Environment {
    pub id: EnvironmentId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub order: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_status: Option<RowStatus>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Environment {
    fn placeholder(id: EnvironmentId, name: &str) -> Self {
        Environment {
            id,
            name: name.to_string(),
            order: 0,
            row_status: Some(RowStatus::Normal),
            attributes: Map::new(),
        }
    }

    /// Placeholder for an environment whose id has not been assigned
    pub fn empty() -> Self {
        Self::placeholder(EMPTY_ID, "")
    }

    /// Placeholder for an id that is not in the cache
    pub fn unknown() -> Self {
        Self::placeholder(UNKNOWN_ID, "<<Unknown environment>>")
    }

    pub fn empty_ref() -> &'static Environment {
        &EMPTY_ENVIRONMENT
    }

    pub fn unknown_ref() -> &'static Environment {
        &UNKNOWN_ENVIRONMENT
    }
}

/// Display name of an environment, marking archived ones.
pub fn environment_name(environment: &Environment) -> String {
    if environment.row_status == Some(RowStatus::Archived) {
        format!("{} (Archived)", environment.name)
    } else {
        environment.name.clone()
    }
}

/// Attributes sent when creating an environment
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentCreate {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<EnvironmentTier>,
}

/// Attributes sent when patching an environment; unset fields are left untouched by the server
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<EnvironmentTier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_status: Option<RowStatus>,
}

impl EnvironmentPatch {
    pub fn order(order: i32) -> Self {
        EnvironmentPatch {
            order: Some(order),
            ..Default::default()
        }
    }

    pub fn row_status(row_status: RowStatus) -> Self {
        EnvironmentPatch {
            row_status: Some(row_status),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserialize_keeps_unknown_attributes() {
        let env: Environment = serde_json::from_value(json!({
            "id": 101,
            "name": "Test",
            "order": 0,
            "rowStatus": "NORMAL",
            "tier": "UNPROTECTED",
            "creator": {"id": 1, "name": "Bytebase"}
        }))
        .unwrap();

        assert_eq!(env.id, 101);
        assert_eq!(env.row_status, Some(RowStatus::Normal));
        assert_eq!(env.attributes.get("tier"), Some(&json!("UNPROTECTED")));
        assert_eq!(
            serde_json::to_value(&env).unwrap()["creator"]["name"],
            "Bytebase"
        );
    }

    #[test]
    fn sentinels_are_distinct() {
        assert_eq!(Environment::empty_ref().id, EMPTY_ID);
        assert_eq!(Environment::unknown_ref().id, UNKNOWN_ID);
        assert_ne!(Environment::empty_ref(), Environment::unknown_ref());
        assert_eq!(Environment::unknown_ref().name, "<<Unknown environment>>");
    }

    #[test]
    fn row_status_parses_wire_names() {
        assert_eq!(RowStatus::from_str("ARCHIVED").unwrap(), RowStatus::Archived);
        assert_eq!(
            RowStatus::from_str("PENDING_DELETE").unwrap(),
            RowStatus::PendingDelete
        );
        assert_eq!(RowStatus::PendingDelete.to_string(), "PENDING_DELETE");
        assert!(RowStatus::from_str("normal").is_err());
    }

    #[test]
    fn unlisted_row_status_is_kept_verbatim() {
        let env: Environment = serde_json::from_value(json!({
            "id": 5,
            "name": "Sandbox",
            "rowStatus": "DELETED"
        }))
        .unwrap();

        assert_eq!(env.row_status, Some(RowStatus::Other("DELETED".to_string())));
        assert_eq!(serde_json::to_value(&env).unwrap()["rowStatus"], "DELETED");
        assert!(RowStatus::from_str("DELETED").is_err());
    }

    #[test]
    fn missing_row_status_stays_unset() {
        let env: Environment =
            serde_json::from_value(json!({"id": 6, "name": "Draft"})).unwrap();

        assert_eq!(env.row_status, None);
        assert!(serde_json::to_value(&env)
            .unwrap()
            .get("rowStatus")
            .is_none());
    }

    #[test]
    fn archived_environment_name_is_marked() {
        let mut env = Environment::empty();
        env.name = "Prod".to_string();
        assert_eq!(environment_name(&env), "Prod");
        env.row_status = Some(RowStatus::Archived);
        assert_eq!(environment_name(&env), "Prod (Archived)");
    }

    #[test]
    fn patch_omits_unset_fields() {
        assert_eq!(
            serde_json::to_value(EnvironmentPatch::row_status(RowStatus::Archived)).unwrap(),
            json!({"rowStatus": "ARCHIVED"})
        );
        assert_eq!(
            serde_json::to_value(EnvironmentPatch::order(4)).unwrap(),
            json!({"order": 4})
        );
    }

    #[test]
    fn create_serializes_camel_case() {
        let create = EnvironmentCreate {
            name: "Staging".to_string(),
            order: None,
            tier: Some(EnvironmentTier::Protected),
        };
        assert_eq!(
            serde_json::to_value(&create).unwrap(),
            json!({"name": "Staging", "tier": "PROTECTED"})
        );
    }
}
