use crate::models::environment::EnvironmentId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use strum_macros::{EnumString, IntoStaticStr};

/// Possible types that a policy can have
#[derive(Clone, Copy, Debug, Deserialize, Serialize, IntoStaticStr, EnumString, PartialEq, Eq, Hash)]
pub enum PolicyType {
    #[strum(serialize = "bb.policy.pipeline-approval")]
    #[serde(rename = "bb.policy.pipeline-approval")]
    PipelineApproval,
    #[strum(serialize = "bb.policy.backup-plan")]
    #[serde(rename = "bb.policy.backup-plan")]
    BackupPlan,
    #[strum(serialize = "bb.policy.sql-review")]
    #[serde(rename = "bb.policy.sql-review")]
    SqlReview,
}

impl fmt::Display for PolicyType {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        let s: &'static str = self.into();
        write!(formatter, "{}", s)
    }
}

/// Model for a policy attached to an environment
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    pub id: i64,
    pub environment_id: EnvironmentId,
    #[serde(rename(deserialize = "type", serialize = "type"))]
    pub policy_type: PolicyType,
    #[serde(default)]
    pub payload: String,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}
