use crate::client::{parse_response, ApiConnector};
use crate::errors::StoreError;
use crate::models::environment::EnvironmentId;
use crate::models::policy::{Policy, PolicyType};
use crate::models::resource::{ResourceDocument, ResourceObject};
use async_trait::async_trait;
use log::debug;
use reqwest::Method;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

/// Anything that can load the policy of an environment.
///
/// Takes `&self` so that the environment store can fan out several fetches at once.
#[async_trait]
pub trait PolicyFetcher: Send + Sync {
    async fn fetch_policy_by_environment_and_type(
        &self,
        environment_id: EnvironmentId,
        policy_type: PolicyType,
    ) -> Result<Policy, StoreError>;
}

/// Policy cache backed by the `/api/policy` endpoints
pub struct PolicyStore<C> {
    connector: C,
    policy_map: Mutex<HashMap<(EnvironmentId, PolicyType), Policy>>,
}

impl<C: ApiConnector> PolicyStore<C> {
    pub fn new(connector: C) -> Self {
        PolicyStore {
            connector,
            policy_map: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the cached policy, if it was fetched before.
    pub fn get_policy_by_environment_and_type(
        &self,
        environment_id: EnvironmentId,
        policy_type: PolicyType,
    ) -> Option<Policy> {
        self.policy_map
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&(environment_id, policy_type))
            .cloned()
    }

    fn convert(resource: &ResourceObject, environment_id: EnvironmentId) -> Result<Policy, StoreError> {
        let mut attributes = resource.attributes_with("id", Value::from(resource.numeric_id()?));
        attributes["environmentId"] = Value::from(environment_id);
        Ok(serde_json::from_value(attributes)?)
    }
}

#[async_trait]
impl<C: ApiConnector> PolicyFetcher for PolicyStore<C> {
    /// Fetches the policy of the given type for an environment and caches it.
    ///
    /// # Arguments
    ///
    /// * `environment_id` - Id of the environment the policy belongs to
    /// * `policy_type` - Which policy to fetch
    ///
    /// # Performed API Request
    ///
    /// ```text
    /// GET /api/policy/environment/{environment_id}?type={policy_type}
    /// ```
    async fn fetch_policy_by_environment_and_type(
        &self,
        environment_id: EnvironmentId,
        policy_type: PolicyType,
    ) -> Result<Policy, StoreError> {
        let request_path = format!("/api/policy/environment/{}", environment_id);
        let type_name: &'static str = policy_type.into();
        let response = self
            .connector
            .perform_request(
                Method::GET,
                request_path,
                None::<()>,
                Some(vec![("type", type_name)]),
            )
            .await?;
        let doc: ResourceDocument<ResourceObject> = parse_response(response).await?;
        let policy = Self::convert(&doc.data, environment_id)?;
        debug!("fetched {} for environment {}", policy_type, environment_id);

        self.policy_map
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert((environment_id, policy_type), policy.clone());
        Ok(policy)
    }
}
