use crate::client::{parse_response, ApiConnector};
use crate::errors::StoreError;
use crate::models::environment::{
    environment_name, Environment, EnvironmentCreate, EnvironmentId, EnvironmentPatch, RowStatus,
    EMPTY_ID,
};
use crate::models::policy::PolicyType;
use crate::models::resource::{
    IdentifiedResource, NewResource, RequestEnvelope, ResourceDocument, ResourceObject,
};
use crate::policies::PolicyFetcher;
use futures::future::try_join_all;
use log::{debug, info};
use reqwest::Method;
use serde_json::Value;

const ENVIRONMENT_PATH: &str = "/api/environment";

/// Maps a resource object into an Environment.
///
/// The attribute map is taken over as-is; `id` always comes from the resource id. Included
/// resources are not resolved.
pub fn convert(
    environment: &ResourceObject,
    _included_list: &[ResourceObject],
) -> Result<Environment, StoreError> {
    let id = environment.numeric_id()?;
    Ok(serde_json::from_value(
        environment.attributes_with("id", Value::from(id)),
    )?)
}

fn convert_all(
    doc: &ResourceDocument<Vec<ResourceObject>>,
) -> Result<Vec<Environment>, StoreError> {
    doc.data
        .iter()
        .map(|env| convert(env, &doc.included))
        .collect()
}

/// In-memory mirror of the server's environments.
///
/// The cached list never holds two records with the same id and is kept sorted by `order`.
/// Records only enter the cache from server responses.
pub struct EnvironmentStore<C, P> {
    connector: C,
    policy_store: P,
    environment_list: Vec<Environment>,
}

impl<C, P> EnvironmentStore<C, P>
where
    C: ApiConnector,
    P: PolicyFetcher,
{
    pub fn new(connector: C, policy_store: P) -> Self {
        EnvironmentStore {
            connector,
            policy_store,
            environment_list: vec![],
        }
    }

    pub fn policy_store(&self) -> &P {
        &self.policy_store
    }

    /// Returns cached environments with one of the given statuses; only NORMAL ones when `None`.
    pub fn get_environment_list(&self, row_status_list: Option<&[RowStatus]>) -> Vec<&Environment> {
        self.environment_list
            .iter()
            .filter(|environment| match row_status_list {
                None => environment.row_status == Some(RowStatus::Normal),
                Some(list) => environment
                    .row_status
                    .as_ref()
                    .map_or(false, |status| list.contains(status)),
            })
            .collect()
    }

    /// Looks up a cached environment. Never fails: EMPTY_ID yields the empty placeholder and a
    /// miss yields the unknown placeholder.
    pub fn get_environment_by_id(&self, environment_id: EnvironmentId) -> &Environment {
        if environment_id == EMPTY_ID {
            return Environment::empty_ref();
        }
        self.environment_list
            .iter()
            .find(|environment| environment.id == environment_id)
            .unwrap_or(Environment::unknown_ref())
    }

    pub fn get_environment_name_by_id(&self, environment_id: EnvironmentId) -> String {
        environment_name(self.get_environment_by_id(environment_id))
    }

    /// Replaces cached records with the same id, appends the rest, then sorts by `order`.
    pub fn upsert_environment_list(&mut self, environment_list: Vec<Environment>) {
        for environment in environment_list {
            match self
                .environment_list
                .iter()
                .position(|item| item.id == environment.id)
            {
                Some(i) => self.environment_list[i] = environment,
                None => self.environment_list.push(environment),
            }
        }
        // stable, so ties keep their relative position
        self.environment_list.sort_by_key(|environment| environment.order);
        debug!("environment cache holds {} entries", self.environment_list.len());
    }

    /// Fetches environments, merges them into the cache and loads their pipeline approval
    /// policies. Returns only the fetched environments.
    ///
    /// # Arguments
    ///
    /// * `row_status_list` - Statuses to ask the server for; the server default when `None`
    ///
    /// # Performed API Request
    ///
    /// ```text
    /// GET /api/environment?rowstatus={comma separated statuses}
    /// ```
    pub async fn fetch_environment_list(
        &mut self,
        row_status_list: Option<&[RowStatus]>,
    ) -> Result<Vec<Environment>, StoreError> {
        let request_path = match row_status_list {
            Some(list) => format!(
                "{}?rowstatus={}",
                ENVIRONMENT_PATH,
                list.iter()
                    .map(|status| status.to_string())
                    .collect::<Vec<String>>()
                    .join(",")
            ),
            None => ENVIRONMENT_PATH.to_string(),
        };
        let response = self
            .connector
            .perform_request(Method::GET, request_path, None::<()>, None)
            .await?;
        let doc: ResourceDocument<Vec<ResourceObject>> = parse_response(response).await?;
        let environment_list = convert_all(&doc)?;
        self.upsert_environment_list(environment_list.clone());

        self.fetch_pipeline_approval_policies(&environment_list)
            .await?;

        Ok(environment_list)
    }

    /// Creates an environment and loads its pipeline approval policy.
    ///
    /// # Performed API Request
    ///
    /// ```text
    /// POST /api/environment
    /// ```
    pub async fn create_environment(
        &mut self,
        new_environment: EnvironmentCreate,
    ) -> Result<Environment, StoreError> {
        let body = RequestEnvelope {
            data: NewResource {
                resource_type: "environment",
                attributes: new_environment,
            },
        };
        let response = self
            .connector
            .perform_request(Method::POST, ENVIRONMENT_PATH.to_string(), Some(body), None)
            .await?;
        let doc: ResourceDocument<ResourceObject> = parse_response(response).await?;
        let created_environment = convert(&doc.data, &doc.included)?;
        self.upsert_environment_list(vec![created_environment.clone()]);
        info!(
            "created environment {} ({})",
            created_environment.id, created_environment.name
        );

        self.policy_store
            .fetch_policy_by_environment_and_type(
                created_environment.id,
                PolicyType::PipelineApproval,
            )
            .await?;

        Ok(created_environment)
    }

    /// Sends the new order of all environments; each one's `order` becomes its position in
    /// `ordered_environment_list`.
    ///
    /// # Performed API Request
    ///
    /// ```text
    /// PATCH /api/environment/reorder
    /// ```
    pub async fn reorder_environment_list(
        &mut self,
        ordered_environment_list: &[Environment],
    ) -> Result<Vec<Environment>, StoreError> {
        let list: Vec<IdentifiedResource<EnvironmentPatch>> = ordered_environment_list
            .iter()
            .enumerate()
            .map(|(index, item)| IdentifiedResource {
                // the server expects string ids in batch payloads
                id: item.id.to_string(),
                resource_type: "environmentPatch",
                attributes: EnvironmentPatch::order(index as i32),
            })
            .collect();
        let response = self
            .connector
            .perform_request(
                Method::PATCH,
                format!("{}/reorder", ENVIRONMENT_PATH),
                Some(RequestEnvelope { data: list }),
                None,
            )
            .await?;
        let doc: ResourceDocument<Vec<ResourceObject>> = parse_response(response).await?;
        let environment_list = convert_all(&doc)?;
        self.upsert_environment_list(environment_list.clone());
        info!("reordered {} environments", environment_list.len());

        Ok(environment_list)
    }

    /// Patches a single environment.
    ///
    /// # Performed API Request
    ///
    /// ```text
    /// PATCH /api/environment/{environment_id}
    /// ```
    pub async fn patch_environment(
        &mut self,
        environment_id: EnvironmentId,
        environment_patch: EnvironmentPatch,
    ) -> Result<Environment, StoreError> {
        let body = RequestEnvelope {
            data: NewResource {
                resource_type: "environmentPatch",
                attributes: environment_patch,
            },
        };
        let response = self
            .connector
            .perform_request(
                Method::PATCH,
                format!("{}/{}", ENVIRONMENT_PATH, environment_id),
                Some(body),
                None,
            )
            .await?;
        let doc: ResourceDocument<ResourceObject> = parse_response(response).await?;
        let updated_environment = convert(&doc.data, &doc.included)?;
        self.upsert_environment_list(vec![updated_environment.clone()]);
        info!("patched environment {}", updated_environment.id);

        Ok(updated_environment)
    }

    /// Fetches the pipeline approval policy of every given environment at once. Fails as soon
    /// as one fetch fails.
    async fn fetch_pipeline_approval_policies(
        &self,
        environment_list: &[Environment],
    ) -> Result<(), StoreError> {
        let policy_store = &self.policy_store;
        try_join_all(environment_list.iter().map(|environment| {
            policy_store
                .fetch_policy_by_environment_and_type(environment.id, PolicyType::PipelineApproval)
        }))
        .await?;
        Ok(())
    }
}
