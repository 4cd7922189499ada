//! Recovery Services vaults.

use serde::{Deserialize, Serialize};

use crate::client::{ManagementClient, NO_BODY};
use crate::error::ApiError;
use crate::http::HttpMethod;
use crate::pagination::{Page, PageResult, Paginator};
use crate::prepare::{Operation, Params};
use crate::respond::Response;
use crate::types::{Sku, Tags};

pub const API_VERSION: &str = "2016-06-01";

const VAULT_PATH: &str =
    "/subscriptions/{subscriptionId}/resourceGroups/{resourceGroupName}/providers/Microsoft.RecoveryServices/vaults/{vaultName}";

pub const CREATE_OR_UPDATE: Operation = Operation::new(
    "recoveryservices.VaultsClient.CreateOrUpdate",
    HttpMethod::Put,
    VAULT_PATH,
    &[200, 201],
);
pub const DELETE: Operation = Operation::new("recoveryservices.VaultsClient.Delete", HttpMethod::Delete, VAULT_PATH, &[200]);
pub const GET: Operation = Operation::new("recoveryservices.VaultsClient.Get", HttpMethod::Get, VAULT_PATH, &[200]);
pub const LIST_BY_RESOURCE_GROUP: Operation = Operation::new(
    "recoveryservices.VaultsClient.ListByResourceGroup",
    HttpMethod::Get,
    "/subscriptions/{subscriptionId}/resourceGroups/{resourceGroupName}/providers/Microsoft.RecoveryServices/vaults",
    &[200],
);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vault {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Tags>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<Sku>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<VaultProperties>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
}

pub type VaultList = Page<Vault>;

/// Client for the vault operations.
#[derive(Debug, Clone)]
pub struct VaultsClient {
    client: ManagementClient,
}

impl VaultsClient {
    pub fn new(client: &ManagementClient) -> Self {
        Self::with_client(client.with_api_version(API_VERSION))
    }

    pub fn with_client(client: ManagementClient) -> Self {
        Self { client }
    }

    pub async fn create_or_update(
        &self,
        resource_group_name: &str,
        vault_name: &str,
        vault: &Vault,
    ) -> Result<Response<Vault>, ApiError> {
        self.client
            .call_json(&CREATE_OR_UPDATE, &vault_params(resource_group_name, vault_name), Some(vault), None)
            .await
    }

    pub async fn delete(&self, resource_group_name: &str, vault_name: &str) -> Result<Response<()>, ApiError> {
        self.client
            .call_empty(&DELETE, &vault_params(resource_group_name, vault_name), NO_BODY, None)
            .await
    }

    pub async fn get(&self, resource_group_name: &str, vault_name: &str) -> Result<Response<Vault>, ApiError> {
        self.client
            .call_json(&GET, &vault_params(resource_group_name, vault_name), NO_BODY, None)
            .await
    }

    pub async fn list_by_resource_group(&self, resource_group_name: &str) -> PageResult<Vault> {
        let params = Params::new().path("resourceGroupName", resource_group_name);
        self.client
            .call_json(&LIST_BY_RESOURCE_GROUP, &params, NO_BODY, None)
            .await
    }

    pub async fn list_by_resource_group_next_results(&self, last: &VaultList) -> PageResult<Vault> {
        self.client.next_results(&LIST_BY_RESOURCE_GROUP, last, None).await
    }

    pub fn list_by_resource_group_pages(&self, resource_group_name: &str) -> Paginator<Vault> {
        let params = Params::new().path("resourceGroupName", resource_group_name);
        self.client.pages(&LIST_BY_RESOURCE_GROUP, params)
    }
}

fn vault_params(resource_group_name: &str, vault_name: &str) -> Params {
    Params::new()
        .path("resourceGroupName", resource_group_name)
        .path("vaultName", vault_name)
}
