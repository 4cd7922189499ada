//! Resource groups.

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::client::{ManagementClient, NO_BODY};
use crate::error::{ApiError, ServiceError};
use crate::http::HttpMethod;
use crate::pagination::{Page, PageResult, Paginator};
use crate::prepare::{Operation, Params};
use crate::respond::Response;
use crate::types::{GenericResource, Tags};
use crate::validation::{Check, Pattern, Rule};

use super::preflight;

pub const API_VERSION: &str = "2016-09-01";

/// Letters, digits, `-`, `_`, `.` and parentheses. ASCII only.
static GROUP_NAME: Pattern = Pattern::new(r"^[-A-Za-z0-9_.()]+$");
static GROUP_NAME_RULES: &[Rule] = &[Rule::MaxLength(90), Rule::MinLength(1), Rule::Pattern(&GROUP_NAME)];

pub const CHECK_EXISTENCE: Operation = Operation::new(
    "resources.GroupsClient.CheckExistence",
    HttpMethod::Head,
    "/subscriptions/{subscriptionId}/resourcegroups/{resourceGroupName}",
    &[200, 204, 404],
);
pub const CREATE_OR_UPDATE: Operation = Operation::new(
    "resources.GroupsClient.CreateOrUpdate",
    HttpMethod::Put,
    "/subscriptions/{subscriptionId}/resourcegroups/{resourceGroupName}",
    &[200, 201],
);
pub const DELETE: Operation = Operation::new(
    "resources.GroupsClient.Delete",
    HttpMethod::Delete,
    "/subscriptions/{subscriptionId}/resourcegroups/{resourceGroupName}",
    &[200, 202],
);
pub const EXPORT_TEMPLATE: Operation = Operation::new(
    "resources.GroupsClient.ExportTemplate",
    HttpMethod::Post,
    "/subscriptions/{subscriptionId}/resourcegroups/{resourceGroupName}/exportTemplate",
    &[200],
);
pub const GET: Operation = Operation::new(
    "resources.GroupsClient.Get",
    HttpMethod::Get,
    "/subscriptions/{subscriptionId}/resourcegroups/{resourceGroupName}",
    &[200],
);
pub const LIST: Operation = Operation::new(
    "resources.GroupsClient.List",
    HttpMethod::Get,
    "/subscriptions/{subscriptionId}/resourcegroups",
    &[200],
);
pub const LIST_RESOURCES: Operation = Operation::new(
    "resources.GroupsClient.ListResources",
    HttpMethod::Get,
    "/subscriptions/{subscriptionId}/resourceGroups/{resourceGroupName}/resources",
    &[200],
);
pub const PATCH: Operation = Operation::new(
    "resources.GroupsClient.Patch",
    HttpMethod::Patch,
    "/subscriptions/{subscriptionId}/resourcegroups/{resourceGroupName}",
    &[200],
);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceGroup {
    /// Read-only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<ResourceGroupProperties>,
    /// Required when creating a group.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub managed_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Tags>,
}

impl ResourceGroup {
    /// A creation payload for a group in `location`.
    pub fn in_location(location: impl Into<String>) -> Self {
        Self {
            location: Some(location.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceGroupProperties {
    /// Read-only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportTemplateRequest {
    /// Ids of the resources to export, or `["*"]` for all of them.
    #[serde(default)]
    pub resources: Vec<String>,
    /// Comma-separated export options such as `IncludeParameterDefaultValue`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceGroupExportResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ServiceError>,
}

pub type ResourceGroupListResult = Page<ResourceGroup>;
pub type ResourceListResult = Page<GenericResource>;

/// Client for the resource group operations.
#[derive(Debug, Clone)]
pub struct GroupsClient {
    client: ManagementClient,
}

impl GroupsClient {
    pub fn new(client: &ManagementClient) -> Self {
        Self::with_client(client.with_api_version(API_VERSION))
    }

    pub fn with_client(client: ManagementClient) -> Self {
        Self { client }
    }

    /// Reports whether the group exists. A 404 is an answer, not an error.
    pub async fn check_existence(&self, resource_group_name: &str) -> Result<Response<bool>, ApiError> {
        let params = group_params(&CHECK_EXISTENCE, resource_group_name)?;
        let response = self.client.call_empty(&CHECK_EXISTENCE, &params, NO_BODY, None).await?;
        let exists = response.status() != 404;
        Ok(response.map(|()| exists))
    }

    /// Creates the group, or updates it when it already exists. Both 200 and
    /// 201 return the group.
    pub async fn create_or_update(
        &self,
        resource_group_name: &str,
        parameters: &ResourceGroup,
    ) -> Result<Response<ResourceGroup>, ApiError> {
        let provisioning_state = parameters
            .properties
            .as_ref()
            .and_then(|p| p.provisioning_state.as_deref());
        preflight(
            &CREATE_OR_UPDATE,
            &[
                Check::new("resourceGroupName", resource_group_name, GROUP_NAME_RULES),
                Check::new("parameters.Properties.ProvisioningState", provisioning_state, &[Rule::ReadOnly]),
                Check::new("parameters.Location", parameters.location.as_deref(), &[Rule::Required]),
                Check::new("parameters.ID", parameters.id.as_deref(), &[Rule::ReadOnly]),
            ],
        )?;
        let params = Params::new().path("resourceGroupName", resource_group_name);
        self.client
            .call_json(&CREATE_OR_UPDATE, &params, Some(parameters), None)
            .await
    }

    /// Starts deleting the group. The service answers 202 while the delete
    /// is still running.
    pub async fn delete(
        &self,
        resource_group_name: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<Response<()>, ApiError> {
        let params = group_params(&DELETE, resource_group_name)?;
        self.client.call_empty(&DELETE, &params, NO_BODY, cancel).await
    }

    pub async fn export_template(
        &self,
        resource_group_name: &str,
        parameters: &ExportTemplateRequest,
    ) -> Result<Response<ResourceGroupExportResult>, ApiError> {
        let params = group_params(&EXPORT_TEMPLATE, resource_group_name)?;
        self.client
            .call_json(&EXPORT_TEMPLATE, &params, Some(parameters), None)
            .await
    }

    pub async fn get(&self, resource_group_name: &str) -> Result<Response<ResourceGroup>, ApiError> {
        let params = group_params(&GET, resource_group_name)?;
        self.client.call_json(&GET, &params, NO_BODY, None).await
    }

    pub async fn patch(
        &self,
        resource_group_name: &str,
        parameters: &ResourceGroup,
    ) -> Result<Response<ResourceGroup>, ApiError> {
        let params = group_params(&PATCH, resource_group_name)?;
        self.client.call_json(&PATCH, &params, Some(parameters), None).await
    }

    /// First page of the subscription's groups.
    pub async fn list(&self, filter: Option<&str>, top: Option<i32>) -> PageResult<ResourceGroup> {
        self.client.call_json(&LIST, &list_params(filter, top), NO_BODY, None).await
    }

    pub async fn list_next_results(&self, last: &ResourceGroupListResult) -> PageResult<ResourceGroup> {
        self.client.next_results(&LIST, last, None).await
    }

    pub fn list_pages(&self, filter: Option<&str>, top: Option<i32>) -> Paginator<ResourceGroup> {
        self.client.pages(&LIST, list_params(filter, top))
    }

    /// First page of the resources inside a group.
    pub async fn list_resources(
        &self,
        resource_group_name: &str,
        filter: Option<&str>,
        expand: Option<&str>,
        top: Option<i32>,
    ) -> PageResult<GenericResource> {
        let params = list_resources_params(resource_group_name, filter, expand, top)?;
        self.client.call_json(&LIST_RESOURCES, &params, NO_BODY, None).await
    }

    pub async fn list_resources_next_results(&self, last: &ResourceListResult) -> PageResult<GenericResource> {
        self.client.next_results(&LIST_RESOURCES, last, None).await
    }

    /// Every page of the group's resources. The group name is validated
    /// once, before the stream is created.
    pub fn list_resources_pages(
        &self,
        resource_group_name: &str,
        filter: Option<&str>,
        expand: Option<&str>,
        top: Option<i32>,
    ) -> Result<Paginator<GenericResource>, ApiError> {
        let params = list_resources_params(resource_group_name, filter, expand, top)?;
        Ok(self.client.pages(&LIST_RESOURCES, params))
    }
}

/// Path arguments for `op`, after checking the group name.
fn group_params(op: &Operation, resource_group_name: &str) -> Result<Params, ApiError> {
    preflight(op, &[Check::new("resourceGroupName", resource_group_name, GROUP_NAME_RULES)])?;
    Ok(Params::new().path("resourceGroupName", resource_group_name))
}

fn list_params(filter: Option<&str>, top: Option<i32>) -> Params {
    Params::new().query("$filter", filter).query("$top", top)
}

fn list_resources_params(
    resource_group_name: &str,
    filter: Option<&str>,
    expand: Option<&str>,
    top: Option<i32>,
) -> Result<Params, ApiError> {
    Ok(group_params(&LIST_RESOURCES, resource_group_name)?
        .query("$filter", filter)
        .query("$expand", expand)
        .query("$top", top))
}
