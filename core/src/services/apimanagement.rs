//! API Management user subscriptions.

use serde::{Deserialize, Serialize};

use crate::client::{ManagementClient, NO_BODY};
use crate::error::ApiError;
use crate::http::HttpMethod;
use crate::pagination::{Page, PageResult, Paginator};
use crate::prepare::{Operation, Params};
use crate::validation::{Check, Pattern, Rule};

use super::preflight;

pub const API_VERSION: &str = "2016-07-07";

static SERVICE_NAME: Pattern = Pattern::new("^[a-zA-Z](?:[a-zA-Z0-9-]*[a-zA-Z0-9])?$");
static UID: Pattern = Pattern::new("^[^*#&+:<>?]+$");

static SERVICE_NAME_RULES: &[Rule] = &[Rule::MaxLength(50), Rule::MinLength(1), Rule::Pattern(&SERVICE_NAME)];
static UID_RULES: &[Rule] = &[Rule::MaxLength(256), Rule::MinLength(1), Rule::Pattern(&UID)];

pub const LIST_BY_USER: Operation = Operation::new(
    "apimanagement.UserSubscriptionsClient.ListByUser",
    HttpMethod::Get,
    "/subscriptions/{subscriptionId}/resourceGroups/{resourceGroupName}/providers/Microsoft.ApiManagement/service/{serviceName}/users/{uid}/subscriptions",
    &[200],
);

/// A user's subscription to a product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionContract {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// `active`, `suspended`, `submitted`, `rejected`, `cancelled` or `expired`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_comment: Option<String>,
}

pub type SubscriptionCollection = Page<SubscriptionContract>;

/// Arguments of `list_by_user`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListByUserOptions<'a> {
    /// OData filter over `id`, `name`, `stateComment`, `userId`, `productId`
    /// and `state`.
    pub filter: Option<&'a str>,
    /// At least 1 when set.
    pub top: Option<i32>,
    /// At least 0 when set.
    pub skip: Option<i32>,
}

/// Client for the subscriptions of one API Management user.
#[derive(Debug, Clone)]
pub struct UserSubscriptionsClient {
    client: ManagementClient,
}

impl UserSubscriptionsClient {
    pub fn new(client: &ManagementClient) -> Self {
        Self::with_client(client.with_api_version(API_VERSION))
    }

    pub fn with_client(client: ManagementClient) -> Self {
        Self { client }
    }

    /// First page of the user's subscriptions. Rejects an invalid service
    /// name, user id or paging bound without sending anything.
    pub async fn list_by_user(
        &self,
        resource_group_name: &str,
        service_name: &str,
        uid: &str,
        options: ListByUserOptions<'_>,
    ) -> PageResult<SubscriptionContract> {
        let params = list_by_user_params(resource_group_name, service_name, uid, options)?;
        self.client.call_json(&LIST_BY_USER, &params, NO_BODY, None).await
    }

    pub async fn list_by_user_next_results(&self, last: &SubscriptionCollection) -> PageResult<SubscriptionContract> {
        self.client.next_results(&LIST_BY_USER, last, None).await
    }

    /// Every page of the user's subscriptions. Validation runs once, before
    /// the stream is created.
    pub fn list_by_user_pages(
        &self,
        resource_group_name: &str,
        service_name: &str,
        uid: &str,
        options: ListByUserOptions<'_>,
    ) -> Result<Paginator<SubscriptionContract>, ApiError> {
        let params = list_by_user_params(resource_group_name, service_name, uid, options)?;
        Ok(self.client.pages(&LIST_BY_USER, params))
    }
}

fn list_by_user_params(
    resource_group_name: &str,
    service_name: &str,
    uid: &str,
    options: ListByUserOptions<'_>,
) -> Result<Params, ApiError> {
    preflight(
        &LIST_BY_USER,
        &[
            Check::new("serviceName", service_name, SERVICE_NAME_RULES),
            Check::new("uid", uid, UID_RULES),
            Check::new("top", options.top, &[Rule::InclusiveMinimum(1)]),
            Check::new("skip", options.skip, &[Rule::InclusiveMinimum(0)]),
        ],
    )?;
    Ok(Params::new()
        .path("resourceGroupName", resource_group_name)
        .path("serviceName", service_name)
        .path("uid", uid)
        .query("$filter", options.filter)
        .query("$top", options.top)
        .query("$skip", options.skip))
}
