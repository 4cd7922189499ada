//! Mobile Engagement app collections and apps.
//!
//! App collections are listed and named per subscription. Apps live inside
//! one collection, so `AppsClient` is bound to an `AppScope` naming the
//! resource group and collection when it is created.

use serde::{Deserialize, Serialize};

use crate::client::{ManagementClient, NO_BODY};
use crate::error::ApiError;
use crate::http::HttpMethod;
use crate::pagination::{Page, PageResult, Paginator};
use crate::prepare::{Operation, Params};
use crate::respond::Response;
use crate::types::Tags;

pub const API_VERSION: &str = "2014-12-01";

pub const APP_COLLECTIONS_LIST: Operation = Operation::new(
    "mobileengagement.AppCollectionsClient.List",
    HttpMethod::Get,
    "/subscriptions/{subscriptionId}/providers/Microsoft.MobileEngagement/appCollections",
    &[200],
);
pub const APP_COLLECTIONS_CHECK_NAME_AVAILABILITY: Operation = Operation::new(
    "mobileengagement.AppCollectionsClient.CheckNameAvailability",
    HttpMethod::Post,
    "/subscriptions/{subscriptionId}/providers/Microsoft.MobileEngagement/checkAppCollectionNameAvailability",
    &[200],
);
pub const APPS_LIST: Operation = Operation::new(
    "mobileengagement.AppsClient.List",
    HttpMethod::Get,
    "/subscriptions/{subscriptionId}/resourceGroups/{resourceGroupName}/providers/Microsoft.MobileEngagement/appcollections/{appCollection}/apps",
    &[200],
);

/// The app collection an `AppsClient` works in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppScope {
    pub resource_group_name: String,
    pub app_collection: String,
}

impl AppScope {
    pub fn new(resource_group_name: impl Into<String>, app_collection: impl Into<String>) -> Self {
        Self {
            resource_group_name: resource_group_name.into(),
            app_collection: app_collection.into(),
        }
    }

    fn params(&self) -> Params {
        Params::new()
            .path("resourceGroupName", self.resource_group_name.as_str())
            .path("appCollection", self.app_collection.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppCollection {
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
    pub properties: Option<AppCollectionProperties>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppCollectionProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct App {
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
    pub properties: Option<AppProperties>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_state: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppCollectionNameAvailability {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

pub type AppCollectionListResult = Page<AppCollection>;
pub type AppListResult = Page<App>;

/// Subscription-wide app collection operations.
#[derive(Debug, Clone)]
pub struct AppCollectionsClient {
    client: ManagementClient,
}

impl AppCollectionsClient {
    pub fn new(client: &ManagementClient) -> Self {
        Self::with_client(client.with_api_version(API_VERSION))
    }

    pub fn with_client(client: ManagementClient) -> Self {
        Self { client }
    }

    pub async fn check_name_availability(&self, name: &str) -> Result<Response<AppCollectionNameAvailability>, ApiError> {
        let body = AppCollectionNameAvailability {
            name: name.to_string(),
            available: None,
            reason: None,
            message: None,
        };
        self.client
            .call_json(&APP_COLLECTIONS_CHECK_NAME_AVAILABILITY, &Params::new(), Some(&body), None)
            .await
    }

    pub async fn list(&self) -> PageResult<AppCollection> {
        self.client
            .call_json(&APP_COLLECTIONS_LIST, &Params::new(), NO_BODY, None)
            .await
    }

    pub async fn list_next_results(&self, last: &AppCollectionListResult) -> PageResult<AppCollection> {
        self.client.next_results(&APP_COLLECTIONS_LIST, last, None).await
    }

    pub fn list_pages(&self) -> Paginator<AppCollection> {
        self.client.pages(&APP_COLLECTIONS_LIST, Params::new())
    }
}

#[derive(Debug, Clone)]
pub struct AppsClient {
    client: ManagementClient,
    scope: AppScope,
}

impl AppsClient {
    pub fn new(client: &ManagementClient, scope: AppScope) -> Self {
        Self::with_client(client.with_api_version(API_VERSION), scope)
    }

    pub fn with_client(client: ManagementClient, scope: AppScope) -> Self {
        Self { client, scope }
    }

    pub fn scope(&self) -> &AppScope {
        &self.scope
    }

    /// First page of the apps in the scope's collection.
    pub async fn list(&self) -> PageResult<App> {
        self.client
            .call_json(&APPS_LIST, &self.scope.params(), NO_BODY, None)
            .await
    }

    pub async fn list_next_results(&self, last: &AppListResult) -> PageResult<App> {
        self.client.next_results(&APPS_LIST, last, None).await
    }

    pub fn list_pages(&self) -> Paginator<App> {
        self.client.pages(&APPS_LIST, self.scope.params())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::prepare::prepare_request;

    #[test]
    fn scope_fills_apps_path() {
        let config = ClientConfig::new("sub", API_VERSION)
            .with_base_uri("https://management.example")
            .unwrap();
        let scope = AppScope::new("rg", "my collection");
        let req = prepare_request::<()>(&config, &APPS_LIST, &scope.params(), None).unwrap();
        assert_eq!(
            req.url,
            "https://management.example/subscriptions/sub/resourceGroups/rg/providers/Microsoft.MobileEngagement/appcollections/my%20collection/apps?api-version=2014-12-01"
        );
    }

    #[test]
    fn collections_list_needs_only_subscription() {
        let config = ClientConfig::new("sub", API_VERSION);
        let req = prepare_request::<()>(&config, &APP_COLLECTIONS_LIST, &Params::new(), None).unwrap();
        assert!(req.url.ends_with("/subscriptions/sub/providers/Microsoft.MobileEngagement/appCollections?api-version=2014-12-01"));
    }

    #[test]
    fn scope_carries_only_templated_values() {
        let params = AppScope::new("rg", "c").params();
        assert_eq!(params, Params::new().path("resourceGroupName", "rg").path("appCollection", "c"));
        for template in [APPS_LIST.path, APP_COLLECTIONS_LIST.path, APP_COLLECTIONS_CHECK_NAME_AVAILABILITY.path] {
            assert!(!template.contains("{appName}"), "{template}");
        }
    }

    #[tokio::test]
    async fn name_availability_posts_name_without_scope() {
        use crate::transport::NoAuthorizer;

        let config = ClientConfig::new("sub", "ignored").with_base_uri("http://127.0.0.1:9").unwrap();
        let collections = AppCollectionsClient::new(&ManagementClient::new(config, NoAuthorizer).unwrap());
        let body = AppCollectionNameAvailability {
            name: "coll".to_string(),
            available: None,
            reason: None,
            message: None,
        };
        let req = collections
            .client
            .prepare(&APP_COLLECTIONS_CHECK_NAME_AVAILABILITY, &Params::new(), Some(&body))
            .unwrap();
        assert_eq!(
            req.url,
            "http://127.0.0.1:9/subscriptions/sub/providers/Microsoft.MobileEngagement/checkAppCollectionNameAvailability?api-version=2014-12-01"
        );
        assert_eq!(req.body.as_deref(), Some(r#"{"name":"coll"}"#));
    }

    #[test]
    fn app_properties_decode() {
        let app: App = serde_json::from_str(
            r#"{"name":"app1","properties":{"backendId":"b1","platform":"android","appState":"active"}}"#,
        )
        .unwrap();
        let props = app.properties.unwrap();
        assert_eq!(props.platform.as_deref(), Some("android"));
        assert_eq!(props.app_state.as_deref(), Some("active"));
    }
}
