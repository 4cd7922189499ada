//! In-memory stand-in for the resource manager endpoints the client talks to.
//!
//! Covers resource groups, Recovery Services vaults, the machine size
//! catalog and blob snapshots. Every management route insists on an
//! `api-version` query parameter, every response carries an
//! `x-ms-request-id`, and list routes page with opaque `$skiptoken` links
//! built from the request's `Host` header.

use std::{collections::BTreeMap, collections::HashMap, sync::Arc, time::Duration};

use axum::{
    extract::{Path, Query, Request, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

/// Items per page when the caller does not pass `$top`.
pub const DEFAULT_PAGE_SIZE: usize = 2;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceGroup {
    pub id: String,
    pub name: String,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeMap<String, String>>,
    pub properties: Properties,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Properties {
    pub provisioning_state: String,
}

impl Properties {
    fn succeeded() -> Self {
        Self {
            provisioning_state: "Succeeded".to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Vault {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    pub location: String,
    pub properties: Properties,
}

/// Body accepted by PUT and PATCH on groups and vaults.
#[derive(Deserialize)]
pub struct ResourceInput {
    pub location: Option<String>,
    pub tags: Option<BTreeMap<String, String>>,
}

#[derive(Default)]
pub struct Store {
    /// Keyed by lowercased name; group names are case-insensitive.
    groups: BTreeMap<String, ResourceGroup>,
    vaults: BTreeMap<(String, String), Vault>,
    snapshots: u64,
}

pub type Db = Arc<RwLock<Store>>;

#[derive(Clone)]
pub struct AppState {
    db: Db,
    latency: Duration,
}

pub fn app() -> Router {
    app_with_latency(Duration::ZERO)
}

/// Same routes, but every response is held back by `latency`.
pub fn app_with_latency(latency: Duration) -> Router {
    let state = AppState {
        db: Arc::new(RwLock::new(Store::default())),
        latency,
    };
    Router::new()
        .route("/subscriptions/{sub}/resourcegroups", get(list_groups))
        .route(
            "/subscriptions/{sub}/resourcegroups/{rg}",
            get(get_group)
                .head(head_group)
                .put(put_group)
                .patch(patch_group)
                .delete(delete_group),
        )
        .route(
            "/subscriptions/{sub}/resourcegroups/{rg}/exportTemplate",
            post(export_template),
        )
        .route(
            "/subscriptions/{sub}/resourceGroups/{rg}/providers/Microsoft.RecoveryServices/vaults",
            get(list_vaults),
        )
        .route(
            "/subscriptions/{sub}/resourceGroups/{rg}/providers/Microsoft.RecoveryServices/vaults/{vault}",
            get(get_vault).put(put_vault).delete(delete_vault),
        )
        .route(
            "/subscriptions/{sub}/providers/Microsoft.Compute/locations/{location}/vmSizes",
            get(list_vm_sizes),
        )
        .route("/{container}/{blob}", put(snapshot_blob))
        .layer(middleware::from_fn_with_state(state.clone(), arm_conventions))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with_latency(listener, Duration::ZERO).await
}

pub async fn run_with_latency(listener: TcpListener, latency: Duration) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_latency(latency)).await
}

/// The error envelope every management endpoint uses.
fn arm_error(status: StatusCode, code: &str, message: String) -> Response {
    (status, Json(json!({ "error": { "code": code, "message": message } }))).into_response()
}

fn group_not_found(rg: &str) -> Response {
    arm_error(
        StatusCode::NOT_FOUND,
        "ResourceGroupNotFound",
        format!("Resource group '{rg}' could not be found."),
    )
}

async fn arm_conventions(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if !state.latency.is_zero() {
        tokio::time::sleep(state.latency).await;
    }

    let management = request.uri().path().starts_with("/subscriptions/");
    let has_version = request
        .uri()
        .query()
        .is_some_and(|q| q.split('&').any(|p| p.starts_with("api-version=")));

    let mut response = if management && !has_version {
        arm_error(
            StatusCode::BAD_REQUEST,
            "MissingApiVersionParameter",
            "The api-version query parameter (?api-version=) is required for all requests.".to_string(),
        )
    } else {
        next.run(request).await
    };

    if let Ok(id) = HeaderValue::from_str(&Uuid::new_v4().to_string()) {
        response.headers_mut().insert("x-ms-request-id", id);
    }
    response
}

/// Slices `items` at the offset in `$skiptoken` and links to the rest.
fn page<T: Serialize>(
    items: Vec<T>,
    path: &str,
    query: &HashMap<String, String>,
    headers: &HeaderMap,
) -> Json<serde_json::Value> {
    let offset = query
        .get("$skiptoken")
        .and_then(|t| t.strip_prefix("offset="))
        .and_then(|n| n.parse::<usize>().ok())
        .unwrap_or(0);
    let size = query
        .get("$top")
        .and_then(|n| n.parse::<usize>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(DEFAULT_PAGE_SIZE);

    let total = items.len();
    let value: Vec<T> = items.into_iter().skip(offset).take(size).collect();
    let mut body = json!({ "value": value });

    let next = offset + size;
    if next < total {
        let host = headers
            .get("host")
            .and_then(|h| h.to_str().ok())
            .unwrap_or("localhost");
        let version = query.get("api-version").map(String::as_str).unwrap_or_default();
        body["nextLink"] = json!(format!(
            "http://{host}{path}?api-version={version}&$skiptoken=offset%3D{next}&$top={size}"
        ));
    }
    Json(body)
}

// --- resource groups ---

async fn list_groups(
    State(state): State<AppState>,
    Path(sub): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Json<serde_json::Value> {
    let groups: Vec<ResourceGroup> = state.db.read().await.groups.values().cloned().collect();
    page(groups, &format!("/subscriptions/{sub}/resourcegroups"), &query, &headers)
}

async fn head_group(State(state): State<AppState>, Path((_, rg)): Path<(String, String)>) -> StatusCode {
    if state.db.read().await.groups.contains_key(&rg.to_lowercase()) {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

async fn get_group(State(state): State<AppState>, Path((_, rg)): Path<(String, String)>) -> Response {
    match state.db.read().await.groups.get(&rg.to_lowercase()) {
        Some(group) => Json(group.clone()).into_response(),
        None => group_not_found(&rg),
    }
}

async fn put_group(
    State(state): State<AppState>,
    Path((sub, rg)): Path<(String, String)>,
    Json(input): Json<ResourceInput>,
) -> Response {
    let Some(location) = input.location else {
        return arm_error(
            StatusCode::BAD_REQUEST,
            "LocationRequired",
            "The location property is required for this definition.".to_string(),
        );
    };
    let group = ResourceGroup {
        id: format!("/subscriptions/{sub}/resourceGroups/{rg}"),
        name: rg.clone(),
        location,
        tags: input.tags,
        properties: Properties::succeeded(),
    };
    let previous = state.db.write().await.groups.insert(rg.to_lowercase(), group.clone());
    let status = if previous.is_some() {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    (status, Json(group)).into_response()
}

async fn patch_group(
    State(state): State<AppState>,
    Path((_, rg)): Path<(String, String)>,
    Json(input): Json<ResourceInput>,
) -> Response {
    let mut store = state.db.write().await;
    let Some(group) = store.groups.get_mut(&rg.to_lowercase()) else {
        return group_not_found(&rg);
    };
    if let Some(tags) = input.tags {
        group.tags = Some(tags);
    }
    Json(group.clone()).into_response()
}

async fn delete_group(State(state): State<AppState>, Path((_, rg)): Path<(String, String)>) -> Response {
    let key = rg.to_lowercase();
    let mut store = state.db.write().await;
    if store.groups.remove(&key).is_none() {
        return group_not_found(&rg);
    }
    store.vaults.retain(|(group, _), _| *group != key);
    StatusCode::ACCEPTED.into_response()
}

async fn export_template(State(state): State<AppState>, Path((_, rg)): Path<(String, String)>) -> Response {
    let store = state.db.read().await;
    if !store.groups.contains_key(&rg.to_lowercase()) {
        return group_not_found(&rg);
    }
    let resources: Vec<serde_json::Value> = store
        .vaults
        .iter()
        .filter(|((group, _), _)| *group == rg.to_lowercase())
        .map(|(_, v)| json!({ "type": v.resource_type, "name": v.name, "location": v.location }))
        .collect();
    Json(json!({
        "template": {
            "$schema": "https://schema.management.azure.com/schemas/2015-01-01/deploymentTemplate.json#",
            "contentVersion": "1.0.0.0",
            "resources": resources
        }
    }))
    .into_response()
}

// --- vaults ---

async fn list_vaults(
    State(state): State<AppState>,
    Path((sub, rg)): Path<(String, String)>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Json<serde_json::Value> {
    let key = rg.to_lowercase();
    let vaults: Vec<Vault> = state
        .db
        .read()
        .await
        .vaults
        .iter()
        .filter(|((group, _), _)| *group == key)
        .map(|(_, v)| v.clone())
        .collect();
    let path = format!("/subscriptions/{sub}/resourceGroups/{rg}/providers/Microsoft.RecoveryServices/vaults");
    page(vaults, &path, &query, &headers)
}

async fn get_vault(
    State(state): State<AppState>,
    Path((_, rg, name)): Path<(String, String, String)>,
) -> Response {
    match state.db.read().await.vaults.get(&(rg.to_lowercase(), name.clone())) {
        Some(vault) => Json(vault.clone()).into_response(),
        None => arm_error(
            StatusCode::NOT_FOUND,
            "ResourceNotFound",
            format!("The Resource 'Microsoft.RecoveryServices/vaults/{name}' under resource group '{rg}' was not found."),
        ),
    }
}

async fn put_vault(
    State(state): State<AppState>,
    Path((sub, rg, name)): Path<(String, String, String)>,
    Json(input): Json<ResourceInput>,
) -> Response {
    let mut store = state.db.write().await;
    if !store.groups.contains_key(&rg.to_lowercase()) {
        return group_not_found(&rg);
    }
    let vault = Vault {
        id: format!("/subscriptions/{sub}/resourceGroups/{rg}/providers/Microsoft.RecoveryServices/vaults/{name}"),
        name: name.clone(),
        resource_type: "Microsoft.RecoveryServices/vaults".to_string(),
        location: input.location.unwrap_or_else(|| "westus".to_string()),
        properties: Properties::succeeded(),
    };
    let previous = store.vaults.insert((rg.to_lowercase(), name), vault.clone());
    let status = if previous.is_some() {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    (status, Json(vault)).into_response()
}

async fn delete_vault(
    State(state): State<AppState>,
    Path((_, rg, name)): Path<(String, String, String)>,
) -> StatusCode {
    state.db.write().await.vaults.remove(&(rg.to_lowercase(), name));
    StatusCode::OK
}

// --- compute ---

/// The catalog is the same in every location.
async fn list_vm_sizes(Path((_, _location)): Path<(String, String)>) -> Json<serde_json::Value> {
    let sizes: Vec<serde_json::Value> = [("Standard_A0", 1, 768), ("Standard_A1", 1, 1792), ("Standard_D2_v2", 2, 7168)]
        .into_iter()
        .map(|(name, cores, memory)| {
            json!({
                "name": name,
                "numberOfCores": cores,
                "osDiskSizeInMB": 1047552,
                "resourceDiskSizeInMB": 20480,
                "memoryInMB": memory,
                "maxDataDiskCount": cores * 2
            })
        })
        .collect();
    Json(json!({ "value": sizes }))
}

// --- storage ---

async fn snapshot_blob(
    State(state): State<AppState>,
    Path((_container, _blob)): Path<(String, String)>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    if query.get("comp").map(String::as_str) != Some("snapshot") {
        return (StatusCode::BAD_REQUEST, "unsupported blob operation").into_response();
    }
    if !headers.contains_key("x-ms-version") {
        return (StatusCode::BAD_REQUEST, "missing x-ms-version header").into_response();
    }

    let n = {
        let mut store = state.db.write().await;
        store.snapshots += 1;
        store.snapshots
    };
    let snapshot = format!("2016-01-01T00:00:{:02}.{:07}Z", n % 60, n);
    let mut response = StatusCode::CREATED.into_response();
    if let Ok(value) = HeaderValue::from_str(&snapshot) {
        response.headers_mut().insert("x-ms-snapshot", value);
    }
    response
        .headers_mut()
        .insert("etag", HeaderValue::from_static("\"0x8D3F2E1B5C6A7B8\""));
    response
}
