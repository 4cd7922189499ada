use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, ResourceGroup, Vault};
use tower::ServiceExt;

const GROUPS: &str = "/subscriptions/sub/resourcegroups";
const VERSION: &str = "api-version=2016-09-01";

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::HOST, "mock.test")
        .body(String::new())
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::HOST, "mock.test")
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn group_uri(name: &str) -> String {
    format!("{GROUPS}/{name}?{VERSION}")
}

// --- conventions ---

#[tokio::test]
async fn missing_api_version_returns_400() {
    let resp = app().oneshot(request("GET", GROUPS)).await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["error"]["code"], "MissingApiVersionParameter");
}

#[tokio::test]
async fn every_response_carries_request_id() {
    let resp = app().oneshot(request("GET", &group_uri("nope"))).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(resp.headers().contains_key("x-ms-request-id"));
}

// --- resource groups ---

#[tokio::test]
async fn get_missing_group_returns_arm_error() {
    let resp = app().oneshot(request("GET", &group_uri("rg1"))).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["error"]["code"], "ResourceGroupNotFound");
}

#[tokio::test]
async fn put_group_without_location_returns_400() {
    let resp = app()
        .oneshot(json_request("PUT", &group_uri("rg1"), "{}"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn head_missing_group_returns_404() {
    let resp = app().oneshot(request("HEAD", &group_uri("rg1"))).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(body_bytes(resp).await.is_empty());
}

#[tokio::test]
async fn snapshot_requires_comp_and_version() {
    let resp = app().oneshot(request("PUT", "/c/b?comp=snapshot")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = app()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/c/b?comp=snapshot")
                .header("x-ms-version", "2017-11-09")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert!(resp.headers().contains_key("x-ms-snapshot"));
}

#[tokio::test]
async fn vm_sizes_are_listed() {
    let resp = app()
        .oneshot(request(
            "GET",
            "/subscriptions/sub/providers/Microsoft.Compute/locations/westus/vmSizes?api-version=2016-03-30",
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["value"].as_array().unwrap().len(), 3);
    assert!(body.get("nextLink").is_none());
}

// --- full lifecycle ---

#[tokio::test]
async fn group_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();

    // create
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("PUT", &group_uri("RG1"), r#"{"location":"westus"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: ResourceGroup = body_json(resp).await;
    assert_eq!(created.id, "/subscriptions/sub/resourceGroups/RG1");
    assert_eq!(created.properties.provisioning_state, "Succeeded");

    // create again: same group, now 200
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("PUT", &group_uri("rg1"), r#"{"location":"westus"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // exists, case-insensitively
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request("HEAD", &group_uri("Rg1")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    // patch tags
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("PATCH", &group_uri("rg1"), r#"{"tags":{"env":"test"}}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let patched: ResourceGroup = body_json(resp).await;
    assert_eq!(patched.tags.unwrap()["env"], "test");

    // vault inside the group
    let vault_uri = "/subscriptions/sub/resourceGroups/rg1/providers/Microsoft.RecoveryServices/vaults/v1?api-version=2016-06-01";
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("PUT", vault_uri, r#"{"location":"westus"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let vault: Vault = body_json(resp).await;
    assert_eq!(vault.resource_type, "Microsoft.RecoveryServices/vaults");

    // delete is accepted
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request("DELETE", &group_uri("rg1")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::ACCEPTED);

    // vault went with the group
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request("GET", vault_uri))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_pages_through_skiptoken() {
    use tower::Service;

    let mut app = app().into_service();
    for name in ["a", "b", "c"] {
        let resp = ServiceExt::ready(&mut app)
            .await
            .unwrap()
            .call(json_request("PUT", &group_uri(name), r#"{"location":"westus"}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request("GET", &format!("{GROUPS}?{VERSION}")))
        .await
        .unwrap();
    let first: serde_json::Value = body_json(resp).await;
    assert_eq!(first["value"].as_array().unwrap().len(), 2);
    let next = first["nextLink"].as_str().unwrap();
    assert!(next.starts_with("http://mock.test/subscriptions/sub/resourcegroups?"));

    let path = next.trim_start_matches("http://mock.test");
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request("GET", path))
        .await
        .unwrap();
    let second: serde_json::Value = body_json(resp).await;
    assert_eq!(second["value"][0]["name"], "c");
    assert!(second.get("nextLink").is_none());
}
