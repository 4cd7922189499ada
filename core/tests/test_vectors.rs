//! Verify the Prepare and Respond stages against JSON test vectors stored in
//! `test-vectors/`.
//!
//! Each prepare vector names a real operation descriptor, its arguments and
//! the exact request it must produce. Each respond vector feeds a simulated
//! response to an operation and states the decoded value or the error kind.
//! Bodies are compared as parsed JSON to ignore field ordering.

use arm_core::services::{apimanagement, compute, recoveryservices, resources, storage};
use arm_core::{
    ClientConfig, ErrorKind, HttpMethod, HttpResponse, Operation, Params, prepare_request, respond_empty,
    respond_json,
};
use bytes::Bytes;

const OPERATIONS: &[Operation] = &[
    resources::CHECK_EXISTENCE,
    resources::CREATE_OR_UPDATE,
    resources::DELETE,
    resources::GET,
    resources::LIST,
    compute::GET,
    compute::POWER_OFF,
    apimanagement::LIST_BY_USER,
    recoveryservices::DELETE,
    storage::SNAPSHOT_BLOB,
];

fn operation(name: &str) -> &'static Operation {
    OPERATIONS
        .iter()
        .find(|op| op.name == name)
        .unwrap_or_else(|| panic!("unknown operation: {name}"))
}

fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "PUT" => HttpMethod::Put,
        "POST" => HttpMethod::Post,
        "DELETE" => HttpMethod::Delete,
        "PATCH" => HttpMethod::Patch,
        "HEAD" => HttpMethod::Head,
        other => panic!("unknown method: {other}"),
    }
}

// ---------------------------------------------------------------------------
// Prepare
// ---------------------------------------------------------------------------

#[test]
fn prepare_test_vectors() {
    let raw = include_str!("../../test-vectors/prepare.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();
    let defaults = &vectors["defaults"];

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let op = operation(case["operation"].as_str().unwrap());

        let base_uri = case["base_uri"].as_str().or(defaults["base_uri"].as_str()).unwrap();
        let config = ClientConfig::new(
            defaults["subscription_id"].as_str().unwrap(),
            case["api_version"].as_str().unwrap(),
        )
        .with_base_uri(base_uri)
        .unwrap();

        let mut params = Params::new();
        for (k, v) in case["path"].as_object().unwrap() {
            params = params.path(k, v.as_str().unwrap());
        }
        for (k, v) in case["query"].as_object().unwrap() {
            params = params.query(k, v.as_str());
        }

        let body = case.get("body");
        let req = prepare_request(&config, op, &params, body).unwrap();

        let expected = &case["expected_request"];
        assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
        assert_eq!(req.url, expected["url"].as_str().unwrap(), "{name}: url");

        let expected_headers: Vec<(String, String)> = expected["headers"]
            .as_array()
            .unwrap()
            .iter()
            .map(|h| {
                let arr = h.as_array().unwrap();
                (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
            })
            .collect();
        assert_eq!(req.headers, expected_headers, "{name}: headers");

        match req.body.as_deref() {
            Some(sent) => {
                let sent: serde_json::Value = serde_json::from_str(sent).unwrap();
                assert_eq!(sent, expected["body"], "{name}: body");
            }
            None => assert!(expected["body"].is_null(), "{name}: expected a body"),
        }

        // Preparing twice gives the identical request.
        assert_eq!(prepare_request(&config, op, &params, body).unwrap(), req, "{name}: determinism");
    }
}

// ---------------------------------------------------------------------------
// Respond
// ---------------------------------------------------------------------------

#[test]
fn respond_test_vectors() {
    let raw = include_str!("../../test-vectors/respond.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let op = operation(case["operation"].as_str().unwrap());
        let sim = &case["simulated_response"];
        let response = HttpResponse {
            status: sim["status"].as_u64().unwrap() as u16,
            headers: Vec::new(),
            body: Bytes::from(sim["body"].as_str().unwrap().to_string()),
        };

        let result = match case["decode"].as_str().unwrap() {
            "json" => respond_json::<serde_json::Value>(op, response).map(|r| r.map(Some)),
            "empty" => respond_empty(op, response).map(|r| r.map(|()| None)),
            other => panic!("unknown decode mode: {other}"),
        };

        let expected = &case["expected"];
        if expected["ok"].as_bool().unwrap() {
            let resp = result.unwrap_or_else(|e| panic!("{name}: unexpected error {e}"));
            assert_eq!(u64::from(resp.status()), expected["status"].as_u64().unwrap(), "{name}: status");
            if let Some(value) = expected.get("value") {
                assert_eq!(resp.value().as_ref(), Some(value), "{name}: value");
            }
            continue;
        }

        let err = match result {
            Ok(_) => panic!("{name}: expected an error"),
            Err(e) => e,
        };
        assert_eq!(err.operation(), op.name, "{name}: operation");
        match expected["kind"].as_str().unwrap() {
            "status" => {
                assert_eq!(err.status().map(u64::from), expected["status"].as_u64(), "{name}: status");
                let code = err.service_error().map(|e| e.code.as_str());
                assert_eq!(code, expected["code"].as_str(), "{name}: service error code");
            }
            "decode" => assert!(matches!(err.kind(), ErrorKind::Decode(_)), "{name}: {err}"),
            other => panic!("unknown error kind: {other}"),
        }
    }
}
