//! Blob snapshots on the storage data plane.
//!
//! Unlike the management endpoints, the blob service lives on a per-account
//! host, takes its API version in the `x-ms-version` header and wants every
//! request dated. Point the client's base URI at `account_endpoint(..)`.

use chrono::Utc;

use crate::client::{ManagementClient, NO_BODY};
use crate::error::ApiError;
use crate::http::HttpMethod;
use crate::prepare::{Operation, Params};
use crate::respond::{Response, respond_empty};

/// Oldest blob service version that accepts bearer tokens.
pub const API_VERSION: &str = "2017-11-09";

pub const VERSION_HEADER: &str = "x-ms-version";
pub const DATE_HEADER: &str = "x-ms-date";
pub const SNAPSHOT_HEADER: &str = "x-ms-snapshot";

pub const SNAPSHOT_BLOB: Operation = Operation::new(
    "storage.BlobsClient.SnapshotBlob",
    HttpMethod::Put,
    "/{container}/{blob}",
    &[201],
)
.with_api_version_header(VERSION_HEADER);

/// Blob endpoint of a storage account in the public cloud.
pub fn account_endpoint(account: &str) -> String {
    format!("https://{account}.blob.core.windows.net")
}

/// What the service reports about a new snapshot. It is all carried in
/// response headers; the body is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlobSnapshot {
    /// Opaque timestamp identifying the snapshot, for `?snapshot=` queries.
    pub snapshot: Option<String>,
    pub etag: Option<String>,
    pub last_modified: Option<String>,
}

#[derive(Debug, Clone)]
pub struct BlobsClient {
    client: ManagementClient,
}

impl BlobsClient {
    pub fn new(client: &ManagementClient) -> Self {
        Self::with_client(client.with_api_version(API_VERSION))
    }

    pub fn with_client(client: ManagementClient) -> Self {
        Self { client }
    }

    /// Takes a read-only snapshot of `blob`. The service answers 201 with
    /// the snapshot id in `x-ms-snapshot`.
    pub async fn snapshot_blob(&self, container: &str, blob: &str) -> Result<Response<BlobSnapshot>, ApiError> {
        let params = Params::new()
            .path("container", container)
            .path("blob", blob)
            .query("comp", "snapshot");
        let mut request = self.client.prepare(&SNAPSHOT_BLOB, &params, NO_BODY)?;
        request.set_header(DATE_HEADER, Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string());

        let response = respond_empty(&SNAPSHOT_BLOB, self.client.send(&SNAPSHOT_BLOB, request, None).await?)?;
        let snapshot = BlobSnapshot {
            snapshot: response.header(SNAPSHOT_HEADER).map(str::to_string),
            etag: response.header("etag").map(str::to_string),
            last_modified: response.header("last-modified").map(str::to_string),
        };
        tracing::debug!(container, blob, snapshot = ?snapshot.snapshot, "blob snapshot created");
        Ok(response.map(|()| snapshot))
    }
}
