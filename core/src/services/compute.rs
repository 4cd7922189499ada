//! Virtual machines and machine sizes.

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::client::{ManagementClient, NO_BODY};
use crate::error::ApiError;
use crate::http::HttpMethod;
use crate::pagination::{Page, PageResult, Paginator};
use crate::prepare::{Operation, Params};
use crate::respond::Response;
use crate::types::{SubResource, Tags};

pub const API_VERSION: &str = "2016-03-30";

const VM_PATH: &str = "/subscriptions/{subscriptionId}/resourceGroups/{resourceGroupName}/providers/Microsoft.Compute/virtualMachines/{vmName}";

pub const CAPTURE: Operation = Operation::new(
    "compute.VirtualMachinesClient.Capture",
    HttpMethod::Post,
    "/subscriptions/{subscriptionId}/resourceGroups/{resourceGroupName}/providers/Microsoft.Compute/virtualMachines/{vmName}/capture",
    &[200, 202],
);
pub const CREATE_OR_UPDATE: Operation = Operation::new(
    "compute.VirtualMachinesClient.CreateOrUpdate",
    HttpMethod::Put,
    VM_PATH,
    &[200, 201],
);
pub const DEALLOCATE: Operation = Operation::new(
    "compute.VirtualMachinesClient.Deallocate",
    HttpMethod::Post,
    "/subscriptions/{subscriptionId}/resourceGroups/{resourceGroupName}/providers/Microsoft.Compute/virtualMachines/{vmName}/deallocate",
    &[200, 202],
);
pub const DELETE: Operation = Operation::new(
    "compute.VirtualMachinesClient.Delete",
    HttpMethod::Delete,
    VM_PATH,
    &[200, 202, 204],
);
pub const GENERALIZE: Operation = Operation::new(
    "compute.VirtualMachinesClient.Generalize",
    HttpMethod::Post,
    "/subscriptions/{subscriptionId}/resourceGroups/{resourceGroupName}/providers/Microsoft.Compute/virtualMachines/{vmName}/generalize",
    &[200],
);
pub const GET: Operation = Operation::new("compute.VirtualMachinesClient.Get", HttpMethod::Get, VM_PATH, &[200]);
pub const LIST: Operation = Operation::new(
    "compute.VirtualMachinesClient.List",
    HttpMethod::Get,
    "/subscriptions/{subscriptionId}/resourceGroups/{resourceGroupName}/providers/Microsoft.Compute/virtualMachines",
    &[200],
);
pub const LIST_ALL: Operation = Operation::new(
    "compute.VirtualMachinesClient.ListAll",
    HttpMethod::Get,
    "/subscriptions/{subscriptionId}/providers/Microsoft.Compute/virtualMachines",
    &[200],
);
pub const LIST_AVAILABLE_SIZES: Operation = Operation::new(
    "compute.VirtualMachinesClient.ListAvailableSizes",
    HttpMethod::Get,
    "/subscriptions/{subscriptionId}/resourceGroups/{resourceGroupName}/providers/Microsoft.Compute/virtualMachines/{vmName}/vmSizes",
    &[200],
);
pub const POWER_OFF: Operation = Operation::new(
    "compute.VirtualMachinesClient.PowerOff",
    HttpMethod::Post,
    "/subscriptions/{subscriptionId}/resourceGroups/{resourceGroupName}/providers/Microsoft.Compute/virtualMachines/{vmName}/powerOff",
    &[200, 202],
);
pub const RESTART: Operation = Operation::new(
    "compute.VirtualMachinesClient.Restart",
    HttpMethod::Post,
    "/subscriptions/{subscriptionId}/resourceGroups/{resourceGroupName}/providers/Microsoft.Compute/virtualMachines/{vmName}/restart",
    &[200, 202],
);
pub const START: Operation = Operation::new(
    "compute.VirtualMachinesClient.Start",
    HttpMethod::Post,
    "/subscriptions/{subscriptionId}/resourceGroups/{resourceGroupName}/providers/Microsoft.Compute/virtualMachines/{vmName}/start",
    &[200, 202],
);
pub const SIZES_LIST: Operation = Operation::new(
    "compute.VirtualMachineSizesClient.List",
    HttpMethod::Get,
    "/subscriptions/{subscriptionId}/providers/Microsoft.Compute/locations/{location}/vmSizes",
    &[200],
);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualMachine {
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
    pub properties: Option<VirtualMachineProperties>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualMachineProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hardware_profile: Option<HardwareProfile>,
    /// Disk layout. Kept as raw JSON; its schema varies between API versions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_profile: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os_profile: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_profile: Option<NetworkProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability_set: Option<SubResource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
    /// Only returned by `get` with `expand = Some("instanceView")`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_view: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vm_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HardwareProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vm_size: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkProfile {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub network_interfaces: Vec<SubResource>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualMachineCaptureParameters {
    pub vhd_prefix: String,
    pub destination_container_name: String,
    pub overwrite_vhds: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VirtualMachineCaptureResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// The captured image template.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualMachineSize {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_of_cores: Option<i32>,
    #[serde(rename = "osDiskSizeInMB", skip_serializing_if = "Option::is_none")]
    pub os_disk_size_in_mb: Option<i32>,
    #[serde(rename = "resourceDiskSizeInMB", skip_serializing_if = "Option::is_none")]
    pub resource_disk_size_in_mb: Option<i32>,
    #[serde(rename = "memoryInMB", skip_serializing_if = "Option::is_none")]
    pub memory_in_mb: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_data_disk_count: Option<i32>,
}

/// Machine sizes. This list is never paged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualMachineSizeListResult {
    #[serde(default)]
    pub value: Vec<VirtualMachineSize>,
}

pub type VirtualMachineListResult = Page<VirtualMachine>;

/// Client for the virtual machine operations.
#[derive(Debug, Clone)]
pub struct VirtualMachinesClient {
    client: ManagementClient,
}

impl VirtualMachinesClient {
    pub fn new(client: &ManagementClient) -> Self {
        Self::with_client(client.with_api_version(API_VERSION))
    }

    pub fn with_client(client: ManagementClient) -> Self {
        Self { client }
    }

    /// Captures the machine's disks as an image. The result is absent while
    /// the capture is still running (202).
    pub async fn capture(
        &self,
        resource_group_name: &str,
        vm_name: &str,
        parameters: &VirtualMachineCaptureParameters,
    ) -> Result<Response<Option<VirtualMachineCaptureResult>>, ApiError> {
        self.client
            .call_optional_json(&CAPTURE, &vm_params(resource_group_name, vm_name), Some(parameters), None)
            .await
    }

    pub async fn create_or_update(
        &self,
        resource_group_name: &str,
        vm_name: &str,
        parameters: &VirtualMachine,
    ) -> Result<Response<VirtualMachine>, ApiError> {
        self.client
            .call_json(&CREATE_OR_UPDATE, &vm_params(resource_group_name, vm_name), Some(parameters), None)
            .await
    }

    pub async fn deallocate(&self, resource_group_name: &str, vm_name: &str) -> Result<Response<()>, ApiError> {
        self.action(&DEALLOCATE, resource_group_name, vm_name).await
    }

    pub async fn delete(
        &self,
        resource_group_name: &str,
        vm_name: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<Response<()>, ApiError> {
        self.client
            .call_empty(&DELETE, &vm_params(resource_group_name, vm_name), NO_BODY, cancel)
            .await
    }

    pub async fn generalize(&self, resource_group_name: &str, vm_name: &str) -> Result<Response<()>, ApiError> {
        self.action(&GENERALIZE, resource_group_name, vm_name).await
    }

    pub async fn get(
        &self,
        resource_group_name: &str,
        vm_name: &str,
        expand: Option<&str>,
    ) -> Result<Response<VirtualMachine>, ApiError> {
        let params = vm_params(resource_group_name, vm_name).query("$expand", expand);
        self.client.call_json(&GET, &params, NO_BODY, None).await
    }

    pub async fn list(&self, resource_group_name: &str) -> PageResult<VirtualMachine> {
        self.client
            .call_json(&LIST, &group_params(resource_group_name), NO_BODY, None)
            .await
    }

    pub async fn list_next_results(&self, last: &VirtualMachineListResult) -> PageResult<VirtualMachine> {
        self.client.next_results(&LIST, last, None).await
    }

    pub fn list_pages(&self, resource_group_name: &str) -> Paginator<VirtualMachine> {
        self.client.pages(&LIST, group_params(resource_group_name))
    }

    pub async fn list_all(&self) -> PageResult<VirtualMachine> {
        self.client.call_json(&LIST_ALL, &Params::new(), NO_BODY, None).await
    }

    pub async fn list_all_next_results(&self, last: &VirtualMachineListResult) -> PageResult<VirtualMachine> {
        self.client.next_results(&LIST_ALL, last, None).await
    }

    pub fn list_all_pages(&self) -> Paginator<VirtualMachine> {
        self.client.pages(&LIST_ALL, Params::new())
    }

    /// Sizes the machine can be resized to.
    pub async fn list_available_sizes(
        &self,
        resource_group_name: &str,
        vm_name: &str,
    ) -> Result<Response<VirtualMachineSizeListResult>, ApiError> {
        self.client
            .call_json(&LIST_AVAILABLE_SIZES, &vm_params(resource_group_name, vm_name), NO_BODY, None)
            .await
    }

    pub async fn power_off(&self, resource_group_name: &str, vm_name: &str) -> Result<Response<()>, ApiError> {
        self.action(&POWER_OFF, resource_group_name, vm_name).await
    }

    pub async fn restart(&self, resource_group_name: &str, vm_name: &str) -> Result<Response<()>, ApiError> {
        self.action(&RESTART, resource_group_name, vm_name).await
    }

    pub async fn start(&self, resource_group_name: &str, vm_name: &str) -> Result<Response<()>, ApiError> {
        self.action(&START, resource_group_name, vm_name).await
    }

    /// Power-state changes: bodiless POSTs answered with 200 or 202.
    async fn action(&self, op: &Operation, resource_group_name: &str, vm_name: &str) -> Result<Response<()>, ApiError> {
        self.client
            .call_empty(op, &vm_params(resource_group_name, vm_name), NO_BODY, None)
            .await
    }
}

/// Client for the per-location machine size catalog.
#[derive(Debug, Clone)]
pub struct VirtualMachineSizesClient {
    client: ManagementClient,
}

impl VirtualMachineSizesClient {
    pub fn new(client: &ManagementClient) -> Self {
        Self::with_client(client.with_api_version(API_VERSION))
    }

    pub fn with_client(client: ManagementClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, location: &str) -> Result<Response<VirtualMachineSizeListResult>, ApiError> {
        let params = Params::new().path("location", location);
        self.client.call_json(&SIZES_LIST, &params, NO_BODY, None).await
    }
}

fn group_params(resource_group_name: &str) -> Params {
    Params::new().path("resourceGroupName", resource_group_name)
}

fn vm_params(resource_group_name: &str, vm_name: &str) -> Params {
    group_params(resource_group_name).path("vmName", vm_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_fields_use_service_casing() {
        let size: VirtualMachineSize = serde_json::from_str(
            r#"{"name":"Standard_A1","numberOfCores":1,"osDiskSizeInMB":1047552,"resourceDiskSizeInMB":71680,"memoryInMB":1792,"maxDataDiskCount":2}"#,
        )
        .unwrap();
        assert_eq!(size.name.as_deref(), Some("Standard_A1"));
        assert_eq!(size.os_disk_size_in_mb, Some(1047552));
        assert_eq!(size.memory_in_mb, Some(1792));
        assert_eq!(size.max_data_disk_count, Some(2));
    }

    #[test]
    fn capture_parameters_serialize_camel_case() {
        let params = VirtualMachineCaptureParameters {
            vhd_prefix: "img".to_string(),
            destination_container_name: "vhds".to_string(),
            overwrite_vhds: true,
        };
        assert_eq!(
            serde_json::to_value(&params).unwrap(),
            serde_json::json!({"vhdPrefix": "img", "destinationContainerName": "vhds", "overwriteVhds": true})
        );
    }

    #[test]
    fn vm_round_trips_nested_profiles() {
        let body = serde_json::json!({
            "id": "/subscriptions/s/resourceGroups/rg/providers/Microsoft.Compute/virtualMachines/vm1",
            "name": "vm1",
            "type": "Microsoft.Compute/virtualMachines",
            "location": "westus",
            "properties": {
                "hardwareProfile": {"vmSize": "Standard_A1"},
                "networkProfile": {"networkInterfaces": [{"id": "/nic1"}]},
                "provisioningState": "Succeeded"
            }
        });
        let vm: VirtualMachine = serde_json::from_value(body.clone()).unwrap();
        let props = vm.properties.as_ref().unwrap();
        assert_eq!(props.hardware_profile.as_ref().unwrap().vm_size.as_deref(), Some("Standard_A1"));
        assert_eq!(props.network_profile.as_ref().unwrap().network_interfaces[0], SubResource::new("/nic1"));
        assert_eq!(serde_json::to_value(&vm).unwrap(), body);
    }

    #[test]
    fn power_operations_accept_accepted() {
        for op in [DEALLOCATE, POWER_OFF, RESTART, START, CAPTURE] {
            assert!(op.accepts(200) && op.accepts(202), "{}", op.name);
        }
        assert!(!GENERALIZE.accepts(202));
        assert!(DELETE.accepts(204));
    }
}
