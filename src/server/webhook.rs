use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::netbox::model::{CustomFields, VirtualMachine, VmStatus};
use crate::proxmox::model::ProvisioningSpec;

/// Netbox webhook envelope. Only `event` and `data` are load-bearing; the
/// rest is carried for logging.
#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub event: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub model: Option<String>,
    pub username: Option<String>,
    pub request_id: Option<String>,
    #[serde(default)]
    pub data: WebhookData,
}

#[derive(Debug, Default, Deserialize)]
pub struct WebhookData {
    pub id: Option<u64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub comments: String,
    pub status: Option<VmStatus>,
    pub memory: Option<u64>,
    pub disk: Option<u64>,
    pub vcpus: Option<Value>,
    #[serde(default)]
    pub custom_fields: CustomFields,
}

/// Normalized per-request view of a virtual machine, built either from the
/// webhook payload or from a record fetched out of Netbox. Webhook payloads
/// carry the machine state in `status.value` ("active", "offline"), fetched
/// records branch on the rendered label ("Staged", "Planned").
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VirtualMachineRecord {
    pub id: Option<u64>,
    pub name: String,
    pub comments: String,
    pub status: String,
    pub memory: Option<u64>,
    pub disk: Option<u64>,
    pub vcpus: Option<f64>,
    pub os: String,
    pub vmid: Option<u32>,
}

impl From<&WebhookData> for VirtualMachineRecord {
    fn from(data: &WebhookData) -> Self {
        Self {
            id: data.id,
            name: data.name.clone(),
            comments: data.comments.clone(),
            status: data.status.as_ref().map(|s| s.value.clone()).unwrap_or_default(),
            memory: data.memory,
            disk: data.disk,
            vcpus: data.vcpus.as_ref().and_then(number_value),
            os: data.custom_fields.os.clone().unwrap_or_default(),
            vmid: data.custom_fields.vmid.as_ref().and_then(vmid_value),
        }
    }
}

impl From<&VirtualMachine> for VirtualMachineRecord {
    fn from(vm: &VirtualMachine) -> Self {
        Self {
            id: Some(vm.id),
            name: vm.name.clone(),
            comments: vm.comments.clone(),
            status: vm.status.as_ref().map(|s| s.label.clone()).unwrap_or_default(),
            memory: vm.memory,
            disk: vm.disk,
            vcpus: vm.vcpus.as_ref().and_then(number_value),
            os: vm.custom_fields.os.clone().unwrap_or_default(),
            vmid: vm.custom_fields.vmid.as_ref().and_then(vmid_value),
        }
    }
}

impl VirtualMachineRecord {
    /// Everything the provisioning spec needs, present and non-empty.
    pub fn has_all_create_fields(&self) -> bool {
        self.vmid.is_some()
            && !self.os.is_empty()
            && !self.name.is_empty()
            && self.memory.map_or(false, |m| m > 0)
            && self.disk.map_or(false, |d| d > 0)
            && self.vcpus.map_or(false, |v| v > 0.0)
    }

    pub fn provisioning_spec(&self, start: bool) -> Option<ProvisioningSpec> {
        if !self.has_all_create_fields() {
            return None;
        }

        Some(ProvisioningSpec {
            vmid: self.vmid?,
            cdrom: format!("local:iso/{}", self.os),
            name: self.name.clone(),
            storage: String::from("local"),
            memory: self.memory?,
            scsi0: format!("local-lvm:{}", self.disk?),
            cores: self.vcpus? as u32,
            start: u8::from(start),
            net0: String::from("virtio,bridge=vmbr0"),
        })
    }
}

fn vmid_value(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn number_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(body: &str) -> WebhookPayload {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn it_parses_an_update_webhook() {
        let payload = payload(
            r#"{
                "event": "updated",
                "timestamp": "2023-10-04T12:30:00+00:00",
                "model": "virtualmachine",
                "username": "admin",
                "request_id": "2b8a7c52-3d53-4c29-9c32-8d0e4f8c02c4",
                "data": {
                    "id": 42,
                    "name": "web01",
                    "status": {"value": "offline", "label": "Offline"},
                    "memory": 2048,
                    "disk": 32,
                    "vcpus": 2,
                    "custom_fields": {"vmid": 101, "os": "debian-12.iso"}
                }
            }"#,
        );

        assert_eq!(payload.event, "updated");
        assert!(payload.timestamp.is_some());

        let record = VirtualMachineRecord::from(&payload.data);
        assert_eq!(record.status, "offline");
        assert_eq!(record.vmid, Some(101));
        assert_eq!(record.os, "debian-12.iso");
    }

    #[test]
    fn it_tolerates_a_bare_envelope() {
        let payload = payload(r#"{"event": "deleted"}"#);
        let record = VirtualMachineRecord::from(&payload.data);

        assert_eq!(payload.event, "deleted");
        assert_eq!(record.vmid, None);
        assert_eq!(record.status, "");
    }

    #[test]
    fn it_normalizes_string_typed_fields() {
        let payload = payload(
            r#"{"event": "updated", "data": {
                "name": "web01",
                "vcpus": "2.00",
                "custom_fields": {"vmid": "101"}
            }}"#,
        );
        let record = VirtualMachineRecord::from(&payload.data);

        assert_eq!(record.vmid, Some(101));
        assert_eq!(record.vcpus, Some(2.0));
    }

    fn complete_record() -> VirtualMachineRecord {
        VirtualMachineRecord {
            id: Some(42),
            name: String::from("web01"),
            comments: String::new(),
            status: String::from("Staged"),
            memory: Some(2048),
            disk: Some(32),
            vcpus: Some(2.0),
            os: String::from("debian-12.iso"),
            vmid: Some(102),
        }
    }

    #[test]
    fn it_builds_a_provisioning_spec() {
        let spec = complete_record().provisioning_spec(false).unwrap();

        assert_eq!(spec.vmid, 102);
        assert_eq!(spec.cdrom, "local:iso/debian-12.iso");
        assert_eq!(spec.storage, "local");
        assert_eq!(spec.scsi0, "local-lvm:32");
        assert_eq!(spec.cores, 2);
        assert_eq!(spec.start, 0);
        assert_eq!(spec.net0, "virtio,bridge=vmbr0");

        assert_eq!(complete_record().provisioning_spec(true).unwrap().start, 1);
    }

    #[test]
    fn it_refuses_a_spec_on_missing_data() {
        let mut record = complete_record();
        record.memory = Some(0);
        assert!(!record.has_all_create_fields());
        assert!(record.provisioning_spec(true).is_none());

        let mut record = complete_record();
        record.os = String::new();
        assert!(record.provisioning_spec(true).is_none());

        let mut record = complete_record();
        record.vmid = None;
        assert!(record.provisioning_spec(true).is_none());
    }

    #[test]
    fn it_truncates_fractional_vcpus() {
        let mut record = complete_record();
        record.vcpus = Some(2.5);
        assert_eq!(record.provisioning_spec(true).unwrap().cores, 2);
    }
}
