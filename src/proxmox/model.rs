use serde::{Deserialize, Serialize};

/// Proxmox wraps every response body in a `data` envelope.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VmPowerState {
    Running,
    Stopped,
    Paused,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
pub struct VmCurrentStatus {
    pub status: VmPowerState,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VmListItem {
    pub vmid: u32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<VmPowerState>,
    #[serde(default)]
    pub template: Option<u8>,
}

impl VmListItem {
    pub fn is_template(&self) -> bool {
        self.template == Some(1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProvisioningSpec {
    pub vmid: u32,
    pub cdrom: String,
    pub name: String,
    pub storage: String,
    pub memory: u64,
    pub scsi0: String,
    pub cores: u32,
    pub start: u8,
    pub net0: String,
}
