pub mod config;
pub mod model;

use log::{debug, info, warn};

use self::config::ProxmoxConfig;
use self::model::{ApiResponse, ProvisioningSpec, VmCurrentStatus, VmListItem, VmPowerState};

#[derive(Debug, Clone)]
pub struct ProxmoxApi {
    config: ProxmoxConfig,
    client: reqwest::Client,
}

impl ProxmoxApi {
    pub fn new(config: &ProxmoxConfig) -> Self {
        let config = config.clone();

        let mut headers = reqwest::header::HeaderMap::new();
        let mut auth_value =
            reqwest::header::HeaderValue::from_str(config.authorization().as_str()).unwrap();
        auth_value.set_sensitive(true);
        headers.insert(reqwest::header::AUTHORIZATION, auth_value);

        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(!config.ssl_verify())
            .default_headers(headers)
            .build()
            .unwrap();

        Self { config, client }
    }

    pub fn host(&self) -> &str {
        self.config.host()
    }

    fn qemu_url(&self) -> String {
        format!("{}/nodes/{}/qemu", self.config.apiurl(), self.config.node())
    }

    pub async fn list_vms(&self) -> reqwest::Result<Vec<VmListItem>> {
        debug!("List VMs on node {}", self.config.node());
        let response: ApiResponse<Vec<VmListItem>> = self
            .client
            .get(self.qemu_url())
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response.data.into_iter().filter(|vm| !vm.is_template()).collect())
    }

    pub async fn vm_status(&self, vmid: u32) -> reqwest::Result<VmPowerState> {
        let url = format!("{}/{}/status/current", self.qemu_url(), vmid);
        let response: ApiResponse<VmCurrentStatus> = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response.data.status)
    }

    pub async fn start_vm(&self, vmid: u32) -> reqwest::Result<bool> {
        if self.vm_status(vmid).await? != VmPowerState::Stopped {
            return Ok(false);
        }

        info!("Start VM {} on node {}", vmid, self.config.node());
        self.client
            .post(format!("{}/{}/status/start", self.qemu_url(), vmid))
            .send()
            .await?
            .error_for_status()?;

        Ok(true)
    }

    pub async fn stop_vm(&self, vmid: u32) -> reqwest::Result<bool> {
        info!("Stop VM {} on node {}", vmid, self.config.node());
        self.client
            .post(format!("{}/{}/status/stop", self.qemu_url(), vmid))
            .send()
            .await?
            .error_for_status()?;

        Ok(self.vm_status(vmid).await? == VmPowerState::Stopped)
    }

    pub async fn create_vm(&self, spec: &ProvisioningSpec) -> reqwest::Result<bool> {
        info!("Create VM {} ({}) on node {}", spec.vmid, spec.name, self.config.node());
        self.client
            .post(self.qemu_url())
            .form(spec)
            .send()
            .await?
            .error_for_status()?;

        Ok(true)
    }

    /// Stop-before-delete sequence. Refuses without side effects when the
    /// machine is in any state other than running or stopped, and aborts
    /// when a running machine does not reach stopped after the stop call.
    pub async fn delete_vm(&self, vmid: u32) -> reqwest::Result<bool> {
        match self.vm_status(vmid).await? {
            VmPowerState::Running => {
                self.stop_vm(vmid).await?;
                if self.vm_status(vmid).await? != VmPowerState::Stopped {
                    warn!("VM {} did not stop, delete aborted", vmid);
                    return Ok(false);
                }
                self.destroy(vmid).await?;
                Ok(true)
            }
            VmPowerState::Stopped => {
                self.destroy(vmid).await?;
                Ok(true)
            }
            state => {
                warn!("VM {} in state {:?}, delete refused", vmid, state);
                Ok(false)
            }
        }
    }

    async fn destroy(&self, vmid: u32) -> reqwest::Result<()> {
        info!("Destroy VM {} on node {}", vmid, self.config.node());
        self.client
            .delete(format!("{}/{}", self.qemu_url(), vmid))
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }
}
