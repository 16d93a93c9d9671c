pub mod config;
pub mod model;

use log::{debug, info};
use serde::Deserialize;

use self::config::NetboxConfig;
use self::model::{Pageination, Tag, VirtualMachine};

#[derive(Debug, Clone)]
pub struct NetboxApi {
    config: NetboxConfig,
    client: reqwest::Client,
}

impl NetboxApi {
    pub fn new(config: &NetboxConfig) -> Self {
        let config = config.clone();

        let mut headers = reqwest::header::HeaderMap::new();
        let mut auth_value =
            reqwest::header::HeaderValue::from_str(format!("Token {}", config.token()).as_str())
                .unwrap();
        auth_value.set_sensitive(true);
        headers.insert(reqwest::header::AUTHORIZATION, auth_value);

        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(!config.ssl_verify())
            .default_headers(headers)
            .build()
            .unwrap();

        Self { config, client }
    }

    pub async fn version(&self) -> reqwest::Result<String> {
        let url = format!("{}status/", self.config.apiurl());

        #[derive(Debug, Deserialize)]
        struct NetboxStatus {
            #[serde(rename = "netbox-version")]
            netbox_version: String,
        }

        let status: NetboxStatus = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(status.netbox_version)
    }

    pub async fn get_vm(&self, id: u64) -> reqwest::Result<VirtualMachine> {
        let url = format!("{}virtualization/virtual-machines/{}/", self.config.apiurl(), id);

        debug!("Fetch VM {} from {:?}", id, url);
        self.client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }

    pub async fn update_vm_tags(&self, id: u64, tag_ids: &[u64]) -> reqwest::Result<VirtualMachine> {
        let url = format!("{}virtualization/virtual-machines/{}/", self.config.apiurl(), id);

        debug!("Update VM {} tags to {:?}", id, tag_ids);
        self.client
            .patch(url)
            .json(&serde_json::json!({ "tags": tag_ids }))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }

    pub async fn get_tag(&self, name: &str) -> reqwest::Result<Option<Tag>> {
        let url = format!("{}extras/tags/", self.config.apiurl());

        let page: Pageination<Tag> = self
            .client
            .get(url)
            .query(&[("name", name)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(page.results.into_iter().next())
    }

    pub async fn create_tag(&self, name: &str, color: &str) -> reqwest::Result<Tag> {
        let url = format!("{}extras/tags/", self.config.apiurl());

        self.client
            .post(url)
            .json(&serde_json::json!({
                "name": name,
                "slug": name.to_lowercase(),
                "color": color.to_lowercase(),
            }))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }

    /// Tag lookup-or-create; returns the existing tag untouched when the
    /// name is already known.
    pub async fn ensure_tag(&self, name: &str, color: &str) -> reqwest::Result<Tag> {
        match self.get_tag(name).await? {
            Some(tag) => Ok(tag),
            None => {
                info!("Tag {} does not exist, creating it", name);
                self.create_tag(name, color).await
            }
        }
    }
}
