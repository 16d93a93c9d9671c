pub mod config;
mod error;
mod handlers;
mod signal;
mod signature;
mod views;
pub mod web;
pub mod webhook;

use log::{info, warn};
use tokio::sync::broadcast;

use crate::netbox::NetboxApi;
use crate::proxmox::ProxmoxApi;
use crate::Config;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Shutdown,
}

pub fn run(config: Config) {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(async {
            let netbox = NetboxApi::new(&config.netbox);
            let proxmox = ProxmoxApi::new(&config.proxmox);

            let (message_tx, _message_rx) = broadcast::channel(16);
            let _signal_handle = signal::spawn(&message_tx);

            match netbox.version().await {
                Ok(version) => info!("Connected to Netbox {}", version),
                Err(e) => warn!("Netbox status check failed: {}", e),
            }

            web::server(&config.webhook, &netbox, &proxmox, &message_tx).await;
        })
}
