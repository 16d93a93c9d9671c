pub mod cli;
pub mod config;
pub use config::Config;
pub mod logging;
pub mod netbox;
pub mod proxmox;
pub mod server;
