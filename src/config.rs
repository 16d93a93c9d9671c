use std::collections::HashMap;
use std::env;
use std::error::Error;
use std::fmt::{self, Display};
use std::net::SocketAddr;

use crate::logging::LogConfig;
use crate::netbox::config::NetboxConfig;
use crate::proxmox::config::ProxmoxConfig;
use crate::server::config::WebhookConfig;

#[derive(Debug, Clone)]
pub struct Config {
    pub netbox: NetboxConfig,
    pub proxmox: ProxmoxConfig,
    pub webhook: WebhookConfig,
    pub log: LogConfig,
}

#[derive(Debug)]
pub enum ConfigError {
    MissingEnv(Vec<&'static str>),
    InvalidValue { key: &'static str, value: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingEnv(keys) => {
                write!(f, "missing environment variables: {}", keys.join(", "))
            }
            ConfigError::InvalidValue { key, value } => {
                write!(f, "invalid value for {}: {}", key, value)
            }
        }
    }
}

impl Error for ConfigError {}

struct EnvReader<'a> {
    vars: &'a HashMap<String, String>,
    missing: Vec<&'static str>,
}

impl<'a> EnvReader<'a> {
    fn new(vars: &'a HashMap<String, String>) -> Self {
        Self { vars, missing: Vec::new() }
    }

    fn required(&mut self, key: &'static str) -> String {
        match self.vars.get(key) {
            Some(value) if !value.is_empty() => value.clone(),
            _ => {
                self.missing.push(key);
                String::new()
            }
        }
    }

    fn optional(&self, key: &str) -> Option<String> {
        self.vars.get(key).filter(|v| !v.is_empty()).cloned()
    }
}

impl Config {
    pub fn load_from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(&env::vars().collect())
    }

    fn from_lookup(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let mut env = EnvReader::new(vars);

        let netbox_url = env.required("NETBOX_URL");
        let netbox_token = env.required("NETBOX_TOKEN");
        let webhook_secret = env.required("NETBOX_WEBHOOK_SECRET");
        let netbox_ssl_verify = env.optional("NETBOX_SSL_VERIFY").map_or(true, |v| parse_bool(&v));

        let proxmox_host = env.required("PROXMOX_HOST");
        let proxmox_user = env.required("PROXMOX_USER");
        let proxmox_token_name = env.required("PROXMOX_TOKEN_NAME");
        let proxmox_token = env.required("PROXMOX_TOKEN");
        let proxmox_ssl_verify = env.optional("PROXMOX_SSL_VERIFY").map_or(true, |v| parse_bool(&v));
        let proxmox_node = env
            .optional("PROXMOX_NODE")
            .unwrap_or_else(|| String::from("proxmox"));

        let listen = env
            .optional("WEBHOOK_LISTEN")
            .unwrap_or_else(|| String::from("0.0.0.0:8000"));
        let log_level = env.optional("LOG_LEVEL");
        let log_file = env.optional("LOG_FILE");

        if !env.missing.is_empty() {
            return Err(ConfigError::MissingEnv(env.missing));
        }

        let listen: SocketAddr = listen.parse().map_err(|_| ConfigError::InvalidValue {
            key: "WEBHOOK_LISTEN",
            value: listen.clone(),
        })?;

        Ok(Config {
            netbox: NetboxConfig::new(netbox_url, netbox_token, netbox_ssl_verify),
            proxmox: ProxmoxConfig::new(
                proxmox_host,
                proxmox_user,
                proxmox_token_name,
                proxmox_token,
                proxmox_node,
                proxmox_ssl_verify,
            ),
            webhook: WebhookConfig { listen, secret: webhook_secret },
            log: LogConfig::new(log_level.as_deref(), log_file),
        })
    }
}

pub(crate) fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
