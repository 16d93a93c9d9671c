use std::net::SocketAddr;

#[derive(Debug, Clone)]
pub struct WebhookConfig {
    pub listen: SocketAddr,
    pub secret: String,
}
