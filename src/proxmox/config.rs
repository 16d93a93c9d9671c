#[derive(Debug, Clone)]
pub struct ProxmoxConfig {
    host: String,
    user: String,
    token_name: String,
    token: String,
    node: String,
    ssl_verify: bool,
}

impl ProxmoxConfig {
    pub fn new(
        host: String,
        user: String,
        token_name: String,
        token: String,
        node: String,
        ssl_verify: bool,
    ) -> Self {
        Self { host, user, token_name, token, node, ssl_verify }
    }

    pub fn host(&self) -> &str {
        self.host.as_ref()
    }

    pub fn node(&self) -> &str {
        self.node.as_ref()
    }

    pub fn ssl_verify(&self) -> bool {
        self.ssl_verify
    }

    pub fn apiurl(&self) -> String {
        if self.host.contains("://") {
            format!("{}/api2/json", self.host.trim_end_matches('/'))
        } else {
            format!("https://{}:8006/api2/json", self.host)
        }
    }

    pub fn authorization(&self) -> String {
        format!("PVEAPIToken={}!{}={}", self.user, self.token_name, self.token)
    }
}
