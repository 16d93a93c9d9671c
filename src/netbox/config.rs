#[derive(Debug, Clone)]
pub struct NetboxConfig {
    url: String,
    token: String,
    ssl_verify: bool,
}

impl NetboxConfig {
    pub fn new(url: String, token: String, ssl_verify: bool) -> Self {
        Self { url, token, ssl_verify }
    }

    pub fn apiurl(&self) -> String {
        format!("{}/api/", self.url.trim_end_matches('/'))
    }

    pub fn token(&self) -> &str {
        self.token.as_ref()
    }

    pub fn ssl_verify(&self) -> bool {
        self.ssl_verify
    }
}
