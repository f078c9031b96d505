// Configuration for CmClient

/// Configuration for the CipherTrust Manager HTTP client
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Appliance address, e.g. `https://cm.example.com`. A missing scheme means https.
    pub address: String,
    /// Username for the password grant
    pub username: String,
    /// Password for the password grant
    pub password: String,
    /// Domain the session is scoped to (empty = root)
    pub domain: String,
    /// Domain the user authenticates against (empty = root)
    pub auth_domain: String,
    /// Accept self-signed appliance certificates
    pub insecure_skip_verify: bool,
    /// Connection timeout in milliseconds
    pub connect_timeout_ms: u64,
    /// Read timeout in milliseconds
    pub read_timeout_ms: u64,
    /// Retries for transport errors, 429 and 5xx responses
    pub max_retries: u32,
    /// Linear backoff step between retries in milliseconds
    pub retry_backoff_ms: u64,
    /// Requested refresh token lifetime in seconds (0 = appliance default)
    pub refresh_token_lifetime: i64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            address: "https://127.0.0.1".to_string(),
            username: String::new(),
            password: String::new(),
            domain: String::new(),
            auth_domain: String::new(),
            insecure_skip_verify: false,
            connect_timeout_ms: 10_000,
            read_timeout_ms: 60_000,
            max_retries: 3,
            retry_backoff_ms: 500,
            refresh_token_lifetime: 0,
        }
    }
}

impl ClientConfig {
    /// Create a new config for a single appliance address
    pub fn new(address: &str) -> Self {
        Self {
            address: address.to_string(),
            ..Default::default()
        }
    }

    /// Set authentication credentials
    pub fn with_auth(mut self, username: &str, password: &str) -> Self {
        self.username = username.to_string();
        self.password = password.to_string();
        self
    }

    /// Set the session domain and the authentication domain
    pub fn with_domains(mut self, domain: &str, auth_domain: &str) -> Self {
        self.domain = domain.to_string();
        self.auth_domain = auth_domain.to_string();
        self
    }

    /// Set timeouts
    pub fn with_timeouts(mut self, connect_ms: u64, read_ms: u64) -> Self {
        self.connect_timeout_ms = connect_ms;
        self.read_timeout_ms = read_ms;
        self
    }

    /// Set the retry policy
    pub fn with_retries(mut self, max_retries: u32, backoff_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.retry_backoff_ms = backoff_ms;
        self
    }

    /// Lifetime requested for refresh tokens, in seconds; 0 keeps the appliance default
    pub fn with_refresh_token_lifetime(mut self, seconds: i64) -> Self {
        self.refresh_token_lifetime = seconds.max(0);
        self
    }

    /// Skip TLS certificate verification
    pub fn with_insecure_skip_verify(mut self, skip: bool) -> Self {
        self.insecure_skip_verify = skip;
        self
    }

    /// Base URL of the REST API, without a trailing slash
    pub fn base_url(&self) -> String {
        let address = self.address.trim().trim_end_matches('/');
        if address.starts_with("http://") || address.starts_with("https://") {
            format!("{}/api", address)
        } else {
            format!("https://{}/api", address)
        }
    }

    /// Address of another cluster node, keeping this address's scheme and
    /// its port when `host` names none
    pub fn node_address(&self, host: &str) -> String {
        let host = host.trim().trim_end_matches('/');
        let base = self.base_url();
        let scheme = if base.starts_with("http://") { "http" } else { "https" };
        let has_port = host
            .rsplit_once(':')
            .is_some_and(|(_, port)| !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()));
        match reqwest::Url::parse(&base).ok().and_then(|url| url.port()) {
            Some(port) if !has_port => format!("{scheme}://{host}:{port}"),
            _ => format!("{scheme}://{host}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.connect_timeout_ms, 10_000);
        assert_eq!(config.max_retries, 3);
        assert!(!config.insecure_skip_verify);
    }

    #[test]
    fn test_config_builder() {
        let config = ClientConfig::new("https://cm.local")
            .with_auth("admin", "secret")
            .with_domains("engineering", "root")
            .with_timeouts(1000, 2000)
            .with_retries(5, 10)
            .with_refresh_token_lifetime(3600);

        assert_eq!(config.username, "admin");
        assert_eq!(config.password, "secret");
        assert_eq!(config.domain, "engineering");
        assert_eq!(config.auth_domain, "root");
        assert_eq!(config.read_timeout_ms, 2000);
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.retry_backoff_ms, 10);
        assert_eq!(config.refresh_token_lifetime, 3600);
    }

    #[test]
    fn test_node_address_carries_scheme_and_port() {
        let config = ClientConfig::new("http://127.0.0.1:9000");
        assert_eq!(config.node_address("10.0.0.2"), "http://10.0.0.2:9000");
        assert_eq!(config.node_address("10.0.0.2:8443"), "http://10.0.0.2:8443");
        assert_eq!(config.node_address("[fd00::2]"), "http://[fd00::2]:9000");

        let config = ClientConfig::new("cm.example.com");
        assert_eq!(config.node_address("10.0.0.2"), "https://10.0.0.2");
    }

    #[test]
    fn test_base_url() {
        assert_eq!(
            ClientConfig::new("https://cm.local/").base_url(),
            "https://cm.local/api"
        );
        assert_eq!(
            ClientConfig::new("10.0.0.5").base_url(),
            "https://10.0.0.5/api"
        );
        assert_eq!(
            ClientConfig::new("http://127.0.0.1:8080").base_url(),
            "http://127.0.0.1:8080/api"
        );
    }
}
