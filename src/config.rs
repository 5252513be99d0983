use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::Path;

pub const API_KEY_ENV: &str = "NOTION_API_KEY";
pub const BASE_URL_ENV: &str = "NOTION_BASE_URL";

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: Server,
    pub notion: Notion,
    pub http: Http,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    #[default]
    Stdio,
    Http,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Server {
    pub name: String,
    pub version: String,
    pub transport: Transport,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            name: "notion-mcp-server".to_string(),
            version: "0.1.0".to_string(),
            transport: Transport::Stdio,
        }
    }
}

#[derive(Deserialize, Clone)]
#[serde(default)]
pub struct Notion {
    #[serde(skip)]
    pub api_key: String,
    pub base_url: String,
    pub api_version: String,
    pub timeout_s: u64,
}

impl Default for Notion {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.notion.com/v1".to_string(),
            api_version: "2022-06-28".to_string(),
            timeout_s: 30,
        }
    }
}

impl fmt::Debug for Notion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notion")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("api_version", &self.api_version)
            .field("timeout_s", &self.timeout_s)
            .finish()
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Http {
    pub bind_addr: String,
    pub port: u16,
    pub base_path: String,
    pub bearer_token: String,
    pub allowed_origins: Vec<String>,
    pub max_request_kb: usize,
}

impl Default for Http {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1".to_string(),
            port: 8787,
            base_path: "/mcp".to_string(),
            bearer_token: String::new(),
            allowed_origins: Vec::new(),
            max_request_kb: 256,
        }
    }
}

impl Config {
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else { return Ok(Self::default()) };
        let raw = fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }

    /// Pull secrets and overrides from the environment.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(API_KEY_ENV) {
            self.notion.api_key = key;
        }
        if let Some(url) = lookup(BASE_URL_ENV).filter(|u| !u.trim().is_empty()) {
            self.notion.base_url = url;
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.notion.api_key.trim().is_empty() {
            anyhow::bail!("{API_KEY_ENV} environment variable is required");
        }
        if self.notion.timeout_s == 0 { anyhow::bail!("notion.timeout_s must be > 0"); }
        reqwest::Url::parse(&self.notion.base_url)
            .map_err(|e| anyhow::anyhow!("notion.base_url is not a valid url: {e}"))?;
        if self.server.transport == Transport::Http {
            if self.http.bearer_token.trim().is_empty() { anyhow::bail!("http.bearer_token must not be empty"); }
            if self.http.max_request_kb == 0 { anyhow::bail!("http.max_request_kb must be > 0"); }
            if !self.http.base_path.starts_with('/') {
                anyhow::bail!("http.base_path must start with '/': {}", self.http.base_path);
            }
        }
        Ok(())
    }

    pub fn http_addr(&self) -> String {
        format!("{}:{}", self.http.bind_addr, self.http.port)
    }
}
