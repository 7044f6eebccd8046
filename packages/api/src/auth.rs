// ABOUTME: Credentials for outbound metric requests, resolved per host from environment variables
// ABOUTME: {HOSTKEY}_USERNAME/_PASSWORD, _API_KEY, _BEARER_TOKEN or _CLIENT_ID; results cached per host

use std::collections::HashMap;
use std::env;
use std::sync::{Arc, Mutex};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use diagram_config::constants::{
    API_HEADER_SUFFIX, API_KEY_SUFFIX, BEARER_TOKEN_SUFFIX, CLIENT_HEADER_SUFFIX,
    CLIENT_ID_SUFFIX, PASSWORD_SUFFIX, USERNAME_SUFFIX,
};
use reqwest::RequestBuilder;
use tracing::debug;
use url::Url;

const DEFAULT_API_HEADER: &str = "X-API-Key";
const DEFAULT_CLIENT_HEADER: &str = "X-Client-ID";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    Basic { username: String, password: String },
    ApiKey { header: String, key: String },
    Bearer(String),
    ClientId { header: String, value: String },
}

impl Credentials {
    /// Header name and value carrying these credentials
    pub fn header(&self) -> (String, String) {
        match self {
            Credentials::Basic { username, password } => (
                "Authorization".to_string(),
                format!("Basic {}", STANDARD.encode(format!("{}:{}", username, password))),
            ),
            Credentials::ApiKey { header, key } => (header.clone(), key.clone()),
            Credentials::Bearer(token) => ("Authorization".to_string(), format!("Bearer {}", token)),
            Credentials::ClientId { header, value } => (header.clone(), value.clone()),
        }
    }
}

type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

pub struct AuthResolver {
    lookup: EnvLookup,
    cache: Mutex<HashMap<String, Option<Credentials>>>,
}

impl AuthResolver {
    pub fn new<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            lookup: Arc::new(lookup),
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_env() -> Self {
        Self::new(|name| env::var(name).ok())
    }

    fn var(&self, name: String) -> Option<String> {
        (self.lookup)(&name).filter(|v| !v.trim().is_empty())
    }

    fn try_prefix(&self, prefix: &str) -> Option<Credentials> {
        let username = self.var(format!("{}{}", prefix, USERNAME_SUFFIX));
        let password = self.var(format!("{}{}", prefix, PASSWORD_SUFFIX));
        if let (Some(username), Some(password)) = (username, password) {
            debug!("Found basic auth for prefix: {}", prefix);
            return Some(Credentials::Basic { username, password });
        }

        if let Some(key) = self.var(format!("{}{}", prefix, API_KEY_SUFFIX)) {
            debug!("Found API key for prefix: {}", prefix);
            let header = self
                .var(format!("{}{}", prefix, API_HEADER_SUFFIX))
                .unwrap_or_else(|| DEFAULT_API_HEADER.to_string());
            return Some(Credentials::ApiKey { header, key });
        }

        if let Some(token) = self.var(format!("{}{}", prefix, BEARER_TOKEN_SUFFIX)) {
            debug!("Found bearer token for prefix: {}", prefix);
            return Some(Credentials::Bearer(token));
        }

        if let Some(value) = self.var(format!("{}{}", prefix, CLIENT_ID_SUFFIX)) {
            debug!("Found client ID for prefix: {}", prefix);
            let header = self
                .var(format!("{}{}", prefix, CLIENT_HEADER_SUFFIX))
                .unwrap_or_else(|| DEFAULT_CLIENT_HEADER.to_string());
            return Some(Credentials::ClientId { header, value });
        }

        None
    }

    /// Credentials for `host`: full host key, then first label, then a known service prefix
    pub fn resolve_host(&self, host: &str) -> Option<Credentials> {
        if let Some(cached) = self.cache.lock().ok().and_then(|c| c.get(host).cloned()) {
            return cached;
        }

        let resolved = self
            .try_prefix(&host_key(host))
            .or_else(|| {
                host.split('.')
                    .next()
                    .and_then(|label| self.try_prefix(&label.to_uppercase().replace('-', "_")))
            })
            .or_else(|| {
                service_prefixes(host)
                    .iter()
                    .find_map(|prefix| self.try_prefix(prefix))
            });

        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(host.to_string(), resolved.clone());
        }
        resolved
    }

    /// Attach credentials for the request's host, if any are configured
    pub fn apply(&self, request: RequestBuilder, url: &Url) -> RequestBuilder {
        let Some(host) = url.host_str() else {
            return request;
        };
        match self.resolve_host(host) {
            Some(credentials) => {
                let (name, value) = credentials.header();
                debug!("Adding {} credentials for host: {}", name, host);
                request.header(name, value)
            }
            None => request,
        }
    }
}

fn host_key(host: &str) -> String {
    host.to_uppercase().replace(['.', '-'], "_")
}

fn service_prefixes(host: &str) -> &'static [&'static str] {
    if host.contains("rabbitmq") {
        &["RABBITMQ", "RABBIT"]
    } else if host.contains("monitoring") {
        &["MONITORING", "MONITOR"]
    } else if host.contains("metrics") {
        &["METRICS", "METRIC"]
    } else if host.contains("api") {
        &["API"]
    } else if host.contains("prometheus") {
        &["PROMETHEUS", "PROM"]
    } else if host.contains("grafana") {
        &["GRAFANA"]
    } else {
        &[]
    }
}
