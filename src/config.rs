use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "SehaMaroc";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default per-request timeout for backend calls.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

const DEFAULT_PATIENT_URL: &str = "http://localhost:8081";
const DEFAULT_PROVIDER_URL: &str = "http://localhost:8082";
const DEFAULT_REQUESTS_URL: &str = "http://localhost:8080";
const DEFAULT_PROVIDERS_URL: &str = "http://localhost:8080";

/// Get the application data directory (`~/.sehamaroc`).
///
/// Falls back to the current directory when no home directory can be
/// determined (containers, CI).
pub fn app_data_dir() -> PathBuf {
    match dirs::home_dir() {
        Some(home) => home.join(".sehamaroc"),
        None => PathBuf::from(".sehamaroc"),
    }
}

/// Path of the persisted key/value storage file inside a data directory.
pub fn storage_file(data_dir: &std::path::Path) -> PathBuf {
    data_dir.join("storage.json")
}

/// Default tracing filter; `verbose` raises the crate to `debug`.
pub fn default_log_filter(verbose: bool) -> String {
    if verbose {
        "sehamaroc_lib=debug,sehamaroc=debug,warn".to_string()
    } else {
        "sehamaroc_lib=info,sehamaroc=info,warn".to_string()
    }
}

// ═══════════════════════════════════════════════════════════
// Service endpoints
// ═══════════════════════════════════════════════════════════

/// Base URLs of the four backend services the portal talks to.
///
/// One value per service replaces the per-page hardcoded hosts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEndpoints {
    /// Patient service: patient auth, profile, history, notifications, new requests.
    pub patient: String,
    /// Provider service: provider auth and profile.
    pub provider: String,
    /// Request service: request threads and certificates.
    pub requests: String,
    /// Provider gateway: patient management and medical records.
    pub providers: String,
}

impl ServiceEndpoints {
    /// Point every service at the same base URL (mock backend, gateway).
    pub fn single(base_url: &str) -> Self {
        let base = trim_base(base_url);
        Self {
            patient: base.clone(),
            provider: base.clone(),
            requests: base.clone(),
            providers: base,
        }
    }
}

impl Default for ServiceEndpoints {
    fn default() -> Self {
        Self {
            patient: DEFAULT_PATIENT_URL.to_string(),
            provider: DEFAULT_PROVIDER_URL.to_string(),
            requests: DEFAULT_REQUESTS_URL.to_string(),
            providers: DEFAULT_PROVIDERS_URL.to_string(),
        }
    }
}

fn trim_base(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

// ═══════════════════════════════════════════════════════════
// PortalConfig
// ═══════════════════════════════════════════════════════════

/// Errors from configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid URL for {field}: {value}")]
    InvalidUrl { field: &'static str, value: String },
    #[error("Invalid timeout: {0}")]
    InvalidTimeout(String),
}

/// Runtime configuration of the portal client.
#[derive(Debug, Clone)]
pub struct PortalConfig {
    pub endpoints: ServiceEndpoints,
    pub request_timeout_secs: u64,
    pub data_dir: PathBuf,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            endpoints: ServiceEndpoints::default(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            data_dir: app_data_dir(),
        }
    }
}

impl PortalConfig {
    /// Defaults overridden by `SEHAMAROC_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup (environment in production,
    /// a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(v) = lookup("SEHAMAROC_BASE_URL") {
            config.set_base_url(&v)?;
        }
        if let Some(v) = lookup("SEHAMAROC_PATIENT_URL") {
            config.endpoints.patient = validated_url("patient", &v)?;
        }
        if let Some(v) = lookup("SEHAMAROC_PROVIDER_URL") {
            config.endpoints.provider = validated_url("provider", &v)?;
        }
        if let Some(v) = lookup("SEHAMAROC_REQUESTS_URL") {
            config.endpoints.requests = validated_url("requests", &v)?;
        }
        if let Some(v) = lookup("SEHAMAROC_PROVIDERS_URL") {
            config.endpoints.providers = validated_url("providers", &v)?;
        }
        if let Some(v) = lookup("SEHAMAROC_TIMEOUT_SECS") {
            config.request_timeout_secs = v
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidTimeout(v))?;
        }
        if let Some(v) = lookup("SEHAMAROC_DATA_DIR") {
            config.data_dir = PathBuf::from(v);
        }

        Ok(config)
    }

    /// Point every service at one base URL. Per-service overrides applied
    /// afterwards still win.
    pub fn set_base_url(&mut self, value: &str) -> Result<(), ConfigError> {
        self.endpoints = ServiceEndpoints::single(&validated_url("base", value)?);
        Ok(())
    }

    /// Override one endpoint from a CLI flag.
    pub fn set_endpoint(&mut self, field: &'static str, value: &str) -> Result<(), ConfigError> {
        let url = validated_url(field, value)?;
        match field {
            "patient" => self.endpoints.patient = url,
            "provider" => self.endpoints.provider = url,
            "requests" => self.endpoints.requests = url,
            _ => self.endpoints.providers = url,
        }
        Ok(())
    }

    pub fn storage_file(&self) -> PathBuf {
        storage_file(&self.data_dir)
    }
}

fn validated_url(field: &'static str, value: &str) -> Result<String, ConfigError> {
    let trimmed = trim_base(value);
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(trimmed)
    } else {
        Err(ConfigError::InvalidUrl {
            field,
            value: value.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_service_ports() {
        let config = PortalConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.endpoints.patient, "http://localhost:8081");
        assert_eq!(config.endpoints.provider, "http://localhost:8082");
        assert_eq!(config.endpoints.requests, "http://localhost:8080");
        assert_eq!(config.endpoints.providers, "http://localhost:8080");
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn env_overrides_endpoints_and_trims_slash() {
        let config = PortalConfig::from_lookup(lookup_from(&[
            ("SEHAMAROC_PATIENT_URL", "https://patients.example.ma/"),
            ("SEHAMAROC_TIMEOUT_SECS", "5"),
            ("SEHAMAROC_DATA_DIR", "/tmp/seha"),
        ]))
        .unwrap();
        assert_eq!(config.endpoints.patient, "https://patients.example.ma");
        assert_eq!(config.request_timeout_secs, 5);
        assert_eq!(config.storage_file(), PathBuf::from("/tmp/seha/storage.json"));
    }

    #[test]
    fn rejects_non_http_url() {
        let err = PortalConfig::from_lookup(lookup_from(&[("SEHAMAROC_PROVIDER_URL", "localhost:8082")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { field: "provider", .. }));
    }

    #[test]
    fn rejects_zero_timeout() {
        let err = PortalConfig::from_lookup(lookup_from(&[("SEHAMAROC_TIMEOUT_SECS", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTimeout(_)));
    }

    #[test]
    fn single_endpoint_points_everything_at_one_host() {
        let endpoints = ServiceEndpoints::single("http://127.0.0.1:9000/");
        assert_eq!(endpoints.patient, "http://127.0.0.1:9000");
        assert_eq!(endpoints.providers, "http://127.0.0.1:9000");
    }

    #[test]
    fn base_url_then_service_override() {
        let config = PortalConfig::from_lookup(lookup_from(&[
            ("SEHAMAROC_BASE_URL", "http://127.0.0.1:8080/"),
            ("SEHAMAROC_PROVIDERS_URL", "http://127.0.0.1:9090"),
        ]))
        .unwrap();
        assert_eq!(config.endpoints.patient, "http://127.0.0.1:8080");
        assert_eq!(config.endpoints.provider, "http://127.0.0.1:8080");
        assert_eq!(config.endpoints.providers, "http://127.0.0.1:9090");

        let mut config = PortalConfig::default();
        let err = config.set_base_url("127.0.0.1:8080").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { field: "base", .. }));
    }

    #[test]
    fn app_data_dir_is_hidden_folder() {
        assert!(app_data_dir().ends_with(".sehamaroc"));
    }

    #[test]
    fn verbose_filter_enables_debug() {
        assert!(default_log_filter(true).contains("sehamaroc_lib=debug"));
        assert!(default_log_filter(false).contains("sehamaroc_lib=info"));
    }
}
