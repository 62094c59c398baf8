use crate::error::{Error, Result};
use std::fmt;
use std::time::Duration;

/// Volumes root used when none is configured.
pub const DEFAULT_VOLUMES_PATH: &str = "/ifs/volumes";

pub const ENV_ENDPOINT: &str = "ISILON_ENDPOINT";
pub const ENV_USERNAME: &str = "ISILON_USERNAME";
pub const ENV_PASSWORD: &str = "ISILON_PASSWORD";
pub const ENV_GROUP: &str = "ISILON_GROUP";
pub const ENV_VOLUMES_PATH: &str = "ISILON_VOLUMESPATH";
pub const ENV_INSECURE: &str = "ISILON_INSECURE";
pub const ENV_TIMEOUT: &str = "ISILON_TIMEOUT";
pub const ENV_DEBUG: &str = "ISILON_DEBUG";

/// Transport and path options for the API client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientOptions {
    /// Skip TLS certificate verification. Appliances commonly ship self-signed certs.
    pub insecure: bool,
    /// Directory on the appliance holding volumes. Defaults to `/ifs/volumes`.
    pub volumes_path: Option<String>,
    /// Overall per-request timeout.
    pub timeout: Option<Duration>,
    /// Include request and response bodies in debug dumps.
    pub debug: bool,
}

/// Everything needed to connect to an appliance.
#[derive(Clone)]
pub struct ClientConfig {
    pub endpoint: String,
    pub username: String,
    pub password: String,
    pub group: Option<String>,
    pub options: ClientOptions,
}

impl ClientConfig {
    pub fn new(
        endpoint: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            username: username.into(),
            password: password.into(),
            group: None,
            options: ClientOptions::default(),
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn with_volumes_path(mut self, path: impl Into<String>) -> Self {
        self.options.volumes_path = Some(path.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = Some(timeout);
        self
    }

    pub fn insecure(mut self, insecure: bool) -> Self {
        self.options.insecure = insecure;
        self
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.options.debug = debug;
        self
    }

    /// Read the configuration from `ISILON_*` environment variables.
    ///
    /// Missing credentials are not an error here; they are rejected when the
    /// client is built.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let insecure = get(ENV_INSECURE)
            .map(|v| parse_bool(ENV_INSECURE, &v))
            .transpose()?
            .unwrap_or(false);
        let debug = get(ENV_DEBUG)
            .map(|v| parse_bool(ENV_DEBUG, &v))
            .transpose()?
            .unwrap_or(false);
        let timeout = get(ENV_TIMEOUT)
            .map(|v| parse_duration(&v))
            .transpose()?;

        Ok(Self {
            endpoint: get(ENV_ENDPOINT).unwrap_or_default(),
            username: get(ENV_USERNAME).unwrap_or_default(),
            password: get(ENV_PASSWORD).unwrap_or_default(),
            group: get(ENV_GROUP),
            options: ClientOptions {
                insecure,
                volumes_path: get(ENV_VOLUMES_PATH),
                timeout,
                debug,
            },
        })
    }

    /// Reject configurations that cannot reach an appliance.
    pub fn validate(&self) -> Result<()> {
        if self.endpoint.is_empty() || self.username.is_empty() || self.password.is_empty() {
            return Err(Error::Configuration(
                "missing endpoint, username, or password".to_string(),
            ));
        }
        Ok(())
    }

    /// Configured volumes root, or the default.
    pub fn volumes_path(&self) -> &str {
        self.options
            .volumes_path
            .as_deref()
            .filter(|p| !p.is_empty())
            .unwrap_or(DEFAULT_VOLUMES_PATH)
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("endpoint", &self.endpoint)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("group", &self.group)
            .field("options", &self.options)
            .finish()
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "t" | "true" | "yes" | "on" => Ok(true),
        "0" | "f" | "false" | "no" | "off" => Ok(false),
        other => Err(Error::Configuration(format!(
            "{key}: invalid boolean {other:?}"
        ))),
    }
}

/// Parse `30s`, `1m30s`, `1h`, `250ms`, or bare seconds (`45`).
pub fn parse_duration(value: &str) -> Result<Duration> {
    let value = value.trim();
    let invalid = || Error::Configuration(format!("{ENV_TIMEOUT}: invalid duration {value:?}"));

    if let Ok(secs) = value.parse::<u64>() {
        return Ok(Duration::from_secs(secs));
    }

    let mut total = Duration::ZERO;
    let mut rest = value;
    while !rest.is_empty() {
        let digits = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .ok_or_else(invalid)?;
        if digits == 0 {
            return Err(invalid());
        }
        let amount: f64 = rest[..digits].parse().map_err(|_| invalid())?;
        rest = &rest[digits..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let secs = match &rest[..unit_len] {
            "h" => amount * 3600.0,
            "m" => amount * 60.0,
            "s" => amount,
            "ms" => amount / 1e3,
            "us" | "µs" => amount / 1e6,
            "ns" => amount / 1e9,
            _ => return Err(invalid()),
        };
        let step = Duration::try_from_secs_f64(secs).map_err(|_| invalid())?;
        total = total.checked_add(step).ok_or_else(invalid)?;
        rest = &rest[unit_len..];
    }

    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_from_lookup_full() {
        let config = ClientConfig::from_lookup(lookup(&[
            (ENV_ENDPOINT, "https://10.0.0.1:8080"),
            (ENV_USERNAME, "admin"),
            (ENV_PASSWORD, "secret"),
            (ENV_GROUP, "wheel"),
            (ENV_VOLUMES_PATH, "/ifs/data/vols"),
            (ENV_INSECURE, "true"),
            (ENV_TIMEOUT, "1m30s"),
            (ENV_DEBUG, "1"),
        ]))
        .unwrap();

        assert_eq!(config.endpoint, "https://10.0.0.1:8080");
        assert_eq!(config.group.as_deref(), Some("wheel"));
        assert_eq!(config.volumes_path(), "/ifs/data/vols");
        assert!(config.options.insecure);
        assert!(config.options.debug);
        assert_eq!(config.options.timeout, Some(Duration::from_secs(90)));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_lookup_defaults() {
        let config = ClientConfig::from_lookup(lookup(&[(ENV_GROUP, "")])).unwrap();
        assert_eq!(config.group, None);
        assert_eq!(config.volumes_path(), DEFAULT_VOLUMES_PATH);
        assert!(!config.options.insecure);
        assert_eq!(config.options.timeout, None);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_bool() {
        let err = ClientConfig::from_lookup(lookup(&[(ENV_INSECURE, "maybe")])).unwrap_err();
        assert!(err.to_string().contains(ENV_INSECURE));
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("45").unwrap(), Duration::from_secs(45));
        assert_eq!(parse_duration("30s").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
        assert_eq!(parse_duration("1h").unwrap(), Duration::from_secs(3600));
        assert_eq!(parse_duration("1.5s").unwrap(), Duration::from_millis(1500));
        assert!(parse_duration("10x").is_err());
        assert!(parse_duration("s").is_err());
        assert!(parse_duration("12abc3").is_err());
    }

    #[test]
    fn test_parse_duration_out_of_range() {
        assert!(parse_duration("99999999999999999999999h").is_err());
        assert!(parse_duration("18446744073709551615s1s").is_err());

        let err = ClientConfig::from_lookup(lookup(&[(ENV_TIMEOUT, "99999999999999999999999h")]))
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = ClientConfig::new("https://h", "admin", "hunter2");
        let dump = format!("{config:?}");
        assert!(!dump.contains("hunter2"));
        assert!(dump.contains("<redacted>"));
    }

    #[test]
    fn test_builder() {
        let config = ClientConfig::new("https://h", "u", "p")
            .with_group("g")
            .with_volumes_path("/ifs/k8s")
            .with_timeout(Duration::from_secs(5))
            .insecure(true)
            .debug(true);
        assert_eq!(config.volumes_path(), "/ifs/k8s");
        assert_eq!(config.options.timeout, Some(Duration::from_secs(5)));
        assert!(config.options.insecure && config.options.debug);
    }
}
