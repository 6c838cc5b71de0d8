use crate::humanize::HumanDuration;
use crate::options::OptionBag;
use crate::transport::{DEFAULT_CALLBACK_PREFIX, HttpConfig, TransportKind};
use serde::{Deserialize, Serialize};

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub http: HttpSettings,
    #[serde(default)]
    pub transport: TransportSettings,
    /// Option defaults laid under every request's options
    #[serde(default)]
    pub defaults: OptionBag,
}

/// HTTP client settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpSettings {
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: HumanDuration,
    #[serde(default = "default_request_timeout")]
    pub request_timeout: HumanDuration,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            connect_timeout: default_connect_timeout(),
            request_timeout: default_request_timeout(),
            user_agent: default_user_agent(),
            proxy: None,
        }
    }
}

impl HttpSettings {
    pub fn to_http_config(&self) -> HttpConfig {
        HttpConfig {
            connect_timeout: self.connect_timeout.as_duration(),
            request_timeout: self.request_timeout.as_duration(),
            user_agent: self.user_agent.clone(),
            proxy: self.proxy.clone(),
        }
    }
}

fn default_connect_timeout() -> HumanDuration {
    HumanDuration::from_secs(10)
}

fn default_request_timeout() -> HumanDuration {
    HumanDuration::from_secs(60)
}

fn default_user_agent() -> String {
    concat!("sheetpull/", env!("CARGO_PKG_VERSION")).to_string()
}

/// Transport selection
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TransportSettings {
    #[serde(default)]
    pub kind: TransportKind,
    /// Prefix of generated callback names (callback transport only)
    #[serde(default = "default_callback_prefix")]
    pub callback_prefix: String,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            kind: TransportKind::default(),
            callback_prefix: default_callback_prefix(),
        }
    }
}

fn default_callback_prefix() -> String {
    DEFAULT_CALLBACK_PREFIX.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.http.connect_timeout.as_duration(), Duration::from_secs(10));
        assert_eq!(config.http.request_timeout.as_duration(), Duration::from_secs(60));
        assert!(config.http.user_agent.starts_with("sheetpull/"));
        assert_eq!(config.transport.kind, TransportKind::Direct);
        assert_eq!(config.transport.callback_prefix, "_sheetpull_callback_");
        assert_eq!(config.defaults, OptionBag::default());
    }

    #[test]
    fn test_parse_toml() {
        let config: Config = toml::from_str(
            r#"
[http]
request_timeout = "2m"
proxy = "socks5://127.0.0.1:1080"

[transport]
kind = "callback"

[defaults]
sql = "select A, B"
chunk_size = "20"
        "#,
        )
        .unwrap();

        assert_eq!(config.http.request_timeout.as_duration(), Duration::from_secs(120));
        assert_eq!(config.http.connect_timeout.as_duration(), Duration::from_secs(10));
        assert_eq!(config.transport.kind, TransportKind::Callback);
        assert_eq!(config.defaults.query.as_deref(), Some("select A, B"));
        assert_eq!(config.defaults.chunk_size, Some(20));

        let http = config.http.to_http_config();
        assert_eq!(http.proxy.as_deref(), Some("socks5://127.0.0.1:1080"));
    }
}
