use super::models::Config;
use crate::locator::{GvizLocator, SheetLocator};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Timeout must be positive: {field}")]
    ZeroTimeout { field: String },

    #[error("User agent must not be empty")]
    EmptyUserAgent,

    #[error("Invalid proxy scheme in '{proxy}', expected http://, https:// or socks5://")]
    InvalidProxyScheme { proxy: String },

    #[error("Invalid callback prefix '{prefix}': use letters, digits, '_' or '$', not starting with a digit")]
    InvalidCallbackPrefix { prefix: String },

    #[error("Default URL '{url}' is not a recognized sheet URL")]
    UnrecognizedDefaultUrl { url: String },
}

const PROXY_SCHEMES: &[&str] = &["http://", "https://", "socks5://", "socks5h://"];

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_http(config)?;
    validate_transport(config)?;
    validate_defaults(config)?;
    Ok(())
}

fn validate_http(config: &Config) -> Result<(), ValidationError> {
    let http = &config.http;

    for (field, timeout) in [
        ("connect_timeout", http.connect_timeout),
        ("request_timeout", http.request_timeout),
    ] {
        if timeout.is_zero() {
            return Err(ValidationError::ZeroTimeout {
                field: field.to_string(),
            });
        }
    }

    if http.user_agent.trim().is_empty() {
        return Err(ValidationError::EmptyUserAgent);
    }

    if let Some(proxy) = &http.proxy {
        let lower = proxy.to_ascii_lowercase();
        if !PROXY_SCHEMES.iter().any(|scheme| lower.starts_with(scheme)) {
            return Err(ValidationError::InvalidProxyScheme {
                proxy: proxy.clone(),
            });
        }
    }

    Ok(())
}

/// Callback names end up as script identifiers.
fn validate_transport(config: &Config) -> Result<(), ValidationError> {
    let prefix = &config.transport.callback_prefix;
    let valid = prefix
        .chars()
        .next()
        .is_some_and(|first| !first.is_ascii_digit())
        && prefix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');

    if !valid {
        return Err(ValidationError::InvalidCallbackPrefix {
            prefix: prefix.clone(),
        });
    }

    Ok(())
}

fn validate_defaults(config: &Config) -> Result<(), ValidationError> {
    if let Some(url) = &config.defaults.url {
        if GvizLocator.locate(url).is_none() {
            return Err(ValidationError::UnrecognizedDefaultUrl { url: url.clone() });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::humanize::HumanDuration;

    #[test]
    fn test_valid_config() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_zero_timeout() {
        let mut config = Config::default();
        config.http.request_timeout = HumanDuration::from_secs(0);

        let result = validate(&config);
        assert!(matches!(result, Err(ValidationError::ZeroTimeout { field }) if field == "request_timeout"));
    }

    #[test]
    fn test_empty_user_agent() {
        let mut config = Config::default();
        config.http.user_agent = "  ".to_string();

        assert!(matches!(validate(&config), Err(ValidationError::EmptyUserAgent)));
    }

    #[test]
    fn test_proxy_scheme() {
        let mut config = Config::default();
        config.http.proxy = Some("ftp://proxy:21".to_string());
        assert!(matches!(
            validate(&config),
            Err(ValidationError::InvalidProxyScheme { .. })
        ));

        config.http.proxy = Some("socks5://proxy:1080".to_string());
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_callback_prefix() {
        let mut config = Config::default();
        config.transport.callback_prefix = "9lives".to_string();
        assert!(matches!(
            validate(&config),
            Err(ValidationError::InvalidCallbackPrefix { .. })
        ));

        config.transport.callback_prefix = "bad-name".to_string();
        assert!(validate(&config).is_err());

        config.transport.callback_prefix = "$cb_".to_string();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_default_url_must_be_recognized() {
        let mut config = Config::default();
        config.defaults.url = Some("https://example.com/".to_string());
        assert!(matches!(
            validate(&config),
            Err(ValidationError::UnrecognizedDefaultUrl { .. })
        ));

        config.defaults.url =
            Some("https://docs.google.com/spreadsheets/d/abc/edit#gid=0".to_string());
        assert!(validate(&config).is_ok());
    }
}
