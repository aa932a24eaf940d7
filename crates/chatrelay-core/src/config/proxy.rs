//! Outbound proxy settings
//!
//! One process-wide [`ProxyRegistry`] holds the current settings. Calls take a
//! [`ProxySettings`] snapshot when they start, so an update only affects
//! calls started after it.

use crate::error::{RelayError, RelayResult};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Proxy configuration as supplied by `set_proxy`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxySettings {
    pub use_proxy: bool,
    pub http_proxy: Option<String>,
    pub https_proxy: Option<String>,
}

impl ProxySettings {
    /// Explicitly no proxy
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Enabled settings with the given URLs
    pub fn enabled(http_proxy: Option<String>, https_proxy: Option<String>) -> Self {
        Self {
            use_proxy: true,
            http_proxy,
            https_proxy,
        }
        .normalized()
    }

    /// Treat blank URLs as unset
    pub fn normalized(self) -> Self {
        fn clean(url: Option<String>) -> Option<String> {
            url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty())
        }

        Self {
            use_proxy: self.use_proxy,
            http_proxy: clean(self.http_proxy),
            https_proxy: clean(self.https_proxy),
        }
    }

    /// A proxy is used only when enabled and at least one URL is set.
    ///
    /// Anything else means the transport must be told "no proxy", not just
    /// left unconfigured, so ambient proxy variables are ignored too.
    pub fn is_active(&self) -> bool {
        self.use_proxy && (self.http_proxy.is_some() || self.https_proxy.is_some())
    }

    /// Check that every configured URL parses as a proxy
    pub fn validate(&self) -> RelayResult<()> {
        for (field, url) in [
            ("http_proxy", &self.http_proxy),
            ("https_proxy", &self.https_proxy),
        ] {
            if let Some(url) = url {
                reqwest::Proxy::all(url.as_str()).map_err(|e| {
                    RelayError::invalid_field(field, format!("invalid proxy URL '{}': {}", url, e))
                })?;
            }
        }
        Ok(())
    }
}

/// Process-wide, runtime-mutable proxy state.
///
/// Created at startup, mutated only through [`ProxyRegistry::update`],
/// dropped at process exit.
#[derive(Debug, Default)]
pub struct ProxyRegistry {
    settings: RwLock<ProxySettings>,
}

impl ProxyRegistry {
    pub fn new(initial: ProxySettings) -> Self {
        Self {
            settings: RwLock::new(initial.normalized()),
        }
    }

    /// Copy of the current settings, to be held for the duration of one call
    pub fn snapshot(&self) -> ProxySettings {
        self.settings.read().clone()
    }

    /// Replace the settings, returning the previous ones
    pub fn update(&self, settings: ProxySettings) -> ProxySettings {
        let settings = settings.normalized();
        tracing::info!(
            use_proxy = settings.use_proxy,
            http_proxy = settings.http_proxy.as_deref().unwrap_or("-"),
            https_proxy = settings.https_proxy.as_deref().unwrap_or("-"),
            "proxy settings updated"
        );
        std::mem::replace(&mut *self.settings.write(), settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_is_inactive_even_with_urls() {
        let settings = ProxySettings {
            use_proxy: false,
            http_proxy: Some("http://127.0.0.1:8080".into()),
            https_proxy: Some("http://127.0.0.1:8080".into()),
        };
        assert!(!settings.is_active());
    }

    #[test]
    fn test_enabled_without_urls_is_inactive() {
        assert!(!ProxySettings::enabled(None, Some("   ".into())).is_active());
        assert!(ProxySettings::enabled(None, Some("http://proxy:3128".into())).is_active());
    }

    #[test]
    fn test_validate_rejects_garbage() {
        let settings = ProxySettings::enabled(Some("not a url".into()), None);
        assert!(settings.validate().is_err());
        assert!(
            ProxySettings::enabled(Some("http://proxy:3128".into()), None)
                .validate()
                .is_ok()
        );
    }

    #[test]
    fn test_snapshot_is_isolated_from_later_updates() {
        let registry = ProxyRegistry::new(ProxySettings::disabled());
        let before = registry.snapshot();

        let previous =
            registry.update(ProxySettings::enabled(Some("http://proxy:3128".into()), None));

        assert_eq!(previous, before);
        assert!(!before.is_active());
        assert!(registry.snapshot().is_active());
    }
}
