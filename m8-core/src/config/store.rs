//! Loading and persisting [`ClientConfig`]

#[cfg(feature = "postcard")]
use alloc::vec::Vec;

#[cfg(any(feature = "toml", feature = "postcard"))]
use super::types::ClientConfig;

/// Configuration loading errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// TOML text could not be parsed into a config
    Toml,
    /// Postcard data could not be encoded or decoded
    Postcard,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::Toml => write!(f, "invalid TOML configuration"),
            ConfigError::Postcard => write!(f, "invalid binary configuration"),
        }
    }
}

#[cfg(feature = "toml")]
impl ClientConfig {
    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        toml::from_str(input).map_err(|_| {
            warn!("config TOML parse failed");
            ConfigError::Toml
        })
    }
}

#[cfg(feature = "postcard")]
impl ClientConfig {
    pub fn to_postcard(&self) -> Result<Vec<u8>, ConfigError> {
        postcard::to_allocvec(self).map_err(|_| ConfigError::Postcard)
    }

    pub fn from_postcard(bytes: &[u8]) -> Result<Self, ConfigError> {
        postcard::from_bytes(bytes).map_err(|_| ConfigError::Postcard)
    }
}

#[cfg(test)]
mod tests {
    #[allow(unused_imports)]
    use super::*;

    #[cfg(feature = "toml")]
    #[test]
    fn test_from_toml_partial() {
        use m8_protocol::EscapePolicy;

        let config = ClientConfig::from_toml(
            r#"
            [session]
            idle_threshold = 2048
            escape_policy = "resync"

            [[session.accepted_devices]]
            vid = 0x16C0
            pid = 0x048A

            [display]
            background_alpha = 0
            swatch_sizes = [[24, 7], [30, 9]]
            "#,
        )
        .unwrap();

        assert_eq!(config.session.idle_threshold, 2048);
        assert_eq!(config.session.write_timeout_ms, 10);
        assert_eq!(config.session.escape_policy, EscapePolicy::Resync);
        assert_eq!(config.session.accepted_devices.len(), 1);
        assert_eq!(config.display.background_alpha, 0);
        assert_eq!(config.display.swatch_sizes.as_slice(), &[(24, 7), (30, 9)]);
    }

    #[cfg(feature = "toml")]
    #[test]
    fn test_from_toml_empty_is_default() {
        assert_eq!(ClientConfig::from_toml("").unwrap(), ClientConfig::default());
    }

    #[cfg(feature = "toml")]
    #[test]
    fn test_from_toml_rejects_bad_types() {
        assert_eq!(
            ClientConfig::from_toml("[session]\nidle_threshold = \"soon\""),
            Err(ConfigError::Toml)
        );
    }

    #[cfg(feature = "postcard")]
    #[test]
    fn test_postcard_persisted_settings() {
        let mut config = ClientConfig::default();
        config.display.background_alpha = 128;
        config.session.max_reads_per_poll = 4;

        let bytes = config.to_postcard().unwrap();
        assert_eq!(ClientConfig::from_postcard(&bytes).unwrap(), config);
        assert_eq!(
            ClientConfig::from_postcard(&bytes[..bytes.len() / 2]),
            Err(ConfigError::Postcard)
        );
    }
}
