//! Commerce service configuration.

use std::env;

use chrono::Duration;
use common::{DatabaseConfig, ShortcodeConfig, SmsConfig};

/// Commerce service configuration.
#[derive(Debug, Clone, Default)]
pub struct CommerceServiceConfig {
    pub database: DatabaseConfig,
    pub shortcodes: ShortcodeConfig,
    pub sms: SmsConfig,
}

impl CommerceServiceConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            database: DatabaseConfig {
                url: env::var("COMMERCE_SERVICE_DATABASE_URL")
                    .or_else(|_| env::var("DATABASE_URL"))
                    .unwrap_or(defaults.database.url),
                max_connections: parse_var("DATABASE_MAX_CONNECTIONS")
                    .unwrap_or(defaults.database.max_connections),
                min_connections: parse_var("DATABASE_MIN_CONNECTIONS")
                    .unwrap_or(defaults.database.min_connections),
            },
            shortcodes: ShortcodeConfig {
                length: parse_var("SHORTCODE_LENGTH")
                    .filter(|length| *length > 0)
                    .unwrap_or(defaults.shortcodes.length),
                ttl_hours: parse_var("SHORTCODE_TTL_HOURS")
                    .filter(|hours| *hours > 0)
                    .unwrap_or(defaults.shortcodes.ttl_hours),
            },
            sms: SmsConfig {
                provider_url: env::var("SMS_PROVIDER_URL").ok().filter(|url| !url.is_empty()),
                sender_name: env::var("SMS_SENDER_NAME").ok().filter(|name| !name.is_empty()),
            },
        }
    }

    /// Validity of a shortcode issued without an explicit expiry
    pub fn shortcode_ttl(&self) -> Duration {
        Duration::hours(self.shortcodes.ttl_hours)
    }
}

fn parse_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|value| value.parse().ok())
}
