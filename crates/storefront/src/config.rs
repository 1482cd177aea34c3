//! Storefront configuration, loaded from the process environment.
//!
//! Every key has a default, so an empty environment yields a working (simulated) setup. The
//! binary calls `dotenvy::dotenv()` first, which lets a `.env` file fill in the variables.

use crate::pricing::{PricingConfig, TaxRateTable};
use resource_actor::retry::{Backoff, RetryPolicy};
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("{key} has invalid value '{value}': {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
    #[error("{key} requires {missing} to be set")]
    Incomplete {
        key: &'static str,
        missing: &'static str,
    },
}

/// Complete storefront configuration.
#[derive(Debug, Clone, Default)]
pub struct StorefrontConfig {
    pub pricing: PricingConfig,
    pub notifications: NotificationConfig,
    pub providers: ProviderConfig,
}

/// Retry, timeout and queueing behaviour of the notification pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationConfig {
    /// Total attempts against the primary email provider.
    pub email_retry_count: u32,
    pub email_retry_base_delay: Duration,
    pub messaging_retry_count: u32,
    pub messaging_retry_base_delay: Duration,
    /// Deadline for each channel within one dispatch.
    pub channel_timeout: Duration,
    /// Per-request provider timeout. Derived from `channel_timeout` when unset.
    pub provider_timeout: Option<Duration>,
    pub dispatch_queue_capacity: usize,
    /// Dispatch through the background queue instead of awaiting delivery.
    pub background: bool,
    pub default_country_code: String,
    pub mail_spool_dir: PathBuf,
    pub email_from: String,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            email_retry_count: 2,
            email_retry_base_delay: Duration::from_millis(500),
            messaging_retry_count: 2,
            messaging_retry_base_delay: Duration::from_millis(200),
            channel_timeout: Duration::from_millis(12_000),
            provider_timeout: None,
            dispatch_queue_capacity: 64,
            background: false,
            default_country_code: "91".to_string(),
            mail_spool_dir: PathBuf::from("./mail-spool"),
            email_from: "orders@storefront.local".to_string(),
        }
    }
}

impl NotificationConfig {
    pub fn email_retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.email_retry_count,
            Backoff::exponential(self.email_retry_base_delay),
        )
    }

    pub fn messaging_retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.messaging_retry_count,
            Backoff::exponential(self.messaging_retry_base_delay),
        )
    }

    /// Timeout for one provider request on a channel that retries under `policy` and then makes
    /// `fallback_calls` more requests. Unless pinned by `provider_timeout`, the channel deadline
    /// is split so every request and the backoff between them end before it.
    pub fn provider_request_timeout(&self, policy: &RetryPolicy, fallback_calls: u32) -> Duration {
        if let Some(pinned) = self.provider_timeout {
            return pinned;
        }
        let requests = policy.max_attempts.max(1) + fallback_calls;
        let budget = self
            .channel_timeout
            .saturating_sub(policy.worst_case_backoff());
        (budget / requests).max(Duration::from_millis(1))
    }
}

/// An HTTP mail relay.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpEndpoint {
    pub url: String,
    pub api_key: String,
}

/// Account credentials for an SMS or WhatsApp provider.
#[derive(Debug, Clone, PartialEq)]
pub struct MessagingCredentials {
    pub account_sid: String,
    pub auth_token: String,
    pub from: String,
}

/// Third-party delivery providers. Anything left unset is skipped (email) or simulated
/// (SMS/WhatsApp).
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderConfig {
    pub email_primary: Option<HttpEndpoint>,
    pub email_sandbox: Option<HttpEndpoint>,
    pub messaging_api_url: String,
    pub sms: Option<MessagingCredentials>,
    pub whatsapp: Option<MessagingCredentials>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            email_primary: None,
            email_sandbox: None,
            messaging_api_url: "https://api.twilio.com/2010-04-01".to_string(),
            sms: None,
            whatsapp: None,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(&lookup);
        let defaults = StorefrontConfig::default();

        let pricing = PricingConfig {
            free_sample_threshold: env
                .parsed("FREE_SAMPLE_THRESHOLD", non_negative)?
                .unwrap_or(defaults.pricing.free_sample_threshold),
            free_shipping_threshold: env
                .parsed("FREE_SHIPPING_THRESHOLD", non_negative)?
                .unwrap_or(defaults.pricing.free_shipping_threshold),
            flat_shipping_fee: env
                .parsed("FLAT_SHIPPING_FEE", non_negative)?
                .unwrap_or(defaults.pricing.flat_shipping_fee),
            tax_rates: env
                .parsed("TAX_RATE_TABLE", |v| {
                    TaxRateTable::from_str(v).map_err(|e| e.to_string())
                })?
                .unwrap_or(defaults.pricing.tax_rates),
        };

        let n = defaults.notifications;
        let notifications = NotificationConfig {
            email_retry_count: env
                .parsed("EMAIL_RETRY_COUNT", at_least_one)?
                .unwrap_or(n.email_retry_count),
            email_retry_base_delay: env
                .parsed("EMAIL_RETRY_BASE_DELAY_MS", millis)?
                .unwrap_or(n.email_retry_base_delay),
            messaging_retry_count: env
                .parsed("MESSAGING_RETRY_COUNT", at_least_one)?
                .unwrap_or(n.messaging_retry_count),
            messaging_retry_base_delay: env
                .parsed("MESSAGING_RETRY_BASE_DELAY_MS", millis)?
                .unwrap_or(n.messaging_retry_base_delay),
            channel_timeout: env
                .parsed("CHANNEL_TIMEOUT_MS", millis)?
                .unwrap_or(n.channel_timeout),
            provider_timeout: env
                .parsed("PROVIDER_TIMEOUT_MS", |v| {
                    millis(v).and_then(|d| {
                        if d.is_zero() {
                            Err("expected a positive duration".to_string())
                        } else {
                            Ok(d)
                        }
                    })
                })?
                .or(n.provider_timeout),
            dispatch_queue_capacity: env
                .parsed("DISPATCH_QUEUE_CAPACITY", |v| {
                    v.parse::<usize>()
                        .ok()
                        .filter(|c| *c > 0)
                        .ok_or_else(|| "expected a positive integer".to_string())
                })?
                .unwrap_or(n.dispatch_queue_capacity),
            background: env
                .parsed("NOTIFY_IN_BACKGROUND", |v| {
                    v.parse::<bool>().map_err(|e| e.to_string())
                })?
                .unwrap_or(n.background),
            default_country_code: env
                .parsed("DEFAULT_COUNTRY_CODE", |v| {
                    let digits = v.trim_start_matches('+');
                    if !digits.is_empty()
                        && digits.len() <= 3
                        && digits.chars().all(|c| c.is_ascii_digit())
                    {
                        Ok(digits.to_string())
                    } else {
                        Err("expected 1-3 digits".to_string())
                    }
                })?
                .unwrap_or(n.default_country_code),
            mail_spool_dir: env
                .get("MAIL_SPOOL_DIR")
                .map(PathBuf::from)
                .unwrap_or(n.mail_spool_dir),
            email_from: env.get("EMAIL_FROM").unwrap_or(n.email_from),
        };

        let providers = ProviderConfig {
            email_primary: env.endpoint("EMAIL_PRIMARY_URL", "EMAIL_PRIMARY_API_KEY")?,
            email_sandbox: env.endpoint("EMAIL_SANDBOX_URL", "EMAIL_SANDBOX_API_KEY")?,
            messaging_api_url: env
                .get("MESSAGING_API_URL")
                .unwrap_or(defaults.providers.messaging_api_url),
            sms: env.credentials("SMS_ACCOUNT_SID", "SMS_AUTH_TOKEN", "SMS_FROM")?,
            whatsapp: env.credentials(
                "WHATSAPP_ACCOUNT_SID",
                "WHATSAPP_AUTH_TOKEN",
                "WHATSAPP_FROM",
            )?,
        };

        Ok(Self {
            pricing,
            notifications,
            providers,
        })
    }
}

struct Env<'a, F: Fn(&str) -> Option<String>>(&'a F);

impl<F: Fn(&str) -> Option<String>> Env<'_, F> {
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parsed<T>(
        &self,
        key: &'static str,
        parse: impl Fn(&str) -> Result<T, String>,
    ) -> Result<Option<T>, ConfigError> {
        self.get(key)
            .map(|value| {
                parse(&value).map_err(|reason| ConfigError::Invalid {
                    key,
                    value: value.clone(),
                    reason,
                })
            })
            .transpose()
    }

    fn endpoint(
        &self,
        url_key: &'static str,
        key_key: &'static str,
    ) -> Result<Option<HttpEndpoint>, ConfigError> {
        match (self.get(url_key), self.get(key_key)) {
            (Some(url), Some(api_key)) => Ok(Some(HttpEndpoint { url, api_key })),
            (Some(_), None) => Err(ConfigError::Incomplete {
                key: url_key,
                missing: key_key,
            }),
            (None, _) => Ok(None),
        }
    }

    fn credentials(
        &self,
        sid_key: &'static str,
        token_key: &'static str,
        from_key: &'static str,
    ) -> Result<Option<MessagingCredentials>, ConfigError> {
        let Some(account_sid) = self.get(sid_key) else {
            return Ok(None);
        };
        let auth_token = self.get(token_key).ok_or(ConfigError::Incomplete {
            key: sid_key,
            missing: token_key,
        })?;
        let from = self.get(from_key).ok_or(ConfigError::Incomplete {
            key: sid_key,
            missing: from_key,
        })?;
        Ok(Some(MessagingCredentials {
            account_sid,
            auth_token,
            from,
        }))
    }
}

fn non_negative(value: &str) -> Result<Decimal, String> {
    Decimal::from_str(value)
        .ok()
        .filter(|d| !d.is_sign_negative())
        .ok_or_else(|| "expected a non-negative amount".to_string())
}

fn at_least_one(value: &str) -> Result<u32, String> {
    value
        .parse::<u32>()
        .ok()
        .filter(|n| *n >= 1)
        .ok_or_else(|| "expected an integer >= 1".to_string())
}

fn millis(value: &str) -> Result<Duration, String> {
    value
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|_| "expected milliseconds".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        StorefrontConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = load(&[]).unwrap();

        assert_eq!(config.pricing.free_sample_threshold, dec!(2000));
        assert_eq!(config.pricing.free_shipping_threshold, dec!(1000));
        assert_eq!(config.pricing.flat_shipping_fee, dec!(50));
        assert_eq!(config.pricing.tax_rates.rate_for("Delhi"), dec!(0.18));
        assert_eq!(config.pricing.tax_rates.rate_for("Goa"), dec!(0.12));
        assert_eq!(config.notifications.email_retry_count, 2);
        assert_eq!(
            config.notifications.email_retry_base_delay,
            Duration::from_millis(500)
        );
        assert_eq!(
            config.notifications.channel_timeout,
            Duration::from_millis(12_000)
        );
        assert_eq!(config.providers, ProviderConfig::default());
    }

    #[test]
    fn overrides_are_parsed() {
        let config = load(&[
            ("FLAT_SHIPPING_FEE", "79.5"),
            ("TAX_RATE_TABLE", "Karnataka=0.2,*=0.1"),
            ("CHANNEL_TIMEOUT_MS", "250"),
            ("DEFAULT_COUNTRY_CODE", "+44"),
            ("NOTIFY_IN_BACKGROUND", "true"),
            ("SMS_ACCOUNT_SID", "AC1"),
            ("SMS_AUTH_TOKEN", "secret"),
            ("SMS_FROM", "+15550001111"),
        ])
        .unwrap();

        assert_eq!(config.pricing.flat_shipping_fee, dec!(79.5));
        assert_eq!(config.pricing.tax_rates.rate_for("karnataka"), dec!(0.2));
        assert_eq!(config.pricing.tax_rates.rate_for("Delhi"), dec!(0.1));
        assert_eq!(config.notifications.channel_timeout, Duration::from_millis(250));
        assert_eq!(config.notifications.default_country_code, "44");
        assert!(config.notifications.background);
        assert_eq!(config.providers.sms.unwrap().account_sid, "AC1");
        assert!(config.providers.whatsapp.is_none());
    }

    #[test]
    fn provider_requests_fit_inside_the_channel_deadline() {
        let n = load(&[]).unwrap().notifications;
        let email = n.email_retry_policy();

        // Two primary attempts, the backoff between them and one sandbox attempt.
        let per_request = n.provider_request_timeout(&email, 1);
        assert!(per_request * 3 + email.worst_case_backoff() <= n.channel_timeout);
        assert!(per_request > Duration::from_secs(3));

        let sms = n.messaging_retry_policy();
        let per_request = n.provider_request_timeout(&sms, 0);
        assert!(per_request * 2 + sms.worst_case_backoff() <= n.channel_timeout);

        let pinned = load(&[("PROVIDER_TIMEOUT_MS", "1500")]).unwrap().notifications;
        assert_eq!(
            pinned.provider_request_timeout(&email, 1),
            Duration::from_millis(1500)
        );
        assert!(load(&[("PROVIDER_TIMEOUT_MS", "0")]).is_err());
    }

    #[test]
    fn malformed_values_are_reported() {
        let err = load(&[("EMAIL_RETRY_COUNT", "0")]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "EMAIL_RETRY_COUNT",
                ..
            }
        ));

        let err = load(&[("EMAIL_PRIMARY_URL", "https://mail.example")]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Incomplete {
                key: "EMAIL_PRIMARY_URL",
                missing: "EMAIL_PRIMARY_API_KEY",
            }
        );
    }
}
