//! Feedback Relay Lambda - website feedback delivered over SMTP
//!
//! A single HTTP endpoint that accepts a feedback submission from the
//! RecebimentoSmart web frontend, validates it, and relays it as a plain-text
//! email to the support inbox.
//!
//! ## Request flow
//!
//! ```text
//! Browser → API Gateway / Function URL → Lambda (this) → SMTP (implicit TLS) → Inbox
//! ```
//!
//! 1. CORS headers are attached to every response
//! 2. `OPTIONS` preflight short-circuits with `204`
//! 3. `POST` bodies are parsed into a [`FeedbackSubmission`]
//! 4. Transport settings are resolved from [`RelayConfig`]
//! 5. One SMTP connection is opened, used, and closed per request
//!
//! Nothing is persisted, queued, or retried. See `main.rs` for the Lambda
//! entry point.

pub mod error;
pub mod handler;
pub mod smtp;
pub mod template;
pub mod types;

use std::fmt;
use std::time::Duration;

pub use error::RelayError;
pub use handler::FeedbackRelay;
pub use smtp::{Mailer, SmtpMailer, SmtpSettings};
pub use template::{compose_message, format_timestamp, OutboundMessage};
pub use types::{ApiResponse, FeedbackPayload, FeedbackSubmission, ValidationError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_SMTP_HOST: &str = "smtp.zoho.com";
pub const DEFAULT_SMTP_PORT: u16 = 465;
pub const DEFAULT_FROM_EMAIL: &str = "no-reply@recebimentosmart.com.br";
pub const DEFAULT_RECIPIENT_EMAIL: &str = "contato@recebimentosmart.com.br";
pub const DEFAULT_ALLOWED_ORIGIN: &str = "*";
pub const DEFAULT_SMTP_TIMEOUT_SECS: u64 = 10;

/// Configuration for the feedback relay
///
/// Loaded once at cold start and injected into [`FeedbackRelay`]. Tests build
/// it literally instead of touching the process environment.
#[derive(Clone)]
pub struct RelayConfig {
    /// SMTP server hostname
    pub smtp_host: String,

    /// SMTP server port (implicit TLS)
    pub smtp_port: u16,

    /// Authenticated sender address, also used as the SMTP username
    pub from_email: String,

    /// Sender credential. No default: absence is a configuration error.
    pub smtp_password: Option<String>,

    /// Feedback destination address
    pub recipient_email: Option<String>,

    /// Value of `Access-Control-Allow-Origin`
    pub allowed_origin: String,

    /// Connect and per-command SMTP timeout
    pub smtp_timeout: Duration,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            smtp_host: DEFAULT_SMTP_HOST.to_string(),
            smtp_port: DEFAULT_SMTP_PORT,
            from_email: DEFAULT_FROM_EMAIL.to_string(),
            smtp_password: None,
            recipient_email: Some(DEFAULT_RECIPIENT_EMAIL.to_string()),
            allowed_origin: DEFAULT_ALLOWED_ORIGIN.to_string(),
            smtp_timeout: Duration::from_secs(DEFAULT_SMTP_TIMEOUT_SECS),
        }
    }
}

impl RelayConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let smtp_port = match get("SMTP_PORT") {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "Invalid SMTP_PORT, using default");
                DEFAULT_SMTP_PORT
            }),
            None => DEFAULT_SMTP_PORT,
        };

        let smtp_timeout = match get("SMTP_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    tracing::warn!(value = %raw, "Invalid SMTP_TIMEOUT_SECS, using default");
                    defaults.smtp_timeout
                }
            },
            None => defaults.smtp_timeout,
        };

        Self {
            smtp_host: get("SMTP_HOST").unwrap_or(defaults.smtp_host),
            smtp_port,
            from_email: get("SMTP_FROM_EMAIL").unwrap_or(defaults.from_email),
            smtp_password: get("SMTP_PASSWORD"),
            recipient_email: get("RECIPIENT_EMAIL").or(defaults.recipient_email),
            allowed_origin: get("ALLOWED_ORIGIN").unwrap_or(defaults.allowed_origin),
            smtp_timeout,
        }
    }

    /// Resolve the settings needed for one delivery.
    ///
    /// Missing credential or recipient is reported as [`RelayError::Config`],
    /// which the handler surfaces to the caller as a `400`.
    pub fn smtp_settings(&self) -> Result<SmtpSettings, RelayError> {
        let password = self
            .smtp_password
            .clone()
            .ok_or(RelayError::Config("senha não encontrada"))?;
        let recipient = self
            .recipient_email
            .clone()
            .ok_or(RelayError::Config("destinatário não encontrado"))?;

        Ok(SmtpSettings {
            host: self.smtp_host.clone(),
            port: self.smtp_port,
            from_email: self.from_email.clone(),
            password,
            recipient,
            timeout: self.smtp_timeout,
        })
    }
}

impl fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("from_email", &self.from_email)
            .field(
                "smtp_password",
                &self.smtp_password.as_ref().map(|_| "<redacted>"),
            )
            .field("recipient_email", &self.recipient_email)
            .field("allowed_origin", &self.allowed_origin)
            .field("smtp_timeout", &self.smtp_timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = RelayConfig::default();
        assert_eq!(config.smtp_host, "smtp.zoho.com");
        assert_eq!(config.smtp_port, 465);
        assert_eq!(config.from_email, "no-reply@recebimentosmart.com.br");
        assert_eq!(
            config.recipient_email.as_deref(),
            Some("contato@recebimentosmart.com.br")
        );
        assert_eq!(config.allowed_origin, "*");
        assert!(config.smtp_password.is_none());
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = RelayConfig::from_lookup(lookup(&[
            ("SMTP_HOST", "mail.example.com"),
            ("SMTP_PORT", "2465"),
            ("SMTP_FROM_EMAIL", "bot@example.com"),
            ("SMTP_PASSWORD", "hunter2"),
            ("RECIPIENT_EMAIL", "support@example.com"),
            ("ALLOWED_ORIGIN", "https://recebimentosmart.com.br"),
            ("SMTP_TIMEOUT_SECS", "3"),
        ]));

        assert_eq!(config.smtp_host, "mail.example.com");
        assert_eq!(config.smtp_port, 2465);
        assert_eq!(config.from_email, "bot@example.com");
        assert_eq!(config.smtp_password.as_deref(), Some("hunter2"));
        assert_eq!(
            config.recipient_email.as_deref(),
            Some("support@example.com")
        );
        assert_eq!(config.allowed_origin, "https://recebimentosmart.com.br");
        assert_eq!(config.smtp_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_empty_values_fall_back_to_defaults() {
        let config = RelayConfig::from_lookup(lookup(&[
            ("SMTP_HOST", ""),
            ("SMTP_PASSWORD", "   "),
            ("ALLOWED_ORIGIN", ""),
        ]));

        assert_eq!(config.smtp_host, DEFAULT_SMTP_HOST);
        assert!(config.smtp_password.is_none());
        assert_eq!(config.allowed_origin, "*");
    }

    #[test]
    fn test_invalid_port_falls_back() {
        let config = RelayConfig::from_lookup(lookup(&[("SMTP_PORT", "not-a-port")]));
        assert_eq!(config.smtp_port, DEFAULT_SMTP_PORT);
    }

    #[test]
    fn test_invalid_timeout_falls_back() {
        for raw in ["0", "soon", "-5", "1.5"] {
            let config = RelayConfig::from_lookup(lookup(&[("SMTP_TIMEOUT_SECS", raw)]));
            assert_eq!(
                config.smtp_timeout,
                Duration::from_secs(DEFAULT_SMTP_TIMEOUT_SECS),
                "{raw}"
            );
        }
    }

    #[test]
    fn test_missing_password_is_config_error() {
        let err = RelayConfig::default().smtp_settings().unwrap_err();
        assert!(matches!(err, RelayError::Config(_)));
        assert_eq!(
            err.to_string(),
            "Configuração SMTP incompleta - senha não encontrada"
        );
    }

    #[test]
    fn test_missing_recipient_is_config_error() {
        let config = RelayConfig {
            smtp_password: Some("secret".to_string()),
            recipient_email: None,
            ..RelayConfig::default()
        };
        let err = config.smtp_settings().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuração SMTP incompleta - destinatário não encontrado"
        );
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = RelayConfig {
            smtp_password: Some("super-secret".to_string()),
            ..RelayConfig::default()
        };
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
